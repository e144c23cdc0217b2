//! Program decode error taxonomy (spec §7 Decoder errors).

use crate::instruction::InstructionDecodeError;
use thiserror::Error;

/// Errors raised while decoding a raw program blob into a [`super::Program`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProgramError {
    #[error("program blob is shorter than its header declares")]
    ProgramTooShort,
    #[error("jump table length overflows the address space")]
    InvalidJumpTableLength,
    #[error("jump table item length must be in [1,4] (or 0 when the table is empty)")]
    InvalidJumpTableItemLength,
    #[error("code length is malformed")]
    InvalidCodeLength,
    #[error("invalid instruction opcode {0:#04x}")]
    InvalidInstruction(u8),
    /// Reserved for a future decoder that faults instead of clamping
    /// out-of-range register nibbles; unreachable under the clamp-to-12 policy
    /// this decoder implements (spec §9 Design Notes).
    #[error("invalid register index")]
    InvalidRegisterIndex,
    #[error("invalid immediate length")]
    InvalidImmediateLength,
    #[error("instruction exceeds the maximum instruction size in bytes")]
    MaxInstructionSizeInBytesExceeded,
    #[error("jump table destination is not a basic-block start")]
    InvalidJumpDestination,
}

impl From<InstructionDecodeError> for ProgramError {
    fn from(e: InstructionDecodeError) -> Self {
        match e {
            InstructionDecodeError::InvalidInstruction(b) => ProgramError::InvalidInstruction(b),
            InstructionDecodeError::MaxInstructionSizeInBytesExceeded => {
                ProgramError::MaxInstructionSizeInBytesExceeded
            }
        }
    }
}
