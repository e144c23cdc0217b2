//! A single decoded instruction: opcode, argument payload, and the number of
//! bytes to advance the program counter past this instruction's arguments.

use super::args::InstructionArgs;
use super::opcode::Opcode;
use crate::consts::MAX_INSTR_BYTES;
use thiserror::Error;

/// Errors raised while decoding a single instruction from the code stream.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InstructionDecodeError {
    /// The opcode byte does not map to any known [`Opcode`].
    #[error("invalid instruction opcode {0:#04x}")]
    InvalidInstruction(u8),
    /// The instruction's total byte length exceeds [`MAX_INSTR_BYTES`].
    #[error("instruction at exceeds the maximum instruction size in bytes")]
    MaxInstructionSizeInBytesExceeded,
}

/// A decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub args: InstructionArgs,
    /// Byte length of the argument payload (not counting the opcode byte).
    pub skip: usize,
}

impl Instruction {
    /// Decode the instruction at `pc` given the opcode byte and its `skip`-byte
    /// argument payload (`skip` already determined by the mask scan in
    /// [`crate::program`]).
    pub fn decode(opcode_byte: u8, arg_bytes: &[u8]) -> Result<Instruction, InstructionDecodeError> {
        if 1 + arg_bytes.len() > MAX_INSTR_BYTES {
            return Err(InstructionDecodeError::MaxInstructionSizeInBytesExceeded);
        }
        let opcode = Opcode::from_byte(opcode_byte)
            .ok_or(InstructionDecodeError::InvalidInstruction(opcode_byte))?;
        let args = opcode.arg_shape().decode(arg_bytes);
        Ok(Instruction {
            opcode,
            args,
            skip: arg_bytes.len(),
        })
    }

    /// Total byte length of this instruction (opcode byte plus arguments).
    pub const fn len(&self) -> usize {
        1 + self.skip
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_opcode() {
        assert_eq!(
            Instruction::decode(0xFE, &[]),
            Err(InstructionDecodeError::InvalidInstruction(0xFE))
        );
    }

    #[test]
    fn rejects_oversized_argument_payload() {
        let bytes = [0u8; MAX_INSTR_BYTES];
        assert_eq!(
            Instruction::decode(Opcode::Ecalli as u8, &bytes),
            Err(InstructionDecodeError::MaxInstructionSizeInBytesExceeded)
        );
    }

    #[test]
    fn decodes_known_opcode() {
        let instr = Instruction::decode(Opcode::Trap as u8, &[]).unwrap();
        assert_eq!(instr.opcode, Opcode::Trap);
        assert_eq!(instr.len(), 1);
    }
}
