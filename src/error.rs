//! Crate-level error composition (spec §7 Error Handling Design).
//!
//! Subsystems keep their own typed errors so a caller can match on, e.g.,
//! `MemoryError::PageFault` without downcasting. `JamError` only composes
//! them at the outer machine-invocation boundary.

use thiserror::Error;

use crate::codec::NatDecodeError;
use crate::invocation::InvocationError;
use crate::program::ProgramError;
use crate::state_codec::StateCodecError;

#[derive(Debug, Error)]
pub enum JamError {
    #[error("natural number decode failed: {0}")]
    Natural(#[from] NatDecodeError),

    #[error("program decode failed: {0}")]
    Program(#[from] ProgramError),

    #[error("machine invocation failed: {0}")]
    Invocation(#[from] InvocationError),

    #[error("state decode failed: {0}")]
    StateCodec(#[from] StateCodecError),
}
