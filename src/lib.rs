#![allow(clippy::try_err)]
// Wrong clippy convention; check
// https://rust-lang.github.io/api-guidelines/naming.html
#![allow(clippy::wrong_self_convention)]

pub mod codec;
pub mod consts;
pub mod error;
pub mod instruction;
pub mod interpreter;
pub mod invocation;
pub mod memory;
pub mod program;
pub mod state;
pub mod state_codec;

pub mod prelude {
    pub use crate::error::JamError;
    pub use crate::instruction::{ArgShape, InstructionArgs, Opcode};
    pub use crate::interpreter::{ExecutionContext, PanicReason, Termination};
    pub use crate::invocation::{invoke, invoke_with_metadata, InvocationReport};
    pub use crate::memory::Memory;
    pub use crate::program::Program;
    pub use crate::state::{Config, State};
}
