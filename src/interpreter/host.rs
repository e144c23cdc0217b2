//! Host-call trampoline (spec §4.4 Execution Core: "Host-call trampoline").

use std::collections::HashMap;
use std::fmt;

use crate::memory::MemoryError;

use super::ExecutionContext;

/// The result of invoking a host call handler: either resume the VM, or end
/// the invocation with a protocol-level exception.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCallOutcome {
    Play,
    Terminal(InvocationException),
}

/// A protocol-level exception surfaced by a host call, distinct from the raw
/// [`MemoryError`] a handler's `readMemory`/`writeMemory` calls may hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationException {
    MemoryAccessFault(u32),
    Custom(String),
}

impl fmt::Display for InvocationException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvocationException::MemoryAccessFault(addr) => {
                write!(f, "memory access fault at {addr:#010x}")
            }
            InvocationException::Custom(msg) => write!(f, "{msg}"),
        }
    }
}

impl From<MemoryError> for InvocationException {
    fn from(e: MemoryError) -> Self {
        match e {
            MemoryError::PageFault(addr) => InvocationException::MemoryAccessFault(addr),
            other => InvocationException::Custom(other.to_string()),
        }
    }
}

/// A registered host call handler, invoked with the execution context handle.
pub trait HostCall {
    fn call(&mut self, ctx: &mut ExecutionContext) -> HostCallOutcome;
}

pub type HostCallTable = HashMap<u32, Box<dyn HostCall>>;

/// Read a `WIDTH`-byte little-endian value, translating a page fault into the
/// protocol-level exception.
pub fn read_memory<const WIDTH: usize>(
    ctx: &mut ExecutionContext,
    addr: u32,
) -> Result<u64, InvocationException> {
    ctx.memory_mut().read_int::<WIDTH>(addr).map_err(Into::into)
}

/// Write a `WIDTH`-byte little-endian value, translating a page fault or
/// write-protection violation into the protocol-level exception.
pub fn write_memory<const WIDTH: usize>(
    ctx: &mut ExecutionContext,
    addr: u32,
    value: u64,
) -> Result<(), InvocationException> {
    ctx.memory_mut()
        .write_int::<WIDTH>(addr, value)
        .map_err(Into::into)
}

/// Read a 32-byte hash out of memory without crossing a page boundary.
pub fn read_hash(ctx: &mut ExecutionContext, addr: u32) -> Result<[u8; 32], InvocationException> {
    let bytes = ctx.memory_mut().read_slice(addr, 32)?;
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&bytes);
    Ok(hash)
}
