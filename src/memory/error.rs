//! Memory subsystem error taxonomy (spec §7 Memory errors).

use thiserror::Error;

/// What kind of access caused the last fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    WriteProtection,
    AccessViolation,
    NonAllocated,
}

/// Records the most recent memory fault for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViolationInfo {
    pub kind: ViolationKind,
    pub address: u32,
    pub length: u32,
}

/// Errors raised by the memory subsystem.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MemoryError {
    #[error("page fault at {0:#010x}")]
    PageFault(u32),
    #[error("read would cross a page boundary")]
    CrossPageRead,
    #[error("write would cross a page boundary")]
    CrossPageWrite,
    #[error("requested pages overlap an existing allocation")]
    PageOverlap,
    #[error("allocation would exceed the configured heap limit")]
    MemoryLimitExceeded,
    #[error("address is not page-aligned")]
    UnalignedAddress,
    #[error("no read-write page found at the requested address")]
    CouldNotFindRwPage,
    #[error("write targets a read-only page")]
    WriteProtection,
}
