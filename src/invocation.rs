//! Machine Invocation: strip the optional metadata prefix, parse the
//! standard program header, build an [`ExecutionContext`], and run it to
//! termination (spec §4.5 Machine Invocation).

use thiserror::Error;

use crate::codec::{decode_nat, read_fixed_le};
use crate::consts::{REG_RESULT_ADDR, REG_RESULT_LEN, Z_P};
use crate::interpreter::{ExecutionContext, HostCall, PanicReason, Termination};
use crate::memory::Memory;
use crate::program::Program;

/// Failure modes used internally while parsing the metadata/header framing.
/// Per spec §4.5, a malformed metadata size or a truncated header never
/// bubbles up as this error — [`invoke_with_metadata`] converts both into a
/// `panic` [`Termination`] directly. The variants remain available to callers
/// that want to validate framing without running the program.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvocationError {
    #[error("metadata segment is malformed")]
    MalformedMetadata,
    #[error("standard program header is truncated")]
    TruncatedHeader,
    #[error("payload is shorter than the header declares")]
    PayloadTooShort,
}

const HEADER_LEN: usize = 3 + 3 + 2 + 3 + 4;

/// The parsed standard program header (spec §4.5 step 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardHeader {
    pub read_only_len: u32,
    pub read_write_len: u32,
    pub heap_pages: u16,
    pub stack_size: u32,
    pub code_len: u32,
}

/// The outcome of running a program blob to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationReport {
    pub termination: Termination,
    pub gas_used: i64,
    pub return_value: Vec<u8>,
}

/// Strip a leading `E_nat(|m|) ∥ m` metadata segment, returning `(metadata,
/// rest)`.
pub fn strip_metadata(blob: &[u8]) -> Result<(Vec<u8>, Vec<u8>), InvocationError> {
    let (len, n) = decode_nat(blob).map_err(|_| InvocationError::MalformedMetadata)?;
    let len = len as usize;
    let end = n.checked_add(len).ok_or(InvocationError::MalformedMetadata)?;
    if blob.len() < end {
        return Err(InvocationError::MalformedMetadata);
    }
    Ok((blob[n..end].to_vec(), blob[end..].to_vec()))
}

/// Parse the fixed-width standard program header from the front of `bytes`,
/// returning the header and the remaining bytes.
pub fn parse_header(bytes: &[u8]) -> Result<(StandardHeader, &[u8]), InvocationError> {
    if bytes.len() < HEADER_LEN {
        return Err(InvocationError::TruncatedHeader);
    }
    let read_only_len = read_fixed_le::<3>(&bytes[0..3]) as u32;
    let read_write_len = read_fixed_le::<3>(&bytes[3..6]) as u32;
    let heap_pages = read_fixed_le::<2>(&bytes[6..8]) as u16;
    let stack_size = read_fixed_le::<3>(&bytes[8..11]) as u32;
    let code_len = read_fixed_le::<4>(&bytes[11..15]) as u32;
    Ok((
        StandardHeader {
            read_only_len,
            read_write_len,
            heap_pages,
            stack_size,
            code_len,
        },
        &bytes[HEADER_LEN..],
    ))
}

/// Check that `rest` holds at least as many bytes as `header` declares for
/// the read-only, read-write, and code segments combined.
fn require_payload_fits(header: &StandardHeader, rest: &[u8]) -> Result<(), InvocationError> {
    let needed = header.read_only_len as usize
        + header.read_write_len as usize
        + header.code_len as usize;
    if rest.len() < needed {
        return Err(InvocationError::PayloadTooShort);
    }
    Ok(())
}

fn panic_report() -> InvocationReport {
    InvocationReport {
        termination: Termination::Panic(PanicReason::InvalidInstruction),
        gas_used: 0,
        return_value: Vec::new(),
    }
}

/// Run a standard program blob (no metadata prefix) to termination.
pub fn invoke(
    payload: &[u8],
    argument: &[u8],
    initial_gas: i64,
    host_calls: Vec<(u32, Box<dyn HostCall>)>,
) -> InvocationReport {
    let (header, rest) = match parse_header(payload) {
        Ok(h) => h,
        Err(_) => return panic_report(),
    };

    if require_payload_fits(&header, rest).is_err() {
        return panic_report();
    }

    let ro_len = header.read_only_len as usize;
    let rw_len = header.read_write_len as usize;
    let code_len = header.code_len as usize;
    let ro_bytes = &rest[..ro_len];
    let rw_bytes = &rest[ro_len..ro_len + rw_len];
    let code_bytes = &rest[ro_len + rw_len..ro_len + rw_len + code_len];

    let program = match Program::decode(code_bytes) {
        Ok(p) => p,
        Err(_) => return panic_report(),
    };

    let heap_len = header.heap_pages as u32 * Z_P;
    let mut memory = Memory::init_with_capacity(
        header.read_only_len,
        heap_len,
        argument.len() as u32,
        header.stack_size,
    );
    let layout = memory.layout();
    if memory.init_memory(layout.read_only_base, ro_bytes).is_err()
        || memory.init_memory(layout.heap_base, rw_bytes).is_err()
        || memory.init_memory(layout.input_base, argument).is_err()
    {
        return panic_report();
    }

    let mut ctx = ExecutionContext::new(program, memory, initial_gas);
    ctx.set_reg(0, crate::consts::HALT_PC as u64);
    ctx.set_reg(1, layout.stack_top as u64);
    ctx.set_reg(7, layout.input_base as u64);
    ctx.set_reg(8, argument.len() as u64);
    for (id, handler) in host_calls {
        ctx.register_host_call(id, handler);
    }
    ctx.set_pc(0);

    let initial = ctx.gas();
    let termination = ctx.run();
    let gas_used = (initial - ctx.gas()).max(0);

    let return_value = match termination {
        Termination::Halt => {
            let addr = ctx.reg(REG_RESULT_ADDR as u8) as u32;
            let len = ctx.reg(REG_RESULT_LEN as u8) as usize;
            if len == 0 {
                Vec::new()
            } else {
                ctx.memory_mut().read_slice(addr, len).unwrap_or_default()
            }
        }
        _ => Vec::new(),
    };

    InvocationReport {
        termination,
        gas_used,
        return_value,
    }
}

/// Strip the metadata prefix, then run the remaining program blob (spec §4.5
/// step 1-5).
pub fn invoke_with_metadata(
    blob: &[u8],
    argument: &[u8],
    initial_gas: i64,
    host_calls: Vec<(u32, Box<dyn HostCall>)>,
) -> InvocationReport {
    match strip_metadata(blob) {
        Ok((_metadata, rest)) => invoke(&rest, argument, initial_gas, host_calls),
        Err(_) => panic_report(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Opcode;

    fn minimal_program_blob() -> Vec<u8> {
        let code = vec![Opcode::Trap as u8];
        let mask = vec![0b0000_0001];
        let mut blob = crate::codec::encode_nat(0);
        blob.push(0);
        blob.extend(crate::codec::encode_nat(code.len() as u64));
        blob.extend_from_slice(&code);
        blob.extend_from_slice(&mask);
        blob
    }

    fn header_bytes(code_len: u32) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend(&read_fixed_le_bytes(0, 3));
        out.extend(&read_fixed_le_bytes(0, 3));
        out.extend(&read_fixed_le_bytes(0, 2));
        out.extend(&read_fixed_le_bytes(4096, 3));
        out.extend(&code_len.to_le_bytes());
        out
    }

    fn read_fixed_le_bytes(value: u32, width: usize) -> Vec<u8> {
        value.to_le_bytes()[..width].to_vec()
    }

    #[test]
    fn trap_program_reports_nonzero_gas_used() {
        let code = minimal_program_blob();
        let mut payload = header_bytes(code.len() as u32);
        payload.extend_from_slice(&code);

        let report = invoke(&payload, &[], 1_000, Vec::new());
        assert_eq!(
            report.termination,
            Termination::Panic(PanicReason::Trap)
        );
        assert!(report.gas_used > 0);
        assert!(report.return_value.is_empty());
    }

    #[test]
    fn truncated_header_panics() {
        let report = invoke(&[1, 2, 3], &[], 1_000, Vec::new());
        assert_eq!(
            report.termination,
            Termination::Panic(PanicReason::InvalidInstruction)
        );
        assert_eq!(report.gas_used, 0);
    }

    #[test]
    fn metadata_prefix_is_stripped_before_running() {
        let code = minimal_program_blob();
        let mut payload = header_bytes(code.len() as u32);
        payload.extend_from_slice(&code);

        let mut blob = crate::codec::encode_nat(4);
        blob.extend_from_slice(b"meta");
        blob.extend_from_slice(&payload);

        let report = invoke_with_metadata(&blob, &[], 1_000, Vec::new());
        assert_eq!(report.termination, Termination::Panic(PanicReason::Trap));
    }

    #[test]
    fn payload_shorter_than_header_declares_is_payload_too_short() {
        let header = header_bytes(10);
        let (parsed, rest) = parse_header(&header).unwrap();
        assert_eq!(
            require_payload_fits(&parsed, rest),
            Err(InvocationError::PayloadTooShort)
        );
    }

    #[test]
    fn invoke_panics_on_payload_shorter_than_header_declares() {
        let mut payload = header_bytes(10);
        payload.extend_from_slice(&[0u8; 3]);

        let report = invoke(&payload, &[], 1_000, Vec::new());
        assert_eq!(
            report.termination,
            Termination::Panic(PanicReason::InvalidInstruction)
        );
        assert_eq!(report.gas_used, 0);
    }
}
