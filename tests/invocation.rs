use jam_node::instruction::Opcode;
use jam_node::interpreter::{ExecutionContext, PanicReason, Termination};
use jam_node::memory::Memory;
use jam_node::program::Program;

fn encode_header(ro_len: u32, rw_len: u32, heap_pages: u16, stack_size: u32, code_len: u32) -> Vec<u8> {
    let mut header = Vec::new();
    header.extend_from_slice(&ro_len.to_le_bytes()[..3]);
    header.extend_from_slice(&rw_len.to_le_bytes()[..3]);
    header.extend_from_slice(&heap_pages.to_le_bytes());
    header.extend_from_slice(&stack_size.to_le_bytes()[..3]);
    header.extend_from_slice(&code_len.to_le_bytes());
    header
}

fn encode_program(code: Vec<u8>, mask: Vec<u8>) -> Vec<u8> {
    let mut blob = jam_node::codec::encode_nat(0);
    blob.push(0);
    blob.extend(jam_node::codec::encode_nat(code.len() as u64));
    blob.extend_from_slice(&code);
    blob.extend_from_slice(&mask);
    blob
}

#[test]
fn immediately_halting_context_reports_zero_gas_used_and_empty_return() {
    let code = encode_program(vec![Opcode::Trap as u8], vec![0b0000_0001]);
    let program = Program::decode(&code).unwrap();
    let mut ctx = ExecutionContext::new(program, Memory::init_with_capacity(0, 0, 0, 0), 1_000);
    ctx.set_pc(jam_node::consts::HALT_PC);

    let initial = ctx.gas();
    let termination = ctx.run();
    let gas_used = initial - ctx.gas();

    assert_eq!(termination, Termination::Halt);
    assert_eq!(gas_used, 0);
    assert!(ctx.return_value().is_empty());
}

#[test]
fn trap_opcode_panics_through_the_full_invocation_path() {
    let code = encode_program(vec![Opcode::Trap as u8], vec![0b0000_0001]);
    let mut payload = encode_header(0, 0, 0, 4096, code.len() as u32);
    payload.extend_from_slice(&code);

    let report = jam_node::invocation::invoke(&payload, &[], 1_000, Vec::new());

    assert_eq!(report.termination, Termination::Panic(PanicReason::Trap));
    assert!(report.gas_used > 0);
    assert!(report.return_value.is_empty());
}

#[test]
fn malformed_metadata_prefix_panics_without_running() {
    let report = jam_node::invocation::invoke_with_metadata(&[0xFF], &[], 1_000, Vec::new());
    assert_eq!(
        report.termination,
        Termination::Panic(PanicReason::InvalidInstruction)
    );
    assert_eq!(report.gas_used, 0);
}
