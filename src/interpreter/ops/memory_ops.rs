//! Memory loads and stores: base+offset, immediate-indirect, and
//! immediate-absolute addressing (spec §4.3 Memory, §4.4 Execution Core).

use crate::codec::sign_extend;
use crate::instruction::{InstructionArgs, Opcode};
use crate::interpreter::{ExecutionContext, Fault, StepResult};

fn read_width(ctx: &mut ExecutionContext, addr: u32, width: usize) -> Result<u64, Fault> {
    let mem = ctx.memory_mut();
    Ok(match width {
        1 => mem.read_int::<1>(addr)?,
        2 => mem.read_int::<2>(addr)?,
        4 => mem.read_int::<4>(addr)?,
        _ => mem.read_int::<8>(addr)?,
    })
}

fn write_width(ctx: &mut ExecutionContext, addr: u32, value: u64, width: usize) -> Result<(), Fault> {
    let mem = ctx.memory_mut();
    match width {
        1 => mem.write_int::<1>(addr, value)?,
        2 => mem.write_int::<2>(addr, value)?,
        4 => mem.write_int::<4>(addr, value)?,
        _ => mem.write_int::<8>(addr, value)?,
    }
    Ok(())
}

fn sign_extend_width(value: u64, width: usize) -> u64 {
    match width {
        1 => sign_extend::<8>(value) as u64,
        2 => sign_extend::<16>(value) as u64,
        4 => sign_extend::<32>(value) as u64,
        _ => value,
    }
}

pub(crate) fn execute_memory(
    ctx: &mut ExecutionContext,
    opcode: Opcode,
    args: &InstructionArgs,
) -> Result<StepResult, Fault> {
    match (opcode, args) {
        (
            Opcode::LoadU8 | Opcode::LoadI8 | Opcode::LoadU16 | Opcode::LoadI16
            | Opcode::LoadU32 | Opcode::LoadI32 | Opcode::LoadU64,
            InstructionArgs::TwoRegOneImm { rd, ra, imm },
        ) => {
            let addr = ctx.reg(*ra).wrapping_add(*imm as u64) as u32;
            let width = load_width(opcode);
            let raw = read_width(ctx, addr, width)?;
            let value = if matches!(opcode, Opcode::LoadI8 | Opcode::LoadI16 | Opcode::LoadI32) {
                sign_extend_width(raw, width)
            } else {
                raw
            };
            ctx.set_reg(*rd, value);
            Ok(StepResult::Continue)
        }

        (
            Opcode::StoreU8 | Opcode::StoreU16 | Opcode::StoreU32 | Opcode::StoreU64,
            InstructionArgs::TwoRegOneImm { rd, ra, imm },
        ) => {
            let addr = ctx.reg(*ra).wrapping_add(*imm as u64) as u32;
            write_width(ctx, addr, ctx.reg(*rd), store_width(opcode))?;
            Ok(StepResult::Continue)
        }

        (
            Opcode::LoadImmIndU8 | Opcode::LoadImmIndU32,
            InstructionArgs::OneRegOneExtImm { ra, ext_imm },
        ) => {
            let width = if opcode == Opcode::LoadImmIndU8 { 1 } else { 4 };
            let value = read_width(ctx, *ext_imm as u32, width)?;
            ctx.set_reg(*ra, value);
            Ok(StepResult::Continue)
        }

        (
            Opcode::StoreImmIndU8 | Opcode::StoreImmIndU32,
            InstructionArgs::OneRegTwoImm { ra, imm1, imm2 },
        ) => {
            let addr = ctx.reg(*ra).wrapping_add(*imm1 as u64) as u32;
            let width = if opcode == Opcode::StoreImmIndU8 { 1 } else { 4 };
            write_width(ctx, addr, *imm2 as u64, width)?;
            Ok(StepResult::Continue)
        }

        (Opcode::StoreImmU8 | Opcode::StoreImmU32, InstructionArgs::TwoImm { imm1, imm2 }) => {
            let addr = *imm1 as u32;
            let width = if opcode == Opcode::StoreImmU8 { 1 } else { 4 };
            write_width(ctx, addr, *imm2 as u64, width)?;
            Ok(StepResult::Continue)
        }

        _ => unreachable!("execute_memory dispatched a mismatched opcode/shape pair"),
    }
}

fn load_width(opcode: Opcode) -> usize {
    match opcode {
        Opcode::LoadU8 | Opcode::LoadI8 => 1,
        Opcode::LoadU16 | Opcode::LoadI16 => 2,
        Opcode::LoadU32 | Opcode::LoadI32 => 4,
        Opcode::LoadU64 => 8,
        _ => unreachable!(),
    }
}

fn store_width(opcode: Opcode) -> usize {
    match opcode {
        Opcode::StoreU8 => 1,
        Opcode::StoreU16 => 2,
        Opcode::StoreU32 => 4,
        Opcode::StoreU64 => 8,
        _ => unreachable!(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::Z_P;
    use crate::memory::Memory;
    use crate::program::Program;

    fn ctx() -> ExecutionContext {
        let code = vec![Opcode::Trap as u8];
        let mask = vec![0b0000_0001];
        let mut blob = crate::codec::encode_nat(0);
        blob.push(0);
        blob.extend(crate::codec::encode_nat(code.len() as u64));
        blob.extend_from_slice(&code);
        blob.extend_from_slice(&mask);
        ExecutionContext::new(
            Program::decode(&blob).unwrap(),
            Memory::init_with_capacity(0, Z_P, 0, 0),
            1_000,
        )
    }

    #[test]
    fn store_then_load_u32_round_trips() {
        let mut c = ctx();
        let base = c.memory().layout().heap_base;
        c.set_reg(1, base as u64);
        c.set_reg(2, 0xDEADBEEF);
        execute_memory(
            &mut c,
            Opcode::StoreU32,
            &InstructionArgs::TwoRegOneImm { rd: 2, ra: 1, imm: 0 },
        )
        .unwrap();
        execute_memory(
            &mut c,
            Opcode::LoadU32,
            &InstructionArgs::TwoRegOneImm { rd: 3, ra: 1, imm: 0 },
        )
        .unwrap();
        assert_eq!(c.reg(3), 0xDEADBEEF);
    }

    #[test]
    fn load_i8_sign_extends() {
        let mut c = ctx();
        let base = c.memory().layout().heap_base;
        c.set_reg(1, base as u64);
        execute_memory(
            &mut c,
            Opcode::StoreImmU8,
            &InstructionArgs::TwoImm { imm1: base as i64, imm2: 0xFF },
        )
        .unwrap();
        execute_memory(
            &mut c,
            Opcode::LoadI8,
            &InstructionArgs::TwoRegOneImm { rd: 2, ra: 1, imm: 0 },
        )
        .unwrap();
        assert_eq!(c.reg(2) as i64, -1);
    }
}
