//! 32- and 64-bit integer arithmetic, register-register and register-immediate.

use crate::codec::sign_extend;
use crate::instruction::{InstructionArgs, Opcode};
use crate::interpreter::{ExecutionContext, Fault, StepResult};

fn word32(ctx: &ExecutionContext, r: u8) -> u32 {
    ctx.reg(r) as u32
}

fn div_u32(a: u32, b: u32) -> u32 {
    if b == 0 {
        u32::MAX
    } else {
        a / b
    }
}

fn div_s32(a: i32, b: i32) -> i32 {
    if b == 0 {
        -1
    } else if a == i32::MIN && b == -1 {
        a
    } else {
        a / b
    }
}

fn rem_u32(a: u32, b: u32) -> u32 {
    if b == 0 {
        a
    } else {
        a % b
    }
}

fn rem_s32(a: i32, b: i32) -> i32 {
    if b == 0 {
        a
    } else if a == i32::MIN && b == -1 {
        0
    } else {
        a % b
    }
}

fn div_u64(a: u64, b: u64) -> u64 {
    if b == 0 {
        u64::MAX
    } else {
        a / b
    }
}

fn div_s64(a: i64, b: i64) -> i64 {
    if b == 0 {
        -1
    } else if a == i64::MIN && b == -1 {
        a
    } else {
        a / b
    }
}

fn rem_u64(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        a % b
    }
}

fn rem_s64(a: i64, b: i64) -> i64 {
    if b == 0 {
        a
    } else if a == i64::MIN && b == -1 {
        0
    } else {
        a % b
    }
}

/// Sign-extend a 32-bit arithmetic result into the 64-bit register file, the
/// way a 64-bit machine with 32-bit word instructions reports results.
fn extend32(result: u32) -> u64 {
    sign_extend::<32>(result as u64) as u64
}

pub(crate) fn execute_arithmetic(
    ctx: &mut ExecutionContext,
    opcode: Opcode,
    args: &InstructionArgs,
) -> Result<StepResult, Fault> {
    match (opcode, args) {
        (
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::DivU | Opcode::DivS
            | Opcode::RemU | Opcode::RemS,
            InstructionArgs::ThreeReg { rd, ra, rb },
        ) => {
            let a = word32(ctx, *ra);
            let b = word32(ctx, *rb);
            let result = match opcode {
                Opcode::Add => a.wrapping_add(b),
                Opcode::Sub => a.wrapping_sub(b),
                Opcode::Mul => a.wrapping_mul(b),
                Opcode::DivU => div_u32(a, b),
                Opcode::DivS => div_s32(a as i32, b as i32) as u32,
                Opcode::RemU => rem_u32(a, b),
                Opcode::RemS => rem_s32(a as i32, b as i32) as u32,
                _ => unreachable!(),
            };
            ctx.set_reg(*rd, extend32(result));
            Ok(StepResult::Continue)
        }

        (
            Opcode::Add64 | Opcode::Sub64 | Opcode::Mul64 | Opcode::DivU64 | Opcode::DivS64
            | Opcode::RemU64 | Opcode::RemS64,
            InstructionArgs::ThreeReg { rd, ra, rb },
        ) => {
            let a = ctx.reg(*ra);
            let b = ctx.reg(*rb);
            let result = match opcode {
                Opcode::Add64 => a.wrapping_add(b),
                Opcode::Sub64 => a.wrapping_sub(b),
                Opcode::Mul64 => a.wrapping_mul(b),
                Opcode::DivU64 => div_u64(a, b),
                Opcode::DivS64 => div_s64(a as i64, b as i64) as u64,
                Opcode::RemU64 => rem_u64(a, b),
                Opcode::RemS64 => rem_s64(a as i64, b as i64) as u64,
                _ => unreachable!(),
            };
            ctx.set_reg(*rd, result);
            Ok(StepResult::Continue)
        }

        (
            Opcode::AddImm | Opcode::SubImm | Opcode::MulImm,
            InstructionArgs::TwoRegOneImm { rd, ra, imm },
        ) => {
            let a = word32(ctx, *ra);
            let imm = *imm as u32;
            let result = match opcode {
                Opcode::AddImm => a.wrapping_add(imm),
                Opcode::SubImm => a.wrapping_sub(imm),
                Opcode::MulImm => a.wrapping_mul(imm),
                _ => unreachable!(),
            };
            ctx.set_reg(*rd, extend32(result));
            Ok(StepResult::Continue)
        }

        (
            Opcode::AddImm64 | Opcode::MulImm64,
            InstructionArgs::TwoRegOneImm { rd, ra, imm },
        ) => {
            let a = ctx.reg(*ra);
            let imm = *imm as u64;
            let result = match opcode {
                Opcode::AddImm64 => a.wrapping_add(imm),
                Opcode::MulImm64 => a.wrapping_mul(imm),
                _ => unreachable!(),
            };
            ctx.set_reg(*rd, result);
            Ok(StepResult::Continue)
        }

        (
            Opcode::MulUpperUU | Opcode::MulUpperSS | Opcode::MulUpperSU,
            InstructionArgs::ThreeReg { rd, ra, rb },
        ) => {
            let a = ctx.reg(*ra);
            let b = ctx.reg(*rb);
            let upper = match opcode {
                Opcode::MulUpperUU => ((a as u128 * b as u128) >> 64) as u64,
                Opcode::MulUpperSS => (((a as i64 as i128) * (b as i64 as i128)) >> 64) as u64,
                Opcode::MulUpperSU => (((a as i64 as i128) * (b as u128 as i128)) >> 64) as u64,
                _ => unreachable!(),
            };
            ctx.set_reg(*rd, upper);
            Ok(StepResult::Continue)
        }

        _ => unreachable!("execute_arithmetic dispatched a mismatched opcode/shape pair"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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
            Memory::init_with_capacity(0, 0, 0, 0),
            1_000,
        )
    }

    #[test]
    fn div_by_zero_is_saturating_not_panicking() {
        assert_eq!(div_u32(5, 0), u32::MAX);
        assert_eq!(div_s32(5, 0), -1);
        assert_eq!(rem_u32(5, 0), 5);
    }

    #[test]
    fn add_wraps_and_sign_extends() {
        let mut c = ctx();
        c.set_reg(1, u32::MAX as u64);
        c.set_reg(2, 1);
        execute_arithmetic(
            &mut c,
            Opcode::Add,
            &InstructionArgs::ThreeReg { rd: 3, ra: 1, rb: 2 },
        )
        .unwrap();
        assert_eq!(c.reg(3), 0);
    }
}
