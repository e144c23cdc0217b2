//! Set-on-compare, min, and max operations.

use crate::instruction::{InstructionArgs, Opcode};
use crate::interpreter::{ExecutionContext, Fault, StepResult};

pub(crate) fn execute_comparison(
    ctx: &mut ExecutionContext,
    opcode: Opcode,
    args: &InstructionArgs,
) -> Result<StepResult, Fault> {
    match (opcode, args) {
        (
            Opcode::SetLtU | Opcode::SetLtS | Opcode::SetGeU | Opcode::SetGeS | Opcode::Min
            | Opcode::MaxOp | Opcode::MinU | Opcode::MaxU,
            InstructionArgs::ThreeReg { rd, ra, rb },
        ) => {
            let a = ctx.reg(*ra);
            let b = ctx.reg(*rb);
            let result = match opcode {
                Opcode::SetLtU => (a < b) as u64,
                Opcode::SetLtS => ((a as i64) < (b as i64)) as u64,
                Opcode::SetGeU => (a >= b) as u64,
                Opcode::SetGeS => ((a as i64) >= (b as i64)) as u64,
                Opcode::Min => (a as i64).min(b as i64) as u64,
                Opcode::MaxOp => (a as i64).max(b as i64) as u64,
                Opcode::MinU => a.min(b),
                Opcode::MaxU => a.max(b),
                _ => unreachable!(),
            };
            ctx.set_reg(*rd, result);
            Ok(StepResult::Continue)
        }

        (
            Opcode::SetLtUImm | Opcode::SetLtSImm,
            InstructionArgs::TwoRegOneImm { rd, ra, imm },
        ) => {
            let a = ctx.reg(*ra);
            let result = match opcode {
                Opcode::SetLtUImm => (a < *imm as u64) as u64,
                Opcode::SetLtSImm => ((a as i64) < *imm) as u64,
                _ => unreachable!(),
            };
            ctx.set_reg(*rd, result);
            Ok(StepResult::Continue)
        }

        _ => unreachable!("execute_comparison dispatched a mismatched opcode/shape pair"),
    }
}
