//! Single-operand register moves.

use crate::instruction::{InstructionArgs, Opcode};
use crate::interpreter::{ExecutionContext, Fault, StepResult};

pub(crate) fn execute_register(
    ctx: &mut ExecutionContext,
    opcode: Opcode,
    args: &InstructionArgs,
) -> Result<StepResult, Fault> {
    match (opcode, args) {
        (Opcode::Move, InstructionArgs::TwoReg { rd, ra }) => {
            ctx.set_reg(*rd, ctx.reg(*ra));
            Ok(StepResult::Continue)
        }
        (Opcode::Not, InstructionArgs::TwoReg { rd, ra }) => {
            ctx.set_reg(*rd, !ctx.reg(*ra));
            Ok(StepResult::Continue)
        }
        (Opcode::Neg, InstructionArgs::TwoReg { rd, ra }) => {
            ctx.set_reg(*rd, (ctx.reg(*ra) as i64).wrapping_neg() as u64);
            Ok(StepResult::Continue)
        }
        _ => unreachable!("execute_register dispatched a mismatched opcode/shape pair"),
    }
}
