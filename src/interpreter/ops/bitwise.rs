//! Bitwise register and register-immediate operations.

use crate::instruction::{InstructionArgs, Opcode};
use crate::interpreter::{ExecutionContext, Fault, StepResult};

pub(crate) fn execute_bitwise(
    ctx: &mut ExecutionContext,
    opcode: Opcode,
    args: &InstructionArgs,
) -> Result<StepResult, Fault> {
    match (opcode, args) {
        (
            Opcode::And | Opcode::Or | Opcode::Xor,
            InstructionArgs::ThreeReg { rd, ra, rb },
        ) => {
            let a = ctx.reg(*ra);
            let b = ctx.reg(*rb);
            let result = match opcode {
                Opcode::And => a & b,
                Opcode::Or => a | b,
                Opcode::Xor => a ^ b,
                _ => unreachable!(),
            };
            ctx.set_reg(*rd, result);
            Ok(StepResult::Continue)
        }

        (
            Opcode::AndImm | Opcode::OrImm | Opcode::XorImm,
            InstructionArgs::TwoRegOneImm { rd, ra, imm },
        ) => {
            let a = ctx.reg(*ra);
            let imm = *imm as u64;
            let result = match opcode {
                Opcode::AndImm => a & imm,
                Opcode::OrImm => a | imm,
                Opcode::XorImm => a ^ imm,
                _ => unreachable!(),
            };
            ctx.set_reg(*rd, result);
            Ok(StepResult::Continue)
        }

        _ => unreachable!("execute_bitwise dispatched a mismatched opcode/shape pair"),
    }
}
