//! Jumps, indirect jumps, immediate loads, and conditional branches (spec
//! §4.4 Execution Core: `updatePc`, indirect jump validation).

use crate::instruction::{InstructionArgs, Opcode};
use crate::interpreter::{update_pc, ExecutionContext, Fault, StepResult};

fn resolve_indirect(ctx: &ExecutionContext, address: u32) -> Result<u32, Fault> {
    ctx.program().validate_jump(address).map_err(|_| Fault::InvalidJump)
}

pub(crate) fn execute_branching(
    ctx: &mut ExecutionContext,
    opcode: Opcode,
    args: &InstructionArgs,
) -> Result<StepResult, Fault> {
    match (opcode, args) {
        (Opcode::Jump, InstructionArgs::OneOffset { offset }) => {
            Ok(StepResult::Jump(update_pc(ctx.pc(), *offset)?))
        }

        (Opcode::JumpInd, InstructionArgs::OneRegOneImm { ra, imm }) => {
            let address = ctx.reg(*ra).wrapping_add(*imm as u64) as u32;
            Ok(StepResult::Jump(resolve_indirect(ctx, address)?))
        }

        (Opcode::LoadImm, InstructionArgs::OneRegOneImm { ra, imm }) => {
            ctx.set_reg(*ra, *imm as u64);
            Ok(StepResult::Continue)
        }

        (
            Opcode::LoadImmJump,
            InstructionArgs::OneRegOneImmOneOffset { ra, imm, offset },
        ) => {
            ctx.set_reg(*ra, *imm as u64);
            Ok(StepResult::Jump(update_pc(ctx.pc(), *offset)?))
        }

        (
            Opcode::LoadImmJumpInd,
            InstructionArgs::TwoRegTwoImm { ra, rb, imm1, imm2 },
        ) => {
            ctx.set_reg(*ra, *imm1 as u64);
            let address = ctx.reg(*rb).wrapping_add(*imm2 as u64) as u32;
            Ok(StepResult::Jump(resolve_indirect(ctx, address)?))
        }

        (
            Opcode::BranchEq | Opcode::BranchNe | Opcode::BranchLtU | Opcode::BranchLtS
            | Opcode::BranchGeU | Opcode::BranchGeS,
            InstructionArgs::TwoRegOneOffset { ra, rb, offset },
        ) => {
            let a = ctx.reg(*ra);
            let b = ctx.reg(*rb);
            let taken = match opcode {
                Opcode::BranchEq => a == b,
                Opcode::BranchNe => a != b,
                Opcode::BranchLtU => a < b,
                Opcode::BranchLtS => (a as i64) < (b as i64),
                Opcode::BranchGeU => a >= b,
                Opcode::BranchGeS => (a as i64) >= (b as i64),
                _ => unreachable!(),
            };
            branch(ctx, taken, *offset)
        }

        (
            Opcode::BranchEqImm | Opcode::BranchNeImm | Opcode::BranchLtUImm
            | Opcode::BranchLtSImm | Opcode::BranchGeUImm | Opcode::BranchGeSImm,
            InstructionArgs::OneRegOneImmOneOffset { ra, imm, offset },
        ) => {
            let a = ctx.reg(*ra);
            let taken = match opcode {
                Opcode::BranchEqImm => a as i64 == *imm,
                Opcode::BranchNeImm => a as i64 != *imm,
                Opcode::BranchLtUImm => a < *imm as u64,
                Opcode::BranchLtSImm => (a as i64) < *imm,
                Opcode::BranchGeUImm => a >= *imm as u64,
                Opcode::BranchGeSImm => (a as i64) >= *imm,
                _ => unreachable!(),
            };
            branch(ctx, taken, *offset)
        }

        _ => unreachable!("execute_branching dispatched a mismatched opcode/shape pair"),
    }
}

fn branch(ctx: &ExecutionContext, taken: bool, offset: i64) -> Result<StepResult, Fault> {
    if taken {
        Ok(StepResult::Jump(update_pc(ctx.pc(), offset)?))
    } else {
        Ok(StepResult::Continue)
    }
}
