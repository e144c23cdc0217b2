//! Logical/arithmetic shifts and rotations, register-register and
//! register-immediate, operating on the low 32 bits of each operand.

use crate::codec::sign_extend;
use crate::instruction::{InstructionArgs, Opcode};
use crate::interpreter::{ExecutionContext, Fault, StepResult};

fn extend32(result: u32) -> u64 {
    sign_extend::<32>(result as u64) as u64
}

fn shift_amount(value: u64) -> u32 {
    (value as u32) & 0x1F
}

pub(crate) fn execute_shift(
    ctx: &mut ExecutionContext,
    opcode: Opcode,
    args: &InstructionArgs,
) -> Result<StepResult, Fault> {
    match (opcode, args) {
        (
            Opcode::ShiftL | Opcode::ShiftRU | Opcode::ShiftRS | Opcode::RotL | Opcode::RotR,
            InstructionArgs::ThreeReg { rd, ra, rb },
        ) => {
            let a = ctx.reg(*ra) as u32;
            let amount = shift_amount(ctx.reg(*rb));
            let result = apply(opcode, a, amount);
            ctx.set_reg(*rd, extend32(result));
            Ok(StepResult::Continue)
        }

        (
            Opcode::ShiftLImm | Opcode::ShiftRUImm | Opcode::ShiftRSImm | Opcode::RotLImm
            | Opcode::RotRImm,
            InstructionArgs::TwoRegOneImm { rd, ra, imm },
        ) => {
            let a = ctx.reg(*ra) as u32;
            let amount = shift_amount(*imm as u64);
            let result = apply(
                match opcode {
                    Opcode::ShiftLImm => Opcode::ShiftL,
                    Opcode::ShiftRUImm => Opcode::ShiftRU,
                    Opcode::ShiftRSImm => Opcode::ShiftRS,
                    Opcode::RotLImm => Opcode::RotL,
                    Opcode::RotRImm => Opcode::RotR,
                    _ => unreachable!(),
                },
                a,
                amount,
            );
            ctx.set_reg(*rd, extend32(result));
            Ok(StepResult::Continue)
        }

        _ => unreachable!("execute_shift dispatched a mismatched opcode/shape pair"),
    }
}

fn apply(opcode: Opcode, a: u32, amount: u32) -> u32 {
    match opcode {
        Opcode::ShiftL => a.wrapping_shl(amount),
        Opcode::ShiftRU => a.wrapping_shr(amount),
        Opcode::ShiftRS => ((a as i32).wrapping_shr(amount)) as u32,
        Opcode::RotL => a.rotate_left(amount),
        Opcode::RotR => a.rotate_right(amount),
        _ => unreachable!(),
    }
}
