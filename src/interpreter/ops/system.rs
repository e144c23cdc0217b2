//! `trap`, `fallthrough`, and the host-call instruction (spec §4.4 Execution
//! Core: "Host-call trampoline").

use crate::instruction::{InstructionArgs, Opcode};
use crate::interpreter::host::{HostCallOutcome, InvocationException};
use crate::interpreter::{ExecutionContext, Fault, StepResult};

pub(crate) fn execute_system(
    ctx: &mut ExecutionContext,
    opcode: Opcode,
    args: &InstructionArgs,
) -> Result<StepResult, Fault> {
    match opcode {
        Opcode::Trap => Err(Fault::Trap),
        Opcode::Fallthrough => Ok(StepResult::Continue),
        Opcode::Ecalli => {
            let id = match *args {
                InstructionArgs::OneImm { imm } => imm as u32,
                _ => 0,
            };
            match ctx.host_calls.remove(&id) {
                Some(mut handler) => {
                    let outcome = handler.call(ctx);
                    ctx.host_calls.insert(id, handler);
                    match outcome {
                        HostCallOutcome::Play => Ok(StepResult::Continue),
                        HostCallOutcome::Terminal(exception) => {
                            Err(Fault::HostCall(id, exception))
                        }
                    }
                }
                None => Err(Fault::HostCall(
                    id,
                    InvocationException::Custom("no handler registered for call id".into()),
                )),
            }
        }
        _ => unreachable!("execute_system dispatched a non-system opcode"),
    }
}
