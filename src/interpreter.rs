//! The execution core: register file, memory, gas accounting, and the
//! fetch-charge-execute-advance dispatch loop (spec §3 ExecutionContext,
//! §4.4 Execution Core).

pub mod gas;
pub mod host;
mod ops;
mod termination;

pub use host::{HostCall, HostCallOutcome, HostCallTable, InvocationException};
pub use termination::{PanicReason, Termination};

use tracing::{instrument, trace};

use crate::consts::{HALT_PC, MAX_REGISTER_INDEX, REGISTER_COUNT};
use crate::instruction::{InstructionArgs, Opcode};
use crate::memory::{Memory, MemoryError};
use crate::program::Program;

/// What a successfully executed instruction does to control flow.
pub(crate) enum StepResult {
    Continue,
    Jump(u32),
    Halt,
}

/// Why an instruction could not complete.
#[derive(Debug)]
pub(crate) enum Fault {
    Trap,
    PcUnderflow,
    InvalidJump,
    Memory(MemoryError),
    HostCall(u32, InvocationException),
}

impl From<MemoryError> for Fault {
    fn from(e: MemoryError) -> Self {
        Fault::Memory(e)
    }
}

/// The last fault recorded on the context, for diagnostics (spec §3
/// ExecutionContext: `error_data`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorData {
    PageFault(u32),
    HostCall(u32),
}

/// Owns everything a running program needs: its code, register file, memory,
/// host-call table, and gas meter.
pub struct ExecutionContext {
    program: Program,
    registers: [u64; REGISTER_COUNT],
    memory: Memory,
    host_calls: HostCallTable,
    gas: i64,
    pc: u32,
    error_data: Option<ErrorData>,
}

impl ExecutionContext {
    pub fn new(program: Program, memory: Memory, initial_gas: i64) -> ExecutionContext {
        ExecutionContext {
            program,
            registers: [0u64; REGISTER_COUNT],
            memory,
            host_calls: HostCallTable::new(),
            gas: initial_gas,
            pc: 0,
            error_data: None,
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn reg(&self, index: u8) -> u64 {
        self.registers[index.min(MAX_REGISTER_INDEX) as usize]
    }

    pub fn set_reg(&mut self, index: u8, value: u64) {
        self.registers[index.min(MAX_REGISTER_INDEX) as usize] = value;
    }

    pub fn registers(&self) -> &[u64; REGISTER_COUNT] {
        &self.registers
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn set_pc(&mut self, pc: u32) {
        self.pc = pc;
    }

    pub fn pc(&self) -> u32 {
        self.pc
    }

    pub fn gas(&self) -> i64 {
        self.gas
    }

    pub fn error_data(&self) -> Option<ErrorData> {
        self.error_data
    }

    pub fn register_host_call(&mut self, id: u32, handler: Box<dyn HostCall>) {
        self.host_calls.insert(id, handler);
    }

    /// Run the dispatch loop to completion (spec §4.4 "Dispatch loop").
    #[instrument(skip(self), fields(pc = self.pc))]
    pub fn run(&mut self) -> Termination {
        loop {
            if self.pc == HALT_PC {
                return Termination::Halt;
            }

            let instr = match self.program.decode_instruction_at(self.pc) {
                Ok(instr) => instr,
                Err(_) => return Termination::Panic(PanicReason::InvalidInstruction),
            };

            let charge = gas::cost_of(instr.opcode);
            self.gas -= charge;
            if self.gas < 0 {
                self.gas = 0;
                return Termination::OutOfGas;
            }

            trace!(opcode = ?instr.opcode, pc = self.pc, "step");

            match self.execute(instr.opcode, &instr.args) {
                Ok(StepResult::Continue) => {
                    self.pc += 1 + instr.skip as u32;
                }
                Ok(StepResult::Jump(new_pc)) => {
                    self.pc = new_pc;
                }
                Ok(StepResult::Halt) => return Termination::Halt,
                Err(Fault::Trap) => return Termination::Panic(PanicReason::Trap),
                Err(Fault::PcUnderflow) => return Termination::Panic(PanicReason::PcUnderflow),
                Err(Fault::InvalidJump) => {
                    return Termination::Panic(PanicReason::InvalidJumpDestination)
                }
                Err(Fault::Memory(MemoryError::PageFault(addr))) => {
                    self.error_data = Some(ErrorData::PageFault(addr));
                    return Termination::PageFault(addr);
                }
                Err(Fault::Memory(_)) => {
                    return Termination::Panic(PanicReason::InvalidInstruction)
                }
                Err(Fault::HostCall(id, _exception)) => {
                    self.error_data = Some(ErrorData::HostCall(id));
                    return Termination::HostCall(id);
                }
            }
        }
    }

    fn execute(&mut self, opcode: Opcode, args: &InstructionArgs) -> Result<StepResult, Fault> {
        use Opcode::*;
        match opcode {
            Trap | Fallthrough | Ecalli => ops::execute_system(self, opcode, args),

            Jump | JumpInd | LoadImm | LoadImmJump | LoadImmJumpInd | BranchEq | BranchNe
            | BranchLtU | BranchLtS | BranchGeU | BranchGeS | BranchEqImm | BranchNeImm
            | BranchLtUImm | BranchLtSImm | BranchGeUImm | BranchGeSImm => {
                ops::execute_branching(self, opcode, args)
            }

            Add | Sub | Mul | DivU | DivS | RemU | RemS | Add64 | Sub64 | Mul64 | DivU64
            | DivS64 | RemU64 | RemS64 | AddImm | SubImm | MulImm | AddImm64 | MulImm64
            | MulUpperUU | MulUpperSS | MulUpperSU => ops::execute_arithmetic(self, opcode, args),

            And | Or | Xor | AndImm | OrImm | XorImm => ops::execute_bitwise(self, opcode, args),

            ShiftL | ShiftRU | ShiftRS | ShiftLImm | ShiftRUImm | ShiftRSImm | RotL | RotR
            | RotLImm | RotRImm => ops::execute_shift(self, opcode, args),

            SetLtU | SetLtS | SetGeU | SetGeS | SetLtUImm | SetLtSImm | Min | MaxOp | MinU
            | MaxU => ops::execute_comparison(self, opcode, args),

            Move | Not | Neg => ops::execute_register(self, opcode, args),

            LoadU8 | LoadI8 | LoadU16 | LoadI16 | LoadU32 | LoadI32 | LoadU64 | StoreU8
            | StoreU16 | StoreU32 | StoreU64 | LoadImmIndU8 | LoadImmIndU32 | StoreImmIndU8
            | StoreImmIndU32 | StoreImmU8 | StoreImmU32 => ops::execute_memory(self, opcode, args),
        }
    }

    /// `r7`/`r8` describe the halt-time return slice (spec §4.4 "Return value
    /// convention"): if the slice is valid, return it, else an empty vec.
    pub fn return_value(&mut self) -> Vec<u8> {
        use crate::consts::{REG_RESULT_ADDR, REG_RESULT_LEN};
        let addr = self.registers[REG_RESULT_ADDR] as u32;
        let len = self.registers[REG_RESULT_LEN] as u32;
        if len == 0 {
            return Vec::new();
        }
        self.memory
            .read_slice(addr, len as usize)
            .unwrap_or_default()
    }
}

/// Compute the post-branch program counter: `pc +% offset` for `offset >= 0`,
/// else `pc - |offset|` with underflow fatal (spec §4.4 `updatePc`).
pub(crate) fn update_pc(pc: u32, offset: i64) -> Result<u32, Fault> {
    if offset >= 0 {
        Ok(pc.wrapping_add(offset as u32))
    } else {
        pc.checked_sub((-offset) as u32).ok_or(Fault::PcUnderflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Memory;
    use crate::program::Program;

    fn halting_program() -> Program {
        let code = vec![Opcode::Trap as u8];
        let mask = vec![0b0000_0001];
        let mut blob = crate::codec::encode_nat(0);
        blob.push(0);
        blob.extend(crate::codec::encode_nat(code.len() as u64));
        blob.extend_from_slice(&code);
        blob.extend_from_slice(&mask);
        Program::decode(&blob).unwrap()
    }

    #[test]
    fn trap_terminates_with_panic() {
        let mut ctx = ExecutionContext::new(
            halting_program(),
            Memory::init_with_capacity(0, 0, 0, 0),
            100,
        );
        assert_eq!(ctx.run(), Termination::Panic(PanicReason::Trap));
    }

    #[test]
    fn update_pc_rejects_underflow() {
        assert!(matches!(update_pc(0, -1), Err(Fault::PcUnderflow)));
        assert_eq!(update_pc(10, -4).unwrap(), 6);
        assert_eq!(update_pc(10, 4).unwrap(), 14);
    }
}
