//! Gas accounting: a cost table keyed by instruction category (spec §4.4
//! Execution Core; idiom grounded on the teacher's `GasUnit` cost-table split).

use crate::instruction::Opcode;

/// A named class of gas cost, mirroring how the teacher groups opcodes by the
/// resource they consume rather than pricing each opcode individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasUnit {
    Base,
    Branch,
    MemoryAccess,
    HostCall,
}

impl GasUnit {
    pub const fn cost(self) -> i64 {
        match self {
            GasUnit::Base => 1,
            GasUnit::Branch => 1,
            GasUnit::MemoryAccess => 2,
            GasUnit::HostCall => 10,
        }
    }
}

/// The gas charged for executing `opcode`, independent of its decoded
/// arguments.
pub const fn cost_of(opcode: Opcode) -> i64 {
    use Opcode::*;
    match opcode {
        Ecalli => GasUnit::HostCall.cost(),

        Jump | JumpInd | LoadImmJump | LoadImmJumpInd | BranchEq | BranchNe | BranchLtU
        | BranchLtS | BranchGeU | BranchGeS | BranchEqImm | BranchNeImm | BranchLtUImm
        | BranchLtSImm | BranchGeUImm | BranchGeSImm => GasUnit::Branch.cost(),

        LoadU8 | LoadI8 | LoadU16 | LoadI16 | LoadU32 | LoadI32 | LoadU64 | StoreU8
        | StoreU16 | StoreU32 | StoreU64 | LoadImmIndU8 | LoadImmIndU32 | StoreImmIndU8
        | StoreImmIndU32 | StoreImmU8 | StoreImmU32 => GasUnit::MemoryAccess.cost(),

        _ => GasUnit::Base.cost(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_calls_cost_more_than_arithmetic() {
        assert!(cost_of(Opcode::Ecalli) > cost_of(Opcode::Add));
    }

    #[test]
    fn memory_access_costs_more_than_base() {
        assert!(cost_of(Opcode::LoadU32) > cost_of(Opcode::Move));
    }
}
