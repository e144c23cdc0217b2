//! Indirect jump address validation (spec §4.2 Indirect jump validation).

use crate::consts::{HALT_PC, Z_A};
use thiserror::Error;

/// Failure modes for resolving a runtime indirect-jump address through the
/// jump table.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum JumpError {
    #[error("jump address is the halt sentinel")]
    JumpAddressHalt,
    #[error("jump address is zero")]
    JumpAddressZero,
    #[error("jump address exceeds the jump table's address range")]
    JumpAddressOutOfRange,
    #[error("jump address is not a multiple of the jump alignment")]
    JumpAddressNotAligned,
    #[error("jump table entry does not point at a basic-block start")]
    JumpAddressNotInBasicBlock,
}

/// Resolve `address` through `jump_table`, returning the target code offset.
pub fn validate(address: u32, jump_table: &[u32], basic_blocks: &[u32]) -> Result<u32, JumpError> {
    if address == HALT_PC {
        return Err(JumpError::JumpAddressHalt);
    }
    if address == 0 {
        return Err(JumpError::JumpAddressZero);
    }
    if address > jump_table.len() as u32 * Z_A {
        return Err(JumpError::JumpAddressOutOfRange);
    }
    if address % Z_A != 0 {
        return Err(JumpError::JumpAddressNotAligned);
    }
    let index = (address / Z_A - 1) as usize;
    let dest = jump_table[index];
    if basic_blocks.binary_search(&dest).is_err() {
        return Err(JumpError::JumpAddressNotInBasicBlock);
    }
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_scenario() {
        let jump_table = [10, 20];
        let basic_blocks = [0, 10, 20];
        assert_eq!(validate(2, &jump_table, &basic_blocks), Ok(10));
        assert_eq!(validate(4, &jump_table, &basic_blocks), Ok(20));
        assert_eq!(
            validate(1, &jump_table, &basic_blocks),
            Err(JumpError::JumpAddressNotAligned)
        );
        assert_eq!(
            validate(6, &jump_table, &basic_blocks),
            Err(JumpError::JumpAddressOutOfRange)
        );
        assert_eq!(
            validate(0, &jump_table, &basic_blocks),
            Err(JumpError::JumpAddressZero)
        );
        assert_eq!(
            validate(HALT_PC, &jump_table, &basic_blocks),
            Err(JumpError::JumpAddressHalt)
        );
    }
}
