//! Basic-block derivation: a single forward walk over the code that both
//! validates every instruction's form and records the fall-through point after
//! every terminator (spec §3 Program, §4.2 Program Decoder).

use super::{Program, ProgramError};

pub fn derive(program: &Program) -> Result<Vec<u32>, ProgramError> {
    let code_len = program.code().len() as u32;
    let mut blocks = vec![0u32];
    let mut pc = 0u32;

    while pc < code_len {
        let instr = program.decode_instruction_at(pc)?;
        let next_pc = pc + 1 + instr.skip as u32;

        if instr.opcode.is_terminator() && next_pc < code_len {
            blocks.push(next_pc);
        }

        pc = next_pc;
    }

    blocks.dedup();
    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Opcode;

    fn program_from(code: Vec<u8>) -> Program {
        let mask_len = (code.len() + 7) / 8;
        let mut mask = vec![0u8; mask_len];
        // Every opcode in these tests is zero-argument, so every byte starts
        // an instruction.
        for (i, byte) in mask.iter_mut().enumerate() {
            let bits_here = (code.len() - i * 8).min(8);
            *byte = (0xFFu16 >> (8 - bits_here)) as u8;
        }
        Program::decode(&{
            let mut blob = crate::codec::encode_nat(0);
            blob.push(0);
            blob.extend(crate::codec::encode_nat(code.len() as u64));
            blob.extend_from_slice(&code);
            blob.extend_from_slice(&mask);
            blob
        })
        .unwrap()
    }

    #[test]
    fn every_terminator_opens_a_new_block() {
        let code = vec![Opcode::Fallthrough as u8, Opcode::Trap as u8];
        let program = program_from(code);
        assert_eq!(program.basic_blocks(), &[0, 1]);
    }

    #[test]
    fn first_block_is_always_zero() {
        let code = vec![Opcode::Trap as u8];
        let program = program_from(code);
        assert_eq!(program.basic_blocks()[0], 0);
    }
}
