//! Superset disassembly: every byte offset is a candidate instruction start.

use std::time::Instant;

use rayon::prelude::*;

use super::{Disassembly, Strategy};
use crate::{Address, Instruction, Session};

/// Decodes one instruction at each offset of `code` in parallel. Offsets that fail to decode
/// are dropped; the result is sorted by address and overlapping candidates are kept.
pub fn run(session: &Session, code: &[u8], address: Address, max_instructions: usize) -> Disassembly {
    let start_time = Instant::now();

    let mut instructions: Vec<Instruction> = (0..code.len())
        .into_par_iter()
        .filter_map(|offset| {
            session
                .decode_at(&code[offset..], address.wrapping_add(offset as Address))
                .ok()
        })
        .collect();
    if max_instructions != 0 {
        instructions.truncate(max_instructions);
    }

    let elapsed = start_time.elapsed();
    log::info!(
        "superset decoded {} candidates from {} offsets in {:?}",
        instructions.len(),
        code.len(),
        elapsed
    );

    Disassembly {
        architecture: session.architecture(),
        strategy: Strategy::Superset,
        address,
        instructions,
        stopped: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Architecture, Mode};

    #[test]
    fn test_every_offset() {
        let session = Session::open(Architecture::X86, Mode::MODE_64).unwrap();
        // mov eax, 0x90909090
        let code = [0xb8, 0x90, 0x90, 0x90, 0x90];
        let result = run(&session, &code, 0x1000, 0);

        let addresses: Vec<Address> = result.instructions.iter().map(|i| i.address).collect();
        assert_eq!(addresses, [0x1000, 0x1001, 0x1002, 0x1003, 0x1004]);
        assert_eq!(result.instructions[0].mnemonic, "mov");
        assert!(result.instructions[1..].iter().all(|i| i.mnemonic == "nop"));
    }

    #[test]
    fn test_skips_undecodable_offsets() {
        let session = Session::open(Architecture::Tms320c64x, Mode::empty()).unwrap();
        // one nop word: only offset 0 has four bytes left
        let result = run(&session, &[0, 0, 0, 0], 0, 0);
        assert_eq!(result.instructions.len(), 1);
        assert_eq!(result.instructions[0].mnemonic, "nop");
    }

    #[test]
    fn test_limit_keeps_lowest_addresses() {
        let session = Session::open(Architecture::X86, Mode::MODE_64).unwrap();
        let result = run(&session, &[0x90; 32], 0, 4);
        assert_eq!(result.instructions.len(), 4);
        assert_eq!(result.instructions[3].address, 3);
    }
}
