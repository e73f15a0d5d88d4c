//! Linear-sweep disassembly

use std::time::Instant;

use super::{Disassembly, Strategy};
use crate::{Address, Session};

/// Decodes instructions back to back from the start of `code` until the buffer ends, the
/// limit is reached, or a byte sequence fails to decode.
pub fn run(session: &Session, code: &[u8], address: Address, max_instructions: usize) -> Disassembly {
    let start_time = Instant::now();

    let mut disasm = session.disassemble(code, address, max_instructions);
    let instructions: Vec<_> = disasm.by_ref().collect();
    let stopped = disasm.stop_reason().cloned();
    if let Some(e) = &stopped {
        log::warn!(
            "linear sweep stopped at 0x{:x} after {} instructions: {}",
            disasm.address(),
            instructions.len(),
            e
        );
    }

    log::info!(
        "linear sweep decoded {} instructions from {} bytes in {:?}",
        instructions.len(),
        disasm.offset(),
        start_time.elapsed()
    );

    Disassembly {
        architecture: session.architecture(),
        strategy: Strategy::Linear,
        address,
        instructions,
        stopped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Architecture, DecodeError, Mode};

    #[test]
    fn test_records_stop_reason() {
        let session = Session::open(Architecture::X86, Mode::MODE_64).unwrap();
        // push rbp, then a truncated mov
        let result = run(&session, &[0x55, 0x48, 0x8b, 0x05, 0xb8], 0x1000, 0);
        assert_eq!(result.instructions.len(), 1);
        assert!(matches!(
            result.stopped,
            Some(DecodeError::TruncatedInstruction(_))
        ));
        assert_eq!(result.end_address(), 0x1001);
    }

    #[test]
    fn test_limit() {
        let session = Session::open(Architecture::X86, Mode::MODE_64).unwrap();
        let result = run(&session, &[0x90; 16], 0, 3);
        assert_eq!(result.instructions.len(), 3);
        assert!(result.stopped.is_none());
    }
}
