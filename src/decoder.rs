//! The per-architecture decode capability and its error type.
//!
//! A [`crate::session::Session`] selects one [`ArchDecoder`] when it is opened and drives it
//! one instruction at a time. Decoders are stateless unit structs over process-wide
//! read-only tables, so the same instance is shared by every session and thread.

use crate::arch::{aarch64, arm, evm, m680x, m68k, mips, ppc, sparc, sysz, tms320c64x, x86, xcore};
use crate::arch::{Architecture, Mode, Syntax};
use crate::cursor::{Cursor, OutOfBounds};
use crate::detail::DetailParts;
use crate::{Address, Instruction};

/// Why a single instruction could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Fewer bytes remain than the encoding needs.
    #[error("truncated instruction: {0}")]
    TruncatedInstruction(OutOfBounds),

    /// The bytes do not form a valid instruction in this mode.
    #[error("invalid encoding")]
    InvalidEncoding,

    /// The decoder recognised the encoding but does not implement it for this mode.
    #[error("{0} does not decode this encoding in mode {1:?}")]
    UnsupportedMode(Architecture, Mode),
}

/// Session settings visible to a decode procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeConfig {
    pub mode: Mode,
    pub syntax: Syntax,
    pub detail: bool,
}

impl DecodeConfig {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            syntax: Syntax::Default,
            detail: false,
        }
    }
}

/// State carried from one instruction to the next within a single disassembly call.
#[derive(Debug, Clone, Default)]
pub struct StreamState {
    pub(crate) it_block: arm::ItBlock,
}

/// Decodes one instruction of a specific architecture.
pub trait ArchDecoder: Send + Sync {
    fn architecture(&self) -> Architecture;

    /// Decodes exactly one instruction starting at the cursor.
    ///
    /// On success the cursor has advanced past the instruction; on failure its position is
    /// unspecified and the caller stops.
    fn decode_one(
        &self,
        cursor: &mut Cursor<'_>,
        address: Address,
        config: &DecodeConfig,
        state: &mut StreamState,
    ) -> Result<Instruction, DecodeError>;
}

/// Selects the decoder for `arch`.
pub fn for_architecture(arch: Architecture) -> &'static dyn ArchDecoder {
    match arch {
        Architecture::X86 => &x86::X86Decoder,
        Architecture::Arm => &arm::ArmDecoder,
        Architecture::Arm64 => &aarch64::Arm64Decoder,
        Architecture::Mips => &mips::MipsDecoder,
        Architecture::Ppc => &ppc::PpcDecoder,
        Architecture::Sparc => &sparc::SparcDecoder,
        Architecture::SysZ => &sysz::SysZDecoder,
        Architecture::XCore => &xcore::XCoreDecoder,
        Architecture::M68k => &m68k::M68kDecoder,
        Architecture::M680x => &m680x::M680xDecoder,
        Architecture::Tms320c64x => &tms320c64x::Tms320c64xDecoder,
        Architecture::Evm => &evm::EvmDecoder,
    }
}

/// Assembles the record for a decoded instruction. `detail` runs only when detail mode is
/// enabled, so implicit-register and group resolution costs nothing otherwise.
pub(crate) fn finish<F>(
    cursor: &Cursor<'_>,
    address: Address,
    id: u32,
    mnemonic: String,
    operands: String,
    config: &DecodeConfig,
    detail: F,
) -> Instruction
where
    F: FnOnce() -> DetailParts,
{
    let bytes = cursor.consumed().to_vec();
    let mut insn = Instruction {
        address,
        size: bytes.len() as u8,
        bytes,
        id,
        mnemonic,
        operands,
        regs_read: Vec::new(),
        regs_write: Vec::new(),
        groups: Vec::new(),
        detail: None,
    };
    if config.detail {
        let parts = detail();
        insn.regs_read = parts.regs_read;
        insn.regs_write = parts.regs_write;
        insn.groups = parts.groups;
        insn.detail = Some(parts.detail);
    }
    insn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Endian;

    #[test]
    fn test_architecture_mapping() {
        for arch in Architecture::ALL {
            assert_eq!(for_architecture(arch).architecture(), arch);
        }
    }

    #[test]
    fn test_x86_decode() {
        let code = [0x55, 0xc3];
        let mut cursor = Cursor::new(&code, Endian::Little);
        let insn = for_architecture(Architecture::X86)
            .decode_one(
                &mut cursor,
                0x1000,
                &DecodeConfig::new(Mode::MODE_64),
                &mut StreamState::default(),
            )
            .unwrap();
        assert_eq!(insn.mnemonic, "push");
        assert_eq!(insn.operands, "rbp");
        assert_eq!(insn.size, 1);
        assert!(insn.detail.is_none());
        assert!(insn.regs_read.is_empty());
    }
}
