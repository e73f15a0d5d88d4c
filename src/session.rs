//! Decoder sessions and the disassembly driver.

use std::iter::FusedIterator;

use crate::arch::{Architecture, Mode, Syntax};
use crate::cursor::Cursor;
use crate::decoder::{self, ArchDecoder, DecodeConfig, DecodeError, StreamState};
use crate::names;
use crate::{Address, DisassemblyError, Instruction};

/// A configured decoder for one architecture and mode.
///
/// Configuration changes take `&mut self`, so they can never overlap a disassembly that
/// borrows the session.
pub struct Session {
    arch: Architecture,
    mode: Mode,
    syntax: Syntax,
    detail: bool,
    decoder: &'static dyn ArchDecoder,
}

impl Session {
    /// Opens a session, validating the mode combination for the architecture.
    pub fn open(arch: Architecture, mode: Mode) -> Result<Self, DisassemblyError> {
        if !arch.is_supported() {
            return Err(DisassemblyError::UnsupportedArchitecture(arch));
        }
        arch.validate(mode)?;
        log::debug!("opened {} session, mode {:?}", arch, mode);
        Ok(Self {
            arch,
            mode,
            syntax: Syntax::Default,
            detail: false,
            decoder: decoder::for_architecture(arch),
        })
    }

    pub fn architecture(&self) -> Architecture {
        self.arch
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    pub fn detail(&self) -> bool {
        self.detail
    }

    /// Selects the text flavor used by subsequent calls. Flavors an architecture has no
    /// rendering for fall back to its default syntax.
    pub fn set_syntax(&mut self, syntax: Syntax) {
        self.syntax = syntax;
    }

    /// Turns detail mode on or off for subsequent calls.
    pub fn set_detail(&mut self, enabled: bool) {
        self.detail = enabled;
    }

    fn config(&self) -> DecodeConfig {
        DecodeConfig {
            mode: self.mode,
            syntax: self.syntax,
            detail: self.detail,
        }
    }

    /// Lazily decodes `code`, whose first byte sits at `address`.
    ///
    /// At most `max_instructions` are produced (`0` means no limit). Decoding stops at the end
    /// of the buffer or at the first byte sequence that fails to decode; everything decoded
    /// before that point is still yielded.
    pub fn disassemble<'s, 'b>(
        &'s self,
        code: &'b [u8],
        address: Address,
        max_instructions: usize,
    ) -> Disasm<'s, 'b> {
        Disasm {
            decoder: self.decoder,
            config: self.config(),
            code,
            offset: 0,
            address,
            remaining: (max_instructions != 0).then_some(max_instructions),
            state: StreamState::default(),
            stopped: None,
            done: false,
            _session: std::marker::PhantomData,
        }
    }

    /// Eager form of [`Session::disassemble`].
    pub fn disassemble_all(
        &self,
        code: &[u8],
        address: Address,
        max_instructions: usize,
    ) -> Vec<Instruction> {
        self.disassemble(code, address, max_instructions).collect()
    }

    /// Decodes the single instruction at the start of `code`.
    pub fn decode_at(&self, code: &[u8], address: Address) -> Result<Instruction, DecodeError> {
        let mut cursor = Cursor::new(code, self.mode.endian());
        self.decoder.decode_one(
            &mut cursor,
            address,
            &self.config(),
            &mut StreamState::default(),
        )
    }

    pub fn register_name(&self, id: u32) -> &'static str {
        names::register_name(self.arch, id)
    }

    pub fn instruction_name(&self, id: u32) -> &'static str {
        names::instruction_name(self.arch, id)
    }

    pub fn group_name(&self, id: u32) -> &'static str {
        names::group_name(self.arch, id)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("arch", &self.arch)
            .field("mode", &self.mode)
            .field("syntax", &self.syntax)
            .field("detail", &self.detail)
            .finish()
    }
}

/// Lazy instruction sequence produced by [`Session::disassemble`].
pub struct Disasm<'s, 'b> {
    decoder: &'static dyn ArchDecoder,
    config: DecodeConfig,
    code: &'b [u8],
    offset: usize,
    address: Address,
    remaining: Option<usize>,
    state: StreamState,
    stopped: Option<DecodeError>,
    done: bool,
    _session: std::marker::PhantomData<&'s Session>,
}

impl Disasm<'_, '_> {
    /// Offset of the next undecoded byte.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Address of the next undecoded byte.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The failure that ended the sequence early, if any.
    pub fn stop_reason(&self) -> Option<&DecodeError> {
        self.stopped.as_ref()
    }
}

impl Iterator for Disasm<'_, '_> {
    type Item = Instruction;

    fn next(&mut self) -> Option<Instruction> {
        if self.done || self.offset >= self.code.len() || self.remaining == Some(0) {
            self.done = true;
            return None;
        }

        let mut cursor = Cursor::new(&self.code[self.offset..], self.config.mode.endian());
        match self
            .decoder
            .decode_one(&mut cursor, self.address, &self.config, &mut self.state)
        {
            Ok(insn) => {
                log::trace!("{}", insn);
                self.offset += insn.size as usize;
                self.address = self.address.wrapping_add(insn.size as Address);
                if let Some(n) = self.remaining.as_mut() {
                    *n -= 1;
                }
                Some(insn)
            }
            Err(e) => {
                log::debug!(
                    "stopped at offset {} (0x{:x}): {}",
                    self.offset,
                    self.address,
                    e
                );
                self.stopped = Some(e);
                self.done = true;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let left = self.code.len() - self.offset;
        let upper = self.remaining.map_or(left, |n| n.min(left));
        (0, Some(upper))
    }
}

impl FusedIterator for Disasm<'_, '_> {}

#[cfg(test)]
mod tests {
    use super::*;

    const X86_64: &[u8] = &[0x55, 0x48, 0x8b, 0x05, 0xb8, 0x13, 0x00, 0x00];

    #[test]
    fn test_open_rejects_bad_modes() {
        assert!(matches!(
            Session::open(Architecture::Mips, Mode::MIPS32 | Mode::MIPS64),
            Err(DisassemblyError::InvalidModeCombination(Architecture::Mips, _))
        ));
        assert!(Session::open(Architecture::X86, Mode::MODE_64).is_ok());
    }

    #[test]
    fn test_driver_addresses() {
        let session = Session::open(Architecture::X86, Mode::MODE_64).unwrap();
        let insns = session.disassemble_all(X86_64, 0x1000, 0);
        assert_eq!(insns.len(), 2);
        assert_eq!(insns[0].address, 0x1000);
        assert_eq!(insns[0].size, 1);
        assert_eq!(insns[1].address, 0x1001);
        assert_eq!(insns[1].size, 7);
        assert_eq!(insns[1].next_address(), 0x1008);
    }

    #[test]
    fn test_max_instructions() {
        let session = Session::open(Architecture::X86, Mode::MODE_64).unwrap();
        assert_eq!(session.disassemble_all(X86_64, 0x1000, 1).len(), 1);
        assert_eq!(session.disassemble_all(&[], 0x1000, 0).len(), 0);
    }

    #[test]
    fn test_stops_on_truncation() {
        let session = Session::open(Architecture::X86, Mode::MODE_64).unwrap();
        let mut disasm = session.disassemble(&X86_64[..5], 0x1000, 0);
        assert_eq!(disasm.next().map(|i| i.mnemonic), Some("push".to_string()));
        assert!(disasm.next().is_none());
        assert_eq!(disasm.offset(), 1);
        assert!(matches!(
            disasm.stop_reason(),
            Some(DecodeError::TruncatedInstruction(_))
        ));
        assert!(disasm.next().is_none());
    }

    #[test]
    fn test_detail_toggle() {
        let mut session = Session::open(Architecture::X86, Mode::MODE_64).unwrap();
        let plain = session.disassemble_all(X86_64, 0x1000, 0);
        assert!(plain.iter().all(|i| i.detail.is_none() && i.groups.is_empty()));

        session.set_detail(true);
        let detailed = session.disassemble_all(X86_64, 0x1000, 0);
        assert!(detailed[0].detail.is_some());
        assert!(!detailed[0].regs_read.is_empty());
        assert_eq!(detailed[0].operands, plain[0].operands);
    }
}
