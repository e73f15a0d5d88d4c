//! Core records, errors, and dispatch for the isotope instruction decoder.
//!
//! isotope turns raw machine-code bytes into structured instruction records for a dozen
//! instruction-set families (x86, ARM/Thumb, AArch64, MIPS, PowerPC, SPARC, SystemZ, XCore,
//! M68K, M680X, TMS320C64x, EVM) using native table-driven decoders. A [`Session`] is opened
//! for one architecture and mode, configured with a syntax flavor and detail mode, and then
//! asked to disassemble buffers.
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! use isotope::{Architecture, Mode, Session};
//!
//! let code = [0x55, 0x48, 0x8b, 0x05, 0xb8, 0x13, 0x00, 0x00];
//! let session = Session::open(Architecture::X86, Mode::MODE_64).unwrap();
//!
//! for insn in session.disassemble(&code, 0x1000, 0) {
//!     println!("0x{:x}:\t{}\t{}", insn.address, insn.mnemonic, insn.operands);
//! }
//! ```
//!
//! Executable images can be loaded through [`parser::GoblinParser`], which also reports the
//! architecture and mode recorded in the headers.

#[macro_use]
mod macros;

pub mod arch;
pub mod cursor;
pub mod decoder;
pub mod detail;
pub mod format;
pub mod names;
pub mod parser;
pub mod session;
pub mod strategy;
mod large_tests;
#[cfg(feature = "extension-module")]
pub mod python;

use std::fmt;

pub use arch::{Architecture, Mode, Syntax};
pub use decoder::DecodeError;
pub use detail::{Access, CommonGroup, Detail};
pub use session::{Disasm, Session};

/// Represents an address in memory
pub type Address = u64;

/// Version of the decoder tables and API.
pub const VERSION_MAJOR: u32 = 5;
pub const VERSION_MINOR: u32 = 0;

/// Returns `(major, minor)`.
pub fn version() -> (u32, u32) {
    (VERSION_MAJOR, VERSION_MINOR)
}

/// One decoded instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// Address of the first byte
    pub address: Address,
    /// Number of bytes consumed
    pub size: u8,
    /// The exact bytes consumed
    pub bytes: Vec<u8>,
    /// Architecture-scoped instruction id (see [`names::instruction_name`])
    pub id: u32,
    /// Instruction mnemonic, including printed prefixes and condition suffixes
    pub mnemonic: String,
    /// Rendered operand text in the session's syntax
    pub operands: String,
    /// Implicitly read registers; empty unless detail mode is on
    pub regs_read: Vec<u16>,
    /// Implicitly written registers; empty unless detail mode is on
    pub regs_write: Vec<u16>,
    /// Semantic groups; empty unless detail mode is on
    pub groups: Vec<u8>,
    /// Architecture-specific payload; `None` unless detail mode is on
    pub detail: Option<Detail>,
}

impl Instruction {
    /// Returns the instruction bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Address immediately following this instruction.
    pub fn next_address(&self) -> Address {
        self.address.wrapping_add(self.size as Address)
    }

    pub fn in_group(&self, group: u8) -> bool {
        self.groups.contains(&group)
    }

    /// True for jumps and calls. Needs detail mode.
    pub fn is_branch(&self) -> bool {
        self.in_group(CommonGroup::Jump.id()) || self.in_group(CommonGroup::Call.id())
    }

    /// True for returns. Needs detail mode.
    pub fn is_return(&self) -> bool {
        self.in_group(CommonGroup::Ret.id())
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operands.is_empty() {
            write!(f, "0x{:x}:\t{}", self.address, self.mnemonic)
        } else {
            write!(
                f,
                "0x{:x}:\t{}\t{}",
                self.address, self.mnemonic, self.operands
            )
        }
    }
}

/// A section in the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Section name
    pub name: String,
    /// Starting virtual address of the section
    pub address: Address,
    /// Offset of the section contents in the file
    pub offset: usize,
    /// Size of the section in bytes
    pub size: usize,
    /// Whether this section contains executable code
    pub executable: bool,
}

impl Section {
    pub fn new(name: String, address: Address, offset: usize, size: usize, executable: bool) -> Self {
        Self {
            name,
            address,
            offset,
            size,
            executable,
        }
    }

    pub fn end_address(&self) -> Address {
        self.address.saturating_add(self.size as Address)
    }

    /// Section bytes, clipped to the image. `None` when the range starts past the end or
    /// overflows.
    fn slice<'a>(&self, img: &'a [u8]) -> Option<&'a [u8]> {
        if self.offset >= img.len() {
            return None;
        }
        let end = self.offset.checked_add(self.size)?.min(img.len());
        img.get(self.offset..end)
    }
}

/// Metadata describing a parsed binary.
#[derive(Debug, Clone)]
pub struct BinaryMetadata {
    /// Architecture and mode recorded in the headers, if recognised
    pub target: Option<(Architecture, Mode)>,
    /// Entry point address, if available
    pub entry_point: Option<Address>,
    /// List of sections found in the binary
    pub sections: Vec<Section>,
}

impl BinaryMetadata {
    /// Fallback metadata when no headers could be parsed.
    pub fn default_raw() -> Self {
        Self {
            target: None,
            entry_point: None,
            sections: Vec::new(),
        }
    }

    /// Return the executable regions to decode, or the whole file if none are found.
    pub fn get_executable_data<'a>(&'a self, img: &'a [u8]) -> Vec<(&'a [u8], Address)> {
        const TEXT_NAMES: [&str; 5] = [".text", "CODE", "__TEXT,__text", "__text", "__TEXT"];

        for name in TEXT_NAMES {
            if let Some(section) = self.find_section(name) {
                if let Some(data) = section.slice(img) {
                    log::info!(
                        "using '{}' at 0x{:x} ({} bytes)",
                        name,
                        section.address,
                        data.len()
                    );
                    return vec![(data, section.address)];
                }
            }
        }

        let regions: Vec<_> = self
            .executable_sections()
            .into_iter()
            .filter_map(|s| s.slice(img).map(|data| (data, s.address)))
            .collect();
        if !regions.is_empty() {
            log::info!("using {} executable section(s)", regions.len());
            return regions;
        }

        log::info!("no executable sections found, using whole file");
        vec![(img, 0)]
    }

    /// Find a section by name
    pub fn find_section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Get all executable sections
    pub fn executable_sections(&self) -> Vec<&Section> {
        self.sections.iter().filter(|s| s.executable).collect()
    }
}

/// Parser trait: turn raw bytes into `BinaryMetadata`.
pub trait BinaryParser: Send + Sync {
    fn parse(&self, data: &[u8]) -> Result<BinaryMetadata, DisassemblyError>;
}

/// Error type for session-level operations
#[derive(Debug, thiserror::Error)]
pub enum DisassemblyError {
    /// Failed to parse binary format
    #[error("Failed to parse binary format: {0}")]
    ParsingError(String),

    /// No decoder is compiled in for the architecture
    #[error("Unsupported architecture: {0}")]
    UnsupportedArchitecture(Architecture),

    /// The mode flags are not a valid combination for the architecture
    #[error("Invalid mode combination for {0}: {1:?}")]
    InvalidModeCombination(Architecture, Mode),

    /// Decoding stopped on an instruction
    #[error("Decoder error at 0x{address:x}: {source}")]
    Decode {
        address: Address,
        #[source]
        source: DecodeError,
    },

    /// Output formatting failed
    #[error("Formatting error: {0}")]
    Format(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(address: Address, bytes: &[u8], mnemonic: &str, operands: &str) -> Instruction {
        Instruction {
            address,
            size: bytes.len() as u8,
            bytes: bytes.to_vec(),
            id: 0,
            mnemonic: mnemonic.into(),
            operands: operands.into(),
            regs_read: Vec::new(),
            regs_write: Vec::new(),
            groups: Vec::new(),
            detail: None,
        }
    }

    #[test]
    fn test_insn_bytes() {
        let insn = sample(0x1000, &[0x48, 0x89, 0xe5], "mov", "rbp, rsp");
        assert_eq!(insn.bytes(), &[0x48, 0x89, 0xe5]);
        assert_eq!(insn.next_address(), 0x1003);
        assert_eq!(insn.to_string(), "0x1000:\tmov\trbp, rsp");
    }

    #[test]
    fn test_groups_drive_branch_queries() {
        let mut insn = sample(0x2000, &[0xc3], "ret", "");
        assert!(!insn.is_return());
        insn.groups.push(CommonGroup::Ret.id());
        assert!(insn.is_return());
        assert!(!insn.is_branch());
        assert_eq!(insn.to_string(), "0x2000:\tret");
    }

    #[test]
    fn test_version() {
        assert_eq!(version(), (5, 0));
    }

    #[test]
    fn test_executable_data_fallback() {
        let img = [0x90u8; 32];
        let mut meta = BinaryMetadata::default_raw();
        assert_eq!(meta.get_executable_data(&img), vec![(&img[..], 0)]);

        meta.sections
            .push(Section::new(".text".into(), 0x400010, 0x10, 8, true));
        let regions = meta.get_executable_data(&img);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].1, 0x400010);
        assert_eq!(regions[0].0.len(), 8);
    }

    #[test]
    fn test_oversized_section_bounds() {
        let img = [0x90u8; 32];
        let huge = Section::new(".text".into(), 0x1000, 0x10, usize::MAX, true);
        assert_eq!(huge.slice(&img), None);
        assert_eq!(huge.end_address(), Address::MAX);

        let past_end = Section::new(".data".into(), 0x2000, 64, 4, false);
        assert_eq!(past_end.slice(&img), None);

        // a section running past the image is clipped
        let tail = Section::new(".init".into(), 0x3000, 24, 16, true);
        assert_eq!(tail.slice(&img).map(<[u8]>::len), Some(8));

        // an unusable .text falls through to the whole file
        let mut meta = BinaryMetadata::default_raw();
        meta.sections.push(huge);
        assert_eq!(meta.get_executable_data(&img), vec![(&img[..], 0)]);
    }
}
