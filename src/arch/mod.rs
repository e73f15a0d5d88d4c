//! Architecture identifiers, mode flags, syntax flavors, and the per-architecture decoders.

use std::fmt;

use bitflags::bitflags;
use clap::ValueEnum;

use crate::cursor::Endian;
use crate::DisassemblyError;

pub mod aarch64;
pub mod arm;
pub mod evm;
pub mod m680x;
pub mod m68k;
pub mod mips;
pub mod ppc;
pub mod sparc;
pub mod sysz;
pub mod tms320c64x;
pub mod x86;
pub mod xcore;

/// Supported instruction-set families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
#[non_exhaustive]
pub enum Architecture {
    Arm,
    #[value(alias = "aarch64")]
    Arm64,
    Mips,
    X86,
    Ppc,
    Sparc,
    #[value(name = "sysz", alias = "systemz")]
    SysZ,
    #[value(name = "xcore")]
    XCore,
    M68k,
    Tms320c64x,
    M680x,
    Evm,
}

impl Architecture {
    /// Every architecture with a compiled-in decoder.
    pub const ALL: [Architecture; 12] = [
        Architecture::Arm,
        Architecture::Arm64,
        Architecture::Mips,
        Architecture::X86,
        Architecture::Ppc,
        Architecture::Sparc,
        Architecture::SysZ,
        Architecture::XCore,
        Architecture::M68k,
        Architecture::Tms320c64x,
        Architecture::M680x,
        Architecture::Evm,
    ];

    pub fn is_supported(self) -> bool {
        Self::ALL.contains(&self)
    }

    /// The longest encoding the decoder can consume for one instruction.
    pub fn max_instruction_size(self) -> usize {
        match self {
            Architecture::X86 => 15,
            Architecture::SysZ => 6,
            Architecture::M68k => 22,
            Architecture::M680x => 5,
            Architecture::Evm => 33,
            _ => 4,
        }
    }

    /// Checks that `mode` is a combination this architecture can decode.
    pub fn validate(self, mode: Mode) -> Result<(), DisassemblyError> {
        let invalid = || Err(DisassemblyError::InvalidModeCombination(self, mode));
        if !self.accepted().contains(mode) {
            return invalid();
        }
        let ok = match self {
            Architecture::X86 => {
                (mode & (Mode::MODE_16 | Mode::MODE_32 | Mode::MODE_64)).bits().count_ones() == 1
            }
            Architecture::Arm => !mode.contains(Mode::MCLASS) || mode.contains(Mode::THUMB),
            Architecture::Mips => {
                let r6 = mode.contains(Mode::MIPS32R6);
                !mode.contains(Mode::MIPS32 | Mode::MIPS64)
                    && !(r6 && mode.intersects(Mode::MIPS64 | Mode::MIPS2 | Mode::MIPS3))
                    && !(mode.contains(Mode::MICRO) && mode.contains(Mode::MIPS64))
                    && !mode.contains(Mode::MIPS2 | Mode::MIPS3)
            }
            Architecture::Ppc => {
                !mode.contains(Mode::MODE_32 | Mode::MODE_64)
                    && !mode.contains(Mode::QPX | Mode::MODE_32)
            }
            Architecture::Sparc | Architecture::SysZ => mode.contains(Mode::BIG_ENDIAN),
            Architecture::M68k => (mode - Mode::BIG_ENDIAN).bits().count_ones() <= 1,
            Architecture::M680x => mode.bits().count_ones() == 1,
            _ => true,
        };
        if ok {
            Ok(())
        } else {
            invalid()
        }
    }

    fn accepted(self) -> Mode {
        match self {
            Architecture::X86 => Mode::MODE_16 | Mode::MODE_32 | Mode::MODE_64,
            Architecture::Arm => Mode::THUMB | Mode::MCLASS | Mode::V8 | Mode::BIG_ENDIAN,
            Architecture::Arm64 => Mode::BIG_ENDIAN,
            Architecture::Mips => {
                Mode::MIPS32
                    | Mode::MIPS64
                    | Mode::MICRO
                    | Mode::MIPS2
                    | Mode::MIPS3
                    | Mode::MIPS32R6
                    | Mode::BIG_ENDIAN
            }
            Architecture::Ppc => Mode::MODE_32 | Mode::MODE_64 | Mode::QPX | Mode::BIG_ENDIAN,
            Architecture::Sparc => Mode::BIG_ENDIAN | Mode::V9,
            Architecture::SysZ | Architecture::XCore | Architecture::Tms320c64x => {
                Mode::BIG_ENDIAN
            }
            Architecture::M68k => {
                Mode::BIG_ENDIAN
                    | Mode::M68K_000
                    | Mode::M68K_010
                    | Mode::M68K_020
                    | Mode::M68K_030
                    | Mode::M68K_040
                    | Mode::M68K_060
            }
            Architecture::M680x => {
                Mode::M680X_6301 | Mode::M680X_6800 | Mode::M680X_6801 | Mode::M680X_6809
            }
            Architecture::Evm => Mode::empty(),
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Architecture::Arm => "ARM",
            Architecture::Arm64 => "ARM64",
            Architecture::Mips => "MIPS",
            Architecture::X86 => "X86",
            Architecture::Ppc => "PPC",
            Architecture::Sparc => "SPARC",
            Architecture::SysZ => "SystemZ",
            Architecture::XCore => "XCore",
            Architecture::M68k => "M68K",
            Architecture::Tms320c64x => "TMS320C64x",
            Architecture::M680x => "M680X",
            Architecture::Evm => "EVM",
        };
        f.write_str(name)
    }
}

bitflags! {
    /// Decoding mode bitset. Bit positions below 31 are reused by different
    /// architectures, so a flag's meaning depends on the architecture it is paired with.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Mode: u32 {
        const MODE_16 = 1 << 1;
        const MODE_32 = 1 << 2;
        const MODE_64 = 1 << 3;
        const THUMB = 1 << 4;
        const MCLASS = 1 << 5;
        const V8 = 1 << 6;
        const MICRO = 1 << 4;
        const MIPS3 = 1 << 5;
        const MIPS32R6 = 1 << 6;
        const MIPS2 = 1 << 7;
        const V9 = 1 << 4;
        const QPX = 1 << 4;
        const M68K_000 = 1 << 1;
        const M68K_010 = 1 << 2;
        const M68K_020 = 1 << 3;
        const M68K_030 = 1 << 4;
        const M68K_040 = 1 << 5;
        const M68K_060 = 1 << 6;
        const M680X_6301 = 1 << 1;
        const M680X_6800 = 1 << 3;
        const M680X_6801 = 1 << 4;
        const M680X_6809 = 1 << 7;
        const BIG_ENDIAN = 1 << 31;
    }
}

impl Mode {
    pub const LITTLE_ENDIAN: Mode = Mode::empty();
    /// 32-bit ARM state (the absence of `THUMB`).
    pub const ARM: Mode = Mode::empty();
    pub const MIPS32: Mode = Mode::MODE_32;
    pub const MIPS64: Mode = Mode::MODE_64;

    pub fn endian(self) -> Endian {
        if self.contains(Mode::BIG_ENDIAN) {
            Endian::Big
        } else {
            Endian::Little
        }
    }

    /// Parses the flag names accepted on the command line.
    pub fn from_flag_name(name: &str) -> Option<Mode> {
        let mode = match name.to_ascii_lowercase().as_str() {
            "le" | "little-endian" | "arm" => Mode::LITTLE_ENDIAN,
            "be" | "big-endian" => Mode::BIG_ENDIAN,
            "16" => Mode::MODE_16,
            "32" | "mips32" => Mode::MODE_32,
            "64" | "mips64" => Mode::MODE_64,
            "thumb" => Mode::THUMB,
            "mclass" => Mode::MCLASS,
            "v8" => Mode::V8,
            "micro" => Mode::MICRO,
            "mips2" => Mode::MIPS2,
            "mips3" => Mode::MIPS3,
            "mips32r6" => Mode::MIPS32R6,
            "v9" => Mode::V9,
            "qpx" => Mode::QPX,
            "68000" => Mode::M68K_000,
            "68010" => Mode::M68K_010,
            "68020" => Mode::M68K_020,
            "68030" => Mode::M68K_030,
            "68040" => Mode::M68K_040,
            "68060" => Mode::M68K_060,
            "6301" => Mode::M680X_6301,
            "6800" => Mode::M680X_6800,
            "6801" => Mode::M680X_6801,
            "6809" => Mode::M680X_6809,
            _ => return None,
        };
        Some(mode)
    }
}

/// Text rendering flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum Syntax {
    /// The architecture's native syntax (Intel for x86).
    #[default]
    Default,
    Intel,
    Att,
    Masm,
    /// Print registers by number.
    #[value(name = "noregname")]
    NoRegName,
}

/// Hex rendering shared by most printers: small values stay decimal.
pub(crate) fn hex(value: u64) -> String {
    if value > 9 {
        format!("0x{:x}", value)
    } else {
        value.to_string()
    }
}

/// Signed variant of [`hex`].
pub(crate) fn signed_hex(value: i64) -> String {
    if value < 0 {
        format!("-{}", hex(value.unsigned_abs()))
    } else {
        hex(value as u64)
    }
}

/// Sign-extends the low `bits` bits of `value`.
#[inline]
pub(crate) fn sign_extend(value: u64, bits: u32) -> i64 {
    let shift = 64 - bits;
    ((value << shift) as i64) >> shift
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_validation() {
        assert!(Architecture::X86.validate(Mode::MODE_64).is_ok());
        assert!(Architecture::X86.validate(Mode::MODE_32 | Mode::MODE_64).is_err());
        assert!(Architecture::X86.validate(Mode::LITTLE_ENDIAN).is_err());
        assert!(Architecture::Mips
            .validate(Mode::MIPS32 | Mode::MIPS64)
            .is_err());
        assert!(Architecture::Mips
            .validate(Mode::MIPS64 | Mode::BIG_ENDIAN)
            .is_ok());
        assert!(Architecture::Mips
            .validate(Mode::MIPS32R6 | Mode::MICRO | Mode::BIG_ENDIAN)
            .is_ok());
        assert!(Architecture::Arm.validate(Mode::MCLASS).is_err());
        assert!(Architecture::Arm.validate(Mode::THUMB | Mode::MCLASS).is_ok());
        assert!(Architecture::Sparc.validate(Mode::LITTLE_ENDIAN).is_err());
        assert!(Architecture::M680x.validate(Mode::M680X_6809).is_ok());
        assert!(Architecture::M680x
            .validate(Mode::M680X_6809 | Mode::M680X_6800)
            .is_err());
        assert!(Architecture::Evm.validate(Mode::BIG_ENDIAN).is_err());
    }

    #[test]
    fn test_hex_rendering() {
        assert_eq!(hex(9), "9");
        assert_eq!(hex(0x10), "0x10");
        assert_eq!(signed_hex(-8), "-8");
        assert_eq!(signed_hex(-0x20), "-0x20");
        assert_eq!(sign_extend(0xff, 8), -1);
        assert_eq!(sign_extend(0x7f, 8), 127);
    }

    #[test]
    fn test_flag_names() {
        assert_eq!(Mode::from_flag_name("thumb"), Some(Mode::THUMB));
        assert_eq!(Mode::from_flag_name("BE"), Some(Mode::BIG_ENDIAN));
        assert_eq!(Mode::from_flag_name("nonsense"), None);
    }
}
