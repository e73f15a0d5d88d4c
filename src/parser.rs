//! Goblin-based multi-format binary parser.

use std::fmt;

use goblin::mach::constants::cputype;
use goblin::mach::{Mach, MachO};
use goblin::{elf, pe, Object};

use crate::{
    Address, Architecture, BinaryMetadata, BinaryParser, DisassemblyError, Mode, Section,
};

/// Machine types goblin has no named constant for.
const EM_TI_C6000: u16 = 140;
const EM_XCORE: u16 = 203;

/// Mach-O section attributes marking code.
const S_ATTR_PURE_INSTRUCTIONS: u32 = 0x8000_0000;
const S_ATTR_SOME_INSTRUCTIONS: u32 = 0x0000_0400;

/// A parser that handles ELF, PE, and Mach-O via Goblin.
#[derive(Debug, Default)]
pub struct GoblinParser;

fn endian(little: bool) -> Mode {
    if little {
        Mode::LITTLE_ENDIAN
    } else {
        Mode::BIG_ENDIAN
    }
}

impl GoblinParser {
    /// Construct a new GoblinParser.
    pub fn new() -> Self {
        GoblinParser
    }

    fn elf_target(elf: &elf::Elf) -> Option<(Architecture, Mode)> {
        let order = endian(elf.little_endian);
        let width = if elf.is_64 { Mode::MODE_64 } else { Mode::MODE_32 };
        Some(match elf.header.e_machine {
            elf::header::EM_386 => (Architecture::X86, Mode::MODE_32),
            elf::header::EM_X86_64 => (Architecture::X86, Mode::MODE_64),
            elf::header::EM_ARM if elf.entry & 1 != 0 => (Architecture::Arm, Mode::THUMB | order),
            elf::header::EM_ARM => (Architecture::Arm, order),
            elf::header::EM_AARCH64 => (Architecture::Arm64, order),
            elf::header::EM_MIPS => (Architecture::Mips, width | order),
            elf::header::EM_PPC => (Architecture::Ppc, Mode::MODE_32 | order),
            elf::header::EM_PPC64 => (Architecture::Ppc, Mode::MODE_64 | order),
            elf::header::EM_SPARC | elf::header::EM_SPARC32PLUS => {
                (Architecture::Sparc, Mode::BIG_ENDIAN)
            }
            elf::header::EM_SPARCV9 => (Architecture::Sparc, Mode::BIG_ENDIAN | Mode::V9),
            elf::header::EM_S390 => (Architecture::SysZ, Mode::BIG_ENDIAN),
            elf::header::EM_68K => (Architecture::M68k, Mode::BIG_ENDIAN),
            EM_TI_C6000 => (Architecture::Tms320c64x, order),
            EM_XCORE => (Architecture::XCore, Mode::LITTLE_ENDIAN),
            _ => return None,
        })
    }

    /// Parse an ELF image.
    fn parse_elf(&self, elf: elf::Elf) -> Result<BinaryMetadata, DisassemblyError> {
        let target = Self::elf_target(&elf);
        if target.is_none() {
            log::warn!("unknown ELF machine type {}", elf.header.e_machine);
        }

        let mut sections = Vec::new();
        for sh in &elf.section_headers {
            if sh.sh_type == elf::section_header::SHT_NOBITS {
                continue;
            }
            if let Some(name) = elf.shdr_strtab.get_at(sh.sh_name) {
                sections.push(Section::new(
                    name.to_string(),
                    sh.sh_addr,
                    sh.sh_offset as usize,
                    sh.sh_size as usize,
                    sh.is_executable(),
                ));
            }
        }

        let entry = if matches!(target, Some((Architecture::Arm, _))) {
            elf.entry & !1
        } else {
            elf.entry
        };
        Ok(BinaryMetadata {
            target,
            entry_point: Some(entry),
            sections,
        })
    }

    /// Parse a PE image.
    fn parse_pe(&self, pe: pe::PE<'_>) -> Result<BinaryMetadata, DisassemblyError> {
        let machine = pe.header.coff_header.machine;
        let target = match machine {
            pe::header::COFF_MACHINE_X86 => Some((Architecture::X86, Mode::MODE_32)),
            pe::header::COFF_MACHINE_X86_64 => Some((Architecture::X86, Mode::MODE_64)),
            pe::header::COFF_MACHINE_ARM => Some((Architecture::Arm, Mode::ARM)),
            pe::header::COFF_MACHINE_ARMNT => Some((Architecture::Arm, Mode::THUMB)),
            pe::header::COFF_MACHINE_ARM64 => Some((Architecture::Arm64, Mode::LITTLE_ENDIAN)),
            _ => {
                log::warn!("unknown PE machine type 0x{:x}", machine);
                None
            }
        };

        let image_base = pe.image_base as Address;
        let sections = pe
            .sections
            .iter()
            .map(|sect| {
                let executable =
                    (sect.characteristics & pe::section_table::IMAGE_SCN_MEM_EXECUTE) != 0;
                let size = match sect.virtual_size {
                    0 => sect.size_of_raw_data,
                    v => v.min(sect.size_of_raw_data),
                };
                Section::new(
                    sect.name().unwrap_or("").to_string(),
                    image_base + sect.virtual_address as Address,
                    sect.pointer_to_raw_data as usize,
                    size as usize,
                    executable,
                )
            })
            .collect();

        Ok(BinaryMetadata {
            target,
            entry_point: Some(image_base + pe.entry as Address),
            sections,
        })
    }

    /// Parse a Mach-O binary
    fn parse_macho(&self, macho: &MachO) -> Result<BinaryMetadata, DisassemblyError> {
        let order = endian(macho.little_endian);
        let target = match macho.header.cputype {
            cputype::CPU_TYPE_X86 => Some((Architecture::X86, Mode::MODE_32)),
            cputype::CPU_TYPE_X86_64 => Some((Architecture::X86, Mode::MODE_64)),
            cputype::CPU_TYPE_ARM => Some((Architecture::Arm, order)),
            cputype::CPU_TYPE_ARM64 => Some((Architecture::Arm64, order)),
            cputype::CPU_TYPE_POWERPC => Some((Architecture::Ppc, Mode::MODE_32 | order)),
            cputype::CPU_TYPE_POWERPC64 => Some((Architecture::Ppc, Mode::MODE_64 | order)),
            other => {
                log::warn!("unknown Mach-O cpu type 0x{:x}", other);
                None
            }
        };

        let mut sections = Vec::new();
        for segment in &macho.segments {
            let entries = segment
                .sections()
                .map_err(|e| DisassemblyError::ParsingError(e.to_string()))?;
            for (section, _) in entries {
                let executable = section.flags
                    & (S_ATTR_PURE_INSTRUCTIONS | S_ATTR_SOME_INSTRUCTIONS)
                    != 0;
                let name = format!(
                    "{},{}",
                    section.segname().unwrap_or(""),
                    section.name().unwrap_or("")
                );
                sections.push(Section::new(
                    name,
                    section.addr,
                    section.offset as usize,
                    section.size as usize,
                    executable,
                ));
            }
        }

        Ok(BinaryMetadata {
            target,
            entry_point: Some(macho.entry),
            sections,
        })
    }

    /// Parse a Mach-O image.
    fn parse_mach(&self, m: Mach<'_>) -> Result<BinaryMetadata, DisassemblyError> {
        match m {
            Mach::Binary(binary) => self.parse_macho(&binary),
            Mach::Fat(_) => {
                log::warn!("fat Mach-O archives are decoded as raw bytes");
                Ok(BinaryMetadata::default_raw())
            }
        }
    }
}

impl fmt::Display for GoblinParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GoblinParser")
    }
}

impl BinaryParser for GoblinParser {
    fn parse(&self, data: &[u8]) -> Result<BinaryMetadata, DisassemblyError> {
        match Object::parse(data) {
            Ok(Object::Elf(elf)) => self.parse_elf(elf),
            Ok(Object::PE(pe)) => self.parse_pe(pe),
            Ok(Object::Mach(m)) => self.parse_mach(m),
            Ok(_) => Err(DisassemblyError::ParsingError("Unsupported file format".into())),
            Err(e) => Err(DisassemblyError::ParsingError(e.to_string())),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A section-less ELF header.
    pub(crate) fn elf_header(machine: u16, is_64: bool, little: bool, entry: u64) -> Vec<u8> {
        fn put(out: &mut Vec<u8>, value: u64, width: usize, little: bool) {
            let bytes = value.to_le_bytes();
            let mut field = bytes[..width].to_vec();
            if !little {
                field.reverse();
            }
            out.extend_from_slice(&field);
        }
        let word = if is_64 { 8 } else { 4 };
        let mut out = vec![0x7f, b'E', b'L', b'F'];
        out.push(if is_64 { 2 } else { 1 });
        out.push(if little { 1 } else { 2 });
        out.push(1);
        out.resize(16, 0);
        put(&mut out, 2, 2, little); // e_type: executable
        put(&mut out, machine as u64, 2, little);
        put(&mut out, 1, 4, little);
        put(&mut out, entry, word, little);
        put(&mut out, 0, word, little); // e_phoff
        put(&mut out, 0, word, little); // e_shoff
        put(&mut out, 0, 4, little);
        put(&mut out, if is_64 { 64 } else { 52 }, 2, little);
        put(&mut out, if is_64 { 56 } else { 32 }, 2, little);
        put(&mut out, 0, 2, little);
        put(&mut out, if is_64 { 64 } else { 40 }, 2, little);
        put(&mut out, 0, 2, little);
        put(&mut out, 0, 2, little);
        out
    }

    #[test]
    fn test_default_raw() {
        let meta = BinaryMetadata::default_raw();
        assert!(meta.target.is_none());
        assert!(meta.entry_point.is_none());
        assert!(meta.sections.is_empty());
    }

    #[test]
    fn test_elf_targets() {
        let parser = GoblinParser::new();
        let meta = parser
            .parse(&elf_header(elf::header::EM_X86_64, true, true, 0x401000))
            .unwrap();
        assert_eq!(meta.target, Some((Architecture::X86, Mode::MODE_64)));
        assert_eq!(meta.entry_point, Some(0x401000));

        let meta = parser
            .parse(&elf_header(elf::header::EM_MIPS, false, false, 0x400000))
            .unwrap();
        assert_eq!(
            meta.target,
            Some((Architecture::Mips, Mode::MODE_32 | Mode::BIG_ENDIAN))
        );

        // odd entry points select Thumb
        let meta = parser
            .parse(&elf_header(elf::header::EM_ARM, false, true, 0x8001))
            .unwrap();
        assert_eq!(meta.target, Some((Architecture::Arm, Mode::THUMB)));
        assert_eq!(meta.entry_point, Some(0x8000));
    }

    #[test]
    fn test_unknown_machine() {
        let meta = GoblinParser
            .parse(&elf_header(0x9026, false, true, 0))
            .unwrap();
        assert!(meta.target.is_none());
    }

    #[test]
    fn test_rejects_raw_bytes() {
        assert!(matches!(
            GoblinParser.parse(&[0x90; 64]),
            Err(DisassemblyError::ParsingError(_))
        ));
    }
}
