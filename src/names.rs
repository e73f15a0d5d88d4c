//! Id → name registries for registers, instructions and groups.
//!
//! Every architecture compiles its name tables in as static data. Reverse lookups (name → id)
//! are built on first use and shared read-only afterwards.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::arch::{aarch64, arm, evm, m680x, m68k, mips, ppc, sparc, sysz, tms320c64x, x86, xcore};
use crate::arch::Architecture;
use crate::detail::{CommonGroup, ARCH_GROUP_BASE};

/// The static name tables of one architecture.
#[derive(Debug)]
pub struct NameTables {
    pub registers: &'static [&'static str],
    pub instructions: &'static [&'static str],
    /// Architecture-specific groups, starting at [`ARCH_GROUP_BASE`].
    pub groups: &'static [&'static str],
}

/// Counts reported for table sanity checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSizes {
    pub instructions: usize,
    pub registers: usize,
    pub groups: usize,
}

pub fn tables(arch: Architecture) -> &'static NameTables {
    match arch {
        Architecture::X86 => &x86::NAMES,
        Architecture::Arm => &arm::NAMES,
        Architecture::Arm64 => &aarch64::NAMES,
        Architecture::Mips => &mips::NAMES,
        Architecture::Ppc => &ppc::NAMES,
        Architecture::Sparc => &sparc::NAMES,
        Architecture::SysZ => &sysz::NAMES,
        Architecture::XCore => &xcore::NAMES,
        Architecture::M68k => &m68k::NAMES,
        Architecture::M680x => &m680x::NAMES,
        Architecture::Tms320c64x => &tms320c64x::NAMES,
        Architecture::Evm => &evm::NAMES,
    }
}

/// Printable register name, or `""` for an unknown id.
pub fn register_name(arch: Architecture, id: u32) -> &'static str {
    tables(arch).registers.get(id as usize).copied().unwrap_or("")
}

/// Printable instruction name, or `""` for an unknown id.
pub fn instruction_name(arch: Architecture, id: u32) -> &'static str {
    tables(arch)
        .instructions
        .get(id as usize)
        .copied()
        .unwrap_or("")
}

/// Printable group name, or `""` for an unknown id.
pub fn group_name(arch: Architecture, id: u32) -> &'static str {
    let base = ARCH_GROUP_BASE as u32;
    if id < base {
        return CommonGroup::NAMES.get(id as usize).copied().unwrap_or("");
    }
    tables(arch)
        .groups
        .get((id - base) as usize)
        .copied()
        .unwrap_or("")
}

pub fn table_sizes(arch: Architecture) -> TableSizes {
    let t = tables(arch);
    TableSizes {
        instructions: t.instructions.len(),
        registers: t.registers.len(),
        groups: CommonGroup::NAMES.len() + t.groups.len(),
    }
}

type Reverse = HashMap<Architecture, HashMap<&'static str, u32>>;

fn build_reverse(pick: fn(&'static NameTables) -> &'static [&'static str]) -> Reverse {
    Architecture::ALL
        .iter()
        .map(|&arch| {
            let mut names = HashMap::new();
            for (id, name) in pick(tables(arch)).iter().enumerate() {
                if !name.is_empty() {
                    names.entry(*name).or_insert(id as u32);
                }
            }
            (arch, names)
        })
        .collect()
}

/// Looks up an instruction id by its printable name.
pub fn instruction_id(arch: Architecture, name: &str) -> Option<u32> {
    static TABLE: OnceLock<Reverse> = OnceLock::new();
    let table = TABLE.get_or_init(|| build_reverse(|t| t.instructions));
    table
        .get(&arch)?
        .get(name.to_ascii_lowercase().as_str())
        .copied()
}

/// Looks up a register id by its printable name.
pub fn register_id(arch: Architecture, name: &str) -> Option<u32> {
    static TABLE: OnceLock<Reverse> = OnceLock::new();
    let table = TABLE.get_or_init(|| build_reverse(|t| t.registers));
    table
        .get(&arch)?
        .get(name.to_ascii_lowercase().as_str())
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_ids_are_empty() {
        for arch in Architecture::ALL {
            assert_eq!(register_name(arch, 0xffff), "");
            assert_eq!(instruction_name(arch, 0xffff), "");
            assert_eq!(group_name(arch, 0xff), "");
        }
    }

    #[test]
    fn test_common_groups() {
        assert_eq!(group_name(Architecture::X86, 1), "jump");
        assert_eq!(group_name(Architecture::Mips, 7), "branch_relative");
    }

    #[test]
    fn test_reverse_lookup() {
        let id = instruction_id(Architecture::X86, "MOV").unwrap();
        assert_eq!(instruction_name(Architecture::X86, id), "mov");
        let rax = register_id(Architecture::X86, "rax").unwrap();
        assert_eq!(register_name(Architecture::X86, rax), "rax");
        assert_eq!(register_id(Architecture::Evm, "rax"), None);
    }

    #[test]
    fn test_table_sizes_cover_names() {
        for arch in Architecture::ALL {
            let sizes = table_sizes(arch);
            assert!(sizes.instructions > 1, "{arch} has no instructions");
            assert!(sizes.groups >= CommonGroup::NAMES.len());
        }
    }
}
