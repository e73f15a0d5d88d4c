//! Optional per-instruction detail payloads.

use bitflags::bitflags;

use crate::arch::aarch64::Arm64Detail;
use crate::arch::arm::ArmDetail;
use crate::arch::evm::EvmDetail;
use crate::arch::m680x::M680xDetail;
use crate::arch::m68k::M68kDetail;
use crate::arch::mips::MipsDetail;
use crate::arch::ppc::PpcDetail;
use crate::arch::sparc::SparcDetail;
use crate::arch::sysz::SysZDetail;
use crate::arch::tms320c64x::Tms320c64xDetail;
use crate::arch::x86::X86Detail;
use crate::arch::xcore::XCoreDetail;
use crate::arch::Architecture;

/// First id used by architecture-specific groups; ids below it are [`CommonGroup`]s.
pub const ARCH_GROUP_BASE: u8 = 128;

registry! {
    /// Semantic groups shared by every architecture.
    pub enum CommonGroup: u8 {
        Invalid => "",
        Jump => "jump",
        Call => "call",
        Ret => "ret",
        Int => "int",
        Iret => "iret",
        Privilege => "privilege",
        BranchRelative => "branch_relative",
    }
}

bitflags! {
    /// How an instruction touches an operand.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Access: u8 {
        const READ = 1 << 0;
        const WRITE = 1 << 1;
    }
}

impl Access {
    pub const READ_WRITE: Access = Access::READ.union(Access::WRITE);
}

/// Architecture-tagged detail payload, present only when detail mode is on.
#[derive(Debug, Clone, PartialEq)]
pub enum Detail {
    X86(X86Detail),
    Arm(ArmDetail),
    Arm64(Arm64Detail),
    Mips(MipsDetail),
    Ppc(PpcDetail),
    Sparc(SparcDetail),
    SysZ(SysZDetail),
    XCore(XCoreDetail),
    M68k(M68kDetail),
    M680x(M680xDetail),
    Tms320c64x(Tms320c64xDetail),
    Evm(EvmDetail),
}

impl Detail {
    pub fn architecture(&self) -> Architecture {
        match self {
            Detail::X86(_) => Architecture::X86,
            Detail::Arm(_) => Architecture::Arm,
            Detail::Arm64(_) => Architecture::Arm64,
            Detail::Mips(_) => Architecture::Mips,
            Detail::Ppc(_) => Architecture::Ppc,
            Detail::Sparc(_) => Architecture::Sparc,
            Detail::SysZ(_) => Architecture::SysZ,
            Detail::XCore(_) => Architecture::XCore,
            Detail::M68k(_) => Architecture::M68k,
            Detail::M680x(_) => Architecture::M680x,
            Detail::Tms320c64x(_) => Architecture::Tms320c64x,
            Detail::Evm(_) => Architecture::Evm,
        }
    }

    /// Number of explicit operands recorded in the payload.
    pub fn operand_count(&self) -> usize {
        match self {
            Detail::X86(d) => d.operands.len(),
            Detail::Arm(d) => d.operands.len(),
            Detail::Arm64(d) => d.operands.len(),
            Detail::Mips(d) => d.operands.len(),
            Detail::Ppc(d) => d.operands.len(),
            Detail::Sparc(d) => d.operands.len(),
            Detail::SysZ(d) => d.operands.len(),
            Detail::XCore(d) => d.operands.len(),
            Detail::M68k(d) => d.operands.len(),
            Detail::M680x(d) => d.operands.len(),
            Detail::Tms320c64x(d) => d.operands.len(),
            Detail::Evm(_) => 0,
        }
    }
}

/// Implicit registers, groups and payload, produced lazily by a decoder.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DetailParts {
    pub regs_read: Vec<u16>,
    pub regs_write: Vec<u16>,
    pub groups: Vec<u8>,
    pub detail: Detail,
}

impl DetailParts {
    pub(crate) fn new(detail: Detail) -> Self {
        Self {
            regs_read: Vec::new(),
            regs_write: Vec::new(),
            groups: Vec::new(),
            detail,
        }
    }

    pub(crate) fn read(&mut self, reg: u16) {
        if reg != 0 && !self.regs_read.contains(&reg) {
            self.regs_read.push(reg);
        }
    }

    pub(crate) fn write(&mut self, reg: u16) {
        if reg != 0 && !self.regs_write.contains(&reg) {
            self.regs_write.push(reg);
        }
    }

    pub(crate) fn group(&mut self, group: u8) {
        if group != 0 && !self.groups.contains(&group) {
            self.groups.push(group);
        }
    }

    pub(crate) fn common(&mut self, group: CommonGroup) {
        self.group(group.id());
    }

    /// Records an architecture-specific group given its index in the arch table.
    pub(crate) fn arch_group(&mut self, index: u8) {
        self.group(ARCH_GROUP_BASE + index);
    }
}
