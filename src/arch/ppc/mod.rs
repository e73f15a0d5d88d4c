//! PowerPC decoder (32/64-bit, Altivec and the QPX vector extension).
//!
//! Every instruction is one 32-bit word in the session's byte order. The extended branch
//! mnemonics (`bne`, `bdnzlrl+`, ...) and the common rotate/logical aliases are chosen while
//! decoding; the printed form may add `.` (record), `o` (overflow) and a `+`/`-` prediction
//! hint to the base mnemonic without changing the instruction id.

mod decode;
mod extended;
mod vector;

use crate::arch::{hex, signed_hex, Mode, Syntax};
use crate::cursor::Cursor;
use crate::decoder::{self, ArchDecoder, DecodeConfig, DecodeError, StreamState};
use crate::detail::{Access, CommonGroup, Detail, DetailParts};
use crate::names::NameTables;
use crate::{Address, Architecture, Instruction};

registry! {
    /// PowerPC registers.
    pub enum PpcReg: u16 {
        Invalid => "", R0 => "r0", R1 => "r1", R2 => "r2",
        R3 => "r3", R4 => "r4", R5 => "r5", R6 => "r6",
        R7 => "r7", R8 => "r8", R9 => "r9", R10 => "r10",
        R11 => "r11", R12 => "r12", R13 => "r13", R14 => "r14",
        R15 => "r15", R16 => "r16", R17 => "r17", R18 => "r18",
        R19 => "r19", R20 => "r20", R21 => "r21", R22 => "r22",
        R23 => "r23", R24 => "r24", R25 => "r25", R26 => "r26",
        R27 => "r27", R28 => "r28", R29 => "r29", R30 => "r30",
        R31 => "r31", F0 => "f0", F1 => "f1", F2 => "f2",
        F3 => "f3", F4 => "f4", F5 => "f5", F6 => "f6",
        F7 => "f7", F8 => "f8", F9 => "f9", F10 => "f10",
        F11 => "f11", F12 => "f12", F13 => "f13", F14 => "f14",
        F15 => "f15", F16 => "f16", F17 => "f17", F18 => "f18",
        F19 => "f19", F20 => "f20", F21 => "f21", F22 => "f22",
        F23 => "f23", F24 => "f24", F25 => "f25", F26 => "f26",
        F27 => "f27", F28 => "f28", F29 => "f29", F30 => "f30",
        F31 => "f31", V0 => "v0", V1 => "v1", V2 => "v2",
        V3 => "v3", V4 => "v4", V5 => "v5", V6 => "v6",
        V7 => "v7", V8 => "v8", V9 => "v9", V10 => "v10",
        V11 => "v11", V12 => "v12", V13 => "v13", V14 => "v14",
        V15 => "v15", V16 => "v16", V17 => "v17", V18 => "v18",
        V19 => "v19", V20 => "v20", V21 => "v21", V22 => "v22",
        V23 => "v23", V24 => "v24", V25 => "v25", V26 => "v26",
        V27 => "v27", V28 => "v28", V29 => "v29", V30 => "v30",
        V31 => "v31", Q0 => "q0", Q1 => "q1", Q2 => "q2",
        Q3 => "q3", Q4 => "q4", Q5 => "q5", Q6 => "q6",
        Q7 => "q7", Q8 => "q8", Q9 => "q9", Q10 => "q10",
        Q11 => "q11", Q12 => "q12", Q13 => "q13", Q14 => "q14",
        Q15 => "q15", Q16 => "q16", Q17 => "q17", Q18 => "q18",
        Q19 => "q19", Q20 => "q20", Q21 => "q21", Q22 => "q22",
        Q23 => "q23", Q24 => "q24", Q25 => "q25", Q26 => "q26",
        Q27 => "q27", Q28 => "q28", Q29 => "q29", Q30 => "q30",
        Q31 => "q31", Cr0 => "cr0", Cr1 => "cr1", Cr2 => "cr2",
        Cr3 => "cr3", Cr4 => "cr4", Cr5 => "cr5", Cr6 => "cr6",
        Cr7 => "cr7", Lr => "lr", Ctr => "ctr", Xer => "xer",
        Msr => "msr", Vscr => "vscr", Fpscr => "fpscr",
    }
}

registry! {
    /// PowerPC instructions.
    pub enum PpcInsn: u16 {
        Invalid => "", Add => "add", Addc => "addc", Adde => "adde",
        Addi => "addi", Addic => "addic", AddicDot => "addic.", Addis => "addis",
        Addme => "addme", Addze => "addze", And => "and", Andc => "andc",
        AndiDot => "andi.", AndisDot => "andis.", B => "b", Ba => "ba",
        Bc => "bc", Bca => "bca", Bcctr => "bcctr", Bcctrl => "bcctrl",
        Bcl => "bcl", Bcla => "bcla", Bclr => "bclr", Bclrl => "bclrl",
        Bctr => "bctr", Bctrl => "bctrl", Bdnz => "bdnz", Bdnza => "bdnza",
        Bdnzl => "bdnzl", Bdnzla => "bdnzla", Bdnzlr => "bdnzlr", Bdnzlrl => "bdnzlrl",
        Bdz => "bdz", Bdza => "bdza", Bdzl => "bdzl", Bdzla => "bdzla",
        Bdzlr => "bdzlr", Bdzlrl => "bdzlrl", Bl => "bl", Bla => "bla",
        Blr => "blr", Blrl => "blrl", Clrldi => "clrldi", Clrlwi => "clrlwi",
        Clrrwi => "clrrwi", Cmpd => "cmpd", Cmpdi => "cmpdi", Cmpld => "cmpld",
        Cmpldi => "cmpldi", Cmplw => "cmplw", Cmplwi => "cmplwi", Cmpw => "cmpw",
        Cmpwi => "cmpwi", Cntlzd => "cntlzd", Cntlzw => "cntlzw", Crand => "crand",
        Crandc => "crandc", Crclr => "crclr", Creqv => "creqv", Crmove => "crmove",
        Crnand => "crnand", Crnor => "crnor", Crnot => "crnot", Cror => "cror",
        Crorc => "crorc", Crset => "crset", Crxor => "crxor", Dcbf => "dcbf",
        Dcbi => "dcbi", Dcbst => "dcbst", Dcbt => "dcbt", Dcbtst => "dcbtst",
        Dcbz => "dcbz", Divd => "divd", Divdu => "divdu", Divw => "divw",
        Divwu => "divwu", Eieio => "eieio", Eqv => "eqv", Extsb => "extsb",
        Extsh => "extsh", Extsw => "extsw", Fabs => "fabs", Fadd => "fadd",
        Fadds => "fadds", Fcfid => "fcfid", Fcmpo => "fcmpo", Fcmpu => "fcmpu",
        Fctid => "fctid", Fctidz => "fctidz", Fctiw => "fctiw", Fctiwz => "fctiwz",
        Fdiv => "fdiv", Fdivs => "fdivs", Fmadd => "fmadd", Fmadds => "fmadds",
        Fmr => "fmr", Fmsub => "fmsub", Fmsubs => "fmsubs", Fmul => "fmul",
        Fmuls => "fmuls", Fnabs => "fnabs", Fneg => "fneg", Fnmadd => "fnmadd",
        Fnmadds => "fnmadds", Fnmsub => "fnmsub", Fnmsubs => "fnmsubs", Fre => "fre",
        Fres => "fres", Frsp => "frsp", Frsqrte => "frsqrte", Fsel => "fsel",
        Fsqrt => "fsqrt", Fsqrts => "fsqrts", Fsub => "fsub", Fsubs => "fsubs",
        Icbi => "icbi", Isel => "isel", Isync => "isync", Lbz => "lbz",
        Lbzu => "lbzu", Lbzux => "lbzux", Lbzx => "lbzx", Ld => "ld",
        Ldarx => "ldarx", Ldbrx => "ldbrx", Ldu => "ldu", Ldux => "ldux",
        Ldx => "ldx", Lfd => "lfd", Lfdu => "lfdu", Lfdux => "lfdux",
        Lfdx => "lfdx", Lfs => "lfs", Lfsu => "lfsu", Lfsux => "lfsux",
        Lfsx => "lfsx", Lha => "lha", Lhau => "lhau", Lhaux => "lhaux",
        Lhax => "lhax", Lhbrx => "lhbrx", Lhz => "lhz", Lhzu => "lhzu",
        Lhzux => "lhzux", Lhzx => "lhzx", Li => "li", Lis => "lis",
        Lmw => "lmw", Lvebx => "lvebx", Lvehx => "lvehx", Lvewx => "lvewx",
        Lvsl => "lvsl", Lvsr => "lvsr", Lvx => "lvx", Lvxl => "lvxl",
        Lwa => "lwa", Lwarx => "lwarx", Lwaux => "lwaux", Lwax => "lwax",
        Lwbrx => "lwbrx", Lwsync => "lwsync", Lwz => "lwz", Lwzu => "lwzu",
        Lwzux => "lwzux", Lwzx => "lwzx", Mcrf => "mcrf", Mfcr => "mfcr",
        Mfctr => "mfctr", Mffs => "mffs", Mflr => "mflr", Mfmsr => "mfmsr",
        Mfspr => "mfspr", Mftb => "mftb", Mftbu => "mftbu", Mfvscr => "mfvscr",
        Mfxer => "mfxer", Mr => "mr", Mtcr => "mtcr", Mtcrf => "mtcrf",
        Mtctr => "mtctr", Mtfsb0 => "mtfsb0", Mtfsb1 => "mtfsb1", Mtfsf => "mtfsf",
        Mtlr => "mtlr", Mtmsr => "mtmsr", Mtmsrd => "mtmsrd", Mtspr => "mtspr",
        Mtvscr => "mtvscr", Mtxer => "mtxer", Mulhd => "mulhd", Mulhdu => "mulhdu",
        Mulhw => "mulhw", Mulhwu => "mulhwu", Mulld => "mulld", Mulli => "mulli",
        Mullw => "mullw", Nand => "nand", Neg => "neg", Nop => "nop",
        Nor => "nor", Not => "not", Or => "or", Orc => "orc",
        Ori => "ori", Oris => "oris", Ptesync => "ptesync", Qvfabs => "qvfabs",
        Qvfadd => "qvfadd", Qvfand => "qvfand", Qvfandc => "qvfandc", Qvfcfid => "qvfcfid",
        Qvfclr => "qvfclr", Qvfctiw => "qvfctiw", Qvfequ => "qvfequ", Qvflogical => "qvflogical",
        Qvfmadd => "qvfmadd", Qvfmr => "qvfmr", Qvfmsub => "qvfmsub", Qvfmul => "qvfmul",
        Qvfnabs => "qvfnabs", Qvfnand => "qvfnand", Qvfneg => "qvfneg", Qvfnmadd => "qvfnmadd",
        Qvfnmsub => "qvfnmsub", Qvfnor => "qvfnor", Qvfnot => "qvfnot", Qvfor => "qvfor",
        Qvforc => "qvforc", Qvfrsp => "qvfrsp", Qvfsel => "qvfsel", Qvfset => "qvfset",
        Qvfsub => "qvfsub", Qvfxor => "qvfxor", Qvlfsux => "qvlfsux", Qvlfsx => "qvlfsx",
        Rfi => "rfi", Rfid => "rfid", Rldcl => "rldcl", Rldcr => "rldcr",
        Rldic => "rldic", Rldicl => "rldicl", Rldicr => "rldicr", Rldimi => "rldimi",
        Rlwimi => "rlwimi", Rlwinm => "rlwinm", Rlwnm => "rlwnm", Rotldi => "rotldi",
        Rotlw => "rotlw", Rotlwi => "rotlwi", Sc => "sc", Sld => "sld",
        Sldi => "sldi", Slw => "slw", Slwi => "slwi", Srad => "srad",
        Sradi => "sradi", Sraw => "sraw", Srawi => "srawi", Srd => "srd",
        Srdi => "srdi", Srw => "srw", Srwi => "srwi", Stb => "stb",
        Stbu => "stbu", Stbux => "stbux", Stbx => "stbx", Std => "std",
        Stdbrx => "stdbrx", StdcxDot => "stdcx.", Stdu => "stdu", Stdux => "stdux",
        Stdx => "stdx", Stfd => "stfd", Stfdu => "stfdu", Stfdux => "stfdux",
        Stfdx => "stfdx", Stfiwx => "stfiwx", Stfs => "stfs", Stfsu => "stfsu",
        Stfsux => "stfsux", Stfsx => "stfsx", Sth => "sth", Sthbrx => "sthbrx",
        Sthu => "sthu", Sthux => "sthux", Sthx => "sthx", Stmw => "stmw",
        Stvebx => "stvebx", Stvehx => "stvehx", Stvewx => "stvewx", Stvx => "stvx",
        Stvxl => "stvxl", Stw => "stw", Stwbrx => "stwbrx", StwcxDot => "stwcx.",
        Stwu => "stwu", Stwux => "stwux", Stwx => "stwx", Subf => "subf",
        Subfc => "subfc", Subfe => "subfe", Subfic => "subfic", Subfme => "subfme",
        Subfze => "subfze", Sync => "sync", Td => "td", Tdi => "tdi",
        Trap => "trap", Tw => "tw", Twi => "twi", Vaddfp => "vaddfp",
        Vaddubm => "vaddubm", Vadduhm => "vadduhm", Vadduwm => "vadduwm", Vand => "vand",
        Vandc => "vandc", Vavgub => "vavgub", Vcmpeqfp => "vcmpeqfp", Vcmpequb => "vcmpequb",
        Vcmpequh => "vcmpequh", Vcmpequw => "vcmpequw", Vcmpgtsw => "vcmpgtsw", Vcmpgtub => "vcmpgtub",
        Vmaddfp => "vmaddfp", Vmaxfp => "vmaxfp", Vmaxsw => "vmaxsw", Vmaxuw => "vmaxuw",
        Vminfp => "vminfp", Vminsw => "vminsw", Vminuw => "vminuw", Vmr => "vmr",
        Vmrghb => "vmrghb", Vmrghh => "vmrghh", Vmrghw => "vmrghw", Vmrglb => "vmrglb",
        Vmrglh => "vmrglh", Vmrglw => "vmrglw", Vnmsubfp => "vnmsubfp", Vnor => "vnor",
        Vnot => "vnot", Vor => "vor", Vperm => "vperm", Vpkpx => "vpkpx",
        Vpkuhum => "vpkuhum", Vpkuwum => "vpkuwum", Vsel => "vsel", Vslb => "vslb",
        Vsldoi => "vsldoi", Vslh => "vslh", Vslw => "vslw", Vspltb => "vspltb",
        Vsplth => "vsplth", Vspltisb => "vspltisb", Vspltish => "vspltish", Vspltisw => "vspltisw",
        Vspltw => "vspltw", Vsrab => "vsrab", Vsrah => "vsrah", Vsraw => "vsraw",
        Vsrb => "vsrb", Vsrh => "vsrh", Vsrw => "vsrw", Vsubfp => "vsubfp",
        Vsububm => "vsububm", Vsubuhm => "vsubuhm", Vsubuwm => "vsubuwm", Vxor => "vxor",
        Xor => "xor", Xori => "xori", Xoris => "xoris",
    }
}

registry! {
    /// PowerPC-specific groups; ids start at 128.
    pub enum PpcGroup: u8 {
        Altivec => "altivec",
        Mode32 => "mode32",
        Mode64 => "mode64",
        Fpu => "fpu",
        Qpx => "qpx",
    }
}

pub static NAMES: NameTables = NameTables {
    registers: PpcReg::NAMES,
    instructions: PpcInsn::NAMES,
    groups: PpcGroup::NAMES,
};

registry! {
    /// Branch condition encoded by the BO/BI fields.
    pub enum PpcBc: u8 {
        Invalid => "", Lt => "lt", Le => "le", Eq => "eq",
        Ge => "ge", Gt => "gt", Ne => "ne", Un => "un",
        Nu => "nu",
    }
}

/// Static branch prediction hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PpcBh {
    #[default]
    None,
    /// Predicted taken (`+`).
    Plus,
    /// Predicted not taken (`-`).
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PpcOperandKind {
    Reg(PpcReg),
    Imm(i64),
    Mem { base: PpcReg, disp: i64 },
    /// A condition-register bit, `4*crN+cond`.
    Crx { reg: PpcReg, cond: PpcBc },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PpcOperand {
    pub kind: PpcOperandKind,
    pub access: Access,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PpcDetail {
    pub bc: PpcBc,
    pub bh: PpcBh,
    /// The record form (`.`) updates cr0 (cr1 for floating point).
    pub update_cr0: bool,
    pub operands: Vec<PpcOperand>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Gpr(u32),
    /// `rA` where 0 means the literal zero (`lwzx r3, 0, r4`).
    GprOrZero(u32),
    Fpr(u32),
    Vr(u32),
    Qr(u32),
    Cr(u32),
    /// Condition bit used by the extended branch forms.
    CrBit(u32),
    Imm(i64),
    Uimm(u64),
    Target(u64),
    Mem { base: u32, disp: i64 },
}

/// How the branch target or link register is involved, for detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct BranchInfo {
    pub link: bool,
    pub to_lr: bool,
    pub to_ctr: bool,
    pub decrements: bool,
    pub absolute: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Decoded {
    pub insn: PpcInsn,
    /// Printed mnemonic when it differs from the id name (branches, hints).
    pub mnemonic: Option<String>,
    pub ops: Vec<Op>,
    /// Rc = 1.
    pub record: bool,
    /// OE = 1.
    pub overflow: bool,
    pub bc: PpcBc,
    pub bh: PpcBh,
    pub branch: Option<BranchInfo>,
    pub ext: Option<PpcGroup>,
}

impl Decoded {
    pub(crate) fn new(insn: PpcInsn, ops: Vec<Op>) -> Self {
        Self {
            insn,
            mnemonic: None,
            ops,
            record: false,
            overflow: false,
            bc: PpcBc::Invalid,
            bh: PpcBh::None,
            branch: None,
            ext: None,
        }
    }

    pub(crate) fn record(mut self, rc: bool) -> Self {
        self.record = rc;
        self
    }

    pub(crate) fn ext(mut self, group: PpcGroup) -> Self {
        self.ext = Some(group);
        self
    }

    fn mnemonic(&self) -> String {
        let mut text = match &self.mnemonic {
            Some(m) => m.clone(),
            None => self.insn.name().to_string(),
        };
        if self.overflow {
            text.push('o');
        }
        if self.record {
            text.push('.');
        }
        text
    }
}

fn numbered(base: PpcReg, n: u32) -> PpcReg {
    PpcReg::from_id(base.id() as u32 + (n & 31)).unwrap_or(PpcReg::Invalid)
}

fn op_reg(op: &Op) -> Option<PpcReg> {
    match *op {
        Op::Gpr(n) => Some(numbered(PpcReg::R0, n)),
        Op::GprOrZero(0) => None,
        Op::GprOrZero(n) => Some(numbered(PpcReg::R0, n)),
        Op::Fpr(n) => Some(numbered(PpcReg::F0, n)),
        Op::Vr(n) => Some(numbered(PpcReg::V0, n)),
        Op::Qr(n) => Some(numbered(PpcReg::Q0, n)),
        Op::Cr(n) => Some(numbered(PpcReg::Cr0, n & 7)),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PpcDecoder;

impl ArchDecoder for PpcDecoder {
    fn architecture(&self) -> Architecture {
        Architecture::Ppc
    }

    fn decode_one(
        &self,
        cursor: &mut Cursor<'_>,
        address: Address,
        config: &DecodeConfig,
        _state: &mut StreamState,
    ) -> Result<Instruction, DecodeError> {
        let mode = config.mode;
        let word = cursor.read_u32_with(mode.endian())?;
        let decoded = decode::decode(word, address, mode)?;
        let operands = render(&decoded, config.syntax);
        Ok(decoder::finish(
            cursor,
            address,
            decoded.insn.id() as u32,
            decoded.mnemonic(),
            operands,
            config,
            || detail(&decoded, mode),
        ))
    }
}

fn reg_text(reg: PpcReg, syntax: Syntax) -> String {
    let name = reg.name();
    if syntax == Syntax::NoRegName {
        let digits = name.trim_start_matches(|c: char| c.is_ascii_alphabetic());
        if !digits.is_empty() {
            return digits.to_string();
        }
    }
    name.to_string()
}

fn crbit_text(bit: u32, syntax: Syntax) -> String {
    let cond = ["lt", "gt", "eq", "un"][(bit & 3) as usize];
    match bit >> 2 {
        0 => cond.to_string(),
        field => format!("4*{}+{}", reg_text(numbered(PpcReg::Cr0, field), syntax), cond),
    }
}

fn op_text(op: &Op, syntax: Syntax) -> String {
    match op {
        Op::GprOrZero(0) => "0".to_string(),
        Op::CrBit(bit) => crbit_text(*bit, syntax),
        Op::Imm(v) => signed_hex(*v),
        Op::Uimm(v) | Op::Target(v) => hex(*v),
        Op::Mem { base, disp } => {
            let base = match base {
                0 => "0".to_string(),
                n => reg_text(numbered(PpcReg::R0, *n), syntax),
            };
            format!("{}({})", signed_hex(*disp), base)
        }
        _ => op_reg(op)
            .map(|r| reg_text(r, syntax))
            .unwrap_or_default(),
    }
}

fn render(d: &Decoded, syntax: Syntax) -> String {
    d.ops
        .iter()
        .map(|op| op_text(op, syntax))
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_store(insn: PpcInsn) -> bool {
    use PpcInsn as I;
    matches!(
        insn,
        I::Stb | I::Stbu | I::Sth | I::Sthu | I::Stw | I::Stwu | I::Std | I::Stdu | I::Stmw
            | I::Stfs | I::Stfsu | I::Stfd | I::Stfdu | I::Stbx | I::Stbux | I::Sthx | I::Sthux
            | I::Stwx | I::Stwux | I::Stdx | I::Stdux | I::Stwbrx | I::Sthbrx | I::Stdbrx
            | I::StwcxDot | I::StdcxDot | I::Stfsx | I::Stfsux | I::Stfdx | I::Stfdux
            | I::Stfiwx | I::Stvx | I::Stvxl | I::Stvebx | I::Stvehx | I::Stvewx
    )
}

/// Instructions whose leading operand is a source even though it is a register.
fn first_operand_read(d: &Decoded) -> bool {
    use PpcInsn as I;
    if d.branch.is_some() || is_store(d.insn) {
        return true;
    }
    match d.insn {
        I::Cmpw | I::Cmpd | I::Cmplw | I::Cmpld | I::Cmpwi | I::Cmpdi | I::Cmplwi | I::Cmpldi
        | I::Fcmpu | I::Fcmpo => !matches!(d.ops.first(), Some(Op::Cr(_))),
        I::Tw | I::Twi | I::Td | I::Tdi | I::Mtspr | I::Mtlr | I::Mtctr | I::Mtxer | I::Mtcrf
        | I::Mtcr | I::Mtmsr | I::Mtmsrd | I::Mtvscr | I::Mtfsf | I::Mtfsb0 | I::Mtfsb1 | I::Dcbf
        | I::Dcbi | I::Dcbst | I::Dcbt | I::Dcbtst | I::Dcbz | I::Icbi | I::Sc => true,
        _ => false,
    }
}

/// Instructions that only exist in 64-bit implementations.
fn is_64bit(insn: PpcInsn) -> bool {
    use PpcInsn as I;
    matches!(
        insn,
        I::Ld | I::Ldu | I::Lwa | I::Std | I::Stdu | I::Ldx | I::Ldux | I::Stdx | I::Stdux
            | I::Ldarx | I::StdcxDot | I::Ldbrx | I::Stdbrx | I::Lwax | I::Lwaux | I::Cmpd
            | I::Cmpld | I::Cmpdi | I::Cmpldi | I::Mulld | I::Mulhd | I::Mulhdu | I::Divd
            | I::Divdu | I::Sld | I::Srd | I::Srad | I::Sradi | I::Cntlzd | I::Extsw
            | I::Rldicl | I::Rldicr | I::Rldic | I::Rldimi | I::Rldcl | I::Rldcr | I::Rotldi
            | I::Clrldi | I::Srdi | I::Sldi | I::Td | I::Tdi | I::Fcfid | I::Fctid | I::Fctidz
            | I::Mtmsrd | I::Rfid
    )
}

fn writes_carry(insn: PpcInsn) -> bool {
    use PpcInsn as I;
    matches!(
        insn,
        I::Addc | I::Adde | I::Addze | I::Addme | I::Subfc | I::Subfe | I::Subfze | I::Subfme
            | I::Addic | I::AddicDot | I::Subfic | I::Sraw | I::Srawi | I::Srad | I::Sradi
    )
}

fn reads_carry(insn: PpcInsn) -> bool {
    use PpcInsn as I;
    matches!(insn, I::Adde | I::Addze | I::Addme | I::Subfe | I::Subfze | I::Subfme)
}

fn lower(op: &Op) -> PpcOperandKind {
    match *op {
        Op::Imm(v) => PpcOperandKind::Imm(v),
        Op::Uimm(v) | Op::Target(v) => PpcOperandKind::Imm(v as i64),
        Op::GprOrZero(0) => PpcOperandKind::Imm(0),
        Op::Mem { base, disp } => PpcOperandKind::Mem {
            base: if base == 0 {
                PpcReg::Invalid
            } else {
                numbered(PpcReg::R0, base)
            },
            disp,
        },
        Op::CrBit(bit) => PpcOperandKind::Crx {
            reg: numbered(PpcReg::Cr0, bit >> 2),
            cond: [PpcBc::Lt, PpcBc::Gt, PpcBc::Eq, PpcBc::Un][(bit & 3) as usize],
        },
        _ => PpcOperandKind::Reg(op_reg(op).unwrap_or(PpcReg::Invalid)),
    }
}

fn detail(d: &Decoded, mode: Mode) -> DetailParts {
    use PpcInsn as I;
    let writes_first = !first_operand_read(d);
    let operands = d
        .ops
        .iter()
        .enumerate()
        .map(|(i, op)| PpcOperand {
            kind: lower(op),
            access: if i == 0 && writes_first {
                Access::WRITE
            } else {
                Access::READ
            },
        })
        .collect();
    let mut parts = DetailParts::new(Detail::Ppc(PpcDetail {
        bc: d.bc,
        bh: d.bh,
        update_cr0: d.record,
        operands,
    }));

    if let Some(b) = d.branch {
        if b.to_lr {
            parts.read(PpcReg::Lr.id());
        }
        if b.to_ctr || b.decrements {
            parts.read(PpcReg::Ctr.id());
        }
        if b.decrements {
            parts.write(PpcReg::Ctr.id());
        }
        if b.link {
            parts.write(PpcReg::Lr.id());
            parts.common(CommonGroup::Call);
        } else {
            parts.common(CommonGroup::Jump);
            if b.to_lr {
                parts.common(CommonGroup::Ret);
            }
        }
        if !b.to_lr && !b.to_ctr && !b.absolute {
            parts.common(CommonGroup::BranchRelative);
        }
    }

    if d.record || matches!(d.insn, I::AndiDot | I::AndisDot | I::AddicDot | I::StwcxDot | I::StdcxDot) {
        let cr = if d.ext == Some(PpcGroup::Fpu) { PpcReg::Cr1 } else { PpcReg::Cr0 };
        parts.write(cr.id());
    }
    if reads_carry(d.insn) {
        parts.read(PpcReg::Xer.id());
    }
    if writes_carry(d.insn) || d.overflow {
        parts.write(PpcReg::Xer.id());
    }
    match d.insn {
        I::Mflr => parts.read(PpcReg::Lr.id()),
        I::Mtlr => parts.write(PpcReg::Lr.id()),
        I::Mfctr => parts.read(PpcReg::Ctr.id()),
        I::Mtctr => parts.write(PpcReg::Ctr.id()),
        I::Mfxer => parts.read(PpcReg::Xer.id()),
        I::Mtxer => parts.write(PpcReg::Xer.id()),
        I::Sc | I::Tw | I::Twi | I::Td | I::Tdi | I::Trap => parts.common(CommonGroup::Int),
        I::Rfi | I::Rfid => {
            parts.common(CommonGroup::Iret);
            parts.common(CommonGroup::Privilege);
        }
        I::Mfmsr | I::Mtmsr | I::Mtmsrd | I::Dcbi => parts.common(CommonGroup::Privilege),
        _ => {}
    }

    if let Some(group) = d.ext {
        parts.arch_group(group.id());
    }
    if is_64bit(d.insn) {
        parts.arch_group(PpcGroup::Mode64.id());
    } else if mode.contains(Mode::MODE_32) {
        parts.arch_group(PpcGroup::Mode32.id());
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Session;

    const CODE: [u8; 52] = [
        0x43, 0x20, 0x0c, 0x07, 0x41, 0x56, 0xff, 0x17, 0x80, 0x20, 0x00, 0x00, 0x80, 0x3f,
        0x00, 0x00, 0x10, 0x43, 0x23, 0x0e, 0xd0, 0x44, 0x00, 0x80, 0x4c, 0x43, 0x22, 0x02,
        0x2d, 0x03, 0x00, 0x80, 0x7c, 0x43, 0x20, 0x14, 0x7c, 0x43, 0x20, 0x93, 0x4f, 0x20,
        0x00, 0x21, 0x4c, 0xc8, 0x00, 0x21, 0x40, 0x82, 0x00, 0x14,
    ];

    fn lines(mode: Mode, syntax: Syntax, code: &[u8]) -> Vec<String> {
        let mut session = Session::open(Architecture::Ppc, mode).unwrap();
        session.set_syntax(syntax);
        session
            .disassemble_all(code, 0x1000, 0)
            .iter()
            .map(|i| format!("{} {}", i.mnemonic, i.operands).trim_end().to_string())
            .collect()
    }

    #[test]
    fn test_ppc64_big_endian() {
        assert_eq!(
            lines(Mode::BIG_ENDIAN, Syntax::Default, &CODE),
            [
                "bdnzla+ 0xc04",
                "bdztla 4*cr5+eq, 0xffffffffffffff14",
                "lwz r1, 0(0)",
                "lwz r1, 0(r31)",
                "vpkpx v2, v3, v4",
                "stfs f2, 0x80(r4)",
                "crand 2, 3, 4",
                "cmpwi cr2, r3, 0x80",
                "addc r2, r3, r4",
                "mulhd. r2, r3, r4",
                "bdnzlrl+",
                "bgelrl- cr2",
                "bne 0x1044",
            ]
        );
    }

    #[test]
    fn test_register_numbers_only() {
        let text = lines(Mode::BIG_ENDIAN, Syntax::NoRegName, &CODE[8..44]);
        assert_eq!(
            text,
            [
                "lwz 1, 0(0)",
                "lwz 1, 0(31)",
                "vpkpx 2, 3, 4",
                "stfs 2, 0x80(4)",
                "crand 2, 3, 4",
                "cmpwi 2, 3, 0x80",
                "addc 2, 3, 4",
                "mulhd. 2, 3, 4",
                "bdnzlrl+",
            ]
        );
    }

    #[test]
    fn test_qpx() {
        let code = [0x10, 0x60, 0x2a, 0x10, 0x10, 0x64, 0x28, 0x88, 0x7c, 0x4a, 0x5d, 0x0f];
        assert_eq!(
            lines(Mode::BIG_ENDIAN | Mode::QPX, Syntax::Default, &code),
            ["qvfabs q3, q5", "qvfand q3, q4, q5", "qvlfsux q2, r10, r11"]
        );
    }

    #[test]
    fn test_little_endian_word_order() {
        // lwz r1, 0(r31)
        let code = [0x00, 0x00, 0x3f, 0x80];
        assert_eq!(
            lines(Mode::MODE_32, Syntax::Default, &code),
            ["lwz r1, 0(r31)"]
        );
    }

    #[test]
    fn test_detail() {
        let mut session = Session::open(Architecture::Ppc, Mode::BIG_ENDIAN).unwrap();
        session.set_detail(true);

        // bgelrl- cr2
        let insn = session.decode_at(&[0x4c, 0xc8, 0x00, 0x21], 0x1000).unwrap();
        let Some(Detail::Ppc(d)) = &insn.detail else {
            panic!("missing ppc detail");
        };
        assert_eq!(d.bc, PpcBc::Ge);
        assert_eq!(d.bh, PpcBh::Minus);
        assert_eq!(insn.regs_read, vec![PpcReg::Lr.id()]);
        assert_eq!(insn.regs_write, vec![PpcReg::Lr.id()]);
        assert!(insn.in_group(CommonGroup::Call.id()));

        // mulhd. r2, r3, r4
        let insn = session.decode_at(&[0x7c, 0x43, 0x20, 0x93], 0).unwrap();
        let Some(Detail::Ppc(d)) = &insn.detail else {
            panic!("missing ppc detail");
        };
        assert!(d.update_cr0);
        assert_eq!(d.operands[0].access, Access::WRITE);
        assert_eq!(insn.regs_write, vec![PpcReg::Cr0.id()]);
        assert!(insn.in_group(128 + PpcGroup::Mode64.id()));

        // stfs f2, 0x80(r4)
        let insn = session.decode_at(&[0xd0, 0x44, 0x00, 0x80], 0).unwrap();
        let Some(Detail::Ppc(d)) = &insn.detail else {
            panic!("missing ppc detail");
        };
        assert_eq!(d.operands[0].kind, PpcOperandKind::Reg(PpcReg::F2));
        assert_eq!(d.operands[0].access, Access::READ);
        assert_eq!(
            d.operands[1].kind,
            PpcOperandKind::Mem {
                base: PpcReg::R4,
                disp: 0x80
            }
        );

        // blr
        let insn = session.decode_at(&[0x4e, 0x80, 0x00, 0x20], 0).unwrap();
        assert_eq!(insn.mnemonic, "blr");
        assert!(insn.is_return());
    }
}
