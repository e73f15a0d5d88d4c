//! IBM SystemZ (z/Architecture) decoding.
//!
//! Instructions are 2, 4 or 6 bytes, big-endian. Branch-on-condition forms print the
//! extended mnemonics (`br`, `jne`, `jgh`) and keep the base instruction id.

mod decode;

use crate::arch::{hex, signed_hex};
use crate::cursor::Cursor;
use crate::decoder::{self, ArchDecoder, DecodeConfig, DecodeError, StreamState};
use crate::detail::{Access, CommonGroup, Detail, DetailParts};
use crate::names::NameTables;
use crate::{Address, Architecture, Instruction};

registry! {
    /// SystemZ registers.
    pub enum SysZReg: u16 {
        Invalid => "", R0 => "r0", R1 => "r1", R2 => "r2",
        R3 => "r3", R4 => "r4", R5 => "r5", R6 => "r6",
        R7 => "r7", R8 => "r8", R9 => "r9", R10 => "r10",
        R11 => "r11", R12 => "r12", R13 => "r13", R14 => "r14",
        R15 => "r15", F0 => "f0", F1 => "f1", F2 => "f2",
        F3 => "f3", F4 => "f4", F5 => "f5", F6 => "f6",
        F7 => "f7", F8 => "f8", F9 => "f9", F10 => "f10",
        F11 => "f11", F12 => "f12", F13 => "f13", F14 => "f14",
        F15 => "f15", A0 => "a0", A1 => "a1", A2 => "a2",
        A3 => "a3", A4 => "a4", A5 => "a5", A6 => "a6",
        A7 => "a7", A8 => "a8", A9 => "a9", A10 => "a10",
        A11 => "a11", A12 => "a12", A13 => "a13", A14 => "a14",
        A15 => "a15", Cc => "cc",
    }
}

registry! {
    /// SystemZ instructions.
    pub enum SysZInsn: u16 {
        Invalid => "", A => "a", Adb => "adb", Adbr => "adbr",
        Aeb => "aeb", Aebr => "aebr", Afi => "afi", Ag => "ag",
        Agfi => "agfi", Agfr => "agfr", Aghi => "aghi", Agr => "agr",
        Aghik => "aghik", Agrk => "agrk", Ah => "ah", Ahi => "ahi",
        Ahik => "ahik", Al => "al", Alfi => "alfi", Alg => "alg",
        Algfi => "algfi", Alghsik => "alghsik", Algr => "algr", Alhsik => "alhsik",
        Alr => "alr", Ar => "ar", Ark => "ark", Ay => "ay",
        Bal => "bal", Balr => "balr", Bas => "bas", Basr => "basr",
        Bc => "bc", Bcr => "bcr", Bct => "bct", Bctgr => "bctgr",
        Bctr => "bctr", Bras => "bras", Brasl => "brasl", Brc => "brc",
        Brcl => "brcl", Brct => "brct", Brctg => "brctg", Bxh => "bxh",
        Bxle => "bxle", C => "c", Cdb => "cdb", Cdbr => "cdbr",
        Cdfbr => "cdfbr", Cdgbr => "cdgbr", Ceb => "ceb", Cebr => "cebr",
        Cefbr => "cefbr", Cegbr => "cegbr", Cfi => "cfi", Cg => "cg",
        Cgfi => "cgfi", Cgfr => "cgfr", Cghi => "cghi", Cgib => "cgib",
        Cgij => "cgij", Cgit => "cgit", Cgr => "cgr", Cgrb => "cgrb",
        Cgrj => "cgrj", Ch => "ch", Chi => "chi", Cib => "cib",
        Cij => "cij", Cit => "cit", Cl => "cl", Clc => "clc",
        Clfi => "clfi", Clfit => "clfit", Clg => "clg", Clgfi => "clgfi",
        Clgib => "clgib", Clgij => "clgij", Clgit => "clgit", Clgr => "clgr",
        Clgrb => "clgrb", Clgrj => "clgrj", Cli => "cli", Clib => "clib",
        Clij => "clij", Cliy => "cliy", Clr => "clr", Clrb => "clrb",
        Clrj => "clrj", Cly => "cly", Cr => "cr", Crb => "crb",
        Crj => "crj", Cs => "cs", Csg => "csg", Csy => "csy",
        Cy => "cy", D => "d", Ddb => "ddb", Ddbr => "ddbr",
        Deb => "deb", Debr => "debr", Dlgr => "dlgr", Dr => "dr",
        Dsg => "dsg", Dsgr => "dsgr", Ear => "ear", Ex => "ex",
        Ic => "ic", Icy => "icy", Iihf => "iihf", Iihh => "iihh",
        Iihl => "iihl", Iilf => "iilf", Iilh => "iilh", Iill => "iill",
        Ipm => "ipm", L => "l", La => "la", Laa => "laa",
        Laag => "laag", Lan => "lan", Lao => "lao", Larl => "larl",
        Lax => "lax", Lay => "lay", Lb => "lb", Lcgr => "lcgr",
        Lcr => "lcr", Ld => "ld", Ldeb => "ldeb", Ldebr => "ldebr",
        Ldr => "ldr", Ldy => "ldy", Le => "le", Ledbr => "ledbr",
        Ler => "ler", Ley => "ley", Lg => "lg", Lgb => "lgb",
        Lgf => "lgf", Lgfi => "lgfi", Lgfr => "lgfr", Lgh => "lgh",
        Lghi => "lghi", Lgr => "lgr", Lh => "lh", Lhi => "lhi",
        Lhy => "lhy", Llc => "llc", Llgc => "llgc", Llgf => "llgf",
        Llgfr => "llgfr", Llgh => "llgh", Llh => "llh", Llihf => "llihf",
        Llihh => "llihh", Llihl => "llihl", Llilf => "llilf", Llilh => "llilh",
        Llill => "llill", Lm => "lm", Lmg => "lmg", Lmy => "lmy",
        Lnr => "lnr", Locgr => "locgr", Locr => "locr", Lpgr => "lpgr",
        Lpr => "lpr", Lr => "lr", Lrv => "lrv", Lrvg => "lrvg",
        Lrvgr => "lrvgr", Lrvr => "lrvr", Lt => "lt", Ltg => "ltg",
        Ltgfr => "ltgfr", Ltgr => "ltgr", Ltr => "ltr", Ly => "ly",
        M => "m", Mdb => "mdb", Mdbr => "mdbr", Mdeb => "mdeb",
        Meeb => "meeb", Meebr => "meebr", Mghi => "mghi", Mh => "mh",
        Mhi => "mhi", Mlgr => "mlgr", Mr => "mr", Msfi => "msfi",
        Msg => "msg", Msgfi => "msgfi", Msgr => "msgr", Mvc => "mvc",
        Mvi => "mvi", Mviy => "mviy", N => "n", Nc => "nc",
        Ng => "ng", Ngr => "ngr", Ni => "ni", Nihf => "nihf",
        Nihh => "nihh", Nihl => "nihl", Nilf => "nilf", Nilh => "nilh",
        Nill => "nill", Niy => "niy", Nr => "nr", Nrk => "nrk",
        Ny => "ny", O => "o", Oc => "oc", Og => "og",
        Ogr => "ogr", Oi => "oi", Oihf => "oihf", Oihh => "oihh",
        Oihl => "oihl", Oilf => "oilf", Oilh => "oilh", Oill => "oill",
        Oiy => "oiy", Or => "or", Ork => "ork", Oy => "oy",
        Risbg => "risbg", Risbhg => "risbhg", Risblg => "risblg", Rll => "rll",
        Rllg => "rllg", Rnsbg => "rnsbg", Rosbg => "rosbg", Rxsbg => "rxsbg",
        S => "s", Sar => "sar",
        Sdb => "sdb", Sdbr => "sdbr", Seb => "seb", Sebr => "sebr",
        Sg => "sg", Sgr => "sgr", Sgrk => "sgrk", Sh => "sh",
        Sl => "sl", Sla => "sla", Slag => "slag", Slda => "slda",
        Sldl => "sldl", Slfi => "slfi", Slg => "slg", Slgfi => "slgfi",
        Slgr => "slgr", Sll => "sll", Sllg => "sllg", Slr => "slr",
        Sqdb => "sqdb", Sqeb => "sqeb", Sr => "sr", Sra => "sra",
        Srag => "srag", Srda => "srda", Srdl => "srdl", Srk => "srk",
        Srl => "srl", Srlg => "srlg", St => "st", Stc => "stc",
        Stcy => "stcy", Std => "std", Stdy => "stdy", Ste => "ste",
        Stey => "stey", Stg => "stg", Sth => "sth", Sthy => "sthy",
        Stm => "stm", Stmg => "stmg", Stmy => "stmy", Strv => "strv",
        Strvg => "strvg", Sty => "sty", Svc => "svc", Sy => "sy",
        Tm => "tm", Tmlh => "tmlh", Tmll => "tmll", Tmy => "tmy",
        X => "x", Xc => "xc", Xg => "xg", Xgr => "xgr",
        Xi => "xi", Xihf => "xihf", Xilf => "xilf", Xiy => "xiy",
        Xr => "xr", Xrk => "xrk", Xy => "xy",
    }
}

registry! {
    /// SystemZ facility groups; ids start at 128.
    pub enum SysZGroup: u8 {
        DistinctOps => "distinctops",
        HighWord => "highword",
        InterlockedAccess1 => "interlockedaccess1",
        LoadStoreOnCond => "loadstoreoncond",
    }
}

pub static NAMES: NameTables = NameTables {
    registers: SysZReg::NAMES,
    instructions: SysZInsn::NAMES,
    groups: SysZGroup::NAMES,
};

registry! {
    /// Branch conditions; the id is the 4-bit condition mask.
    pub enum SysZCc: u8 {
        Invalid => "", O => "o", H => "h", Nle => "nle",
        L => "l", Nhe => "nhe", Lh => "lh", Ne => "ne",
        E => "e", Nlh => "nlh", He => "he", Nl => "nl",
        Le => "le", Nh => "nh", No => "no",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SysZOperandKind {
    Reg(SysZReg),
    Imm(i64),
    /// `disp(index, base)`, or `disp(length, base)` for storage-to-storage forms.
    Mem {
        base: SysZReg,
        index: SysZReg,
        length: u64,
        disp: i64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SysZOperand {
    pub kind: SysZOperandKind,
    pub access: Access,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysZDetail {
    pub cc: SysZCc,
    pub operands: Vec<SysZOperand>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Gpr(u8),
    Fpr(u8),
    /// Access register.
    Acr(u8),
    Imm(i64),
    Uimm(u64),
    Target(u64),
    /// Raw condition mask, printed in decimal.
    Mask(u8),
    Mem { disp: i64, index: u8, base: u8 },
    Len { disp: i64, length: u64, base: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Decoded {
    pub insn: SysZInsn,
    pub mnemonic: Option<String>,
    pub ops: Vec<Op>,
    pub cc: SysZCc,
    pub group: Option<SysZGroup>,
}

impl Decoded {
    pub(crate) fn new(insn: SysZInsn, ops: Vec<Op>) -> Self {
        Self {
            insn,
            mnemonic: None,
            ops,
            cc: SysZCc::Invalid,
            group: None,
        }
    }

    pub(crate) fn group(mut self, group: SysZGroup) -> Self {
        self.group = Some(group);
        self
    }

    fn mnemonic(&self) -> String {
        match &self.mnemonic {
            Some(m) => m.clone(),
            None => self.insn.name().to_string(),
        }
    }
}

fn numbered(first: SysZReg, n: u8) -> SysZReg {
    SysZReg::from_id(first.id() as u32 + (n & 15) as u32).unwrap_or(SysZReg::Invalid)
}

fn gpr(n: u8) -> SysZReg {
    numbered(SysZReg::R0, n)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SysZDecoder;

impl ArchDecoder for SysZDecoder {
    fn architecture(&self) -> Architecture {
        Architecture::SysZ
    }

    fn decode_one(
        &self,
        cursor: &mut Cursor<'_>,
        address: Address,
        config: &DecodeConfig,
        _state: &mut StreamState,
    ) -> Result<Instruction, DecodeError> {
        let length = decode::length(cursor.peek_u8()?);
        let bytes = cursor.take(length)?;
        let decoded = decode::decode(bytes, address)?;
        let operands = render(&decoded);
        Ok(decoder::finish(
            cursor,
            address,
            decoded.insn.id() as u32,
            decoded.mnemonic(),
            operands,
            config,
            || detail(&decoded),
        ))
    }
}

fn reg_text(reg: SysZReg) -> String {
    format!("%{}", reg.name())
}

fn op_reg(op: &Op) -> Option<SysZReg> {
    match *op {
        Op::Gpr(n) => Some(gpr(n)),
        Op::Fpr(n) => Some(numbered(SysZReg::F0, n)),
        Op::Acr(n) => Some(numbered(SysZReg::A0, n)),
        _ => None,
    }
}

fn op_text(op: &Op) -> String {
    match *op {
        Op::Imm(v) => signed_hex(v),
        Op::Uimm(v) | Op::Target(v) => hex(v),
        Op::Mask(m) => m.to_string(),
        Op::Mem { disp, index, base } => {
            let disp = signed_hex(disp);
            match (index, base) {
                (0, 0) => disp,
                (0, b) => format!("{}({})", disp, reg_text(gpr(b))),
                (x, 0) => format!("{}({}, 0)", disp, reg_text(gpr(x))),
                (x, b) => format!("{}({}, {})", disp, reg_text(gpr(x)), reg_text(gpr(b))),
            }
        }
        Op::Len { disp, length, base } => {
            format!("{}({}, {})", signed_hex(disp), length, reg_text(gpr(base)))
        }
        _ => op_reg(op).map(reg_text).unwrap_or_default(),
    }
}

fn render(d: &Decoded) -> String {
    d.ops.iter().map(op_text).collect::<Vec<_>>().join(", ")
}

fn is_store(insn: SysZInsn) -> bool {
    use SysZInsn as I;
    matches!(
        insn,
        I::St | I::Stc | I::Sth | I::Stg | I::Sty | I::Std | I::Ste | I::Stm | I::Stmg | I::Stmy
            | I::Stcy | I::Sthy | I::Strv | I::Strvg | I::Stey | I::Stdy
    )
}

fn is_compare(insn: SysZInsn) -> bool {
    use SysZInsn as I;
    matches!(
        insn,
        I::C | I::Cr | I::Ch | I::Chi | I::Cfi | I::Cg | I::Cgr | I::Cgfr | I::Cghi | I::Cgfi
            | I::Cy | I::Cl | I::Clr | I::Clg | I::Clgr | I::Clfi | I::Clgfi | I::Cly | I::Cli
            | I::Cliy | I::Clc | I::Tm | I::Tmy | I::Tmll | I::Tmlh | I::Cebr | I::Cdbr | I::Ceb
            | I::Cdb
    )
}

/// Compare and branch or trap; these leave the condition code alone.
fn is_compare_branch(insn: SysZInsn) -> bool {
    use SysZInsn as I;
    matches!(
        insn,
        I::Crj | I::Cgrj | I::Clrj | I::Clgrj | I::Cij | I::Cgij | I::Clij | I::Clgij | I::Crb
            | I::Cgrb | I::Clrb | I::Clgrb | I::Cib | I::Cgib | I::Clib | I::Clgib | I::Cit
            | I::Cgit | I::Clfit | I::Clgit
    )
}

/// Instructions that set the condition code.
fn sets_cc(insn: SysZInsn) -> bool {
    use SysZInsn as I;
    is_compare(insn)
        || matches!(
            insn,
            I::A | I::Ar | I::Ah | I::Ahi | I::Afi | I::Agfi | I::Ag | I::Agr | I::Agfr | I::Aghi
                | I::Ay | I::Al | I::Alr | I::Alfi | I::Algfi | I::Alg | I::Algr | I::S | I::Sr
                | I::Sh | I::Sy | I::Sg | I::Sgr | I::Sl | I::Slr | I::Slg | I::Slgr | I::Slfi
                | I::Slgfi | I::N | I::Nr | I::Ng | I::Ngr | I::Ny | I::O | I::Or | I::Og
                | I::Ogr | I::Oy | I::X | I::Xr | I::Xg | I::Xgr | I::Xy | I::Ni | I::Oi | I::Xi
                | I::Niy | I::Oiy | I::Xiy | I::Nc | I::Oc | I::Xc | I::Ltr | I::Ltgr | I::Ltgfr
                | I::Lpr | I::Lpgr | I::Lcr | I::Lcgr | I::Lnr | I::Lt | I::Ltg | I::Sla
                | I::Slda | I::Sra | I::Srda | I::Slag | I::Srag | I::Cs | I::Csy | I::Csg
                | I::Aebr | I::Adbr | I::Sebr | I::Sdbr | I::Aeb | I::Adb | I::Seb | I::Sdb
                | I::Ark | I::Agrk | I::Srk | I::Sgrk | I::Nrk | I::Ork | I::Xrk | I::Laa
                | I::Laag | I::Lan | I::Lao | I::Lax | I::Nihf | I::Nilf | I::Oihf | I::Oilf
                | I::Xihf | I::Xilf | I::Nihh | I::Nihl | I::Nilh | I::Nill | I::Oihh | I::Oihl
                | I::Oilh | I::Oill | I::Ahik | I::Aghik | I::Alhsik | I::Alghsik | I::Risbg
                | I::Rnsbg | I::Rosbg | I::Rxsbg
        )
}

fn access(d: &Decoded, index: usize) -> Access {
    use SysZInsn as I;
    let last = index + 1 == d.ops.len();
    match d.insn {
        _ if is_compare(d.insn) || is_compare_branch(d.insn) => Access::READ,
        I::Risbg | I::Risbhg | I::Risblg | I::Rnsbg | I::Rosbg | I::Rxsbg if index == 0 => {
            Access::READ_WRITE
        }
        I::Bcr | I::Bc | I::Brc | I::Brcl | I::Ex | I::Svc => Access::READ,
        I::Ni | I::Oi | I::Xi | I::Niy | I::Oiy | I::Xiy | I::Nc | I::Oc | I::Xc if index == 0 => {
            Access::READ_WRITE
        }
        I::Mvi | I::Mviy | I::Mvc if index == 0 => Access::WRITE,
        I::Mvi | I::Mviy | I::Mvc => Access::READ,
        _ if is_store(d.insn) && last => Access::WRITE,
        _ if is_store(d.insn) => Access::READ,
        I::Cs | I::Csy | I::Csg if index == 0 => Access::READ_WRITE,
        _ if index == 0 => Access::WRITE,
        _ => Access::READ,
    }
}

fn lower(op: &Op) -> SysZOperandKind {
    match *op {
        Op::Imm(v) => SysZOperandKind::Imm(v),
        Op::Uimm(v) | Op::Target(v) => SysZOperandKind::Imm(v as i64),
        Op::Mask(m) => SysZOperandKind::Imm(m as i64),
        Op::Mem { disp, index, base } => SysZOperandKind::Mem {
            base: if base == 0 { SysZReg::Invalid } else { gpr(base) },
            index: if index == 0 { SysZReg::Invalid } else { gpr(index) },
            length: 0,
            disp,
        },
        Op::Len { disp, length, base } => SysZOperandKind::Mem {
            base: if base == 0 { SysZReg::Invalid } else { gpr(base) },
            index: SysZReg::Invalid,
            length,
            disp,
        },
        _ => SysZOperandKind::Reg(op_reg(op).unwrap_or(SysZReg::Invalid)),
    }
}

fn detail(d: &Decoded) -> DetailParts {
    use SysZInsn as I;
    let operands = d
        .ops
        .iter()
        .enumerate()
        .map(|(i, op)| SysZOperand {
            kind: lower(op),
            access: access(d, i),
        })
        .collect();
    let mut parts = DetailParts::new(Detail::SysZ(SysZDetail {
        cc: d.cc,
        operands,
    }));

    match d.insn {
        I::Bcr | I::Bc | I::Brc | I::Brcl => {
            if d.cc != SysZCc::Invalid {
                parts.read(SysZReg::Cc.id());
            }
            parts.common(CommonGroup::Jump);
            if matches!(d.insn, I::Brc | I::Brcl) {
                parts.common(CommonGroup::BranchRelative);
            }
            if d.insn == I::Bcr && d.mnemonic.as_deref() == Some("br") && d.ops == [Op::Gpr(14)] {
                parts.common(CommonGroup::Ret);
            }
        }
        I::Balr | I::Basr | I::Bal | I::Bas => parts.common(CommonGroup::Call),
        I::Bras | I::Brasl => {
            parts.common(CommonGroup::Call);
            parts.common(CommonGroup::BranchRelative);
        }
        I::Bct | I::Bctr | I::Bctgr | I::Bxh | I::Bxle => parts.common(CommonGroup::Jump),
        I::Brct | I::Brctg => {
            parts.common(CommonGroup::Jump);
            parts.common(CommonGroup::BranchRelative);
        }
        I::Crj | I::Cgrj | I::Clrj | I::Clgrj | I::Cij | I::Cgij | I::Clij | I::Clgij => {
            parts.common(CommonGroup::Jump);
            parts.common(CommonGroup::BranchRelative);
        }
        I::Crb | I::Cgrb | I::Clrb | I::Clgrb | I::Cib | I::Cgib | I::Clib | I::Clgib => {
            parts.common(CommonGroup::Jump)
        }
        I::Svc => parts.common(CommonGroup::Int),
        I::Ipm => parts.read(SysZReg::Cc.id()),
        I::Locr | I::Locgr => parts.read(SysZReg::Cc.id()),
        _ => {}
    }
    if sets_cc(d.insn) {
        parts.write(SysZReg::Cc.id());
    }
    if let Some(group) = d.group {
        parts.arch_group(group.id());
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::Mode;
    use crate::Session;

    const CODE: [u8; 46] = [
        0xed, 0x00, 0x00, 0x00, 0x00, 0x1a, 0x5a, 0x0f, 0x1f, 0xff, 0xc2, 0x09, 0x80, 0x00,
        0x00, 0x00, 0x07, 0xf7, 0xeb, 0x2a, 0xff, 0xff, 0x7f, 0x57, 0xe3, 0x01, 0xff, 0xff,
        0x7f, 0x57, 0xeb, 0x00, 0xf0, 0x00, 0x00, 0x24, 0xb2, 0x4f, 0x00, 0x78, 0xec, 0x18,
        0x00, 0x00, 0xc1, 0x7f,
    ];

    #[test]
    fn test_systemz() {
        let insns = Session::open(Architecture::SysZ, Mode::BIG_ENDIAN)
            .unwrap()
            .disassemble_all(&CODE, 0x1000, 0);
        let text: Vec<String> = insns
            .iter()
            .map(|i| format!("{} {}", i.mnemonic, i.operands).trim_end().to_string())
            .collect();
        assert_eq!(
            text,
            [
                "adb %f0, 0",
                "a %r0, 0xfff(%r15, %r1)",
                "afi %r0, -0x80000000",
                "br %r7",
                "xiy 0x7ffff(%r15), 0x2a",
                "xy %r0, 0x7ffff(%r1, %r15)",
                "stmg %r0, %r0, 0(%r15)",
                "ear %r7, %a8",
                "clije %r1, 0xc1, 0x1028",
            ]
        );
        let sizes: Vec<u8> = insns.iter().map(|i| i.size).collect();
        assert_eq!(sizes, [6, 4, 6, 2, 6, 6, 6, 4, 6]);
    }

    #[test]
    fn test_detail() {
        let mut session = Session::open(Architecture::SysZ, Mode::BIG_ENDIAN).unwrap();
        session.set_detail(true);
        let insns = session.disassemble_all(&CODE, 0x1000, 0);

        let a = &insns[1];
        assert_eq!(a.regs_write, vec![SysZReg::Cc.id()]);
        let Some(Detail::SysZ(d)) = &a.detail else {
            panic!("missing systemz detail");
        };
        assert_eq!(d.operands[0].access, Access::WRITE);
        assert_eq!(
            d.operands[1].kind,
            SysZOperandKind::Mem {
                base: SysZReg::R1,
                index: SysZReg::R15,
                length: 0,
                disp: 0xfff
            }
        );

        let br = &insns[3];
        assert!(br.in_group(CommonGroup::Jump.id()));
        assert!(br.regs_read.is_empty());

        let xiy = &insns[4];
        let Some(Detail::SysZ(d)) = &xiy.detail else {
            panic!("missing systemz detail");
        };
        assert_eq!(d.operands[0].access, Access::READ_WRITE);
        assert_eq!(d.operands[1].kind, SysZOperandKind::Imm(0x2a));

        let stmg = &insns[6];
        assert!(stmg.regs_write.is_empty());

        // jne 0x1008
        let jne = session.decode_at(&[0xa7, 0x74, 0x00, 0x04], 0x1000).unwrap();
        assert_eq!(jne.regs_read, vec![SysZReg::Cc.id()]);
        let Some(Detail::SysZ(d)) = &jne.detail else {
            panic!("missing systemz detail");
        };
        assert_eq!(d.cc, SysZCc::Ne);

        // br %r14
        let ret = session.decode_at(&[0x07, 0xfe], 0).unwrap();
        assert!(ret.is_return());

        let clij = &insns[8];
        assert!(clij.in_group(CommonGroup::Jump.id()));
        assert!(clij.in_group(CommonGroup::BranchRelative.id()));
        assert!(clij.regs_write.is_empty());
        let Some(Detail::SysZ(d)) = &clij.detail else {
            panic!("missing systemz detail");
        };
        assert_eq!(d.cc, SysZCc::E);
        assert!(d.operands.iter().all(|op| op.access == Access::READ));

        // ark %r1, %r2, %r3
        let ark = session.decode_at(&[0xb9, 0xf8, 0x30, 0x12], 0).unwrap();
        assert!(ark.in_group(128 + SysZGroup::DistinctOps.id()));
    }

    #[test]
    fn test_truncated_long_form() {
        let insns = Session::open(Architecture::SysZ, Mode::BIG_ENDIAN)
            .unwrap()
            .disassemble_all(&[0x07, 0xf7, 0xe3, 0x01, 0xff], 0, 0);
        assert_eq!(insns.len(), 1);
    }
}
