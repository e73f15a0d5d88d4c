//! SPARC v8 and v9 decoding.
//!
//! Instructions are one big-endian word. V9-only encodings (BPcc, BPr, `casx`, 64-bit shifts)
//! decode in either mode and are tagged with the `v9` group; the V9 mode flag widens branch
//! targets to 64 bits and selects `return` over `rett`.

mod decode;

use bitflags::bitflags;

use crate::arch::{hex, signed_hex};
use crate::cursor::Cursor;
use crate::decoder::{self, ArchDecoder, DecodeConfig, DecodeError, StreamState};
use crate::detail::{Access, CommonGroup, Detail, DetailParts};
use crate::names::NameTables;
use crate::{Address, Architecture, Instruction};

registry! {
    /// SPARC registers.
    pub enum SparcReg: u16 {
        Invalid => "", G0 => "g0", G1 => "g1", G2 => "g2",
        G3 => "g3", G4 => "g4", G5 => "g5", G6 => "g6",
        G7 => "g7", O0 => "o0", O1 => "o1", O2 => "o2",
        O3 => "o3", O4 => "o4", O5 => "o5", Sp => "sp",
        O7 => "o7", L0 => "l0", L1 => "l1", L2 => "l2",
        L3 => "l3", L4 => "l4", L5 => "l5", L6 => "l6",
        L7 => "l7", I0 => "i0", I1 => "i1", I2 => "i2",
        I3 => "i3", I4 => "i4", I5 => "i5", Fp => "fp",
        I7 => "i7", F0 => "f0", F1 => "f1", F2 => "f2",
        F3 => "f3", F4 => "f4", F5 => "f5", F6 => "f6",
        F7 => "f7", F8 => "f8", F9 => "f9", F10 => "f10",
        F11 => "f11", F12 => "f12", F13 => "f13", F14 => "f14",
        F15 => "f15", F16 => "f16", F17 => "f17", F18 => "f18",
        F19 => "f19", F20 => "f20", F21 => "f21", F22 => "f22",
        F23 => "f23", F24 => "f24", F25 => "f25", F26 => "f26",
        F27 => "f27", F28 => "f28", F29 => "f29", F30 => "f30",
        F31 => "f31", F32 => "f32", F34 => "f34", F36 => "f36",
        F38 => "f38", F40 => "f40", F42 => "f42", F44 => "f44",
        F46 => "f46", F48 => "f48", F50 => "f50", F52 => "f52",
        F54 => "f54", F56 => "f56", F58 => "f58", F60 => "f60",
        F62 => "f62", Fcc0 => "fcc0", Fcc1 => "fcc1", Fcc2 => "fcc2",
        Fcc3 => "fcc3", Icc => "icc", Xcc => "xcc", Y => "y",
        Fsr => "fsr", Asi => "asi",
    }
}

registry! {
    /// SPARC instructions. Conditional branches and traps share one id per format.
    pub enum SparcInsn: u16 {
        Invalid => "", Add => "add", Addcc => "addcc", Addx => "addx",
        Addxcc => "addxcc", And => "and", Andcc => "andcc", Andn => "andn",
        Andncc => "andncc", B => "b", Brgez => "brgez", Brgz => "brgz",
        Brlez => "brlez", Brlz => "brlz", Brnz => "brnz", Brz => "brz",
        Call => "call", Cas => "cas", Casa => "casa", Casx => "casx",
        Casxa => "casxa", Cmp => "cmp", Fabsd => "fabsd", Fabsq => "fabsq",
        Fabss => "fabss", Faddd => "faddd", Faddq => "faddq", Fadds => "fadds",
        Faligndata => "faligndata", Fand => "fand", Fb => "fb", Fcmpd => "fcmpd",
        Fcmped => "fcmped", Fcmpeq => "fcmpeq", Fcmpes => "fcmpes", Fcmpq => "fcmpq",
        Fcmps => "fcmps", Fdivd => "fdivd", Fdivq => "fdivq", Fdivs => "fdivs",
        Fdmulq => "fdmulq", Fdtoi => "fdtoi", Fdtoq => "fdtoq", Fdtos => "fdtos",
        Fdtox => "fdtox", Fitod => "fitod", Fitoq => "fitoq", Fitos => "fitos",
        Flush => "flush", Fmovd => "fmovd", Fmovq => "fmovq", Fmovs => "fmovs",
        Fmuld => "fmuld", Fmulq => "fmulq", Fmuls => "fmuls", Fnegd => "fnegd",
        Fnegq => "fnegq", Fnegs => "fnegs", Fone => "fone", Fones => "fones",
        For => "for", Fpadd16 => "fpadd16", Fpadd32 => "fpadd32", Fpsub16 => "fpsub16",
        Fpsub32 => "fpsub32", Fqtod => "fqtod", Fqtoi => "fqtoi", Fqtos => "fqtos",
        Fqtox => "fqtox", Fsmuld => "fsmuld", Fsqrtd => "fsqrtd", Fsqrtq => "fsqrtq",
        Fsqrts => "fsqrts", Fsrc1 => "fsrc1", Fsrc2 => "fsrc2", Fstod => "fstod",
        Fstoi => "fstoi", Fstoq => "fstoq", Fstox => "fstox", Fsubd => "fsubd",
        Fsubq => "fsubq", Fsubs => "fsubs", Fxor => "fxor", Fxtod => "fxtod",
        Fxtoq => "fxtoq", Fxtos => "fxtos", Fzero => "fzero", Fzeros => "fzeros",
        Jmp => "jmp", Jmpl => "jmpl", Ld => "ld", Lda => "lda",
        Ldd => "ldd", Ldda => "ldda", Ldq => "ldq", Ldsb => "ldsb",
        Ldsba => "ldsba", Ldsh => "ldsh", Ldsha => "ldsha", Ldstub => "ldstub",
        Ldstuba => "ldstuba", Ldsw => "ldsw", Ldswa => "ldswa", Ldub => "ldub",
        Lduba => "lduba", Lduh => "lduh", Lduha => "lduha", Ldx => "ldx",
        Ldxa => "ldxa", Mov => "mov", Mulscc => "mulscc", Mulx => "mulx",
        Neg => "neg", Nop => "nop", Not => "not", Or => "or",
        Orcc => "orcc", Orn => "orn", Orncc => "orncc", Popc => "popc",
        Rd => "rd", Restore => "restore", Ret => "ret", Retl => "retl",
        Rett => "rett", Return => "return", Save => "save", Sdiv => "sdiv",
        Sdivcc => "sdivcc", Sdivx => "sdivx", Sethi => "sethi", Sll => "sll",
        Sllx => "sllx", Smul => "smul", Smulcc => "smulcc", Sra => "sra",
        Srax => "srax", Srl => "srl", Srlx => "srlx", St => "st",
        Sta => "sta", Stb => "stb", Stba => "stba", Stbar => "stbar",
        Std => "std", Stda => "stda", Sth => "sth", Stha => "stha",
        Stq => "stq", Stx => "stx", Stxa => "stxa", Sub => "sub",
        Subcc => "subcc", Subx => "subx", Subxcc => "subxcc", Swap => "swap",
        Swapa => "swapa", T => "t", Taddcc => "taddcc", Taddcctv => "taddcctv",
        Tst => "tst", Tsubcc => "tsubcc", Tsubcctv => "tsubcctv", Udiv => "udiv",
        Udivcc => "udivcc", Udivx => "udivx", Umul => "umul", Umulcc => "umulcc",
        Unimp => "unimp", Wr => "wr", Xnor => "xnor", Xnorcc => "xnorcc",
        Xor => "xor", Xorcc => "xorcc",
    }
}

registry! {
    /// SPARC-specific groups; ids start at 128.
    pub enum SparcGroup: u8 {
        HardQuad => "hardquad",
        V9 => "v9",
        Vis => "vis",
        Bit64 => "64bit",
    }
}

pub static NAMES: NameTables = NameTables {
    registers: SparcReg::NAMES,
    instructions: SparcInsn::NAMES,
    groups: SparcGroup::NAMES,
};

registry! {
    /// Branch and trap conditions, integer then floating point.
    pub enum SparcCc: u8 {
        Invalid => "", A => "a", N => "n", Ne => "ne",
        E => "e", G => "g", Le => "le", Ge => "ge",
        L => "l", Gu => "gu", Leu => "leu", Cc => "cc",
        Cs => "cs", Pos => "pos", Neg => "neg", Vc => "vc",
        Vs => "vs", FccA => "a", FccN => "n", FccU => "u",
        FccG => "g", FccUg => "ug", FccL => "l", FccUl => "ul",
        FccLg => "lg", FccNe => "ne", FccE => "e", FccUe => "ue",
        FccGe => "ge", FccUge => "uge", FccLe => "le", FccUle => "ule",
        FccO => "o",
    }
}

bitflags! {
    /// Annul and prediction suffixes of a branch.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SparcHint: u8 {
        const A = 1 << 0;
        const PT = 1 << 1;
        const PN = 1 << 2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SparcOperandKind {
    Reg(SparcReg),
    Imm(i64),
    /// `[base + index]` or `[base + disp]`; `index` is `Invalid` for the immediate form.
    Mem {
        base: SparcReg,
        index: SparcReg,
        disp: i64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SparcOperand {
    pub kind: SparcOperandKind,
    pub access: Access,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparcDetail {
    pub cc: SparcCc,
    pub hint: SparcHint,
    pub operands: Vec<SparcOperand>,
}

/// Address space of an alternate-space load or store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Asi {
    Imm(u8),
    /// Taken from the `%asi` register.
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Reg(SparcReg),
    Imm(i64),
    Uimm(u64),
    Target(u64),
    /// Unbracketed address (`jmpl`, `flush`, `rett`).
    Addr {
        base: SparcReg,
        index: Option<SparcReg>,
        disp: i64,
    },
    Mem {
        base: SparcReg,
        index: Option<SparcReg>,
        disp: i64,
        asi: Option<Asi>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Decoded {
    pub insn: SparcInsn,
    /// Condition-qualified mnemonic of branches and traps.
    pub mnemonic: Option<String>,
    pub ops: Vec<Op>,
    pub cc: SparcCc,
    pub hint: SparcHint,
    pub vis: bool,
}

impl Decoded {
    pub(crate) fn new(insn: SparcInsn, ops: Vec<Op>) -> Self {
        Self {
            insn,
            mnemonic: None,
            ops,
            cc: SparcCc::Invalid,
            hint: SparcHint::empty(),
            vis: false,
        }
    }

    pub(crate) fn vis(mut self) -> Self {
        self.vis = true;
        self
    }

    fn mnemonic(&self) -> String {
        match &self.mnemonic {
            Some(m) => m.clone(),
            None => self.insn.name().to_string(),
        }
    }
}

fn offset(base: SparcReg, n: u32) -> SparcReg {
    SparcReg::from_id(base.id() as u32 + n).unwrap_or(SparcReg::Invalid)
}

/// Integer register by window-relative number (`%g0`..`%i7`).
pub(crate) fn gpr(n: u32) -> SparcReg {
    offset(SparcReg::G0, n & 31)
}

pub(crate) fn fpr(n: u32) -> SparcReg {
    offset(SparcReg::F0, n & 31)
}

/// Double and quad registers fold bit 5 of the register number into bit 0 of the field.
pub(crate) fn double(n: u32) -> SparcReg {
    let number = (n & 0x1e) | ((n & 1) << 5);
    if number < 32 {
        fpr(number)
    } else {
        offset(SparcReg::F32, (number - 32) / 2)
    }
}

pub(crate) fn fcc(n: u32) -> SparcReg {
    offset(SparcReg::Fcc0, n & 3)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SparcDecoder;

impl ArchDecoder for SparcDecoder {
    fn architecture(&self) -> Architecture {
        Architecture::Sparc
    }

    fn decode_one(
        &self,
        cursor: &mut Cursor<'_>,
        address: Address,
        config: &DecodeConfig,
        _state: &mut StreamState,
    ) -> Result<Instruction, DecodeError> {
        let word = cursor.read_u32_with(config.mode.endian())?;
        let decoded = decode::decode(word, address, config.mode)?;
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

fn reg_text(reg: SparcReg) -> String {
    format!("%{}", reg.name())
}

fn address_text(base: SparcReg, index: Option<SparcReg>, disp: i64) -> String {
    let mut text = reg_text(base);
    if let Some(index) = index.filter(|&r| r != SparcReg::G0) {
        text.push('+');
        text.push_str(&reg_text(index));
    } else if index.is_none() && disp != 0 {
        text.push('+');
        text.push_str(&signed_hex(disp));
    }
    text
}

fn op_text(op: &Op) -> String {
    match *op {
        Op::Reg(r) => reg_text(r),
        Op::Imm(v) => signed_hex(v),
        Op::Uimm(v) | Op::Target(v) => hex(v),
        Op::Addr { base, index, disp } => address_text(base, index, disp),
        Op::Mem {
            base,
            index,
            disp,
            asi,
        } => {
            let text = format!("[{}]", address_text(base, index, disp));
            match asi {
                None => text,
                Some(Asi::Imm(asi)) => format!("{} {}", text, hex(asi as u64)),
                Some(Asi::Register) => format!("{} %asi", text),
            }
        }
    }
}

fn render(d: &Decoded) -> String {
    d.ops.iter().map(op_text).collect::<Vec<_>>().join(", ")
}

fn is_store(insn: SparcInsn) -> bool {
    use SparcInsn as I;
    matches!(
        insn,
        I::St | I::Stb | I::Sth | I::Std | I::Stx | I::Stq | I::Sta | I::Stba | I::Stha | I::Stda
            | I::Stxa
    )
}

/// The trailing operand is the destination register.
fn last_operand_written(d: &Decoded) -> bool {
    use SparcInsn as I;
    !d.ops.is_empty()
        && !is_store(d.insn)
        && !matches!(
            d.insn,
            I::B | I::Fb | I::Brz | I::Brlez | I::Brlz | I::Brnz | I::Brgz | I::Brgez | I::Cmp
                | I::Tst | I::Fcmps | I::Fcmpd | I::Fcmpq | I::Fcmpes | I::Fcmped | I::Fcmpeq
                | I::Jmp | I::Call | I::Flush | I::T | I::Rett | I::Return | I::Unimp
        )
}

fn is_exchange(insn: SparcInsn) -> bool {
    use SparcInsn as I;
    matches!(insn, I::Swap | I::Swapa | I::Cas | I::Casa | I::Casx | I::Casxa)
}

fn sets_icc(insn: SparcInsn) -> bool {
    use SparcInsn as I;
    matches!(
        insn,
        I::Addcc | I::Andcc | I::Orcc | I::Xorcc | I::Subcc | I::Andncc | I::Orncc | I::Xnorcc
            | I::Addxcc | I::Umulcc | I::Smulcc | I::Subxcc | I::Udivcc | I::Sdivcc | I::Taddcc
            | I::Tsubcc | I::Taddcctv | I::Tsubcctv | I::Mulscc | I::Cmp | I::Tst
    )
}

fn is_v9(insn: SparcInsn) -> bool {
    use SparcInsn as I;
    matches!(
        insn,
        I::Mulx | I::Udivx | I::Sdivx | I::Sllx | I::Srlx | I::Srax | I::Popc | I::Ldsw | I::Ldx
            | I::Stx | I::Ldswa | I::Ldxa | I::Stxa | I::Cas | I::Casa | I::Casx | I::Casxa
            | I::Return | I::Brz | I::Brlez | I::Brlz | I::Brnz | I::Brgz | I::Brgez | I::Fmovd
            | I::Fmovq | I::Fnegd | I::Fnegq | I::Fabsd | I::Fabsq | I::Fstox | I::Fdtox
            | I::Fqtox | I::Fxtos | I::Fxtod | I::Fxtoq
    )
}

fn is_64bit(insn: SparcInsn) -> bool {
    use SparcInsn as I;
    matches!(
        insn,
        I::Mulx | I::Udivx | I::Sdivx | I::Sllx | I::Srlx | I::Srax | I::Ldx | I::Stx | I::Ldxa
            | I::Stxa | I::Casx | I::Casxa
    )
}

fn is_quad(insn: SparcInsn) -> bool {
    use SparcInsn as I;
    matches!(
        insn,
        I::Ldq | I::Stq | I::Fmovq | I::Fnegq | I::Fabsq | I::Fsqrtq | I::Faddq | I::Fsubq
            | I::Fmulq | I::Fdivq | I::Fdmulq | I::Fqtox | I::Fxtoq | I::Fqtos | I::Fqtod
            | I::Fitoq | I::Fstoq | I::Fdtoq | I::Fqtoi | I::Fcmpq | I::Fcmpeq
    )
}

fn lower(op: &Op) -> SparcOperandKind {
    match *op {
        Op::Reg(r) => SparcOperandKind::Reg(r),
        Op::Imm(v) => SparcOperandKind::Imm(v),
        Op::Uimm(v) | Op::Target(v) => SparcOperandKind::Imm(v as i64),
        Op::Addr { base, index, disp } | Op::Mem { base, index, disp, .. } => {
            SparcOperandKind::Mem {
                base,
                index: index.unwrap_or(SparcReg::Invalid),
                disp,
            }
        }
    }
}

fn detail(d: &Decoded) -> DetailParts {
    use SparcInsn as I;
    let last = d.ops.len().saturating_sub(1);
    let written = last_operand_written(d);
    let operands = d
        .ops
        .iter()
        .enumerate()
        .map(|(i, op)| SparcOperand {
            kind: lower(op),
            access: match i == last {
                true if is_exchange(d.insn) => Access::READ_WRITE,
                true if written => Access::WRITE,
                _ => Access::READ,
            },
        })
        .collect();
    let mut parts = DetailParts::new(Detail::Sparc(SparcDetail {
        cc: d.cc,
        hint: d.hint,
        operands,
    }));

    let flags = d.ops.iter().find_map(|op| match op {
        Op::Reg(r @ (SparcReg::Icc | SparcReg::Xcc)) => Some(*r),
        Op::Reg(r) if (SparcReg::Fcc0.id()..=SparcReg::Fcc3.id()).contains(&r.id()) => Some(*r),
        _ => None,
    });

    match d.insn {
        I::B | I::Fb => {
            let default = if d.insn == I::B { SparcReg::Icc } else { SparcReg::Fcc0 };
            if !matches!(d.cc, SparcCc::A | SparcCc::N | SparcCc::FccA | SparcCc::FccN) {
                parts.read(flags.unwrap_or(default).id());
            }
            parts.common(CommonGroup::Jump);
            parts.common(CommonGroup::BranchRelative);
        }
        I::Brz | I::Brlez | I::Brlz | I::Brnz | I::Brgz | I::Brgez => {
            parts.common(CommonGroup::Jump);
            parts.common(CommonGroup::BranchRelative);
        }
        I::Call => {
            parts.write(SparcReg::O7.id());
            parts.common(CommonGroup::Call);
            if matches!(d.ops.first(), Some(Op::Target(_))) {
                parts.common(CommonGroup::BranchRelative);
            }
        }
        I::Jmp | I::Jmpl => parts.common(CommonGroup::Jump),
        I::Ret | I::Retl | I::Return => {
            let link = if d.insn == I::Retl { SparcReg::O7 } else { SparcReg::I7 };
            if d.insn != I::Return {
                parts.read(link.id());
            }
            parts.common(CommonGroup::Ret);
            parts.common(CommonGroup::Jump);
        }
        I::Rett => {
            parts.common(CommonGroup::Iret);
            parts.common(CommonGroup::Privilege);
        }
        I::T => {
            if d.cc != SparcCc::A {
                parts.read(SparcReg::Icc.id());
            }
            parts.common(CommonGroup::Int);
        }
        I::Fcmps | I::Fcmpd | I::Fcmpq | I::Fcmpes | I::Fcmped | I::Fcmpeq => {
            parts.write(flags.unwrap_or(SparcReg::Fcc0).id());
        }
        I::Rd => parts.read(SparcReg::Y.id()),
        I::Wr => parts.write(SparcReg::Y.id()),
        I::Umul | I::Smul | I::Umulcc | I::Smulcc => parts.write(SparcReg::Y.id()),
        I::Udiv | I::Sdiv | I::Udivcc | I::Sdivcc => parts.read(SparcReg::Y.id()),
        I::Mulscc => {
            parts.read(SparcReg::Y.id());
            parts.write(SparcReg::Y.id());
        }
        _ => {}
    }
    if matches!(d.insn, I::Addx | I::Subx | I::Addxcc | I::Subxcc | I::Mulscc) {
        parts.read(SparcReg::Icc.id());
    }
    if sets_icc(d.insn) {
        parts.write(SparcReg::Icc.id());
    }

    if is_quad(d.insn) {
        parts.arch_group(SparcGroup::HardQuad.id());
    }
    if is_v9(d.insn) || d.hint.intersects(SparcHint::PT | SparcHint::PN) {
        parts.arch_group(SparcGroup::V9.id());
    }
    if d.vis {
        parts.arch_group(SparcGroup::Vis.id());
    }
    if is_64bit(d.insn) {
        parts.arch_group(SparcGroup::Bit64.id());
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::Mode;
    use crate::Session;

    const CODE: [u8; 64] = [
        0x80, 0xa0, 0x40, 0x02, 0x85, 0xc2, 0x60, 0x08, 0x85, 0xe8, 0x20, 0x01, 0x81, 0xe8,
        0x00, 0x00, 0x90, 0x10, 0x20, 0x01, 0xd5, 0xf6, 0x10, 0x16, 0x21, 0x00, 0x00, 0x0a,
        0x86, 0x00, 0x40, 0x02, 0x01, 0x00, 0x00, 0x00, 0x12, 0xbf, 0xff, 0xff, 0x10, 0xbf,
        0xff, 0xff, 0xa0, 0x02, 0x00, 0x09, 0x0d, 0xbf, 0xff, 0xff, 0xd4, 0x20, 0x60, 0x00,
        0xd4, 0x4e, 0x00, 0x16, 0x2a, 0xc2, 0x80, 0x03,
    ];

    const CODE_V9: [u8; 16] = [
        0x81, 0xa8, 0x0a, 0x24, 0x89, 0xa0, 0x10, 0x20, 0x89, 0xa0, 0x1a, 0x60, 0x89, 0xa0,
        0x00, 0xe0,
    ];

    fn lines(mode: Mode, code: &[u8]) -> Vec<String> {
        Session::open(Architecture::Sparc, mode)
            .unwrap()
            .disassemble_all(code, 0x1000, 0)
            .iter()
            .map(|i| format!("{} {}", i.mnemonic, i.operands).trim_end().to_string())
            .collect()
    }

    #[test]
    fn test_sparc() {
        assert_eq!(
            lines(Mode::BIG_ENDIAN, &CODE),
            [
                "cmp %g1, %g2",
                "jmpl %o1+8, %g2",
                "restore %g0, 1, %g2",
                "restore",
                "mov 1, %o0",
                "casx [%i0], %l6, %o2",
                "sethi 0xa, %l0",
                "add %g1, %g2, %g3",
                "nop",
                "bne 0x1020",
                "ba 0x1024",
                "add %o0, %o1, %l0",
                "fbg 0x102c",
                "st %o2, [%g1]",
                "ldsb [%i0+%l6], %o2",
                "brnz,a,pn %o2, 0x1048",
            ]
        );
    }

    #[test]
    fn test_sparc_v9() {
        assert_eq!(
            lines(Mode::BIG_ENDIAN | Mode::V9, &CODE_V9),
            [
                "fcmps %f0, %f4",
                "fstox %f0, %f4",
                "fqtoi %f0, %f4",
                "fnegq %f0, %f4",
            ]
        );
    }

    #[test]
    fn test_detail() {
        let mut session = Session::open(Architecture::Sparc, Mode::BIG_ENDIAN).unwrap();
        session.set_detail(true);
        let insns = session.disassemble_all(&CODE, 0x1000, 0);

        let cmp = &insns[0];
        assert_eq!(cmp.regs_write, vec![SparcReg::Icc.id()]);
        let Some(Detail::Sparc(d)) = &cmp.detail else {
            panic!("missing sparc detail");
        };
        assert_eq!(d.operands.len(), 2);
        assert!(d.operands.iter().all(|op| op.access == Access::READ));

        let casx = &insns[5];
        assert!(casx.in_group(128 + SparcGroup::V9.id()));
        assert!(casx.in_group(128 + SparcGroup::Bit64.id()));
        let Some(Detail::Sparc(d)) = &casx.detail else {
            panic!("missing sparc detail");
        };
        assert_eq!(d.operands[2].access, Access::READ_WRITE);

        let bne = &insns[9];
        assert_eq!(bne.regs_read, vec![SparcReg::Icc.id()]);
        assert!(bne.is_branch());
        let Some(Detail::Sparc(d)) = &bne.detail else {
            panic!("missing sparc detail");
        };
        assert_eq!(d.cc, SparcCc::Ne);

        let ldsb = &insns[14];
        let Some(Detail::Sparc(d)) = &ldsb.detail else {
            panic!("missing sparc detail");
        };
        assert_eq!(
            d.operands[0].kind,
            SparcOperandKind::Mem {
                base: SparcReg::I0,
                index: SparcReg::L6,
                disp: 0
            }
        );
        assert_eq!(d.operands[1].access, Access::WRITE);

        let brnz = &insns[15];
        let Some(Detail::Sparc(d)) = &brnz.detail else {
            panic!("missing sparc detail");
        };
        assert_eq!(d.hint, SparcHint::A | SparcHint::PN);
    }

    #[test]
    fn test_quad_group() {
        let mut session = Session::open(Architecture::Sparc, Mode::BIG_ENDIAN | Mode::V9).unwrap();
        session.set_detail(true);
        let fnegq = session.decode_at(&CODE_V9[12..], 0).unwrap();
        assert!(fnegq.in_group(128 + SparcGroup::HardQuad.id()));
        let fcmps = session.decode_at(&CODE_V9[..4], 0).unwrap();
        assert_eq!(fcmps.regs_write, vec![SparcReg::Fcc0.id()]);
    }
}
