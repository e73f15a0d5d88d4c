//! AArch64 decoder.
//!
//! Every instruction is one 32-bit word. [`decode`] handles the integer, branch, system and
//! load/store classes; [`fp`] covers scalar floating point and the Advanced SIMD subset.
//! Preferred-alias selection (`mov`, `cmp`, `lsl`, `cset`, ...) happens at decode time so the
//! instruction id always names the printed form.

mod decode;
mod fp;

use crate::arch::{hex, signed_hex};
use crate::cursor::Cursor;
use crate::decoder::{self, ArchDecoder, DecodeConfig, DecodeError, StreamState};
use crate::detail::{Access, CommonGroup, Detail, DetailParts};
use crate::names::NameTables;
use crate::{Address, Architecture, Instruction};

registry! {
    /// AArch64 registers.
    pub enum Arm64Reg: u16 {
        Invalid => "", X0 => "x0", X1 => "x1", X2 => "x2",
        X3 => "x3", X4 => "x4", X5 => "x5", X6 => "x6",
        X7 => "x7", X8 => "x8", X9 => "x9", X10 => "x10",
        X11 => "x11", X12 => "x12", X13 => "x13", X14 => "x14",
        X15 => "x15", X16 => "x16", X17 => "x17", X18 => "x18",
        X19 => "x19", X20 => "x20", X21 => "x21", X22 => "x22",
        X23 => "x23", X24 => "x24", X25 => "x25", X26 => "x26",
        X27 => "x27", X28 => "x28", X29 => "x29", X30 => "x30",
        Xzr => "xzr", Sp => "sp", W0 => "w0", W1 => "w1",
        W2 => "w2", W3 => "w3", W4 => "w4", W5 => "w5",
        W6 => "w6", W7 => "w7", W8 => "w8", W9 => "w9",
        W10 => "w10", W11 => "w11", W12 => "w12", W13 => "w13",
        W14 => "w14", W15 => "w15", W16 => "w16", W17 => "w17",
        W18 => "w18", W19 => "w19", W20 => "w20", W21 => "w21",
        W22 => "w22", W23 => "w23", W24 => "w24", W25 => "w25",
        W26 => "w26", W27 => "w27", W28 => "w28", W29 => "w29",
        W30 => "w30", Wzr => "wzr", Wsp => "wsp", B0 => "b0",
        B1 => "b1", B2 => "b2", B3 => "b3", B4 => "b4",
        B5 => "b5", B6 => "b6", B7 => "b7", B8 => "b8",
        B9 => "b9", B10 => "b10", B11 => "b11", B12 => "b12",
        B13 => "b13", B14 => "b14", B15 => "b15", B16 => "b16",
        B17 => "b17", B18 => "b18", B19 => "b19", B20 => "b20",
        B21 => "b21", B22 => "b22", B23 => "b23", B24 => "b24",
        B25 => "b25", B26 => "b26", B27 => "b27", B28 => "b28",
        B29 => "b29", B30 => "b30", B31 => "b31", H0 => "h0",
        H1 => "h1", H2 => "h2", H3 => "h3", H4 => "h4",
        H5 => "h5", H6 => "h6", H7 => "h7", H8 => "h8",
        H9 => "h9", H10 => "h10", H11 => "h11", H12 => "h12",
        H13 => "h13", H14 => "h14", H15 => "h15", H16 => "h16",
        H17 => "h17", H18 => "h18", H19 => "h19", H20 => "h20",
        H21 => "h21", H22 => "h22", H23 => "h23", H24 => "h24",
        H25 => "h25", H26 => "h26", H27 => "h27", H28 => "h28",
        H29 => "h29", H30 => "h30", H31 => "h31", S0 => "s0",
        S1 => "s1", S2 => "s2", S3 => "s3", S4 => "s4",
        S5 => "s5", S6 => "s6", S7 => "s7", S8 => "s8",
        S9 => "s9", S10 => "s10", S11 => "s11", S12 => "s12",
        S13 => "s13", S14 => "s14", S15 => "s15", S16 => "s16",
        S17 => "s17", S18 => "s18", S19 => "s19", S20 => "s20",
        S21 => "s21", S22 => "s22", S23 => "s23", S24 => "s24",
        S25 => "s25", S26 => "s26", S27 => "s27", S28 => "s28",
        S29 => "s29", S30 => "s30", S31 => "s31", D0 => "d0",
        D1 => "d1", D2 => "d2", D3 => "d3", D4 => "d4",
        D5 => "d5", D6 => "d6", D7 => "d7", D8 => "d8",
        D9 => "d9", D10 => "d10", D11 => "d11", D12 => "d12",
        D13 => "d13", D14 => "d14", D15 => "d15", D16 => "d16",
        D17 => "d17", D18 => "d18", D19 => "d19", D20 => "d20",
        D21 => "d21", D22 => "d22", D23 => "d23", D24 => "d24",
        D25 => "d25", D26 => "d26", D27 => "d27", D28 => "d28",
        D29 => "d29", D30 => "d30", D31 => "d31", Q0 => "q0",
        Q1 => "q1", Q2 => "q2", Q3 => "q3", Q4 => "q4",
        Q5 => "q5", Q6 => "q6", Q7 => "q7", Q8 => "q8",
        Q9 => "q9", Q10 => "q10", Q11 => "q11", Q12 => "q12",
        Q13 => "q13", Q14 => "q14", Q15 => "q15", Q16 => "q16",
        Q17 => "q17", Q18 => "q18", Q19 => "q19", Q20 => "q20",
        Q21 => "q21", Q22 => "q22", Q23 => "q23", Q24 => "q24",
        Q25 => "q25", Q26 => "q26", Q27 => "q27", Q28 => "q28",
        Q29 => "q29", Q30 => "q30", Q31 => "q31", V0 => "v0",
        V1 => "v1", V2 => "v2", V3 => "v3", V4 => "v4",
        V5 => "v5", V6 => "v6", V7 => "v7", V8 => "v8",
        V9 => "v9", V10 => "v10", V11 => "v11", V12 => "v12",
        V13 => "v13", V14 => "v14", V15 => "v15", V16 => "v16",
        V17 => "v17", V18 => "v18", V19 => "v19", V20 => "v20",
        V21 => "v21", V22 => "v22", V23 => "v23", V24 => "v24",
        V25 => "v25", V26 => "v26", V27 => "v27", V28 => "v28",
        V29 => "v29", V30 => "v30", V31 => "v31", Nzcv => "nzcv",
        Fpcr => "fpcr", Fpsr => "fpsr",
    }
}

registry! {
    /// AArch64 instructions.
    pub enum Arm64Insn: u16 {
        Invalid => "", Abs => "abs", Adc => "adc", Adcs => "adcs",
        Add => "add", Addp => "addp", Adds => "adds", Addv => "addv",
        Adr => "adr", Adrp => "adrp", And => "and", Ands => "ands",
        Asr => "asr", B => "b", Bfi => "bfi", Bfxil => "bfxil",
        Bic => "bic", Bics => "bics", Bif => "bif", Bit => "bit",
        Bl => "bl", Blr => "blr", Br => "br", Brk => "brk",
        Bsl => "bsl", Cbnz => "cbnz", Cbz => "cbz", Ccmn => "ccmn",
        Ccmp => "ccmp", Cinc => "cinc", Cinv => "cinv", Clrex => "clrex",
        Cls => "cls", Clz => "clz", Cmeq => "cmeq", Cmge => "cmge",
        Cmgt => "cmgt", Cmhi => "cmhi", Cmhs => "cmhs", Cmn => "cmn",
        Cmp => "cmp", Cmtst => "cmtst", Cneg => "cneg", Cnt => "cnt",
        Crc32b => "crc32b", Crc32cb => "crc32cb", Crc32ch => "crc32ch", Crc32cw => "crc32cw",
        Crc32cx => "crc32cx", Crc32h => "crc32h", Crc32w => "crc32w", Crc32x => "crc32x",
        Csel => "csel", Cset => "cset", Csetm => "csetm", Csinc => "csinc",
        Csinv => "csinv", Csneg => "csneg", Dmb => "dmb", Drps => "drps",
        Dsb => "dsb", Dup => "dup", Eon => "eon", Eor => "eor",
        Eret => "eret", Extr => "extr", Fabs => "fabs", Fadd => "fadd",
        Faddp => "faddp", Fccmp => "fccmp", Fccmpe => "fccmpe", Fcmeq => "fcmeq",
        Fcmp => "fcmp", Fcmpe => "fcmpe", Fcsel => "fcsel", Fcvt => "fcvt",
        Fcvtas => "fcvtas", Fcvtau => "fcvtau", Fcvtms => "fcvtms", Fcvtmu => "fcvtmu",
        Fcvtns => "fcvtns", Fcvtnu => "fcvtnu", Fcvtps => "fcvtps", Fcvtpu => "fcvtpu",
        Fcvtzs => "fcvtzs", Fcvtzu => "fcvtzu", Fdiv => "fdiv", Fmadd => "fmadd",
        Fmax => "fmax", Fmaxnm => "fmaxnm", Fmin => "fmin", Fminnm => "fminnm",
        Fmla => "fmla", Fmls => "fmls", Fmov => "fmov", Fmsub => "fmsub",
        Fmul => "fmul", Fneg => "fneg", Fnmadd => "fnmadd", Fnmsub => "fnmsub",
        Fnmul => "fnmul", Frinta => "frinta", Frinti => "frinti", Frintm => "frintm",
        Frintn => "frintn", Frintp => "frintp", Frintx => "frintx", Frintz => "frintz",
        Fsqrt => "fsqrt", Fsub => "fsub", Hint => "hint", Hlt => "hlt",
        Hvc => "hvc", Ins => "ins", Isb => "isb", Ldar => "ldar",
        Ldarb => "ldarb", Ldarh => "ldarh", Ldaxr => "ldaxr", Ldaxrb => "ldaxrb",
        Ldaxrh => "ldaxrh", Ldnp => "ldnp", Ldp => "ldp", Ldpsw => "ldpsw",
        Ldr => "ldr", Ldrb => "ldrb", Ldrh => "ldrh", Ldrsb => "ldrsb",
        Ldrsh => "ldrsh", Ldrsw => "ldrsw", Ldtr => "ldtr", Ldtrb => "ldtrb",
        Ldtrh => "ldtrh", Ldtrsb => "ldtrsb", Ldtrsh => "ldtrsh", Ldtrsw => "ldtrsw",
        Ldur => "ldur", Ldurb => "ldurb", Ldurh => "ldurh", Ldursb => "ldursb",
        Ldursh => "ldursh", Ldursw => "ldursw", Ldxr => "ldxr", Ldxrb => "ldxrb",
        Ldxrh => "ldxrh", Lsl => "lsl", Lsr => "lsr", Madd => "madd",
        Mla => "mla", Mls => "mls", Mneg => "mneg", Mov => "mov",
        Movi => "movi", Movk => "movk", Movn => "movn", Movz => "movz",
        Mrs => "mrs", Msr => "msr", Msub => "msub", Mul => "mul",
        Mvn => "mvn", Mvni => "mvni", Neg => "neg", Negs => "negs",
        Ngc => "ngc", Ngcs => "ngcs", Nop => "nop", Orn => "orn",
        Orr => "orr", Prfm => "prfm", Prfum => "prfum", Rbit => "rbit",
        Ret => "ret", Rev => "rev", Rev16 => "rev16", Rev32 => "rev32",
        Rev64 => "rev64", Ror => "ror", Sbc => "sbc", Sbcs => "sbcs",
        Sbfiz => "sbfiz", Sbfx => "sbfx", Scvtf => "scvtf", Sdiv => "sdiv",
        Sev => "sev", Sevl => "sevl", Shl => "shl", Smaddl => "smaddl",
        Smaxv => "smaxv", Smc => "smc", Sminv => "sminv", Smnegl => "smnegl",
        Smov => "smov", Smsubl => "smsubl", Smulh => "smulh", Smull => "smull",
        Sshr => "sshr", Stlr => "stlr", Stlrb => "stlrb", Stlrh => "stlrh",
        Stlxr => "stlxr", Stlxrb => "stlxrb", Stlxrh => "stlxrh", Stnp => "stnp",
        Stp => "stp", Str => "str", Strb => "strb", Strh => "strh",
        Sttr => "sttr", Sttrb => "sttrb", Sttrh => "sttrh", Stur => "stur",
        Sturb => "sturb", Sturh => "sturh", Stxr => "stxr", Stxrb => "stxrb",
        Stxrh => "stxrh", Sub => "sub", Subs => "subs", Svc => "svc",
        Sxtb => "sxtb", Sxth => "sxth", Sxtw => "sxtw", Sys => "sys",
        Sysl => "sysl", Tbl => "tbl", Tbnz => "tbnz", Tbx => "tbx",
        Tbz => "tbz", Tst => "tst", Ubfiz => "ubfiz", Ubfx => "ubfx",
        Ucvtf => "ucvtf", Udiv => "udiv", Umaddl => "umaddl", Umaxv => "umaxv",
        Uminv => "uminv", Umnegl => "umnegl", Umov => "umov", Umsubl => "umsubl",
        Umulh => "umulh", Umull => "umull", Ushr => "ushr", Uxtb => "uxtb",
        Uxth => "uxth", Wfe => "wfe", Wfi => "wfi", Yield => "yield",
    }
}

registry! {
    /// AArch64-specific groups; ids start at 128.
    pub enum Arm64Group: u8 {
        FpArmv8 => "fparmv8",
        Neon => "neon",
        Crc => "crc",
    }
}

pub static NAMES: NameTables = NameTables {
    registers: Arm64Reg::NAMES,
    instructions: Arm64Insn::NAMES,
    groups: Arm64Group::NAMES,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Arm64Cc {
    Eq,
    Ne,
    Hs,
    Lo,
    Mi,
    Pl,
    Vs,
    Vc,
    Hi,
    Ls,
    Ge,
    Lt,
    Gt,
    Le,
    #[default]
    Al,
    Nv,
}

impl Arm64Cc {
    const ALL: [Arm64Cc; 16] = [
        Arm64Cc::Eq,
        Arm64Cc::Ne,
        Arm64Cc::Hs,
        Arm64Cc::Lo,
        Arm64Cc::Mi,
        Arm64Cc::Pl,
        Arm64Cc::Vs,
        Arm64Cc::Vc,
        Arm64Cc::Hi,
        Arm64Cc::Ls,
        Arm64Cc::Ge,
        Arm64Cc::Lt,
        Arm64Cc::Gt,
        Arm64Cc::Le,
        Arm64Cc::Al,
        Arm64Cc::Nv,
    ];

    pub fn from_bits(bits: u32) -> Arm64Cc {
        Self::ALL[(bits & 0xf) as usize]
    }

    pub fn name(self) -> &'static str {
        match self {
            Arm64Cc::Eq => "eq",
            Arm64Cc::Ne => "ne",
            Arm64Cc::Hs => "hs",
            Arm64Cc::Lo => "lo",
            Arm64Cc::Mi => "mi",
            Arm64Cc::Pl => "pl",
            Arm64Cc::Vs => "vs",
            Arm64Cc::Vc => "vc",
            Arm64Cc::Hi => "hi",
            Arm64Cc::Ls => "ls",
            Arm64Cc::Ge => "ge",
            Arm64Cc::Lt => "lt",
            Arm64Cc::Gt => "gt",
            Arm64Cc::Le => "le",
            Arm64Cc::Al => "al",
            Arm64Cc::Nv => "nv",
        }
    }

    pub(crate) fn invert(self) -> Arm64Cc {
        Self::from_bits(self as u32 ^ 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arm64Shift {
    Lsl,
    Lsr,
    Asr,
    Ror,
}

impl Arm64Shift {
    pub(crate) fn from_bits(bits: u32) -> Arm64Shift {
        [Arm64Shift::Lsl, Arm64Shift::Lsr, Arm64Shift::Asr, Arm64Shift::Ror][(bits & 3) as usize]
    }

    pub fn name(self) -> &'static str {
        match self {
            Arm64Shift::Lsl => "lsl",
            Arm64Shift::Lsr => "lsr",
            Arm64Shift::Asr => "asr",
            Arm64Shift::Ror => "ror",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arm64Extend {
    Uxtb,
    Uxth,
    Uxtw,
    Uxtx,
    Sxtb,
    Sxth,
    Sxtw,
    Sxtx,
    /// `uxtw`/`uxtx` printed as `lsl` when the base register is the stack pointer.
    Lsl,
}

impl Arm64Extend {
    pub(crate) fn from_bits(bits: u32) -> Arm64Extend {
        [
            Arm64Extend::Uxtb,
            Arm64Extend::Uxth,
            Arm64Extend::Uxtw,
            Arm64Extend::Uxtx,
            Arm64Extend::Sxtb,
            Arm64Extend::Sxth,
            Arm64Extend::Sxtw,
            Arm64Extend::Sxtx,
        ][(bits & 7) as usize]
    }

    pub fn name(self) -> &'static str {
        match self {
            Arm64Extend::Uxtb => "uxtb",
            Arm64Extend::Uxth => "uxth",
            Arm64Extend::Uxtw => "uxtw",
            Arm64Extend::Uxtx => "uxtx",
            Arm64Extend::Sxtb => "sxtb",
            Arm64Extend::Sxth => "sxth",
            Arm64Extend::Sxtw => "sxtw",
            Arm64Extend::Sxtx => "sxtx",
            Arm64Extend::Lsl => "lsl",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arm64Mem {
    pub base: Arm64Reg,
    /// [`Arm64Reg::Invalid`] for immediate offsets.
    pub index: Arm64Reg,
    pub disp: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Arm64OperandKind {
    Reg(Arm64Reg),
    Imm(i64),
    FpImm(f64),
    Mem(Arm64Mem),
    /// System register, barrier option, PSTATE field or condition.
    Sys(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Arm64Operand {
    pub kind: Arm64OperandKind,
    pub shift: Option<(Arm64Shift, u32)>,
    pub extend: Option<Arm64Extend>,
    /// Vector arrangement such as `8b` or `4s`.
    pub arrangement: Option<&'static str>,
    pub vector_index: Option<u8>,
    pub access: Access,
}

impl Arm64Operand {
    fn new(kind: Arm64OperandKind) -> Self {
        Self {
            kind,
            shift: None,
            extend: None,
            arrangement: None,
            vector_index: None,
            access: Access::READ,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Arm64Detail {
    pub cc: Arm64Cc,
    pub update_flags: bool,
    pub writeback: bool,
    pub operands: Vec<Arm64Operand>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Indexing {
    Offset,
    Pre,
    Post,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum MemOffset {
    Imm(i64),
    Reg {
        reg: Arm64Reg,
        extend: Arm64Extend,
        amount: Option<u32>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Mem {
    pub base: Arm64Reg,
    pub offset: MemOffset,
    pub indexing: Indexing,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Op {
    Reg(Arm64Reg),
    Imm(i64),
    /// Immediate with an optional `lsl #n` (`add`, `movk`).
    ImmShift(u64, u32),
    FpImm(f64),
    Target(u64),
    Shifted(Arm64Reg, Arm64Shift, u32),
    Extended(Arm64Reg, Arm64Extend, u32),
    Mem(Mem),
    Vector(Arm64Reg, &'static str),
    Element(Arm64Reg, &'static str, u8),
    List(Vec<Arm64Reg>, &'static str),
    Sym(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Decoded {
    pub insn: Arm64Insn,
    /// Condition of `b.cond` and the conditional-select family.
    pub cc: Arm64Cc,
    pub ops: Vec<Op>,
    pub group: Option<Arm64Group>,
}

impl Decoded {
    pub(crate) fn new(insn: Arm64Insn, ops: Vec<Op>) -> Self {
        Self {
            insn,
            cc: Arm64Cc::Al,
            ops,
            group: None,
        }
    }

    pub(crate) fn cc(mut self, cc: Arm64Cc) -> Self {
        self.cc = cc;
        self
    }

    pub(crate) fn group(mut self, group: Arm64Group) -> Self {
        self.group = Some(group);
        self
    }
}

#[inline]
pub(crate) fn field(word: u32, lo: u32, width: u32) -> u32 {
    (word >> lo) & ((1 << width) - 1)
}

#[inline]
pub(crate) fn bit(word: u32, n: u32) -> bool {
    (word >> n) & 1 != 0
}

fn offset_reg(first: Arm64Reg, n: u32) -> Arm64Reg {
    Arm64Reg::from_id(first.id() as u32 + n).unwrap_or(Arm64Reg::Invalid)
}

/// General-purpose register `n` of width `sf` (64 when true). Register 31 is the stack
/// pointer when `sp` is set, else the zero register.
pub(crate) fn gpr(sf: bool, n: u32, sp: bool) -> Arm64Reg {
    let n = n & 31;
    match (sf, n == 31, sp) {
        (true, true, true) => Arm64Reg::Sp,
        (true, true, false) => Arm64Reg::Xzr,
        (false, true, true) => Arm64Reg::Wsp,
        (false, true, false) => Arm64Reg::Wzr,
        (true, false, _) => offset_reg(Arm64Reg::X0, n),
        (false, false, _) => offset_reg(Arm64Reg::W0, n),
    }
}

/// Scalar SIMD&FP register views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FpSize {
    B,
    H,
    S,
    D,
    Q,
}

pub(crate) fn fpreg(size: FpSize, n: u32) -> Arm64Reg {
    let first = match size {
        FpSize::B => Arm64Reg::B0,
        FpSize::H => Arm64Reg::H0,
        FpSize::S => Arm64Reg::S0,
        FpSize::D => Arm64Reg::D0,
        FpSize::Q => Arm64Reg::Q0,
    };
    offset_reg(first, n & 31)
}

pub(crate) fn vreg(n: u32) -> Arm64Reg {
    offset_reg(Arm64Reg::V0, n & 31)
}

fn is_zero_reg(reg: Arm64Reg) -> bool {
    matches!(reg, Arm64Reg::Xzr | Arm64Reg::Wzr)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Arm64Decoder;

impl ArchDecoder for Arm64Decoder {
    fn architecture(&self) -> Architecture {
        Architecture::Arm64
    }

    fn decode_one(
        &self,
        cursor: &mut Cursor<'_>,
        address: Address,
        config: &DecodeConfig,
        _state: &mut StreamState,
    ) -> Result<Instruction, DecodeError> {
        let word = cursor.read_u32_with(config.mode.endian())?;
        let decoded = decode::decode(word, address)?;
        let (mnemonic, operands) = render(&decoded);
        Ok(decoder::finish(
            cursor,
            address,
            decoded.insn.id() as u32,
            mnemonic,
            operands,
            config,
            || detail(&decoded),
        ))
    }
}

fn imm_text(value: i64) -> String {
    format!("#{}", signed_hex(value))
}

fn mem_text(mem: &Mem) -> String {
    let base = mem.base.name();
    match (&mem.offset, mem.indexing) {
        (MemOffset::Imm(0), Indexing::Offset) => format!("[{}]", base),
        (MemOffset::Imm(d), Indexing::Offset) => format!("[{}, {}]", base, imm_text(*d)),
        (MemOffset::Imm(d), Indexing::Pre) => format!("[{}, {}]!", base, imm_text(*d)),
        (MemOffset::Imm(d), Indexing::Post) => format!("[{}], {}", base, imm_text(*d)),
        (
            MemOffset::Reg {
                reg,
                extend,
                amount,
            },
            _,
        ) => match (extend, amount) {
            (Arm64Extend::Lsl, None) => format!("[{}, {}]", base, reg.name()),
            (_, None) => format!("[{}, {}, {}]", base, reg.name(), extend.name()),
            (_, Some(n)) => format!("[{}, {}, {} #{}]", base, reg.name(), extend.name(), n),
        },
    }
}

fn op_text(op: &Op) -> String {
    match op {
        Op::Reg(r) => r.name().to_string(),
        Op::Imm(v) => imm_text(*v),
        Op::ImmShift(v, 0) => format!("#{}", hex(*v)),
        Op::ImmShift(v, s) => format!("#{}, lsl #{}", hex(*v), s),
        Op::FpImm(v) => format!("#{:.8}", v),
        Op::Target(t) => format!("#{}", hex(*t)),
        Op::Shifted(r, shift, amount) => format!("{}, {} #{}", r.name(), shift.name(), amount),
        Op::Extended(r, ext, 0) => format!("{}, {}", r.name(), ext.name()),
        Op::Extended(r, ext, amount) => format!("{}, {} #{}", r.name(), ext.name(), amount),
        Op::Mem(mem) => mem_text(mem),
        Op::Vector(r, arrangement) => format!("{}.{}", r.name(), arrangement),
        Op::Element(r, size, index) => format!("{}.{}[{}]", r.name(), size, index),
        Op::List(regs, arrangement) => {
            let names: Vec<_> = regs
                .iter()
                .map(|r| format!("{}.{}", r.name(), arrangement))
                .collect();
            format!("{{{}}}", names.join(", "))
        }
        Op::Sym(s) => s.clone(),
    }
}

fn render(d: &Decoded) -> (String, String) {
    let mnemonic = if d.insn == Arm64Insn::B && d.cc != Arm64Cc::Al {
        format!("b.{}", d.cc.name())
    } else {
        d.insn.name().to_string()
    };
    let ops: Vec<_> = d.ops.iter().map(op_text).collect();
    (mnemonic, ops.join(", "))
}

/// Number of leading operands the instruction writes.
fn destinations(insn: Arm64Insn) -> usize {
    use Arm64Insn as I;
    match insn {
        I::Str | I::Strb | I::Strh | I::Stur | I::Sturb | I::Sturh | I::Sttr | I::Sttrb
        | I::Sttrh | I::Stp | I::Stnp | I::Stlr | I::Stlrb | I::Stlrh | I::Cmp | I::Cmn
        | I::Tst | I::Ccmp | I::Ccmn | I::Fcmp | I::Fcmpe | I::Fccmp | I::Fccmpe | I::B | I::Bl | I::Br | I::Blr
        | I::Ret | I::Cbz | I::Cbnz | I::Tbz | I::Tbnz | I::Svc | I::Hvc | I::Smc | I::Brk
        | I::Hlt | I::Nop | I::Yield | I::Wfe | I::Wfi | I::Sev | I::Sevl | I::Hint
        | I::Dmb | I::Dsb | I::Isb | I::Clrex | I::Msr | I::Sys | I::Prfm | I::Prfum
        | I::Eret | I::Drps => 0,
        I::Ldp | I::Ldnp | I::Ldpsw => 2,
        _ => 1,
    }
}

fn sets_flags(insn: Arm64Insn) -> bool {
    use Arm64Insn as I;
    matches!(
        insn,
        I::Adds
            | I::Subs
            | I::Ands
            | I::Bics
            | I::Adcs
            | I::Sbcs
            | I::Negs
            | I::Ngcs
            | I::Cmp
            | I::Cmn
            | I::Tst
            | I::Ccmp
            | I::Ccmn
            | I::Fcmp
            | I::Fcmpe
            | I::Fccmp
            | I::Fccmpe
    )
}

fn reads_flags(d: &Decoded) -> bool {
    use Arm64Insn as I;
    d.cc != Arm64Cc::Al
        || matches!(d.insn, I::Adc | I::Adcs | I::Sbc | I::Sbcs | I::Ngc | I::Ngcs)
}

fn lower(op: &Op, out: &mut Vec<Arm64Operand>) {
    use Arm64OperandKind as K;
    let operand = match op {
        Op::Reg(r) => Arm64Operand::new(K::Reg(*r)),
        Op::Imm(v) => Arm64Operand::new(K::Imm(*v)),
        Op::ImmShift(v, s) => {
            let mut operand = Arm64Operand::new(K::Imm(*v as i64));
            if *s != 0 {
                operand.shift = Some((Arm64Shift::Lsl, *s));
            }
            operand
        }
        Op::FpImm(v) => Arm64Operand::new(K::FpImm(*v)),
        Op::Target(t) => Arm64Operand::new(K::Imm(*t as i64)),
        Op::Shifted(r, shift, amount) => {
            let mut operand = Arm64Operand::new(K::Reg(*r));
            operand.shift = Some((*shift, *amount));
            operand
        }
        Op::Extended(r, ext, amount) => {
            let mut operand = Arm64Operand::new(K::Reg(*r));
            if *ext == Arm64Extend::Lsl {
                operand.shift = Some((Arm64Shift::Lsl, *amount));
            } else {
                operand.extend = Some(*ext);
                if *amount != 0 {
                    operand.shift = Some((Arm64Shift::Lsl, *amount));
                }
            }
            operand
        }
        Op::Mem(mem) => {
            let mut operand = Arm64Operand::new(K::Mem(Arm64Mem {
                base: mem.base,
                index: Arm64Reg::Invalid,
                disp: 0,
            }));
            let mut post = None;
            if let K::Mem(m) = &mut operand.kind {
                match &mem.offset {
                    MemOffset::Imm(d) if mem.indexing == Indexing::Post => post = Some(*d),
                    MemOffset::Imm(d) => m.disp = *d as i32,
                    MemOffset::Reg {
                        reg,
                        extend,
                        amount,
                    } => {
                        m.index = *reg;
                        operand.extend = (*extend != Arm64Extend::Lsl).then_some(*extend);
                        operand.shift = amount.map(|n| (Arm64Shift::Lsl, n));
                    }
                }
            }
            out.push(operand);
            // post-index displacement is reported as a separate immediate
            if let Some(d) = post {
                out.push(Arm64Operand::new(K::Imm(d)));
            }
            return;
        }
        Op::Vector(r, arrangement) => {
            let mut operand = Arm64Operand::new(K::Reg(*r));
            operand.arrangement = Some(arrangement);
            operand
        }
        Op::Element(r, size, index) => {
            let mut operand = Arm64Operand::new(K::Reg(*r));
            operand.arrangement = Some(size);
            operand.vector_index = Some(*index);
            operand
        }
        Op::List(regs, arrangement) => {
            for r in regs {
                let mut operand = Arm64Operand::new(K::Reg(*r));
                operand.arrangement = Some(arrangement);
                out.push(operand);
            }
            return;
        }
        Op::Sym(s) => Arm64Operand::new(K::Sys(s.clone())),
    };
    out.push(operand);
}

fn detail(d: &Decoded) -> DetailParts {
    use Arm64Insn as I;
    let mut operands = Vec::new();
    for op in &d.ops {
        lower(op, &mut operands);
    }
    let writes = destinations(d.insn).min(operands.len());
    for operand in operands.iter_mut().take(writes) {
        operand.access = Access::WRITE;
    }
    if matches!(d.insn, I::Movk | I::Bfi | I::Bfxil | I::Ins) {
        if let Some(first) = operands.first_mut() {
            first.access = Access::READ_WRITE;
        }
    }
    let writeback = d
        .ops
        .iter()
        .any(|op| matches!(op, Op::Mem(m) if m.indexing != Indexing::Offset));
    let update_flags = sets_flags(d.insn);

    let mut parts = DetailParts::new(Detail::Arm64(Arm64Detail {
        cc: d.cc,
        update_flags,
        writeback,
        operands,
    }));
    if reads_flags(d) {
        parts.read(Arm64Reg::Nzcv.id());
    }
    if update_flags {
        parts.write(Arm64Reg::Nzcv.id());
    }
    match d.insn {
        I::Bl | I::Blr => {
            parts.write(Arm64Reg::X30.id());
            parts.common(CommonGroup::Call);
        }
        I::B | I::Br | I::Cbz | I::Cbnz | I::Tbz | I::Tbnz => parts.common(CommonGroup::Jump),
        I::Ret => parts.common(CommonGroup::Ret),
        I::Eret => {
            parts.common(CommonGroup::Iret);
            parts.common(CommonGroup::Privilege);
        }
        I::Svc => parts.common(CommonGroup::Int),
        I::Hvc | I::Smc => {
            parts.common(CommonGroup::Int);
            parts.common(CommonGroup::Privilege);
        }
        _ => {}
    }
    if d.ops.iter().any(|op| matches!(op, Op::Target(_))) && d.insn != I::Adr && d.insn != I::Adrp
    {
        parts.common(CommonGroup::BranchRelative);
    }
    if let Some(group) = d.group {
        parts.arch_group(group.id());
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Mode, Session};

    fn lines(code: &[u8]) -> Vec<String> {
        Session::open(Architecture::Arm64, Mode::LITTLE_ENDIAN)
            .unwrap()
            .disassemble_all(code, 0x2c, 0)
            .iter()
            .map(|i| format!("{} {}", i.mnemonic, i.operands).trim_end().to_string())
            .collect()
    }

    #[test]
    fn test_sample_stream() {
        let code = [
            0x09, 0x00, 0x38, 0xd5, 0xbf, 0x40, 0x00, 0xd5, 0x0c, 0x05, 0x13, 0xd5, 0x20, 0x50,
            0x02, 0x0e, 0x20, 0xe4, 0x3d, 0x0f, 0x00, 0x18, 0xa0, 0x5f, 0xa2, 0x00, 0xae, 0x9e,
            0x9f, 0x37, 0x03, 0xd5, 0xbf, 0x33, 0x03, 0xd5, 0xdf, 0x3f, 0x03, 0xd5, 0x21, 0x7c,
            0x02, 0x9b, 0x21, 0x7c, 0x00, 0x53, 0x00, 0x40, 0x21, 0x4b, 0xe1, 0x0b, 0x40, 0xb9,
            0x20, 0x04, 0x81, 0xda, 0x20, 0x08, 0x02, 0x8b, 0x10, 0x5b, 0xe8, 0x3c,
        ];
        assert_eq!(
            lines(&code),
            [
                "mrs x9, midr_el1",
                "msr spsel, #0",
                "msr dbgdtrtx_el0, x12",
                "tbx v0.8b, {v1.16b, v2.16b, v3.16b}, v2.8b",
                "scvtf v0.2s, v1.2s, #3",
                "fmla s0, s0, v0.s[3]",
                "fmov x2, v5.d[1]",
                "dsb nsh",
                "dmb osh",
                "isb",
                "mul x1, x1, x2",
                "lsr w1, w1, #0",
                "sub w0, w0, w1, uxtw",
                "ldr w1, [sp, #8]",
                "cneg x0, x1, ne",
                "add x0, x1, x2, lsl #2",
                "ldr q16, [x24, w8, uxtw #4]",
            ]
        );
    }

    #[test]
    fn test_big_endian_words() {
        let session = Session::open(Architecture::Arm64, Mode::BIG_ENDIAN).unwrap();
        let insn = session.decode_at(&[0x9b, 0x02, 0x7c, 0x21], 0).unwrap();
        assert_eq!(insn.mnemonic, "mul");
        assert_eq!(insn.operands, "x1, x1, x2");
    }

    #[test]
    fn test_detail() {
        let mut session = Session::open(Architecture::Arm64, Mode::LITTLE_ENDIAN).unwrap();
        session.set_detail(true);

        let cneg = session.decode_at(&[0x20, 0x04, 0x81, 0xda], 0).unwrap();
        assert_eq!(cneg.regs_read, vec![Arm64Reg::Nzcv.id()]);
        let Some(Detail::Arm64(d)) = &cneg.detail else {
            panic!("missing arm64 detail");
        };
        assert_eq!(d.cc, Arm64Cc::Ne);
        assert_eq!(d.operands[0].kind, Arm64OperandKind::Reg(Arm64Reg::X0));
        assert_eq!(d.operands[0].access, Access::WRITE);

        let ldr = session.decode_at(&[0x10, 0x5b, 0xe8, 0x3c], 0).unwrap();
        let Some(Detail::Arm64(d)) = &ldr.detail else {
            panic!("missing arm64 detail");
        };
        assert_eq!(
            d.operands[1].kind,
            Arm64OperandKind::Mem(Arm64Mem {
                base: Arm64Reg::X24,
                index: Arm64Reg::W8,
                disp: 0
            })
        );
        assert_eq!(d.operands[1].extend, Some(Arm64Extend::Uxtw));
        assert_eq!(d.operands[1].shift, Some((Arm64Shift::Lsl, 4)));

        let bl = session.decode_at(&[0x00, 0x00, 0x00, 0x94], 0x1000).unwrap();
        assert_eq!(bl.operands, "#0x1000");
        assert_eq!(bl.regs_write, vec![Arm64Reg::X30.id()]);
        assert!(bl.is_branch());
        assert!(bl.in_group(CommonGroup::BranchRelative.id()));
    }
}
