//! ARM decoding: A32, Thumb/Thumb-2 (including M-profile system registers), VFP and a
//! NEON subset.
//!
//! The A32 and T32 front ends both produce a [`Decoded`] value; printing and detail
//! construction are shared. Thumb-2 coprocessor and Advanced SIMD encodings are rewritten
//! into their A32 form and handed to the same VFP/NEON decoders.

mod a32;
mod simd;
mod thumb;

use crate::arch::{signed_hex, Mode, Syntax};
use crate::cursor::Cursor;
use crate::decoder::{self, ArchDecoder, DecodeConfig, DecodeError, StreamState};
use crate::detail::{Access, CommonGroup, Detail, DetailParts};
use crate::names::NameTables;
use crate::{Address, Architecture, Instruction};

registry! {
    /// ARM registers.
    pub enum ArmReg: u16 {
        Invalid => "", Apsr => "apsr", ApsrNzcv => "apsr_nzcv", Cpsr => "cpsr",
        Fpexc => "fpexc", Fpscr => "fpscr", Fpsid => "fpsid", Spsr => "spsr",
        R0 => "r0", R1 => "r1", R2 => "r2", R3 => "r3",
        R4 => "r4", R5 => "r5", R6 => "r6", R7 => "r7",
        R8 => "r8", R9 => "sb", R10 => "sl", R11 => "fp",
        R12 => "ip", Sp => "sp", Lr => "lr", Pc => "pc",
        D0 => "d0", D1 => "d1", D2 => "d2", D3 => "d3",
        D4 => "d4", D5 => "d5", D6 => "d6", D7 => "d7",
        D8 => "d8", D9 => "d9", D10 => "d10", D11 => "d11",
        D12 => "d12", D13 => "d13", D14 => "d14", D15 => "d15",
        D16 => "d16", D17 => "d17", D18 => "d18", D19 => "d19",
        D20 => "d20", D21 => "d21", D22 => "d22", D23 => "d23",
        D24 => "d24", D25 => "d25", D26 => "d26", D27 => "d27",
        D28 => "d28", D29 => "d29", D30 => "d30", D31 => "d31",
        S0 => "s0", S1 => "s1", S2 => "s2", S3 => "s3",
        S4 => "s4", S5 => "s5", S6 => "s6", S7 => "s7",
        S8 => "s8", S9 => "s9", S10 => "s10", S11 => "s11",
        S12 => "s12", S13 => "s13", S14 => "s14", S15 => "s15",
        S16 => "s16", S17 => "s17", S18 => "s18", S19 => "s19",
        S20 => "s20", S21 => "s21", S22 => "s22", S23 => "s23",
        S24 => "s24", S25 => "s25", S26 => "s26", S27 => "s27",
        S28 => "s28", S29 => "s29", S30 => "s30", S31 => "s31",
        Q0 => "q0", Q1 => "q1", Q2 => "q2", Q3 => "q3",
        Q4 => "q4", Q5 => "q5", Q6 => "q6", Q7 => "q7",
        Q8 => "q8", Q9 => "q9", Q10 => "q10", Q11 => "q11",
        Q12 => "q12", Q13 => "q13", Q14 => "q14", Q15 => "q15",
    }
}

registry! {
    /// ARM instructions.
    pub enum ArmInsn: u16 {
        Invalid => "", Adc => "adc", Add => "add", Addw => "addw",
        Adr => "adr", And => "and", Asr => "asr", B => "b",
        Bfc => "bfc", Bfi => "bfi", Bic => "bic", Bkpt => "bkpt",
        Bl => "bl", Blx => "blx", Bx => "bx", Bxj => "bxj",
        Cbnz => "cbnz", Cbz => "cbz", Cdp => "cdp", Clrex => "clrex",
        Clz => "clz", Cmn => "cmn", Cmp => "cmp", Cpsid => "cpsid",
        Cpsie => "cpsie", Crc32b => "crc32b", Crc32cb => "crc32cb", Crc32ch => "crc32ch",
        Crc32cw => "crc32cw", Crc32h => "crc32h", Crc32w => "crc32w", Dmb => "dmb",
        Dsb => "dsb", Eor => "eor", Isb => "isb", It => "it",
        Ldc => "ldc", Ldcl => "ldcl", Ldm => "ldm", Ldmda => "ldmda",
        Ldmdb => "ldmdb", Ldmib => "ldmib", Ldr => "ldr", Ldrb => "ldrb",
        Ldrbt => "ldrbt", Ldrd => "ldrd", Ldrex => "ldrex", Ldrexb => "ldrexb",
        Ldrexd => "ldrexd", Ldrexh => "ldrexh", Ldrh => "ldrh", Ldrsb => "ldrsb",
        Ldrsh => "ldrsh", Ldrt => "ldrt", Lsl => "lsl", Lsr => "lsr",
        Mcr => "mcr", Mcrr => "mcrr", Mla => "mla", Mls => "mls",
        Mov => "mov", Movt => "movt", Movw => "movw", Mrc => "mrc",
        Mrrc => "mrrc", Mrs => "mrs", Msr => "msr", Mul => "mul",
        Mvn => "mvn", Nop => "nop", Orn => "orn", Orr => "orr",
        Pop => "pop", Push => "push", Rbit => "rbit", Rev => "rev",
        Rev16 => "rev16", Revsh => "revsh", Ror => "ror", Rrx => "rrx",
        Rsb => "rsb", Rsc => "rsc", Sbc => "sbc", Sbfx => "sbfx",
        Sdiv => "sdiv", Setend => "setend", Sev => "sev", Smlal => "smlal",
        Smull => "smull", Stc => "stc", Stcl => "stcl", Stm => "stm",
        Stmda => "stmda", Stmdb => "stmdb", Stmib => "stmib", Str => "str",
        Strb => "strb", Strbt => "strbt", Strd => "strd", Strex => "strex",
        Strexb => "strexb", Strexd => "strexd", Strexh => "strexh", Strh => "strh",
        Strt => "strt", Sub => "sub", Subw => "subw", Svc => "svc",
        Swp => "swp", Swpb => "swpb", Sxtab => "sxtab", Sxtab16 => "sxtab16",
        Sxtah => "sxtah", Sxtb => "sxtb", Sxtb16 => "sxtb16", Sxth => "sxth",
        Tbb => "tbb", Tbh => "tbh", Teq => "teq", Tst => "tst",
        Ubfx => "ubfx", Udf => "udf", Udiv => "udiv", Umaal => "umaal",
        Umlal => "umlal", Umull => "umull", Uxtab => "uxtab", Uxtab16 => "uxtab16",
        Uxtah => "uxtah", Uxtb => "uxtb", Uxtb16 => "uxtb16", Uxth => "uxth",
        Vabd => "vabd", Vabs => "vabs", Vadd => "vadd", Vaddl => "vaddl",
        Vaddw => "vaddw", Vand => "vand", Vbic => "vbic", Vbif => "vbif",
        Vbit => "vbit", Vbsl => "vbsl", Vceq => "vceq", Vcge => "vcge",
        Vcgt => "vcgt", Vcmp => "vcmp", Vcmpe => "vcmpe", Vcvt => "vcvt",
        Vcvtb => "vcvtb", Vcvtr => "vcvtr", Vcvtt => "vcvtt", Vdiv => "vdiv",
        Vdup => "vdup", Veor => "veor", Vld1 => "vld1", Vld2 => "vld2",
        Vld3 => "vld3", Vld4 => "vld4", Vldmdb => "vldmdb", Vldmia => "vldmia",
        Vldr => "vldr", Vmax => "vmax", Vmin => "vmin", Vmla => "vmla",
        Vmls => "vmls", Vmov => "vmov", Vmrs => "vmrs", Vmsr => "vmsr",
        Vmul => "vmul", Vmull => "vmull", Vneg => "vneg", Vnmla => "vnmla",
        Vnmls => "vnmls", Vnmul => "vnmul", Vorn => "vorn", Vorr => "vorr",
        Vpadd => "vpadd", Vpmax => "vpmax", Vpmin => "vpmin", Vpop => "vpop",
        Vpush => "vpush", Vsqrt => "vsqrt", Vst1 => "vst1", Vst2 => "vst2",
        Vst3 => "vst3", Vst4 => "vst4", Vstmdb => "vstmdb", Vstmia => "vstmia",
        Vstr => "vstr", Vsub => "vsub", Vsubl => "vsubl", Vsubw => "vsubw",
        Vtst => "vtst", Wfe => "wfe", Wfi => "wfi", Yield => "yield",
    }
}

registry! {
    /// ARM-specific groups; ids start at 128.
    pub enum ArmGroup: u8 {
        Arm => "arm",
        Thumb => "thumb",
        Thumb1Only => "thumb1only",
        Thumb2 => "thumb2",
        V4t => "v4t",
        V5t => "v5t",
        V6t2 => "v6t2",
        V7 => "v7",
        V8 => "v8",
        Mclass => "mclass",
        Vfp2 => "vfp2",
        Fparmv8 => "fparmv8",
        Neon => "neon",
        Crc => "crc",
        Divide => "divide",
    }
}

pub static NAMES: NameTables = NameTables {
    registers: ArmReg::NAMES,
    instructions: ArmInsn::NAMES,
    groups: ArmGroup::NAMES,
};

/// Condition codes. `Al` is the unconditional default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ArmCc {
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
}

impl ArmCc {
    const ALL: [ArmCc; 15] = [
        ArmCc::Eq,
        ArmCc::Ne,
        ArmCc::Hs,
        ArmCc::Lo,
        ArmCc::Mi,
        ArmCc::Pl,
        ArmCc::Vs,
        ArmCc::Vc,
        ArmCc::Hi,
        ArmCc::Ls,
        ArmCc::Ge,
        ArmCc::Lt,
        ArmCc::Gt,
        ArmCc::Le,
        ArmCc::Al,
    ];

    /// Maps the 4-bit condition field; `0b1111` is treated as always.
    pub fn from_bits(bits: u32) -> ArmCc {
        Self::ALL.get(bits as usize).copied().unwrap_or(ArmCc::Al)
    }

    /// Suffix appended to the mnemonic (`""` for always).
    pub fn suffix(self) -> &'static str {
        match self {
            ArmCc::Eq => "eq",
            ArmCc::Ne => "ne",
            ArmCc::Hs => "hs",
            ArmCc::Lo => "lo",
            ArmCc::Mi => "mi",
            ArmCc::Pl => "pl",
            ArmCc::Vs => "vs",
            ArmCc::Vc => "vc",
            ArmCc::Hi => "hi",
            ArmCc::Ls => "ls",
            ArmCc::Ge => "ge",
            ArmCc::Lt => "lt",
            ArmCc::Gt => "gt",
            ArmCc::Le => "le",
            ArmCc::Al => "",
        }
    }

    fn inverse(self) -> ArmCc {
        match self {
            ArmCc::Al => ArmCc::Al,
            cc => ArmCc::from_bits(cc as u32 ^ 1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArmShift {
    Lsl,
    Lsr,
    Asr,
    Ror,
    Rrx,
}

impl ArmShift {
    const BY_TYPE: [ArmShift; 4] = [ArmShift::Lsl, ArmShift::Lsr, ArmShift::Asr, ArmShift::Ror];

    pub fn name(self) -> &'static str {
        match self {
            ArmShift::Lsl => "lsl",
            ArmShift::Lsr => "lsr",
            ArmShift::Asr => "asr",
            ArmShift::Ror => "ror",
            ArmShift::Rrx => "rrx",
        }
    }

    fn insn(self) -> ArmInsn {
        match self {
            ArmShift::Lsl => ArmInsn::Lsl,
            ArmShift::Lsr => ArmInsn::Lsr,
            ArmShift::Asr => ArmInsn::Asr,
            ArmShift::Ror => ArmInsn::Ror,
            ArmShift::Rrx => ArmInsn::Rrx,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmShiftAmount {
    Imm(u32),
    Reg(ArmReg),
}

/// A memory operand. `index` is [`ArmReg::Invalid`] for immediate offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmMem {
    pub base: ArmReg,
    pub index: ArmReg,
    pub disp: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArmOperandKind {
    Reg(ArmReg),
    Imm(i64),
    Mem(ArmMem),
    /// Coprocessor number (`p0`..`p15`).
    Coproc(u8),
    /// Coprocessor register (`c0`..`c15`).
    CoprocReg(u8),
    /// Named system register, barrier option or status-register field.
    Sys(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArmOperand {
    pub kind: ArmOperandKind,
    pub shift: Option<(ArmShift, ArmShiftAmount)>,
    /// The register offset is subtracted from the base.
    pub subtracted: bool,
    pub vector_index: Option<u8>,
    pub access: Access,
}

impl ArmOperand {
    fn new(kind: ArmOperandKind) -> Self {
        Self {
            kind,
            shift: None,
            subtracted: false,
            vector_index: None,
            access: Access::READ,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArmDetail {
    pub cc: ArmCc,
    pub update_flags: bool,
    pub writeback: bool,
    /// Vector data type, e.g. `f32` or `f64.f16`; empty for scalar integer instructions.
    pub vector_data: String,
    pub operands: Vec<ArmOperand>,
}

/// Conditions of the instructions covered by a Thumb `IT` instruction.
#[derive(Debug, Clone, Default)]
pub struct ItBlock {
    conds: [ArmCc; 4],
    len: u8,
    next: u8,
}

impl ItBlock {
    /// Opens a block from the `firstcond` and `mask` fields of an `IT` instruction.
    pub(crate) fn open(first: u32, mask: u32) -> Self {
        let base = ArmCc::from_bits(first);
        let len = 4 - mask.trailing_zeros().min(3) as u8;
        let mut conds = [base; 4];
        for (i, cond) in conds.iter_mut().enumerate().take(len as usize).skip(1) {
            let bit = (mask >> (4 - i)) & 1;
            *cond = if bit == first & 1 { base } else { base.inverse() };
        }
        Self {
            conds,
            len,
            next: 0,
        }
    }

    pub(crate) fn active(&self) -> bool {
        self.next < self.len
    }

    /// Condition of the next covered instruction, consuming its slot.
    pub(crate) fn take(&mut self) -> Option<ArmCc> {
        if !self.active() {
            return None;
        }
        let cond = self.conds[self.next as usize];
        self.next += 1;
        Some(cond)
    }

    /// The `t`/`e` pattern after the leading `it`.
    fn pattern(first: u32, mask: u32) -> String {
        let len = 4 - mask.trailing_zeros().min(3) as usize;
        (1..len)
            .map(|i| if (mask >> (4 - i)) & 1 == first & 1 { 't' } else { 'e' })
            .collect()
    }
}

/// Offset part of a memory operand.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Offset {
    None,
    Imm { value: u32, subtract: bool },
    Reg {
        reg: ArmReg,
        subtract: bool,
        shift: Option<(ArmShift, u32)>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Indexing {
    Offset,
    Pre,
    Post,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Mem {
    pub base: ArmReg,
    pub offset: Offset,
    pub indexing: Indexing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lane {
    /// `d0[]`, every lane.
    All,
    Index(u8),
}

/// A printable operand as produced by the front ends.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Op {
    Reg(ArmReg),
    /// Base register with writeback, printed with a trailing `!`.
    RegWb(ArmReg),
    Imm(i64),
    /// Branch target address.
    Target(u64),
    Shifted(ArmReg, ArmShift, u32),
    RegShifted(ArmReg, ArmShift, ArmReg),
    Mem(Mem),
    List(Vec<ArmReg>),
    /// NEON structure list with a lane selector on every register.
    Lanes(Vec<ArmReg>, Lane),
    /// NEON structure address with its alignment in bits (0 when unaligned).
    Aligned(Mem, u32),
    Coproc(u8),
    CReg(u8),
    Lane(ArmReg, u8),
    Sym(String),
}

/// One decoded ARM or Thumb instruction, before rendering.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Decoded {
    pub insn: ArmInsn,
    pub cc: ArmCc,
    pub setflags: bool,
    /// Width or data-type qualifier, including the leading dot.
    pub suffix: String,
    pub ops: Vec<Op>,
    pub features: Vec<ArmGroup>,
}

impl Decoded {
    pub(crate) fn new(insn: ArmInsn, ops: Vec<Op>) -> Self {
        Self {
            insn,
            cc: ArmCc::Al,
            setflags: false,
            suffix: String::new(),
            ops,
            features: Vec::new(),
        }
    }

    pub(crate) fn cc(mut self, cc: ArmCc) -> Self {
        self.cc = cc;
        self
    }

    pub(crate) fn s(mut self, setflags: bool) -> Self {
        self.setflags = setflags;
        self
    }

    pub(crate) fn suffix(mut self, suffix: &str) -> Self {
        self.suffix.push_str(suffix);
        self
    }

    pub(crate) fn feature(mut self, group: ArmGroup) -> Self {
        if !self.features.contains(&group) {
            self.features.push(group);
        }
        self
    }

    fn writeback(&self) -> bool {
        self.ops.iter().any(|op| match op {
            Op::RegWb(_) => true,
            Op::Mem(m) | Op::Aligned(m, _) => m.indexing != Indexing::Offset,
            _ => false,
        })
    }
}

/// Extracts `width` bits of `word` starting at bit `lo`.
#[inline]
pub(crate) fn field(word: u32, lo: u32, width: u32) -> u32 {
    (word >> lo) & ((1 << width) - 1)
}

#[inline]
pub(crate) fn bit(word: u32, n: u32) -> bool {
    (word >> n) & 1 != 0
}

fn offset_reg(first: ArmReg, n: u32) -> ArmReg {
    ArmReg::from_id(first.id() as u32 + n).unwrap_or(ArmReg::Invalid)
}

/// `r0`..`pc` by number.
pub(crate) fn core_reg(n: u32) -> ArmReg {
    offset_reg(ArmReg::R0, n & 0xf)
}

pub(crate) fn dreg(n: u32) -> ArmReg {
    offset_reg(ArmReg::D0, n & 0x1f)
}

pub(crate) fn sreg(n: u32) -> ArmReg {
    offset_reg(ArmReg::S0, n & 0x1f)
}

pub(crate) fn qreg(n: u32) -> ArmReg {
    offset_reg(ArmReg::Q0, n & 0xf)
}

/// Registers named by a 16-bit list mask, in ascending order.
pub(crate) fn reg_list(mask: u32) -> Vec<ArmReg> {
    (0..16).filter(|i| mask & (1 << i) != 0).map(core_reg).collect()
}

/// Applies the immediate shift encoded by `ty`/`imm5` to `rm`.
pub(crate) fn imm_shift(rm: ArmReg, ty: u32, imm5: u32) -> Op {
    match (ty & 3, imm5) {
        (0, 0) => Op::Reg(rm),
        (3, 0) => Op::Shifted(rm, ArmShift::Rrx, 0),
        (1 | 2, 0) => Op::Shifted(rm, ArmShift::BY_TYPE[ty as usize & 3], 32),
        (t, n) => Op::Shifted(rm, ArmShift::BY_TYPE[t as usize], n),
    }
}

/// Memory barrier option names.
pub(crate) fn barrier_option(option: u32) -> String {
    let name = match option {
        0xf => "sy",
        0xe => "st",
        0xd => "ld",
        0xb => "ish",
        0xa => "ishst",
        0x9 => "ishld",
        0x7 => "nsh",
        0x6 => "nshst",
        0x5 => "nshld",
        0x3 => "osh",
        0x2 => "oshst",
        0x1 => "oshld",
        other => return format!("#{}", signed_hex(other as i64)),
    };
    name.to_string()
}

/// Status register operand of `msr` for the A/R profiles.
pub(crate) fn psr_fields(spsr: bool, mask: u32) -> String {
    if !spsr && mask & 0b0011 == 0 {
        let mut name = String::from("apsr_");
        if mask & 0b1000 != 0 {
            name.push_str("nzcvq");
        }
        if mask & 0b0100 != 0 {
            name.push('g');
        }
        return name;
    }
    let mut name = String::from(if spsr { "spsr_" } else { "cpsr_" });
    for (bit, c) in [(3, 'f'), (2, 's'), (1, 'x'), (0, 'c')] {
        if mask & (1 << bit) != 0 {
            name.push(c);
        }
    }
    name
}

/// M-profile special register names used by `mrs`/`msr`.
pub(crate) fn mclass_sysreg(sysm: u32) -> Option<&'static str> {
    let name = match sysm {
        0 => "apsr",
        1 => "iapsr",
        2 => "eapsr",
        3 => "xpsr",
        5 => "ipsr",
        6 => "epsr",
        7 => "iepsr",
        8 => "msp",
        9 => "psp",
        16 => "primask",
        17 => "basepri",
        18 => "basepri_max",
        19 => "faultmask",
        20 => "control",
        _ => return None,
    };
    Some(name)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ArmDecoder;

impl ArchDecoder for ArmDecoder {
    fn architecture(&self) -> Architecture {
        Architecture::Arm
    }

    fn decode_one(
        &self,
        cursor: &mut Cursor<'_>,
        address: Address,
        config: &DecodeConfig,
        state: &mut StreamState,
    ) -> Result<Instruction, DecodeError> {
        let decoded = if config.mode.contains(Mode::THUMB) {
            thumb::decode(cursor, address, config.mode, &mut state.it_block)?
        } else {
            let word = cursor.read_u32_with(config.mode.endian())?;
            a32::decode(word, address, config.mode)?
        };
        let (mnemonic, operands) = render(&decoded, config.syntax);
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

fn reg_name(reg: ArmReg, syntax: Syntax) -> String {
    let numbered = reg.id() >= ArmReg::R9.id() && reg.id() <= ArmReg::Pc.id();
    if syntax == Syntax::NoRegName && numbered {
        format!("r{}", reg.id() - ArmReg::R0.id())
    } else {
        reg.name().to_string()
    }
}

fn imm_text(value: i64) -> String {
    format!("#{}", signed_hex(value))
}

fn shift_text(shift: ArmShift, amount: u32) -> String {
    match shift {
        ArmShift::Rrx => "rrx".to_string(),
        _ => format!("{} #{}", shift.name(), amount),
    }
}

fn mem_text(mem: &Mem, align: u32, syntax: Syntax) -> String {
    let mut base = reg_name(mem.base, syntax);
    if align != 0 {
        base = format!("{}:{}", base, align);
    }
    let offset = match &mem.offset {
        Offset::None => None,
        Offset::Imm { value, subtract } => {
            if *value == 0 && !subtract && mem.indexing == Indexing::Offset {
                None
            } else if *subtract {
                Some(format!("#-{}", crate::arch::hex(*value as u64)))
            } else {
                Some(imm_text(*value as i64))
            }
        }
        Offset::Reg {
            reg,
            subtract,
            shift,
        } => {
            let mut text = String::new();
            if *subtract {
                text.push('-');
            }
            text.push_str(&reg_name(*reg, syntax));
            if let Some((kind, amount)) = shift {
                text.push_str(", ");
                text.push_str(&shift_text(*kind, *amount));
            }
            Some(text)
        }
    };
    match (mem.indexing, offset) {
        (Indexing::Post, Some(off)) => format!("[{}], {}", base, off),
        (Indexing::Post, None) => format!("[{}]", base),
        (Indexing::Pre, Some(off)) => format!("[{}, {}]!", base, off),
        (Indexing::Pre, None) => format!("[{}]!", base),
        (Indexing::Offset, Some(off)) => format!("[{}, {}]", base, off),
        (Indexing::Offset, None) => format!("[{}]", base),
    }
}

fn op_text(op: &Op, syntax: Syntax) -> String {
    match op {
        Op::Reg(r) => reg_name(*r, syntax),
        Op::RegWb(r) => format!("{}!", reg_name(*r, syntax)),
        Op::Imm(v) => imm_text(*v),
        Op::Target(t) => format!("#{}", crate::arch::hex(*t)),
        Op::Shifted(r, shift, amount) => {
            format!("{}, {}", reg_name(*r, syntax), shift_text(*shift, *amount))
        }
        Op::RegShifted(r, shift, rs) => format!(
            "{}, {} {}",
            reg_name(*r, syntax),
            shift.name(),
            reg_name(*rs, syntax)
        ),
        Op::Mem(mem) => mem_text(mem, 0, syntax),
        Op::Aligned(mem, align) => mem_text(mem, *align, syntax),
        Op::List(regs) => {
            let names: Vec<_> = regs.iter().map(|r| reg_name(*r, syntax)).collect();
            format!("{{{}}}", names.join(", "))
        }
        Op::Lanes(regs, lane) => {
            let names: Vec<_> = regs
                .iter()
                .map(|r| match lane {
                    Lane::All => format!("{}[]", reg_name(*r, syntax)),
                    Lane::Index(i) => format!("{}[{}]", reg_name(*r, syntax), i),
                })
                .collect();
            format!("{{{}}}", names.join(", "))
        }
        Op::Coproc(n) => format!("p{}", n),
        Op::CReg(n) => format!("c{}", n),
        Op::Lane(r, i) => format!("{}[{}]", reg_name(*r, syntax), i),
        Op::Sym(s) => s.clone(),
    }
}

fn render(d: &Decoded, syntax: Syntax) -> (String, String) {
    let mut mnemonic = d.insn.name().to_string();
    if d.setflags {
        mnemonic.push('s');
    }
    mnemonic.push_str(d.cc.suffix());
    mnemonic.push_str(&d.suffix);
    let ops: Vec<_> = d.ops.iter().map(|op| op_text(op, syntax)).collect();
    (mnemonic, ops.join(", "))
}

/// Number of leading operands the instruction writes.
fn destinations(insn: ArmInsn) -> usize {
    use ArmInsn as I;
    match insn {
        I::Str | I::Strb | I::Strh | I::Strd | I::Strt | I::Strbt | I::Stm | I::Stmib
        | I::Stmda | I::Stmdb | I::Push | I::Vstr | I::Vstmia | I::Vstmdb | I::Vpush | I::Vst1
        | I::Vst2 | I::Vst3 | I::Vst4 | I::Mcr
        | I::Mcrr | I::Stc | I::Cmp | I::Cmn | I::Tst | I::Teq | I::Vcmp | I::Vcmpe | I::B
        | I::Bl | I::Blx | I::Bx | I::Bxj | I::Cbz | I::Cbnz | I::Tbb | I::Tbh | I::Svc
        | I::Bkpt | I::Udf | I::Nop | I::Yield | I::Wfe | I::Wfi | I::Sev | I::Dmb | I::Dsb
        | I::Isb | I::Clrex | I::It | I::Cpsie | I::Cpsid | I::Setend | I::Cdp => 0,
        I::Ldrd | I::Ldrexd | I::Umull | I::Smull | I::Umlal | I::Smlal | I::Umaal => 2,
        _ => 1,
    }
}

fn is_load_multiple(insn: ArmInsn) -> bool {
    use ArmInsn as I;
    matches!(
        insn,
        I::Ldm
            | I::Ldmib
            | I::Ldmda
            | I::Ldmdb
            | I::Pop
            | I::Vldmia
            | I::Vldmdb
            | I::Vpop
            | I::Vld1
            | I::Vld2
            | I::Vld3
            | I::Vld4
    )
}

fn lower(op: &Op, out: &mut Vec<ArmOperand>) {
    use ArmOperandKind as K;
    match op {
        Op::Reg(r) | Op::RegWb(r) => out.push(ArmOperand::new(K::Reg(*r))),
        Op::Imm(v) => out.push(ArmOperand::new(K::Imm(*v))),
        Op::Target(t) => out.push(ArmOperand::new(K::Imm(*t as i64))),
        Op::Shifted(r, shift, amount) => {
            let mut operand = ArmOperand::new(K::Reg(*r));
            operand.shift = Some((*shift, ArmShiftAmount::Imm(*amount)));
            out.push(operand);
        }
        Op::RegShifted(r, shift, rs) => {
            let mut operand = ArmOperand::new(K::Reg(*r));
            operand.shift = Some((*shift, ArmShiftAmount::Reg(*rs)));
            out.push(operand);
        }
        Op::Mem(mem) | Op::Aligned(mem, _) => {
            let mut m = ArmMem {
                base: mem.base,
                index: ArmReg::Invalid,
                disp: 0,
            };
            let mut operand = ArmOperand::new(K::Mem(m));
            match &mem.offset {
                Offset::None => {}
                Offset::Imm { value, subtract } => {
                    m.disp = if *subtract {
                        -(*value as i32)
                    } else {
                        *value as i32
                    };
                    operand.subtracted = *subtract;
                }
                Offset::Reg {
                    reg,
                    subtract,
                    shift,
                } => {
                    m.index = *reg;
                    operand.subtracted = *subtract;
                    operand.shift = shift.map(|(s, n)| (s, ArmShiftAmount::Imm(n)));
                }
            }
            operand.kind = K::Mem(m);
            out.push(operand);
        }
        Op::List(regs) => out.extend(regs.iter().map(|r| ArmOperand::new(K::Reg(*r)))),
        Op::Lanes(regs, lane) => out.extend(regs.iter().map(|r| {
            let mut operand = ArmOperand::new(K::Reg(*r));
            if let Lane::Index(i) = lane {
                operand.vector_index = Some(*i);
            }
            operand
        })),
        Op::Coproc(n) => out.push(ArmOperand::new(K::Coproc(*n))),
        Op::CReg(n) => out.push(ArmOperand::new(K::CoprocReg(*n))),
        Op::Lane(r, i) => {
            let mut operand = ArmOperand::new(K::Reg(*r));
            operand.vector_index = Some(*i);
            out.push(operand);
        }
        Op::Sym(s) => out.push(ArmOperand::new(K::Sys(s.clone()))),
    }
}

fn detail(d: &Decoded) -> DetailParts {
    use ArmInsn as I;
    let mut operands = Vec::new();
    let mut list_start = None;
    for op in &d.ops {
        if matches!(op, Op::List(_) | Op::Lanes(..)) {
            list_start = Some(operands.len());
        }
        lower(op, &mut operands);
    }
    let writes = destinations(d.insn).min(operands.len());
    for operand in operands.iter_mut().take(writes) {
        operand.access = Access::WRITE;
    }
    if let Some(start) = list_start {
        if is_load_multiple(d.insn) {
            for operand in &mut operands[start..] {
                operand.access = Access::WRITE;
            }
        }
    }
    let writeback = d.writeback();
    if writeback {
        for operand in &mut operands {
            if matches!(operand.kind, ArmOperandKind::Mem(_)) || list_start.is_some() {
                operand.access |= Access::WRITE;
                break;
            }
        }
    }

    let mut parts = DetailParts::new(Detail::Arm(ArmDetail {
        cc: d.cc,
        update_flags: d.setflags || matches!(d.insn, I::Cmp | I::Cmn | I::Tst | I::Teq),
        writeback,
        vector_data: d.suffix.trim_start_matches('.').to_string(),
        operands,
    }));

    if d.cc != ArmCc::Al {
        parts.read(ArmReg::Cpsr.id());
    }
    if d.setflags || matches!(d.insn, I::Cmp | I::Cmn | I::Tst | I::Teq) {
        parts.write(ArmReg::Cpsr.id());
    }
    match d.insn {
        I::Bl | I::Blx => {
            parts.read(ArmReg::Pc.id());
            parts.write(ArmReg::Lr.id());
            parts.common(CommonGroup::Call);
        }
        I::B | I::Bx | I::Bxj | I::Cbz | I::Cbnz | I::Tbb | I::Tbh => {
            parts.common(CommonGroup::Jump)
        }
        I::Push | I::Pop | I::Vpush | I::Vpop => {
            parts.read(ArmReg::Sp.id());
            parts.write(ArmReg::Sp.id());
        }
        I::Svc => parts.common(CommonGroup::Int),
        I::Vmrs | I::Vmsr => parts.read(ArmReg::Fpscr.id()),
        I::Cpsie | I::Cpsid => parts.common(CommonGroup::Privilege),
        _ => {}
    }
    if matches!(d.insn, I::Pop | I::Ldm | I::Ldr)
        && d.ops.iter().any(|op| match op {
            Op::List(regs) => regs.contains(&ArmReg::Pc),
            Op::Reg(r) => *r == ArmReg::Pc,
            _ => false,
        })
    {
        parts.common(CommonGroup::Jump);
    }
    if d.ops.iter().any(|op| matches!(op, Op::Target(_))) {
        parts.common(CommonGroup::BranchRelative);
    }
    for group in &d.features {
        parts.arch_group(group.id());
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Session, Syntax};

    fn lines(mode: Mode, code: &[u8]) -> Vec<String> {
        Session::open(Architecture::Arm, mode)
            .unwrap()
            .disassemble_all(code, 0x1000, 0)
            .iter()
            .map(|i| format!("{} {}", i.mnemonic, i.operands).trim_end().to_string())
            .collect()
    }

    #[test]
    fn test_arm_sample() {
        let code = [
            0xed, 0xff, 0xff, 0xeb, 0x04, 0xe0, 0x2d, 0xe5, 0x00, 0x00, 0x00, 0x00, 0xe0, 0x83,
            0x22, 0xe5, 0xf1, 0x02, 0x03, 0x0e, 0x00, 0x00, 0xa0, 0xe3, 0x02, 0x30, 0xc1, 0xe7,
            0x00, 0x00, 0x53, 0xe3,
        ];
        assert_eq!(
            lines(Mode::ARM, &code),
            [
                "bl #0xfbc",
                "str lr, [sp, #-4]!",
                "andeq r0, r0, r0",
                "str r8, [r2, #-0x3e0]!",
                "mcreq p2, #0, r0, c3, c1, #7",
                "mov r0, #0",
                "strb r3, [r1, r2]",
                "cmp r3, #0",
            ]
        );
    }

    #[test]
    fn test_thumb_samples() {
        assert_eq!(
            lines(Mode::THUMB, &[0x70, 0x47, 0xeb, 0x46, 0x83, 0xb0, 0xc9, 0x68]),
            ["bx lr", "mov fp, sp", "sub sp, #0xc", "ldr r1, [r1, #0xc]"]
        );
        assert_eq!(
            lines(
                Mode::THUMB,
                &[0x4f, 0xf0, 0x00, 0x01, 0xbd, 0xe8, 0x00, 0x88, 0xd1, 0xe8, 0x00, 0xf0]
            ),
            ["mov.w r1, #0", "pop.w {fp, pc}", "tbb [r1, r0]"]
        );
        assert_eq!(
            lines(Mode::THUMB | Mode::MCLASS, &[0xef, 0xf3, 0x02, 0x80]),
            ["mrs r0, eapsr"]
        );
    }

    #[test]
    fn test_structure_loads_in_stream() {
        let arm = [
            0x86, 0x48, 0x60, 0xf4, 0x4d, 0x0f, 0xe2, 0xf4, 0xed, 0xff, 0xff, 0xeb,
        ];
        assert_eq!(
            lines(Mode::ARM, &arm),
            [
                "vld2.32 {d20, d21}, [r0], r6",
                "vld4.16 {d16[], d17[], d18[], d19[]}, [r2]!",
                "bl #0xfc4",
            ]
        );
        let thumb = [0x60, 0xf9, 0x1f, 0x04, 0xe0, 0xf9, 0x4f, 0x07, 0x70, 0x47];
        assert_eq!(
            lines(Mode::THUMB, &thumb),
            [
                "vld3.8 {d16, d17, d18}, [r0:64]",
                "vld4.16 {d16[1], d17[1], d18[1], d19[1]}, [r0]",
                "bx lr",
            ]
        );

        let mut session = Session::open(Architecture::Arm, Mode::ARM).unwrap();
        session.set_detail(true);
        let insn = session.decode_at(&arm, 0).unwrap();
        let Some(Detail::Arm(d)) = &insn.detail else {
            panic!("missing arm detail");
        };
        assert!(d.writeback);
        assert_eq!(d.operands.len(), 3);
        assert_eq!(d.operands[0].access, Access::WRITE);
        assert!(insn.in_group(128 + ArmGroup::Neon.id()));
    }

    #[test]
    fn test_it_block_conditions() {
        // The second IT fills the single slot of the first, then opens its own block.
        let code = [
            0x18, 0xbf, 0xad, 0xbf, 0xf3, 0xff, 0x0b, 0x0c, 0x86, 0xf3, 0x00, 0x89, 0x80, 0xf3,
            0x00, 0x8c, 0x4f, 0xfa, 0x99, 0xf6, 0xd0, 0xff, 0xa2, 0x01,
        ];
        assert_eq!(
            lines(Mode::THUMB, &code),
            [
                "it ne",
                "iteet ge",
                "vdupge.8 d16, d11[1]",
                "msrlt cpsr_fc, r6",
                "msrlt apsr_nzcvqg, r0",
                "sxtbge.w r6, sb, ror #8",
                "vaddw.u16 q8, q8, d18",
            ]
        );
    }

    #[test]
    fn test_neon_and_v8() {
        let code = [
            0x10, 0xf1, 0x10, 0xe7, 0x11, 0xf2, 0x31, 0xe7, 0xdc, 0xa1, 0x2e, 0xf3, 0xe8, 0x4e,
            0x62, 0xf3,
        ];
        assert_eq!(
            lines(Mode::ARM, &code),
            [
                "sdiv r0, r0, r1",
                "udiv r1, r1, r2",
                "vbit q5, q15, q6",
                "vcgt.f32 q10, q9, q12",
            ]
        );
        let v8 = [
            0xe0, 0x3b, 0xb2, 0xee, 0x42, 0x00, 0x01, 0xe1, 0x51, 0xf0, 0x7f, 0xf5,
        ];
        assert_eq!(
            lines(Mode::ARM | Mode::V8, &v8),
            ["vcvtt.f64.f16 d3, s1", "crc32b r0, r1, r2", "dmb oshld"]
        );
        // crc32 is rejected without the v8 flag
        assert!(lines(Mode::ARM, &v8[4..8]).is_empty());
    }

    #[test]
    fn test_noregname() {
        let mut session = Session::open(Architecture::Arm, Mode::THUMB).unwrap();
        session.set_syntax(Syntax::NoRegName);
        let insn = session.decode_at(&[0xeb, 0x46], 0).unwrap();
        assert_eq!(insn.operands, "r11, r13");
    }

    #[test]
    fn test_it_block_parsing() {
        let mut block = ItBlock::open(0b1010, 0b1101);
        assert_eq!(ItBlock::pattern(0b1010, 0b1101), "eet");
        assert_eq!(ItBlock::pattern(0b0001, 0b1000), "");
        assert_eq!(block.take(), Some(ArmCc::Ge));
        assert_eq!(block.take(), Some(ArmCc::Lt));
        assert_eq!(block.take(), Some(ArmCc::Lt));
        assert_eq!(block.take(), Some(ArmCc::Ge));
        assert_eq!(block.take(), None);
    }

    #[test]
    fn test_detail() {
        let mut session = Session::open(Architecture::Arm, Mode::ARM).unwrap();
        session.set_detail(true);
        let bl = session.decode_at(&[0xed, 0xff, 0xff, 0xeb], 0x1000).unwrap();
        assert_eq!(bl.regs_read, vec![ArmReg::Pc.id()]);
        assert_eq!(bl.regs_write, vec![ArmReg::Lr.id()]);
        assert!(bl.groups.contains(&CommonGroup::Call.id()));
        assert!(bl.groups.contains(&CommonGroup::BranchRelative.id()));

        let str_insn = session.decode_at(&[0x04, 0xe0, 0x2d, 0xe5], 0x1004).unwrap();
        let Some(Detail::Arm(d)) = &str_insn.detail else {
            panic!("missing arm detail");
        };
        assert!(d.writeback);
        assert_eq!(d.operands.len(), 2);
        assert_eq!(d.operands[0].access, Access::READ);
        assert_eq!(
            d.operands[1].kind,
            ArmOperandKind::Mem(ArmMem {
                base: ArmReg::Sp,
                index: ArmReg::Invalid,
                disp: -4
            })
        );

        let andeq = session.decode_at(&[0, 0, 0, 0], 0x1008).unwrap();
        assert_eq!(andeq.regs_read, vec![ArmReg::Cpsr.id()]);
        let Some(Detail::Arm(d)) = &andeq.detail else {
            panic!("missing arm detail");
        };
        assert_eq!(d.cc, ArmCc::Eq);
        assert_eq!(d.operands[0].access, Access::WRITE);
    }
}
