//! MIPS decoding: MIPS I through MIPS64, release 6 and the microMIPS compressed encoding.
//!
//! The classic 32-bit word decoder lives in [`classic`] and microMIPS in [`micro`]. Both
//! produce a [`Decoded`] value that is printed and lowered to detail here. Preferred
//! aliases (`nop`, `move`, `b`, `beqz`, `negu`, `not`) are resolved while decoding.

mod classic;
mod micro;

use crate::arch::{hex, signed_hex, Mode};
use crate::cursor::Cursor;
use crate::decoder::{self, ArchDecoder, DecodeConfig, DecodeError, StreamState};
use crate::detail::{Access, CommonGroup, Detail, DetailParts};
use crate::names::NameTables;
use crate::{Address, Architecture, Instruction};

registry! {
    /// MIPS registers.
    pub enum MipsReg: u16 {
        Invalid => "", Zero => "zero", At => "at", V0 => "v0",
        V1 => "v1", A0 => "a0", A1 => "a1", A2 => "a2",
        A3 => "a3", T0 => "t0", T1 => "t1", T2 => "t2",
        T3 => "t3", T4 => "t4", T5 => "t5", T6 => "t6",
        T7 => "t7", S0 => "s0", S1 => "s1", S2 => "s2",
        S3 => "s3", S4 => "s4", S5 => "s5", S6 => "s6",
        S7 => "s7", T8 => "t8", T9 => "t9", K0 => "k0",
        K1 => "k1", Gp => "gp", Sp => "sp", Fp => "fp",
        Ra => "ra", F0 => "f0", F1 => "f1", F2 => "f2",
        F3 => "f3", F4 => "f4", F5 => "f5", F6 => "f6",
        F7 => "f7", F8 => "f8", F9 => "f9", F10 => "f10",
        F11 => "f11", F12 => "f12", F13 => "f13", F14 => "f14",
        F15 => "f15", F16 => "f16", F17 => "f17", F18 => "f18",
        F19 => "f19", F20 => "f20", F21 => "f21", F22 => "f22",
        F23 => "f23", F24 => "f24", F25 => "f25", F26 => "f26",
        F27 => "f27", F28 => "f28", F29 => "f29", F30 => "f30",
        F31 => "f31", Fcc0 => "fcc0", Fcc1 => "fcc1", Fcc2 => "fcc2",
        Fcc3 => "fcc3", Fcc4 => "fcc4", Fcc5 => "fcc5", Fcc6 => "fcc6",
        Fcc7 => "fcc7", Hi => "hi", Lo => "lo", Pc => "pc",
    }
}

registry! {
    /// MIPS instructions.
    pub enum MipsInsn: u16 {
        Invalid => "", AbsD => "abs.d", AbsS => "abs.s", Add => "add",
        AddD => "add.d", AddS => "add.s", Addi => "addi", Addiu => "addiu",
        Addiupc => "addiupc", Addu => "addu", Align => "align", Aluipc => "aluipc",
        And => "and", Andi => "andi", Aui => "aui", Auipc => "auipc",
        B => "b", Bal => "bal", Balc => "balc", Bc => "bc",
        Bc1eqz => "bc1eqz", Bc1f => "bc1f", Bc1nez => "bc1nez", Bc1t => "bc1t",
        Beq => "beq", Beql => "beql", Beqz => "beqz", Beqzc => "beqzc",
        Bgez => "bgez", Bgezal => "bgezal", Bgezall => "bgezall", Bgezl => "bgezl",
        Bgtz => "bgtz", Bgtzl => "bgtzl", Bitswap => "bitswap", Blez => "blez",
        Blezl => "blezl", Bltz => "bltz", Bltzal => "bltzal", Bltzall => "bltzall",
        Bltzl => "bltzl", Bne => "bne", Bnel => "bnel", Bnez => "bnez",
        Bnezc => "bnezc", Break => "break", CEqD => "c.eq.d", CEqS => "c.eq.s",
        CFD => "c.f.d", CFS => "c.f.s", CLeD => "c.le.d", CLeS => "c.le.s",
        CLtD => "c.lt.d", CLtS => "c.lt.s", CNgeD => "c.nge.d", CNgeS => "c.nge.s",
        CNglD => "c.ngl.d", CNglS => "c.ngl.s", CNgleD => "c.ngle.d", CNgleS => "c.ngle.s",
        CNgtD => "c.ngt.d", CNgtS => "c.ngt.s", COleD => "c.ole.d", COleS => "c.ole.s",
        COltD => "c.olt.d", COltS => "c.olt.s", CSeqD => "c.seq.d", CSeqS => "c.seq.s",
        CSfD => "c.sf.d", CSfS => "c.sf.s", CUeqD => "c.ueq.d", CUeqS => "c.ueq.s",
        CUleD => "c.ule.d", CUleS => "c.ule.s", CUltD => "c.ult.d", CUltS => "c.ult.s",
        CUnD => "c.un.d", CUnS => "c.un.s", Cache => "cache", Cfc1 => "cfc1",
        Clo => "clo", Clz => "clz", Ctc1 => "ctc1", CvtDL => "cvt.d.l",
        CvtDS => "cvt.d.s", CvtDW => "cvt.d.w", CvtLD => "cvt.l.d", CvtLS => "cvt.l.s",
        CvtSD => "cvt.s.d", CvtSL => "cvt.s.l", CvtSW => "cvt.s.w", CvtWD => "cvt.w.d",
        CvtWS => "cvt.w.s", Dadd => "dadd", Daddi => "daddi", Daddiu => "daddiu",
        Daddu => "daddu", Dclo => "dclo", Dclz => "dclz", Ddiv => "ddiv",
        Ddivu => "ddivu", Deret => "deret", Dext => "dext", Di => "di",
        Dins => "dins", Div => "div", DivD => "div.d", DivS => "div.s",
        Divu => "divu", Dmfc0 => "dmfc0", Dmfc1 => "dmfc1", Dmtc0 => "dmtc0",
        Dmtc1 => "dmtc1", Dmult => "dmult", Dmultu => "dmultu", Dnegu => "dnegu",
        Drotr => "drotr", Drotr32 => "drotr32", Drotrv => "drotrv", Dsll => "dsll",
        Dsll32 => "dsll32", Dsllv => "dsllv", Dsra => "dsra", Dsra32 => "dsra32",
        Dsrav => "dsrav", Dsrl => "dsrl", Dsrl32 => "dsrl32", Dsrlv => "dsrlv",
        Dsub => "dsub", Dsubu => "dsubu", Ehb => "ehb", Ei => "ei",
        Eret => "eret", Ext => "ext", Ins => "ins", J => "j",
        Jal => "jal", Jalr => "jalr", JalrHb => "jalr.hb", Jialc => "jialc",
        Jic => "jic", Jr => "jr", JrHb => "jr.hb", Jrc => "jrc",
        Lb => "lb", Lbu => "lbu", Ld => "ld", Ldc1 => "ldc1",
        Ldl => "ldl", Ldpc => "ldpc", Ldr => "ldr", Lh => "lh",
        Lhu => "lhu", Li => "li", Ll => "ll", Lld => "lld",
        Lsa => "lsa", Lui => "lui", Lw => "lw", Lwc1 => "lwc1",
        Lwl => "lwl", Lwpc => "lwpc", Lwr => "lwr", Lwu => "lwu",
        Lwupc => "lwupc", Madd => "madd", Maddu => "maddu", Mfc0 => "mfc0",
        Mfc1 => "mfc1", Mfhi => "mfhi", Mflo => "mflo", Mod => "mod",
        Modu => "modu", MovD => "mov.d", MovS => "mov.s", Move => "move",
        Movn => "movn", Movz => "movz", Msub => "msub", Msubu => "msubu",
        Mtc0 => "mtc0", Mtc1 => "mtc1", Mthi => "mthi", Mtlo => "mtlo",
        Muh => "muh", Muhu => "muhu", Mul => "mul", MulD => "mul.d",
        MulS => "mul.s", Mult => "mult", Multu => "multu", Mulu => "mulu",
        NegD => "neg.d", NegS => "neg.s", Negu => "negu", Nop => "nop",
        Nor => "nor", Not => "not", Or => "or", Ori => "ori",
        Pref => "pref", Rdhwr => "rdhwr", Rotr => "rotr", Rotrv => "rotrv",
        Sb => "sb", Sc => "sc", Scd => "scd", Sd => "sd",
        Sdbbp => "sdbbp", Sdc1 => "sdc1", Sdl => "sdl", Sdr => "sdr",
        Seb => "seb", Seh => "seh", Seleqz => "seleqz", Selnez => "selnez",
        Sh => "sh", Sll => "sll", Sllv => "sllv", Slt => "slt",
        Slti => "slti", Sltiu => "sltiu", Sltu => "sltu", SqrtD => "sqrt.d",
        SqrtS => "sqrt.s", Sra => "sra", Srav => "srav", Srl => "srl",
        Srlv => "srlv", Ssnop => "ssnop", Sub => "sub", SubD => "sub.d",
        SubS => "sub.s", Subu => "subu", Sw => "sw", Swc1 => "swc1",
        Swl => "swl", Swr => "swr", Sync => "sync", Synci => "synci",
        Syscall => "syscall", Teq => "teq", Teqi => "teqi", Tge => "tge",
        Tgei => "tgei", Tgeiu => "tgeiu", Tgeu => "tgeu", Tlbp => "tlbp",
        Tlbr => "tlbr", Tlbwi => "tlbwi", Tlbwr => "tlbwr", Tlt => "tlt",
        Tlti => "tlti", Tltiu => "tltiu", Tltu => "tltu", Tne => "tne",
        Tnei => "tnei", TruncWD => "trunc.w.d", TruncWS => "trunc.w.s", Wait => "wait",
        Wsbh => "wsbh", Xor => "xor", Xori => "xori",
    }
}

registry! {
    /// MIPS-specific groups; ids start at 128.
    pub enum MipsGroup: u8 {
        Stdenc => "stdenc",
        Mips32r2 => "mips32r2",
        Mips32r6 => "mips32r6",
        Mips64 => "mips64",
        Micromips => "micromips",
        Fpu => "fpu",
    }
}

pub static NAMES: NameTables = NameTables {
    registers: MipsReg::NAMES,
    instructions: MipsInsn::NAMES,
    groups: MipsGroup::NAMES,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MipsOperandKind {
    Reg(MipsReg),
    Imm(i64),
    Mem { base: MipsReg, disp: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MipsOperand {
    pub kind: MipsOperandKind,
    pub access: Access,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MipsDetail {
    pub operands: Vec<MipsOperand>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Reg(MipsReg),
    /// Signed immediate.
    Imm(i64),
    /// Zero-extended immediate (`andi`, `ori`, `lui`).
    Uimm(u64),
    /// Absolute branch or jump destination.
    Target(u64),
    Mem(MipsReg, i64),
    /// Coprocessor register number printed as `$n`.
    Cop(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Decoded {
    pub insn: MipsInsn,
    pub ops: Vec<Op>,
}

impl Decoded {
    pub(crate) fn new(insn: MipsInsn, ops: Vec<Op>) -> Self {
        Self { insn, ops }
    }
}

/// General-purpose register by number.
pub(crate) fn gpr(n: u32) -> MipsReg {
    MipsReg::from_id(MipsReg::Zero.id() as u32 + (n & 31)).unwrap_or(MipsReg::Invalid)
}

pub(crate) fn fpr(n: u32) -> MipsReg {
    MipsReg::from_id(MipsReg::F0.id() as u32 + (n & 31)).unwrap_or(MipsReg::Invalid)
}

pub(crate) fn fcc(n: u32) -> MipsReg {
    MipsReg::from_id(MipsReg::Fcc0.id() as u32 + (n & 7)).unwrap_or(MipsReg::Invalid)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MipsDecoder;

impl ArchDecoder for MipsDecoder {
    fn architecture(&self) -> Architecture {
        Architecture::Mips
    }

    fn decode_one(
        &self,
        cursor: &mut Cursor<'_>,
        address: Address,
        config: &DecodeConfig,
        _state: &mut StreamState,
    ) -> Result<Instruction, DecodeError> {
        let mode = config.mode;
        let decoded = if mode.contains(Mode::MICRO) {
            micro::decode(cursor, address, mode)?
        } else {
            let word = cursor.read_u32_with(mode.endian())?;
            classic::decode(word, address, mode)?
        };
        let operands = render(&decoded);
        Ok(decoder::finish(
            cursor,
            address,
            decoded.insn.id() as u32,
            decoded.insn.name().to_string(),
            operands,
            config,
            || detail(&decoded, mode),
        ))
    }
}

fn op_text(op: &Op) -> String {
    match op {
        Op::Reg(r) => format!("${}", r.name()),
        Op::Imm(v) => signed_hex(*v),
        Op::Uimm(v) | Op::Target(v) => hex(*v),
        Op::Mem(base, 0) => format!("(${})", base.name()),
        Op::Mem(base, disp) => format!("{}(${})", signed_hex(*disp), base.name()),
        Op::Cop(n) => format!("${}", n),
    }
}

fn render(d: &Decoded) -> String {
    d.ops.iter().map(op_text).collect::<Vec<_>>().join(", ")
}

/// Instructions whose first operand is a source, not a destination.
fn first_operand_read(insn: MipsInsn) -> bool {
    use MipsInsn as I;
    matches!(
        insn,
        I::Sb | I::Sh | I::Sw | I::Sd | I::Swl | I::Swr | I::Sdl | I::Sdr | I::Swc1 | I::Sdc1
            | I::Sc | I::Scd | I::Beq | I::Bne | I::Beqz | I::Bnez | I::Beql | I::Bnel
            | I::Blez | I::Bgtz | I::Blezl | I::Bgtzl | I::Bltz | I::Bgez | I::Bltzl
            | I::Bgezl | I::Bltzal | I::Bgezal | I::Bltzall | I::Bgezall | I::B | I::Bal
            | I::J | I::Jal | I::Jr | I::JrHb | I::Jrc | I::Bc | I::Balc | I::Beqzc | I::Bnezc
            | I::Jic | I::Jialc | I::Bc1f | I::Bc1t | I::Bc1eqz | I::Bc1nez | I::Mult
            | I::Multu | I::Dmult | I::Dmultu | I::Div | I::Divu | I::Ddiv | I::Ddivu
            | I::Madd | I::Maddu | I::Msub | I::Msubu | I::Mthi | I::Mtlo | I::Mtc0
            | I::Dmtc0 | I::Mtc1 | I::Dmtc1 | I::Ctc1 | I::Tge | I::Tgeu | I::Tlt | I::Tltu
            | I::Teq | I::Tne | I::Tgei | I::Tgeiu | I::Tlti | I::Tltiu | I::Teqi | I::Tnei
            | I::Syscall | I::Break | I::Sdbbp | I::Sync | I::Synci | I::Cache | I::Pref
            | I::Wait
    ) || is_fp_compare(insn)
}

fn is_fp_compare(insn: MipsInsn) -> bool {
    insn.name().starts_with("c.")
}

fn is_fpu(d: &Decoded) -> bool {
    let name = d.insn.name();
    let fp_reg = |r: &MipsReg| r.id() >= MipsReg::F0.id() && r.id() <= MipsReg::Fcc7.id();
    [".s", ".d", ".w", ".l"].iter().any(|fmt| name.ends_with(fmt))
        || d.ops.iter().any(|op| matches!(op, Op::Reg(r) if fp_reg(r)))
}

fn is_mips64(insn: MipsInsn) -> bool {
    use MipsInsn as I;
    matches!(
        insn,
        I::Dadd | I::Daddu | I::Daddi | I::Daddiu | I::Dsub | I::Dsubu | I::Dnegu | I::Dsll
            | I::Dsrl | I::Dsra | I::Dsll32 | I::Dsrl32 | I::Dsra32 | I::Dsllv | I::Dsrlv
            | I::Dsrav | I::Drotr | I::Drotr32 | I::Drotrv | I::Dmult | I::Dmultu | I::Ddiv
            | I::Ddivu | I::Dclz | I::Dclo | I::Dext | I::Dins | I::Dmfc0 | I::Dmtc0
            | I::Dmfc1 | I::Dmtc1 | I::Ld | I::Sd | I::Ldl | I::Ldr | I::Sdl | I::Sdr | I::Lwu
            | I::Lld | I::Scd | I::Ldpc
    )
}

fn is_r6(insn: MipsInsn) -> bool {
    use MipsInsn as I;
    matches!(
        insn,
        I::Muh | I::Mulu | I::Muhu | I::Mod | I::Modu | I::Seleqz | I::Selnez | I::Lsa
            | I::Bc | I::Balc | I::Beqzc | I::Bnezc | I::Jic | I::Jialc | I::Addiupc
            | I::Lwpc | I::Lwupc | I::Ldpc | I::Auipc | I::Aluipc | I::Align | I::Bitswap
            | I::Aui | I::Bc1eqz | I::Bc1nez
    )
}

fn is_r2(insn: MipsInsn) -> bool {
    use MipsInsn as I;
    matches!(
        insn,
        I::Rotr | I::Rotrv | I::Ext | I::Ins | I::Wsbh | I::Seb | I::Seh | I::Rdhwr | I::Di
            | I::Ei | I::Ehb | I::Synci
    )
}

fn lower(op: &Op) -> MipsOperandKind {
    match *op {
        Op::Reg(r) => MipsOperandKind::Reg(r),
        Op::Imm(v) => MipsOperandKind::Imm(v),
        Op::Uimm(v) | Op::Target(v) => MipsOperandKind::Imm(v as i64),
        Op::Mem(base, disp) => MipsOperandKind::Mem { base, disp },
        Op::Cop(n) => MipsOperandKind::Imm(n as i64),
    }
}

fn detail(d: &Decoded, mode: Mode) -> DetailParts {
    use MipsInsn as I;
    let writes_first = !first_operand_read(d.insn);
    let operands = d
        .ops
        .iter()
        .enumerate()
        .map(|(i, op)| MipsOperand {
            kind: lower(op),
            access: if i == 0 && writes_first {
                Access::WRITE
            } else {
                Access::READ
            },
        })
        .collect();
    let mut parts = DetailParts::new(Detail::Mips(MipsDetail { operands }));

    let (hi, lo) = (MipsReg::Hi.id(), MipsReg::Lo.id());
    match d.insn {
        I::Mult | I::Multu | I::Dmult | I::Dmultu | I::Div | I::Divu | I::Ddiv | I::Ddivu
            if !mode.contains(Mode::MIPS32R6) =>
        {
            parts.write(hi);
            parts.write(lo);
        }
        I::Madd | I::Maddu | I::Msub | I::Msubu => {
            parts.read(hi);
            parts.read(lo);
            parts.write(hi);
            parts.write(lo);
        }
        I::Mfhi => parts.read(hi),
        I::Mflo => parts.read(lo),
        I::Mthi => parts.write(hi),
        I::Mtlo => parts.write(lo),
        _ => {}
    }

    let ra = MipsReg::Ra.id();
    match d.insn {
        I::Jal | I::Bal | I::Bgezal | I::Bltzal | I::Bgezall | I::Bltzall | I::Balc | I::Jialc => {
            parts.write(ra);
            parts.common(CommonGroup::Call);
        }
        I::Jalr | I::JalrHb => parts.common(CommonGroup::Call),
        I::Jr | I::JrHb | I::Jrc if d.ops.first() == Some(&Op::Reg(MipsReg::Ra)) => {
            parts.common(CommonGroup::Jump);
            parts.common(CommonGroup::Ret);
        }
        I::J | I::Jr | I::JrHb | I::Jrc | I::Jic | I::B | I::Bc | I::Beq | I::Bne | I::Beqz | I::Bnez
        | I::Beql | I::Bnel | I::Blez | I::Bgtz | I::Blezl | I::Bgtzl | I::Bltz | I::Bgez
        | I::Bltzl | I::Bgezl | I::Beqzc | I::Bnezc | I::Bc1f | I::Bc1t | I::Bc1eqz
        | I::Bc1nez => parts.common(CommonGroup::Jump),
        I::Syscall | I::Break | I::Sdbbp => parts.common(CommonGroup::Int),
        I::Eret | I::Deret => {
            parts.common(CommonGroup::Iret);
            parts.common(CommonGroup::Privilege);
        }
        I::Mfc0 | I::Mtc0 | I::Dmfc0 | I::Dmtc0 | I::Tlbr | I::Tlbwi | I::Tlbwr | I::Tlbp
        | I::Wait | I::Di | I::Ei | I::Cache => parts.common(CommonGroup::Privilege),
        _ => {}
    }
    if d.ops.iter().any(|op| matches!(op, Op::Target(_))) {
        parts.common(CommonGroup::BranchRelative);
    }

    let encoding = if mode.contains(Mode::MICRO) {
        MipsGroup::Micromips
    } else {
        MipsGroup::Stdenc
    };
    parts.arch_group(encoding.id());
    if is_r2(d.insn) {
        parts.arch_group(MipsGroup::Mips32r2.id());
    }
    if is_r6(d.insn) {
        parts.arch_group(MipsGroup::Mips32r6.id());
    }
    if is_mips64(d.insn) {
        parts.arch_group(MipsGroup::Mips64.id());
    }
    if is_fpu(d) {
        parts.arch_group(MipsGroup::Fpu.id());
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Session;

    fn lines(mode: Mode, code: &[u8]) -> Vec<String> {
        Session::open(Architecture::Mips, mode)
            .unwrap()
            .disassemble_all(code, 0x1000, 0)
            .iter()
            .map(|i| format!("{} {}", i.mnemonic, i.operands).trim_end().to_string())
            .collect()
    }

    #[test]
    fn test_mips32_big_endian() {
        let code = [
            0x0c, 0x10, 0x00, 0x97, 0x00, 0x00, 0x00, 0x00, 0x24, 0x02, 0x00, 0x0c, 0x8f, 0xa2,
            0x00, 0x00, 0x34, 0x21, 0x34, 0x56, 0x00, 0x80, 0x04, 0x08,
        ];
        assert_eq!(
            lines(Mode::MIPS32 | Mode::BIG_ENDIAN, &code),
            [
                "jal 0x40025c",
                "nop",
                "addiu $v0, $zero, 0xc",
                "lw $v0, ($sp)",
                "ori $at, $at, 0x3456",
                "jr.hb $a0",
            ]
        );
    }

    #[test]
    fn test_mips64_little_endian() {
        let code = [0x56, 0x34, 0x21, 0x34, 0xc2, 0x17, 0x01, 0x00];
        assert_eq!(
            lines(Mode::MIPS64, &code),
            ["ori $at, $at, 0x3456", "srl $v0, $at, 0x1f"]
        );
    }

    #[test]
    fn test_micromips_r6() {
        let code = [
            0x00, 0x07, 0x00, 0x07, 0x00, 0x11, 0x93, 0x7c, 0x01, 0x8c, 0x8b, 0x7c, 0x00, 0xc7,
            0x48, 0xd0,
        ];
        assert_eq!(
            lines(Mode::MIPS32R6 | Mode::MICRO | Mode::BIG_ENDIAN, &code),
            ["break 7, 0", "wait 0x11", "syscall 0x18c", "rotrv $t1, $a2, $a3"]
        );
    }

    #[test]
    fn test_mips32r6() {
        let code = [0xec, 0x80, 0x00, 0x19, 0x7c, 0x43, 0x22, 0xa0];
        assert_eq!(
            lines(Mode::MIPS32R6 | Mode::BIG_ENDIAN, &code),
            ["addiupc $a0, 0x64", "align $a0, $v0, $v1, 2"]
        );
    }

    #[test]
    fn test_detail() {
        let mut session = Session::open(Architecture::Mips, Mode::MIPS32 | Mode::BIG_ENDIAN).unwrap();
        session.set_detail(true);

        let jal = session.decode_at(&[0x0c, 0x10, 0x00, 0x97], 0x1000).unwrap();
        assert_eq!(jal.regs_write, vec![MipsReg::Ra.id()]);
        assert!(jal.in_group(CommonGroup::Call.id()));
        assert!(jal.in_group(128 + MipsGroup::Stdenc.id()));

        let lw = session.decode_at(&[0x8f, 0xa2, 0x00, 0x08], 0).unwrap();
        let Some(Detail::Mips(d)) = &lw.detail else {
            panic!("missing mips detail");
        };
        assert_eq!(d.operands[0].kind, MipsOperandKind::Reg(MipsReg::V0));
        assert_eq!(d.operands[0].access, Access::WRITE);
        assert_eq!(
            d.operands[1].kind,
            MipsOperandKind::Mem {
                base: MipsReg::Sp,
                disp: 8
            }
        );

        // mult $a0, $a1
        let mult = session.decode_at(&[0x00, 0x85, 0x00, 0x18], 0).unwrap();
        assert_eq!(mult.regs_write, vec![MipsReg::Hi.id(), MipsReg::Lo.id()]);

        let ret = session.decode_at(&[0x03, 0xe0, 0x00, 0x08], 0).unwrap();
        assert_eq!(ret.mnemonic, "jr");
        assert!(ret.is_return());
    }
}
