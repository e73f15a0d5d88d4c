//! The 32-bit MIPS word encoding (MIPS I..V, MIPS32/64 releases 1, 2 and 6).

use super::{fcc, fpr, gpr, Decoded, MipsInsn as I, MipsReg, Op};
use crate::arch::{sign_extend, Mode};
use crate::decoder::DecodeError;

#[derive(Debug, Clone, Copy)]
struct Fields {
    rs: u32,
    rt: u32,
    rd: u32,
    sa: u32,
    funct: u32,
    imm: u32,
}

impl Fields {
    fn new(word: u32) -> Self {
        Self {
            rs: (word >> 21) & 31,
            rt: (word >> 16) & 31,
            rd: (word >> 11) & 31,
            sa: (word >> 6) & 31,
            funct: word & 0x3f,
            imm: word & 0xffff,
        }
    }

    fn simm(&self) -> i64 {
        sign_extend(self.imm as u64, 16)
    }
}

/// Revision gates derived from the session mode.
#[derive(Debug, Clone, Copy)]
struct Isa {
    r6: bool,
    mips64: bool,
}

impl Isa {
    fn from_mode(mode: Mode) -> Self {
        Self {
            r6: mode.contains(Mode::MIPS32R6),
            mips64: mode.intersects(Mode::MIPS64 | Mode::MIPS3),
        }
    }

    fn require(&self, ok: bool) -> Result<(), DecodeError> {
        if ok {
            Ok(())
        } else {
            Err(DecodeError::InvalidEncoding)
        }
    }

    fn pre_r6(&self) -> Result<(), DecodeError> {
        self.require(!self.r6)
    }

    fn only_r6(&self) -> Result<(), DecodeError> {
        self.require(self.r6)
    }

    fn wide(&self) -> Result<(), DecodeError> {
        self.require(self.mips64)
    }
}

fn reg(n: u32) -> Op {
    Op::Reg(gpr(n))
}

fn freg(n: u32) -> Op {
    Op::Reg(fpr(n))
}

fn branch_target(address: u64, offset: i64) -> Op {
    Op::Target(address.wrapping_add(4).wrapping_add(offset as u64))
}

pub(super) fn decode(word: u32, address: u64, mode: Mode) -> Result<Decoded, DecodeError> {
    let isa = Isa::from_mode(mode);
    let f = Fields::new(word);
    let offset = f.simm() << 2;
    let mem = Op::Mem(gpr(f.rs), f.simm());
    let rt_mem = |insn| Decoded::new(insn, vec![reg(f.rt), mem]);
    let ft_mem = |insn| Decoded::new(insn, vec![freg(f.rt), mem]);
    let imm_op = |insn| Decoded::new(insn, vec![reg(f.rt), reg(f.rs), Op::Imm(f.simm())]);
    let uimm_op = |insn| Decoded::new(insn, vec![reg(f.rt), reg(f.rs), Op::Uimm(f.imm as u64)]);

    let decoded = match word >> 26 {
        0x00 => special(word, &f, isa)?,
        0x01 => regimm(&f, isa, address)?,
        0x02 | 0x03 => {
            let target = (address.wrapping_add(4) & !0x0fff_ffff) | (((word & 0x03ff_ffff) as u64) << 2);
            let insn = if word >> 26 == 0x02 { I::J } else { I::Jal };
            Decoded::new(insn, vec![Op::Target(target)])
        }
        0x04 => match (f.rs, f.rt) {
            (0, 0) => Decoded::new(I::B, vec![branch_target(address, offset)]),
            (_, 0) => Decoded::new(I::Beqz, vec![reg(f.rs), branch_target(address, offset)]),
            _ => Decoded::new(
                I::Beq,
                vec![reg(f.rs), reg(f.rt), branch_target(address, offset)],
            ),
        },
        0x05 if f.rt == 0 => Decoded::new(I::Bnez, vec![reg(f.rs), branch_target(address, offset)]),
        0x05 => Decoded::new(
            I::Bne,
            vec![reg(f.rs), reg(f.rt), branch_target(address, offset)],
        ),
        0x06 | 0x07 | 0x16 | 0x17 => {
            if f.rt != 0 {
                return Err(DecodeError::InvalidEncoding);
            }
            let insn = match word >> 26 {
                0x06 => I::Blez,
                0x07 => I::Bgtz,
                0x16 => I::Blezl,
                _ => I::Bgtzl,
            };
            if matches!(insn, I::Blezl | I::Bgtzl) {
                isa.pre_r6()?;
            }
            Decoded::new(insn, vec![reg(f.rs), branch_target(address, offset)])
        }
        0x08 => {
            isa.pre_r6()?;
            imm_op(I::Addi)
        }
        0x09 => imm_op(I::Addiu),
        0x0a => imm_op(I::Slti),
        0x0b => imm_op(I::Sltiu),
        0x0c => uimm_op(I::Andi),
        0x0d => uimm_op(I::Ori),
        0x0e => uimm_op(I::Xori),
        0x0f if f.rs == 0 => Decoded::new(I::Lui, vec![reg(f.rt), Op::Uimm(f.imm as u64)]),
        0x0f => {
            isa.only_r6()?;
            uimm_op(I::Aui)
        }
        0x10 => cop0(word, &f, isa)?,
        0x11 => cop1(&f, isa, address)?,
        0x14 | 0x15 => {
            isa.pre_r6()?;
            let insn = if word >> 26 == 0x14 { I::Beql } else { I::Bnel };
            Decoded::new(insn, vec![reg(f.rs), reg(f.rt), branch_target(address, offset)])
        }
        0x18 => {
            isa.wide()?;
            isa.pre_r6()?;
            imm_op(I::Daddi)
        }
        0x19 => {
            isa.wide()?;
            imm_op(I::Daddiu)
        }
        0x1a | 0x1b => {
            isa.wide()?;
            isa.pre_r6()?;
            rt_mem(if word >> 26 == 0x1a { I::Ldl } else { I::Ldr })
        }
        0x1c => {
            isa.pre_r6()?;
            special2(&f, isa)?
        }
        0x1f => special3(&f, isa)?,
        0x20 => rt_mem(I::Lb),
        0x21 => rt_mem(I::Lh),
        0x22 => {
            isa.pre_r6()?;
            rt_mem(I::Lwl)
        }
        0x23 => rt_mem(I::Lw),
        0x24 => rt_mem(I::Lbu),
        0x25 => rt_mem(I::Lhu),
        0x26 => {
            isa.pre_r6()?;
            rt_mem(I::Lwr)
        }
        0x27 => {
            isa.wide()?;
            rt_mem(I::Lwu)
        }
        0x28 => rt_mem(I::Sb),
        0x29 => rt_mem(I::Sh),
        0x2a => {
            isa.pre_r6()?;
            rt_mem(I::Swl)
        }
        0x2b => rt_mem(I::Sw),
        0x2c | 0x2d => {
            isa.wide()?;
            isa.pre_r6()?;
            rt_mem(if word >> 26 == 0x2c { I::Sdl } else { I::Sdr })
        }
        0x2e => {
            isa.pre_r6()?;
            rt_mem(I::Swr)
        }
        0x2f => {
            isa.pre_r6()?;
            Decoded::new(I::Cache, vec![Op::Uimm(f.rt as u64), mem])
        }
        0x30 => {
            isa.pre_r6()?;
            rt_mem(I::Ll)
        }
        0x31 => ft_mem(I::Lwc1),
        0x32 if isa.r6 => Decoded::new(
            I::Bc,
            vec![branch_target(address, sign_extend((word & 0x03ff_ffff) as u64, 26) << 2)],
        ),
        0x33 => {
            isa.pre_r6()?;
            Decoded::new(I::Pref, vec![Op::Uimm(f.rt as u64), mem])
        }
        0x34 => {
            isa.wide()?;
            isa.pre_r6()?;
            rt_mem(I::Lld)
        }
        0x35 => ft_mem(I::Ldc1),
        0x36 | 0x3e if isa.r6 => compact_zero_branch(word, &f, address)?,
        0x37 => {
            isa.wide()?;
            rt_mem(I::Ld)
        }
        0x38 => {
            isa.pre_r6()?;
            rt_mem(I::Sc)
        }
        0x39 => ft_mem(I::Swc1),
        0x3a if isa.r6 => Decoded::new(
            I::Balc,
            vec![branch_target(address, sign_extend((word & 0x03ff_ffff) as u64, 26) << 2)],
        ),
        0x3b if isa.r6 => pc_relative(word, &f, isa)?,
        0x3c => {
            isa.wide()?;
            isa.pre_r6()?;
            rt_mem(I::Scd)
        }
        0x3d => ft_mem(I::Sdc1),
        0x3f => {
            isa.wide()?;
            rt_mem(I::Sd)
        }
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

fn special(word: u32, f: &Fields, isa: Isa) -> Result<Decoded, DecodeError> {
    let three = |insn| Decoded::new(insn, vec![reg(f.rd), reg(f.rs), reg(f.rt)]);
    let shift = |insn, amount: u32| Decoded::new(insn, vec![reg(f.rd), reg(f.rt), Op::Imm(amount as i64)]);
    let variable = |insn| Decoded::new(insn, vec![reg(f.rd), reg(f.rt), reg(f.rs)]);
    let pair = |insn| Decoded::new(insn, vec![reg(f.rs), reg(f.rt)]);
    let trap = |insn| {
        let code = (word >> 6) & 0x3ff;
        let mut ops = vec![reg(f.rs), reg(f.rt)];
        if code != 0 {
            ops.push(Op::Uimm(code as u64));
        }
        Decoded::new(insn, ops)
    };

    let decoded = match f.funct {
        0x00 if word == 0 => Decoded::new(I::Nop, Vec::new()),
        0x00 if f.rd == 0 && f.rt == 0 && f.sa == 1 => Decoded::new(I::Ssnop, Vec::new()),
        0x00 if f.rd == 0 && f.rt == 0 && f.sa == 3 => Decoded::new(I::Ehb, Vec::new()),
        0x00 => shift(I::Sll, f.sa),
        0x02 if f.rs == 1 => shift(I::Rotr, f.sa),
        0x02 => shift(I::Srl, f.sa),
        0x03 => shift(I::Sra, f.sa),
        0x04 => variable(I::Sllv),
        0x05 => {
            isa.only_r6()?;
            let amount = ((word >> 6) & 3) + 1;
            Decoded::new(
                I::Lsa,
                vec![reg(f.rd), reg(f.rs), reg(f.rt), Op::Imm(amount as i64)],
            )
        }
        0x06 if f.sa == 1 => variable(I::Rotrv),
        0x06 => variable(I::Srlv),
        0x07 => variable(I::Srav),
        0x08 => {
            let insn = if word & 0x400 != 0 { I::JrHb } else { I::Jr };
            Decoded::new(insn, vec![reg(f.rs)])
        }
        0x09 => {
            let hazard = word & 0x400 != 0;
            match f.rd {
                0 => Decoded::new(if hazard { I::JrHb } else { I::Jr }, vec![reg(f.rs)]),
                31 => Decoded::new(if hazard { I::JalrHb } else { I::Jalr }, vec![reg(f.rs)]),
                _ => Decoded::new(
                    if hazard { I::JalrHb } else { I::Jalr },
                    vec![reg(f.rd), reg(f.rs)],
                ),
            }
        }
        0x0a => {
            isa.pre_r6()?;
            three(I::Movz)
        }
        0x0b => {
            isa.pre_r6()?;
            three(I::Movn)
        }
        0x0c => {
            let code = (word >> 6) & 0xfffff;
            let ops = if code == 0 { Vec::new() } else { vec![Op::Uimm(code as u64)] };
            Decoded::new(I::Syscall, ops)
        }
        0x0d => {
            let (code, code2) = ((word >> 16) & 0x3ff, (word >> 6) & 0x3ff);
            let ops = if code == 0 && code2 == 0 {
                Vec::new()
            } else {
                vec![Op::Uimm(code as u64), Op::Uimm(code2 as u64)]
            };
            Decoded::new(I::Break, ops)
        }
        0x0f => {
            let ops = if f.sa == 0 { Vec::new() } else { vec![Op::Uimm(f.sa as u64)] };
            Decoded::new(I::Sync, ops)
        }
        0x10 if isa.r6 && f.sa == 1 => Decoded::new(I::Clz, vec![reg(f.rd), reg(f.rs)]),
        0x11 if isa.r6 && f.sa == 1 => Decoded::new(I::Clo, vec![reg(f.rd), reg(f.rs)]),
        0x10 | 0x12 => {
            isa.pre_r6()?;
            let insn = if f.funct == 0x10 { I::Mfhi } else { I::Mflo };
            Decoded::new(insn, vec![reg(f.rd)])
        }
        0x11 | 0x13 => {
            isa.pre_r6()?;
            let insn = if f.funct == 0x11 { I::Mthi } else { I::Mtlo };
            Decoded::new(insn, vec![reg(f.rs)])
        }
        0x14 | 0x16 | 0x17 => {
            isa.wide()?;
            let insn = match (f.funct, f.sa) {
                (0x14, _) => I::Dsllv,
                (0x16, 1) => I::Drotrv,
                (0x16, _) => I::Dsrlv,
                _ => I::Dsrav,
            };
            variable(insn)
        }
        0x18..=0x1b if isa.r6 => {
            let insn = match (f.funct, f.sa) {
                (0x18, 2) => I::Mul,
                (0x18, 3) => I::Muh,
                (0x19, 2) => I::Mulu,
                (0x19, 3) => I::Muhu,
                (0x1a, 2) => I::Div,
                (0x1a, 3) => I::Mod,
                (0x1b, 2) => I::Divu,
                (0x1b, 3) => I::Modu,
                _ => return Err(DecodeError::InvalidEncoding),
            };
            three(insn)
        }
        0x18 => pair(I::Mult),
        0x19 => pair(I::Multu),
        0x1a | 0x1b => {
            let insn = if f.funct == 0x1a { I::Div } else { I::Divu };
            Decoded::new(insn, vec![Op::Reg(MipsReg::Zero), reg(f.rs), reg(f.rt)])
        }
        0x1c..=0x1f => {
            isa.wide()?;
            isa.pre_r6()?;
            let insn = [I::Dmult, I::Dmultu, I::Ddiv, I::Ddivu][(f.funct - 0x1c) as usize];
            pair(insn)
        }
        0x20 => three(I::Add),
        0x21 if f.rt == 0 => Decoded::new(I::Move, vec![reg(f.rd), reg(f.rs)]),
        0x21 => three(I::Addu),
        0x22 => three(I::Sub),
        0x23 if f.rs == 0 => Decoded::new(I::Negu, vec![reg(f.rd), reg(f.rt)]),
        0x23 => three(I::Subu),
        0x24 => three(I::And),
        0x25 if f.rt == 0 => Decoded::new(I::Move, vec![reg(f.rd), reg(f.rs)]),
        0x25 => three(I::Or),
        0x26 => three(I::Xor),
        0x27 if f.rt == 0 => Decoded::new(I::Not, vec![reg(f.rd), reg(f.rs)]),
        0x27 => three(I::Nor),
        0x2a => three(I::Slt),
        0x2b => three(I::Sltu),
        0x2c..=0x2f => {
            isa.wide()?;
            match f.funct {
                0x2c => three(I::Dadd),
                0x2d if f.rt == 0 => Decoded::new(I::Move, vec![reg(f.rd), reg(f.rs)]),
                0x2d => three(I::Daddu),
                0x2e => three(I::Dsub),
                _ if f.rs == 0 => Decoded::new(I::Dnegu, vec![reg(f.rd), reg(f.rt)]),
                _ => three(I::Dsubu),
            }
        }
        0x30 => trap(I::Tge),
        0x31 => trap(I::Tgeu),
        0x32 => trap(I::Tlt),
        0x33 => trap(I::Tltu),
        0x34 => trap(I::Teq),
        0x36 => trap(I::Tne),
        0x35 | 0x37 => {
            isa.only_r6()?;
            three(if f.funct == 0x35 { I::Seleqz } else { I::Selnez })
        }
        0x38 | 0x3a | 0x3b | 0x3c | 0x3e | 0x3f => {
            isa.wide()?;
            let insn = match (f.funct, f.rs) {
                (0x38, _) => I::Dsll,
                (0x3a, 1) => I::Drotr,
                (0x3a, _) => I::Dsrl,
                (0x3b, _) => I::Dsra,
                (0x3c, _) => I::Dsll32,
                (0x3e, 1) => I::Drotr32,
                (0x3e, _) => I::Dsrl32,
                _ => I::Dsra32,
            };
            shift(insn, f.sa)
        }
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

fn regimm(f: &Fields, isa: Isa, address: u64) -> Result<Decoded, DecodeError> {
    let target = branch_target(address, f.simm() << 2);
    let branch = |insn| Decoded::new(insn, vec![reg(f.rs), target]);
    let trap = |insn| Decoded::new(insn, vec![reg(f.rs), Op::Imm(f.simm())]);
    let decoded = match f.rt {
        0x00 => branch(I::Bltz),
        0x01 => branch(I::Bgez),
        0x02 | 0x03 | 0x12 | 0x13 => {
            isa.pre_r6()?;
            branch(match f.rt {
                0x02 => I::Bltzl,
                0x03 => I::Bgezl,
                0x12 => I::Bltzall,
                _ => I::Bgezall,
            })
        }
        0x08 => trap(I::Tgei),
        0x09 => trap(I::Tgeiu),
        0x0a => trap(I::Tlti),
        0x0b => trap(I::Tltiu),
        0x0c => trap(I::Teqi),
        0x0e => trap(I::Tnei),
        0x10 => branch(I::Bltzal),
        0x11 if f.rs == 0 => Decoded::new(I::Bal, vec![target]),
        0x11 => branch(I::Bgezal),
        0x1f => Decoded::new(I::Synci, vec![Op::Mem(gpr(f.rs), f.simm())]),
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

fn cop0(word: u32, f: &Fields, isa: Isa) -> Result<Decoded, DecodeError> {
    let select = Op::Uimm((word & 7) as u64);
    let decoded = match f.rs {
        0x00 => Decoded::new(I::Mfc0, vec![reg(f.rt), Op::Cop(f.rd), select]),
        0x01 => {
            isa.wide()?;
            Decoded::new(I::Dmfc0, vec![reg(f.rt), Op::Cop(f.rd), select])
        }
        0x04 => Decoded::new(I::Mtc0, vec![reg(f.rt), Op::Cop(f.rd), select]),
        0x05 => {
            isa.wide()?;
            Decoded::new(I::Dmtc0, vec![reg(f.rt), Op::Cop(f.rd), select])
        }
        0x0b if f.rd == 12 => {
            let insn = if word & 0x20 != 0 { I::Ei } else { I::Di };
            let ops = if f.rt == 0 { Vec::new() } else { vec![reg(f.rt)] };
            Decoded::new(insn, ops)
        }
        0x10..=0x1f => {
            let insn = match f.funct {
                0x01 => I::Tlbr,
                0x02 => I::Tlbwi,
                0x06 => I::Tlbwr,
                0x08 => I::Tlbp,
                0x18 => I::Eret,
                0x1f => I::Deret,
                0x20 => I::Wait,
                _ => return Err(DecodeError::InvalidEncoding),
            };
            Decoded::new(insn, Vec::new())
        }
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

/// `.s` / `.d` arithmetic, indexed by function code 0..=7.
const FP_ARITH: [[I; 2]; 8] = [
    [I::AddS, I::AddD],
    [I::SubS, I::SubD],
    [I::MulS, I::MulD],
    [I::DivS, I::DivD],
    [I::SqrtS, I::SqrtD],
    [I::AbsS, I::AbsD],
    [I::MovS, I::MovD],
    [I::NegS, I::NegD],
];

/// `c.cond.s` / `c.cond.d`, indexed by the condition field.
const FP_COMPARE: [[I; 2]; 16] = [
    [I::CFS, I::CFD],
    [I::CUnS, I::CUnD],
    [I::CEqS, I::CEqD],
    [I::CUeqS, I::CUeqD],
    [I::COltS, I::COltD],
    [I::CUltS, I::CUltD],
    [I::COleS, I::COleD],
    [I::CUleS, I::CUleD],
    [I::CSfS, I::CSfD],
    [I::CNgleS, I::CNgleD],
    [I::CSeqS, I::CSeqD],
    [I::CNglS, I::CNglD],
    [I::CLtS, I::CLtD],
    [I::CNgeS, I::CNgeD],
    [I::CLeS, I::CLeD],
    [I::CNgtS, I::CNgtD],
];

fn cop1(f: &Fields, isa: Isa, address: u64) -> Result<Decoded, DecodeError> {
    let (fs, fd, ft) = (f.rd, f.sa, f.rt);
    let move_op = |insn| Decoded::new(insn, vec![reg(f.rt), freg(fs)]);
    let decoded = match f.rs {
        0x00 => move_op(I::Mfc1),
        0x01 => {
            isa.wide()?;
            move_op(I::Dmfc1)
        }
        0x02 => Decoded::new(I::Cfc1, vec![reg(f.rt), Op::Cop(fs)]),
        0x04 => move_op(I::Mtc1),
        0x05 => {
            isa.wide()?;
            move_op(I::Dmtc1)
        }
        0x06 => Decoded::new(I::Ctc1, vec![reg(f.rt), Op::Cop(fs)]),
        0x08 => {
            isa.pre_r6()?;
            let insn = if f.rt & 1 != 0 { I::Bc1t } else { I::Bc1f };
            Decoded::new(
                insn,
                vec![Op::Reg(fcc(f.rt >> 2)), branch_target(address, f.simm() << 2)],
            )
        }
        0x09 | 0x0d => {
            isa.only_r6()?;
            let insn = if f.rs == 0x09 { I::Bc1eqz } else { I::Bc1nez };
            Decoded::new(insn, vec![freg(ft), branch_target(address, f.simm() << 2)])
        }
        0x10 | 0x11 => {
            let double = (f.rs & 1) as usize;
            match f.funct {
                0x00..=0x03 => Decoded::new(
                    FP_ARITH[f.funct as usize][double],
                    vec![freg(fd), freg(fs), freg(ft)],
                ),
                0x04..=0x07 => Decoded::new(
                    FP_ARITH[f.funct as usize][double],
                    vec![freg(fd), freg(fs)],
                ),
                0x0d => Decoded::new(
                    [I::TruncWS, I::TruncWD][double],
                    vec![freg(fd), freg(fs)],
                ),
                0x20..=0x25 => {
                    let insn = match (f.funct, double) {
                        (0x20, 1) => I::CvtSD,
                        (0x21, 0) => I::CvtDS,
                        (0x24, 0) => I::CvtWS,
                        (0x24, _) => I::CvtWD,
                        (0x25, 0) => I::CvtLS,
                        (0x25, _) => I::CvtLD,
                        _ => return Err(DecodeError::InvalidEncoding),
                    };
                    Decoded::new(insn, vec![freg(fd), freg(fs)])
                }
                0x30..=0x3f => {
                    isa.pre_r6()?;
                    let mut ops = Vec::with_capacity(3);
                    let cc = f.sa >> 2;
                    if cc != 0 {
                        ops.push(Op::Reg(fcc(cc)));
                    }
                    ops.push(freg(fs));
                    ops.push(freg(ft));
                    Decoded::new(FP_COMPARE[(f.funct & 0xf) as usize][double], ops)
                }
                _ => return Err(DecodeError::InvalidEncoding),
            }
        }
        0x14 | 0x15 => {
            let insn = match (f.rs, f.funct) {
                (0x14, 0x20) => I::CvtSW,
                (0x14, 0x21) => I::CvtDW,
                (0x15, 0x20) => I::CvtSL,
                (0x15, 0x21) => I::CvtDL,
                _ => return Err(DecodeError::InvalidEncoding),
            };
            Decoded::new(insn, vec![freg(fd), freg(fs)])
        }
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

fn special2(f: &Fields, isa: Isa) -> Result<Decoded, DecodeError> {
    let pair = |insn| Decoded::new(insn, vec![reg(f.rs), reg(f.rt)]);
    let count = |insn| Decoded::new(insn, vec![reg(f.rd), reg(f.rs)]);
    let decoded = match f.funct {
        0x00 => pair(I::Madd),
        0x01 => pair(I::Maddu),
        0x02 => Decoded::new(I::Mul, vec![reg(f.rd), reg(f.rs), reg(f.rt)]),
        0x04 => pair(I::Msub),
        0x05 => pair(I::Msubu),
        0x20 => count(I::Clz),
        0x21 => count(I::Clo),
        0x24 | 0x25 => {
            isa.wide()?;
            count(if f.funct == 0x24 { I::Dclz } else { I::Dclo })
        }
        0x3f => {
            let code = (f.rs << 15) | (f.rt << 10) | (f.rd << 5) | f.sa;
            let ops = if code == 0 { Vec::new() } else { vec![Op::Uimm(code as u64)] };
            Decoded::new(I::Sdbbp, ops)
        }
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

fn special3(f: &Fields, isa: Isa) -> Result<Decoded, DecodeError> {
    let field_op = |insn, pos: u32, size: u32| {
        Decoded::new(
            insn,
            vec![reg(f.rt), reg(f.rs), Op::Imm(pos as i64), Op::Imm(size as i64)],
        )
    };
    let decoded = match f.funct {
        0x00 => field_op(I::Ext, f.sa, f.rd + 1),
        0x04 => {
            if f.rd < f.sa {
                return Err(DecodeError::InvalidEncoding);
            }
            field_op(I::Ins, f.sa, f.rd - f.sa + 1)
        }
        0x03 => {
            isa.wide()?;
            field_op(I::Dext, f.sa, f.rd + 1)
        }
        0x07 => {
            isa.wide()?;
            if f.rd < f.sa {
                return Err(DecodeError::InvalidEncoding);
            }
            field_op(I::Dins, f.sa, f.rd - f.sa + 1)
        }
        0x20 => match f.sa {
            0x00 if isa.r6 => Decoded::new(I::Bitswap, vec![reg(f.rd), reg(f.rt)]),
            0x02 => Decoded::new(I::Wsbh, vec![reg(f.rd), reg(f.rt)]),
            0x10 => Decoded::new(I::Seb, vec![reg(f.rd), reg(f.rt)]),
            0x18 => Decoded::new(I::Seh, vec![reg(f.rd), reg(f.rt)]),
            sa if isa.r6 && sa & 0x1c == 0x08 => Decoded::new(
                I::Align,
                vec![reg(f.rd), reg(f.rs), reg(f.rt), Op::Imm((sa & 3) as i64)],
            ),
            _ => return Err(DecodeError::InvalidEncoding),
        },
        0x3b => Decoded::new(I::Rdhwr, vec![reg(f.rt), Op::Cop(f.rd)]),
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

/// Release 6 `beqzc`/`bnezc` and their `jic`/`jialc` forms when `rs` is zero.
fn compact_zero_branch(word: u32, f: &Fields, address: u64) -> Result<Decoded, DecodeError> {
    let beq = word >> 26 == 0x36;
    if f.rs == 0 {
        let insn = if beq { I::Jic } else { I::Jialc };
        return Ok(Decoded::new(insn, vec![reg(f.rt), Op::Imm(f.simm())]));
    }
    let offset = sign_extend((word & 0x1f_ffff) as u64, 21) << 2;
    let insn = if beq { I::Beqzc } else { I::Bnezc };
    Ok(Decoded::new(insn, vec![reg(f.rs), branch_target(address, offset)]))
}

fn pc_relative(word: u32, f: &Fields, isa: Isa) -> Result<Decoded, DecodeError> {
    let rs = reg(f.rs);
    let decoded = match (word >> 19) & 3 {
        0b00 => Decoded::new(
            I::Addiupc,
            vec![rs, Op::Imm(sign_extend((word & 0x7_ffff) as u64, 19) << 2)],
        ),
        0b01 => Decoded::new(
            I::Lwpc,
            vec![rs, Op::Imm(sign_extend((word & 0x7_ffff) as u64, 19) << 2)],
        ),
        0b10 => Decoded::new(
            I::Lwupc,
            vec![rs, Op::Imm(sign_extend((word & 0x7_ffff) as u64, 19) << 2)],
        ),
        _ => match (word >> 16) & 7 {
            0b110 => Decoded::new(I::Auipc, vec![rs, Op::Uimm(f.imm as u64)]),
            0b111 => Decoded::new(I::Aluipc, vec![rs, Op::Uimm(f.imm as u64)]),
            _ if (word >> 18) & 1 == 0 => {
                isa.wide()?;
                Decoded::new(
                    I::Ldpc,
                    vec![rs, Op::Imm(sign_extend((word & 0x3_ffff) as u64, 18) << 3)],
                )
            }
            _ => return Err(DecodeError::InvalidEncoding),
        },
    };
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn text(word: u32, mode: Mode) -> String {
        let d = decode(word, 0x1000, mode).unwrap();
        format!("{} {}", d.insn.name(), super::super::render(&d))
            .trim_end()
            .to_string()
    }

    #[rstest]
    #[case(0x27bdffe8, "addiu $sp, $sp, -0x18")]
    #[case(0xafbf0014, "sw $ra, 0x14($sp)")]
    #[case(0x00402021, "move $a0, $v0")]
    #[case(0x00031023, "negu $v0, $v1")]
    #[case(0x00601027, "not $v0, $v1")]
    #[case(0x10400003, "beqz $v0, 0x1010")]
    #[case(0x1000ffff, "b 0x1000")]
    #[case(0x04110002, "bal 0x100c")]
    #[case(0x03e00008, "jr $ra")]
    #[case(0x0320f809, "jalr $t9")]
    #[case(0x3c1c0042, "lui $gp, 0x42")]
    #[case(0x00850018, "mult $a0, $a1")]
    #[case(0x0085001a, "div $zero, $a0, $a1")]
    #[case(0x00001010, "mfhi $v0")]
    #[case(0x0000000c, "syscall")]
    #[case(0x00021080, "sll $v0, $v0, 2")]
    #[case(0x70821002, "mul $v0, $a0, $v0")]
    #[case(0x7c0210a0, "wsbh $v0, $v0")]
    #[case(0x40086000, "mfc0 $t0, $12, 0")]
    #[case(0x42000018, "eret")]
    #[case(0x46020800, "add.s $f0, $f1, $f2")]
    #[case(0x46200005, "abs.d $f0, $f0")]
    #[case(0x44820000, "mtc1 $v0, $f0")]
    #[case(0xc7a00010, "lwc1 $f0, 0x10($sp)")]
    fn test_mips32(#[case] word: u32, #[case] expected: &str) {
        assert_eq!(text(word, Mode::MIPS32), expected);
    }

    #[test]
    fn test_revision_gates() {
        // daddu needs a 64-bit ISA
        assert_eq!(
            decode(0x0064102d, 0, Mode::MIPS32),
            Err(DecodeError::InvalidEncoding)
        );
        assert_eq!(text(0x0064102d, Mode::MIPS64), "daddu $v0, $v1, $a0");
        // mult is gone in release 6; the same function code with sa=2 is mul
        assert_eq!(
            decode(0x00850018, 0, Mode::MIPS32R6),
            Err(DecodeError::InvalidEncoding)
        );
        assert_eq!(text(0x00851098, Mode::MIPS32R6), "mul $v0, $a0, $a1");
        assert_eq!(text(0xc8000004, Mode::MIPS32R6), "bc 0x1014");
    }
}
