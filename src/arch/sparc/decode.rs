//! The three SPARC instruction formats, selected by the top two bits of the word.

use super::{double, fcc, fpr, gpr, Asi, Decoded, Op, SparcCc, SparcHint, SparcInsn as I, SparcReg};
use crate::arch::{sign_extend, Mode};
use crate::decoder::DecodeError;

/// Integer condition codes in `cond` field order.
const ICC: [SparcCc; 16] = [
    SparcCc::N,
    SparcCc::E,
    SparcCc::Le,
    SparcCc::L,
    SparcCc::Leu,
    SparcCc::Cs,
    SparcCc::Neg,
    SparcCc::Vs,
    SparcCc::A,
    SparcCc::Ne,
    SparcCc::G,
    SparcCc::Ge,
    SparcCc::Gu,
    SparcCc::Cc,
    SparcCc::Pos,
    SparcCc::Vc,
];

/// Floating-point condition codes in `cond` field order.
const FCC: [SparcCc; 16] = [
    SparcCc::FccN,
    SparcCc::FccNe,
    SparcCc::FccLg,
    SparcCc::FccUl,
    SparcCc::FccL,
    SparcCc::FccUg,
    SparcCc::FccG,
    SparcCc::FccU,
    SparcCc::FccA,
    SparcCc::FccE,
    SparcCc::FccUe,
    SparcCc::FccGe,
    SparcCc::FccUge,
    SparcCc::FccLe,
    SparcCc::FccUle,
    SparcCc::FccO,
];

/// Register-or-immediate ALU operations with `rs1, src, rd` operands.
const ALU: &[(u32, I)] = &[
    (0x00, I::Add),
    (0x01, I::And),
    (0x02, I::Or),
    (0x03, I::Xor),
    (0x04, I::Sub),
    (0x05, I::Andn),
    (0x06, I::Orn),
    (0x07, I::Xnor),
    (0x08, I::Addx),
    (0x09, I::Mulx),
    (0x0a, I::Umul),
    (0x0b, I::Smul),
    (0x0c, I::Subx),
    (0x0d, I::Udivx),
    (0x0e, I::Udiv),
    (0x0f, I::Sdiv),
    (0x10, I::Addcc),
    (0x11, I::Andcc),
    (0x12, I::Orcc),
    (0x13, I::Xorcc),
    (0x14, I::Subcc),
    (0x15, I::Andncc),
    (0x16, I::Orncc),
    (0x17, I::Xnorcc),
    (0x18, I::Addxcc),
    (0x1a, I::Umulcc),
    (0x1b, I::Smulcc),
    (0x1c, I::Subxcc),
    (0x1e, I::Udivcc),
    (0x1f, I::Sdivcc),
    (0x20, I::Taddcc),
    (0x21, I::Tsubcc),
    (0x22, I::Taddcctv),
    (0x23, I::Tsubcctv),
    (0x24, I::Mulscc),
    (0x2d, I::Sdivx),
    (0x3c, I::Save),
    (0x3d, I::Restore),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Load,
    Store,
    /// Atomic register-memory exchange; `rd` is both source and destination.
    Exchange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Data {
    Int,
    Single,
    Double,
    Quad,
    Fsr,
}

/// Load/store opcodes (op = 3). Alternate-space forms are `op3 | 0x10`.
const MEMORY: &[(u32, I, Access, Data)] = &[
    (0x00, I::Ld, Access::Load, Data::Int),
    (0x01, I::Ldub, Access::Load, Data::Int),
    (0x02, I::Lduh, Access::Load, Data::Int),
    (0x03, I::Ldd, Access::Load, Data::Int),
    (0x04, I::St, Access::Store, Data::Int),
    (0x05, I::Stb, Access::Store, Data::Int),
    (0x06, I::Sth, Access::Store, Data::Int),
    (0x07, I::Std, Access::Store, Data::Int),
    (0x08, I::Ldsw, Access::Load, Data::Int),
    (0x09, I::Ldsb, Access::Load, Data::Int),
    (0x0a, I::Ldsh, Access::Load, Data::Int),
    (0x0b, I::Ldx, Access::Load, Data::Int),
    (0x0d, I::Ldstub, Access::Exchange, Data::Int),
    (0x0e, I::Stx, Access::Store, Data::Int),
    (0x0f, I::Swap, Access::Exchange, Data::Int),
    (0x10, I::Lda, Access::Load, Data::Int),
    (0x11, I::Lduba, Access::Load, Data::Int),
    (0x12, I::Lduha, Access::Load, Data::Int),
    (0x13, I::Ldda, Access::Load, Data::Int),
    (0x14, I::Sta, Access::Store, Data::Int),
    (0x15, I::Stba, Access::Store, Data::Int),
    (0x16, I::Stha, Access::Store, Data::Int),
    (0x17, I::Stda, Access::Store, Data::Int),
    (0x18, I::Ldswa, Access::Load, Data::Int),
    (0x19, I::Ldsba, Access::Load, Data::Int),
    (0x1a, I::Ldsha, Access::Load, Data::Int),
    (0x1b, I::Ldxa, Access::Load, Data::Int),
    (0x1d, I::Ldstuba, Access::Exchange, Data::Int),
    (0x1e, I::Stxa, Access::Store, Data::Int),
    (0x1f, I::Swapa, Access::Exchange, Data::Int),
    (0x20, I::Ld, Access::Load, Data::Single),
    (0x21, I::Ld, Access::Load, Data::Fsr),
    (0x22, I::Ldq, Access::Load, Data::Quad),
    (0x23, I::Ldd, Access::Load, Data::Double),
    (0x24, I::St, Access::Store, Data::Single),
    (0x25, I::St, Access::Store, Data::Fsr),
    (0x26, I::Stq, Access::Store, Data::Quad),
    (0x27, I::Std, Access::Store, Data::Double),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Width {
    S,
    D,
    Q,
}

/// FPop1 operations: `(opf, insn, rs2 width, rd width, takes rs1)`.
const FPOP1: &[(u32, I, Width, Width, bool)] = &[
    (0x001, I::Fmovs, Width::S, Width::S, false),
    (0x002, I::Fmovd, Width::D, Width::D, false),
    (0x003, I::Fmovq, Width::Q, Width::Q, false),
    (0x005, I::Fnegs, Width::S, Width::S, false),
    (0x006, I::Fnegd, Width::D, Width::D, false),
    (0x007, I::Fnegq, Width::Q, Width::Q, false),
    (0x009, I::Fabss, Width::S, Width::S, false),
    (0x00a, I::Fabsd, Width::D, Width::D, false),
    (0x00b, I::Fabsq, Width::Q, Width::Q, false),
    (0x029, I::Fsqrts, Width::S, Width::S, false),
    (0x02a, I::Fsqrtd, Width::D, Width::D, false),
    (0x02b, I::Fsqrtq, Width::Q, Width::Q, false),
    (0x041, I::Fadds, Width::S, Width::S, true),
    (0x042, I::Faddd, Width::D, Width::D, true),
    (0x043, I::Faddq, Width::Q, Width::Q, true),
    (0x045, I::Fsubs, Width::S, Width::S, true),
    (0x046, I::Fsubd, Width::D, Width::D, true),
    (0x047, I::Fsubq, Width::Q, Width::Q, true),
    (0x049, I::Fmuls, Width::S, Width::S, true),
    (0x04a, I::Fmuld, Width::D, Width::D, true),
    (0x04b, I::Fmulq, Width::Q, Width::Q, true),
    (0x04d, I::Fdivs, Width::S, Width::S, true),
    (0x04e, I::Fdivd, Width::D, Width::D, true),
    (0x04f, I::Fdivq, Width::Q, Width::Q, true),
    (0x069, I::Fsmuld, Width::S, Width::D, true),
    (0x06e, I::Fdmulq, Width::D, Width::Q, true),
    (0x081, I::Fstox, Width::S, Width::D, false),
    (0x082, I::Fdtox, Width::D, Width::D, false),
    (0x083, I::Fqtox, Width::Q, Width::D, false),
    (0x084, I::Fxtos, Width::D, Width::S, false),
    (0x088, I::Fxtod, Width::D, Width::D, false),
    (0x08c, I::Fxtoq, Width::D, Width::Q, false),
    (0x0c4, I::Fitos, Width::S, Width::S, false),
    (0x0c6, I::Fdtos, Width::D, Width::S, false),
    (0x0c7, I::Fqtos, Width::Q, Width::S, false),
    (0x0c8, I::Fitod, Width::S, Width::D, false),
    (0x0c9, I::Fstod, Width::S, Width::D, false),
    (0x0cb, I::Fqtod, Width::Q, Width::D, false),
    (0x0cc, I::Fitoq, Width::S, Width::Q, false),
    (0x0cd, I::Fstoq, Width::S, Width::Q, false),
    (0x0ce, I::Fdtoq, Width::D, Width::Q, false),
    (0x0d1, I::Fstoi, Width::S, Width::S, false),
    (0x0d2, I::Fdtoi, Width::D, Width::S, false),
    (0x0d3, I::Fqtoi, Width::Q, Width::S, false),
];

const FCMP: &[(u32, I, Width)] = &[
    (0x051, I::Fcmps, Width::S),
    (0x052, I::Fcmpd, Width::D),
    (0x053, I::Fcmpq, Width::Q),
    (0x055, I::Fcmpes, Width::S),
    (0x056, I::Fcmped, Width::D),
    (0x057, I::Fcmpeq, Width::Q),
];

/// Fields shared by the format 3 encodings.
#[derive(Debug, Clone, Copy)]
struct Fields {
    rd: u32,
    op3: u32,
    rs1: u32,
    imm: bool,
    rs2: u32,
    simm13: i64,
}

impl Fields {
    fn new(word: u32) -> Self {
        Self {
            rd: (word >> 25) & 31,
            op3: (word >> 19) & 0x3f,
            rs1: (word >> 14) & 31,
            imm: word & (1 << 13) != 0,
            rs2: word & 31,
            simm13: sign_extend((word & 0x1fff) as u64, 13),
        }
    }

    /// The second source: `rs2` or the signed 13-bit immediate.
    fn source(&self) -> Op {
        if self.imm {
            Op::Imm(self.simm13)
        } else {
            Op::Reg(gpr(self.rs2))
        }
    }

    fn address(&self) -> Op {
        if self.imm {
            Op::Addr {
                base: gpr(self.rs1),
                index: None,
                disp: self.simm13,
            }
        } else {
            Op::Addr {
                base: gpr(self.rs1),
                index: Some(gpr(self.rs2)),
                disp: 0,
            }
        }
    }

    fn memory(&self, asi: Option<Asi>) -> Op {
        let (index, disp) = if self.imm {
            (None, self.simm13)
        } else {
            (Some(gpr(self.rs2)), 0)
        };
        Op::Mem {
            base: gpr(self.rs1),
            index,
            disp,
            asi,
        }
    }

    fn asi(&self, word: u32) -> Asi {
        if self.imm {
            Asi::Register
        } else {
            Asi::Imm(((word >> 5) & 0xff) as u8)
        }
    }
}

pub(super) fn decode(word: u32, address: u64, mode: Mode) -> Result<Decoded, DecodeError> {
    match word >> 30 {
        0 => format2(word, address, mode),
        1 => {
            let disp = sign_extend((word & 0x3fff_ffff) as u64, 30) << 2;
            Ok(Decoded::new(I::Call, vec![Op::Target(target(address, disp, mode))]))
        }
        2 => arithmetic(word, mode),
        _ => memory(word),
    }
}

/// 32-bit implementations wrap branch targets at 4 GiB.
fn target(address: u64, disp: i64, mode: Mode) -> u64 {
    let target = address.wrapping_add(disp as u64);
    if mode.contains(Mode::V9) {
        target
    } else {
        target & 0xffff_ffff
    }
}

fn branch(insn: I, base: String, cc: SparcCc, annul: bool, predict: Option<bool>, ops: Vec<Op>) -> Decoded {
    let mut mnemonic = base;
    let mut hint = SparcHint::empty();
    if annul {
        mnemonic.push_str(",a");
        hint |= SparcHint::A;
    }
    match predict {
        Some(true) => hint |= SparcHint::PT,
        Some(false) => {
            mnemonic.push_str(",pn");
            hint |= SparcHint::PN;
        }
        None => {}
    }
    Decoded {
        mnemonic: Some(mnemonic),
        cc,
        hint,
        ..Decoded::new(insn, ops)
    }
}

fn format2(word: u32, address: u64, mode: Mode) -> Result<Decoded, DecodeError> {
    let rd = (word >> 25) & 31;
    let annul = word & (1 << 29) != 0;
    let cond = ((word >> 25) & 15) as usize;
    let op2 = (word >> 22) & 7;
    let decoded = match op2 {
        0 => Decoded::new(I::Unimp, vec![Op::Uimm((word & 0x3f_ffff) as u64)]),
        4 => {
            let imm = (word & 0x3f_ffff) as u64;
            if rd == 0 && imm == 0 {
                Decoded::new(I::Nop, Vec::new())
            } else {
                Decoded::new(I::Sethi, vec![Op::Uimm(imm), Op::Reg(gpr(rd))])
            }
        }
        2 | 6 => {
            let disp = sign_extend((word & 0x3f_ffff) as u64, 22) << 2;
            let dest = Op::Target(target(address, disp, mode));
            if op2 == 2 {
                let cc = ICC[cond];
                branch(I::B, format!("b{}", cc.name()), cc, annul, None, vec![dest])
            } else {
                let cc = FCC[cond];
                branch(I::Fb, format!("fb{}", cc.name()), cc, annul, None, vec![dest])
            }
        }
        1 | 5 => {
            let field = (word >> 20) & 3;
            let predict = word & (1 << 19) != 0;
            let disp = sign_extend((word & 0x7_ffff) as u64, 19) << 2;
            let dest = Op::Target(target(address, disp, mode));
            if op2 == 1 {
                let flags = match field {
                    0 => SparcReg::Icc,
                    2 => SparcReg::Xcc,
                    _ => return Err(DecodeError::InvalidEncoding),
                };
                let cc = ICC[cond];
                let base = format!("b{}", cc.name());
                branch(I::B, base, cc, annul, Some(predict), vec![Op::Reg(flags), dest])
            } else {
                let cc = FCC[cond];
                let base = format!("fb{}", cc.name());
                branch(I::Fb, base, cc, annul, Some(predict), vec![Op::Reg(fcc(field)), dest])
            }
        }
        3 => {
            if word & (1 << 28) != 0 {
                return Err(DecodeError::InvalidEncoding);
            }
            let insn = match (word >> 25) & 7 {
                1 => I::Brz,
                2 => I::Brlez,
                3 => I::Brlz,
                5 => I::Brnz,
                6 => I::Brgz,
                7 => I::Brgez,
                _ => return Err(DecodeError::InvalidEncoding),
            };
            let raw = (((word >> 20) & 3) << 14) | (word & 0x3fff);
            let disp = sign_extend(raw as u64, 16) << 2;
            let ops = vec![
                Op::Reg(gpr((word >> 14) & 31)),
                Op::Target(target(address, disp, mode)),
            ];
            let predict = word & (1 << 19) != 0;
            branch(insn, insn.name().to_string(), SparcCc::Invalid, annul, Some(predict), ops)
        }
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

fn arithmetic(word: u32, mode: Mode) -> Result<Decoded, DecodeError> {
    let f = Fields::new(word);
    let rd = Op::Reg(gpr(f.rd));
    let rs1 = Op::Reg(gpr(f.rs1));

    if let Some(&(_, insn)) = ALU.iter().find(|(op3, _)| *op3 == f.op3) {
        return Ok(alu(insn, &f));
    }

    let decoded = match f.op3 {
        0x25..=0x27 => {
            let wide = word & (1 << 12) != 0;
            let insn = match (f.op3, wide) {
                (0x25, false) => I::Sll,
                (0x26, false) => I::Srl,
                (0x27, false) => I::Sra,
                (0x25, true) => I::Sllx,
                (0x26, true) => I::Srlx,
                _ => I::Srax,
            };
            let count = if f.imm {
                Op::Uimm((word & if wide { 0x3f } else { 0x1f }) as u64)
            } else {
                Op::Reg(gpr(f.rs2))
            };
            Decoded::new(insn, vec![rs1, count, rd])
        }
        0x28 if f.rs1 == 0 => Decoded::new(I::Rd, vec![Op::Reg(SparcReg::Y), rd]),
        0x28 if f.rs1 == 15 && f.rd == 0 => Decoded::new(I::Stbar, Vec::new()),
        0x2e if f.rs1 == 0 => Decoded::new(I::Popc, vec![f.source(), rd]),
        0x30 if f.rd == 0 => Decoded::new(I::Wr, vec![rs1, f.source(), Op::Reg(SparcReg::Y)]),
        0x34 => return fpop1(word, &f),
        0x35 => return fpop2(word, &f),
        0x36 => return vis(word, &f),
        0x38 => jmpl(&f),
        0x39 => {
            let insn = if mode.contains(Mode::V9) { I::Return } else { I::Rett };
            Decoded::new(insn, vec![f.address()])
        }
        0x3a => {
            let cc = ICC[((word >> 25) & 15) as usize];
            let ops = if f.rs1 == 0 && f.imm {
                vec![Op::Uimm((word & 0x7f) as u64)]
            } else {
                vec![f.address()]
            };
            Decoded {
                mnemonic: Some(format!("t{}", cc.name())),
                cc,
                ..Decoded::new(I::T, ops)
            }
        }
        0x3b => Decoded::new(I::Flush, vec![f.address()]),
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

/// Applies the synthetic forms (`cmp`, `mov`, `tst`, `not`, `neg`, bare `restore`).
fn alu(insn: I, f: &Fields) -> Decoded {
    let rd = Op::Reg(gpr(f.rd));
    let rs1 = Op::Reg(gpr(f.rs1));
    let src = f.source();
    let g0_src = !f.imm && f.rs2 == 0;
    match insn {
        I::Subcc if f.rd == 0 => Decoded::new(I::Cmp, vec![rs1, src]),
        I::Orcc if f.rd == 0 && f.rs1 == 0 && !f.imm => Decoded::new(I::Tst, vec![src]),
        I::Orcc if f.rd == 0 && g0_src => Decoded::new(I::Tst, vec![rs1]),
        I::Or if f.rs1 == 0 => Decoded::new(I::Mov, vec![src, rd]),
        I::Xnor if g0_src => Decoded::new(I::Not, vec![rs1, rd]),
        I::Sub if f.rs1 == 0 && !f.imm => Decoded::new(I::Neg, vec![src, rd]),
        I::Save | I::Restore if f.rd == 0 && f.rs1 == 0 && g0_src => Decoded::new(insn, Vec::new()),
        _ => Decoded::new(insn, vec![rs1, src, rd]),
    }
}

fn jmpl(f: &Fields) -> Decoded {
    let plain_return = f.imm && f.simm13 == 8;
    match gpr(f.rd) {
        SparcReg::G0 if plain_return && f.rs1 == 31 => Decoded::new(I::Ret, Vec::new()),
        SparcReg::G0 if plain_return && f.rs1 == 15 => Decoded::new(I::Retl, Vec::new()),
        SparcReg::G0 => Decoded::new(I::Jmp, vec![f.address()]),
        SparcReg::O7 => Decoded::new(I::Call, vec![f.address()]),
        rd => Decoded::new(I::Jmpl, vec![f.address(), Op::Reg(rd)]),
    }
}

fn memory(word: u32) -> Result<Decoded, DecodeError> {
    let f = Fields::new(word);
    if f.op3 == 0x3c || f.op3 == 0x3e {
        return Ok(compare_and_swap(word, &f));
    }
    let &(_, insn, access, data) = MEMORY
        .iter()
        .find(|(op3, ..)| *op3 == f.op3)
        .ok_or(DecodeError::InvalidEncoding)?;
    let asi = (f.op3 & 0x30 == 0x10).then(|| f.asi(word));
    let reg = match data {
        Data::Int => gpr(f.rd),
        Data::Single => fpr(f.rd),
        Data::Double | Data::Quad => double(f.rd),
        Data::Fsr => SparcReg::Fsr,
    };
    let insn = match (insn, data, f.rd) {
        (I::Ld, Data::Fsr, 1) => I::Ldx,
        (I::St, Data::Fsr, 1) => I::Stx,
        _ => insn,
    };
    let mem = f.memory(asi);
    let ops = match access {
        Access::Store => vec![Op::Reg(reg), mem],
        Access::Load | Access::Exchange => vec![mem, Op::Reg(reg)],
    };
    Ok(Decoded::new(insn, ops))
}

/// `casa`/`casxa`; the primary address space prints as plain `cas`/`casx`.
fn compare_and_swap(word: u32, f: &Fields) -> Decoded {
    let wide = f.op3 == 0x3e;
    let asi = f.asi(word);
    let (insn, asi) = match (wide, asi) {
        (false, Asi::Imm(0x80)) => (I::Cas, None),
        (true, Asi::Imm(0x80)) => (I::Casx, None),
        (false, asi) => (I::Casa, Some(asi)),
        (true, asi) => (I::Casxa, Some(asi)),
    };
    let mem = Op::Mem {
        base: gpr(f.rs1),
        index: None,
        disp: 0,
        asi,
    };
    Decoded::new(insn, vec![mem, Op::Reg(gpr(f.rs2)), Op::Reg(gpr(f.rd))])
}

fn freg(n: u32, width: Width) -> Op {
    Op::Reg(match width {
        Width::S => fpr(n),
        Width::D | Width::Q => double(n),
    })
}

fn fpop1(word: u32, f: &Fields) -> Result<Decoded, DecodeError> {
    let opf = (word >> 5) & 0x1ff;
    let &(_, insn, src, dst, binary) = FPOP1
        .iter()
        .find(|(key, ..)| *key == opf)
        .ok_or(DecodeError::InvalidEncoding)?;
    let mut ops = Vec::with_capacity(3);
    if binary {
        ops.push(freg(f.rs1, src));
    }
    ops.push(freg(f.rs2, src));
    ops.push(freg(f.rd, dst));
    Ok(Decoded::new(insn, ops))
}

fn fpop2(word: u32, f: &Fields) -> Result<Decoded, DecodeError> {
    let opf = (word >> 5) & 0x1ff;
    let &(_, insn, width) = FCMP
        .iter()
        .find(|(key, ..)| *key == opf)
        .ok_or(DecodeError::InvalidEncoding)?;
    let mut ops = Vec::with_capacity(3);
    let field = f.rd & 3;
    if field != 0 {
        ops.push(Op::Reg(fcc(field)));
    }
    ops.push(freg(f.rs1, width));
    ops.push(freg(f.rs2, width));
    Ok(Decoded::new(insn, ops))
}

/// A subset of the VIS instruction set (IMPDEP1).
fn vis(word: u32, f: &Fields) -> Result<Decoded, DecodeError> {
    let opf = (word >> 5) & 0x1ff;
    let (rs1, rs2) = (freg(f.rs1, Width::D), freg(f.rs2, Width::D));
    let rd = freg(f.rd, Width::D);
    let decoded = match opf {
        0x048 => Decoded::new(I::Faligndata, vec![rs1, rs2, rd]),
        0x050 => Decoded::new(I::Fpadd16, vec![rs1, rs2, rd]),
        0x052 => Decoded::new(I::Fpadd32, vec![rs1, rs2, rd]),
        0x054 => Decoded::new(I::Fpsub16, vec![rs1, rs2, rd]),
        0x056 => Decoded::new(I::Fpsub32, vec![rs1, rs2, rd]),
        0x060 => Decoded::new(I::Fzero, vec![rd]),
        0x061 => Decoded::new(I::Fzeros, vec![freg(f.rd, Width::S)]),
        0x06c => Decoded::new(I::Fxor, vec![rs1, rs2, rd]),
        0x070 => Decoded::new(I::Fand, vec![rs1, rs2, rd]),
        0x074 => Decoded::new(I::Fsrc1, vec![rs1, rd]),
        0x078 => Decoded::new(I::Fsrc2, vec![rs2, rd]),
        0x07c => Decoded::new(I::For, vec![rs1, rs2, rd]),
        0x07e => Decoded::new(I::Fone, vec![rd]),
        0x07f => Decoded::new(I::Fones, vec![freg(f.rd, Width::S)]),
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded.vis())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(word: u32, mode: Mode) -> String {
        let d = decode(word, 0x1000, mode).unwrap();
        format!("{} {}", d.mnemonic(), super::super::render(&d))
            .trim_end()
            .to_string()
    }

    #[test]
    fn test_synthetic_forms() {
        let v8 = Mode::BIG_ENDIAN;
        // jmpl %i7+8, %g0
        assert_eq!(text(0x81c7e008, v8), "ret");
        // jmpl %o7+8, %g0
        assert_eq!(text(0x81c3e008, v8), "retl");
        // save %sp, -112, %sp
        assert_eq!(text(0x9de3bf90, v8), "save %sp, -0x70, %sp");
        // orcc %g0, %o1, %g0
        assert_eq!(text(0x80900009, v8), "tst %o1");
        // xnor %o0, %g0, %o1
        assert_eq!(text(0x923a0000, v8), "not %o0, %o1");
        // sub %g0, %o1, %o0
        assert_eq!(text(0x90200009, v8), "neg %o1, %o0");
    }

    #[test]
    fn test_memory_forms() {
        let v8 = Mode::BIG_ENDIAN;
        // ld [%fp+-8], %o0
        assert_eq!(text(0xd007bff8, v8), "ld [%fp+-8], %o0");
        // lda [%g1+%g2] 0x10, %o0
        assert_eq!(text(0xd0804202, v8), "lda [%g1+%g2] 0x10, %o0");
        // std %f2, [%o0+0x10]
        assert_eq!(text(0xc53a2010, v8), "std %f2, [%o0+0x10]");
        // ld [%o0], %fsr
        assert_eq!(text(0xc10a0000, v8), "ld [%o0], %fsr");
    }

    #[test]
    fn test_g0_index_is_dropped() {
        let v8 = Mode::BIG_ENDIAN;
        // ld [%o0+%g0], %o1
        assert_eq!(text(0xd2020000, v8), "ld [%o0], %o1");
        // jmpl %o1+%g0, %g0
        assert_eq!(text(0x81c24000, v8), "jmp %o1");
        // st %o1, [%o0+%g0]
        assert_eq!(text(0xd2220000, v8), "st %o1, [%o0]");
        // a real index still prints
        assert_eq!(text(0xd2020009, v8), "ld [%o0+%o1], %o1");
    }

    #[test]
    fn test_branches_and_traps() {
        let v9 = Mode::BIG_ENDIAN | Mode::V9;
        // bne,a,pn %xcc, 0x1010
        assert_eq!(text(0x32600004, v9), "bne,a,pn %xcc, 0x1010");
        // ba %icc, 0x1008 (predict taken prints nothing)
        assert_eq!(text(0x10480002, v9), "ba %icc, 0x1008");
        // call 0x2000
        assert_eq!(text(0x40000400, v9), "call 0x2000");
        // ta 5
        assert_eq!(text(0x91d02005, v9), "ta 5");
        // return %i7+8 on V9, rett on V8
        assert_eq!(text(0x81cfe008, v9), "return %i7+8");
        assert_eq!(text(0x81cfe008, Mode::BIG_ENDIAN), "rett %i7+8");
    }

    #[test]
    fn test_branch_wraps_in_32_bit_mode() {
        let d = decode(0x10bffc00, 0, Mode::BIG_ENDIAN).unwrap();
        assert_eq!(d.ops, vec![Op::Target(0xffff_f000)]);
        let d = decode(0x10bffc00, 0, Mode::BIG_ENDIAN | Mode::V9).unwrap();
        assert_eq!(d.ops, vec![Op::Target(0xffff_ffff_ffff_f000)]);
    }

    #[test]
    fn test_float_and_vis() {
        let v9 = Mode::BIG_ENDIAN | Mode::V9;
        // faddd %f2, %f4, %f6
        assert_eq!(text(0x8da08844, v9), "faddd %f2, %f4, %f6");
        // fcmpd %fcc1, %f2, %f4
        assert_eq!(text(0x83a88a44, v9), "fcmpd %fcc1, %f2, %f4");
        // fzero %f0
        assert_eq!(text(0x81b00c00, v9), "fzero %f0");
        // double register 33 encodes as %f32
        assert_eq!(text(0x83a00841, v9), "faddd %f0, %f32, %f32");
    }
}
