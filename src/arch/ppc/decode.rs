//! Primary-opcode dispatch for the integer, branch, system and floating-point forms.

use super::{vector, BranchInfo, Decoded, Op, PpcBc, PpcBh, PpcGroup, PpcInsn as I};
use crate::arch::{sign_extend, Mode};
use crate::decoder::DecodeError;

#[derive(Debug, Clone, Copy)]
pub(super) struct Fields {
    pub rt: u32,
    pub ra: u32,
    pub rb: u32,
    pub rc: u32,
    pub d: u32,
}

impl Fields {
    pub(super) fn new(word: u32) -> Self {
        Self {
            rt: (word >> 21) & 31,
            ra: (word >> 16) & 31,
            rb: (word >> 11) & 31,
            rc: (word >> 6) & 31,
            d: word & 0xffff,
        }
    }

    fn simm(&self) -> i64 {
        sign_extend(self.d as u64, 16)
    }
}

pub(super) fn decode(word: u32, address: u64, mode: Mode) -> Result<Decoded, DecodeError> {
    let f = Fields::new(word);
    let rc = word & 1 != 0;
    let mem = Op::Mem {
        base: f.ra,
        disp: f.simm(),
    };
    let load = |insn| Decoded::new(insn, vec![Op::Gpr(f.rt), mem]);
    let fp_load = |insn| Decoded::new(insn, vec![Op::Fpr(f.rt), mem]).ext(PpcGroup::Fpu);
    let arith = |insn| Decoded::new(insn, vec![Op::Gpr(f.rt), Op::Gpr(f.ra), Op::Imm(f.simm())]);
    let logical = |insn| Decoded::new(insn, vec![Op::Gpr(f.ra), Op::Gpr(f.rt), Op::Uimm(f.d as u64)]);

    let decoded = match word >> 26 {
        2 => Decoded::new(I::Tdi, vec![Op::Uimm(f.rt as u64), Op::Gpr(f.ra), Op::Imm(f.simm())]),
        3 => Decoded::new(I::Twi, vec![Op::Uimm(f.rt as u64), Op::Gpr(f.ra), Op::Imm(f.simm())]),
        4 if mode.contains(Mode::QPX) => vector::qpx(word)?,
        4 => vector::altivec(word)?,
        7 => arith(I::Mulli),
        8 => arith(I::Subfic),
        10 | 11 => compare_immediate(word, &f),
        12 => arith(I::Addic),
        13 => arith(I::AddicDot),
        14 if f.ra == 0 => Decoded::new(I::Li, vec![Op::Gpr(f.rt), Op::Imm(f.simm())]),
        14 => arith(I::Addi),
        15 if f.ra == 0 => Decoded::new(I::Lis, vec![Op::Gpr(f.rt), Op::Imm(f.simm())]),
        15 => arith(I::Addis),
        16 => branch_conditional(word, address, mode, Via::Displacement)?,
        17 if word & 2 != 0 => {
            let level = (word >> 5) & 0x7f;
            let ops = if level == 0 { Vec::new() } else { vec![Op::Uimm(level as u64)] };
            Decoded::new(I::Sc, ops)
        }
        18 => {
            let link = word & 1 != 0;
            let absolute = word & 2 != 0;
            let offset = sign_extend((word & 0x03ff_fffc) as u64, 26);
            let insn = match (link, absolute) {
                (false, false) => I::B,
                (false, true) => I::Ba,
                (true, false) => I::Bl,
                (true, true) => I::Bla,
            };
            let mut d = Decoded::new(insn, vec![Op::Target(target(address, offset, absolute, mode))]);
            d.branch = Some(BranchInfo {
                link,
                absolute,
                ..BranchInfo::default()
            });
            d
        }
        19 => opcode19(word, address, mode, &f)?,
        20 => {
            let (sh, mb, me) = (f.rb, f.rc, (word >> 1) & 31);
            Decoded::new(
                I::Rlwimi,
                vec![Op::Gpr(f.ra), Op::Gpr(f.rt), Op::Uimm(sh as u64), Op::Uimm(mb as u64), Op::Uimm(me as u64)],
            )
            .record(rc)
        }
        21 => rotate_word_immediate(word, &f).record(rc),
        23 => {
            let (mb, me) = (f.rc, (word >> 1) & 31);
            if mb == 0 && me == 31 {
                Decoded::new(I::Rotlw, vec![Op::Gpr(f.ra), Op::Gpr(f.rt), Op::Gpr(f.rb)])
            } else {
                Decoded::new(
                    I::Rlwnm,
                    vec![Op::Gpr(f.ra), Op::Gpr(f.rt), Op::Gpr(f.rb), Op::Uimm(mb as u64), Op::Uimm(me as u64)],
                )
            }
            .record(rc)
        }
        24 if word & 0x03ff_ffff == 0 => Decoded::new(I::Nop, Vec::new()),
        24 => logical(I::Ori),
        25 => logical(I::Oris),
        26 => logical(I::Xori),
        27 => logical(I::Xoris),
        28 => logical(I::AndiDot),
        29 => logical(I::AndisDot),
        30 => rotate_doubleword(word, &f)?.record(rc),
        31 => super::extended::decode(word, &f, mode)?,
        32 => load(I::Lwz),
        33 => load(I::Lwzu),
        34 => load(I::Lbz),
        35 => load(I::Lbzu),
        36 => load(I::Stw),
        37 => load(I::Stwu),
        38 => load(I::Stb),
        39 => load(I::Stbu),
        40 => load(I::Lhz),
        41 => load(I::Lhzu),
        42 => load(I::Lha),
        43 => load(I::Lhau),
        44 => load(I::Sth),
        45 => load(I::Sthu),
        46 => load(I::Lmw),
        47 => load(I::Stmw),
        48 => fp_load(I::Lfs),
        49 => fp_load(I::Lfsu),
        50 => fp_load(I::Lfd),
        51 => fp_load(I::Lfdu),
        52 => fp_load(I::Stfs),
        53 => fp_load(I::Stfsu),
        54 => fp_load(I::Stfd),
        55 => fp_load(I::Stfdu),
        58 | 62 => {
            let ds = Op::Mem {
                base: f.ra,
                disp: sign_extend((word & 0xfffc) as u64, 16),
            };
            let insn = match (word >> 26, word & 3) {
                (58, 0) => I::Ld,
                (58, 1) => I::Ldu,
                (58, 2) => I::Lwa,
                (62, 0) => I::Std,
                (62, 1) => I::Stdu,
                _ => return Err(DecodeError::InvalidEncoding),
            };
            Decoded::new(insn, vec![Op::Gpr(f.rt), ds])
        }
        59 => float_arith(word, &f, true)?.record(rc),
        63 => float_op(word, &f)?.record(rc),
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

fn target(address: u64, offset: i64, absolute: bool, mode: Mode) -> u64 {
    let value = if absolute {
        offset as u64
    } else {
        address.wrapping_add(offset as u64)
    };
    if mode.contains(Mode::MODE_32) {
        value & 0xffff_ffff
    } else {
        value
    }
}

fn compare_immediate(word: u32, f: &Fields) -> Decoded {
    let field = (word >> 23) & 7;
    let wide = (word >> 21) & 1 != 0;
    let logical = word >> 26 == 10;
    let (insn, imm) = match (logical, wide) {
        (true, false) => (I::Cmplwi, Op::Uimm(f.d as u64)),
        (true, true) => (I::Cmpldi, Op::Uimm(f.d as u64)),
        (false, false) => (I::Cmpwi, Op::Imm(f.simm())),
        (false, true) => (I::Cmpdi, Op::Imm(f.simm())),
    };
    let mut ops = Vec::with_capacity(3);
    if field != 0 {
        ops.push(Op::Cr(field));
    }
    ops.push(Op::Gpr(f.ra));
    ops.push(imm);
    Decoded::new(insn, ops)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Via {
    Displacement,
    Lr,
    Ctr,
}

/// Conditional branches, printed with the extended mnemonics.
fn branch_conditional(word: u32, address: u64, mode: Mode, via: Via) -> Result<Decoded, DecodeError> {
    let bo = (word >> 21) & 31;
    let bi = (word >> 16) & 31;
    let link = word & 1 != 0;
    let absolute = via == Via::Displacement && word & 2 != 0;

    let always = bo & 0x14 == 0x14;
    let decrements = bo & 0x04 == 0;
    let tests_condition = bo & 0x10 == 0;
    if via == Via::Ctr && decrements {
        return Err(DecodeError::InvalidEncoding);
    }

    let mut suffix = match via {
        Via::Displacement => String::new(),
        Via::Lr => "lr".to_string(),
        Via::Ctr => "ctr".to_string(),
    };
    if link {
        suffix.push('l');
    }
    if absolute {
        suffix.push('a');
    }

    let mut ops = Vec::with_capacity(3);
    let mut bc = PpcBc::Invalid;
    let (family, stem, hint) = if always {
        (Family::Always, "b".to_string(), PpcBh::None)
    } else if decrements {
        let mut stem = if bo & 0x02 != 0 { "bdz" } else { "bdnz" }.to_string();
        let family = if bo & 0x02 != 0 { Family::Dz } else { Family::Dnz };
        let hint = if tests_condition {
            stem.push(if bo & 0x08 != 0 { 't' } else { 'f' });
            bc = condition(bo, bi);
            ops.push(Op::CrBit(bi));
            PpcBh::None
        } else {
            hint_of((bo >> 3) & 1, bo & 1)
        };
        (family, stem, hint)
    } else {
        bc = condition(bo, bi);
        if bi >> 2 != 0 {
            ops.push(Op::Cr(bi >> 2));
        }
        (Family::Cond, format!("b{}", bc.name()), hint_of((bo >> 1) & 1, bo & 1))
    };

    if via == Via::Displacement {
        let offset = sign_extend((word & 0xfffc) as u64, 16);
        ops.push(Op::Target(target(address, offset, absolute, mode)));
    }

    let mut mnemonic = format!("{}{}", stem, suffix);
    match hint {
        PpcBh::Plus => mnemonic.push('+'),
        PpcBh::Minus => mnemonic.push('-'),
        PpcBh::None => {}
    }

    let mut d = Decoded::new(branch_id(family, via, link, absolute), ops);
    d.mnemonic = Some(mnemonic);
    d.bc = bc;
    d.bh = hint;
    d.branch = Some(BranchInfo {
        link,
        to_lr: via == Via::Lr,
        to_ctr: via == Via::Ctr,
        decrements,
        absolute,
    });
    Ok(d)
}

fn hint_of(a: u32, t: u32) -> PpcBh {
    match (a, t) {
        (1, 1) => PpcBh::Plus,
        (1, _) => PpcBh::Minus,
        _ => PpcBh::None,
    }
}

fn condition(bo: u32, bi: u32) -> PpcBc {
    let when_true = bo & 0x08 != 0;
    match (bi & 3, when_true) {
        (0, true) => PpcBc::Lt,
        (0, false) => PpcBc::Ge,
        (1, true) => PpcBc::Gt,
        (1, false) => PpcBc::Le,
        (2, true) => PpcBc::Eq,
        (2, false) => PpcBc::Ne,
        (_, true) => PpcBc::Un,
        (_, false) => PpcBc::Nu,
    }
}

#[derive(Debug, Clone, Copy)]
enum Family {
    Always,
    Cond,
    Dnz,
    Dz,
}

fn branch_id(family: Family, via: Via, link: bool, absolute: bool) -> I {
    use Family::*;
    match (family, via, link, absolute) {
        (Always, Via::Displacement, false, false) => I::B,
        (Always, Via::Displacement, false, true) => I::Ba,
        (Always, Via::Displacement, true, false) => I::Bl,
        (Always, Via::Displacement, true, true) => I::Bla,
        (Always, Via::Lr, false, _) => I::Blr,
        (Always, Via::Lr, true, _) => I::Blrl,
        (Always, Via::Ctr, false, _) => I::Bctr,
        (Always, Via::Ctr, true, _) => I::Bctrl,
        (Cond, Via::Displacement, false, false) => I::Bc,
        (Cond, Via::Displacement, false, true) => I::Bca,
        (Cond, Via::Displacement, true, false) => I::Bcl,
        (Cond, Via::Displacement, true, true) => I::Bcla,
        (Cond, Via::Lr, false, _) => I::Bclr,
        (Cond, Via::Lr, true, _) => I::Bclrl,
        (Cond, Via::Ctr, false, _) => I::Bcctr,
        (Cond, Via::Ctr, true, _) => I::Bcctrl,
        (Dnz, Via::Displacement, false, false) => I::Bdnz,
        (Dnz, Via::Displacement, false, true) => I::Bdnza,
        (Dnz, Via::Displacement, true, false) => I::Bdnzl,
        (Dnz, Via::Displacement, true, true) => I::Bdnzla,
        (Dnz, _, false, _) => I::Bdnzlr,
        (Dnz, _, true, _) => I::Bdnzlrl,
        (Dz, Via::Displacement, false, false) => I::Bdz,
        (Dz, Via::Displacement, false, true) => I::Bdza,
        (Dz, Via::Displacement, true, false) => I::Bdzl,
        (Dz, Via::Displacement, true, true) => I::Bdzla,
        (Dz, _, false, _) => I::Bdzlr,
        (Dz, _, true, _) => I::Bdzlrl,
    }
}

fn opcode19(word: u32, address: u64, mode: Mode, f: &Fields) -> Result<Decoded, DecodeError> {
    let cr_logical = |insn, alias_same: Option<I>, alias_pair: Option<I>| {
        if let Some(alias) = alias_same.filter(|_| f.rt == f.ra && f.ra == f.rb) {
            return Decoded::new(alias, vec![Op::Uimm(f.rt as u64)]);
        }
        if let Some(alias) = alias_pair.filter(|_| f.ra == f.rb) {
            return Decoded::new(alias, vec![Op::Uimm(f.rt as u64), Op::Uimm(f.ra as u64)]);
        }
        Decoded::new(
            insn,
            vec![Op::Uimm(f.rt as u64), Op::Uimm(f.ra as u64), Op::Uimm(f.rb as u64)],
        )
    };
    let decoded = match (word >> 1) & 0x3ff {
        0 => Decoded::new(I::Mcrf, vec![Op::Cr(f.rt >> 2), Op::Cr(f.ra >> 2)]),
        16 => branch_conditional(word, address, mode, Via::Lr)?,
        528 => branch_conditional(word, address, mode, Via::Ctr)?,
        18 => Decoded::new(I::Rfid, Vec::new()),
        50 => Decoded::new(I::Rfi, Vec::new()),
        150 => Decoded::new(I::Isync, Vec::new()),
        33 => cr_logical(I::Crnor, None, Some(I::Crnot)),
        129 => cr_logical(I::Crandc, None, None),
        193 => cr_logical(I::Crxor, Some(I::Crclr), None),
        225 => cr_logical(I::Crnand, None, None),
        257 => cr_logical(I::Crand, None, None),
        289 => cr_logical(I::Creqv, Some(I::Crset), None),
        417 => cr_logical(I::Crorc, None, None),
        449 => cr_logical(I::Cror, None, Some(I::Crmove)),
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

fn rotate_word_immediate(word: u32, f: &Fields) -> Decoded {
    let (sh, mb, me) = (f.rb, f.rc, (word >> 1) & 31);
    let two = |insn, n: u32| Decoded::new(insn, vec![Op::Gpr(f.ra), Op::Gpr(f.rt), Op::Uimm(n as u64)]);
    if mb == 0 && me == 31 {
        two(I::Rotlwi, sh)
    } else if mb == 0 && sh + me == 31 {
        two(I::Slwi, sh)
    } else if me == 31 && sh + mb == 32 {
        two(I::Srwi, mb)
    } else if sh == 0 && me == 31 {
        two(I::Clrlwi, mb)
    } else if sh == 0 && mb == 0 {
        two(I::Clrrwi, 31 - me)
    } else {
        Decoded::new(
            I::Rlwinm,
            vec![
                Op::Gpr(f.ra),
                Op::Gpr(f.rt),
                Op::Uimm(sh as u64),
                Op::Uimm(mb as u64),
                Op::Uimm(me as u64),
            ],
        )
    }
}

fn rotate_doubleword(word: u32, f: &Fields) -> Result<Decoded, DecodeError> {
    let sh = f.rb | (((word >> 1) & 1) << 5);
    let mbe = ((word >> 6) & 31) | (((word >> 5) & 1) << 5);
    let two = |insn, n: u32| Decoded::new(insn, vec![Op::Gpr(f.ra), Op::Gpr(f.rt), Op::Uimm(n as u64)]);
    let three = |insn, a: u32, b: u32| {
        Decoded::new(
            insn,
            vec![Op::Gpr(f.ra), Op::Gpr(f.rt), Op::Uimm(a as u64), Op::Uimm(b as u64)],
        )
    };
    let decoded = match (word >> 2) & 7 {
        0 if mbe == 0 => two(I::Rotldi, sh),
        0 if sh == 0 => two(I::Clrldi, mbe),
        0 if sh + mbe == 64 => two(I::Srdi, mbe),
        0 => three(I::Rldicl, sh, mbe),
        1 if sh + mbe == 63 => two(I::Sldi, sh),
        1 => three(I::Rldicr, sh, mbe),
        2 => three(I::Rldic, sh, mbe),
        3 => three(I::Rldimi, sh, mbe),
        4 => {
            let ops = vec![Op::Gpr(f.ra), Op::Gpr(f.rt), Op::Gpr(f.rb), Op::Uimm(mbe as u64)];
            match (word >> 1) & 0xf {
                8 => Decoded::new(I::Rldcl, ops),
                9 => Decoded::new(I::Rldcr, ops),
                _ => return Err(DecodeError::InvalidEncoding),
            }
        }
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

/// A-form arithmetic shared by opcodes 59 (single) and 63 (double).
fn float_arith(word: u32, f: &Fields, single: bool) -> Result<Decoded, DecodeError> {
    let pick = |double: I, single_form: I| if single { single_form } else { double };
    let (t, a, b, c) = (Op::Fpr(f.rt), Op::Fpr(f.ra), Op::Fpr(f.rb), Op::Fpr(f.rc));
    let decoded = match (word >> 1) & 31 {
        18 => Decoded::new(pick(I::Fdiv, I::Fdivs), vec![t, a, b]),
        20 => Decoded::new(pick(I::Fsub, I::Fsubs), vec![t, a, b]),
        21 => Decoded::new(pick(I::Fadd, I::Fadds), vec![t, a, b]),
        22 => Decoded::new(pick(I::Fsqrt, I::Fsqrts), vec![t, b]),
        23 if !single => Decoded::new(I::Fsel, vec![t, a, c, b]),
        24 => Decoded::new(pick(I::Fre, I::Fres), vec![t, b]),
        25 => Decoded::new(pick(I::Fmul, I::Fmuls), vec![t, a, c]),
        26 if !single => Decoded::new(I::Frsqrte, vec![t, b]),
        28 => Decoded::new(pick(I::Fmsub, I::Fmsubs), vec![t, a, c, b]),
        29 => Decoded::new(pick(I::Fmadd, I::Fmadds), vec![t, a, c, b]),
        30 => Decoded::new(pick(I::Fnmsub, I::Fnmsubs), vec![t, a, c, b]),
        31 => Decoded::new(pick(I::Fnmadd, I::Fnmadds), vec![t, a, c, b]),
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded.ext(PpcGroup::Fpu))
}

fn float_op(word: u32, f: &Fields) -> Result<Decoded, DecodeError> {
    if (word >> 1) & 31 >= 18 {
        return float_arith(word, f, false);
    }
    let (t, a, b) = (Op::Fpr(f.rt), Op::Fpr(f.ra), Op::Fpr(f.rb));
    let decoded = match (word >> 1) & 0x3ff {
        0 => Decoded::new(I::Fcmpu, vec![Op::Cr(f.rt >> 2), a, b]),
        32 => Decoded::new(I::Fcmpo, vec![Op::Cr(f.rt >> 2), a, b]),
        12 => Decoded::new(I::Frsp, vec![t, b]),
        14 => Decoded::new(I::Fctiw, vec![t, b]),
        15 => Decoded::new(I::Fctiwz, vec![t, b]),
        38 => Decoded::new(I::Mtfsb1, vec![Op::Uimm(f.rt as u64)]),
        40 => Decoded::new(I::Fneg, vec![t, b]),
        70 => Decoded::new(I::Mtfsb0, vec![Op::Uimm(f.rt as u64)]),
        72 => Decoded::new(I::Fmr, vec![t, b]),
        136 => Decoded::new(I::Fnabs, vec![t, b]),
        264 => Decoded::new(I::Fabs, vec![t, b]),
        583 => Decoded::new(I::Mffs, vec![t]),
        711 => Decoded::new(I::Mtfsf, vec![Op::Uimm(((word >> 17) & 0xff) as u64), b]),
        814 => Decoded::new(I::Fctid, vec![t, b]),
        815 => Decoded::new(I::Fctidz, vec![t, b]),
        846 => Decoded::new(I::Fcfid, vec![t, b]),
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded.ext(PpcGroup::Fpu))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::Syntax;

    fn text(word: u32) -> String {
        let d = decode(word, 0x1000, Mode::BIG_ENDIAN).unwrap();
        format!("{} {}", d.mnemonic(), super::super::render(&d, Syntax::Default))
            .trim_end()
            .to_string()
    }

    #[test]
    fn test_aliases() {
        assert_eq!(text(0x60000000), "nop");
        assert_eq!(text(0x38600001), "li r3, 1");
        assert_eq!(text(0x3c60ffff), "lis r3, -1");
        assert_eq!(text(0x7c641b78), "mr r4, r3");
        assert_eq!(text(0x5463103a), "slwi r3, r3, 2");
        assert_eq!(text(0x5463f87e), "srwi r3, r3, 1");
        assert_eq!(text(0x7c0802a6), "mflr r0");
        assert_eq!(text(0x7c0803a6), "mtlr r0");
        assert_eq!(text(0x4e800020), "blr");
        assert_eq!(text(0x4e800421), "bctrl");
        assert_eq!(text(0x7fe00008), "trap");
    }

    #[test]
    fn test_branches() {
        assert_eq!(text(0x48000010), "b 0x1010");
        assert_eq!(text(0x4bfffffd), "bl 0xffc");
        assert_eq!(text(0x4180fff8), "blt 0xff8");
        assert_eq!(text(0x419e0008), "beq cr7, 0x1008");
        assert_eq!(text(0x42000010), "bdnz 0x1010");
    }

    #[test]
    fn test_integer_and_float() {
        assert_eq!(text(0x7c632214), "add r3, r3, r4");
        assert_eq!(text(0x7c632615), "addo. r3, r3, r4");
        assert_eq!(text(0x7c6300d0), "neg r3, r3");
        assert_eq!(text(0xf8210010), "std r1, 0x10(r1)");
        assert_eq!(text(0xe8610008), "ld r3, 8(r1)");
        assert_eq!(text(0x9421fff0), "stwu r1, -0x10(r1)");
        assert_eq!(text(0xfc22182a), "fadd f1, f2, f3");
        assert_eq!(text(0xec22182a), "fadds f1, f2, f3");
        assert_eq!(text(0xfc011000), "fcmpu cr0, f1, f2");
        assert_eq!(text(0x78630020), "clrldi r3, r3, 0x20");
    }
}
