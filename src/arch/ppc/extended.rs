//! Primary opcode 31: XO-form arithmetic, X-form logical, indexed memory and SPR moves.

use super::decode::Fields;
use super::{Decoded, Op, PpcGroup, PpcInsn as I};
use crate::arch::Mode;
use crate::decoder::DecodeError;

/// XO-form arithmetic keyed by the 9-bit extended opcode; `true` marks the two-operand forms.
const ARITHMETIC: &[(u32, I, bool)] = &[
    (8, I::Subfc, false),
    (9, I::Mulhdu, false),
    (10, I::Addc, false),
    (11, I::Mulhwu, false),
    (40, I::Subf, false),
    (73, I::Mulhd, false),
    (75, I::Mulhw, false),
    (104, I::Neg, true),
    (136, I::Subfe, false),
    (138, I::Adde, false),
    (200, I::Subfze, true),
    (202, I::Addze, true),
    (232, I::Subfme, true),
    (233, I::Mulld, false),
    (234, I::Addme, true),
    (235, I::Mullw, false),
    (266, I::Add, false),
    (457, I::Divdu, false),
    (459, I::Divwu, false),
    (489, I::Divd, false),
    (491, I::Divw, false),
];

/// `rt, rA|0, rB` loads.
const LOADS: &[(u32, I)] = &[
    (20, I::Lwarx),
    (21, I::Ldx),
    (23, I::Lwzx),
    (53, I::Ldux),
    (55, I::Lwzux),
    (84, I::Ldarx),
    (87, I::Lbzx),
    (119, I::Lbzux),
    (279, I::Lhzx),
    (311, I::Lhzux),
    (341, I::Lwax),
    (343, I::Lhax),
    (373, I::Lwaux),
    (375, I::Lhaux),
    (532, I::Ldbrx),
    (534, I::Lwbrx),
    (790, I::Lhbrx),
];

/// `rs, rA|0, rB` stores.
const STORES: &[(u32, I)] = &[
    (149, I::Stdx),
    (151, I::Stwx),
    (181, I::Stdux),
    (183, I::Stwux),
    (215, I::Stbx),
    (247, I::Stbux),
    (407, I::Sthx),
    (439, I::Sthux),
    (660, I::Stdbrx),
    (662, I::Stwbrx),
    (918, I::Sthbrx),
];

const FLOAT_MEMORY: &[(u32, I)] = &[
    (535, I::Lfsx),
    (567, I::Lfsux),
    (599, I::Lfdx),
    (631, I::Lfdux),
    (663, I::Stfsx),
    (695, I::Stfsux),
    (727, I::Stfdx),
    (759, I::Stfdux),
    (983, I::Stfiwx),
];

const VECTOR_MEMORY: &[(u32, I)] = &[
    (6, I::Lvsl),
    (7, I::Lvebx),
    (38, I::Lvsr),
    (39, I::Lvehx),
    (71, I::Lvewx),
    (103, I::Lvx),
    (135, I::Stvebx),
    (167, I::Stvehx),
    (199, I::Stvewx),
    (231, I::Stvx),
    (359, I::Lvxl),
    (487, I::Stvxl),
];

/// `rA, rS, rB` logical and shift forms, all with a record bit.
const LOGICAL: &[(u32, I)] = &[
    (24, I::Slw),
    (27, I::Sld),
    (28, I::And),
    (60, I::Andc),
    (124, I::Nor),
    (284, I::Eqv),
    (316, I::Xor),
    (412, I::Orc),
    (444, I::Or),
    (476, I::Nand),
    (536, I::Srw),
    (539, I::Srd),
    (792, I::Sraw),
    (794, I::Srad),
];

const CACHE: &[(u32, I)] = &[
    (54, I::Dcbst),
    (86, I::Dcbf),
    (246, I::Dcbtst),
    (278, I::Dcbt),
    (470, I::Dcbi),
    (982, I::Icbi),
    (1014, I::Dcbz),
];

fn lookup(table: &[(u32, I)], xo: u32) -> Option<I> {
    table.iter().find(|(key, _)| *key == xo).map(|(_, insn)| *insn)
}

pub(super) fn decode(word: u32, f: &Fields, mode: Mode) -> Result<Decoded, DecodeError> {
    let rc = word & 1 != 0;
    let xo = (word >> 1) & 0x3ff;

    if (word >> 1) & 31 == 15 {
        return Ok(Decoded::new(
            I::Isel,
            vec![Op::Gpr(f.rt), Op::GprOrZero(f.ra), Op::Gpr(f.rb), Op::CrBit(f.rc)],
        ));
    }
    if let Some(&(_, insn, unary)) = ARITHMETIC.iter().find(|(key, _, _)| *key == xo & 0x1ff) {
        let overflow = xo & 0x200 != 0;
        if overflow && matches!(insn, I::Mulhd | I::Mulhdu | I::Mulhw | I::Mulhwu) {
            return Err(DecodeError::InvalidEncoding);
        }
        let ops = if unary {
            vec![Op::Gpr(f.rt), Op::Gpr(f.ra)]
        } else {
            vec![Op::Gpr(f.rt), Op::Gpr(f.ra), Op::Gpr(f.rb)]
        };
        let mut d = Decoded::new(insn, ops).record(rc);
        d.overflow = overflow;
        return Ok(d);
    }

    let indexed = |insn, first: Op| Decoded::new(insn, vec![first, Op::GprOrZero(f.ra), Op::Gpr(f.rb)]);
    if let Some(insn) = lookup(LOADS, xo).or_else(|| lookup(STORES, xo)) {
        return Ok(indexed(insn, Op::Gpr(f.rt)));
    }
    if let Some(insn) = lookup(FLOAT_MEMORY, xo) {
        return Ok(indexed(insn, Op::Fpr(f.rt)).ext(PpcGroup::Fpu));
    }
    if let Some(insn) = lookup(VECTOR_MEMORY, xo) {
        return Ok(indexed(insn, Op::Vr(f.rt)).ext(PpcGroup::Altivec));
    }
    if mode.contains(Mode::QPX) && rc {
        let insn = match xo {
            615 => Some(I::Qvlfsx),
            647 => Some(I::Qvlfsux),
            _ => None,
        };
        if let Some(insn) = insn {
            return Ok(Decoded::new(insn, vec![Op::Qr(f.rt), Op::Gpr(f.ra), Op::Gpr(f.rb)]).ext(PpcGroup::Qpx));
        }
    }
    if let Some(insn) = lookup(LOGICAL, xo) {
        let d = match insn {
            I::Or if f.rt == f.rb => Decoded::new(I::Mr, vec![Op::Gpr(f.ra), Op::Gpr(f.rt)]),
            I::Nor if f.rt == f.rb => Decoded::new(I::Not, vec![Op::Gpr(f.ra), Op::Gpr(f.rt)]),
            _ => Decoded::new(insn, vec![Op::Gpr(f.ra), Op::Gpr(f.rt), Op::Gpr(f.rb)]),
        };
        return Ok(d.record(rc));
    }
    if let Some(insn) = lookup(CACHE, xo) {
        return Ok(Decoded::new(insn, vec![Op::GprOrZero(f.ra), Op::Gpr(f.rb)]));
    }

    let unary = |insn| Decoded::new(insn, vec![Op::Gpr(f.ra), Op::Gpr(f.rt)]).record(rc);
    let decoded = match xo {
        0 | 32 => {
            let field = f.rt >> 2;
            let wide = f.rt & 1 != 0;
            let insn = match (xo == 32, wide) {
                (false, false) => I::Cmpw,
                (false, true) => I::Cmpd,
                (true, false) => I::Cmplw,
                (true, true) => I::Cmpld,
            };
            let mut ops = Vec::with_capacity(3);
            if field != 0 {
                ops.push(Op::Cr(field));
            }
            ops.push(Op::Gpr(f.ra));
            ops.push(Op::Gpr(f.rb));
            Decoded::new(insn, ops)
        }
        4 if f.rt == 31 && f.ra == 0 && f.rb == 0 => Decoded::new(I::Trap, Vec::new()),
        4 | 68 => Decoded::new(
            if xo == 4 { I::Tw } else { I::Td },
            vec![Op::Uimm(f.rt as u64), Op::Gpr(f.ra), Op::Gpr(f.rb)],
        ),
        19 => Decoded::new(I::Mfcr, vec![Op::Gpr(f.rt)]),
        26 => unary(I::Cntlzw),
        58 => unary(I::Cntlzd),
        83 => Decoded::new(I::Mfmsr, vec![Op::Gpr(f.rt)]),
        144 => {
            let mask = (word >> 12) & 0xff;
            if mask == 0xff {
                Decoded::new(I::Mtcr, vec![Op::Gpr(f.rt)])
            } else {
                Decoded::new(I::Mtcrf, vec![Op::Uimm(mask as u64), Op::Gpr(f.rt)])
            }
        }
        146 => Decoded::new(I::Mtmsr, vec![Op::Gpr(f.rt)]),
        150 if rc => Decoded::new(I::StwcxDot, vec![Op::Gpr(f.rt), Op::GprOrZero(f.ra), Op::Gpr(f.rb)]),
        178 => Decoded::new(I::Mtmsrd, vec![Op::Gpr(f.rt)]),
        214 if rc => Decoded::new(I::StdcxDot, vec![Op::Gpr(f.rt), Op::GprOrZero(f.ra), Op::Gpr(f.rb)]),
        339 | 467 => move_spr(xo == 339, f),
        371 => {
            let tbr = f.ra | (f.rb << 5);
            match tbr {
                268 => Decoded::new(I::Mftb, vec![Op::Gpr(f.rt)]),
                269 => Decoded::new(I::Mftbu, vec![Op::Gpr(f.rt)]),
                _ => return Err(DecodeError::InvalidEncoding),
            }
        }
        826 | 827 => {
            let sh = f.rb | (((word >> 1) & 1) << 5);
            Decoded::new(I::Sradi, vec![Op::Gpr(f.ra), Op::Gpr(f.rt), Op::Uimm(sh as u64)]).record(rc)
        }
        598 => match f.rt & 3 {
            0 => Decoded::new(I::Sync, Vec::new()),
            1 => Decoded::new(I::Lwsync, Vec::new()),
            2 => Decoded::new(I::Ptesync, Vec::new()),
            _ => return Err(DecodeError::InvalidEncoding),
        },
        824 => Decoded::new(I::Srawi, vec![Op::Gpr(f.ra), Op::Gpr(f.rt), Op::Uimm(f.rb as u64)]).record(rc),
        854 => Decoded::new(I::Eieio, Vec::new()),
        922 => unary(I::Extsh),
        954 => unary(I::Extsb),
        986 => unary(I::Extsw),
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

/// `mfspr`/`mtspr` with the link, count and fixed-point exception register aliases.
fn move_spr(from: bool, f: &Fields) -> Decoded {
    let spr = f.ra | (f.rb << 5);
    let alias = match (spr, from) {
        (1, true) => Some(I::Mfxer),
        (8, true) => Some(I::Mflr),
        (9, true) => Some(I::Mfctr),
        (1, false) => Some(I::Mtxer),
        (8, false) => Some(I::Mtlr),
        (9, false) => Some(I::Mtctr),
        _ => None,
    };
    match (alias, from) {
        (Some(insn), _) => Decoded::new(insn, vec![Op::Gpr(f.rt)]),
        (None, true) => Decoded::new(I::Mfspr, vec![Op::Gpr(f.rt), Op::Uimm(spr as u64)]),
        (None, false) => Decoded::new(I::Mtspr, vec![Op::Uimm(spr as u64), Op::Gpr(f.rt)]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::Syntax;

    fn text(word: u32) -> String {
        let d = decode(word, &Fields::new(word), Mode::BIG_ENDIAN).unwrap();
        format!("{} {}", d.mnemonic(), super::super::render(&d, Syntax::Default))
            .trim_end()
            .to_string()
    }

    #[test]
    fn test_indexed_memory() {
        assert_eq!(text(0x7c64282e), "lwzx r3, r4, r5");
        assert_eq!(text(0x7c60282e), "lwzx r3, 0, r5");
        assert_eq!(text(0x7c64292e), "stwx r3, r4, r5");
        assert_eq!(text(0x7c0018ac), "dcbf 0, r3");
        assert_eq!(text(0x7c0004ac), "sync");
        assert_eq!(text(0x7c2004ac), "lwsync");
    }

    #[test]
    fn test_logical_and_compare() {
        assert_eq!(text(0x7c632038), "and r3, r3, r4");
        assert_eq!(text(0x7c6318f8), "not r3, r3");
        assert_eq!(text(0x7c032000), "cmpw r3, r4");
        assert_eq!(text(0x7f832040), "cmplw cr7, r3, r4");
        assert_eq!(text(0x7c630034), "cntlzw r3, r3");
        assert_eq!(text(0x7c6307b4), "extsw r3, r3");
        assert_eq!(text(0x7c631670), "srawi r3, r3, 2");
        assert_eq!(text(0x7c6311d6), "mullw r3, r3, r2");
    }
}
