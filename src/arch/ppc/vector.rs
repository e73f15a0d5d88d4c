//! Primary opcode 4: Altivec, or QPX when the session enables it.

use super::decode::Fields;
use super::{Decoded, Op, PpcGroup, PpcInsn as I};
use crate::arch::sign_extend;
use crate::decoder::DecodeError;

/// `vD, vA, vB` operations keyed by the 11-bit VX extended opcode.
const VX_THREE: &[(u32, I)] = &[
    (0, I::Vaddubm),
    (10, I::Vaddfp),
    (12, I::Vmrghb),
    (14, I::Vpkuhum),
    (64, I::Vadduhm),
    (74, I::Vsubfp),
    (76, I::Vmrghh),
    (78, I::Vpkuwum),
    (128, I::Vadduwm),
    (130, I::Vmaxuw),
    (140, I::Vmrghw),
    (260, I::Vslb),
    (268, I::Vmrglb),
    (324, I::Vslh),
    (332, I::Vmrglh),
    (386, I::Vmaxsw),
    (388, I::Vslw),
    (396, I::Vmrglw),
    (516, I::Vsrb),
    (580, I::Vsrh),
    (642, I::Vminuw),
    (644, I::Vsrw),
    (772, I::Vsrab),
    (782, I::Vpkpx),
    (836, I::Vsrah),
    (898, I::Vminsw),
    (900, I::Vsraw),
    (1024, I::Vsububm),
    (1026, I::Vavgub),
    (1028, I::Vand),
    (1034, I::Vmaxfp),
    (1088, I::Vsubuhm),
    (1092, I::Vandc),
    (1098, I::Vminfp),
    (1152, I::Vsubuwm),
    (1156, I::Vor),
    (1220, I::Vxor),
    (1284, I::Vnor),
];

/// Compares keyed by the 10-bit VC extended opcode; bit 10 is the record bit.
const VC: &[(u32, I)] = &[
    (6, I::Vcmpequb),
    (70, I::Vcmpequh),
    (134, I::Vcmpequw),
    (198, I::Vcmpeqfp),
    (518, I::Vcmpgtub),
    (902, I::Vcmpgtsw),
];

pub(super) fn altivec(word: u32) -> Result<Decoded, DecodeError> {
    let f = Fields::new(word);
    let (d, a, b, c) = (Op::Vr(f.rt), Op::Vr(f.ra), Op::Vr(f.rb), Op::Vr(f.rc));
    let decoded = match word & 0x3f {
        42 => Decoded::new(I::Vsel, vec![d, a, b, c]),
        43 => Decoded::new(I::Vperm, vec![d, a, b, c]),
        44 => Decoded::new(I::Vsldoi, vec![d, a, b, Op::Uimm(((word >> 6) & 15) as u64)]),
        46 => Decoded::new(I::Vmaddfp, vec![d, a, c, b]),
        47 => Decoded::new(I::Vnmsubfp, vec![d, a, c, b]),
        _ => {
            let xo = word & 0x7ff;
            if let Some((_, insn)) = VX_THREE.iter().find(|(key, _)| *key == xo) {
                match insn {
                    I::Vor if f.ra == f.rb => Decoded::new(I::Vmr, vec![d, a]),
                    I::Vnor if f.ra == f.rb => Decoded::new(I::Vnot, vec![d, a]),
                    _ => Decoded::new(*insn, vec![d, a, b]),
                }
            } else if let Some((_, insn)) = VC.iter().find(|(key, _)| *key == word & 0x3ff) {
                Decoded::new(*insn, vec![d, a, b]).record(word & 0x400 != 0)
            } else {
                match xo {
                    524 => Decoded::new(I::Vspltb, vec![d, b, Op::Uimm(f.ra as u64)]),
                    588 => Decoded::new(I::Vsplth, vec![d, b, Op::Uimm(f.ra as u64)]),
                    652 => Decoded::new(I::Vspltw, vec![d, b, Op::Uimm(f.ra as u64)]),
                    780 | 844 | 908 => {
                        let insn = match xo {
                            780 => I::Vspltisb,
                            844 => I::Vspltish,
                            _ => I::Vspltisw,
                        };
                        Decoded::new(insn, vec![d, Op::Imm(sign_extend(f.ra as u64, 5))])
                    }
                    1540 => Decoded::new(I::Mfvscr, vec![d]),
                    1604 => Decoded::new(I::Mtvscr, vec![b]),
                    _ => return Err(DecodeError::InvalidEncoding),
                }
            }
        }
    };
    Ok(decoded.ext(PpcGroup::Altivec))
}

pub(super) fn qpx(word: u32) -> Result<Decoded, DecodeError> {
    let f = Fields::new(word);
    let (t, a, b, c) = (Op::Qr(f.rt), Op::Qr(f.ra), Op::Qr(f.rb), Op::Qr(f.rc));
    let rc = word & 1 != 0;

    if (word >> 1) & 0x3f == 4 {
        let truth = (word >> 7) & 15;
        let decoded = match truth {
            0 => Decoded::new(I::Qvfclr, vec![t]),
            15 => Decoded::new(I::Qvfset, vec![t]),
            12 => Decoded::new(I::Qvfnot, vec![t, a]),
            _ => {
                let insn = match truth {
                    1 => Some(I::Qvfand),
                    2 => Some(I::Qvfandc),
                    6 => Some(I::Qvfxor),
                    7 => Some(I::Qvfor),
                    8 => Some(I::Qvfnor),
                    9 => Some(I::Qvfequ),
                    11 => Some(I::Qvforc),
                    14 => Some(I::Qvfnand),
                    _ => None,
                };
                match insn {
                    Some(insn) => Decoded::new(insn, vec![t, a, b]),
                    None => Decoded::new(I::Qvflogical, vec![t, a, b, Op::Uimm(truth as u64)]),
                }
            }
        };
        return Ok(decoded.ext(PpcGroup::Qpx));
    }

    let decoded = match (word >> 1) & 31 {
        20 => Decoded::new(I::Qvfsub, vec![t, a, b]),
        21 => Decoded::new(I::Qvfadd, vec![t, a, b]),
        23 => Decoded::new(I::Qvfsel, vec![t, a, c, b]),
        25 => Decoded::new(I::Qvfmul, vec![t, a, c]),
        28 => Decoded::new(I::Qvfmsub, vec![t, a, c, b]),
        29 => Decoded::new(I::Qvfmadd, vec![t, a, c, b]),
        30 => Decoded::new(I::Qvfnmsub, vec![t, a, c, b]),
        31 => Decoded::new(I::Qvfnmadd, vec![t, a, c, b]),
        _ => match (word >> 1) & 0x3ff {
            12 => Decoded::new(I::Qvfrsp, vec![t, b]),
            14 => Decoded::new(I::Qvfctiw, vec![t, b]),
            40 => Decoded::new(I::Qvfneg, vec![t, b]),
            72 => Decoded::new(I::Qvfmr, vec![t, b]),
            136 => Decoded::new(I::Qvfnabs, vec![t, b]),
            264 => Decoded::new(I::Qvfabs, vec![t, b]),
            846 => Decoded::new(I::Qvfcfid, vec![t, b]),
            _ => return Err(DecodeError::InvalidEncoding),
        },
    };
    Ok(decoded.record(rc).ext(PpcGroup::Qpx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::Syntax;

    fn text(d: Decoded) -> String {
        format!("{} {}", d.mnemonic(), super::super::render(&d, Syntax::Default))
            .trim_end()
            .to_string()
    }

    #[test]
    fn test_altivec() {
        assert_eq!(text(altivec(0x10430c84).unwrap()), "vor v2, v3, v1");
        assert_eq!(text(altivec(0x10431c84).unwrap()), "vmr v2, v3");
        assert_eq!(text(altivec(0x107f030c).unwrap()), "vspltisb v3, -1");
        assert_eq!(text(altivec(0x1043228c).unwrap()), "vspltw v2, v4, 3");
        assert_eq!(text(altivec(0x104320c6).unwrap()), "vcmpeqfp v2, v3, v4");
        assert_eq!(text(altivec(0x104324c6).unwrap()), "vcmpeqfp. v2, v3, v4");
        assert_eq!(text(altivec(0x1043212b).unwrap()), "vperm v2, v3, v4, v4");
    }

    #[test]
    fn test_qpx() {
        assert_eq!(text(qpx(0x10602a10).unwrap()), "qvfabs q3, q5");
        assert_eq!(text(qpx(0x10642888).unwrap()), "qvfand q3, q4, q5");
        assert_eq!(text(qpx(0x1064282a).unwrap()), "qvfadd q3, q4, q5");
    }
}
