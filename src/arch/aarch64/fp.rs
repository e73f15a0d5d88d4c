//! Scalar floating point and the Advanced SIMD subset.

use super::{
    bit, field, fpreg, gpr, vreg, Arm64Cc, Arm64Group as G, Arm64Insn as I, Decoded, FpSize, Op,
};
use crate::decoder::DecodeError;

pub(super) fn decode(word: u32) -> Result<Decoded, DecodeError> {
    let decoded = if bit(word, 28) && !bit(word, 30) {
        scalar_fp(word)?.group(G::FpArmv8)
    } else {
        simd(word)?.group(G::Neon)
    };
    Ok(decoded)
}

fn fp_size(ty: u32) -> Result<FpSize, DecodeError> {
    match ty {
        0 => Ok(FpSize::S),
        1 => Ok(FpSize::D),
        3 => Ok(FpSize::H),
        _ => Err(DecodeError::InvalidEncoding),
    }
}

/// `VFPExpandImm` for the 8-bit floating point immediate.
pub(super) fn expand_fp_imm(imm8: u32) -> f64 {
    let sign = if bit(imm8, 7) { -1.0 } else { 1.0 };
    let exp = field(imm8, 4, 2) as i32;
    let exp = if bit(imm8, 6) { exp - 3 } else { exp + 1 };
    let fraction = 1.0 + f64::from(imm8 & 0xf) / 16.0;
    sign * fraction * 2f64.powi(exp)
}

fn arrangement(size: u32, q: bool) -> Result<&'static str, DecodeError> {
    match (size, q) {
        (0, false) => Ok("8b"),
        (0, true) => Ok("16b"),
        (1, false) => Ok("4h"),
        (1, true) => Ok("8h"),
        (2, false) => Ok("2s"),
        (2, true) => Ok("4s"),
        (3, true) => Ok("2d"),
        _ => Err(DecodeError::InvalidEncoding),
    }
}

fn fp_arrangement(double: bool, q: bool) -> Result<&'static str, DecodeError> {
    arrangement(if double { 3 } else { 2 }, q)
}

// ---------------------------------------------------------------------------------------
// scalar floating point

fn scalar_fp(word: u32) -> Result<Decoded, DecodeError> {
    if bit(word, 29) {
        return Err(DecodeError::InvalidEncoding);
    }
    let sf = bit(word, 31);
    let ty = field(word, 22, 2);
    if !bit(word, 21) && !bit(word, 24) {
        return fixed_point(word, sf, ty);
    }
    if !bit(word, 24) && field(word, 10, 6) == 0 {
        return conversion(word, sf, ty);
    }
    if sf {
        return Err(DecodeError::InvalidEncoding);
    }
    let size = fp_size(ty)?;
    let r = |lo: u32| Op::Reg(fpreg(size, field(word, lo, 5)));
    if bit(word, 24) {
        let insn = match (bit(word, 21), bit(word, 15)) {
            (false, false) => I::Fmadd,
            (false, true) => I::Fmsub,
            (true, false) => I::Fnmadd,
            (true, true) => I::Fnmsub,
        };
        return Ok(Decoded::new(insn, vec![r(0), r(5), r(16), r(10)]));
    }
    let cond = Arm64Cc::from_bits(field(word, 12, 4));
    let decoded = match field(word, 10, 2) {
        0b01 => {
            let insn = if bit(word, 4) { I::Fccmpe } else { I::Fccmp };
            Decoded::new(
                insn,
                vec![
                    r(5),
                    r(16),
                    Op::Imm(field(word, 0, 4) as i64),
                    Op::Sym(cond.name().to_string()),
                ],
            )
            .cc(cond)
        }
        0b10 => {
            let insn = match field(word, 12, 4) {
                0b0000 => I::Fmul,
                0b0001 => I::Fdiv,
                0b0010 => I::Fadd,
                0b0011 => I::Fsub,
                0b0100 => I::Fmax,
                0b0101 => I::Fmin,
                0b0110 => I::Fmaxnm,
                0b0111 => I::Fminnm,
                0b1000 => I::Fnmul,
                _ => return Err(DecodeError::InvalidEncoding),
            };
            Decoded::new(insn, vec![r(0), r(5), r(16)])
        }
        0b11 => Decoded::new(
            I::Fcsel,
            vec![r(0), r(5), r(16), Op::Sym(cond.name().to_string())],
        )
        .cc(cond),
        _ if field(word, 10, 5) == 0b10000 => one_source(word, size)?,
        _ if field(word, 10, 4) == 0b1000 => {
            let insn = if bit(word, 4) { I::Fcmpe } else { I::Fcmp };
            let second = if bit(word, 3) {
                Op::Sym("#0.0".to_string())
            } else {
                r(16)
            };
            Decoded::new(insn, vec![r(5), second])
        }
        _ if field(word, 10, 3) == 0b100 && field(word, 5, 5) == 0 => Decoded::new(
            I::Fmov,
            vec![r(0), Op::FpImm(expand_fp_imm(field(word, 13, 8)))],
        ),
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

fn one_source(word: u32, size: FpSize) -> Result<Decoded, DecodeError> {
    let (rd, rn) = (field(word, 0, 5), field(word, 5, 5));
    let convert = |to: FpSize| {
        if to == size {
            Err(DecodeError::InvalidEncoding)
        } else {
            Ok(Decoded::new(
                I::Fcvt,
                vec![Op::Reg(fpreg(to, rd)), Op::Reg(fpreg(size, rn))],
            ))
        }
    };
    let insn = match field(word, 15, 6) {
        0b000000 => I::Fmov,
        0b000001 => I::Fabs,
        0b000010 => I::Fneg,
        0b000011 => I::Fsqrt,
        0b000100 => return convert(FpSize::S),
        0b000101 => return convert(FpSize::D),
        0b000111 => return convert(FpSize::H),
        0b001000 => I::Frintn,
        0b001001 => I::Frintp,
        0b001010 => I::Frintm,
        0b001011 => I::Frintz,
        0b001100 => I::Frinta,
        0b001110 => I::Frintx,
        0b001111 => I::Frinti,
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(Decoded::new(
        insn,
        vec![Op::Reg(fpreg(size, rd)), Op::Reg(fpreg(size, rn))],
    ))
}

fn fixed_point(word: u32, sf: bool, ty: u32) -> Result<Decoded, DecodeError> {
    let size = fp_size(ty)?;
    let scale = field(word, 10, 6);
    if !sf && scale < 32 {
        return Err(DecodeError::InvalidEncoding);
    }
    let fbits = Op::Imm(64 - scale as i64);
    let (rd, rn) = (field(word, 0, 5), field(word, 5, 5));
    let fp = |n| Op::Reg(fpreg(size, n));
    let int = |n| Op::Reg(gpr(sf, n, false));
    let decoded = match (field(word, 19, 2), field(word, 16, 3)) {
        (0b00, 0b010) => Decoded::new(I::Scvtf, vec![fp(rd), int(rn), fbits]),
        (0b00, 0b011) => Decoded::new(I::Ucvtf, vec![fp(rd), int(rn), fbits]),
        (0b11, 0b000) => Decoded::new(I::Fcvtzs, vec![int(rd), fp(rn), fbits]),
        (0b11, 0b001) => Decoded::new(I::Fcvtzu, vec![int(rd), fp(rn), fbits]),
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

fn conversion(word: u32, sf: bool, ty: u32) -> Result<Decoded, DecodeError> {
    let rmode = field(word, 19, 2);
    let opcode = field(word, 16, 3);
    let (rd, rn) = (field(word, 0, 5), field(word, 5, 5));
    if ty == 2 {
        // top half of a 128-bit register
        return match (sf, rmode, opcode) {
            (true, 0b01, 0b110) => Ok(Decoded::new(
                I::Fmov,
                vec![Op::Reg(gpr(true, rd, false)), Op::Element(vreg(rn), "d", 1)],
            )),
            (true, 0b01, 0b111) => Ok(Decoded::new(
                I::Fmov,
                vec![Op::Element(vreg(rd), "d", 1), Op::Reg(gpr(true, rn, false))],
            )),
            _ => Err(DecodeError::InvalidEncoding),
        };
    }
    let size = fp_size(ty)?;
    let to_int = |insn| {
        Decoded::new(
            insn,
            vec![Op::Reg(gpr(sf, rd, false)), Op::Reg(fpreg(size, rn))],
        )
    };
    let from_int = |insn| {
        Decoded::new(
            insn,
            vec![Op::Reg(fpreg(size, rd)), Op::Reg(gpr(sf, rn, false))],
        )
    };
    let same_width = ty == 3 || sf == (ty == 1);
    let decoded = match (rmode, opcode) {
        (0b00, 0b000) => to_int(I::Fcvtns),
        (0b00, 0b001) => to_int(I::Fcvtnu),
        (0b00, 0b010) => from_int(I::Scvtf),
        (0b00, 0b011) => from_int(I::Ucvtf),
        (0b00, 0b100) => to_int(I::Fcvtas),
        (0b00, 0b101) => to_int(I::Fcvtau),
        (0b00, 0b110) if same_width => to_int(I::Fmov),
        (0b00, 0b111) if same_width => from_int(I::Fmov),
        (0b01, 0b000) => to_int(I::Fcvtps),
        (0b01, 0b001) => to_int(I::Fcvtpu),
        (0b10, 0b000) => to_int(I::Fcvtms),
        (0b10, 0b001) => to_int(I::Fcvtmu),
        (0b11, 0b000) => to_int(I::Fcvtzs),
        (0b11, 0b001) => to_int(I::Fcvtzu),
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

// ---------------------------------------------------------------------------------------
// Advanced SIMD

fn simd(word: u32) -> Result<Decoded, DecodeError> {
    if bit(word, 31) {
        return Err(DecodeError::InvalidEncoding);
    }
    if bit(word, 28) {
        return simd_scalar(word);
    }
    if word & 0xbfe0_8c00 == 0x0e00_0000 {
        return table_lookup(word);
    }
    if word & 0x9fe0_8400 == 0x0e00_0400 {
        return copy(word);
    }
    if word & 0x9f20_0400 == 0x0e20_0400 {
        return three_same(word);
    }
    if word & 0x9f3e_0c00 == 0x0e20_0800 {
        return two_register_misc(word);
    }
    if word & 0x9f3e_0c00 == 0x0e30_0800 {
        return across_lanes(word);
    }
    if word & 0x9f80_0400 == 0x0f00_0400 {
        if field(word, 19, 4) == 0 {
            return modified_immediate(word);
        }
        return shift_immediate(word, false);
    }
    if word & 0x9f00_0400 == 0x0f00_0000 {
        return by_element(word, false);
    }
    Err(DecodeError::InvalidEncoding)
}

fn simd_scalar(word: u32) -> Result<Decoded, DecodeError> {
    if word & 0xdf00_0400 == 0x5f00_0000 {
        return by_element(word, true);
    }
    if word & 0xdf80_0400 == 0x5f00_0400 && field(word, 19, 4) != 0 {
        return shift_immediate(word, true);
    }
    let (rd, rn) = (field(word, 0, 5), field(word, 5, 5));
    if word & 0xdfe0_fc00 == 0x5e00_0400 {
        let (elem, shift, size) = element_size(field(word, 16, 5))?;
        let index = (field(word, 16, 5) >> shift) as u8;
        return Ok(Decoded::new(
            I::Mov,
            vec![Op::Reg(fpreg(size, rd)), Op::Element(vreg(rn), elem, index)],
        ));
    }
    let (u, size) = (bit(word, 29), field(word, 22, 2));
    if word & 0xdf20_0400 == 0x5e20_0400 && size == 3 {
        let insn = match (u, field(word, 11, 5)) {
            (false, 0b10000) => I::Add,
            (true, 0b10000) => I::Sub,
            _ => return Err(DecodeError::InvalidEncoding),
        };
        let d = |n| Op::Reg(fpreg(FpSize::D, n));
        return Ok(Decoded::new(insn, vec![d(rd), d(rn), d(field(word, 16, 5))]));
    }
    if word & 0xdf3e_0c00 == 0x5e30_0800 {
        let decoded = match (u, field(word, 12, 5), size) {
            (false, 0b11011, 3) => Decoded::new(
                I::Addp,
                vec![Op::Reg(fpreg(FpSize::D, rd)), Op::Vector(vreg(rn), "2d")],
            ),
            (true, 0b01101, 0) => Decoded::new(
                I::Faddp,
                vec![Op::Reg(fpreg(FpSize::S, rd)), Op::Vector(vreg(rn), "2s")],
            ),
            (true, 0b01101, 1) => Decoded::new(
                I::Faddp,
                vec![Op::Reg(fpreg(FpSize::D, rd)), Op::Vector(vreg(rn), "2d")],
            ),
            _ => return Err(DecodeError::InvalidEncoding),
        };
        return Ok(decoded);
    }
    Err(DecodeError::InvalidEncoding)
}

fn table_lookup(word: u32) -> Result<Decoded, DecodeError> {
    let (rd, rn, rm) = (field(word, 0, 5), field(word, 5, 5), field(word, 16, 5));
    let arr = if bit(word, 30) { "16b" } else { "8b" };
    let count = field(word, 13, 2) + 1;
    let table = (0..count).map(|i| vreg((rn + i) % 32)).collect();
    let insn = if bit(word, 12) { I::Tbx } else { I::Tbl };
    Ok(Decoded::new(
        insn,
        vec![
            Op::Vector(vreg(rd), arr),
            Op::List(table, "16b"),
            Op::Vector(vreg(rm), arr),
        ],
    ))
}

/// Element suffix, index shift and scalar view selected by the lowest set bit of `imm5`.
fn element_size(imm5: u32) -> Result<(&'static str, u32, FpSize), DecodeError> {
    if bit(imm5, 0) {
        Ok(("b", 1, FpSize::B))
    } else if bit(imm5, 1) {
        Ok(("h", 2, FpSize::H))
    } else if bit(imm5, 2) {
        Ok(("s", 3, FpSize::S))
    } else if bit(imm5, 3) {
        Ok(("d", 4, FpSize::D))
    } else {
        Err(DecodeError::InvalidEncoding)
    }
}

fn copy(word: u32) -> Result<Decoded, DecodeError> {
    let (q, op) = (bit(word, 30), bit(word, 29));
    let imm5 = field(word, 16, 5);
    let imm4 = field(word, 11, 4);
    let (rd, rn) = (field(word, 0, 5), field(word, 5, 5));
    let (elem, shift, _) = element_size(imm5)?;
    let index = (imm5 >> shift) as u8;
    let doubleword = shift == 4;
    let decoded = match (op, imm4) {
        (true, _) if q => {
            let from = (imm4 >> (shift - 1)) as u8;
            Decoded::new(
                I::Mov,
                vec![
                    Op::Element(vreg(rd), elem, index),
                    Op::Element(vreg(rn), elem, from),
                ],
            )
        }
        (false, 0b0000) => Decoded::new(
            I::Dup,
            vec![
                Op::Vector(vreg(rd), arrangement(shift - 1, q)?),
                Op::Element(vreg(rn), elem, index),
            ],
        ),
        (false, 0b0001) => Decoded::new(
            I::Dup,
            vec![
                Op::Vector(vreg(rd), arrangement(shift - 1, q)?),
                Op::Reg(gpr(doubleword, rn, false)),
            ],
        ),
        (false, 0b0011) if q => Decoded::new(
            I::Mov,
            vec![
                Op::Element(vreg(rd), elem, index),
                Op::Reg(gpr(doubleword, rn, false)),
            ],
        ),
        (false, 0b0101) if shift < 3 || (shift == 3 && q) => Decoded::new(
            I::Smov,
            vec![Op::Reg(gpr(q, rd, false)), Op::Element(vreg(rn), elem, index)],
        ),
        (false, 0b0111) => {
            let insn = match (shift, q) {
                (3, false) | (4, true) => I::Mov,
                (1 | 2, false) => I::Umov,
                _ => return Err(DecodeError::InvalidEncoding),
            };
            Decoded::new(
                insn,
                vec![Op::Reg(gpr(q, rd, false)), Op::Element(vreg(rn), elem, index)],
            )
        }
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

fn three_same(word: u32) -> Result<Decoded, DecodeError> {
    let (q, u) = (bit(word, 30), bit(word, 29));
    let size = field(word, 22, 2);
    let (rd, rn, rm) = (field(word, 0, 5), field(word, 5, 5), field(word, 16, 5));
    let vec3 = |insn, arr| {
        Decoded::new(
            insn,
            vec![
                Op::Vector(vreg(rd), arr),
                Op::Vector(vreg(rn), arr),
                Op::Vector(vreg(rm), arr),
            ],
        )
    };
    let opcode = field(word, 11, 5);
    let decoded = match opcode {
        0b00011 => {
            let arr = if q { "16b" } else { "8b" };
            let insn = match (u, size) {
                (false, 0) => I::And,
                (false, 1) => I::Bic,
                (false, 2) if rn == rm => {
                    return Ok(Decoded::new(
                        I::Mov,
                        vec![Op::Vector(vreg(rd), arr), Op::Vector(vreg(rn), arr)],
                    ))
                }
                (false, 2) => I::Orr,
                (false, _) => I::Orn,
                (true, 0) => I::Eor,
                (true, 1) => I::Bsl,
                (true, 2) => I::Bit,
                (true, _) => I::Bif,
            };
            vec3(insn, arr)
        }
        0b10000 => vec3(if u { I::Sub } else { I::Add }, arrangement(size, q)?),
        0b10001 => vec3(if u { I::Cmeq } else { I::Cmtst }, arrangement(size, q)?),
        0b00110 => vec3(if u { I::Cmhi } else { I::Cmgt }, arrangement(size, q)?),
        0b00111 => vec3(if u { I::Cmhs } else { I::Cmge }, arrangement(size, q)?),
        0b10011 if !u && size != 3 => vec3(I::Mul, arrangement(size, q)?),
        _ => {
            let arr = fp_arrangement(bit(word, 22), q)?;
            let insn = match (opcode, u, bit(word, 23)) {
                (0b11010, false, false) => I::Fadd,
                (0b11010, false, true) => I::Fsub,
                (0b11011, true, false) => I::Fmul,
                (0b11111, true, false) => I::Fdiv,
                (0b11001, false, false) => I::Fmla,
                (0b11001, false, true) => I::Fmls,
                (0b11100, false, false) => I::Fcmeq,
                _ => return Err(DecodeError::InvalidEncoding),
            };
            vec3(insn, arr)
        }
    };
    Ok(decoded)
}

fn two_register_misc(word: u32) -> Result<Decoded, DecodeError> {
    let (q, u) = (bit(word, 30), bit(word, 29));
    let size = field(word, 22, 2);
    let (rd, rn) = (field(word, 0, 5), field(word, 5, 5));
    let vec2 = |insn, arr| {
        Decoded::new(
            insn,
            vec![Op::Vector(vreg(rd), arr), Op::Vector(vreg(rn), arr)],
        )
    };
    let high = bit(word, 23);
    let fp_arr = || fp_arrangement(bit(word, 22), q);
    let decoded = match (u, field(word, 12, 5)) {
        (false, 0b00000) if size != 3 => vec2(I::Rev64, arrangement(size, q)?),
        (false, 0b00101) if size == 0 => vec2(I::Cnt, arrangement(0, q)?),
        (true, 0b00101) if size == 0 => vec2(I::Mvn, arrangement(0, q)?),
        (false, 0b01011) => vec2(I::Abs, arrangement(size, q)?),
        (true, 0b01011) => vec2(I::Neg, arrangement(size, q)?),
        (false, 0b01001) => {
            let arr = arrangement(size, q)?;
            Decoded::new(
                I::Cmeq,
                vec![Op::Vector(vreg(rd), arr), Op::Vector(vreg(rn), arr), Op::Imm(0)],
            )
        }
        (false, 0b11101) if !high => vec2(I::Scvtf, fp_arr()?),
        (true, 0b11101) if !high => vec2(I::Ucvtf, fp_arr()?),
        (false, 0b11011) if high => vec2(I::Fcvtzs, fp_arr()?),
        (true, 0b11011) if high => vec2(I::Fcvtzu, fp_arr()?),
        (false, 0b01111) if high => vec2(I::Fabs, fp_arr()?),
        (true, 0b01111) if high => vec2(I::Fneg, fp_arr()?),
        (true, 0b11111) if high => vec2(I::Fsqrt, fp_arr()?),
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

fn across_lanes(word: u32) -> Result<Decoded, DecodeError> {
    let (q, u) = (bit(word, 30), bit(word, 29));
    let size = field(word, 22, 2);
    let insn = match (u, field(word, 12, 5)) {
        (false, 0b11011) => I::Addv,
        (false, 0b01010) => I::Smaxv,
        (true, 0b01010) => I::Umaxv,
        (false, 0b11010) => I::Sminv,
        (true, 0b11010) => I::Uminv,
        _ => return Err(DecodeError::InvalidEncoding),
    };
    let scalar = match size {
        0 => FpSize::B,
        1 => FpSize::H,
        2 if q => FpSize::S,
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(Decoded::new(
        insn,
        vec![
            Op::Reg(fpreg(scalar, field(word, 0, 5))),
            Op::Vector(vreg(field(word, 5, 5)), arrangement(size, q)?),
        ],
    ))
}

fn modified_immediate(word: u32) -> Result<Decoded, DecodeError> {
    let (q, op) = (bit(word, 30), bit(word, 29));
    let cmode = field(word, 12, 4);
    let imm8 = field(word, 16, 3) << 5 | field(word, 5, 5);
    let rd = field(word, 0, 5);
    let vd = |arr| Op::Vector(vreg(rd), arr);
    let shifted = |insn, arr, shift| {
        Decoded::new(insn, vec![vd(arr), Op::ImmShift(imm8 as u64, shift)])
    };
    let decoded = match (op, cmode) {
        (false, 0b1110) => shifted(I::Movi, if q { "16b" } else { "8b" }, 0),
        (_, c) if c & 0b1001 == 0 => shifted(
            if op { I::Mvni } else { I::Movi },
            if q { "4s" } else { "2s" },
            (c >> 1) * 8,
        ),
        (_, c) if c & 0b1101 == 0b1000 => shifted(
            if op { I::Mvni } else { I::Movi },
            if q { "8h" } else { "4h" },
            ((c >> 1) & 1) * 8,
        ),
        (true, 0b1110) => {
            let value = (0..8).fold(0u64, |acc, i| {
                if bit(imm8, i) {
                    acc | 0xff << (i * 8)
                } else {
                    acc
                }
            });
            let dst = if q {
                vd("2d")
            } else {
                Op::Reg(fpreg(FpSize::D, rd))
            };
            Decoded::new(I::Movi, vec![dst, Op::ImmShift(value, 0)])
        }
        (false, 0b1111) => Decoded::new(
            I::Fmov,
            vec![vd(if q { "4s" } else { "2s" }), Op::FpImm(expand_fp_imm(imm8))],
        ),
        (true, 0b1111) if q => {
            Decoded::new(I::Fmov, vec![vd("2d"), Op::FpImm(expand_fp_imm(imm8))])
        }
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

fn shift_immediate(word: u32, scalar: bool) -> Result<Decoded, DecodeError> {
    let (q, u) = (bit(word, 30), bit(word, 29));
    let immh = field(word, 19, 4);
    let immhb = field(word, 16, 7);
    let size = 31 - immh.leading_zeros();
    let esize = 8u32 << size;
    let right = Op::Imm((2 * esize - immhb) as i64);
    let left = Op::Imm((immhb - esize) as i64);
    let (rd, rn) = (field(word, 0, 5), field(word, 5, 5));
    let (dst, src) = if scalar {
        let view = match size {
            2 => FpSize::S,
            3 => FpSize::D,
            _ => return Err(DecodeError::InvalidEncoding),
        };
        (Op::Reg(fpreg(view, rd)), Op::Reg(fpreg(view, rn)))
    } else {
        let arr = arrangement(size, q)?;
        (Op::Vector(vreg(rd), arr), Op::Vector(vreg(rn), arr))
    };
    let integer_ok = !scalar || size == 3;
    let (insn, amount) = match (u, field(word, 11, 5)) {
        (false, 0b00000) if integer_ok => (I::Sshr, right),
        (true, 0b00000) if integer_ok => (I::Ushr, right),
        (false, 0b01010) if integer_ok => (I::Shl, left),
        (false, 0b11100) if size >= 2 => (I::Scvtf, right),
        (true, 0b11100) if size >= 2 => (I::Ucvtf, right),
        (false, 0b11111) if size >= 2 => (I::Fcvtzs, right),
        (true, 0b11111) if size >= 2 => (I::Fcvtzu, right),
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(Decoded::new(insn, vec![dst, src, amount]))
}

fn by_element(word: u32, scalar: bool) -> Result<Decoded, DecodeError> {
    let (q, u) = (bit(word, 30), bit(word, 29));
    let size = field(word, 22, 2);
    let (l, m, h) = (field(word, 21, 1), field(word, 20, 1), field(word, 11, 1));
    let rm4 = field(word, 16, 4);
    let (rd, rn) = (field(word, 0, 5), field(word, 5, 5));
    let opcode = field(word, 12, 4);

    if bit(word, 23) {
        let double = bit(word, 22);
        let insn = match (u, opcode) {
            (false, 0b0001) => I::Fmla,
            (false, 0b0101) => I::Fmls,
            (false, 0b1001) => I::Fmul,
            _ => return Err(DecodeError::InvalidEncoding),
        };
        let (elem, index) = if double {
            if l == 1 {
                return Err(DecodeError::InvalidEncoding);
            }
            ("d", h)
        } else {
            ("s", h << 1 | l)
        };
        let element = Op::Element(vreg(m << 4 | rm4), elem, index as u8);
        let ops = if scalar {
            let view = if double { FpSize::D } else { FpSize::S };
            vec![Op::Reg(fpreg(view, rd)), Op::Reg(fpreg(view, rn)), element]
        } else {
            let arr = fp_arrangement(double, q)?;
            vec![Op::Vector(vreg(rd), arr), Op::Vector(vreg(rn), arr), element]
        };
        return Ok(Decoded::new(insn, ops));
    }

    if scalar {
        return Err(DecodeError::InvalidEncoding);
    }
    let insn = match (u, opcode) {
        (false, 0b1000) => I::Mul,
        (true, 0b0000) => I::Mla,
        (true, 0b0100) => I::Mls,
        _ => return Err(DecodeError::InvalidEncoding),
    };
    let (elem, index, rm) = match size {
        1 => ("h", h << 2 | l << 1 | m, rm4),
        2 => ("s", h << 1 | l, m << 4 | rm4),
        _ => return Err(DecodeError::InvalidEncoding),
    };
    let arr = arrangement(size, q)?;
    Ok(Decoded::new(
        insn,
        vec![
            Op::Vector(vreg(rd), arr),
            Op::Vector(vreg(rn), arr),
            Op::Element(vreg(rm), elem, index as u8),
        ],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn text(word: u32) -> String {
        let d = decode(word).unwrap();
        let (m, o) = super::super::render(&d);
        format!("{} {}", m, o).trim_end().to_string()
    }

    #[rstest]
    #[case(0x1e622820, "fadd d0, d1, d2")]
    #[case(0x1e6e1000, "fmov d0, #1.00000000")]
    #[case(0x1e202008, "fcmp s0, #0.0")]
    #[case(0x9e620020, "scvtf d0, x1")]
    #[case(0x1e260020, "fmov w0, s1")]
    #[case(0x9eae00a2, "fmov x2, v5.d[1]")]
    fn test_scalar_fp(#[case] word: u32, #[case] expected: &str) {
        assert_eq!(text(word), expected);
        assert_eq!(decode(word).unwrap().group, Some(G::FpArmv8));
    }

    #[rstest]
    #[case(0x4ea11c20, "mov v0.16b, v1.16b")]
    #[case(0x4e208420, "add v0.16b, v1.16b, v0.16b")]
    #[case(0x4e040c20, "dup v0.4s, w1")]
    #[case(0x0e043c20, "mov w0, v1.s[0]")]
    #[case(0x6f00e400, "movi v0.2d, #0")]
    #[case(0x0e31b820, "addv b0, v1.8b")]
    #[case(0x0e025020, "tbx v0.8b, {v1.16b, v2.16b, v3.16b}, v2.8b")]
    #[case(0x0f3de420, "scvtf v0.2s, v1.2s, #3")]
    #[case(0x5fa01800, "fmla s0, s0, v0.s[3]")]
    fn test_advanced_simd(#[case] word: u32, #[case] expected: &str) {
        assert_eq!(text(word), expected);
        assert_eq!(decode(word).unwrap().group, Some(G::Neon));
    }

    #[test]
    fn test_expand_fp_imm() {
        assert_eq!(expand_fp_imm(0x70), 1.0);
        assert_eq!(expand_fp_imm(0x00), 2.0);
        assert_eq!(expand_fp_imm(0x40), 0.125);
        assert_eq!(expand_fp_imm(0xf0), -1.0);
        assert_eq!(expand_fp_imm(0x3f), 31.0);
    }
}
