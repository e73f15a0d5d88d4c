//! VFP (coprocessors 10 and 11) and Advanced SIMD data-processing and structure load/store
//! encodings, in A32 form.

use super::{
    bit, core_reg, dreg, field, qreg, sreg, ArmGroup as G, ArmInsn as I, ArmReg, Decoded,
    Indexing, Lane, Mem, Offset, Op,
};
use crate::arch::Mode;
use crate::decoder::DecodeError;

/// A VFP register from a 4-bit field and its extra bit.
fn vfp_reg(num: u32, extra: u32, double: bool) -> ArmReg {
    if double {
        dreg(extra << 4 | num)
    } else {
        sreg(num << 1 | extra)
    }
}

fn vd(word: u32, double: bool) -> ArmReg {
    vfp_reg(field(word, 12, 4), field(word, 22, 1), double)
}

fn vn(word: u32, double: bool) -> ArmReg {
    vfp_reg(field(word, 16, 4), field(word, 7, 1), double)
}

fn vm(word: u32, double: bool) -> ArmReg {
    vfp_reg(field(word, 0, 4), field(word, 5, 1), double)
}

fn precision(double: bool) -> &'static str {
    if double {
        ".f64"
    } else {
        ".f32"
    }
}

pub(super) fn vfp(word: u32, mode: Mode) -> Result<Decoded, DecodeError> {
    let double = bit(word, 8);
    let decoded = match field(word, 25, 3) {
        0b110 => load_store(word, double)?,
        0b111 if !bit(word, 4) => data_processing(word, double, mode)?,
        0b111 => transfer(word, double)?,
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded.feature(G::Vfp2))
}

fn data_processing(word: u32, double: bool, mode: Mode) -> Result<Decoded, DecodeError> {
    let op6 = bit(word, 6);
    let three = |insn: I| {
        Decoded::new(
            insn,
            vec![
                Op::Reg(vd(word, double)),
                Op::Reg(vn(word, double)),
                Op::Reg(vm(word, double)),
            ],
        )
        .suffix(precision(double))
    };
    let decoded = match field(word, 20, 4) & 0b1011 {
        0b0000 => three(if op6 { I::Vmls } else { I::Vmla }),
        0b0001 => three(if op6 { I::Vnmla } else { I::Vnmls }),
        0b0010 => three(if op6 { I::Vnmul } else { I::Vmul }),
        0b0011 => three(if op6 { I::Vsub } else { I::Vadd }),
        0b1000 if !op6 => three(I::Vdiv),
        0b1011 => other(word, double, mode)?,
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

/// `vmov` immediate, unary operations, compares and conversions (opc1 = 1x11).
fn other(word: u32, double: bool, mode: Mode) -> Result<Decoded, DecodeError> {
    let opc3 = field(word, 6, 2);
    let two = |insn: I| {
        Decoded::new(
            insn,
            vec![Op::Reg(vd(word, double)), Op::Reg(vm(word, double))],
        )
        .suffix(precision(double))
    };
    if opc3 & 1 == 0 {
        let imm8 = field(word, 16, 4) << 4 | field(word, 0, 4);
        let value = expand_imm(imm8);
        return Ok(Decoded::new(
            I::Vmov,
            vec![Op::Reg(vd(word, double)), Op::Sym(format!("#{}", c_exponent(value)))],
        )
        .suffix(precision(double))
        .feature(G::V7));
    }
    let top = bit(word, 7);
    let decoded = match field(word, 16, 4) {
        0b0000 => two(if top { I::Vabs } else { I::Vmov }),
        0b0001 => two(if top { I::Vsqrt } else { I::Vneg }),
        0b0010 | 0b0011 => {
            let insn = if top { I::Vcvtt } else { I::Vcvtb };
            if double && !mode.contains(Mode::V8) {
                return Err(DecodeError::InvalidEncoding);
            }
            let wide = if double { "f64" } else { "f32" };
            let d = if bit(word, 16) {
                Decoded::new(
                    insn,
                    vec![Op::Reg(vd(word, false)), Op::Reg(vm(word, double))],
                )
                .suffix(&format!(".f16.{}", wide))
            } else {
                Decoded::new(
                    insn,
                    vec![Op::Reg(vd(word, double)), Op::Reg(vm(word, false))],
                )
                .suffix(&format!(".{}.f16", wide))
            };
            if double {
                d.feature(G::Fparmv8).feature(G::V8)
            } else {
                d
            }
        }
        0b0100 => two(if top { I::Vcmpe } else { I::Vcmp }),
        0b0101 => Decoded::new(
            if top { I::Vcmpe } else { I::Vcmp },
            vec![Op::Reg(vd(word, double)), Op::Sym("#0".to_string())],
        )
        .suffix(precision(double)),
        0b0111 if opc3 == 0b11 => {
            let (dst, suffix) = if double {
                (vd(word, false), ".f32.f64")
            } else {
                (vd(word, true), ".f64.f32")
            };
            Decoded::new(I::Vcvt, vec![Op::Reg(dst), Op::Reg(vm(word, double))]).suffix(suffix)
        }
        0b1000 => {
            let from = if top { "s32" } else { "u32" };
            let to = if double { "f64" } else { "f32" };
            Decoded::new(
                I::Vcvt,
                vec![Op::Reg(vd(word, double)), Op::Reg(vm(word, false))],
            )
            .suffix(&format!(".{}.{}", to, from))
        }
        0b1100 | 0b1101 => {
            let insn = if top { I::Vcvt } else { I::Vcvtr };
            let to = if bit(word, 16) { "s32" } else { "u32" };
            let from = if double { "f64" } else { "f32" };
            Decoded::new(
                insn,
                vec![Op::Reg(vd(word, false)), Op::Reg(vm(word, double))],
            )
            .suffix(&format!(".{}.{}", to, from))
        }
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

/// VFPExpandImm for single precision; every encodable value is exact in `f64`.
fn expand_imm(imm8: u32) -> f64 {
    let sign = if imm8 & 0x80 != 0 { -1.0 } else { 1.0 };
    let exp = ((imm8 >> 4) & 7) as i32;
    let exp = if exp & 4 != 0 { exp - 8 + 1 } else { exp + 1 };
    let mantissa = 1.0 + (imm8 & 0xf) as f64 / 16.0;
    sign * mantissa * 2f64.powi(exp)
}

/// Formats like C's `%e`: six fractional digits and a two-digit signed exponent.
pub(crate) fn c_exponent(value: f64) -> String {
    if value == 0.0 {
        return "0.000000e+00".to_string();
    }
    let mut exp = value.abs().log10().floor() as i32;
    let mut mantissa = value / 10f64.powi(exp);
    if format!("{:.6}", mantissa.abs()).starts_with("10") {
        exp += 1;
        mantissa /= 10.0;
    }
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{:.6}e{}{:02}", mantissa, sign, exp.abs())
}

fn transfer(word: u32, double: bool) -> Result<Decoded, DecodeError> {
    let load = bit(word, 20);
    let rt = core_reg(field(word, 12, 4));
    let decoded = match (double, field(word, 21, 3)) {
        (false, 0b000) => {
            let s = vn(word, false);
            if load {
                Decoded::new(I::Vmov, vec![Op::Reg(rt), Op::Reg(s)])
            } else {
                Decoded::new(I::Vmov, vec![Op::Reg(s), Op::Reg(rt)])
            }
        }
        (false, 0b111) => {
            let special = match field(word, 16, 4) {
                0b0000 => ArmReg::Fpsid,
                0b0001 => ArmReg::Fpscr,
                0b1000 => ArmReg::Fpexc,
                _ => return Err(DecodeError::InvalidEncoding),
            };
            if load {
                let dst = if field(word, 12, 4) == 0xf {
                    ArmReg::ApsrNzcv
                } else {
                    rt
                };
                Decoded::new(I::Vmrs, vec![Op::Reg(dst), Op::Reg(special)])
            } else {
                Decoded::new(I::Vmsr, vec![Op::Reg(special), Op::Reg(rt)])
            }
        }
        (true, 0b000 | 0b001) if field(word, 5, 2) == 0 => {
            let scalar = Op::Lane(vn(word, true), field(word, 21, 1) as u8);
            let ops = if load {
                vec![Op::Reg(rt), scalar]
            } else {
                vec![scalar, Op::Reg(rt)]
            };
            Decoded::new(I::Vmov, ops).suffix(".32")
        }
        (true, op) if op & 0b100 != 0 && !load => {
            let size = match (bit(word, 22), bit(word, 5)) {
                (true, false) => ".8",
                (false, true) => ".16",
                (false, false) => ".32",
                _ => return Err(DecodeError::InvalidEncoding),
            };
            let n = field(word, 7, 1) << 4 | field(word, 16, 4);
            let dst = if bit(word, 21) { qreg(n >> 1) } else { dreg(n) };
            Decoded::new(I::Vdup, vec![Op::Reg(dst), Op::Reg(rt)])
                .suffix(size)
                .feature(G::Neon)
        }
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

fn load_store(word: u32, double: bool) -> Result<Decoded, DecodeError> {
    let rn = core_reg(field(word, 16, 4));
    let load = bit(word, 20);
    let (before, up, writeback) = (bit(word, 24), bit(word, 23), bit(word, 21));
    if field(word, 21, 4) == 0b0010 {
        let rt = core_reg(field(word, 12, 4));
        let rt2 = rn;
        let regs = if double {
            vec![Op::Reg(vm(word, true))]
        } else {
            let first = field(word, 0, 4) << 1 | field(word, 5, 1);
            vec![Op::Reg(sreg(first)), Op::Reg(sreg(first + 1))]
        };
        let mut ops = Vec::new();
        if load {
            ops.extend([Op::Reg(rt), Op::Reg(rt2)]);
            ops.extend(regs);
        } else {
            ops.extend(regs);
            ops.extend([Op::Reg(rt), Op::Reg(rt2)]);
        }
        return Ok(Decoded::new(I::Vmov, ops));
    }
    let imm8 = field(word, 0, 8);
    if before && !writeback {
        let mem = Mem {
            base: rn,
            offset: Offset::Imm {
                value: imm8 << 2,
                subtract: !up,
            },
            indexing: Indexing::Offset,
        };
        let insn = if load { I::Vldr } else { I::Vstr };
        return Ok(Decoded::new(insn, vec![Op::Reg(vd(word, double)), Op::Mem(mem)]));
    }
    let count = if double { imm8 / 2 } else { imm8 };
    if count == 0 || before == up {
        return Err(DecodeError::InvalidEncoding);
    }
    let first = vd(word, double);
    let list: Vec<ArmReg> = (0..count)
        .map(|i| {
            ArmReg::from_id(first.id() as u32 + i).unwrap_or(ArmReg::Invalid)
        })
        .collect();
    if rn == ArmReg::Sp && writeback {
        if before && !up && !load {
            return Ok(Decoded::new(I::Vpush, vec![Op::List(list)]));
        }
        if !before && up && load {
            return Ok(Decoded::new(I::Vpop, vec![Op::List(list)]));
        }
    }
    let insn = match (load, before) {
        (true, false) => I::Vldmia,
        (true, true) => I::Vldmdb,
        (false, false) => I::Vstmia,
        (false, true) => I::Vstmdb,
    };
    let base = if writeback { Op::RegWb(rn) } else { Op::Reg(rn) };
    Ok(Decoded::new(insn, vec![base, Op::List(list)]))
}

/// A NEON register from a 4-bit field and its extra bit.
fn neon_reg(num: u32, extra: u32, quad: bool) -> ArmReg {
    let n = extra << 4 | num;
    if quad {
        qreg(n >> 1)
    } else {
        dreg(n)
    }
}

/// Advanced SIMD data processing: `1111 001U ...`.
pub(super) fn neon(word: u32) -> Result<Decoded, DecodeError> {
    let decoded = if !bit(word, 23) {
        three_same(word)?
    } else if field(word, 20, 2) != 0b11 && field(word, 4, 1) == 0 && field(word, 6, 1) == 0 {
        three_different(word)?
    } else if bit(word, 24)
        && field(word, 20, 2) == 0b11
        && field(word, 8, 4) == 0b1100
        && field(word, 4, 1) == 0
        && field(word, 7, 1) == 0
    {
        dup_scalar(word)?
    } else {
        return Err(DecodeError::InvalidEncoding);
    };
    Ok(decoded.feature(G::Neon))
}

fn three_same(word: u32) -> Result<Decoded, DecodeError> {
    let quad = bit(word, 6);
    let unsigned = bit(word, 24);
    let size = field(word, 20, 2);
    let d = neon_reg(field(word, 12, 4), field(word, 22, 1), quad);
    let n = neon_reg(field(word, 16, 4), field(word, 7, 1), quad);
    let m = neon_reg(field(word, 0, 4), field(word, 5, 1), quad);
    let ops = vec![Op::Reg(d), Op::Reg(n), Op::Reg(m)];
    let bits = 8 << size;
    let typed = |insn: I, kind: &str| -> Result<Decoded, DecodeError> {
        Ok(Decoded::new(insn, ops.clone()).suffix(&format!(".{}{}", kind, bits)))
    };
    let float = |insn: I| -> Result<Decoded, DecodeError> {
        Ok(Decoded::new(insn, ops.clone()).suffix(".f32"))
    };
    let sign = if unsigned { "u" } else { "s" };
    let high = size >> 1;
    match (field(word, 8, 4), bit(word, 4)) {
        (0b0001, true) => {
            let insn = match (unsigned, size) {
                (false, 0) => I::Vand,
                (false, 1) => I::Vbic,
                (false, 2) if n == m => {
                    return Ok(Decoded::new(I::Vmov, vec![Op::Reg(d), Op::Reg(m)]));
                }
                (false, 2) => I::Vorr,
                (false, _) => I::Vorn,
                (true, 0) => I::Veor,
                (true, 1) => I::Vbsl,
                (true, 2) => I::Vbit,
                (true, _) => I::Vbif,
            };
            Ok(Decoded::new(insn, ops.clone()))
        }
        (0b0011, false) => typed(I::Vcgt, sign),
        (0b0011, true) => typed(I::Vcge, sign),
        (0b0110, false) => typed(I::Vmax, sign),
        (0b0110, true) => typed(I::Vmin, sign),
        (0b1000, false) => typed(if unsigned { I::Vsub } else { I::Vadd }, "i"),
        (0b1000, true) if unsigned => typed(I::Vceq, "i"),
        (0b1000, true) => typed(I::Vtst, ""),
        (0b1001, true) if unsigned && size == 0 => typed(I::Vmul, "p"),
        (0b1001, true) if !unsigned => typed(I::Vmul, "i"),
        (0b1101, false) => match (unsigned, high) {
            (false, 0) => float(I::Vadd),
            (false, _) => float(I::Vsub),
            (true, 0) => float(I::Vpadd),
            (true, _) => float(I::Vabd),
        },
        (0b1101, true) => match (unsigned, high) {
            (false, 0) => float(I::Vmla),
            (false, _) => float(I::Vmls),
            (true, 0) => float(I::Vmul),
            _ => Err(DecodeError::InvalidEncoding),
        },
        (0b1110, false) => match (unsigned, high) {
            (false, 0) => float(I::Vceq),
            (true, 0) => float(I::Vcge),
            (true, _) => float(I::Vcgt),
            _ => Err(DecodeError::InvalidEncoding),
        },
        (0b1111, false) => match (unsigned, high) {
            (false, 0) => float(I::Vmax),
            (false, _) => float(I::Vmin),
            (true, 0) => float(I::Vpmax),
            (true, _) => float(I::Vpmin),
        },
        _ => Err(DecodeError::InvalidEncoding),
    }
}

fn three_different(word: u32) -> Result<Decoded, DecodeError> {
    let size = field(word, 20, 2);
    let sign = if bit(word, 24) { "u" } else { "s" };
    let suffix = format!(".{}{}", sign, 8 << size);
    let qd = neon_reg(field(word, 12, 4), field(word, 22, 1), true);
    let dn = neon_reg(field(word, 16, 4), field(word, 7, 1), false);
    let qn = neon_reg(field(word, 16, 4), field(word, 7, 1), true);
    let dm = neon_reg(field(word, 0, 4), field(word, 5, 1), false);
    let (insn, wide) = match field(word, 8, 4) {
        0b0000 => (I::Vaddl, false),
        0b0001 => (I::Vaddw, true),
        0b0010 => (I::Vsubl, false),
        0b0011 => (I::Vsubw, true),
        0b1100 => (I::Vmull, false),
        _ => return Err(DecodeError::InvalidEncoding),
    };
    let n = if wide { qn } else { dn };
    Ok(Decoded::new(insn, vec![Op::Reg(qd), Op::Reg(n), Op::Reg(dm)]).suffix(&suffix))
}

fn dup_scalar(word: u32) -> Result<Decoded, DecodeError> {
    let imm4 = field(word, 16, 4);
    let (suffix, index) = if imm4 & 1 != 0 {
        (".8", imm4 >> 1)
    } else if imm4 & 2 != 0 {
        (".16", imm4 >> 2)
    } else if imm4 & 4 != 0 {
        (".32", imm4 >> 3)
    } else {
        return Err(DecodeError::InvalidEncoding);
    };
    let d = neon_reg(field(word, 12, 4), field(word, 22, 1), bit(word, 6));
    let m = neon_reg(field(word, 0, 4), field(word, 5, 1), false);
    Ok(Decoded::new(I::Vdup, vec![Op::Reg(d), Op::Lane(m, index as u8)]).suffix(suffix))
}

/// Decoded shape of a `vldN`/`vstN` register list.
struct Structure {
    /// Number of structure elements, 1 to 4.
    n: u32,
    /// Element size in bits.
    size: u32,
    first: u32,
    regs: u32,
    spacing: u32,
    lane: Option<Lane>,
    /// Alignment in bits, 0 when none is required.
    align: u32,
}

/// Advanced SIMD element or structure load/store: `1111 0100 A D L 0 ...`.
pub(super) fn element(word: u32) -> Result<Decoded, DecodeError> {
    let load = bit(word, 21);
    let first = field(word, 22, 1) << 4 | field(word, 12, 4);
    let shape = if !bit(word, 23) {
        multiple(word, first)?
    } else if field(word, 10, 2) == 0b11 {
        if !load {
            return Err(DecodeError::InvalidEncoding);
        }
        all_lanes(word, first)?
    } else {
        single_lane(word, first)?
    };
    let last = shape.first + (shape.regs - 1) * shape.spacing;
    if last > 31 {
        return Err(DecodeError::InvalidEncoding);
    }
    let regs: Vec<ArmReg> = (0..shape.regs)
        .map(|i| dreg(shape.first + i * shape.spacing))
        .collect();
    let list = match shape.lane {
        Some(lane) => Op::Lanes(regs, lane),
        None => Op::List(regs),
    };

    let rm = field(word, 0, 4);
    let (offset, indexing) = match rm {
        15 => (Offset::None, Indexing::Offset),
        13 => (Offset::None, Indexing::Pre),
        _ => (
            Offset::Reg {
                reg: core_reg(rm),
                subtract: false,
                shift: None,
            },
            Indexing::Post,
        ),
    };
    let mem = Mem {
        base: core_reg(field(word, 16, 4)),
        offset,
        indexing,
    };
    let insn = match (load, shape.n) {
        (true, 1) => I::Vld1,
        (true, 2) => I::Vld2,
        (true, 3) => I::Vld3,
        (true, _) => I::Vld4,
        (false, 1) => I::Vst1,
        (false, 2) => I::Vst2,
        (false, 3) => I::Vst3,
        (false, _) => I::Vst4,
    };
    Ok(Decoded::new(insn, vec![list, Op::Aligned(mem, shape.align)])
        .suffix(&format!(".{}", shape.size))
        .feature(G::Neon))
}

/// Multiple structures: register count and spacing come from the `type` field.
fn multiple(word: u32, first: u32) -> Result<Structure, DecodeError> {
    let size = field(word, 6, 2);
    let align = field(word, 4, 2);
    let (n, regs, spacing) = match field(word, 8, 4) {
        0b0111 => (1, 1, 1),
        0b1010 => (1, 2, 1),
        0b0110 => (1, 3, 1),
        0b0010 => (1, 4, 1),
        0b1000 => (2, 2, 1),
        0b1001 => (2, 2, 2),
        0b0011 => (2, 4, 1),
        0b0100 => (3, 3, 1),
        0b0101 => (3, 3, 2),
        0b0000 => (4, 4, 1),
        0b0001 => (4, 4, 2),
        _ => return Err(DecodeError::InvalidEncoding),
    };
    let invalid = match (n, regs) {
        (1, 1) | (1, 3) => align & 0b10 != 0,
        (1, 2) => align == 0b11,
        (1, _) => false,
        (2, 4) => size == 0b11,
        (2, _) => size == 0b11 || align == 0b11,
        (3, _) => size == 0b11 || align & 0b10 != 0,
        _ => size == 0b11,
    };
    if invalid {
        return Err(DecodeError::InvalidEncoding);
    }
    Ok(Structure {
        n,
        size: 8 << size,
        first,
        regs,
        spacing,
        lane: None,
        align: if align == 0 { 0 } else { 32 << align },
    })
}

/// Single structure to all lanes (`vldN.size {d0[], ...}`).
fn all_lanes(word: u32, first: u32) -> Result<Structure, DecodeError> {
    let n = field(word, 8, 2) + 1;
    let size = field(word, 6, 2);
    let t = bit(word, 5);
    let a = bit(word, 4);
    let (regs, spacing) = match n {
        1 => (if t { 2 } else { 1 }, 1),
        _ => (n, if t { 2 } else { 1 }),
    };
    let (bits, align) = match (n, size) {
        (4, 0b11) => (32, a.then_some(128)),
        (_, 0b11) => return Err(DecodeError::InvalidEncoding),
        (1, 0) if a => return Err(DecodeError::InvalidEncoding),
        (3, _) if a => return Err(DecodeError::InvalidEncoding),
        (1, s) => (8 << s, a.then_some(8 << s)),
        (2, s) => (8 << s, a.then_some(16 << s)),
        (3, s) => (8 << s, None),
        (_, 0) => (8, a.then_some(32)),
        (_, s) => (8 << s, a.then_some(64)),
    };
    Ok(Structure {
        n,
        size: bits,
        first,
        regs,
        spacing,
        lane: Some(Lane::All),
        align: align.unwrap_or(0),
    })
}

/// Single structure to one lane (`vldN.size {d0[1], ...}`).
fn single_lane(word: u32, first: u32) -> Result<Structure, DecodeError> {
    let n = field(word, 8, 2) + 1;
    let size = field(word, 10, 2);
    let ia = field(word, 4, 4);
    let (index, spacing) = match size {
        0 => (ia >> 1, 1),
        1 => (ia >> 2, if bit(ia, 1) { 2 } else { 1 }),
        _ => (ia >> 3, if bit(ia, 2) { 2 } else { 1 }),
    };
    let align = match (n, size) {
        (1, 0) if ia & 1 != 0 => return Err(DecodeError::InvalidEncoding),
        (1, 0) => 0,
        (1, 1) if ia & 0b10 != 0 => return Err(DecodeError::InvalidEncoding),
        (1, 1) => 16 * (ia & 1),
        (1, _) => match ia & 0b111 {
            0b000 => 0,
            0b011 => 32,
            _ => return Err(DecodeError::InvalidEncoding),
        },
        (2, 2) if ia & 0b10 != 0 => return Err(DecodeError::InvalidEncoding),
        (2, s) => (16 << s) * (ia & 1),
        (3, 2) if ia & 0b11 != 0 => return Err(DecodeError::InvalidEncoding),
        (3, _) if ia & 1 != 0 => return Err(DecodeError::InvalidEncoding),
        (3, _) => 0,
        (_, 0) => 32 * (ia & 1),
        (_, 1) => 64 * (ia & 1),
        (_, _) => match ia & 0b11 {
            0b00 => 0,
            0b01 => 64,
            0b10 => 128,
            _ => return Err(DecodeError::InvalidEncoding),
        },
    };
    Ok(Structure {
        n,
        size: 8 << size,
        first,
        regs: n,
        spacing: if n == 1 { 1 } else { spacing },
        lane: Some(Lane::Index(index as u8)),
        align,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn text(d: Decoded) -> String {
        let (m, o) = super::super::render(&d, crate::Syntax::Default);
        format!("{} {}", m, o)
    }

    #[rstest]
    #[case(0xee300a01, "vadd.f32 s0, s0, s2")]
    #[case(0xee210b02, "vmul.f64 d0, d1, d2")]
    #[case(0xed910b02, "vldr d0, [r1, #8]")]
    #[case(0xed2d8b04, "vpush {d8, d9}")]
    #[case(0xeef1fa10, "vmrs apsr_nzcv, fpscr")]
    #[case(0xee100a10, "vmov r0, s0")]
    #[case(0xeeb70ac0, "vcvt.f64.f32 d0, s0")]
    #[case(0xeeb00a00, "vmov.f32 s0, #2.000000e+00")]
    fn test_vfp_forms(#[case] word: u32, #[case] expected: &str) {
        assert_eq!(text(vfp(word, Mode::ARM).unwrap()), expected);
    }

    #[test]
    fn test_neon_forms() {
        assert_eq!(text(neon(0xf32ea1dc).unwrap()), "vbit q5, q15, q6");
        assert_eq!(text(neon(0xf3624ee8).unwrap()), "vcgt.f32 q10, q9, q12");
        assert_eq!(text(neon(0xf2220152).unwrap()), "vmov q0, q1");
        assert!(neon(0xf2800e10).is_err());
    }

    #[rstest]
    #[case(0xf4604886, "vld2.32 {d20, d21}, [r0], r6")]
    #[case(0xf4e20f4d, "vld4.16 {d16[], d17[], d18[], d19[]}, [r2]!")]
    #[case(0xf460041f, "vld3.8 {d16, d17, d18}, [r0:64]")]
    #[case(0xf4e0074f, "vld4.16 {d16[1], d17[1], d18[1], d19[1]}, [r0]")]
    #[case(0xf40207cf, "vst1.64 {d0}, [r2]")]
    #[case(0xf481088d, "vst1.32 {d0[1]}, [r1]!")]
    #[case(0xf423aaad, "vld1.32 {d10, d11}, [r3:128]!")]
    fn test_structure_load_store(#[case] word: u32, #[case] expected: &str) {
        assert_eq!(text(element(word).unwrap()), expected);
    }

    #[rstest]
    // vld1 with three registers cannot take a 128-bit alignment
    #[case(0xf420062f)]
    // stores have no all-lanes form
    #[case(0xf4800c0f)]
    // the register list runs past d31
    #[case(0xf46fe00f)]
    fn test_structure_load_store_invalid(#[case] word: u32) {
        assert_eq!(element(word).unwrap_err(), DecodeError::InvalidEncoding);
    }

    #[test]
    fn test_half_precision_needs_v8() {
        assert!(vfp(0xeeb23be0, Mode::ARM).is_err());
        assert_eq!(
            text(vfp(0xeeb23be0, Mode::V8).unwrap()),
            "vcvtt.f64.f16 d3, s1"
        );
    }

    #[test]
    fn test_c_exponent() {
        assert_eq!(c_exponent(1.0), "1.000000e+00");
        assert_eq!(c_exponent(-0.5), "-5.000000e-01");
        assert_eq!(c_exponent(31.0), "3.100000e+01");
        assert_eq!(expand_imm(0x00), 2.0);
        assert_eq!(expand_imm(0x70), 1.0);
    }
}
