//! A32 (ARM state) encodings.

use super::{
    barrier_option, bit, core_reg, field, imm_shift, psr_fields, reg_list, simd, ArmCc,
    ArmGroup as G, ArmInsn as I, ArmReg, ArmShift, Decoded, Indexing, Mem, Offset, Op,
};
use crate::arch::{sign_extend, Mode};
use crate::decoder::DecodeError;

const DATA_PROCESSING: [I; 16] = [
    I::And,
    I::Eor,
    I::Sub,
    I::Rsb,
    I::Add,
    I::Adc,
    I::Sbc,
    I::Rsc,
    I::Tst,
    I::Teq,
    I::Cmp,
    I::Cmn,
    I::Orr,
    I::Mov,
    I::Bic,
    I::Mvn,
];

fn reg(word: u32, lo: u32) -> ArmReg {
    core_reg(field(word, lo, 4))
}

pub(super) fn decode(word: u32, address: u64, mode: Mode) -> Result<Decoded, DecodeError> {
    let cond = word >> 28;
    if cond == 0xf {
        return unconditional(word, address).map(|d| d.feature(G::Arm));
    }
    let decoded = match field(word, 25, 3) {
        0b000 => data_or_misc(word, mode)?,
        0b001 => immediate(word)?,
        0b010 => load_store(word)?,
        0b011 if bit(word, 4) => media(word, cond)?,
        0b011 => load_store(word)?,
        0b100 => block_transfer(word)?,
        0b101 => branch(word, address),
        _ => coprocessor(word, mode)?,
    };
    Ok(decoded.cc(ArmCc::from_bits(cond)).feature(G::Arm))
}

/// Rotated 8-bit immediate of data-processing instructions.
pub(super) fn modified_imm(imm12: u32) -> u32 {
    (imm12 & 0xff).rotate_right(2 * (imm12 >> 8))
}

fn shifter_operand(word: u32) -> Op {
    let rm = reg(word, 0);
    let ty = field(word, 5, 2);
    if bit(word, 4) {
        Op::RegShifted(rm, ArmShift::BY_TYPE[ty as usize], reg(word, 8))
    } else {
        imm_shift(rm, ty, field(word, 7, 5))
    }
}

/// Builds the data-processing instruction selected by bits 24:21, applying the shift aliases
/// of `mov`.
pub(super) fn data_processing(opcode: u32, s: bool, rd: ArmReg, rn: ArmReg, op2: Op) -> Decoded {
    let insn = DATA_PROCESSING[opcode as usize & 0xf];
    match opcode {
        8..=11 => Decoded::new(insn, vec![Op::Reg(rn), op2]),
        13 => match op2 {
            Op::Shifted(rm, ArmShift::Rrx, _) => {
                Decoded::new(I::Rrx, vec![Op::Reg(rd), Op::Reg(rm)]).s(s)
            }
            Op::Shifted(rm, shift, amount) => Decoded::new(
                shift.insn(),
                vec![Op::Reg(rd), Op::Reg(rm), Op::Imm(amount as i64)],
            )
            .s(s),
            Op::RegShifted(rm, shift, rs) => {
                Decoded::new(shift.insn(), vec![Op::Reg(rd), Op::Reg(rm), Op::Reg(rs)]).s(s)
            }
            op2 => Decoded::new(insn, vec![Op::Reg(rd), op2]).s(s),
        },
        15 => Decoded::new(insn, vec![Op::Reg(rd), op2]).s(s),
        _ => Decoded::new(insn, vec![Op::Reg(rd), Op::Reg(rn), op2]).s(s),
    }
}

fn data_or_misc(word: u32, mode: Mode) -> Result<Decoded, DecodeError> {
    let op = field(word, 20, 5);
    let low = field(word, 4, 4);
    if low & 0b1001 == 0b1001 {
        return if low == 0b1001 {
            multiply_or_sync(word)
        } else {
            extra_load_store(word)
        };
    }
    if op & 0b11001 == 0b10000 {
        return misc(word, mode);
    }
    Ok(data_processing(
        field(word, 21, 4),
        bit(word, 20),
        reg(word, 12),
        reg(word, 16),
        shifter_operand(word),
    ))
}

fn immediate(word: u32) -> Result<Decoded, DecodeError> {
    let rd = reg(word, 12);
    let imm16 = (field(word, 16, 4) << 12 | field(word, 0, 12)) as i64;
    match field(word, 20, 5) {
        0b10000 => Ok(Decoded::new(I::Movw, vec![Op::Reg(rd), Op::Imm(imm16)]).feature(G::V6t2)),
        0b10100 => Ok(Decoded::new(I::Movt, vec![Op::Reg(rd), Op::Imm(imm16)]).feature(G::V6t2)),
        0b10010 if field(word, 16, 4) == 0 => hint(field(word, 0, 8)),
        0b10010 | 0b10110 => {
            let value = modified_imm(field(word, 0, 12)) as i64;
            let target = psr_fields(bit(word, 22), field(word, 16, 4));
            Ok(Decoded::new(I::Msr, vec![Op::Sym(target), Op::Imm(value)]))
        }
        _ => Ok(data_processing(
            field(word, 21, 4),
            bit(word, 20),
            rd,
            reg(word, 16),
            Op::Imm(modified_imm(field(word, 0, 12)) as i64),
        )),
    }
}

pub(super) fn hint(op: u32) -> Result<Decoded, DecodeError> {
    let insn = match op {
        0 => I::Nop,
        1 => I::Yield,
        2 => I::Wfe,
        3 => I::Wfi,
        4 => I::Sev,
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(Decoded::new(insn, Vec::new()))
}

fn misc(word: u32, mode: Mode) -> Result<Decoded, DecodeError> {
    let op = field(word, 21, 2);
    let rd = reg(word, 12);
    let rm = reg(word, 0);
    let decoded = match field(word, 4, 4) {
        0b0000 if op & 1 == 0 => {
            let psr = if bit(word, 22) { ArmReg::Spsr } else { ArmReg::Apsr };
            Decoded::new(I::Mrs, vec![Op::Reg(rd), Op::Reg(psr)])
        }
        0b0000 => {
            let target = psr_fields(bit(word, 22), field(word, 16, 4));
            Decoded::new(I::Msr, vec![Op::Sym(target), Op::Reg(rm)])
        }
        0b0001 if op == 0b01 => Decoded::new(I::Bx, vec![Op::Reg(rm)]).feature(G::V4t),
        0b0001 if op == 0b11 => Decoded::new(I::Clz, vec![Op::Reg(rd), Op::Reg(rm)]),
        0b0010 if op == 0b01 => Decoded::new(I::Bxj, vec![Op::Reg(rm)]),
        0b0011 if op == 0b01 => Decoded::new(I::Blx, vec![Op::Reg(rm)]).feature(G::V5t),
        0b0100 => crc32(word, mode)?,
        0b0111 if op == 0b01 => {
            let imm = field(word, 8, 12) << 4 | field(word, 0, 4);
            Decoded::new(I::Bkpt, vec![Op::Imm(imm as i64)])
        }
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

fn crc32(word: u32, mode: Mode) -> Result<Decoded, DecodeError> {
    if !mode.contains(Mode::V8) {
        return Err(DecodeError::InvalidEncoding);
    }
    let names = if bit(word, 9) {
        [I::Crc32cb, I::Crc32ch, I::Crc32cw]
    } else {
        [I::Crc32b, I::Crc32h, I::Crc32w]
    };
    let insn = *names
        .get(field(word, 21, 2) as usize)
        .ok_or(DecodeError::InvalidEncoding)?;
    let ops = vec![
        Op::Reg(reg(word, 12)),
        Op::Reg(reg(word, 16)),
        Op::Reg(reg(word, 0)),
    ];
    Ok(Decoded::new(insn, ops).feature(G::Crc).feature(G::V8))
}

fn multiply_or_sync(word: u32) -> Result<Decoded, DecodeError> {
    let rn = reg(word, 16);
    if bit(word, 24) {
        if !bit(word, 23) {
            let insn = if bit(word, 22) { I::Swpb } else { I::Swp };
            let ops = vec![Op::Reg(reg(word, 12)), Op::Reg(reg(word, 0)), base_only(rn)];
            return Ok(Decoded::new(insn, ops));
        }
        let load = bit(word, 20);
        let kind = field(word, 21, 2);
        let rt = reg(word, if load { 12 } else { 0 });
        let pair = core_reg(field(word, if load { 12 } else { 0 }, 4) + 1);
        let insn = match (load, kind) {
            (true, 0) => I::Ldrex,
            (true, 1) => I::Ldrexd,
            (true, 2) => I::Ldrexb,
            (true, _) => I::Ldrexh,
            (false, 0) => I::Strex,
            (false, 1) => I::Strexd,
            (false, 2) => I::Strexb,
            (false, _) => I::Strexh,
        };
        let mut ops = Vec::new();
        if !load {
            ops.push(Op::Reg(reg(word, 12)));
        }
        ops.push(Op::Reg(rt));
        if kind == 1 {
            ops.push(Op::Reg(pair));
        }
        ops.push(base_only(rn));
        return Ok(Decoded::new(insn, ops));
    }

    let s = bit(word, 20);
    let (hi, lo, rs, rm) = (
        Op::Reg(rn),
        Op::Reg(reg(word, 12)),
        Op::Reg(reg(word, 8)),
        Op::Reg(reg(word, 0)),
    );
    let decoded = match field(word, 21, 3) {
        0 => Decoded::new(I::Mul, vec![hi, rm, rs]).s(s),
        1 => Decoded::new(I::Mla, vec![hi, rm, rs, lo]).s(s),
        2 => Decoded::new(I::Umaal, vec![lo, hi, rm, rs]),
        3 => Decoded::new(I::Mls, vec![hi, rm, rs, lo]),
        4 => Decoded::new(I::Umull, vec![lo, hi, rm, rs]).s(s),
        5 => Decoded::new(I::Umlal, vec![lo, hi, rm, rs]).s(s),
        6 => Decoded::new(I::Smull, vec![lo, hi, rm, rs]).s(s),
        _ => Decoded::new(I::Smlal, vec![lo, hi, rm, rs]).s(s),
    };
    Ok(decoded)
}

fn base_only(rn: ArmReg) -> Op {
    Op::Mem(Mem {
        base: rn,
        offset: Offset::None,
        indexing: Indexing::Offset,
    })
}

/// Applies the P/W bits (24 and 21) of a load/store encoding.
fn indexed(word: u32, base: ArmReg, offset: Offset) -> Mem {
    let indexing = match (bit(word, 24), bit(word, 21)) {
        (false, _) => Indexing::Post,
        (true, true) => Indexing::Pre,
        (true, false) => Indexing::Offset,
    };
    Mem {
        base,
        offset,
        indexing,
    }
}

fn extra_load_store(word: u32) -> Result<Decoded, DecodeError> {
    let load = bit(word, 20);
    let (insn, pair) = match (field(word, 5, 2), load) {
        (1, false) => (I::Strh, false),
        (1, true) => (I::Ldrh, false),
        (2, false) => (I::Ldrd, true),
        (2, true) => (I::Ldrsb, false),
        (3, false) => (I::Strd, true),
        (3, true) => (I::Ldrsh, false),
        _ => return Err(DecodeError::InvalidEncoding),
    };
    let subtract = !bit(word, 23);
    let offset = if bit(word, 22) {
        Offset::Imm {
            value: field(word, 8, 4) << 4 | field(word, 0, 4),
            subtract,
        }
    } else {
        Offset::Reg {
            reg: reg(word, 0),
            subtract,
            shift: None,
        }
    };
    let rt = field(word, 12, 4);
    let mut ops = vec![Op::Reg(core_reg(rt))];
    if pair {
        ops.push(Op::Reg(core_reg(rt + 1)));
    }
    ops.push(Op::Mem(indexed(word, reg(word, 16), offset)));
    Ok(Decoded::new(insn, ops))
}

fn load_store(word: u32) -> Result<Decoded, DecodeError> {
    let user = !bit(word, 24) && bit(word, 21);
    let insn = match (bit(word, 20), bit(word, 22), user) {
        (true, false, false) => I::Ldr,
        (true, true, false) => I::Ldrb,
        (false, false, false) => I::Str,
        (false, true, false) => I::Strb,
        (true, false, true) => I::Ldrt,
        (true, true, true) => I::Ldrbt,
        (false, false, true) => I::Strt,
        (false, true, true) => I::Strbt,
    };
    let subtract = !bit(word, 23);
    let offset = if bit(word, 25) {
        let shift = match imm_shift(reg(word, 0), field(word, 5, 2), field(word, 7, 5)) {
            Op::Shifted(_, kind, amount) => Some((kind, amount)),
            _ => None,
        };
        Offset::Reg {
            reg: reg(word, 0),
            subtract,
            shift,
        }
    } else {
        Offset::Imm {
            value: field(word, 0, 12),
            subtract,
        }
    };
    let mut mem = indexed(word, reg(word, 16), offset);
    if user {
        mem.indexing = Indexing::Post;
    }
    Ok(Decoded::new(insn, vec![Op::Reg(reg(word, 12)), Op::Mem(mem)]))
}

fn media(word: u32, cond: u32) -> Result<Decoded, DecodeError> {
    let op1 = field(word, 20, 5);
    let op2 = field(word, 5, 3);
    let rd = reg(word, 12);
    let rn = reg(word, 0);
    let lsb = field(word, 7, 5);
    let decoded = match op1 {
        0b11111 if op2 == 0b111 => {
            if cond != 0xe {
                return Err(DecodeError::InvalidEncoding);
            }
            let imm = field(word, 8, 12) << 4 | field(word, 0, 4);
            Decoded::new(I::Udf, vec![Op::Imm(imm as i64)])
        }
        0b11100 | 0b11101 if op2 & 3 == 0 => {
            let msb = field(word, 16, 5);
            if msb < lsb {
                return Err(DecodeError::InvalidEncoding);
            }
            let width = Op::Imm((msb - lsb + 1) as i64);
            if field(word, 0, 4) == 0xf {
                Decoded::new(I::Bfc, vec![Op::Reg(rd), Op::Imm(lsb as i64), width])
            } else {
                Decoded::new(I::Bfi, vec![Op::Reg(rd), Op::Reg(rn), Op::Imm(lsb as i64), width])
            }
            .feature(G::V6t2)
        }
        0b11010 | 0b11011 | 0b11110 | 0b11111 if op2 & 3 == 2 => {
            let insn = if op1 & 0b100 != 0 { I::Ubfx } else { I::Sbfx };
            let width = field(word, 16, 5) + 1;
            let ops = vec![
                Op::Reg(rd),
                Op::Reg(rn),
                Op::Imm(lsb as i64),
                Op::Imm(width as i64),
            ];
            Decoded::new(insn, ops).feature(G::V6t2)
        }
        0b10001 | 0b10011 if op2 == 0 && field(word, 12, 4) == 0xf => {
            let insn = if op1 == 0b10001 { I::Sdiv } else { I::Udiv };
            let ops = vec![
                Op::Reg(reg(word, 16)),
                Op::Reg(rn),
                Op::Reg(reg(word, 8)),
            ];
            Decoded::new(insn, ops).feature(G::Divide)
        }
        0b01000..=0b01111 => pack_extend(word, op1, op2)?,
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

/// Extend, reverse and bit-reverse instructions shared by A32 and T32.
pub(super) fn extend(
    insn: I,
    accumulate: I,
    rd: ArmReg,
    rn: u32,
    rm: ArmReg,
    rotate: u32,
) -> Decoded {
    let mut ops = vec![Op::Reg(rd)];
    let insn = if rn == 0xf {
        insn
    } else {
        ops.push(Op::Reg(core_reg(rn)));
        accumulate
    };
    ops.push(if rotate == 0 {
        Op::Reg(rm)
    } else {
        Op::Shifted(rm, ArmShift::Ror, rotate * 8)
    });
    Decoded::new(insn, ops)
}

fn pack_extend(word: u32, op1: u32, op2: u32) -> Result<Decoded, DecodeError> {
    let rd = reg(word, 12);
    let rm = reg(word, 0);
    let rn = field(word, 16, 4);
    let rotate = field(word, 10, 2);
    let decoded = match (op1 & 7, op2) {
        (0b010, 0b011) => extend(I::Sxtb, I::Sxtab, rd, rn, rm, rotate),
        (0b011, 0b011) => extend(I::Sxth, I::Sxtah, rd, rn, rm, rotate),
        (0b110, 0b011) => extend(I::Uxtb, I::Uxtab, rd, rn, rm, rotate),
        (0b111, 0b011) => extend(I::Uxth, I::Uxtah, rd, rn, rm, rotate),
        (0b000, 0b011) => extend(I::Sxtb16, I::Sxtab16, rd, rn, rm, rotate),
        (0b100, 0b011) => extend(I::Uxtb16, I::Uxtab16, rd, rn, rm, rotate),
        (0b011, 0b001) => Decoded::new(I::Rev, vec![Op::Reg(rd), Op::Reg(rm)]),
        (0b011, 0b101) => Decoded::new(I::Rev16, vec![Op::Reg(rd), Op::Reg(rm)]),
        (0b111, 0b001) => Decoded::new(I::Rbit, vec![Op::Reg(rd), Op::Reg(rm)]),
        (0b111, 0b101) => Decoded::new(I::Revsh, vec![Op::Reg(rd), Op::Reg(rm)]),
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

fn block_transfer(word: u32) -> Result<Decoded, DecodeError> {
    if bit(word, 22) {
        return Err(DecodeError::InvalidEncoding);
    }
    let rn = reg(word, 16);
    let load = bit(word, 20);
    let writeback = bit(word, 21);
    let list = reg_list(field(word, 0, 16));
    let (before, increment) = (bit(word, 24), bit(word, 23));
    if rn == ArmReg::Sp && writeback && list.len() > 1 {
        if load && !before && increment {
            return Ok(Decoded::new(I::Pop, vec![Op::List(list)]));
        }
        if !load && before && !increment {
            return Ok(Decoded::new(I::Push, vec![Op::List(list)]));
        }
    }
    let insn = match (load, before, increment) {
        (true, false, true) => I::Ldm,
        (true, true, true) => I::Ldmib,
        (true, false, false) => I::Ldmda,
        (true, true, false) => I::Ldmdb,
        (false, false, true) => I::Stm,
        (false, true, true) => I::Stmib,
        (false, false, false) => I::Stmda,
        (false, true, false) => I::Stmdb,
    };
    let base = if writeback { Op::RegWb(rn) } else { Op::Reg(rn) };
    Ok(Decoded::new(insn, vec![base, Op::List(list)]))
}

fn branch(word: u32, address: u64) -> Decoded {
    let offset = sign_extend(field(word, 0, 24) as u64, 24) << 2;
    let target = (address as i64).wrapping_add(8).wrapping_add(offset) as u64 & 0xffff_ffff;
    let insn = if bit(word, 24) { I::Bl } else { I::B };
    Decoded::new(insn, vec![Op::Target(target)])
}

fn unconditional(word: u32, address: u64) -> Result<Decoded, DecodeError> {
    match field(word, 25, 3) {
        0b101 => {
            let offset =
                sign_extend(field(word, 0, 24) as u64, 24) << 2 | (field(word, 24, 1) << 1) as i64;
            let target = (address as i64).wrapping_add(8).wrapping_add(offset) as u64 & 0xffff_ffff;
            Ok(Decoded::new(I::Blx, vec![Op::Target(target)]).feature(G::V5t))
        }
        0b001 => simd::neon(word),
        0b010 if !bit(word, 24) && !bit(word, 20) => simd::element(word),
        0b010 if word & 0xffff_ff00 == 0xf57f_f000 => barrier(field(word, 4, 4), field(word, 0, 4)),
        0b000 if word & 0xffff_fdff == 0xf101_0000 => {
            let endian = if bit(word, 9) { "be" } else { "le" };
            Ok(Decoded::new(I::Setend, vec![Op::Sym(endian.to_string())]))
        }
        0b000 if word & 0xfff1_fe20 == 0xf100_0000 => cps(field(word, 18, 2), field(word, 6, 3)),
        _ => Err(DecodeError::InvalidEncoding),
    }
}

/// `clrex`, `dsb`, `dmb` and `isb`, shared with T32.
pub(super) fn barrier(op: u32, option: u32) -> Result<Decoded, DecodeError> {
    let decoded = match op {
        0b0001 => Decoded::new(I::Clrex, Vec::new()),
        0b0100 => Decoded::new(I::Dsb, vec![Op::Sym(barrier_option(option))]),
        0b0101 => Decoded::new(I::Dmb, vec![Op::Sym(barrier_option(option))]),
        0b0110 => Decoded::new(I::Isb, vec![Op::Sym(barrier_option(option))]),
        _ => return Err(DecodeError::InvalidEncoding),
    };
    let group = if matches!(option, 0x1 | 0x5 | 0x9 | 0xd) && op != 0b0110 {
        G::V8
    } else {
        G::V7
    };
    Ok(decoded.feature(group))
}

/// `cpsie`/`cpsid` with the `a`, `i`, `f` flag bits in `flags` (a = bit 2).
pub(super) fn cps(imod: u32, flags: u32) -> Result<Decoded, DecodeError> {
    let insn = match imod {
        0b10 => I::Cpsie,
        0b11 => I::Cpsid,
        _ => return Err(DecodeError::InvalidEncoding),
    };
    let text: String = [(2, 'a'), (1, 'i'), (0, 'f')]
        .iter()
        .filter(|(b, _)| flags & (1 << b) != 0)
        .map(|(_, c)| *c)
        .collect();
    if text.is_empty() {
        return Err(DecodeError::InvalidEncoding);
    }
    Ok(Decoded::new(insn, vec![Op::Sym(text)]))
}

/// Coprocessor space (bits 27:26 = 11), also reached from T32 after rewriting.
pub(super) fn coprocessor(word: u32, mode: Mode) -> Result<Decoded, DecodeError> {
    if field(word, 24, 4) == 0xf {
        return Ok(Decoded::new(I::Svc, vec![Op::Imm(field(word, 0, 24) as i64)]));
    }
    let coproc = field(word, 8, 4);
    if coproc & 0b1110 == 0b1010 {
        return simd::vfp(word, mode);
    }
    let crn = field(word, 16, 4) as u8;
    let crm = field(word, 0, 4) as u8;
    let rt = reg(word, 12);
    let decoded = match (bit(word, 25), bit(word, 4)) {
        (true, true) => {
            let insn = if bit(word, 20) { I::Mrc } else { I::Mcr };
            let ops = vec![
                Op::Coproc(coproc as u8),
                Op::Imm(field(word, 21, 3) as i64),
                Op::Reg(rt),
                Op::CReg(crn),
                Op::CReg(crm),
                Op::Imm(field(word, 5, 3) as i64),
            ];
            Decoded::new(insn, ops)
        }
        (true, false) => {
            let ops = vec![
                Op::Coproc(coproc as u8),
                Op::Imm(field(word, 20, 4) as i64),
                Op::CReg(field(word, 12, 4) as u8),
                Op::CReg(crn),
                Op::CReg(crm),
                Op::Imm(field(word, 5, 3) as i64),
            ];
            Decoded::new(I::Cdp, ops)
        }
        (false, _) if field(word, 21, 4) == 0b0010 => {
            let insn = if bit(word, 20) { I::Mrrc } else { I::Mcrr };
            let ops = vec![
                Op::Coproc(coproc as u8),
                Op::Imm(field(word, 4, 4) as i64),
                Op::Reg(rt),
                Op::Reg(reg(word, 16)),
                Op::CReg(crm),
            ];
            Decoded::new(insn, ops)
        }
        (false, _) => {
            if !bit(word, 24) && !bit(word, 21) {
                return Err(DecodeError::InvalidEncoding);
            }
            let insn = match (bit(word, 20), bit(word, 22)) {
                (true, false) => I::Ldc,
                (true, true) => I::Ldcl,
                (false, false) => I::Stc,
                (false, true) => I::Stcl,
            };
            let offset = Offset::Imm {
                value: field(word, 0, 8) << 2,
                subtract: !bit(word, 23),
            };
            let mem = indexed(word, reg(word, 16), offset);
            Decoded::new(
                insn,
                vec![
                    Op::Coproc(coproc as u8),
                    Op::CReg(field(word, 12, 4) as u8),
                    Op::Mem(mem),
                ],
            )
        }
    };
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn text(word: u32) -> String {
        let d = decode(word, 0x1000, Mode::ARM | Mode::V8).unwrap();
        let (m, o) = super::super::render(&d, crate::Syntax::Default);
        format!("{} {}", m, o).trim_end().to_string()
    }

    #[rstest]
    #[case(0xe1a00101, "lsl r0, r1, #2")]
    #[case(0xe0910002, "adds r0, r1, r2")]
    #[case(0xe92d4010, "push {r4, lr}")]
    #[case(0xe8bd8010, "pop {r4, pc}")]
    #[case(0xe8900006, "ldm r0, {r1, r2}")]
    #[case(0xe3011234, "movw r1, #0x1234")]
    #[case(0xe12fff1e, "bx lr")]
    #[case(0xe0010392, "mul r1, r2, r3")]
    #[case(0xe1c120d4, "ldrd r2, r3, [r1, #4]")]
    #[case(0xe4910004, "ldr r0, [r1], #4")]
    #[case(0xe6ef0071, "uxtb r0, r1")]
    #[case(0xe7e10251, "ubfx r0, r1, #4, #2")]
    #[case(0xef000011, "svc #0x11")]
    #[case(0xe320f000, "nop")]
    #[case(0xf57ff04f, "dsb sy")]
    #[case(0xe10f0000, "mrs r0, apsr")]
    #[case(0xe3e00000, "mvn r0, #0")]
    #[case(0xe3a004ff, "mov r0, #0xff000000")]
    fn test_a32_forms(#[case] word: u32, #[case] expected: &str) {
        assert_eq!(text(word), expected);
    }

    #[test]
    fn test_modified_immediate() {
        assert_eq!(modified_imm(0x4ff), 0xff00_0000);
        assert_eq!(modified_imm(0x0ff), 0xff);
    }

    #[test]
    fn test_undefined_requires_always() {
        assert!(decode(0x07f000f0, 0, Mode::ARM).is_err());
        assert!(decode(0xe7f000f0, 0, Mode::ARM).is_ok());
    }
}
