//! Thumb (16-bit) and Thumb-2 (32-bit) encodings.

use super::a32::{self, data_processing};
use super::{
    bit, core_reg, field, imm_shift, mclass_sysreg, psr_fields, reg_list, simd, ArmCc,
    ArmGroup as G, ArmInsn as I, ArmReg, ArmShift, Decoded, Indexing, ItBlock, Mem, Offset, Op,
};
use crate::arch::{sign_extend, Mode};
use crate::cursor::Cursor;
use crate::decoder::DecodeError;

pub(super) fn decode(
    cursor: &mut Cursor<'_>,
    address: u64,
    mode: Mode,
    it: &mut ItBlock,
) -> Result<Decoded, DecodeError> {
    let endian = mode.endian();
    let hw1 = cursor.read_u16_with(endian)? as u32;
    let in_block = it.active();
    let cond = it.take();
    let decoded = if hw1 >> 11 >= 0b11101 {
        let hw2 = cursor.read_u16_with(endian)? as u32;
        wide(hw1 << 16 | hw2, address, mode, cond.unwrap_or(ArmCc::Al))?.feature(G::Thumb2)
    } else {
        narrow(hw1, address, in_block)?
            .feature(G::Thumb)
            .feature(G::Thumb1Only)
    };
    if decoded.insn == I::It {
        *it = ItBlock::open(field(hw1, 4, 4), field(hw1, 0, 4));
        return Ok(decoded);
    }
    Ok(match cond {
        Some(cc) => decoded.cc(cc),
        None => decoded,
    })
}

fn lo(hw: u32, at: u32) -> ArmReg {
    core_reg(field(hw, at, 3))
}

fn mem(base: ArmReg, offset: Offset) -> Op {
    Op::Mem(Mem {
        base,
        offset,
        indexing: Indexing::Offset,
    })
}

fn imm_offset(value: u32) -> Offset {
    Offset::Imm {
        value,
        subtract: false,
    }
}

fn reg_offset(reg: ArmReg) -> Offset {
    Offset::Reg {
        reg,
        subtract: false,
        shift: None,
    }
}

/// Target of a Thumb branch: the PC reads four bytes ahead.
fn target(address: u64, offset: i64) -> Op {
    Op::Target((address as i64).wrapping_add(4).wrapping_add(offset) as u64 & 0xffff_ffff)
}

fn narrow(hw: u32, address: u64, in_block: bool) -> Result<Decoded, DecodeError> {
    let s = !in_block;
    let decoded = match hw >> 10 {
        0b000000..=0b000101 => {
            let (rd, rm) = (Op::Reg(lo(hw, 0)), Op::Reg(lo(hw, 3)));
            let imm5 = field(hw, 6, 5);
            match field(hw, 11, 2) {
                0 if imm5 == 0 => Decoded::new(I::Mov, vec![rd, rm]).s(true),
                0 => Decoded::new(I::Lsl, vec![rd, rm, Op::Imm(imm5 as i64)]).s(s),
                op => {
                    let amount = if imm5 == 0 { 32 } else { imm5 };
                    let insn = if op == 1 { I::Lsr } else { I::Asr };
                    Decoded::new(insn, vec![rd, rm, Op::Imm(amount as i64)]).s(s)
                }
            }
        }
        0b000110 | 0b000111 => {
            let insn = if bit(hw, 9) { I::Sub } else { I::Add };
            let third = if bit(hw, 10) {
                Op::Imm(field(hw, 6, 3) as i64)
            } else {
                Op::Reg(lo(hw, 6))
            };
            Decoded::new(insn, vec![Op::Reg(lo(hw, 0)), Op::Reg(lo(hw, 3)), third]).s(s)
        }
        0b001000..=0b001111 => {
            let rdn = Op::Reg(lo(hw, 8));
            let imm = Op::Imm(field(hw, 0, 8) as i64);
            match field(hw, 11, 2) {
                0 => Decoded::new(I::Mov, vec![rdn, imm]).s(s),
                1 => Decoded::new(I::Cmp, vec![rdn, imm]),
                2 => Decoded::new(I::Add, vec![rdn, imm]).s(s),
                _ => Decoded::new(I::Sub, vec![rdn, imm]).s(s),
            }
        }
        0b010000 => alu(hw, s),
        0b010001 => special(hw)?,
        0b010010 | 0b010011 => Decoded::new(
            I::Ldr,
            vec![
                Op::Reg(lo(hw, 8)),
                mem(ArmReg::Pc, imm_offset(field(hw, 0, 8) << 2)),
            ],
        ),
        0b010100..=0b010111 => {
            const OPS: [I; 8] = [
                I::Str,
                I::Strh,
                I::Strb,
                I::Ldrsb,
                I::Ldr,
                I::Ldrh,
                I::Ldrb,
                I::Ldrsh,
            ];
            Decoded::new(
                OPS[field(hw, 9, 3) as usize],
                vec![
                    Op::Reg(lo(hw, 0)),
                    mem(lo(hw, 3), reg_offset(lo(hw, 6))),
                ],
            )
        }
        0b011000..=0b011111 => {
            let byte = bit(hw, 12);
            let insn = match (byte, bit(hw, 11)) {
                (false, false) => I::Str,
                (false, true) => I::Ldr,
                (true, false) => I::Strb,
                (true, true) => I::Ldrb,
            };
            let scale = if byte { 0 } else { 2 };
            let offset = imm_offset(field(hw, 6, 5) << scale);
            Decoded::new(insn, vec![Op::Reg(lo(hw, 0)), mem(lo(hw, 3), offset)])
        }
        0b100000..=0b100011 => {
            let insn = if bit(hw, 11) { I::Ldrh } else { I::Strh };
            let offset = imm_offset(field(hw, 6, 5) << 1);
            Decoded::new(insn, vec![Op::Reg(lo(hw, 0)), mem(lo(hw, 3), offset)])
        }
        0b100100..=0b100111 => {
            let insn = if bit(hw, 11) { I::Ldr } else { I::Str };
            let offset = imm_offset(field(hw, 0, 8) << 2);
            Decoded::new(insn, vec![Op::Reg(lo(hw, 8)), mem(ArmReg::Sp, offset)])
        }
        0b101000 | 0b101001 => Decoded::new(
            I::Adr,
            vec![Op::Reg(lo(hw, 8)), Op::Imm((field(hw, 0, 8) << 2) as i64)],
        ),
        0b101010 | 0b101011 => Decoded::new(
            I::Add,
            vec![
                Op::Reg(lo(hw, 8)),
                Op::Reg(ArmReg::Sp),
                Op::Imm((field(hw, 0, 8) << 2) as i64),
            ],
        ),
        0b101100..=0b101111 => misc(hw, address)?,
        0b110000..=0b110011 => {
            let rn = lo(hw, 8);
            let list = reg_list(field(hw, 0, 8));
            if bit(hw, 11) {
                let base = if list.contains(&rn) {
                    Op::Reg(rn)
                } else {
                    Op::RegWb(rn)
                };
                Decoded::new(I::Ldm, vec![base, Op::List(list)])
            } else {
                Decoded::new(I::Stm, vec![Op::RegWb(rn), Op::List(list)])
            }
        }
        0b110100..=0b110111 => {
            let imm8 = field(hw, 0, 8);
            match field(hw, 8, 4) {
                0b1110 => Decoded::new(I::Udf, vec![Op::Imm(imm8 as i64)]),
                0b1111 => Decoded::new(I::Svc, vec![Op::Imm(imm8 as i64)]),
                cond => {
                    let offset = sign_extend(imm8 as u64, 8) << 1;
                    Decoded::new(I::B, vec![target(address, offset)]).cc(ArmCc::from_bits(cond))
                }
            }
        }
        0b111000 | 0b111001 => {
            let offset = sign_extend(field(hw, 0, 11) as u64, 11) << 1;
            Decoded::new(I::B, vec![target(address, offset)])
        }
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

fn alu(hw: u32, s: bool) -> Decoded {
    let rdn = Op::Reg(lo(hw, 0));
    let rm = Op::Reg(lo(hw, 3));
    match field(hw, 6, 4) {
        0b0000 => Decoded::new(I::And, vec![rdn, rm]).s(s),
        0b0001 => Decoded::new(I::Eor, vec![rdn, rm]).s(s),
        0b0010 => Decoded::new(I::Lsl, vec![rdn, rm]).s(s),
        0b0011 => Decoded::new(I::Lsr, vec![rdn, rm]).s(s),
        0b0100 => Decoded::new(I::Asr, vec![rdn, rm]).s(s),
        0b0101 => Decoded::new(I::Adc, vec![rdn, rm]).s(s),
        0b0110 => Decoded::new(I::Sbc, vec![rdn, rm]).s(s),
        0b0111 => Decoded::new(I::Ror, vec![rdn, rm]).s(s),
        0b1000 => Decoded::new(I::Tst, vec![rdn, rm]),
        0b1001 => Decoded::new(I::Rsb, vec![rdn, rm, Op::Imm(0)]).s(s),
        0b1010 => Decoded::new(I::Cmp, vec![rdn, rm]),
        0b1011 => Decoded::new(I::Cmn, vec![rdn, rm]),
        0b1100 => Decoded::new(I::Orr, vec![rdn, rm]).s(s),
        0b1101 => Decoded::new(I::Mul, vec![rdn.clone(), rm, rdn]).s(s),
        0b1110 => Decoded::new(I::Bic, vec![rdn, rm]).s(s),
        _ => Decoded::new(I::Mvn, vec![rdn, rm]).s(s),
    }
}

/// High-register operations and branch-exchange.
fn special(hw: u32) -> Result<Decoded, DecodeError> {
    let rdn = core_reg(field(hw, 7, 1) << 3 | field(hw, 0, 3));
    let rm = core_reg(field(hw, 3, 4));
    let decoded = match field(hw, 8, 2) {
        0b00 => Decoded::new(I::Add, vec![Op::Reg(rdn), Op::Reg(rm)]),
        0b01 => Decoded::new(I::Cmp, vec![Op::Reg(rdn), Op::Reg(rm)]),
        0b10 => Decoded::new(I::Mov, vec![Op::Reg(rdn), Op::Reg(rm)]),
        _ if field(hw, 0, 3) != 0 => return Err(DecodeError::InvalidEncoding),
        _ if bit(hw, 7) => Decoded::new(I::Blx, vec![Op::Reg(rm)]).feature(G::V5t),
        _ => Decoded::new(I::Bx, vec![Op::Reg(rm)]).feature(G::V4t),
    };
    Ok(decoded)
}

fn misc(hw: u32, address: u64) -> Result<Decoded, DecodeError> {
    let decoded = match field(hw, 8, 4) {
        0b0000 => {
            let insn = if bit(hw, 7) { I::Sub } else { I::Add };
            let imm = Op::Imm((field(hw, 0, 7) << 2) as i64);
            Decoded::new(insn, vec![Op::Reg(ArmReg::Sp), imm])
        }
        0b0001 | 0b0011 | 0b1001 | 0b1011 => {
            let insn = if bit(hw, 11) { I::Cbnz } else { I::Cbz };
            let offset = (field(hw, 9, 1) << 6 | field(hw, 3, 5) << 1) as i64;
            Decoded::new(insn, vec![Op::Reg(lo(hw, 0)), target(address, offset)])
        }
        0b0010 => {
            const OPS: [I; 4] = [I::Sxth, I::Sxtb, I::Uxth, I::Uxtb];
            Decoded::new(
                OPS[field(hw, 6, 2) as usize],
                vec![Op::Reg(lo(hw, 0)), Op::Reg(lo(hw, 3))],
            )
        }
        0b0100 | 0b0101 => {
            let mut mask = field(hw, 0, 8);
            if bit(hw, 8) {
                mask |= 1 << 14;
            }
            Decoded::new(I::Push, vec![Op::List(reg_list(mask))])
        }
        0b1100 | 0b1101 => {
            let mut mask = field(hw, 0, 8);
            if bit(hw, 8) {
                mask |= 1 << 15;
            }
            Decoded::new(I::Pop, vec![Op::List(reg_list(mask))])
        }
        0b0110 if field(hw, 5, 3) == 0b011 => {
            let imod = if bit(hw, 4) { 0b11 } else { 0b10 };
            a32::cps(imod, field(hw, 0, 3))?
        }
        0b1010 => {
            let insn = match field(hw, 6, 2) {
                0b00 => I::Rev,
                0b01 => I::Rev16,
                0b11 => I::Revsh,
                _ => return Err(DecodeError::InvalidEncoding),
            };
            Decoded::new(insn, vec![Op::Reg(lo(hw, 0)), Op::Reg(lo(hw, 3))])
        }
        0b1110 => Decoded::new(I::Bkpt, vec![Op::Imm(field(hw, 0, 8) as i64)]),
        0b1111 if field(hw, 0, 4) != 0 => {
            let (first, mask) = (field(hw, 4, 4), field(hw, 0, 4));
            if first == 0xf {
                return Err(DecodeError::InvalidEncoding);
            }
            Decoded::new(I::It, vec![Op::Sym(ArmCc::from_bits(first).suffix().to_string())])
                .suffix(&ItBlock::pattern(first, mask))
        }
        0b1111 => a32::hint(field(hw, 4, 4))?,
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

/// ThumbExpandImm.
fn expand_imm(imm12: u32) -> u32 {
    let imm8 = imm12 & 0xff;
    if imm12 >> 10 == 0 {
        match (imm12 >> 8) & 3 {
            0 => imm8,
            1 => imm8 << 16 | imm8,
            2 => imm8 << 24 | imm8 << 8,
            _ => imm8 * 0x0101_0101,
        }
    } else {
        (0x80 | imm12 & 0x7f).rotate_right(imm12 >> 7)
    }
}

fn wide(word: u32, address: u64, mode: Mode, cond: ArmCc) -> Result<Decoded, DecodeError> {
    let hw1 = word >> 16;
    let hw2 = word & 0xffff;
    let op2 = field(hw1, 4, 7);
    match field(hw1, 11, 2) {
        0b01 if op2 & 0b1100100 == 0 => load_store_multiple(hw1, hw2),
        0b01 if op2 & 0b1100100 == 0b0000100 => dual_exclusive(hw1, hw2),
        0b01 if op2 & 0b1100000 == 0b0100000 => shifted_register(hw1, hw2),
        0b01 => coprocessor(word, mode, cond),
        0b10 if bit(hw2, 15) => branch_misc(hw1, hw2, address, mode),
        0b10 if !bit(hw1, 9) => modified_immediate(hw1, hw2),
        0b10 => plain_immediate(hw1, hw2),
        _ if op2 & 0b1110001 == 0b0010000 => simd::element(0xf400_0000 | word & 0x00ff_ffff),
        _ if op2 & 0b1110001 == 0 => load_store_single(hw1, hw2),
        _ if op2 & 0b1100001 == 0b0000001 => load_store_single(hw1, hw2),
        _ if op2 & 0b1110000 == 0b0100000 => register_ops(hw1, hw2),
        _ if op2 & 0b1111000 == 0b0110000 => multiply(hw1, hw2),
        _ if op2 & 0b1111000 == 0b0111000 => long_multiply(hw1, hw2),
        _ => coprocessor(word, mode, cond),
    }
}

/// Rewrites a T32 coprocessor or Advanced SIMD encoding into its A32 form.
fn coprocessor(word: u32, mode: Mode, cond: ArmCc) -> Result<Decoded, DecodeError> {
    if word >> 24 & 0xef == 0xef {
        let unsigned = (word >> 28) & 1;
        return simd::neon(0xf200_0000 | unsigned << 24 | word & 0x00ff_ffff);
    }
    if word >> 28 != 0xe {
        return Err(DecodeError::InvalidEncoding);
    }
    let cond = match cond {
        ArmCc::Al => 0xe,
        cc => cc as u32,
    };
    a32::coprocessor(cond << 28 | word & 0x0fff_ffff, mode)
}

fn load_store_multiple(hw1: u32, hw2: u32) -> Result<Decoded, DecodeError> {
    let rn = core_reg(field(hw1, 0, 4));
    let load = bit(hw1, 4);
    let writeback = bit(hw1, 5);
    let list = reg_list(hw2);
    let decoded = match field(hw1, 7, 2) {
        0b01 if load && writeback && rn == ArmReg::Sp => {
            Decoded::new(I::Pop, vec![Op::List(list)]).suffix(".w")
        }
        0b10 if !load && writeback && rn == ArmReg::Sp => {
            Decoded::new(I::Push, vec![Op::List(list)]).suffix(".w")
        }
        op @ (0b01 | 0b10) => {
            let base = if writeback { Op::RegWb(rn) } else { Op::Reg(rn) };
            let (insn, suffix) = match (op, load) {
                (0b01, true) => (I::Ldm, ".w"),
                (0b01, false) => (I::Stm, ".w"),
                (_, true) => (I::Ldmdb, ""),
                (_, false) => (I::Stmdb, ""),
            };
            Decoded::new(insn, vec![base, Op::List(list)]).suffix(suffix)
        }
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

fn dual_exclusive(hw1: u32, hw2: u32) -> Result<Decoded, DecodeError> {
    let rn = core_reg(field(hw1, 0, 4));
    let rt = core_reg(field(hw2, 12, 4));
    let imm8 = field(hw2, 0, 8) << 2;
    let (op1, op2) = (field(hw1, 7, 2), field(hw1, 4, 2));
    let decoded = match (op1, op2) {
        (0b00, 0b00) => Decoded::new(
            I::Strex,
            vec![
                Op::Reg(core_reg(field(hw2, 8, 4))),
                Op::Reg(rt),
                mem(rn, imm_offset(imm8)),
            ],
        ),
        (0b00, 0b01) => Decoded::new(I::Ldrex, vec![Op::Reg(rt), mem(rn, imm_offset(imm8))]),
        (0b01, 0b01) if field(hw2, 5, 11) == 0b1111_0000_000 => {
            let rm = core_reg(field(hw2, 0, 4));
            if bit(hw2, 4) {
                let offset = Offset::Reg {
                    reg: rm,
                    subtract: false,
                    shift: Some((ArmShift::Lsl, 1)),
                };
                Decoded::new(I::Tbh, vec![mem(rn, offset)])
            } else {
                Decoded::new(I::Tbb, vec![mem(rn, reg_offset(rm))])
            }
        }
        _ if op1 & 0b10 != 0 || op2 & 0b10 != 0 => {
            let insn = if bit(hw1, 4) { I::Ldrd } else { I::Strd };
            let offset = Offset::Imm {
                value: imm8,
                subtract: !bit(hw1, 7),
            };
            let indexing = match (bit(hw1, 8), bit(hw1, 5)) {
                (false, _) => Indexing::Post,
                (true, true) => Indexing::Pre,
                (true, false) => Indexing::Offset,
            };
            Decoded::new(
                insn,
                vec![
                    Op::Reg(rt),
                    Op::Reg(core_reg(field(hw2, 8, 4))),
                    Op::Mem(Mem {
                        base: rn,
                        offset,
                        indexing,
                    }),
                ],
            )
        }
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

/// Data-processing operations whose 16-bit forms also exist take a `.w` qualifier.
fn narrowable(insn: I) -> bool {
    !matches!(insn, I::Orn | I::Teq | I::Rsc)
}

/// Maps the T32 data-processing opcode onto the shared builder, handling the `orn`/`mvn`
/// and compare aliases that the A32 numbering does not have.
fn wide_data_processing(
    op: u32,
    s: bool,
    rd: u32,
    rn: u32,
    operand: Op,
) -> Result<Decoded, DecodeError> {
    let (rd_reg, rn_reg) = (core_reg(rd), core_reg(rn));
    let compare = rd == 0xf && s;
    let decoded = match op {
        0b0000 if compare => data_processing(8, true, rd_reg, rn_reg, operand),
        0b0000 => data_processing(0, s, rd_reg, rn_reg, operand),
        0b0001 => data_processing(14, s, rd_reg, rn_reg, operand),
        0b0010 if rn == 0xf => data_processing(13, s, rd_reg, rn_reg, operand),
        0b0010 => data_processing(12, s, rd_reg, rn_reg, operand),
        0b0011 if rn == 0xf => data_processing(15, s, rd_reg, rn_reg, operand),
        0b0011 => Decoded::new(I::Orn, vec![Op::Reg(rd_reg), Op::Reg(rn_reg), operand]).s(s),
        0b0100 if compare => data_processing(9, true, rd_reg, rn_reg, operand),
        0b0100 => data_processing(1, s, rd_reg, rn_reg, operand),
        0b1000 if compare => data_processing(11, true, rd_reg, rn_reg, operand),
        0b1000 => data_processing(4, s, rd_reg, rn_reg, operand),
        0b1010 => data_processing(5, s, rd_reg, rn_reg, operand),
        0b1011 => data_processing(6, s, rd_reg, rn_reg, operand),
        0b1101 if compare => data_processing(10, true, rd_reg, rn_reg, operand),
        0b1101 => data_processing(2, s, rd_reg, rn_reg, operand),
        0b1110 => data_processing(3, s, rd_reg, rn_reg, operand),
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(if narrowable(decoded.insn) {
        decoded.suffix(".w")
    } else {
        decoded
    })
}

fn shifted_register(hw1: u32, hw2: u32) -> Result<Decoded, DecodeError> {
    let imm5 = field(hw2, 12, 3) << 2 | field(hw2, 6, 2);
    let operand = imm_shift(core_reg(field(hw2, 0, 4)), field(hw2, 4, 2), imm5);
    wide_data_processing(
        field(hw1, 5, 4),
        bit(hw1, 4),
        field(hw2, 8, 4),
        field(hw1, 0, 4),
        operand,
    )
}

fn modified_immediate(hw1: u32, hw2: u32) -> Result<Decoded, DecodeError> {
    let imm12 = field(hw1, 10, 1) << 11 | field(hw2, 12, 3) << 8 | field(hw2, 0, 8);
    wide_data_processing(
        field(hw1, 5, 4),
        bit(hw1, 4),
        field(hw2, 8, 4),
        field(hw1, 0, 4),
        Op::Imm(expand_imm(imm12) as i64),
    )
}

fn plain_immediate(hw1: u32, hw2: u32) -> Result<Decoded, DecodeError> {
    let rd = core_reg(field(hw2, 8, 4));
    let rn = field(hw1, 0, 4);
    let imm12 = field(hw1, 10, 1) << 11 | field(hw2, 12, 3) << 8 | field(hw2, 0, 8);
    let lsb = field(hw2, 12, 3) << 2 | field(hw2, 6, 2);
    let decoded = match field(hw1, 4, 5) {
        0b00000 if rn == 0xf => Decoded::new(I::Adr, vec![Op::Reg(rd), Op::Imm(imm12 as i64)])
            .suffix(".w"),
        0b00000 => Decoded::new(
            I::Addw,
            vec![Op::Reg(rd), Op::Reg(core_reg(rn)), Op::Imm(imm12 as i64)],
        ),
        0b01010 if rn == 0xf => Decoded::new(
            I::Adr,
            vec![Op::Reg(rd), Op::Imm(-(imm12 as i64))],
        )
        .suffix(".w"),
        0b01010 => Decoded::new(
            I::Subw,
            vec![Op::Reg(rd), Op::Reg(core_reg(rn)), Op::Imm(imm12 as i64)],
        ),
        op @ (0b00100 | 0b01100) => {
            let imm16 = rn << 12 | imm12;
            let insn = if op == 0b00100 { I::Movw } else { I::Movt };
            Decoded::new(insn, vec![Op::Reg(rd), Op::Imm(imm16 as i64)])
        }
        0b10100 | 0b11100 => {
            let insn = if bit(hw1, 7) { I::Ubfx } else { I::Sbfx };
            let width = field(hw2, 0, 5) + 1;
            Decoded::new(
                insn,
                vec![
                    Op::Reg(rd),
                    Op::Reg(core_reg(rn)),
                    Op::Imm(lsb as i64),
                    Op::Imm(width as i64),
                ],
            )
        }
        0b10110 => {
            let msb = field(hw2, 0, 5);
            if msb < lsb {
                return Err(DecodeError::InvalidEncoding);
            }
            let width = Op::Imm((msb - lsb + 1) as i64);
            if rn == 0xf {
                Decoded::new(I::Bfc, vec![Op::Reg(rd), Op::Imm(lsb as i64), width])
            } else {
                Decoded::new(
                    I::Bfi,
                    vec![Op::Reg(rd), Op::Reg(core_reg(rn)), Op::Imm(lsb as i64), width],
                )
            }
        }
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

fn branch_misc(hw1: u32, hw2: u32, address: u64, mode: Mode) -> Result<Decoded, DecodeError> {
    let s = field(hw1, 10, 1);
    let (j1, j2) = (field(hw2, 13, 1), field(hw2, 11, 1));
    let op = field(hw1, 4, 7);
    match field(hw2, 12, 3) & 0b101 {
        0b000 if op & 0b0111000 != 0b0111000 => {
            let imm = s << 20 | j2 << 19 | j1 << 18 | field(hw1, 0, 6) << 12 | field(hw2, 0, 11) << 1;
            let offset = sign_extend(imm as u64, 21);
            Ok(Decoded::new(I::B, vec![target(address, offset)])
                .cc(ArmCc::from_bits(field(hw1, 6, 4)))
                .suffix(".w"))
        }
        0b000 => control(hw1, hw2, mode),
        kind => {
            let (i1, i2) = (!(j1 ^ s) & 1, !(j2 ^ s) & 1);
            let imm = s << 24 | i1 << 23 | i2 << 22 | field(hw1, 0, 10) << 12 | field(hw2, 0, 11) << 1;
            let offset = sign_extend(imm as u64, 25);
            let decoded = match kind {
                0b001 => Decoded::new(I::B, vec![target(address, offset)]).suffix(".w"),
                0b101 => Decoded::new(I::Bl, vec![target(address, offset)]),
                _ => {
                    if bit(hw2, 0) {
                        return Err(DecodeError::InvalidEncoding);
                    }
                    let base = (address as i64 + 4) & !3;
                    let dest = base.wrapping_add(offset) as u64 & 0xffff_ffff;
                    Decoded::new(I::Blx, vec![Op::Target(dest)]).feature(G::V5t)
                }
            };
            Ok(decoded)
        }
    }
}

/// Special-register moves, hints, barriers and `bxj`.
fn control(hw1: u32, hw2: u32, mode: Mode) -> Result<Decoded, DecodeError> {
    let mclass = mode.contains(Mode::MCLASS);
    let sysreg = |sysm: u32| -> Result<String, DecodeError> {
        mclass_sysreg(sysm)
            .map(str::to_string)
            .ok_or(DecodeError::InvalidEncoding)
    };
    let decoded = match field(hw1, 4, 7) {
        0b0111000 | 0b0111001 => {
            let rn = Op::Reg(core_reg(field(hw1, 0, 4)));
            let target = if mclass {
                sysreg(field(hw2, 0, 8))?
            } else {
                psr_fields(bit(hw1, 4), field(hw2, 8, 4))
            };
            Decoded::new(I::Msr, vec![Op::Sym(target), rn])
        }
        0b0111010 if field(hw2, 8, 3) == 0 => a32::hint(field(hw2, 0, 8))?.suffix(".w"),
        0b0111010 => a32::cps(field(hw2, 9, 2), field(hw2, 5, 3))?,
        0b0111011 => a32::barrier(field(hw2, 4, 4), field(hw2, 0, 4))?,
        0b0111100 => Decoded::new(I::Bxj, vec![Op::Reg(core_reg(field(hw1, 0, 4)))]),
        0b0111110 | 0b0111111 => {
            let rd = Op::Reg(core_reg(field(hw2, 8, 4)));
            if mclass {
                Decoded::new(I::Mrs, vec![rd, Op::Sym(sysreg(field(hw2, 0, 8))?)])
                    .feature(G::Mclass)
            } else {
                let psr = if bit(hw1, 4) { ArmReg::Spsr } else { ArmReg::Apsr };
                Decoded::new(I::Mrs, vec![rd, Op::Reg(psr)])
            }
        }
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

fn load_store_single(hw1: u32, hw2: u32) -> Result<Decoded, DecodeError> {
    let load = bit(hw1, 4);
    let signed = bit(hw1, 8);
    let insn = match (load, field(hw1, 5, 2), signed) {
        (false, 0, false) => I::Strb,
        (false, 1, false) => I::Strh,
        (false, 2, false) => I::Str,
        (true, 0, false) => I::Ldrb,
        (true, 1, false) => I::Ldrh,
        (true, 2, false) => I::Ldr,
        (true, 0, true) => I::Ldrsb,
        (true, 1, true) => I::Ldrsh,
        _ => return Err(DecodeError::InvalidEncoding),
    };
    let rn = core_reg(field(hw1, 0, 4));
    let rt = Op::Reg(core_reg(field(hw2, 12, 4)));
    if load && field(hw2, 12, 4) == 0xf && insn != I::Ldr {
        return Err(DecodeError::InvalidEncoding);
    }
    if rn == ArmReg::Pc {
        if !load {
            return Err(DecodeError::InvalidEncoding);
        }
        let offset = Offset::Imm {
            value: field(hw2, 0, 12),
            subtract: !bit(hw1, 7),
        };
        return Ok(Decoded::new(insn, vec![rt, mem(rn, offset)]).suffix(".w"));
    }
    if bit(hw1, 7) {
        let offset = imm_offset(field(hw2, 0, 12));
        return Ok(Decoded::new(insn, vec![rt, mem(rn, offset)]).suffix(".w"));
    }
    if bit(hw2, 11) {
        let (pre, up, writeback) = (bit(hw2, 10), bit(hw2, 9), bit(hw2, 8));
        let indexing = match (pre, writeback) {
            (false, true) => Indexing::Post,
            (true, true) => Indexing::Pre,
            (true, false) => Indexing::Offset,
            (false, false) => return Err(DecodeError::InvalidEncoding),
        };
        if pre && up && !writeback {
            // unprivileged ldrt/strt forms
            return Err(DecodeError::InvalidEncoding);
        }
        let offset = Offset::Imm {
            value: field(hw2, 0, 8),
            subtract: !up,
        };
        return Ok(Decoded::new(
            insn,
            vec![
                rt,
                Op::Mem(Mem {
                    base: rn,
                    offset,
                    indexing,
                }),
            ],
        ));
    }
    if field(hw2, 6, 6) != 0 {
        return Err(DecodeError::InvalidEncoding);
    }
    let amount = field(hw2, 4, 2);
    let offset = Offset::Reg {
        reg: core_reg(field(hw2, 0, 4)),
        subtract: false,
        shift: (amount != 0).then_some((ArmShift::Lsl, amount)),
    };
    Ok(Decoded::new(insn, vec![rt, mem(rn, offset)]).suffix(".w"))
}

/// Register-controlled shifts, extends and the miscellaneous reverse/count operations.
fn register_ops(hw1: u32, hw2: u32) -> Result<Decoded, DecodeError> {
    if field(hw2, 12, 4) != 0xf {
        return Err(DecodeError::InvalidEncoding);
    }
    let rd = core_reg(field(hw2, 8, 4));
    let rm = core_reg(field(hw2, 0, 4));
    let rn = field(hw1, 0, 4);
    let (op1, op2) = (field(hw1, 4, 4), field(hw2, 4, 4));
    let decoded = if op1 & 0b1000 == 0 && op2 == 0 {
        let insn = ArmShift::BY_TYPE[field(hw1, 5, 2) as usize].insn();
        Decoded::new(insn, vec![Op::Reg(rd), Op::Reg(core_reg(rn)), Op::Reg(rm)])
            .s(bit(hw1, 4))
            .suffix(".w")
    } else if op1 & 0b1000 == 0 && op2 & 0b1000 != 0 {
        let (insn, accumulate) = match field(hw1, 4, 3) {
            0b000 => (I::Sxth, I::Sxtah),
            0b001 => (I::Uxth, I::Uxtah),
            0b010 => (I::Sxtb16, I::Sxtab16),
            0b011 => (I::Uxtb16, I::Uxtab16),
            0b100 => (I::Sxtb, I::Sxtab),
            0b101 => (I::Uxtb, I::Uxtab),
            _ => return Err(DecodeError::InvalidEncoding),
        };
        let decoded = a32::extend(insn, accumulate, rd, rn, rm, field(hw2, 4, 2));
        if rn == 0xf && matches!(insn, I::Sxth | I::Uxth | I::Sxtb | I::Uxtb) {
            decoded.suffix(".w")
        } else {
            decoded
        }
    } else if op1 & 0b1100 == 0b1000 && op2 & 0b1100 == 0b1000 {
        let (insn, suffix) = match (field(hw1, 4, 2), field(hw2, 4, 2)) {
            (0b01, 0b00) => (I::Rev, ".w"),
            (0b01, 0b01) => (I::Rev16, ".w"),
            (0b01, 0b10) => (I::Rbit, ""),
            (0b01, 0b11) => (I::Revsh, ".w"),
            (0b11, 0b00) => (I::Clz, ""),
            _ => return Err(DecodeError::InvalidEncoding),
        };
        Decoded::new(insn, vec![Op::Reg(rd), Op::Reg(rm)]).suffix(suffix)
    } else {
        return Err(DecodeError::InvalidEncoding);
    };
    Ok(decoded)
}

fn multiply(hw1: u32, hw2: u32) -> Result<Decoded, DecodeError> {
    let rn = Op::Reg(core_reg(field(hw1, 0, 4)));
    let ra = field(hw2, 12, 4);
    let rd = Op::Reg(core_reg(field(hw2, 8, 4)));
    let rm = Op::Reg(core_reg(field(hw2, 0, 4)));
    let decoded = match (field(hw1, 4, 3), field(hw2, 4, 2)) {
        (0b000, 0b00) if ra == 0xf => Decoded::new(I::Mul, vec![rd, rn, rm]),
        (0b000, 0b00) => Decoded::new(I::Mla, vec![rd, rn, rm, Op::Reg(core_reg(ra))]),
        (0b000, 0b01) => Decoded::new(I::Mls, vec![rd, rn, rm, Op::Reg(core_reg(ra))]),
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

fn long_multiply(hw1: u32, hw2: u32) -> Result<Decoded, DecodeError> {
    let rn = Op::Reg(core_reg(field(hw1, 0, 4)));
    let rm = Op::Reg(core_reg(field(hw2, 0, 4)));
    let lo = Op::Reg(core_reg(field(hw2, 12, 4)));
    let hi = Op::Reg(core_reg(field(hw2, 8, 4)));
    let decoded = match (field(hw1, 4, 3), field(hw2, 4, 4)) {
        (0b000, 0b0000) => Decoded::new(I::Smull, vec![lo, hi, rn, rm]),
        (0b010, 0b0000) => Decoded::new(I::Umull, vec![lo, hi, rn, rm]),
        (0b100, 0b0000) => Decoded::new(I::Smlal, vec![lo, hi, rn, rm]),
        (0b110, 0b0000) => Decoded::new(I::Umlal, vec![lo, hi, rn, rm]),
        (0b001, 0b1111) => Decoded::new(I::Sdiv, vec![hi, rn, rm]).feature(G::Divide),
        (0b011, 0b1111) => Decoded::new(I::Udiv, vec![hi, rn, rm]).feature(G::Divide),
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Endian;
    use rstest::rstest;

    fn text(code: &[u8], mode: Mode) -> String {
        let mut cursor = Cursor::new(code, Endian::Little);
        let d = decode(&mut cursor, 0x1000, mode, &mut ItBlock::default()).unwrap();
        let (m, o) = super::super::render(&d, crate::Syntax::Default);
        format!("{} {}", m, o).trim_end().to_string()
    }

    #[rstest]
    #[case(&[0x01, 0x20], "movs r0, #1")]
    #[case(&[0x88, 0x18], "adds r0, r1, r2")]
    #[case(&[0x10, 0xb5], "push {r4, lr}")]
    #[case(&[0x10, 0xbd], "pop {r4, pc}")]
    #[case(&[0x02, 0x49], "ldr r1, [pc, #8]")]
    #[case(&[0x00, 0xbf], "nop")]
    #[case(&[0xfe, 0xe7], "b #0x1000")]
    #[case(&[0x48, 0x43], "muls r0, r1, r0")]
    #[case(&[0x08, 0xb1], "cbz r0, #0x1006")]
    #[case(&[0x00, 0xf0, 0x00, 0xf8], "bl #0x1004")]
    #[case(&[0x01, 0xeb, 0x82, 0x00], "add.w r0, r1, r2, lsl #2")]
    #[case(&[0x91, 0xfb, 0xf2, 0xf0], "sdiv r0, r1, r2")]
    #[case(&[0xd1, 0xf8, 0x00, 0x01], "ldr.w r0, [r1, #0x100]")]
    #[case(&[0xbf, 0xf3, 0x5f, 0x8f], "dmb sy")]
    #[case(&[0x2d, 0xe9, 0xf0, 0x41], "push.w {r4, r5, r6, r7, r8, lr}")]
    fn test_thumb_forms(#[case] code: &[u8], #[case] expected: &str) {
        assert_eq!(text(code, Mode::THUMB), expected);
    }

    #[test]
    fn test_expand_imm() {
        assert_eq!(expand_imm(0x0ab), 0xab);
        assert_eq!(expand_imm(0x1ab), 0x00ab_00ab);
        assert_eq!(expand_imm(0x3ab), 0xabab_abab);
        assert_eq!(expand_imm(0x4ff), 0x7f80_0000);
    }

    #[test]
    fn test_flags_inside_it_block() {
        let mut block = ItBlock::open(0, 0b1000);
        let mut cursor = Cursor::new(&[0x01, 0x20], Endian::Little);
        let d = decode(&mut cursor, 0, Mode::THUMB, &mut block).unwrap();
        let (m, _) = super::super::render(&d, crate::Syntax::Default);
        assert_eq!(m, "moveq");
    }

    #[test]
    fn test_truncated_wide_instruction() {
        let mut cursor = Cursor::new(&[0x4f, 0xf0], Endian::Little);
        assert!(matches!(
            decode(&mut cursor, 0, Mode::THUMB, &mut ItBlock::default()),
            Err(DecodeError::TruncatedInstruction(_))
        ));
    }
}
