//! microMIPS: mixed 16- and 32-bit instructions built from halfwords.

use super::{gpr, Decoded, MipsInsn as I, MipsReg, Op};
use crate::arch::{sign_extend, Mode};
use crate::cursor::Cursor;
use crate::decoder::DecodeError;

/// Registers reachable from the 3-bit fields of the compact encodings.
const COMPACT_REGS: [u32; 8] = [16, 17, 2, 3, 4, 5, 6, 7];

fn reg(n: u32) -> Op {
    Op::Reg(gpr(n))
}

fn compact(n: u32) -> Op {
    reg(COMPACT_REGS[(n & 7) as usize])
}

pub(super) fn decode(
    cursor: &mut Cursor<'_>,
    address: u64,
    mode: Mode,
) -> Result<Decoded, DecodeError> {
    let first = cursor.read_u16_with(mode.endian())?;
    let major = (first >> 10) as u32;
    if matches!(major & 7, 1..=3) {
        return decode16(first as u32, major, address);
    }
    let second = cursor.read_u16_with(mode.endian())?;
    decode32(((first as u32) << 16) | second as u32, major, address)
}

fn decode16(hw: u32, major: u32, address: u64) -> Result<Decoded, DecodeError> {
    let decoded = match major {
        0x03 if hw == 0x0c00 => Decoded::new(I::Nop, Vec::new()),
        0x03 => Decoded::new(I::Move, vec![reg((hw >> 5) & 31), reg(hw & 31)]),
        0x3b => {
            let imm = match hw & 0x7f {
                0x7f => -1,
                v => v as i64,
            };
            Decoded::new(I::Li, vec![compact(hw >> 7), Op::Imm(imm)])
        }
        0x23 | 0x2b => {
            let offset = sign_extend((hw & 0x7f) as u64, 7) << 1;
            let insn = if major == 0x23 { I::Beqz } else { I::Bnez };
            Decoded::new(
                insn,
                vec![compact(hw >> 7), Op::Target(address.wrapping_add(2).wrapping_add(offset as u64))],
            )
        }
        0x33 => {
            let offset = sign_extend((hw & 0x3ff) as u64, 10) << 1;
            Decoded::new(
                I::B,
                vec![Op::Target(address.wrapping_add(2).wrapping_add(offset as u64))],
            )
        }
        0x11 => {
            let insn = match (hw >> 5) & 31 {
                0x0c => I::Jr,
                0x0d => I::Jrc,
                0x0e => I::Jalr,
                _ => return Err(DecodeError::InvalidEncoding),
            };
            Decoded::new(insn, vec![reg(hw & 31)])
        }
        0x12 | 0x32 => {
            let insn = if major == 0x12 { I::Lw } else { I::Sw };
            Decoded::new(
                insn,
                vec![reg((hw >> 5) & 31), Op::Mem(MipsReg::Sp, ((hw & 31) << 2) as i64)],
            )
        }
        0x13 if hw & 1 == 0 => {
            let rd = (hw >> 5) & 31;
            let imm = sign_extend(((hw >> 1) & 0xf) as u64, 4);
            Decoded::new(I::Addiu, vec![reg(rd), reg(rd), Op::Imm(imm)])
        }
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

fn decode32(word: u32, major: u32, address: u64) -> Result<Decoded, DecodeError> {
    // Field names follow the compact layout: rt sits above rs.
    let rt = (word >> 21) & 31;
    let rs = (word >> 16) & 31;
    let imm = word & 0xffff;
    let simm = sign_extend(imm as u64, 16);
    let mem = Op::Mem(gpr(rs), simm);
    let load_store = |insn| Decoded::new(insn, vec![reg(rt), mem]);
    let signed = |insn| Decoded::new(insn, vec![reg(rt), reg(rs), Op::Imm(simm)]);
    let unsigned = |insn| Decoded::new(insn, vec![reg(rt), reg(rs), Op::Uimm(imm as u64)]);

    let decoded = match major {
        0x00 => pool32a(word)?,
        0x0c => signed(I::Addiu),
        0x14 => unsigned(I::Ori),
        0x1c => unsigned(I::Xori),
        0x34 => unsigned(I::Andi),
        0x24 => signed(I::Slti),
        0x2c => signed(I::Sltiu),
        0x07 => load_store(I::Lb),
        0x05 => load_store(I::Lbu),
        0x06 => load_store(I::Sb),
        0x0f => load_store(I::Lh),
        0x0d => load_store(I::Lhu),
        0x0e => load_store(I::Sh),
        0x3f => load_store(I::Lw),
        0x3e => load_store(I::Sw),
        0x10 if rt == 0x0d => Decoded::new(I::Lui, vec![reg(rs), Op::Uimm(imm as u64)]),
        0x25 | 0x2d => {
            let target = address.wrapping_add(4).wrapping_add((simm << 1) as u64);
            let insn = if major == 0x25 { I::Beq } else { I::Bne };
            Decoded::new(insn, vec![reg(rs), reg(rt), Op::Target(target)])
        }
        0x35 | 0x3d => {
            let target =
                (address.wrapping_add(4) & !0x07ff_ffff) | (((word & 0x03ff_ffff) as u64) << 1);
            let insn = if major == 0x35 { I::J } else { I::Jal };
            Decoded::new(insn, vec![Op::Target(target)])
        }
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

fn pool32a(word: u32) -> Result<Decoded, DecodeError> {
    let rt = (word >> 21) & 31;
    let rs = (word >> 16) & 31;
    let rd = (word >> 11) & 31;
    let code = Op::Uimm(((word >> 16) & 0x3ff) as u64);

    let decoded = match word & 0x3f {
        0x00 => {
            if word == 0 {
                return Ok(Decoded::new(I::Nop, Vec::new()));
            }
            let insn = match (word >> 6) & 0xf {
                0 => I::Sll,
                1 => I::Srl,
                2 => I::Sra,
                3 => I::Rotr,
                _ => return Err(DecodeError::InvalidEncoding),
            };
            Decoded::new(insn, vec![reg(rt), reg(rs), Op::Imm(rd as i64)])
        }
        0x07 => Decoded::new(I::Break, vec![code, Op::Uimm(((word >> 6) & 0x3ff) as u64)]),
        0x3c => match (word >> 6) & 0x3ff {
            0x03c if rt == 31 => Decoded::new(I::Jalr, vec![reg(rs)]),
            0x03c => Decoded::new(I::Jalr, vec![reg(rt), reg(rs)]),
            0x22d => Decoded::new(I::Syscall, vec![code]),
            0x24d => Decoded::new(I::Wait, vec![code]),
            0x3cd => Decoded::new(I::Eret, Vec::new()),
            _ => return Err(DecodeError::InvalidEncoding),
        },
        _ => {
            let three = |insn| Decoded::new(insn, vec![reg(rd), reg(rs), reg(rt)]);
            let variable = |insn| Decoded::new(insn, vec![reg(rd), reg(rt), reg(rs)]);
            match word & 0x3ff {
                0x110 => three(I::Add),
                0x150 => three(I::Addu),
                0x190 => three(I::Sub),
                0x1d0 => three(I::Subu),
                0x210 => three(I::Mul),
                0x250 => three(I::And),
                0x290 => three(I::Or),
                0x2d0 => three(I::Nor),
                0x310 => three(I::Xor),
                0x350 => three(I::Slt),
                0x390 => three(I::Sltu),
                0x010 => variable(I::Sllv),
                0x050 => variable(I::Srlv),
                0x090 => variable(I::Srav),
                0x0d0 => variable(I::Rotrv),
                _ => return Err(DecodeError::InvalidEncoding),
            }
        }
    };
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(bytes: &[u8], mode: Mode) -> (String, usize) {
        let mut cursor = Cursor::new(bytes, mode.endian());
        let d = decode(&mut cursor, 0x1000, mode).unwrap();
        let line = format!("{} {}", d.insn.name(), super::super::render(&d));
        (line.trim_end().to_string(), cursor.position())
    }

    #[test]
    fn test_compact_forms() {
        let le = Mode::MICRO;
        // move $v0, $a0
        assert_eq!(text(&[0x44, 0x0c], le), ("move $v0, $a0".into(), 2));
        assert_eq!(text(&[0x00, 0x0c], le), ("nop".into(), 2));
        // li $v0, -1
        assert_eq!(text(&[0x7f, 0xed], le), ("li $v0, -1".into(), 2));
        // jr $ra
        assert_eq!(text(&[0x9f, 0x45], le), ("jr $ra".into(), 2));
        // lw $ra, 4($sp)
        assert_eq!(text(&[0xe1, 0x4b], le), ("lw $ra, 4($sp)".into(), 2));
        // b 0x1000
        assert_eq!(text(&[0xff, 0xcf], le), ("b 0x1000".into(), 2));
    }

    #[test]
    fn test_wide_forms() {
        let be = Mode::MICRO | Mode::BIG_ENDIAN;
        // addiu $sp, $sp, -0x20
        assert_eq!(text(&[0x33, 0xbd, 0xff, 0xe0], be), ("addiu $sp, $sp, -0x20".into(), 4));
        // addu $v0, $a0, $a1
        assert_eq!(text(&[0x00, 0xa4, 0x11, 0x50], be), ("addu $v0, $a0, $a1".into(), 4));
        // lw $a0, 0x10($sp)
        assert_eq!(text(&[0xfc, 0x9d, 0x00, 0x10], be), ("lw $a0, 0x10($sp)".into(), 4));
        // jal 0x2000
        assert_eq!(text(&[0xf4, 0x00, 0x10, 0x00], be), ("jal 0x2000".into(), 4));
    }

    #[test]
    fn test_truncated_second_halfword() {
        let mut cursor = Cursor::new(&[0x33, 0xbd], crate::cursor::Endian::Big);
        assert!(matches!(
            decode(&mut cursor, 0, Mode::MICRO | Mode::BIG_ENDIAN),
            Err(DecodeError::TruncatedInstruction(_))
        ));
    }
}
