//! Operand decoding. Every instruction is an optional 6809 page prefix, the opcode, and the
//! operand bytes its addressing mode calls for.

use super::tables::{self, Entry, Mode};
use super::{Cpu, Decoded, Index, Op, M680xReg as R};
use crate::arch::sign_extend;
use crate::cursor::{Cursor, Endian};
use crate::decoder::DecodeError;

fn lookup(table: &[Entry], opcode: u8) -> Option<Entry> {
    table.iter().find(|entry| entry.0 == opcode).copied()
}

fn entry(cursor: &mut Cursor<'_>, cpu: Cpu) -> Result<Entry, DecodeError> {
    let opcode = cursor.read_u8()?;
    let found = match cpu {
        Cpu::M6800 => lookup(tables::M6800, opcode),
        Cpu::M6801 => lookup(tables::M6801, opcode).or_else(|| lookup(tables::M6800, opcode)),
        Cpu::Hd6301 => lookup(tables::HD6301, opcode)
            .or_else(|| lookup(tables::M6801, opcode))
            .or_else(|| lookup(tables::M6800, opcode)),
        Cpu::M6809 => match opcode {
            0x10 => lookup(tables::M6809_PAGE2, cursor.read_u8()?),
            0x11 => lookup(tables::M6809_PAGE3, cursor.read_u8()?),
            _ => lookup(tables::M6809, opcode),
        },
    };
    found.ok_or(DecodeError::InvalidEncoding)
}

/// `exg`/`tfr` register nibble.
fn pair_register(nibble: u8) -> Option<R> {
    Some(match nibble {
        0 => R::D,
        1 => R::X,
        2 => R::Y,
        3 => R::U,
        4 => R::S,
        5 => R::Pc,
        8 => R::A,
        9 => R::B,
        10 => R::Cc,
        11 => R::Dp,
        _ => return None,
    })
}

fn is_wide(reg: R) -> bool {
    matches!(reg, R::D | R::X | R::Y | R::U | R::S | R::Pc)
}

/// Push/pull mask, highest bit first; bit 6 names the other stack.
fn register_list(mask: u8, other: R) -> Vec<Op> {
    let order = [R::Pc, other, R::Y, R::X, R::Dp, R::B, R::A, R::Cc];
    order
        .iter()
        .enumerate()
        .filter(|(bit, _)| mask & (0x80 >> bit) != 0)
        .map(|(_, &reg)| Op::Reg(reg))
        .collect()
}

fn index_register(bits: u8) -> R {
    match bits & 3 {
        0 => R::X,
        1 => R::Y,
        2 => R::U,
        _ => R::S,
    }
}

/// 6809 indexed postbyte and its extension bytes.
fn postbyte(cursor: &mut Cursor<'_>, address: u64) -> Result<Op, DecodeError> {
    let post = cursor.read_u8()?;
    let base = index_register(post >> 5);
    let mut ix = Index::new(base);

    if post & 0x80 == 0 {
        ix.offset = sign_extend((post & 0x1f) as u64, 5) as i32;
        ix.bits = 5;
        return Ok(Op::Indexed(ix));
    }

    ix.indirect = post & 0x10 != 0;
    match post & 0x0f {
        0x0 | 0x2 if ix.indirect => return Err(DecodeError::InvalidEncoding),
        0x0 => ix.inc_dec = 1,
        0x1 => ix.inc_dec = 2,
        0x2 => ix.inc_dec = -1,
        0x3 => ix.inc_dec = -2,
        0x4 => {}
        0x5 => ix.offset_reg = R::B,
        0x6 => ix.offset_reg = R::A,
        0xb => ix.offset_reg = R::D,
        0x8 => {
            ix.offset = cursor.read_i8()? as i32;
            ix.bits = 8;
        }
        0x9 => {
            ix.offset = cursor.read_u16_with(Endian::Big)? as i16 as i32;
            ix.bits = 16;
        }
        0xc | 0xd => {
            ix.base = R::Pc;
            if post & 0x0f == 0xc {
                ix.offset = cursor.read_i8()? as i32;
                ix.bits = 8;
            } else {
                ix.offset = cursor.read_u16_with(Endian::Big)? as i16 as i32;
                ix.bits = 16;
            }
            let next = address.wrapping_add(cursor.position() as u64);
            ix.target = next.wrapping_add(ix.offset as i64 as u64) as u16;
        }
        0xf if post == 0x9f => return Ok(Op::Indirect(cursor.read_u16_with(Endian::Big)?)),
        _ => return Err(DecodeError::InvalidEncoding),
    }
    Ok(Op::Indexed(ix))
}

/// 6800-family `n,x`: an unsigned byte offset from `x`.
fn byte_offset(cursor: &mut Cursor<'_>) -> Result<Op, DecodeError> {
    let mut ix = Index::new(R::X);
    ix.offset = cursor.read_u8()? as i32;
    ix.bits = 8;
    Ok(Op::Indexed(ix))
}

fn relative(cursor: &mut Cursor<'_>, address: u64, wide: bool) -> Result<Op, DecodeError> {
    let offset = if wide {
        cursor.read_u16_with(Endian::Big)? as i16
    } else {
        cursor.read_i8()? as i16
    };
    let next = address.wrapping_add(cursor.position() as u64);
    Ok(Op::Relative {
        target: next.wrapping_add(offset as i64 as u64) as u16,
        offset,
    })
}

pub(super) fn decode(
    cursor: &mut Cursor<'_>,
    address: u64,
    cpu: Cpu,
) -> Result<Decoded, DecodeError> {
    let (_, insn, mode, fx) = entry(cursor, cpu)?;
    let ops = match mode {
        Mode::Inh => Vec::new(),
        Mode::Imm8 => vec![Op::Imm(cursor.read_u8()? as i32)],
        Mode::Imm16 => vec![Op::Imm(cursor.read_u16_with(Endian::Big)? as i32)],
        Mode::Dir => vec![Op::Direct(cursor.read_u8()?)],
        Mode::Ext => vec![Op::Extended(cursor.read_u16_with(Endian::Big)?)],
        Mode::Idx if cpu == Cpu::M6809 => vec![postbyte(cursor, address)?],
        Mode::Idx => vec![byte_offset(cursor)?],
        Mode::Rel8 => vec![relative(cursor, address, false)?],
        Mode::Rel16 => vec![relative(cursor, address, true)?],
        Mode::Pair => {
            let post = cursor.read_u8()?;
            let (from, to) = pair_register(post >> 4)
                .zip(pair_register(post & 15))
                .ok_or(DecodeError::InvalidEncoding)?;
            if is_wide(from) != is_wide(to) {
                return Err(DecodeError::InvalidEncoding);
            }
            vec![Op::Reg(from), Op::Reg(to)]
        }
        Mode::List(other) => register_list(cursor.read_u8()?, other),
        Mode::ImmDir => {
            let mask = cursor.read_u8()? as i32;
            vec![Op::Imm(mask), Op::Direct(cursor.read_u8()?)]
        }
        Mode::ImmIdx => {
            let mask = cursor.read_u8()? as i32;
            vec![Op::Imm(mask), byte_offset(cursor)?]
        }
    };
    Ok(Decoded { insn, mode, fx, ops })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::m680x::M680xInsn as I;

    fn one(bytes: &[u8], cpu: Cpu) -> Result<Decoded, DecodeError> {
        decode(&mut Cursor::new(bytes, Endian::Big), 0x1000, cpu)
    }

    #[test]
    fn test_register_list_order() {
        let ops = register_list(0x55, R::U);
        assert_eq!(ops, [Op::Reg(R::U), Op::Reg(R::X), Op::Reg(R::B), Op::Reg(R::Cc)]);
        assert!(register_list(0, R::S).is_empty());
    }

    #[test]
    fn test_postbyte_modes() {
        let d = one(&[0xa6, 0x1f], Cpu::M6809).unwrap();
        let Op::Indexed(ix) = d.ops[0] else {
            panic!("expected an indexed operand");
        };
        assert_eq!((ix.base, ix.offset, ix.bits), (R::X, -1, 5));

        let d = one(&[0xa6, 0xe5], Cpu::M6809).unwrap();
        let Op::Indexed(ix) = d.ops[0] else {
            panic!("expected an indexed operand");
        };
        assert_eq!((ix.base, ix.offset_reg), (R::S, R::B));

        // ,x+ has no indirect form
        assert_eq!(one(&[0xa6, 0x90], Cpu::M6809), Err(DecodeError::InvalidEncoding));
    }

    #[test]
    fn test_cpu_maps() {
        // ldd #$1234 exists from the 6801 on
        assert_eq!(one(&[0xcc, 0x12, 0x34], Cpu::M6800), Err(DecodeError::InvalidEncoding));
        assert_eq!(one(&[0xcc, 0x12, 0x34], Cpu::M6801).unwrap().insn, I::Ldd);
        // xgdx is Hitachi only
        assert_eq!(one(&[0x18], Cpu::M6801), Err(DecodeError::InvalidEncoding));
        assert_eq!(one(&[0x18], Cpu::Hd6301).unwrap().insn, I::Xgdx);
        assert_eq!(one(&[0x86, 0x01], Cpu::M6800).unwrap().insn, I::Ldaa);
        assert_eq!(one(&[0x86, 0x01], Cpu::M6809).unwrap().insn, I::Lda);
    }

    #[test]
    fn test_pair_width_mismatch() {
        // tfr a, x
        assert_eq!(one(&[0x1f, 0x81], Cpu::M6809), Err(DecodeError::InvalidEncoding));
        assert_eq!(one(&[0x1f, 0x89], Cpu::M6809).unwrap().ops, [Op::Reg(R::A), Op::Reg(R::B)]);
    }
}
