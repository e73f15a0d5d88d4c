//! XCore instruction formats.
//!
//! Short forms are one little-endian halfword whose top five bits select the format. Long
//! forms are a `0b11111` halfword carrying operands followed by an opcode halfword, and a
//! `pfix` halfword widens the immediate of the short form after it.

use super::{Decoded, Op, XCoreInsn as I, XCoreReg as R};
use crate::decoder::DecodeError;

/// Bit positions encoded in the 0..=11 immediate of `shl`, `shr`, `ashr`, `zext` and friends.
const BITP: [i64; 12] = [32, 1, 2, 3, 4, 5, 6, 7, 8, 16, 24, 32];

/// Layout of a three-operand encoding.
#[derive(Debug, Clone, Copy)]
enum Triple {
    /// `d, a, b`
    Regs,
    /// `d, b[i]`
    Indexed,
    /// `d, b[-i]`
    IndexedBack,
    /// `d, s, bitp`
    Bitp,
    /// `d, s, imm`
    Imm,
    /// `d, b[imm]`
    Offset,
    /// `d, b[-imm]`
    OffsetBack,
}

/// Layout of a two-operand encoding.
#[derive(Debug, Clone, Copy)]
enum Pair {
    /// `d, s`
    Regs,
    /// `d, res[s]`
    FromRes,
    /// `res[r], s`; the resource is the second encoded operand.
    ToRes,
    /// `d, bitp`
    Bitp,
    /// `d, imm`
    Imm,
    /// `res[r], imm`
    ResImm,
    /// `t[s]:<reg>, d`
    Thread(R),
    /// `d, ps[s]`
    GetPs,
    /// `ps[r], s`
    SetPs,
}

/// Layout of a one-register encoding.
#[derive(Debug, Clone, Copy)]
enum Single {
    Reg,
    Res,
    Thread,
    /// `<reg>, r`
    Into(R),
    /// `res[r], r11`
    ResR11,
}

/// How an immediate of a `u6`/`u10` field is printed.
#[derive(Debug, Clone, Copy)]
enum Tail {
    Plain,
    /// Backward branch or address, printed negated.
    Back,
    /// `base[imm]`
    Mem(R),
}

/// Three-operand short forms keyed by the 5-bit opcode.
const TRIPLES: &[(u16, I, Triple)] = &[
    (0b00000, I::Stw, Triple::Offset),
    (0b00001, I::Ldw, Triple::Offset),
    (0b00010, I::Add, Triple::Regs),
    (0b00011, I::Sub, Triple::Regs),
    (0b00100, I::Shl, Triple::Regs),
    (0b00101, I::Shr, Triple::Regs),
    (0b00110, I::Eq, Triple::Regs),
    (0b00111, I::And, Triple::Regs),
    (0b01000, I::Or, Triple::Regs),
    (0b01001, I::Ldw, Triple::Indexed),
    (0b10000, I::Ld16s, Triple::Indexed),
    (0b10001, I::Ld8u, Triple::Indexed),
    (0b10010, I::Add, Triple::Imm),
    (0b10011, I::Sub, Triple::Imm),
    (0b10100, I::Shl, Triple::Bitp),
    (0b10101, I::Shr, Triple::Bitp),
    (0b10110, I::Eq, Triple::Imm),
    (0b11000, I::Lss, Triple::Regs),
    (0b11001, I::Lsu, Triple::Regs),
];

/// Two-operand short forms keyed by the 5-bit opcode and bit 4.
const PAIRS: &[(u16, I, Pair)] = &[
    (0b000001, I::Getst, Pair::FromRes),
    (0b000011, I::Outt, Pair::ToRes),
    (0b000101, I::Setd, Pair::ToRes),
    (0b000111, I::Tsetmr, Pair::Regs),
    (0b001001, I::Eet, Pair::FromRes),
    (0b001010, I::Andnot, Pair::Regs),
    (0b001011, I::Eef, Pair::FromRes),
    (0b001100, I::Sext, Pair::Regs),
    (0b001101, I::Sext, Pair::Bitp),
    (0b001110, I::Setpt, Pair::ToRes),
    (0b010000, I::Zext, Pair::Regs),
    (0b010001, I::Zext, Pair::Bitp),
    (0b010010, I::Outct, Pair::ToRes),
    (0b010011, I::Outct, Pair::ResImm),
    (0b100000, I::Getr, Pair::Imm),
    (0b100001, I::Inct, Pair::FromRes),
    (0b100010, I::Not, Pair::Regs),
    (0b100011, I::Int, Pair::FromRes),
    (0b100100, I::Neg, Pair::Regs),
    (0b100101, I::Endin, Pair::FromRes),
    (0b101000, I::Mkmsk, Pair::Regs),
    (0b101001, I::Mkmsk, Pair::Bitp),
    (0b101010, I::Out, Pair::ToRes),
    (0b101011, I::Outshr, Pair::ToRes),
    (0b101100, I::In, Pair::FromRes),
    (0b101101, I::Inshr, Pair::FromRes),
    (0b101110, I::Peek, Pair::FromRes),
    (0b101111, I::Testct, Pair::FromRes),
    (0b110001, I::Testwct, Pair::FromRes),
    (0b110010, I::Chkct, Pair::ToRes),
    (0b110011, I::Chkct, Pair::ResImm),
];

/// One-register short forms keyed by the 5-bit opcode and bit 4.
const SINGLES: &[(u16, I, Single)] = &[
    (0b000100, I::Freer, Single::Res),
    (0b000110, I::Mjoin, Single::Res),
    (0b000111, I::Msync, Single::Res),
    (0b001000, I::Start, Single::Thread),
    (0b001001, I::Bau, Single::Reg),
    (0b001010, I::Set, Single::Into(R::Sp)),
    (0b001011, I::Set, Single::Into(R::Dp)),
    (0b001100, I::Set, Single::Into(R::Cp)),
    (0b001101, I::Ecallt, Single::Reg),
    (0b001110, I::Ecallf, Single::Reg),
    (0b001111, I::Bla, Single::Reg),
    (0b010000, I::Syncr, Single::Res),
    (0b010001, I::Clrpt, Single::Res),
    (0b010010, I::Edu, Single::Res),
    (0b010011, I::Eeu, Single::Res),
    (0b010100, I::Waitet, Single::Reg),
    (0b010101, I::Waitef, Single::Reg),
    (0b010110, I::Kcall, Single::Reg),
    (0b010111, I::Bru, Single::Reg),
    (0b011000, I::Dgetreg, Single::Reg),
    (0b011001, I::Setv, Single::ResR11),
    (0b011010, I::Setev, Single::ResR11),
];

const SP_1: Op = Op::Mem { base: R::Sp, index: R::Invalid, disp: 1, back: false };
const SP_2: Op = Op::Mem { base: R::Sp, index: R::Invalid, disp: 2, back: false };
const SP_3: Op = Op::Mem { base: R::Sp, index: R::Invalid, disp: 3, back: false };
const SP_4: Op = Op::Mem { base: R::Sp, index: R::Invalid, disp: 4, back: false };

/// Operand-less short forms keyed by the 5-bit opcode and the low five bits.
const NULLARY: &[(u16, I, &[Op])] = &[
    (0b00000_01100, I::Waiteu, &[]),
    (0b00000_01101, I::Clre, &[]),
    (0b00000_01110, I::Ssync, &[]),
    (0b00000_01111, I::Freet, &[]),
    (0b00000_11100, I::Dcall, &[]),
    (0b00000_11101, I::Kret, &[]),
    (0b00000_11110, I::Dret, &[]),
    (0b00000_11111, I::Dentsp, &[]),
    (0b00001_01100, I::Drestsp, &[]),
    (0b00001_01101, I::Ldw, &[Op::Reg(R::Spc), SP_1]),
    (0b00001_01110, I::Stw, &[Op::Reg(R::Spc), SP_1]),
    (0b00001_01111, I::Ldw, &[Op::Reg(R::Ssr), SP_2]),
    (0b00001_11100, I::Stw, &[Op::Reg(R::Ssr), SP_2]),
    (0b00001_11101, I::Stw, &[Op::Reg(R::Sed), SP_3]),
    (0b00001_11110, I::Get, &[Op::Reg(R::R11), Op::Reg(R::Ed)]),
    (0b00001_11111, I::Get, &[Op::Reg(R::R11), Op::Reg(R::Et)]),
    (0b00010_01100, I::Get, &[Op::Reg(R::R11), Op::Reg(R::Id)]),
    (0b00010_01101, I::Get, &[Op::Reg(R::R11), Op::Reg(R::Kep)]),
    (0b00010_01110, I::Get, &[Op::Reg(R::R11), Op::Reg(R::Ksp)]),
    (0b00010_01111, I::Ldw, &[Op::Reg(R::Sed), SP_3]),
    (0b00010_11100, I::Stw, &[Op::Reg(R::Et), SP_4]),
    (0b00010_11110, I::Ldw, &[Op::Reg(R::Et), SP_4]),
];

/// Register-plus-`u6` forms keyed by the 6-bit opcode; `true` prints the register as a resource.
const RU6: &[(u16, I, bool, Tail)] = &[
    (0b010100, I::Stw, false, Tail::Mem(R::Dp)),
    (0b010101, I::Stw, false, Tail::Mem(R::Sp)),
    (0b010110, I::Ldw, false, Tail::Mem(R::Dp)),
    (0b010111, I::Ldw, false, Tail::Mem(R::Sp)),
    (0b011000, I::Ldaw, false, Tail::Mem(R::Dp)),
    (0b011001, I::Ldaw, false, Tail::Mem(R::Sp)),
    (0b011010, I::Ldc, false, Tail::Plain),
    (0b011011, I::Ldw, false, Tail::Mem(R::Cp)),
    (0b011100, I::Bt, false, Tail::Plain),
    (0b011101, I::Bt, false, Tail::Back),
    (0b011110, I::Bf, false, Tail::Plain),
    (0b011111, I::Bf, false, Tail::Back),
    (0b111010, I::Setc, true, Tail::Plain),
];

/// `u6` forms living in the register slots 12..=15 of the branch opcodes; `true` adds `r11`.
const U6: &[(u16, u8, I, bool, Tail)] = &[
    (0b011100, 12, I::Bu, false, Tail::Plain),
    (0b011100, 13, I::Blat, false, Tail::Plain),
    (0b011100, 14, I::Extdp, false, Tail::Plain),
    (0b011100, 15, I::Kcall, false, Tail::Plain),
    (0b011101, 12, I::Bu, false, Tail::Back),
    (0b011101, 13, I::Entsp, false, Tail::Plain),
    (0b011101, 14, I::Extsp, false, Tail::Plain),
    (0b011101, 15, I::Retsp, false, Tail::Plain),
    (0b011110, 12, I::Getsr, true, Tail::Plain),
    (0b011110, 13, I::Kentsp, false, Tail::Plain),
    (0b011110, 14, I::Clrsr, false, Tail::Plain),
    (0b011110, 15, I::Krestsp, false, Tail::Plain),
    (0b011111, 12, I::Setsr, false, Tail::Plain),
    (0b011111, 13, I::Ldaw, true, Tail::Mem(R::Cp)),
];

/// `u10` forms keyed by the 6-bit opcode.
const U10: &[(u16, I, bool, Tail)] = &[
    (0b110100, I::Bl, false, Tail::Plain),
    (0b110101, I::Bl, false, Tail::Back),
    (0b110110, I::Ldap, true, Tail::Plain),
    (0b110111, I::Ldap, true, Tail::Back),
    (0b111000, I::Bla, false, Tail::Mem(R::Cp)),
    (0b111001, I::Ldw, true, Tail::Mem(R::Cp)),
];

/// Long three-operand forms keyed by the opcode halfword's top five and low five bits.
const LONG_TRIPLES: &[(u16, u16, I, Triple)] = &[
    (0b00001, 0b01111, I::Xor, Triple::Regs),
    (0b00010, 0b01100, I::Ashr, Triple::Regs),
    (0b00011, 0b01100, I::Ldaw, Triple::Indexed),
    (0b00100, 0b01100, I::Ldaw, Triple::IndexedBack),
    (0b00101, 0b01100, I::Lda16, Triple::Indexed),
    (0b00110, 0b01100, I::Lda16, Triple::IndexedBack),
    (0b00111, 0b01100, I::Mul, Triple::Regs),
    (0b01000, 0b01100, I::Divs, Triple::Regs),
    (0b01001, 0b01100, I::Divu, Triple::Regs),
    (0b10000, 0b01100, I::St16, Triple::Indexed),
    (0b10001, 0b01100, I::St8, Triple::Indexed),
    (0b10010, 0b01100, I::Ashr, Triple::Bitp),
    (0b10011, 0b01100, I::Ldaw, Triple::Offset),
    (0b10100, 0b01100, I::Ldaw, Triple::OffsetBack),
    (0b10101, 0b01100, I::Crc32, Triple::Regs),
    (0b11000, 0b01100, I::Rems, Triple::Regs),
    (0b11001, 0b01100, I::Remu, Triple::Regs),
];

/// Long two-operand forms keyed by the opcode halfword's top five bits and bit 4 of the
/// operand halfword.
const LONG_PAIRS: &[(u16, u16, I, Pair)] = &[
    (0b00000, 0, I::Bitrev, Pair::Regs),
    (0b00000, 1, I::Byterev, Pair::Regs),
    (0b00001, 0, I::Clz, Pair::Regs),
    (0b00001, 1, I::Getd, Pair::FromRes),
    (0b00010, 0, I::Init, Pair::Thread(R::Lr)),
    (0b00010, 1, I::Getn, Pair::FromRes),
    (0b00011, 0, I::Init, Pair::Thread(R::Dp)),
    (0b00011, 1, I::Init, Pair::Thread(R::Cp)),
    (0b00100, 0, I::Init, Pair::Thread(R::Sp)),
    (0b00100, 1, I::Init, Pair::Thread(R::Pc)),
    (0b00101, 0, I::Setclk, Pair::ToRes),
    (0b00101, 1, I::Setrdy, Pair::ToRes),
    (0b00110, 0, I::Settw, Pair::ToRes),
    (0b00110, 1, I::Setn, Pair::ToRes),
    (0b00111, 0, I::Get, Pair::GetPs),
    (0b00111, 1, I::Set, Pair::SetPs),
    (0b01000, 0, I::Testlcl, Pair::FromRes),
];

/// Long four-register forms keyed by the opcode halfword's top five bits and bit 4.
const LONG_QUADS: &[(u16, u16, I)] = &[
    (0b00000, 0, I::Crc8),
    (0b00000, 1, I::Maccu),
    (0b00001, 1, I::Maccs),
];

/// Long five-register forms keyed by the opcode halfword's top five bits and bit 4.
const LONG_FIVES: &[(u16, u16, I)] = &[
    (0b00000, 1, I::Ladd),
    (0b00001, 0, I::Lsub),
    (0b10000, 0, I::Ldivu),
];

const PFIX: u16 = 0b111100;
const LONG: u16 = 0b11111;

/// Whether `first` needs a second halfword.
pub(super) fn is_long(first: u16) -> bool {
    first >> 11 == LONG || first >> 10 == PFIX
}

/// General-purpose register `r0`..`r11`.
fn gr(n: u8) -> R {
    R::from_id(R::R0.id() as u32 + n as u32).unwrap_or(R::Invalid)
}

/// Register operand of the `ru6` forms: `r0`..`r11`, `cp`, `dp`, `sp`, `lr`.
fn rr(n: u8) -> R {
    R::from_id(R::R0.id() as u32 + (n & 15) as u32).unwrap_or(R::Invalid)
}

/// Three operands packed into the low eleven bits.
fn three(hw: u16) -> Option<[u8; 3]> {
    let combined = (hw >> 6) & 31;
    if combined >= 27 {
        return None;
    }
    let low = |shift: u16| ((hw >> shift) & 3) as u8;
    Some([
        (((combined % 3) << 2) as u8) | low(4),
        ((((combined / 3) % 3) << 2) as u8) | low(2),
        (((combined / 9) << 2) as u8) | low(0),
    ])
}

/// Two operands packed into bits 10..=5 and 3..=0; bit 4 belongs to the opcode.
fn two(hw: u16) -> Option<[u8; 2]> {
    let mut combined = (hw >> 6) & 31;
    if combined < 27 {
        return None;
    }
    if hw & 0x20 != 0 {
        if combined == 31 {
            return None;
        }
        combined += 5;
    }
    combined -= 27;
    Some([
        (((combined % 3) << 2) as u8) | ((hw >> 2) & 3) as u8,
        (((combined / 3) << 2) as u8) | (hw & 3) as u8,
    ])
}

fn mem(base: R, index: R, back: bool) -> Op {
    Op::Mem {
        base,
        index,
        disp: 0,
        back,
    }
}

fn offset(base: R, disp: i64, back: bool) -> Op {
    Op::Mem {
        base,
        index: R::Invalid,
        disp,
        back,
    }
}

fn triple(insn: I, layout: Triple, [a, b, c]: [u8; 3]) -> Decoded {
    let d = Op::Reg(gr(a));
    let ops = match layout {
        Triple::Regs => vec![d, Op::Reg(gr(b)), Op::Reg(gr(c))],
        Triple::Indexed => vec![d, mem(gr(b), gr(c), false)],
        Triple::IndexedBack => vec![d, mem(gr(b), gr(c), true)],
        Triple::Bitp => vec![d, Op::Reg(gr(b)), Op::Imm(BITP[c as usize])],
        Triple::Imm => vec![d, Op::Reg(gr(b)), Op::Imm(c as i64)],
        Triple::Offset => vec![d, offset(gr(b), c as i64, false)],
        Triple::OffsetBack => vec![d, offset(gr(b), c as i64, true)],
    };
    Decoded::new(insn, ops)
}

fn pair(insn: I, layout: Pair, [a, b]: [u8; 2]) -> Decoded {
    let ops = match layout {
        Pair::Regs => vec![Op::Reg(gr(a)), Op::Reg(gr(b))],
        Pair::FromRes => vec![Op::Reg(gr(a)), Op::Res(gr(b))],
        Pair::ToRes => vec![Op::Res(gr(b)), Op::Reg(gr(a))],
        Pair::Bitp => vec![Op::Reg(gr(a)), Op::Imm(BITP[b as usize])],
        Pair::Imm => vec![Op::Reg(gr(a)), Op::Imm(b as i64)],
        Pair::ResImm => vec![Op::Res(gr(a)), Op::Imm(b as i64)],
        Pair::Thread(reg) => vec![Op::Thread(gr(b), reg), Op::Reg(gr(a))],
        Pair::GetPs => vec![Op::Reg(gr(a)), Op::Ps(gr(b))],
        Pair::SetPs => vec![Op::Ps(gr(b)), Op::Reg(gr(a))],
    };
    Decoded::new(insn, ops)
}

fn tail(layout: Tail, value: i64) -> Op {
    match layout {
        Tail::Plain => Op::Imm(value),
        Tail::Back => Op::Imm(-value),
        Tail::Mem(base) => offset(base, value, false),
    }
}

/// Decodes a short halfword. `prefix` carries the immediate of a preceding `pfix`, which
/// is only accepted by the immediate forms.
fn short(hw: u16, prefix: Option<u64>) -> Result<Decoded, DecodeError> {
    let opc6 = hw >> 10;
    let u6 = |bits: u64| match prefix {
        Some(high) => ((high << bits) | (hw as u64 & ((1 << bits) - 1))) as i64,
        None => (hw as u64 & ((1 << bits) - 1)) as i64,
    };

    if let Some(&(_, insn, r11, layout)) = U10.iter().find(|(op, ..)| *op == opc6) {
        let mut ops = Vec::with_capacity(2);
        if r11 {
            ops.push(Op::Reg(R::R11));
        }
        ops.push(tail(layout, u6(10)));
        return Ok(Decoded::new(insn, ops));
    }

    let reg = ((hw >> 6) & 15) as u8;
    if let Some(&(.., insn, r11, layout)) = U6
        .iter()
        .find(|(op, slot, ..)| *op == opc6 && *slot == reg)
    {
        let mut ops = Vec::with_capacity(2);
        if r11 {
            ops.push(Op::Reg(R::R11));
        }
        ops.push(tail(layout, u6(6)));
        return Ok(Decoded::new(insn, ops));
    }

    if let Some(&(_, insn, res, layout)) = RU6.iter().find(|(op, ..)| *op == opc6) {
        if matches!(insn, I::Bt | I::Bf) && reg >= 12 {
            return Err(DecodeError::InvalidEncoding);
        }
        let lead = if res { Op::Res(rr(reg)) } else { Op::Reg(rr(reg)) };
        return Ok(Decoded::new(insn, vec![lead, tail(layout, u6(6))]));
    }

    if prefix.is_some() {
        return Err(DecodeError::InvalidEncoding);
    }

    let opc5 = hw >> 11;
    if (hw >> 5) & 0x3f == 0x3f {
        let low = hw & 31;
        if hw & 15 >= 12 {
            return NULLARY
                .iter()
                .find(|(op, ..)| *op == (opc5 << 5) | low)
                .map(|&(_, insn, ops)| Decoded::new(insn, ops.to_vec()))
                .ok_or(DecodeError::InvalidEncoding);
        }
        let &(_, insn, layout) = SINGLES
            .iter()
            .find(|(op, ..)| *op == (opc5 << 1) | (low >> 4))
            .ok_or(DecodeError::InvalidEncoding)?;
        let r = gr((hw & 15) as u8);
        let ops = match layout {
            Single::Reg => vec![Op::Reg(r)],
            Single::Res => vec![Op::Res(r)],
            Single::Thread => vec![Op::Thread(r, R::Invalid)],
            Single::Into(target) => vec![Op::Reg(target), Op::Reg(r)],
            Single::ResR11 => vec![Op::Res(r), Op::Reg(R::R11)],
        };
        return Ok(Decoded::new(insn, ops));
    }

    if let Some(regs) = three(hw) {
        let &(_, insn, layout) = TRIPLES
            .iter()
            .find(|(op, ..)| *op == opc5)
            .ok_or(DecodeError::InvalidEncoding)?;
        return Ok(triple(insn, layout, regs));
    }

    let regs = two(hw).ok_or(DecodeError::InvalidEncoding)?;
    let &(_, insn, layout) = PAIRS
        .iter()
        .find(|(op, ..)| *op == (opc5 << 1) | ((hw >> 4) & 1))
        .ok_or(DecodeError::InvalidEncoding)?;
    Ok(pair(insn, layout, regs))
}

/// Long form: `first` carries the operands, `second` the opcode.
fn long(first: u16, second: u16) -> Result<Decoded, DecodeError> {
    let opc5 = second >> 11;
    let bit4 = (second >> 4) & 1;

    if (second >> 5) & 0x3f != 0x3f {
        // lmul d, e, x, y, v, w
        let [d, x, y] = three(first).ok_or(DecodeError::InvalidEncoding)?;
        let [e, v, w] = three(second).ok_or(DecodeError::InvalidEncoding)?;
        if opc5 != 0 {
            return Err(DecodeError::InvalidEncoding);
        }
        let ops = [d, e, x, y, v, w].map(|n| Op::Reg(gr(n))).to_vec();
        return Ok(Decoded::new(I::Lmul, ops));
    }

    let low = second & 31;
    if let Some(regs) = three(first) {
        if second & 15 < 12 {
            let &(.., insn) = LONG_QUADS
                .iter()
                .find(|(op, bit, _)| *op == opc5 && *bit == bit4)
                .ok_or(DecodeError::InvalidEncoding)?;
            let [a, b, c] = regs;
            let ops = [a, (second & 15) as u8, b, c].map(|n| Op::Reg(gr(n))).to_vec();
            return Ok(Decoded::new(insn, ops));
        }
        let &(.., insn, layout) = LONG_TRIPLES
            .iter()
            .find(|(op, lo, ..)| *op == opc5 && *lo == low)
            .ok_or(DecodeError::InvalidEncoding)?;
        return Ok(triple(insn, layout, regs));
    }

    let regs = two(first).ok_or(DecodeError::InvalidEncoding)?;
    if low != 0b01100 {
        return Err(DecodeError::InvalidEncoding);
    }
    let &(.., insn, layout) = LONG_PAIRS
        .iter()
        .find(|(op, bit, ..)| *op == opc5 && *bit == (first >> 4) & 1)
        .ok_or(DecodeError::InvalidEncoding)?;
    Ok(pair(insn, layout, regs))
}

/// Long five-register form: three operands in `first`, two in `second`.
fn long_five(first: u16, second: u16) -> Option<Decoded> {
    let [d, x, y] = three(first)?;
    let [e, v] = two(second)?;
    let opc5 = second >> 11;
    let bit4 = (second >> 4) & 1;
    let &(.., insn) = LONG_FIVES
        .iter()
        .find(|(op, bit, _)| *op == opc5 && *bit == bit4)?;
    let ops = [d, e, x, y, v].map(|n| Op::Reg(gr(n))).to_vec();
    Some(Decoded::new(insn, ops))
}

/// Decodes one instruction; `second` is the following halfword when [`is_long`] holds.
pub(super) fn decode(first: u16, second: Option<u16>) -> Result<Decoded, DecodeError> {
    match second {
        None => short(first, None),
        Some(second) if first >> 10 == PFIX => short(second, Some((first & 0x3ff) as u64)),
        Some(second) => {
            if (second >> 5) & 0x3f != 0x3f && three(second).is_none() {
                return long_five(first, second).ok_or(DecodeError::InvalidEncoding);
            }
            long(first, second)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(first: u16, second: Option<u16>) -> String {
        let d = decode(first, second).unwrap();
        format!("{} {}", d.mnemonic(), super::super::render(&d))
            .trim_end()
            .to_string()
    }

    #[test]
    fn test_operand_packing() {
        assert_eq!(three(0x101b), Some([1, 2, 3]));
        assert_eq!(three(0xfd1f), Some([9, 3, 11]));
        assert_eq!(two(0x1713), Some([4, 3]));
        assert_eq!(two(0x0ffe), None);
    }

    #[test]
    fn test_short_forms() {
        assert_eq!(text(0x0ffe, None), "get r11, ed");
        assert_eq!(text(0x17fe, None), "ldw et, sp[4]");
        assert_eq!(text(0x1713, None), "setd res[r3], r4");
        assert_eq!(text(0x101b, None), "add r1, r2, r3");
        // add r1, r2, 3 through the 2rus form
        assert_eq!(text(0x901b, None), "add r1, r2, 3");
        // shl r1, r2, 16 (bitp 9 is in the third slot's high bits)
        assert_eq!(text(0xa499, None), "shl r1, r2, 0x10");
        assert_eq!(text(0x001b, None), "stw r1, r2[3]");
    }

    #[test]
    fn test_immediate_forms() {
        // ldw r1, sp[5]
        assert_eq!(text(0x5c45, None), "ldw r1, sp[5]");
        // bt r2, -3
        assert_eq!(text(0x7483, None), "bt r2, -3");
        // bu 0x10 (register slot 12)
        assert_eq!(text(0x7310, None), "bu 0x10");
        // retsp 4
        assert_eq!(text(0x77c4, None), "retsp 4");
        // bl -0x200
        assert_eq!(text(0xd600, None), "bl -0x200");
        // ldap r11, 0x20
        assert_eq!(text(0xd820, None), "ldap r11, 0x20");
    }

    #[test]
    fn test_prefixed_and_long_forms() {
        assert_eq!(text(0xf207, Some(0x5b45)), "ldw dp, dp[0x81c5]");
        assert_eq!(text(0xfec6, Some(0x17ec)), "init t[r2]:lr, r1");
        assert_eq!(text(0xf897, Some(0x4fec)), "divu r9, r1, r3");
        assert_eq!(text(0xfd1f, Some(0x37ec)), "lda16 r9, r3[-r11]");
        assert_eq!(text(0xfaf9, Some(0x0602)), "lmul r11, r0, r2, r5, r8, r10");
    }

    #[test]
    fn test_rejects() {
        // pfix before a register form
        assert_eq!(decode(0xf001, Some(0x101b)), Err(DecodeError::InvalidEncoding));
        // lmul's opcode slot with another opcode
        assert_eq!(decode(0xf800, Some(0x8000)), Err(DecodeError::InvalidEncoding));
        // unassigned operand-less slot
        assert_eq!(decode(0x37fc, None), Err(DecodeError::InvalidEncoding));
    }
}
