//! Fetch-word formats.
//!
//! Every instruction is one 32-bit word. The low bits select the format: bit 0 chains the
//! next word into the same execute packet, bit 1 picks the register file, and bits 31:28
//! carry the predicate.

use super::{
    Decoded, Op, Tms320c64xCondition, Tms320c64xFunctionalUnit as Unit, Tms320c64xMem as Mem,
    Tms320c64xMemModify as Modify, Tms320c64xMemOffset as MemOffset,
    Tms320c64xInsn as I, Tms320c64xReg as R, Tms320c64xUnitKind as Kind,
};
use crate::arch::sign_extend;
use crate::decoder::DecodeError;
use crate::Address;

/// Operand layout of a three-operand unit encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Form {
    /// `src1, xsrc2, dst`
    Regs,
    /// `scst5, xsrc2, dst`
    Signed,
    /// `ucst5, xsrc2, dst`
    Unsigned,
    /// `xsrc2, src1, dst`
    Swapped,
    /// `xsrc2, ucst5, dst`
    SwappedUnsigned,
    /// `xsrc2, dst`
    Unary,
}

const L_UNIT: &[(u32, I, Form)] = &[
    (0x02, I::Add, Form::Signed),
    (0x03, I::Add, Form::Regs),
    (0x06, I::Sub, Form::Signed),
    (0x07, I::Sub, Form::Regs),
    (0x0e, I::Ssub, Form::Signed),
    (0x0f, I::Ssub, Form::Regs),
    (0x12, I::Sadd, Form::Signed),
    (0x13, I::Sadd, Form::Regs),
    (0x17, I::Sub, Form::Swapped),
    (0x1a, I::Abs, Form::Unary),
    (0x46, I::Cmpgt, Form::Signed),
    (0x47, I::Cmpgt, Form::Regs),
    (0x4e, I::Cmpgtu, Form::Unsigned),
    (0x4f, I::Cmpgtu, Form::Regs),
    (0x52, I::Cmpeq, Form::Signed),
    (0x53, I::Cmpeq, Form::Regs),
    (0x56, I::Cmplt, Form::Signed),
    (0x57, I::Cmplt, Form::Regs),
    (0x5e, I::Cmpltu, Form::Unsigned),
    (0x5f, I::Cmpltu, Form::Regs),
    (0x63, I::Norm, Form::Unary),
    (0x6a, I::Lmbd, Form::Signed),
    (0x6b, I::Lmbd, Form::Regs),
    (0x6e, I::Xor, Form::Signed),
    (0x6f, I::Xor, Form::Regs),
    (0x7a, I::And, Form::Signed),
    (0x7b, I::And, Form::Regs),
    (0x7e, I::Or, Form::Signed),
    (0x7f, I::Or, Form::Regs),
];

const S_UNIT: &[(u32, I, Form)] = &[
    (0x01, I::Add2, Form::Regs),
    (0x06, I::Add, Form::Signed),
    (0x07, I::Add, Form::Regs),
    (0x0a, I::Xor, Form::Signed),
    (0x0b, I::Xor, Form::Regs),
    (0x11, I::Sub2, Form::Regs),
    (0x16, I::Sub, Form::Signed),
    (0x17, I::Sub, Form::Regs),
    (0x1a, I::Or, Form::Signed),
    (0x1b, I::Or, Form::Regs),
    (0x1e, I::And, Form::Signed),
    (0x1f, I::And, Form::Regs),
    (0x22, I::Sshl, Form::SwappedUnsigned),
    (0x23, I::Sshl, Form::Swapped),
    (0x26, I::Shru, Form::SwappedUnsigned),
    (0x27, I::Shru, Form::Swapped),
    (0x2b, I::Extu, Form::Swapped),
    (0x2f, I::Ext, Form::Swapped),
    (0x32, I::Shl, Form::SwappedUnsigned),
    (0x33, I::Shl, Form::Swapped),
    (0x36, I::Shr, Form::SwappedUnsigned),
    (0x37, I::Shr, Form::Swapped),
    (0x3b, I::Set, Form::Swapped),
    (0x3f, I::Clr, Form::Swapped),
];

const M_UNIT: &[(u32, I, Form)] = &[
    (0x01, I::Mpyh, Form::Regs),
    (0x02, I::Smpyh, Form::Regs),
    (0x03, I::Mpyhsu, Form::Regs),
    (0x05, I::Mpyhus, Form::Regs),
    (0x07, I::Mpyhu, Form::Regs),
    (0x09, I::Mpyhl, Form::Regs),
    (0x0a, I::Smpyhl, Form::Regs),
    (0x0b, I::Mpyhslu, Form::Regs),
    (0x0d, I::Mpyhuls, Form::Regs),
    (0x0f, I::Mpyhlu, Form::Regs),
    (0x11, I::Mpylh, Form::Regs),
    (0x12, I::Smpylh, Form::Regs),
    (0x13, I::Mpylshu, Form::Regs),
    (0x15, I::Mpyluhs, Form::Regs),
    (0x17, I::Mpylhu, Form::Regs),
    (0x18, I::Mpy, Form::Signed),
    (0x19, I::Mpy, Form::Regs),
    (0x1a, I::Smpy, Form::Regs),
    (0x1b, I::Mpysu, Form::Regs),
    (0x1d, I::Mpyus, Form::Regs),
    (0x1e, I::Mpysu, Form::Signed),
    (0x1f, I::Mpyu, Form::Regs),
];

/// `.D` arithmetic lists `src2` first and never crosses register files.
const D_UNIT: &[(u32, I, Form)] = &[
    (0x10, I::Add, Form::Swapped),
    (0x11, I::Sub, Form::Swapped),
    (0x12, I::Add, Form::SwappedUnsigned),
    (0x13, I::Sub, Form::SwappedUnsigned),
    (0x30, I::Addab, Form::Swapped),
    (0x31, I::Subab, Form::Swapped),
    (0x32, I::Addab, Form::SwappedUnsigned),
    (0x33, I::Subab, Form::SwappedUnsigned),
    (0x34, I::Addah, Form::Swapped),
    (0x35, I::Subah, Form::Swapped),
    (0x36, I::Addah, Form::SwappedUnsigned),
    (0x37, I::Subah, Form::SwappedUnsigned),
    (0x38, I::Addaw, Form::Swapped),
    (0x39, I::Subaw, Form::Swapped),
    (0x3a, I::Addaw, Form::SwappedUnsigned),
    (0x3b, I::Subaw, Form::SwappedUnsigned),
];

/// Control registers reachable through `mvc`, keyed by encoding and direction.
fn control(n: u32, to_control: bool) -> Option<R> {
    Some(match (n, to_control) {
        (0, _) => R::Amr,
        (1, _) => R::Csr,
        (2, false) => R::Ifr,
        (2, true) => R::Isr,
        (3, true) => R::Icr,
        (4, _) => R::Ier,
        (5, _) => R::Istp,
        (6, _) => R::Irp,
        (7, _) => R::Nrp,
        (16, false) => R::Pce1,
        _ => return None,
    })
}

/// General-purpose register `n` of file A (`side` 0) or B (`side` 1).
pub(super) fn register(side: u32, n: u32) -> R {
    R::ALL[1 + (side as usize & 1) * 32 + (n as usize & 31)]
}

#[derive(Debug, Clone, Copy)]
struct Word(u32);

impl Word {
    fn bits(self, hi: u32, lo: u32) -> u32 {
        (self.0 >> lo) & ((1 << (hi - lo + 1)) - 1)
    }

    fn bit(self, n: u32) -> bool {
        self.0 >> n & 1 != 0
    }

    fn side(self) -> u32 {
        self.bits(1, 1)
    }

    fn dst(self) -> u32 {
        self.bits(27, 23)
    }

    fn src2(self) -> u32 {
        self.bits(22, 18)
    }

    fn src1(self) -> u32 {
        self.bits(17, 13)
    }

    fn condition(self) -> Result<Option<Tms320c64xCondition>, DecodeError> {
        let zero = self.bit(28);
        let reg = match self.bits(31, 29) {
            0 if zero => return Err(DecodeError::InvalidEncoding),
            0 => return Ok(None),
            1 => R::B0,
            2 => R::B1,
            3 => R::B2,
            4 => R::A1,
            5 => R::A2,
            6 => R::A0,
            _ => return Err(DecodeError::InvalidEncoding),
        };
        Ok(Some(Tms320c64xCondition { reg, zero }))
    }

    fn unit(self, kind: Kind, cross: bool) -> Unit {
        Unit {
            kind,
            side: self.side() as u8 + 1,
            data_side: 0,
            cross,
        }
    }
}

/// First address of the fetch packet holding `address`; branch displacements count from it.
fn fetch_packet(address: Address) -> Address {
    address & !0x1f
}

fn relative(address: Address, words: i64) -> Op {
    Op::Target(fetch_packet(address).wrapping_add((words << 2) as u64))
}

pub(super) fn decode(word: u32, address: Address) -> Result<Decoded, DecodeError> {
    let w = Word(word);
    let condition = w.condition()?;
    let mut decoded = if word & !1 == 0x0001_e000 {
        Decoded::new(I::Idle, Unit::default(), Vec::new())
    } else if word & 0xfffe_1ffe == 0 {
        let count = w.bits(16, 13) + 1;
        let ops = if count > 1 { vec![Op::Imm(count as i64)] } else { Vec::new() };
        Decoded::new(I::Nop, Unit::default(), ops)
    } else {
        match (w.bits(6, 2), w.bits(3, 2)) {
            (_, 0b01) => load_store(w)?,
            (_, 0b11) => load_store_long(w)?,
            (low, _) if low & 0b111 == 0b110 => three(w, Kind::L, w.bits(11, 5), L_UNIT)?,
            (low, _) if low & 0b1111 == 0b1000 => s_unit(w, address)?,
            (low, _) if low & 0b1111 == 0b0010 => field(w)?,
            (0b00000, _) => three(w, Kind::M, w.bits(11, 7), M_UNIT)?,
            (0b10000, _) => three(w, Kind::D, w.bits(12, 7), D_UNIT)?,
            (0b00100, _) => Decoded::new(
                I::B,
                w.unit(Kind::S, false),
                vec![relative(address, sign_extend(w.bits(27, 7) as u64, 21))],
            ),
            (0b01010, _) => Decoded::new(
                I::Mvk,
                w.unit(Kind::S, false),
                vec![
                    Op::Imm(sign_extend(w.bits(22, 7) as u64, 16)),
                    Op::Reg(register(w.side(), w.dst())),
                ],
            ),
            (0b11010, _) => Decoded::new(
                I::Mvkh,
                w.unit(Kind::S, false),
                vec![
                    Op::Imm((w.bits(22, 7) as i64) << 16),
                    Op::Reg(register(w.side(), w.dst())),
                ],
            ),
            (0b10100, _) => Decoded::new(
                I::Addk,
                w.unit(Kind::S, false),
                vec![
                    Op::Imm(sign_extend(w.bits(22, 7) as u64, 16)),
                    Op::Reg(register(w.side(), w.dst())),
                ],
            ),
            _ => return Err(DecodeError::InvalidEncoding),
        }
    };
    decoded.condition = condition;
    decoded.parallel = w.bit(0);
    Ok(decoded)
}

fn lookup(table: &[(u32, I, Form)], op: u32) -> Option<(I, Form)> {
    table
        .iter()
        .find(|(code, ..)| *code == op)
        .map(|&(_, insn, form)| (insn, form))
}

/// `.L`, `.M` and `.D` arithmetic, plus the generic `.S` rows.
fn three(w: Word, kind: Kind, op: u32, table: &[(u32, I, Form)]) -> Result<Decoded, DecodeError> {
    let (insn, form) = lookup(table, op).ok_or(DecodeError::InvalidEncoding)?;
    let cross = kind != Kind::D && w.bit(12);
    let side = w.side();
    let src2 = Op::Reg(register(if cross { side ^ 1 } else { side }, w.src2()));
    let src1 = w.src1();
    let dst = Op::Reg(register(side, w.dst()));
    let ops = match form {
        Form::Regs => vec![Op::Reg(register(side, src1)), src2, dst],
        Form::Signed => vec![Op::Imm(sign_extend(src1 as u64, 5)), src2, dst],
        Form::Unsigned => vec![Op::Imm(src1 as i64), src2, dst],
        Form::Swapped => vec![src2, Op::Reg(register(side, src1)), dst],
        Form::SwappedUnsigned => vec![src2, Op::Imm(src1 as i64), dst],
        Form::Unary if src1 == 0 => vec![src2, dst],
        Form::Unary => return Err(DecodeError::InvalidEncoding),
    };
    Ok(Decoded::new(insn, w.unit(kind, cross), ops))
}

fn s_unit(w: Word, address: Address) -> Result<Decoded, DecodeError> {
    let op = w.bits(11, 6);
    let cross = w.bit(12);
    let on_b = w.side() == 1;
    let unit = w.unit(Kind::S, cross);
    match op {
        // bnop and addkpc reuse the register fields for constants
        0x04 if !cross => Ok(Decoded::new(
            I::Bnop,
            unit,
            vec![
                relative(address, sign_extend(w.bits(27, 16) as u64, 12)),
                Op::Imm(w.bits(15, 13) as i64),
            ],
        )),
        0x05 if !cross && on_b => Ok(Decoded::new(
            I::Addkpc,
            unit,
            vec![
                relative(address, sign_extend(w.bits(22, 16) as u64, 7)),
                Op::Reg(register(1, w.dst())),
                Op::Imm(w.bits(15, 13) as i64),
            ],
        )),
        0x03 if on_b && w.dst() == 0 && w.src1() == 0 => {
            let target = match w.src2() {
                6 => R::Irp,
                7 => R::Nrp,
                _ => return Err(DecodeError::InvalidEncoding),
            };
            Ok(Decoded::new(I::B, unit, vec![Op::Reg(target)]))
        }
        0x0d if on_b && w.dst() == 0 && w.src1() == 0 => {
            let source = register(if cross { 0 } else { 1 }, w.src2());
            Ok(Decoded::new(I::B, unit, vec![Op::Reg(source)]))
        }
        0x0e if on_b => {
            let target = control(w.dst(), true).ok_or(DecodeError::InvalidEncoding)?;
            let source = register(if cross { 0 } else { 1 }, w.src2());
            Ok(Decoded::new(I::Mvc, unit, vec![Op::Reg(source), Op::Reg(target)]))
        }
        0x0f if on_b && !cross => {
            let source = control(w.src2(), false).ok_or(DecodeError::InvalidEncoding)?;
            Ok(Decoded::new(
                I::Mvc,
                unit,
                vec![Op::Reg(source), Op::Reg(register(1, w.dst()))],
            ))
        }
        _ => three(w, Kind::S, op, S_UNIT),
    }
}

/// `extu`, `ext`, `set` and `clr` with constant bit positions.
fn field(w: Word) -> Result<Decoded, DecodeError> {
    let insn = match w.bits(7, 6) {
        0 => I::Extu,
        1 => I::Ext,
        2 => I::Set,
        _ => I::Clr,
    };
    let side = w.side();
    Ok(Decoded::new(
        insn,
        w.unit(Kind::S, false),
        vec![
            Op::Reg(register(side, w.src2())),
            Op::Imm(w.src1() as i64),
            Op::Imm(w.bits(12, 8) as i64),
            Op::Reg(register(side, w.dst())),
        ],
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Width {
    Single,
    /// Aligned pair; the register field must be even.
    Pair,
    /// Non-aligned pair; bit 23 is the offset scale flag.
    LoosePair,
}

fn memory_op(op: u32, wide: bool) -> Option<(I, Width, bool)> {
    Some(match (wide, op) {
        (false, 0) => (I::Ldhu, Width::Single, false),
        (false, 1) => (I::Ldbu, Width::Single, false),
        (false, 2) => (I::Ldb, Width::Single, false),
        (false, 3) => (I::Stb, Width::Single, true),
        (false, 4) => (I::Ldh, Width::Single, false),
        (false, 5) => (I::Sth, Width::Single, true),
        (false, 6) => (I::Ldw, Width::Single, false),
        (false, 7) => (I::Stw, Width::Single, true),
        (true, 2) => (I::Ldndw, Width::LoosePair, false),
        (true, 3) => (I::Ldnw, Width::Single, false),
        (true, 4) => (I::Stdw, Width::Pair, true),
        (true, 5) => (I::Stnw, Width::Single, true),
        (true, 6) => (I::Lddw, Width::Pair, false),
        (true, 7) => (I::Stndw, Width::LoosePair, true),
        _ => return None,
    })
}

fn data_operand(w: Word, width: Width) -> Result<Op, DecodeError> {
    let side = w.side();
    let n = w.dst();
    match width {
        Width::Single => Ok(Op::Reg(register(side, n))),
        Width::Pair if n & 1 != 0 => Err(DecodeError::InvalidEncoding),
        Width::Pair | Width::LoosePair => {
            let low = n & !1;
            Ok(Op::Pair(register(side, low + 1), register(side, low)))
        }
    }
}

fn with_data(insn: I, store: bool, unit: Unit, data: Op, mem: Mem) -> Decoded {
    let ops = if store {
        vec![data, Op::Mem(mem)]
    } else {
        vec![Op::Mem(mem), data]
    };
    Decoded::new(insn, unit, ops)
}

/// Loads and stores addressed by a register plus a register or 5-bit offset.
fn load_store(w: Word) -> Result<Decoded, DecodeError> {
    let (insn, width, store) =
        memory_op(w.bits(6, 4), w.bit(8)).ok_or(DecodeError::InvalidEncoding)?;
    let mode = w.bits(12, 9);
    let base_side = w.bits(7, 7);
    let offset = if mode & 0b0100 != 0 {
        MemOffset::Reg(register(base_side, w.src1()))
    } else {
        MemOffset::Imm(w.src1())
    };
    let (modify, negative) = match mode {
        0b0000 | 0b0100 => (Modify::None, true),
        0b0001 | 0b0101 => (Modify::None, false),
        0b1000 | 0b1100 => (Modify::Pre, true),
        0b1001 | 0b1101 => (Modify::Pre, false),
        0b1010 | 0b1110 => (Modify::Post, true),
        0b1011 | 0b1111 => (Modify::Post, false),
        _ => return Err(DecodeError::InvalidEncoding),
    };
    let mem = Mem {
        base: register(base_side, w.src2()),
        offset,
        negative,
        modify,
        scaled: width != Width::LoosePair || w.bit(23),
    };
    let unit = Unit {
        kind: Kind::D,
        side: base_side as u8 + 1,
        data_side: w.side() as u8 + 1,
        cross: false,
    };
    let data = data_operand(w, width)?;
    Ok(with_data(insn, store, unit, data, mem))
}

/// Loads and stores relative to `b14` or `b15` with a 15-bit scaled offset.
fn load_store_long(w: Word) -> Result<Decoded, DecodeError> {
    let (insn, width, store) =
        memory_op(w.bits(6, 4), false).ok_or(DecodeError::InvalidEncoding)?;
    let mem = Mem {
        base: if w.bit(7) { R::B15 } else { R::B14 },
        offset: MemOffset::Imm(w.bits(22, 8)),
        negative: false,
        modify: Modify::None,
        scaled: true,
    };
    let unit = Unit {
        kind: Kind::D,
        side: 2,
        data_side: w.side() as u8 + 1,
        cross: false,
    };
    let data = data_operand(w, width)?;
    Ok(with_data(insn, store, unit, data, mem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_files() {
        assert_eq!(register(0, 0), R::A0);
        assert_eq!(register(0, 31), R::A31);
        assert_eq!(register(1, 15), R::B15);
    }

    #[test]
    fn test_condition_field() {
        assert_eq!(Word(0).condition(), Ok(None));
        assert_eq!(
            Word(0x8000_0000).condition(),
            Ok(Some(Tms320c64xCondition { reg: R::A1, zero: false }))
        );
        assert_eq!(
            Word(0x3000_0000).condition(),
            Ok(Some(Tms320c64xCondition { reg: R::B0, zero: true }))
        );
        assert_eq!(Word(0x1000_0000).condition(), Err(DecodeError::InvalidEncoding));
        assert_eq!(Word(0xe000_0000).condition(), Err(DecodeError::InvalidEncoding));
    }

    #[test]
    fn test_nop_and_idle() {
        let nop = decode(0x0000_8000, 0).unwrap();
        assert_eq!((nop.insn, nop.ops.clone()), (I::Nop, vec![Op::Imm(5)]));
        assert_eq!(decode(0x0001_e000, 0).unwrap().insn, I::Idle);
        assert!(decode(0x0000_0001, 0).unwrap().parallel);
    }

    #[test]
    fn test_cross_path() {
        // add.L1X a1, b2, a3
        let d = decode(0x0188_3078, 0).unwrap();
        assert_eq!(d.insn, I::Add);
        assert!(d.unit.cross);
        assert_eq!(d.ops, vec![Op::Reg(R::A1), Op::Reg(R::B2), Op::Reg(R::A3)]);
    }

    #[test]
    fn test_branch_counts_from_fetch_packet() {
        let d = decode(0x0000_0210, 0x1004).unwrap();
        assert_eq!(d.insn, I::B);
        assert_eq!(d.ops, vec![Op::Target(0x1010)]);
    }

    #[test]
    fn test_odd_pair_rejected() {
        // lddw with b11 as the low register
        assert_eq!(decode(0x05bc_83e6, 0).err(), Some(DecodeError::InvalidEncoding));
    }
}
