//! Integer instruction lines 0 through E. Line F (coprocessor and 68040 cache/MMU
//! operations) lives in `fpu`.

use super::ea::{
    areg, dreg, general, moveq_value, quick, Reader, ALL, ALTERABLE, CONTROL, CONTROL_ALT, DATA,
    DATA_ALT, MEM_ALT,
};
use super::{
    fpu, Cpu, Decoded, M68kAddressMode as Am, M68kBitField, M68kBitValue, M68kInsn as I,
    M68kMem, M68kOperandKind as K, M68kReg as R, M68kSize as S,
};
use crate::decoder::DecodeError;

const POST_INCREMENT: u16 = 1 << 3;
const PRE_DECREMENT: u16 = 1 << 4;
const IMMEDIATE: u16 = 1 << 11;

const BRANCHES: [I; 16] = [
    I::Bra, I::Bsr, I::Bhi, I::Bls, I::Bcc, I::Bcs, I::Bne, I::Beq,
    I::Bvc, I::Bvs, I::Bpl, I::Bmi, I::Bge, I::Blt, I::Bgt, I::Ble,
];

const SETS: [I; 16] = [
    I::St, I::Sf, I::Shi, I::Sls, I::Scc, I::Scs, I::Sne, I::Seq,
    I::Svc, I::Svs, I::Spl, I::Smi, I::Sge, I::Slt, I::Sgt, I::Sle,
];

const DECREMENTS: [I; 16] = [
    I::Dbt, I::Dbf, I::Dbhi, I::Dbls, I::Dbcc, I::Dbcs, I::Dbne, I::Dbeq,
    I::Dbvc, I::Dbvs, I::Dbpl, I::Dbmi, I::Dbge, I::Dblt, I::Dbgt, I::Dble,
];

const TRAPS: [I; 16] = [
    I::Trapt, I::Trapf, I::Traphi, I::Trapls, I::Trapcc, I::Trapcs, I::Trapne, I::Trapeq,
    I::Trapvc, I::Trapvs, I::Trappl, I::Trapmi, I::Trapge, I::Traplt, I::Trapgt, I::Traple,
];

/// Shift and rotate kinds, right then left.
const SHIFTS: [[I; 2]; 4] = [
    [I::Asr, I::Asl],
    [I::Lsr, I::Lsl],
    [I::Roxr, I::Roxl],
    [I::Ror, I::Rol],
];

pub(super) fn is_set_on_condition(insn: I) -> bool {
    SETS.contains(&insn)
}

pub(super) fn is_trap_on_condition(insn: I) -> bool {
    TRAPS.contains(&insn)
}

fn mode(w: u16) -> u16 {
    (w >> 3) & 7
}

fn reg(w: u16) -> u16 {
    w & 7
}

/// The register field in bits 11..9.
fn upper(w: u16) -> u16 {
    (w >> 9) & 7
}

fn size_field(w: u16) -> Result<S, DecodeError> {
    S::from_field(w >> 6).ok_or(DecodeError::InvalidEncoding)
}

/// Source classes for sized operations: address registers cannot be read as bytes.
fn sized(all: u16, size: S) -> u16 {
    if size == S::Byte {
        all & !0x002
    } else {
        all
    }
}

fn pre_decrement(n: u16) -> K {
    K::Mem(M68kMem::new(Am::PreDecrement, areg(n)))
}

fn post_increment(n: u16) -> K {
    K::Mem(M68kMem::new(Am::PostIncrement, areg(n)))
}

pub(super) fn decode(r: &mut Reader<'_, '_>) -> Result<Decoded, DecodeError> {
    let w = r.word()?;
    match w >> 12 {
        0x0 => line0(r, w),
        0x1..=0x3 => line_move(r, w),
        0x4 => line4(r, w),
        0x5 => line5(r, w),
        0x6 => branch(r, w),
        0x7 if w & 0x100 == 0 => Ok(Decoded::new(
            I::Moveq,
            S::Long,
            vec![K::Imm(moveq_value(w)), K::Reg(dreg(upper(w)))],
        )),
        0x8 => line8(r, w),
        0x9 => arithmetic(r, w, I::Sub, I::Suba, I::Subx),
        0xb => line_b(r, w),
        0xc => line_c(r, w),
        0xd => arithmetic(r, w, I::Add, I::Adda, I::Addx),
        0xe => line_e(r, w),
        0xf => fpu::decode(r, w),
        _ => Err(DecodeError::InvalidEncoding),
    }
}

fn to_status(r: &mut Reader<'_, '_>, insn: I, target: R) -> Result<Decoded, DecodeError> {
    let size = if target == R::Ccr { S::Byte } else { S::Word };
    let value = r.word()?;
    let value = if size == S::Byte { value & 0xff } else { value };
    Ok(Decoded::new(insn, size, vec![K::Imm(value as i64), K::Reg(target)]))
}

fn line0(r: &mut Reader<'_, '_>, w: u16) -> Result<Decoded, DecodeError> {
    match w {
        0x003c => return to_status(r, I::Ori, R::Ccr),
        0x007c => return to_status(r, I::Ori, R::Sr),
        0x023c => return to_status(r, I::Andi, R::Ccr),
        0x027c => return to_status(r, I::Andi, R::Sr),
        0x0a3c => return to_status(r, I::Eori, R::Ccr),
        0x0a7c => return to_status(r, I::Eori, R::Sr),
        _ => {}
    }
    let (m, n) = (mode(w), reg(w));
    if w & 0x100 != 0 {
        if m == 1 {
            return movep(r, w);
        }
        return bit_operation(r, w, K::Reg(dreg(upper(w))), DATA);
    }
    match (upper(w), (w >> 6) & 3) {
        (4, _) => {
            let bit = K::Imm((r.word()? & 0xff) as i64);
            bit_operation(r, w, bit, DATA & !IMMEDIATE)
        }
        (0..=2, 3) => {
            r.require(Cpu::M68020)?;
            let size = S::from_field(w >> 9).ok_or(DecodeError::InvalidEncoding)?;
            let ext = r.word()?;
            let insn = if ext & 0x800 != 0 { I::Chk2 } else { I::Cmp2 };
            let src = r.ea(m, n, size, CONTROL)?;
            Ok(Decoded::new(insn, size, vec![src, K::Reg(general(ext >> 12))]))
        }
        (5..=7, 3) => {
            r.require(Cpu::M68020)?;
            if m == 7 && n == 4 {
                return Err(DecodeError::InvalidEncoding);
            }
            let size = match (w >> 9) & 3 {
                1 => S::Byte,
                2 => S::Word,
                _ => S::Long,
            };
            let ext = r.word()?;
            let dst = r.ea(m, n, size, MEM_ALT)?;
            Ok(Decoded::new(
                I::Cas,
                size,
                vec![K::Reg(dreg(ext)), K::Reg(dreg(ext >> 6)), dst],
            ))
        }
        (3, 3) => Err(DecodeError::InvalidEncoding),
        (7, _) => {
            r.require(Cpu::M68010)?;
            let size = size_field(w)?;
            let ext = r.word()?;
            let register = K::Reg(general(ext >> 12));
            let ea = r.ea(m, n, size, MEM_ALT)?;
            let ops = if ext & 0x800 != 0 {
                vec![register, ea]
            } else {
                vec![ea, register]
            };
            Ok(Decoded::new(I::Moves, size, ops))
        }
        (op, _) => {
            let insn = match op {
                0 => I::Ori,
                1 => I::Andi,
                2 => I::Subi,
                3 => I::Addi,
                5 => I::Eori,
                _ => I::Cmpi,
            };
            let size = size_field(w)?;
            let imm = r.ea(7, 4, size, ALL)?;
            let allowed = if insn == I::Cmpi && r.cpu >= Cpu::M68020 {
                DATA & !IMMEDIATE
            } else {
                DATA_ALT
            };
            let dst = r.ea(m, n, size, allowed)?;
            Ok(Decoded::new(insn, size, vec![imm, dst]))
        }
    }
}

fn bit_operation(
    r: &mut Reader<'_, '_>,
    w: u16,
    bit: K,
    test_classes: u16,
) -> Result<Decoded, DecodeError> {
    let insn = [I::Btst, I::Bchg, I::Bclr, I::Bset][((w >> 6) & 3) as usize];
    let (m, n) = (mode(w), reg(w));
    let size = if m == 0 { S::Long } else { S::Byte };
    let allowed = if insn == I::Btst { test_classes } else { DATA_ALT };
    let dst = r.ea(m, n, size, allowed)?;
    Ok(Decoded::new(insn, size, vec![bit, dst]))
}

fn movep(r: &mut Reader<'_, '_>, w: u16) -> Result<Decoded, DecodeError> {
    let mut mem = M68kMem::new(Am::Displacement, areg(reg(w)));
    mem.disp = r.word()? as i16 as i32;
    let data = K::Reg(dreg(upper(w)));
    let opmode = (w >> 6) & 3;
    let size = if opmode & 1 == 0 { S::Word } else { S::Long };
    let ops = if opmode < 2 {
        vec![K::Mem(mem), data]
    } else {
        vec![data, K::Mem(mem)]
    };
    Ok(Decoded::new(I::Movep, size, ops))
}

fn line_move(r: &mut Reader<'_, '_>, w: u16) -> Result<Decoded, DecodeError> {
    let size = match w >> 12 {
        1 => S::Byte,
        3 => S::Word,
        _ => S::Long,
    };
    let src = r.ea(mode(w), reg(w), size, sized(ALL, size))?;
    let dst_mode = (w >> 6) & 7;
    if dst_mode == 1 {
        if size == S::Byte {
            return Err(DecodeError::InvalidEncoding);
        }
        return Ok(Decoded::new(I::Movea, size, vec![src, K::Reg(areg(upper(w)))]));
    }
    let dst = r.ea(dst_mode, upper(w), size, DATA_ALT)?;
    Ok(Decoded::new(I::Move, size, vec![src, dst]))
}

fn control_register(code: u16) -> Option<R> {
    Some(match code {
        0x000 => R::Sfc,
        0x001 => R::Dfc,
        0x002 => R::Cacr,
        0x003 => R::Tc,
        0x004 => R::Itt0,
        0x005 => R::Itt1,
        0x006 => R::Dtt0,
        0x007 => R::Dtt1,
        0x800 => R::Usp,
        0x801 => R::Vbr,
        0x802 => R::Caar,
        0x803 => R::Msp,
        0x804 => R::Isp,
        0x805 => R::Mmusr,
        0x806 => R::Urp,
        0x807 => R::Srp,
        _ => return None,
    })
}

fn line4(r: &mut Reader<'_, '_>, w: u16) -> Result<Decoded, DecodeError> {
    let (m, n) = (mode(w), reg(w));
    let bare = |insn: I| -> Result<Decoded, DecodeError> { Ok(Decoded::no_size(insn, Vec::new())) };
    match w {
        0x4afc => return bare(I::Illegal),
        0x4e70 => return bare(I::Reset),
        0x4e71 => return bare(I::Nop),
        0x4e72 => {
            let value = r.word()?;
            return Ok(Decoded::no_size(I::Stop, vec![K::Imm(value as i64)]));
        }
        0x4e73 => return bare(I::Rte),
        0x4e74 => {
            r.require(Cpu::M68010)?;
            let disp = r.word()? as i16;
            return Ok(Decoded::no_size(I::Rtd, vec![K::Imm(disp as i64)]));
        }
        0x4e75 => return bare(I::Rts),
        0x4e76 => return bare(I::Trapv),
        0x4e77 => return bare(I::Rtr),
        0x4e7a | 0x4e7b => {
            r.require(Cpu::M68010)?;
            let ext = r.word()?;
            let control = control_register(ext & 0xfff).ok_or(DecodeError::InvalidEncoding)?;
            let register = K::Reg(general(ext >> 12));
            let ops = if w == 0x4e7a {
                vec![K::Reg(control), register]
            } else {
                vec![register, K::Reg(control)]
            };
            return Ok(Decoded::new(I::Movec, S::Long, ops));
        }
        _ => {}
    }

    match w & 0xfff8 {
        0x4e50 => {
            let disp = r.word()? as i16;
            return Ok(Decoded::new(I::Link, S::Word, vec![K::Reg(areg(n)), K::Imm(disp as i64)]));
        }
        0x4808 => {
            r.require(Cpu::M68020)?;
            let disp = r.long()? as i32;
            return Ok(Decoded::new(I::Link, S::Long, vec![K::Reg(areg(n)), K::Imm(disp as i64)]));
        }
        0x4e58 => return Ok(Decoded::no_size(I::Unlk, vec![K::Reg(areg(n))])),
        0x4e60 => {
            return Ok(Decoded::new(I::Move, S::Long, vec![K::Reg(areg(n)), K::Reg(R::Usp)]))
        }
        0x4e68 => {
            return Ok(Decoded::new(I::Move, S::Long, vec![K::Reg(R::Usp), K::Reg(areg(n))]))
        }
        0x4848 => {
            r.require(Cpu::M68010)?;
            return Ok(Decoded::no_size(I::Bkpt, vec![K::Imm(n as i64)]));
        }
        0x4840 => return Ok(Decoded::no_size(I::Swap, vec![K::Reg(dreg(n))])),
        0x4880 => return Ok(Decoded::new(I::Ext, S::Word, vec![K::Reg(dreg(n))])),
        0x48c0 => return Ok(Decoded::new(I::Ext, S::Long, vec![K::Reg(dreg(n))])),
        0x49c0 => {
            r.require(Cpu::M68020)?;
            return Ok(Decoded::new(I::Extb, S::Long, vec![K::Reg(dreg(n))]));
        }
        _ => {}
    }
    if w & 0xfff0 == 0x4e40 {
        return Ok(Decoded::no_size(I::Trap, vec![K::Imm((w & 15) as i64)]));
    }

    match w & 0xffc0 {
        0x4e80 => return Ok(Decoded::no_size(I::Jsr, vec![r.ea(m, n, S::None, CONTROL)?])),
        0x4ec0 => return Ok(Decoded::no_size(I::Jmp, vec![r.ea(m, n, S::None, CONTROL)?])),
        0x4840 => return Ok(Decoded::new(I::Pea, S::Long, vec![r.ea(m, n, S::Long, CONTROL)?])),
        0x4800 => return Ok(Decoded::new(I::Nbcd, S::Byte, vec![r.ea(m, n, S::Byte, DATA_ALT)?])),
        0x40c0 => {
            let dst = r.ea(m, n, S::Word, DATA_ALT)?;
            return Ok(Decoded::new(I::Move, S::Word, vec![K::Reg(R::Sr), dst]));
        }
        0x42c0 => {
            r.require(Cpu::M68010)?;
            let dst = r.ea(m, n, S::Word, DATA_ALT)?;
            return Ok(Decoded::new(I::Move, S::Word, vec![K::Reg(R::Ccr), dst]));
        }
        0x44c0 | 0x46c0 => {
            let target = if w & 0x200 != 0 { R::Sr } else { R::Ccr };
            let src = r.ea(m, n, S::Word, DATA)?;
            return Ok(Decoded::new(I::Move, S::Word, vec![src, K::Reg(target)]));
        }
        0x4ac0 => return Ok(Decoded::new(I::Tas, S::Byte, vec![r.ea(m, n, S::Byte, DATA_ALT)?])),
        0x4c00 => return multiply_long(r, w),
        0x4c40 => return divide_long(r, w),
        _ => {}
    }

    if w & 0xfb80 == 0x4880 && m != 0 {
        return movem(r, w);
    }

    let unary = match w & 0xff00 {
        0x4000 => Some(I::Negx),
        0x4200 => Some(I::Clr),
        0x4400 => Some(I::Neg),
        0x4600 => Some(I::Not),
        0x4a00 => Some(I::Tst),
        _ => None,
    };
    if let Some(insn) = unary {
        let size = size_field(w)?;
        let allowed = if insn == I::Tst && r.cpu >= Cpu::M68020 {
            sized(ALL, size)
        } else {
            DATA_ALT
        };
        return Ok(Decoded::new(insn, size, vec![r.ea(m, n, size, allowed)?]));
    }

    let dn = upper(w);
    match w & 0x1c0 {
        0x1c0 => {
            let src = r.ea(m, n, S::Long, CONTROL)?;
            Ok(Decoded::new(I::Lea, S::Long, vec![src, K::Reg(areg(dn))]))
        }
        0x180 => {
            let src = r.ea(m, n, S::Word, DATA)?;
            Ok(Decoded::new(I::Chk, S::Word, vec![src, K::Reg(dreg(dn))]))
        }
        0x100 => {
            r.require(Cpu::M68020)?;
            let src = r.ea(m, n, S::Long, DATA)?;
            Ok(Decoded::new(I::Chk, S::Long, vec![src, K::Reg(dreg(dn))]))
        }
        _ => Err(DecodeError::InvalidEncoding),
    }
}

fn movem(r: &mut Reader<'_, '_>, w: u16) -> Result<Decoded, DecodeError> {
    let size = if w & 0x40 != 0 { S::Long } else { S::Word };
    let mask = r.word()?;
    let (m, n) = (mode(w), reg(w));
    if w & 0x400 != 0 {
        let src = r.ea(m, n, size, CONTROL | POST_INCREMENT)?;
        Ok(Decoded::new(I::Movem, size, vec![src, K::RegList(mask as u32)]))
    } else {
        let dst = r.ea(m, n, size, CONTROL_ALT | PRE_DECREMENT)?;
        // -(An) lists a7 in bit 0 and d0 in bit 15
        let list = if m == 4 { mask.reverse_bits() } else { mask };
        Ok(Decoded::new(I::Movem, size, vec![K::RegList(list as u32), dst]))
    }
}

fn multiply_long(r: &mut Reader<'_, '_>, w: u16) -> Result<Decoded, DecodeError> {
    r.require(Cpu::M68020)?;
    let ext = r.word()?;
    let src = r.ea(mode(w), reg(w), S::Long, DATA)?;
    let insn = if ext & 0x800 != 0 { I::Muls } else { I::Mulu };
    let low = dreg(ext >> 12);
    let dst = if ext & 0x400 != 0 {
        K::RegPair(dreg(ext), low)
    } else {
        K::Reg(low)
    };
    Ok(Decoded::new(insn, S::Long, vec![src, dst]))
}

fn divide_long(r: &mut Reader<'_, '_>, w: u16) -> Result<Decoded, DecodeError> {
    r.require(Cpu::M68020)?;
    let ext = r.word()?;
    let src = r.ea(mode(w), reg(w), S::Long, DATA)?;
    let signed = ext & 0x800 != 0;
    let (quotient, remainder) = (dreg(ext >> 12), dreg(ext));
    let (insn, dst) = if ext & 0x400 != 0 {
        (if signed { I::Divs } else { I::Divu }, K::RegPair(remainder, quotient))
    } else if quotient != remainder {
        (if signed { I::Divsl } else { I::Divul }, K::RegPair(remainder, quotient))
    } else {
        (if signed { I::Divs } else { I::Divu }, K::Reg(quotient))
    };
    Ok(Decoded::new(insn, S::Long, vec![src, dst]))
}

fn line5(r: &mut Reader<'_, '_>, w: u16) -> Result<Decoded, DecodeError> {
    let (m, n) = (mode(w), reg(w));
    let cond = ((w >> 8) & 15) as usize;
    if (w >> 6) & 3 != 3 {
        let size = size_field(w)?;
        let insn = if w & 0x100 != 0 { I::Subq } else { I::Addq };
        let dst = r.ea(m, n, size, sized(ALTERABLE, size))?;
        return Ok(Decoded::new(insn, size, vec![K::Imm(quick(upper(w))), dst]));
    }
    match (m, n) {
        (1, _) => {
            let disp = r.word()? as i16;
            Ok(Decoded::no_size(
                DECREMENTS[cond],
                vec![K::Reg(dreg(n)), r.target(disp as i64)],
            ))
        }
        (7, 2..=4) => {
            r.require(Cpu::M68020)?;
            let insn = TRAPS[cond];
            Ok(match n {
                2 => Decoded::new(insn, S::Word, vec![K::Imm(r.word()? as i64)]),
                3 => Decoded::new(insn, S::Long, vec![K::Imm(r.long()? as i64)]),
                _ => Decoded::no_size(insn, Vec::new()),
            })
        }
        _ => {
            let dst = r.ea(m, n, S::Byte, DATA_ALT)?;
            Ok(Decoded::new(SETS[cond], S::Byte, vec![dst]))
        }
    }
}

fn branch(r: &mut Reader<'_, '_>, w: u16) -> Result<Decoded, DecodeError> {
    let insn = BRANCHES[((w >> 8) & 15) as usize];
    let (size, disp) = match w & 0xff {
        0 => (S::Word, r.word()? as i16 as i64),
        0xff if r.cpu >= Cpu::M68020 => (S::Long, r.long()? as i32 as i64),
        d => (S::Byte, d as u8 as i8 as i64),
    };
    Ok(Decoded::new(insn, size, vec![r.target(disp)]))
}

/// `abcd`, `sbcd`, `addx`, `subx`: data registers or predecrement pairs, selected by bit 3.
fn register_pair(w: u16) -> Vec<K> {
    if w & 8 != 0 {
        vec![pre_decrement(reg(w)), pre_decrement(upper(w))]
    } else {
        vec![K::Reg(dreg(reg(w))), K::Reg(dreg(upper(w)))]
    }
}

/// `and` and `or`: bit 8 selects whether the data register is the destination.
fn logic(r: &mut Reader<'_, '_>, w: u16, insn: I) -> Result<Decoded, DecodeError> {
    let size = size_field(w)?;
    let data = K::Reg(dreg(upper(w)));
    if w & 0x100 == 0 {
        let src = r.ea(mode(w), reg(w), size, DATA)?;
        Ok(Decoded::new(insn, size, vec![src, data]))
    } else {
        let dst = r.ea(mode(w), reg(w), size, MEM_ALT)?;
        Ok(Decoded::new(insn, size, vec![data, dst]))
    }
}

fn word_multiply(r: &mut Reader<'_, '_>, w: u16, insn: I) -> Result<Decoded, DecodeError> {
    let src = r.ea(mode(w), reg(w), S::Word, DATA)?;
    Ok(Decoded::new(insn, S::Word, vec![src, K::Reg(dreg(upper(w)))]))
}

fn line8(r: &mut Reader<'_, '_>, w: u16) -> Result<Decoded, DecodeError> {
    match w & 0x1c0 {
        0x0c0 => return word_multiply(r, w, I::Divu),
        0x1c0 => return word_multiply(r, w, I::Divs),
        _ => {}
    }
    match w & 0x1f0 {
        0x100 => Ok(Decoded::new(I::Sbcd, S::Byte, register_pair(w))),
        0x140 | 0x180 => {
            r.require(Cpu::M68020)?;
            let insn = if w & 0x1f0 == 0x140 { I::Pack } else { I::Unpk };
            let mut ops = register_pair(w);
            ops.push(K::Imm(r.word()? as i64));
            Ok(Decoded::no_size(insn, ops))
        }
        _ => logic(r, w, I::Or),
    }
}

fn arithmetic(
    r: &mut Reader<'_, '_>,
    w: u16,
    insn: I,
    address: I,
    extended: I,
) -> Result<Decoded, DecodeError> {
    let (m, n) = (mode(w), reg(w));
    let opmode = (w >> 6) & 7;
    match opmode {
        3 | 7 => {
            let size = if opmode == 3 { S::Word } else { S::Long };
            let src = r.ea(m, n, size, ALL)?;
            Ok(Decoded::new(address, size, vec![src, K::Reg(areg(upper(w)))]))
        }
        0..=2 => {
            let size = size_field(w)?;
            let src = r.ea(m, n, size, sized(ALL, size))?;
            Ok(Decoded::new(insn, size, vec![src, K::Reg(dreg(upper(w)))]))
        }
        _ => {
            let size = size_field(w)?;
            if m <= 1 {
                return Ok(Decoded::new(extended, size, register_pair(w)));
            }
            let dst = r.ea(m, n, size, MEM_ALT)?;
            Ok(Decoded::new(insn, size, vec![K::Reg(dreg(upper(w))), dst]))
        }
    }
}

fn line_b(r: &mut Reader<'_, '_>, w: u16) -> Result<Decoded, DecodeError> {
    let (m, n) = (mode(w), reg(w));
    let opmode = (w >> 6) & 7;
    match opmode {
        3 | 7 => {
            let size = if opmode == 3 { S::Word } else { S::Long };
            let src = r.ea(m, n, size, ALL)?;
            Ok(Decoded::new(I::Cmpa, size, vec![src, K::Reg(areg(upper(w)))]))
        }
        0..=2 => {
            let size = size_field(w)?;
            let src = r.ea(m, n, size, sized(ALL, size))?;
            Ok(Decoded::new(I::Cmp, size, vec![src, K::Reg(dreg(upper(w)))]))
        }
        _ if m == 1 => {
            let size = size_field(w)?;
            Ok(Decoded::new(I::Cmpm, size, vec![post_increment(n), post_increment(upper(w))]))
        }
        _ => {
            let size = size_field(w)?;
            let dst = r.ea(m, n, size, DATA_ALT)?;
            Ok(Decoded::new(I::Eor, size, vec![K::Reg(dreg(upper(w))), dst]))
        }
    }
}

fn line_c(r: &mut Reader<'_, '_>, w: u16) -> Result<Decoded, DecodeError> {
    match w & 0x1c0 {
        0x0c0 => return word_multiply(r, w, I::Mulu),
        0x1c0 => return word_multiply(r, w, I::Muls),
        _ => {}
    }
    let (x, y) = (upper(w), reg(w));
    let exchange = match w & 0x1f8 {
        0x140 => Some((dreg(x), dreg(y))),
        0x148 => Some((areg(x), areg(y))),
        0x188 => Some((dreg(x), areg(y))),
        _ => None,
    };
    if let Some((a, b)) = exchange {
        return Ok(Decoded::new(I::Exg, S::Long, vec![K::Reg(a), K::Reg(b)]));
    }
    if w & 0x1f0 == 0x100 {
        return Ok(Decoded::new(I::Abcd, S::Byte, register_pair(w)));
    }
    logic(r, w, I::And)
}

fn line_e(r: &mut Reader<'_, '_>, w: u16) -> Result<Decoded, DecodeError> {
    let left = ((w >> 8) & 1) as usize;
    if (w >> 6) & 3 != 3 {
        let size = size_field(w)?;
        let insn = SHIFTS[((w >> 3) & 3) as usize][left];
        let count = if w & 0x20 != 0 {
            K::Reg(dreg(upper(w)))
        } else {
            K::Imm(quick(upper(w)))
        };
        return Ok(Decoded::new(insn, size, vec![count, K::Reg(dreg(reg(w)))]));
    }
    if w & 0x800 == 0 {
        let insn = SHIFTS[((w >> 9) & 3) as usize][left];
        let dst = r.ea(mode(w), reg(w), S::Word, MEM_ALT)?;
        return Ok(Decoded::new(insn, S::Word, vec![dst]));
    }
    bit_field(r, w)
}

fn bit_field(r: &mut Reader<'_, '_>, w: u16) -> Result<Decoded, DecodeError> {
    r.require(Cpu::M68020)?;
    let insn = [
        I::Bftst,
        I::Bfextu,
        I::Bfchg,
        I::Bfexts,
        I::Bfclr,
        I::Bfffo,
        I::Bfset,
        I::Bfins,
    ][((w >> 8) & 7) as usize];
    let ext = r.word()?;
    let reads_only = matches!(insn, I::Bftst | I::Bfextu | I::Bfexts | I::Bfffo);
    let allowed = if reads_only { CONTROL | 1 } else { CONTROL_ALT | 1 };
    let ea = r.ea(mode(w), reg(w), S::None, allowed)?;

    let offset = if ext & 0x800 != 0 {
        M68kBitValue::Reg(dreg(ext >> 6))
    } else {
        M68kBitValue::Imm(((ext >> 6) & 31) as u8)
    };
    let width = match ext & 0x3f {
        bits if bits & 0x20 != 0 => M68kBitValue::Reg(dreg(bits)),
        0 => M68kBitValue::Imm(32),
        bits => M68kBitValue::Imm(bits as u8),
    };
    let register = K::Reg(dreg(ext >> 12));
    let (ops, operand) = match insn {
        I::Bfextu | I::Bfexts | I::Bfffo => (vec![ea, register], 0),
        I::Bfins => (vec![register, ea], 1),
        _ => (vec![ea], 0),
    };
    let mut decoded = Decoded::no_size(insn, ops);
    decoded.bitfield = Some(M68kBitField {
        operand,
        offset,
        width,
    });
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::{Cursor, Endian};

    fn one(bytes: &[u8], cpu: Cpu) -> Result<Decoded, DecodeError> {
        let mut cursor = Cursor::new(bytes, Endian::Big);
        decode(&mut Reader::new(&mut cursor, cpu, 0x1000))
    }

    #[test]
    fn test_movem_lists() {
        // movem.l d0-d2/a0, -(a7)
        let d = one(&[0x48, 0xe7, 0xe0, 0x80], Cpu::M68000).unwrap();
        assert_eq!(d.ops[0], K::RegList(0x0107));
        // movem.l (a7)+, d0-d2/a0
        let d = one(&[0x4c, 0xdf, 0x01, 0x07], Cpu::M68000).unwrap();
        assert_eq!(d.ops[1], K::RegList(0x0107));
    }

    #[test]
    fn test_conditionals() {
        // dbf d0, $0ffe
        let d = one(&[0x51, 0xc8, 0xff, 0xfc], Cpu::M68000).unwrap();
        assert_eq!((d.insn, d.ops[1]), (I::Dbf, K::Target(0xffe)));
        // trapne.w #$10 needs a 68020
        assert_eq!(one(&[0x56, 0xfa, 0x00, 0x10], Cpu::M68000), Err(DecodeError::InvalidEncoding));
        assert_eq!(one(&[0x56, 0xfa, 0x00, 0x10], Cpu::M68020).unwrap().insn, I::Trapne);
        // bra.l is a 68020 form; on a 68000 0xff is a byte displacement
        assert_eq!(one(&[0x60, 0xff], Cpu::M68000).unwrap().ops, [K::Target(0x1001)]);
    }

    #[test]
    fn test_long_arithmetic() {
        // divsl.l d0, d3:d1
        let d = one(&[0x4c, 0x40, 0x18, 0x03], Cpu::M68020).unwrap();
        assert_eq!(d.insn, I::Divsl);
        assert_eq!(d.ops[1], K::RegPair(R::D3, R::D1));
        // mulu.l d0, d1
        let d = one(&[0x4c, 0x00, 0x10, 0x01], Cpu::M68020).unwrap();
        assert_eq!((d.insn, d.ops[1]), (I::Mulu, K::Reg(R::D1)));
    }

    #[test]
    fn test_bit_field() {
        // bfextu (a0){4:8}, d1
        let d = one(&[0xe9, 0xd0, 0x11, 0x08], Cpu::M68020).unwrap();
        assert_eq!(d.insn, I::Bfextu);
        let field = d.bitfield.unwrap();
        assert_eq!((field.offset, field.width), (M68kBitValue::Imm(4), M68kBitValue::Imm(8)));
    }

    #[test]
    fn test_rejects() {
        // movea.b does not exist
        assert_eq!(one(&[0x10, 0x40], Cpu::M68040), Err(DecodeError::InvalidEncoding));
        // line A is unimplemented
        assert_eq!(one(&[0xa0, 0x00], Cpu::M68040), Err(DecodeError::InvalidEncoding));
        assert!(matches!(one(&[0x4e], Cpu::M68040), Err(DecodeError::TruncatedInstruction(_))));
    }
}
