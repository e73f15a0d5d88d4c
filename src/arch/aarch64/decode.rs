//! Integer, branch, system and load/store encodings.

use super::{
    bit, field, fp, fpreg, gpr, is_zero_reg, Arm64Cc, Arm64Extend, Arm64Group as G,
    Arm64Insn as I, Arm64Reg, Arm64Shift, Decoded, FpSize, Indexing, Mem, MemOffset, Op,
};
use crate::arch::sign_extend;
use crate::decoder::DecodeError;

pub(super) fn decode(word: u32, address: u64) -> Result<Decoded, DecodeError> {
    match field(word, 25, 4) {
        0b1000 | 0b1001 => data_immediate(word, address),
        0b1010 | 0b1011 => branch_system(word, address),
        0b0100 | 0b0110 | 0b1100 | 0b1110 => load_store(word, address),
        0b0101 | 0b1101 => data_register(word),
        0b0111 | 0b1111 => fp::decode(word),
        _ => Err(DecodeError::InvalidEncoding),
    }
}

fn reg(sf: bool, word: u32, lo: u32) -> Arm64Reg {
    gpr(sf, field(word, lo, 5), false)
}

fn reg_sp(sf: bool, word: u32, lo: u32) -> Arm64Reg {
    gpr(sf, field(word, lo, 5), true)
}

fn target(address: u64, offset: i64) -> Op {
    Op::Target(address.wrapping_add(offset as u64))
}

// ---------------------------------------------------------------------------------------
// data processing, immediate

fn data_immediate(word: u32, address: u64) -> Result<Decoded, DecodeError> {
    let sf = bit(word, 31);
    match field(word, 23, 3) {
        0b000 | 0b001 => {
            let imm = field(word, 5, 19) << 2 | field(word, 29, 2);
            let rd = Op::Reg(reg(true, word, 0));
            if bit(word, 31) {
                let offset = sign_extend(imm as u64, 21) << 12;
                let base = address & !0xfff;
                Ok(Decoded::new(I::Adrp, vec![rd, target(base, offset)]))
            } else {
                let offset = sign_extend(imm as u64, 21);
                Ok(Decoded::new(I::Adr, vec![rd, target(address, offset)]))
            }
        }
        0b010 => add_sub_immediate(word, sf),
        0b100 => logical_immediate(word, sf),
        0b101 => move_wide(word, sf),
        0b110 => bitfield(word, sf),
        0b111 => {
            if bit(word, 22) != sf || bit(word, 21) || field(word, 29, 2) != 0 {
                return Err(DecodeError::InvalidEncoding);
            }
            let (rd, rn, rm) = (reg(sf, word, 0), reg(sf, word, 5), reg(sf, word, 16));
            let lsb = Op::Imm(field(word, 10, 6) as i64);
            if rn == rm {
                Ok(Decoded::new(I::Ror, vec![Op::Reg(rd), Op::Reg(rn), lsb]))
            } else {
                Ok(Decoded::new(I::Extr, vec![Op::Reg(rd), Op::Reg(rn), Op::Reg(rm), lsb]))
            }
        }
        _ => Err(DecodeError::InvalidEncoding),
    }
}

fn add_sub_immediate(word: u32, sf: bool) -> Result<Decoded, DecodeError> {
    let (sub, s) = (bit(word, 30), bit(word, 29));
    let imm = field(word, 10, 12) as u64;
    let shift = if bit(word, 22) { 12 } else { 0 };
    let rn = reg_sp(sf, word, 5);
    let rd = if s { reg(sf, word, 0) } else { reg_sp(sf, word, 0) };
    let operand = Op::ImmShift(imm, shift);
    let sp = |r: Arm64Reg| matches!(r, Arm64Reg::Sp | Arm64Reg::Wsp);
    let decoded = match (sub, s) {
        (false, false) if imm == 0 && shift == 0 && (sp(rd) || sp(rn)) => {
            Decoded::new(I::Mov, vec![Op::Reg(rd), Op::Reg(rn)])
        }
        (false, true) if is_zero_reg(rd) => Decoded::new(I::Cmn, vec![Op::Reg(rn), operand]),
        (true, true) if is_zero_reg(rd) => Decoded::new(I::Cmp, vec![Op::Reg(rn), operand]),
        _ => {
            let insn = match (sub, s) {
                (false, false) => I::Add,
                (false, true) => I::Adds,
                (true, false) => I::Sub,
                (true, true) => I::Subs,
            };
            Decoded::new(insn, vec![Op::Reg(rd), Op::Reg(rn), operand])
        }
    };
    Ok(decoded)
}

/// Expands the `N:immr:imms` bitmask immediate.
pub(super) fn decode_bitmask(n: u32, immr: u32, imms: u32, sf: bool) -> Option<u64> {
    let combined = (n << 6) | (!imms & 0x3f);
    if combined == 0 {
        return None;
    }
    let len = 31 - combined.leading_zeros();
    if len < 1 || (!sf && n == 1) {
        return None;
    }
    let size = 1u32 << len;
    let levels = size - 1;
    let s = imms & levels;
    let r = immr & levels;
    if s == levels {
        return None;
    }
    let ones = (1u64 << (s + 1)) - 1;
    let mut pattern = if r == 0 {
        ones
    } else {
        let mask = if size == 64 { u64::MAX } else { (1u64 << size) - 1 };
        ((ones >> r) | (ones << (size - r))) & mask
    };
    let mut width = size;
    let total = if sf { 64 } else { 32 };
    while width < total {
        pattern |= pattern << width;
        width *= 2;
    }
    if !sf {
        pattern &= 0xffff_ffff;
    }
    Some(pattern)
}

fn logical_immediate(word: u32, sf: bool) -> Result<Decoded, DecodeError> {
    let imm = decode_bitmask(bit(word, 22) as u32, field(word, 16, 6), field(word, 10, 6), sf)
        .ok_or(DecodeError::InvalidEncoding)?;
    let opc = field(word, 29, 2);
    let rn = reg(sf, word, 5);
    let rd = if opc == 0b11 {
        reg(sf, word, 0)
    } else {
        reg_sp(sf, word, 0)
    };
    let value = Op::Imm(imm as i64);
    let decoded = match opc {
        0b00 => Decoded::new(I::And, vec![Op::Reg(rd), Op::Reg(rn), value]),
        0b01 if is_zero_reg(rn) => Decoded::new(I::Mov, vec![Op::Reg(rd), value]),
        0b01 => Decoded::new(I::Orr, vec![Op::Reg(rd), Op::Reg(rn), value]),
        0b10 => Decoded::new(I::Eor, vec![Op::Reg(rd), Op::Reg(rn), value]),
        _ if is_zero_reg(rd) => Decoded::new(I::Tst, vec![Op::Reg(rn), value]),
        _ => Decoded::new(I::Ands, vec![Op::Reg(rd), Op::Reg(rn), value]),
    };
    Ok(decoded)
}

fn move_wide(word: u32, sf: bool) -> Result<Decoded, DecodeError> {
    let hw = field(word, 21, 2);
    if !sf && hw > 1 {
        return Err(DecodeError::InvalidEncoding);
    }
    let imm16 = field(word, 5, 16) as u64;
    let shift = hw * 16;
    let rd = Op::Reg(reg(sf, word, 0));
    let mask = if sf { u64::MAX } else { 0xffff_ffff };
    let decoded = match field(word, 29, 2) {
        0b00 => {
            let value = !(imm16 << shift) & mask;
            let keep_movn = (imm16 == 0 && hw != 0) || (!sf && imm16 == 0xffff);
            if keep_movn {
                Decoded::new(I::Movn, vec![rd, Op::ImmShift(imm16, shift)])
            } else {
                let signed = if sf { value as i64 } else { value as u32 as i32 as i64 };
                Decoded::new(I::Mov, vec![rd, Op::Imm(signed)])
            }
        }
        0b10 if imm16 == 0 && hw != 0 => Decoded::new(I::Movz, vec![rd, Op::ImmShift(0, shift)]),
        0b10 => Decoded::new(I::Mov, vec![rd, Op::Imm((imm16 << shift) as i64)]),
        0b11 => Decoded::new(I::Movk, vec![rd, Op::ImmShift(imm16, shift)]),
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

fn bitfield(word: u32, sf: bool) -> Result<Decoded, DecodeError> {
    if bit(word, 22) != sf {
        return Err(DecodeError::InvalidEncoding);
    }
    let size = if sf { 64 } else { 32 };
    let (immr, imms) = (field(word, 16, 6), field(word, 10, 6));
    if !sf && (immr > 31 || imms > 31) {
        return Err(DecodeError::InvalidEncoding);
    }
    let rd = Op::Reg(reg(sf, word, 0));
    let rn = reg(sf, word, 5);
    let imm = |v: u32| Op::Imm(v as i64);
    let decoded = match field(word, 29, 2) {
        0b00 => {
            if imms == size - 1 {
                Decoded::new(I::Asr, vec![rd, Op::Reg(rn), imm(immr)])
            } else if imms < immr {
                Decoded::new(
                    I::Sbfiz,
                    vec![rd, Op::Reg(rn), imm(size - immr), imm(imms + 1)],
                )
            } else if immr == 0 && matches!(imms, 7 | 15 | 31) {
                let insn = match imms {
                    7 => I::Sxtb,
                    15 => I::Sxth,
                    _ => I::Sxtw,
                };
                Decoded::new(insn, vec![rd, Op::Reg(reg(false, word, 5))])
            } else {
                Decoded::new(
                    I::Sbfx,
                    vec![rd, Op::Reg(rn), imm(immr), imm(imms - immr + 1)],
                )
            }
        }
        0b01 => {
            if imms < immr {
                Decoded::new(
                    I::Bfi,
                    vec![rd, Op::Reg(rn), imm(size - immr), imm(imms + 1)],
                )
            } else {
                Decoded::new(
                    I::Bfxil,
                    vec![rd, Op::Reg(rn), imm(immr), imm(imms - immr + 1)],
                )
            }
        }
        0b10 => {
            if imms == size - 1 {
                Decoded::new(I::Lsr, vec![rd, Op::Reg(rn), imm(immr)])
            } else if imms + 1 == immr {
                Decoded::new(I::Lsl, vec![rd, Op::Reg(rn), imm(size - 1 - imms)])
            } else if imms < immr {
                Decoded::new(
                    I::Ubfiz,
                    vec![rd, Op::Reg(rn), imm(size - immr), imm(imms + 1)],
                )
            } else if immr == 0 && !sf && matches!(imms, 7 | 15) {
                let insn = if imms == 7 { I::Uxtb } else { I::Uxth };
                Decoded::new(insn, vec![rd, Op::Reg(rn)])
            } else {
                Decoded::new(
                    I::Ubfx,
                    vec![rd, Op::Reg(rn), imm(immr), imm(imms - immr + 1)],
                )
            }
        }
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

// ---------------------------------------------------------------------------------------
// branches, exception generation and system

fn branch_system(word: u32, address: u64) -> Result<Decoded, DecodeError> {
    if word & 0x7c00_0000 == 0x1400_0000 {
        let offset = sign_extend(field(word, 0, 26) as u64, 26) << 2;
        let insn = if bit(word, 31) { I::Bl } else { I::B };
        return Ok(Decoded::new(insn, vec![target(address, offset)]));
    }
    if word & 0xff00_0010 == 0x5400_0000 {
        let offset = sign_extend(field(word, 5, 19) as u64, 19) << 2;
        return Ok(Decoded::new(I::B, vec![target(address, offset)])
            .cc(Arm64Cc::from_bits(field(word, 0, 4))));
    }
    if word & 0x7e00_0000 == 0x3400_0000 {
        let sf = bit(word, 31);
        let offset = sign_extend(field(word, 5, 19) as u64, 19) << 2;
        let insn = if bit(word, 24) { I::Cbnz } else { I::Cbz };
        return Ok(Decoded::new(
            insn,
            vec![Op::Reg(reg(sf, word, 0)), target(address, offset)],
        ));
    }
    if word & 0x7e00_0000 == 0x3600_0000 {
        let bit_pos = field(word, 31, 1) << 5 | field(word, 19, 5);
        let offset = sign_extend(field(word, 5, 14) as u64, 14) << 2;
        let insn = if bit(word, 24) { I::Tbnz } else { I::Tbz };
        return Ok(Decoded::new(
            insn,
            vec![
                Op::Reg(reg(bit_pos >= 32, word, 0)),
                Op::Imm(bit_pos as i64),
                target(address, offset),
            ],
        ));
    }
    if word & 0xff00_0000 == 0xd400_0000 {
        return exception(word);
    }
    if word & 0xffc0_0000 == 0xd500_0000 {
        return system(word);
    }
    if word & 0xfe00_0000 == 0xd600_0000 {
        return branch_register(word);
    }
    Err(DecodeError::InvalidEncoding)
}

fn exception(word: u32) -> Result<Decoded, DecodeError> {
    let imm = Op::Imm(field(word, 5, 16) as i64);
    let insn = match (field(word, 21, 3), field(word, 0, 5)) {
        (0b000, 0b00001) => I::Svc,
        (0b000, 0b00010) => I::Hvc,
        (0b000, 0b00011) => I::Smc,
        (0b001, 0b00000) => I::Brk,
        (0b010, 0b00000) => I::Hlt,
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(Decoded::new(insn, vec![imm]))
}

fn branch_register(word: u32) -> Result<Decoded, DecodeError> {
    if field(word, 16, 5) != 0b11111 || field(word, 10, 6) != 0 || field(word, 0, 5) != 0 {
        return Err(DecodeError::InvalidEncoding);
    }
    let rn = reg(true, word, 5);
    let decoded = match field(word, 21, 4) {
        0b0000 => Decoded::new(I::Br, vec![Op::Reg(rn)]),
        0b0001 => Decoded::new(I::Blr, vec![Op::Reg(rn)]),
        0b0010 if rn == Arm64Reg::X30 => Decoded::new(I::Ret, Vec::new()),
        0b0010 => Decoded::new(I::Ret, vec![Op::Reg(rn)]),
        0b0100 if field(word, 5, 5) == 0b11111 => Decoded::new(I::Eret, Vec::new()),
        0b0101 if field(word, 5, 5) == 0b11111 => Decoded::new(I::Drps, Vec::new()),
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

fn barrier_option(crm: u32) -> String {
    let name = match crm {
        1 => "oshld",
        2 => "oshst",
        3 => "osh",
        5 => "nshld",
        6 => "nshst",
        7 => "nsh",
        9 => "ishld",
        10 => "ishst",
        11 => "ish",
        13 => "ld",
        14 => "st",
        15 => "sy",
        other => return format!("#{}", other),
    };
    name.to_string()
}

/// Named system registers, keyed by `(op0, op1, CRn, CRm, op2)`.
const SYSTEM_REGISTERS: &[((u32, u32, u32, u32, u32), &str)] = &[
    ((2, 3, 0, 5, 0), "dbgdtrtx_el0"),
    ((2, 3, 0, 4, 0), "dbgdtr_el0"),
    ((2, 0, 0, 2, 2), "mdscr_el1"),
    ((3, 0, 0, 0, 0), "midr_el1"),
    ((3, 0, 0, 0, 5), "mpidr_el1"),
    ((3, 0, 0, 0, 6), "revidr_el1"),
    ((3, 0, 0, 4, 0), "id_aa64pfr0_el1"),
    ((3, 0, 0, 7, 0), "id_aa64mmfr0_el1"),
    ((3, 0, 1, 0, 0), "sctlr_el1"),
    ((3, 0, 1, 0, 2), "cpacr_el1"),
    ((3, 0, 2, 0, 0), "ttbr0_el1"),
    ((3, 0, 2, 0, 1), "ttbr1_el1"),
    ((3, 0, 2, 0, 2), "tcr_el1"),
    ((3, 0, 4, 0, 0), "spsr_el1"),
    ((3, 0, 4, 0, 1), "elr_el1"),
    ((3, 0, 4, 1, 0), "sp_el0"),
    ((3, 0, 4, 2, 0), "spsel"),
    ((3, 0, 4, 2, 2), "currentel"),
    ((3, 0, 5, 1, 0), "afsr0_el1"),
    ((3, 0, 5, 2, 0), "esr_el1"),
    ((3, 0, 6, 0, 0), "far_el1"),
    ((3, 0, 7, 4, 0), "par_el1"),
    ((3, 0, 10, 2, 0), "mair_el1"),
    ((3, 0, 12, 0, 0), "vbar_el1"),
    ((3, 0, 13, 0, 1), "contextidr_el1"),
    ((3, 0, 13, 0, 4), "tpidr_el1"),
    ((3, 3, 0, 0, 1), "ctr_el0"),
    ((3, 3, 0, 0, 7), "dczid_el0"),
    ((3, 3, 4, 2, 0), "nzcv"),
    ((3, 3, 4, 2, 1), "daif"),
    ((3, 3, 4, 4, 0), "fpcr"),
    ((3, 3, 4, 4, 1), "fpsr"),
    ((3, 3, 13, 0, 2), "tpidr_el0"),
    ((3, 3, 13, 0, 3), "tpidrro_el0"),
    ((3, 3, 14, 0, 0), "cntfrq_el0"),
    ((3, 3, 14, 0, 1), "cntpct_el0"),
    ((3, 3, 14, 0, 2), "cntvct_el0"),
    ((3, 4, 1, 1, 0), "hcr_el2"),
    ((3, 4, 4, 0, 1), "elr_el2"),
    ((3, 6, 1, 1, 0), "scr_el3"),
];

fn system_register(key: (u32, u32, u32, u32, u32), read: bool) -> String {
    // The debug transfer register reads back as the receive half.
    if read && key == (2, 3, 0, 5, 0) {
        return "dbgdtrrx_el0".to_string();
    }
    SYSTEM_REGISTERS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, name)| name.to_string())
        .unwrap_or_else(|| {
            let (op0, op1, crn, crm, op2) = key;
            format!("s{}_{}_c{}_c{}_{}", op0, op1, crn, crm, op2)
        })
}

fn system(word: u32) -> Result<Decoded, DecodeError> {
    let read = bit(word, 21);
    let op0 = field(word, 19, 2);
    let op1 = field(word, 16, 3);
    let crn = field(word, 12, 4);
    let crm = field(word, 8, 4);
    let op2 = field(word, 5, 3);
    let rt = field(word, 0, 5);
    let decoded = match (op0, read) {
        (0b00, false) if crn == 0b0010 && rt == 31 => {
            let insn = match crm << 3 | op2 {
                0 => I::Nop,
                1 => I::Yield,
                2 => I::Wfe,
                3 => I::Wfi,
                4 => I::Sev,
                5 => I::Sevl,
                n => return Ok(Decoded::new(I::Hint, vec![Op::Imm(n as i64)])),
            };
            Decoded::new(insn, Vec::new())
        }
        (0b00, false) if crn == 0b0011 && rt == 31 => match op2 {
            0b010 => Decoded::new(I::Clrex, Vec::new()),
            0b100 => Decoded::new(I::Dsb, vec![Op::Sym(barrier_option(crm))]),
            0b101 => Decoded::new(I::Dmb, vec![Op::Sym(barrier_option(crm))]),
            0b110 if crm == 0b1111 => Decoded::new(I::Isb, Vec::new()),
            0b110 => Decoded::new(I::Isb, vec![Op::Sym(barrier_option(crm))]),
            _ => return Err(DecodeError::InvalidEncoding),
        },
        (0b00, false) if crn == 0b0100 && rt == 31 => {
            let name = match (op1, op2) {
                (0b000, 0b101) => "spsel",
                (0b011, 0b110) => "daifset",
                (0b011, 0b111) => "daifclr",
                (0b000, 0b100) => "pan",
                (0b000, 0b011) => "uao",
                _ => return Err(DecodeError::InvalidEncoding),
            };
            Decoded::new(I::Msr, vec![Op::Sym(name.to_string()), Op::Imm(crm as i64)])
        }
        (0b01, _) => {
            let ops = vec![
                Op::Imm(op1 as i64),
                Op::Sym(format!("c{}", crn)),
                Op::Sym(format!("c{}", crm)),
                Op::Imm(op2 as i64),
            ];
            let xt = Op::Reg(gpr(true, rt, false));
            if read {
                let mut all = vec![xt];
                all.extend(ops);
                Decoded::new(I::Sysl, all)
            } else {
                let mut all = ops;
                if rt != 31 {
                    all.push(xt);
                }
                Decoded::new(I::Sys, all)
            }
        }
        (0b10 | 0b11, _) => {
            let name = Op::Sym(system_register((op0, op1, crn, crm, op2), read));
            let xt = Op::Reg(gpr(true, rt, false));
            if read {
                Decoded::new(I::Mrs, vec![xt, name])
            } else {
                Decoded::new(I::Msr, vec![name, xt])
            }
        }
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

// ---------------------------------------------------------------------------------------
// loads and stores

fn load_store(word: u32, address: u64) -> Result<Decoded, DecodeError> {
    if word & 0x3f00_0000 == 0x0800_0000 {
        return exclusive(word);
    }
    if word & 0x3b00_0000 == 0x1800_0000 {
        return literal(word, address);
    }
    if word & 0x3a00_0000 == 0x2800_0000 {
        return pair(word);
    }
    if word & 0x3b00_0000 == 0x3900_0000 {
        return single(word, Form::Unsigned);
    }
    if word & 0x3b20_0000 == 0x3800_0000 {
        let form = match field(word, 10, 2) {
            0b00 => Form::Unscaled,
            0b01 => Form::Post,
            0b10 => Form::Unprivileged,
            _ => Form::Pre,
        };
        return single(word, form);
    }
    if word & 0x3b20_0c00 == 0x3820_0800 {
        return single(word, Form::Register);
    }
    Err(DecodeError::InvalidEncoding)
}

fn exclusive(word: u32) -> Result<Decoded, DecodeError> {
    let size = field(word, 30, 2);
    let (o2, load, o1, o0) = (bit(word, 23), bit(word, 22), bit(word, 21), bit(word, 15));
    if o1 {
        return Err(DecodeError::InvalidEncoding);
    }
    let sf = size == 3;
    let rt = Op::Reg(reg(sf, word, 0));
    let base = Op::Mem(Mem {
        base: reg_sp(true, word, 5),
        offset: MemOffset::Imm(0),
        indexing: Indexing::Offset,
    });
    let pick = |byte: I, half: I, word_or_x: I| match size {
        0 => byte,
        1 => half,
        _ => word_or_x,
    };
    let decoded = match (o2, load, o0) {
        (false, false, _) => {
            let insn = if o0 {
                pick(I::Stlxrb, I::Stlxrh, I::Stlxr)
            } else {
                pick(I::Stxrb, I::Stxrh, I::Stxr)
            };
            let status = Op::Reg(reg(false, word, 16));
            Decoded::new(insn, vec![status, rt, base])
        }
        (false, true, _) => {
            let insn = if o0 {
                pick(I::Ldaxrb, I::Ldaxrh, I::Ldaxr)
            } else {
                pick(I::Ldxrb, I::Ldxrh, I::Ldxr)
            };
            Decoded::new(insn, vec![rt, base])
        }
        (true, false, true) => Decoded::new(pick(I::Stlrb, I::Stlrh, I::Stlr), vec![rt, base]),
        (true, true, true) => Decoded::new(pick(I::Ldarb, I::Ldarh, I::Ldar), vec![rt, base]),
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

fn literal(word: u32, address: u64) -> Result<Decoded, DecodeError> {
    let offset = sign_extend(field(word, 5, 19) as u64, 19) << 2;
    let rt = field(word, 0, 5);
    let (insn, reg) = match (field(word, 30, 2), bit(word, 26)) {
        (0b00, false) => (I::Ldr, gpr(false, rt, false)),
        (0b01, false) => (I::Ldr, gpr(true, rt, false)),
        (0b10, false) => (I::Ldrsw, gpr(true, rt, false)),
        (0b11, false) => {
            return Ok(Decoded::new(
                I::Prfm,
                vec![Op::Sym(prefetch_op(rt)), target(address, offset)],
            ))
        }
        (0b00, true) => (I::Ldr, fpreg(FpSize::S, rt)),
        (0b01, true) => (I::Ldr, fpreg(FpSize::D, rt)),
        (0b10, true) => (I::Ldr, fpreg(FpSize::Q, rt)),
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(Decoded::new(insn, vec![Op::Reg(reg), target(address, offset)]))
}

fn prefetch_op(rt: u32) -> String {
    let kind = match field(rt, 3, 2) {
        0 => "pld",
        1 => "pli",
        2 => "pst",
        _ => return format!("#{}", rt),
    };
    let level = field(rt, 1, 2);
    if level == 3 {
        return format!("#{}", rt);
    }
    let policy = if bit(rt, 0) { "strm" } else { "keep" };
    format!("{}l{}{}", kind, level + 1, policy)
}

fn pair(word: u32) -> Result<Decoded, DecodeError> {
    let opc = field(word, 30, 2);
    let simd = bit(word, 26);
    let load = bit(word, 22);
    let mode = field(word, 23, 2);
    let (scale, insn, rsize) = match (opc, simd) {
        (0b00, false) => (2, None, None),
        (0b01, false) if load && mode != 0 => (2, Some(I::Ldpsw), None),
        (0b10, false) => (3, None, None),
        (0b00, true) => (2, None, Some(FpSize::S)),
        (0b01, true) => (3, None, Some(FpSize::D)),
        (0b10, true) => (4, None, Some(FpSize::Q)),
        _ => return Err(DecodeError::InvalidEncoding),
    };
    let insn = insn.unwrap_or(match (mode, load) {
        (0b00, false) => I::Stnp,
        (0b00, true) => I::Ldnp,
        (_, false) => I::Stp,
        (_, true) => I::Ldp,
    });
    let wide = opc != 0b00;
    let make = |n: u32| match rsize {
        Some(size) => fpreg(size, n),
        None => gpr(wide, n, false),
    };
    let disp = sign_extend(field(word, 15, 7) as u64, 7) << scale;
    let indexing = match mode {
        0b01 => Indexing::Post,
        0b11 => Indexing::Pre,
        _ => Indexing::Offset,
    };
    let mem = Mem {
        base: reg_sp(true, word, 5),
        offset: MemOffset::Imm(disp),
        indexing,
    };
    let mut decoded = Decoded::new(
        insn,
        vec![
            Op::Reg(make(field(word, 0, 5))),
            Op::Reg(make(field(word, 10, 5))),
            Op::Mem(mem),
        ],
    );
    if simd {
        decoded = decoded.group(G::FpArmv8);
    }
    Ok(decoded)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Form {
    Unsigned,
    Unscaled,
    Post,
    Pre,
    Unprivileged,
    Register,
}

/// Selects the mnemonic and transfer register for a single-register load or store.
fn single_kind(size: u32, opc: u32, simd: bool, form: Form) -> Option<(I, RegKind, u32)> {
    use Form::*;
    if simd {
        let (fs, scale) = match (size, opc >> 1) {
            (0b00, 0) => (FpSize::B, 0),
            (0b01, 0) => (FpSize::H, 1),
            (0b10, 0) => (FpSize::S, 2),
            (0b11, 0) => (FpSize::D, 3),
            (0b00, 1) => (FpSize::Q, 4),
            _ => return None,
        };
        let load = opc & 1 == 1;
        let insn = match (form, load) {
            (Unscaled, false) => I::Stur,
            (Unscaled, true) => I::Ldur,
            (Unprivileged, _) => return None,
            (_, false) => I::Str,
            (_, true) => I::Ldr,
        };
        return Some((insn, RegKind::Fp(fs), scale));
    }
    let insn = match form {
        Unscaled => match (size, opc) {
            (0b00, 0) => I::Sturb,
            (0b00, 1) => I::Ldurb,
            (0b00, _) => I::Ldursb,
            (0b01, 0) => I::Sturh,
            (0b01, 1) => I::Ldurh,
            (0b01, _) => I::Ldursh,
            (_, 0) => I::Stur,
            (_, 1) => I::Ldur,
            (0b10, 2) => I::Ldursw,
            (0b11, 2) => I::Prfum,
            _ => return None,
        },
        Unprivileged => match (size, opc) {
            (0b00, 0) => I::Sttrb,
            (0b00, 1) => I::Ldtrb,
            (0b00, _) => I::Ldtrsb,
            (0b01, 0) => I::Sttrh,
            (0b01, 1) => I::Ldtrh,
            (0b01, _) => I::Ldtrsh,
            (_, 0) => I::Sttr,
            (_, 1) => I::Ldtr,
            (0b10, 2) => I::Ldtrsw,
            _ => return None,
        },
        _ => match (size, opc) {
            (0b00, 0) => I::Strb,
            (0b00, 1) => I::Ldrb,
            (0b00, _) => I::Ldrsb,
            (0b01, 0) => I::Strh,
            (0b01, 1) => I::Ldrh,
            (0b01, _) => I::Ldrsh,
            (_, 0) => I::Str,
            (_, 1) => I::Ldr,
            (0b10, 2) => I::Ldrsw,
            (0b11, 2) if matches!(form, Unsigned | Register) => I::Prfm,
            _ => return None,
        },
    };
    // opc 10 sign-extends to 64 bits, opc 11 to 32 bits
    let wide = match (size, opc) {
        (0b11, _) => true,
        (0b00 | 0b01, 2) => true,
        (0b10, 2) => true,
        _ => false,
    };
    let kind = if matches!(insn, I::Prfm | I::Prfum) {
        RegKind::Prefetch
    } else {
        RegKind::Gpr(wide)
    };
    Some((insn, kind, size))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RegKind {
    Gpr(bool),
    Fp(FpSize),
    Prefetch,
}

fn single(word: u32, form: Form) -> Result<Decoded, DecodeError> {
    let size = field(word, 30, 2);
    let opc = field(word, 22, 2);
    let simd = bit(word, 26);
    let (insn, kind, scale) =
        single_kind(size, opc, simd, form).ok_or(DecodeError::InvalidEncoding)?;
    let rt = field(word, 0, 5);
    let first = match kind {
        RegKind::Gpr(wide) => Op::Reg(gpr(wide, rt, false)),
        RegKind::Fp(fs) => Op::Reg(fpreg(fs, rt)),
        RegKind::Prefetch => Op::Sym(prefetch_op(rt)),
    };
    let base = reg_sp(true, word, 5);
    let mem = match form {
        Form::Unsigned => Mem {
            base,
            offset: MemOffset::Imm((field(word, 10, 12) as i64) << scale),
            indexing: Indexing::Offset,
        },
        Form::Register => {
            let option = field(word, 13, 3);
            if option & 0b010 == 0 {
                return Err(DecodeError::InvalidEncoding);
            }
            let extend = if option == 0b011 {
                Arm64Extend::Lsl
            } else {
                Arm64Extend::from_bits(option)
            };
            let amount = bit(word, 12).then_some(scale);
            Mem {
                base,
                offset: MemOffset::Reg {
                    reg: gpr(option & 1 == 1, field(word, 16, 5), false),
                    extend,
                    amount,
                },
                indexing: Indexing::Offset,
            }
        }
        _ => Mem {
            base,
            offset: MemOffset::Imm(sign_extend(field(word, 12, 9) as u64, 9)),
            indexing: match form {
                Form::Post => Indexing::Post,
                Form::Pre => Indexing::Pre,
                _ => Indexing::Offset,
            },
        },
    };
    let mut decoded = Decoded::new(insn, vec![first, Op::Mem(mem)]);
    if simd {
        decoded = decoded.group(G::FpArmv8);
    }
    Ok(decoded)
}

// ---------------------------------------------------------------------------------------
// data processing, register

fn data_register(word: u32) -> Result<Decoded, DecodeError> {
    let sf = bit(word, 31);
    if word & 0x1f00_0000 == 0x0a00_0000 {
        return logical_shifted(word, sf);
    }
    if word & 0x1f20_0000 == 0x0b00_0000 {
        return add_sub_shifted(word, sf);
    }
    if word & 0x1f20_0000 == 0x0b20_0000 {
        return add_sub_extended(word, sf);
    }
    if word & 0x1fe0_0000 == 0x1a00_0000 {
        return carry(word, sf);
    }
    if word & 0x1fe0_0000 == 0x1a40_0000 {
        return conditional_compare(word, sf);
    }
    if word & 0x1fe0_0000 == 0x1a80_0000 {
        return conditional_select(word, sf);
    }
    if word & 0x5fe0_0000 == 0x5ac0_0000 {
        return one_source(word, sf);
    }
    if word & 0x5fe0_0000 == 0x1ac0_0000 {
        return two_source(word, sf);
    }
    if word & 0x1f00_0000 == 0x1b00_0000 {
        return three_source(word, sf);
    }
    Err(DecodeError::InvalidEncoding)
}

fn shifted_operand(word: u32, sf: bool) -> Result<Op, DecodeError> {
    let amount = field(word, 10, 6);
    if !sf && amount > 31 {
        return Err(DecodeError::InvalidEncoding);
    }
    let rm = reg(sf, word, 16);
    let shift = Arm64Shift::from_bits(field(word, 22, 2));
    Ok(if amount == 0 && shift == Arm64Shift::Lsl {
        Op::Reg(rm)
    } else {
        Op::Shifted(rm, shift, amount)
    })
}

fn logical_shifted(word: u32, sf: bool) -> Result<Decoded, DecodeError> {
    let operand = shifted_operand(word, sf)?;
    let (rd, rn) = (reg(sf, word, 0), reg(sf, word, 5));
    let insn = match (field(word, 29, 2), bit(word, 21)) {
        (0b00, false) => I::And,
        (0b00, true) => I::Bic,
        (0b01, false) => I::Orr,
        (0b01, true) => I::Orn,
        (0b10, false) => I::Eor,
        (0b10, true) => I::Eon,
        (_, false) => I::Ands,
        (_, true) => I::Bics,
    };
    let decoded = match insn {
        I::Orr if is_zero_reg(rn) && matches!(operand, Op::Reg(_)) => {
            Decoded::new(I::Mov, vec![Op::Reg(rd), operand])
        }
        I::Orn if is_zero_reg(rn) => Decoded::new(I::Mvn, vec![Op::Reg(rd), operand]),
        I::Ands if is_zero_reg(rd) => Decoded::new(I::Tst, vec![Op::Reg(rn), operand]),
        _ => Decoded::new(insn, vec![Op::Reg(rd), Op::Reg(rn), operand]),
    };
    Ok(decoded)
}

fn add_sub_shifted(word: u32, sf: bool) -> Result<Decoded, DecodeError> {
    if field(word, 22, 2) == 0b11 {
        return Err(DecodeError::InvalidEncoding);
    }
    let operand = shifted_operand(word, sf)?;
    let (rd, rn) = (reg(sf, word, 0), reg(sf, word, 5));
    let (sub, s) = (bit(word, 30), bit(word, 29));
    let decoded = match (sub, s) {
        (_, true) if is_zero_reg(rd) => {
            let insn = if sub { I::Cmp } else { I::Cmn };
            Decoded::new(insn, vec![Op::Reg(rn), operand])
        }
        (true, _) if is_zero_reg(rn) => {
            let insn = if s { I::Negs } else { I::Neg };
            Decoded::new(insn, vec![Op::Reg(rd), operand])
        }
        _ => {
            let insn = match (sub, s) {
                (false, false) => I::Add,
                (false, true) => I::Adds,
                (true, false) => I::Sub,
                (true, true) => I::Subs,
            };
            Decoded::new(insn, vec![Op::Reg(rd), Op::Reg(rn), operand])
        }
    };
    Ok(decoded)
}

fn add_sub_extended(word: u32, sf: bool) -> Result<Decoded, DecodeError> {
    let amount = field(word, 10, 3);
    if amount > 4 || field(word, 22, 2) != 0 {
        return Err(DecodeError::InvalidEncoding);
    }
    let (sub, s) = (bit(word, 30), bit(word, 29));
    let option = field(word, 13, 3);
    let rd = if s { reg(sf, word, 0) } else { reg_sp(sf, word, 0) };
    let rn = reg_sp(sf, word, 5);
    let rm = reg(sf && option & 0b011 == 0b011, word, 16);
    let sp = |r: Arm64Reg| matches!(r, Arm64Reg::Sp | Arm64Reg::Wsp);
    let default_extend = if sf { 0b011 } else { 0b010 };
    let operand = if (sp(rd) || sp(rn)) && option == default_extend {
        if amount == 0 {
            Op::Reg(rm)
        } else {
            Op::Extended(rm, Arm64Extend::Lsl, amount)
        }
    } else {
        Op::Extended(rm, Arm64Extend::from_bits(option), amount)
    };
    let decoded = if s && is_zero_reg(rd) {
        let insn = if sub { I::Cmp } else { I::Cmn };
        Decoded::new(insn, vec![Op::Reg(rn), operand])
    } else {
        let insn = match (sub, s) {
            (false, false) => I::Add,
            (false, true) => I::Adds,
            (true, false) => I::Sub,
            (true, true) => I::Subs,
        };
        Decoded::new(insn, vec![Op::Reg(rd), Op::Reg(rn), operand])
    };
    Ok(decoded)
}

fn carry(word: u32, sf: bool) -> Result<Decoded, DecodeError> {
    if field(word, 10, 6) != 0 {
        return Err(DecodeError::InvalidEncoding);
    }
    let (rd, rn, rm) = (reg(sf, word, 0), reg(sf, word, 5), reg(sf, word, 16));
    let (sub, s) = (bit(word, 30), bit(word, 29));
    let decoded = if sub && is_zero_reg(rn) {
        let insn = if s { I::Ngcs } else { I::Ngc };
        Decoded::new(insn, vec![Op::Reg(rd), Op::Reg(rm)])
    } else {
        let insn = match (sub, s) {
            (false, false) => I::Adc,
            (false, true) => I::Adcs,
            (true, false) => I::Sbc,
            (true, true) => I::Sbcs,
        };
        Decoded::new(insn, vec![Op::Reg(rd), Op::Reg(rn), Op::Reg(rm)])
    };
    Ok(decoded)
}

fn conditional_compare(word: u32, sf: bool) -> Result<Decoded, DecodeError> {
    if !bit(word, 29) || bit(word, 10) || bit(word, 4) {
        return Err(DecodeError::InvalidEncoding);
    }
    let insn = if bit(word, 30) { I::Ccmp } else { I::Ccmn };
    let cc = Arm64Cc::from_bits(field(word, 12, 4));
    let second = if bit(word, 11) {
        Op::Imm(field(word, 16, 5) as i64)
    } else {
        Op::Reg(reg(sf, word, 16))
    };
    Ok(Decoded::new(
        insn,
        vec![
            Op::Reg(reg(sf, word, 5)),
            second,
            Op::Imm(field(word, 0, 4) as i64),
            Op::Sym(cc.name().to_string()),
        ],
    )
    .cc(cc))
}

fn conditional_select(word: u32, sf: bool) -> Result<Decoded, DecodeError> {
    if bit(word, 29) || bit(word, 11) {
        return Err(DecodeError::InvalidEncoding);
    }
    let (rd, rn, rm) = (reg(sf, word, 0), reg(sf, word, 5), reg(sf, word, 16));
    let cc = Arm64Cc::from_bits(field(word, 12, 4));
    let invertible = !matches!(cc, Arm64Cc::Al | Arm64Cc::Nv);
    let sym = |c: Arm64Cc| Op::Sym(c.name().to_string());
    let decoded = match (bit(word, 30), bit(word, 10)) {
        (false, false) => {
            Decoded::new(I::Csel, vec![Op::Reg(rd), Op::Reg(rn), Op::Reg(rm), sym(cc)]).cc(cc)
        }
        (false, true) if invertible && rn == rm && is_zero_reg(rn) => {
            Decoded::new(I::Cset, vec![Op::Reg(rd), sym(cc.invert())]).cc(cc.invert())
        }
        (false, true) if invertible && rn == rm => {
            Decoded::new(I::Cinc, vec![Op::Reg(rd), Op::Reg(rn), sym(cc.invert())])
                .cc(cc.invert())
        }
        (false, true) => {
            Decoded::new(I::Csinc, vec![Op::Reg(rd), Op::Reg(rn), Op::Reg(rm), sym(cc)]).cc(cc)
        }
        (true, false) if invertible && rn == rm && is_zero_reg(rn) => {
            Decoded::new(I::Csetm, vec![Op::Reg(rd), sym(cc.invert())]).cc(cc.invert())
        }
        (true, false) if invertible && rn == rm => {
            Decoded::new(I::Cinv, vec![Op::Reg(rd), Op::Reg(rn), sym(cc.invert())])
                .cc(cc.invert())
        }
        (true, false) => {
            Decoded::new(I::Csinv, vec![Op::Reg(rd), Op::Reg(rn), Op::Reg(rm), sym(cc)]).cc(cc)
        }
        (true, true) if invertible && rn == rm => {
            Decoded::new(I::Cneg, vec![Op::Reg(rd), Op::Reg(rn), sym(cc.invert())])
                .cc(cc.invert())
        }
        (true, true) => {
            Decoded::new(I::Csneg, vec![Op::Reg(rd), Op::Reg(rn), Op::Reg(rm), sym(cc)]).cc(cc)
        }
    };
    Ok(decoded)
}

fn one_source(word: u32, sf: bool) -> Result<Decoded, DecodeError> {
    if field(word, 16, 5) != 0 || bit(word, 29) {
        return Err(DecodeError::InvalidEncoding);
    }
    let insn = match (field(word, 10, 6), sf) {
        (0, _) => I::Rbit,
        (1, _) => I::Rev16,
        (2, false) => I::Rev,
        (2, true) => I::Rev32,
        (3, true) => I::Rev,
        (4, _) => I::Clz,
        (5, _) => I::Cls,
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(Decoded::new(
        insn,
        vec![Op::Reg(reg(sf, word, 0)), Op::Reg(reg(sf, word, 5))],
    ))
}

fn two_source(word: u32, sf: bool) -> Result<Decoded, DecodeError> {
    if bit(word, 29) {
        return Err(DecodeError::InvalidEncoding);
    }
    let opcode = field(word, 10, 6);
    let (insn, group) = match opcode {
        0b000010 => (I::Udiv, None),
        0b000011 => (I::Sdiv, None),
        0b001000 => (I::Lsl, None),
        0b001001 => (I::Lsr, None),
        0b001010 => (I::Asr, None),
        0b001011 => (I::Ror, None),
        0b010000 if !sf => (I::Crc32b, Some(G::Crc)),
        0b010001 if !sf => (I::Crc32h, Some(G::Crc)),
        0b010010 if !sf => (I::Crc32w, Some(G::Crc)),
        0b010011 if sf => (I::Crc32x, Some(G::Crc)),
        0b010100 if !sf => (I::Crc32cb, Some(G::Crc)),
        0b010101 if !sf => (I::Crc32ch, Some(G::Crc)),
        0b010110 if !sf => (I::Crc32cw, Some(G::Crc)),
        0b010111 if sf => (I::Crc32cx, Some(G::Crc)),
        _ => return Err(DecodeError::InvalidEncoding),
    };
    // crc32 accumulates into a w register; the data operand width follows the variant
    let (rd, rn) = if group.is_some() {
        (reg(false, word, 0), reg(false, word, 5))
    } else {
        (reg(sf, word, 0), reg(sf, word, 5))
    };
    let decoded = Decoded::new(insn, vec![Op::Reg(rd), Op::Reg(rn), Op::Reg(reg(sf, word, 16))]);
    Ok(match group {
        Some(g) => decoded.group(g),
        None => decoded,
    })
}

fn three_source(word: u32, sf: bool) -> Result<Decoded, DecodeError> {
    if field(word, 29, 2) != 0 {
        return Err(DecodeError::InvalidEncoding);
    }
    let ra = reg(sf, word, 10);
    let no_ra = is_zero_reg(ra);
    let (rd, rn, rm) = (reg(sf, word, 0), reg(sf, word, 5), reg(sf, word, 16));
    let (wn, wm) = (reg(false, word, 5), reg(false, word, 16));
    let three = |insn, a, b| Decoded::new(insn, vec![Op::Reg(rd), Op::Reg(a), Op::Reg(b)]);
    let four = |insn, a, b| Decoded::new(insn, vec![Op::Reg(rd), Op::Reg(a), Op::Reg(b), Op::Reg(ra)]);
    let decoded = match (field(word, 21, 3), bit(word, 15)) {
        (0b000, false) if no_ra => three(I::Mul, rn, rm),
        (0b000, false) => four(I::Madd, rn, rm),
        (0b000, true) if no_ra => three(I::Mneg, rn, rm),
        (0b000, true) => four(I::Msub, rn, rm),
        _ if !sf => return Err(DecodeError::InvalidEncoding),
        (0b001, false) if no_ra => three(I::Smull, wn, wm),
        (0b001, false) => four(I::Smaddl, wn, wm),
        (0b001, true) if no_ra => three(I::Smnegl, wn, wm),
        (0b001, true) => four(I::Smsubl, wn, wm),
        (0b010, false) => three(I::Smulh, rn, rm),
        (0b101, false) if no_ra => three(I::Umull, wn, wm),
        (0b101, false) => four(I::Umaddl, wn, wm),
        (0b101, true) if no_ra => three(I::Umnegl, wn, wm),
        (0b101, true) => four(I::Umsubl, wn, wm),
        (0b110, false) => three(I::Umulh, rn, rm),
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn text(word: u32, address: u64) -> String {
        let d = decode(word, address).unwrap();
        let (m, o) = super::super::render(&d);
        format!("{} {}", m, o).trim_end().to_string()
    }

    #[rstest]
    #[case(0xd10043ff, "sub sp, sp, #0x10")]
    #[case(0x910003fd, "mov x29, sp")]
    #[case(0xf100041f, "cmp x0, #1")]
    #[case(0x52800540, "mov w0, #0x2a")]
    #[case(0x12800000, "mov w0, #-1")]
    #[case(0xf2a00020, "movk x0, #1, lsl #16")]
    #[case(0x92400c00, "and x0, x0, #0xf")]
    #[case(0xaa0103e0, "mov x0, x1")]
    #[case(0xd37ff800, "lsl x0, x0, #1")]
    #[case(0x93407c00, "sxtw x0, w0")]
    #[case(0x53001c00, "uxtb w0, w0")]
    #[case(0x1a9f17e0, "cset w0, eq")]
    #[case(0x9ac20820, "udiv x0, x1, x2")]
    #[case(0xd65f03c0, "ret")]
    #[case(0xd63f0020, "blr x1")]
    #[case(0xd4000001, "svc #0")]
    #[case(0xd503201f, "nop")]
    #[case(0xa9bf7bfd, "stp x29, x30, [sp, #-0x10]!")]
    #[case(0xa8c17bfd, "ldp x29, x30, [sp], #0x10")]
    #[case(0xf8408c20, "ldr x0, [x1, #8]!")]
    #[case(0x38616800, "ldrb w0, [x0, x1]")]
    #[case(0xb85fc020, "ldur w0, [x1, #-4]")]
    #[case(0x885f7c20, "ldxr w0, [x1]")]
    #[case(0x9b020c20, "madd x0, x1, x2, x3")]
    #[case(0x9b227c20, "smull x0, w1, w2")]
    #[case(0xd53b4200, "mrs x0, nzcv")]
    fn test_integer_forms(#[case] word: u32, #[case] expected: &str) {
        assert_eq!(text(word, 0x1000), expected);
    }

    #[rstest]
    #[case(0x14000004, "b #0x1010")]
    #[case(0x54000040, "b.eq #0x1008")]
    #[case(0xb4000040, "cbz x0, #0x1008")]
    #[case(0x37080040, "tbnz w0, #1, #0x1008")]
    #[case(0x90000000, "adrp x0, #0x1000")]
    #[case(0x10000020, "adr x0, #0x1004")]
    #[case(0x58000040, "ldr x0, #0x1008")]
    fn test_pc_relative(#[case] word: u32, #[case] expected: &str) {
        assert_eq!(text(word, 0x1000), expected);
    }

    #[test]
    fn test_bitmask_immediates() {
        assert_eq!(decode_bitmask(1, 0, 3, true), Some(0xf));
        assert_eq!(decode_bitmask(0, 0, 0b111100, true), Some(0x5555_5555_5555_5555));
        assert_eq!(decode_bitmask(0, 1, 0, false), Some(0x8000_0000));
        assert_eq!(decode_bitmask(1, 0, 0x3f, true), None);
        assert_eq!(decode_bitmask(1, 0, 0, false), None);
    }

    #[test]
    fn test_invalid_words() {
        assert_eq!(decode(0x0000_0000, 0), Err(DecodeError::InvalidEncoding));
        assert_eq!(decode(0xd4200001, 0), Err(DecodeError::InvalidEncoding));
    }
}
