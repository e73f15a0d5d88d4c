//! Effective-address decoding and the extension-word reader shared by every instruction line.

use super::{Cpu, M68kAddressMode as Am, M68kMem, M68kOperandKind as K, M68kReg, M68kSize};
use crate::arch::sign_extend;
use crate::cursor::{Cursor, Endian};
use crate::decoder::DecodeError;

pub(super) const DREGS: [M68kReg; 8] = [
    M68kReg::D0,
    M68kReg::D1,
    M68kReg::D2,
    M68kReg::D3,
    M68kReg::D4,
    M68kReg::D5,
    M68kReg::D6,
    M68kReg::D7,
];

pub(super) const AREGS: [M68kReg; 8] = [
    M68kReg::A0,
    M68kReg::A1,
    M68kReg::A2,
    M68kReg::A3,
    M68kReg::A4,
    M68kReg::A5,
    M68kReg::A6,
    M68kReg::A7,
];

pub(super) const FPREGS: [M68kReg; 8] = [
    M68kReg::Fp0,
    M68kReg::Fp1,
    M68kReg::Fp2,
    M68kReg::Fp3,
    M68kReg::Fp4,
    M68kReg::Fp5,
    M68kReg::Fp6,
    M68kReg::Fp7,
];

pub(super) fn dreg(n: u16) -> M68kReg {
    DREGS[(n & 7) as usize]
}

pub(super) fn areg(n: u16) -> M68kReg {
    AREGS[(n & 7) as usize]
}

pub(super) fn fpreg(n: u16) -> M68kReg {
    FPREGS[(n & 7) as usize]
}

/// `d0`..`d7` then `a0`..`a7`, as numbered in extension words.
pub(super) fn general(n: u16) -> M68kReg {
    if n & 8 == 0 {
        dreg(n)
    } else {
        areg(n)
    }
}

// Addressing-mode classes, one bit per row of the effective-address table:
// Dn An (An) (An)+ -(An) (d16,An) (d8,An,Xn) abs.w abs.l (d16,PC) (d8,PC,Xn) #imm
pub(super) const ALL: u16 = 0xfff;
pub(super) const DATA: u16 = ALL & !0x002;
pub(super) const MEMORY: u16 = ALL & !0x003;
pub(super) const CONTROL: u16 = 0x7e4;
pub(super) const ALTERABLE: u16 = 0x1ff;
pub(super) const DATA_ALT: u16 = DATA & ALTERABLE;
pub(super) const MEM_ALT: u16 = MEMORY & ALTERABLE;
pub(super) const CONTROL_ALT: u16 = CONTROL & ALTERABLE;

fn class_bit(mode: u16, reg: u16) -> Option<u16> {
    match (mode, reg) {
        (0..=6, _) => Some(1 << mode),
        (7, 0..=4) => Some(1 << (7 + reg)),
        _ => None,
    }
}

/// Instruction stream reader. Opcode and extension words are big-endian on every CPU.
pub(super) struct Reader<'c, 'a> {
    cursor: &'c mut Cursor<'a>,
    pub cpu: Cpu,
    pub address: u64,
}

impl<'c, 'a> Reader<'c, 'a> {
    pub(super) fn new(cursor: &'c mut Cursor<'a>, cpu: Cpu, address: u64) -> Self {
        Self {
            cursor,
            cpu,
            address,
        }
    }

    pub(super) fn word(&mut self) -> Result<u16, DecodeError> {
        Ok(self.cursor.read_u16_with(Endian::Big)?)
    }

    pub(super) fn long(&mut self) -> Result<u32, DecodeError> {
        Ok(self.cursor.read_u32_with(Endian::Big)?)
    }

    /// Address of the next unread byte.
    pub(super) fn pc(&self) -> u64 {
        self.address.wrapping_add(self.cursor.position() as u64)
    }

    pub(super) fn require(&self, cpu: Cpu) -> Result<(), DecodeError> {
        if self.cpu >= cpu {
            Ok(())
        } else {
            Err(DecodeError::InvalidEncoding)
        }
    }

    fn immediate(&mut self, size: M68kSize) -> Result<K, DecodeError> {
        Ok(match size {
            M68kSize::Byte => K::Imm((self.word()? & 0xff) as i64),
            M68kSize::Word => K::Imm(self.word()? as i64),
            M68kSize::Long => K::Imm(self.long()? as i64),
            M68kSize::Single => K::FpImm(f32::from_bits(self.long()?) as f64),
            M68kSize::Double => {
                let high = self.long()? as u64;
                let low = self.long()? as u64;
                K::FpImm(f64::from_bits(high << 32 | low))
            }
            _ => return Err(DecodeError::InvalidEncoding),
        })
    }

    /// Decodes the mode/register pair of an effective address, rejecting modes outside `allowed`.
    pub(super) fn ea(
        &mut self,
        mode: u16,
        reg: u16,
        size: M68kSize,
        allowed: u16,
    ) -> Result<K, DecodeError> {
        let bit = class_bit(mode, reg).ok_or(DecodeError::InvalidEncoding)?;
        if allowed & bit == 0 {
            return Err(DecodeError::InvalidEncoding);
        }
        let base = areg(reg);
        Ok(match (mode, reg) {
            (0, _) => K::Reg(dreg(reg)),
            (1, _) => K::Reg(base),
            (2, _) => K::Mem(M68kMem::new(Am::Indirect, base)),
            (3, _) => K::Mem(M68kMem::new(Am::PostIncrement, base)),
            (4, _) => K::Mem(M68kMem::new(Am::PreDecrement, base)),
            (5, _) => {
                let mut mem = M68kMem::new(Am::Displacement, base);
                mem.disp = self.word()? as i16 as i32;
                K::Mem(mem)
            }
            (6, _) => K::Mem(self.indexed(base)?),
            (7, 0) => {
                let mut mem = M68kMem::new(Am::AbsoluteShort, M68kReg::Invalid);
                mem.disp = self.word()? as i16 as i32;
                K::Mem(mem)
            }
            (7, 1) => {
                let mut mem = M68kMem::new(Am::AbsoluteLong, M68kReg::Invalid);
                mem.disp = self.long()? as i32;
                K::Mem(mem)
            }
            (7, 2) => {
                let mut mem = M68kMem::new(Am::PcDisplacement, M68kReg::Pc);
                mem.disp = self.word()? as i16 as i32;
                K::Mem(mem)
            }
            (7, 3) => K::Mem(self.indexed(M68kReg::Pc)?),
            _ => self.immediate(size)?,
        })
    }

    /// Brief and full (68020) index extension formats.
    fn indexed(&mut self, base: M68kReg) -> Result<M68kMem, DecodeError> {
        let ext = self.word()?;
        let pc = base == M68kReg::Pc;
        let mut mem = M68kMem::new(if pc { Am::PcIndex } else { Am::Index }, base);
        mem.index = general(ext >> 12);
        mem.index_long = ext & 0x800 != 0;

        if self.cpu < Cpu::M68020 {
            if ext & 0x100 != 0 {
                return Err(DecodeError::InvalidEncoding);
            }
            mem.disp = ext as u8 as i8 as i32;
            return Ok(mem);
        }
        mem.scale = 1 << ((ext >> 9) & 3);
        if ext & 0x100 == 0 {
            mem.disp = ext as u8 as i8 as i32;
            return Ok(mem);
        }

        if ext & 0x08 != 0 {
            return Err(DecodeError::InvalidEncoding);
        }
        if ext & 0x80 != 0 {
            mem.base = M68kReg::Invalid;
        }
        if ext & 0x40 != 0 {
            mem.index = M68kReg::Invalid;
        }
        mem.disp = match (ext >> 4) & 3 {
            0 => return Err(DecodeError::InvalidEncoding),
            1 => 0,
            2 => self.word()? as i16 as i32,
            _ => self.long()? as i32,
        };
        let select = ext & 7;
        let index_suppressed = ext & 0x40 != 0;
        mem.mode = match (index_suppressed, select) {
            (_, 0) if pc => Am::PcIndexBase,
            (_, 0) => Am::IndexBase,
            (_, 1..=3) if pc => Am::PcMemoryPreIndex,
            (_, 1..=3) => Am::MemoryPreIndex,
            (false, 5..=7) if pc => Am::PcMemoryPostIndex,
            (false, 5..=7) => Am::MemoryPostIndex,
            _ => return Err(DecodeError::InvalidEncoding),
        };
        mem.outer = match select & 3 {
            2 => self.word()? as i16 as i32,
            3 => self.long()? as i32,
            _ => 0,
        };
        Ok(mem)
    }

    /// Branch displacement relative to the word after the opcode.
    pub(super) fn target(&self, disp: i64) -> K {
        K::Target(self.address.wrapping_add(2).wrapping_add(disp as u64))
    }
}

/// Quick immediates encode 8 as 0.
pub(super) fn quick(value: u16) -> i64 {
    match value & 7 {
        0 => 8,
        v => v as i64,
    }
}

pub(super) fn moveq_value(low: u16) -> i64 {
    sign_extend(low as u64 & 0xff, 8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(words: &[u8], mode: u16, reg: u16, cpu: Cpu) -> Result<K, DecodeError> {
        let mut cursor = Cursor::new(words, Endian::Little);
        Reader::new(&mut cursor, cpu, 0x1000).ea(mode, reg, M68kSize::Long, ALL)
    }

    #[test]
    fn test_brief_extension() {
        let K::Mem(mem) = read(&[0x5c, 0x00], 6, 4, Cpu::M68040).unwrap() else {
            panic!("expected memory");
        };
        assert_eq!(mem.mode, Am::Index);
        assert_eq!((mem.base, mem.index, mem.index_long, mem.scale), (M68kReg::A4, M68kReg::D5, true, 4));

        // scaling is a 68020 addition
        let K::Mem(mem) = read(&[0x5c, 0xfe], 6, 4, Cpu::M68000).unwrap() else {
            panic!("expected memory");
        };
        assert_eq!((mem.scale, mem.disp), (1, -2));
    }

    #[test]
    fn test_full_extension() {
        let K::Mem(mem) = read(&[0x71, 0x12, 0x01, 0x23], 6, 6, Cpu::M68040).unwrap() else {
            panic!("expected memory");
        };
        assert_eq!(mem.mode, Am::MemoryPreIndex);
        assert_eq!((mem.base, mem.index, mem.outer), (M68kReg::A6, M68kReg::D7, 0x123));
        assert_eq!(read(&[0x71, 0x12, 0x01, 0x23], 6, 6, Cpu::M68000), Err(DecodeError::InvalidEncoding));
    }

    #[test]
    fn test_immediates_and_classes() {
        assert_eq!(read(&[0xc0, 0xde, 0xc0, 0xde], 7, 4, Cpu::M68040), Ok(K::Imm(0xc0dec0de)));
        assert_eq!(read(&[], 7, 5, Cpu::M68040), Err(DecodeError::InvalidEncoding));
        let mut cursor = Cursor::new(&[], Endian::Big);
        let mut r = Reader::new(&mut cursor, Cpu::M68040, 0);
        assert_eq!(r.ea(1, 0, M68kSize::Word, DATA), Err(DecodeError::InvalidEncoding));
        assert_eq!(r.ea(1, 3, M68kSize::Word, ALL), Ok(K::Reg(M68kReg::A3)));
    }

    #[test]
    fn test_quick() {
        assert_eq!(quick(0), 8);
        assert_eq!(quick(3), 3);
        assert_eq!(moveq_value(0xff), -1);
    }
}
