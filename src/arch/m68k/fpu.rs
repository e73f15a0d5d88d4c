//! Line F: floating-point coprocessor (id 1) instructions and the 68040 cache, MMU and
//! `move16` operations.

use super::ea::{
    areg, dreg, fpreg, Reader, ALL, ALTERABLE, CONTROL, CONTROL_ALT, DATA, DATA_ALT, MEMORY,
};
use super::{
    Cpu, Decoded, M68kAddressMode as Am, M68kInsn as I, M68kMem, M68kOperandKind as K,
    M68kReg as R, M68kSize as S,
};
use crate::decoder::DecodeError;

const POST_INCREMENT: u16 = 1 << 3;
const PRE_DECREMENT: u16 = 1 << 4;

const BRANCHES: [I; 32] = [
    I::Fbf, I::Fbeq, I::Fbogt, I::Fboge, I::Fbolt, I::Fbole, I::Fbogl, I::Fbor, I::Fbun,
    I::Fbueq, I::Fbugt, I::Fbuge, I::Fbult, I::Fbule, I::Fbne, I::Fbt, I::Fbsf, I::Fbseq,
    I::Fbgt, I::Fbge, I::Fblt, I::Fble, I::Fbgl, I::Fbgle, I::Fbngle, I::Fbngl, I::Fbnle,
    I::Fbnlt, I::Fbnge, I::Fbngt, I::Fbsne, I::Fbst,
];

const SETS: [I; 32] = [
    I::Fsf, I::Fseq, I::Fsogt, I::Fsoge, I::Fsolt, I::Fsole, I::Fsogl, I::Fsor, I::Fsun,
    I::Fsueq, I::Fsugt, I::Fsuge, I::Fsult, I::Fsule, I::Fsne, I::Fst, I::Fssf, I::Fsseq,
    I::Fsgt, I::Fsge, I::Fslt, I::Fsle, I::Fsgl, I::Fsgle, I::Fsngle, I::Fsngl, I::Fsnle,
    I::Fsnlt, I::Fsnge, I::Fsngt, I::Fssne, I::Fsst,
];

const DECREMENTS: [I; 32] = [
    I::Fdbf, I::Fdbeq, I::Fdbogt, I::Fdboge, I::Fdbolt, I::Fdbole, I::Fdbogl, I::Fdbor,
    I::Fdbun, I::Fdbueq, I::Fdbugt, I::Fdbuge, I::Fdbult, I::Fdbule, I::Fdbne, I::Fdbt,
    I::Fdbsf, I::Fdbseq, I::Fdbgt, I::Fdbge, I::Fdblt, I::Fdble, I::Fdbgl, I::Fdbgle,
    I::Fdbngle, I::Fdbngl, I::Fdbnle, I::Fdbnlt, I::Fdbnge, I::Fdbngt, I::Fdbsne, I::Fdbst,
];

const TRAPS: [I; 32] = [
    I::Ftrapf, I::Ftrapeq, I::Ftrapogt, I::Ftrapoge, I::Ftrapolt, I::Ftrapole, I::Ftrapogl,
    I::Ftrapor, I::Ftrapun, I::Ftrapueq, I::Ftrapugt, I::Ftrapuge, I::Ftrapult, I::Ftrapule,
    I::Ftrapne, I::Ftrapt, I::Ftrapsf, I::Ftrapseq, I::Ftrapgt, I::Ftrapge, I::Ftraplt,
    I::Ftraple, I::Ftrapgl, I::Ftrapgle, I::Ftrapngle, I::Ftrapngl, I::Ftrapnle, I::Ftrapnlt,
    I::Ftrapnge, I::Ftrapngt, I::Ftrapsne, I::Ftrapst,
];

pub(super) fn is_set_on_condition(insn: I) -> bool {
    SETS.contains(&insn)
}

pub(super) fn is_trap_on_condition(insn: I) -> bool {
    TRAPS.contains(&insn)
}

/// Arithmetic operation selected by the low seven bits of the command word.
fn operation(opmode: u16, cpu: Cpu) -> Result<I, DecodeError> {
    let insn = match opmode {
        0x00 => I::Fmove,
        0x01 => I::Fint,
        0x02 => I::Fsinh,
        0x03 => I::Fintrz,
        0x04 => I::Fsqrt,
        0x06 => I::Flognp1,
        0x08 => I::Fetoxm1,
        0x09 => I::Ftanh,
        0x0a => I::Fatan,
        0x0c => I::Fasin,
        0x0d => I::Fatanh,
        0x0e => I::Fsin,
        0x0f => I::Ftan,
        0x10 => I::Fetox,
        0x11 => I::Ftwotox,
        0x12 => I::Ftentox,
        0x14 => I::Flogn,
        0x15 => I::Flog10,
        0x16 => I::Flog2,
        0x18 => I::Fabs,
        0x19 => I::Fcosh,
        0x1a => I::Fneg,
        0x1c => I::Facos,
        0x1d => I::Fcos,
        0x1e => I::Fgetexp,
        0x1f => I::Fgetman,
        0x20 => I::Fdiv,
        0x21 => I::Fmod,
        0x22 => I::Fadd,
        0x23 => I::Fmul,
        0x24 => I::Fsgldiv,
        0x25 => I::Frem,
        0x26 => I::Fscale,
        0x27 => I::Fsglmul,
        0x28 => I::Fsub,
        0x30..=0x37 => I::Fsincos,
        0x38 => I::Fcmp,
        0x3a => I::Ftst,
        _ if cpu < Cpu::M68040 => return Err(DecodeError::InvalidEncoding),
        // single and double rounding variants added by the 68040
        0x40 => I::Fsmove,
        0x41 => I::Fssqrt,
        0x44 => I::Fdmove,
        0x45 => I::Fdsqrt,
        0x58 => I::Fsabs,
        0x5a => I::Fsneg,
        0x5c => I::Fdabs,
        0x5e => I::Fdneg,
        0x60 => I::Fsdiv,
        0x62 => I::Fsadd,
        0x63 => I::Fsmul,
        0x64 => I::Fddiv,
        0x66 => I::Fdadd,
        0x67 => I::Fdmul,
        0x68 => I::Fssub,
        0x6c => I::Fdsub,
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(insn)
}

fn mode(w: u16) -> u16 {
    (w >> 3) & 7
}

fn reg(w: u16) -> u16 {
    w & 7
}

/// Integer and single formats may come from a data register; the rest need memory.
fn source_classes(size: S) -> u16 {
    match size {
        S::Byte | S::Word | S::Long | S::Single => DATA,
        _ => MEMORY,
    }
}

pub(super) fn decode(r: &mut Reader<'_, '_>, w: u16) -> Result<Decoded, DecodeError> {
    match w & 0xff00 {
        0xf400 => return cache(r, w),
        0xf500 => return mmu(r, w),
        0xf600 => return move16(r, w),
        _ => {}
    }
    r.require(Cpu::M68020)?;
    if (w >> 9) & 7 != 1 {
        return Err(DecodeError::InvalidEncoding);
    }
    let (m, n) = (mode(w), reg(w));
    match (w >> 6) & 7 {
        0 => general(r, w),
        1 => conditional(r, w),
        2 | 3 => {
            let cond = (w & 0x3f) as usize;
            let insn = *BRANCHES.get(cond).ok_or(DecodeError::InvalidEncoding)?;
            let (size, disp) = if w & 0x40 == 0 {
                (S::Word, r.word()? as i16 as i64)
            } else {
                (S::Long, r.long()? as i32 as i64)
            };
            if w == 0xf280 && disp == 0 {
                return Ok(Decoded::no_size(I::Fnop, Vec::new()));
            }
            Ok(Decoded::new(insn, size, vec![r.target(disp)]))
        }
        4 => Ok(Decoded::no_size(
            I::Fsave,
            vec![r.ea(m, n, S::None, CONTROL_ALT | PRE_DECREMENT)?],
        )),
        5 => Ok(Decoded::no_size(
            I::Frestore,
            vec![r.ea(m, n, S::None, CONTROL | POST_INCREMENT)?],
        )),
        _ => Err(DecodeError::InvalidEncoding),
    }
}

fn arithmetic(insn: I, size: S, src: K, dst: R, ext: u16) -> Decoded {
    let ops = match insn {
        I::Ftst => vec![src],
        I::Fsincos => vec![src, K::RegPair(fpreg(ext), dst)],
        _ => vec![src, K::Reg(dst)],
    };
    Decoded::new(insn, size, ops)
}

fn general(r: &mut Reader<'_, '_>, w: u16) -> Result<Decoded, DecodeError> {
    let ext = r.word()?;
    let (m, n) = (mode(w), reg(w));
    let field = (ext >> 10) & 7;
    let dst = fpreg(ext >> 7);
    match ext >> 13 {
        0 => {
            let insn = operation(ext & 0x7f, r.cpu)?;
            Ok(arithmetic(insn, S::None, K::Reg(fpreg(field)), dst, ext))
        }
        2 if field == 7 => {
            if w & 0x3f != 0 {
                return Err(DecodeError::InvalidEncoding);
            }
            Ok(Decoded::new(
                I::Fmovecr,
                S::Extended,
                vec![K::Imm((ext & 0x7f) as i64), K::Reg(dst)],
            ))
        }
        2 => {
            let insn = operation(ext & 0x7f, r.cpu)?;
            let size = S::from_fpu_format(field);
            let src = r.ea(m, n, size, source_classes(size))?;
            Ok(arithmetic(insn, size, src, dst, ext))
        }
        3 => {
            let size = S::from_fpu_format(field);
            let allowed = source_classes(size) & ALTERABLE;
            let target = r.ea(m, n, size, allowed)?;
            Ok(Decoded::new(I::Fmove, size, vec![K::Reg(fpreg(ext >> 7)), target]))
        }
        4 | 5 => control(r, w, ext),
        6 | 7 => {
            let to_registers = ext & 0x2000 == 0;
            let list_mode = (ext >> 11) & 3;
            let list = if list_mode & 1 != 0 {
                K::Reg(dreg(ext >> 4))
            } else if list_mode == 0 {
                // predecrement lists fp0 in bit 0
                K::RegList(((ext & 0xff) as u32) << 16)
            } else {
                K::RegList(((ext as u8).reverse_bits() as u32) << 16)
            };
            if to_registers {
                let src = r.ea(m, n, S::Extended, CONTROL | POST_INCREMENT)?;
                Ok(Decoded::new(I::Fmovem, S::Extended, vec![src, list]))
            } else {
                let dst = r.ea(m, n, S::Extended, CONTROL_ALT | PRE_DECREMENT)?;
                Ok(Decoded::new(I::Fmovem, S::Extended, vec![list, dst]))
            }
        }
        _ => Err(DecodeError::InvalidEncoding),
    }
}

/// `fmove`/`fmovem` of `fpcr`, `fpsr` and `fpiar`.
fn control(r: &mut Reader<'_, '_>, w: u16, ext: u16) -> Result<Decoded, DecodeError> {
    let list = (ext >> 10) & 7;
    let to_control = ext & 0x2000 == 0;
    let (m, n) = (mode(w), reg(w));
    let single = match list {
        4 => Some(R::Fpcr),
        2 => Some(R::Fpsr),
        1 => Some(R::Fpiar),
        0 => return Err(DecodeError::InvalidEncoding),
        _ => None,
    };
    let (insn, registers, allowed) = match single {
        // only fpiar moves to or from an address register
        Some(reg) => {
            let classes = if reg == R::Fpiar { ALL } else { DATA };
            (I::Fmove, K::Reg(reg), classes)
        }
        None => (I::Fmovem, K::RegList((list as u32) << 24), MEMORY),
    };
    if to_control {
        let src = r.ea(m, n, S::Long, allowed)?;
        Ok(Decoded::new(insn, S::Long, vec![src, registers]))
    } else {
        let dst = r.ea(m, n, S::Long, allowed & ALTERABLE)?;
        Ok(Decoded::new(insn, S::Long, vec![registers, dst]))
    }
}

fn conditional(r: &mut Reader<'_, '_>, w: u16) -> Result<Decoded, DecodeError> {
    let ext = r.word()?;
    let cond = (ext & 0x3f) as usize;
    if cond >= 32 {
        return Err(DecodeError::InvalidEncoding);
    }
    let (m, n) = (mode(w), reg(w));
    match (m, n) {
        (1, _) => {
            let base = r.pc();
            let disp = r.word()? as i16;
            Ok(Decoded::no_size(
                DECREMENTS[cond],
                vec![
                    K::Reg(dreg(n)),
                    K::Target(base.wrapping_add(disp as i64 as u64)),
                ],
            ))
        }
        (7, 2) => Ok(Decoded::new(TRAPS[cond], S::Word, vec![K::Imm(r.word()? as i64)])),
        (7, 3) => Ok(Decoded::new(TRAPS[cond], S::Long, vec![K::Imm(r.long()? as i64)])),
        (7, 4) => Ok(Decoded::no_size(TRAPS[cond], Vec::new())),
        _ => {
            let dst = r.ea(m, n, S::Byte, DATA_ALT)?;
            Ok(Decoded::new(SETS[cond], S::Byte, vec![dst]))
        }
    }
}

fn cache(r: &mut Reader<'_, '_>, w: u16) -> Result<Decoded, DecodeError> {
    r.require(Cpu::M68040)?;
    let which = match (w >> 6) & 3 {
        1 => R::Dc,
        2 => R::Ic,
        3 => R::Bc,
        _ => return Err(DecodeError::InvalidEncoding),
    };
    let push = w & 0x20 != 0;
    let insn = match ((w >> 3) & 3, push) {
        (1, false) => I::Cinvl,
        (2, false) => I::Cinvp,
        (3, false) => I::Cinva,
        (1, true) => I::Cpushl,
        (2, true) => I::Cpushp,
        (3, true) => I::Cpusha,
        _ => return Err(DecodeError::InvalidEncoding),
    };
    let mut ops = vec![K::Reg(which)];
    if !matches!(insn, I::Cinva | I::Cpusha) {
        ops.push(K::Mem(M68kMem::new(Am::Indirect, areg(reg(w)))));
    }
    Ok(Decoded::no_size(insn, ops))
}

fn mmu(r: &mut Reader<'_, '_>, w: u16) -> Result<Decoded, DecodeError> {
    r.require(Cpu::M68040)?;
    let address = K::Mem(M68kMem::new(Am::Indirect, areg(reg(w))));
    match w & 0xfff8 {
        0xf500 => Ok(Decoded::no_size(I::Pflushn, vec![address])),
        0xf508 => Ok(Decoded::no_size(I::Pflush, vec![address])),
        0xf510 => Ok(Decoded::no_size(I::Pflushan, Vec::new())),
        0xf518 => Ok(Decoded::no_size(I::Pflusha, Vec::new())),
        0xf548 => Ok(Decoded::no_size(I::Ptestw, vec![address])),
        0xf568 => Ok(Decoded::no_size(I::Ptestr, vec![address])),
        _ => Err(DecodeError::InvalidEncoding),
    }
}

fn move16(r: &mut Reader<'_, '_>, w: u16) -> Result<Decoded, DecodeError> {
    r.require(Cpu::M68040)?;
    let n = reg(w);
    let post = |n| K::Mem(M68kMem::new(Am::PostIncrement, areg(n)));
    if w & 0xfff8 == 0xf620 {
        let ext = r.word()?;
        if ext & 0x8fff != 0x8000 {
            return Err(DecodeError::InvalidEncoding);
        }
        return Ok(Decoded::no_size(I::Move16, vec![post(n), post(ext >> 12)]));
    }
    if w & 0xffe0 != 0xf600 {
        return Err(DecodeError::InvalidEncoding);
    }
    let mut absolute = M68kMem::new(Am::AbsoluteLong, R::Invalid);
    absolute.disp = r.long()? as i32;
    let absolute = K::Mem(absolute);
    let indirect = K::Mem(M68kMem::new(Am::Indirect, areg(n)));
    let ops = match (w >> 3) & 3 {
        0 => vec![post(n), absolute],
        1 => vec![absolute, post(n)],
        2 => vec![indirect, absolute],
        _ => vec![absolute, indirect],
    };
    Ok(Decoded::no_size(I::Move16, ops))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::{Cursor, Endian};

    fn one(bytes: &[u8], cpu: Cpu) -> Result<Decoded, DecodeError> {
        let mut cursor = Cursor::new(bytes, Endian::Big);
        super::super::decode::decode(&mut Reader::new(&mut cursor, cpu, 0x1000))
    }

    #[test]
    fn test_register_forms() {
        // fsincos fp0, fp2:fp1
        let d = one(&[0xf2, 0x00, 0x00, 0xb2], Cpu::M68040).unwrap();
        assert_eq!(d.insn, I::Fsincos);
        assert_eq!(d.ops[1], K::RegPair(R::Fp2, R::Fp1));
        // fsadd is a 68040 addition
        assert_eq!(one(&[0xf2, 0x00, 0x00, 0x62], Cpu::M68030), Err(DecodeError::InvalidEncoding));
        assert_eq!(one(&[0xf2, 0x00, 0x00, 0x62], Cpu::M68040).unwrap().insn, I::Fsadd);
    }

    #[test]
    fn test_moves() {
        // fmovem.x fp0-fp1, -(a7): predecrement lists fp0 in bit 0
        let d = one(&[0xf2, 0x27, 0xe0, 0x03], Cpu::M68040).unwrap();
        assert_eq!(d.ops[0], K::RegList(0x30000));
        // fmove.l d0, fpcr
        let d = one(&[0xf2, 0x00, 0x90, 0x00], Cpu::M68040).unwrap();
        assert_eq!((d.insn, d.ops[1]), (I::Fmove, K::Reg(R::Fpcr)));
        // fmove.d fp1, (a0)
        let d = one(&[0xf2, 0x10, 0x74, 0x80], Cpu::M68040).unwrap();
        assert_eq!((d.insn, d.size), (I::Fmove, S::Double));
    }

    #[test]
    fn test_branches() {
        assert_eq!(one(&[0xf2, 0x80, 0x00, 0x00], Cpu::M68040).unwrap().insn, I::Fnop);
        let d = one(&[0xf2, 0x81, 0x00, 0x10], Cpu::M68040).unwrap();
        assert_eq!((d.insn, d.ops[0]), (I::Fbeq, K::Target(0x1012)));
        // coprocessor instructions need a 68020
        assert_eq!(one(&[0xf2, 0x81, 0x00, 0x10], Cpu::M68010), Err(DecodeError::InvalidEncoding));
    }

    #[test]
    fn test_68040_operations() {
        assert_eq!(one(&[0xf4, 0xf8], Cpu::M68040).unwrap().ops, [K::Reg(R::Bc)]);
        assert_eq!(one(&[0xf4, 0xf8], Cpu::M68030), Err(DecodeError::InvalidEncoding));
        let d = one(&[0xf6, 0x20, 0x90, 0x00], Cpu::M68040).unwrap();
        assert_eq!(d.insn, I::Move16);
        assert_eq!(one(&[0xf5, 0x18], Cpu::M68040).unwrap().insn, I::Pflusha);
    }
}
