//! Staged decoding of a single x86 instruction.

use crate::arch::Mode;
use crate::cursor::Cursor;
use crate::decoder::DecodeError;
use crate::detail::Access;
use crate::Address;

use super::tables::{self, Entry, Opnd, Slot, Special, X87Form, D64, F64, I64};
use super::{X86Insn, X86Mem, X86Operand, X86OperandKind, X86Reg};

/// Architectural limit on instruction length.
pub(crate) const MAX_LENGTH: usize = 15;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Prefixes {
    /// Raw prefix bytes by group: lock/rep, segment, operand size, address size
    pub bytes: [u8; 4],
    pub lock: bool,
    /// F2 or F3 when present and not consumed as a mandatory prefix
    pub rep: Option<u8>,
    pub segment: Option<X86Reg>,
    pub opsize: bool,
    pub adsize: bool,
}

/// Repeat prefix as printed in front of string instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rep {
    Rep,
    Repe,
    Repne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Class {
    General,
    X87,
    Mmx,
    Sse1,
    Sse2,
}

/// How an immediate operand is meant to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Hint {
    Plain,
    /// Sign-extended into a wider operand
    Signed,
    /// Absolute branch target resolved from a relative displacement
    Target,
    /// Segment selector of a far pointer
    Selector,
}

/// A fully decoded instruction, before rendering.
#[derive(Debug, Clone)]
pub(crate) struct Decoded {
    pub insn: X86Insn,
    pub operands: Vec<X86Operand>,
    pub hints: Vec<Hint>,
    pub prefix: Prefixes,
    pub opcode: [u8; 4],
    pub rex: u8,
    /// Address size in bytes
    pub adsize: u8,
    /// Operand size in bytes
    pub opsize: u8,
    pub modrm: u8,
    pub sib: u8,
    pub disp: i64,
    pub attr: u8,
    pub class: Class,
    pub rep: Option<Rep>,
    /// 16, 32 or 64
    pub bits: u8,
}

impl Decoded {
    pub(crate) fn is_string_op(&self) -> bool {
        self.class == Class::General && string_insn(self.insn)
    }
}

fn string_insn(insn: X86Insn) -> bool {
    use X86Insn::*;
    matches!(
        insn,
        Movsb | Movsw | Movsd | Movsq | Cmpsb | Cmpsw | Cmpsd | Cmpsq | Stosb | Stosw | Stosd
            | Stosq | Lodsb | Lodsw | Lodsd | Lodsq | Scasb | Scasw | Scasd | Scasq | Insb
            | Insw | Insd | Outsb | Outsw | Outsd
    )
}

fn compares(insn: X86Insn) -> bool {
    use X86Insn::*;
    matches!(
        insn,
        Cmpsb | Cmpsw | Cmpsd | Cmpsq | Scasb | Scasw | Scasd | Scasq
    )
}

/// Decoding stages. Each stage reads a bounded number of bytes and names the next one.
#[derive(Debug, Clone, Copy)]
enum Stage {
    Prefixes,
    Opcode,
    TwoByte,
    Select(Slot),
    Special(Special),
    X87(u8),
    Operands(Entry),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum File {
    Gpr,
    Xmm,
    Mmx,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Form {
    Any,
    RegOnly,
    MemOnly,
}

/// Register `offset` places after `first` in the register registry.
pub(crate) fn reg_at(first: X86Reg, offset: u8) -> X86Reg {
    X86Reg::from_id(first.id() as u32 + offset as u32).unwrap_or(X86Reg::Invalid)
}

/// General-purpose register by encoding index and size. Without REX, byte indices 4-7
/// select the legacy high-byte registers.
pub(crate) fn gpr(index: u8, size: u8, rex: bool) -> X86Reg {
    match size {
        1 if index < 4 => reg_at(X86Reg::Al, index),
        1 if index < 8 && !rex => reg_at(X86Reg::Ah, index - 4),
        1 => reg_at(X86Reg::Spl, index - 4),
        2 => reg_at(X86Reg::Ax, index),
        4 => reg_at(X86Reg::Eax, index),
        _ => reg_at(X86Reg::Rax, index),
    }
}

pub(crate) fn reg_size(reg: X86Reg) -> u8 {
    use X86Reg::*;
    let id = reg.id();
    if (Al.id()..=R15b.id()).contains(&id) {
        1
    } else if (Ax.id()..=R15w.id()).contains(&id) || (Es.id()..=Ip.id()).contains(&id) {
        2
    } else if (Eax.id()..=R15d.id()).contains(&id) || reg == Eip || reg == Eiz {
        4
    } else if (St0.id()..=St7.id()).contains(&id) {
        10
    } else if (Xmm0.id()..=Xmm15.id()).contains(&id) {
        16
    } else {
        8
    }
}

struct State<'c, 'a> {
    cursor: &'c mut Cursor<'a>,
    bits: u8,
    prefix: Prefixes,
    rex: u8,
    opcode: [u8; 4],
    two_byte: bool,
    opsize: u8,
    adsize: u8,
    modrm: Option<u8>,
    mem: Option<X86Mem>,
    sib: u8,
    disp: i64,
    class: Class,
    operands: Vec<X86Operand>,
    hints: Vec<Hint>,
    relative: Option<(usize, i64)>,
}

/// Decodes one instruction at the cursor.
pub(crate) fn decode(
    cursor: &mut Cursor<'_>,
    address: Address,
    mode: Mode,
) -> Result<Decoded, DecodeError> {
    let bits = if mode.contains(Mode::MODE_64) {
        64
    } else if mode.contains(Mode::MODE_32) {
        32
    } else {
        16
    };
    let mut st = State {
        cursor,
        bits,
        prefix: Prefixes::default(),
        rex: 0,
        opcode: [0; 4],
        two_byte: false,
        opsize: 0,
        adsize: 0,
        modrm: None,
        mem: None,
        sib: 0,
        disp: 0,
        class: Class::General,
        operands: Vec::with_capacity(3),
        hints: Vec::with_capacity(3),
        relative: None,
    };

    let mut stage = Stage::Prefixes;
    let (insn, attr) = loop {
        stage = match stage {
            Stage::Prefixes => {
                st.prefixes()?;
                Stage::Opcode
            }
            Stage::Opcode => {
                let op = st.cursor.read_u8()?;
                st.opcode[0] = op;
                match tables::ONE_BYTE[op as usize] {
                    Slot::Escape => Stage::TwoByte,
                    slot => Stage::Select(slot),
                }
            }
            Stage::TwoByte => {
                let op = st.cursor.read_u8()?;
                st.opcode[1] = op;
                st.two_byte = true;
                Stage::Select(tables::TWO_BYTE[op as usize])
            }
            Stage::Select(slot) => st.select(slot)?,
            Stage::Special(special) => Stage::Operands(st.special(special)?),
            Stage::X87(op) => break (st.x87(op)?, 0),
            Stage::Operands(entry) => break (st.operands(entry)?, entry.attr),
        }
    };

    let length = st.cursor.position();
    if length > MAX_LENGTH {
        return Err(DecodeError::InvalidEncoding);
    }

    if let Some((index, rel)) = st.relative {
        let next = address.wrapping_add(length as Address);
        let mut target = next.wrapping_add(rel as Address);
        if st.bits != 64 {
            target &= mask(st.opsize);
        }
        st.operands[index].kind = X86OperandKind::Imm(target as i64);
    }

    let rep = match st.prefix.rep {
        _ if st.class != Class::General || !string_insn(insn) => None,
        Some(0xf3) if compares(insn) => Some(Rep::Repe),
        Some(0xf3) => Some(Rep::Rep),
        Some(_) => Some(Rep::Repne),
        None => None,
    };

    Ok(Decoded {
        insn,
        operands: st.operands,
        hints: st.hints,
        prefix: st.prefix,
        opcode: st.opcode,
        rex: st.rex,
        adsize: st.adsize,
        opsize: st.opsize,
        modrm: st.modrm.unwrap_or(0),
        sib: st.sib,
        disp: st.disp,
        attr,
        class: st.class,
        rep,
        bits: st.bits,
    })
}

/// All-ones mask for a value of `size` bytes.
pub(crate) fn mask(size: u8) -> u64 {
    match size {
        0 | 8.. => u64::MAX,
        n => (1u64 << (n as u32 * 8)) - 1,
    }
}

fn entry(insn: X86Insn, a: Opnd, b: Opnd) -> Entry {
    Entry {
        insn,
        ops: [a, b, Opnd::None],
        attr: 0,
    }
}

impl State<'_, '_> {
    fn prefixes(&mut self) -> Result<(), DecodeError> {
        loop {
            if self.cursor.position() >= MAX_LENGTH {
                return Err(DecodeError::InvalidEncoding);
            }
            let b = self.cursor.peek_u8()?;
            match b {
                0xf0 => {
                    self.prefix.lock = true;
                    self.prefix.bytes[0] = b;
                }
                0xf2 | 0xf3 => {
                    self.prefix.rep = Some(b);
                    self.prefix.bytes[0] = b;
                }
                0x26 | 0x2e | 0x36 | 0x3e | 0x64 | 0x65 => {
                    self.prefix.segment = Some(match b {
                        0x26 => X86Reg::Es,
                        0x2e => X86Reg::Cs,
                        0x36 => X86Reg::Ss,
                        0x3e => X86Reg::Ds,
                        0x64 => X86Reg::Fs,
                        _ => X86Reg::Gs,
                    });
                    self.prefix.bytes[1] = b;
                }
                0x66 => {
                    self.prefix.opsize = true;
                    self.prefix.bytes[2] = b;
                }
                0x67 => {
                    self.prefix.adsize = true;
                    self.prefix.bytes[3] = b;
                }
                0x40..=0x4f if self.bits == 64 => {
                    self.cursor.advance(1)?;
                    self.rex = b;
                    continue;
                }
                _ => break,
            }
            self.cursor.advance(1)?;
            // REX only counts when it immediately precedes the opcode.
            self.rex = 0;
        }

        self.adsize = match (self.bits, self.prefix.adsize) {
            (16, false) | (32, true) => 2,
            (64, false) => 8,
            _ => 4,
        };
        Ok(())
    }

    fn operand_size(&self, attr: u8) -> u8 {
        match self.bits {
            64 if attr & F64 != 0 || self.rex & 0x08 != 0 => 8,
            64 if self.prefix.opsize => 2,
            64 if attr & D64 != 0 => 8,
            64 => 4,
            32 if self.prefix.opsize => 2,
            32 => 4,
            _ if self.prefix.opsize => 4,
            _ => 2,
        }
    }

    fn size_index(size: u8) -> usize {
        match size {
            2 => 0,
            4 => 1,
            _ => 2,
        }
    }

    fn select(&mut self, slot: Slot) -> Result<Stage, DecodeError> {
        let entry = match slot {
            Slot::Invalid | Slot::Prefix | Slot::Escape => return Err(DecodeError::InvalidEncoding),
            Slot::X87 => return Ok(Stage::X87(self.opcode[0])),
            Slot::Special(special) => return Ok(Stage::Special(special)),
            Slot::Op(entry) => entry,
            Slot::Group(id) => {
                if self.bits == 64 && !self.two_byte && self.opcode[0] == 0x82 {
                    return Err(DecodeError::InvalidEncoding);
                }
                self.read_modrm()?;
                let reg = (self.modrm.unwrap_or(0) >> 3) & 7;
                tables::group(id)[reg as usize]
            }
            Slot::Sized(insns, ops, attr) => {
                let size = self.operand_size(attr);
                Entry {
                    insn: insns[Self::size_index(size)],
                    ops,
                    attr,
                }
            }
            Slot::AddrSized(insns, op) => entry(insns[Self::size_index(self.adsize)], op, Opnd::None),
            Slot::Rep(plain, rep) => {
                if self.prefix.rep == Some(0xf3) && rep.insn != X86Insn::Invalid {
                    self.prefix.rep = None;
                    rep
                } else {
                    plain
                }
            }
            Slot::Sse(entries) => {
                let valid = |i: usize| entries[i].insn != X86Insn::Invalid;
                let pick = match self.prefix.rep {
                    Some(0xf3) if valid(2) => 2,
                    Some(0xf2) if valid(3) => 3,
                    _ if self.prefix.opsize && valid(1) => 1,
                    _ => 0,
                };
                match pick {
                    1 => self.prefix.opsize = false,
                    2 | 3 => self.prefix.rep = None,
                    _ => {}
                }
                let chosen = entries[pick];
                let vector = chosen
                    .ops
                    .iter()
                    .any(|o| matches!(o, Opnd::Vx | Opnd::Wx | Opnd::Wss | Opnd::Wsd | Opnd::Ux));
                self.class = match (vector, pick) {
                    (false, _) => Class::Mmx,
                    (true, 1 | 3) => Class::Sse2,
                    (true, _) => Class::Sse1,
                };
                chosen
            }
        };
        if entry.insn == X86Insn::Invalid {
            return Err(DecodeError::InvalidEncoding);
        }
        Ok(Stage::Operands(entry))
    }

    fn special(&mut self, special: Special) -> Result<Entry, DecodeError> {
        use Opnd::*;
        use X86Insn as I;
        let found = match special {
            Special::Nop => {
                if self.rex & 0x01 != 0 {
                    entry(I::Xchg, Zv, Ax)
                } else if self.prefix.rep == Some(0xf3) {
                    self.prefix.rep = Option::None;
                    entry(I::Pause, None, None)
                } else {
                    entry(I::Nop, None, None)
                }
            }
            Special::Arpl if self.bits == 64 => entry(I::Movsxd, Gv, Ed),
            Special::Arpl => entry(I::Arpl, Ew, Gw),
            Special::Group7 => {
                self.read_modrm()?;
                let m = self.modrm.unwrap_or(0);
                let reg = (m >> 3) & 7;
                if self.mem.is_some() {
                    match reg {
                        0 => entry(I::Sgdt, M, None),
                        1 => entry(I::Sidt, M, None),
                        2 => entry(I::Lgdt, M, None),
                        3 => entry(I::Lidt, M, None),
                        4 => entry(I::Smsw, Ew, None),
                        6 => entry(I::Lmsw, Ew, None),
                        7 => entry(I::Invlpg, Mb, None),
                        _ => return Err(DecodeError::InvalidEncoding),
                    }
                } else {
                    let insn = match m {
                        0xc1 => I::Vmcall,
                        0xc2 => I::Vmlaunch,
                        0xc3 => I::Vmresume,
                        0xc4 => I::Vmxoff,
                        0xc8 => I::Monitor,
                        0xc9 => I::Mwait,
                        0xca => I::Clac,
                        0xcb => I::Stac,
                        0xd0 => I::Xgetbv,
                        0xd1 => I::Xsetbv,
                        0xf8 if self.bits == 64 => I::Swapgs,
                        0xf9 => I::Rdtscp,
                        _ => match reg {
                            4 => return Ok(entry(I::Smsw, Ev, None)),
                            6 => return Ok(entry(I::Lmsw, Ew, None)),
                            _ => return Err(DecodeError::InvalidEncoding),
                        },
                    };
                    entry(insn, None, None)
                }
            }
            Special::Group15 => {
                self.read_modrm()?;
                let reg = (self.modrm.unwrap_or(0) >> 3) & 7;
                match (self.mem.is_some(), reg) {
                    (true, 0) => entry(I::Fxsave, M, None),
                    (true, 1) => entry(I::Fxrstor, M, None),
                    (true, 2) => entry(I::Ldmxcsr, Md, None),
                    (true, 3) => entry(I::Stmxcsr, Md, None),
                    (true, 4) => entry(I::Xsave, M, None),
                    (true, 5) => entry(I::Xrstor, M, None),
                    (true, 6) => entry(I::Xsaveopt, M, None),
                    (true, _) => entry(I::Clflush, Mb, None),
                    (false, 5) => entry(I::Lfence, None, None),
                    (false, 6) => entry(I::Mfence, None, None),
                    (false, 7) => entry(I::Sfence, None, None),
                    _ => return Err(DecodeError::InvalidEncoding),
                }
            }
            Special::Group9 => {
                self.read_modrm()?;
                let reg = (self.modrm.unwrap_or(0) >> 3) & 7;
                match (self.mem.is_some(), reg) {
                    (true, 1) if self.rex & 0x08 != 0 => entry(I::Cmpxchg16b, Mdq, None),
                    (true, 1) => entry(I::Cmpxchg8b, Mq, None),
                    (false, 6) => entry(I::Rdrand, Ev, None),
                    (false, 7) => entry(I::Rdseed, Ev, None),
                    _ => return Err(DecodeError::InvalidEncoding),
                }
            }
            Special::Prefetch => {
                self.read_modrm()?;
                let reg = (self.modrm.unwrap_or(0) >> 3) & 7;
                match (self.mem.is_some(), reg) {
                    (true, 0) => entry(I::Prefetchnta, Mb, None),
                    (true, 1) => entry(I::Prefetcht0, Mb, None),
                    (true, 2) => entry(I::Prefetcht1, Mb, None),
                    (true, 3) => entry(I::Prefetcht2, Mb, None),
                    _ => entry(I::Nop, Ev, None),
                }
            }
        };
        Ok(found)
    }

    fn x87(&mut self, op: u8) -> Result<X86Insn, DecodeError> {
        self.read_modrm()?;
        self.class = Class::X87;
        self.opsize = self.operand_size(0);
        let m = self.modrm.unwrap_or(0);
        if let Some(mem) = self.mem {
            let (insn, size) = tables::X87_MEM[(op - 0xd8) as usize][((m >> 3) & 7) as usize];
            if insn == X86Insn::Invalid {
                return Err(DecodeError::InvalidEncoding);
            }
            self.push(X86OperandKind::Mem(mem), size, Hint::Plain);
            return Ok(insn);
        }

        let (insn, form) = tables::x87_register(op, m).ok_or(DecodeError::InvalidEncoding)?;
        let st0 = X86OperandKind::Reg(X86Reg::St0);
        let sti = X86OperandKind::Reg(reg_at(X86Reg::St0, m & 7));
        match form {
            X87Form::Bare => {}
            X87Form::Sti => self.push(sti, 10, Hint::Plain),
            X87Form::St0Sti => {
                self.push(st0, 10, Hint::Plain);
                self.push(sti, 10, Hint::Plain);
            }
            X87Form::StiSt0 => {
                self.push(sti, 10, Hint::Plain);
                self.push(st0, 10, Hint::Plain);
            }
            X87Form::Ax => self.push(X86OperandKind::Reg(X86Reg::Ax), 2, Hint::Plain),
        }
        Ok(insn)
    }

    fn operands(&mut self, entry: Entry) -> Result<X86Insn, DecodeError> {
        if self.bits == 64 && entry.attr & I64 != 0 {
            return Err(DecodeError::InvalidEncoding);
        }
        self.opsize = self.operand_size(entry.attr);
        if entry.needs_modrm() && self.modrm.is_none() {
            self.read_modrm()?;
        }
        for op in entry.ops {
            self.operand(op)?;
        }

        let mut insn = entry.insn;
        match insn {
            X86Insn::Movd if self.rex & 0x08 != 0 => insn = X86Insn::Movq,
            X86Insn::Movlps if self.mem.is_none() && entry.ops[0] == Opnd::Vx => {
                insn = X86Insn::Movhlps
            }
            X86Insn::Movhps if self.mem.is_none() && entry.ops[0] == Opnd::Vx => {
                insn = X86Insn::Movlhps
            }
            X86Insn::Mov if self.bits == 64 && entry.ops.iter().any(|o| matches!(o, Opnd::Ob | Opnd::Ov)) => {
                insn = X86Insn::Movabs
            }
            X86Insn::Mov if self.opsize == 8 && entry.ops[1] == Opnd::Iv => insn = X86Insn::Movabs,
            _ => {}
        }
        Ok(insn)
    }

    fn read_modrm(&mut self) -> Result<(), DecodeError> {
        let m = self.cursor.read_u8()?;
        self.modrm = Some(m);
        if m >> 6 != 3 {
            let mem = if self.adsize == 2 {
                self.address16(m)?
            } else {
                self.address32(m)?
            };
            self.mem = Some(mem);
        }
        Ok(())
    }

    fn memory(&mut self, base: X86Reg, index: X86Reg, scale: u8, disp: i64) -> X86Mem {
        self.disp = disp;
        X86Mem {
            segment: self.prefix.segment.unwrap_or(X86Reg::Invalid),
            base,
            index,
            scale,
            disp,
        }
    }

    fn address16(&mut self, m: u8) -> Result<X86Mem, DecodeError> {
        use X86Reg::*;
        const FORMS: [(X86Reg, X86Reg); 8] = [
            (Bx, Si),
            (Bx, Di),
            (Bp, Si),
            (Bp, Di),
            (Si, Invalid),
            (Di, Invalid),
            (Bp, Invalid),
            (Bx, Invalid),
        ];
        let rm = m & 7;
        let (mut base, index) = FORMS[rm as usize];
        let disp = match m >> 6 {
            0 if rm == 6 => {
                base = Invalid;
                self.cursor.read_i16_le()? as i64
            }
            0 => 0,
            1 => self.cursor.read_i8()? as i64,
            _ => self.cursor.read_i16_le()? as i64,
        };
        Ok(self.memory(base, index, 1, disp))
    }

    fn address32(&mut self, m: u8) -> Result<X86Mem, DecodeError> {
        let md = m >> 6;
        let rm = m & 7;
        let size = self.adsize;
        let rex_b = if self.rex & 0x01 != 0 { 8 } else { 0 };

        let (base, index, scale, wide_disp) = if rm == 4 {
            let sib = self.cursor.read_u8()?;
            self.sib = sib;
            let idx = ((sib >> 3) & 7) | if self.rex & 0x02 != 0 { 8 } else { 0 };
            let index = if idx == 4 {
                X86Reg::Invalid
            } else {
                gpr(idx, size, true)
            };
            if sib & 7 == 5 && md == 0 {
                (X86Reg::Invalid, index, 1 << (sib >> 6), true)
            } else {
                (gpr((sib & 7) | rex_b, size, true), index, 1 << (sib >> 6), false)
            }
        } else if rm == 5 && md == 0 {
            let base = match (self.bits, size) {
                (64, 8) => X86Reg::Rip,
                (64, _) => X86Reg::Eip,
                _ => X86Reg::Invalid,
            };
            (base, X86Reg::Invalid, 1, true)
        } else {
            (gpr(rm | rex_b, size, true), X86Reg::Invalid, 1, false)
        };

        let disp = match md {
            _ if wide_disp => self.cursor.read_i32_le()? as i64,
            0 => 0,
            1 => self.cursor.read_i8()? as i64,
            _ => self.cursor.read_i32_le()? as i64,
        };
        Ok(self.memory(base, index, scale, disp))
    }

    fn push(&mut self, kind: X86OperandKind, size: u8, hint: Hint) {
        self.operands.push(X86Operand {
            kind,
            size,
            access: Access::empty(),
        });
        self.hints.push(hint);
    }

    fn reg_field(&self) -> u8 {
        let m = self.modrm.unwrap_or(0);
        ((m >> 3) & 7) | if self.rex & 0x04 != 0 { 8 } else { 0 }
    }

    fn rm_field(&self) -> u8 {
        let m = self.modrm.unwrap_or(0);
        (m & 7) | if self.rex & 0x01 != 0 { 8 } else { 0 }
    }

    fn register(&self, file: File, index: u8, size: u8) -> (X86Reg, u8) {
        match file {
            File::Gpr => (gpr(index, size, self.rex != 0), size),
            File::Xmm => (reg_at(X86Reg::Xmm0, index), 16),
            File::Mmx => (reg_at(X86Reg::Mm0, index & 7), 8),
        }
    }

    /// The ModRM r/m operand as a register of `file` or a memory reference of `size` bytes.
    fn rm(&mut self, file: File, size: u8, form: Form) -> Result<(), DecodeError> {
        match (self.mem, form) {
            (Some(_), Form::RegOnly) | (None, Form::MemOnly) => Err(DecodeError::InvalidEncoding),
            (Some(mem), _) => {
                self.push(X86OperandKind::Mem(mem), size, Hint::Plain);
                Ok(())
            }
            (None, _) => {
                let (reg, size) = self.register(file, self.rm_field(), size);
                self.push(X86OperandKind::Reg(reg), size, Hint::Plain);
                Ok(())
            }
        }
    }

    fn reg(&mut self, file: File, size: u8) {
        let (reg, size) = self.register(file, self.reg_field(), size);
        self.push(X86OperandKind::Reg(reg), size, Hint::Plain);
    }

    fn fixed(&mut self, reg: X86Reg) {
        self.push(X86OperandKind::Reg(reg), reg_size(reg), Hint::Plain);
    }

    fn string(&mut self, source: bool, size: u8) {
        let (base, segment) = if source {
            (gpr(6, self.adsize, false), self.prefix.segment.unwrap_or(X86Reg::Invalid))
        } else {
            (gpr(7, self.adsize, false), X86Reg::Es)
        };
        let mem = X86Mem {
            segment,
            base,
            index: X86Reg::Invalid,
            scale: 1,
            disp: 0,
        };
        self.push(X86OperandKind::Mem(mem), size, Hint::Plain);
    }

    fn read_sized(&mut self, size: u8) -> Result<u64, DecodeError> {
        Ok(match size {
            1 => self.cursor.read_u8()? as u64,
            2 => self.cursor.read_u16()? as u64,
            4 => self.cursor.read_u32()? as u64,
            _ => self.cursor.read_u64_with(crate::cursor::Endian::Little)?,
        })
    }

    fn relative(&mut self, size: u8) -> Result<(), DecodeError> {
        let rel = match size {
            1 => self.cursor.read_i8()? as i64,
            2 => self.cursor.read_i16_le()? as i64,
            _ => self.cursor.read_i32_le()? as i64,
        };
        self.relative = Some((self.operands.len(), rel));
        let width = self.opsize;
        self.push(X86OperandKind::Imm(rel), width, Hint::Target);
        Ok(())
    }

    fn operand(&mut self, op: Opnd) -> Result<(), DecodeError> {
        use Opnd as O;
        let opsize = self.opsize;
        let wide = if self.rex & 0x08 != 0 { 8 } else { 4 };
        match op {
            O::None => {}
            O::Eb => self.rm(File::Gpr, 1, Form::Any)?,
            O::Ew => self.rm(File::Gpr, 2, Form::Any)?,
            O::Ed => self.rm(File::Gpr, 4, Form::Any)?,
            O::Ev => self.rm(File::Gpr, opsize, Form::Any)?,
            O::Ey => self.rm(File::Gpr, wide, Form::Any)?,
            O::Gb => self.reg(File::Gpr, 1),
            O::Gw => self.reg(File::Gpr, 2),
            O::Gv => self.reg(File::Gpr, opsize),
            O::Gy => self.reg(File::Gpr, wide),
            O::M => self.rm(File::Gpr, 0, Form::MemOnly)?,
            O::Mb => self.rm(File::Gpr, 1, Form::MemOnly)?,
            O::Md => self.rm(File::Gpr, 4, Form::MemOnly)?,
            O::Mq => self.rm(File::Gpr, 8, Form::MemOnly)?,
            O::Mp => self.rm(File::Gpr, opsize + 2, Form::MemOnly)?,
            O::Mdq => self.rm(File::Gpr, 16, Form::MemOnly)?,
            O::Ib => {
                let v = self.cursor.read_u8()?;
                self.push(X86OperandKind::Imm(v as i64), 1, Hint::Plain);
            }
            O::Iw => {
                let v = self.cursor.read_u16()?;
                self.push(X86OperandKind::Imm(v as i64), 2, Hint::Plain);
            }
            O::Iz if opsize == 2 => {
                let v = self.cursor.read_u16()?;
                self.push(X86OperandKind::Imm(v as i64), 2, Hint::Plain);
            }
            O::Iz if opsize == 8 => {
                let v = self.cursor.read_i32_le()?;
                self.push(X86OperandKind::Imm(v as i64), 8, Hint::Signed);
            }
            O::Iz => {
                let v = self.cursor.read_u32()?;
                self.push(X86OperandKind::Imm(v as i64), 4, Hint::Plain);
            }
            O::Ibs => {
                let v = self.cursor.read_i8()?;
                self.push(X86OperandKind::Imm(v as i64), opsize, Hint::Signed);
            }
            O::Iv => {
                let v = self.read_sized(opsize)?;
                self.push(X86OperandKind::Imm(v as i64), opsize, Hint::Plain);
            }
            O::One => self.push(X86OperandKind::Imm(1), 1, Hint::Plain),
            O::Jb => self.relative(1)?,
            O::Jz => self.relative(if opsize == 2 { 2 } else { 4 })?,
            O::Ob | O::Ov => {
                let disp = self.read_sized(self.adsize)? as i64;
                let mem = self.memory(X86Reg::Invalid, X86Reg::Invalid, 1, disp);
                let size = if op == O::Ob { 1 } else { opsize };
                self.push(X86OperandKind::Mem(mem), size, Hint::Plain);
            }
            O::Ap => {
                let offset = self.read_sized(if opsize == 2 { 2 } else { 4 })?;
                let selector = self.cursor.read_u16()?;
                self.push(X86OperandKind::Imm(selector as i64), 2, Hint::Selector);
                self.push(X86OperandKind::Imm(offset as i64), opsize, Hint::Plain);
            }
            O::Sw => {
                let index = (self.modrm.unwrap_or(0) >> 3) & 7;
                if index > 5 {
                    return Err(DecodeError::InvalidEncoding);
                }
                self.fixed(reg_at(X86Reg::Es, index));
            }
            O::Seg => {
                let seg = if self.two_byte {
                    if self.opcode[1] < 0xa8 {
                        X86Reg::Fs
                    } else {
                        X86Reg::Gs
                    }
                } else {
                    reg_at(X86Reg::Es, (self.opcode[0] >> 3) & 3)
                };
                self.fixed(seg);
            }
            O::Zb | O::Zv => {
                let last = if self.two_byte { self.opcode[1] } else { self.opcode[0] };
                let index = (last & 7) | if self.rex & 0x01 != 0 { 8 } else { 0 };
                let size = if op == O::Zb { 1 } else { opsize };
                self.push(
                    X86OperandKind::Reg(gpr(index, size, self.rex != 0)),
                    size,
                    Hint::Plain,
                );
            }
            O::Al => self.fixed(X86Reg::Al),
            O::Cl => self.fixed(X86Reg::Cl),
            O::Dx => self.fixed(X86Reg::Dx),
            O::Ax => self.fixed(gpr(0, opsize, false)),
            O::Rd => {
                let size = if self.bits == 64 { 8 } else { 4 };
                self.rm(File::Gpr, size, Form::RegOnly)?;
            }
            O::Cd => self.fixed(reg_at(X86Reg::Cr0, self.reg_field())),
            O::Dd => self.fixed(reg_at(X86Reg::Dr0, self.reg_field() & 7)),
            O::Xb => self.string(true, 1),
            O::Xv => self.string(true, opsize),
            O::Yb => self.string(false, 1),
            O::Yv => self.string(false, opsize),
            O::Vx => self.reg(File::Xmm, 16),
            O::Wx => self.rm(File::Xmm, 16, Form::Any)?,
            O::Wss => self.rm(File::Xmm, 4, Form::Any)?,
            O::Wsd => self.rm(File::Xmm, 8, Form::Any)?,
            O::Ux => self.rm(File::Xmm, 16, Form::RegOnly)?,
            O::Pq => self.reg(File::Mmx, 8),
            O::Qq => self.rm(File::Mmx, 8, Form::Any)?,
            O::Nq => self.rm(File::Mmx, 8, Form::RegOnly)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::Endian;
    use rstest::rstest;

    fn run(mode: Mode, code: &[u8]) -> Result<(Decoded, usize), DecodeError> {
        let mut cursor = Cursor::new(code, Endian::Little);
        let d = decode(&mut cursor, 0x1000, mode)?;
        Ok((d, cursor.position()))
    }

    #[rstest]
    #[case(Mode::MODE_64, &[0x55], 1)]
    #[case(Mode::MODE_64, &[0x48, 0x8b, 0x05, 0xb8, 0x13, 0x00, 0x00], 7)]
    #[case(Mode::MODE_32, &[0x8b, 0x84, 0x91, 0x23, 0x01, 0x00, 0x00], 7)]
    #[case(Mode::MODE_16, &[0xd8, 0x81, 0xc6, 0x34], 4)]
    #[case(Mode::MODE_64, &[0x48, 0xb8, 1, 2, 3, 4, 5, 6, 7, 8], 10)]
    #[case(Mode::MODE_64, &[0x66, 0x0f, 0x1f, 0x44, 0x00, 0x00], 6)]
    #[case(Mode::MODE_32, &[0x64, 0xa1, 0x30, 0x00, 0x00, 0x00], 6)]
    fn test_lengths(#[case] mode: Mode, #[case] code: &[u8], #[case] len: usize) {
        assert_eq!(run(mode, code).unwrap().1, len);
    }

    #[test]
    fn test_byte_registers_follow_rex() {
        assert_eq!(gpr(4, 1, false), X86Reg::Ah);
        assert_eq!(gpr(4, 1, true), X86Reg::Spl);
        assert_eq!(gpr(12, 1, true), X86Reg::R12b);
        assert_eq!(gpr(9, 8, true), X86Reg::R9);
        assert_eq!(reg_size(X86Reg::R9d), 4);
        assert_eq!(reg_size(X86Reg::Xmm3), 16);
    }

    #[test]
    fn test_rex_before_legacy_prefix_is_dropped() {
        // 48 66 89 c8: REX is not adjacent to the opcode, so the operand size is 16 bits.
        let (d, _) = run(Mode::MODE_64, &[0x48, 0x66, 0x89, 0xc8]).unwrap();
        assert_eq!(d.rex, 0);
        assert_eq!(d.opsize, 2);
        assert_eq!(d.operands[0].kind, X86OperandKind::Reg(X86Reg::Ax));
    }

    #[test]
    fn test_relative_targets_wrap_to_operand_width() {
        let (d, _) = run(Mode::MODE_32, &[0xe8, 0x00, 0xf0, 0xff, 0xff]).unwrap();
        assert_eq!(d.operands[0].kind, X86OperandKind::Imm(0x5));
        assert_eq!(d.hints[0], Hint::Target);
    }

    #[test]
    fn test_mandatory_prefix_is_consumed() {
        let (d, _) = run(Mode::MODE_32, &[0xf3, 0x0f, 0x58, 0xc1]).unwrap();
        assert_eq!(d.insn, X86Insn::Addss);
        assert_eq!(d.prefix.rep, None);
        assert_eq!(d.class, Class::Sse1);

        let (d, _) = run(Mode::MODE_32, &[0xf3, 0x90]).unwrap();
        assert_eq!(d.insn, X86Insn::Pause);
    }

    #[test]
    fn test_pause_consumes_rep() {
        let (d, len) = run(Mode::MODE_64, &[0xf3, 0x90]).unwrap();
        assert_eq!(len, 2);
        assert_eq!(d.insn, X86Insn::Pause);
        assert_eq!(d.prefix.rep, None);
        assert_eq!(d.rep, None);

        // REX.B turns 90 into an exchange, so f3 stays a plain prefix
        let (d, _) = run(Mode::MODE_64, &[0xf3, 0x41, 0x90]).unwrap();
        assert_eq!(d.insn, X86Insn::Xchg);
        assert_eq!(d.prefix.rep, Some(0xf3));
    }

    #[rstest]
    #[case(Mode::MODE_64, &[0x06])]
    #[case(Mode::MODE_64, &[0x82, 0xc0, 0x01])]
    #[case(Mode::MODE_32, &[0x8d, 0xc0])]
    #[case(Mode::MODE_32, &[0x0f, 0x38, 0x00, 0xc0])]
    #[case(Mode::MODE_32, &[0x8e, 0xf8])]
    fn test_invalid(#[case] mode: Mode, #[case] code: &[u8]) {
        assert_eq!(run(mode, code).unwrap_err(), DecodeError::InvalidEncoding);
    }

    #[test]
    fn test_length_limit() {
        let mut code = vec![0x66; 14];
        code.push(0x90);
        assert!(run(Mode::MODE_32, &code).is_ok());

        let mut code = vec![0x66; 14];
        code.extend_from_slice(&[0x05, 0x00, 0x00]);
        assert_eq!(run(Mode::MODE_32, &code).unwrap_err(), DecodeError::InvalidEncoding);
    }
}
