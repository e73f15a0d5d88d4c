//! TI TMS320C64x VLIW DSP decoding.
//!
//! Fetch words are big-endian whatever the session's byte order.

mod decode;

use crate::arch::{hex, signed_hex};
use crate::cursor::{Cursor, Endian};
use crate::decoder::{self, ArchDecoder, DecodeConfig, DecodeError, StreamState};
use crate::detail::{Access, CommonGroup, Detail, DetailParts};
use crate::names::NameTables;
use crate::{Address, Architecture, Instruction};

registry! {
    /// General-purpose register files A and B, then the control registers `mvc` reaches.
    pub enum Tms320c64xReg: u8 {
        Invalid => "", A0 => "a0", A1 => "a1", A2 => "a2",
        A3 => "a3", A4 => "a4", A5 => "a5", A6 => "a6",
        A7 => "a7", A8 => "a8", A9 => "a9", A10 => "a10",
        A11 => "a11", A12 => "a12", A13 => "a13", A14 => "a14",
        A15 => "a15", A16 => "a16", A17 => "a17", A18 => "a18",
        A19 => "a19", A20 => "a20", A21 => "a21", A22 => "a22",
        A23 => "a23", A24 => "a24", A25 => "a25", A26 => "a26",
        A27 => "a27", A28 => "a28", A29 => "a29", A30 => "a30",
        A31 => "a31", B0 => "b0", B1 => "b1", B2 => "b2",
        B3 => "b3", B4 => "b4", B5 => "b5", B6 => "b6",
        B7 => "b7", B8 => "b8", B9 => "b9", B10 => "b10",
        B11 => "b11", B12 => "b12", B13 => "b13", B14 => "b14",
        B15 => "b15", B16 => "b16", B17 => "b17", B18 => "b18",
        B19 => "b19", B20 => "b20", B21 => "b21", B22 => "b22",
        B23 => "b23", B24 => "b24", B25 => "b25", B26 => "b26",
        B27 => "b27", B28 => "b28", B29 => "b29", B30 => "b30",
        B31 => "b31", Amr => "amr", Csr => "csr", Ifr => "ifr",
        Isr => "isr", Icr => "icr", Ier => "ier", Istp => "istp",
        Irp => "irp", Nrp => "nrp", Pce1 => "pce1",
    }
}

registry! {
    /// TMS320C64x instructions.
    pub enum Tms320c64xInsn: u16 {
        Invalid => "", Abs => "abs", Add => "add", Add2 => "add2",
        Addab => "addab", Addah => "addah", Addaw => "addaw", Addk => "addk",
        Addkpc => "addkpc", And => "and", B => "b", Bnop => "bnop",
        Clr => "clr", Cmpeq => "cmpeq", Cmpgt => "cmpgt", Cmpgtu => "cmpgtu",
        Cmplt => "cmplt", Cmpltu => "cmpltu", Ext => "ext", Extu => "extu",
        Idle => "idle", Ldb => "ldb", Ldbu => "ldbu", Lddw => "lddw",
        Ldh => "ldh", Ldhu => "ldhu", Ldndw => "ldndw", Ldnw => "ldnw",
        Ldw => "ldw", Lmbd => "lmbd", Mpy => "mpy", Mpyh => "mpyh",
        Mpyhl => "mpyhl", Mpyhlu => "mpyhlu", Mpyhslu => "mpyhslu", Mpyhsu => "mpyhsu",
        Mpyhu => "mpyhu", Mpyhuls => "mpyhuls", Mpyhus => "mpyhus", Mpylh => "mpylh",
        Mpylhu => "mpylhu", Mpylshu => "mpylshu", Mpyluhs => "mpyluhs", Mpysu => "mpysu",
        Mpyu => "mpyu", Mpyus => "mpyus", Mvc => "mvc", Mvk => "mvk",
        Mvkh => "mvkh", Nop => "nop", Norm => "norm", Or => "or",
        Sadd => "sadd", Set => "set", Shl => "shl", Shr => "shr",
        Shru => "shru", Smpy => "smpy", Smpyh => "smpyh", Smpyhl => "smpyhl",
        Smpylh => "smpylh", Sshl => "sshl", Ssub => "ssub", Stb => "stb",
        Stdw => "stdw", Sth => "sth", Stndw => "stndw", Stnw => "stnw",
        Stw => "stw", Sub => "sub", Sub2 => "sub2", Subab => "subab",
        Subah => "subah", Subaw => "subaw", Xor => "xor",
    }
}

pub static NAMES: NameTables = NameTables {
    registers: Tms320c64xReg::NAMES,
    instructions: Tms320c64xInsn::NAMES,
    groups: &[],
};

/// Functional unit class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Tms320c64xUnitKind {
    /// `nop` and `idle` occupy no unit.
    #[default]
    None,
    L,
    S,
    M,
    D,
}

/// The unit executing an instruction: `.L1`, `.S2X`, `.D1T2` and so on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Tms320c64xFunctionalUnit {
    pub kind: Tms320c64xUnitKind,
    /// 1 for the A side, 2 for the B side; 0 when there is no unit.
    pub side: u8,
    /// Register file of the loaded or stored data, 0 outside loads and stores.
    pub data_side: u8,
    /// `src2` is read across from the other register file.
    pub cross: bool,
}

impl Tms320c64xFunctionalUnit {
    fn suffix(&self) -> String {
        let letter = match self.kind {
            Tms320c64xUnitKind::None => return String::new(),
            Tms320c64xUnitKind::L => 'L',
            Tms320c64xUnitKind::S => 'S',
            Tms320c64xUnitKind::M => 'M',
            Tms320c64xUnitKind::D => 'D',
        };
        let mut out = format!(".{}{}", letter, self.side);
        if self.data_side != 0 {
            out.push_str(&format!("T{}", self.data_side));
        }
        if self.cross {
            out.push('X');
        }
        out
    }
}

/// Predicate guarding execution: `[reg]`, or `[!reg]` when `zero` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tms320c64xCondition {
    pub reg: Tms320c64xReg,
    pub zero: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tms320c64xMemOffset {
    Imm(u32),
    Reg(Tms320c64xReg),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tms320c64xMemModify {
    None,
    /// `*++R` / `*--R`
    Pre,
    /// `*R++` / `*R--`
    Post,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tms320c64xMem {
    pub base: Tms320c64xReg,
    pub offset: Tms320c64xMemOffset,
    /// Offset is subtracted from the base.
    pub negative: bool,
    pub modify: Tms320c64xMemModify,
    /// Offset counts elements rather than bytes.
    pub scaled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tms320c64xOperandKind {
    Reg(Tms320c64xReg),
    /// `high:low`
    RegPair {
        high: Tms320c64xReg,
        low: Tms320c64xReg,
    },
    Imm(i64),
    Mem(Tms320c64xMem),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tms320c64xOperand {
    pub kind: Tms320c64xOperandKind,
    pub access: Access,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tms320c64xDetail {
    pub operands: Vec<Tms320c64xOperand>,
    pub condition: Option<Tms320c64xCondition>,
    pub unit: Tms320c64xFunctionalUnit,
    /// The next word executes in the same cycle.
    pub parallel: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Reg(Tms320c64xReg),
    Pair(Tms320c64xReg, Tms320c64xReg),
    Imm(i64),
    Target(u64),
    Mem(Tms320c64xMem),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Decoded {
    pub insn: Tms320c64xInsn,
    pub unit: Tms320c64xFunctionalUnit,
    pub ops: Vec<Op>,
    pub condition: Option<Tms320c64xCondition>,
    pub parallel: bool,
}

impl Decoded {
    pub(crate) fn new(insn: Tms320c64xInsn, unit: Tms320c64xFunctionalUnit, ops: Vec<Op>) -> Self {
        Self {
            insn,
            unit,
            ops,
            condition: None,
            parallel: false,
        }
    }

    fn mnemonic(&self) -> String {
        let predicate = match self.condition {
            Some(Tms320c64xCondition { reg, zero: true }) => format!("[!{}] ", reg),
            Some(Tms320c64xCondition { reg, zero: false }) => format!("[{}] ", reg),
            None => String::new(),
        };
        format!("{}{}{}", predicate, self.insn, self.unit.suffix())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Tms320c64xDecoder;

impl ArchDecoder for Tms320c64xDecoder {
    fn architecture(&self) -> Architecture {
        Architecture::Tms320c64x
    }

    fn decode_one(
        &self,
        cursor: &mut Cursor<'_>,
        address: Address,
        config: &DecodeConfig,
        _state: &mut StreamState,
    ) -> Result<Instruction, DecodeError> {
        let word = cursor.read_u32_with(Endian::Big)?;
        let decoded = decode::decode(word, address)?;
        let operands = render(&decoded);
        Ok(decoder::finish(
            cursor,
            address,
            decoded.insn.id() as u32,
            decoded.mnemonic(),
            operands,
            config,
            || detail(&decoded),
        ))
    }
}

fn mem_text(mem: &Tms320c64xMem) -> String {
    let sign = if mem.negative { "-" } else { "+" };
    let inner = match mem.offset {
        Tms320c64xMemOffset::Imm(v) => hex(v as u64),
        Tms320c64xMemOffset::Reg(r) => r.name().to_string(),
    };
    let offset = if mem.scaled {
        format!("[{}]", inner)
    } else {
        format!("({})", inner)
    };
    match mem.modify {
        Tms320c64xMemModify::None => format!("*{}{}{}", sign, mem.base, offset),
        Tms320c64xMemModify::Pre => format!("*{}{}{}{}", sign, sign, mem.base, offset),
        Tms320c64xMemModify::Post => format!("*{}{}{}{}", mem.base, sign, sign, offset),
    }
}

fn op_text(op: &Op) -> String {
    match op {
        Op::Reg(r) => r.name().to_string(),
        Op::Pair(high, low) => format!("{}:{}", high, low),
        Op::Imm(v) => signed_hex(*v),
        Op::Target(t) => hex(*t),
        Op::Mem(mem) => mem_text(mem),
    }
}

/// Operands, with a trailing `||` when the next word runs in parallel.
fn render(d: &Decoded) -> String {
    let mut out = d.ops.iter().map(op_text).collect::<Vec<_>>().join(", ");
    if d.parallel {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str("||");
    }
    out
}

fn is_store(insn: Tms320c64xInsn) -> bool {
    use Tms320c64xInsn as I;
    matches!(insn, I::Stb | I::Sth | I::Stw | I::Stdw | I::Stnw | I::Stndw)
}

fn access(d: &Decoded, index: usize) -> Access {
    use Tms320c64xInsn as I;
    match (d.insn, d.ops[index]) {
        (_, Op::Mem(_) | Op::Imm(_) | Op::Target(_)) => Access::READ,
        (I::B | I::Bnop, _) => Access::READ,
        (insn, _) if is_store(insn) => Access::READ,
        // the destination keeps its other half
        (I::Mvkh | I::Addk, _) => Access::READ_WRITE,
        (_, _) if index + 1 == d.ops.len() || d.insn == I::Addkpc => Access::WRITE,
        _ => Access::READ,
    }
}

fn lower(op: &Op) -> Tms320c64xOperandKind {
    match *op {
        Op::Reg(r) => Tms320c64xOperandKind::Reg(r),
        Op::Pair(high, low) => Tms320c64xOperandKind::RegPair { high, low },
        Op::Imm(v) => Tms320c64xOperandKind::Imm(v),
        Op::Target(t) => Tms320c64xOperandKind::Imm(t as i64),
        Op::Mem(mem) => Tms320c64xOperandKind::Mem(mem),
    }
}

fn detail(d: &Decoded) -> DetailParts {
    use Tms320c64xInsn as I;
    let operands = (0..d.ops.len())
        .map(|i| Tms320c64xOperand {
            kind: lower(&d.ops[i]),
            access: access(d, i),
        })
        .collect();
    let mut parts = DetailParts::new(Detail::Tms320c64x(Tms320c64xDetail {
        operands,
        condition: d.condition,
        unit: d.unit,
        parallel: d.parallel,
    }));

    if let Some(condition) = d.condition {
        parts.read(condition.reg.id() as u16);
    }
    for op in &d.ops {
        if let Op::Mem(mem) = op {
            if mem.modify != Tms320c64xMemModify::None {
                parts.read(mem.base.id() as u16);
                parts.write(mem.base.id() as u16);
            }
        }
    }

    match (d.insn, d.ops.first()) {
        (I::B, Some(Op::Reg(Tms320c64xReg::Irp | Tms320c64xReg::Nrp))) => {
            parts.common(CommonGroup::Iret)
        }
        (I::B | I::Bnop, Some(Op::Target(_))) => {
            parts.common(CommonGroup::Jump);
            parts.common(CommonGroup::BranchRelative);
        }
        (I::B, _) => parts.common(CommonGroup::Jump),
        _ => {}
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::Mode;
    use crate::Session;

    const CODE: [u8; 28] = [
        0x01, 0xac, 0x88, 0x40, 0x81, 0xac, 0x88, 0x43, 0x00, 0x00, 0x00, 0x00, 0x02, 0x90,
        0x32, 0x96, 0x02, 0x80, 0x46, 0x9e, 0x05, 0x3c, 0x83, 0xe6, 0x0b, 0x0c, 0x8b, 0x24,
    ];

    fn text(insns: &[Instruction]) -> Vec<String> {
        insns
            .iter()
            .map(|i| format!("{} {}", i.mnemonic, i.operands).trim_end().to_string())
            .collect()
    }

    #[test]
    fn test_tms320c64x() {
        let insns = Session::open(Architecture::Tms320c64x, Mode::empty())
            .unwrap()
            .disassemble_all(&CODE, 0x1000, 0);
        assert_eq!(
            text(&insns),
            [
                "add.D1 a11, a4, a3",
                "[a1] add.D2 b11, b4, b3 ||",
                "nop",
                "ldbu.D2T2 *++b4[1], b5",
                "ldbu.D2T2 *+b15[0x46], b5",
                "lddw.D2T2 *+b15[4], b11:b10",
                "ldndw.D1T1 *+a3(a4), a23:a22",
            ]
        );
        assert!(insns.iter().all(|i| i.size == 4));
        assert_eq!(insns[6].address, 0x1018);
    }

    #[test]
    fn test_byte_order_ignored() {
        let insns = Session::open(Architecture::Tms320c64x, Mode::BIG_ENDIAN)
            .unwrap()
            .disassemble_all(&CODE, 0x1000, 0);
        assert_eq!(insns.len(), 7);
        assert_eq!(insns[0].mnemonic, "add.D1");
    }

    #[test]
    fn test_detail() {
        let mut session = Session::open(Architecture::Tms320c64x, Mode::empty()).unwrap();
        session.set_detail(true);
        let insns = session.disassemble_all(&CODE, 0x1000, 0);

        let Some(Detail::Tms320c64x(d)) = &insns[1].detail else {
            panic!("missing tms320c64x detail");
        };
        assert_eq!(
            d.condition,
            Some(Tms320c64xCondition {
                reg: Tms320c64xReg::A1,
                zero: false
            })
        );
        assert!(d.parallel);
        assert_eq!((d.unit.kind, d.unit.side), (Tms320c64xUnitKind::D, 2));
        assert_eq!(insns[1].regs_read, vec![Tms320c64xReg::A1.id() as u16]);
        assert_eq!(d.operands[2].access, Access::WRITE);

        // pre-increment writes the base back
        assert_eq!(insns[3].regs_write, vec![Tms320c64xReg::B4.id() as u16]);

        let Some(Detail::Tms320c64x(d)) = &insns[5].detail else {
            panic!("missing tms320c64x detail");
        };
        assert_eq!(
            d.operands[0].kind,
            Tms320c64xOperandKind::Mem(Tms320c64xMem {
                base: Tms320c64xReg::B15,
                offset: Tms320c64xMemOffset::Imm(4),
                negative: false,
                modify: Tms320c64xMemModify::None,
                scaled: true,
            })
        );
        assert_eq!(
            d.operands[1].kind,
            Tms320c64xOperandKind::RegPair {
                high: Tms320c64xReg::B11,
                low: Tms320c64xReg::B10
            }
        );
        assert_eq!(d.operands[1].access, Access::WRITE);
        assert_eq!((d.unit.side, d.unit.data_side), (2, 2));
    }

    #[test]
    fn test_branch_and_constants() {
        let mut session = Session::open(Architecture::Tms320c64x, Mode::empty()).unwrap();
        session.set_detail(true);

        let b = session.decode_at(&[0x00, 0x00, 0x02, 0x10], 0x1004).unwrap();
        assert_eq!(format!("{} {}", b.mnemonic, b.operands), "b.S1 0x1010");
        assert!(b.is_branch());
        assert!(b.in_group(CommonGroup::BranchRelative.id()));

        let mvk = session.decode_at(&[0x01, 0xff, 0xff, 0xa8], 0).unwrap();
        assert_eq!(format!("{} {}", mvk.mnemonic, mvk.operands), "mvk.S1 -1, a3");

        let add = session.decode_at(&[0x01, 0x88, 0x30, 0x78], 0).unwrap();
        assert_eq!(format!("{} {}", add.mnemonic, add.operands), "add.L1X a1, b2, a3");
    }

    #[test]
    fn test_invalid_and_truncated() {
        let session = Session::open(Architecture::Tms320c64x, Mode::empty()).unwrap();
        assert_eq!(
            session.decode_at(&[0xe1, 0xac, 0x88, 0x40], 0).err(),
            Some(DecodeError::InvalidEncoding)
        );
        assert!(session.disassemble_all(&CODE[..7], 0x1000, 0).len() == 1);
    }
}
