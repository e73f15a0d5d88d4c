//! XMOS XCore decoding.
//!
//! Instruction halfwords are always little-endian, whatever the session's byte order.

mod decode;

use crate::arch::signed_hex;
use crate::cursor::{Cursor, Endian};
use crate::decoder::{self, ArchDecoder, DecodeConfig, DecodeError, StreamState};
use crate::detail::{Access, CommonGroup, Detail, DetailParts};
use crate::names::NameTables;
use crate::{Address, Architecture, Instruction};

registry! {
    /// XCore registers. `r0`..`r11`, `cp`, `dp`, `sp` and `lr` keep their encoding order.
    pub enum XCoreReg: u8 {
        Invalid => "", R0 => "r0", R1 => "r1", R2 => "r2",
        R3 => "r3", R4 => "r4", R5 => "r5", R6 => "r6",
        R7 => "r7", R8 => "r8", R9 => "r9", R10 => "r10",
        R11 => "r11", Cp => "cp", Dp => "dp", Sp => "sp",
        Lr => "lr", Pc => "pc", Spc => "spc", Ssr => "ssr",
        Et => "et", Ed => "ed", Sed => "sed", Kep => "kep",
        Ksp => "ksp", Id => "id",
    }
}

registry! {
    /// XCore instructions.
    pub enum XCoreInsn: u16 {
        Invalid => "", Add => "add", And => "and", Andnot => "andnot",
        Ashr => "ashr", Bau => "bau", Bf => "bf", Bitrev => "bitrev",
        Bl => "bl", Bla => "bla", Blat => "blat", Bru => "bru",
        Bt => "bt", Bu => "bu", Byterev => "byterev", Chkct => "chkct",
        Clre => "clre", Clrpt => "clrpt", Clrsr => "clrsr", Clz => "clz",
        Crc32 => "crc32", Crc8 => "crc8", Dcall => "dcall", Dentsp => "dentsp",
        Dgetreg => "dgetreg", Divs => "divs", Divu => "divu", Drestsp => "drestsp",
        Dret => "dret", Ecallf => "ecallf", Ecallt => "ecallt", Edu => "edu",
        Eef => "eef", Eet => "eet", Eeu => "eeu", Endin => "endin",
        Entsp => "entsp", Eq => "eq", Extdp => "extdp", Extsp => "extsp",
        Freer => "freer", Freet => "freet", Get => "get", Getd => "getd",
        Getn => "getn", Getr => "getr", Getsr => "getsr", Getst => "getst",
        In => "in", Inct => "inct", Init => "init", Inshr => "inshr",
        Int => "int", Kcall => "kcall", Kentsp => "kentsp", Krestsp => "krestsp",
        Kret => "kret", Ladd => "ladd", Ld16s => "ld16s", Ld8u => "ld8u",
        Lda16 => "lda16", Ldap => "ldap", Ldaw => "ldaw", Ldc => "ldc",
        Ldivu => "ldivu", Ldw => "ldw", Lmul => "lmul", Lss => "lss",
        Lsu => "lsu", Lsub => "lsub", Maccs => "maccs", Maccu => "maccu",
        Mjoin => "mjoin", Mkmsk => "mkmsk", Msync => "msync", Mul => "mul",
        Neg => "neg", Not => "not", Or => "or", Out => "out",
        Outct => "outct", Outshr => "outshr", Outt => "outt", Peek => "peek",
        Rems => "rems", Remu => "remu", Retsp => "retsp", Set => "set",
        Setc => "setc", Setclk => "setclk", Setd => "setd", Setev => "setev",
        Setn => "setn", Setpt => "setpt", Setrdy => "setrdy", Setsr => "setsr",
        Settw => "settw", Setv => "setv", Sext => "sext", Shl => "shl",
        Shr => "shr", Ssync => "ssync", St16 => "st16", St8 => "st8",
        Start => "start", Stw => "stw", Sub => "sub", Syncr => "syncr",
        Testct => "testct", Testlcl => "testlcl", Testwct => "testwct", Tsetmr => "tsetmr",
        Waitef => "waitef", Waitet => "waitet", Waiteu => "waiteu", Xor => "xor",
        Zext => "zext",
    }
}

pub static NAMES: NameTables = NameTables {
    registers: XCoreReg::NAMES,
    instructions: XCoreInsn::NAMES,
    groups: &[],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XCoreOperandKind {
    Reg(XCoreReg),
    Imm(i64),
    /// `base[index]` or `base[disp]`; `direct` is -1 for the negated forms.
    Mem {
        base: XCoreReg,
        index: XCoreReg,
        disp: i64,
        direct: i8,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XCoreOperand {
    pub kind: XCoreOperandKind,
    pub access: Access,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XCoreDetail {
    pub operands: Vec<XCoreOperand>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Reg(XCoreReg),
    /// `res[r]`
    Res(XCoreReg),
    /// `t[r]`, or `t[r]:<reg>` for thread register initialisation.
    Thread(XCoreReg, XCoreReg),
    /// `ps[r]`
    Ps(XCoreReg),
    Imm(i64),
    Mem {
        base: XCoreReg,
        index: XCoreReg,
        disp: i64,
        back: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Decoded {
    pub insn: XCoreInsn,
    pub ops: Vec<Op>,
}

impl Decoded {
    pub(crate) fn new(insn: XCoreInsn, ops: Vec<Op>) -> Self {
        Self { insn, ops }
    }

    fn mnemonic(&self) -> String {
        self.insn.name().to_string()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct XCoreDecoder;

impl ArchDecoder for XCoreDecoder {
    fn architecture(&self) -> Architecture {
        Architecture::XCore
    }

    fn decode_one(
        &self,
        cursor: &mut Cursor<'_>,
        address: Address,
        config: &DecodeConfig,
        _state: &mut StreamState,
    ) -> Result<Instruction, DecodeError> {
        let first = cursor.read_u16_with(Endian::Little)?;
        let second = if decode::is_long(first) {
            Some(cursor.read_u16_with(Endian::Little)?)
        } else {
            None
        };
        let decoded = decode::decode(first, second)?;
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

fn op_text(op: &Op) -> String {
    match *op {
        Op::Reg(r) => r.name().to_string(),
        Op::Res(r) => format!("res[{}]", r),
        Op::Thread(r, XCoreReg::Invalid) => format!("t[{}]", r),
        Op::Thread(r, field) => format!("t[{}]:{}", r, field),
        Op::Ps(r) => format!("ps[{}]", r),
        Op::Imm(v) => signed_hex(v),
        Op::Mem {
            base,
            index,
            disp,
            back,
        } => {
            let sign = if back { "-" } else { "" };
            let inner = if index == XCoreReg::Invalid {
                signed_hex(disp)
            } else {
                index.name().to_string()
            };
            format!("{}[{}{}]", base, sign, inner)
        }
    }
}

fn render(d: &Decoded) -> String {
    d.ops.iter().map(op_text).collect::<Vec<_>>().join(", ")
}

fn access(d: &Decoded, index: usize) -> Access {
    use XCoreInsn as I;
    match (d.insn, d.ops[index]) {
        (_, Op::Res(_) | Op::Thread(..) | Op::Ps(_) | Op::Imm(_) | Op::Mem { .. }) => Access::READ,
        (I::Maccu | I::Maccs, _) if index < 2 => Access::READ_WRITE,
        (I::Crc8, _) if index == 1 => Access::WRITE,
        (I::Crc8 | I::Crc32, _) if index == 0 => Access::READ_WRITE,
        (I::Lmul | I::Ladd | I::Lsub | I::Ldivu, _) if index < 2 => Access::WRITE,
        (
            I::Stw | I::St16 | I::St8 | I::Bt | I::Bf | I::Bau | I::Bru | I::Bla | I::Ecallt
            | I::Ecallf | I::Kcall | I::Waitet | I::Waitef | I::Setv | I::Setev,
            _,
        ) => Access::READ,
        (_, _) if index == 0 && d.ops.len() > 1 => Access::WRITE,
        _ => Access::READ,
    }
}

fn lower(op: &Op) -> XCoreOperandKind {
    match *op {
        Op::Reg(r) | Op::Res(r) | Op::Thread(r, _) | Op::Ps(r) => XCoreOperandKind::Reg(r),
        Op::Imm(v) => XCoreOperandKind::Imm(v),
        Op::Mem {
            base,
            index,
            disp,
            back,
        } => XCoreOperandKind::Mem {
            base,
            index,
            disp,
            direct: if back { -1 } else { 1 },
        },
    }
}

fn detail(d: &Decoded) -> DetailParts {
    use XCoreInsn as I;
    let operands = (0..d.ops.len())
        .map(|i| XCoreOperand {
            kind: lower(&d.ops[i]),
            access: access(d, i),
        })
        .collect();
    let mut parts = DetailParts::new(Detail::XCore(XCoreDetail { operands }));

    match d.insn {
        I::Bu | I::Bt | I::Bf => {
            parts.common(CommonGroup::Jump);
            parts.common(CommonGroup::BranchRelative);
        }
        I::Bau | I::Bru => parts.common(CommonGroup::Jump),
        I::Bl => {
            parts.write(XCoreReg::Lr.id() as u16);
            parts.common(CommonGroup::Call);
            parts.common(CommonGroup::BranchRelative);
        }
        I::Bla | I::Blat => {
            parts.write(XCoreReg::Lr.id() as u16);
            parts.common(CommonGroup::Call);
        }
        I::Retsp => {
            parts.read(XCoreReg::Sp.id() as u16);
            parts.write(XCoreReg::Sp.id() as u16);
            parts.common(CommonGroup::Ret);
        }
        I::Entsp | I::Extsp | I::Kentsp | I::Krestsp | I::Dentsp | I::Drestsp => {
            parts.read(XCoreReg::Sp.id() as u16);
            parts.write(XCoreReg::Sp.id() as u16);
        }
        I::Extdp => {
            parts.read(XCoreReg::Dp.id() as u16);
            parts.write(XCoreReg::Dp.id() as u16);
        }
        I::Kret | I::Dret => parts.common(CommonGroup::Iret),
        I::Kcall | I::Ecallt | I::Ecallf | I::Dcall => parts.common(CommonGroup::Int),
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
        0xfe, 0x0f, 0xfe, 0x17, 0x13, 0x17, 0xc6, 0xfe, 0xec, 0x17, 0x97, 0xf8, 0xec, 0x4f,
        0x1f, 0xfd, 0xec, 0x37, 0x07, 0xf2, 0x45, 0x5b, 0xf9, 0xfa, 0x02, 0x06, 0x1b, 0x10,
    ];

    #[test]
    fn test_xcore() {
        let insns = Session::open(Architecture::XCore, Mode::empty())
            .unwrap()
            .disassemble_all(&CODE, 0x1000, 0);
        let text: Vec<String> = insns
            .iter()
            .map(|i| format!("{} {}", i.mnemonic, i.operands).trim_end().to_string())
            .collect();
        assert_eq!(
            text,
            [
                "get r11, ed",
                "ldw et, sp[4]",
                "setd res[r3], r4",
                "init t[r2]:lr, r1",
                "divu r9, r1, r3",
                "lda16 r9, r3[-r11]",
                "ldw dp, dp[0x81c5]",
                "lmul r11, r0, r2, r5, r8, r10",
                "add r1, r2, r3",
            ]
        );
        let sizes: Vec<u8> = insns.iter().map(|i| i.size).collect();
        assert_eq!(sizes, [2, 2, 2, 4, 4, 4, 4, 4, 2]);
        assert_eq!(insns[8].address, 0x101a);
    }

    #[test]
    fn test_big_endian_session_reads_little_endian_words() {
        let insns = Session::open(Architecture::XCore, Mode::BIG_ENDIAN)
            .unwrap()
            .disassemble_all(&CODE, 0x1000, 0);
        assert_eq!(insns.len(), 9);
        assert_eq!(insns[0].mnemonic, "get");
    }

    #[test]
    fn test_detail() {
        let mut session = Session::open(Architecture::XCore, Mode::empty()).unwrap();
        session.set_detail(true);
        let insns = session.disassemble_all(&CODE, 0x1000, 0);

        let Some(Detail::XCore(d)) = &insns[5].detail else {
            panic!("missing xcore detail");
        };
        assert_eq!(d.operands[0].access, Access::WRITE);
        assert_eq!(
            d.operands[1].kind,
            XCoreOperandKind::Mem {
                base: XCoreReg::R3,
                index: XCoreReg::R11,
                disp: 0,
                direct: -1
            }
        );

        let Some(Detail::XCore(d)) = &insns[2].detail else {
            panic!("missing xcore detail");
        };
        assert!(d.operands.iter().all(|op| op.access == Access::READ));

        let Some(Detail::XCore(d)) = &insns[7].detail else {
            panic!("missing xcore detail");
        };
        let written: Vec<Access> = d.operands.iter().map(|op| op.access).collect();
        assert_eq!(written[..3], [Access::WRITE, Access::WRITE, Access::READ]);

        // bl -0x200
        let bl = session.decode_at(&[0x00, 0xd6], 0).unwrap();
        assert!(bl.is_branch());
        assert_eq!(bl.regs_write, vec![XCoreReg::Lr.id() as u16]);
        assert!(bl.in_group(CommonGroup::BranchRelative.id()));

        // retsp 4
        let ret = session.decode_at(&[0xc4, 0x77], 0).unwrap();
        assert!(ret.is_return());
    }

    #[test]
    fn test_truncated_prefix() {
        let insns = Session::open(Architecture::XCore, Mode::empty())
            .unwrap()
            .disassemble_all(&[0x1b, 0x10, 0x07, 0xf2], 0, 0);
        assert_eq!(insns.len(), 1);
    }
}
