//! Motorola 6800 family and 6809 decoding, including the 6801 and Hitachi 6301 extensions.

mod decode;
mod tables;

use crate::cursor::Cursor;
use crate::decoder::{self, ArchDecoder, DecodeConfig, DecodeError, StreamState};
use crate::detail::{Access, CommonGroup, Detail, DetailParts};
use crate::names::NameTables;
use crate::{Address, Architecture, Instruction, Mode};

use tables::{Fx, Mode as Addressing};

registry! {
    /// M680X registers. The 6800 family only uses `a`, `b`, `d`, `x`, `s`, `pc` and `cc`.
    pub enum M680xReg: u8 {
        Invalid => "", A => "a", B => "b", D => "d",
        Cc => "cc", Dp => "dp", X => "x", Y => "y",
        S => "s", U => "u", Pc => "pc",
    }
}

registry! {
    /// M680X instructions. The 6800 family and the 6809 spell some accumulator
    /// instructions differently (`ldaa` against `lda`); both spellings are listed.
    pub enum M680xInsn: u16 {
        Invalid => "", Aba => "aba", Abx => "abx", Adca => "adca",
        Adcb => "adcb", Adda => "adda", Addb => "addb", Addd => "addd",
        Aim => "aim", Anda => "anda", Andb => "andb", Andcc => "andcc",
        Asl => "asl", Asla => "asla", Aslb => "aslb", Asld => "asld",
        Asr => "asr", Asra => "asra", Asrb => "asrb", Bcc => "bcc",
        Bcs => "bcs", Beq => "beq", Bge => "bge", Bgt => "bgt",
        Bhi => "bhi", Bita => "bita", Bitb => "bitb", Ble => "ble",
        Bls => "bls", Blt => "blt", Bmi => "bmi", Bne => "bne",
        Bpl => "bpl", Bra => "bra", Brn => "brn", Bsr => "bsr",
        Bvc => "bvc", Bvs => "bvs", Cba => "cba", Clc => "clc",
        Cli => "cli", Clr => "clr", Clra => "clra", Clrb => "clrb",
        Clv => "clv", Cmpa => "cmpa", Cmpb => "cmpb", Cmpd => "cmpd",
        Cmps => "cmps", Cmpu => "cmpu", Cmpx => "cmpx", Cmpy => "cmpy",
        Com => "com", Coma => "coma", Comb => "comb", Cpx => "cpx",
        Cwai => "cwai", Daa => "daa", Dec => "dec", Deca => "deca",
        Decb => "decb", Des => "des", Dex => "dex", Eim => "eim",
        Eora => "eora", Eorb => "eorb", Exg => "exg", Inc => "inc",
        Inca => "inca", Incb => "incb", Ins => "ins", Inx => "inx",
        Jmp => "jmp", Jsr => "jsr", Lbcc => "lbcc", Lbcs => "lbcs",
        Lbeq => "lbeq", Lbge => "lbge", Lbgt => "lbgt", Lbhi => "lbhi",
        Lble => "lble", Lbls => "lbls", Lblt => "lblt", Lbmi => "lbmi",
        Lbne => "lbne", Lbpl => "lbpl", Lbra => "lbra", Lbrn => "lbrn",
        Lbsr => "lbsr", Lbvc => "lbvc", Lbvs => "lbvs", Lda => "lda",
        Ldaa => "ldaa", Ldab => "ldab", Ldb => "ldb", Ldd => "ldd",
        Lds => "lds", Ldu => "ldu", Ldx => "ldx", Ldy => "ldy",
        Leas => "leas", Leau => "leau", Leax => "leax", Leay => "leay",
        Lsr => "lsr", Lsra => "lsra", Lsrb => "lsrb", Lsrd => "lsrd",
        Mul => "mul", Neg => "neg", Nega => "nega", Negb => "negb",
        Nop => "nop", Oim => "oim", Ora => "ora", Oraa => "oraa",
        Orab => "orab", Orb => "orb", Orcc => "orcc", Psha => "psha",
        Pshb => "pshb", Pshs => "pshs", Pshu => "pshu", Pshx => "pshx",
        Pula => "pula", Pulb => "pulb", Puls => "puls", Pulu => "pulu",
        Pulx => "pulx", Rol => "rol", Rola => "rola", Rolb => "rolb",
        Ror => "ror", Rora => "rora", Rorb => "rorb", Rti => "rti",
        Rts => "rts", Sba => "sba", Sbca => "sbca", Sbcb => "sbcb",
        Sec => "sec", Sei => "sei", Sev => "sev", Sex => "sex",
        Slp => "slp", Sta => "sta", Staa => "staa", Stab => "stab",
        Stb => "stb", Std => "std", Sts => "sts", Stu => "stu",
        Stx => "stx", Sty => "sty", Suba => "suba", Subb => "subb",
        Subd => "subd", Swi => "swi", Swi2 => "swi2", Swi3 => "swi3",
        Sync => "sync", Tab => "tab", Tap => "tap", Tba => "tba",
        Tfr => "tfr", Tim => "tim", Tpa => "tpa", Tst => "tst",
        Tsta => "tsta", Tstb => "tstb", Tsx => "tsx", Txs => "txs",
        Wai => "wai", Xgdx => "xgdx",
    }
}

pub static NAMES: NameTables = NameTables {
    registers: M680xReg::NAMES,
    instructions: M680xInsn::NAMES,
    groups: &[],
};

/// CPU selected by the session mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Cpu {
    M6800,
    M6801,
    Hd6301,
    M6809,
}

impl Cpu {
    fn from_mode(mode: Mode) -> Option<Cpu> {
        if mode.contains(Mode::M680X_6809) {
            Some(Cpu::M6809)
        } else if mode.contains(Mode::M680X_6301) {
            Some(Cpu::Hd6301)
        } else if mode.contains(Mode::M680X_6801) {
            Some(Cpu::M6801)
        } else if mode.contains(Mode::M680X_6800) {
            Some(Cpu::M6800)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum M680xOperandKind {
    Reg(M680xReg),
    Imm(i32),
    /// Direct page address.
    Direct(u8),
    Extended { address: u16, indirect: bool },
    Relative { address: u16, offset: i16 },
    Indexed {
        base: M680xReg,
        offset_reg: M680xReg,
        offset: i32,
        /// Width of the encoded offset: 0, 5, 8 or 16.
        bits: u8,
        /// Post-increment (positive) or pre-decrement (negative) step.
        inc_dec: i8,
        indirect: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct M680xOperand {
    pub kind: M680xOperandKind,
    pub access: Access,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct M680xDetail {
    pub operands: Vec<M680xOperand>,
}

/// Indexed addressing as encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Index {
    pub base: M680xReg,
    pub offset_reg: M680xReg,
    pub offset: i32,
    pub bits: u8,
    pub inc_dec: i8,
    pub indirect: bool,
    /// Effective address of program-counter-relative forms.
    pub target: u16,
}

impl Index {
    pub(crate) fn new(base: M680xReg) -> Self {
        Self {
            base,
            offset_reg: M680xReg::Invalid,
            offset: 0,
            bits: 0,
            inc_dec: 0,
            indirect: false,
            target: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Reg(M680xReg),
    Imm(i32),
    Direct(u8),
    Extended(u16),
    /// `[$nnnn]`, extended indirect.
    Indirect(u16),
    Relative { target: u16, offset: i16 },
    Indexed(Index),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Decoded {
    pub insn: M680xInsn,
    pub mode: Addressing,
    pub fx: Fx,
    pub ops: Vec<Op>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct M680xDecoder;

impl ArchDecoder for M680xDecoder {
    fn architecture(&self) -> Architecture {
        Architecture::M680x
    }

    fn decode_one(
        &self,
        cursor: &mut Cursor<'_>,
        address: Address,
        config: &DecodeConfig,
        _state: &mut StreamState,
    ) -> Result<Instruction, DecodeError> {
        let cpu = Cpu::from_mode(config.mode)
            .ok_or(DecodeError::UnsupportedMode(Architecture::M680x, config.mode))?;
        let decoded = decode::decode(cursor, address, cpu)?;
        let operands = render(&decoded);
        Ok(decoder::finish(
            cursor,
            address,
            decoded.insn.id() as u32,
            decoded.insn.name().to_string(),
            operands,
            config,
            || detail(&decoded, cpu),
        ))
    }
}

fn index_text(ix: &Index) -> String {
    let base = ix.base.name();
    let body = if ix.base == M680xReg::Pc {
        format!("${:04x},pcr", ix.target)
    } else if ix.offset_reg != M680xReg::Invalid {
        format!("{},{}", ix.offset_reg, base)
    } else {
        match ix.inc_dec {
            1 => format!(",{}+", base),
            2 => format!(",{}++", base),
            -1 => format!(",-{}", base),
            -2 => format!(",--{}", base),
            _ if ix.bits == 0 => format!(",{}", base),
            _ => format!("{},{}", ix.offset, base),
        }
    };
    if ix.indirect {
        format!("[{}]", body)
    } else {
        body
    }
}

fn op_text(op: &Op) -> String {
    match op {
        Op::Reg(r) => r.name().to_string(),
        Op::Imm(v) => format!("#{}", v),
        Op::Direct(a) => format!("${:02x}", a),
        // `>` forces the extended form where a direct one would fit.
        Op::Extended(a) if *a < 0x100 => format!(">${:04x}", a),
        Op::Extended(a) => format!("${:04x}", a),
        Op::Indirect(a) => format!("[${:04x}]", a),
        Op::Relative { target, .. } => format!("${:04x}", target),
        Op::Indexed(ix) => index_text(ix),
    }
}

fn render(d: &Decoded) -> String {
    d.ops.iter().map(op_text).collect::<Vec<_>>().join(", ")
}

fn lower(op: &Op) -> M680xOperandKind {
    match *op {
        Op::Reg(r) => M680xOperandKind::Reg(r),
        Op::Imm(v) => M680xOperandKind::Imm(v),
        Op::Direct(a) => M680xOperandKind::Direct(a),
        Op::Extended(address) => M680xOperandKind::Extended {
            address,
            indirect: false,
        },
        Op::Indirect(address) => M680xOperandKind::Extended {
            address,
            indirect: true,
        },
        Op::Relative { target, offset } => M680xOperandKind::Relative {
            address: target,
            offset,
        },
        Op::Indexed(ix) => M680xOperandKind::Indexed {
            base: ix.base,
            offset_reg: ix.offset_reg,
            offset: ix.offset,
            bits: ix.bits,
            inc_dec: ix.inc_dec,
            indirect: ix.indirect,
        },
    }
}

fn is_store(insn: M680xInsn) -> bool {
    use M680xInsn as I;
    matches!(
        insn,
        I::Staa | I::Stab | I::Sta | I::Stb | I::Std | I::Sts | I::Stu | I::Stx | I::Sty
    )
}

fn is_read_modify_write(insn: M680xInsn) -> bool {
    use M680xInsn as I;
    matches!(
        insn,
        I::Neg
            | I::Com
            | I::Lsr
            | I::Ror
            | I::Asr
            | I::Asl
            | I::Rol
            | I::Dec
            | I::Inc
            | I::Aim
            | I::Oim
            | I::Eim
    )
}

fn access(d: &Decoded, index: usize) -> Access {
    use M680xInsn as I;
    match (d.insn, d.ops[index]) {
        (I::Exg, Op::Reg(_)) => Access::READ_WRITE,
        (I::Tfr, Op::Reg(_)) if index == 1 => Access::WRITE,
        (I::Puls | I::Pulu, Op::Reg(_)) => Access::WRITE,
        (_, Op::Reg(_) | Op::Imm(_) | Op::Relative { .. }) => Access::READ,
        (insn, _) if is_store(insn) || insn == I::Clr => Access::WRITE,
        (insn, _) if is_read_modify_write(insn) => Access::READ_WRITE,
        _ => Access::READ,
    }
}

fn is_conditional(insn: M680xInsn) -> bool {
    use M680xInsn as I;
    !matches!(insn, I::Bra | I::Brn | I::Bsr | I::Lbra | I::Lbrn | I::Lbsr)
}

fn detail(d: &Decoded, cpu: Cpu) -> DetailParts {
    use M680xInsn as I;
    let operands = (0..d.ops.len())
        .map(|i| M680xOperand {
            kind: lower(&d.ops[i]),
            access: access(d, i),
        })
        .collect();
    let mut parts = DetailParts::new(Detail::M680x(M680xDetail { operands }));

    match d.fx {
        Fx::None => {}
        Fx::Read(r) => parts.read(r.id() as u16),
        Fx::Write(r) => parts.write(r.id() as u16),
        Fx::Modify(r) => {
            parts.read(r.id() as u16);
            parts.write(r.id() as u16);
        }
    }
    // 16-bit index updates on the 6809 are written back to the base register.
    if cpu == Cpu::M6809 {
        if let Some(Op::Indexed(ix)) = d.ops.first() {
            if ix.inc_dec != 0 {
                parts.read(ix.base.id() as u16);
                parts.write(ix.base.id() as u16);
            }
        }
    }

    let stack = M680xReg::S.id() as u16;
    match d.insn {
        I::Bsr | I::Lbsr | I::Jsr => {
            parts.read(stack);
            parts.write(stack);
            parts.common(CommonGroup::Call);
        }
        I::Jmp => parts.common(CommonGroup::Jump),
        I::Rts => {
            parts.read(stack);
            parts.write(stack);
            parts.common(CommonGroup::Ret);
        }
        I::Rti => {
            parts.read(stack);
            parts.write(stack);
            parts.common(CommonGroup::Iret);
        }
        I::Swi | I::Swi2 | I::Swi3 => parts.common(CommonGroup::Int),
        insn if matches!(d.mode, Addressing::Rel8 | Addressing::Rel16) => {
            if is_conditional(insn) {
                parts.read(M680xReg::Cc.id() as u16);
            }
            parts.common(CommonGroup::Jump);
        }
        _ => {}
    }
    if matches!(d.mode, Addressing::Rel8 | Addressing::Rel16) {
        parts.common(CommonGroup::BranchRelative);
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Session;

    const CODE_6809: [u8; 35] = [
        0x06, 0x10, 0x19, 0x1a, 0x55, 0x1e, 0x01, 0x23, 0xe9, 0x31, 0x06, 0x34, 0x55, 0xa6, 0x81,
        0xa7, 0x89, 0x7f, 0xff, 0xa6, 0x9d, 0x10, 0x00, 0xa7, 0x91, 0xa6, 0x9f, 0x10, 0x00, 0x11,
        0xac, 0x99, 0x10, 0x00, 0x39,
    ];

    fn lines(mode: Mode, code: &[u8]) -> Vec<String> {
        Session::open(Architecture::M680x, mode)
            .unwrap()
            .disassemble_all(code, 0x1000, 0)
            .iter()
            .map(|i| format!("{} {}", i.mnemonic, i.operands).trim_end().to_string())
            .collect()
    }

    #[test]
    fn test_m6809() {
        assert_eq!(
            lines(Mode::M680X_6809, &CODE_6809),
            [
                "ror $10",
                "daa",
                "orcc #85",
                "exg d, x",
                "bls $0ff2",
                "leay 6,x",
                "pshs u, x, b, cc",
                "lda ,x++",
                "sta 32767,x",
                "lda [$2017,pcr]",
                "sta [,x++]",
                "lda [$1000]",
                "cmps [4096,x]",
                "rts",
            ]
        );
        let sizes: Vec<u8> = Session::open(Architecture::M680x, Mode::M680X_6809)
            .unwrap()
            .disassemble_all(&CODE_6809, 0x1000, 0)
            .iter()
            .map(|i| i.size)
            .collect();
        assert_eq!(sizes, [2, 1, 2, 2, 2, 2, 2, 2, 4, 4, 2, 4, 5, 1]);
    }

    #[test]
    fn test_stack_lists_name_the_other_stack() {
        assert_eq!(
            lines(Mode::M680X_6809, &[0x34, 0x55, 0x36, 0x40, 0x35, 0xff, 0x37, 0xc0]),
            [
                "pshs u, x, b, cc",
                "pshu s",
                "puls pc, u, y, x, dp, b, a, cc",
                "pulu pc, s",
            ]
        );
    }

    #[test]
    fn test_6800_family() {
        let code = [0x86, 0x05, 0xa7, 0x10, 0xb6, 0x00, 0x40, 0x20, 0xfe];
        assert_eq!(
            lines(Mode::M680X_6800, &code),
            ["ldaa #5", "staa 16,x", "ldaa >$0040", "bra $1007"]
        );
        assert_eq!(lines(Mode::M680X_6801, &[0xcc, 0x12, 0x34]), ["ldd #4660"]);
        assert_eq!(
            lines(Mode::M680X_6301, &[0x71, 0x0f, 0x80, 0x18]),
            ["aim #15, $80", "xgdx"]
        );
        // `ldd` is not a 6800 opcode, so decoding stops before it
        assert!(lines(Mode::M680X_6800, &[0x01, 0xcc, 0x12, 0x34]) == ["nop"]);
    }

    #[test]
    fn test_detail() {
        let mut session = Session::open(Architecture::M680x, Mode::M680X_6809).unwrap();
        session.set_detail(true);
        let insns = session.disassemble_all(&CODE_6809, 0x1000, 0);

        let bls = &insns[4];
        assert!(bls.is_branch());
        assert_eq!(bls.regs_read, vec![M680xReg::Cc.id() as u16]);
        assert!(bls.in_group(CommonGroup::BranchRelative.id()));

        let Some(Detail::M680x(d)) = &insns[8].detail else {
            panic!("missing m680x detail");
        };
        assert_eq!(d.operands[0].access, Access::WRITE);
        assert_eq!(
            d.operands[0].kind,
            M680xOperandKind::Indexed {
                base: M680xReg::X,
                offset_reg: M680xReg::Invalid,
                offset: 32767,
                bits: 16,
                inc_dec: 0,
                indirect: false,
            }
        );

        let Some(Detail::M680x(d)) = &insns[3].detail else {
            panic!("missing m680x detail");
        };
        assert!(d.operands.iter().all(|op| op.access == Access::READ_WRITE));

        // ,x++ updates x
        assert!(insns[7].regs_write.contains(&(M680xReg::X.id() as u16)));
        assert!(insns[13].is_return());

        let ror = session.decode_at(&[0x06, 0x10], 0).unwrap();
        let Some(Detail::M680x(d)) = &ror.detail else {
            panic!("missing m680x detail");
        };
        assert_eq!(d.operands[0].access, Access::READ_WRITE);
    }

    #[test]
    fn test_truncated() {
        let session = Session::open(Architecture::M680x, Mode::M680X_6809).unwrap();
        assert!(matches!(
            session.decode_at(&[0x11, 0xac, 0x99, 0x10], 0),
            Err(DecodeError::TruncatedInstruction(_))
        ));
        assert_eq!(session.decode_at(&[0x10, 0x00], 0), Err(DecodeError::InvalidEncoding));
    }
}
