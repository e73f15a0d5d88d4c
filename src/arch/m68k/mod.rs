//! Motorola 68000 family decoding, 68000 through 68060, with the 68881/68882 coprocessor
//! instructions of the 68020 and later.

mod decode;
mod ea;
mod fpu;

use crate::cursor::Cursor;
use crate::decoder::{self, ArchDecoder, DecodeConfig, DecodeError, StreamState};
use crate::detail::{Access, CommonGroup, Detail, DetailParts};
use crate::names::NameTables;
use crate::{Address, Architecture, Instruction, Mode};

registry! {
    /// M68K registers, data then address then floating-point, followed by control registers.
    pub enum M68kReg: u8 {
        Invalid => "", D0 => "d0", D1 => "d1", D2 => "d2",
        D3 => "d3", D4 => "d4", D5 => "d5", D6 => "d6",
        D7 => "d7", A0 => "a0", A1 => "a1", A2 => "a2",
        A3 => "a3", A4 => "a4", A5 => "a5", A6 => "a6",
        A7 => "a7", Fp0 => "fp0", Fp1 => "fp1", Fp2 => "fp2",
        Fp3 => "fp3", Fp4 => "fp4", Fp5 => "fp5", Fp6 => "fp6",
        Fp7 => "fp7", Pc => "pc", Sr => "sr", Ccr => "ccr",
        Sfc => "sfc", Dfc => "dfc", Usp => "usp", Vbr => "vbr",
        Cacr => "cacr", Caar => "caar", Msp => "msp", Isp => "isp",
        Tc => "tc", Itt0 => "itt0", Itt1 => "itt1", Dtt0 => "dtt0",
        Dtt1 => "dtt1", Mmusr => "mmusr", Urp => "urp", Srp => "srp",
        Fpcr => "fpcr", Fpsr => "fpsr", Fpiar => "fpiar", Dc => "dc",
        Ic => "ic", Bc => "bc",
    }
}

registry! {
    /// M68K instructions. Operand sizes are a suffix on the printed mnemonic, not separate ids.
    pub enum M68kInsn: u16 {
        Invalid => "", Abcd => "abcd", Add => "add", Adda => "adda",
        Addi => "addi", Addq => "addq", Addx => "addx", And => "and",
        Andi => "andi", Asl => "asl", Asr => "asr", Bcc => "bcc",
        Bchg => "bchg", Bclr => "bclr", Bcs => "bcs", Beq => "beq",
        Bfchg => "bfchg", Bfclr => "bfclr", Bfexts => "bfexts", Bfextu => "bfextu",
        Bfffo => "bfffo", Bfins => "bfins", Bfset => "bfset", Bftst => "bftst",
        Bge => "bge", Bgt => "bgt", Bhi => "bhi", Bkpt => "bkpt",
        Ble => "ble", Bls => "bls", Blt => "blt", Bmi => "bmi",
        Bne => "bne", Bpl => "bpl", Bra => "bra", Bset => "bset",
        Bsr => "bsr", Btst => "btst", Bvc => "bvc", Bvs => "bvs",
        Cas => "cas", Chk => "chk", Chk2 => "chk2", Cinva => "cinva",
        Cinvl => "cinvl", Cinvp => "cinvp", Clr => "clr", Cmp => "cmp",
        Cmp2 => "cmp2", Cmpa => "cmpa", Cmpi => "cmpi", Cmpm => "cmpm",
        Cpusha => "cpusha", Cpushl => "cpushl", Cpushp => "cpushp", Dbcc => "dbcc",
        Dbcs => "dbcs", Dbeq => "dbeq", Dbf => "dbf", Dbge => "dbge",
        Dbgt => "dbgt", Dbhi => "dbhi", Dble => "dble", Dbls => "dbls",
        Dblt => "dblt", Dbmi => "dbmi", Dbne => "dbne", Dbpl => "dbpl",
        Dbt => "dbt", Dbvc => "dbvc", Dbvs => "dbvs", Divs => "divs",
        Divsl => "divsl", Divu => "divu", Divul => "divul", Eor => "eor",
        Eori => "eori", Exg => "exg", Ext => "ext", Extb => "extb",
        Fabs => "fabs", Facos => "facos", Fadd => "fadd", Fasin => "fasin",
        Fatan => "fatan", Fatanh => "fatanh", Fbeq => "fbeq", Fbf => "fbf",
        Fbge => "fbge", Fbgl => "fbgl", Fbgle => "fbgle", Fbgt => "fbgt",
        Fble => "fble", Fblt => "fblt", Fbne => "fbne", Fbnge => "fbnge",
        Fbngl => "fbngl", Fbngle => "fbngle", Fbngt => "fbngt", Fbnle => "fbnle",
        Fbnlt => "fbnlt", Fboge => "fboge", Fbogl => "fbogl", Fbogt => "fbogt",
        Fbole => "fbole", Fbolt => "fbolt", Fbor => "fbor", Fbseq => "fbseq",
        Fbsf => "fbsf", Fbsne => "fbsne", Fbst => "fbst", Fbt => "fbt",
        Fbueq => "fbueq", Fbuge => "fbuge", Fbugt => "fbugt", Fbule => "fbule",
        Fbult => "fbult", Fbun => "fbun", Fcmp => "fcmp", Fcos => "fcos",
        Fcosh => "fcosh", Fdabs => "fdabs", Fdadd => "fdadd", Fdbeq => "fdbeq",
        Fdbf => "fdbf", Fdbge => "fdbge", Fdbgl => "fdbgl", Fdbgle => "fdbgle",
        Fdbgt => "fdbgt", Fdble => "fdble", Fdblt => "fdblt", Fdbne => "fdbne",
        Fdbnge => "fdbnge", Fdbngl => "fdbngl", Fdbngle => "fdbngle", Fdbngt => "fdbngt",
        Fdbnle => "fdbnle", Fdbnlt => "fdbnlt", Fdboge => "fdboge", Fdbogl => "fdbogl",
        Fdbogt => "fdbogt", Fdbole => "fdbole", Fdbolt => "fdbolt", Fdbor => "fdbor",
        Fdbseq => "fdbseq", Fdbsf => "fdbsf", Fdbsne => "fdbsne", Fdbst => "fdbst",
        Fdbt => "fdbt", Fdbueq => "fdbueq", Fdbuge => "fdbuge", Fdbugt => "fdbugt",
        Fdbule => "fdbule", Fdbult => "fdbult", Fdbun => "fdbun", Fddiv => "fddiv",
        Fdiv => "fdiv", Fdmove => "fdmove", Fdmul => "fdmul", Fdneg => "fdneg",
        Fdsqrt => "fdsqrt", Fdsub => "fdsub", Fetox => "fetox", Fetoxm1 => "fetoxm1",
        Fgetexp => "fgetexp", Fgetman => "fgetman", Fint => "fint", Fintrz => "fintrz",
        Flog10 => "flog10", Flog2 => "flog2", Flogn => "flogn", Flognp1 => "flognp1",
        Fmod => "fmod", Fmove => "fmove", Fmovecr => "fmovecr", Fmovem => "fmovem",
        Fmul => "fmul", Fneg => "fneg", Fnop => "fnop", Frem => "frem",
        Frestore => "frestore", Fsabs => "fsabs", Fsadd => "fsadd", Fsave => "fsave",
        Fscale => "fscale", Fsdiv => "fsdiv", Fseq => "fseq", Fsf => "fsf",
        Fsge => "fsge", Fsgl => "fsgl", Fsgldiv => "fsgldiv", Fsgle => "fsgle",
        Fsglmul => "fsglmul", Fsgt => "fsgt", Fsin => "fsin", Fsincos => "fsincos",
        Fsinh => "fsinh", Fsle => "fsle", Fslt => "fslt", Fsmove => "fsmove",
        Fsmul => "fsmul", Fsne => "fsne", Fsneg => "fsneg", Fsnge => "fsnge",
        Fsngl => "fsngl", Fsngle => "fsngle", Fsngt => "fsngt", Fsnle => "fsnle",
        Fsnlt => "fsnlt", Fsoge => "fsoge", Fsogl => "fsogl", Fsogt => "fsogt",
        Fsole => "fsole", Fsolt => "fsolt", Fsor => "fsor", Fsqrt => "fsqrt",
        Fsseq => "fsseq", Fssf => "fssf", Fssne => "fssne", Fssqrt => "fssqrt",
        Fsst => "fsst", Fssub => "fssub", Fst => "fst", Fsub => "fsub",
        Fsueq => "fsueq", Fsuge => "fsuge", Fsugt => "fsugt", Fsule => "fsule",
        Fsult => "fsult", Fsun => "fsun", Ftan => "ftan", Ftanh => "ftanh",
        Ftentox => "ftentox", Ftrapeq => "ftrapeq", Ftrapf => "ftrapf", Ftrapge => "ftrapge",
        Ftrapgl => "ftrapgl", Ftrapgle => "ftrapgle", Ftrapgt => "ftrapgt", Ftraple => "ftraple",
        Ftraplt => "ftraplt", Ftrapne => "ftrapne", Ftrapnge => "ftrapnge", Ftrapngl => "ftrapngl",
        Ftrapngle => "ftrapngle", Ftrapngt => "ftrapngt", Ftrapnle => "ftrapnle", Ftrapnlt => "ftrapnlt",
        Ftrapoge => "ftrapoge", Ftrapogl => "ftrapogl", Ftrapogt => "ftrapogt", Ftrapole => "ftrapole",
        Ftrapolt => "ftrapolt", Ftrapor => "ftrapor", Ftrapseq => "ftrapseq", Ftrapsf => "ftrapsf",
        Ftrapsne => "ftrapsne", Ftrapst => "ftrapst", Ftrapt => "ftrapt", Ftrapueq => "ftrapueq",
        Ftrapuge => "ftrapuge", Ftrapugt => "ftrapugt", Ftrapule => "ftrapule", Ftrapult => "ftrapult",
        Ftrapun => "ftrapun", Ftst => "ftst", Ftwotox => "ftwotox", Illegal => "illegal",
        Jmp => "jmp", Jsr => "jsr", Lea => "lea", Link => "link",
        Lsl => "lsl", Lsr => "lsr", Move => "move", Move16 => "move16",
        Movea => "movea", Movec => "movec", Movem => "movem", Movep => "movep",
        Moveq => "moveq", Moves => "moves", Muls => "muls", Mulu => "mulu",
        Nbcd => "nbcd", Neg => "neg", Negx => "negx", Nop => "nop",
        Not => "not", Or => "or", Ori => "ori", Pack => "pack",
        Pea => "pea", Pflush => "pflush", Pflusha => "pflusha", Pflushan => "pflushan",
        Pflushn => "pflushn", Ptestr => "ptestr", Ptestw => "ptestw", Reset => "reset",
        Rol => "rol", Ror => "ror", Roxl => "roxl", Roxr => "roxr",
        Rtd => "rtd", Rte => "rte", Rtr => "rtr", Rts => "rts",
        Sbcd => "sbcd", Scc => "scc", Scs => "scs", Seq => "seq",
        Sf => "sf", Sge => "sge", Sgt => "sgt", Shi => "shi",
        Sle => "sle", Sls => "sls", Slt => "slt", Smi => "smi",
        Sne => "sne", Spl => "spl", St => "st", Stop => "stop",
        Sub => "sub", Suba => "suba", Subi => "subi", Subq => "subq",
        Subx => "subx", Svc => "svc", Svs => "svs", Swap => "swap",
        Tas => "tas", Trap => "trap", Trapcc => "trapcc", Trapcs => "trapcs",
        Trapeq => "trapeq", Trapf => "trapf", Trapge => "trapge", Trapgt => "trapgt",
        Traphi => "traphi", Traple => "traple", Trapls => "trapls", Traplt => "traplt",
        Trapmi => "trapmi", Trapne => "trapne", Trappl => "trappl", Trapt => "trapt",
        Trapv => "trapv", Trapvc => "trapvc", Trapvs => "trapvs", Tst => "tst",
        Unlk => "unlk", Unpk => "unpk",
    }
}

pub static NAMES: NameTables = NameTables {
    registers: M68kReg::NAMES,
    instructions: M68kInsn::NAMES,
    groups: &[],
};

/// CPU model selected by the session mode. Instructions introduced by a later model are
/// invalid on an earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Cpu {
    M68000,
    M68010,
    M68020,
    M68030,
    M68040,
    M68060,
}

impl Cpu {
    fn from_mode(mode: Mode) -> Cpu {
        if mode.contains(Mode::M68K_000) {
            Cpu::M68000
        } else if mode.contains(Mode::M68K_010) {
            Cpu::M68010
        } else if mode.contains(Mode::M68K_020) {
            Cpu::M68020
        } else if mode.contains(Mode::M68K_030) {
            Cpu::M68030
        } else if mode.contains(Mode::M68K_060) {
            Cpu::M68060
        } else {
            Cpu::M68040
        }
    }
}

/// Operation size, printed as a mnemonic suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum M68kSize {
    #[default]
    None,
    Byte,
    Word,
    Long,
    Single,
    Double,
    Extended,
    Packed,
}

impl M68kSize {
    /// The two-bit size field used by most integer instructions.
    pub(crate) fn from_field(bits: u16) -> Option<M68kSize> {
        match bits & 3 {
            0 => Some(M68kSize::Byte),
            1 => Some(M68kSize::Word),
            2 => Some(M68kSize::Long),
            _ => None,
        }
    }

    /// Coprocessor source/destination format field.
    pub(crate) fn from_fpu_format(bits: u16) -> M68kSize {
        match bits & 7 {
            0 => M68kSize::Long,
            1 => M68kSize::Single,
            2 => M68kSize::Extended,
            3 | 7 => M68kSize::Packed,
            4 => M68kSize::Word,
            5 => M68kSize::Double,
            _ => M68kSize::Byte,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            M68kSize::None => "",
            M68kSize::Byte => ".b",
            M68kSize::Word => ".w",
            M68kSize::Long => ".l",
            M68kSize::Single => ".s",
            M68kSize::Double => ".d",
            M68kSize::Extended => ".x",
            M68kSize::Packed => ".p",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum M68kAddressMode {
    Indirect,
    PostIncrement,
    PreDecrement,
    Displacement,
    /// `(d8, An, Xn)` brief extension.
    Index,
    /// `(bd, An, Xn)` full extension without memory indirection.
    IndexBase,
    MemoryPostIndex,
    MemoryPreIndex,
    PcDisplacement,
    PcIndex,
    PcIndexBase,
    PcMemoryPostIndex,
    PcMemoryPreIndex,
    AbsoluteShort,
    AbsoluteLong,
}

/// A memory operand. Suppressed base or index registers are `Invalid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct M68kMem {
    pub mode: M68kAddressMode,
    pub base: M68kReg,
    pub index: M68kReg,
    pub index_long: bool,
    pub scale: u8,
    /// Displacement, base displacement, or absolute address.
    pub disp: i32,
    pub outer: i32,
}

impl M68kMem {
    pub(crate) fn new(mode: M68kAddressMode, base: M68kReg) -> Self {
        Self {
            mode,
            base,
            index: M68kReg::Invalid,
            index_long: false,
            scale: 1,
            disp: 0,
            outer: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum M68kOperandKind {
    Reg(M68kReg),
    /// `d1:d2` register pairs of the long multiply and divide forms.
    RegPair(M68kReg, M68kReg),
    /// Bit set: 0-7 data, 8-15 address, 16-23 floating-point, 24 fpiar, 25 fpsr, 26 fpcr.
    RegList(u32),
    Imm(i64),
    FpImm(f64),
    Mem(M68kMem),
    /// Absolute branch target.
    Target(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum M68kBitValue {
    Imm(u8),
    Reg(M68kReg),
}

/// `{offset:width}` of a bit-field instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct M68kBitField {
    /// Index of the operand the field selects from.
    pub operand: u8,
    pub offset: M68kBitValue,
    pub width: M68kBitValue,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct M68kOperand {
    pub kind: M68kOperandKind,
    pub access: Access,
}

#[derive(Debug, Clone, PartialEq)]
pub struct M68kDetail {
    pub operands: Vec<M68kOperand>,
    pub size: M68kSize,
    pub bitfield: Option<M68kBitField>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Decoded {
    pub insn: M68kInsn,
    pub size: M68kSize,
    pub ops: Vec<M68kOperandKind>,
    pub bitfield: Option<M68kBitField>,
}

impl Decoded {
    pub(crate) fn new(insn: M68kInsn, size: M68kSize, ops: Vec<M68kOperandKind>) -> Self {
        Self {
            insn,
            size,
            ops,
            bitfield: None,
        }
    }

    pub(crate) fn no_size(insn: M68kInsn, ops: Vec<M68kOperandKind>) -> Self {
        Self::new(insn, M68kSize::None, ops)
    }

    fn mnemonic(&self) -> String {
        format!("{}{}", self.insn.name(), self.size.suffix())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct M68kDecoder;

impl ArchDecoder for M68kDecoder {
    fn architecture(&self) -> Architecture {
        Architecture::M68k
    }

    fn decode_one(
        &self,
        cursor: &mut Cursor<'_>,
        address: Address,
        config: &DecodeConfig,
        _state: &mut StreamState,
    ) -> Result<Instruction, DecodeError> {
        let cpu = Cpu::from_mode(config.mode);
        let decoded = decode::decode(&mut ea::Reader::new(cursor, cpu, address))?;
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

fn disp_text(value: i32) -> String {
    if value < 0 {
        format!("-${:x}", value.unsigned_abs())
    } else {
        format!("${:x}", value)
    }
}

fn index_text(mem: &M68kMem) -> String {
    let size = if mem.index_long { 'l' } else { 'w' };
    if mem.scale > 1 {
        format!("{}.{} * {}", mem.index, size, mem.scale)
    } else {
        format!("{}.{}", mem.index, size)
    }
}

fn mem_text(mem: &M68kMem) -> String {
    use M68kAddressMode as Am;
    let base = mem.base.name();
    match mem.mode {
        Am::Indirect => format!("({})", base),
        Am::PostIncrement => format!("({})+", base),
        Am::PreDecrement => format!("-({})", base),
        Am::Displacement | Am::PcDisplacement => format!("{}({})", disp_text(mem.disp), base),
        Am::Index | Am::PcIndex => {
            let inner = format!("{}, {}", base, index_text(mem));
            if mem.disp == 0 {
                format!("({})", inner)
            } else {
                format!("{}({})", disp_text(mem.disp), inner)
            }
        }
        Am::AbsoluteShort => format!("${:x}.w", mem.disp as i16 as u16),
        Am::AbsoluteLong => format!("${:x}.l", mem.disp as u32),
        Am::IndexBase
        | Am::PcIndexBase
        | Am::MemoryPreIndex
        | Am::PcMemoryPreIndex
        | Am::MemoryPostIndex
        | Am::PcMemoryPostIndex => {
            let mut inner = Vec::new();
            if mem.disp != 0 {
                inner.push(disp_text(mem.disp));
            }
            if mem.base != M68kReg::Invalid {
                inner.push(base.to_string());
            }
            let index = (mem.index != M68kReg::Invalid).then(|| index_text(mem));
            let pre = matches!(mem.mode, Am::MemoryPreIndex | Am::PcMemoryPreIndex);
            let post = matches!(mem.mode, Am::MemoryPostIndex | Am::PcMemoryPostIndex);
            if !post {
                inner.extend(index.clone());
            }
            if !pre && !post {
                return format!("({})", inner.join(", "));
            }
            let mut outer = vec![format!("[{}]", inner.join(", "))];
            if post {
                outer.extend(index);
            }
            if mem.outer != 0 {
                outer.push(disp_text(mem.outer));
            }
            format!("({})", outer.join(", "))
        }
    }
}

/// Renders a register set as ranges, `d0-d2/a5/fp0-fp1`.
fn list_text(mask: u32) -> String {
    let mut parts = Vec::new();
    for (class, prefix) in [(0, "d"), (8, "a"), (16, "fp")] {
        let mut n = 0;
        while n < 8 {
            if mask & (1 << (class + n)) == 0 {
                n += 1;
                continue;
            }
            let start = n;
            while n + 1 < 8 && mask & (1 << (class + n + 1)) != 0 {
                n += 1;
            }
            if start == n {
                parts.push(format!("{}{}", prefix, start));
            } else {
                parts.push(format!("{}{}-{}{}", prefix, start, prefix, n));
            }
            n += 1;
        }
    }
    for (bit, reg) in [(26, M68kReg::Fpcr), (25, M68kReg::Fpsr), (24, M68kReg::Fpiar)] {
        if mask & (1 << bit) != 0 {
            parts.push(reg.name().to_string());
        }
    }
    parts.join("/")
}

fn op_text(op: &M68kOperandKind) -> String {
    match op {
        M68kOperandKind::Reg(r) => r.name().to_string(),
        M68kOperandKind::RegPair(a, b) => format!("{}:{}", a, b),
        M68kOperandKind::RegList(mask) => list_text(*mask),
        M68kOperandKind::Imm(v) if *v < 0 => format!("#-${:x}", v.unsigned_abs()),
        M68kOperandKind::Imm(v) => format!("#${:x}", v),
        M68kOperandKind::FpImm(v) => format!("#{:.6}", v),
        M68kOperandKind::Mem(mem) => mem_text(mem),
        M68kOperandKind::Target(t) => format!("${:x}", t),
    }
}

fn bit_value(v: M68kBitValue) -> String {
    match v {
        M68kBitValue::Imm(n) => n.to_string(),
        M68kBitValue::Reg(r) => r.name().to_string(),
    }
}

fn render(d: &Decoded) -> String {
    d.ops
        .iter()
        .enumerate()
        .map(|(i, op)| match d.bitfield {
            Some(field) if field.operand as usize == i => format!(
                "{}{{{}:{}}}",
                op_text(op),
                bit_value(field.offset),
                bit_value(field.width)
            ),
            _ => op_text(op),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// How an instruction uses its operands, last operand being the destination.
enum Shape {
    Read,
    Write,
    Modify,
    Unary,
    Clear,
    Swap,
}

fn shape(insn: M68kInsn) -> Shape {
    use M68kInsn as I;
    match insn {
        I::Cmp | I::Cmpa | I::Cmpi | I::Cmpm | I::Cmp2 | I::Chk | I::Chk2 | I::Tst | I::Btst
        | I::Bftst | I::Fcmp | I::Ftst | I::Pea | I::Jmp | I::Jsr | I::Ptestr | I::Ptestw
        | I::Tas => Shape::Read,
        I::Move | I::Movea | I::Moveq | I::Movem | I::Movep | I::Movec | I::Moves | I::Move16
        | I::Lea | I::Bfextu | I::Bfexts | I::Bfffo | I::Fmove | I::Fmovem | I::Fsmove
        | I::Fdmove | I::Fmovecr | I::Fint | I::Fintrz | I::Fsqrt | I::Fssqrt | I::Fdsqrt
        | I::Fabs | I::Fsabs | I::Fdabs | I::Fneg | I::Fsneg | I::Fdneg | I::Fsin | I::Fcos
        | I::Ftan | I::Fasin | I::Facos | I::Fatan | I::Fsinh | I::Fcosh | I::Ftanh
        | I::Fatanh | I::Fetox | I::Fetoxm1 | I::Ftwotox | I::Ftentox | I::Flogn
        | I::Flognp1 | I::Flog10 | I::Flog2 | I::Fgetexp | I::Fgetman | I::Fsincos => {
            Shape::Write
        }
        I::Clr => Shape::Clear,
        I::Neg | I::Negx | I::Not | I::Nbcd | I::Ext | I::Extb | I::Swap | I::Unlk => {
            Shape::Unary
        }
        I::Exg => Shape::Swap,
        _ => Shape::Modify,
    }
}

fn access(d: &Decoded, index: usize, scc: bool) -> Access {
    if matches!(
        d.ops[index],
        M68kOperandKind::Imm(_) | M68kOperandKind::FpImm(_) | M68kOperandKind::Target(_)
    ) {
        return Access::READ;
    }
    let last = index + 1 == d.ops.len();
    match shape(d.insn) {
        _ if scc => Access::WRITE,
        Shape::Read => Access::READ,
        Shape::Swap => Access::READ_WRITE,
        Shape::Clear => Access::WRITE,
        Shape::Unary => Access::READ_WRITE,
        Shape::Write if last && d.ops.len() > 1 => Access::WRITE,
        Shape::Write if last => Access::READ_WRITE,
        Shape::Modify if last => Access::READ_WRITE,
        _ => Access::READ,
    }
}

fn detail(d: &Decoded) -> DetailParts {
    use M68kInsn as I;
    let scc = decode::is_set_on_condition(d.insn) || fpu::is_set_on_condition(d.insn);
    let operands = (0..d.ops.len())
        .map(|i| M68kOperand {
            kind: d.ops[i],
            access: access(d, i, scc),
        })
        .collect();
    let mut parts = DetailParts::new(Detail::M68k(M68kDetail {
        operands,
        size: d.size,
        bitfield: d.bitfield,
    }));

    let stack = M68kReg::A7.id() as u16;
    let relative = matches!(d.ops.last(), Some(M68kOperandKind::Target(_)));
    match d.insn {
        I::Bsr | I::Jsr => {
            parts.read(stack);
            parts.write(stack);
            parts.common(CommonGroup::Call);
        }
        I::Rts | I::Rtd | I::Rtr => {
            parts.read(stack);
            parts.write(stack);
            parts.common(CommonGroup::Ret);
        }
        I::Rte => {
            parts.common(CommonGroup::Iret);
            parts.common(CommonGroup::Privilege);
        }
        I::Trap | I::Trapv | I::Bkpt | I::Illegal => parts.common(CommonGroup::Int),
        I::Link | I::Unlk => {
            parts.read(stack);
            parts.write(stack);
        }
        I::Stop | I::Reset | I::Movec | I::Moves | I::Cinvl | I::Cinvp | I::Cinva | I::Cpushl
        | I::Cpushp | I::Cpusha | I::Pflush | I::Pflushn | I::Pflusha | I::Pflushan
        | I::Ptestr | I::Ptestw | I::Fsave | I::Frestore => parts.common(CommonGroup::Privilege),
        I::Jmp | I::Bra => parts.common(CommonGroup::Jump),
        insn if decode::is_trap_on_condition(insn) || fpu::is_trap_on_condition(insn) => {
            parts.common(CommonGroup::Int)
        }
        _ if relative => {
            parts.read(M68kReg::Ccr.id() as u16);
            parts.common(CommonGroup::Jump);
        }
        _ if scc => parts.read(M68kReg::Ccr.id() as u16),
        _ => {}
    }
    if d.ops.last() == Some(&M68kOperandKind::Reg(M68kReg::Sr)) {
        parts.common(CommonGroup::Privilege);
    }
    if relative {
        parts.common(CommonGroup::BranchRelative);
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Session;

    const CODE: [u8; 42] = [
        0xd4, 0x40, 0x87, 0x5a, 0x4e, 0x71, 0x02, 0xb4, 0xc0, 0xde, 0xc0, 0xde, 0x5c, 0x00, 0x1d,
        0x80, 0x71, 0x12, 0x01, 0x23, 0xf2, 0x3c, 0x44, 0x22, 0x40, 0x49, 0x0e, 0x56, 0x54, 0xc5,
        0xf2, 0x3c, 0x44, 0x00, 0x44, 0x7a, 0x00, 0x00, 0xf2, 0x00, 0x0a, 0x28,
    ];

    fn session(mode: Mode) -> Session {
        Session::open(Architecture::M68k, mode).unwrap()
    }

    fn text(insn: &Instruction) -> String {
        format!("{} {}", insn.mnemonic, insn.operands).trim_end().to_string()
    }

    #[test]
    fn test_m68k() {
        let insns = session(Mode::BIG_ENDIAN | Mode::M68K_040).disassemble_all(&CODE, 0x1000, 0);
        let lines: Vec<String> = insns.iter().map(text).collect();
        assert_eq!(
            lines,
            [
                "add.w d0, d2",
                "or.w d3, (a2)+",
                "nop",
                "andi.l #$c0dec0de, (a4, d5.l * 4)",
                "move.b d0, ([a6, d7.w], $123)",
                "fadd.s #3.141500, fp0",
                "scc.b d5",
                "fmove.s #1000.000000, fp0",
                "fsub fp2, fp4",
            ]
        );
        let sizes: Vec<u8> = insns.iter().map(|i| i.size).collect();
        assert_eq!(sizes, [2, 2, 2, 8, 6, 8, 2, 8, 4]);
    }

    #[test]
    fn test_cpu_gating() {
        // full-format extension words and the coprocessor need a 68020
        let on_000 = session(Mode::BIG_ENDIAN | Mode::M68K_000).disassemble_all(&CODE, 0x1000, 0);
        assert_eq!(on_000.len(), 4);
        assert_eq!(text(&on_000[3]), "andi.l #$c0dec0de, (a4, d5.l)");
        // no CPU flag means 68040
        assert_eq!(session(Mode::BIG_ENDIAN).disassemble_all(&CODE, 0, 0).len(), 9);
    }

    #[test]
    fn test_render_lists_and_memory() {
        assert_eq!(list_text(0x0107), "d0-d2/a0");
        assert_eq!(list_text(0x8000 | 0x10000 | 0x20000 | (1 << 26)), "a7/fp0-fp1/fpcr");
        let mut mem = M68kMem::new(M68kAddressMode::Displacement, M68kReg::A1);
        mem.disp = -16;
        assert_eq!(mem_text(&mem), "-$10(a1)");
        let mut mem = M68kMem::new(M68kAddressMode::MemoryPostIndex, M68kReg::A0);
        mem.index = M68kReg::D1;
        mem.disp = 4;
        mem.outer = 8;
        assert_eq!(mem_text(&mem), "([$4, a0], d1.w, $8)");
    }

    #[test]
    fn test_detail() {
        let mut s = session(Mode::BIG_ENDIAN | Mode::M68K_040);
        s.set_detail(true);
        let insns = s.disassemble_all(&CODE, 0x1000, 0);

        let Some(Detail::M68k(d)) = &insns[0].detail else {
            panic!("missing m68k detail");
        };
        assert_eq!(d.size, M68kSize::Word);
        assert_eq!(d.operands[0].access, Access::READ);
        assert_eq!(d.operands[1].access, Access::READ_WRITE);

        let Some(Detail::M68k(d)) = &insns[6].detail else {
            panic!("missing m68k detail");
        };
        assert_eq!(d.operands[0].access, Access::WRITE);
        assert_eq!(insns[6].regs_read, vec![M68kReg::Ccr.id() as u16]);

        // bsr.w $1010
        let bsr = s.decode_at(&[0x61, 0x00, 0x00, 0x0e], 0x1000).unwrap();
        assert_eq!(text(&bsr), "bsr.w $1010");
        assert!(bsr.is_branch());
        assert!(bsr.in_group(CommonGroup::BranchRelative.id()));
        assert_eq!(bsr.regs_write, vec![M68kReg::A7.id() as u16]);

        let rts = s.decode_at(&[0x4e, 0x75], 0).unwrap();
        assert!(rts.is_return());
    }
}
