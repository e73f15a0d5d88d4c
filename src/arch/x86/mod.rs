//! x86 (16/32/64-bit) decoder.
//!
//! Decoding runs as a staged state machine over the legacy encoding: prefixes, REX, one or
//! two opcode bytes, ModRM/SIB, displacement and immediate. Opcode maps live in [`tables`];
//! [`format`] renders Intel, AT&T and MASM text; [`implicit`] supplies implicit register
//! usage and groups for detail mode.

mod decode;
mod format;
mod implicit;
mod tables;

use crate::cursor::Cursor;
use crate::decoder::{self, ArchDecoder, DecodeConfig, DecodeError, StreamState};
use crate::detail::{Access, Detail, DetailParts};
use crate::names::NameTables;
use crate::{Address, Architecture, Instruction};

pub(crate) use decode::Decoded;

registry! {
    /// x86 registers.
    pub enum X86Reg: u16 {
        Invalid => "",
        Al => "al", Cl => "cl", Dl => "dl", Bl => "bl",
        Ah => "ah", Ch => "ch", Dh => "dh", Bh => "bh",
        Spl => "spl", Bpl => "bpl", Sil => "sil", Dil => "dil",
        R8b => "r8b", R9b => "r9b", R10b => "r10b", R11b => "r11b",
        R12b => "r12b", R13b => "r13b", R14b => "r14b", R15b => "r15b",
        Ax => "ax", Cx => "cx", Dx => "dx", Bx => "bx",
        Sp => "sp", Bp => "bp", Si => "si", Di => "di",
        R8w => "r8w", R9w => "r9w", R10w => "r10w", R11w => "r11w",
        R12w => "r12w", R13w => "r13w", R14w => "r14w", R15w => "r15w",
        Eax => "eax", Ecx => "ecx", Edx => "edx", Ebx => "ebx",
        Esp => "esp", Ebp => "ebp", Esi => "esi", Edi => "edi",
        R8d => "r8d", R9d => "r9d", R10d => "r10d", R11d => "r11d",
        R12d => "r12d", R13d => "r13d", R14d => "r14d", R15d => "r15d",
        Rax => "rax", Rcx => "rcx", Rdx => "rdx", Rbx => "rbx",
        Rsp => "rsp", Rbp => "rbp", Rsi => "rsi", Rdi => "rdi",
        R8 => "r8", R9 => "r9", R10 => "r10", R11 => "r11",
        R12 => "r12", R13 => "r13", R14 => "r14", R15 => "r15",
        Es => "es", Cs => "cs", Ss => "ss", Ds => "ds", Fs => "fs", Gs => "gs",
        Ip => "ip", Eip => "eip", Rip => "rip", Eflags => "flags", Fpsw => "fpsw",
        Eiz => "eiz", Riz => "riz",
        Cr0 => "cr0", Cr1 => "cr1", Cr2 => "cr2", Cr3 => "cr3",
        Cr4 => "cr4", Cr5 => "cr5", Cr6 => "cr6", Cr7 => "cr7",
        Cr8 => "cr8", Cr9 => "cr9", Cr10 => "cr10", Cr11 => "cr11",
        Cr12 => "cr12", Cr13 => "cr13", Cr14 => "cr14", Cr15 => "cr15",
        Dr0 => "dr0", Dr1 => "dr1", Dr2 => "dr2", Dr3 => "dr3",
        Dr4 => "dr4", Dr5 => "dr5", Dr6 => "dr6", Dr7 => "dr7",
        St0 => "st(0)", St1 => "st(1)", St2 => "st(2)", St3 => "st(3)",
        St4 => "st(4)", St5 => "st(5)", St6 => "st(6)", St7 => "st(7)",
        Mm0 => "mm0", Mm1 => "mm1", Mm2 => "mm2", Mm3 => "mm3",
        Mm4 => "mm4", Mm5 => "mm5", Mm6 => "mm6", Mm7 => "mm7",
        Xmm0 => "xmm0", Xmm1 => "xmm1", Xmm2 => "xmm2", Xmm3 => "xmm3",
        Xmm4 => "xmm4", Xmm5 => "xmm5", Xmm6 => "xmm6", Xmm7 => "xmm7",
        Xmm8 => "xmm8", Xmm9 => "xmm9", Xmm10 => "xmm10", Xmm11 => "xmm11",
        Xmm12 => "xmm12", Xmm13 => "xmm13", Xmm14 => "xmm14", Xmm15 => "xmm15",
    }
}

registry! {
    /// x86 instruction ids.
    pub enum X86Insn: u16 {
        Invalid => "",
        Aaa => "aaa", Aad => "aad", Aam => "aam", Aas => "aas",
        Adc => "adc", Add => "add", Addpd => "addpd", Addps => "addps",
        Addsd => "addsd", Addss => "addss", And => "and", Andnpd => "andnpd",
        Andnps => "andnps", Andpd => "andpd", Andps => "andps", Arpl => "arpl",
        Bound => "bound", Bsf => "bsf", Bsr => "bsr", Bswap => "bswap",
        Bt => "bt", Btc => "btc", Btr => "btr", Bts => "bts",
        Call => "call", Cbw => "cbw", Cdq => "cdq", Cdqe => "cdqe",
        Clac => "clac", Clc => "clc", Cld => "cld", Clflush => "clflush",
        Cli => "cli", Clts => "clts", Cmc => "cmc",
        Cmova => "cmova", Cmovae => "cmovae", Cmovb => "cmovb", Cmovbe => "cmovbe",
        Cmove => "cmove", Cmovg => "cmovg", Cmovge => "cmovge", Cmovl => "cmovl",
        Cmovle => "cmovle", Cmovne => "cmovne", Cmovno => "cmovno", Cmovnp => "cmovnp",
        Cmovns => "cmovns", Cmovo => "cmovo", Cmovp => "cmovp", Cmovs => "cmovs",
        Cmp => "cmp", Cmpsb => "cmpsb", Cmpsd => "cmpsd", Cmpsq => "cmpsq",
        Cmpsw => "cmpsw", Cmpxchg => "cmpxchg", Cmpxchg16b => "cmpxchg16b",
        Cmpxchg8b => "cmpxchg8b", Comisd => "comisd", Comiss => "comiss",
        Cpuid => "cpuid", Cqo => "cqo",
        Cvtpd2pi => "cvtpd2pi", Cvtpd2ps => "cvtpd2ps", Cvtpi2pd => "cvtpi2pd",
        Cvtpi2ps => "cvtpi2ps", Cvtps2pd => "cvtps2pd", Cvtps2pi => "cvtps2pi",
        Cvtsd2si => "cvtsd2si", Cvtsd2ss => "cvtsd2ss", Cvtsi2sd => "cvtsi2sd",
        Cvtsi2ss => "cvtsi2ss", Cvtss2sd => "cvtss2sd", Cvtss2si => "cvtss2si",
        Cvttpd2pi => "cvttpd2pi", Cvttps2pi => "cvttps2pi", Cvttsd2si => "cvttsd2si",
        Cvttss2si => "cvttss2si", Cwd => "cwd", Cwde => "cwde",
        Daa => "daa", Das => "das", Dec => "dec", Div => "div",
        Divpd => "divpd", Divps => "divps", Divsd => "divsd", Divss => "divss",
        Emms => "emms", Enter => "enter",
        F2xm1 => "f2xm1", Fabs => "fabs", Fadd => "fadd", Faddp => "faddp",
        Fbld => "fbld", Fbstp => "fbstp", Fchs => "fchs",
        Fcmovb => "fcmovb", Fcmovbe => "fcmovbe", Fcmove => "fcmove", Fcmovnb => "fcmovnb",
        Fcmovnbe => "fcmovnbe", Fcmovne => "fcmovne", Fcmovnu => "fcmovnu", Fcmovu => "fcmovu",
        Fcom => "fcom", Fcomi => "fcomi", Fcomip => "fcomip", Fcomp => "fcomp",
        Fcompp => "fcompp", Fcos => "fcos", Fdecstp => "fdecstp", Fdiv => "fdiv",
        Fdivp => "fdivp", Fdivr => "fdivr", Fdivrp => "fdivrp", Ffree => "ffree",
        Fiadd => "fiadd", Ficom => "ficom", Ficomp => "ficomp", Fidiv => "fidiv",
        Fidivr => "fidivr", Fild => "fild", Fimul => "fimul", Fincstp => "fincstp",
        Fist => "fist", Fistp => "fistp", Fisttp => "fisttp", Fisub => "fisub",
        Fisubr => "fisubr", Fld => "fld", Fld1 => "fld1", Fldcw => "fldcw",
        Fldenv => "fldenv", Fldl2e => "fldl2e", Fldl2t => "fldl2t", Fldlg2 => "fldlg2",
        Fldln2 => "fldln2", Fldpi => "fldpi", Fldz => "fldz", Fmul => "fmul",
        Fmulp => "fmulp", Fnclex => "fnclex", Fninit => "fninit", Fnop => "fnop",
        Fnsave => "fnsave", Fnstcw => "fnstcw", Fnstenv => "fnstenv", Fnstsw => "fnstsw",
        Fpatan => "fpatan", Fprem => "fprem", Fprem1 => "fprem1", Fptan => "fptan",
        Frndint => "frndint", Frstor => "frstor", Fscale => "fscale", Fsin => "fsin",
        Fsincos => "fsincos", Fsqrt => "fsqrt", Fst => "fst", Fstp => "fstp",
        Fsub => "fsub", Fsubp => "fsubp", Fsubr => "fsubr", Fsubrp => "fsubrp",
        Ftst => "ftst", Fucom => "fucom", Fucomi => "fucomi", Fucomip => "fucomip",
        Fucomp => "fucomp", Fucompp => "fucompp", Fxam => "fxam", Fxch => "fxch",
        Fxrstor => "fxrstor", Fxsave => "fxsave", Fxtract => "fxtract", Fyl2x => "fyl2x",
        Fyl2xp1 => "fyl2xp1",
        Hlt => "hlt", Idiv => "idiv", Imul => "imul", In => "in", Inc => "inc",
        Insb => "insb", Insd => "insd", Insw => "insw", Int => "int", Int1 => "int1",
        Int3 => "int3", Into => "into", Invd => "invd", Invlpg => "invlpg",
        Iret => "iret", Iretd => "iretd", Iretq => "iretq",
        Ja => "ja", Jae => "jae", Jb => "jb", Jbe => "jbe", Jcxz => "jcxz", Je => "je",
        Jecxz => "jecxz", Jg => "jg", Jge => "jge", Jl => "jl", Jle => "jle", Jmp => "jmp",
        Jne => "jne", Jno => "jno", Jnp => "jnp", Jns => "jns", Jo => "jo", Jp => "jp",
        Jrcxz => "jrcxz", Js => "js",
        Lahf => "lahf", Lar => "lar", Lcall => "lcall", Ldmxcsr => "ldmxcsr",
        Lds => "lds", Lea => "lea", Leave => "leave", Les => "les", Lfence => "lfence",
        Lfs => "lfs", Lgdt => "lgdt", Lgs => "lgs", Lidt => "lidt", Ljmp => "ljmp",
        Lldt => "lldt", Lmsw => "lmsw", Lodsb => "lodsb", Lodsd => "lodsd",
        Lodsq => "lodsq", Lodsw => "lodsw", Loop => "loop", Loope => "loope",
        Loopne => "loopne", Lsl => "lsl", Lss => "lss", Ltr => "ltr", Lzcnt => "lzcnt",
        Maxpd => "maxpd", Maxps => "maxps", Maxsd => "maxsd", Maxss => "maxss",
        Mfence => "mfence", Minpd => "minpd", Minps => "minps", Minsd => "minsd",
        Minss => "minss", Monitor => "monitor", Mov => "mov", Movabs => "movabs",
        Movapd => "movapd", Movaps => "movaps", Movd => "movd", Movdqa => "movdqa",
        Movdqu => "movdqu", Movhlps => "movhlps", Movhpd => "movhpd", Movhps => "movhps",
        Movlhps => "movlhps", Movlpd => "movlpd", Movlps => "movlps",
        Movmskpd => "movmskpd", Movmskps => "movmskps", Movntdq => "movntdq",
        Movnti => "movnti", Movntpd => "movntpd", Movntps => "movntps", Movntq => "movntq",
        Movq => "movq", Movsb => "movsb", Movsd => "movsd", Movsq => "movsq",
        Movss => "movss", Movsw => "movsw", Movsx => "movsx", Movsxd => "movsxd",
        Movupd => "movupd", Movups => "movups", Movzx => "movzx", Mul => "mul",
        Mulpd => "mulpd", Mulps => "mulps", Mulsd => "mulsd", Mulss => "mulss",
        Mwait => "mwait", Neg => "neg", Nop => "nop", Not => "not", Or => "or",
        Orpd => "orpd", Orps => "orps", Out => "out", Outsb => "outsb", Outsd => "outsd",
        Outsw => "outsw", Packssdw => "packssdw", Packsswb => "packsswb",
        Packuswb => "packuswb", Paddb => "paddb", Paddd => "paddd", Paddq => "paddq",
        Paddw => "paddw", Pand => "pand", Pandn => "pandn", Pause => "pause",
        Pcmpeqb => "pcmpeqb", Pcmpeqd => "pcmpeqd", Pcmpeqw => "pcmpeqw",
        Pcmpgtb => "pcmpgtb", Pcmpgtd => "pcmpgtd", Pcmpgtw => "pcmpgtw",
        Pmovmskb => "pmovmskb", Pmullw => "pmullw", Pop => "pop", Popal => "popal",
        Popaw => "popaw", Popcnt => "popcnt", Popf => "popf", Popfd => "popfd",
        Popfq => "popfq", Por => "por", Prefetchnta => "prefetchnta",
        Prefetcht0 => "prefetcht0", Prefetcht1 => "prefetcht1", Prefetcht2 => "prefetcht2",
        Pshufd => "pshufd", Pshufhw => "pshufhw", Pshuflw => "pshuflw", Pshufw => "pshufw",
        Psubb => "psubb", Psubd => "psubd", Psubq => "psubq", Psubw => "psubw",
        Punpckhbw => "punpckhbw", Punpckhdq => "punpckhdq", Punpckhqdq => "punpckhqdq",
        Punpckhwd => "punpckhwd", Punpcklbw => "punpcklbw", Punpckldq => "punpckldq",
        Punpcklqdq => "punpcklqdq", Punpcklwd => "punpcklwd", Push => "push",
        Pushal => "pushal", Pushaw => "pushaw", Pushf => "pushf", Pushfd => "pushfd",
        Pushfq => "pushfq", Pxor => "pxor",
        Rcl => "rcl", Rcr => "rcr", Rdmsr => "rdmsr", Rdpmc => "rdpmc", Rdrand => "rdrand",
        Rdseed => "rdseed", Rdtsc => "rdtsc", Rdtscp => "rdtscp", Ret => "ret",
        Retf => "retf", Rol => "rol", Ror => "ror", Rsm => "rsm",
        Sahf => "sahf", Sal => "sal", Salc => "salc", Sar => "sar", Sbb => "sbb",
        Scasb => "scasb", Scasd => "scasd", Scasq => "scasq", Scasw => "scasw",
        Seta => "seta", Setae => "setae", Setb => "setb", Setbe => "setbe", Sete => "sete",
        Setg => "setg", Setge => "setge", Setl => "setl", Setle => "setle", Setne => "setne",
        Setno => "setno", Setnp => "setnp", Setns => "setns", Seto => "seto", Setp => "setp",
        Sets => "sets", Sfence => "sfence", Sgdt => "sgdt", Shl => "shl", Shld => "shld",
        Shr => "shr", Shrd => "shrd", Shufpd => "shufpd", Shufps => "shufps", Sidt => "sidt",
        Sldt => "sldt", Smsw => "smsw", Sqrtpd => "sqrtpd", Sqrtps => "sqrtps",
        Sqrtsd => "sqrtsd", Sqrtss => "sqrtss", Stac => "stac", Stc => "stc", Std => "std",
        Sti => "sti", Stmxcsr => "stmxcsr", Stosb => "stosb", Stosd => "stosd",
        Stosq => "stosq", Stosw => "stosw", Str => "str", Sub => "sub", Subpd => "subpd",
        Subps => "subps", Subsd => "subsd", Subss => "subss", Swapgs => "swapgs",
        Syscall => "syscall", Sysenter => "sysenter", Sysexit => "sysexit",
        Sysret => "sysret", Test => "test", Tzcnt => "tzcnt", Ucomisd => "ucomisd",
        Ucomiss => "ucomiss", Ud2 => "ud2", Unpckhpd => "unpckhpd", Unpckhps => "unpckhps",
        Unpcklpd => "unpcklpd", Unpcklps => "unpcklps", Verr => "verr", Verw => "verw",
        Vmcall => "vmcall", Vmlaunch => "vmlaunch", Vmresume => "vmresume",
        Vmxoff => "vmxoff", Wait => "wait", Wbinvd => "wbinvd", Wrmsr => "wrmsr",
        Xadd => "xadd", Xchg => "xchg", Xgetbv => "xgetbv", Xlatb => "xlatb", Xor => "xor",
        Xorpd => "xorpd", Xorps => "xorps", Xrstor => "xrstor", Xsave => "xsave",
        Xsaveopt => "xsaveopt", Xsetbv => "xsetbv",
    }
}

registry! {
    /// x86-specific groups; ids start at 128.
    pub enum X86Group: u8 {
        Vm => "vm",
        Fpu => "fpu",
        Mmx => "mmx",
        Sse1 => "sse1",
        Sse2 => "sse2",
        Cmov => "cmov",
        Mode64 => "mode64",
        Not64BitMode => "not64bitmode",
    }
}

pub static NAMES: NameTables = NameTables {
    registers: X86Reg::NAMES,
    instructions: X86Insn::NAMES,
    groups: X86Group::NAMES,
};

/// A memory operand. Register fields are [`X86Reg::Invalid`] when absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct X86Mem {
    /// Explicit segment override
    pub segment: X86Reg,
    pub base: X86Reg,
    pub index: X86Reg,
    pub scale: u8,
    pub disp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum X86OperandKind {
    Reg(X86Reg),
    Imm(i64),
    Mem(X86Mem),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct X86Operand {
    pub kind: X86OperandKind,
    /// Access size in bytes; 0 when the operand has no natural size.
    pub size: u8,
    pub access: Access,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct X86Detail {
    /// Legacy prefixes by group: lock/rep, segment, operand size, address size.
    pub prefix: [u8; 4],
    pub opcode: [u8; 4],
    pub rex: u8,
    pub addr_size: u8,
    pub modrm: u8,
    pub sib: u8,
    pub disp: i64,
    pub operands: Vec<X86Operand>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct X86Decoder;

impl ArchDecoder for X86Decoder {
    fn architecture(&self) -> Architecture {
        Architecture::X86
    }

    fn decode_one(
        &self,
        cursor: &mut Cursor<'_>,
        address: Address,
        config: &DecodeConfig,
        _state: &mut StreamState,
    ) -> Result<Instruction, DecodeError> {
        let decoded = decode::decode(cursor, address, config.mode)?;
        let (mnemonic, operands) = format::render(&decoded, config.syntax);
        Ok(decoder::finish(
            cursor,
            address,
            decoded.insn.id() as u32,
            mnemonic,
            operands,
            config,
            || detail(&decoded),
        ))
    }
}

fn detail(d: &Decoded) -> DetailParts {
    let mut operands = d.operands.clone();
    for (i, op) in operands.iter_mut().enumerate() {
        op.access = implicit::operand_access(d.insn, i, d.operands.len());
    }
    let mut parts = DetailParts::new(Detail::X86(X86Detail {
        prefix: d.prefix.bytes,
        opcode: d.opcode,
        rex: d.rex,
        addr_size: d.adsize,
        modrm: d.modrm,
        sib: d.sib,
        disp: d.disp,
        operands,
    }));
    implicit::resolve(d, &mut parts);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Mode, Session, Syntax};

    fn one(mode: Mode, code: &[u8]) -> Instruction {
        Session::open(Architecture::X86, mode)
            .unwrap()
            .decode_at(code, 0x1000)
            .unwrap()
    }

    fn text(insn: &Instruction) -> String {
        if insn.operands.is_empty() {
            insn.mnemonic.clone()
        } else {
            format!("{} {}", insn.mnemonic, insn.operands)
        }
    }

    #[test]
    fn test_x86_64_sample() {
        let session = Session::open(Architecture::X86, Mode::MODE_64).unwrap();
        let code = [
            0x55, 0x48, 0x8b, 0x05, 0xb8, 0x13, 0x00, 0x00, 0xe9, 0xea, 0xbe, 0xad, 0xde, 0xff,
            0x25, 0x23, 0x01, 0x00, 0x00, 0xe8, 0xdf, 0xbe, 0xad, 0xde, 0x74, 0xff,
        ];
        let insns = session.disassemble_all(&code, 0x1000, 0);
        let lines: Vec<_> = insns.iter().map(text).collect();
        assert_eq!(
            lines,
            [
                "push rbp",
                "mov rax, [rip + 0x13b8]",
                "jmp 0xffffffffdeadcef7",
                "jmp qword ptr [rip + 0x123]",
                "call 0xffffffffdeadcef7",
                "je 0x1019",
            ]
        );
        assert_eq!(insns[1].address, 0x1001);
        assert_eq!(insns[1].size, 7);
    }

    #[test]
    fn test_x86_32_sample() {
        let session = Session::open(Architecture::X86, Mode::MODE_32).unwrap();
        let code = [
            0x8d, 0x4c, 0x32, 0x08, 0x01, 0xd8, 0x81, 0xc6, 0x34, 0x12, 0x00, 0x00, 0x05, 0x23,
            0x01, 0x00, 0x00, 0x36, 0x8b, 0x84, 0x91, 0x23, 0x01, 0x00, 0x00, 0x41, 0x8d, 0x84,
            0x39, 0x89, 0x67, 0x00, 0x00, 0x8d, 0x87, 0x89, 0x67, 0x00, 0x00, 0xb4, 0xc6,
        ];
        let lines: Vec<_> = session
            .disassemble_all(&code, 0x1000, 0)
            .iter()
            .map(text)
            .collect();
        assert_eq!(
            lines,
            [
                "lea ecx, [edx + esi + 8]",
                "add eax, ebx",
                "add esi, 0x1234",
                "add eax, 0x123",
                "mov eax, ss:[ecx + edx*4 + 0x123]",
                "inc ecx",
                "lea eax, [ecx + edi + 0x6789]",
                "lea eax, [edi + 0x6789]",
                "mov ah, 0xc6",
            ]
        );
    }

    #[test]
    fn test_x86_16_sample_stops_on_truncation() {
        let session = Session::open(Architecture::X86, Mode::MODE_16).unwrap();
        let code = [
            0x8d, 0x4c, 0x32, 0x08, 0x01, 0xd8, 0x81, 0xc6, 0x34, 0x12, 0x00, 0x00,
        ];
        let lines: Vec<_> = session
            .disassemble_all(&code, 0x1000, 0)
            .iter()
            .map(text)
            .collect();
        assert_eq!(
            lines,
            [
                "lea cx, [si + 0x32]",
                "or [bx + di], al",
                "fadd dword ptr [bx + di + 0x34c6]",
                "adc al, [bx + si]",
            ]
        );
    }

    #[test]
    fn test_att_and_masm() {
        let code = [0x48, 0x8b, 0x05, 0xb8, 0x13, 0x00, 0x00];
        let mut session = Session::open(Architecture::X86, Mode::MODE_64).unwrap();
        session.set_syntax(Syntax::Att);
        let insn = session.decode_at(&code, 0x1000).unwrap();
        assert_eq!(insn.mnemonic, "movq");
        assert_eq!(insn.operands, "0x13b8(%rip), %rax");

        session.set_syntax(Syntax::Masm);
        let insn = session.decode_at(&code, 0x1000).unwrap();
        assert_eq!(insn.mnemonic, "mov");
        assert_eq!(insn.operands, "rax, qword ptr [rip + 13b8h]");

        let att32 = {
            let mut s = Session::open(Architecture::X86, Mode::MODE_32).unwrap();
            s.set_syntax(Syntax::Att);
            s.decode_at(&[0x8d, 0x4c, 0x32, 0x08], 0x1000).unwrap()
        };
        assert_eq!(att32.mnemonic, "leal");
        assert_eq!(att32.operands, "8(%edx, %esi), %ecx");
    }

    #[test]
    fn test_immediates_and_prefixes() {
        assert_eq!(text(&one(Mode::MODE_32, &[0x83, 0xc4, 0xf8])), "add esp, -8");
        assert_eq!(
            text(&one(Mode::MODE_64, &[0x48, 0x83, 0xe4, 0xf0])),
            "and rsp, 0xfffffffffffffff0"
        );
        assert_eq!(text(&one(Mode::MODE_32, &[0xf3, 0xa4])), "rep movsb byte ptr es:[edi], byte ptr [esi]");
        assert_eq!(text(&one(Mode::MODE_32, &[0xf0, 0x01, 0x18])), "lock add [eax], ebx");
        assert_eq!(text(&one(Mode::MODE_64, &[0x0f, 0x05])), "syscall");
        assert_eq!(text(&one(Mode::MODE_64, &[0x48, 0x0f, 0xb6, 0xc1])), "movzx rax, cl");
        assert_eq!(text(&one(Mode::MODE_64, &[0x41, 0x50])), "push r8");
        assert_eq!(text(&one(Mode::MODE_64, &[0x40, 0x88, 0xf0])), "mov al, sil");
        assert_eq!(text(&one(Mode::MODE_32, &[0x66, 0x0f, 0xef, 0xc1])), "pxor xmm0, xmm1");
        assert_eq!(text(&one(Mode::MODE_32, &[0xd9, 0xe8])), "fld1");
        assert_eq!(text(&one(Mode::MODE_32, &[0xde, 0xc1])), "faddp st(1), st(0)");
    }

    #[test]
    fn test_invalid_encodings() {
        let session = Session::open(Architecture::X86, Mode::MODE_64).unwrap();
        assert_eq!(
            session.decode_at(&[0x06], 0x1000).unwrap_err(),
            DecodeError::InvalidEncoding
        );
        assert!(matches!(
            session.decode_at(&[0x48], 0x1000).unwrap_err(),
            DecodeError::TruncatedInstruction(_)
        ));
        let long = [0x66u8; 16];
        assert!(session.decode_at(&long, 0x1000).is_err());
    }

    #[test]
    fn test_detail_payload() {
        let mut session = Session::open(Architecture::X86, Mode::MODE_64).unwrap();
        session.set_detail(true);
        let push = session.decode_at(&[0x55], 0x1000).unwrap();
        assert_eq!(push.regs_read, vec![X86Reg::Rsp.id()]);
        assert_eq!(push.regs_write, vec![X86Reg::Rsp.id()]);
        assert!(push.groups.contains(&(crate::detail::ARCH_GROUP_BASE + X86Group::Mode64.id())));

        let mov = session
            .decode_at(&[0x48, 0x8b, 0x05, 0xb8, 0x13, 0x00, 0x00], 0x1000)
            .unwrap();
        let Some(Detail::X86(d)) = &mov.detail else {
            panic!("missing x86 detail");
        };
        assert_eq!(d.rex, 0x48);
        assert_eq!(d.modrm, 0x05);
        assert_eq!(d.disp, 0x13b8);
        assert_eq!(d.operands.len(), 2);
        assert_eq!(d.operands[0].kind, X86OperandKind::Reg(X86Reg::Rax));
        assert_eq!(d.operands[0].access, Access::WRITE);
        assert!(matches!(
            d.operands[1].kind,
            X86OperandKind::Mem(X86Mem { base: X86Reg::Rip, disp: 0x13b8, .. })
        ));

        let jcc = session.decode_at(&[0x74, 0xff], 0x1018).unwrap();
        assert!(jcc.is_branch());
        assert_eq!(jcc.regs_read, vec![X86Reg::Eflags.id()]);
    }
}
