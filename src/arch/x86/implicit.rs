//! Operand access, implicit registers and groups of x86 instructions.

use crate::detail::{Access, CommonGroup, DetailParts, ARCH_GROUP_BASE};

use super::decode::{gpr, Class, Decoded, Hint};
use super::tables::{D64, F64, I64, JCC};
use super::{X86Group, X86Insn, X86OperandKind, X86Reg};

/// Instructions whose first operand is only written.
fn writes_destination(insn: X86Insn) -> bool {
    use X86Insn::*;
    let name = insn.name();
    name.starts_with("set")
        || name.starts_with("cmov")
        || name.starts_with("cvt")
        || name.starts_with("sqrt")
        || name.starts_with("pshuf")
        || name.starts_with("movmsk")
        || matches!(
            insn,
            Mov | Movabs | Movzx | Movsx | Movsxd | Lea | Pop | Lds | Les | Lfs | Lgs | Lss | Lar
                | Lsl | Sldt | Str | Smsw | Sgdt | Sidt | In | Movaps | Movapd | Movups
                | Movupd | Movss | Movsd | Movd | Movq | Movdqa | Movdqu | Movhps | Movhpd
                | Movlps | Movlpd | Movhlps | Movlhps | Movntps | Movntpd | Movntdq | Movntq
                | Movnti | Pmovmskb | Popcnt | Lzcnt | Tzcnt | Bsf | Bsr | Rdrand | Rdseed
                | Stmxcsr | Fst | Fstp | Fist | Fistp | Fisttp | Fnstsw | Fnstcw | Fbstp
                | Fnstenv | Fnsave | Fxsave | Xsave | Xsaveopt
        )
}

/// Instructions whose first operand is only read.
fn reads_destination(insn: X86Insn) -> bool {
    use X86Insn::*;
    JCC.contains(&insn)
        || matches!(
            insn,
            Cmp | Test | Bt | Push | Jmp | Call | Lcall | Ljmp | Loop | Loope | Loopne | Jcxz
                | Jecxz | Jrcxz | Comiss | Comisd | Ucomiss | Ucomisd | Out | Int | Ret | Retf
                | Enter | Lgdt | Lidt | Lldt | Ltr | Lmsw | Verr | Verw | Invlpg | Fld | Fild
                | Fbld | Fcom | Fcomp | Fucom | Fucomp | Ficom | Ficomp | Fcomi | Fcomip
                | Fucomi | Fucomip | Ldmxcsr | Fldcw | Fldenv | Frstor | Fxrstor | Xrstor
                | Prefetchnta | Prefetcht0 | Prefetcht1 | Prefetcht2 | Clflush | Mul | Div
                | Idiv | Nop | Bound
        )
}

/// Access of explicit operand `index` out of `count`.
pub(crate) fn operand_access(insn: X86Insn, index: usize, count: usize) -> Access {
    use X86Insn::*;
    if index > 0 {
        return match insn {
            Xchg | Xadd | Cmpxchg if index == 1 => Access::READ_WRITE,
            _ => Access::READ,
        };
    }
    match insn {
        Imul if count == 1 => Access::READ,
        Imul if count == 3 => Access::WRITE,
        _ if writes_destination(insn) => Access::WRITE,
        _ if reads_destination(insn) => Access::READ,
        _ => Access::READ_WRITE,
    }
}

fn writes_flags(insn: X86Insn) -> bool {
    use X86Insn::*;
    matches!(
        insn,
        Add | Or | Adc | Sbb | And | Sub | Xor | Cmp | Test | Inc | Dec | Neg | Rol | Ror
            | Rcl | Rcr | Shl | Shr | Sal | Sar | Shld | Shrd | Bt | Bts | Btr | Btc | Bsf
            | Bsr | Mul | Imul | Div | Idiv | Xadd | Cmpxchg | Cmpxchg8b | Cmpxchg16b | Daa
            | Das | Aaa | Aas | Aam | Aad | Comiss | Comisd | Ucomiss | Ucomisd | Popcnt
            | Lzcnt | Tzcnt | Clc | Stc | Cmc | Cld | Std | Cli | Sti | Sahf | Popf | Popfd
            | Popfq | Fcomi | Fcomip | Fucomi | Fucomip | Lar | Lsl | Verr | Verw | Rdrand
            | Rdseed | Cmpsb | Cmpsw | Cmpsd | Cmpsq | Scasb | Scasw | Scasd | Scasq
    )
}

fn privileged(insn: X86Insn) -> bool {
    use X86Insn::*;
    matches!(
        insn,
        Hlt | Lgdt | Lidt | Lldt | Ltr | Lmsw | Clts | Invd | Wbinvd | Invlpg | Rdmsr | Wrmsr
            | Swapgs | Sysret | Sysexit | Rdpmc | Xsetbv
    )
}

fn arch_group(parts: &mut DetailParts, group: X86Group) {
    parts.group(ARCH_GROUP_BASE + group.id());
}

/// Fills implicit registers and groups.
pub(crate) fn resolve(d: &Decoded, parts: &mut DetailParts) {
    use X86Insn::*;
    let insn = d.insn;
    let sp = gpr(4, d.bits / 8, false).id();
    let acc = |size: u8| gpr(0, size, false).id();
    let counter = gpr(1, d.adsize, false).id();
    let flags = X86Reg::Eflags.id();
    let relative = d.hints.first() == Some(&Hint::Target);

    match insn {
        Push | Pop | Pushaw | Pushal | Popaw | Popal => {
            parts.read(sp);
            parts.write(sp);
        }
        Pushf | Pushfd | Pushfq => {
            parts.read(sp);
            parts.read(flags);
            parts.write(sp);
        }
        Enter | Leave => {
            let bp = gpr(5, d.bits / 8, false).id();
            parts.read(sp);
            parts.read(bp);
            parts.write(sp);
            parts.write(bp);
        }
        Call | Lcall => {
            parts.read(sp);
            parts.write(sp);
            parts.common(CommonGroup::Call);
        }
        Ret | Retf => {
            parts.read(sp);
            parts.write(sp);
            parts.common(CommonGroup::Ret);
        }
        Jmp | Ljmp => parts.common(CommonGroup::Jump),
        Loop | Loope | Loopne => {
            parts.read(counter);
            if insn != Loop {
                parts.read(flags);
            }
            parts.write(counter);
            parts.common(CommonGroup::Jump);
        }
        Jcxz | Jecxz | Jrcxz => {
            parts.read(counter);
            parts.common(CommonGroup::Jump);
        }
        _ if JCC.contains(&insn) => {
            parts.read(flags);
            parts.common(CommonGroup::Jump);
        }
        Int | Int3 | Int1 | Syscall | Sysenter => parts.common(CommonGroup::Int),
        Into => {
            parts.read(flags);
            parts.common(CommonGroup::Int);
        }
        Iret | Iretd | Iretq => {
            parts.read(sp);
            parts.write(sp);
            parts.common(CommonGroup::Iret);
        }
        Mul | Div | Idiv | Imul if d.operands.len() == 1 => {
            let size = d.operands[0].size;
            if size == 1 {
                parts.read(X86Reg::Al.id());
                if insn != Mul && insn != Imul {
                    parts.read(X86Reg::Ah.id());
                }
                parts.write(X86Reg::Ax.id());
            } else {
                parts.read(acc(size));
                if insn != Mul && insn != Imul {
                    parts.read(gpr(2, size, false).id());
                }
                parts.write(acc(size));
                parts.write(gpr(2, size, false).id());
            }
        }
        Cbw | Cwde | Cdqe => {
            parts.read(acc(d.opsize / 2));
            parts.write(acc(d.opsize));
        }
        Cwd | Cdq | Cqo => {
            parts.read(acc(d.opsize));
            parts.write(gpr(2, d.opsize, false).id());
        }
        Cpuid => {
            parts.read(X86Reg::Eax.id());
            parts.read(X86Reg::Ecx.id());
            for reg in [X86Reg::Eax, X86Reg::Ebx, X86Reg::Ecx, X86Reg::Edx] {
                parts.write(reg.id());
            }
        }
        Rdtsc | Rdtscp | Rdmsr | Rdpmc => {
            if insn == Rdmsr || insn == Rdpmc {
                parts.read(X86Reg::Ecx.id());
            }
            parts.write(X86Reg::Eax.id());
            parts.write(X86Reg::Edx.id());
            if insn == Rdtscp {
                parts.write(X86Reg::Ecx.id());
            }
        }
        Wrmsr => {
            for reg in [X86Reg::Ecx, X86Reg::Eax, X86Reg::Edx] {
                parts.read(reg.id());
            }
        }
        Lahf => {
            parts.read(flags);
            parts.write(X86Reg::Ah.id());
        }
        Sahf => parts.read(X86Reg::Ah.id()),
        Adc | Sbb | Rcl | Rcr => parts.read(flags),
        Xlatb => {
            parts.read(X86Reg::Al.id());
            parts.read(gpr(3, d.adsize, false).id());
            parts.write(X86Reg::Al.id());
        }
        _ if d.is_string_op() => {
            let si = gpr(6, d.adsize, false).id();
            let di = gpr(7, d.adsize, false).id();
            let name = insn.name();
            if name.starts_with("movs") || name.starts_with("cmps") || name.starts_with("outs") || name.starts_with("lods") {
                parts.read(si);
                parts.write(si);
            }
            if name.starts_with("movs") || name.starts_with("cmps") || name.starts_with("stos") || name.starts_with("scas") || name.starts_with("ins") {
                parts.read(di);
                parts.write(di);
            }
            parts.read(flags);
            if d.rep.is_some() {
                parts.read(counter);
                parts.write(counter);
            }
        }
        _ => {}
    }

    if insn.name().starts_with("set") || insn.name().starts_with("cmov") {
        parts.read(flags);
    }
    if insn.name().starts_with("fcmov") {
        parts.read(flags);
    }
    if writes_flags(insn) {
        parts.write(flags);
    }
    if relative {
        parts.common(CommonGroup::BranchRelative);
    }

    let touches_control = d.operands.iter().any(|op| {
        matches!(op.kind, X86OperandKind::Reg(r)
            if (X86Reg::Cr0.id()..=X86Reg::Dr7.id()).contains(&r.id()))
    });
    if privileged(insn) || touches_control {
        parts.common(CommonGroup::Privilege);
    }
    if matches!(insn, Vmcall | Vmlaunch | Vmresume | Vmxoff) {
        arch_group(parts, X86Group::Vm);
    }
    if insn.name().starts_with("cmov") {
        arch_group(parts, X86Group::Cmov);
    }

    match d.class {
        Class::X87 => {
            parts.write(X86Reg::Fpsw.id());
            arch_group(parts, X86Group::Fpu);
        }
        Class::Mmx => arch_group(parts, X86Group::Mmx),
        Class::Sse1 => arch_group(parts, X86Group::Sse1),
        Class::Sse2 => arch_group(parts, X86Group::Sse2),
        Class::General => {}
    }

    if d.bits == 64 && d.attr & (D64 | F64) != 0 {
        arch_group(parts, X86Group::Mode64);
    }
    if d.bits != 64 && d.attr & I64 != 0 {
        arch_group(parts, X86Group::Not64BitMode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Architecture, Mode, Session};

    fn detailed(mode: Mode, code: &[u8]) -> crate::Instruction {
        let mut session = Session::open(Architecture::X86, mode).unwrap();
        session.set_detail(true);
        session.decode_at(code, 0x1000).unwrap()
    }

    #[test]
    fn test_access() {
        assert_eq!(operand_access(X86Insn::Mov, 0, 2), Access::WRITE);
        assert_eq!(operand_access(X86Insn::Add, 0, 2), Access::READ_WRITE);
        assert_eq!(operand_access(X86Insn::Cmp, 0, 2), Access::READ);
        assert_eq!(operand_access(X86Insn::Xchg, 1, 2), Access::READ_WRITE);
        assert_eq!(operand_access(X86Insn::Imul, 0, 3), Access::WRITE);
    }

    #[test]
    fn test_call_and_ret_groups() {
        let call = detailed(Mode::MODE_32, &[0xe8, 0x00, 0x00, 0x00, 0x00]);
        assert!(call.in_group(CommonGroup::Call.id()));
        assert!(call.in_group(CommonGroup::BranchRelative.id()));
        assert_eq!(call.regs_write, vec![X86Reg::Esp.id()]);

        let ret = detailed(Mode::MODE_64, &[0xc3]);
        assert!(ret.is_return());
    }

    #[test]
    fn test_flags_and_classes() {
        let add = detailed(Mode::MODE_32, &[0x01, 0xd8]);
        assert_eq!(add.regs_write, vec![X86Reg::Eflags.id()]);
        assert!(add.regs_read.is_empty());

        let fld = detailed(Mode::MODE_32, &[0xd9, 0xe8]);
        assert!(fld.in_group(ARCH_GROUP_BASE + X86Group::Fpu.id()));

        let pxor = detailed(Mode::MODE_32, &[0x66, 0x0f, 0xef, 0xc1]);
        assert!(pxor.in_group(ARCH_GROUP_BASE + X86Group::Sse2.id()));

        let cpuid = detailed(Mode::MODE_64, &[0x0f, 0xa2]);
        assert_eq!(cpuid.regs_write.len(), 4);
    }

    #[test]
    fn test_rep_string_counter() {
        let movs = detailed(Mode::MODE_32, &[0xf3, 0xa4]);
        assert!(movs.regs_read.contains(&X86Reg::Ecx.id()));
        assert!(movs.regs_write.contains(&X86Reg::Edi.id()));
    }
}
