//! Intel, MASM and AT&T rendering of decoded x86 instructions.

use crate::arch::{hex, Syntax};

use super::decode::{mask, Class, Decoded, Hint, Rep};
use super::tables::JCC;
use super::{X86Insn, X86Mem, X86Operand, X86OperandKind, X86Reg};

/// Renders `(mnemonic, operands)` in the requested flavor. Flavors without an x86
/// rendering use Intel.
pub(crate) fn render(d: &Decoded, syntax: Syntax) -> (String, String) {
    match syntax {
        Syntax::Att => att(d),
        Syntax::Masm => intel(d, true),
        _ => intel(d, false),
    }
}

fn prefix_text(d: &Decoded) -> &'static str {
    match (d.prefix.lock, d.rep) {
        (true, _) => "lock ",
        (_, Some(Rep::Rep)) => "rep ",
        (_, Some(Rep::Repe)) => "repe ",
        (_, Some(Rep::Repne)) => "repne ",
        _ => "",
    }
}

fn is_gpr(reg: X86Reg) -> bool {
    (X86Reg::Al.id()..=X86Reg::R15.id()).contains(&reg.id())
}

fn masm_hex(value: u64) -> String {
    if value <= 9 {
        return value.to_string();
    }
    let digits = format!("{:x}", value);
    if digits.starts_with(|c: char| c.is_ascii_alphabetic()) {
        format!("0{}h", digits)
    } else {
        format!("{}h", digits)
    }
}

fn number(value: u64, masm: bool) -> String {
    if masm {
        masm_hex(value)
    } else {
        hex(value)
    }
}

fn signed(value: i64, masm: bool) -> String {
    if value < 0 {
        format!("-{}", number(value.unsigned_abs(), masm))
    } else {
        number(value as u64, masm)
    }
}

fn logical(insn: X86Insn) -> bool {
    matches!(
        insn,
        X86Insn::And | X86Insn::Or | X86Insn::Xor | X86Insn::Test
    )
}

fn immediate(d: &Decoded, value: i64, size: u8, hint: Hint, masm: bool) -> String {
    match hint {
        Hint::Target => number(value as u64, masm),
        Hint::Signed if !logical(d.insn) => signed(value, masm),
        _ => number(value as u64 & mask(size), masm),
    }
}

fn size_name(size: u8) -> Option<&'static str> {
    Some(match size {
        1 => "byte",
        2 => "word",
        4 => "dword",
        6 => "fword",
        8 => "qword",
        10 => "xword",
        16 => "xmmword",
        _ => return None,
    })
}

fn far_pointer(d: &Decoded) -> Option<(i64, i64)> {
    match (d.hints.first(), d.operands.as_slice()) {
        (Some(Hint::Selector), [sel, off]) => match (sel.kind, off.kind) {
            (X86OperandKind::Imm(s), X86OperandKind::Imm(o)) => Some((s, o)),
            _ => None,
        },
        _ => None,
    }
}

fn intel(d: &Decoded, masm: bool) -> (String, String) {
    let mnemonic = format!("{}{}", prefix_text(d), d.insn.name());
    if let Some((selector, offset)) = far_pointer(d) {
        let text = format!("{}:{}", number(selector as u64, masm), number(offset as u64, masm));
        return (mnemonic, text);
    }
    let operands = d
        .operands
        .iter()
        .zip(&d.hints)
        .map(|(op, hint)| match op.kind {
            X86OperandKind::Reg(reg) => reg.name().to_string(),
            X86OperandKind::Imm(value) => immediate(d, value, op.size, *hint, masm),
            X86OperandKind::Mem(mem) => intel_memory(d, &mem, op.size, masm),
        })
        .collect::<Vec<_>>()
        .join(", ");
    (mnemonic, operands)
}

/// Intel drops the size keyword when a general-purpose register operand already fixes it.
fn needs_size(d: &Decoded, size: u8, masm: bool) -> bool {
    if size == 0 || d.insn == X86Insn::Lea {
        return false;
    }
    masm || !d.operands.iter().any(|op| {
        matches!(op.kind, X86OperandKind::Reg(r) if is_gpr(r)) && op.size == size
    })
}

fn intel_memory(d: &Decoded, mem: &X86Mem, size: u8, masm: bool) -> String {
    let mut out = String::new();
    if needs_size(d, size, masm) {
        if let Some(name) = size_name(size) {
            out.push_str(name);
            out.push_str(" ptr ");
        }
    }
    if mem.segment != X86Reg::Invalid {
        out.push_str(mem.segment.name());
        out.push(':');
    }
    out.push('[');
    let mut terms = Vec::with_capacity(2);
    if mem.base != X86Reg::Invalid {
        terms.push(mem.base.name().to_string());
    }
    if mem.index != X86Reg::Invalid {
        if mem.scale > 1 {
            terms.push(format!("{}*{}", mem.index.name(), mem.scale));
        } else {
            terms.push(mem.index.name().to_string());
        }
    }
    if terms.is_empty() {
        out.push_str(&number(mem.disp as u64 & mask(d.adsize), masm));
    } else {
        out.push_str(&terms.join(" + "));
        if mem.disp > 0 {
            out.push_str(" + ");
            out.push_str(&number(mem.disp as u64, masm));
        } else if mem.disp < 0 {
            out.push_str(" - ");
            out.push_str(&number(mem.disp.unsigned_abs(), masm));
        }
    }
    out.push(']');
    out
}

fn att_suffix(size: u8) -> &'static str {
    match size {
        1 => "b",
        2 => "w",
        4 => "l",
        8 => "q",
        _ => "",
    }
}

fn is_indirect_branch(d: &Decoded) -> bool {
    matches!(d.insn, X86Insn::Jmp | X86Insn::Call | X86Insn::Ljmp | X86Insn::Lcall)
        && d.hints.first().is_some_and(|h| *h == Hint::Plain)
}

fn att_mnemonic(d: &Decoded) -> String {
    use X86Insn as I;
    let renamed = match d.insn {
        I::Cbw => Some("cbtw"),
        I::Cwde => Some("cwtl"),
        I::Cdqe => Some("cltq"),
        I::Cwd => Some("cwtd"),
        I::Cdq => Some("cltd"),
        I::Cqo => Some("cqto"),
        _ => None,
    };
    if let Some(name) = renamed {
        return name.to_string();
    }

    let name = d.insn.name();
    if d.class != Class::General
        || d.is_string_op()
        || (d.operands.is_empty() && d.insn != I::Ret)
    {
        return name.to_string();
    }
    match d.insn {
        I::Movzx | I::Movsx | I::Movsxd => {
            let stem = if d.insn == I::Movzx { "movz" } else { "movs" };
            let dst = d.operands.first().map_or(0, |o| o.size);
            let src = d.operands.get(1).map_or(0, |o| o.size);
            format!("{}{}{}", stem, att_suffix(src), att_suffix(dst))
        }
        I::Call | I::Ret | I::Push | I::Pop => format!("{}{}", name, att_suffix(d.opsize)),
        I::Jmp if is_indirect_branch(d) => format!("{}{}", name, att_suffix(d.opsize)),
        insn if insn == I::Jmp
            || JCC.contains(&insn)
            || matches!(
                insn,
                I::Loop | I::Loope | I::Loopne | I::Jcxz | I::Jecxz | I::Jrcxz | I::Lcall | I::Ljmp
            )
            || name.starts_with("set") =>
        {
            name.to_string()
        }
        _ => {
            let size = d
                .operands
                .iter()
                .find(|op| match op.kind {
                    X86OperandKind::Reg(r) => is_gpr(r),
                    X86OperandKind::Mem(_) => op.size != 0,
                    X86OperandKind::Imm(_) => false,
                })
                .map_or(0, |op| op.size);
            format!("{}{}", name, att_suffix(size))
        }
    }
}

fn att_operand(d: &Decoded, op: &X86Operand, hint: Hint) -> String {
    match op.kind {
        X86OperandKind::Reg(reg) => format!("%{}", reg.name()),
        X86OperandKind::Imm(value) if hint == Hint::Target => hex(value as u64),
        X86OperandKind::Imm(value) => format!("${}", immediate(d, value, op.size, hint, false)),
        X86OperandKind::Mem(mem) => att_memory(d, &mem),
    }
}

fn att_memory(d: &Decoded, mem: &X86Mem) -> String {
    let mut out = String::new();
    if mem.segment != X86Reg::Invalid {
        out.push('%');
        out.push_str(mem.segment.name());
        out.push(':');
    }
    if mem.base == X86Reg::Invalid && mem.index == X86Reg::Invalid {
        out.push_str(&hex(mem.disp as u64 & mask(d.adsize)));
        return out;
    }
    if mem.disp != 0 {
        out.push_str(&signed(mem.disp, false));
    }
    out.push('(');
    if mem.base != X86Reg::Invalid {
        out.push('%');
        out.push_str(mem.base.name());
    }
    if mem.index != X86Reg::Invalid {
        out.push_str(", %");
        out.push_str(mem.index.name());
        if mem.scale > 1 {
            out.push_str(&format!(", {}", mem.scale));
        }
    }
    out.push(')');
    out
}

fn att(d: &Decoded) -> (String, String) {
    let mnemonic = format!("{}{}", prefix_text(d), att_mnemonic(d));
    if let Some((selector, offset)) = far_pointer(d) {
        return (
            mnemonic,
            format!("${}, ${}", hex(selector as u64), hex(offset as u64)),
        );
    }
    let star = if is_indirect_branch(d) { "*" } else { "" };
    let operands = d
        .operands
        .iter()
        .zip(&d.hints)
        .rev()
        .map(|(op, hint)| att_operand(d, op, *hint))
        .collect::<Vec<_>>()
        .join(", ");
    (mnemonic, format!("{}{}", star, operands))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::{Cursor, Endian};
    use crate::Mode;

    fn show(mode: Mode, code: &[u8], syntax: Syntax) -> String {
        let mut cursor = Cursor::new(code, Endian::Little);
        let d = super::super::decode::decode(&mut cursor, 0x1000, mode).unwrap();
        let (m, o) = render(&d, syntax);
        if o.is_empty() {
            m
        } else {
            format!("{} {}", m, o)
        }
    }

    #[test]
    fn test_masm_hex() {
        assert_eq!(masm_hex(8), "8");
        assert_eq!(masm_hex(0x13b8), "13b8h");
        assert_eq!(masm_hex(0xff), "0ffh");
    }

    #[test]
    fn test_intel_memory_forms() {
        assert_eq!(show(Mode::MODE_64, &[0x48, 0x8b, 0x45, 0xf8], Syntax::Intel), "mov rax, [rbp - 8]");
        assert_eq!(
            show(Mode::MODE_32, &[0xc7, 0x05, 0x00, 0x10, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00], Syntax::Intel),
            "mov dword ptr [0x1000], 1"
        );
        assert_eq!(
            show(Mode::MODE_32, &[0x0f, 0xb6, 0x01], Syntax::Intel),
            "movzx eax, byte ptr [ecx]"
        );
        assert_eq!(
            show(Mode::MODE_64, &[0x64, 0x48, 0x8b, 0x04, 0x25, 0x28, 0x00, 0x00, 0x00], Syntax::Intel),
            "mov rax, fs:[0x28]"
        );
    }

    #[test]
    fn test_att_forms() {
        assert_eq!(show(Mode::MODE_64, &[0x55], Syntax::Att), "pushq %rbp");
        assert_eq!(show(Mode::MODE_64, &[0xc3], Syntax::Att), "retq");
        assert_eq!(show(Mode::MODE_64, &[0xff, 0xd0], Syntax::Att), "callq *%rax");
        assert_eq!(show(Mode::MODE_32, &[0x83, 0xc4, 0xf8], Syntax::Att), "addl $-8, %esp");
        assert_eq!(show(Mode::MODE_64, &[0x48, 0x0f, 0xb6, 0xc1], Syntax::Att), "movzbq %cl, %rax");
        assert_eq!(show(Mode::MODE_64, &[0x48, 0x98], Syntax::Att), "cltq");
        assert_eq!(show(Mode::MODE_32, &[0x74, 0x00], Syntax::Att), "je 0x1002");
    }

    #[test]
    fn test_far_pointer() {
        let code = [0xea, 0x78, 0x56, 0x34, 0x12, 0x00, 0xf0];
        assert_eq!(show(Mode::MODE_32, &code, Syntax::Intel), "ljmp 0xf000:0x12345678");
        assert_eq!(show(Mode::MODE_32, &code, Syntax::Att), "ljmp $0xf000, $0x12345678");
    }

    #[test]
    fn test_unsupported_flavor_uses_intel() {
        assert_eq!(show(Mode::MODE_64, &[0x55], Syntax::NoRegName), "push rbp");
    }
}
