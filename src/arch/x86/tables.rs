//! Static opcode maps for the legacy x86 encoding space.

use super::X86Insn as I;

/// Operand templates, named after the usual opcode-map notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Opnd {
    None,
    /// ModRM r/m, byte / word / dword / operand-size / dword-or-qword (REX.W) / qword
    Eb,
    Ew,
    Ed,
    Ev,
    Ey,
    /// ModRM reg, same sizes
    Gb,
    Gw,
    Gv,
    Gy,
    /// Memory-only r/m: unsized, byte, dword, qword, far pointer, 128-bit
    M,
    Mb,
    Md,
    Mq,
    Mp,
    Mdq,
    /// Immediates: byte, word, operand-size capped at 32 bits, sign-extended byte,
    /// full operand size (64-bit capable)
    Ib,
    Iw,
    Iz,
    Ibs,
    Iv,
    /// The constant 1 of the shift-by-one forms
    One,
    /// Relative branch targets
    Jb,
    Jz,
    /// Absolute memory offsets (moffs)
    Ob,
    Ov,
    /// Far pointer immediate
    Ap,
    /// Segment register from ModRM reg
    Sw,
    /// Segment register implied by the opcode (push/pop es, fs, ...)
    Seg,
    /// General register from the low opcode bits
    Zb,
    Zv,
    /// Fixed registers
    Al,
    Cl,
    Dx,
    Ax,
    /// Register-only r/m, 32 or 64 bits by mode
    Rd,
    /// Control / debug register from ModRM reg
    Cd,
    Dd,
    /// String operands at ds:rSI and es:rDI
    Xb,
    Xv,
    Yb,
    Yv,
    /// XMM reg, and XMM-or-memory of 128/32/64 bits
    Vx,
    Wx,
    Wss,
    Wsd,
    /// XMM register from r/m
    Ux,
    /// MMX reg, MMX-or-memory (64 bits), MMX register from r/m
    Pq,
    Qq,
    Nq,
}

impl Opnd {
    pub(crate) const fn needs_modrm(self) -> bool {
        matches!(
            self,
            Opnd::Eb
                | Opnd::Ew
                | Opnd::Ed
                | Opnd::Ev
                | Opnd::Ey
                | Opnd::Gb
                | Opnd::Gw
                | Opnd::Gv
                | Opnd::Gy
                | Opnd::M
                | Opnd::Mb
                | Opnd::Md
                | Opnd::Mq
                | Opnd::Mp
                | Opnd::Mdq
                | Opnd::Sw
                | Opnd::Rd
                | Opnd::Cd
                | Opnd::Dd
                | Opnd::Vx
                | Opnd::Wx
                | Opnd::Wss
                | Opnd::Wsd
                | Opnd::Ux
                | Opnd::Pq
                | Opnd::Qq
                | Opnd::Nq
        )
    }
}

/// Operand size defaults to 64 bits in long mode.
pub(crate) const D64: u8 = 1 << 0;
/// Not encodable in long mode.
pub(crate) const I64: u8 = 1 << 1;
/// Operand size is always 64 bits in long mode (near branches).
pub(crate) const F64: u8 = 1 << 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Entry {
    pub insn: I,
    pub ops: [Opnd; 3],
    pub attr: u8,
}

impl Entry {
    pub(crate) const INVALID: Entry = Entry {
        insn: I::Invalid,
        ops: [Opnd::None; 3],
        attr: 0,
    };

    pub(crate) fn needs_modrm(&self) -> bool {
        self.ops.iter().any(|o| o.needs_modrm())
    }
}

/// Opcodes whose encoding does not fit the regular slot kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Special {
    /// 90: nop, pause, or xchg with r8
    Nop,
    /// 63: arpl outside long mode, movsxd inside
    Arpl,
    /// 0F 01
    Group7,
    /// 0F AE
    Group15,
    /// 0F C7
    Group9,
    /// 0F 18
    Prefetch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GroupId {
    Grp1Eb,
    Grp1Ev,
    Grp1Evs,
    Grp2EbIb,
    Grp2EvIb,
    Grp2Eb1,
    Grp2Ev1,
    Grp2EbCl,
    Grp2EvCl,
    Grp3Eb,
    Grp3Ev,
    Grp4,
    Grp5,
    Grp11Eb,
    Grp11Ev,
    Grp1a,
    Grp6,
    Grp8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    Invalid,
    /// Legacy prefix byte (consumed by the prefix stage)
    Prefix,
    /// 0F escape
    Escape,
    Op(Entry),
    /// ModRM.reg selects one of eight entries
    Group(GroupId),
    /// Operand size selects the 16/32/64-bit instruction; operands are shared
    Sized([I; 3], [Opnd; 3], u8),
    /// Address size selects the instruction
    AddrSized([I; 3], Opnd),
    /// Mandatory prefix selects the entry: none, 66, F3, F2
    Sse([Entry; 4]),
    /// F3 selects the second entry
    Rep(Entry, Entry),
    X87,
    Special(Special),
}

const fn e(insn: I, a: Opnd, b: Opnd, c: Opnd, attr: u8) -> Entry {
    Entry {
        insn,
        ops: [a, b, c],
        attr,
    }
}

const fn op0(insn: I) -> Slot {
    Slot::Op(e(insn, Opnd::None, Opnd::None, Opnd::None, 0))
}

const fn op1(insn: I, a: Opnd) -> Slot {
    Slot::Op(e(insn, a, Opnd::None, Opnd::None, 0))
}

const fn op2(insn: I, a: Opnd, b: Opnd) -> Slot {
    Slot::Op(e(insn, a, b, Opnd::None, 0))
}

const fn op3(insn: I, a: Opnd, b: Opnd, c: Opnd) -> Slot {
    Slot::Op(e(insn, a, b, c, 0))
}

const fn with(slot: Slot, attr: u8) -> Slot {
    match slot {
        Slot::Op(mut entry) => {
            entry.attr |= attr;
            Slot::Op(entry)
        }
        other => other,
    }
}

const fn sse(none: Entry, p66: Entry, f3: Entry, f2: Entry) -> Slot {
    Slot::Sse([none, p66, f3, f2])
}

const fn x2(insn: I, a: Opnd, b: Opnd) -> Entry {
    e(insn, a, b, Opnd::None, 0)
}

const NONE: Entry = Entry::INVALID;

/// An instruction with an MMX form and an SSE2 (66) form.
const fn mmx_sse(insn: I) -> Slot {
    sse(
        x2(insn, Opnd::Pq, Opnd::Qq),
        x2(insn, Opnd::Vx, Opnd::Wx),
        NONE,
        NONE,
    )
}

/// Packed-single / packed-double / scalar-single / scalar-double arithmetic.
const fn arith4(ps: I, pd: I, ss: I, sd: I) -> Slot {
    sse(
        x2(ps, Opnd::Vx, Opnd::Wx),
        x2(pd, Opnd::Vx, Opnd::Wx),
        x2(ss, Opnd::Vx, Opnd::Wss),
        x2(sd, Opnd::Vx, Opnd::Wsd),
    )
}

const fn packed2(ps: I, pd: I) -> Slot {
    sse(
        x2(ps, Opnd::Vx, Opnd::Wx),
        x2(pd, Opnd::Vx, Opnd::Wx),
        NONE,
        NONE,
    )
}

/// Condition-code order of the jcc / setcc / cmovcc rows.
pub(crate) const JCC: [I; 16] = [
    I::Jo, I::Jno, I::Jb, I::Jae, I::Je, I::Jne, I::Jbe, I::Ja,
    I::Js, I::Jns, I::Jp, I::Jnp, I::Jl, I::Jge, I::Jle, I::Jg,
];

const SETCC: [I; 16] = [
    I::Seto, I::Setno, I::Setb, I::Setae, I::Sete, I::Setne, I::Setbe, I::Seta,
    I::Sets, I::Setns, I::Setp, I::Setnp, I::Setl, I::Setge, I::Setle, I::Setg,
];

const CMOVCC: [I; 16] = [
    I::Cmovo, I::Cmovno, I::Cmovb, I::Cmovae, I::Cmove, I::Cmovne, I::Cmovbe, I::Cmova,
    I::Cmovs, I::Cmovns, I::Cmovp, I::Cmovnp, I::Cmovl, I::Cmovge, I::Cmovle, I::Cmovg,
];

const ALU: [I; 8] = [I::Add, I::Or, I::Adc, I::Sbb, I::And, I::Sub, I::Xor, I::Cmp];
const SHIFT: [I; 8] = [I::Rol, I::Ror, I::Rcl, I::Rcr, I::Shl, I::Shr, I::Sal, I::Sar];

pub(crate) static ONE_BYTE: [Slot; 256] = one_byte_map();
pub(crate) static TWO_BYTE: [Slot; 256] = two_byte_map();

const fn one_byte_map() -> [Slot; 256] {
    use Opnd::*;
    let mut t = [Slot::Invalid; 256];

    // ALU rows 00-3F
    let mut row = 0;
    while row < 8 {
        let base = row * 8;
        let insn = ALU[row];
        t[base] = op2(insn, Eb, Gb);
        t[base + 1] = op2(insn, Ev, Gv);
        t[base + 2] = op2(insn, Gb, Eb);
        t[base + 3] = op2(insn, Gv, Ev);
        t[base + 4] = op2(insn, Al, Ib);
        t[base + 5] = op2(insn, Ax, Iz);
        row += 1;
    }
    t[0x06] = with(op1(I::Push, Seg), I64);
    t[0x07] = with(op1(I::Pop, Seg), I64);
    t[0x0e] = with(op1(I::Push, Seg), I64);
    t[0x0f] = Slot::Escape;
    t[0x16] = with(op1(I::Push, Seg), I64);
    t[0x17] = with(op1(I::Pop, Seg), I64);
    t[0x1e] = with(op1(I::Push, Seg), I64);
    t[0x1f] = with(op1(I::Pop, Seg), I64);
    t[0x26] = Slot::Prefix;
    t[0x27] = with(op0(I::Daa), I64);
    t[0x2e] = Slot::Prefix;
    t[0x2f] = with(op0(I::Das), I64);
    t[0x36] = Slot::Prefix;
    t[0x37] = with(op0(I::Aaa), I64);
    t[0x3e] = Slot::Prefix;
    t[0x3f] = with(op0(I::Aas), I64);

    let mut r = 0;
    while r < 8 {
        t[0x40 + r] = with(op1(I::Inc, Zv), I64);
        t[0x48 + r] = with(op1(I::Dec, Zv), I64);
        t[0x50 + r] = with(op1(I::Push, Zv), D64);
        t[0x58 + r] = with(op1(I::Pop, Zv), D64);
        t[0x90 + r] = op2(I::Xchg, Zv, Ax);
        t[0xb0 + r] = op2(I::Mov, Zb, Ib);
        t[0xb8 + r] = op2(I::Mov, Zv, Iv);
        r += 1;
    }
    t[0x90] = Slot::Special(Special::Nop);

    t[0x60] = Slot::Sized([I::Pushaw, I::Pushal, I::Invalid], [None; 3], I64);
    t[0x61] = Slot::Sized([I::Popaw, I::Popal, I::Invalid], [None; 3], I64);
    t[0x62] = with(op2(I::Bound, Gv, M), I64);
    t[0x63] = Slot::Special(Special::Arpl);
    t[0x64] = Slot::Prefix;
    t[0x65] = Slot::Prefix;
    t[0x66] = Slot::Prefix;
    t[0x67] = Slot::Prefix;
    t[0x68] = with(op1(I::Push, Iz), D64);
    t[0x69] = op3(I::Imul, Gv, Ev, Iz);
    t[0x6a] = with(op1(I::Push, Ibs), D64);
    t[0x6b] = op3(I::Imul, Gv, Ev, Ibs);
    t[0x6c] = op2(I::Insb, Yb, Dx);
    t[0x6d] = Slot::Sized([I::Insw, I::Insd, I::Insd], [Yv, Dx, None], 0);
    t[0x6e] = op2(I::Outsb, Dx, Xb);
    t[0x6f] = Slot::Sized([I::Outsw, I::Outsd, I::Outsd], [Dx, Xv, None], 0);

    let mut cc = 0;
    while cc < 16 {
        t[0x70 + cc] = with(op1(JCC[cc], Jb), F64);
        cc += 1;
    }

    t[0x80] = Slot::Group(GroupId::Grp1Eb);
    t[0x81] = Slot::Group(GroupId::Grp1Ev);
    t[0x82] = Slot::Group(GroupId::Grp1Eb);
    t[0x83] = Slot::Group(GroupId::Grp1Evs);
    t[0x84] = op2(I::Test, Eb, Gb);
    t[0x85] = op2(I::Test, Ev, Gv);
    t[0x86] = op2(I::Xchg, Eb, Gb);
    t[0x87] = op2(I::Xchg, Ev, Gv);
    t[0x88] = op2(I::Mov, Eb, Gb);
    t[0x89] = op2(I::Mov, Ev, Gv);
    t[0x8a] = op2(I::Mov, Gb, Eb);
    t[0x8b] = op2(I::Mov, Gv, Ev);
    t[0x8c] = op2(I::Mov, Ev, Sw);
    t[0x8d] = op2(I::Lea, Gv, M);
    t[0x8e] = op2(I::Mov, Sw, Ew);
    t[0x8f] = Slot::Group(GroupId::Grp1a);

    t[0x98] = Slot::Sized([I::Cbw, I::Cwde, I::Cdqe], [None; 3], 0);
    t[0x99] = Slot::Sized([I::Cwd, I::Cdq, I::Cqo], [None; 3], 0);
    t[0x9a] = with(op1(I::Lcall, Ap), I64);
    t[0x9b] = op0(I::Wait);
    t[0x9c] = Slot::Sized([I::Pushf, I::Pushfd, I::Pushfq], [None; 3], D64);
    t[0x9d] = Slot::Sized([I::Popf, I::Popfd, I::Popfq], [None; 3], D64);
    t[0x9e] = op0(I::Sahf);
    t[0x9f] = op0(I::Lahf);

    t[0xa0] = op2(I::Mov, Al, Ob);
    t[0xa1] = op2(I::Mov, Ax, Ov);
    t[0xa2] = op2(I::Mov, Ob, Al);
    t[0xa3] = op2(I::Mov, Ov, Ax);
    t[0xa4] = op2(I::Movsb, Yb, Xb);
    t[0xa5] = Slot::Sized([I::Movsw, I::Movsd, I::Movsq], [Yv, Xv, None], 0);
    t[0xa6] = op2(I::Cmpsb, Xb, Yb);
    t[0xa7] = Slot::Sized([I::Cmpsw, I::Cmpsd, I::Cmpsq], [Xv, Yv, None], 0);
    t[0xa8] = op2(I::Test, Al, Ib);
    t[0xa9] = op2(I::Test, Ax, Iz);
    t[0xaa] = op2(I::Stosb, Yb, Al);
    t[0xab] = Slot::Sized([I::Stosw, I::Stosd, I::Stosq], [Yv, Ax, None], 0);
    t[0xac] = op2(I::Lodsb, Al, Xb);
    t[0xad] = Slot::Sized([I::Lodsw, I::Lodsd, I::Lodsq], [Ax, Xv, None], 0);
    t[0xae] = op2(I::Scasb, Al, Yb);
    t[0xaf] = Slot::Sized([I::Scasw, I::Scasd, I::Scasq], [Ax, Yv, None], 0);

    t[0xc0] = Slot::Group(GroupId::Grp2EbIb);
    t[0xc1] = Slot::Group(GroupId::Grp2EvIb);
    t[0xc2] = with(op1(I::Ret, Iw), F64);
    t[0xc3] = with(op0(I::Ret), F64);
    t[0xc4] = with(op2(I::Les, Gv, Mp), I64);
    t[0xc5] = with(op2(I::Lds, Gv, Mp), I64);
    t[0xc6] = Slot::Group(GroupId::Grp11Eb);
    t[0xc7] = Slot::Group(GroupId::Grp11Ev);
    t[0xc8] = with(op2(I::Enter, Iw, Ib), D64);
    t[0xc9] = with(op0(I::Leave), D64);
    t[0xca] = op1(I::Retf, Iw);
    t[0xcb] = op0(I::Retf);
    t[0xcc] = op0(I::Int3);
    t[0xcd] = op1(I::Int, Ib);
    t[0xce] = with(op0(I::Into), I64);
    t[0xcf] = Slot::Sized([I::Iret, I::Iretd, I::Iretq], [None; 3], 0);

    t[0xd0] = Slot::Group(GroupId::Grp2Eb1);
    t[0xd1] = Slot::Group(GroupId::Grp2Ev1);
    t[0xd2] = Slot::Group(GroupId::Grp2EbCl);
    t[0xd3] = Slot::Group(GroupId::Grp2EvCl);
    t[0xd4] = with(op1(I::Aam, Ib), I64);
    t[0xd5] = with(op1(I::Aad, Ib), I64);
    t[0xd6] = with(op0(I::Salc), I64);
    t[0xd7] = op0(I::Xlatb);
    let mut f = 0;
    while f < 8 {
        t[0xd8 + f] = Slot::X87;
        f += 1;
    }

    t[0xe0] = with(op1(I::Loopne, Jb), F64);
    t[0xe1] = with(op1(I::Loope, Jb), F64);
    t[0xe2] = with(op1(I::Loop, Jb), F64);
    t[0xe3] = Slot::AddrSized([I::Jcxz, I::Jecxz, I::Jrcxz], Jb);
    t[0xe4] = op2(I::In, Al, Ib);
    t[0xe5] = op2(I::In, Ax, Ib);
    t[0xe6] = op2(I::Out, Ib, Al);
    t[0xe7] = op2(I::Out, Ib, Ax);
    t[0xe8] = with(op1(I::Call, Jz), F64);
    t[0xe9] = with(op1(I::Jmp, Jz), F64);
    t[0xea] = with(op1(I::Ljmp, Ap), I64);
    t[0xeb] = with(op1(I::Jmp, Jb), F64);
    t[0xec] = op2(I::In, Al, Dx);
    t[0xed] = op2(I::In, Ax, Dx);
    t[0xee] = op2(I::Out, Dx, Al);
    t[0xef] = op2(I::Out, Dx, Ax);

    t[0xf0] = Slot::Prefix;
    t[0xf1] = op0(I::Int1);
    t[0xf2] = Slot::Prefix;
    t[0xf3] = Slot::Prefix;
    t[0xf4] = op0(I::Hlt);
    t[0xf5] = op0(I::Cmc);
    t[0xf6] = Slot::Group(GroupId::Grp3Eb);
    t[0xf7] = Slot::Group(GroupId::Grp3Ev);
    t[0xf8] = op0(I::Clc);
    t[0xf9] = op0(I::Stc);
    t[0xfa] = op0(I::Cli);
    t[0xfb] = op0(I::Sti);
    t[0xfc] = op0(I::Cld);
    t[0xfd] = op0(I::Std);
    t[0xfe] = Slot::Group(GroupId::Grp4);
    t[0xff] = Slot::Group(GroupId::Grp5);
    t
}

const fn two_byte_map() -> [Slot; 256] {
    use Opnd::*;
    let mut t = [Slot::Invalid; 256];

    t[0x00] = Slot::Group(GroupId::Grp6);
    t[0x01] = Slot::Special(Special::Group7);
    t[0x02] = op2(I::Lar, Gv, Ew);
    t[0x03] = op2(I::Lsl, Gv, Ew);
    t[0x05] = op0(I::Syscall);
    t[0x06] = op0(I::Clts);
    t[0x07] = op0(I::Sysret);
    t[0x08] = op0(I::Invd);
    t[0x09] = op0(I::Wbinvd);
    t[0x0b] = op0(I::Ud2);
    t[0x0d] = op1(I::Nop, Ev);

    t[0x10] = arith4(I::Movups, I::Movupd, I::Movss, I::Movsd);
    t[0x11] = sse(
        x2(I::Movups, Wx, Vx),
        x2(I::Movupd, Wx, Vx),
        x2(I::Movss, Wss, Vx),
        x2(I::Movsd, Wsd, Vx),
    );
    t[0x12] = sse(x2(I::Movlps, Vx, Wsd), x2(I::Movlpd, Vx, Mq), NONE, NONE);
    t[0x13] = sse(x2(I::Movlps, Mq, Vx), x2(I::Movlpd, Mq, Vx), NONE, NONE);
    t[0x14] = packed2(I::Unpcklps, I::Unpcklpd);
    t[0x15] = packed2(I::Unpckhps, I::Unpckhpd);
    t[0x16] = sse(x2(I::Movhps, Vx, Wsd), x2(I::Movhpd, Vx, Mq), NONE, NONE);
    t[0x17] = sse(x2(I::Movhps, Mq, Vx), x2(I::Movhpd, Mq, Vx), NONE, NONE);
    t[0x18] = Slot::Special(Special::Prefetch);
    t[0x1f] = op1(I::Nop, Ev);

    t[0x20] = op2(I::Mov, Rd, Cd);
    t[0x21] = op2(I::Mov, Rd, Dd);
    t[0x22] = op2(I::Mov, Cd, Rd);
    t[0x23] = op2(I::Mov, Dd, Rd);

    t[0x28] = packed2(I::Movaps, I::Movapd);
    t[0x29] = sse(x2(I::Movaps, Wx, Vx), x2(I::Movapd, Wx, Vx), NONE, NONE);
    t[0x2a] = sse(
        x2(I::Cvtpi2ps, Vx, Qq),
        x2(I::Cvtpi2pd, Vx, Qq),
        x2(I::Cvtsi2ss, Vx, Ey),
        x2(I::Cvtsi2sd, Vx, Ey),
    );
    t[0x2b] = sse(x2(I::Movntps, Mdq, Vx), x2(I::Movntpd, Mdq, Vx), NONE, NONE);
    t[0x2c] = sse(
        x2(I::Cvttps2pi, Pq, Wsd),
        x2(I::Cvttpd2pi, Pq, Wx),
        x2(I::Cvttss2si, Gy, Wss),
        x2(I::Cvttsd2si, Gy, Wsd),
    );
    t[0x2d] = sse(
        x2(I::Cvtps2pi, Pq, Wsd),
        x2(I::Cvtpd2pi, Pq, Wx),
        x2(I::Cvtss2si, Gy, Wss),
        x2(I::Cvtsd2si, Gy, Wsd),
    );
    t[0x2e] = sse(x2(I::Ucomiss, Vx, Wss), x2(I::Ucomisd, Vx, Wsd), NONE, NONE);
    t[0x2f] = sse(x2(I::Comiss, Vx, Wss), x2(I::Comisd, Vx, Wsd), NONE, NONE);

    t[0x30] = op0(I::Wrmsr);
    t[0x31] = op0(I::Rdtsc);
    t[0x32] = op0(I::Rdmsr);
    t[0x33] = op0(I::Rdpmc);
    t[0x34] = op0(I::Sysenter);
    t[0x35] = op0(I::Sysexit);

    let mut cc = 0;
    while cc < 16 {
        t[0x40 + cc] = op2(CMOVCC[cc], Gv, Ev);
        t[0x80 + cc] = with(op1(JCC[cc], Jz), F64);
        t[0x90 + cc] = op1(SETCC[cc], Eb);
        cc += 1;
    }

    t[0x50] = sse(x2(I::Movmskps, Gy, Ux), x2(I::Movmskpd, Gy, Ux), NONE, NONE);
    t[0x51] = arith4(I::Sqrtps, I::Sqrtpd, I::Sqrtss, I::Sqrtsd);
    t[0x54] = packed2(I::Andps, I::Andpd);
    t[0x55] = packed2(I::Andnps, I::Andnpd);
    t[0x56] = packed2(I::Orps, I::Orpd);
    t[0x57] = packed2(I::Xorps, I::Xorpd);
    t[0x58] = arith4(I::Addps, I::Addpd, I::Addss, I::Addsd);
    t[0x59] = arith4(I::Mulps, I::Mulpd, I::Mulss, I::Mulsd);
    t[0x5a] = sse(
        x2(I::Cvtps2pd, Vx, Wsd),
        x2(I::Cvtpd2ps, Vx, Wx),
        x2(I::Cvtss2sd, Vx, Wss),
        x2(I::Cvtsd2ss, Vx, Wsd),
    );
    t[0x5c] = arith4(I::Subps, I::Subpd, I::Subss, I::Subsd);
    t[0x5d] = arith4(I::Minps, I::Minpd, I::Minss, I::Minsd);
    t[0x5e] = arith4(I::Divps, I::Divpd, I::Divss, I::Divsd);
    t[0x5f] = arith4(I::Maxps, I::Maxpd, I::Maxss, I::Maxsd);

    t[0x60] = mmx_sse(I::Punpcklbw);
    t[0x61] = mmx_sse(I::Punpcklwd);
    t[0x62] = mmx_sse(I::Punpckldq);
    t[0x63] = mmx_sse(I::Packsswb);
    t[0x64] = mmx_sse(I::Pcmpgtb);
    t[0x65] = mmx_sse(I::Pcmpgtw);
    t[0x66] = mmx_sse(I::Pcmpgtd);
    t[0x67] = mmx_sse(I::Packuswb);
    t[0x68] = mmx_sse(I::Punpckhbw);
    t[0x69] = mmx_sse(I::Punpckhwd);
    t[0x6a] = mmx_sse(I::Punpckhdq);
    t[0x6b] = mmx_sse(I::Packssdw);
    t[0x6c] = sse(NONE, x2(I::Punpcklqdq, Vx, Wx), NONE, NONE);
    t[0x6d] = sse(NONE, x2(I::Punpckhqdq, Vx, Wx), NONE, NONE);
    t[0x6e] = sse(x2(I::Movd, Pq, Ey), x2(I::Movd, Vx, Ey), NONE, NONE);
    t[0x6f] = sse(
        x2(I::Movq, Pq, Qq),
        x2(I::Movdqa, Vx, Wx),
        x2(I::Movdqu, Vx, Wx),
        NONE,
    );
    t[0x70] = sse(
        e(I::Pshufw, Pq, Qq, Ib, 0),
        e(I::Pshufd, Vx, Wx, Ib, 0),
        e(I::Pshufhw, Vx, Wx, Ib, 0),
        e(I::Pshuflw, Vx, Wx, Ib, 0),
    );
    t[0x74] = mmx_sse(I::Pcmpeqb);
    t[0x75] = mmx_sse(I::Pcmpeqw);
    t[0x76] = mmx_sse(I::Pcmpeqd);
    t[0x77] = sse(x2(I::Emms, None, None), NONE, NONE, NONE);
    t[0x7e] = sse(
        x2(I::Movd, Ey, Pq),
        x2(I::Movd, Ey, Vx),
        x2(I::Movq, Vx, Wsd),
        NONE,
    );
    t[0x7f] = sse(
        x2(I::Movq, Qq, Pq),
        x2(I::Movdqa, Wx, Vx),
        x2(I::Movdqu, Wx, Vx),
        NONE,
    );

    t[0xa0] = with(op1(I::Push, Seg), D64);
    t[0xa1] = with(op1(I::Pop, Seg), D64);
    t[0xa2] = op0(I::Cpuid);
    t[0xa3] = op2(I::Bt, Ev, Gv);
    t[0xa4] = op3(I::Shld, Ev, Gv, Ib);
    t[0xa5] = op3(I::Shld, Ev, Gv, Cl);
    t[0xa8] = with(op1(I::Push, Seg), D64);
    t[0xa9] = with(op1(I::Pop, Seg), D64);
    t[0xaa] = op0(I::Rsm);
    t[0xab] = op2(I::Bts, Ev, Gv);
    t[0xac] = op3(I::Shrd, Ev, Gv, Ib);
    t[0xad] = op3(I::Shrd, Ev, Gv, Cl);
    t[0xae] = Slot::Special(Special::Group15);
    t[0xaf] = op2(I::Imul, Gv, Ev);

    t[0xb0] = op2(I::Cmpxchg, Eb, Gb);
    t[0xb1] = op2(I::Cmpxchg, Ev, Gv);
    t[0xb2] = op2(I::Lss, Gv, Mp);
    t[0xb3] = op2(I::Btr, Ev, Gv);
    t[0xb4] = op2(I::Lfs, Gv, Mp);
    t[0xb5] = op2(I::Lgs, Gv, Mp);
    t[0xb6] = op2(I::Movzx, Gv, Eb);
    t[0xb7] = op2(I::Movzx, Gv, Ew);
    t[0xb8] = Slot::Rep(NONE, x2(I::Popcnt, Gv, Ev));
    t[0xba] = Slot::Group(GroupId::Grp8);
    t[0xbb] = op2(I::Btc, Ev, Gv);
    t[0xbc] = Slot::Rep(x2(I::Bsf, Gv, Ev), x2(I::Tzcnt, Gv, Ev));
    t[0xbd] = Slot::Rep(x2(I::Bsr, Gv, Ev), x2(I::Lzcnt, Gv, Ev));
    t[0xbe] = op2(I::Movsx, Gv, Eb);
    t[0xbf] = op2(I::Movsx, Gv, Ew);

    t[0xc0] = op2(I::Xadd, Eb, Gb);
    t[0xc1] = op2(I::Xadd, Ev, Gv);
    t[0xc3] = op2(I::Movnti, M, Gy);
    t[0xc6] = sse(
        e(I::Shufps, Vx, Wx, Ib, 0),
        e(I::Shufpd, Vx, Wx, Ib, 0),
        NONE,
        NONE,
    );
    t[0xc7] = Slot::Special(Special::Group9);
    let mut r = 0;
    while r < 8 {
        t[0xc8 + r] = op1(I::Bswap, Zv);
        r += 1;
    }

    t[0xd4] = mmx_sse(I::Paddq);
    t[0xd5] = mmx_sse(I::Pmullw);
    t[0xd6] = sse(NONE, x2(I::Movq, Wsd, Vx), NONE, NONE);
    t[0xd7] = sse(x2(I::Pmovmskb, Gy, Nq), x2(I::Pmovmskb, Gy, Ux), NONE, NONE);
    t[0xdb] = mmx_sse(I::Pand);
    t[0xdf] = mmx_sse(I::Pandn);
    t[0xe7] = sse(x2(I::Movntq, Mq, Pq), x2(I::Movntdq, Mdq, Vx), NONE, NONE);
    t[0xeb] = mmx_sse(I::Por);
    t[0xef] = mmx_sse(I::Pxor);
    t[0xf8] = mmx_sse(I::Psubb);
    t[0xf9] = mmx_sse(I::Psubw);
    t[0xfa] = mmx_sse(I::Psubd);
    t[0xfb] = mmx_sse(I::Psubq);
    t[0xfc] = mmx_sse(I::Paddb);
    t[0xfd] = mmx_sse(I::Paddw);
    t[0xfe] = mmx_sse(I::Paddd);
    t
}

const fn group_row(insns: [I; 8], a: Opnd, b: Opnd) -> [Entry; 8] {
    let mut row = [Entry::INVALID; 8];
    let mut i = 0;
    while i < 8 {
        row[i] = e(insns[i], a, b, Opnd::None, 0);
        i += 1;
    }
    row
}

const fn single(insn: I, a: Opnd, b: Opnd, attr: u8) -> [Entry; 8] {
    let mut row = [Entry::INVALID; 8];
    row[0] = e(insn, a, b, Opnd::None, attr);
    row
}

const fn unary3(size: Opnd, imm: Opnd) -> [Entry; 8] {
    let mut row = [Entry::INVALID; 8];
    row[0] = e(I::Test, size, imm, Opnd::None, 0);
    row[1] = e(I::Test, size, imm, Opnd::None, 0);
    row[2] = e(I::Not, size, Opnd::None, Opnd::None, 0);
    row[3] = e(I::Neg, size, Opnd::None, Opnd::None, 0);
    row[4] = e(I::Mul, size, Opnd::None, Opnd::None, 0);
    row[5] = e(I::Imul, size, Opnd::None, Opnd::None, 0);
    row[6] = e(I::Div, size, Opnd::None, Opnd::None, 0);
    row[7] = e(I::Idiv, size, Opnd::None, Opnd::None, 0);
    row
}

const fn group5() -> [Entry; 8] {
    use Opnd::*;
    let mut row = [Entry::INVALID; 8];
    row[0] = e(I::Inc, Ev, None, None, 0);
    row[1] = e(I::Dec, Ev, None, None, 0);
    row[2] = e(I::Call, Ev, None, None, F64);
    row[3] = e(I::Lcall, Mp, None, None, 0);
    row[4] = e(I::Jmp, Ev, None, None, F64);
    row[5] = e(I::Ljmp, Mp, None, None, 0);
    row[6] = e(I::Push, Ev, None, None, D64);
    row
}

const fn group6() -> [Entry; 8] {
    use Opnd::*;
    let mut row = [Entry::INVALID; 8];
    row[0] = e(I::Sldt, Ev, None, None, 0);
    row[1] = e(I::Str, Ev, None, None, 0);
    row[2] = e(I::Lldt, Ew, None, None, 0);
    row[3] = e(I::Ltr, Ew, None, None, 0);
    row[4] = e(I::Verr, Ew, None, None, 0);
    row[5] = e(I::Verw, Ew, None, None, 0);
    row
}

const fn group8() -> [Entry; 8] {
    use Opnd::*;
    let mut row = [Entry::INVALID; 8];
    row[4] = e(I::Bt, Ev, Ib, None, 0);
    row[5] = e(I::Bts, Ev, Ib, None, 0);
    row[6] = e(I::Btr, Ev, Ib, None, 0);
    row[7] = e(I::Btc, Ev, Ib, None, 0);
    row
}

const fn group4() -> [Entry; 8] {
    let mut row = [Entry::INVALID; 8];
    row[0] = e(I::Inc, Opnd::Eb, Opnd::None, Opnd::None, 0);
    row[1] = e(I::Dec, Opnd::Eb, Opnd::None, Opnd::None, 0);
    row
}

/// Indexed by [`GroupId`].
pub(crate) static GROUPS: [[Entry; 8]; 18] = [
    group_row(ALU, Opnd::Eb, Opnd::Ib),
    group_row(ALU, Opnd::Ev, Opnd::Iz),
    group_row(ALU, Opnd::Ev, Opnd::Ibs),
    group_row(SHIFT, Opnd::Eb, Opnd::Ib),
    group_row(SHIFT, Opnd::Ev, Opnd::Ib),
    group_row(SHIFT, Opnd::Eb, Opnd::One),
    group_row(SHIFT, Opnd::Ev, Opnd::One),
    group_row(SHIFT, Opnd::Eb, Opnd::Cl),
    group_row(SHIFT, Opnd::Ev, Opnd::Cl),
    unary3(Opnd::Eb, Opnd::Ib),
    unary3(Opnd::Ev, Opnd::Iz),
    group4(),
    group5(),
    single(I::Mov, Opnd::Eb, Opnd::Ib, 0),
    single(I::Mov, Opnd::Ev, Opnd::Iz, 0),
    single(I::Pop, Opnd::Ev, Opnd::None, D64),
    group6(),
    group8(),
];

pub(crate) fn group(id: GroupId) -> &'static [Entry; 8] {
    &GROUPS[id as usize]
}

/// x87 memory forms, indexed by `opcode - 0xD8` and ModRM.reg: instruction and operand size.
pub(crate) static X87_MEM: [[(I, u8); 8]; 8] = [
    [
        (I::Fadd, 4), (I::Fmul, 4), (I::Fcom, 4), (I::Fcomp, 4),
        (I::Fsub, 4), (I::Fsubr, 4), (I::Fdiv, 4), (I::Fdivr, 4),
    ],
    [
        (I::Fld, 4), (I::Invalid, 0), (I::Fst, 4), (I::Fstp, 4),
        (I::Fldenv, 0), (I::Fldcw, 2), (I::Fnstenv, 0), (I::Fnstcw, 2),
    ],
    [
        (I::Fiadd, 4), (I::Fimul, 4), (I::Ficom, 4), (I::Ficomp, 4),
        (I::Fisub, 4), (I::Fisubr, 4), (I::Fidiv, 4), (I::Fidivr, 4),
    ],
    [
        (I::Fild, 4), (I::Fisttp, 4), (I::Fist, 4), (I::Fistp, 4),
        (I::Invalid, 0), (I::Fld, 10), (I::Invalid, 0), (I::Fstp, 10),
    ],
    [
        (I::Fadd, 8), (I::Fmul, 8), (I::Fcom, 8), (I::Fcomp, 8),
        (I::Fsub, 8), (I::Fsubr, 8), (I::Fdiv, 8), (I::Fdivr, 8),
    ],
    [
        (I::Fld, 8), (I::Fisttp, 8), (I::Fst, 8), (I::Fstp, 8),
        (I::Frstor, 0), (I::Invalid, 0), (I::Fnsave, 0), (I::Fnstsw, 2),
    ],
    [
        (I::Fiadd, 2), (I::Fimul, 2), (I::Ficom, 2), (I::Ficomp, 2),
        (I::Fisub, 2), (I::Fisubr, 2), (I::Fidiv, 2), (I::Fidivr, 2),
    ],
    [
        (I::Fild, 2), (I::Fisttp, 2), (I::Fist, 2), (I::Fistp, 2),
        (I::Fbld, 10), (I::Fild, 8), (I::Fbstp, 10), (I::Fistp, 8),
    ],
];

/// Operand shapes of the x87 register forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum X87Form {
    /// no operands
    Bare,
    /// st(i)
    Sti,
    /// st(0), st(i)
    St0Sti,
    /// st(i), st(0)
    StiSt0,
    /// ax
    Ax,
}

/// x87 register forms: the instruction selected by opcode and ModRM byte.
pub(crate) fn x87_register(opcode: u8, modrm: u8) -> Option<(I, X87Form)> {
    use X87Form::*;
    let row = (modrm >> 3) & 7;
    let pick = |row_insns: [I; 8], form: X87Form| Some((row_insns[row as usize], form));
    let found = match opcode {
        0xd8 => match row {
            2 | 3 => pick([I::Invalid, I::Invalid, I::Fcom, I::Fcomp, I::Invalid, I::Invalid, I::Invalid, I::Invalid], Sti),
            _ => pick([I::Fadd, I::Fmul, I::Invalid, I::Invalid, I::Fsub, I::Fsubr, I::Fdiv, I::Fdivr], St0Sti),
        },
        0xd9 => match modrm {
            0xc0..=0xc7 => Some((I::Fld, Sti)),
            0xc8..=0xcf => Some((I::Fxch, Sti)),
            _ => {
                let insn = match modrm {
                    0xd0 => I::Fnop,
                    0xe0 => I::Fchs,
                    0xe1 => I::Fabs,
                    0xe4 => I::Ftst,
                    0xe5 => I::Fxam,
                    0xe8 => I::Fld1,
                    0xe9 => I::Fldl2t,
                    0xea => I::Fldl2e,
                    0xeb => I::Fldpi,
                    0xec => I::Fldlg2,
                    0xed => I::Fldln2,
                    0xee => I::Fldz,
                    0xf0 => I::F2xm1,
                    0xf1 => I::Fyl2x,
                    0xf2 => I::Fptan,
                    0xf3 => I::Fpatan,
                    0xf4 => I::Fxtract,
                    0xf5 => I::Fprem1,
                    0xf6 => I::Fdecstp,
                    0xf7 => I::Fincstp,
                    0xf8 => I::Fprem,
                    0xf9 => I::Fyl2xp1,
                    0xfa => I::Fsqrt,
                    0xfb => I::Fsincos,
                    0xfc => I::Frndint,
                    0xfd => I::Fscale,
                    0xfe => I::Fsin,
                    0xff => I::Fcos,
                    _ => return None,
                };
                Some((insn, Bare))
            }
        },
        0xda => match modrm {
            0xe9 => Some((I::Fucompp, Bare)),
            0xc0..=0xdf => pick([I::Fcmovb, I::Fcmove, I::Fcmovbe, I::Fcmovu, I::Invalid, I::Invalid, I::Invalid, I::Invalid], St0Sti),
            _ => None,
        },
        0xdb => match modrm {
            0xe2 => Some((I::Fnclex, Bare)),
            0xe3 => Some((I::Fninit, Bare)),
            0xe8..=0xf7 => pick([I::Invalid, I::Invalid, I::Invalid, I::Invalid, I::Invalid, I::Fucomi, I::Fcomi, I::Invalid], St0Sti),
            0xc0..=0xdf => pick([I::Fcmovnb, I::Fcmovne, I::Fcmovnbe, I::Fcmovnu, I::Invalid, I::Invalid, I::Invalid, I::Invalid], St0Sti),
            _ => None,
        },
        0xdc => match row {
            2 | 3 => None,
            _ => pick([I::Fadd, I::Fmul, I::Invalid, I::Invalid, I::Fsubr, I::Fsub, I::Fdivr, I::Fdiv], StiSt0),
        },
        0xdd => match row {
            0 | 2 | 3 | 4 | 5 => pick([I::Ffree, I::Invalid, I::Fst, I::Fstp, I::Fucom, I::Fucomp, I::Invalid, I::Invalid], Sti),
            _ => None,
        },
        0xde => match modrm {
            0xd9 => Some((I::Fcompp, Bare)),
            _ => match row {
                2 | 3 => None,
                _ => pick([I::Faddp, I::Fmulp, I::Invalid, I::Invalid, I::Fsubrp, I::Fsubp, I::Fdivrp, I::Fdivp], StiSt0),
            },
        },
        0xdf => match modrm {
            0xe0 => Some((I::Fnstsw, Ax)),
            0xe8..=0xf7 => pick([I::Invalid, I::Invalid, I::Invalid, I::Invalid, I::Invalid, I::Fucomip, I::Fcomip, I::Invalid], St0Sti),
            _ => None,
        },
        _ => None,
    };
    found.filter(|(insn, _)| *insn != I::Invalid)
}
