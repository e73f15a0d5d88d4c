//! Opcode maps of the 6800 family and the 6809.
//!
//! Each row is `(opcode, instruction, addressing, implicit register effect)`. The 6801 and
//! 6301 maps only list what they add to the CPU they extend.

use super::{M680xInsn as I, M680xReg as R};

/// How the bytes after the opcode are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Inh,
    Imm8,
    Imm16,
    Dir,
    Ext,
    /// `n,x` on the 6800 family, a postbyte on the 6809.
    Idx,
    Rel8,
    Rel16,
    /// `exg`/`tfr` register pair postbyte.
    Pair,
    /// `psh`/`pul` register mask; the register is the opposite stack named by bit 6.
    List(R),
    /// 6301 bit operation: immediate mask then direct address.
    ImmDir,
    /// 6301 bit operation: immediate mask then `n,x`.
    ImmIdx,
}

/// Effect on an accumulator, index or stack register that is not spelled as an operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fx {
    None,
    Read(R),
    Write(R),
    Modify(R),
}

pub(super) type Entry = (u8, I, Mode, Fx);

/// Motorola 6800.
pub(super) const M6800: &[Entry] = &[
    (0x01, I::Nop, Mode::Inh, Fx::None),
    (0x06, I::Tap, Mode::Inh, Fx::Read(R::A)),
    (0x07, I::Tpa, Mode::Inh, Fx::Write(R::A)),
    (0x08, I::Inx, Mode::Inh, Fx::Modify(R::X)),
    (0x09, I::Dex, Mode::Inh, Fx::Modify(R::X)),
    (0x0a, I::Clv, Mode::Inh, Fx::None),
    (0x0b, I::Sev, Mode::Inh, Fx::None),
    (0x0c, I::Clc, Mode::Inh, Fx::None),
    (0x0d, I::Sec, Mode::Inh, Fx::None),
    (0x0e, I::Cli, Mode::Inh, Fx::None),
    (0x0f, I::Sei, Mode::Inh, Fx::None),
    (0x10, I::Sba, Mode::Inh, Fx::Modify(R::A)),
    (0x11, I::Cba, Mode::Inh, Fx::Read(R::A)),
    (0x16, I::Tab, Mode::Inh, Fx::Write(R::B)),
    (0x17, I::Tba, Mode::Inh, Fx::Write(R::A)),
    (0x19, I::Daa, Mode::Inh, Fx::Modify(R::A)),
    (0x1b, I::Aba, Mode::Inh, Fx::Modify(R::A)),
    (0x20, I::Bra, Mode::Rel8, Fx::None),
    (0x22, I::Bhi, Mode::Rel8, Fx::None),
    (0x23, I::Bls, Mode::Rel8, Fx::None),
    (0x24, I::Bcc, Mode::Rel8, Fx::None),
    (0x25, I::Bcs, Mode::Rel8, Fx::None),
    (0x26, I::Bne, Mode::Rel8, Fx::None),
    (0x27, I::Beq, Mode::Rel8, Fx::None),
    (0x28, I::Bvc, Mode::Rel8, Fx::None),
    (0x29, I::Bvs, Mode::Rel8, Fx::None),
    (0x2a, I::Bpl, Mode::Rel8, Fx::None),
    (0x2b, I::Bmi, Mode::Rel8, Fx::None),
    (0x2c, I::Bge, Mode::Rel8, Fx::None),
    (0x2d, I::Blt, Mode::Rel8, Fx::None),
    (0x2e, I::Bgt, Mode::Rel8, Fx::None),
    (0x2f, I::Ble, Mode::Rel8, Fx::None),
    (0x30, I::Tsx, Mode::Inh, Fx::Write(R::X)),
    (0x31, I::Ins, Mode::Inh, Fx::Modify(R::S)),
    (0x32, I::Pula, Mode::Inh, Fx::Write(R::A)),
    (0x33, I::Pulb, Mode::Inh, Fx::Write(R::B)),
    (0x34, I::Des, Mode::Inh, Fx::Modify(R::S)),
    (0x35, I::Txs, Mode::Inh, Fx::Write(R::S)),
    (0x36, I::Psha, Mode::Inh, Fx::Read(R::A)),
    (0x37, I::Pshb, Mode::Inh, Fx::Read(R::B)),
    (0x39, I::Rts, Mode::Inh, Fx::None),
    (0x3b, I::Rti, Mode::Inh, Fx::None),
    (0x3e, I::Wai, Mode::Inh, Fx::None),
    (0x3f, I::Swi, Mode::Inh, Fx::None),
    (0x40, I::Nega, Mode::Inh, Fx::Modify(R::A)),
    (0x43, I::Coma, Mode::Inh, Fx::Modify(R::A)),
    (0x44, I::Lsra, Mode::Inh, Fx::Modify(R::A)),
    (0x46, I::Rora, Mode::Inh, Fx::Modify(R::A)),
    (0x47, I::Asra, Mode::Inh, Fx::Modify(R::A)),
    (0x48, I::Asla, Mode::Inh, Fx::Modify(R::A)),
    (0x49, I::Rola, Mode::Inh, Fx::Modify(R::A)),
    (0x4a, I::Deca, Mode::Inh, Fx::Modify(R::A)),
    (0x4c, I::Inca, Mode::Inh, Fx::Modify(R::A)),
    (0x4d, I::Tsta, Mode::Inh, Fx::Read(R::A)),
    (0x4f, I::Clra, Mode::Inh, Fx::Write(R::A)),
    (0x50, I::Negb, Mode::Inh, Fx::Modify(R::B)),
    (0x53, I::Comb, Mode::Inh, Fx::Modify(R::B)),
    (0x54, I::Lsrb, Mode::Inh, Fx::Modify(R::B)),
    (0x56, I::Rorb, Mode::Inh, Fx::Modify(R::B)),
    (0x57, I::Asrb, Mode::Inh, Fx::Modify(R::B)),
    (0x58, I::Aslb, Mode::Inh, Fx::Modify(R::B)),
    (0x59, I::Rolb, Mode::Inh, Fx::Modify(R::B)),
    (0x5a, I::Decb, Mode::Inh, Fx::Modify(R::B)),
    (0x5c, I::Incb, Mode::Inh, Fx::Modify(R::B)),
    (0x5d, I::Tstb, Mode::Inh, Fx::Read(R::B)),
    (0x5f, I::Clrb, Mode::Inh, Fx::Write(R::B)),
    (0x60, I::Neg, Mode::Idx, Fx::None),
    (0x63, I::Com, Mode::Idx, Fx::None),
    (0x64, I::Lsr, Mode::Idx, Fx::None),
    (0x66, I::Ror, Mode::Idx, Fx::None),
    (0x67, I::Asr, Mode::Idx, Fx::None),
    (0x68, I::Asl, Mode::Idx, Fx::None),
    (0x69, I::Rol, Mode::Idx, Fx::None),
    (0x6a, I::Dec, Mode::Idx, Fx::None),
    (0x6c, I::Inc, Mode::Idx, Fx::None),
    (0x6d, I::Tst, Mode::Idx, Fx::None),
    (0x6e, I::Jmp, Mode::Idx, Fx::None),
    (0x6f, I::Clr, Mode::Idx, Fx::None),
    (0x70, I::Neg, Mode::Ext, Fx::None),
    (0x73, I::Com, Mode::Ext, Fx::None),
    (0x74, I::Lsr, Mode::Ext, Fx::None),
    (0x76, I::Ror, Mode::Ext, Fx::None),
    (0x77, I::Asr, Mode::Ext, Fx::None),
    (0x78, I::Asl, Mode::Ext, Fx::None),
    (0x79, I::Rol, Mode::Ext, Fx::None),
    (0x7a, I::Dec, Mode::Ext, Fx::None),
    (0x7c, I::Inc, Mode::Ext, Fx::None),
    (0x7d, I::Tst, Mode::Ext, Fx::None),
    (0x7e, I::Jmp, Mode::Ext, Fx::None),
    (0x7f, I::Clr, Mode::Ext, Fx::None),
    (0x80, I::Suba, Mode::Imm8, Fx::Modify(R::A)),
    (0x81, I::Cmpa, Mode::Imm8, Fx::Read(R::A)),
    (0x82, I::Sbca, Mode::Imm8, Fx::Modify(R::A)),
    (0x84, I::Anda, Mode::Imm8, Fx::Modify(R::A)),
    (0x85, I::Bita, Mode::Imm8, Fx::Read(R::A)),
    (0x86, I::Ldaa, Mode::Imm8, Fx::Write(R::A)),
    (0x88, I::Eora, Mode::Imm8, Fx::Modify(R::A)),
    (0x89, I::Adca, Mode::Imm8, Fx::Modify(R::A)),
    (0x8a, I::Oraa, Mode::Imm8, Fx::Modify(R::A)),
    (0x8b, I::Adda, Mode::Imm8, Fx::Modify(R::A)),
    (0x8c, I::Cpx, Mode::Imm16, Fx::Read(R::X)),
    (0x8d, I::Bsr, Mode::Rel8, Fx::None),
    (0x8e, I::Lds, Mode::Imm16, Fx::Write(R::S)),
    (0x90, I::Suba, Mode::Dir, Fx::Modify(R::A)),
    (0x91, I::Cmpa, Mode::Dir, Fx::Read(R::A)),
    (0x92, I::Sbca, Mode::Dir, Fx::Modify(R::A)),
    (0x94, I::Anda, Mode::Dir, Fx::Modify(R::A)),
    (0x95, I::Bita, Mode::Dir, Fx::Read(R::A)),
    (0x96, I::Ldaa, Mode::Dir, Fx::Write(R::A)),
    (0x97, I::Staa, Mode::Dir, Fx::Read(R::A)),
    (0x98, I::Eora, Mode::Dir, Fx::Modify(R::A)),
    (0x99, I::Adca, Mode::Dir, Fx::Modify(R::A)),
    (0x9a, I::Oraa, Mode::Dir, Fx::Modify(R::A)),
    (0x9b, I::Adda, Mode::Dir, Fx::Modify(R::A)),
    (0x9c, I::Cpx, Mode::Dir, Fx::Read(R::X)),
    (0x9e, I::Lds, Mode::Dir, Fx::Write(R::S)),
    (0x9f, I::Sts, Mode::Dir, Fx::Read(R::S)),
    (0xa0, I::Suba, Mode::Idx, Fx::Modify(R::A)),
    (0xa1, I::Cmpa, Mode::Idx, Fx::Read(R::A)),
    (0xa2, I::Sbca, Mode::Idx, Fx::Modify(R::A)),
    (0xa4, I::Anda, Mode::Idx, Fx::Modify(R::A)),
    (0xa5, I::Bita, Mode::Idx, Fx::Read(R::A)),
    (0xa6, I::Ldaa, Mode::Idx, Fx::Write(R::A)),
    (0xa7, I::Staa, Mode::Idx, Fx::Read(R::A)),
    (0xa8, I::Eora, Mode::Idx, Fx::Modify(R::A)),
    (0xa9, I::Adca, Mode::Idx, Fx::Modify(R::A)),
    (0xaa, I::Oraa, Mode::Idx, Fx::Modify(R::A)),
    (0xab, I::Adda, Mode::Idx, Fx::Modify(R::A)),
    (0xac, I::Cpx, Mode::Idx, Fx::Read(R::X)),
    (0xad, I::Jsr, Mode::Idx, Fx::None),
    (0xae, I::Lds, Mode::Idx, Fx::Write(R::S)),
    (0xaf, I::Sts, Mode::Idx, Fx::Read(R::S)),
    (0xb0, I::Suba, Mode::Ext, Fx::Modify(R::A)),
    (0xb1, I::Cmpa, Mode::Ext, Fx::Read(R::A)),
    (0xb2, I::Sbca, Mode::Ext, Fx::Modify(R::A)),
    (0xb4, I::Anda, Mode::Ext, Fx::Modify(R::A)),
    (0xb5, I::Bita, Mode::Ext, Fx::Read(R::A)),
    (0xb6, I::Ldaa, Mode::Ext, Fx::Write(R::A)),
    (0xb7, I::Staa, Mode::Ext, Fx::Read(R::A)),
    (0xb8, I::Eora, Mode::Ext, Fx::Modify(R::A)),
    (0xb9, I::Adca, Mode::Ext, Fx::Modify(R::A)),
    (0xba, I::Oraa, Mode::Ext, Fx::Modify(R::A)),
    (0xbb, I::Adda, Mode::Ext, Fx::Modify(R::A)),
    (0xbc, I::Cpx, Mode::Ext, Fx::Read(R::X)),
    (0xbd, I::Jsr, Mode::Ext, Fx::None),
    (0xbe, I::Lds, Mode::Ext, Fx::Write(R::S)),
    (0xbf, I::Sts, Mode::Ext, Fx::Read(R::S)),
    (0xc0, I::Subb, Mode::Imm8, Fx::Modify(R::B)),
    (0xc1, I::Cmpb, Mode::Imm8, Fx::Read(R::B)),
    (0xc2, I::Sbcb, Mode::Imm8, Fx::Modify(R::B)),
    (0xc4, I::Andb, Mode::Imm8, Fx::Modify(R::B)),
    (0xc5, I::Bitb, Mode::Imm8, Fx::Read(R::B)),
    (0xc6, I::Ldab, Mode::Imm8, Fx::Write(R::B)),
    (0xc8, I::Eorb, Mode::Imm8, Fx::Modify(R::B)),
    (0xc9, I::Adcb, Mode::Imm8, Fx::Modify(R::B)),
    (0xca, I::Orab, Mode::Imm8, Fx::Modify(R::B)),
    (0xcb, I::Addb, Mode::Imm8, Fx::Modify(R::B)),
    (0xce, I::Ldx, Mode::Imm16, Fx::Write(R::X)),
    (0xd0, I::Subb, Mode::Dir, Fx::Modify(R::B)),
    (0xd1, I::Cmpb, Mode::Dir, Fx::Read(R::B)),
    (0xd2, I::Sbcb, Mode::Dir, Fx::Modify(R::B)),
    (0xd4, I::Andb, Mode::Dir, Fx::Modify(R::B)),
    (0xd5, I::Bitb, Mode::Dir, Fx::Read(R::B)),
    (0xd6, I::Ldab, Mode::Dir, Fx::Write(R::B)),
    (0xd7, I::Stab, Mode::Dir, Fx::Read(R::B)),
    (0xd8, I::Eorb, Mode::Dir, Fx::Modify(R::B)),
    (0xd9, I::Adcb, Mode::Dir, Fx::Modify(R::B)),
    (0xda, I::Orab, Mode::Dir, Fx::Modify(R::B)),
    (0xdb, I::Addb, Mode::Dir, Fx::Modify(R::B)),
    (0xde, I::Ldx, Mode::Dir, Fx::Write(R::X)),
    (0xdf, I::Stx, Mode::Dir, Fx::Read(R::X)),
    (0xe0, I::Subb, Mode::Idx, Fx::Modify(R::B)),
    (0xe1, I::Cmpb, Mode::Idx, Fx::Read(R::B)),
    (0xe2, I::Sbcb, Mode::Idx, Fx::Modify(R::B)),
    (0xe4, I::Andb, Mode::Idx, Fx::Modify(R::B)),
    (0xe5, I::Bitb, Mode::Idx, Fx::Read(R::B)),
    (0xe6, I::Ldab, Mode::Idx, Fx::Write(R::B)),
    (0xe7, I::Stab, Mode::Idx, Fx::Read(R::B)),
    (0xe8, I::Eorb, Mode::Idx, Fx::Modify(R::B)),
    (0xe9, I::Adcb, Mode::Idx, Fx::Modify(R::B)),
    (0xea, I::Orab, Mode::Idx, Fx::Modify(R::B)),
    (0xeb, I::Addb, Mode::Idx, Fx::Modify(R::B)),
    (0xee, I::Ldx, Mode::Idx, Fx::Write(R::X)),
    (0xef, I::Stx, Mode::Idx, Fx::Read(R::X)),
    (0xf0, I::Subb, Mode::Ext, Fx::Modify(R::B)),
    (0xf1, I::Cmpb, Mode::Ext, Fx::Read(R::B)),
    (0xf2, I::Sbcb, Mode::Ext, Fx::Modify(R::B)),
    (0xf4, I::Andb, Mode::Ext, Fx::Modify(R::B)),
    (0xf5, I::Bitb, Mode::Ext, Fx::Read(R::B)),
    (0xf6, I::Ldab, Mode::Ext, Fx::Write(R::B)),
    (0xf7, I::Stab, Mode::Ext, Fx::Read(R::B)),
    (0xf8, I::Eorb, Mode::Ext, Fx::Modify(R::B)),
    (0xf9, I::Adcb, Mode::Ext, Fx::Modify(R::B)),
    (0xfa, I::Orab, Mode::Ext, Fx::Modify(R::B)),
    (0xfb, I::Addb, Mode::Ext, Fx::Modify(R::B)),
    (0xfe, I::Ldx, Mode::Ext, Fx::Write(R::X)),
    (0xff, I::Stx, Mode::Ext, Fx::Read(R::X)),
];

/// Opcodes the 6801 adds to the 6800.
pub(super) const M6801: &[Entry] = &[
    (0x04, I::Lsrd, Mode::Inh, Fx::Modify(R::D)),
    (0x05, I::Asld, Mode::Inh, Fx::Modify(R::D)),
    (0x21, I::Brn, Mode::Rel8, Fx::None),
    (0x38, I::Pulx, Mode::Inh, Fx::Write(R::X)),
    (0x3a, I::Abx, Mode::Inh, Fx::Modify(R::X)),
    (0x3c, I::Pshx, Mode::Inh, Fx::Read(R::X)),
    (0x3d, I::Mul, Mode::Inh, Fx::Modify(R::D)),
    (0x83, I::Subd, Mode::Imm16, Fx::Modify(R::D)),
    (0x93, I::Subd, Mode::Dir, Fx::Modify(R::D)),
    (0x9d, I::Jsr, Mode::Dir, Fx::None),
    (0xa3, I::Subd, Mode::Idx, Fx::Modify(R::D)),
    (0xb3, I::Subd, Mode::Ext, Fx::Modify(R::D)),
    (0xc3, I::Addd, Mode::Imm16, Fx::Modify(R::D)),
    (0xcc, I::Ldd, Mode::Imm16, Fx::Write(R::D)),
    (0xd3, I::Addd, Mode::Dir, Fx::Modify(R::D)),
    (0xdc, I::Ldd, Mode::Dir, Fx::Write(R::D)),
    (0xdd, I::Std, Mode::Dir, Fx::Read(R::D)),
    (0xe3, I::Addd, Mode::Idx, Fx::Modify(R::D)),
    (0xec, I::Ldd, Mode::Idx, Fx::Write(R::D)),
    (0xed, I::Std, Mode::Idx, Fx::Read(R::D)),
    (0xf3, I::Addd, Mode::Ext, Fx::Modify(R::D)),
    (0xfc, I::Ldd, Mode::Ext, Fx::Write(R::D)),
    (0xfd, I::Std, Mode::Ext, Fx::Read(R::D)),
];

/// Opcodes the Hitachi 6301 adds to the 6801.
pub(super) const HD6301: &[Entry] = &[
    (0x18, I::Xgdx, Mode::Inh, Fx::Modify(R::D)),
    (0x1a, I::Slp, Mode::Inh, Fx::None),
    (0x61, I::Aim, Mode::ImmIdx, Fx::None),
    (0x62, I::Oim, Mode::ImmIdx, Fx::None),
    (0x65, I::Eim, Mode::ImmIdx, Fx::None),
    (0x6b, I::Tim, Mode::ImmIdx, Fx::None),
    (0x71, I::Aim, Mode::ImmDir, Fx::None),
    (0x72, I::Oim, Mode::ImmDir, Fx::None),
    (0x75, I::Eim, Mode::ImmDir, Fx::None),
    (0x7b, I::Tim, Mode::ImmDir, Fx::None),
];

/// Motorola 6809, unprefixed page.
pub(super) const M6809: &[Entry] = &[
    (0x00, I::Neg, Mode::Dir, Fx::None),
    (0x03, I::Com, Mode::Dir, Fx::None),
    (0x04, I::Lsr, Mode::Dir, Fx::None),
    (0x06, I::Ror, Mode::Dir, Fx::None),
    (0x07, I::Asr, Mode::Dir, Fx::None),
    (0x08, I::Asl, Mode::Dir, Fx::None),
    (0x09, I::Rol, Mode::Dir, Fx::None),
    (0x0a, I::Dec, Mode::Dir, Fx::None),
    (0x0c, I::Inc, Mode::Dir, Fx::None),
    (0x0d, I::Tst, Mode::Dir, Fx::None),
    (0x0e, I::Jmp, Mode::Dir, Fx::None),
    (0x0f, I::Clr, Mode::Dir, Fx::None),
    (0x12, I::Nop, Mode::Inh, Fx::None),
    (0x13, I::Sync, Mode::Inh, Fx::None),
    (0x16, I::Lbra, Mode::Rel16, Fx::None),
    (0x17, I::Lbsr, Mode::Rel16, Fx::None),
    (0x19, I::Daa, Mode::Inh, Fx::Modify(R::A)),
    (0x1a, I::Orcc, Mode::Imm8, Fx::Modify(R::Cc)),
    (0x1c, I::Andcc, Mode::Imm8, Fx::Modify(R::Cc)),
    (0x1d, I::Sex, Mode::Inh, Fx::Modify(R::D)),
    (0x1e, I::Exg, Mode::Pair, Fx::None),
    (0x1f, I::Tfr, Mode::Pair, Fx::None),
    (0x20, I::Bra, Mode::Rel8, Fx::None),
    (0x21, I::Brn, Mode::Rel8, Fx::None),
    (0x22, I::Bhi, Mode::Rel8, Fx::None),
    (0x23, I::Bls, Mode::Rel8, Fx::None),
    (0x24, I::Bcc, Mode::Rel8, Fx::None),
    (0x25, I::Bcs, Mode::Rel8, Fx::None),
    (0x26, I::Bne, Mode::Rel8, Fx::None),
    (0x27, I::Beq, Mode::Rel8, Fx::None),
    (0x28, I::Bvc, Mode::Rel8, Fx::None),
    (0x29, I::Bvs, Mode::Rel8, Fx::None),
    (0x2a, I::Bpl, Mode::Rel8, Fx::None),
    (0x2b, I::Bmi, Mode::Rel8, Fx::None),
    (0x2c, I::Bge, Mode::Rel8, Fx::None),
    (0x2d, I::Blt, Mode::Rel8, Fx::None),
    (0x2e, I::Bgt, Mode::Rel8, Fx::None),
    (0x2f, I::Ble, Mode::Rel8, Fx::None),
    (0x30, I::Leax, Mode::Idx, Fx::Write(R::X)),
    (0x31, I::Leay, Mode::Idx, Fx::Write(R::Y)),
    (0x32, I::Leas, Mode::Idx, Fx::Write(R::S)),
    (0x33, I::Leau, Mode::Idx, Fx::Write(R::U)),
    (0x34, I::Pshs, Mode::List(R::U), Fx::Modify(R::S)),
    (0x35, I::Puls, Mode::List(R::U), Fx::Modify(R::S)),
    (0x36, I::Pshu, Mode::List(R::S), Fx::Modify(R::U)),
    (0x37, I::Pulu, Mode::List(R::S), Fx::Modify(R::U)),
    (0x39, I::Rts, Mode::Inh, Fx::None),
    (0x3a, I::Abx, Mode::Inh, Fx::Modify(R::X)),
    (0x3b, I::Rti, Mode::Inh, Fx::None),
    (0x3c, I::Cwai, Mode::Imm8, Fx::Modify(R::Cc)),
    (0x3d, I::Mul, Mode::Inh, Fx::Modify(R::D)),
    (0x3f, I::Swi, Mode::Inh, Fx::None),
    (0x40, I::Nega, Mode::Inh, Fx::Modify(R::A)),
    (0x43, I::Coma, Mode::Inh, Fx::Modify(R::A)),
    (0x44, I::Lsra, Mode::Inh, Fx::Modify(R::A)),
    (0x46, I::Rora, Mode::Inh, Fx::Modify(R::A)),
    (0x47, I::Asra, Mode::Inh, Fx::Modify(R::A)),
    (0x48, I::Asla, Mode::Inh, Fx::Modify(R::A)),
    (0x49, I::Rola, Mode::Inh, Fx::Modify(R::A)),
    (0x4a, I::Deca, Mode::Inh, Fx::Modify(R::A)),
    (0x4c, I::Inca, Mode::Inh, Fx::Modify(R::A)),
    (0x4d, I::Tsta, Mode::Inh, Fx::Read(R::A)),
    (0x4f, I::Clra, Mode::Inh, Fx::Write(R::A)),
    (0x50, I::Negb, Mode::Inh, Fx::Modify(R::B)),
    (0x53, I::Comb, Mode::Inh, Fx::Modify(R::B)),
    (0x54, I::Lsrb, Mode::Inh, Fx::Modify(R::B)),
    (0x56, I::Rorb, Mode::Inh, Fx::Modify(R::B)),
    (0x57, I::Asrb, Mode::Inh, Fx::Modify(R::B)),
    (0x58, I::Aslb, Mode::Inh, Fx::Modify(R::B)),
    (0x59, I::Rolb, Mode::Inh, Fx::Modify(R::B)),
    (0x5a, I::Decb, Mode::Inh, Fx::Modify(R::B)),
    (0x5c, I::Incb, Mode::Inh, Fx::Modify(R::B)),
    (0x5d, I::Tstb, Mode::Inh, Fx::Read(R::B)),
    (0x5f, I::Clrb, Mode::Inh, Fx::Write(R::B)),
    (0x60, I::Neg, Mode::Idx, Fx::None),
    (0x63, I::Com, Mode::Idx, Fx::None),
    (0x64, I::Lsr, Mode::Idx, Fx::None),
    (0x66, I::Ror, Mode::Idx, Fx::None),
    (0x67, I::Asr, Mode::Idx, Fx::None),
    (0x68, I::Asl, Mode::Idx, Fx::None),
    (0x69, I::Rol, Mode::Idx, Fx::None),
    (0x6a, I::Dec, Mode::Idx, Fx::None),
    (0x6c, I::Inc, Mode::Idx, Fx::None),
    (0x6d, I::Tst, Mode::Idx, Fx::None),
    (0x6e, I::Jmp, Mode::Idx, Fx::None),
    (0x6f, I::Clr, Mode::Idx, Fx::None),
    (0x70, I::Neg, Mode::Ext, Fx::None),
    (0x73, I::Com, Mode::Ext, Fx::None),
    (0x74, I::Lsr, Mode::Ext, Fx::None),
    (0x76, I::Ror, Mode::Ext, Fx::None),
    (0x77, I::Asr, Mode::Ext, Fx::None),
    (0x78, I::Asl, Mode::Ext, Fx::None),
    (0x79, I::Rol, Mode::Ext, Fx::None),
    (0x7a, I::Dec, Mode::Ext, Fx::None),
    (0x7c, I::Inc, Mode::Ext, Fx::None),
    (0x7d, I::Tst, Mode::Ext, Fx::None),
    (0x7e, I::Jmp, Mode::Ext, Fx::None),
    (0x7f, I::Clr, Mode::Ext, Fx::None),
    (0x80, I::Suba, Mode::Imm8, Fx::Modify(R::A)),
    (0x81, I::Cmpa, Mode::Imm8, Fx::Read(R::A)),
    (0x82, I::Sbca, Mode::Imm8, Fx::Modify(R::A)),
    (0x83, I::Subd, Mode::Imm16, Fx::Modify(R::D)),
    (0x84, I::Anda, Mode::Imm8, Fx::Modify(R::A)),
    (0x85, I::Bita, Mode::Imm8, Fx::Read(R::A)),
    (0x86, I::Lda, Mode::Imm8, Fx::Write(R::A)),
    (0x88, I::Eora, Mode::Imm8, Fx::Modify(R::A)),
    (0x89, I::Adca, Mode::Imm8, Fx::Modify(R::A)),
    (0x8a, I::Ora, Mode::Imm8, Fx::Modify(R::A)),
    (0x8b, I::Adda, Mode::Imm8, Fx::Modify(R::A)),
    (0x8c, I::Cmpx, Mode::Imm16, Fx::Read(R::X)),
    (0x8d, I::Bsr, Mode::Rel8, Fx::None),
    (0x8e, I::Ldx, Mode::Imm16, Fx::Write(R::X)),
    (0x90, I::Suba, Mode::Dir, Fx::Modify(R::A)),
    (0x91, I::Cmpa, Mode::Dir, Fx::Read(R::A)),
    (0x92, I::Sbca, Mode::Dir, Fx::Modify(R::A)),
    (0x93, I::Subd, Mode::Dir, Fx::Modify(R::D)),
    (0x94, I::Anda, Mode::Dir, Fx::Modify(R::A)),
    (0x95, I::Bita, Mode::Dir, Fx::Read(R::A)),
    (0x96, I::Lda, Mode::Dir, Fx::Write(R::A)),
    (0x97, I::Sta, Mode::Dir, Fx::Read(R::A)),
    (0x98, I::Eora, Mode::Dir, Fx::Modify(R::A)),
    (0x99, I::Adca, Mode::Dir, Fx::Modify(R::A)),
    (0x9a, I::Ora, Mode::Dir, Fx::Modify(R::A)),
    (0x9b, I::Adda, Mode::Dir, Fx::Modify(R::A)),
    (0x9c, I::Cmpx, Mode::Dir, Fx::Read(R::X)),
    (0x9d, I::Jsr, Mode::Dir, Fx::None),
    (0x9e, I::Ldx, Mode::Dir, Fx::Write(R::X)),
    (0x9f, I::Stx, Mode::Dir, Fx::Read(R::X)),
    (0xa0, I::Suba, Mode::Idx, Fx::Modify(R::A)),
    (0xa1, I::Cmpa, Mode::Idx, Fx::Read(R::A)),
    (0xa2, I::Sbca, Mode::Idx, Fx::Modify(R::A)),
    (0xa3, I::Subd, Mode::Idx, Fx::Modify(R::D)),
    (0xa4, I::Anda, Mode::Idx, Fx::Modify(R::A)),
    (0xa5, I::Bita, Mode::Idx, Fx::Read(R::A)),
    (0xa6, I::Lda, Mode::Idx, Fx::Write(R::A)),
    (0xa7, I::Sta, Mode::Idx, Fx::Read(R::A)),
    (0xa8, I::Eora, Mode::Idx, Fx::Modify(R::A)),
    (0xa9, I::Adca, Mode::Idx, Fx::Modify(R::A)),
    (0xaa, I::Ora, Mode::Idx, Fx::Modify(R::A)),
    (0xab, I::Adda, Mode::Idx, Fx::Modify(R::A)),
    (0xac, I::Cmpx, Mode::Idx, Fx::Read(R::X)),
    (0xad, I::Jsr, Mode::Idx, Fx::None),
    (0xae, I::Ldx, Mode::Idx, Fx::Write(R::X)),
    (0xaf, I::Stx, Mode::Idx, Fx::Read(R::X)),
    (0xb0, I::Suba, Mode::Ext, Fx::Modify(R::A)),
    (0xb1, I::Cmpa, Mode::Ext, Fx::Read(R::A)),
    (0xb2, I::Sbca, Mode::Ext, Fx::Modify(R::A)),
    (0xb3, I::Subd, Mode::Ext, Fx::Modify(R::D)),
    (0xb4, I::Anda, Mode::Ext, Fx::Modify(R::A)),
    (0xb5, I::Bita, Mode::Ext, Fx::Read(R::A)),
    (0xb6, I::Lda, Mode::Ext, Fx::Write(R::A)),
    (0xb7, I::Sta, Mode::Ext, Fx::Read(R::A)),
    (0xb8, I::Eora, Mode::Ext, Fx::Modify(R::A)),
    (0xb9, I::Adca, Mode::Ext, Fx::Modify(R::A)),
    (0xba, I::Ora, Mode::Ext, Fx::Modify(R::A)),
    (0xbb, I::Adda, Mode::Ext, Fx::Modify(R::A)),
    (0xbc, I::Cmpx, Mode::Ext, Fx::Read(R::X)),
    (0xbd, I::Jsr, Mode::Ext, Fx::None),
    (0xbe, I::Ldx, Mode::Ext, Fx::Write(R::X)),
    (0xbf, I::Stx, Mode::Ext, Fx::Read(R::X)),
    (0xc0, I::Subb, Mode::Imm8, Fx::Modify(R::B)),
    (0xc1, I::Cmpb, Mode::Imm8, Fx::Read(R::B)),
    (0xc2, I::Sbcb, Mode::Imm8, Fx::Modify(R::B)),
    (0xc3, I::Addd, Mode::Imm16, Fx::Modify(R::D)),
    (0xc4, I::Andb, Mode::Imm8, Fx::Modify(R::B)),
    (0xc5, I::Bitb, Mode::Imm8, Fx::Read(R::B)),
    (0xc6, I::Ldb, Mode::Imm8, Fx::Write(R::B)),
    (0xc8, I::Eorb, Mode::Imm8, Fx::Modify(R::B)),
    (0xc9, I::Adcb, Mode::Imm8, Fx::Modify(R::B)),
    (0xca, I::Orb, Mode::Imm8, Fx::Modify(R::B)),
    (0xcb, I::Addb, Mode::Imm8, Fx::Modify(R::B)),
    (0xcc, I::Ldd, Mode::Imm16, Fx::Write(R::D)),
    (0xce, I::Ldu, Mode::Imm16, Fx::Write(R::U)),
    (0xd0, I::Subb, Mode::Dir, Fx::Modify(R::B)),
    (0xd1, I::Cmpb, Mode::Dir, Fx::Read(R::B)),
    (0xd2, I::Sbcb, Mode::Dir, Fx::Modify(R::B)),
    (0xd3, I::Addd, Mode::Dir, Fx::Modify(R::D)),
    (0xd4, I::Andb, Mode::Dir, Fx::Modify(R::B)),
    (0xd5, I::Bitb, Mode::Dir, Fx::Read(R::B)),
    (0xd6, I::Ldb, Mode::Dir, Fx::Write(R::B)),
    (0xd7, I::Stb, Mode::Dir, Fx::Read(R::B)),
    (0xd8, I::Eorb, Mode::Dir, Fx::Modify(R::B)),
    (0xd9, I::Adcb, Mode::Dir, Fx::Modify(R::B)),
    (0xda, I::Orb, Mode::Dir, Fx::Modify(R::B)),
    (0xdb, I::Addb, Mode::Dir, Fx::Modify(R::B)),
    (0xdc, I::Ldd, Mode::Dir, Fx::Write(R::D)),
    (0xdd, I::Std, Mode::Dir, Fx::Read(R::D)),
    (0xde, I::Ldu, Mode::Dir, Fx::Write(R::U)),
    (0xdf, I::Stu, Mode::Dir, Fx::Read(R::U)),
    (0xe0, I::Subb, Mode::Idx, Fx::Modify(R::B)),
    (0xe1, I::Cmpb, Mode::Idx, Fx::Read(R::B)),
    (0xe2, I::Sbcb, Mode::Idx, Fx::Modify(R::B)),
    (0xe3, I::Addd, Mode::Idx, Fx::Modify(R::D)),
    (0xe4, I::Andb, Mode::Idx, Fx::Modify(R::B)),
    (0xe5, I::Bitb, Mode::Idx, Fx::Read(R::B)),
    (0xe6, I::Ldb, Mode::Idx, Fx::Write(R::B)),
    (0xe7, I::Stb, Mode::Idx, Fx::Read(R::B)),
    (0xe8, I::Eorb, Mode::Idx, Fx::Modify(R::B)),
    (0xe9, I::Adcb, Mode::Idx, Fx::Modify(R::B)),
    (0xea, I::Orb, Mode::Idx, Fx::Modify(R::B)),
    (0xeb, I::Addb, Mode::Idx, Fx::Modify(R::B)),
    (0xec, I::Ldd, Mode::Idx, Fx::Write(R::D)),
    (0xed, I::Std, Mode::Idx, Fx::Read(R::D)),
    (0xee, I::Ldu, Mode::Idx, Fx::Write(R::U)),
    (0xef, I::Stu, Mode::Idx, Fx::Read(R::U)),
    (0xf0, I::Subb, Mode::Ext, Fx::Modify(R::B)),
    (0xf1, I::Cmpb, Mode::Ext, Fx::Read(R::B)),
    (0xf2, I::Sbcb, Mode::Ext, Fx::Modify(R::B)),
    (0xf3, I::Addd, Mode::Ext, Fx::Modify(R::D)),
    (0xf4, I::Andb, Mode::Ext, Fx::Modify(R::B)),
    (0xf5, I::Bitb, Mode::Ext, Fx::Read(R::B)),
    (0xf6, I::Ldb, Mode::Ext, Fx::Write(R::B)),
    (0xf7, I::Stb, Mode::Ext, Fx::Read(R::B)),
    (0xf8, I::Eorb, Mode::Ext, Fx::Modify(R::B)),
    (0xf9, I::Adcb, Mode::Ext, Fx::Modify(R::B)),
    (0xfa, I::Orb, Mode::Ext, Fx::Modify(R::B)),
    (0xfb, I::Addb, Mode::Ext, Fx::Modify(R::B)),
    (0xfc, I::Ldd, Mode::Ext, Fx::Write(R::D)),
    (0xfd, I::Std, Mode::Ext, Fx::Read(R::D)),
    (0xfe, I::Ldu, Mode::Ext, Fx::Write(R::U)),
    (0xff, I::Stu, Mode::Ext, Fx::Read(R::U)),
];

/// 6809 page selected by a `0x10` prefix.
pub(super) const M6809_PAGE2: &[Entry] = &[
    (0x21, I::Lbrn, Mode::Rel16, Fx::None),
    (0x22, I::Lbhi, Mode::Rel16, Fx::None),
    (0x23, I::Lbls, Mode::Rel16, Fx::None),
    (0x24, I::Lbcc, Mode::Rel16, Fx::None),
    (0x25, I::Lbcs, Mode::Rel16, Fx::None),
    (0x26, I::Lbne, Mode::Rel16, Fx::None),
    (0x27, I::Lbeq, Mode::Rel16, Fx::None),
    (0x28, I::Lbvc, Mode::Rel16, Fx::None),
    (0x29, I::Lbvs, Mode::Rel16, Fx::None),
    (0x2a, I::Lbpl, Mode::Rel16, Fx::None),
    (0x2b, I::Lbmi, Mode::Rel16, Fx::None),
    (0x2c, I::Lbge, Mode::Rel16, Fx::None),
    (0x2d, I::Lblt, Mode::Rel16, Fx::None),
    (0x2e, I::Lbgt, Mode::Rel16, Fx::None),
    (0x2f, I::Lble, Mode::Rel16, Fx::None),
    (0x3f, I::Swi2, Mode::Inh, Fx::None),
    (0x83, I::Cmpd, Mode::Imm16, Fx::Read(R::D)),
    (0x8c, I::Cmpy, Mode::Imm16, Fx::Read(R::Y)),
    (0x8e, I::Ldy, Mode::Imm16, Fx::Write(R::Y)),
    (0x93, I::Cmpd, Mode::Dir, Fx::Read(R::D)),
    (0x9c, I::Cmpy, Mode::Dir, Fx::Read(R::Y)),
    (0x9e, I::Ldy, Mode::Dir, Fx::Write(R::Y)),
    (0x9f, I::Sty, Mode::Dir, Fx::Read(R::Y)),
    (0xa3, I::Cmpd, Mode::Idx, Fx::Read(R::D)),
    (0xac, I::Cmpy, Mode::Idx, Fx::Read(R::Y)),
    (0xae, I::Ldy, Mode::Idx, Fx::Write(R::Y)),
    (0xaf, I::Sty, Mode::Idx, Fx::Read(R::Y)),
    (0xb3, I::Cmpd, Mode::Ext, Fx::Read(R::D)),
    (0xbc, I::Cmpy, Mode::Ext, Fx::Read(R::Y)),
    (0xbe, I::Ldy, Mode::Ext, Fx::Write(R::Y)),
    (0xbf, I::Sty, Mode::Ext, Fx::Read(R::Y)),
    (0xce, I::Lds, Mode::Imm16, Fx::Write(R::S)),
    (0xde, I::Lds, Mode::Dir, Fx::Write(R::S)),
    (0xdf, I::Sts, Mode::Dir, Fx::Read(R::S)),
    (0xee, I::Lds, Mode::Idx, Fx::Write(R::S)),
    (0xef, I::Sts, Mode::Idx, Fx::Read(R::S)),
    (0xfe, I::Lds, Mode::Ext, Fx::Write(R::S)),
    (0xff, I::Sts, Mode::Ext, Fx::Read(R::S)),
];

/// 6809 page selected by a `0x11` prefix.
pub(super) const M6809_PAGE3: &[Entry] = &[
    (0x3f, I::Swi3, Mode::Inh, Fx::None),
    (0x83, I::Cmpu, Mode::Imm16, Fx::Read(R::U)),
    (0x8c, I::Cmps, Mode::Imm16, Fx::Read(R::S)),
    (0x93, I::Cmpu, Mode::Dir, Fx::Read(R::U)),
    (0x9c, I::Cmps, Mode::Dir, Fx::Read(R::S)),
    (0xa3, I::Cmpu, Mode::Idx, Fx::Read(R::U)),
    (0xac, I::Cmps, Mode::Idx, Fx::Read(R::S)),
    (0xb3, I::Cmpu, Mode::Ext, Fx::Read(R::U)),
    (0xbc, I::Cmps, Mode::Ext, Fx::Read(R::S)),
];
