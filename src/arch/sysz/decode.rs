//! SystemZ instruction formats.
//!
//! The instruction is packed big-endian into the top of a 48-bit value so every format
//! reads its fields from fixed bit positions regardless of its 2, 4 or 6 byte length.

use super::{Decoded, Op, SysZCc, SysZGroup, SysZInsn as I};
use crate::arch::sign_extend;
use crate::decoder::DecodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum File {
    Gpr,
    Fpr,
    Acr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Form {
    /// `r1, r2`
    Rr,
    /// `r1, d2(x2, b2)`
    Rx,
    /// `r1, r3, d2(b2)`
    Rs,
    /// `r1, d2(b2)` (shifts)
    RsShift,
    /// `d1(b1), i2`
    Si,
    /// `d1(l, b1), d2(b2)`
    Ss,
    /// `r1, i2` signed 16 or 32 bit
    RiSigned,
    /// `r1, i2` unsigned 16 or 32 bit
    RiUnsigned,
    /// `r1, target` halfword-scaled pc-relative
    RiRelative,
}

/// One-byte opcodes (RR, RX, RS, SI, SS).
const SHORT: &[(u8, I, Form, File)] = &[
    (0x05, I::Balr, Form::Rr, File::Gpr),
    (0x06, I::Bctr, Form::Rr, File::Gpr),
    (0x0d, I::Basr, Form::Rr, File::Gpr),
    (0x10, I::Lpr, Form::Rr, File::Gpr),
    (0x11, I::Lnr, Form::Rr, File::Gpr),
    (0x12, I::Ltr, Form::Rr, File::Gpr),
    (0x13, I::Lcr, Form::Rr, File::Gpr),
    (0x14, I::Nr, Form::Rr, File::Gpr),
    (0x15, I::Clr, Form::Rr, File::Gpr),
    (0x16, I::Or, Form::Rr, File::Gpr),
    (0x17, I::Xr, Form::Rr, File::Gpr),
    (0x18, I::Lr, Form::Rr, File::Gpr),
    (0x19, I::Cr, Form::Rr, File::Gpr),
    (0x1a, I::Ar, Form::Rr, File::Gpr),
    (0x1b, I::Sr, Form::Rr, File::Gpr),
    (0x1c, I::Mr, Form::Rr, File::Gpr),
    (0x1d, I::Dr, Form::Rr, File::Gpr),
    (0x1e, I::Alr, Form::Rr, File::Gpr),
    (0x1f, I::Slr, Form::Rr, File::Gpr),
    (0x28, I::Ldr, Form::Rr, File::Fpr),
    (0x38, I::Ler, Form::Rr, File::Fpr),
    (0x40, I::Sth, Form::Rx, File::Gpr),
    (0x41, I::La, Form::Rx, File::Gpr),
    (0x42, I::Stc, Form::Rx, File::Gpr),
    (0x43, I::Ic, Form::Rx, File::Gpr),
    (0x44, I::Ex, Form::Rx, File::Gpr),
    (0x45, I::Bal, Form::Rx, File::Gpr),
    (0x46, I::Bct, Form::Rx, File::Gpr),
    (0x48, I::Lh, Form::Rx, File::Gpr),
    (0x49, I::Ch, Form::Rx, File::Gpr),
    (0x4a, I::Ah, Form::Rx, File::Gpr),
    (0x4b, I::Sh, Form::Rx, File::Gpr),
    (0x4c, I::Mh, Form::Rx, File::Gpr),
    (0x4d, I::Bas, Form::Rx, File::Gpr),
    (0x50, I::St, Form::Rx, File::Gpr),
    (0x54, I::N, Form::Rx, File::Gpr),
    (0x55, I::Cl, Form::Rx, File::Gpr),
    (0x56, I::O, Form::Rx, File::Gpr),
    (0x57, I::X, Form::Rx, File::Gpr),
    (0x58, I::L, Form::Rx, File::Gpr),
    (0x59, I::C, Form::Rx, File::Gpr),
    (0x5a, I::A, Form::Rx, File::Gpr),
    (0x5b, I::S, Form::Rx, File::Gpr),
    (0x5c, I::M, Form::Rx, File::Gpr),
    (0x5d, I::D, Form::Rx, File::Gpr),
    (0x5e, I::Al, Form::Rx, File::Gpr),
    (0x5f, I::Sl, Form::Rx, File::Gpr),
    (0x60, I::Std, Form::Rx, File::Fpr),
    (0x68, I::Ld, Form::Rx, File::Fpr),
    (0x70, I::Ste, Form::Rx, File::Fpr),
    (0x78, I::Le, Form::Rx, File::Fpr),
    (0x86, I::Bxh, Form::Rs, File::Gpr),
    (0x87, I::Bxle, Form::Rs, File::Gpr),
    (0x88, I::Srl, Form::RsShift, File::Gpr),
    (0x89, I::Sll, Form::RsShift, File::Gpr),
    (0x8a, I::Sra, Form::RsShift, File::Gpr),
    (0x8b, I::Sla, Form::RsShift, File::Gpr),
    (0x8c, I::Srdl, Form::RsShift, File::Gpr),
    (0x8d, I::Sldl, Form::RsShift, File::Gpr),
    (0x8e, I::Srda, Form::RsShift, File::Gpr),
    (0x8f, I::Slda, Form::RsShift, File::Gpr),
    (0x90, I::Stm, Form::Rs, File::Gpr),
    (0x91, I::Tm, Form::Si, File::Gpr),
    (0x92, I::Mvi, Form::Si, File::Gpr),
    (0x94, I::Ni, Form::Si, File::Gpr),
    (0x95, I::Cli, Form::Si, File::Gpr),
    (0x96, I::Oi, Form::Si, File::Gpr),
    (0x97, I::Xi, Form::Si, File::Gpr),
    (0x98, I::Lm, Form::Rs, File::Gpr),
    (0xba, I::Cs, Form::Rs, File::Gpr),
    (0xd2, I::Mvc, Form::Ss, File::Gpr),
    (0xd4, I::Nc, Form::Ss, File::Gpr),
    (0xd5, I::Clc, Form::Ss, File::Gpr),
    (0xd6, I::Oc, Form::Ss, File::Gpr),
    (0xd7, I::Xc, Form::Ss, File::Gpr),
];

/// RI (`a5`/`a7`) and RIL (`c0`/`c2`) opcodes keyed by first byte and the 4-bit extension.
const IMMEDIATE: &[(u8, u8, I, Form)] = &[
    (0xa7, 0x0, I::Tmlh, Form::RiUnsigned),
    (0xa7, 0x1, I::Tmll, Form::RiUnsigned),
    (0xa7, 0x5, I::Bras, Form::RiRelative),
    (0xa7, 0x6, I::Brct, Form::RiRelative),
    (0xa7, 0x7, I::Brctg, Form::RiRelative),
    (0xa7, 0x8, I::Lhi, Form::RiSigned),
    (0xa7, 0x9, I::Lghi, Form::RiSigned),
    (0xa7, 0xa, I::Ahi, Form::RiSigned),
    (0xa7, 0xb, I::Aghi, Form::RiSigned),
    (0xa7, 0xc, I::Mhi, Form::RiSigned),
    (0xa7, 0xd, I::Mghi, Form::RiSigned),
    (0xa7, 0xe, I::Chi, Form::RiSigned),
    (0xa7, 0xf, I::Cghi, Form::RiSigned),
    (0xa5, 0x0, I::Iihh, Form::RiUnsigned),
    (0xa5, 0x1, I::Iihl, Form::RiUnsigned),
    (0xa5, 0x2, I::Iilh, Form::RiUnsigned),
    (0xa5, 0x3, I::Iill, Form::RiUnsigned),
    (0xa5, 0x4, I::Nihh, Form::RiUnsigned),
    (0xa5, 0x5, I::Nihl, Form::RiUnsigned),
    (0xa5, 0x6, I::Nilh, Form::RiUnsigned),
    (0xa5, 0x7, I::Nill, Form::RiUnsigned),
    (0xa5, 0x8, I::Oihh, Form::RiUnsigned),
    (0xa5, 0x9, I::Oihl, Form::RiUnsigned),
    (0xa5, 0xa, I::Oilh, Form::RiUnsigned),
    (0xa5, 0xb, I::Oill, Form::RiUnsigned),
    (0xa5, 0xc, I::Llihh, Form::RiUnsigned),
    (0xa5, 0xd, I::Llihl, Form::RiUnsigned),
    (0xa5, 0xe, I::Llilh, Form::RiUnsigned),
    (0xa5, 0xf, I::Llill, Form::RiUnsigned),
    (0xc0, 0x0, I::Larl, Form::RiRelative),
    (0xc0, 0x1, I::Lgfi, Form::RiSigned),
    (0xc0, 0x5, I::Brasl, Form::RiRelative),
    (0xc0, 0x6, I::Xihf, Form::RiUnsigned),
    (0xc0, 0x7, I::Xilf, Form::RiUnsigned),
    (0xc0, 0x8, I::Iihf, Form::RiUnsigned),
    (0xc0, 0x9, I::Iilf, Form::RiUnsigned),
    (0xc0, 0xa, I::Nihf, Form::RiUnsigned),
    (0xc0, 0xb, I::Nilf, Form::RiUnsigned),
    (0xc0, 0xc, I::Oihf, Form::RiUnsigned),
    (0xc0, 0xd, I::Oilf, Form::RiUnsigned),
    (0xc0, 0xe, I::Llihf, Form::RiUnsigned),
    (0xc0, 0xf, I::Llilf, Form::RiUnsigned),
    (0xc2, 0x0, I::Msgfi, Form::RiSigned),
    (0xc2, 0x1, I::Msfi, Form::RiSigned),
    (0xc2, 0x4, I::Slgfi, Form::RiUnsigned),
    (0xc2, 0x5, I::Slfi, Form::RiUnsigned),
    (0xc2, 0x8, I::Agfi, Form::RiSigned),
    (0xc2, 0x9, I::Afi, Form::RiSigned),
    (0xc2, 0xa, I::Algfi, Form::RiUnsigned),
    (0xc2, 0xb, I::Alfi, Form::RiUnsigned),
    (0xc2, 0xc, I::Cgfi, Form::RiSigned),
    (0xc2, 0xd, I::Cfi, Form::RiSigned),
    (0xc2, 0xe, I::Clgfi, Form::RiUnsigned),
    (0xc2, 0xf, I::Clfi, Form::RiUnsigned),
];

/// Register-register opcodes with a 16-bit opcode (RRE).
const RRE: &[(u16, I, File, File)] = &[
    (0xb24e, I::Sar, File::Acr, File::Gpr),
    (0xb24f, I::Ear, File::Gpr, File::Acr),
    (0xb304, I::Ldebr, File::Fpr, File::Fpr),
    (0xb309, I::Cebr, File::Fpr, File::Fpr),
    (0xb30a, I::Aebr, File::Fpr, File::Fpr),
    (0xb30b, I::Sebr, File::Fpr, File::Fpr),
    (0xb30d, I::Debr, File::Fpr, File::Fpr),
    (0xb317, I::Meebr, File::Fpr, File::Fpr),
    (0xb319, I::Cdbr, File::Fpr, File::Fpr),
    (0xb31a, I::Adbr, File::Fpr, File::Fpr),
    (0xb31b, I::Sdbr, File::Fpr, File::Fpr),
    (0xb31c, I::Mdbr, File::Fpr, File::Fpr),
    (0xb31d, I::Ddbr, File::Fpr, File::Fpr),
    (0xb344, I::Ledbr, File::Fpr, File::Fpr),
    (0xb394, I::Cefbr, File::Fpr, File::Gpr),
    (0xb395, I::Cdfbr, File::Fpr, File::Gpr),
    (0xb3a4, I::Cegbr, File::Fpr, File::Gpr),
    (0xb3a5, I::Cdgbr, File::Fpr, File::Gpr),
    (0xb900, I::Lpgr, File::Gpr, File::Gpr),
    (0xb902, I::Ltgr, File::Gpr, File::Gpr),
    (0xb903, I::Lcgr, File::Gpr, File::Gpr),
    (0xb904, I::Lgr, File::Gpr, File::Gpr),
    (0xb908, I::Agr, File::Gpr, File::Gpr),
    (0xb909, I::Sgr, File::Gpr, File::Gpr),
    (0xb90a, I::Algr, File::Gpr, File::Gpr),
    (0xb90b, I::Slgr, File::Gpr, File::Gpr),
    (0xb90c, I::Msgr, File::Gpr, File::Gpr),
    (0xb90d, I::Dsgr, File::Gpr, File::Gpr),
    (0xb90f, I::Lrvgr, File::Gpr, File::Gpr),
    (0xb912, I::Ltgfr, File::Gpr, File::Gpr),
    (0xb914, I::Lgfr, File::Gpr, File::Gpr),
    (0xb916, I::Llgfr, File::Gpr, File::Gpr),
    (0xb918, I::Agfr, File::Gpr, File::Gpr),
    (0xb91f, I::Lrvr, File::Gpr, File::Gpr),
    (0xb920, I::Cgr, File::Gpr, File::Gpr),
    (0xb921, I::Clgr, File::Gpr, File::Gpr),
    (0xb930, I::Cgfr, File::Gpr, File::Gpr),
    (0xb946, I::Bctgr, File::Gpr, File::Gpr),
    (0xb980, I::Ngr, File::Gpr, File::Gpr),
    (0xb981, I::Ogr, File::Gpr, File::Gpr),
    (0xb982, I::Xgr, File::Gpr, File::Gpr),
    (0xb986, I::Mlgr, File::Gpr, File::Gpr),
    (0xb987, I::Dlgr, File::Gpr, File::Gpr),
];

/// Three-register distinct-operands forms (RRF-a): `r1, r2, r3`.
const DISTINCT: &[(u16, I)] = &[
    (0xb9e8, I::Agrk),
    (0xb9e9, I::Sgrk),
    (0xb9f4, I::Nrk),
    (0xb9f6, I::Ork),
    (0xb9f7, I::Xrk),
    (0xb9f8, I::Ark),
    (0xb9f9, I::Srk),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Long {
    /// RXY/RXE `r1, d2(x2, b2)`
    Indexed(File),
    /// RSY `r1, r3, d2(b2)`
    Pair,
    /// RSY shift `r1, r3, d2(b2)` where d2 is the count
    Shift,
    /// SIY `d1(b1), i2`
    Storage,
}

/// Six-byte opcodes keyed by first and last byte.
const LONG: &[(u8, u8, I, Long)] = &[
    (0xe3, 0x02, I::Ltg, Long::Indexed(File::Gpr)),
    (0xe3, 0x04, I::Lg, Long::Indexed(File::Gpr)),
    (0xe3, 0x08, I::Ag, Long::Indexed(File::Gpr)),
    (0xe3, 0x09, I::Sg, Long::Indexed(File::Gpr)),
    (0xe3, 0x0a, I::Alg, Long::Indexed(File::Gpr)),
    (0xe3, 0x0b, I::Slg, Long::Indexed(File::Gpr)),
    (0xe3, 0x0c, I::Msg, Long::Indexed(File::Gpr)),
    (0xe3, 0x0d, I::Dsg, Long::Indexed(File::Gpr)),
    (0xe3, 0x0f, I::Lrvg, Long::Indexed(File::Gpr)),
    (0xe3, 0x12, I::Lt, Long::Indexed(File::Gpr)),
    (0xe3, 0x14, I::Lgf, Long::Indexed(File::Gpr)),
    (0xe3, 0x15, I::Lgh, Long::Indexed(File::Gpr)),
    (0xe3, 0x16, I::Llgf, Long::Indexed(File::Gpr)),
    (0xe3, 0x1e, I::Lrv, Long::Indexed(File::Gpr)),
    (0xe3, 0x20, I::Cg, Long::Indexed(File::Gpr)),
    (0xe3, 0x21, I::Clg, Long::Indexed(File::Gpr)),
    (0xe3, 0x24, I::Stg, Long::Indexed(File::Gpr)),
    (0xe3, 0x2f, I::Strvg, Long::Indexed(File::Gpr)),
    (0xe3, 0x3e, I::Strv, Long::Indexed(File::Gpr)),
    (0xe3, 0x50, I::Sty, Long::Indexed(File::Gpr)),
    (0xe3, 0x54, I::Ny, Long::Indexed(File::Gpr)),
    (0xe3, 0x55, I::Cly, Long::Indexed(File::Gpr)),
    (0xe3, 0x56, I::Oy, Long::Indexed(File::Gpr)),
    (0xe3, 0x57, I::Xy, Long::Indexed(File::Gpr)),
    (0xe3, 0x58, I::Ly, Long::Indexed(File::Gpr)),
    (0xe3, 0x59, I::Cy, Long::Indexed(File::Gpr)),
    (0xe3, 0x5a, I::Ay, Long::Indexed(File::Gpr)),
    (0xe3, 0x5b, I::Sy, Long::Indexed(File::Gpr)),
    (0xe3, 0x70, I::Sthy, Long::Indexed(File::Gpr)),
    (0xe3, 0x71, I::Lay, Long::Indexed(File::Gpr)),
    (0xe3, 0x72, I::Stcy, Long::Indexed(File::Gpr)),
    (0xe3, 0x73, I::Icy, Long::Indexed(File::Gpr)),
    (0xe3, 0x76, I::Lb, Long::Indexed(File::Gpr)),
    (0xe3, 0x77, I::Lgb, Long::Indexed(File::Gpr)),
    (0xe3, 0x78, I::Lhy, Long::Indexed(File::Gpr)),
    (0xe3, 0x80, I::Ng, Long::Indexed(File::Gpr)),
    (0xe3, 0x81, I::Og, Long::Indexed(File::Gpr)),
    (0xe3, 0x82, I::Xg, Long::Indexed(File::Gpr)),
    (0xe3, 0x90, I::Llgc, Long::Indexed(File::Gpr)),
    (0xe3, 0x91, I::Llgh, Long::Indexed(File::Gpr)),
    (0xe3, 0x94, I::Llc, Long::Indexed(File::Gpr)),
    (0xe3, 0x95, I::Llh, Long::Indexed(File::Gpr)),
    (0xeb, 0x04, I::Lmg, Long::Pair),
    (0xeb, 0x0a, I::Srag, Long::Shift),
    (0xeb, 0x0b, I::Slag, Long::Shift),
    (0xeb, 0x0c, I::Srlg, Long::Shift),
    (0xeb, 0x0d, I::Sllg, Long::Shift),
    (0xeb, 0x14, I::Csy, Long::Pair),
    (0xeb, 0x1c, I::Rllg, Long::Shift),
    (0xeb, 0x1d, I::Rll, Long::Shift),
    (0xeb, 0x24, I::Stmg, Long::Pair),
    (0xeb, 0x30, I::Csg, Long::Pair),
    (0xeb, 0x51, I::Tmy, Long::Storage),
    (0xeb, 0x52, I::Mviy, Long::Storage),
    (0xeb, 0x54, I::Niy, Long::Storage),
    (0xeb, 0x55, I::Cliy, Long::Storage),
    (0xeb, 0x56, I::Oiy, Long::Storage),
    (0xeb, 0x57, I::Xiy, Long::Storage),
    (0xeb, 0x90, I::Stmy, Long::Pair),
    (0xeb, 0x98, I::Lmy, Long::Pair),
    (0xeb, 0xe8, I::Laag, Long::Pair),
    (0xeb, 0xf4, I::Lan, Long::Pair),
    (0xeb, 0xf6, I::Lao, Long::Pair),
    (0xeb, 0xf7, I::Lax, Long::Pair),
    (0xeb, 0xf8, I::Laa, Long::Pair),
    (0xed, 0x04, I::Ldeb, Long::Indexed(File::Fpr)),
    (0xed, 0x09, I::Ceb, Long::Indexed(File::Fpr)),
    (0xed, 0x0a, I::Aeb, Long::Indexed(File::Fpr)),
    (0xed, 0x0b, I::Seb, Long::Indexed(File::Fpr)),
    (0xed, 0x0c, I::Mdeb, Long::Indexed(File::Fpr)),
    (0xed, 0x0d, I::Deb, Long::Indexed(File::Fpr)),
    (0xed, 0x14, I::Sqeb, Long::Indexed(File::Fpr)),
    (0xed, 0x15, I::Sqdb, Long::Indexed(File::Fpr)),
    (0xed, 0x17, I::Meeb, Long::Indexed(File::Fpr)),
    (0xed, 0x19, I::Cdb, Long::Indexed(File::Fpr)),
    (0xed, 0x1a, I::Adb, Long::Indexed(File::Fpr)),
    (0xed, 0x1b, I::Sdb, Long::Indexed(File::Fpr)),
    (0xed, 0x1c, I::Mdb, Long::Indexed(File::Fpr)),
    (0xed, 0x1d, I::Ddb, Long::Indexed(File::Fpr)),
    (0xed, 0x64, I::Ley, Long::Indexed(File::Fpr)),
    (0xed, 0x65, I::Ldy, Long::Indexed(File::Fpr)),
    (0xed, 0x66, I::Stey, Long::Indexed(File::Fpr)),
    (0xed, 0x67, I::Stdy, Long::Indexed(File::Fpr)),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rie {
    /// RIE-b `r1, r2, m3, target`
    RegRelative,
    /// RIE-c `r1, i2, m3, target`
    ImmRelative { signed: bool },
    /// RRS `r1, r2, m3, d4(b4)`
    RegStorage,
    /// RIS `r1, i2, m3, d4(b4)`
    ImmStorage { signed: bool },
    /// RIE-a `r1, i2, m3`
    Trap { signed: bool },
    /// RIE-f `r1, r2, i3, i4, i5`
    Rotate,
    /// RIE-d `r1, r3, i2`
    AddImmediate,
}

/// Six-byte `0xec` opcodes keyed by the last byte.
const RIE: &[(u8, I, Rie)] = &[
    (0x51, I::Risblg, Rie::Rotate),
    (0x54, I::Rnsbg, Rie::Rotate),
    (0x55, I::Risbg, Rie::Rotate),
    (0x56, I::Rosbg, Rie::Rotate),
    (0x57, I::Rxsbg, Rie::Rotate),
    (0x5d, I::Risbhg, Rie::Rotate),
    (0x64, I::Cgrj, Rie::RegRelative),
    (0x65, I::Clgrj, Rie::RegRelative),
    (0x70, I::Cgit, Rie::Trap { signed: true }),
    (0x71, I::Clgit, Rie::Trap { signed: false }),
    (0x72, I::Cit, Rie::Trap { signed: true }),
    (0x73, I::Clfit, Rie::Trap { signed: false }),
    (0x76, I::Crj, Rie::RegRelative),
    (0x77, I::Clrj, Rie::RegRelative),
    (0x7c, I::Cgij, Rie::ImmRelative { signed: true }),
    (0x7d, I::Clgij, Rie::ImmRelative { signed: false }),
    (0x7e, I::Cij, Rie::ImmRelative { signed: true }),
    (0x7f, I::Clij, Rie::ImmRelative { signed: false }),
    (0xd8, I::Ahik, Rie::AddImmediate),
    (0xd9, I::Aghik, Rie::AddImmediate),
    (0xda, I::Alhsik, Rie::AddImmediate),
    (0xdb, I::Alghsik, Rie::AddImmediate),
    (0xe4, I::Cgrb, Rie::RegStorage),
    (0xe5, I::Clgrb, Rie::RegStorage),
    (0xf6, I::Crb, Rie::RegStorage),
    (0xf7, I::Clrb, Rie::RegStorage),
    (0xfc, I::Cgib, Rie::ImmStorage { signed: true }),
    (0xfd, I::Clgib, Rie::ImmStorage { signed: false }),
    (0xfe, I::Cib, Rie::ImmStorage { signed: true }),
    (0xff, I::Clib, Rie::ImmStorage { signed: false }),
];

/// Instruction length from the two high bits of the first opcode byte.
pub(super) fn length(first: u8) -> usize {
    match first >> 6 {
        0 => 2,
        1 | 2 => 4,
        _ => 6,
    }
}

fn reg(file: File, n: u64) -> Op {
    let n = (n & 15) as u8;
    match file {
        File::Gpr => Op::Gpr(n),
        File::Fpr => Op::Fpr(n),
        File::Acr => Op::Acr(n),
    }
}

/// Decodes one instruction of `bytes.len()` (2, 4 or 6) bytes.
pub(super) fn decode(bytes: &[u8], address: u64) -> Result<Decoded, DecodeError> {
    let raw = bytes
        .iter()
        .fold(0u64, |acc, &b| (acc << 8) | b as u64)
        << (8 * (6 - bytes.len()));
    let first = (raw >> 40) as u8;
    let field = |shift: u32| (raw >> shift) & 15;
    let (r1, r2) = (field(36), field(32));
    let d12 = ((raw >> 16) & 0xfff) as i64;

    match first {
        0x07 => return Ok(branch_register(r1 as u8, r2)),
        0x0a => return Ok(Decoded::new(I::Svc, vec![Op::Uimm((raw >> 32) & 0xff)])),
        0x47 => {
            let mem = Op::Mem {
                disp: d12,
                index: r2 as u8,
                base: field(28) as u8,
            };
            return Ok(branch(I::Bc, r1 as u8, "b", "nop", vec![mem]));
        }
        0xa7 if r2 == 4 => {
            let offset = sign_extend((raw >> 16) & 0xffff, 16) << 1;
            let target = Op::Target(address.wrapping_add(offset as u64));
            return Ok(branch(I::Brc, r1 as u8, "j", "jnop", vec![target]));
        }
        0xc0 if r2 == 4 => {
            let offset = sign_extend(raw & 0xffff_ffff, 32) << 1;
            let target = Op::Target(address.wrapping_add(offset as u64));
            return Ok(branch(I::Brcl, r1 as u8, "jg", "jgnop", vec![target]));
        }
        0xb2 | 0xb3 | 0xb9 => return extended(raw),
        0xe3 | 0xeb | 0xed => return long(raw),
        0xec => return rie(raw, address),
        _ => {}
    }

    if let Some(&(_, _, insn, form)) = IMMEDIATE
        .iter()
        .find(|(op, ext, ..)| *op == first && *ext as u64 == r2)
    {
        let wide = first >= 0xc0;
        let imm = if wide { raw & 0xffff_ffff } else { (raw >> 16) & 0xffff };
        let bits = if wide { 32 } else { 16 };
        let value = match form {
            Form::RiSigned => Op::Imm(sign_extend(imm, bits)),
            Form::RiRelative => {
                Op::Target(address.wrapping_add((sign_extend(imm, bits) << 1) as u64))
            }
            _ => Op::Uimm(imm),
        };
        return Ok(Decoded::new(insn, vec![Op::Gpr(r1 as u8), value]));
    }

    let &(_, insn, form, file) = SHORT
        .iter()
        .find(|(op, ..)| *op == first)
        .ok_or(DecodeError::InvalidEncoding)?;
    let base = field(28) as u8;
    let ops = match form {
        Form::Rr => vec![reg(file, r1), reg(file, r2)],
        Form::Rx => vec![
            reg(file, r1),
            Op::Mem {
                disp: d12,
                index: r2 as u8,
                base,
            },
        ],
        Form::Rs => vec![
            reg(file, r1),
            reg(file, r2),
            Op::Mem {
                disp: d12,
                index: 0,
                base,
            },
        ],
        Form::RsShift => vec![
            reg(file, r1),
            Op::Mem {
                disp: d12,
                index: 0,
                base,
            },
        ],
        Form::Si => vec![
            Op::Mem {
                disp: d12,
                index: 0,
                base,
            },
            Op::Uimm((raw >> 32) & 0xff),
        ],
        Form::Ss => vec![
            Op::Len {
                disp: d12,
                length: ((raw >> 32) & 0xff) + 1,
                base,
            },
            Op::Mem {
                disp: (raw & 0xfff) as i64,
                index: 0,
                base: field(12) as u8,
            },
        ],
        _ => return Err(DecodeError::InvalidEncoding),
    };
    Ok(Decoded::new(insn, ops))
}

/// Mnemonic suffix for a branch mask.
fn condition(mask: u8) -> SysZCc {
    SysZCc::from_id(mask as u32).unwrap_or(SysZCc::Invalid)
}

fn branch(insn: I, mask: u8, prefix: &str, never: &str, ops: Vec<Op>) -> Decoded {
    let (mnemonic, cc) = match mask {
        0 => (never.to_string(), SysZCc::Invalid),
        15 => (prefix.to_string(), SysZCc::Invalid),
        m => {
            let cc = condition(m);
            (format!("{}{}", prefix, cc.name()), cc)
        }
    };
    Decoded {
        mnemonic: Some(mnemonic),
        cc,
        ..Decoded::new(insn, ops)
    }
}

fn branch_register(mask: u8, r2: u64) -> Decoded {
    if r2 == 0 {
        return Decoded::new(I::Bcr, vec![Op::Mask(mask), Op::Gpr(0)]);
    }
    let mut decoded = branch(I::Bcr, mask, "b", "nop", vec![Op::Gpr(r2 as u8)]);
    if let Some(m) = decoded.mnemonic.as_mut() {
        m.push('r');
    }
    decoded
}

fn extended(raw: u64) -> Result<Decoded, DecodeError> {
    let opcode = (raw >> 32) as u16;
    let r1 = (raw >> 20) & 15;
    let r2 = (raw >> 16) & 15;
    if opcode == 0xb222 {
        return Ok(Decoded::new(I::Ipm, vec![Op::Gpr(r1 as u8)]));
    }
    if let Some(&(_, insn)) = DISTINCT.iter().find(|(op, _)| *op == opcode) {
        let r3 = (raw >> 28) & 15;
        let ops = vec![Op::Gpr(r1 as u8), Op::Gpr(r2 as u8), Op::Gpr(r3 as u8)];
        return Ok(Decoded::new(insn, ops).group(SysZGroup::DistinctOps));
    }
    if opcode == 0xb9e2 || opcode == 0xb9f2 {
        let mask = ((raw >> 28) & 15) as u8;
        let insn = if opcode == 0xb9e2 { I::Locgr } else { I::Locr };
        let ops = vec![Op::Gpr(r1 as u8), Op::Gpr(r2 as u8)];
        let cc = condition(mask);
        if cc == SysZCc::Invalid {
            return Err(DecodeError::InvalidEncoding);
        }
        return Ok(Decoded {
            mnemonic: Some(format!("{}{}", insn.name(), cc.name())),
            cc,
            ..Decoded::new(insn, ops).group(SysZGroup::LoadStoreOnCond)
        });
    }
    let &(_, insn, f1, f2) = RRE
        .iter()
        .find(|(op, ..)| *op == opcode)
        .ok_or(DecodeError::InvalidEncoding)?;
    Ok(Decoded::new(insn, vec![reg(f1, r1), reg(f2, r2)]))
}

fn long(raw: u64) -> Result<Decoded, DecodeError> {
    let first = (raw >> 40) as u8;
    let last = (raw & 0xff) as u8;
    let &(_, _, insn, shape) = LONG
        .iter()
        .find(|(op, ext, ..)| *op == first && *ext == last)
        .ok_or(DecodeError::InvalidEncoding)?;
    let r1 = (raw >> 36) & 15;
    let x2 = ((raw >> 32) & 15) as u8;
    let base = ((raw >> 28) & 15) as u8;
    let low = (raw >> 16) & 0xfff;
    let rxe = first == 0xed && !matches!(insn, I::Ley | I::Ldy | I::Stey | I::Stdy);
    let disp = if rxe {
        // RXE carries a plain 12-bit displacement.
        low as i64
    } else {
        sign_extend((((raw >> 8) & 0xff) << 12) | low, 20)
    };
    let ops = match shape {
        Long::Indexed(file) => vec![
            reg(file, r1),
            Op::Mem {
                disp,
                index: x2,
                base,
            },
        ],
        Long::Pair | Long::Shift => vec![
            Op::Gpr(r1 as u8),
            Op::Gpr(x2),
            Op::Mem {
                disp,
                index: 0,
                base,
            },
        ],
        Long::Storage => vec![
            Op::Mem {
                disp,
                index: 0,
                base,
            },
            Op::Uimm((raw >> 32) & 0xff),
        ],
    };
    let decoded = Decoded::new(insn, ops);
    Ok(match insn {
        I::Laa | I::Laag | I::Lan | I::Lao | I::Lax => decoded.group(SysZGroup::InterlockedAccess1),
        _ => decoded,
    })
}

/// Compare-and-branch, compare-and-trap, rotate-and-select and three-operand add forms.
fn rie(raw: u64, address: u64) -> Result<Decoded, DecodeError> {
    let last = (raw & 0xff) as u8;
    let &(_, insn, shape) = RIE
        .iter()
        .find(|(ext, ..)| *ext == last)
        .ok_or(DecodeError::InvalidEncoding)?;
    let r1 = Op::Gpr(((raw >> 36) & 15) as u8);
    let r2 = ((raw >> 32) & 15) as u8;
    let imm16 = (raw >> 16) & 0xffff;
    let imm8 = (raw >> 8) & 0xff;
    let relative = Op::Target(address.wrapping_add((sign_extend(imm16, 16) << 1) as u64));
    let storage = Op::Mem {
        disp: ((raw >> 16) & 0xfff) as i64,
        index: 0,
        base: ((raw >> 28) & 15) as u8,
    };
    let immediate = |value: u64, bits: u32, signed: bool| {
        if signed {
            Op::Imm(sign_extend(value, bits))
        } else {
            Op::Uimm(value)
        }
    };
    let low_mask = ((raw >> 12) & 15) as u8;

    let (mask, ops) = match shape {
        Rie::Rotate => {
            let ops = vec![
                r1,
                Op::Gpr(r2),
                Op::Uimm((raw >> 24) & 0xff),
                Op::Uimm(imm16 & 0xff),
                Op::Uimm(imm8),
            ];
            let decoded = Decoded::new(insn, ops);
            return Ok(match insn {
                I::Risbhg | I::Risblg => decoded.group(SysZGroup::HighWord),
                _ => decoded,
            });
        }
        Rie::AddImmediate => {
            let ops = vec![r1, Op::Gpr(r2), Op::Imm(sign_extend(imm16, 16))];
            return Ok(Decoded::new(insn, ops).group(SysZGroup::DistinctOps));
        }
        Rie::RegRelative => (low_mask, vec![r1, Op::Gpr(r2), relative]),
        Rie::ImmRelative { signed } => (r2, vec![r1, immediate(imm8, 8, signed), relative]),
        Rie::RegStorage => (low_mask, vec![r1, Op::Gpr(r2), storage]),
        Rie::ImmStorage { signed } => (r2, vec![r1, immediate(imm8, 8, signed), storage]),
        Rie::Trap { signed } => (low_mask, vec![r1, immediate(imm16, 16, signed)]),
    };
    Ok(compare_condition(insn, mask, ops))
}

/// Folds the compare mask into the mnemonic; masks 0 and 15 stay a plain operand.
fn compare_condition(insn: I, mask: u8, mut ops: Vec<Op>) -> Decoded {
    let cc = condition(mask);
    if cc == SysZCc::Invalid {
        let at = ops.len().min(2);
        ops.insert(at, Op::Mask(mask));
        return Decoded::new(insn, ops);
    }
    Decoded {
        mnemonic: Some(format!("{}{}", insn.name(), cc.name())),
        cc,
        ..Decoded::new(insn, ops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(bytes: &[u8], address: u64) -> String {
        assert_eq!(length(bytes[0]), bytes.len());
        let d = decode(bytes, address).unwrap();
        format!("{} {}", d.mnemonic(), super::super::render(&d))
            .trim_end()
            .to_string()
    }

    #[test]
    fn test_lengths() {
        assert_eq!(length(0x07), 2);
        assert_eq!(length(0x5a), 4);
        assert_eq!(length(0xa7), 4);
        assert_eq!(length(0xc0), 6);
        assert_eq!(length(0xeb), 6);
    }

    #[test]
    fn test_branches() {
        // br %r14
        assert_eq!(text(&[0x07, 0xfe], 0), "br %r14");
        // ber %r1
        assert_eq!(text(&[0x07, 0x81], 0), "ber %r1");
        // bcr 15, %r0
        assert_eq!(text(&[0x07, 0xf0], 0), "bcr 15, %r0");
        // jne 0x1008
        assert_eq!(text(&[0xa7, 0x74, 0x00, 0x04], 0x1000), "jne 0x1008");
        // jg 0x800
        assert_eq!(text(&[0xc0, 0xf4, 0xff, 0xff, 0xfc, 0x00], 0x1000), "jg 0x800");
        // brasl %r14, 0x1100
        assert_eq!(text(&[0xc0, 0xe5, 0x00, 0x00, 0x00, 0x80], 0x1000), "brasl %r14, 0x1100");
    }

    #[test]
    fn test_formats() {
        // lhi %r1, -1
        assert_eq!(text(&[0xa7, 0x18, 0xff, 0xff], 0), "lhi %r1, -1");
        // mvc 8(4, %r2), 0(%r3)
        assert_eq!(text(&[0xd2, 0x03, 0x20, 0x08, 0x30, 0x00], 0), "mvc 8(4, %r2), 0(%r3)");
        // sll %r1, 4
        assert_eq!(text(&[0x89, 0x10, 0x00, 0x04], 0), "sll %r1, 4");
        // lg %r2, -8(%r15)
        assert_eq!(text(&[0xe3, 0x20, 0xff, 0xf8, 0xff, 0x04], 0), "lg %r2, -8(%r15)");
        // ark %r1, %r2, %r3
        assert_eq!(text(&[0xb9, 0xf8, 0x30, 0x12], 0), "ark %r1, %r2, %r3");
        // locgrne %r1, %r2
        assert_eq!(text(&[0xb9, 0xe2, 0x70, 0x12], 0), "locgrne %r1, %r2");
        // ipm %r3
        assert_eq!(text(&[0xb2, 0x22, 0x00, 0x30], 0), "ipm %r3");
    }

    #[test]
    fn test_compare_and_branch() {
        // clij %r1, 0xc1, 8, 0x1028
        assert_eq!(
            text(&[0xec, 0x18, 0x00, 0x00, 0xc1, 0x7f], 0x1028),
            "clije %r1, 0xc1, 0x1028"
        );
        // cij %r2, -1, 4, back one halfword
        assert_eq!(
            text(&[0xec, 0x24, 0xff, 0xff, 0xff, 0x7e], 0x1000),
            "cijl %r2, -1, 0xffe"
        );
        // cgrj %r1, %r2, 2, 0x1010
        assert_eq!(
            text(&[0xec, 0x12, 0x00, 0x08, 0x20, 0x64], 0x1000),
            "cgrjh %r1, %r2, 0x1010"
        );
        // crb %r3, %r4, 12, 0x10(%r15)
        assert_eq!(
            text(&[0xec, 0x34, 0xf0, 0x10, 0xc0, 0xf6], 0),
            "crble %r3, %r4, 0x10(%r15)"
        );
        // mask 15 has no suffix
        assert_eq!(
            text(&[0xec, 0x12, 0x00, 0x02, 0xf0, 0x76], 0x1000),
            "crj %r1, %r2, 15, 0x1004"
        );
        // clfit %r5, 0x1234, 8
        assert_eq!(
            text(&[0xec, 0x50, 0x12, 0x34, 0x80, 0x73], 0),
            "clfite %r5, 0x1234"
        );
    }

    #[test]
    fn test_rotate_and_add_immediate() {
        // risbg %r1, %r2, 32, 191, 32
        assert_eq!(
            text(&[0xec, 0x12, 0x20, 0xbf, 0x20, 0x55], 0),
            "risbg %r1, %r2, 0x20, 0xbf, 0x20"
        );
        // ahik %r1, %r3, -2
        assert_eq!(text(&[0xec, 0x13, 0xff, 0xfe, 0x00, 0xd8], 0), "ahik %r1, %r3, -2");
        assert_eq!(
            decode(&[0xec, 0x00, 0x00, 0x00, 0x00, 0x00], 0),
            Err(DecodeError::InvalidEncoding)
        );
    }

    #[test]
    fn test_unknown_opcode() {
        assert_eq!(
            decode(&[0x00, 0x00], 0),
            Err(DecodeError::InvalidEncoding)
        );
    }
}
