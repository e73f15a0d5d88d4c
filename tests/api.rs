use isotope::names;
use isotope::strategy::Strategy;
use isotope::{Architecture, DisassemblyError, Mode, Session, Syntax};

const X86_64: [u8; 26] = [
    0x55, 0x48, 0x8b, 0x05, 0xb8, 0x13, 0x00, 0x00, 0xe9, 0xea, 0xbe, 0xad, 0xde, 0xff, 0x25,
    0x23, 0x01, 0x00, 0x00, 0xe8, 0xdf, 0xbe, 0xad, 0xde, 0x74, 0xff,
];

#[test]
fn version_is_five_zero() {
    assert_eq!(isotope::version(), (5, 0));
}

#[test]
fn open_validates_mode() {
    assert!(Session::open(Architecture::X86, Mode::MODE_64).is_ok());
    assert!(matches!(
        Session::open(Architecture::X86, Mode::MODE_32 | Mode::MODE_64),
        Err(DisassemblyError::InvalidModeCombination(Architecture::X86, _))
    ));
    assert!(Session::open(Architecture::X86, Mode::empty()).is_err());
    assert!(Session::open(Architecture::Arm, Mode::MCLASS).is_err());
    assert!(Session::open(Architecture::Sparc, Mode::empty()).is_err());
}

#[test]
fn zero_count_decodes_everything() {
    let session = Session::open(Architecture::X86, Mode::MODE_64).unwrap();
    assert_eq!(session.disassemble(&X86_64, 0x1000, 0).count(), 6);
    assert_eq!(session.disassemble(&X86_64, 0x1000, 2).count(), 2);
    assert_eq!(session.disassemble_all(&X86_64, 0x1000, 10).len(), 6);
}

#[test]
fn sequence_ends_at_first_bad_encoding() {
    let session = Session::open(Architecture::X86, Mode::MODE_64).unwrap();
    let mut code = X86_64[..8].to_vec();
    code.push(0x06); // push es has no 64-bit encoding
    code.push(0x90);

    let mut stream = session.disassemble(&code, 0x1000, 0);
    assert_eq!(stream.by_ref().count(), 2);
    assert_eq!(stream.offset(), 8);
    assert_eq!(stream.address(), 0x1008);
    assert!(stream.stop_reason().is_some());
    assert!(stream.next().is_none());
}

#[test]
fn empty_input_yields_nothing() {
    let session = Session::open(Architecture::Arm64, Mode::LITTLE_ENDIAN).unwrap();
    let mut stream = session.disassemble(&[], 0, 0);
    assert!(stream.next().is_none());
    assert!(stream.stop_reason().is_none());

    // a partial word is truncated, not invalid
    let mut stream = session.disassemble(&[0x21, 0x7c], 0, 0);
    assert!(stream.next().is_none());
    assert!(stream.stop_reason().is_some());
}

#[test]
fn detail_toggle_controls_extra_fields() {
    let mut session = Session::open(Architecture::X86, Mode::MODE_64).unwrap();
    let plain = session.decode_at(&X86_64, 0x1000).unwrap();
    assert!(plain.detail.is_none());
    assert!(plain.regs_read.is_empty());
    assert!(plain.groups.is_empty());

    session.set_detail(true);
    let detailed = session.decode_at(&X86_64, 0x1000).unwrap();
    assert!(detailed.detail.is_some());
    let read: Vec<_> = detailed
        .regs_read
        .iter()
        .map(|&r| session.register_name(r as u32))
        .collect();
    assert_eq!(read, ["rsp"]);
    assert_eq!(plain.mnemonic, detailed.mnemonic);
    assert_eq!(plain.operands, detailed.operands);
}

#[test]
fn syntax_changes_rendering_only() {
    let mut session = Session::open(Architecture::X86, Mode::MODE_64).unwrap();
    let intel = session.decode_at(&X86_64[1..], 0x1001).unwrap();
    session.set_syntax(Syntax::Att);
    let att = session.decode_at(&X86_64[1..], 0x1001).unwrap();

    assert_eq!(att.operands, "0x13b8(%rip), %rax");
    assert_eq!(intel.id, att.id);
    assert_eq!(intel.size, att.size);
}

#[test]
fn names_are_empty_for_unknown_ids() {
    for arch in Architecture::ALL {
        assert_eq!(names::register_name(arch, 0), "");
        assert_eq!(names::register_name(arch, 100_000), "");
        assert_eq!(names::instruction_name(arch, 100_000), "");
        assert_eq!(names::group_name(arch, 255), "");
    }
    let rsp = names::register_id(Architecture::X86, "rsp").unwrap();
    assert_eq!(names::register_name(Architecture::X86, rsp), "rsp");
}

#[test]
fn strategies_share_linear_prefix() {
    let session = Session::open(Architecture::X86, Mode::MODE_64).unwrap();
    let linear = Strategy::Linear.run(&session, &X86_64, 0x1000, 0);
    let superset = Strategy::Superset.run(&session, &X86_64, 0x1000, 0);
    assert_eq!(linear.instructions.len(), 6);
    assert!(superset.instructions.len() > linear.instructions.len());
    assert_eq!(superset.instructions[0], linear.instructions[0]);
}
