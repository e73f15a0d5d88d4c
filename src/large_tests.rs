#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::{
        format::OutputFormat, names, parser::GoblinParser, strategy::Strategy, Architecture,
        BinaryParser, DecodeError, Instruction, Mode, Session, Syntax,
    };

    const X86_16: &[u8] = &[
        0x8d, 0x4c, 0x32, 0x08, 0x01, 0xd8, 0x81, 0xc6, 0x34, 0x12, 0x00, 0x00,
    ];
    const X86_32: &[u8] = &[
        0x8d, 0x4c, 0x32, 0x08, 0x01, 0xd8, 0x81, 0xc6, 0x34, 0x12, 0x00, 0x00, 0x05, 0x23,
        0x01, 0x00, 0x00, 0x36, 0x8b, 0x84, 0x91, 0x23, 0x01, 0x00, 0x00, 0x41, 0x8d, 0x84,
        0x39, 0x89, 0x67, 0x00, 0x00, 0x8d, 0x87, 0x89, 0x67, 0x00, 0x00, 0xb4, 0xc6,
    ];
    const X86_64: &[u8] = &[
        0x55, 0x48, 0x8b, 0x05, 0xb8, 0x13, 0x00, 0x00, 0xe9, 0xea, 0xbe, 0xad, 0xde, 0xff,
        0x25, 0x23, 0x01, 0x00, 0x00, 0xe8, 0xdf, 0xbe, 0xad, 0xde, 0x74, 0xff,
    ];
    const ARM: &[u8] = &[
        0xed, 0xff, 0xff, 0xeb, 0x04, 0xe0, 0x2d, 0xe5, 0x00, 0x00, 0x00, 0x00, 0xe0, 0x83,
        0x22, 0xe5, 0xf1, 0x02, 0x03, 0x0e, 0x00, 0x00, 0xa0, 0xe3, 0x02, 0x30, 0xc1, 0xe7,
        0x00, 0x00, 0x53, 0xe3,
    ];
    const THUMB: &[u8] = &[0x70, 0x47, 0xeb, 0x46, 0x83, 0xb0, 0xc9, 0x68];
    const MIPS32_BE: &[u8] = &[
        0x0c, 0x10, 0x00, 0x97, 0x00, 0x00, 0x00, 0x00, 0x24, 0x02, 0x00, 0x0c, 0x8f, 0xa2,
        0x00, 0x00, 0x34, 0x21, 0x34, 0x56,
    ];
    const ARM64: &[u8] = &[
        0x21, 0x7c, 0x02, 0x9b, 0x21, 0x7c, 0x00, 0x53, 0x00, 0x40, 0x21, 0x4b, 0xe1, 0x0b,
        0x40, 0xb9,
    ];
    const PPC: &[u8] = &[
        0x80, 0x20, 0x00, 0x00, 0x80, 0x3f, 0x00, 0x00, 0x10, 0x43, 0x23, 0x0e, 0xd0, 0x44,
        0x00, 0x80, 0x4c, 0x43, 0x22, 0x02, 0x2d, 0x03, 0x00, 0x80, 0x7c, 0x43, 0x20, 0x14,
        0x7c, 0x43, 0x20, 0x93, 0x4f, 0x20, 0x00, 0x21, 0x4c, 0xc8, 0x00, 0x21,
    ];
    const SPARC_V9: &[u8] = &[
        0x81, 0xa8, 0x0a, 0x24, 0x89, 0xa0, 0x10, 0x20, 0x89, 0xa0, 0x1a, 0x60, 0x89, 0xa0,
        0x00, 0xe0,
    ];
    const SYSZ: &[u8] = &[
        0xed, 0x00, 0x00, 0x00, 0x00, 0x1a, 0x5a, 0x0f, 0x1f, 0xff, 0xc2, 0x09, 0x80, 0x00,
        0x00, 0x00, 0x07, 0xf7, 0xeb, 0x2a, 0xff, 0xff, 0x7f, 0x57, 0xe3, 0x01, 0xff, 0xff,
        0x7f, 0x57, 0xeb, 0x00, 0xf0, 0x00, 0x00, 0x24, 0xb2, 0x4f, 0x00, 0x78, 0xec, 0x18,
        0x00, 0x00, 0xc1, 0x7f,
    ];
    const XCORE: &[u8] = &[
        0xfe, 0x0f, 0xfe, 0x17, 0x13, 0x17, 0xc6, 0xfe, 0xec, 0x17, 0x97, 0xf8, 0xec, 0x4f,
        0x1f, 0xfd, 0xec, 0x37, 0x07, 0xf2, 0x45, 0x5b, 0xf9, 0xfa, 0x02, 0x06, 0x1b, 0x10,
    ];
    const M68K: &[u8] = &[
        0xd4, 0x40, 0x87, 0x5a, 0x4e, 0x71, 0x02, 0xb4, 0xc0, 0xde, 0xc0, 0xde, 0x5c, 0x00,
        0x1d, 0x80, 0x71, 0x12, 0x01, 0x23, 0xf2, 0x3c, 0x44, 0x22, 0x40, 0x49, 0x0e, 0x56,
        0x54, 0xc5, 0xf2, 0x3c, 0x44, 0x00, 0x44, 0x7a, 0x00, 0x00, 0xf2, 0x00, 0x0a, 0x28,
    ];
    const TMS320C64X: &[u8] = &[
        0x01, 0xac, 0x88, 0x40, 0x81, 0xac, 0x88, 0x43, 0x00, 0x00, 0x00, 0x00, 0x02, 0x90,
        0x32, 0x96, 0x02, 0x80, 0x46, 0x9e, 0x05, 0x3c, 0x83, 0xe6, 0x0b, 0x0c, 0x8b, 0x24,
    ];
    const M6809: &[u8] = &[
        0x06, 0x10, 0x19, 0x1a, 0x55, 0x1e, 0x01, 0x23, 0xe9, 0x31, 0x06, 0x34, 0x55, 0xa6,
        0x81, 0xa7, 0x89, 0x7f, 0xff, 0xa6, 0x9d, 0x10, 0x00, 0xa7, 0x91, 0xa6, 0x9f, 0x10,
        0x00, 0x11, 0xac, 0x99, 0x10, 0x00, 0x39,
    ];
    const EVM: &[u8] = &[0x60, 0x61];

    fn text(insn: &Instruction) -> String {
        format!("{} {}", insn.mnemonic, insn.operands)
            .trim_end()
            .to_string()
    }

    fn open(arch: Architecture, mode: Mode, detail: bool) -> Session {
        let mut session = Session::open(arch, mode).unwrap();
        session.set_detail(detail);
        session
    }

    /// Whole-platform runs: instruction count, first and last line, and the
    /// address following the last instruction.
    #[rstest]
    #[case::x86_16(Architecture::X86, Mode::MODE_16, X86_16, 4, "lea cx, [si + 0x32]", "adc al, [bx + si]", 0x100b)]
    #[case::x86_32(Architecture::X86, Mode::MODE_32, X86_32, 9, "lea ecx, [edx + esi + 8]", "mov ah, 0xc6", 0x1029)]
    #[case::x86_64(Architecture::X86, Mode::MODE_64, X86_64, 6, "push rbp", "je 0x1019", 0x101a)]
    #[case::arm(Architecture::Arm, Mode::ARM, ARM, 8, "bl #0xfbc", "cmp r3, #0", 0x1020)]
    #[case::thumb(Architecture::Arm, Mode::THUMB, THUMB, 4, "bx lr", "ldr r1, [r1, #0xc]", 0x1008)]
    #[case::mips32_be(Architecture::Mips, Mode::MIPS32 | Mode::BIG_ENDIAN, MIPS32_BE, 5, "jal 0x40025c", "ori $at, $at, 0x3456", 0x1014)]
    #[case::arm64(Architecture::Arm64, Mode::LITTLE_ENDIAN, ARM64, 4, "mul x1, x1, x2", "ldr w1, [sp, #8]", 0x1010)]
    #[case::ppc(Architecture::Ppc, Mode::BIG_ENDIAN, PPC, 10, "lwz r1, 0(0)", "bgelrl- cr2", 0x1028)]
    #[case::sparc_v9(Architecture::Sparc, Mode::BIG_ENDIAN | Mode::V9, SPARC_V9, 4, "fcmps %f0, %f4", "fnegq %f0, %f4", 0x1010)]
    #[case::sysz(Architecture::SysZ, Mode::BIG_ENDIAN, SYSZ, 9, "adb %f0, 0", "clije %r1, 0xc1, 0x1028", 0x102e)]
    #[case::xcore(Architecture::XCore, Mode::empty(), XCORE, 9, "get r11, ed", "add r1, r2, r3", 0x101c)]
    #[case::m68k(Architecture::M68k, Mode::BIG_ENDIAN | Mode::M68K_040, M68K, 9, "add.w d0, d2", "fsub fp2, fp4", 0x102a)]
    #[case::tms320c64x(Architecture::Tms320c64x, Mode::empty(), TMS320C64X, 7, "add.D1 a11, a4, a3", "ldndw.D1T1 *+a3(a4), a23:a22", 0x101c)]
    #[case::m6809(Architecture::M680x, Mode::M680X_6809, M6809, 14, "ror $10", "rts", 0x1023)]
    #[case::evm(Architecture::Evm, Mode::empty(), EVM, 1, "push1 0x61", "push1 0x61", 0x1002)]
    fn test_platform(
        #[case] arch: Architecture,
        #[case] mode: Mode,
        #[case] code: &[u8],
        #[case] count: usize,
        #[case] first: &str,
        #[case] last: &str,
        #[case] end: u64,
        #[values(false, true)] detail: bool,
    ) {
        let session = open(arch, mode, detail);
        let result = Strategy::Linear.run(&session, code, 0x1000, 0);

        assert_eq!(result.instructions.len(), count);
        assert_eq!(text(&result.instructions[0]), first);
        assert_eq!(text(&result.instructions[count - 1]), last);
        assert_eq!(result.end_address(), end);

        // instructions tile the decoded prefix
        let mut address = 0x1000;
        for insn in &result.instructions {
            assert_eq!(insn.address, address);
            assert_eq!(insn.bytes.len(), insn.size as usize);
            let offset = (insn.address - 0x1000) as usize;
            assert_eq!(insn.bytes, &code[offset..offset + insn.size as usize]);
            assert_ne!(names::instruction_name(arch, insn.id), "");
            address = insn.next_address();
        }

        for insn in &result.instructions {
            assert_eq!(insn.detail.is_some(), detail);
            if !detail {
                assert!(insn.regs_read.is_empty());
                assert!(insn.regs_write.is_empty());
                assert!(insn.groups.is_empty());
            }
        }
    }

    #[rstest]
    #[case::x86_64(Architecture::X86, Mode::MODE_64, X86_64)]
    #[case::x86_32(Architecture::X86, Mode::MODE_32, X86_32)]
    #[case::arm(Architecture::Arm, Mode::ARM, ARM)]
    #[case::ppc(Architecture::Ppc, Mode::BIG_ENDIAN, PPC)]
    #[case::sysz(Architecture::SysZ, Mode::BIG_ENDIAN, SYSZ)]
    #[case::m68k(Architecture::M68k, Mode::BIG_ENDIAN | Mode::M68K_040, M68K)]
    #[case::m6809(Architecture::M680x, Mode::M680X_6809, M6809)]
    fn test_superset_contains_linear(
        #[case] arch: Architecture,
        #[case] mode: Mode,
        #[case] code: &[u8],
    ) {
        let session = open(arch, mode, false);
        let linear = Strategy::Linear.run(&session, code, 0x1000, 0);
        let superset = Strategy::Superset.run(&session, code, 0x1000, 0);

        assert!(superset.instructions.len() >= linear.instructions.len());
        assert!(superset
            .instructions
            .windows(2)
            .all(|w| w[0].address < w[1].address));
        for insn in &linear.instructions {
            let found = superset
                .instructions
                .iter()
                .find(|s| s.address == insn.address);
            assert_eq!(found, Some(insn), "missing 0x{:x}", insn.address);
        }
    }

    #[rstest]
    #[case(0, 6)]
    #[case(1, 1)]
    #[case(4, 4)]
    #[case(100, 6)]
    fn test_instruction_limit(#[case] max: usize, #[case] expected: usize) {
        let session = open(Architecture::X86, Mode::MODE_64, false);
        for strategy in Strategy::all() {
            let result = strategy.run(&session, X86_64, 0x1000, max);
            if *strategy == Strategy::Linear {
                assert_eq!(result.instructions.len(), expected);
            } else {
                assert!(max == 0 || result.instructions.len() <= max);
            }
        }
    }

    #[test]
    fn test_truncated_tail_stops_linear_sweep() {
        let session = open(Architecture::X86, Mode::MODE_16, false);
        let mut stream = session.disassemble(X86_16, 0x1000, 0);
        let decoded: Vec<Instruction> = stream.by_ref().collect();

        assert_eq!(decoded.len(), 4);
        assert_eq!(stream.offset(), 11);
        assert_eq!(stream.address(), 0x100b);
        assert!(matches!(
            stream.stop_reason(),
            Some(DecodeError::TruncatedInstruction(_))
        ));

        let result = Strategy::Linear.run(&session, X86_16, 0x1000, 0);
        assert!(matches!(
            result.stopped,
            Some(DecodeError::TruncatedInstruction(_))
        ));
    }

    #[rstest]
    #[case::intel(Syntax::Intel, "mov", "rax, [rip + 0x13b8]")]
    #[case::att(Syntax::Att, "movq", "0x13b8(%rip), %rax")]
    #[case::masm(Syntax::Masm, "mov", "rax, qword ptr [rip + 13b8h]")]
    fn test_syntax_switch_mid_session(
        #[case] syntax: Syntax,
        #[case] mnemonic: &str,
        #[case] operands: &str,
    ) {
        let mut session = open(Architecture::X86, Mode::MODE_64, false);
        let before = session.decode_at(&X86_64[1..], 0x1001).unwrap();
        assert_eq!(before.operands, "rax, [rip + 0x13b8]");

        session.set_syntax(syntax);
        let after = session.decode_at(&X86_64[1..], 0x1001).unwrap();
        assert_eq!(after.mnemonic, mnemonic);
        assert_eq!(after.operands, operands);
        assert_eq!(after.id, before.id);
    }

    #[rstest]
    fn test_every_format_renders_every_platform(
        #[values(OutputFormat::Text, OutputFormat::Json, OutputFormat::JsonLines, OutputFormat::Csv)]
        format: OutputFormat,
        #[values(
            (Architecture::X86, Mode::MODE_64, X86_64),
            (Architecture::Mips, Mode::MIPS32 | Mode::BIG_ENDIAN, MIPS32_BE),
            (Architecture::Tms320c64x, Mode::empty(), TMS320C64X),
            (Architecture::M680x, Mode::M680X_6809, M6809)
        )]
        platform: (Architecture, Mode, &[u8]),
        #[values(false, true)] detail: bool,
    ) {
        let (arch, mode, code) = platform;
        let session = open(arch, mode, detail);
        let result = Strategy::Linear.run(&session, code, 0x1000, 0);
        let rendered = format.get_formatter().format(&result).unwrap();

        let first = &result.instructions[0];
        assert!(rendered.contains(&first.mnemonic));
        if format == OutputFormat::JsonLines {
            assert_eq!(rendered.lines().count(), result.instructions.len());
            for line in rendered.lines() {
                serde_json::from_str::<serde_json::Value>(line).unwrap();
            }
        }
        if format == OutputFormat::Json {
            let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
            assert_eq!(
                value["instructions"].as_array().map(Vec::len),
                Some(result.instructions.len())
            );
        }
    }

    #[test]
    fn test_elf_header_drives_session() {
        let parser = GoblinParser::new();
        // EM_MIPS, big-endian, 32-bit
        let image = crate::parser::tests::elf_header(8, false, false, 0x400000);
        let metadata = parser.parse(&image).unwrap();
        let (arch, mode) = metadata.target.unwrap();
        assert_eq!(arch, Architecture::Mips);

        let session = Session::open(arch, mode).unwrap();
        let insns = session.disassemble_all(MIPS32_BE, 0x400000, 0);
        assert_eq!(text(&insns[0]), "jal 0x40025c");
        assert_eq!(insns.len(), 5);
    }

    #[test]
    fn test_name_tables_agree_with_session() {
        for arch in Architecture::ALL {
            let mode = match arch {
                Architecture::X86 => Mode::MODE_32,
                Architecture::Mips => Mode::MIPS32,
                Architecture::M680x => Mode::M680X_6809,
                Architecture::M68k | Architecture::SysZ | Architecture::Ppc | Architecture::Sparc => {
                    Mode::BIG_ENDIAN
                }
                _ => Mode::empty(),
            };
            let session = Session::open(arch, mode).unwrap();
            assert_eq!(session.register_name(0), "");
            assert_eq!(session.instruction_name(0), "");
            assert_eq!(session.group_name(0), "");
            assert_eq!(session.instruction_name(u32::MAX), "");
            assert_eq!(
                session.register_name(1),
                names::register_name(arch, 1),
                "{}",
                arch
            );
        }
    }
}
