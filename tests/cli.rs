use std::io::Write;
use std::process::{Command, Output};

use tempfile::NamedTempFile;

const X86_64: [u8; 8] = [0x55, 0x48, 0x8b, 0x05, 0xb8, 0x13, 0x00, 0x00];

fn isotope(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_isotope"))
        .args(args)
        .output()
        .expect("failed to run isotope")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "isotope failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn temp_file(data: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(data).unwrap();
    file.flush().unwrap();
    file
}

/// Little-endian ELF64 for x86-64 with a `.text` section holding `code` at `address`.
fn elf_with_text(code: &[u8], address: u64) -> Vec<u8> {
    let strtab = b"\0.text\0.shstrtab\0";
    let code_offset = 64u64;
    let strtab_offset = code_offset + code.len() as u64;
    let shoff = (strtab_offset + strtab.len() as u64 + 7) & !7;

    let mut out = vec![0x7f, b'E', b'L', b'F', 2, 1, 1];
    out.resize(16, 0);
    out.extend_from_slice(&2u16.to_le_bytes()); // ET_EXEC
    out.extend_from_slice(&62u16.to_le_bytes()); // EM_X86_64
    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(&address.to_le_bytes());
    out.extend_from_slice(&0u64.to_le_bytes());
    out.extend_from_slice(&shoff.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    for half in [64u16, 56, 0, 64, 3, 2] {
        out.extend_from_slice(&half.to_le_bytes());
    }
    out.extend_from_slice(code);
    out.extend_from_slice(strtab);
    out.resize(shoff as usize, 0);

    let mut section = |name: u32, kind: u32, flags: u64, addr: u64, offset: u64, size: u64| {
        out.extend_from_slice(&name.to_le_bytes());
        out.extend_from_slice(&kind.to_le_bytes());
        out.extend_from_slice(&flags.to_le_bytes());
        out.extend_from_slice(&addr.to_le_bytes());
        out.extend_from_slice(&offset.to_le_bytes());
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&1u64.to_le_bytes());
        out.extend_from_slice(&0u64.to_le_bytes());
    };
    section(0, 0, 0, 0, 0, 0);
    // SHT_PROGBITS, SHF_ALLOC | SHF_EXECINSTR
    section(1, 1, 6, address, code_offset, code.len() as u64);
    // SHT_STRTAB
    section(7, 3, 0, 0, strtab_offset, strtab.len() as u64);
    out
}

#[test]
fn raw_file_text_output() {
    let file = temp_file(&X86_64);
    let path = file.path().to_str().unwrap();
    let text = stdout(&isotope(&["--arch", "x86", "-m", "64", path]));
    assert_eq!(
        text,
        "0x1000:\tpush\t\trbp\n0x1001:\tmov\t\trax, [rip + 0x13b8]\n0x1008:\n"
    );
}

#[test]
fn hex_input_with_address_and_count() {
    let text = stdout(&isotope(&[
        "--arch", "x86", "-m", "64", "--address", "0x2000", "-n", "1", "--hex", "55 48 8b 05 b8 13 00 00",
    ]));
    assert_eq!(text, "0x2000:\tpush\t\trbp\n0x2001:\n");
}

#[test]
fn detail_lines_in_text_output() {
    let text = stdout(&isotope(&["--arch", "x86", "-m", "64", "-d", "--hex", "55"]));
    assert!(text.contains("insn-mnem: push"));
    assert!(text.contains("\tImplicit registers read: rsp \n"));
}

#[test]
fn json_output() {
    let text = stdout(&isotope(&[
        "--arch", "mips", "-m", "32", "-m", "be", "--format", "json", "--hex",
        "0c100097 00000000 2402000c",
    ]));
    let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(doc["architecture"], "MIPS");
    assert_eq!(doc["instructions"].as_array().unwrap().len(), 3);
    assert_eq!(doc["instructions"][0]["mnemonic"], "jal");
    assert_eq!(doc["instructions"][2]["address"], "0x1008");
}

#[test]
fn elf_binary_detects_target_and_text() {
    let file = temp_file(&elf_with_text(&X86_64, 0x401000));
    let path = file.path().to_str().unwrap();
    let text = stdout(&isotope(&["--binary", path]));
    assert!(text.starts_with("0x401000:\tpush\t\trbp\n"), "{}", text);
    assert!(text.ends_with("0x401008:\n"));
}

#[test]
fn csv_output_for_superset() {
    let text = stdout(&isotope(&[
        "--arch", "x86", "-m", "64", "-s", "superset", "-f", "csv", "--hex", "b8 90 90 90 90",
    ]));
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("address,size,bytes,mnemonic,operands,groups"));
    assert_eq!(lines.count(), 5);
}

#[test]
fn raw_input_needs_arch() {
    let output = isotope(&["--hex", "90"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--arch"));
}

#[test]
fn bad_arguments_are_rejected() {
    assert!(!isotope(&["--arch", "x86", "-m", "128", "--hex", "90"]).status.success());
    assert!(!isotope(&["--arch", "x86", "-m", "32", "-m", "64", "--hex", "90"]).status.success());
    assert!(!isotope(&["--arch", "x86", "-m", "64", "--hex", "9"]).status.success());
}
