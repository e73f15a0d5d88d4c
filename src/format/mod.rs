//! Output formats for disassembly results

mod csv;
mod json;

use std::fmt;
use std::fmt::Write as _;
use std::str::FromStr;

use clap::ValueEnum;

use crate::strategy::Disassembly;
use crate::{names, Architecture, DisassemblyError, Instruction};

/// Supported output formats for disassembly results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text, one instruction per line
    #[default]
    Text,
    /// A single JSON document
    Json,
    /// One JSON object per instruction
    #[value(name = "jsonl")]
    JsonLines,
    /// Comma-separated values with a header row
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::JsonLines => write!(f, "jsonl"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "jsonlines" => Ok(OutputFormat::JsonLines),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

impl OutputFormat {
    /// Get all available output formats
    pub fn available_formats() -> &'static [Self] {
        &[
            OutputFormat::Text,
            OutputFormat::Json,
            OutputFormat::JsonLines,
            OutputFormat::Csv,
        ]
    }

    /// Get a formatter for this output format
    pub fn get_formatter(&self) -> Box<dyn DisassemblyFormatter> {
        match self {
            OutputFormat::Text => Box::new(TextFormatter),
            OutputFormat::Json => Box::new(JsonFormatter),
            OutputFormat::JsonLines => Box::new(JsonLinesFormatter),
            OutputFormat::Csv => Box::new(CsvFormatter),
        }
    }
}

/// Formatter trait for disassembly output
pub trait DisassemblyFormatter {
    /// Format a disassembly result
    fn format(&self, disassembly: &Disassembly) -> Result<String, DisassemblyError>;
}

/// Format disassembly in plain text
pub struct TextFormatter;

/// Format disassembly in JSON
pub struct JsonFormatter;

/// Format disassembly in JSON Lines
pub struct JsonLinesFormatter;

/// Format disassembly in CSV
pub struct CsvFormatter;

/// Instruction bytes as space-separated hex pairs.
pub(crate) fn hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn register_names(arch: Architecture, regs: &[u16]) -> Vec<&'static str> {
    regs.iter()
        .map(|&r| names::register_name(arch, r as u32))
        .collect()
}

pub(crate) fn group_names(arch: Architecture, groups: &[u8]) -> Vec<&'static str> {
    groups
        .iter()
        .map(|&g| names::group_name(arch, g as u32))
        .collect()
}

fn write_list(out: &mut String, label: &str, items: &[&str]) {
    if items.is_empty() {
        return;
    }
    out.push('\t');
    out.push_str(label);
    for item in items {
        out.push_str(item);
        out.push(' ');
    }
    out.push('\n');
}

fn write_instruction(out: &mut String, arch: Architecture, insn: &Instruction) {
    let _ = write!(
        out,
        "0x{:x}:\t{}\t\t{}",
        insn.address, insn.mnemonic, insn.operands
    );
    if insn.detail.is_some() {
        let _ = write!(
            out,
            " // insn-ID: {}, insn-mnem: {}",
            insn.id,
            names::instruction_name(arch, insn.id)
        );
    }
    out.push('\n');
    write_list(
        out,
        "Implicit registers read: ",
        &register_names(arch, &insn.regs_read),
    );
    write_list(
        out,
        "Implicit registers modified: ",
        &register_names(arch, &insn.regs_write),
    );
    write_list(
        out,
        "This instruction belongs to groups: ",
        &group_names(arch, &insn.groups),
    );
}

impl DisassemblyFormatter for TextFormatter {
    fn format(&self, disassembly: &Disassembly) -> Result<String, DisassemblyError> {
        let mut output = String::new();
        for insn in &disassembly.instructions {
            write_instruction(&mut output, disassembly.architecture, insn);
        }
        if !disassembly.instructions.is_empty() {
            let _ = writeln!(output, "0x{:x}:", disassembly.end_address());
        }
        Ok(output)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::strategy::Strategy;
    use crate::{Mode, Session};

    /// `push rbp; mov rax, [rip + 0x13b8]` decoded at 0x1000.
    pub(crate) fn sample(detail: bool) -> Disassembly {
        let mut session = Session::open(Architecture::X86, Mode::MODE_64).unwrap();
        session.set_detail(detail);
        Strategy::Linear.run(
            &session,
            &[0x55, 0x48, 0x8b, 0x05, 0xb8, 0x13, 0x00, 0x00],
            0x1000,
            0,
        )
    }

    #[test]
    fn test_text_formatter() {
        let text = TextFormatter.format(&sample(false)).unwrap();
        assert_eq!(
            text,
            "0x1000:\tpush\t\trbp\n0x1001:\tmov\t\trax, [rip + 0x13b8]\n0x1008:\n"
        );
    }

    #[test]
    fn test_text_formatter_detail() {
        let text = TextFormatter.format(&sample(true)).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("0x1000:\tpush\t\trbp // insn-ID: "));
        assert!(lines[0].ends_with("insn-mnem: push"));
        assert_eq!(lines[1], "\tImplicit registers read: rsp ");
        assert_eq!(lines[2], "\tImplicit registers modified: rsp ");
        assert!(text.ends_with("0x1008:\n"));
    }

    #[test]
    fn test_format_selection() {
        for format in OutputFormat::available_formats() {
            assert_eq!(format.to_string().parse::<OutputFormat>(), Ok(*format));
            assert!(format.get_formatter().format(&sample(false)).is_ok());
        }
        assert!("ngram".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_hex_bytes() {
        assert_eq!(hex_bytes(&[0x48, 0x8b, 0x05]), "48 8b 05");
        assert_eq!(hex_bytes(&[]), "");
    }
}
