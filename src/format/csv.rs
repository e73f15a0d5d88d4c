//! CSV output formatter

use serde::Serialize;

use super::{group_names, hex_bytes, DisassemblyFormatter};
use crate::strategy::Disassembly;
use crate::DisassemblyError;

#[derive(Serialize)]
struct Row<'a> {
    address: String,
    size: u8,
    bytes: String,
    mnemonic: &'a str,
    operands: &'a str,
    groups: String,
}

impl DisassemblyFormatter for super::CsvFormatter {
    fn format(&self, disassembly: &Disassembly) -> Result<String, DisassemblyError> {
        let csv_error = |e: csv::Error| DisassemblyError::Format(format!("CSV error: {}", e));
        let mut writer = csv::Writer::from_writer(Vec::new());

        for insn in &disassembly.instructions {
            writer
                .serialize(Row {
                    address: format!("0x{:x}", insn.address),
                    size: insn.size,
                    bytes: hex_bytes(insn.bytes()),
                    mnemonic: &insn.mnemonic,
                    operands: &insn.operands,
                    groups: group_names(disassembly.architecture, &insn.groups).join(" "),
                })
                .map_err(csv_error)?;
        }
        if disassembly.instructions.is_empty() {
            writer
                .write_record(["address", "size", "bytes", "mnemonic", "operands", "groups"])
                .map_err(csv_error)?;
        }

        let data = writer
            .into_inner()
            .map_err(|e| DisassemblyError::Format(format!("CSV error: {}", e)))?;
        String::from_utf8(data).map_err(|e| DisassemblyError::Format(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::sample;
    use super::super::CsvFormatter;
    use super::*;

    #[test]
    fn test_csv_rows() {
        let text = CsvFormatter.format(&sample(false)).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "address,size,bytes,mnemonic,operands,groups");
        assert_eq!(lines[1], "0x1000,1,55,push,rbp,");
        // operands with commas are quoted
        assert_eq!(
            lines[2],
            "0x1001,7,48 8b 05 b8 13 00 00,mov,\"rax, [rip + 0x13b8]\","
        );
    }

    #[test]
    fn test_csv_header_only() {
        let mut empty = sample(false);
        empty.instructions.clear();
        assert_eq!(
            CsvFormatter.format(&empty).unwrap(),
            "address,size,bytes,mnemonic,operands,groups\n"
        );
    }
}
