//! JSON and JSON Lines output formatters

use serde::{Deserialize, Serialize};

use super::{group_names, hex_bytes, register_names, DisassemblyFormatter};
use crate::strategy::Disassembly;
use crate::{names, Architecture, DisassemblyError, Instruction};

/// Serializable instruction for JSON output
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct InstructionJson {
    /// Address of the instruction
    pub address: String,
    /// Size of the instruction in bytes
    pub size: u8,
    /// Bytes of the instruction as hex string
    pub bytes: String,
    /// Architecture-scoped instruction id
    pub id: u32,
    /// Mnemonic as printed, including prefixes and suffixes
    pub mnemonic: String,
    /// Rendered operands
    pub operands: String,
    /// Registry name of the instruction id
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regs_read: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regs_write: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
}

impl InstructionJson {
    pub fn new(arch: Architecture, insn: &Instruction) -> Self {
        let owned = |v: Vec<&str>| v.into_iter().map(String::from).collect();
        Self {
            address: format!("0x{:x}", insn.address),
            size: insn.size,
            bytes: hex_bytes(insn.bytes()),
            id: insn.id,
            mnemonic: insn.mnemonic.clone(),
            operands: insn.operands.clone(),
            name: names::instruction_name(arch, insn.id).to_string(),
            regs_read: owned(register_names(arch, &insn.regs_read)),
            regs_write: owned(register_names(arch, &insn.regs_write)),
            groups: owned(group_names(arch, &insn.groups)),
        }
    }
}

/// Serializable disassembly result for JSON output
#[derive(Debug, Serialize, Deserialize)]
struct DisassemblyJson {
    architecture: String,
    strategy: String,
    base_address: String,
    end_address: String,
    instructions: Vec<InstructionJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stopped: Option<String>,
}

fn json_error(e: serde_json::Error) -> DisassemblyError {
    DisassemblyError::Format(format!("JSON serialization error: {}", e))
}

impl DisassemblyFormatter for super::JsonFormatter {
    fn format(&self, disassembly: &Disassembly) -> Result<String, DisassemblyError> {
        let arch = disassembly.architecture;
        let result = DisassemblyJson {
            architecture: arch.to_string(),
            strategy: disassembly.strategy.to_string(),
            base_address: format!("0x{:x}", disassembly.address),
            end_address: format!("0x{:x}", disassembly.end_address()),
            instructions: disassembly
                .instructions
                .iter()
                .map(|insn| InstructionJson::new(arch, insn))
                .collect(),
            stopped: disassembly.stopped.as_ref().map(ToString::to_string),
        };

        serde_json::to_string_pretty(&result).map_err(json_error)
    }
}

impl DisassemblyFormatter for super::JsonLinesFormatter {
    fn format(&self, disassembly: &Disassembly) -> Result<String, DisassemblyError> {
        let mut output = String::new();
        for insn in &disassembly.instructions {
            let line = InstructionJson::new(disassembly.architecture, insn);
            output.push_str(&serde_json::to_string(&line).map_err(json_error)?);
            output.push('\n');
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::sample;
    use super::super::{JsonFormatter, JsonLinesFormatter};
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_json_document() {
        let text = JsonFormatter.format(&sample(false)).unwrap();
        let doc: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(doc["base_address"], "0x1000");
        assert_eq!(doc["end_address"], "0x1008");
        assert_eq!(doc["instructions"][1]["bytes"], "48 8b 05 b8 13 00 00");
        assert_eq!(doc["instructions"][1]["name"], "mov");
        assert!(doc.get("stopped").is_none());
        // no implicit registers without detail mode
        assert!(doc["instructions"][0].get("regs_read").is_none());
    }

    #[test]
    fn test_json_lines() {
        let text = JsonLinesFormatter.format(&sample(true)).unwrap();
        let lines: Vec<InstructionJson> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].mnemonic, "push");
        assert_eq!(lines[0].regs_read, ["rsp"]);
        assert_eq!(lines[1].address, "0x1001");
    }
}
