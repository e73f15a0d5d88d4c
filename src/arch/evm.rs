//! Ethereum Virtual Machine bytecode.
//!
//! Every opcode is one byte; `PUSH1`..`PUSH32` are followed by 1..32 immediate bytes that
//! are printed as a single big-endian hex literal. Unassigned opcodes are invalid.

use crate::cursor::Cursor;
use crate::decoder::{self, ArchDecoder, DecodeConfig, DecodeError, StreamState};
use crate::detail::{CommonGroup, Detail, DetailParts};
use crate::names::NameTables;
use crate::{Address, Architecture, Instruction};

registry! {
    /// The EVM has no registers; only the invalid id exists.
    pub enum EvmReg: u8 {
        Invalid => "",
    }
}

registry! {
    /// EVM instructions in opcode order.
    pub enum EvmInsn: u16 {
        Invalid => "", Stop => "stop", Add => "add", Mul => "mul",
        Sub => "sub", Div => "div", Sdiv => "sdiv", Mod => "mod",
        Smod => "smod", Addmod => "addmod", Mulmod => "mulmod", Exp => "exp",
        Signextend => "signextend", Lt => "lt", Gt => "gt", Slt => "slt",
        Sgt => "sgt", Eq => "eq", Iszero => "iszero", And => "and",
        Or => "or", Xor => "xor", Not => "not", Byte => "byte",
        Sha3 => "sha3", Address => "address", Balance => "balance", Origin => "origin",
        Caller => "caller", Callvalue => "callvalue", Calldataload => "calldataload", Calldatasize => "calldatasize",
        Calldatacopy => "calldatacopy", Codesize => "codesize", Codecopy => "codecopy", Gasprice => "gasprice",
        Extcodesize => "extcodesize", Extcodecopy => "extcodecopy", Returndatasize => "returndatasize", Returndatacopy => "returndatacopy",
        Blockhash => "blockhash", Coinbase => "coinbase", Timestamp => "timestamp", Number => "number",
        Difficulty => "difficulty", Gaslimit => "gaslimit", Pop => "pop", Mload => "mload",
        Mstore => "mstore", Mstore8 => "mstore8", Sload => "sload", Sstore => "sstore",
        Jump => "jump", Jumpi => "jumpi", Pc => "pc", Msize => "msize",
        Gas => "gas", Jumpdest => "jumpdest", Push1 => "push1", Push2 => "push2",
        Push3 => "push3", Push4 => "push4", Push5 => "push5", Push6 => "push6",
        Push7 => "push7", Push8 => "push8", Push9 => "push9", Push10 => "push10",
        Push11 => "push11", Push12 => "push12", Push13 => "push13", Push14 => "push14",
        Push15 => "push15", Push16 => "push16", Push17 => "push17", Push18 => "push18",
        Push19 => "push19", Push20 => "push20", Push21 => "push21", Push22 => "push22",
        Push23 => "push23", Push24 => "push24", Push25 => "push25", Push26 => "push26",
        Push27 => "push27", Push28 => "push28", Push29 => "push29", Push30 => "push30",
        Push31 => "push31", Push32 => "push32", Dup1 => "dup1", Dup2 => "dup2",
        Dup3 => "dup3", Dup4 => "dup4", Dup5 => "dup5", Dup6 => "dup6",
        Dup7 => "dup7", Dup8 => "dup8", Dup9 => "dup9", Dup10 => "dup10",
        Dup11 => "dup11", Dup12 => "dup12", Dup13 => "dup13", Dup14 => "dup14",
        Dup15 => "dup15", Dup16 => "dup16", Swap1 => "swap1", Swap2 => "swap2",
        Swap3 => "swap3", Swap4 => "swap4", Swap5 => "swap5", Swap6 => "swap6",
        Swap7 => "swap7", Swap8 => "swap8", Swap9 => "swap9", Swap10 => "swap10",
        Swap11 => "swap11", Swap12 => "swap12", Swap13 => "swap13", Swap14 => "swap14",
        Swap15 => "swap15", Swap16 => "swap16", Log0 => "log0", Log1 => "log1",
        Log2 => "log2", Log3 => "log3", Log4 => "log4", Create => "create",
        Call => "call", Callcode => "callcode", Return => "return", Delegatecall => "delegatecall",
        Callblackbox => "callblackbox", Staticcall => "staticcall", Revert => "revert", Suicide => "suicide",
    }
}

registry! {
    /// EVM-specific groups; ids start at 128.
    pub enum EvmGroup: u8 {
        Math => "math",
        StackWrite => "stack_write",
        StackRead => "stack_read",
        MemWrite => "mem_write",
        MemRead => "mem_read",
        StoreWrite => "store_write",
        StoreRead => "store_read",
        Halt => "halt",
    }
}

pub static NAMES: NameTables = NameTables {
    registers: EvmReg::NAMES,
    instructions: EvmInsn::NAMES,
    groups: EvmGroup::NAMES,
};

/// Stack effect and base gas cost of one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvmDetail {
    /// Items popped from the stack.
    pub pop: u8,
    /// Items pushed onto the stack.
    pub push: u8,
    /// Base gas fee.
    pub fee: u32,
}

#[derive(Debug, Clone, Copy)]
enum Class {
    Jump,
    Call,
    Group(EvmGroup),
}

use EvmGroup as G;
use EvmInsn as I;

/// `(opcode, instruction, pop, push, fee, class)`, sorted by opcode.
const OPCODES: &[(u8, I, u8, u8, u32, Option<Class>)] = &[
    (0x00, I::Stop, 0, 0, 0, Some(Class::Group(G::Halt))),
    (0x01, I::Add, 2, 1, 3, Some(Class::Group(G::Math))),
    (0x02, I::Mul, 2, 1, 5, Some(Class::Group(G::Math))),
    (0x03, I::Sub, 2, 1, 3, Some(Class::Group(G::Math))),
    (0x04, I::Div, 2, 1, 5, Some(Class::Group(G::Math))),
    (0x05, I::Sdiv, 2, 1, 5, Some(Class::Group(G::Math))),
    (0x06, I::Mod, 2, 1, 5, Some(Class::Group(G::Math))),
    (0x07, I::Smod, 2, 1, 5, Some(Class::Group(G::Math))),
    (0x08, I::Addmod, 3, 1, 8, Some(Class::Group(G::Math))),
    (0x09, I::Mulmod, 3, 1, 8, Some(Class::Group(G::Math))),
    (0x0a, I::Exp, 2, 1, 10, Some(Class::Group(G::Math))),
    (0x0b, I::Signextend, 2, 1, 5, Some(Class::Group(G::Math))),
    (0x10, I::Lt, 2, 1, 3, Some(Class::Group(G::Math))),
    (0x11, I::Gt, 2, 1, 3, Some(Class::Group(G::Math))),
    (0x12, I::Slt, 2, 1, 3, Some(Class::Group(G::Math))),
    (0x13, I::Sgt, 2, 1, 3, Some(Class::Group(G::Math))),
    (0x14, I::Eq, 2, 1, 3, Some(Class::Group(G::Math))),
    (0x15, I::Iszero, 1, 1, 3, Some(Class::Group(G::Math))),
    (0x16, I::And, 2, 1, 3, Some(Class::Group(G::Math))),
    (0x17, I::Or, 2, 1, 3, Some(Class::Group(G::Math))),
    (0x18, I::Xor, 2, 1, 3, Some(Class::Group(G::Math))),
    (0x19, I::Not, 1, 1, 3, Some(Class::Group(G::Math))),
    (0x1a, I::Byte, 2, 1, 3, Some(Class::Group(G::Math))),
    (0x20, I::Sha3, 2, 1, 30, Some(Class::Group(G::Math))),
    (0x30, I::Address, 0, 1, 2, None),
    (0x31, I::Balance, 1, 1, 20, None),
    (0x32, I::Origin, 0, 1, 2, None),
    (0x33, I::Caller, 0, 1, 2, None),
    (0x34, I::Callvalue, 0, 1, 2, None),
    (0x35, I::Calldataload, 1, 1, 3, None),
    (0x36, I::Calldatasize, 0, 1, 2, None),
    (0x37, I::Calldatacopy, 3, 0, 3, Some(Class::Group(G::MemWrite))),
    (0x38, I::Codesize, 0, 1, 2, None),
    (0x39, I::Codecopy, 3, 0, 3, Some(Class::Group(G::MemWrite))),
    (0x3a, I::Gasprice, 0, 1, 2, None),
    (0x3b, I::Extcodesize, 1, 1, 20, None),
    (0x3c, I::Extcodecopy, 4, 0, 20, Some(Class::Group(G::MemWrite))),
    (0x3d, I::Returndatasize, 0, 1, 2, None),
    (0x3e, I::Returndatacopy, 3, 0, 3, Some(Class::Group(G::MemWrite))),
    (0x40, I::Blockhash, 1, 1, 20, None),
    (0x41, I::Coinbase, 0, 1, 2, None),
    (0x42, I::Timestamp, 0, 1, 2, None),
    (0x43, I::Number, 0, 1, 2, None),
    (0x44, I::Difficulty, 0, 1, 2, None),
    (0x45, I::Gaslimit, 0, 1, 2, None),
    (0x50, I::Pop, 1, 0, 2, Some(Class::Group(G::StackRead))),
    (0x51, I::Mload, 1, 1, 3, Some(Class::Group(G::MemRead))),
    (0x52, I::Mstore, 2, 0, 3, Some(Class::Group(G::MemWrite))),
    (0x53, I::Mstore8, 2, 0, 3, Some(Class::Group(G::MemWrite))),
    (0x54, I::Sload, 1, 1, 50, Some(Class::Group(G::StoreRead))),
    (0x55, I::Sstore, 2, 0, 0, Some(Class::Group(G::StoreWrite))),
    (0x56, I::Jump, 1, 0, 8, Some(Class::Jump)),
    (0x57, I::Jumpi, 2, 0, 10, Some(Class::Jump)),
    (0x58, I::Pc, 0, 1, 2, None),
    (0x59, I::Msize, 0, 1, 2, None),
    (0x5a, I::Gas, 0, 1, 2, None),
    (0x5b, I::Jumpdest, 0, 0, 1, None),
    (0x60, I::Push1, 0, 1, 3, Some(Class::Group(G::StackWrite))),
    (0x61, I::Push2, 0, 1, 3, Some(Class::Group(G::StackWrite))),
    (0x62, I::Push3, 0, 1, 3, Some(Class::Group(G::StackWrite))),
    (0x63, I::Push4, 0, 1, 3, Some(Class::Group(G::StackWrite))),
    (0x64, I::Push5, 0, 1, 3, Some(Class::Group(G::StackWrite))),
    (0x65, I::Push6, 0, 1, 3, Some(Class::Group(G::StackWrite))),
    (0x66, I::Push7, 0, 1, 3, Some(Class::Group(G::StackWrite))),
    (0x67, I::Push8, 0, 1, 3, Some(Class::Group(G::StackWrite))),
    (0x68, I::Push9, 0, 1, 3, Some(Class::Group(G::StackWrite))),
    (0x69, I::Push10, 0, 1, 3, Some(Class::Group(G::StackWrite))),
    (0x6a, I::Push11, 0, 1, 3, Some(Class::Group(G::StackWrite))),
    (0x6b, I::Push12, 0, 1, 3, Some(Class::Group(G::StackWrite))),
    (0x6c, I::Push13, 0, 1, 3, Some(Class::Group(G::StackWrite))),
    (0x6d, I::Push14, 0, 1, 3, Some(Class::Group(G::StackWrite))),
    (0x6e, I::Push15, 0, 1, 3, Some(Class::Group(G::StackWrite))),
    (0x6f, I::Push16, 0, 1, 3, Some(Class::Group(G::StackWrite))),
    (0x70, I::Push17, 0, 1, 3, Some(Class::Group(G::StackWrite))),
    (0x71, I::Push18, 0, 1, 3, Some(Class::Group(G::StackWrite))),
    (0x72, I::Push19, 0, 1, 3, Some(Class::Group(G::StackWrite))),
    (0x73, I::Push20, 0, 1, 3, Some(Class::Group(G::StackWrite))),
    (0x74, I::Push21, 0, 1, 3, Some(Class::Group(G::StackWrite))),
    (0x75, I::Push22, 0, 1, 3, Some(Class::Group(G::StackWrite))),
    (0x76, I::Push23, 0, 1, 3, Some(Class::Group(G::StackWrite))),
    (0x77, I::Push24, 0, 1, 3, Some(Class::Group(G::StackWrite))),
    (0x78, I::Push25, 0, 1, 3, Some(Class::Group(G::StackWrite))),
    (0x79, I::Push26, 0, 1, 3, Some(Class::Group(G::StackWrite))),
    (0x7a, I::Push27, 0, 1, 3, Some(Class::Group(G::StackWrite))),
    (0x7b, I::Push28, 0, 1, 3, Some(Class::Group(G::StackWrite))),
    (0x7c, I::Push29, 0, 1, 3, Some(Class::Group(G::StackWrite))),
    (0x7d, I::Push30, 0, 1, 3, Some(Class::Group(G::StackWrite))),
    (0x7e, I::Push31, 0, 1, 3, Some(Class::Group(G::StackWrite))),
    (0x7f, I::Push32, 0, 1, 3, Some(Class::Group(G::StackWrite))),
    (0x80, I::Dup1, 1, 2, 3, Some(Class::Group(G::StackWrite))),
    (0x81, I::Dup2, 2, 3, 3, Some(Class::Group(G::StackWrite))),
    (0x82, I::Dup3, 3, 4, 3, Some(Class::Group(G::StackWrite))),
    (0x83, I::Dup4, 4, 5, 3, Some(Class::Group(G::StackWrite))),
    (0x84, I::Dup5, 5, 6, 3, Some(Class::Group(G::StackWrite))),
    (0x85, I::Dup6, 6, 7, 3, Some(Class::Group(G::StackWrite))),
    (0x86, I::Dup7, 7, 8, 3, Some(Class::Group(G::StackWrite))),
    (0x87, I::Dup8, 8, 9, 3, Some(Class::Group(G::StackWrite))),
    (0x88, I::Dup9, 9, 10, 3, Some(Class::Group(G::StackWrite))),
    (0x89, I::Dup10, 10, 11, 3, Some(Class::Group(G::StackWrite))),
    (0x8a, I::Dup11, 11, 12, 3, Some(Class::Group(G::StackWrite))),
    (0x8b, I::Dup12, 12, 13, 3, Some(Class::Group(G::StackWrite))),
    (0x8c, I::Dup13, 13, 14, 3, Some(Class::Group(G::StackWrite))),
    (0x8d, I::Dup14, 14, 15, 3, Some(Class::Group(G::StackWrite))),
    (0x8e, I::Dup15, 15, 16, 3, Some(Class::Group(G::StackWrite))),
    (0x8f, I::Dup16, 16, 17, 3, Some(Class::Group(G::StackWrite))),
    (0x90, I::Swap1, 2, 2, 3, Some(Class::Group(G::StackWrite))),
    (0x91, I::Swap2, 3, 3, 3, Some(Class::Group(G::StackWrite))),
    (0x92, I::Swap3, 4, 4, 3, Some(Class::Group(G::StackWrite))),
    (0x93, I::Swap4, 5, 5, 3, Some(Class::Group(G::StackWrite))),
    (0x94, I::Swap5, 6, 6, 3, Some(Class::Group(G::StackWrite))),
    (0x95, I::Swap6, 7, 7, 3, Some(Class::Group(G::StackWrite))),
    (0x96, I::Swap7, 8, 8, 3, Some(Class::Group(G::StackWrite))),
    (0x97, I::Swap8, 9, 9, 3, Some(Class::Group(G::StackWrite))),
    (0x98, I::Swap9, 10, 10, 3, Some(Class::Group(G::StackWrite))),
    (0x99, I::Swap10, 11, 11, 3, Some(Class::Group(G::StackWrite))),
    (0x9a, I::Swap11, 12, 12, 3, Some(Class::Group(G::StackWrite))),
    (0x9b, I::Swap12, 13, 13, 3, Some(Class::Group(G::StackWrite))),
    (0x9c, I::Swap13, 14, 14, 3, Some(Class::Group(G::StackWrite))),
    (0x9d, I::Swap14, 15, 15, 3, Some(Class::Group(G::StackWrite))),
    (0x9e, I::Swap15, 16, 16, 3, Some(Class::Group(G::StackWrite))),
    (0x9f, I::Swap16, 17, 17, 3, Some(Class::Group(G::StackWrite))),
    (0xa0, I::Log0, 2, 0, 375, Some(Class::Group(G::MemRead))),
    (0xa1, I::Log1, 3, 0, 750, Some(Class::Group(G::MemRead))),
    (0xa2, I::Log2, 4, 0, 1125, Some(Class::Group(G::MemRead))),
    (0xa3, I::Log3, 5, 0, 1500, Some(Class::Group(G::MemRead))),
    (0xa4, I::Log4, 6, 0, 1875, Some(Class::Group(G::MemRead))),
    (0xf0, I::Create, 3, 1, 32000, None),
    (0xf1, I::Call, 7, 1, 40, Some(Class::Call)),
    (0xf2, I::Callcode, 7, 1, 40, Some(Class::Call)),
    (0xf3, I::Return, 2, 0, 0, Some(Class::Group(G::Halt))),
    (0xf4, I::Delegatecall, 6, 1, 40, Some(Class::Call)),
    (0xf5, I::Callblackbox, 7, 1, 40, Some(Class::Call)),
    (0xfa, I::Staticcall, 6, 1, 40, Some(Class::Call)),
    (0xfd, I::Revert, 2, 0, 0, Some(Class::Group(G::Halt))),
    (0xff, I::Suicide, 1, 0, 0, Some(Class::Group(G::Halt))),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct EvmDecoder;

impl ArchDecoder for EvmDecoder {
    fn architecture(&self) -> Architecture {
        Architecture::Evm
    }

    fn decode_one(
        &self,
        cursor: &mut Cursor<'_>,
        address: Address,
        config: &DecodeConfig,
        _state: &mut StreamState,
    ) -> Result<Instruction, DecodeError> {
        let opcode = cursor.read_u8()?;
        let index = OPCODES
            .binary_search_by_key(&opcode, |entry| entry.0)
            .map_err(|_| DecodeError::InvalidEncoding)?;
        let (_, insn, pop, push, fee, class) = OPCODES[index];

        let operands = match opcode {
            0x60..=0x7f => {
                let data = cursor.take((opcode - 0x5f) as usize)?;
                let digits: String = data.iter().map(|b| format!("{:02x}", b)).collect();
                format!("0x{}", digits)
            }
            _ => String::new(),
        };

        Ok(decoder::finish(
            cursor,
            address,
            insn.id() as u32,
            insn.name().to_string(),
            operands,
            config,
            || {
                let mut parts = DetailParts::new(Detail::Evm(EvmDetail { pop, push, fee }));
                match class {
                    Some(Class::Jump) => parts.common(CommonGroup::Jump),
                    Some(Class::Call) => parts.common(CommonGroup::Call),
                    Some(Class::Group(group)) => parts.arch_group(group.id()),
                    None => {}
                }
                parts
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::Mode;
    use crate::Session;

    fn session(detail: bool) -> Session {
        let mut session = Session::open(Architecture::Evm, Mode::empty()).unwrap();
        session.set_detail(detail);
        session
    }

    #[test]
    fn test_push() {
        let insns = session(false).disassemble_all(b"\x60\x61", 0x80001000, 0);
        assert_eq!(insns.len(), 1);
        assert_eq!(insns[0].mnemonic, "push1");
        assert_eq!(insns[0].operands, "0x61");
        assert_eq!(insns[0].size, 2);
        assert_eq!(insns[0].id, EvmInsn::Push1.id() as u32);
    }

    #[test]
    fn test_stream() {
        // push2 0x0080; push1 0x40; mstore; callvalue; dup1; iszero; push2 0x0010; jumpi
        let code = [
            0x61, 0x00, 0x80, 0x60, 0x40, 0x52, 0x34, 0x80, 0x15, 0x61, 0x00, 0x10, 0x57,
        ];
        let insns = session(false).disassemble_all(&code, 0, 0);
        let text: Vec<String> = insns
            .iter()
            .map(|i| format!("{} {}", i.mnemonic, i.operands).trim_end().to_string())
            .collect();
        assert_eq!(
            text,
            ["push2 0x0080", "push1 0x40", "mstore", "callvalue", "dup1", "iszero", "push2 0x0010", "jumpi"]
        );
        assert_eq!(insns[7].address, 12);
    }

    #[test]
    fn test_detail() {
        let session = session(true);
        let add = session.decode_at(&[0x01], 0).unwrap();
        assert_eq!(add.detail, Some(Detail::Evm(EvmDetail { pop: 2, push: 1, fee: 3 })));
        assert!(add.in_group(128 + EvmGroup::Math.id()));

        let swap = session.decode_at(&[0x9f], 0).unwrap();
        assert_eq!(swap.mnemonic, "swap16");
        assert_eq!(swap.detail, Some(Detail::Evm(EvmDetail { pop: 17, push: 17, fee: 3 })));

        let jump = session.decode_at(&[0x56], 0).unwrap();
        assert!(jump.is_branch());
        assert!(jump.regs_read.is_empty());

        let log2 = session.decode_at(&[0xa2], 0).unwrap();
        assert_eq!(log2.detail, Some(Detail::Evm(EvmDetail { pop: 4, push: 0, fee: 1125 })));
    }

    #[test]
    fn test_invalid_and_truncated() {
        let session = session(false);
        assert_eq!(session.decode_at(&[0x0c], 0), Err(DecodeError::InvalidEncoding));
        // push4 with only two immediate bytes
        assert!(matches!(
            session.decode_at(&[0x63, 0x01, 0x02], 0),
            Err(DecodeError::TruncatedInstruction(_))
        ));
        assert_eq!(session.disassemble_all(&[0x00, 0x0c, 0x00], 0, 0).len(), 1);
    }

    #[test]
    fn test_names() {
        assert_eq!(EvmInsn::Suicide.name(), "suicide");
        assert_eq!(EvmReg::Invalid.name(), "");
        assert_eq!(EvmGroup::from_id(7), Some(EvmGroup::Halt));
    }
}
