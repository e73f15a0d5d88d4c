//! Disassembly strategies

use std::fmt;

use clap::ValueEnum;

use crate::{Address, Architecture, DecodeError, Instruction, Session};

pub mod linear;
pub mod superset;

/// Available disassembly strategies.
#[derive(Copy, Clone, ValueEnum, Debug, Default, PartialEq, Eq)]
pub enum Strategy {
    /// Linear sweep, stopping at the first undecodable bytes
    #[default]
    Linear,
    /// One decode attempt at every byte offset
    Superset,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Linear => write!(f, "Linear sweep"),
            Strategy::Superset => write!(f, "Superset"),
        }
    }
}

impl Strategy {
    /// Run the selected strategy over `code`, whose first byte sits at `address`.
    ///
    /// `max_instructions` of 0 means no limit.
    pub fn run(
        &self,
        session: &Session,
        code: &[u8],
        address: Address,
        max_instructions: usize,
    ) -> Disassembly {
        match self {
            Strategy::Linear => linear::run(session, code, address, max_instructions),
            Strategy::Superset => superset::run(session, code, address, max_instructions),
        }
    }

    /// Return all available strategies
    pub fn all() -> &'static [Strategy] {
        &[Strategy::Linear, Strategy::Superset]
    }
}

/// Instructions decoded from one region.
#[derive(Debug, Clone)]
pub struct Disassembly {
    pub architecture: Architecture,
    pub strategy: Strategy,
    /// Address of the first byte of the region
    pub address: Address,
    /// Instructions sorted by address
    pub instructions: Vec<Instruction>,
    /// Why a linear sweep ended before the end of the region
    pub stopped: Option<DecodeError>,
}

impl Disassembly {
    /// Address following the last decoded instruction.
    pub fn end_address(&self) -> Address {
        self.instructions
            .last()
            .map_or(self.address, Instruction::next_address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mode;

    #[test]
    fn test_strategy_display() {
        assert_eq!(Strategy::Linear.to_string(), "Linear sweep");
        assert_eq!(Strategy::Superset.to_string(), "Superset");
        assert_eq!(Strategy::default(), Strategy::Linear);
    }

    #[test]
    fn test_linear_strategy() {
        let session = Session::open(Architecture::X86, Mode::MODE_32).unwrap();
        let result = Strategy::Linear.run(&session, &[0x90, 0x90], 0x400000, 0);

        assert_eq!(result.instructions.len(), 2);
        assert_eq!(result.instructions[0].mnemonic, "nop");
        assert_eq!(result.instructions[1].address, 0x400001);
        assert_eq!(result.end_address(), 0x400002);
        assert!(result.stopped.is_none());
    }

    #[test]
    fn test_empty_region() {
        let session = Session::open(Architecture::X86, Mode::MODE_32).unwrap();
        for strategy in Strategy::all() {
            let result = strategy.run(&session, &[], 0x1000, 0);
            assert!(result.instructions.is_empty());
            assert_eq!(result.end_address(), 0x1000);
        }
    }
}
