//! isotope command-line disassembler.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{ArgGroup, Parser};

use isotope::format::OutputFormat;
use isotope::parser::GoblinParser;
use isotope::strategy::Strategy;
use isotope::{Address, Architecture, BinaryParser, Mode, Session, Syntax};

/// Decode machine code for one of a dozen instruction-set families.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("source").required(true).args(["hex", "binary", "input"])))]
struct Args {
    /// Raw code file
    input: Option<PathBuf>,

    /// Code given as hex bytes, e.g. "55 48 8b 05"
    #[arg(long)]
    hex: Option<String>,

    /// ELF, PE or Mach-O file; architecture and mode come from its headers
    #[arg(long)]
    binary: Option<PathBuf>,

    /// Target architecture (required for raw input)
    #[arg(short, long, value_enum)]
    arch: Option<Architecture>,

    /// Mode flag, repeatable: 16, 32, 64, thumb, mclass, v8, be, micro, v9, 68040, 6809, ...
    #[arg(short, long = "mode", value_parser = parse_mode_flag)]
    modes: Vec<Mode>,

    #[arg(long, value_enum, default_value_t = Syntax::Default)]
    syntax: Syntax,

    /// Report implicit registers, groups and operand detail
    #[arg(short, long, default_value_t = false)]
    detail: bool,

    /// Address of the first byte of raw input
    #[arg(long, default_value = "0x1000", value_parser = parse_address)]
    address: Address,

    /// Stop after this many instructions per region (0 decodes everything)
    #[arg(short = 'n', long, default_value_t = 0)]
    count: usize,

    #[arg(short, long, value_enum, default_value_t = Strategy::Linear)]
    strategy: Strategy,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_mode_flag(name: &str) -> Result<Mode, String> {
    Mode::from_flag_name(name).ok_or_else(|| format!("unknown mode flag '{}'", name))
}

fn parse_address(text: &str) -> Result<Address, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(digits) => Address::from_str_radix(digits, 16),
        None => text.parse(),
    };
    parsed.map_err(|e| format!("invalid address '{}': {}", text, e))
}

/// Accepts whitespace, commas, `0x` and `\x` between byte pairs.
fn parse_hex(text: &str) -> anyhow::Result<Vec<u8>> {
    let digits: String = text
        .replace("0x", "")
        .replace("\\x", "")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();
    if !digits.is_ascii() || digits.len() % 2 != 0 {
        bail!("expected pairs of hex digits");
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .with_context(|| format!("invalid hex byte '{}'", &digits[i..i + 2]))
        })
        .collect()
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(
        match args.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        },
    ))
    .init();

    let data = match (&args.hex, args.binary.as_ref().or(args.input.as_ref())) {
        (Some(hex), _) => parse_hex(hex)?,
        (None, Some(path)) => {
            std::fs::read(path).with_context(|| format!("reading {}", path.display()))?
        }
        (None, None) => bail!("no input given"),
    };
    let metadata = match &args.binary {
        Some(_) => Some(GoblinParser::new().parse(&data)?),
        None => None,
    };

    let flags = args.modes.iter().fold(Mode::empty(), |acc, m| acc | *m);
    let (arch, mode) = match (args.arch, metadata.as_ref().and_then(|m| m.target)) {
        (Some(arch), _) => (arch, flags),
        (None, Some((arch, mode))) => (arch, mode | flags),
        (None, None) if metadata.is_some() => bail!("unknown machine type; pass --arch"),
        (None, None) => bail!("--arch is required for raw input"),
    };
    let regions = match &metadata {
        Some(metadata) => metadata.get_executable_data(&data),
        None => vec![(&data[..], args.address)],
    };

    log::info!("decoding as {} with mode {:?}", arch, mode);
    let mut session = Session::open(arch, mode)?;
    session.set_syntax(args.syntax);
    session.set_detail(args.detail);

    let formatter = args.format.get_formatter();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for (code, base) in regions {
        let disassembly = args.strategy.run(&session, code, base, args.count);
        out.write_all(formatter.format(&disassembly)?.as_bytes())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("55 48 8b 05").unwrap(), [0x55, 0x48, 0x8b, 0x05]);
        assert_eq!(parse_hex("\\x55\\x48").unwrap(), [0x55, 0x48]);
        assert_eq!(parse_hex("0x55,0x48").unwrap(), [0x55, 0x48]);
        assert!(parse_hex("554").is_err());
        assert!(parse_hex("zz").is_err());
    }

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("0x1000"), Ok(0x1000));
        assert_eq!(parse_address("4096"), Ok(4096));
        assert!(parse_address("0xg").is_err());
    }

    #[test]
    fn test_args() {
        let args = Args::try_parse_from([
            "isotope", "--arch", "x86", "-m", "64", "--hex", "55", "--format", "jsonl",
        ])
        .unwrap();
        assert_eq!(args.arch, Some(Architecture::X86));
        assert_eq!(args.modes, [Mode::MODE_64]);
        assert_eq!(args.format, OutputFormat::JsonLines);
        assert_eq!(args.address, 0x1000);

        // exactly one input source
        assert!(Args::try_parse_from(["isotope", "--arch", "x86"]).is_err());
        assert!(Args::try_parse_from(["isotope", "--hex", "55", "--binary", "a.out"]).is_err());
    }
}
