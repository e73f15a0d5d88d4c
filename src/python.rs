//! Python bindings for the isotope decoder

use clap::ValueEnum;
use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyBytes, PyDict};

use crate::format::{group_names, register_names, OutputFormat};
use crate::strategy::Strategy;
use crate::{
    names, parser::GoblinParser, Architecture, BinaryParser, Mode, Session, Syntax,
};

fn value_error(e: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn parse_arch(arch: &str) -> PyResult<Architecture> {
    Architecture::from_str(arch, true)
        .map_err(|_| PyValueError::new_err(format!("Unknown architecture: {}", arch)))
}

fn parse_mode(flags: &[String]) -> PyResult<Mode> {
    flags.iter().try_fold(Mode::empty(), |mode, name| {
        Mode::from_flag_name(name)
            .map(|flag| mode | flag)
            .ok_or_else(|| PyValueError::new_err(format!("Unknown mode flag: {}", name)))
    })
}

/// Decode `code` and return one dict per instruction.
#[pyfunction]
#[pyo3(signature = (arch, code, mode=Vec::new(), address=0, count=0, syntax="default", detail=false))]
#[allow(clippy::too_many_arguments)]
fn disassemble<'py>(
    py: Python<'py>,
    arch: &str,
    code: Vec<u8>,
    mode: Vec<String>,
    address: u64,
    count: usize,
    syntax: &str,
    detail: bool,
) -> PyResult<Vec<Bound<'py, PyDict>>> {
    let arch = parse_arch(arch)?;
    let mut session = Session::open(arch, parse_mode(&mode)?).map_err(value_error)?;
    session.set_syntax(Syntax::from_str(syntax, true).map_err(value_error)?);
    session.set_detail(detail);

    session
        .disassemble(&code, address, count)
        .map(|insn| {
            let dict = PyDict::new(py);
            dict.set_item("address", insn.address)?;
            dict.set_item("size", insn.size)?;
            dict.set_item("bytes", PyBytes::new(py, insn.bytes()))?;
            dict.set_item("id", insn.id)?;
            dict.set_item("mnemonic", &insn.mnemonic)?;
            dict.set_item("op_str", &insn.operands)?;
            dict.set_item("regs_read", register_names(arch, &insn.regs_read))?;
            dict.set_item("regs_write", register_names(arch, &insn.regs_write))?;
            dict.set_item("groups", group_names(arch, &insn.groups))?;
            Ok(dict)
        })
        .collect()
}

/// Load an executable, decode its code regions and render them in `output_format`.
#[pyfunction]
#[pyo3(signature = (file_path, strategy="linear", output_format="text", detail=false))]
fn disassemble_file(
    file_path: &str,
    strategy: &str,
    output_format: &str,
    detail: bool,
) -> PyResult<String> {
    let bytes = std::fs::read(file_path)
        .map_err(|e| PyIOError::new_err(format!("Failed to read file {}: {}", file_path, e)))?;
    let metadata = GoblinParser::new().parse(&bytes).map_err(value_error)?;
    let (arch, mode) = metadata
        .target
        .ok_or_else(|| PyValueError::new_err("Unrecognised machine type"))?;

    let mut session = Session::open(arch, mode).map_err(value_error)?;
    session.set_detail(detail);
    let strategy = Strategy::from_str(strategy, true).map_err(value_error)?;
    let formatter = output_format
        .parse::<OutputFormat>()
        .map_err(value_error)?
        .get_formatter();

    let mut all_output = String::new();
    for (region, base) in metadata.get_executable_data(&bytes) {
        let disassembly = strategy.run(&session, region, base, 0);
        all_output.push_str(&formatter.format(&disassembly).map_err(value_error)?);
    }
    Ok(all_output)
}

#[pyfunction]
fn register_name(arch: &str, id: u32) -> PyResult<&'static str> {
    Ok(names::register_name(parse_arch(arch)?, id))
}

#[pyfunction]
fn instruction_name(arch: &str, id: u32) -> PyResult<&'static str> {
    Ok(names::instruction_name(parse_arch(arch)?, id))
}

#[pyfunction]
fn version() -> (u32, u32) {
    crate::version()
}

/// Python module initialization
#[pymodule]
fn isotope(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(disassemble, m)?)?;
    m.add_function(wrap_pyfunction!(disassemble_file, m)?)?;
    m.add_function(wrap_pyfunction!(register_name, m)?)?;
    m.add_function(wrap_pyfunction!(instruction_name, m)?)?;
    m.add_function(wrap_pyfunction!(version, m)?)?;

    let py = m.py();
    let output_format = PyDict::new(py);
    for format in OutputFormat::available_formats() {
        output_format.set_item(format.to_string().to_uppercase(), format.to_string())?;
    }
    m.setattr("OutputFormat", output_format)?;

    let strategy = PyDict::new(py);
    strategy.set_item("LINEAR", "linear")?;
    strategy.set_item("SUPERSET", "superset")?;
    m.setattr("Strategy", strategy)?;

    Ok(())
}
