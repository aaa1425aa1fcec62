//! Code generation from a checked XuLang program.

pub mod c;
pub mod names;

pub use c::CCodeGen;
pub use names::CNames;

use crate::frontend::ast::Program;
use crate::frontend::symbols::SymbolTable;
use crate::utils::errors::CodegenError;
use crate::CompileOptions;

/// Generate a C translation unit.
///
/// `program` must have passed semantic analysis against `symbols`.
pub fn generate(
    program: &Program,
    symbols: &SymbolTable,
    options: &CompileOptions,
    source_name: Option<&str>,
) -> Result<String, CodegenError> {
    CCodeGen::new(symbols, options)
        .with_source_name(source_name)
        .generate(program)
}
