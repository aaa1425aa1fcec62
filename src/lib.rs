//! # XuLang - a teaching language that compiles to C
//!
//! XuLang programs use Portuguese keywords and have exactly two sections:
//! declarations and statements. This crate turns such a program into a
//! self-contained C translation unit, or into a list of diagnostics that
//! point at the offending line and column.
//!
//! ## Architecture
//!
//! ```text
//! Source → Lexer → Parser → Semantic Analysis → CodeGen → C
//! ```
//!
//! Lexical and syntax errors stop the pipeline at the first problem.
//! Semantic errors are all collected; no C is produced while any exist.
//!
//! ## Example
//!
//! ```rust
//! use xulang::{CompileOptions, Compiler, CompileOutput};
//!
//! let source = r#"
//! : DECLARACOES
//! idade : INTEIRO
//! : PROGRAMA
//! LEIA idade
//! SE idade >= 18 ENTAO
//!     ESCREVA "Maior de idade"
//! FIM
//! "#;
//!
//! let compiler = Compiler::new(CompileOptions::default()).unwrap();
//! match compiler.compile(source, Some("idade.xu")) {
//!     CompileOutput::Success { code } => assert!(code.contains("if (idade >= 18) {")),
//!     CompileOutput::Failure { diagnostics } => panic!("{:?}", diagnostics),
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod frontend;
pub mod codegen;
pub mod utils;

// Re-export commonly used types
pub mod prelude {
    //! Convenient re-exports of commonly used types.

    pub use crate::frontend::ast::*;
    pub use crate::frontend::{analyze, parse, tokenize, Analysis, SymbolTable, Token, TokenKind};
    pub use crate::utils::errors::*;
    pub use crate::utils::location::{SourceMap, Span};
    pub use crate::{CompileOptions, CompileOutput, Compiler};
}

use crate::utils::errors::{CompileError, ConfigError, Diagnostic};
use log::debug;
use serde::{Deserialize, Serialize};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default size of the `char` buffer backing a `TEXTO` variable.
pub const DEFAULT_TEXT_BUFFER_SIZE: usize = 256;

/// Configuration for code generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Size of each `TEXTO` buffer, terminator included
    pub text_buffer_size: usize,
    /// Emit the `/* Generated by xuc ... */` comment
    pub banner: bool,
    /// One level of indentation in the output
    pub indent: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            text_buffer_size: DEFAULT_TEXT_BUFFER_SIZE,
            banner: true,
            indent: "    ".to_string(),
        }
    }
}

impl CompileOptions {
    /// Check the options for values the generated C cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.text_buffer_size < 2 {
            return Err(ConfigError::TextBufferTooSmall(self.text_buffer_size));
        }
        Ok(())
    }
}

/// The result of one compilation: C source or diagnostics, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CompileOutput {
    /// The program is valid
    Success {
        /// Complete C translation unit
        code: String,
    },
    /// The program was rejected
    Failure {
        /// What went wrong, in source order
        diagnostics: Vec<Diagnostic>,
    },
}

impl CompileOutput {
    /// Check if C code was produced.
    pub fn is_success(&self) -> bool {
        matches!(self, CompileOutput::Success { .. })
    }

    /// The generated code, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            CompileOutput::Success { code } => Some(code),
            CompileOutput::Failure { .. } => None,
        }
    }

    /// The diagnostics; empty on success.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            CompileOutput::Success { .. } => &[],
            CompileOutput::Failure { diagnostics } => diagnostics,
        }
    }

    /// Serialize as `{"code": ...}` or `{"diagnostics": [...]}`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl From<Result<String, CompileError>> for CompileOutput {
    fn from(result: Result<String, CompileError>) -> Self {
        match result {
            Ok(code) => CompileOutput::Success { code },
            Err(e) => CompileOutput::Failure { diagnostics: e.diagnostics() },
        }
    }
}

/// The full pipeline, configured once and reusable across compilations.
///
/// Each call builds its own tokens, AST and symbol table, so a `Compiler`
/// can be shared between threads.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    /// Create a compiler, rejecting invalid options.
    pub fn new(options: CompileOptions) -> Result<Self, ConfigError> {
        options.validate()?;
        Ok(Self { options })
    }

    /// The options in effect.
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile `source`; `source_name` is only used in the banner comment.
    pub fn compile(&self, source: &str, source_name: Option<&str>) -> CompileOutput {
        self.try_compile(source, source_name).into()
    }

    /// Like [`Compiler::compile`], keeping the phase-specific error.
    pub fn try_compile(&self, source: &str, source_name: Option<&str>) -> Result<String, CompileError> {
        debug!("compiling {}", source_name.unwrap_or("<input>"));
        let program = frontend::parse(source)?;
        let analysis = frontend::analyze(&program);
        if !analysis.is_ok() {
            return Err(CompileError::Semantic(analysis.errors));
        }
        let code = codegen::generate(&program, &analysis.symbols, &self.options, source_name)?;
        Ok(code)
    }
}

/// Compile with default options.
pub fn compile(source: &str) -> CompileOutput {
    Compiler::default().compile(source, None)
}
