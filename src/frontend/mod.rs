//! Frontend: Lexer, Parser, symbol table and semantic analysis for XuLang.
//!
//! ## Language Overview
//!
//! A program has a declaration section and a statement section:
//!
//! ```text
//! : DECLARACOES
//! idade : INTEIRO
//! : PROGRAMA
//! LEIA idade
//! SE idade >= 18 ENTAO
//!     ESCREVA "Maior de idade"
//! SENAO
//!     ESCREVA "Menor de idade"
//! FIM
//! ```

pub mod token;
pub mod lexer;
pub mod ast;
pub mod parser;
pub mod symbols;
pub mod semantic;

// Re-exports
pub use lexer::Lexer;
pub use parser::Parser;
pub use semantic::{analyze, Analysis};
pub use symbols::{Symbol, SymbolTable};
pub use token::{Token, TokenKind};

use crate::utils::errors::{CompileError, LexerError};
use log::debug;

/// Tokenize source code.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexerError> {
    let tokens = Lexer::new(source).tokenize()?;
    debug!("lexed {} token(s)", tokens.len());
    Ok(tokens)
}

/// Parse source code into an AST.
pub fn parse(source: &str) -> Result<ast::Program, CompileError> {
    let tokens = tokenize(source)?;
    let program = Parser::new(tokens).parse_program()?;
    debug!(
        "parsed {} declaration(s) and {} statement(s)",
        program.declarations.len(),
        program.statement_count()
    );
    Ok(program)
}

/// Parse and perform semantic analysis.
pub fn parse_and_analyze(source: &str) -> Result<(ast::Program, SymbolTable), CompileError> {
    let program = parse(source)?;
    let analysis = analyze(&program);
    if !analysis.is_ok() {
        return Err(CompileError::Semantic(analysis.errors));
    }
    Ok((program, analysis.symbols))
}
