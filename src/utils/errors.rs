//! Error types for the XuLang compiler.
//!
//! Each pipeline phase has its own error type. Lexical and syntax errors
//! are fatal and come one at a time; semantic errors are collected into a
//! list. All of them flatten into [`Diagnostic`] for hosts that only want
//! category, kind, message and position.

use crate::frontend::ast::Type;
use crate::utils::location::{SourceMap, Span};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Top-level error type for a compilation.
#[derive(Error, Debug, Clone)]
pub enum CompileError {
    /// Error during lexing
    #[error("lexical error: {0}")]
    Lexer(#[from] LexerError),

    /// Error during parsing
    #[error("syntax error: {0}")]
    Parse(#[from] ParseError),

    /// Every error found by semantic analysis, in source order
    #[error("{} semantic error(s)", .0.len())]
    Semantic(Vec<SemanticError>),

    /// Error during code generation
    #[error("code generation error: {0}")]
    Codegen(#[from] CodegenError),
}

impl CompileError {
    /// Flatten into host-facing diagnostics.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            CompileError::Lexer(e) => vec![Diagnostic::from(e)],
            CompileError::Parse(e) => vec![Diagnostic::from(e)],
            CompileError::Semantic(errors) => errors.iter().map(Diagnostic::from).collect(),
            CompileError::Codegen(e) => vec![Diagnostic::from(e)],
        }
    }
}

impl From<Vec<SemanticError>> for CompileError {
    fn from(errors: Vec<SemanticError>) -> Self {
        CompileError::Semantic(errors)
    }
}

/// Error during lexical analysis.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct LexerError {
    /// The error message
    pub message: String,
    /// Location in source
    pub span: Span,
    /// The kind of lexer error
    pub kind: LexerErrorKind,
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.span)
    }
}

/// Kinds of lexical error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexerErrorKind {
    /// A character that starts no token
    InvalidCharacter,
    /// A string literal without its closing quote on the same line
    UnterminatedString,
}

impl LexerErrorKind {
    /// Stable name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            LexerErrorKind::InvalidCharacter => "InvalidCharacter",
            LexerErrorKind::UnterminatedString => "UnterminatedString",
        }
    }
}

/// Error during parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The error message
    pub message: String,
    /// Location in source
    pub span: Span,
    /// The kind of parse error
    pub kind: ParseErrorKind,
    /// Expected constructs
    pub expected: Vec<String>,
    /// What was found instead
    pub found: Option<String>,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.span)
    }
}

/// Kinds of syntax error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A token that cannot continue the current production
    UnexpectedToken,
    /// A specific token was required
    ExpectedToken,
    /// An arithmetic or relational expression was required
    ExpectedExpression,
    /// A statement was required
    ExpectedStatement,
    /// An identifier was required
    ExpectedIdentifier,
    /// One of INTEIRO, REAL, TEXTO, LOGICO was required
    ExpectedType,
    /// A `SE`, `ENQUANTO` or `INICIO` was not closed by `FIM`
    MissingTerminator,
    /// `: DECLARACOES` or `: PROGRAMA` header is missing
    MissingSection,
    /// A literal that does not fit its type
    InvalidLiteral,
}

impl ParseErrorKind {
    /// Stable name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            ParseErrorKind::UnexpectedToken => "UnexpectedToken",
            ParseErrorKind::ExpectedToken => "ExpectedToken",
            ParseErrorKind::ExpectedExpression => "ExpectedExpression",
            ParseErrorKind::ExpectedStatement => "ExpectedStatement",
            ParseErrorKind::ExpectedIdentifier => "ExpectedIdentifier",
            ParseErrorKind::ExpectedType => "ExpectedType",
            ParseErrorKind::MissingTerminator => "MissingTerminator",
            ParseErrorKind::MissingSection => "MissingSection",
            ParseErrorKind::InvalidLiteral => "InvalidLiteral",
        }
    }
}

/// What a type check required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedType {
    /// Exactly this type (or a numeric one, for numeric targets)
    Exact(Type),
    /// INTEIRO or REAL
    Numeric,
}

impl fmt::Display for ExpectedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedType::Exact(ty) => write!(f, "{}", ty),
            ExpectedType::Numeric => write!(f, "INTEIRO or REAL"),
        }
    }
}

/// Error during semantic analysis.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct SemanticError {
    /// The error message
    pub message: String,
    /// Location in source
    pub span: Span,
    /// The kind of semantic error, with its details
    pub kind: SemanticErrorKind,
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.span)
    }
}

/// Kinds of semantic error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemanticErrorKind {
    /// A name declared more than once
    Redeclaration {
        /// The declared name
        name: String,
        /// Line of the declaration that stays in effect
        first_line: usize,
    },
    /// A reference to a name with no declaration
    UndeclaredVariable {
        /// The referenced name
        name: String,
    },
    /// A value of the wrong type
    TypeMismatch {
        /// What the context required
        expected: ExpectedType,
        /// What the expression has
        found: Type,
    },
}

impl SemanticErrorKind {
    /// Stable name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            SemanticErrorKind::Redeclaration { .. } => "Redeclaration",
            SemanticErrorKind::UndeclaredVariable { .. } => "UndeclaredVariable",
            SemanticErrorKind::TypeMismatch { .. } => "TypeMismatch",
        }
    }
}

impl SemanticError {
    /// `name` declared again at `span`.
    pub fn redeclaration(name: &str, first_line: usize, span: Span) -> Self {
        Self {
            message: format!(
                "variable '{}' is already declared (first declared on line {})",
                name, first_line
            ),
            span,
            kind: SemanticErrorKind::Redeclaration { name: name.to_string(), first_line },
        }
    }

    /// `name` used at `span` without a declaration.
    pub fn undeclared(name: &str, span: Span) -> Self {
        Self {
            message: format!("variable '{}' is not declared", name),
            span,
            kind: SemanticErrorKind::UndeclaredVariable { name: name.to_string() },
        }
    }

    /// A `found` value where `expected` was required.
    pub fn type_mismatch(expected: ExpectedType, found: Type, context: &str, span: Span) -> Self {
        Self {
            message: format!("type mismatch in {}: expected {}, found {}", context, expected, found),
            span,
            kind: SemanticErrorKind::TypeMismatch { expected, found },
        }
    }
}

/// Error during code generation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct CodegenError {
    /// The error message
    pub message: String,
    /// Location in source
    pub span: Span,
    /// The kind of codegen error
    pub kind: CodegenErrorKind,
}

impl fmt::Display for CodegenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.message, self.span)
    }
}

/// Kinds of code generation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodegenErrorKind {
    /// The AST references a name the symbol table does not know
    UnknownVariable,
}

/// The phase a diagnostic comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticCategory {
    /// Raised by the lexer
    Lexical,
    /// Raised by the parser
    Syntax,
    /// Raised by semantic analysis
    Semantic,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticCategory::Lexical => "lexical",
            DiagnosticCategory::Syntax => "syntax",
            DiagnosticCategory::Semantic => "semantic",
        };
        write!(f, "{}", name)
    }
}

/// A flat, position-carrying error report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Phase that raised it
    pub category: DiagnosticCategory,
    /// Stable kind name, e.g. `UndeclaredVariable`
    pub kind: &'static str,
    /// Human-readable message
    pub message: String,
    /// Line (1-indexed)
    pub line: usize,
    /// Column (1-indexed)
    pub column: usize,
}

impl Diagnostic {
    /// Render with the offending source line and a caret under the column.
    pub fn render(&self, source: &SourceMap<'_>, source_name: Option<&str>) -> String {
        let mut out = format!(
            "{}:{}:{}: {} error [{}]: {}",
            source_name.unwrap_or("<input>"),
            self.line,
            self.column,
            self.category,
            self.kind,
            self.message
        );
        if let Some(text) = source.line(self.line) {
            let gutter = self.line.to_string();
            let pad = " ".repeat(gutter.len());
            // keep tabs so the caret lines up in the terminal
            let lead: String = text
                .chars()
                .take(self.column.saturating_sub(1))
                .map(|c| if c == '\t' { '\t' } else { ' ' })
                .collect();
            out.push_str(&format!("\n {} | {}\n {} | {}^", gutter, text, pad, lead));
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {} error [{}]: {}",
            self.line, self.column, self.category, self.kind, self.message
        )
    }
}

impl From<&LexerError> for Diagnostic {
    fn from(e: &LexerError) -> Self {
        Self {
            category: DiagnosticCategory::Lexical,
            kind: e.kind.name(),
            message: e.message.clone(),
            line: e.span.start_line,
            column: e.span.start_column,
        }
    }
}

impl From<&ParseError> for Diagnostic {
    fn from(e: &ParseError) -> Self {
        Self {
            category: DiagnosticCategory::Syntax,
            kind: e.kind.name(),
            message: e.message.clone(),
            line: e.span.start_line,
            column: e.span.start_column,
        }
    }
}

impl From<&SemanticError> for Diagnostic {
    fn from(e: &SemanticError) -> Self {
        Self {
            category: DiagnosticCategory::Semantic,
            kind: e.kind.name(),
            message: e.message.clone(),
            line: e.span.start_line,
            column: e.span.start_column,
        }
    }
}

impl From<&CodegenError> for Diagnostic {
    // only reachable when the AST and symbol table disagree, which is an
    // undeclared reference from the learner's point of view
    fn from(e: &CodegenError) -> Self {
        let kind = match e.kind {
            CodegenErrorKind::UnknownVariable => "UndeclaredVariable",
        };
        Self {
            category: DiagnosticCategory::Semantic,
            kind,
            message: e.message.clone(),
            line: e.span.start_line,
            column: e.span.start_column,
        }
    }
}

/// Invalid [`CompileOptions`](crate::CompileOptions).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The TEXTO buffer cannot hold even one character plus the terminator
    #[error("text buffer size must be at least 2, got {0}")]
    TextBufferTooSmall(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError {
            message: "expected 'FIM', found end of file".to_string(),
            span: Span::new(4, 1, 4, 1),
            kind: ParseErrorKind::MissingTerminator,
            expected: vec!["'FIM'".to_string()],
            found: Some("end of file".to_string()),
        };
        assert_eq!(err.to_string(), "expected 'FIM', found end of file at 4:1");
        let diag = Diagnostic::from(&err);
        assert_eq!(diag.category, DiagnosticCategory::Syntax);
        assert_eq!(diag.kind, "MissingTerminator");
        assert_eq!((diag.line, diag.column), (4, 1));
    }

    #[test]
    fn test_semantic_constructors() {
        let err = SemanticError::type_mismatch(
            ExpectedType::Exact(Type::Integer),
            Type::Text,
            "assignment to 'x'",
            Span::new(7, 1, 7, 9),
        );
        assert_eq!(err.kind.name(), "TypeMismatch");
        assert!(err.message.contains("expected INTEIRO, found TEXTO"));

        let err = SemanticError::redeclaration("idade", 2, Span::new(3, 1, 3, 6));
        assert!(err.message.contains("'idade'"));
        assert_eq!(
            err.kind,
            SemanticErrorKind::Redeclaration { name: "idade".into(), first_line: 2 }
        );
    }

    #[test]
    fn test_render_points_at_column() {
        let source = ": DECLARACOES\n: PROGRAMA\nESCREVA altura\n";
        let map = SourceMap::new(source);
        let diag = Diagnostic::from(&SemanticError::undeclared("altura", Span::new(3, 9, 3, 15)));
        let rendered = diag.render(&map, Some("prog.xu"));
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(
            lines[0],
            "prog.xu:3:9: semantic error [UndeclaredVariable]: variable 'altura' is not declared"
        );
        assert_eq!(lines[1], " 3 | ESCREVA altura");
        assert_eq!(lines[2], "   |         ^");
    }

    #[test]
    fn test_compile_error_flattens_all_semantic_errors() {
        let err = CompileError::from(vec![
            SemanticError::undeclared("a", Span::new(1, 1, 1, 2)),
            SemanticError::undeclared("b", Span::new(2, 1, 2, 2)),
        ]);
        let diags = err.diagnostics();
        assert_eq!(diags.len(), 2);
        assert!(diags.iter().all(|d| d.category == DiagnosticCategory::Semantic));
    }
}
