//! C code generation.
//!
//! Emits a single translation unit with everything inside `main`. The
//! output mirrors the source one statement at a time: no temporaries, no
//! reordering, and no parentheses beyond the ones the learner wrote.

use crate::codegen::names::CNames;
use crate::frontend::ast::*;
use crate::frontend::symbols::{Symbol, SymbolTable};
use crate::utils::errors::{CodegenError, CodegenErrorKind};
use crate::utils::location::Span;
use crate::utils::pretty::CodeFormatter;
use crate::CompileOptions;
use log::debug;

/// Result type for code generation.
pub type CodegenResult<T> = Result<T, CodegenError>;

/// C code generator.
pub struct CCodeGen<'a> {
    symbols: &'a SymbolTable,
    options: &'a CompileOptions,
    names: CNames,
    source_name: Option<&'a str>,
}

impl<'a> CCodeGen<'a> {
    /// Create a generator for a program whose declarations are in `symbols`.
    pub fn new(symbols: &'a SymbolTable, options: &'a CompileOptions) -> Self {
        Self {
            symbols,
            options,
            names: CNames::new(symbols),
            source_name: None,
        }
    }

    /// Name the source file in the banner comment.
    pub fn with_source_name(mut self, source_name: Option<&'a str>) -> Self {
        self.source_name = source_name;
        self
    }

    /// Generate C code for a program.
    pub fn generate(&self, program: &Program) -> CodegenResult<String> {
        let mut f = CodeFormatter::new(&self.options.indent);

        // Header
        if self.options.banner {
            f.writeln(&self.banner());
        }
        f.writeln("#include <stdio.h>");
        f.writeln("#include <stdlib.h>");
        f.writeln("#include <string.h>");
        f.newline();

        f.writeln("int main(void) {");
        f.indent();

        for symbol in self.symbols.iter() {
            let decl = self.declaration(symbol)?;
            f.writeln(&decl);
        }
        if !self.symbols.is_empty() {
            f.newline();
        }

        self.generate_stmts(&mut f, &program.statements)?;

        f.writeln("return 0;");
        f.dedent();
        f.writeln("}");

        let code = f.finish();
        debug!("generated {} line(s) of C", code.lines().count());
        Ok(code)
    }

    fn banner(&self) -> String {
        match self.source_name {
            // keep the name from closing the comment early
            Some(name) => format!("/* Generated by xuc from {} */", name.replace("*/", "* /")),
            None => "/* Generated by xuc */".to_string(),
        }
    }

    fn declaration(&self, symbol: &Symbol) -> CodegenResult<String> {
        let name = self.c_name(&symbol.name, symbol.span)?;
        let decl = match symbol.ty {
            Type::Integer | Type::Boolean => format!("int {};", name),
            Type::Real => format!("double {};", name),
            Type::Text => format!("char {}[{}];", name, self.options.text_buffer_size),
        };
        Ok(decl)
    }

    fn generate_stmts(&self, f: &mut CodeFormatter, stmts: &[Stmt]) -> CodegenResult<()> {
        for stmt in stmts {
            self.generate_stmt(f, stmt)?;
        }
        Ok(())
    }

    fn generate_stmt(&self, f: &mut CodeFormatter, stmt: &Stmt) -> CodegenResult<()> {
        match &stmt.kind {
            StmtKind::Assignment { target, value: value_expr } => {
                let (name, ty) = self.variable(&target.name, target.span)?;
                let value = self.arith_expr(value_expr)?;
                if ty == Type::Text && copies_itself(&target.name, value_expr) {
                    // strcpy arguments must not overlap
                    f.writeln(&format!("memmove({0}, {0}, strlen({0}) + 1);", name));
                } else if ty == Type::Text {
                    f.writeln(&format!("strcpy({}, {});", name, value));
                } else {
                    f.writeln(&format!("{} = {};", name, value));
                }
            }
            StmtKind::Read { target } => {
                let (name, ty) = self.variable(&target.name, target.span)?;
                let line = match ty {
                    Type::Integer | Type::Boolean => format!("scanf(\"%d\", &{});", name),
                    Type::Real => format!("scanf(\"%lf\", &{});", name),
                    Type::Text => format!(
                        "scanf(\" %{}[^\\n]\", {});",
                        self.options.text_buffer_size.saturating_sub(1),
                        name
                    ),
                };
                f.writeln(&line);
            }
            StmtKind::Write { arg } => {
                let line = match arg {
                    WriteArg::Variable(ident) => {
                        let (name, ty) = self.variable(&ident.name, ident.span)?;
                        format!("printf(\"{}\\n\", {});", write_format(ty), name)
                    }
                    WriteArg::Text { value, .. } => {
                        format!("printf(\"{}\\n\");", escape_printf_literal(value))
                    }
                };
                f.writeln(&line);
            }
            StmtKind::If { condition, then_branch, else_branch } => {
                f.writeln(&format!("if ({}) {{", self.rel_expr(condition)?));
                f.indent();
                self.generate_stmts(f, then_branch)?;
                f.dedent();
                if let Some(else_branch) = else_branch {
                    f.writeln("} else {");
                    f.indent();
                    self.generate_stmts(f, else_branch)?;
                    f.dedent();
                }
                f.writeln("}");
            }
            StmtKind::While { condition, body } => {
                let header = format!("while ({})", self.rel_expr(condition)?);
                f.block(&header, |f| self.generate_stmts(f, body))?;
            }
            StmtKind::Block { body } => {
                f.block("", |f| self.generate_stmts(f, body))?;
            }
        }
        Ok(())
    }

    fn arith_expr(&self, expr: &ArithExpr) -> CodegenResult<String> {
        let code = match &expr.kind {
            ArithExprKind::IntLiteral(v) => v.to_string(),
            ArithExprKind::RealLiteral(v) => format_real(*v),
            ArithExprKind::Variable(name) => self.c_name(name, expr.span)?.to_string(),
            ArithExprKind::Binary { op, left, right } => {
                format!("{} {} {}", self.arith_expr(left)?, op, self.arith_expr(right)?)
            }
            ArithExprKind::Paren(inner) => format!("({})", self.arith_expr(inner)?),
        };
        Ok(code)
    }

    fn rel_expr(&self, expr: &RelExpr) -> CodegenResult<String> {
        let code = match &expr.kind {
            RelExprKind::Comparison { op, left, right } => format!(
                "{} {} {}",
                self.arith_expr(left)?,
                c_comparison(*op),
                self.arith_expr(right)?
            ),
            RelExprKind::Logical { op, left, right } => {
                let op = match op {
                    LogicalOp::And => "&&",
                    LogicalOp::Or => "||",
                };
                format!("{} {} {}", self.rel_expr(left)?, op, self.rel_expr(right)?)
            }
            RelExprKind::Paren(inner) => format!("({})", self.rel_expr(inner)?),
        };
        Ok(code)
    }

    fn variable(&self, name: &str, span: Span) -> CodegenResult<(&str, Type)> {
        let c_name = self.c_name(name, span)?;
        let ty = self.symbols.type_of(name).ok_or_else(|| unknown_variable(name, span))?;
        Ok((c_name, ty))
    }

    fn c_name(&self, name: &str, span: Span) -> CodegenResult<&str> {
        self.names.get(name).ok_or_else(|| unknown_variable(name, span))
    }
}

fn unknown_variable(name: &str, span: Span) -> CodegenError {
    CodegenError {
        message: format!("variable '{}' is not declared", name),
        span,
        kind: CodegenErrorKind::UnknownVariable,
    }
}

/// Check if `expr` is just the variable `target`, possibly parenthesized.
fn copies_itself(target: &str, expr: &ArithExpr) -> bool {
    match &expr.kind {
        ArithExprKind::Variable(name) => name == target,
        ArithExprKind::Paren(inner) => copies_itself(target, inner),
        _ => false,
    }
}

/// `printf` conversion for a value of type `ty`.
fn write_format(ty: Type) -> &'static str {
    match ty {
        Type::Integer | Type::Boolean => "%d",
        Type::Real => "%f",
        Type::Text => "%s",
    }
}

fn c_comparison(op: CmpOp) -> &'static str {
    match op {
        CmpOp::Ge => ">=",
        CmpOp::Le => "<=",
        CmpOp::Gt => ">",
        CmpOp::Lt => "<",
        CmpOp::Eq => "==",
        CmpOp::Ne => "!=",
    }
}

/// Shortest C spelling that reads back as the same double.
fn format_real(value: f64) -> String {
    let s = format!("{:?}", value);
    if s.contains(|c: char| c == '.' || c == 'e' || c == 'E') {
        s
    } else {
        format!("{}.0", s)
    }
}

/// Escape a string literal so `printf` prints it verbatim.
pub fn escape_printf_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '%' => out.push_str("%%"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            // no trigraphs
            '?' => out.push_str("\\?"),
            // octal never swallows the characters that follow
            c if c.is_ascii_control() => out.push_str(&format!("\\{:03o}", c as u32)),
            c => out.push(c),
        }
    }
    out
}
