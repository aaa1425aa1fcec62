//! Semantic analysis for XuLang.
//!
//! Builds the symbol table and type-checks every statement. Unlike lexing
//! and parsing, analysis never stops at the first problem: all errors are
//! collected in source order. A reference to an undeclared name has no
//! type, and expressions built on it are not checked further, so one typo
//! produces one error.

use crate::frontend::ast::*;
use crate::frontend::symbols::SymbolTable;
use crate::utils::errors::{ExpectedType, SemanticError};
use crate::utils::location::Span;
use log::debug;

/// The outcome of semantic analysis.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Declared variables
    pub symbols: SymbolTable,
    /// Errors in source order; empty iff the program is well-typed
    pub errors: Vec<SemanticError>,
}

impl Analysis {
    /// Check if the program is well-typed.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Perform semantic analysis on a program.
pub fn analyze(program: &Program) -> Analysis {
    let mut analyzer = SemanticAnalyzer::new();
    analyzer.analyze_program(program);
    debug!(
        "semantic analysis: {} symbol(s), {} error(s)",
        analyzer.symbols.len(),
        analyzer.errors.len()
    );
    Analysis { symbols: analyzer.symbols, errors: analyzer.errors }
}

/// Semantic analyzer.
struct SemanticAnalyzer {
    symbols: SymbolTable,
    errors: Vec<SemanticError>,
}

impl SemanticAnalyzer {
    fn new() -> Self {
        Self { symbols: SymbolTable::new(), errors: Vec::new() }
    }

    fn analyze_program(&mut self, program: &Program) {
        for decl in &program.declarations {
            if let Err(first) = self.symbols.declare(&decl.name, decl.ty, decl.span) {
                let error = SemanticError::redeclaration(&decl.name, first.span.start_line, decl.span);
                self.errors.push(error);
            }
        }
        self.analyze_stmts(&program.statements);
    }

    fn analyze_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.analyze_stmt(stmt);
        }
    }

    fn analyze_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Assignment { target, value } => {
                let target_ty = self.lookup(&target.name, target.span);
                let value_ty = self.analyze_arith(value);
                if let (Some(target_ty), Some(value_ty)) = (target_ty, value_ty) {
                    if !assignable(target_ty, value_ty) {
                        self.errors.push(SemanticError::type_mismatch(
                            ExpectedType::Exact(target_ty),
                            value_ty,
                            &format!("assignment to '{}'", target.name),
                            value.span,
                        ));
                    }
                }
            }
            StmtKind::Read { target } => {
                self.lookup(&target.name, target.span);
            }
            StmtKind::Write { arg } => {
                if let WriteArg::Variable(ident) = arg {
                    self.lookup(&ident.name, ident.span);
                }
            }
            StmtKind::If { condition, then_branch, else_branch } => {
                self.analyze_rel(condition);
                self.analyze_stmts(then_branch);
                if let Some(else_branch) = else_branch {
                    self.analyze_stmts(else_branch);
                }
            }
            StmtKind::While { condition, body } => {
                self.analyze_rel(condition);
                self.analyze_stmts(body);
            }
            StmtKind::Block { body } => self.analyze_stmts(body),
        }
    }

    /// Type of an arithmetic expression, or `None` when unknown.
    fn analyze_arith(&mut self, expr: &ArithExpr) -> Option<Type> {
        match &expr.kind {
            ArithExprKind::IntLiteral(_) => Some(Type::Integer),
            ArithExprKind::RealLiteral(_) => Some(Type::Real),
            ArithExprKind::Variable(name) => self.lookup(name, expr.span),
            ArithExprKind::Paren(inner) => self.analyze_arith(inner),
            ArithExprKind::Binary { op, left, right } => {
                let context = format!("operand of '{}'", op);
                let left_ty = self.analyze_arith(left);
                let left_ty = self.require_numeric(left_ty, &context, left.span);
                let right_ty = self.analyze_arith(right);
                let right_ty = self.require_numeric(right_ty, &context, right.span);
                match (left_ty?, right_ty?) {
                    (Type::Real, _) | (_, Type::Real) => Some(Type::Real),
                    _ => Some(Type::Integer),
                }
            }
        }
    }

    fn analyze_rel(&mut self, expr: &RelExpr) {
        match &expr.kind {
            RelExprKind::Comparison { op, left, right } => {
                let context = format!("comparison '{}'", op);
                let left_ty = self.analyze_arith(left);
                self.require_numeric(left_ty, &context, left.span);
                let right_ty = self.analyze_arith(right);
                self.require_numeric(right_ty, &context, right.span);
            }
            RelExprKind::Logical { left, right, .. } => {
                self.analyze_rel(left);
                self.analyze_rel(right);
            }
            RelExprKind::Paren(inner) => self.analyze_rel(inner),
        }
    }

    /// Pass a numeric type through; report anything else and make it unknown.
    fn require_numeric(&mut self, ty: Option<Type>, context: &str, span: Span) -> Option<Type> {
        match ty {
            Some(ty) if ty.is_numeric() => Some(ty),
            Some(ty) => {
                self.errors.push(SemanticError::type_mismatch(ExpectedType::Numeric, ty, context, span));
                None
            }
            None => None,
        }
    }

    fn lookup(&mut self, name: &str, span: Span) -> Option<Type> {
        let ty = self.symbols.type_of(name);
        if ty.is_none() {
            self.errors.push(SemanticError::undeclared(name, span));
        }
        ty
    }
}

/// INTEIRO and REAL convert into each other; TEXTO and LOGICO need an exact match.
fn assignable(target: Type, value: Type) -> bool {
    target == value || (target.is_numeric() && value.is_numeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::{lexer::Lexer, parser::Parser};
    use crate::utils::errors::SemanticErrorKind;

    fn check(source: &str) -> Analysis {
        let tokens = Lexer::new(source).tokenize().unwrap();
        let program = Parser::new(tokens).parse_program().unwrap();
        analyze(&program)
    }

    fn check_with(decls: &str, body: &str) -> Analysis {
        check(&format!(": DECLARACOES\n{}\n: PROGRAMA\n{}", decls, body))
    }

    fn kinds(analysis: &Analysis) -> Vec<&'static str> {
        analysis.errors.iter().map(|e| e.kind.name()).collect()
    }

    #[test]
    fn test_well_typed_program() {
        let analysis = check_with(
            "idade : INTEIRO\naltura : REAL\nnome : TEXTO\nok : LOGICO\noutro : LOGICO",
            "LEIA idade\nLEIA nome\nLEIA ok\naltura <- idade * 2 + 0.5\nidade <- altura / 2\n\
             outro <- ok\nSE idade >= 18 E altura < 2.1 ENTAO\n ESCREVA nome\nSENAO\n ESCREVA \"x\"\nFIM",
        );
        assert!(analysis.is_ok(), "{:?}", analysis.errors);
        assert_eq!(analysis.symbols.len(), 5);
    }

    #[test]
    fn test_redeclaration_reports_second_line_and_continues() {
        let analysis = check_with("x : INTEIRO\ny : REAL\nx : TEXTO", "ESCREVA z");
        assert_eq!(kinds(&analysis), vec!["Redeclaration", "UndeclaredVariable"]);
        let err = &analysis.errors[0];
        assert_eq!(err.span.start_line, 4);
        assert_eq!(
            err.kind,
            SemanticErrorKind::Redeclaration { name: "x".into(), first_line: 2 }
        );
        // first declaration wins
        assert_eq!(analysis.symbols.type_of("x"), Some(Type::Integer));
    }

    #[test]
    fn test_undeclared_once_per_occurrence() {
        let analysis = check_with("x : INTEIRO", "a <- 1\nLEIA b\nESCREVA c\nx <- d + d");
        assert_eq!(analysis.errors.len(), 5);
        assert!(analysis.errors.iter().all(|e| e.kind.name() == "UndeclaredVariable"));
        let lines: Vec<_> = analysis.errors.iter().map(|e| e.span.start_line).collect();
        assert_eq!(lines, vec![4, 5, 6, 7, 7]);
    }

    #[test]
    fn test_text_into_integer() {
        let analysis = check_with("n : INTEIRO\nt : TEXTO", "n <- t");
        assert_eq!(kinds(&analysis), vec!["TypeMismatch"]);
        assert_eq!(
            analysis.errors[0].kind,
            SemanticErrorKind::TypeMismatch {
                expected: ExpectedType::Exact(Type::Integer),
                found: Type::Text
            }
        );
    }

    #[test]
    fn test_numeric_coercion() {
        let analysis = check_with("r : REAL\nn : INTEIRO", "r <- 1\nn <- 2.5\nn <- r * 2");
        assert!(analysis.is_ok());
    }

    #[test]
    fn test_logico_requires_exact_type() {
        let analysis = check_with("ok : LOGICO\nn : INTEIRO", "ok <- n");
        assert_eq!(
            analysis.errors[0].kind,
            SemanticErrorKind::TypeMismatch {
                expected: ExpectedType::Exact(Type::Boolean),
                found: Type::Integer
            }
        );
    }

    #[test]
    fn test_arithmetic_on_text_reports_operand() {
        let analysis = check_with("n : INTEIRO\nt : TEXTO", "n <- 1 + t");
        assert_eq!(analysis.errors.len(), 1);
        let err = &analysis.errors[0];
        assert_eq!(
            err.kind,
            SemanticErrorKind::TypeMismatch { expected: ExpectedType::Numeric, found: Type::Text }
        );
        assert_eq!(err.span.start_column, 10);
    }

    #[test]
    fn test_unknown_suppresses_cascade() {
        let analysis = check_with("t : TEXTO", "t <- nada * 2");
        assert_eq!(kinds(&analysis), vec!["UndeclaredVariable"]);

        let analysis = check_with("n : INTEIRO", "SE nada > n ENTAO\nFIM");
        assert_eq!(kinds(&analysis), vec!["UndeclaredVariable"]);
    }

    #[test]
    fn test_comparison_sides_checked_separately() {
        let analysis = check_with("a : TEXTO\nb : LOGICO", "ENQUANTO a == b\nFIM");
        assert_eq!(kinds(&analysis), vec!["TypeMismatch", "TypeMismatch"]);
        assert_eq!(analysis.errors[0].span.start_column, 10);
        assert_eq!(analysis.errors[1].span.start_column, 15);
    }

    #[test]
    fn test_errors_in_source_order() {
        let analysis = check_with(
            "x : INTEIRO\nx : REAL\nt : TEXTO",
            "LEIA a\nSE t > 1 ENTAO\n x <- t\nFIM\nESCREVA b",
        );
        let lines: Vec<_> = analysis.errors.iter().map(|e| e.span.start_line).collect();
        assert_eq!(lines, vec![3, 6, 7, 8, 10]);
    }
}
