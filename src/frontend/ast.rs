//! Abstract Syntax Tree (AST) for XuLang.
//!
//! A program is a flat list of declarations followed by a list of
//! statements. Arithmetic and relational expressions are separate node
//! families: a comparison always sits between two arithmetic operands and
//! `E`/`OU` only ever join relational terms.

use crate::frontend::token::TokenKind;
use crate::utils::location::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A complete program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Declarations in source order
    pub declarations: Vec<Declaration>,
    /// Top-level statements in source order
    pub statements: Vec<Stmt>,
    /// Source span
    pub span: Span,
}

impl Program {
    /// Total number of statements, nested ones included.
    pub fn statement_count(&self) -> usize {
        fn count(stmts: &[Stmt]) -> usize {
            stmts
                .iter()
                .map(|stmt| {
                    1 + match &stmt.kind {
                        StmtKind::If { then_branch, else_branch, .. } => {
                            count(then_branch) + else_branch.as_deref().map(count).unwrap_or(0)
                        }
                        StmtKind::While { body, .. } | StmtKind::Block { body } => count(body),
                        _ => 0,
                    }
                })
                .sum()
        }
        count(&self.statements)
    }
}

/// A variable declaration: `name : TYPE`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    /// Declared name, spelled as in the source
    pub name: String,
    /// Declared type
    pub ty: Type,
    /// Span of the whole declaration
    pub span: Span,
}

/// One of the four primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    /// `INTEIRO`
    Integer,
    /// `REAL`
    Real,
    /// `TEXTO`
    Text,
    /// `LOGICO`
    Boolean,
}

impl Type {
    /// Check if this is `INTEIRO` or `REAL`.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Integer | Type::Real)
    }

    /// The type named by a type keyword token.
    pub fn from_token(kind: TokenKind) -> Option<Type> {
        match kind {
            TokenKind::Inteiro => Some(Type::Integer),
            TokenKind::RealType => Some(Type::Real),
            TokenKind::Texto => Some(Type::Text),
            TokenKind::Logico => Some(Type::Boolean),
            _ => None,
        }
    }

    /// The source keyword for this type.
    pub fn keyword(&self) -> &'static str {
        match self {
            Type::Integer => "INTEIRO",
            Type::Real => "REAL",
            Type::Text => "TEXTO",
            Type::Boolean => "LOGICO",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

/// An identifier occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ident {
    /// The name
    pub name: String,
    /// Source span
    pub span: Span,
}

impl Ident {
    /// Create a new identifier.
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self { name: name.into(), span }
    }
}

/// A statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    /// The kind of statement
    pub kind: StmtKind,
    /// Source span
    pub span: Span,
}

impl Stmt {
    /// Create a new statement.
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The kind of a statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    /// `target <- value`
    Assignment {
        /// Assigned variable
        target: Ident,
        /// Assigned value
        value: ArithExpr,
    },

    /// `LEIA target`
    Read {
        /// Variable read into
        target: Ident,
    },

    /// `ESCREVA arg`
    Write {
        /// What to print
        arg: WriteArg,
    },

    /// `SE condition ENTAO ... [SENAO ...] FIM`
    If {
        /// Condition
        condition: RelExpr,
        /// Statements run when the condition holds
        then_branch: Vec<Stmt>,
        /// Statements after `SENAO`, if present
        else_branch: Option<Vec<Stmt>>,
    },

    /// `ENQUANTO condition ... FIM`
    While {
        /// Loop condition
        condition: RelExpr,
        /// Loop body
        body: Vec<Stmt>,
    },

    /// `INICIO ... FIM`; opens no scope
    Block {
        /// Grouped statements
        body: Vec<Stmt>,
    },
}

/// The argument of `ESCREVA`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteArg {
    /// A variable, printed according to its type
    Variable(Ident),
    /// A string literal, printed verbatim
    Text {
        /// Contents without the surrounding quotes
        value: String,
        /// Span of the literal, quotes included
        span: Span,
    },
}

/// An arithmetic expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArithExpr {
    /// The kind of expression
    pub kind: ArithExprKind,
    /// Source span
    pub span: Span,
}

/// The kind of an arithmetic expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ArithExprKind {
    /// Integer literal
    IntLiteral(i64),
    /// Real literal
    RealLiteral(f64),
    /// Variable reference
    Variable(String),
    /// Binary operation
    Binary {
        /// Operator
        op: ArithOp,
        /// Left operand
        left: Box<ArithExpr>,
        /// Right operand
        right: Box<ArithExpr>,
    },
    /// Parenthesized expression, kept so the output can mirror the source
    Paren(Box<ArithExpr>),
}

impl ArithExpr {
    /// Create a new expression.
    pub fn new(kind: ArithExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Create an integer literal.
    pub fn int_lit(value: i64, span: Span) -> Self {
        Self::new(ArithExprKind::IntLiteral(value), span)
    }

    /// Create a real literal.
    pub fn real_lit(value: f64, span: Span) -> Self {
        Self::new(ArithExprKind::RealLiteral(value), span)
    }

    /// Create a variable reference.
    pub fn var(name: impl Into<String>, span: Span) -> Self {
        Self::new(ArithExprKind::Variable(name.into()), span)
    }

    /// Create a binary operation spanning both operands.
    pub fn binary(op: ArithOp, left: ArithExpr, right: ArithExpr) -> Self {
        let span = left.span.merge(&right.span);
        Self::new(ArithExprKind::Binary { op, left: Box::new(left), right: Box::new(right) }, span)
    }
}

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
}

impl ArithOp {
    /// The operator for an arithmetic token.
    pub fn from_token(kind: TokenKind) -> Option<ArithOp> {
        match kind {
            TokenKind::Plus => Some(ArithOp::Add),
            TokenKind::Minus => Some(ArithOp::Sub),
            TokenKind::Star => Some(ArithOp::Mul),
            TokenKind::Slash => Some(ArithOp::Div),
            _ => None,
        }
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
        };
        write!(f, "{}", s)
    }
}

/// A relational expression, the condition of `SE` and `ENQUANTO`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelExpr {
    /// The kind of expression
    pub kind: RelExprKind,
    /// Source span
    pub span: Span,
}

/// The kind of a relational expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RelExprKind {
    /// Comparison of two arithmetic expressions
    Comparison {
        /// Operator
        op: CmpOp,
        /// Left operand
        left: ArithExpr,
        /// Right operand
        right: ArithExpr,
    },
    /// `E` / `OU` of two relational expressions
    Logical {
        /// Operator
        op: LogicalOp,
        /// Left operand
        left: Box<RelExpr>,
        /// Right operand
        right: Box<RelExpr>,
    },
    /// Parenthesized relational expression
    Paren(Box<RelExpr>),
}

impl RelExpr {
    /// Create a new relational expression.
    pub fn new(kind: RelExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CmpOp {
    /// `>=`
    Ge,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `==`
    Eq,
    /// `<>`
    Ne,
}

impl CmpOp {
    /// The operator for a comparison token.
    pub fn from_token(kind: TokenKind) -> Option<CmpOp> {
        match kind {
            TokenKind::GreaterEqual => Some(CmpOp::Ge),
            TokenKind::LessEqual => Some(CmpOp::Le),
            TokenKind::Greater => Some(CmpOp::Gt),
            TokenKind::Less => Some(CmpOp::Lt),
            TokenKind::EqualEqual => Some(CmpOp::Eq),
            TokenKind::NotEqual => Some(CmpOp::Ne),
            _ => None,
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CmpOp::Ge => ">=",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Lt => "<",
            CmpOp::Eq => "==",
            CmpOp::Ne => "<>",
        };
        write!(f, "{}", s)
    }
}

/// Logical connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOp {
    /// `E`
    And,
    /// `OU`
    Or,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOp::And => write!(f, "E"),
            LogicalOp::Or => write!(f, "OU"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_display() {
        assert_eq!(Type::Integer.to_string(), "INTEIRO");
        assert_eq!(Type::Boolean.to_string(), "LOGICO");
        assert!(Type::Real.is_numeric());
        assert!(!Type::Text.is_numeric());
        assert_eq!(Type::from_token(TokenKind::Texto), Some(Type::Text));
        assert_eq!(Type::from_token(TokenKind::Identifier), None);
    }

    #[test]
    fn test_binary_span_covers_operands() {
        let left = ArithExpr::var("a", Span::new(2, 5, 2, 6));
        let right = ArithExpr::int_lit(1, Span::new(2, 9, 2, 10));
        let expr = ArithExpr::binary(ArithOp::Add, left, right);
        assert_eq!((expr.span.start_line, expr.span.start_column), (2, 5));
        assert_eq!(expr.span.end_column, 10);
    }

    #[test]
    fn test_statement_count_includes_nested() {
        let span = Span::new(1, 1, 1, 1);
        let write = || Stmt::new(StmtKind::Read { target: Ident::new("x", span) }, span);
        let cond = RelExpr::new(
            RelExprKind::Comparison {
                op: CmpOp::Gt,
                left: ArithExpr::var("x", span),
                right: ArithExpr::int_lit(0, span),
            },
            span,
        );
        let program = Program {
            declarations: Vec::new(),
            statements: vec![
                write(),
                Stmt::new(
                    StmtKind::If {
                        condition: cond,
                        then_branch: vec![write(), write()],
                        else_branch: Some(vec![Stmt::new(StmtKind::Block { body: vec![write()] }, span)]),
                    },
                    span,
                ),
            ],
            span,
        };
        assert_eq!(program.statement_count(), 6);
    }
}
