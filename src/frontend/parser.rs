//! Parser for XuLang.
//!
//! A recursive descent parser over the complete token sequence. It stops at
//! the first token that cannot extend the current production and reports a
//! single [`ParseError`] there.
//!
//! The one place where a single token of lookahead is not enough is a `(`
//! at the start of a relational term: `(a + b) > c` and `(a > b) E c > d`
//! both open with a parenthesis. Every group is classified once, when the
//! parser is created, in a single pass over the tokens.

use crate::frontend::ast::*;
use crate::frontend::token::{Token, TokenKind};
use crate::utils::errors::{ParseError, ParseErrorKind};
use crate::utils::location::{SourceLocation, Span};
use log::trace;

/// Result type for parser operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// A parser for XuLang.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    /// Indexed by token; true at each `(` whose group is relational.
    relational_groups: Vec<bool>,
}

impl Parser {
    /// Create a parser over a token sequence.
    ///
    /// An end marker is appended if the sequence does not already end
    /// with one.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().map(Token::is_eof).unwrap_or(false) {
            let end = tokens.last().map(|t| t.span.end()).unwrap_or_else(SourceLocation::start);
            tokens.push(Token::new(TokenKind::Eof, Span::point(end), String::new()));
        }
        let relational_groups = classify_groups(&tokens);
        Self { tokens, current: 0, relational_groups }
    }

    /// Parse a complete program.
    pub fn parse_program(&mut self) -> ParseResult<Program> {
        let start = self.peek().span;

        self.expect_section(TokenKind::Declaracoes)?;
        let mut declarations = Vec::new();
        while self.check(TokenKind::Identifier) {
            declarations.push(self.parse_declaration()?);
        }

        self.expect_section(TokenKind::Programa)?;
        let mut statements = Vec::new();
        while !self.is_at_end() {
            if self.check(TokenKind::Fim) || self.check(TokenKind::Senao) {
                let message = format!(
                    "unexpected {} with no open SE, ENQUANTO or INICIO",
                    self.peek().describe()
                );
                return Err(self.error(ParseErrorKind::UnexpectedToken, &["a statement"], message));
            }
            statements.push(self.parse_statement()?);
        }

        Ok(Program {
            declarations,
            statements,
            span: start.merge(&self.previous_span()),
        })
    }

    /// Consume `: <header>`.
    fn expect_section(&mut self, header: TokenKind) -> ParseResult<()> {
        if self.check(TokenKind::Colon) && self.kind_at(self.current + 1) == header {
            self.advance();
            self.advance();
            return Ok(());
        }
        let what = format!("section header ': {}'", header.name());
        let message = format!("missing {}, found {}", what, self.peek().describe());
        Err(self.error(ParseErrorKind::MissingSection, &[what.as_str()], message))
    }

    fn parse_declaration(&mut self) -> ParseResult<Declaration> {
        let name_token = self.advance();
        self.expect(TokenKind::Colon, &format!("after '{}' in its declaration", name_token.lexeme))?;

        let ty = match Type::from_token(self.peek().kind) {
            Some(ty) => {
                self.advance();
                ty
            }
            None => {
                return Err(self.expected(
                    ParseErrorKind::ExpectedType,
                    "a type (INTEIRO, REAL, TEXTO or LOGICO)",
                ))
            }
        };

        Ok(Declaration {
            name: name_token.lexeme,
            ty,
            span: name_token.span.merge(&self.previous_span()),
        })
    }

    // Statements

    fn parse_statement(&mut self) -> ParseResult<Stmt> {
        let start = self.peek().span;
        let kind = match self.peek().kind {
            TokenKind::Identifier => self.parse_assignment()?,
            TokenKind::Leia => {
                self.advance();
                let target = self.expect_identifier("after 'LEIA'")?;
                StmtKind::Read { target }
            }
            TokenKind::Escreva => self.parse_write()?,
            TokenKind::Se => self.parse_if()?,
            TokenKind::Enquanto => {
                let opener = self.advance();
                let condition = self.parse_rel_expr()?;
                let body = self.parse_body(&opener, &[TokenKind::Fim])?;
                self.advance();
                StmtKind::While { condition, body }
            }
            TokenKind::Inicio => {
                let opener = self.advance();
                let body = self.parse_body(&opener, &[TokenKind::Fim])?;
                self.advance();
                StmtKind::Block { body }
            }
            _ => return Err(self.expected(ParseErrorKind::ExpectedStatement, "a statement")),
        };

        let span = start.merge(&self.previous_span());
        trace!("parsed statement at {}", span);
        Ok(Stmt::new(kind, span))
    }

    fn parse_assignment(&mut self) -> ParseResult<StmtKind> {
        let token = self.advance();
        let target = Ident::new(token.lexeme, token.span);
        self.expect(TokenKind::Assign, &format!("after '{}'", target.name))?;
        let value = self.parse_arith_expr()?;
        Ok(StmtKind::Assignment { target, value })
    }

    fn parse_write(&mut self) -> ParseResult<StmtKind> {
        self.advance();
        let token = self.peek().clone();
        let arg = match token.kind {
            TokenKind::Identifier => WriteArg::Variable(Ident::new(token.lexeme, token.span)),
            TokenKind::String => {
                let value = token.lexeme[1..token.lexeme.len() - 1].to_string();
                WriteArg::Text { value, span: token.span }
            }
            _ => {
                return Err(self.expected(
                    ParseErrorKind::UnexpectedToken,
                    "an identifier or string after 'ESCREVA'",
                ))
            }
        };
        self.advance();

        if ArithOp::from_token(self.peek().kind).is_some() {
            let message = format!(
                "ESCREVA takes a single identifier or string, found {}",
                self.peek().describe()
            );
            return Err(self.error(ParseErrorKind::UnexpectedToken, &["a statement"], message));
        }
        Ok(StmtKind::Write { arg })
    }

    fn parse_if(&mut self) -> ParseResult<StmtKind> {
        let opener = self.advance();
        let condition = self.parse_rel_expr()?;
        self.expect(TokenKind::Entao, "after the SE condition")?;

        let then_branch = self.parse_body(&opener, &[TokenKind::Senao, TokenKind::Fim])?;
        let else_branch = if self.check(TokenKind::Senao) {
            self.advance();
            Some(self.parse_body(&opener, &[TokenKind::Fim])?)
        } else {
            None
        };
        self.advance();

        Ok(StmtKind::If { condition, then_branch, else_branch })
    }

    /// Parse statements up to one of `terminators`, which is left unconsumed.
    fn parse_body(&mut self, opener: &Token, terminators: &[TokenKind]) -> ParseResult<Vec<Stmt>> {
        let mut body = Vec::new();
        loop {
            let kind = self.peek().kind;
            if terminators.contains(&kind) {
                return Ok(body);
            }
            if !kind.starts_statement() {
                let message = format!(
                    "expected 'FIM' to close '{}' opened on line {}, found {}",
                    opener.lexeme,
                    opener.line(),
                    self.peek().describe()
                );
                return Err(self.error(ParseErrorKind::MissingTerminator, &["'FIM'"], message));
            }
            body.push(self.parse_statement()?);
        }
    }

    // Arithmetic expressions

    /// Parse `Term (("+"|"-") Term)*`.
    pub fn parse_arith_expr(&mut self) -> ParseResult<ArithExpr> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Plus => ArithOp::Add,
                TokenKind::Minus => ArithOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_term()?;
            left = ArithExpr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> ParseResult<ArithExpr> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.peek().kind {
                TokenKind::Star => ArithOp::Mul,
                TokenKind::Slash => ArithOp::Div,
                _ => break,
            };
            self.advance();
            let right = self.parse_factor()?;
            left = ArithExpr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> ParseResult<ArithExpr> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Integer => {
                let value: i32 = token.lexeme.parse().map_err(|_| {
                    self.error(
                        ParseErrorKind::InvalidLiteral,
                        &["an integer literal"],
                        format!(
                            "integer literal {} is out of range (largest INTEIRO is {})",
                            token.lexeme,
                            i32::MAX
                        ),
                    )
                })?;
                self.advance();
                Ok(ArithExpr::int_lit(i64::from(value), token.span))
            }
            TokenKind::Real => {
                let value = token
                    .lexeme
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| {
                        self.error(
                            ParseErrorKind::InvalidLiteral,
                            &["a real literal"],
                            format!("real literal {} is out of range", token.lexeme),
                        )
                    })?;
                self.advance();
                Ok(ArithExpr::real_lit(value, token.span))
            }
            TokenKind::Identifier => {
                self.advance();
                Ok(ArithExpr::var(token.lexeme, token.span))
            }
            TokenKind::LeftParen => {
                self.advance();
                let inner = self.parse_arith_expr()?;
                self.expect(TokenKind::RightParen, "to close the parenthesis")?;
                let span = token.span.merge(&self.previous_span());
                Ok(ArithExpr::new(ArithExprKind::Paren(Box::new(inner)), span))
            }
            _ => Err(self.expected(ParseErrorKind::ExpectedExpression, "an expression")),
        }
    }

    // Relational expressions

    /// Parse `RelTerm ((E|OU) RelTerm)*` with `E` binding tighter than `OU`.
    pub fn parse_rel_expr(&mut self) -> ParseResult<RelExpr> {
        let mut left = self.parse_and_expr()?;
        while self.check(TokenKind::Ou) {
            self.advance();
            let right = self.parse_and_expr()?;
            left = Self::logical(LogicalOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and_expr(&mut self) -> ParseResult<RelExpr> {
        let mut left = self.parse_rel_term()?;
        while self.check(TokenKind::E) {
            self.advance();
            let right = self.parse_rel_term()?;
            left = Self::logical(LogicalOp::And, left, right);
        }
        Ok(left)
    }

    fn logical(op: LogicalOp, left: RelExpr, right: RelExpr) -> RelExpr {
        let span = left.span.merge(&right.span);
        RelExpr::new(
            RelExprKind::Logical { op, left: Box::new(left), right: Box::new(right) },
            span,
        )
    }

    fn parse_rel_term(&mut self) -> ParseResult<RelExpr> {
        if self.check(TokenKind::LeftParen) && self.group_is_relational(self.current) {
            let open = self.advance();
            let inner = self.parse_rel_expr()?;
            self.expect(TokenKind::RightParen, "to close the parenthesis")?;
            let span = open.span.merge(&self.previous_span());
            return Ok(RelExpr::new(RelExprKind::Paren(Box::new(inner)), span));
        }

        let left = self.parse_arith_expr()?;
        let op = match CmpOp::from_token(self.peek().kind) {
            Some(op) => op,
            None => {
                return Err(self.expected(
                    ParseErrorKind::ExpectedToken,
                    "a comparison operator (>=, <=, >, <, == or <>)",
                ))
            }
        };
        self.advance();
        let right = self.parse_arith_expr()?;
        let span = left.span.merge(&right.span);
        Ok(RelExpr::new(RelExprKind::Comparison { op, left, right }, span))
    }

    fn group_is_relational(&self, open: usize) -> bool {
        self.relational_groups.get(open).copied().unwrap_or(false)
    }

    // Helper methods

    fn peek(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    fn kind_at(&self, index: usize) -> TokenKind {
        self.tokens.get(index).map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn is_at_end(&self) -> bool {
        self.peek().is_eof()
    }

    fn previous_span(&self) -> Span {
        self.tokens[self.current.saturating_sub(1)].span
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !token.is_eof() {
            self.current += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind, context: &str) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.expected(ParseErrorKind::ExpectedToken, &format!("'{}' {}", kind.name(), context)))
        }
    }

    fn expect_identifier(&mut self, context: &str) -> ParseResult<Ident> {
        if self.check(TokenKind::Identifier) {
            let token = self.advance();
            Ok(Ident::new(token.lexeme, token.span))
        } else {
            Err(self.expected(ParseErrorKind::ExpectedIdentifier, &format!("an identifier {}", context)))
        }
    }

    fn expected(&self, kind: ParseErrorKind, what: &str) -> ParseError {
        let message = format!("expected {}, found {}", what, self.peek().describe());
        self.error(kind, &[what], message)
    }

    fn error(&self, kind: ParseErrorKind, expected: &[&str], message: String) -> ParseError {
        let token = self.peek();
        ParseError {
            message,
            span: token.span,
            kind,
            expected: expected.iter().map(|s| s.to_string()).collect(),
            found: Some(token.describe()),
        }
    }
}

/// Mark every `(` that opens a relational group: one with a comparison or
/// `E`/`OU` at its own level, or one wrapping exactly one relational group.
///
/// A token that cannot occur in a condition ends every open group. Such a
/// group is relational only if an operator was already seen at its level.
fn classify_groups(tokens: &[Token]) -> Vec<bool> {
    struct Open {
        index: usize,
        has_operator: bool,
    }

    let mut relational = vec![false; tokens.len()];
    let mut closes = vec![None; tokens.len()];
    let mut stack: Vec<Open> = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::LeftParen => stack.push(Open { index: i, has_operator: false }),
            TokenKind::RightParen => {
                if let Some(open) = stack.pop() {
                    closes[open.index] = Some(i);
                    let inner = open.index + 1;
                    let wraps_relational = tokens[inner].kind == TokenKind::LeftParen
                        && closes[inner] == Some(i - 1)
                        && relational[inner];
                    relational[open.index] = open.has_operator || wraps_relational;
                }
            }
            kind if kind.is_comparison() || kind.is_logical() => {
                if let Some(open) = stack.last_mut() {
                    open.has_operator = true;
                }
            }
            kind if !can_appear_in_condition(kind) => {
                for open in stack.drain(..) {
                    relational[open.index] = open.has_operator;
                }
            }
            _ => {}
        }
    }
    relational
}

/// Tokens that may occur inside a parenthesized condition.
fn can_appear_in_condition(kind: TokenKind) -> bool {
    use TokenKind::*;
    matches!(
        kind,
        Integer | Real | Identifier | Plus | Minus | Star | Slash | LeftParen | RightParen | E | Ou
    ) || kind.is_comparison()
}
