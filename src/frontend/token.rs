//! Token types for XuLang.
//!
//! This module defines all token types produced by the lexer.

use crate::utils::location::Span;
use serde::Serialize;
use std::fmt;

/// A token in the source code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The source span
    pub span: Span,
    /// The lexeme; keywords are stored in uppercase
    pub lexeme: String,
}

impl Token {
    /// Create a new token.
    pub fn new(kind: TokenKind, span: Span, lexeme: String) -> Self {
        Self { kind, span, lexeme }
    }

    /// Check if this is the end marker.
    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Line of the first character.
    pub fn line(&self) -> usize {
        self.span.start_line
    }

    /// Column of the first character.
    pub fn column(&self) -> usize {
        self.span.start_column
    }

    /// How the token reads in a "found ..." message.
    pub fn describe(&self) -> String {
        match self.kind.category() {
            TokenCategory::Identifier => format!("identifier '{}'", self.lexeme),
            TokenCategory::IntegerLiteral | TokenCategory::RealLiteral => {
                format!("number {}", self.lexeme)
            }
            TokenCategory::StringLiteral => format!("string {}", self.lexeme),
            TokenCategory::End => "end of file".to_string(),
            _ => format!("'{}'", self.lexeme),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.kind, self.lexeme)
    }
}

/// Coarse grouping of token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenCategory {
    /// Reserved word
    Keyword,
    /// Variable name
    Identifier,
    /// Integer literal
    IntegerLiteral,
    /// Real literal
    RealLiteral,
    /// Double-quoted string
    StringLiteral,
    /// Arithmetic, relational or assignment operator
    Operator,
    /// `:` and parentheses
    Punctuation,
    /// End of input
    End,
}

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    // Literals
    /// Integer literal
    Integer,
    /// Real literal (`12.5`)
    Real,
    /// String literal, quotes included in the lexeme
    String,

    /// Identifier
    Identifier,

    // Section keywords
    /// `DECLARACOES`
    Declaracoes,
    /// `PROGRAMA`
    Programa,

    // Statement keywords
    /// `INICIO`
    Inicio,
    /// `FIM`
    Fim,
    /// `SE`
    Se,
    /// `ENTAO`
    Entao,
    /// `SENAO`
    Senao,
    /// `ENQUANTO`
    Enquanto,
    /// `LEIA`
    Leia,
    /// `ESCREVA`
    Escreva,

    // Type keywords
    /// `INTEIRO`
    Inteiro,
    /// `REAL` (the type keyword, not a literal)
    RealType,
    /// `TEXTO`
    Texto,
    /// `LOGICO`
    Logico,

    // Logical keywords
    /// `E`
    E,
    /// `OU`
    Ou,

    // Arithmetic operators
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,

    // Comparison operators
    /// `==`
    EqualEqual,
    /// `<>` (also written `!=`)
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,

    /// `<-`
    Assign,

    // Punctuation
    /// `:`
    Colon,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,

    /// End of file
    Eof,
}

impl TokenKind {
    /// Check if this is a comparison operator.
    pub fn is_comparison(&self) -> bool {
        use TokenKind::*;
        matches!(self, EqualEqual | NotEqual | Less | LessEqual | Greater | GreaterEqual)
    }

    /// Check if this is `E` or `OU`.
    pub fn is_logical(&self) -> bool {
        matches!(self, TokenKind::E | TokenKind::Ou)
    }

    /// Check if a statement can start with this token.
    pub fn starts_statement(&self) -> bool {
        use TokenKind::*;
        matches!(self, Identifier | Leia | Escreva | Se | Enquanto | Inicio)
    }

    /// Coarse category of this kind.
    pub fn category(&self) -> TokenCategory {
        use TokenKind::*;
        match self {
            Integer => TokenCategory::IntegerLiteral,
            Real => TokenCategory::RealLiteral,
            String => TokenCategory::StringLiteral,
            Identifier => TokenCategory::Identifier,
            Declaracoes | Programa | Inicio | Fim | Se | Entao | Senao | Enquanto | Leia
            | Escreva | Inteiro | RealType | Texto | Logico | E | Ou => TokenCategory::Keyword,
            Plus | Minus | Star | Slash | EqualEqual | NotEqual | Less | LessEqual | Greater
            | GreaterEqual | Assign => TokenCategory::Operator,
            Colon | LeftParen | RightParen => TokenCategory::Punctuation,
            Eof => TokenCategory::End,
        }
    }

    /// Look up a keyword, ignoring case.
    pub fn keyword(s: &str) -> Option<TokenKind> {
        let kind = match s.to_ascii_uppercase().as_str() {
            "DECLARACOES" => TokenKind::Declaracoes,
            "PROGRAMA" => TokenKind::Programa,
            "INICIO" => TokenKind::Inicio,
            "FIM" => TokenKind::Fim,
            "SE" => TokenKind::Se,
            "ENTAO" => TokenKind::Entao,
            "SENAO" => TokenKind::Senao,
            "ENQUANTO" => TokenKind::Enquanto,
            "LEIA" => TokenKind::Leia,
            "ESCREVA" => TokenKind::Escreva,
            "INTEIRO" => TokenKind::Inteiro,
            "REAL" => TokenKind::RealType,
            "TEXTO" => TokenKind::Texto,
            "LOGICO" => TokenKind::Logico,
            "E" => TokenKind::E,
            "OU" => TokenKind::Ou,
            _ => return None,
        };
        Some(kind)
    }

    /// Get a human-readable name for this token kind.
    pub fn name(&self) -> &'static str {
        use TokenKind::*;
        match self {
            Integer => "integer",
            Real => "real number",
            String => "string",
            Identifier => "identifier",
            Declaracoes => "DECLARACOES",
            Programa => "PROGRAMA",
            Inicio => "INICIO",
            Fim => "FIM",
            Se => "SE",
            Entao => "ENTAO",
            Senao => "SENAO",
            Enquanto => "ENQUANTO",
            Leia => "LEIA",
            Escreva => "ESCREVA",
            Inteiro => "INTEIRO",
            RealType => "REAL",
            Texto => "TEXTO",
            Logico => "LOGICO",
            E => "E",
            Ou => "OU",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            EqualEqual => "==",
            NotEqual => "<>",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
            Assign => "<-",
            Colon => ":",
            LeftParen => "(",
            RightParen => ")",
            Eof => "end of file",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup_ignores_case() {
        assert_eq!(TokenKind::keyword("ENQUANTO"), Some(TokenKind::Enquanto));
        assert_eq!(TokenKind::keyword("enquanto"), Some(TokenKind::Enquanto));
        assert_eq!(TokenKind::keyword("Senao"), Some(TokenKind::Senao));
        assert_eq!(TokenKind::keyword("real"), Some(TokenKind::RealType));
        assert_eq!(TokenKind::keyword("idade"), None);
    }

    #[test]
    fn test_categories() {
        assert_eq!(TokenKind::Fim.category(), TokenCategory::Keyword);
        assert_eq!(TokenKind::Ou.category(), TokenCategory::Keyword);
        assert_eq!(TokenKind::Identifier.category(), TokenCategory::Identifier);
        assert_eq!(TokenKind::Assign.category(), TokenCategory::Operator);
        assert_eq!(TokenKind::Colon.category(), TokenCategory::Punctuation);
        assert!(TokenKind::NotEqual.is_comparison());
        assert!(!TokenKind::Assign.is_comparison());
    }

    #[test]
    fn test_describe() {
        let span = Span::new(1, 1, 1, 4);
        let ident = Token::new(TokenKind::Identifier, span, "abc".into());
        assert_eq!(ident.describe(), "identifier 'abc'");
        let fim = Token::new(TokenKind::Fim, span, "FIM".into());
        assert_eq!(fim.describe(), "'FIM'");
        let eof = Token::new(TokenKind::Eof, span, String::new());
        assert_eq!(eof.describe(), "end of file");
    }
}
