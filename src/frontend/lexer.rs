//! Lexer for XuLang.
//!
//! The lexer converts source text into a stream of tokens in a single
//! left-to-right pass. The first error stops it; there is no recovery.

use crate::frontend::token::{Token, TokenKind};
use crate::utils::errors::{LexerError, LexerErrorKind};
use crate::utils::location::{SourceLocation, Span};
use log::trace;
use std::iter::Peekable;
use std::str::Chars;

/// A lexer for tokenizing source code.
pub struct Lexer<'a> {
    /// The source text
    source: &'a str,
    /// Character iterator
    chars: Peekable<Chars<'a>>,
    /// Current byte offset
    offset: usize,
    /// Current line number (1-indexed)
    line: usize,
    /// Current column number (1-indexed, in characters)
    column: usize,
    /// Start of current token
    token_start: SourceLocation,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source.
    pub fn new(source: &'a str) -> Self {
        let mut lexer = Self {
            source,
            chars: source.chars().peekable(),
            offset: 0,
            line: 1,
            column: 1,
            token_start: SourceLocation::start(),
        };
        // editors on Windows like to prepend a byte order mark
        if lexer.peek() == Some('\u{feff}') {
            lexer.chars.next();
            lexer.offset += '\u{feff}'.len_utf8();
        }
        lexer
    }

    /// Get the current location.
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column, self.offset)
    }

    /// Mark the start of a new token.
    fn mark_token_start(&mut self) {
        self.token_start = self.current_location();
    }

    /// Create a span from token start to current location.
    fn make_span(&self) -> Span {
        Span::from_locations(self.token_start, self.current_location())
    }

    /// Peek at the current character without consuming it.
    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    /// Peek at the character after the current one.
    fn peek_next(&self) -> Option<char> {
        let mut chars = self.source[self.offset..].chars();
        chars.next();
        chars.next()
    }

    /// Consume and return the current character.
    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Consume the current character if it matches.
    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Skip whitespace and `#` comments.
    fn skip_whitespace(&mut self) {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.advance();
                }
                Some('#') => {
                    while self.peek().is_some() && self.peek() != Some('\n') {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// Create a token with the given kind from the text since the token start.
    fn make_token(&self, kind: TokenKind) -> Token {
        let span = self.make_span();
        let lexeme = self.source[span.start_offset..span.end_offset].to_string();
        Token::new(kind, span, lexeme)
    }

    /// Create an error spanning the current token.
    fn make_error(&self, message: String, kind: LexerErrorKind) -> LexerError {
        LexerError { message, span: self.make_span(), kind }
    }

    fn invalid_character(&self, c: char) -> LexerError {
        let hint = match c {
            '=' => " (use '<-' to assign or '==' to compare)",
            ';' => " (statements need no terminator)",
            '\'' => " (strings use double quotes)",
            _ => "",
        };
        self.make_error(
            format!("invalid character '{}'{}", c.escape_default(), hint),
            LexerErrorKind::InvalidCharacter,
        )
    }

    /// Scan an integer or real literal.
    fn scan_number(&mut self) -> Token {
        while self.peek().map(|c| c.is_ascii_digit()).unwrap_or(false) {
            self.advance();
        }

        // a real needs digits on both sides of the point
        if self.peek() == Some('.') && self.peek_next().map(|c| c.is_ascii_digit()).unwrap_or(false) {
            self.advance();
            while self.peek().map(|c| c.is_ascii_digit()).unwrap_or(false) {
                self.advance();
            }
            return self.make_token(TokenKind::Real);
        }

        self.make_token(TokenKind::Integer)
    }

    /// Scan an identifier or keyword.
    fn scan_identifier(&mut self) -> Token {
        while self.peek().map(|c| c.is_ascii_alphanumeric() || c == '_').unwrap_or(false) {
            self.advance();
        }

        let span = self.make_span();
        let lexeme = &self.source[span.start_offset..span.end_offset];
        match TokenKind::keyword(lexeme) {
            Some(kind) => Token::new(kind, span, lexeme.to_ascii_uppercase()),
            None => Token::new(TokenKind::Identifier, span, lexeme.to_string()),
        }
    }

    /// Scan a string literal. The opening quote is already consumed.
    fn scan_string(&mut self) -> Result<Token, LexerError> {
        loop {
            match self.peek() {
                Some('"') => {
                    self.advance();
                    return Ok(self.make_token(TokenKind::String));
                }
                Some('\n') | None => {
                    // reported at the opening quote
                    return Err(LexerError {
                        message: "unterminated string literal".to_string(),
                        span: Span::point(self.token_start),
                        kind: LexerErrorKind::UnterminatedString,
                    });
                }
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    /// Scan the next token.
    pub fn next_token(&mut self) -> Result<Token, LexerError> {
        self.skip_whitespace();
        self.mark_token_start();

        let c = match self.advance() {
            Some(c) => c,
            None => return Ok(self.make_token(TokenKind::Eof)),
        };

        let token = match c {
            '(' => self.make_token(TokenKind::LeftParen),
            ')' => self.make_token(TokenKind::RightParen),
            ':' => self.make_token(TokenKind::Colon),
            '+' => self.make_token(TokenKind::Plus),
            '-' => self.make_token(TokenKind::Minus),
            '*' => self.make_token(TokenKind::Star),
            '/' => self.make_token(TokenKind::Slash),

            '<' => {
                if self.match_char('-') {
                    self.make_token(TokenKind::Assign)
                } else if self.match_char('=') {
                    self.make_token(TokenKind::LessEqual)
                } else if self.match_char('>') {
                    self.make_token(TokenKind::NotEqual)
                } else {
                    self.make_token(TokenKind::Less)
                }
            }
            '>' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::GreaterEqual)
                } else {
                    self.make_token(TokenKind::Greater)
                }
            }
            '=' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::EqualEqual)
                } else {
                    return Err(self.invalid_character(c));
                }
            }
            '!' => {
                if self.match_char('=') {
                    self.make_token(TokenKind::NotEqual)
                } else {
                    return Err(self.invalid_character(c));
                }
            }

            '"' => self.scan_string()?,

            c if c.is_ascii_digit() => self.scan_number(),

            c if c.is_ascii_alphabetic() || c == '_' => self.scan_identifier(),

            _ => return Err(self.invalid_character(c)),
        };

        trace!("token {} at {}", token, token.span);
        Ok(token)
    }

    /// Collect all tokens, ending with [`TokenKind::Eof`].
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexerError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token.is_eof();
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }
}
