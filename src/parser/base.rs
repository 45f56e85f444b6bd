//! Shared parser infrastructure for token stream navigation and error handling.
//!
//! Every grammar module navigates tokens through [`TokenStream`] and reports
//! failures as [`ParseError`], so error shapes stay uniform across options.

use crate::ast::Span;
use crate::diag::{Diag, codes};
use crate::lexer::Lexer;
use crate::lexer::token::{Token, TokenKind};
use smol_str::SmolStr;

/// A parse failure.
///
/// The two categories are kept apart all the way to the public boundary:
/// syntax errors become `Err(SyntaxError)`, validation failures become an
/// error outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The input does not match the grammar.
    Syntax(Box<Diag>),
    /// The input is well-formed but breaks a validation rule.
    Invalid(Box<Diag>),
}

impl ParseError {
    /// Builds a syntax error with a primary label at `span`.
    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        ParseError::Syntax(Box::new(
            Diag::error(message)
                .with_primary_label(span, "here")
                .with_code(codes::SYNTAX),
        ))
    }

    /// Builds a validation error with a primary label at `span`.
    pub fn invalid(message: impl Into<String>, span: Span, code: &'static str) -> Self {
        ParseError::Invalid(Box::new(
            Diag::error(message)
                .with_primary_label(span, "here")
                .with_code(code),
        ))
    }

    /// The underlying diagnostic.
    pub fn diag(&self) -> &Diag {
        match self {
            ParseError::Syntax(diag) | ParseError::Invalid(diag) => diag,
        }
    }

    /// Returns `true` for validation failures.
    pub fn is_invalid(&self) -> bool {
        matches!(self, ParseError::Invalid(_))
    }
}

/// Common result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Lexes `text`, which starts at byte `offset` of the query string.
///
/// The first lexical diagnostic, if any, is returned as a syntax error.
pub fn lex(text: &str, offset: usize) -> ParseResult<Vec<Token>> {
    let result = Lexer::new(text).with_offset(offset).tokenize();
    match result.diagnostics.into_iter().next() {
        Some(diag) => Err(ParseError::Syntax(Box::new(diag))),
        None => Ok(result.tokens),
    }
}

static EOF: Token = Token {
    kind: TokenKind::Eof,
    span: 0..0,
};

/// Token stream navigator providing common operations for all parsers.
pub struct TokenStream<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> TokenStream<'a> {
    /// Creates a new token stream from a token slice.
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Returns the current token.
    ///
    /// If the position is past the end, returns the last token (which should be EOF).
    pub fn current(&self) -> &'a Token {
        self.nth(0)
    }

    /// Returns the token `n` positions ahead of the current one.
    pub fn nth(&self, n: usize) -> &'a Token {
        self.tokens
            .get(self.pos + n)
            .or_else(|| self.tokens.last())
            .unwrap_or(&EOF)
    }

    /// Returns the next token without consuming the current one.
    pub fn peek(&self) -> &'a Token {
        self.nth(1)
    }

    /// Advances to the next token.
    ///
    /// Does nothing if already at EOF (last token).
    pub fn advance(&mut self) {
        if self.pos < self.tokens.len().saturating_sub(1) {
            self.pos += 1;
        }
    }

    /// Checks if the current token matches the given kind.
    pub fn check(&self, kind: &TokenKind) -> bool {
        &self.current().kind == kind
    }

    /// Checks if the current token is the identifier `word`.
    pub fn check_word(&self, word: &str) -> bool {
        self.current().kind.is_word(word)
    }

    /// Returns `true` once all tokens but EOF are consumed.
    pub fn at_eof(&self) -> bool {
        self.check(&TokenKind::Eof)
    }

    /// Consumes the current token if it matches the given kind.
    ///
    /// Returns `true` if the token was consumed, `false` otherwise.
    pub fn consume(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes the identifier `word` if it is the current token.
    pub fn consume_word(&mut self, word: &str) -> bool {
        if self.check_word(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects a specific token kind and returns its span.
    ///
    /// If the current token doesn't match, returns an error.
    pub fn expect(&mut self, kind: TokenKind) -> ParseResult<Span> {
        if self.check(&kind) {
            let span = self.current().span.clone();
            self.advance();
            Ok(span)
        } else {
            Err(self.error_here(format!("expected {kind}, found {}", self.current().kind)))
        }
    }

    /// Expects an identifier and returns its text and span.
    pub fn expect_identifier(&mut self, what: &str) -> ParseResult<(SmolStr, Span)> {
        let token = self.current();
        match &token.kind {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok((name.clone(), token.span.clone()))
            }
            other => Err(self.error_here(format!("expected {what}, found {other}"))),
        }
    }

    /// Creates a syntax error at the current token position.
    pub fn error_here(&self, message: impl Into<String>) -> ParseError {
        ParseError::syntax(message, self.current().span.clone())
    }

    /// Returns the current position in the token stream.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the span of the previous token (useful after consuming a token).
    pub fn previous_span(&self) -> Span {
        match self.pos.checked_sub(1).and_then(|prev| self.tokens.get(prev)) {
            Some(token) => token.span.clone(),
            None => self.current().span.clone(),
        }
    }
}
