//! Lexical analysis for OData expressions.
//!
//! Only expression-bearing text goes through the lexer: `$filter` and `$apply`
//! values, `$orderby`/`$select` items and the resource path. The option list
//! itself is split on raw text by the parser, since `&`, `?` and `;` never
//! occur as tokens inside an expression.

pub mod keywords;
pub mod literal;
pub mod token;

use crate::diag::{Diag, codes};
use logos::Logos;
use token::{Token, TokenKind};

/// Result of lexical analysis.
///
/// Contains both the tokens produced and any diagnostics encountered during scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerResult {
    /// The tokens produced, including an EOF token at the end.
    pub tokens: Vec<Token>,
    /// Diagnostics encountered during lexing.
    pub diagnostics: Vec<Diag>,
}

/// A lexer over one slice of the query string.
///
/// The lexer keeps scanning after an unrecognized character so every bad
/// region is reported; consecutive bad characters are reported once.
pub struct Lexer<'a> {
    source: &'a str,
    /// Byte offset of `source` within the full query string.
    offset: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given source text.
    pub fn new(source: &'a str) -> Self {
        Self { source, offset: 0 }
    }

    /// Shifts every produced span by `offset`.
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Tokenizes the source text and returns the result.
    pub fn tokenize(self) -> LexerResult {
        let mut tokens = Vec::new();
        let mut diagnostics = Vec::new();
        let mut lexer = TokenKind::lexer(self.source);
        let mut error_start: Option<usize> = None;

        loop {
            match lexer.next() {
                Some(Ok(kind)) => {
                    if let Some(start) = error_start.take() {
                        diagnostics.push(self.garbage(start, lexer.span().start));
                    }
                    let span = lexer.span();
                    tokens.push(Token::new(kind, self.shift(span.start)..self.shift(span.end)));
                }
                Some(Err(())) => {
                    if error_start.is_none() {
                        error_start = Some(lexer.span().start);
                    }
                }
                None => {
                    if let Some(start) = error_start.take() {
                        diagnostics.push(self.garbage(start, self.source.len()));
                    }
                    break;
                }
            }
        }

        let end = self.shift(self.source.len());
        tokens.push(Token::new(TokenKind::Eof, end..end));

        LexerResult {
            tokens,
            diagnostics,
        }
    }

    fn shift(&self, pos: usize) -> usize {
        pos + self.offset
    }

    fn garbage(&self, start: usize, end: usize) -> Diag {
        // Skipped whitespace before the next token belongs to no token.
        let text = self.source[start..end].trim_end();
        let span = self.shift(start)..self.shift(start + text.len());
        if text.starts_with('\'') {
            Diag::error("unterminated string literal")
                .with_primary_label(span, "string starts here")
                .with_help("close the string with ' and write embedded quotes as ''")
                .with_code(codes::LEX)
        } else {
            Diag::error(format!("unexpected characters `{text}`"))
                .with_primary_label(span, "not a valid token")
                .with_code(codes::LEX)
        }
    }
}

/// Convenience function to tokenize source text.
pub fn tokenize(source: &str) -> LexerResult {
    Lexer::new(source).tokenize()
}
