//! Token types for OData query expressions.

use crate::ast::Span;
use logos::Logos;
use smol_str::SmolStr;
use std::fmt;

/// The kind of a lexical token.
///
/// Words are always lexed as [`TokenKind::Identifier`]; operators, function
/// names and stage names are contextual and matched by the parser through
/// [`super::keywords`], since most of them are also valid property names.
#[derive(Logos, Debug, Clone, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n]+")]
pub enum TokenKind {
    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token("/")]
    Slash,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token("=")]
    Eq,
    #[token("*")]
    Star,
    #[token(".")]
    Dot,

    // Literals
    /// Single-quoted string with `''` un-escaped.
    #[regex(r"'(?:[^']|'')*'", unescape_string)]
    StringLiteral(String),
    #[regex(r"-?[0-9]+", |lex| SmolStr::new(lex.slice()))]
    IntegerLiteral(SmolStr),
    #[regex(r"-?[0-9]+\.[0-9]+", |lex| SmolStr::new(lex.slice()))]
    DecimalLiteral(SmolStr),
    #[regex(r"-?[0-9]+(?:\.[0-9]+)?[eE][+-]?[0-9]+", |lex| SmolStr::new(lex.slice()))]
    DoubleLiteral(SmolStr),
    #[token("-INF")]
    NegativeInfinity,
    /// `@name`, including the `@`.
    #[regex(r"@[A-Za-z_][A-Za-z0-9_]*", |lex| SmolStr::new(lex.slice()))]
    ParameterAlias(SmolStr),

    /// Identifiers, optionally `$`-prefixed (`$it`, `$count`).
    #[regex(r"\$?[A-Za-z_][A-Za-z0-9_]*", |lex| SmolStr::new(lex.slice()))]
    Identifier(SmolStr),

    /// End of input. Never produced by the scanner; appended by the lexer.
    Eof,
}

fn unescape_string(lex: &mut logos::Lexer<TokenKind>) -> String {
    let slice = lex.slice();
    slice[1..slice.len() - 1].replace("''", "'")
}

impl TokenKind {
    /// Returns `true` for literal tokens.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::StringLiteral(_)
                | TokenKind::IntegerLiteral(_)
                | TokenKind::DecimalLiteral(_)
                | TokenKind::DoubleLiteral(_)
                | TokenKind::NegativeInfinity
                | TokenKind::ParameterAlias(_)
        )
    }

    /// Returns the identifier text if this is an identifier.
    pub fn identifier(&self) -> Option<&SmolStr> {
        match self {
            TokenKind::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// Returns `true` if this is the identifier `word`.
    pub fn is_word(&self, word: &str) -> bool {
        matches!(self, TokenKind::Identifier(name) if name == word)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::Colon => write!(f, "':'"),
            TokenKind::Semicolon => write!(f, "';'"),
            TokenKind::Eq => write!(f, "'='"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Dot => write!(f, "'.'"),
            TokenKind::StringLiteral(value) => write!(f, "string literal '{value}'"),
            TokenKind::IntegerLiteral(text)
            | TokenKind::DecimalLiteral(text)
            | TokenKind::DoubleLiteral(text) => write!(f, "number {text}"),
            TokenKind::NegativeInfinity => write!(f, "-INF"),
            TokenKind::ParameterAlias(name) => write!(f, "parameter alias {name}"),
            TokenKind::Identifier(name) => write!(f, "'{name}'"),
            TokenKind::Eof => write!(f, "end of input"),
        }
    }
}

/// A token with its location in the query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The span in source text.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}
