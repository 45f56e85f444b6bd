//! Parser infrastructure for OData query strings.
//!
//! The query string is split into a resource path and options on raw text;
//! each option value is then lexed and parsed by its own grammar. Parsing
//! stops at the first failure.

pub mod apply;
pub mod base;
pub mod expression;
mod options;
pub mod path;

use crate::ast::{ParseOutcome, QueryError, Span};
use crate::config::ParserConfig;
use crate::diag::{Diag, convert_diag_to_report};
use base::ParseError;
use miette::Report;
use std::fmt;

/// OData query string parser.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Creates a parser with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the parser configuration.
    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parses a query string.
    ///
    /// Input that does not match the grammar is an `Err`. Well-formed input
    /// that breaks a validation rule (a repeated option, an invalid `$top`)
    /// is `Ok` with [`ParseOutcome::Error`].
    pub fn parse(&self, input: &str) -> Result<ParseOutcome, SyntaxError> {
        match options::parse_query_string(input, &self.config) {
            Ok(query) => Ok(ParseOutcome::Query(query)),
            Err(ParseError::Invalid(diag)) => Ok(ParseOutcome::Error(QueryError {
                span: diag.primary_span().unwrap_or(0..0),
                message: diag.message,
            })),
            Err(ParseError::Syntax(diag)) => Err(SyntaxError {
                diag,
                source: input.to_owned(),
            }),
        }
    }
}

/// Parses `input` with a custom configuration.
pub fn parse_with_config(input: &str, config: ParserConfig) -> Result<ParseOutcome, SyntaxError> {
    Parser::new().with_config(config).parse(input)
}

/// A query string that does not match the grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    diag: Box<Diag>,
    source: String,
}

impl SyntaxError {
    /// The error message.
    pub fn message(&self) -> &str {
        &self.diag.message
    }

    /// Location of the error in the query string.
    pub fn span(&self) -> Span {
        self.diag.primary_span().unwrap_or(0..0)
    }

    /// The diagnostic code, such as `odata::syntax`.
    pub fn code(&self) -> Option<&'static str> {
        self.diag.code
    }

    /// The full diagnostic, including labels and help.
    pub fn diag(&self) -> &Diag {
        &self.diag
    }

    /// The query string that failed to parse.
    pub fn source_text(&self) -> &str {
        &self.source
    }

    /// Renders the error as a miette report with the query string attached.
    pub fn into_report(self) -> Report {
        convert_diag_to_report(&self.diag, &self.source)
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let span = self.span();
        write!(f, "{} at {}..{}", self.diag.message, span.start, span.end)
    }
}

impl std::error::Error for SyntaxError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::codes;

    #[test]
    fn validation_failures_are_outcomes() {
        let outcome = Parser::new().parse("$top=foo").unwrap();
        let error = outcome.error().unwrap();
        assert_eq!(error.message, "invalid $top parameter");
        assert_eq!(error.span, 0..8);
    }

    #[test]
    fn syntax_failures_are_errors() {
        let err = Parser::new().parse("$filter=Name eq").unwrap_err();
        assert_eq!(err.message(), "expected expression, found end of input");
        assert_eq!(err.span(), 15..15);
        assert_eq!(err.code(), Some(codes::SYNTAX));
        assert_eq!(err.source_text(), "$filter=Name eq");
        assert_eq!(err.to_string(), "expected expression, found end of input at 15..15");
    }

    #[test]
    fn report_carries_code_and_help() {
        let err = Parser::new().parse("$filter=A eq @unknown").unwrap_err();
        let report = err.into_report();
        assert_eq!(report.code().map(|c| c.to_string()).as_deref(), Some(codes::SYNTAX));
        assert!(report.help().is_some());
    }

    #[test]
    fn config_is_applied() {
        let config = ParserConfig::default().with_parameter_aliases(["@me"]);
        let parser = Parser::new().with_config(config.clone());
        assert_eq!(parser.config(), &config);
        assert!(parser.parse("$filter=Owner eq @me").unwrap().query().is_some());
        assert!(parse_with_config("$filter=Owner eq @lx_myTeam", config).is_err());
    }
}
