//! Common test utilities
//!
//! Shared helpers for the integration suites.
//!
//! # Parsing Helpers
//! - [`parse_json`] - Parse a query string and return its JSON projection
//! - [`parse_query`] - Parse a query string and return the options, panicking on any error
//! - [`parse_validation_error`] - Parse and expect a validation error outcome
//! - [`parse_syntax_error`] - Parse and expect a syntax error

#![allow(dead_code)]

use odata_query_parser::{QueryError, QueryOptions, SyntaxError, parse};
use serde_json::Value;

/// Parse a query string and return the JSON projection of the outcome.
///
/// # Panics
/// Panics if the input is a syntax error.
///
/// # Example
/// ```no_run
/// let json = parse_json("$top=10");
/// assert_eq!(json["$top"], 10);
/// ```
pub fn parse_json(source: &str) -> Value {
    match parse(source) {
        Ok(outcome) => outcome.to_json(),
        Err(err) => panic!("unexpected syntax error for `{source}`: {err}"),
    }
}

/// Parse a query string and return the options.
///
/// # Panics
/// Panics on syntax errors and on validation error outcomes.
pub fn parse_query(source: &str) -> QueryOptions {
    let outcome = parse(source).unwrap_or_else(|err| panic!("unexpected syntax error for `{source}`: {err}"));
    match outcome.query() {
        Some(query) => query.clone(),
        None => panic!("unexpected validation error for `{source}`: {:?}", outcome.error()),
    }
}

/// Parse a query string and return its validation error.
///
/// # Panics
/// Panics if parsing succeeds or fails with a syntax error.
pub fn parse_validation_error(source: &str) -> QueryError {
    let outcome = parse(source).unwrap_or_else(|err| panic!("expected a validation error for `{source}`, got syntax error: {err}"));
    match outcome.error() {
        Some(error) => error.clone(),
        None => panic!("expected a validation error for `{source}`, got {:?}", outcome.query()),
    }
}

/// Parse a query string and return its syntax error.
///
/// # Panics
/// Panics if the input parses, even to a validation error.
pub fn parse_syntax_error(source: &str) -> SyntaxError {
    match parse(source) {
        Ok(outcome) => panic!("expected a syntax error for `{source}`, got {}", outcome.to_json_string()),
        Err(err) => err,
    }
}

/// Assert that a query string is rejected with a syntax error whose message
/// contains `text`.
pub fn assert_syntax_error_containing(source: &str, text: &str) {
    let err = parse_syntax_error(source);
    assert!(
        err.message().contains(text),
        "expected error containing '{text}' for `{source}`, found: {}",
        err.message()
    );
}
