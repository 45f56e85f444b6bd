//! OData v4 query string parser with rich diagnostics.
//!
//! This library parses the query part of an OData URL (`$filter`, `$select`,
//! `$expand`, `$orderby`, `$apply` and the scalar options) together with an
//! optional resource path into a typed tree. Trees serialize to a stable JSON
//! shape, and syntax errors render through miette.
//!
//! # Example
//!
//! ```
//! use odata_query_parser::{Expr, parse};
//!
//! let outcome = parse("Customers?$filter=Name eq 'Jef' and Age gt 30&$top=10").unwrap();
//! let query = outcome.query().unwrap();
//!
//! assert_eq!(query.top, Some(10));
//! assert!(matches!(query.filter, Some(Expr::Logical(..))));
//!
//! // Repeating an option is reported as a value, not as a syntax error.
//! let outcome = parse("$top=1&$top=2").unwrap();
//! assert_eq!(
//!     outcome.to_json_string(),
//!     r#"{"error":"$top cannot exist more than once in query string"}"#
//! );
//! ```

pub mod ast;
pub mod config;
pub mod diag;
pub mod lexer;
pub mod parser;

// Re-export syntax span primitives.
pub use ast::{Span, Spanned};

// Re-export the tree types callers match on.
pub use ast::{
    Expr, ExpandItem, KeyPredicate, Literal, OrderByItem, ParseOutcome, PathSegment, Property,
    QueryError, QueryOptions, SortDirection, Transformation,
};

// Re-export lexer types for tooling.
pub use diag::{Diag, DiagLabel, LabelRole};
pub use lexer::token::{Token, TokenKind};
pub use lexer::{Lexer, LexerResult, tokenize};

pub use config::ParserConfig;
pub use parser::{Parser, SyntaxError, parse_with_config};

/// Parses a query string with the default configuration.
pub fn parse(input: &str) -> Result<ParseOutcome, SyntaxError> {
    Parser::new().parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_accessible() {
        let _span: Span = 0..5;
        let _spanned = Spanned::new(42, 0..5);
        assert!(parse("").unwrap().query().is_some_and(QueryOptions::is_empty));
    }
}
