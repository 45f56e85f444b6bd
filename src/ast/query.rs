//! Top-level query result: resource path plus query options.

use super::Span;
use super::apply::Transformation;
use super::expression::{Expr, Literal};
use smol_str::SmolStr;
use std::fmt;

/// The recognized `$`-prefixed system query options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryOption {
    Select,
    Expand,
    Filter,
    OrderBy,
    Callback,
    Format,
    Search,
    Count,
    Skip,
    Top,
    Apply,
}

impl QueryOption {
    /// The option name including its `$`.
    pub fn as_str(self) -> &'static str {
        match self {
            QueryOption::Select => "$select",
            QueryOption::Expand => "$expand",
            QueryOption::Filter => "$filter",
            QueryOption::OrderBy => "$orderby",
            QueryOption::Callback => "$callback",
            QueryOption::Format => "$format",
            QueryOption::Search => "$search",
            QueryOption::Count => "$count",
            QueryOption::Skip => "$skip",
            QueryOption::Top => "$top",
            QueryOption::Apply => "$apply",
        }
    }
}

impl fmt::Display for QueryOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed query options. Absent options are `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryOptions {
    /// Resource path segments. Never set inside nested `$expand` options.
    pub path: Option<Vec<PathSegment>>,
    pub select: Option<Vec<SmolStr>>,
    pub expand: Option<Vec<ExpandItem>>,
    pub filter: Option<Expr>,
    pub orderby: Option<Vec<OrderByItem>>,
    pub callback: Option<String>,
    pub format: Option<String>,
    pub search: Option<String>,
    pub count: Option<bool>,
    pub skip: Option<u64>,
    pub top: Option<u64>,
    pub apply: Option<Vec<Transformation>>,
}

impl QueryOptions {
    /// Returns `true` when no option and no path was given.
    pub fn is_empty(&self) -> bool {
        *self == QueryOptions::default()
    }
}

/// One `/`-separated resource path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    pub name: SmolStr,
    /// Key predicates in parentheses; `None` when the segment has no parentheses.
    pub predicates: Option<Vec<KeyPredicate>>,
}

/// A key predicate inside a path segment's parentheses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPredicate {
    /// `Customers(1)`.
    Positional(Literal),
    /// `Customers(CustomerID=1)`.
    Named { name: SmolStr, value: Literal },
}

/// One `$expand` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandItem {
    pub path: SmolStr,
    /// Options in the parenthesized `;`-separated list; empty when absent.
    pub options: QueryOptions,
}

/// Sort direction of an `$orderby` item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// One `$orderby` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderByItem {
    pub path: SmolStr,
    pub direction: SortDirection,
}

/// A validation failure reported as a result value.
///
/// Raised for well-formed input that breaks a cross-cutting rule: a repeated
/// option, a repeated `$expand` path, a malformed scalar option value, or a
/// cast of something other than a literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    pub message: String,
    /// Location of the offending text in the input.
    pub span: Span,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Successful parse result: either the options or a validation error, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Query(QueryOptions),
    Error(QueryError),
}

impl ParseOutcome {
    /// Returns the parsed options, if validation succeeded.
    pub fn query(&self) -> Option<&QueryOptions> {
        match self {
            ParseOutcome::Query(query) => Some(query),
            ParseOutcome::Error(_) => None,
        }
    }

    /// Returns the validation error, if any.
    pub fn error(&self) -> Option<&QueryError> {
        match self {
            ParseOutcome::Query(_) => None,
            ParseOutcome::Error(error) => Some(error),
        }
    }

    /// Projects the outcome onto its JSON contract.
    pub fn to_json(&self) -> serde_json::Value {
        // Serializing these types only builds maps with string keys.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Serializes the outcome to a compact JSON string.
    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_are_empty() {
        assert!(QueryOptions::default().is_empty());
        let options = QueryOptions {
            top: Some(3),
            ..QueryOptions::default()
        };
        assert!(!options.is_empty());
    }

    #[test]
    fn outcome_accessors_are_exclusive() {
        let ok = ParseOutcome::Query(QueryOptions::default());
        assert!(ok.query().is_some());
        assert!(ok.error().is_none());

        let err = ParseOutcome::Error(QueryError {
            message: "invalid $top parameter".into(),
            span: 5..8,
        });
        assert!(err.query().is_none());
        assert_eq!(err.error().map(ToString::to_string).as_deref(), Some("invalid $top parameter"));
    }

    #[test]
    fn option_names_include_dollar() {
        assert_eq!(QueryOption::OrderBy.as_str(), "$orderby");
        assert_eq!(QueryOption::Apply.to_string(), "$apply");
        assert_eq!(SortDirection::default(), SortDirection::Asc);
    }
}
