//! Diagnostic model for lexical, syntax, and validation failures.
//!
//! Every failure the parser reports is first built as a [`Diag`]: a message,
//! one or more labeled spans into the original query string, and a stable
//! code. Diagnostics are converted to miette reports only at the public
//! boundary so callers can render them with source context.

use crate::ast::Span;
use miette::{Diagnostic, LabeledSpan, Report};
use std::fmt;

/// Stable diagnostic codes.
pub mod codes {
    /// A character sequence the lexer could not turn into a token.
    pub const LEX: &str = "odata::lex";
    /// Input does not match the grammar.
    pub const SYNTAX: &str = "odata::syntax";
    /// Nesting exceeded the configured depth limit.
    pub const DEPTH: &str = "odata::depth";
    /// An option value has the wrong shape (`$top=foo`, cast of a property, ...).
    pub const INVALID_PARAMETER: &str = "odata::invalid_parameter";
    /// A query option appeared twice in the same option list.
    pub const DUPLICATE_OPTION: &str = "odata::duplicate_option";
    /// A navigation path appeared twice in one `$expand`.
    pub const DUPLICATE_EXPAND: &str = "odata::duplicate_expand";
}

/// Role of a diagnostic label in the overall diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelRole {
    /// The location that caused the failure.
    Primary,
    /// A related location, e.g. the first occurrence of a duplicated option.
    Secondary,
}

/// A labeled span within a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagLabel {
    /// The span this label refers to.
    pub span: Span,
    /// The label text explaining this span's relevance.
    pub message: String,
    /// Whether this is a primary or secondary label.
    pub role: LabelRole,
}

impl DiagLabel {
    /// Creates a new primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            role: LabelRole::Primary,
        }
    }

    /// Creates a new secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            role: LabelRole::Secondary,
        }
    }
}

/// A structured diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diag {
    /// The main diagnostic message.
    pub message: String,
    /// Labeled spans showing relevant source locations.
    pub labels: Vec<DiagLabel>,
    /// Optional help text suggesting how to fix the issue.
    pub help: Option<String>,
    /// Diagnostic code, one of [`codes`].
    pub code: Option<&'static str>,
}

impl Diag {
    /// Creates a new diagnostic with the given message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            labels: Vec::new(),
            help: None,
            code: None,
        }
    }

    /// Adds a primary label to this diagnostic.
    pub fn with_primary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(DiagLabel::primary(span, message));
        self
    }

    /// Adds a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(DiagLabel::secondary(span, message));
        self
    }

    /// Sets the help text for this diagnostic.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Sets the diagnostic code.
    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    /// Span of the first primary label, if any.
    pub fn primary_span(&self) -> Option<Span> {
        self.labels
            .iter()
            .find(|label| label.role == LabelRole::Primary)
            .map(|label| label.span.clone())
    }
}

/// Clamps a span to valid bounds within `source`.
pub fn clamp_span(source: &str, span: &Span) -> Span {
    let len = source.len();
    let start = span.start.min(len);
    let end = span.end.min(len).max(start);
    start..end
}

/// Converts a diagnostic to a miette report carrying `source` as its source code.
///
/// Out-of-bounds spans are clamped, so a report can always be rendered.
pub fn convert_diag_to_report(diag: &Diag, source: &str) -> Report {
    Report::new(build_diagnostic(diag, source)).with_source_code(source.to_string())
}

fn build_diagnostic(diag: &Diag, source: &str) -> BuiltDiagnostic {
    let labels = diag
        .labels
        .iter()
        .map(|label| {
            let clamped = clamp_span(source, &label.span);
            let span = (clamped.start, clamped.end - clamped.start);
            match label.role {
                LabelRole::Primary => {
                    LabeledSpan::new_primary_with_span(Some(label.message.clone()), span)
                }
                LabelRole::Secondary => {
                    LabeledSpan::new_with_span(Some(label.message.clone()), span)
                }
            }
        })
        .collect();

    BuiltDiagnostic {
        message: diag.message.clone(),
        code: diag.code,
        help: diag.help.clone(),
        labels,
    }
}

/// The final diagnostic type that implements miette's Diagnostic trait.
#[derive(Debug)]
struct BuiltDiagnostic {
    message: String,
    code: Option<&'static str>,
    help: Option<String>,
    labels: Vec<LabeledSpan>,
}

impl fmt::Display for BuiltDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for BuiltDiagnostic {}

impl Diagnostic for BuiltDiagnostic {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.code.map(|c| Box::new(c) as Box<dyn fmt::Display>)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        if self.labels.is_empty() {
            None
        } else {
            Some(Box::new(self.labels.clone().into_iter()))
        }
    }
}
