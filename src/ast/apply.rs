//! `$apply` transformation pipeline nodes.

use super::expression::{Expr, Property};
use smol_str::SmolStr;

/// Stage names of the `$apply` pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformationKind {
    Identity,
    Filter,
    Aggregate,
    Compute,
    Expand,
    TopCount,
    TopSum,
    TopPercent,
    BottomCount,
    BottomSum,
    BottomPercent,
    Search,
}

impl TransformationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TransformationKind::Identity => "identity",
            TransformationKind::Filter => "filter",
            TransformationKind::Aggregate => "aggregate",
            TransformationKind::Compute => "compute",
            TransformationKind::Expand => "expand",
            TransformationKind::TopCount => "topcount",
            TransformationKind::TopSum => "topsum",
            TransformationKind::TopPercent => "toppercent",
            TransformationKind::BottomCount => "bottomcount",
            TransformationKind::BottomSum => "bottomsum",
            TransformationKind::BottomPercent => "bottompercent",
            TransformationKind::Search => "search",
        }
    }
}

/// One pipeline stage.
///
/// `identity` has no arguments and `filter` exactly one boolean expression.
/// `expand` starts with the navigation property followed by nested stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transformation {
    pub kind: TransformationKind,
    pub args: Vec<TransformationArg>,
}

impl Transformation {
    /// Creates a stage with no arguments.
    pub fn identity() -> Self {
        Self {
            kind: TransformationKind::Identity,
            args: Vec::new(),
        }
    }
}

/// An argument of a pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformationArg {
    Expr(Expr),
    Alias(Alias),
    Transformation(Transformation),
}

/// `<expression> as <name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    pub name: SmolStr,
    pub expression: AliasExpr,
}

/// The value bound by an alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasExpr {
    Expr(Expr),
    /// `<path> with <func>` inside `aggregate`.
    Aggregate(Aggregate),
}

/// `<path> with <func>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate {
    pub func: AggregateFunction,
    pub property: Property,
}

/// Aggregation methods accepted after `with`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    Sum,
    Min,
    Max,
    Average,
    CountDistinct,
}

impl AggregateFunction {
    pub fn as_str(self) -> &'static str {
        match self {
            AggregateFunction::Sum => "sum",
            AggregateFunction::Min => "min",
            AggregateFunction::Max => "max",
            AggregateFunction::Average => "average",
            AggregateFunction::CountDistinct => "countdistinct",
        }
    }
}
