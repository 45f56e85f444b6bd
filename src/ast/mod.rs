//! AST foundation types and node structures.

pub mod apply;
pub mod expression;
pub mod query;
mod ser;
mod span;
pub mod visit;

// Re-export span types
pub use span::{Span, Spanned, join_spans};

// Re-export expression nodes
pub use expression::{
    Cast, ComparisonOperator, EdmType, Expr, FunctionCall, FunctionName, Lambda, Literal,
    LogicalOperator, MathOperator, NanInfinity, Now, Property, TimeUnit,
};

// Re-export $apply nodes
pub use apply::{
    Aggregate, AggregateFunction, Alias, AliasExpr, Transformation, TransformationArg,
    TransformationKind,
};

// Re-export the query result
pub use query::{
    ExpandItem, KeyPredicate, OrderByItem, ParseOutcome, PathSegment, QueryError, QueryOption,
    QueryOptions, SortDirection,
};
