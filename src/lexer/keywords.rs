//! Contextual keyword tables.
//!
//! OData words are case-sensitive (`IsOf` but `startswith`), so every lookup
//! is an exact match. The tables are plain `match` expressions and need no
//! initialization.

use crate::ast::{
    AggregateFunction, ComparisonOperator, EdmType, FunctionName, LogicalOperator, MathOperator,
    QueryOption, TimeUnit, TransformationKind,
};

/// Looks up a comparison operator word.
pub fn lookup_comparison(word: &str) -> Option<ComparisonOperator> {
    match word {
        "eq" => Some(ComparisonOperator::Eq),
        "ne" => Some(ComparisonOperator::Ne),
        "ge" => Some(ComparisonOperator::Ge),
        "gt" => Some(ComparisonOperator::Gt),
        "le" => Some(ComparisonOperator::Le),
        "lt" => Some(ComparisonOperator::Lt),
        _ => None,
    }
}

/// Looks up an additive operator word.
pub fn lookup_additive(word: &str) -> Option<MathOperator> {
    match word {
        "add" => Some(MathOperator::Add),
        "sub" => Some(MathOperator::Sub),
        _ => None,
    }
}

/// Looks up a multiplicative operator word.
pub fn lookup_multiplicative(word: &str) -> Option<MathOperator> {
    match word {
        "mul" => Some(MathOperator::Mul),
        "div" => Some(MathOperator::Div),
        "mod" => Some(MathOperator::Mod),
        _ => None,
    }
}

/// Looks up `and` / `or`.
pub fn lookup_logical(word: &str) -> Option<LogicalOperator> {
    match word {
        "and" => Some(LogicalOperator::And),
        "or" => Some(LogicalOperator::Or),
        _ => None,
    }
}

/// Returns `true` for words that can only appear as binary operators.
///
/// These are never accepted as property names.
pub fn is_reserved_operator(word: &str) -> bool {
    lookup_comparison(word).is_some()
        || lookup_additive(word).is_some()
        || lookup_multiplicative(word).is_some()
        || lookup_logical(word).is_some()
}

/// Looks up a built-in function name.
pub fn lookup_function(word: &str) -> Option<FunctionName> {
    match word {
        "startswith" => Some(FunctionName::StartsWith),
        "endswith" => Some(FunctionName::EndsWith),
        "substringof" => Some(FunctionName::SubstringOf),
        "contains" => Some(FunctionName::Contains),
        "IsOf" => Some(FunctionName::IsOf),
        "any" => Some(FunctionName::Any),
        "all" => Some(FunctionName::All),
        "tolower" => Some(FunctionName::ToLower),
        "toupper" => Some(FunctionName::ToUpper),
        "trim" => Some(FunctionName::Trim),
        "length" => Some(FunctionName::Length),
        "year" => Some(FunctionName::Year),
        "month" => Some(FunctionName::Month),
        "day" => Some(FunctionName::Day),
        "hour" => Some(FunctionName::Hour),
        "minute" => Some(FunctionName::Minute),
        "second" => Some(FunctionName::Second),
        "round" => Some(FunctionName::Round),
        "floor" => Some(FunctionName::Floor),
        "ceiling" => Some(FunctionName::Ceiling),
        "indexof" => Some(FunctionName::IndexOf),
        "concat" => Some(FunctionName::Concat),
        "substring" => Some(FunctionName::Substring),
        "replace" => Some(FunctionName::Replace),
        _ => None,
    }
}

/// Looks up a `cast` target type by its qualified name (`Edm.String`).
pub fn lookup_edm_type(name: &str) -> Option<EdmType> {
    match name {
        "Edm.Boolean" => Some(EdmType::Boolean),
        "Edm.String" => Some(EdmType::String),
        "Edm.Decimal" => Some(EdmType::Decimal),
        "Edm.Int32" => Some(EdmType::Int32),
        "Edm.TimeOfDay" => Some(EdmType::TimeOfDay),
        "Edm.Date" => Some(EdmType::Date),
        "Edm.DateTimeOffset" => Some(EdmType::DateTimeOffset),
        _ => None,
    }
}

/// Looks up a `.unit()` accessor name.
pub fn lookup_time_unit(word: &str) -> Option<TimeUnit> {
    match word {
        "microseconds" => Some(TimeUnit::Microseconds),
        "milliseconds" => Some(TimeUnit::Milliseconds),
        "second" => Some(TimeUnit::Second),
        "minute" => Some(TimeUnit::Minute),
        "hour" => Some(TimeUnit::Hour),
        "day" => Some(TimeUnit::Day),
        "week" => Some(TimeUnit::Week),
        "month" => Some(TimeUnit::Month),
        "quarter" => Some(TimeUnit::Quarter),
        "year" => Some(TimeUnit::Year),
        "decade" => Some(TimeUnit::Decade),
        "century" => Some(TimeUnit::Century),
        "millennium" => Some(TimeUnit::Millennium),
        _ => None,
    }
}

/// Looks up an aggregation method used after `with`.
pub fn lookup_aggregate(word: &str) -> Option<AggregateFunction> {
    match word {
        "sum" => Some(AggregateFunction::Sum),
        "min" => Some(AggregateFunction::Min),
        "max" => Some(AggregateFunction::Max),
        "average" => Some(AggregateFunction::Average),
        "countdistinct" => Some(AggregateFunction::CountDistinct),
        _ => None,
    }
}

/// Looks up an `$apply` stage name.
pub fn lookup_transformation(word: &str) -> Option<TransformationKind> {
    match word {
        "identity" => Some(TransformationKind::Identity),
        "filter" => Some(TransformationKind::Filter),
        "aggregate" => Some(TransformationKind::Aggregate),
        "compute" => Some(TransformationKind::Compute),
        "expand" => Some(TransformationKind::Expand),
        "topcount" => Some(TransformationKind::TopCount),
        "topsum" => Some(TransformationKind::TopSum),
        "toppercent" => Some(TransformationKind::TopPercent),
        "bottomcount" => Some(TransformationKind::BottomCount),
        "bottomsum" => Some(TransformationKind::BottomSum),
        "bottompercent" => Some(TransformationKind::BottomPercent),
        "search" => Some(TransformationKind::Search),
        _ => None,
    }
}

/// Looks up a system query option by its `$`-prefixed name.
pub fn lookup_query_option(name: &str) -> Option<QueryOption> {
    match name {
        "$select" => Some(QueryOption::Select),
        "$expand" => Some(QueryOption::Expand),
        "$filter" => Some(QueryOption::Filter),
        "$orderby" => Some(QueryOption::OrderBy),
        "$callback" => Some(QueryOption::Callback),
        "$format" => Some(QueryOption::Format),
        "$search" => Some(QueryOption::Search),
        "$count" => Some(QueryOption::Count),
        "$skip" => Some(QueryOption::Skip),
        "$top" => Some(QueryOption::Top),
        "$apply" => Some(QueryOption::Apply),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operators_are_exact_and_case_sensitive() {
        assert_eq!(lookup_comparison("le"), Some(ComparisonOperator::Le));
        assert_eq!(lookup_comparison("EQ"), None);
        assert_eq!(lookup_multiplicative("mod"), Some(MathOperator::Mod));
        assert_eq!(lookup_additive("mul"), None);
        assert!(is_reserved_operator("or"));
        assert!(!is_reserved_operator("Order"));
    }

    #[test]
    fn function_names_keep_their_casing() {
        assert_eq!(lookup_function("IsOf"), Some(FunctionName::IsOf));
        assert_eq!(lookup_function("isof"), None);
        assert_eq!(lookup_function("substringof"), Some(FunctionName::SubstringOf));
        assert_eq!(lookup_function("matchesPattern"), None);
    }

    #[test]
    fn vocabularies_round_trip_through_as_str() {
        for name in [
            "Edm.Boolean",
            "Edm.String",
            "Edm.Decimal",
            "Edm.Int32",
            "Edm.TimeOfDay",
            "Edm.Date",
            "Edm.DateTimeOffset",
        ] {
            assert_eq!(lookup_edm_type(name).map(EdmType::as_str), Some(name));
        }
        for name in ["sum", "min", "max", "average", "countdistinct"] {
            assert_eq!(lookup_aggregate(name).map(AggregateFunction::as_str), Some(name));
        }
        for name in ["identity", "topcount", "bottompercent", "search"] {
            assert_eq!(
                lookup_transformation(name).map(TransformationKind::as_str),
                Some(name)
            );
        }
        assert_eq!(lookup_time_unit("millennium"), Some(TimeUnit::Millennium));
        assert_eq!(lookup_edm_type("Edm.Guid"), None);
    }

    #[test]
    fn query_options_require_dollar() {
        assert_eq!(lookup_query_option("$top"), Some(QueryOption::Top));
        assert_eq!(lookup_query_option("top"), None);
        assert_eq!(lookup_query_option("$levels"), None);
    }
}
