//! JSON projection of the AST.
//!
//! Every node serializes to the tagged-object shape downstream mappers walk:
//! a `type` discriminant plus node-specific fields. Absent optional fields are
//! omitted rather than written as `null`.

use super::apply::{Aggregate, Alias, AliasExpr, Transformation, TransformationArg};
use super::expression::{Cast, Expr, FunctionCall, Lambda, Literal, Now, Property};
use super::query::{
    ExpandItem, KeyPredicate, OrderByItem, ParseOutcome, PathSegment, QueryOption, QueryOptions,
};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

impl Serialize for Expr {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Expr::Property(property) => property.serialize(serializer),
            Expr::Literal(literal) => literal.serialize(serializer),
            Expr::Now(now) => now.serialize(serializer),
            Expr::Cast(cast) => cast.serialize(serializer),
            Expr::FunctionCall(call) => call.serialize(serializer),
            Expr::Lambda(lambda) => lambda.serialize(serializer),
            Expr::Math(op, left, right) => serialize_binary(serializer, op.as_str(), left, right),
            Expr::Comparison(op, left, right) => {
                serialize_binary(serializer, op.as_str(), left, right)
            }
            Expr::Logical(op, left, right) => {
                serialize_binary(serializer, op.as_str(), left, right)
            }
        }
    }
}

fn serialize_binary<S>(serializer: S, tag: &str, left: &Expr, right: &Expr) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(3))?;
    map.serialize_entry("type", tag)?;
    map.serialize_entry("left", left)?;
    map.serialize_entry("right", right)?;
    map.end()
}

impl Serialize for Property {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = if self.unit.is_some() { 3 } else { 2 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("type", "property")?;
        map.serialize_entry("name", &self.name)?;
        if let Some(unit) = self.unit {
            map.serialize_entry("unit", unit.as_str())?;
        }
        map.end()
    }
}

impl Serialize for Literal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("type", "literal")?;
        map.serialize_entry("literalType", self.literal_type())?;
        map.serialize_entry("value", &LiteralValue(self))?;
        map.end()
    }
}

/// The bare `value` of a literal, as used by named key predicates.
struct LiteralValue<'a>(&'a Literal);

impl Serialize for LiteralValue<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.0 {
            Literal::Null { type_hint } => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element("null")?;
                seq.serialize_element(type_hint.as_deref().unwrap_or(""))?;
                seq.end()
            }
            Literal::NanInfinity(value) => serializer.serialize_str(value.as_str()),
            Literal::ParameterAlias(name) => serializer.serialize_str(name),
            Literal::String(text)
            | Literal::TimeOfDay(text)
            | Literal::Date(text)
            | Literal::DateTimeOffset(text) => serializer.serialize_str(text),
            Literal::Decimal(text) | Literal::Double(text) => serializer.serialize_str(text),
            Literal::Integer(value) => serializer.serialize_i64(*value),
            Literal::Boolean(value) => serializer.serialize_bool(*value),
        }
    }
}

impl Serialize for Now {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", "now")?;
        if let Some(unit) = self.unit {
            map.serialize_entry("unit", unit.as_str())?;
        }
        map.end()
    }
}

impl Serialize for Cast {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("type", "cast")?;
        map.serialize_entry("args", &(&self.value, self.target.as_str()))?;
        map.end()
    }
}

impl Serialize for FunctionCall {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("type", "functioncall")?;
        map.serialize_entry("func", self.name.as_str())?;
        map.serialize_entry("args", &self.args)?;
        map.end()
    }
}

impl Serialize for Lambda {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let variable = Property::new(self.variable.clone());
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("type", "lambda")?;
        map.serialize_entry("args", &(&variable, self.body.as_ref()))?;
        map.end()
    }
}

impl Serialize for Transformation {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("type", "transformation")?;
        map.serialize_entry("func", self.kind.as_str())?;
        map.serialize_entry("args", &self.args)?;
        map.end()
    }
}

impl Serialize for TransformationArg {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            TransformationArg::Expr(expr) => expr.serialize(serializer),
            TransformationArg::Alias(alias) => alias.serialize(serializer),
            TransformationArg::Transformation(stage) => stage.serialize(serializer),
        }
    }
}

impl Serialize for Alias {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("type", "alias")?;
        map.serialize_entry("name", &self.name)?;
        match &self.expression {
            AliasExpr::Expr(expr) => map.serialize_entry("expression", expr)?,
            AliasExpr::Aggregate(aggregate) => map.serialize_entry("expression", aggregate)?,
        }
        map.end()
    }
}

impl Serialize for Aggregate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(3))?;
        map.serialize_entry("type", "aggregate")?;
        map.serialize_entry("func", self.func.as_str())?;
        map.serialize_entry("args", std::slice::from_ref(&self.property))?;
        map.end()
    }
}

impl Serialize for QueryOptions {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        if let Some(path) = &self.path {
            map.serialize_entry("$path", path)?;
        }
        if let Some(select) = &self.select {
            map.serialize_entry(QueryOption::Select.as_str(), select)?;
        }
        if let Some(expand) = &self.expand {
            map.serialize_entry(QueryOption::Expand.as_str(), expand)?;
        }
        if let Some(filter) = &self.filter {
            map.serialize_entry(QueryOption::Filter.as_str(), filter)?;
        }
        if let Some(orderby) = &self.orderby {
            map.serialize_entry(QueryOption::OrderBy.as_str(), orderby)?;
        }
        if let Some(callback) = &self.callback {
            map.serialize_entry(QueryOption::Callback.as_str(), callback)?;
        }
        if let Some(format) = &self.format {
            map.serialize_entry(QueryOption::Format.as_str(), format)?;
        }
        if let Some(search) = &self.search {
            map.serialize_entry(QueryOption::Search.as_str(), search)?;
        }
        if let Some(count) = self.count {
            map.serialize_entry(QueryOption::Count.as_str(), &count)?;
        }
        if let Some(skip) = self.skip {
            map.serialize_entry(QueryOption::Skip.as_str(), &skip)?;
        }
        if let Some(top) = self.top {
            map.serialize_entry(QueryOption::Top.as_str(), &top)?;
        }
        if let Some(apply) = &self.apply {
            map.serialize_entry(QueryOption::Apply.as_str(), apply)?;
        }
        map.end()
    }
}

impl Serialize for PathSegment {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("name", &self.name)?;
        if let Some(predicates) = &self.predicates {
            map.serialize_entry("predicates", predicates)?;
        }
        map.end()
    }
}

impl Serialize for KeyPredicate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            KeyPredicate::Positional(literal) => literal.serialize(serializer),
            KeyPredicate::Named { name, value } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("type", "property")?;
                map.serialize_entry("name", name)?;
                map.serialize_entry("value", &LiteralValue(value))?;
                map.end()
            }
        }
    }
}

impl Serialize for ExpandItem {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("path", &self.path)?;
        map.serialize_entry("options", &self.options)?;
        map.end()
    }
}

impl Serialize for OrderByItem {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.path, self.direction.as_str())?;
        map.end()
    }
}

impl Serialize for ParseOutcome {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ParseOutcome::Query(query) => query.serialize(serializer),
            ParseOutcome::Error(error) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", &error.message)?;
                map.end()
            }
        }
    }
}
