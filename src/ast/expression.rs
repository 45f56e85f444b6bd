//! Expression AST nodes for `$filter`, `$apply` stage bodies and `$orderby`-style paths.
//!
//! The tree is a plain owned structure: every parent exclusively owns its
//! children and nothing refers back up the tree. Operator and vocabulary
//! enums are closed so matching over them is exhaustive.

use smol_str::SmolStr;
use std::fmt;
use std::ops::RangeInclusive;

/// A filter, compute or lambda-body expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Property path, optionally with a `.unit()` accessor.
    Property(Property),
    /// Typed literal value.
    Literal(Literal),
    /// `now()`, optionally with a `.unit()` accessor.
    Now(Now),
    /// `cast(<literal>, Edm.X)`.
    Cast(Cast),
    /// Built-in function call, including collection predicates.
    FunctionCall(FunctionCall),
    /// `<var>:<body>` inside `any`/`all`.
    Lambda(Lambda),
    /// Arithmetic: `add`, `sub`, `mul`, `div`, `mod`.
    Math(MathOperator, Box<Expr>, Box<Expr>),
    /// Comparison: `eq`, `ne`, `ge`, `gt`, `le`, `lt`.
    Comparison(ComparisonOperator, Box<Expr>, Box<Expr>),
    /// `and` / `or`.
    Logical(LogicalOperator, Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Builds a property node without a unit accessor.
    pub fn property(name: impl Into<SmolStr>) -> Self {
        Expr::Property(Property::new(name))
    }

    /// Builds a binary math node.
    pub fn math(op: MathOperator, left: Expr, right: Expr) -> Self {
        Expr::Math(op, Box::new(left), Box::new(right))
    }

    /// Builds a binary comparison node.
    pub fn comparison(op: ComparisonOperator, left: Expr, right: Expr) -> Self {
        Expr::Comparison(op, Box::new(left), Box::new(right))
    }

    /// Builds a binary logical node.
    pub fn logical(op: LogicalOperator, left: Expr, right: Expr) -> Self {
        Expr::Logical(op, Box::new(left), Box::new(right))
    }

    /// Returns `true` when the expression can stand as a filter on its own.
    ///
    /// Boolean shapes are comparisons, `and`/`or` of boolean shapes, boolean
    /// function calls (including `any`/`all`) and boolean literals.
    pub fn is_boolean(&self) -> bool {
        let mut current = self;
        loop {
            match current {
                Expr::Logical(_, left, right) => {
                    if !left.is_boolean() {
                        return false;
                    }
                    current = right;
                }
                Expr::Comparison(..) => return true,
                Expr::FunctionCall(call) => return call.name.is_boolean(),
                Expr::Literal(Literal::Boolean(_)) => return true,
                _ => return false,
            }
        }
    }

    /// Returns the property node when this expression is a bare property path.
    pub fn as_property(&self) -> Option<&Property> {
        match self {
            Expr::Property(property) => Some(property),
            _ => None,
        }
    }
}

/// A `/`-joined property path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Navigation path, segments joined with `/`.
    pub name: SmolStr,
    /// Unit accessor applied with `.unit()`.
    pub unit: Option<TimeUnit>,
}

impl Property {
    /// Creates a property path without a unit accessor.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            unit: None,
        }
    }

    /// Sets the unit accessor.
    pub fn with_unit(mut self, unit: TimeUnit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Iterates the `/`-separated path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.name.split('/')
    }
}

/// `now()` with an optional unit accessor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Now {
    pub unit: Option<TimeUnit>,
}

/// `cast(<literal>, <edm type>)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cast {
    /// The literal being cast. Casting anything else is rejected by the parser.
    pub value: Literal,
    /// Target primitive type.
    pub target: EdmType,
}

/// A call to one of the built-in functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    pub name: FunctionName,
    pub args: Vec<Expr>,
}

/// Lambda body of an `any`/`all` collection predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lambda {
    /// The range variable bound inside `body`.
    pub variable: SmolStr,
    pub body: Box<Expr>,
}

/// Literal values with their OData literal type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// `null`, optionally qualified: `null'Edm.String'`.
    Null { type_hint: Option<SmolStr> },
    /// `NaN`, `INF` or `-INF`.
    NanInfinity(NanInfinity),
    /// One of the recognized `@name` aliases, stored with its `@`.
    ParameterAlias(SmolStr),
    /// Quoted string with `''` already un-escaped.
    String(String),
    /// Quoted `hh:mm[:ss[.fff]]`.
    TimeOfDay(String),
    /// Quoted `YYYY-MM-DD`.
    Date(String),
    /// Quoted `YYYY-MM-DDThh:mm[:ss[.fff]](Z|±hh:mm)`.
    DateTimeOffset(String),
    /// Decimal source text, e.g. `3.4`.
    Decimal(SmolStr),
    /// Exponent-form source text, e.g. `3.4e1`.
    Double(SmolStr),
    Integer(i64),
    Boolean(bool),
}

impl Literal {
    /// The `literalType` tag of this literal.
    pub fn literal_type(&self) -> &'static str {
        match self {
            Literal::Null { .. } => "null",
            Literal::NanInfinity(_) => "NaN/Infinity",
            Literal::ParameterAlias(_) => "parameter-alias",
            Literal::String(_) => "string",
            Literal::TimeOfDay(_) => "timeOfDay",
            Literal::Date(_) => "date",
            Literal::DateTimeOffset(_) => "dateTimeOffset",
            Literal::Decimal(_) => "decimal",
            Literal::Double(_) => "double",
            Literal::Integer(_) => "integer",
            Literal::Boolean(_) => "boolean",
        }
    }
}

/// The three non-finite numeric literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NanInfinity {
    NaN,
    Infinity,
    NegativeInfinity,
}

impl NanInfinity {
    pub fn as_str(self) -> &'static str {
        match self {
            NanInfinity::NaN => "NaN",
            NanInfinity::Infinity => "INF",
            NanInfinity::NegativeInfinity => "-INF",
        }
    }
}

/// Arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MathOperator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl MathOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            MathOperator::Add => "add",
            MathOperator::Sub => "sub",
            MathOperator::Mul => "mul",
            MathOperator::Div => "div",
            MathOperator::Mod => "mod",
        }
    }

    /// Returns `true` for `mul`, `div` and `mod`.
    pub fn is_multiplicative(self) -> bool {
        matches!(self, MathOperator::Mul | MathOperator::Div | MathOperator::Mod)
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Eq,
    Ne,
    Ge,
    Gt,
    Le,
    Lt,
}

impl ComparisonOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "eq",
            ComparisonOperator::Ne => "ne",
            ComparisonOperator::Ge => "ge",
            ComparisonOperator::Gt => "gt",
            ComparisonOperator::Le => "le",
            ComparisonOperator::Lt => "lt",
        }
    }
}

/// Logical connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            LogicalOperator::And => "and",
            LogicalOperator::Or => "or",
        }
    }
}

/// Built-in function names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionName {
    StartsWith,
    EndsWith,
    SubstringOf,
    Contains,
    IsOf,
    Any,
    All,
    ToLower,
    ToUpper,
    Trim,
    Length,
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Round,
    Floor,
    Ceiling,
    IndexOf,
    Concat,
    Substring,
    Replace,
}

impl FunctionName {
    /// The function name as written in a query.
    pub fn as_str(self) -> &'static str {
        match self {
            FunctionName::StartsWith => "startswith",
            FunctionName::EndsWith => "endswith",
            FunctionName::SubstringOf => "substringof",
            FunctionName::Contains => "contains",
            FunctionName::IsOf => "IsOf",
            FunctionName::Any => "any",
            FunctionName::All => "all",
            FunctionName::ToLower => "tolower",
            FunctionName::ToUpper => "toupper",
            FunctionName::Trim => "trim",
            FunctionName::Length => "length",
            FunctionName::Year => "year",
            FunctionName::Month => "month",
            FunctionName::Day => "day",
            FunctionName::Hour => "hour",
            FunctionName::Minute => "minute",
            FunctionName::Second => "second",
            FunctionName::Round => "round",
            FunctionName::Floor => "floor",
            FunctionName::Ceiling => "ceiling",
            FunctionName::IndexOf => "indexof",
            FunctionName::Concat => "concat",
            FunctionName::Substring => "substring",
            FunctionName::Replace => "replace",
        }
    }

    /// Accepted number of call arguments.
    ///
    /// For `any`/`all` this counts the lambda only; the collection path is
    /// written before the function and prepended to the arguments.
    pub fn arity(self) -> RangeInclusive<usize> {
        match self {
            FunctionName::StartsWith
            | FunctionName::EndsWith
            | FunctionName::SubstringOf
            | FunctionName::Contains
            | FunctionName::IndexOf
            | FunctionName::Concat => 2..=2,
            FunctionName::IsOf => 1..=2,
            FunctionName::Substring | FunctionName::Replace => 2..=3,
            FunctionName::Any => 0..=1,
            FunctionName::All => 1..=1,
            FunctionName::ToLower
            | FunctionName::ToUpper
            | FunctionName::Trim
            | FunctionName::Length
            | FunctionName::Year
            | FunctionName::Month
            | FunctionName::Day
            | FunctionName::Hour
            | FunctionName::Minute
            | FunctionName::Second
            | FunctionName::Round
            | FunctionName::Floor
            | FunctionName::Ceiling => 1..=1,
        }
    }

    /// Returns `true` for functions that yield a boolean.
    pub fn is_boolean(self) -> bool {
        matches!(
            self,
            FunctionName::StartsWith
                | FunctionName::EndsWith
                | FunctionName::SubstringOf
                | FunctionName::Contains
                | FunctionName::IsOf
                | FunctionName::Any
                | FunctionName::All
        )
    }

    /// Returns `true` for `any` and `all`.
    pub fn is_collection(self) -> bool {
        matches!(self, FunctionName::Any | FunctionName::All)
    }
}

impl fmt::Display for FunctionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primitive types accepted as `cast` targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdmType {
    Boolean,
    String,
    Decimal,
    Int32,
    TimeOfDay,
    Date,
    DateTimeOffset,
}

impl EdmType {
    pub fn as_str(self) -> &'static str {
        match self {
            EdmType::Boolean => "Edm.Boolean",
            EdmType::String => "Edm.String",
            EdmType::Decimal => "Edm.Decimal",
            EdmType::Int32 => "Edm.Int32",
            EdmType::TimeOfDay => "Edm.TimeOfDay",
            EdmType::Date => "Edm.Date",
            EdmType::DateTimeOffset => "Edm.DateTimeOffset",
        }
    }
}

/// Units accepted by the `.unit()` accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Microseconds,
    Milliseconds,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
    Decade,
    Century,
    Millennium,
}

impl TimeUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeUnit::Microseconds => "microseconds",
            TimeUnit::Milliseconds => "milliseconds",
            TimeUnit::Second => "second",
            TimeUnit::Minute => "minute",
            TimeUnit::Hour => "hour",
            TimeUnit::Day => "day",
            TimeUnit::Week => "week",
            TimeUnit::Month => "month",
            TimeUnit::Quarter => "quarter",
            TimeUnit::Year => "year",
            TimeUnit::Decade => "decade",
            TimeUnit::Century => "century",
            TimeUnit::Millennium => "millennium",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eq(left: Expr, right: Expr) -> Expr {
        Expr::comparison(ComparisonOperator::Eq, left, right)
    }

    #[test]
    fn comparisons_and_boolean_functions_are_boolean() {
        let cmp = eq(Expr::property("Name"), Expr::Literal(Literal::Integer(1)));
        assert!(cmp.is_boolean());

        let call = Expr::FunctionCall(FunctionCall {
            name: FunctionName::StartsWith,
            args: vec![
                Expr::property("Name"),
                Expr::Literal(Literal::String("a".into())),
            ],
        });
        assert!(call.is_boolean());
        assert!(Expr::Literal(Literal::Boolean(true)).is_boolean());
    }

    #[test]
    fn logical_requires_boolean_operands() {
        let cmp = eq(Expr::property("A"), Expr::Literal(Literal::Integer(1)));
        let good = Expr::logical(LogicalOperator::And, cmp.clone(), cmp.clone());
        assert!(good.is_boolean());

        let bad = Expr::logical(LogicalOperator::Or, cmp, Expr::property("B"));
        assert!(!bad.is_boolean());
    }

    #[test]
    fn scalar_shapes_are_not_boolean() {
        assert!(!Expr::property("Name").is_boolean());
        assert!(!Expr::Now(Now::default()).is_boolean());
        let sum = Expr::math(
            MathOperator::Add,
            Expr::Literal(Literal::Integer(1)),
            Expr::Literal(Literal::Integer(2)),
        );
        assert!(!sum.is_boolean());
        let lower = Expr::FunctionCall(FunctionCall {
            name: FunctionName::ToLower,
            args: vec![Expr::property("Name")],
        });
        assert!(!lower.is_boolean());
    }

    #[test]
    fn function_arity_table() {
        assert_eq!(FunctionName::IsOf.arity(), 1..=2);
        assert_eq!(FunctionName::Replace.arity(), 2..=3);
        assert_eq!(FunctionName::Any.arity(), 0..=1);
        assert_eq!(FunctionName::Year.arity(), 1..=1);
        assert!(FunctionName::All.is_collection());
        assert!(!FunctionName::Concat.is_boolean());
    }

    #[test]
    fn literal_type_tags() {
        assert_eq!(Literal::Null { type_hint: None }.literal_type(), "null");
        assert_eq!(
            Literal::NanInfinity(NanInfinity::NegativeInfinity).literal_type(),
            "NaN/Infinity"
        );
        assert_eq!(Literal::Double("1e3".into()).literal_type(), "double");
        assert_eq!(Literal::Date("2020-01-01".into()).literal_type(), "date");
        assert_eq!(NanInfinity::NegativeInfinity.as_str(), "-INF");
    }

    #[test]
    fn property_segments_split_on_slash() {
        let property = Property::new("Orders/Items/Price").with_unit(TimeUnit::Month);
        assert_eq!(
            property.segments().collect::<Vec<_>>(),
            ["Orders", "Items", "Price"]
        );
        assert_eq!(property.unit, Some(TimeUnit::Month));
    }
}
