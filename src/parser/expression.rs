//! Expression parsing for `$filter` and `$apply` stage bodies.
//!
//! Precedence from loosest to tightest: `or`, `and`, comparison, additive,
//! multiplicative, atoms. Chains of one precedence level nest to the right,
//! so `a sub b add c` is `sub(a, add(b, c))`. Comparisons do not chain.
//! Operator chains are collected in a loop and folded afterwards, so long
//! chains cost no parser recursion. Bracketing constructs count towards the
//! nesting limit; unfolded chain operators count towards the operator depth
//! limit, which bounds the height of the folded tree.

use crate::ast::{
    Cast, ComparisonOperator, Expr, FunctionCall, FunctionName, Lambda, Literal, LogicalOperator,
    MathOperator, NanInfinity, Now, Property, QueryOption, Span, TimeUnit, join_spans,
};
use crate::config::ParserConfig;
use crate::diag::{Diag, codes};
use crate::lexer::keywords::{
    is_reserved_operator, lookup_additive, lookup_comparison, lookup_edm_type, lookup_function,
    lookup_multiplicative, lookup_time_unit,
};
use crate::lexer::literal::classify_string;
use crate::lexer::token::{Token, TokenKind};
use crate::parser::base::{ParseError, ParseResult, TokenStream};
use smol_str::SmolStr;

/// Parser for expressions.
pub struct ExpressionParser<'a> {
    pub(super) stream: TokenStream<'a>,
    config: &'a ParserConfig,
    /// The option whose value is being parsed, used in validation messages.
    option: Option<QueryOption>,
    depth: usize,
    /// Chain operators collected but not yet folded.
    operators: usize,
}

impl<'a> ExpressionParser<'a> {
    /// Creates a new expression parser.
    pub fn new(tokens: &'a [Token], config: &'a ParserConfig) -> Self {
        Self {
            stream: TokenStream::new(tokens),
            config,
            option: None,
            depth: 0,
            operators: 0,
        }
    }

    /// Names the query option being parsed in validation messages.
    pub fn for_option(mut self, option: QueryOption) -> Self {
        self.option = Some(option);
        self
    }

    /// Starts nesting accounting at `depth`, for values inside nested option lists.
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Parses a complete boolean filter expression followed by end of input.
    pub fn parse_filter(&mut self) -> ParseResult<Expr> {
        let expr = self.parse_boolean()?;
        self.stream.expect(TokenKind::Eof)?;
        Ok(expr)
    }

    /// Parses an expression that must be boolean-shaped.
    pub fn parse_boolean(&mut self) -> ParseResult<Expr> {
        let start = self.stream.current().span.clone();
        let expr = self.parse_expression()?;
        self.require_boolean(&expr, start)?;
        Ok(expr)
    }

    /// Parses an expression at the loosest precedence level.
    pub fn parse_expression(&mut self) -> ParseResult<Expr> {
        self.parse_or_expression()
    }

    fn parse_or_expression(&mut self) -> ParseResult<Expr> {
        self.parse_logical_chain(LogicalOperator::Or, Self::parse_and_expression)
    }

    fn parse_and_expression(&mut self) -> ParseResult<Expr> {
        self.parse_logical_chain(LogicalOperator::And, Self::parse_comparison_expression)
    }

    fn parse_logical_chain(
        &mut self,
        op: LogicalOperator,
        operand: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let start = self.stream.current().span.clone();
        let first = operand(self)?;
        if !self.stream.check_word(op.as_str()) {
            return Ok(first);
        }
        self.require_boolean(&first, start)?;

        let mut rest = Vec::new();
        while self.stream.check_word(op.as_str()) {
            self.push_operator()?;
            self.stream.advance();
            let start = self.stream.current().span.clone();
            let next = operand(self)?;
            self.require_boolean(&next, start)?;
            rest.push((op, next));
        }
        self.operators -= rest.len();
        Ok(fold_right(first, rest, Expr::logical))
    }

    fn parse_comparison_expression(&mut self) -> ParseResult<Expr> {
        let left = self.parse_additive_expression()?;
        let Some(op) = self.comparison_operator() else {
            return Ok(left);
        };
        self.stream.advance();
        let right = self.parse_additive_expression()?;

        if self.comparison_operator().is_some() {
            return Err(self.stream.error_here("comparison operators cannot be chained"));
        }
        Ok(Expr::comparison(op, left, right))
    }

    fn comparison_operator(&self) -> Option<ComparisonOperator> {
        self.stream
            .current()
            .kind
            .identifier()
            .and_then(|word| lookup_comparison(word))
    }

    /// Parses an arithmetic expression, the operand level of comparisons and
    /// function arguments.
    pub fn parse_additive_expression(&mut self) -> ParseResult<Expr> {
        self.parse_math_chain(lookup_additive, Self::parse_multiplicative_expression)
    }

    fn parse_multiplicative_expression(&mut self) -> ParseResult<Expr> {
        self.parse_math_chain(lookup_multiplicative, Self::parse_atom)
    }

    fn parse_math_chain(
        &mut self,
        lookup: fn(&str) -> Option<MathOperator>,
        operand: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let first = operand(self)?;
        let mut rest = Vec::new();
        while let Some(op) = self.stream.current().kind.identifier().and_then(|w| lookup(w)) {
            self.push_operator()?;
            self.stream.advance();
            rest.push((op, operand(self)?));
        }
        self.operators -= rest.len();
        Ok(fold_right(first, rest, Expr::math))
    }

    fn parse_atom(&mut self) -> ParseResult<Expr> {
        let token = self.stream.current();
        match &token.kind {
            TokenKind::LParen => self.nested(|parser| {
                parser.stream.advance();
                let expr = parser.parse_expression()?;
                parser.stream.expect(TokenKind::RParen)?;
                Ok(expr)
            }),
            TokenKind::Identifier(word) => self.parse_word(word),
            kind if kind.is_literal() => Ok(Expr::Literal(self.parse_literal()?)),
            other => Err(self.stream.error_here(format!("expected expression, found {other}"))),
        }
    }

    fn parse_word(&mut self, word: &SmolStr) -> ParseResult<Expr> {
        let call = self.stream.peek().kind == TokenKind::LParen;
        match word.as_str() {
            "true" | "false" | "null" | "NaN" | "INF" => Ok(Expr::Literal(self.parse_literal()?)),
            "now" if call => self.parse_now(),
            "cast" if call => self.parse_cast(),
            _ if call => match lookup_function(word) {
                Some(name) if name.is_collection() => Err(self.stream.error_here(format!(
                    "'{name}' must follow a collection path, as in Items/{name}(x: ...)"
                ))),
                Some(name) => self.parse_function_call(name),
                None => Err(self.stream.error_here(format!("unknown function '{word}'"))),
            },
            _ if is_reserved_operator(word) => Err(self
                .stream
                .error_here(format!("expected expression, found operator '{word}'"))),
            _ => self.parse_property_path(),
        }
    }

    /// Parses a single literal token.
    pub fn parse_literal(&mut self) -> ParseResult<Literal> {
        let token = self.stream.current();
        let literal = match &token.kind {
            TokenKind::StringLiteral(value) => classify_string(value.clone()),
            TokenKind::IntegerLiteral(text) => match text.parse::<i64>() {
                Ok(value) => Literal::Integer(value),
                Err(_) => {
                    return Err(self.stream.error_here(format!("integer literal {text} is out of range")));
                }
            },
            TokenKind::DecimalLiteral(text) => Literal::Decimal(text.clone()),
            TokenKind::DoubleLiteral(text) => Literal::Double(text.clone()),
            TokenKind::NegativeInfinity => Literal::NanInfinity(NanInfinity::NegativeInfinity),
            TokenKind::ParameterAlias(name) => {
                if !self.config.is_parameter_alias(name) {
                    return Err(ParseError::Syntax(Box::new(
                        Diag::error(format!("unknown parameter alias '{name}'"))
                            .with_primary_label(token.span.clone(), "not a recognized alias")
                            .with_help(format!(
                                "recognized aliases: {}",
                                self.config.parameter_aliases.join(", ")
                            ))
                            .with_code(codes::SYNTAX),
                    )));
                }
                Literal::ParameterAlias(name.clone())
            }
            TokenKind::Identifier(word) => match word.as_str() {
                "true" => Literal::Boolean(true),
                "false" => Literal::Boolean(false),
                "NaN" => Literal::NanInfinity(NanInfinity::NaN),
                "INF" => Literal::NanInfinity(NanInfinity::Infinity),
                "null" => return Ok(self.parse_null()),
                _ => {
                    return Err(self.stream.error_here(format!("expected literal, found {}", token.kind)));
                }
            },
            other => return Err(self.stream.error_here(format!("expected literal, found {other}"))),
        };
        self.stream.advance();
        Ok(literal)
    }

    /// `null` optionally followed, without whitespace, by a quoted type name.
    fn parse_null(&mut self) -> Literal {
        let null_end = self.stream.current().span.end;
        self.stream.advance();
        let next = self.stream.current();
        match &next.kind {
            TokenKind::StringLiteral(hint) if next.span.start == null_end => {
                self.stream.advance();
                Literal::Null {
                    type_hint: Some(SmolStr::new(hint)),
                }
            }
            _ => Literal::Null { type_hint: None },
        }
    }

    fn parse_now(&mut self) -> ParseResult<Expr> {
        self.stream.advance();
        self.stream.expect(TokenKind::LParen)?;
        self.stream.expect(TokenKind::RParen)?;
        let unit = self.parse_unit_accessor()?;
        Ok(Expr::Now(Now { unit }))
    }

    fn parse_cast(&mut self) -> ParseResult<Expr> {
        self.stream.advance();
        self.nested(|parser| {
            parser.stream.expect(TokenKind::LParen)?;
            let value_start = parser.stream.current().span.clone();
            let value = parser.parse_additive_expression()?;
            let value_span = join_spans(&value_start, &parser.stream.previous_span());
            parser.stream.expect(TokenKind::Comma)?;
            let target = parser.parse_edm_type()?;
            parser.stream.expect(TokenKind::RParen)?;

            match value {
                Expr::Literal(value) => Ok(Expr::Cast(Cast { value, target })),
                _ => Err(ParseError::Invalid(Box::new(
                    Diag::error(match parser.option {
                        Some(option) => format!("invalid {option} parameter"),
                        None => "invalid cast parameter".to_owned(),
                    })
                        .with_primary_label(value_span, "only literals can be cast")
                        .with_code(codes::INVALID_PARAMETER),
                ))),
            }
        })
    }

    fn parse_edm_type(&mut self) -> ParseResult<crate::ast::EdmType> {
        let (first, start) = self.stream.expect_identifier("type name")?;
        let mut name = String::from(first.as_str());
        while self.stream.consume(&TokenKind::Dot) {
            let (segment, _) = self.stream.expect_identifier("type name segment")?;
            name.push('.');
            name.push_str(&segment);
        }
        let span = join_spans(&start, &self.stream.previous_span());
        lookup_edm_type(&name)
            .ok_or_else(|| ParseError::syntax(format!("unknown cast type '{name}'"), span))
    }

    fn parse_function_call(&mut self, name: FunctionName) -> ParseResult<Expr> {
        let name_span = self.stream.current().span.clone();
        self.stream.advance();
        self.nested(|parser| {
            parser.stream.expect(TokenKind::LParen)?;
            let mut args = Vec::new();
            if !parser.stream.check(&TokenKind::RParen) {
                loop {
                    args.push(parser.parse_additive_expression()?);
                    if !parser.stream.consume(&TokenKind::Comma) {
                        break;
                    }
                }
            }
            parser.stream.expect(TokenKind::RParen)?;

            let arity = name.arity();
            if !arity.contains(&args.len()) {
                let expected = if arity.start() == arity.end() {
                    arity.start().to_string()
                } else {
                    format!("{} to {}", arity.start(), arity.end())
                };
                let span = join_spans(&name_span, &parser.stream.previous_span());
                return Err(ParseError::syntax(
                    format!("'{name}' expects {expected} arguments, found {}", args.len()),
                    span,
                ));
            }
            Ok(Expr::FunctionCall(FunctionCall { name, args }))
        })
    }

    /// Parses `segment ('/' segment)*` with an optional `.unit()` accessor or
    /// trailing `/any(...)` / `/all(...)` collection predicate.
    fn parse_property_path(&mut self) -> ParseResult<Expr> {
        let mut name = String::from(self.parse_path_segment()?.as_str());

        while self.stream.check(&TokenKind::Slash) {
            let next = self.stream.peek();
            let collection = next
                .kind
                .identifier()
                .and_then(|word| lookup_function(word))
                .filter(|func| func.is_collection());
            if let Some(func) = collection
                && self.stream.nth(2).kind == TokenKind::LParen
            {
                self.stream.advance();
                return self.parse_collection_call(Property::new(name), func);
            }
            self.stream.advance();
            name.push('/');
            name.push_str(&self.parse_path_segment()?);
        }

        let mut property = Property::new(name);
        property.unit = self.parse_unit_accessor()?;
        Ok(Expr::Property(property))
    }

    fn parse_path_segment(&mut self) -> ParseResult<SmolStr> {
        let token = self.stream.current();
        match &token.kind {
            TokenKind::Identifier(word) if !is_reserved_operator(word) => {
                self.stream.advance();
                Ok(word.clone())
            }
            other => Err(self.stream.error_here(format!("expected property name, found {other}"))),
        }
    }

    /// Parses a bare navigation path: `segment ('/' segment)*`.
    pub fn parse_member_path(&mut self) -> ParseResult<SmolStr> {
        let mut name = String::from(self.parse_path_segment()?.as_str());
        while self.stream.consume(&TokenKind::Slash) {
            name.push('/');
            name.push_str(&self.parse_path_segment()?);
        }
        Ok(SmolStr::from(name))
    }

    fn parse_unit_accessor(&mut self) -> ParseResult<Option<TimeUnit>> {
        if !self.stream.consume(&TokenKind::Dot) {
            return Ok(None);
        }
        let (word, span) = self.stream.expect_identifier("unit name")?;
        let unit = lookup_time_unit(&word)
            .ok_or_else(|| ParseError::syntax(format!("unknown unit '{word}'"), span))?;
        self.stream.expect(TokenKind::LParen)?;
        self.stream.expect(TokenKind::RParen)?;
        Ok(Some(unit))
    }

    /// Parses `any(...)` / `all(...)` applied to `collection`.
    fn parse_collection_call(&mut self, collection: Property, func: FunctionName) -> ParseResult<Expr> {
        let name_span = self.stream.current().span.clone();
        self.stream.advance();
        self.nested(|parser| {
            parser.stream.expect(TokenKind::LParen)?;
            let mut args = vec![Expr::Property(collection)];

            if parser.stream.check(&TokenKind::RParen) {
                if func == FunctionName::All {
                    let span = join_spans(&name_span, &parser.stream.current().span);
                    return Err(ParseError::syntax("'all' requires a lambda expression", span));
                }
            } else {
                let (variable, _) = parser.stream.expect_identifier("lambda variable")?;
                if is_reserved_operator(&variable) {
                    return Err(ParseError::syntax(
                        format!("'{variable}' cannot be used as a lambda variable"),
                        parser.stream.previous_span(),
                    ));
                }
                parser.stream.expect(TokenKind::Colon)?;
                let body = parser.parse_boolean()?;
                args.push(Expr::Lambda(Lambda {
                    variable,
                    body: Box::new(body),
                }));
            }
            parser.stream.expect(TokenKind::RParen)?;
            Ok(Expr::FunctionCall(FunctionCall { name: func, args }))
        })
    }

    fn require_boolean(&self, expr: &Expr, start: Span) -> ParseResult<()> {
        if expr.is_boolean() {
            return Ok(());
        }
        let span = join_spans(&start, &self.stream.previous_span());
        Err(ParseError::Syntax(Box::new(
            Diag::error("expected a boolean expression")
                .with_primary_label(span, "this does not evaluate to true or false")
                .with_help("compare it with eq, ne, gt, ge, lt or le, or use a boolean function")
                .with_code(codes::SYNTAX),
        )))
    }

    /// Runs `f` one nesting level deeper, failing when the limit is exceeded.
    pub(super) fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        self.enter()?;
        let result = f(self);
        self.leave();
        result
    }

    /// Steps one nesting level deeper; pair every success with [`Self::leave`].
    pub(super) fn enter(&mut self) -> ParseResult<()> {
        if self.depth >= self.config.max_depth {
            return Err(ParseError::Syntax(Box::new(
                Diag::error(format!(
                    "nesting exceeds the maximum depth of {}",
                    self.config.max_depth
                ))
                .with_primary_label(self.stream.current().span.clone(), "too deeply nested")
                .with_code(codes::DEPTH),
            )));
        }
        self.depth += 1;
        Ok(())
    }

    pub(super) fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Charges one chain operator until its chain is folded.
    fn push_operator(&mut self) -> ParseResult<()> {
        if self.operators >= self.config.max_operator_depth {
            return Err(ParseError::Syntax(Box::new(
                Diag::error(format!(
                    "operators nest deeper than the maximum of {}",
                    self.config.max_operator_depth
                ))
                .with_primary_label(self.stream.current().span.clone(), "too many operators")
                .with_help("split the expression with parentheses or shorten it")
                .with_code(codes::DEPTH),
            )));
        }
        self.operators += 1;
        Ok(())
    }
}

/// Folds `first op1 e1 op2 e2 ...` into `op1(first, op2(e1, ...))`.
fn fold_right<O>(first: Expr, rest: Vec<(O, Expr)>, build: fn(O, Expr, Expr) -> Expr) -> Expr {
    let mut iter = rest.into_iter().rev();
    let Some((mut pending, mut acc)) = iter.next() else {
        return first;
    };
    for (op, expr) in iter {
        acc = build(pending, expr, acc);
        pending = op;
    }
    build(pending, first, acc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::EdmType;
    use crate::parser::base::lex;

    fn parse_filter_with(source: &str, config: &ParserConfig) -> ParseResult<Expr> {
        let tokens = lex(source, 0)?;
        ExpressionParser::new(&tokens, config).for_option(QueryOption::Filter).parse_filter()
    }

    fn filter(source: &str) -> Expr {
        parse_filter_with(source, &ParserConfig::default()).unwrap()
    }

    fn filter_err(source: &str) -> ParseError {
        parse_filter_with(source, &ParserConfig::default()).unwrap_err()
    }

    fn int(value: i64) -> Expr {
        Expr::Literal(Literal::Integer(value))
    }

    #[test]
    fn same_level_chains_nest_right() {
        let expr = filter("A eq 1 sub 2 add 3");
        assert_eq!(
            expr,
            Expr::comparison(
                ComparisonOperator::Eq,
                Expr::property("A"),
                Expr::math(MathOperator::Sub, int(1), Expr::math(MathOperator::Add, int(2), int(3))),
            )
        );
    }

    #[test]
    fn multiplicative_binds_tighter() {
        let expr = filter("2 add 3 mul 4 eq X");
        let Expr::Comparison(_, left, _) = expr else {
            panic!("expected comparison");
        };
        assert_eq!(
            *left,
            Expr::math(MathOperator::Add, int(2), Expr::math(MathOperator::Mul, int(3), int(4)))
        );
    }

    #[test]
    fn or_is_outermost() {
        let expr = filter("A eq 1 and B eq 2 or C eq 3");
        let Expr::Logical(LogicalOperator::Or, left, right) = expr else {
            panic!("expected or at the root");
        };
        assert!(matches!(*left, Expr::Logical(LogicalOperator::And, _, _)));
        assert!(matches!(*right, Expr::Comparison(ComparisonOperator::Eq, _, _)));
    }

    #[test]
    fn comparisons_do_not_chain() {
        let err = filter_err("A eq 1 eq 2");
        assert_eq!(err.diag().message, "comparison operators cannot be chained");
    }

    #[test]
    fn root_must_be_boolean() {
        let err = filter_err("Price add 1");
        assert_eq!(err.diag().message, "expected a boolean expression");
        assert_eq!(err.diag().primary_span(), Some(0..11));

        let err = filter_err("A eq 1 and B");
        assert_eq!(err.diag().message, "expected a boolean expression");
        assert_eq!(err.diag().primary_span(), Some(11..12));
    }

    #[test]
    fn long_chains_do_not_consume_depth() {
        let source = format!("A eq {}", vec!["1"; 500].join(" add "));
        let config = ParserConfig::default().with_max_depth(2);
        assert!(parse_filter_with(&source, &config).is_ok());
    }

    #[test]
    fn operator_depth_limit_is_enforced() {
        let config = ParserConfig::default().with_max_operator_depth(3);
        assert!(parse_filter_with("A eq 1 add 2 add 3 add 4", &config).is_ok());

        let err = parse_filter_with("A eq 1 add 2 add 3 add 4 add 5", &config).unwrap_err();
        assert_eq!(err.diag().code, Some(codes::DEPTH));
        assert_eq!(err.diag().primary_span(), Some(25..28));
    }

    #[test]
    fn operator_depth_counts_enclosing_chains() {
        let config = ParserConfig::default().with_max_operator_depth(3);
        // One `and` stays open while the inner additions are collected.
        let err = parse_filter_with("B eq 1 and A eq (1 add 2 add 3 add 4)", &config).unwrap_err();
        assert_eq!(err.diag().code, Some(codes::DEPTH));

        // Sibling chains are folded before the next one starts.
        assert!(parse_filter_with("A eq 1 add 2 add 3 and B eq 1 add 2 add 3", &config).is_ok());
    }

    #[test]
    fn nesting_limit_is_enforced() {
        let config = ParserConfig::default().with_max_depth(3);
        assert!(parse_filter_with("(((A eq 1)))", &config).is_ok());
        let err = parse_filter_with("((((A eq 1))))", &config).unwrap_err();
        assert_eq!(err.diag().code, Some(codes::DEPTH));
    }

    #[test]
    fn unit_accessors_on_properties_and_now() {
        let expr = filter("birthday.quarter() eq now().quarter()");
        assert_eq!(
            expr,
            Expr::comparison(
                ComparisonOperator::Eq,
                Expr::Property(Property::new("birthday").with_unit(TimeUnit::Quarter)),
                Expr::Now(Now {
                    unit: Some(TimeUnit::Quarter)
                }),
            )
        );
        assert_eq!(filter_err("birthday.fortnight() eq 1").diag().message, "unknown unit 'fortnight'");
    }

    #[test]
    fn cast_requires_literal_and_known_type() {
        let expr = filter("A eq cast('1990-01-01', Edm.String)");
        let Expr::Comparison(_, _, right) = expr else {
            panic!("expected comparison");
        };
        assert_eq!(
            *right,
            Expr::Cast(Cast {
                value: Literal::Date("1990-01-01".into()),
                target: EdmType::String,
            })
        );

        let err = filter_err("A eq cast(B, Edm.String)");
        assert!(err.is_invalid());
        assert_eq!(err.diag().message, "invalid $filter parameter");
        assert_eq!(err.diag().primary_span(), Some(10..11));

        let err = filter_err("A eq cast(1, Edm.Guid)");
        assert!(!err.is_invalid());
        assert_eq!(err.diag().message, "unknown cast type 'Edm.Guid'");
    }

    #[test]
    fn function_arity_is_checked() {
        assert!(matches!(filter("IsOf('Model.Employee')"), Expr::FunctionCall(_)));
        let err = filter_err("startswith(Name) eq true");
        assert_eq!(err.diag().message, "'startswith' expects 2 arguments, found 1");
        let err = filter_err("substring(Name) eq 'x'");
        assert_eq!(err.diag().message, "'substring' expects 2 to 3 arguments, found 1");
        let err = filter_err("frobnicate(Name) eq 1");
        assert_eq!(err.diag().message, "unknown function 'frobnicate'");
    }

    #[test]
    fn lambda_over_collection_path() {
        let expr = filter("Orders/Items/any(i:i/Price gt 10)");
        let Expr::FunctionCall(call) = expr else {
            panic!("expected function call");
        };
        assert_eq!(call.name, FunctionName::Any);
        assert_eq!(call.args[0], Expr::property("Orders/Items"));
        let Expr::Lambda(lambda) = &call.args[1] else {
            panic!("expected lambda");
        };
        assert_eq!(lambda.variable, "i");
        assert!(matches!(*lambda.body, Expr::Comparison(ComparisonOperator::Gt, _, _)));
    }

    #[test]
    fn any_without_lambda_and_bare_collection_calls() {
        let Expr::FunctionCall(call) = filter("Orders/any()") else {
            panic!("expected function call");
        };
        assert_eq!(call.args, vec![Expr::property("Orders")]);

        assert_eq!(
            filter_err("Orders/all()").diag().message,
            "'all' requires a lambda expression"
        );
        assert!(filter_err("any(x:x eq 1)").diag().message.contains("collection path"));
    }

    #[test]
    fn property_named_like_collection_function() {
        let expr = filter("Tags/any eq 1");
        assert_eq!(
            expr,
            Expr::comparison(ComparisonOperator::Eq, Expr::property("Tags/any"), int(1))
        );
    }

    #[test]
    fn literals_classify() {
        let config = ParserConfig::default();
        let tokens = lex("null'Edm.String' null 'x' 3.4e1 -INF @lx_myTeam 99999999999999999999", 0).unwrap();
        let mut parser = ExpressionParser::new(&tokens, &config);
        assert_eq!(
            parser.parse_literal().unwrap(),
            Literal::Null {
                type_hint: Some("Edm.String".into())
            }
        );
        assert_eq!(parser.parse_literal().unwrap(), Literal::Null { type_hint: None });
        assert_eq!(parser.parse_literal().unwrap(), Literal::String("x".into()));
        assert_eq!(parser.parse_literal().unwrap(), Literal::Double("3.4e1".into()));
        assert_eq!(
            parser.parse_literal().unwrap(),
            Literal::NanInfinity(NanInfinity::NegativeInfinity)
        );
        assert_eq!(
            parser.parse_literal().unwrap(),
            Literal::ParameterAlias("@lx_myTeam".into())
        );
        assert!(parser.parse_literal().unwrap_err().diag().message.contains("out of range"));
    }

    #[test]
    fn unknown_parameter_alias_is_syntax_error() {
        let err = filter_err("A eq @nobody");
        assert!(!err.is_invalid());
        assert_eq!(err.diag().message, "unknown parameter alias '@nobody'");

        let config = ParserConfig::default().with_parameter_alias("@nobody");
        assert!(parse_filter_with("A eq @nobody", &config).is_ok());
    }

    #[test]
    fn operators_are_not_properties() {
        assert_eq!(
            filter_err("eq eq 1").diag().message,
            "expected expression, found operator 'eq'"
        );
        assert_eq!(
            filter_err("A eq").diag().message,
            "expected expression, found end of input"
        );
    }

    #[test]
    fn trailing_tokens_are_rejected() {
        let err = filter_err("A eq 1 B");
        assert_eq!(err.diag().message, "expected end of input, found 'B'");
    }

    #[test]
    fn fold_right_shapes() {
        let folded = fold_right(
            int(1),
            vec![(MathOperator::Sub, int(2)), (MathOperator::Add, int(3))],
            Expr::math,
        );
        assert_eq!(
            folded,
            Expr::math(MathOperator::Sub, int(1), Expr::math(MathOperator::Add, int(2), int(3)))
        );
        assert_eq!(fold_right::<MathOperator>(int(7), Vec::new(), Expr::math), int(7));
    }
}
