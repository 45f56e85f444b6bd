//! `$apply` transformation pipeline parsing.

use crate::ast::{
    Aggregate, Alias, AliasExpr, Expr, Transformation, TransformationArg, TransformationKind,
    join_spans,
};
use crate::lexer::keywords::{lookup_aggregate, lookup_transformation};
use crate::lexer::token::TokenKind;
use crate::parser::base::{ParseError, ParseResult};
use crate::parser::expression::ExpressionParser;
use smol_str::SmolStr;

/// Parser for a `/`-separated pipeline of transformations.
///
/// Stage arguments are expressions, so this parser drives an
/// [`ExpressionParser`] over the same token stream.
pub struct ApplyParser<'a> {
    expr: ExpressionParser<'a>,
}

impl<'a> ApplyParser<'a> {
    /// Creates a pipeline parser on top of an expression parser.
    pub fn new(expr: ExpressionParser<'a>) -> Self {
        Self { expr }
    }

    /// Parses a complete pipeline followed by end of input.
    pub fn parse_pipeline(&mut self) -> ParseResult<Vec<Transformation>> {
        let mut stages = vec![self.parse_stage()?];
        while self.expr.stream.consume(&TokenKind::Slash) {
            stages.push(self.parse_stage()?);
        }
        self.expr.stream.expect(TokenKind::Eof)?;
        Ok(stages)
    }

    fn parse_stage(&mut self) -> ParseResult<Transformation> {
        let (name, span) = self.expr.stream.expect_identifier("transformation")?;
        let kind = lookup_transformation(&name)
            .ok_or_else(|| ParseError::syntax(format!("unknown transformation '{name}'"), span))?;

        match kind {
            TransformationKind::Identity => {
                if self.expr.stream.consume(&TokenKind::LParen) {
                    self.expr.stream.expect(TokenKind::RParen)?;
                }
                Ok(Transformation::identity())
            }
            TransformationKind::Filter => self.expr.nested(|expr| {
                expr.stream.expect(TokenKind::LParen)?;
                let condition = expr.parse_boolean()?;
                expr.stream.expect(TokenKind::RParen)?;
                Ok(Transformation {
                    kind,
                    args: vec![TransformationArg::Expr(condition)],
                })
            }),
            TransformationKind::Expand => self.enter_stage(kind, |this| {
                let path = this.expr.parse_member_path()?;
                let mut args = vec![TransformationArg::Expr(Expr::property(path))];
                while this.expr.stream.consume(&TokenKind::Comma) {
                    args.push(TransformationArg::Transformation(this.parse_stage()?));
                }
                Ok(args)
            }),
            _ => self.enter_stage(kind, |this| {
                let mut args = vec![this.parse_item()?];
                while this.expr.stream.consume(&TokenKind::Comma) {
                    args.push(this.parse_item()?);
                }
                Ok(args)
            }),
        }
    }

    /// Parses `( ... )` around a stage's arguments one nesting level deeper.
    fn enter_stage(
        &mut self,
        kind: TransformationKind,
        args: impl FnOnce(&mut Self) -> ParseResult<Vec<TransformationArg>>,
    ) -> ParseResult<Transformation> {
        self.expr.stream.expect(TokenKind::LParen)?;
        self.expr.enter()?;
        let result = args(self);
        self.expr.leave();
        let args = result?;
        self.expr.stream.expect(TokenKind::RParen)?;
        Ok(Transformation { kind, args })
    }

    /// Parses one stage argument: a nested transformation, an aliased
    /// aggregate or expression, or a bare expression.
    fn parse_item(&mut self) -> ParseResult<TransformationArg> {
        let current = self.expr.stream.current();
        if let Some(word) = current.kind.identifier()
            && lookup_transformation(word).is_some()
            && (self.expr.stream.peek().kind == TokenKind::LParen || word == "identity")
        {
            return Ok(TransformationArg::Transformation(self.parse_stage()?));
        }

        let start = current.span.clone();
        let value = self.expr.parse_expression()?;

        if self.expr.stream.check_word("with") {
            let span = join_spans(&start, &self.expr.stream.previous_span());
            self.expr.stream.advance();
            let Expr::Property(property) = value else {
                return Err(ParseError::syntax(
                    "only a property can be aggregated with 'with'",
                    span,
                ));
            };
            let (method, method_span) = self.expr.stream.expect_identifier("aggregation method")?;
            let func = lookup_aggregate(&method).ok_or_else(|| {
                ParseError::syntax(format!("unknown aggregation method '{method}'"), method_span)
            })?;
            let name = self.parse_alias_name()?;
            return Ok(TransformationArg::Alias(Alias {
                name,
                expression: AliasExpr::Aggregate(Aggregate { func, property }),
            }));
        }

        if self.expr.stream.check_word("as") {
            let name = self.parse_alias_name()?;
            return Ok(TransformationArg::Alias(Alias {
                name,
                expression: AliasExpr::Expr(value),
            }));
        }

        Ok(TransformationArg::Expr(value))
    }

    fn parse_alias_name(&mut self) -> ParseResult<SmolStr> {
        if !self.expr.stream.consume_word("as") {
            return Err(self
                .expr
                .stream
                .error_here(format!("expected 'as', found {}", self.expr.stream.current().kind)));
        }
        let (name, _) = self.expr.stream.expect_identifier("alias name")?;
        Ok(name)
    }
}
