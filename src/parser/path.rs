//! Resource path parsing: `Customers(1)/Orders/$count`.

use crate::ast::{KeyPredicate, PathSegment};
use crate::config::ParserConfig;
use crate::lexer::token::TokenKind;
use crate::parser::base::{ParseResult, lex};
use crate::parser::expression::ExpressionParser;

/// Parses the resource path that precedes the query options.
///
/// `text` starts at byte `offset` of the query string.
pub fn parse_path(text: &str, offset: usize, config: &ParserConfig) -> ParseResult<Vec<PathSegment>> {
    let tokens = lex(text, offset)?;
    let mut parser = ExpressionParser::new(&tokens, config);

    parser.stream.consume(&TokenKind::Slash);
    let mut segments = vec![parse_segment(&mut parser)?];
    while parser.stream.consume(&TokenKind::Slash) {
        segments.push(parse_segment(&mut parser)?);
    }
    parser.stream.expect(TokenKind::Eof)?;
    Ok(segments)
}

fn parse_segment(parser: &mut ExpressionParser<'_>) -> ParseResult<PathSegment> {
    let (name, _) = parser.stream.expect_identifier("resource name")?;
    if !parser.stream.consume(&TokenKind::LParen) {
        return Ok(PathSegment {
            name,
            predicates: None,
        });
    }

    let mut predicates = Vec::new();
    if !parser.stream.consume(&TokenKind::RParen) {
        loop {
            predicates.push(parse_predicate(parser)?);
            if !parser.stream.consume(&TokenKind::Comma) {
                break;
            }
        }
        parser.stream.expect(TokenKind::RParen)?;
    }
    Ok(PathSegment {
        name,
        predicates: Some(predicates),
    })
}

fn parse_predicate(parser: &mut ExpressionParser<'_>) -> ParseResult<KeyPredicate> {
    if let Some(name) = parser.stream.current().kind.identifier()
        && parser.stream.peek().kind == TokenKind::Eq
    {
        parser.stream.advance();
        parser.stream.advance();
        let value = parser.parse_literal()?;
        return Ok(KeyPredicate::Named {
            name: name.clone(),
            value,
        });
    }
    Ok(KeyPredicate::Positional(parser.parse_literal()?))
}
