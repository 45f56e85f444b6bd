//! Query string assembly: splits the input into a resource path and its
//! options and dispatches each option value to its grammar.
//!
//! Option lists are split on raw text, respecting quotes and parentheses, so
//! separators inside a `$filter` string literal or a nested `$expand` option
//! list never split an option. Every value is parsed with spans relative to
//! the full query string.

use crate::ast::{
    ExpandItem, OrderByItem, QueryOption, QueryOptions, SortDirection, Span, Spanned,
};
use crate::config::ParserConfig;
use crate::diag::{Diag, codes};
use crate::lexer::keywords::lookup_query_option;
use crate::lexer::token::{Token, TokenKind};
use crate::parser::apply::ApplyParser;
use crate::parser::base::{ParseError, ParseResult, TokenStream, lex};
use crate::parser::expression::ExpressionParser;
use crate::parser::path::parse_path;
use smol_str::SmolStr;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::str::CharIndices;

/// Parses a complete query string: `[path][?|&]options`.
///
/// Input starting with `$` holds options only. Otherwise the path ends at the
/// first top-level `?`, or failing that at the first top-level `&`.
pub fn parse_query_string(input: &str, config: &ParserConfig) -> ParseResult<QueryOptions> {
    let (path, options) = if input.starts_with('$') {
        ("", Some(0))
    } else {
        let split = TopLevel::new(input)
            .find(|&(_, c)| c == '?')
            .or_else(|| TopLevel::new(input).find(|&(_, c)| c == '&'));
        match split {
            Some((at, _)) => (&input[..at], Some(at + 1)),
            None => (input, None),
        }
    };

    let path = if path.trim().is_empty() {
        None
    } else {
        Some(parse_path(path, 0, config)?)
    };

    let mut query = match options {
        Some(start) => OptionListParser::new(config).parse(&input[start..], start, '&')?,
        None => QueryOptions::default(),
    };
    query.path = path;
    Ok(query)
}

/// Parser for a separator-delimited list of `name=value` options.
struct OptionListParser<'a> {
    config: &'a ParserConfig,
    /// Nesting depth of this list; `$expand` option lists nest.
    depth: usize,
}

impl<'a> OptionListParser<'a> {
    fn new(config: &'a ParserConfig) -> Self {
        Self { config, depth: 0 }
    }

    fn parse(&self, text: &str, offset: usize, separator: char) -> ParseResult<QueryOptions> {
        let mut options = QueryOptions::default();
        let mut seen: HashMap<QueryOption, Span> = HashMap::new();

        for item in split_top_level(text, offset, separator) {
            let raw = item.node.trim_start();
            if raw.trim_end().is_empty() {
                continue;
            }
            let start = item.span.start + (item.node.len() - raw.len());

            let Some(eq) = raw.find('=') else {
                return Err(ParseError::syntax(
                    format!("expected '=' after query option '{}'", raw.trim_end()),
                    start..start + raw.trim_end().len(),
                ));
            };
            let name = raw[..eq].trim_end();
            let name_span = start..start + name.len();
            let option = lookup_query_option(name).ok_or_else(|| unknown_option(name, name_span.clone()))?;

            match seen.entry(option) {
                Entry::Occupied(first) => {
                    return Err(ParseError::Invalid(Box::new(
                        Diag::error(format!("{option} cannot exist more than once in query string"))
                            .with_primary_label(name_span, "repeated here")
                            .with_secondary_label(first.get().clone(), "first used here")
                            .with_code(codes::DUPLICATE_OPTION),
                    )));
                }
                Entry::Vacant(slot) => {
                    slot.insert(name_span.clone());
                }
            }

            let value = Spanned::new(&raw[eq + 1..], start + eq + 1..item.span.end);
            self.parse_value(&mut options, option, name_span, value)?;
        }
        Ok(options)
    }

    fn parse_value(
        &self,
        options: &mut QueryOptions,
        option: QueryOption,
        name_span: Span,
        value: Spanned<&str>,
    ) -> ParseResult<()> {
        let text = value.node;
        let invalid = || {
            ParseError::invalid(
                format!("invalid {option} parameter"),
                name_span.start..value.span.end,
                codes::INVALID_PARAMETER,
            )
        };

        match option {
            QueryOption::Top | QueryOption::Skip => {
                let number = parse_unsigned(text).ok_or_else(invalid)?;
                if option == QueryOption::Top {
                    options.top = Some(number);
                } else {
                    options.skip = Some(number);
                }
            }
            QueryOption::Count => {
                options.count = Some(match text {
                    "true" => true,
                    "false" => false,
                    _ => return Err(invalid()),
                });
            }
            QueryOption::Format | QueryOption::Callback => {
                if text.is_empty() {
                    return Err(invalid());
                }
                if option == QueryOption::Format {
                    options.format = Some(text.to_owned());
                } else {
                    options.callback = Some(text.to_owned());
                }
            }
            QueryOption::Search => {
                options.search = Some(unquote(text).ok_or_else(invalid)?);
            }
            QueryOption::Select => options.select = Some(self.parse_select(&value)?),
            QueryOption::OrderBy => options.orderby = Some(self.parse_orderby(&value)?),
            QueryOption::Expand => options.expand = Some(self.parse_expand(&value)?),
            QueryOption::Filter => {
                let tokens = lex(text, value.span.start)?;
                let mut parser = self.expression_parser(&tokens).for_option(option);
                options.filter = Some(parser.parse_filter()?);
            }
            QueryOption::Apply => {
                let tokens = lex(text, value.span.start)?;
                let parser = self.expression_parser(&tokens).for_option(option);
                options.apply = Some(ApplyParser::new(parser).parse_pipeline()?);
            }
        }
        Ok(())
    }

    fn expression_parser<'t>(&self, tokens: &'t [Token]) -> ExpressionParser<'t>
    where
        'a: 't,
    {
        ExpressionParser::new(tokens, self.config).with_depth(self.depth)
    }

    /// `*`, `Name`, `Category/Name`, `Namespace.*`, comma separated.
    fn parse_select(&self, value: &Spanned<&str>) -> ParseResult<Vec<SmolStr>> {
        let tokens = lex(value.node, value.span.start)?;
        let mut stream = TokenStream::new(&tokens);
        let mut items = Vec::new();
        loop {
            let mut item = String::new();
            loop {
                push_select_segment(&mut stream, &mut item)?;
                if !stream.consume(&TokenKind::Slash) {
                    break;
                }
                item.push('/');
            }
            items.push(SmolStr::from(item));
            if !stream.consume(&TokenKind::Comma) {
                break;
            }
        }
        stream.expect(TokenKind::Eof)?;
        Ok(items)
    }

    /// `path [asc|desc]`, comma separated.
    fn parse_orderby(&self, value: &Spanned<&str>) -> ParseResult<Vec<OrderByItem>> {
        let tokens = lex(value.node, value.span.start)?;
        let mut parser = self.expression_parser(&tokens);
        let mut items = Vec::new();
        loop {
            let path = parser.parse_member_path()?;
            let direction = if parser.stream.consume_word("desc") {
                SortDirection::Desc
            } else {
                parser.stream.consume_word("asc");
                SortDirection::Asc
            };
            items.push(OrderByItem { path, direction });
            if !parser.stream.consume(&TokenKind::Comma) {
                break;
            }
        }
        parser.stream.expect(TokenKind::Eof)?;
        Ok(items)
    }

    /// `path[(options separated by ;)]`, comma separated.
    fn parse_expand(&self, value: &Spanned<&str>) -> ParseResult<Vec<ExpandItem>> {
        let mut items = Vec::new();
        let mut seen: HashMap<SmolStr, Span> = HashMap::new();

        for raw in split_top_level(value.node, value.span.start, ',') {
            let text = raw.node.trim();
            let start = raw.span.start + (raw.node.len() - raw.node.trim_start().len());
            let span = start..start + text.len();
            if text.is_empty() {
                return Err(ParseError::syntax("expected $expand item", span));
            }

            let (path_text, nested) = match TopLevel::new(text).find(|&(_, c)| c == '(') {
                Some((open, _)) => {
                    let close = matching_close(text, open).ok_or_else(|| {
                        ParseError::syntax("unclosed '(' in $expand item", start + open..start + open + 1)
                    })?;
                    if close + 1 != text.len() {
                        return Err(ParseError::syntax(
                            "unexpected text after $expand options",
                            start + close + 1..span.end,
                        ));
                    }
                    let inner = Spanned::new(&text[open + 1..close], start + open + 1..start + close);
                    (&text[..open], Some(inner))
                }
                None => (text, None),
            };

            let path_span = start..start + path_text.len();
            let path = self.parse_expand_path(path_text, path_span.start)?;
            match seen.entry(path.clone()) {
                Entry::Occupied(first) => {
                    return Err(ParseError::Invalid(Box::new(
                        Diag::error("duplicate $expand navigationProperty")
                            .with_primary_label(path_span, "expanded again here")
                            .with_secondary_label(first.get().clone(), "first expanded here")
                            .with_code(codes::DUPLICATE_EXPAND),
                    )));
                }
                Entry::Vacant(slot) => {
                    slot.insert(path_span);
                }
            }

            let options = match nested {
                Some(inner) => self.nested(inner.span.start)?.parse(inner.node, inner.span.start, ';')?,
                None => QueryOptions::default(),
            };
            items.push(ExpandItem { path, options });
        }
        Ok(items)
    }

    fn parse_expand_path(&self, text: &str, offset: usize) -> ParseResult<SmolStr> {
        let tokens = lex(text, offset)?;
        let mut parser = self.expression_parser(&tokens);
        let path = if parser.stream.consume(&TokenKind::Star) {
            SmolStr::new_static("*")
        } else {
            parser.parse_member_path()?
        };
        parser.stream.expect(TokenKind::Eof)?;
        Ok(path)
    }

    /// A parser for an option list one level deeper.
    fn nested(&self, at: usize) -> ParseResult<Self> {
        if self.depth >= self.config.max_depth {
            return Err(ParseError::Syntax(Box::new(
                Diag::error(format!(
                    "nesting exceeds the maximum depth of {}",
                    self.config.max_depth
                ))
                .with_primary_label(at..at, "too deeply nested")
                .with_code(codes::DEPTH),
            )));
        }
        Ok(Self {
            config: self.config,
            depth: self.depth + 1,
        })
    }
}

fn unknown_option(name: &str, span: Span) -> ParseError {
    let message = if name.starts_with('$') {
        format!("unknown query option '{name}'")
    } else {
        format!("unsupported custom query option '{name}'")
    };
    ParseError::Syntax(Box::new(
        Diag::error(message)
            .with_primary_label(span, "not a system query option")
            .with_help("supported options: $select, $expand, $filter, $orderby, $apply, $top, $skip, $count, $search, $format, $callback")
            .with_code(codes::SYNTAX),
    ))
}

fn push_select_segment(stream: &mut TokenStream<'_>, item: &mut String) -> ParseResult<()> {
    if stream.consume(&TokenKind::Star) {
        item.push('*');
        return Ok(());
    }
    let (name, _) = stream.expect_identifier("property name")?;
    item.push_str(&name);
    while stream.consume(&TokenKind::Dot) {
        item.push('.');
        if stream.consume(&TokenKind::Star) {
            item.push('*');
            break;
        }
        let (name, _) = stream.expect_identifier("property name")?;
        item.push_str(&name);
    }
    Ok(())
}

fn parse_unsigned(text: &str) -> Option<u64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Strips matching double or single quotes from a non-empty term.
///
/// Inside single quotes a doubled `''` stands for one quote.
fn unquote(text: &str) -> Option<String> {
    if let Some(body) = text.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) {
        (!body.is_empty()).then(|| body.to_owned())
    } else if let Some(body) = text.strip_prefix('\'').and_then(|rest| rest.strip_suffix('\'')) {
        (!body.is_empty()).then(|| body.replace("''", "'"))
    } else {
        None
    }
}

/// Splits `text` on `separator` outside quotes and parentheses.
///
/// Spans are shifted by `offset`.
fn split_top_level(text: &str, offset: usize, separator: char) -> Vec<Spanned<&str>> {
    let mut parts = Vec::new();
    let mut start = 0;
    for (at, c) in TopLevel::new(text) {
        if c == separator {
            parts.push(Spanned::new(&text[start..at], offset + start..offset + at));
            start = at + c.len_utf8();
        }
    }
    parts.push(Spanned::new(&text[start..], offset + start..offset + text.len()));
    parts
}

/// Index of the `)` closing the `(` at byte `open`.
fn matching_close(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote = None;
    for (at, c) in text[open..].char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + at);
                }
            }
            _ => {}
        }
    }
    None
}

/// Iterates the characters of `text` that are outside quotes and
/// parentheses. An opening parenthesis at the top level is yielded itself.
struct TopLevel<'t> {
    chars: CharIndices<'t>,
    depth: usize,
    quote: Option<char>,
}

impl<'t> TopLevel<'t> {
    fn new(text: &'t str) -> Self {
        Self {
            chars: text.char_indices(),
            depth: 0,
            quote: None,
        }
    }
}

impl Iterator for TopLevel<'_> {
    type Item = (usize, char);

    fn next(&mut self) -> Option<Self::Item> {
        for (at, c) in self.chars.by_ref() {
            match (self.quote, c) {
                (Some(q), c) if c == q => self.quote = None,
                (Some(_), _) => {}
                (None, '\'' | '"') => self.quote = Some(c),
                (None, '(') => {
                    self.depth += 1;
                    if self.depth == 1 {
                        return Some((at, c));
                    }
                }
                (None, ')') => self.depth = self.depth.saturating_sub(1),
                (None, c) if self.depth == 0 => return Some((at, c)),
                _ => {}
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expr;

    fn query(input: &str) -> QueryOptions {
        parse_query_string(input, &ParserConfig::default()).unwrap()
    }

    fn query_err(input: &str) -> ParseError {
        parse_query_string(input, &ParserConfig::default()).unwrap_err()
    }

    #[test]
    fn split_respects_quotes_and_parens() {
        let parts = split_top_level("$filter=A eq 'x&y'&$expand=B($top=1&$skip=2)&", 0, '&');
        let texts: Vec<_> = parts.iter().map(|p| p.node).collect();
        assert_eq!(texts, vec!["$filter=A eq 'x&y'", "$expand=B($top=1&$skip=2)", ""]);
        assert_eq!(parts[1].span, 19..44);
    }

    #[test]
    fn matching_close_skips_quoted_parens() {
        assert_eq!(matching_close("Items($filter=Name eq ')')", 5), Some(25));
        assert_eq!(matching_close("Items($top=1", 5), None);
    }

    #[test]
    fn input_forms() {
        let q = query("Customers?$top=10");
        assert_eq!(q.top, Some(10));
        assert_eq!(q.path.as_ref().map(|p| p[0].name.as_str()), Some("Customers"));

        let q = query("Customers&$top=10");
        assert_eq!(q.top, Some(10));
        assert!(q.path.is_some());

        let q = query("Customers('a?b')");
        assert!(q.top.is_none());
        assert_eq!(q.path.map(|p| p.len()), Some(1));

        assert!(query("$top=1").path.is_none());
        assert!(query("").is_empty());
    }

    #[test]
    fn empty_items_are_skipped() {
        let q = query("$top=4&&$skip=5&");
        assert_eq!(q.top, Some(4));
        assert_eq!(q.skip, Some(5));
    }

    #[test]
    fn scalar_options() {
        let q = query("$count=true&$format=application/atom+xml&$search='foo bar'&$callback=cb_1");
        assert_eq!(q.count, Some(true));
        assert_eq!(q.format.as_deref(), Some("application/atom+xml"));
        assert_eq!(q.search.as_deref(), Some("foo bar"));
        assert_eq!(query("$search='it''s'").search.as_deref(), Some("it's"));
        assert_eq!(q.callback.as_deref(), Some("cb_1"));
    }

    #[test]
    fn invalid_scalars_are_validation_errors() {
        for (input, message) in [
            ("$top=foo", "invalid $top parameter"),
            ("$top=-1", "invalid $top parameter"),
            ("$skip=", "invalid $skip parameter"),
            ("$count=TRUE", "invalid $count parameter"),
            ("$format=", "invalid $format parameter"),
            ("$callback=", "invalid $callback parameter"),
            ("$search=foo", "invalid $search parameter"),
            ("$search=\"", "invalid $search parameter"),
            ("$search=\"\"", "invalid $search parameter"),
            ("$search=''", "invalid $search parameter"),
        ] {
            let err = query_err(input);
            assert!(err.is_invalid(), "{input}");
            assert_eq!(err.diag().message, message, "{input}");
        }
        assert_eq!(query_err("$top=foo").diag().primary_span(), Some(0..8));
    }

    #[test]
    fn duplicate_option_points_at_both() {
        let err = query_err("$top=1&$top=2");
        assert!(err.is_invalid());
        assert_eq!(err.diag().message, "$top cannot exist more than once in query string");
        assert_eq!(err.diag().primary_span(), Some(7..11));
        assert_eq!(err.diag().labels[1].span, 0..4);
        assert_eq!(err.diag().code, Some(codes::DUPLICATE_OPTION));
    }

    #[test]
    fn unknown_and_malformed_options_are_syntax_errors() {
        let err = query_err("$top=1&$levels=2");
        assert!(!err.is_invalid());
        assert_eq!(err.diag().message, "unknown query option '$levels'");
        assert_eq!(err.diag().primary_span(), Some(7..14));

        assert_eq!(query_err("$top").diag().message, "expected '=' after query option '$top'");
        assert_eq!(
            query_err("$top=1&foo=bar").diag().message,
            "unsupported custom query option 'foo'"
        );
    }

    #[test]
    fn select_forms() {
        let q = query("$select=*,Category/Name, DemoService.*,Rating");
        assert_eq!(
            q.select,
            Some(vec!["*".into(), "Category/Name".into(), "DemoService.*".into(), "Rating".into()])
        );
        assert!(query_err("$select=Name,").diag().message.starts_with("expected property name"));
    }

    #[test]
    fn orderby_directions() {
        let q = query("$orderby=ReleaseDate desc, Rating, Address/City asc");
        let items = q.orderby.unwrap();
        assert_eq!(items[0].direction, SortDirection::Desc);
        assert_eq!(items[1].direction, SortDirection::Asc);
        assert_eq!(items[2].path, "Address/City");
        assert!(query_err("$orderby=Name sideways").diag().message.contains("'sideways'"));
    }

    #[test]
    fn expand_with_nested_options() {
        let q = query("$expand=Category,Products/Suppliers,Items($expand=ItemRatings;$select=ItemDetails;$search=\"foo\")");
        let items = q.expand.unwrap();
        assert_eq!(items[0].path, "Category");
        assert!(items[0].options.is_empty());
        assert_eq!(items[1].path, "Products/Suppliers");
        assert_eq!(items[2].options.expand.as_ref().unwrap()[0].path, "ItemRatings");
        assert_eq!(items[2].options.select, Some(vec!["ItemDetails".into()]));
        assert_eq!(items[2].options.search.as_deref(), Some("foo"));
        assert!(items[2].options.path.is_none());
    }

    #[test]
    fn expand_nested_filter_spans_are_absolute() {
        let err = query_err("$expand=Items($filter=Price add 1)");
        assert_eq!(err.diag().primary_span(), Some(22..33));
    }

    #[test]
    fn expand_duplicates_and_malformed_items() {
        let err = query_err("$expand=ItemRatings,ItemRatings");
        assert!(err.is_invalid());
        assert_eq!(err.diag().message, "duplicate $expand navigationProperty");
        assert_eq!(err.diag().primary_span(), Some(20..31));

        assert_eq!(
            query_err("$expand=Items($top=1").diag().message,
            "unclosed '(' in $expand item"
        );
        assert_eq!(
            query_err("$expand=Items($top=1)x").diag().message,
            "unexpected text after $expand options"
        );
        assert_eq!(query_err("$expand=A,,B").diag().message, "expected $expand item");

        let err = query_err("$expand=Items($top=1;$top=2)");
        assert_eq!(err.diag().message, "$top cannot exist more than once in query string");
    }

    #[test]
    fn expand_nesting_is_limited() {
        let config = ParserConfig::default().with_max_depth(1);
        assert!(parse_query_string("$expand=A($expand=B)", &config).is_ok());
        let err = parse_query_string("$expand=A($expand=B($top=1))", &config).unwrap_err();
        assert_eq!(err.diag().code, Some(codes::DEPTH));
    }

    #[test]
    fn filter_and_apply_are_delegated() {
        let q = query("$filter=Name eq 'a;b'&$apply=identity");
        assert!(matches!(q.filter, Some(Expr::Comparison(..))));
        assert_eq!(q.apply.map(|a| a.len()), Some(1));
    }
}
