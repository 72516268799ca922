//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::error::ParseError;
use crate::parser::ast::*;
use crate::parser::lexer::{self, Token};

/// Parse template text into an AST
pub fn parse(input: &str) -> Result<TemplateAst, Vec<ParseError>> {
    let len = input.len();

    let tokens: Vec<(Token, Span)> = lexer::lex(input).collect();
    check_delimiters(&tokens).map_err(|e| vec![e])?;

    let token_iter = tokens.into_iter().map(|(tok, span)| (tok, span.into()));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    template_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Deepest placeholder nesting accepted. The grammar and lowering recurse
/// once per level.
pub const MAX_NESTING: usize = 32;

/// Match every `{{` with a close before handing tokens to the grammar, so
/// that unbalanced text gets a precise error instead of a generic one.
fn check_delimiters(tokens: &[(Token, Span)]) -> Result<(), ParseError> {
    let mut open = Vec::new();
    for (index, (tok, span)) in tokens.iter().enumerate() {
        match tok {
            Token::Open => {
                if open.len() == MAX_NESTING {
                    return Err(ParseError::nesting_too_deep(span.clone(), MAX_NESTING));
                }
                open.push(index);
            }
            Token::Close | Token::GtClose(_) => {
                if open.pop().is_none() {
                    return Err(ParseError::unmatched_close(span.clone()));
                }
            }
            _ => {}
        }
    }

    match open.first() {
        Some(&index) => {
            let span = tokens[index].1.clone();
            if opens_inline_body(&tokens[index + 1..]) {
                Err(ParseError::unterminated_inline(span))
            } else {
                Err(ParseError::unmatched_open(span))
            }
        }
        None => Ok(()),
    }
}

/// Whether `|!` appears before any nested `{{`
fn opens_inline_body(rest: &[(Token, Span)]) -> bool {
    rest.windows(2)
        .take_while(|pair| pair[0].0 != Token::Open)
        .any(|pair| pair[0].0 == Token::Pipe && pair[1].0 == Token::Bang)
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

/// Single span covering a run of token spans
fn cover(spans: Vec<Span>) -> Option<Span> {
    let first = spans.first()?;
    let last = spans.last()?;
    Some(first.start..last.end)
}

fn template_parser<'a, I>() -> impl Parser<'a, I, TemplateAst, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let text = any().filter(|t: &Token| !t.is_delimiter());

    let literal = text
        .clone()
        .repeated()
        .at_least(1)
        .collect::<Vec<_>>()
        .map_with(|_, e| span_range(&e.span()));

    // `}}` closes with no marker, `>}}` and `>>}}` carry their count
    let close = choice((
        just(Token::Close).to(0usize),
        select! { Token::GtClose(n) => n },
    ));

    let space = choice((just(Token::Space), just(Token::Newline)))
        .repeated()
        .collect::<Vec<_>>();

    // Text with properly nested `{{ }}` pairs, used for comment and parameter bodies
    let balanced = recursive(|balanced| {
        choice((
            text.clone().map_with(|_, e| span_range(&e.span())),
            just(Token::Open)
                .then(balanced)
                .then(close.clone())
                .map_with(|_, e| span_range(&e.span())),
        ))
        .repeated()
        .collect::<Vec<Span>>()
    });

    let placeholder = recursive(|placeholder| {
        let body_template = choice((
            literal.clone().map(Part::Literal),
            placeholder.map(Part::Placeholder),
        ))
        .repeated()
        .collect::<Vec<_>>()
        .map(|parts| TemplateAst { parts });

        // `!!` discards the rest of its line, but only when a newline follows
        let skip_line = just(Token::Bang)
            .then(
                any()
                    .filter(|t: &Token| !t.is_delimiter() && *t != Token::Newline)
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .then(just(Token::Newline));

        let inline = just(Token::Bang)
            .ignore_then(skip_line.or_not())
            .ignore_then(body_template.clone())
            .map(Body::Inline);

        let parameters = balanced
            .clone()
            .map(|spans| Body::Parameters(cover(spans)));

        let body = just(Token::Pipe).ignore_then(choice((inline, parameters)));

        let join = just(Token::Percent)
            .ignore_then(just(Token::Percent).or_not().map(|p| p.is_some()))
            .then(
                any()
                    .filter(|t: &Token| !t.is_delimiter() && *t != Token::Pipe)
                    .map_with(|_, e| span_range(&e.span()))
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .map(|(leading, text)| JoinExpr {
                leading,
                text: cover(text),
            });

        let name = any()
            .filter(|t: &Token| !t.is_delimiter() && !matches!(t, Token::Pipe | Token::Percent))
            .map_with(|_, e| span_range(&e.span()))
            .repeated()
            .collect::<Vec<_>>()
            .map(cover);

        let before = just(Token::Lt)
            .repeated()
            .at_most(2)
            .collect::<Vec<_>>()
            .map(|markers| markers.len());

        let template_reference = just(Token::Bang).or_not().map(|b| b.is_some());

        let rewind = just(Token::Dot)
            .repeated()
            .collect::<Vec<_>>()
            .map(|dots| dots.len());

        let substitution = before
            .then_ignore(space.clone())
            .then(template_reference)
            .then_ignore(space.clone())
            .then(rewind)
            .then(name)
            .then(join.or_not())
            .then(body.or_not())
            .then(close.clone())
            .map(
                |((((((before, template_reference), rewind), name), join), body), after)| {
                    Placeholder::Substitution(SubstitutionExpr {
                        before,
                        template_reference,
                        rewind,
                        name,
                        join,
                        body,
                        after,
                    })
                },
            );

        let comment = just(Token::Hash)
            .ignore_then(balanced.clone())
            .then_ignore(close.clone())
            .to(Placeholder::Comment);

        let group = just(Token::At)
            .ignore_then(body_template)
            .then_ignore(close.clone())
            .map(Placeholder::Group);

        // Order matters: comments and groups before the general form, whose
        // name would otherwise swallow the `#` or `@`
        just(Token::Open)
            .ignore_then(space.clone())
            .ignore_then(choice((comment, group, substitution)))
            .map_with(|p, e| Spanned::new(p, span_range(&e.span())))
            .boxed()
    });

    choice((
        literal.map(Part::Literal),
        placeholder.map(Part::Placeholder),
    ))
    .repeated()
    .collect::<Vec<_>>()
    .then_ignore(end())
    .map(|parts| TemplateAst { parts })
}
