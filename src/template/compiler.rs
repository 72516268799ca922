//! Lowering parsed templates into [`CompiledTemplate`]s

use tracing::trace;

use crate::error::CompileError;
use crate::parser::{self, Body, Part, Placeholder, Spanned, SubstitutionExpr, TemplateAst};
use crate::template::compiled::{CompiledTemplate, Substitution, SubstitutionKind};

/// Parse and lower template text
pub fn compile(source: &str) -> Result<CompiledTemplate, CompileError> {
    let ast = parser::parse(source).map_err(CompileError::new)?;
    let compiled = lower_template(source, &ast, source);
    trace!(
        substitutions = compiled.substitutions().len(),
        "lowered template"
    );
    Ok(compiled)
}

/// Lower one template body. `text` is the body's own source, which for
/// inline templates is a slice of `source`.
fn lower_template(source: &str, ast: &TemplateAst, text: &str) -> CompiledTemplate {
    let mut literals = Vec::new();
    let mut substitutions: Vec<Substitution> = Vec::new();
    let mut pending = String::new();
    let mut trailing_level = 0;

    for part in &ast.parts {
        match part {
            Part::Literal(span) => pending.push_str(&unescape(&source[span.clone()])),
            Part::Placeholder(placeholder) => {
                let literal = std::mem::take(&mut pending);
                let literal = claim_trailing(substitutions.last_mut(), literal, trailing_level);

                let (before, after) = markers(&placeholder.node);
                let (kept, leading) = split_leading(&literal, before);
                literals.push(kept);

                let mut substitution = lower_placeholder(source, placeholder);
                substitution.contingent_leading = leading;
                substitutions.push(substitution);
                trailing_level = after;
            }
        }
    }

    let literal = claim_trailing(substitutions.last_mut(), pending, trailing_level);
    literals.push(literal);

    CompiledTemplate::from_parts(text.to_string(), literals, substitutions)
}

/// Number of `<` and `>` markers on a placeholder
fn markers(placeholder: &Placeholder) -> (usize, usize) {
    match placeholder {
        Placeholder::Substitution(expr) => (expr.before, expr.after),
        Placeholder::Comment | Placeholder::Group(_) => (0, 0),
    }
}

/// Move the contingent start of `literal` onto the preceding substitution
fn claim_trailing(previous: Option<&mut Substitution>, literal: String, level: usize) -> String {
    match previous {
        Some(previous) if level > 0 => {
            let (contingent, rest) = split_trailing(&literal, level);
            previous.contingent_trailing = contingent;
            rest
        }
        _ => literal,
    }
}

/// Split the end of `literal` for `<` (level 1) or `<<` (level 2).
/// Returns `(kept, contingent)`.
///
/// Level 1 claims the last line including its preceding newline. Level 2
/// also claims the run of newlines before the last line, except the first
/// one. Without a usable newline the whole literal is contingent.
pub(crate) fn split_leading(literal: &str, level: usize) -> (String, String) {
    match level {
        0 => (literal.to_string(), String::new()),
        1 => match literal.rfind('\n') {
            Some(index) => (literal[..index].to_string(), literal[index..].to_string()),
            None => (String::new(), literal.to_string()),
        },
        _ => {
            let line_start = literal.rfind('\n').map_or(0, |index| index + 1);
            let run_start = literal[..line_start].trim_end_matches('\n').len();
            if run_start == 0 {
                (String::new(), literal.to_string())
            } else {
                (
                    literal[..run_start + 1].to_string(),
                    literal[run_start + 1..].to_string(),
                )
            }
        }
    }
}

/// Split the start of `literal` for `>` (level 1) or `>>` (level 2).
/// Returns `(contingent, rest)`.
///
/// Level 1 claims the first line, not its newline. Level 2 claims the first
/// line and every newline directly after it.
pub(crate) fn split_trailing(literal: &str, level: usize) -> (String, String) {
    let line_end = literal.find('\n').unwrap_or(literal.len());
    let end = match level {
        0 => 0,
        1 => line_end,
        _ => literal.len() - literal[line_end..].trim_start_matches('\n').len(),
    };
    (literal[..end].to_string(), literal[end..].to_string())
}

fn lower_placeholder(source: &str, placeholder: &Spanned<Placeholder>) -> Substitution {
    let raw = &source[placeholder.span.clone()];
    match &placeholder.node {
        Placeholder::Comment => Substitution::new(raw, SubstitutionKind::Comment),
        Placeholder::Group(body) => {
            let text = body.span().map_or("", |span| &source[span]);
            let body = lower_template(source, body, text);
            Substitution::new(raw, SubstitutionKind::Group(body))
        }
        Placeholder::Substitution(expr) => lower_substitution(source, raw, expr),
    }
}

fn lower_substitution(source: &str, raw: &str, expr: &SubstitutionExpr) -> Substitution {
    let slice = |span: &Option<parser::Span>| {
        span.as_ref()
            .map(|span| &source[span.clone()])
            .unwrap_or_default()
    };

    let name = unescape(slice(&expr.name)).trim().to_string();

    let mut settings = Substitution::new(raw, SubstitutionKind::Value(String::new()));
    if let Some(join) = &expr.join {
        settings.join = Some(unescape(slice(&join.text)));
        settings.leading_join = join.leading;
    }
    settings.ignore_empty = expr.before > 0;

    let (parameters, inline) = match &expr.body {
        None => (String::new(), None),
        Some(Body::Parameters(span)) => (slice(span).to_string(), None),
        Some(Body::Inline(body)) => {
            let text = body.span().map_or("", |span| &source[span]);
            (String::new(), Some(lower_template(source, body, text)))
        }
    };

    if expr.template_reference {
        let mut substitution = settings;
        substitution.kind = SubstitutionKind::Reference(name);
        substitution.rewind = expr.rewind;
        substitution.parameters = parameters;
        substitution.inline_template = inline;
        return substitution;
    }

    let mut head = split_path(&settings, &name, parameters, inline);
    head.rewind = expr.rewind;
    head
}

/// Turn `a.b.c` into a chain of single-substitution inline templates. Join
/// and ignore-empty settings go on every link; the body goes on the last.
fn split_path(
    settings: &Substitution,
    name: &str,
    parameters: String,
    inline: Option<CompiledTemplate>,
) -> Substitution {
    let segments: Vec<&str> = name.split('.').map(str::trim).collect();

    let link = |segment: &str| {
        let mut link = settings.clone();
        link.kind = SubstitutionKind::Value(segment.to_string());
        link
    };

    let mut parameters = parameters;
    let mut inline = inline;
    for index in (1..segments.len()).rev() {
        let mut inner = link(segments[index]);
        inner.parameters = std::mem::take(&mut parameters);
        inner.inline_template = inline.take();
        let path = segments[index..].join(".");
        inline = Some(CompiledTemplate::single(format!("{{{{{}}}}}", path), inner));
    }

    let mut head = link(segments[0]);
    head.parameters = parameters;
    head.inline_template = inline;
    head
}

/// Replace every `\x` with `x`. A trailing lone backslash is kept.
fn unescape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            result.push(chars.next().unwrap_or('\\'));
        } else {
            result.push(c);
        }
    }
    result
}
