//! Error types for compiling and filling templates

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// A single problem found while parsing template text
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// `{{` without a matching `}}`
    #[error("unmatched open delimiter '{{{{' at {span:?}")]
    UnmatchedOpen { span: Span },

    /// `}}` without a preceding `{{`
    #[error("unmatched close delimiter '}}}}' at {span:?}")]
    UnmatchedClose { span: Span },

    /// `{{name|!...` whose inline body never reaches its closing `}}`
    #[error("unterminated inline template starting at {span:?}")]
    UnterminatedInlineTemplate { span: Span },

    /// Placeholders nested deeper than the parser accepts
    #[error("placeholders nested deeper than {limit} levels at {span:?}")]
    NestingTooDeep { span: Span, limit: usize },

    #[error("Parse error at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },
}

impl ParseError {
    pub fn unmatched_open(span: Span) -> Self {
        Self::UnmatchedOpen { span }
    }

    pub fn unmatched_close(span: Span) -> Self {
        Self::UnmatchedClose { span }
    }

    pub fn unterminated_inline(span: Span) -> Self {
        Self::UnterminatedInlineTemplate { span }
    }

    pub fn nesting_too_deep(span: Span, limit: usize) -> Self {
        Self::NestingTooDeep { span, limit }
    }

    /// Source location of the problem
    pub fn span(&self) -> &Span {
        match self {
            Self::UnmatchedOpen { span }
            | Self::UnmatchedClose { span }
            | Self::UnterminatedInlineTemplate { span }
            | Self::NestingTooDeep { span, .. }
            | Self::Syntax { span, .. } => span,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let (message, expected) = match self {
            Self::Syntax {
                message, expected, ..
            } => (message.clone(), expected.as_slice()),
            other => (other.to_string(), &[][..]),
        };
        let expected_str = if expected.is_empty() {
            String::new()
        } else {
            format!("\nExpected: {}", expected.join(", "))
        };
        let span = self.span().clone();

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(&message)
            .with_label(
                Label::new((filename, span))
                    .with_message(format!("{}{}", message, expected_str))
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);
        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => format!("{}: {}", filename, self),
        }
    }
}

impl<'a> From<chumsky::error::Rich<'a, crate::parser::lexer::Token>> for ParseError {
    fn from(err: chumsky::error::Rich<'a, crate::parser::lexer::Token>) -> Self {
        use chumsky::error::RichReason;

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => {
                let found_str = match found {
                    Some(tok) => format_token(tok),
                    None => "end of input".to_string(),
                };
                format!("Unexpected {} in placeholder", found_str)
            }
            RichReason::Custom(msg) => msg.to_string(),
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                chumsky::error::RichPattern::Token(tok) => Some(format_token(tok)),
                chumsky::error::RichPattern::Label(label) => Some(label.to_string()),
                chumsky::error::RichPattern::EndOfInput => Some("end of input".to_string()),
                chumsky::error::RichPattern::Identifier(s) => Some(format!("identifier '{}'", s)),
                chumsky::error::RichPattern::Any => Some("any token".to_string()),
                chumsky::error::RichPattern::SomethingElse => None,
            })
            .collect();

        ParseError::Syntax {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// Format a token for human-readable error messages
fn format_token(tok: &crate::parser::lexer::Token) -> String {
    use crate::parser::lexer::Token;
    match tok {
        Token::Open => "'{{'".to_string(),
        Token::Close => "'}}'".to_string(),
        Token::GtClose(n) => format!("'{}}}}}'", ">".repeat(*n)),
        Token::Escape => "escaped character".to_string(),
        Token::LBrace => "'{'".to_string(),
        Token::RBrace => "'}'".to_string(),
        Token::Pipe => "'|'".to_string(),
        Token::Percent => "'%'".to_string(),
        Token::Lt => "'<'".to_string(),
        Token::Gt => "'>'".to_string(),
        Token::Bang => "'!'".to_string(),
        Token::Hash => "'#'".to_string(),
        Token::At => "'@'".to_string(),
        Token::Dot => "'.'".to_string(),
        Token::Newline => "newline".to_string(),
        Token::Space => "whitespace".to_string(),
        Token::Text => "text".to_string(),
    }
}

/// Every parse error found while compiling one template
#[derive(Error, Debug, Clone, PartialEq)]
#[error("failed to compile template: {}", format_parse_errors(.errors))]
pub struct CompileError {
    pub errors: Vec<ParseError>,
}

impl CompileError {
    pub fn new(errors: Vec<ParseError>) -> Self {
        Self { errors }
    }

    /// Render every error against the template source
    pub fn format(&self, source: &str, filename: &str) -> String {
        self.errors
            .iter()
            .map(|e| e.format(source, filename))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl From<ParseError> for CompileError {
    fn from(error: ParseError) -> Self {
        Self::new(vec![error])
    }
}

fn format_parse_errors(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that abort a fill
#[derive(Error, Debug)]
pub enum FillError {
    /// The template (or a template it refers to) failed to compile
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("provider {provider} does not provide name '{name}' - in template '{template}'")]
    MissingName {
        name: String,
        provider: String,
        template: String,
    },

    /// A template was requested by name but no named templates were supplied
    #[error("no named templates available to look up '{name}' - in template '{template}'")]
    NoTemplates { name: String, template: String },

    #[error("no template named '{name}' - in template '{template}' (available: {})", available.join(", "))]
    MissingTemplate {
        name: String,
        template: String,
        available: Vec<String>,
    },

    #[error("provider stack rewind of {requested} levels for '{name}' exceeds available depth {available} - in template '{template}'")]
    RewindOutOfRange {
        name: String,
        requested: usize,
        available: usize,
        template: String,
    },

    /// A delegating value offered no way to produce its provider
    #[error("cannot acquire a provider for value of type {type_name} to resolve '{name}' - in template '{template}'")]
    NoAcquisition {
        type_name: &'static str,
        name: String,
        template: String,
    },

    #[error("circular template reference: {}", chain.join(" -> "))]
    CircularReference { chain: Vec<String> },

    #[error("template nesting exceeds maximum depth {limit} - in template '{template}'")]
    RecursionLimit { limit: usize, template: String },

    /// An error raised while filling a nested template
    #[error("{context}: {source}")]
    Nested {
        context: String,
        #[source]
        source: Box<FillError>,
    },
}

impl FillError {
    pub fn missing_name(
        name: impl Into<String>,
        provider: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        Self::MissingName {
            name: name.into(),
            provider: provider.into(),
            template: template.into(),
        }
    }

    /// Wrap an error raised inside the nested template `template`
    pub fn nested(template: &str, source: FillError) -> Self {
        Self::Nested {
            context: format!("while filling template '{}'", template),
            source: Box::new(source),
        }
    }

    /// The innermost error, skipping any nesting context
    pub fn root_cause(&self) -> &FillError {
        match self {
            Self::Nested { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Indented rendering of the nesting chain, innermost last
    pub fn pretty(&self) -> String {
        let mut result = String::new();
        let mut indentation = String::new();
        let mut current = self;
        while let Self::Nested { context, source } = current {
            result.push_str(&format!("{}{}\n", indentation, context));
            indentation.push_str("  ");
            current = source;
        }
        result.push_str(&format!("{}{}\n", indentation, current));
        result
    }
}
