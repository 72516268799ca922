//! Abstract Syntax Tree types for template text
//!
//! Nodes refer back into the source by span; text is only copied out (and
//! unescaped) when a template is lowered into its compiled form.

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// A node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// A parsed template: literal runs interleaved with placeholders
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TemplateAst {
    pub parts: Vec<Part>,
}

impl TemplateAst {
    /// Source range covered by the parts, or `None` for an empty body
    pub fn span(&self) -> Option<Span> {
        let first = self.parts.first()?;
        let last = self.parts.last()?;
        Some(first.span().start..last.span().end)
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &Spanned<Placeholder>> {
        self.parts.iter().filter_map(|part| match part {
            Part::Placeholder(p) => Some(p),
            Part::Literal(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    /// Raw literal text, escapes still in place
    Literal(Span),
    Placeholder(Spanned<Placeholder>),
}

impl Part {
    pub fn span(&self) -> &Span {
        match self {
            Part::Literal(span) => span,
            Part::Placeholder(p) => &p.span,
        }
    }
}

/// Everything between a `{{` and its matching close
#[derive(Debug, Clone, PartialEq)]
pub enum Placeholder {
    /// `{{# ...}}`
    Comment,
    /// `{{@ body}}`: the body is filled against the current provider stack
    Group(TemplateAst),
    Substitution(SubstitutionExpr),
}

/// `{{[<|<<] [!] [.]* name [%[%]join] [|body] [>|>>]}}`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubstitutionExpr {
    /// Number of leading `<` markers (0-2)
    pub before: usize,
    /// `!` prefix: the name refers to a named template
    pub template_reference: bool,
    /// Number of leading `.` characters on the name
    pub rewind: usize,
    /// Untrimmed name text, if any
    pub name: Option<Span>,
    pub join: Option<JoinExpr>,
    pub body: Option<Body>,
    /// Number of `>` markers before the close (0-2)
    pub after: usize,
}

/// `%join` or `%%join`
#[derive(Debug, Clone, PartialEq)]
pub struct JoinExpr {
    pub leading: bool,
    pub text: Option<Span>,
}

/// What follows the `|` of a substitution
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// `|!template`
    Inline(TemplateAst),
    /// Anything else, kept verbatim
    Parameters(Option<Span>),
}
