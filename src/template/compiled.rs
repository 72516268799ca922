//! Compiled form of a template: literals interleaved with substitutions

use std::fmt::Write as _;

/// What a substitution does when filled
#[derive(Debug, Clone, PartialEq)]
pub enum SubstitutionKind {
    /// Resolve a name (possibly empty) against the provider stack
    Value(String),
    /// Fill the named template from the template registry with the current stack
    Reference(String),
    /// Produces nothing
    Comment,
    /// Fill the body against the current provider stack
    Group(CompiledTemplate),
}

/// One placeholder, normalized.
///
/// Dotted names are already split at this point: `{{a.b}}` is a
/// substitution for `a` whose inline template holds a substitution for `b`.
#[derive(Debug, Clone, PartialEq)]
pub struct Substitution {
    /// Placeholder text as written, for diagnostics
    pub raw: String,
    pub kind: SubstitutionKind,
    /// Frames to discard from the provider stack before lookup
    pub rewind: usize,
    /// Moved out of the preceding literal; emitted only if the value is non-empty
    pub contingent_leading: String,
    /// Moved out of the following literal; emitted only if the value is non-empty
    pub contingent_trailing: String,
    /// Separator between container elements, `None` for the engine default
    pub join: Option<String>,
    /// Emit the separator before the first element too
    pub leading_join: bool,
    /// Empty elements do not get a separator after them
    pub ignore_empty: bool,
    /// Verbatim body text when the body is not an inline template
    pub parameters: String,
    pub inline_template: Option<CompiledTemplate>,
}

impl Substitution {
    pub(crate) fn new(raw: impl Into<String>, kind: SubstitutionKind) -> Self {
        Self {
            raw: raw.into(),
            kind,
            rewind: 0,
            contingent_leading: String::new(),
            contingent_trailing: String::new(),
            join: None,
            leading_join: false,
            ignore_empty: false,
            parameters: String::new(),
            inline_template: None,
        }
    }

    /// Name looked up by this substitution, empty for comments and groups
    pub fn name(&self) -> &str {
        match &self.kind {
            SubstitutionKind::Value(name) | SubstitutionKind::Reference(name) => name,
            SubstitutionKind::Comment | SubstitutionKind::Group(_) => "",
        }
    }

    pub fn inline_template(&self) -> Option<&CompiledTemplate> {
        self.inline_template.as_ref()
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.kind, SubstitutionKind::Comment)
    }

    fn write_details(&self, out: &mut String, indent: &str, index: usize) {
        let _ = writeln!(out, "{}substitution {}: {}", indent, index, self.raw);
        let _ = match &self.kind {
            SubstitutionKind::Value(name) => writeln!(out, "{}  name: {:?}", indent, name),
            SubstitutionKind::Reference(name) => writeln!(out, "{}  template: {:?}", indent, name),
            SubstitutionKind::Comment => writeln!(out, "{}  comment", indent),
            SubstitutionKind::Group(_) => writeln!(out, "{}  group", indent),
        };
        if self.rewind > 0 {
            let _ = writeln!(out, "{}  rewind: {}", indent, self.rewind);
        }
        if !self.contingent_leading.is_empty() {
            let _ = writeln!(out, "{}  leading: {:?}", indent, self.contingent_leading);
        }
        if !self.contingent_trailing.is_empty() {
            let _ = writeln!(out, "{}  trailing: {:?}", indent, self.contingent_trailing);
        }
        if let Some(join) = &self.join {
            let _ = writeln!(out, "{}  join: {:?}", indent, join);
        }
        if self.leading_join {
            let _ = writeln!(out, "{}  leading join", indent);
        }
        if self.ignore_empty {
            let _ = writeln!(out, "{}  ignore empty", indent);
        }
        if !self.parameters.is_empty() {
            let _ = writeln!(out, "{}  parameters: {:?}", indent, self.parameters);
        }
        let nested = format!("{}    ", indent);
        if let SubstitutionKind::Group(body) = &self.kind {
            body.write_details(out, &nested);
        }
        if let Some(inline) = &self.inline_template {
            let _ = writeln!(out, "{}  inline:", indent);
            inline.write_details(out, &nested);
        }
    }
}

/// A template ready to fill.
///
/// There is always exactly one more literal than there are substitutions;
/// filling emits `literals[0]`, the first substitution, `literals[1]`, and
/// so on.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledTemplate {
    source: String,
    literals: Vec<String>,
    substitutions: Vec<Substitution>,
}

impl CompiledTemplate {
    pub(crate) fn from_parts(
        source: String,
        literals: Vec<String>,
        substitutions: Vec<Substitution>,
    ) -> Self {
        debug_assert_eq!(literals.len(), substitutions.len() + 1);
        Self {
            source,
            literals,
            substitutions,
        }
    }

    /// A template consisting of one substitution and nothing else
    pub(crate) fn single(source: String, substitution: Substitution) -> Self {
        Self::from_parts(source, vec![String::new(), String::new()], vec![substitution])
    }

    /// Text this template was compiled from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn literals(&self) -> &[String] {
        &self.literals
    }

    pub fn substitutions(&self) -> &[Substitution] {
        &self.substitutions
    }

    /// Literal text plus pairs of (substitution, following literal)
    pub(crate) fn segments(&self) -> (&str, impl Iterator<Item = (&Substitution, &str)>) {
        let (first, rest) = match self.literals.split_first() {
            Some((first, rest)) => (first.as_str(), rest),
            None => ("", &self.literals[..]),
        };
        (
            first,
            self.substitutions
                .iter()
                .zip(rest.iter().map(String::as_str)),
        )
    }

    /// Length of the output when every substitution is empty
    pub fn minimum_length(&self) -> usize {
        self.literals.iter().map(String::len).sum()
    }

    /// Multi-line dump of the compiled structure
    pub fn details(&self) -> String {
        let mut out = String::new();
        self.write_details(&mut out, "");
        out
    }

    fn write_details(&self, out: &mut String, indent: &str) {
        let _ = writeln!(out, "{}template: {:?}", indent, self.source);
        let (first, segments) = self.segments();
        let _ = writeln!(out, "{}literal 0: {:?}", indent, first);
        for (index, (substitution, literal)) in segments.enumerate() {
            substitution.write_details(out, indent, index);
            let _ = writeln!(out, "{}literal {}: {:?}", indent, index + 1, literal);
        }
    }
}
