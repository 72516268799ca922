//! Filling compiled templates from a provider stack

use tracing::trace;

use crate::config::EngineConfig;
use crate::error::FillError;
use crate::provider::{Provider, ProviderRegistry};
use crate::template::compiled::{CompiledTemplate, Substitution, SubstitutionKind};
use crate::template::registry::TemplateRegistry;

/// Chain of providers active during a fill, innermost first.
///
/// Frames live on the call stack; a nested fill pushes a frame that points
/// back at its parent.
#[derive(Clone, Copy)]
pub(crate) struct ProviderStack<'s> {
    provider: &'s Provider<'s>,
    parent: Option<&'s ProviderStack<'s>>,
}

impl<'s> ProviderStack<'s> {
    pub fn root(provider: &'s Provider<'s>) -> Self {
        Self {
            provider,
            parent: None,
        }
    }

    pub fn push<'t>(&'t self, provider: &'t Provider<'t>) -> ProviderStack<'t> {
        ProviderStack {
            provider,
            parent: Some(self),
        }
    }

    pub fn provider(&self) -> &'s Provider<'s> {
        self.provider
    }

    /// Frames from this one outward to the root
    pub fn frames(&self) -> impl Iterator<Item = &ProviderStack<'s>> {
        std::iter::successors(Some(self), |frame| frame.parent)
    }

    pub fn depth(&self) -> usize {
        self.frames().count()
    }

    /// The frame `levels` steps toward the root
    pub fn rewind(&self, levels: usize) -> Option<&ProviderStack<'s>> {
        self.frames().nth(levels)
    }
}

/// Settings and bookkeeping shared by one fill call
#[derive(Clone, Copy)]
pub(crate) struct FillState<'e> {
    pub templates: &'e TemplateRegistry,
    pub providers: &'e ProviderRegistry,
    pub config: &'e EngineConfig,
    depth: usize,
    /// Innermost named template being filled
    references: Option<&'e ActiveReference<'e>>,
}

/// A named template being filled, with the provider it was filled against.
/// Like [`ProviderStack`], the chain lives on the call stack.
pub(crate) struct ActiveReference<'r> {
    name: &'r str,
    address: usize,
    parent: Option<&'r ActiveReference<'r>>,
}

impl<'r> ActiveReference<'r> {
    /// This reference and the ones enclosing it, innermost first
    fn chain(&self) -> impl Iterator<Item = &ActiveReference<'r>> {
        std::iter::successors(Some(self), |active| active.parent)
    }
}

impl<'e> FillState<'e> {
    pub fn new(
        templates: &'e TemplateRegistry,
        providers: &'e ProviderRegistry,
        config: &'e EngineConfig,
    ) -> Self {
        Self {
            templates,
            providers,
            config,
            depth: 0,
            references: None,
        }
    }

    /// State for a template nested one level deeper
    fn descend(&self, template: &CompiledTemplate) -> Result<Self, FillError> {
        if self.depth >= self.config.max_depth {
            return Err(FillError::RecursionLimit {
                limit: self.config.max_depth,
                template: template.source().to_string(),
            });
        }
        Ok(Self {
            depth: self.depth + 1,
            ..*self
        })
    }

    /// Record that the named template `name` is about to be filled against
    /// `provider`. Filling it again against the same provider while it is
    /// active could never finish.
    fn enter<'r>(
        &'r self,
        name: &'r str,
        provider: &Provider<'_>,
    ) -> Result<ActiveReference<'r>, FillError> {
        let address = provider as *const Provider<'_> as usize;
        let parent = self.references;
        if let Some(active) = parent {
            if active.chain().any(|a| a.name == name && a.address == address) {
                let mut chain: Vec<String> = active.chain().map(|a| a.name.to_string()).collect();
                chain.reverse();
                chain.push(name.to_string());
                return Err(FillError::CircularReference { chain });
            }
        }
        Ok(ActiveReference {
            name,
            address,
            parent,
        })
    }

    /// State for filling a referenced template inside `active`
    fn reference<'r>(
        &self,
        active: &'r ActiveReference<'r>,
        template: &CompiledTemplate,
    ) -> Result<FillState<'r>, FillError>
    where
        'e: 'r,
    {
        let next: FillState<'r> = self.descend(template)?;
        Ok(FillState {
            references: Some(active),
            ..next
        })
    }
}

/// Everything a provider needs to resolve one substitution
#[derive(Clone, Copy)]
pub(crate) struct SubstitutionState<'s> {
    pub substitution: &'s Substitution,
    /// Name still to be looked up; empty once a map has consumed it
    pub name: &'s str,
    /// Template the substitution belongs to
    pub template: &'s CompiledTemplate,
    pub fill: &'s FillState<'s>,
}

impl<'s> SubstitutionState<'s> {
    /// The same substitution with its name already used up
    pub fn consumed(&self) -> Self {
        Self { name: "", ..*self }
    }

    pub fn inline_template(&self) -> Option<&'s CompiledTemplate> {
        self.substitution.inline_template()
    }

    pub fn join(&self) -> &'s str {
        self.substitution
            .join
            .as_deref()
            .unwrap_or(&self.fill.config.default_join)
    }

    pub fn missing_name(&self, provider: &Provider<'_>) -> FillError {
        FillError::missing_name(self.name, provider.describe(), self.template.source())
    }

    pub fn no_acquisition(&self, type_name: &'static str) -> FillError {
        FillError::NoAcquisition {
            type_name,
            name: self.substitution.name().to_string(),
            template: self.template.source().to_string(),
        }
    }

    /// Template filled once per container element: the inline template, or
    /// the named template given as parameters. `None` fills every element
    /// with the empty string.
    pub fn member_template(&self) -> Result<Option<&'s CompiledTemplate>, FillError> {
        if let Some(inline) = self.inline_template() {
            return Ok(Some(inline));
        }
        let parameters = self.substitution.parameters.as_str();
        if parameters.is_empty() {
            return Ok(None);
        }
        let template = self.fill.templates.lookup(parameters, self.template)?;
        Ok(Some(template.compile()?))
    }
}

/// Fill `template` with `source` as the only provider
pub(crate) fn fill_root(
    template: &CompiledTemplate,
    source: &Provider<'_>,
    fill: &FillState<'_>,
) -> Result<String, FillError> {
    let stack = ProviderStack::root(source);
    fill_template(template, &stack, fill)
}

/// Fill `template` with `provider` pushed on top of `parent`
pub(crate) fn fill_nested(
    template: &CompiledTemplate,
    provider: &Provider<'_>,
    parent: &ProviderStack<'_>,
    fill: &FillState<'_>,
) -> Result<String, FillError> {
    let frame = parent.push(provider);
    let fill = fill.descend(template)?;
    fill_template(template, &frame, &fill).map_err(|e| FillError::nested(template.source(), e))
}

fn fill_template(
    template: &CompiledTemplate,
    stack: &ProviderStack<'_>,
    fill: &FillState<'_>,
) -> Result<String, FillError> {
    let mut result = String::with_capacity(template.minimum_length());
    let (first, segments) = template.segments();
    result.push_str(first);

    for (substitution, literal) in segments {
        let value = fill_substitution(template, substitution, stack, fill)?;
        if !value.is_empty() {
            result.push_str(&substitution.contingent_leading);
            result.push_str(&value);
            result.push_str(&substitution.contingent_trailing);
        }
        result.push_str(literal);
    }

    Ok(result)
}

fn fill_substitution(
    template: &CompiledTemplate,
    substitution: &Substitution,
    stack: &ProviderStack<'_>,
    fill: &FillState<'_>,
) -> Result<String, FillError> {
    trace!(substitution = %substitution.raw, depth = stack.depth(), "filling substitution");

    match &substitution.kind {
        SubstitutionKind::Comment => Ok(String::new()),
        SubstitutionKind::Group(body) => fill_template(body, stack, &fill.descend(body)?),
        SubstitutionKind::Reference(name) => {
            let base = rewind(template, substitution, stack)?;
            let referenced = fill.templates.lookup(name, template)?.compile()?;
            let active = fill.enter(name, base.provider())?;
            let fill = fill.reference(&active, referenced)?;
            fill_template(referenced, base, &fill)
                .map_err(|e| FillError::nested(referenced.source(), e))
        }
        SubstitutionKind::Value(name) => {
            let base = rewind(template, substitution, stack)?;
            let state = SubstitutionState {
                substitution,
                name,
                template,
                fill,
            };
            resolve_outward(base, &state)
        }
    }
}

fn rewind<'b, 's>(
    template: &CompiledTemplate,
    substitution: &Substitution,
    stack: &'b ProviderStack<'s>,
) -> Result<&'b ProviderStack<'s>, FillError> {
    stack
        .rewind(substitution.rewind)
        .ok_or_else(|| FillError::RewindOutOfRange {
            name: substitution.name().to_string(),
            requested: substitution.rewind,
            available: stack.depth() - 1,
            template: template.source().to_string(),
        })
}

/// Resolve against the first frame, walking outward, whose provider has
/// the name. When none does, the error names the starting frame.
fn resolve_outward(
    base: &ProviderStack<'_>,
    state: &SubstitutionState<'_>,
) -> Result<String, FillError> {
    for frame in base.frames() {
        if let Some(text) = frame.provider().lookup(state, frame)? {
            return Ok(text);
        }
    }
    Err(state.missing_name(base.provider()))
}
