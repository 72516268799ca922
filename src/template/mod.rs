//! Templates: compiling text and filling it from providers
//!
//! A [`Template`] holds source text and compiles it on first use. Filling
//! walks the compiled literals and substitutions, resolving each
//! substitution against a stack of providers.
//!
//! ```
//! use stencil::{Template, TemplateRegistry};
//!
//! let template = Template::new("Hello, {{name}}!");
//! let text = template.fill(("name", "world"), &TemplateRegistry::new()).unwrap();
//! assert_eq!(text, "Hello, world!");
//! ```

mod compiled;
pub(crate) mod compiler;
pub(crate) mod fill;
mod registry;

pub use compiled::{CompiledTemplate, Substitution, SubstitutionKind};
pub use registry::{load_templates, TemplateError, TemplateRegistry};

use std::sync::OnceLock;

use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{CompileError, FillError};
use crate::provider::{Provider, ProviderRegistry};

/// Template text plus its compiled form, built on first use
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
    compiled: OnceLock<CompiledTemplate>,
}

impl Template {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            compiled: OnceLock::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Compile the template, reusing an earlier successful compilation
    pub fn compile(&self) -> Result<&CompiledTemplate, CompileError> {
        if let Some(compiled) = self.compiled.get() {
            return Ok(compiled);
        }
        debug!(length = self.source.len(), "compiling template");
        let compiled = compiler::compile(&self.source)?;
        Ok(self.compiled.get_or_init(|| compiled))
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled.get().is_some()
    }

    /// Fill the template from `source`, with `templates` available for
    /// references and container member templates
    pub fn fill<'a>(
        &self,
        source: impl Into<Provider<'a>>,
        templates: &TemplateRegistry,
    ) -> Result<String, FillError> {
        let providers = ProviderRegistry::new();
        let config = EngineConfig::default();
        self.fill_with(source, templates, &providers, &config)
    }

    /// Fill with explicit provider registry and engine settings
    pub fn fill_with<'a>(
        &self,
        source: impl Into<Provider<'a>>,
        templates: &TemplateRegistry,
        providers: &ProviderRegistry,
        config: &EngineConfig,
    ) -> Result<String, FillError> {
        let compiled = self.compile()?;
        let source = source.into();
        let state = fill::FillState::new(templates, providers, config);
        fill::fill_root(compiled, &source, &state)
    }
}

impl Default for Template {
    /// `{{}}`: the root provider's own value
    fn default() -> Self {
        Self::new("{{}}")
    }
}

impl From<&str> for Template {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}

impl From<String> for Template {
    fn from(source: String) -> Self {
        Self::new(source)
    }
}
