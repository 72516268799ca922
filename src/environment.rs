//! Bundled fill settings

use crate::config::EngineConfig;
use crate::error::FillError;
use crate::provider::{Provider, ProviderRegistry};
use crate::template::{Template, TemplateRegistry};

/// Named templates, provider registry and engine settings used together
#[derive(Debug, Default)]
pub struct Environment {
    templates: TemplateRegistry,
    providers: ProviderRegistry,
    config: EngineConfig,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_templates(mut self, templates: TemplateRegistry) -> Self {
        self.templates = templates;
        self
    }

    pub fn with_providers(mut self, providers: ProviderRegistry) -> Self {
        self.providers = providers;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    pub fn templates_mut(&mut self) -> &mut TemplateRegistry {
        &mut self.templates
    }

    pub fn providers_mut(&mut self) -> &mut ProviderRegistry {
        &mut self.providers
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn fill<'a>(&self, template: &Template, source: impl Into<Provider<'a>>) -> Result<String, FillError> {
        template.fill_with(source, &self.templates, &self.providers, &self.config)
    }

    /// Fill the registered template `name`
    pub fn fill_named<'a>(&self, name: &str, source: impl Into<Provider<'a>>) -> Result<String, FillError> {
        let template = self.templates.get(name).ok_or_else(|| FillError::MissingTemplate {
            name: name.to_string(),
            template: String::new(),
            available: self.templates.names().into_iter().map(str::to_string).collect(),
        })?;
        self.fill(template, source)
    }
}
