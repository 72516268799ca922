//! Named templates

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::error::FillError;
use crate::template::compiled::CompiledTemplate;
use crate::template::Template;

/// Errors that can occur while building a template registry
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Duplicate template definition
    #[error("duplicate template definition: {name}")]
    Duplicate { name: String },

    /// Path given to the loader does not exist
    #[error("template path not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Error reading template file
    #[error("error reading template file {path}: {message}")]
    FileReadError { path: PathBuf, message: String },
}

impl TemplateError {
    fn read(path: &Path, error: impl std::fmt::Display) -> Self {
        Self::FileReadError {
            path: path.to_path_buf(),
            message: error.to_string(),
        }
    }
}

/// Templates addressable by name, for `{{!name}}` references and container
/// member templates given as parameters
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, Template>,
}

impl TemplateRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template, replacing any previous one with the same name
    pub fn insert(&mut self, name: impl Into<String>, template: impl Into<Template>) -> Option<Template> {
        self.templates.insert(name.into(), template.into())
    }

    /// Add a template, failing if the name is taken
    pub fn register(
        &mut self,
        name: impl Into<String>,
        template: impl Into<Template>,
    ) -> Result<(), TemplateError> {
        let name = name.into();
        if self.templates.contains_key(&name) {
            return Err(TemplateError::Duplicate { name });
        }
        self.templates.insert(name, template.into());
        Ok(())
    }

    /// Get a template by name
    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    /// Check if a template exists
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// All template names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Template)> {
        self.templates.iter().map(|(name, template)| (name.as_str(), template))
    }

    /// Template `name` as needed while filling `from`
    pub(crate) fn lookup(&self, name: &str, from: &CompiledTemplate) -> Result<&Template, FillError> {
        if self.is_empty() {
            return Err(FillError::NoTemplates {
                name: name.to_string(),
                template: from.source().to_string(),
            });
        }
        self.get(name).ok_or_else(|| FillError::MissingTemplate {
            name: name.to_string(),
            template: from.source().to_string(),
            available: self.names().into_iter().map(str::to_string).collect(),
        })
    }

    /// Load one file, named after its file stem
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<(), TemplateError> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| TemplateError::read(path, "file name is not valid UTF-8"))?;
        let content = fs::read_to_string(path).map_err(|e| TemplateError::read(path, e))?;
        debug!(name, path = %path.display(), "loaded template");
        self.register(name, Template::new(content))
    }
}

impl<K: Into<String>, T: Into<Template>> FromIterator<(K, T)> for TemplateRegistry {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let mut registry = Self::new();
        for (name, template) in iter {
            registry.insert(name, template);
        }
        registry
    }
}

impl<K: Into<String>, T: Into<Template>> Extend<(K, T)> for TemplateRegistry {
    fn extend<I: IntoIterator<Item = (K, T)>>(&mut self, iter: I) {
        for (name, template) in iter {
            self.insert(name, template);
        }
    }
}

/// Load templates from a file or from every regular file directly inside a
/// directory (subdirectories are not searched). Each template is named
/// after its file name without the extension.
pub fn load_templates(path: impl AsRef<Path>) -> Result<TemplateRegistry, TemplateError> {
    let path = path.as_ref();
    let metadata = fs::metadata(path).map_err(|_| TemplateError::FileNotFound {
        path: path.to_path_buf(),
    })?;

    let mut registry = TemplateRegistry::new();
    if metadata.is_dir() {
        let mut files = Vec::new();
        for entry in fs::read_dir(path).map_err(|e| TemplateError::read(path, e))? {
            let entry = entry.map_err(|e| TemplateError::read(path, e))?;
            let file = entry.path();
            if file.is_file() {
                files.push(file);
            }
        }
        files.sort();
        for file in files {
            registry.load_file(&file)?;
        }
    } else {
        registry.load_file(path)?;
    }

    debug!(count = registry.len(), path = %path.display(), "loaded templates");
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_register_and_get() {
        let mut registry = TemplateRegistry::new();
        registry.register("bracketed", "[{{}}]").expect("Should register");
        assert!(registry.contains("bracketed"));
        assert_eq!(registry.get("bracketed").map(Template::source), Some("[{{}}]"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_duplicate_error() {
        let mut registry = TemplateRegistry::new();
        registry
            .register("bracketed", "a")
            .expect("First register should succeed");
        let result = registry.register("bracketed", "b");
        assert!(matches!(result, Err(TemplateError::Duplicate { .. })));
    }

    #[test]
    fn test_insert_replaces() {
        let mut registry = TemplateRegistry::new();
        registry.insert("bracketed", "a");
        let previous = registry.insert("bracketed", "b");
        assert_eq!(previous.as_ref().map(Template::source), Some("a"));
        assert_eq!(registry.get("bracketed").map(Template::source), Some("b"));
    }

    #[test]
    fn test_names_are_sorted() {
        let registry: TemplateRegistry = [("b", "2"), ("a", "1"), ("c", "3")].into_iter().collect();
        assert_eq!(registry.names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_lookup_errors() {
        let from = crate::template::compiler::compile("{{!x}}").expect("Should compile");

        let empty = TemplateRegistry::new();
        assert!(matches!(
            empty.lookup("x", &from),
            Err(FillError::NoTemplates { .. })
        ));

        let registry: TemplateRegistry = [("a", "1")].into_iter().collect();
        match registry.lookup("x", &from) {
            Err(FillError::MissingTemplate { available, .. }) => assert_eq!(available, vec!["a"]),
            other => panic!("Expected MissingTemplate, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_path() {
        let result = load_templates("/definitely/not/a/template/dir");
        assert!(matches!(result, Err(TemplateError::FileNotFound { .. })));
    }
}
