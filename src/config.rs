//! Engine settings and configuration files
//!
//! ```toml
//! [engine]
//! default_join = ", "
//! max_depth = 32
//!
//! [paths]
//! templates = "templates"
//! data = "data.toml"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading or parsing configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Settings that apply to every fill
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Separator between container elements when a placeholder gives none
    pub default_join: String,
    /// Deepest allowed nesting of inline, member and referenced templates
    pub max_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_join: "\n".to_string(),
            max_depth: 64,
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_join(mut self, join: impl Into<String>) -> Self {
        self.default_join = join.into();
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

/// Contents of a configuration file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub engine: EngineConfig,
    /// Template file or directory to load named templates from
    pub templates: Option<PathBuf>,
    /// TOML file holding the data to fill with
    pub data: Option<PathBuf>,
}

/// TOML structure for deserializing configuration
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    engine: Option<TomlEngine>,
    paths: Option<TomlPaths>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlEngine {
    default_join: Option<String>,
    max_depth: Option<usize>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlPaths {
    templates: Option<PathBuf>,
    data: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a TOML file. Relative paths in the file are
    /// taken relative to the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_str(&content)?;
        if let Some(base) = path.parent() {
            config.templates = config.templates.map(|p| base.join(p));
            config.data = config.data.map(|p| base.join(p));
        }
        Ok(config)
    }

    /// Load configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;

        let mut engine = EngineConfig::default();
        if let Some(toml_engine) = parsed.engine {
            if let Some(join) = toml_engine.default_join {
                engine.default_join = join;
            }
            if let Some(depth) = toml_engine.max_depth {
                engine.max_depth = depth;
            }
        }

        let paths = parsed.paths;
        Ok(Config {
            engine,
            templates: paths.as_ref().and_then(|p| p.templates.clone()),
            data: paths.as_ref().and_then(|p| p.data.clone()),
        })
    }
}
