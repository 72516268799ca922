//! Stencil - text templates filled from structured data
//!
//! Templates are plain text with `{{...}}` placeholders. A placeholder names
//! a value to look up, and can carry an inline template to format nested
//! data, a join string for lists, or markers that drop surrounding text when
//! the value comes out empty.
//!
//! # Example
//!
//! ```rust
//! use stencil::{fill, Provider};
//!
//! let data = Provider::map([
//!     ("name", Provider::literal("Ada")),
//!     ("langs", Provider::from(vec!["Rust", "OCaml"])),
//! ]);
//! let text = fill("{{name}} writes {{langs%, |!{{}}}}", data).unwrap();
//! assert_eq!(text, "Ada writes Rust, OCaml");
//! ```

pub mod config;
pub mod data;
pub mod environment;
pub mod error;
pub mod parser;
pub mod provider;
pub mod template;

pub use config::{Config, ConfigError, EngineConfig};
pub use environment::Environment;
pub use error::{CompileError, FillError, ParseError};
pub use provider::{Provider, ProviderRegistry, ProviderSource};
pub use template::{
    load_templates, CompiledTemplate, Template, TemplateError, TemplateRegistry,
};

/// Compile `source` and fill it once, with no named templates
pub fn fill<'a>(source: &str, data: impl Into<Provider<'a>>) -> Result<String, FillError> {
    Template::new(source).fill(data, &TemplateRegistry::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_plain_text() {
        assert_eq!(fill("no placeholders", "").expect("Should fill"), "no placeholders");
    }

    #[test]
    fn test_fill_error_is_reported() {
        let result = fill("{{missing}}", Provider::map([("other", "x")]));
        assert!(matches!(result, Err(FillError::MissingName { .. })));
    }
}
