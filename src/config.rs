//! Converter configuration
//!
//! `defaults/markconv.default.toml` is embedded into the crate so the documented defaults and
//! runtime behaviour stay in sync. Callers layer their own files on top through [`Loader`]
//! before deserializing into [`ConvertConfig`].

use ::config::builder::DefaultState;
use ::config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/markconv.default.toml");

/// Options consumed by the built-in converters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertConfig {
    pub latex: LatexOptions,
    pub typst: TypstOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatexOptions {
    /// Emit a complete document with preamble instead of a bare body fragment.
    pub standalone: bool,
    pub document_class: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypstOptions {
    /// Indentation unit for nested list content.
    pub list_indent: String,
}

impl Default for LatexOptions {
    fn default() -> Self {
        Self {
            standalone: true,
            document_class: "article".to_string(),
        }
    }
}

impl Default for TypstOptions {
    fn default() -> Self {
        Self {
            list_indent: "  ".to_string(),
        }
    }
}

/// Layers user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Loader holding only `defaults/markconv.default.toml`.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a TOML file over what is loaded so far; the file must exist.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer a configuration file that may be absent.
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override, e.g. `("latex.standalone", false)`.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<ConvertConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Load only the embedded defaults.
pub fn load_defaults() -> Result<ConvertConfig, ConfigError> {
    Loader::new().build()
}
