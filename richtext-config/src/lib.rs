//! Configuration loader for the richtext tools.
//!
//! `defaults/richtext.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`RichTextConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use richtext_babel::{EngineOptions, NormalizeOptions, Postprocessor};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/richtext.default.toml");

/// Top-level configuration consumed by richtext applications.
#[derive(Debug, Clone, Deserialize)]
pub struct RichTextConfig {
    pub normalize: NormalizeConfig,
    pub markdown: MarkdownConfig,
    pub export: ExportConfig,
}

/// Knobs of the HTML `<details>` normalizer.
#[derive(Debug, Clone, Deserialize)]
pub struct NormalizeConfig {
    pub max_nesting_depth: usize,
}

impl From<&NormalizeConfig> for NormalizeOptions {
    fn from(config: &NormalizeConfig) -> Self {
        NormalizeOptions {
            max_nesting_depth: config.max_nesting_depth,
        }
    }
}

/// Mirrors the Markdown engine's dialect switches.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkdownConfig {
    pub table: bool,
    pub strikethrough: bool,
    pub autolink: bool,
    pub max_nesting_depth: usize,
}

impl From<&MarkdownConfig> for EngineOptions {
    fn from(config: &MarkdownConfig) -> Self {
        EngineOptions {
            table: config.table,
            strikethrough: config.strikethrough,
            autolink: config.autolink,
            max_nesting_depth: config.max_nesting_depth,
        }
    }
}

impl From<&MarkdownConfig> for Postprocessor {
    fn from(config: &MarkdownConfig) -> Self {
        Postprocessor::new(config.max_nesting_depth)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    pub html: bool,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI flags).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<RichTextConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<RichTextConfig, ConfigError> {
    Loader::new().build()
}
