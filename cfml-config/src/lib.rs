//! Shared configuration loader for the CFML parser.
//!
//! `defaults/cfml.default.toml` is embedded so that the documented defaults and the runtime
//! behavior stay in sync. Applications layer user-specific files on top of those defaults via
//! [`Loader`] before deserializing into [`CfmlConfig`].

use cfml_parser::cfml::config::ParserConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/cfml.default.toml");

/// Top-level configuration consumed by CFML tooling.
#[derive(Debug, Clone, Deserialize)]
pub struct CfmlConfig {
    pub parser: ParserConfig,
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

    /// Layer configuration text, e.g. a section embedded in another document.
    pub fn with_toml(mut self, text: &str) -> Self {
        self.builder = self.builder.add_source(File::from_str(text, FileFormat::Toml));
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<CfmlConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<CfmlConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfml_parser::cfml::config::PredictionStrategy;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.parser, ParserConfig::default());
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("parser.strategy", "full-only")
            .expect("override to apply")
            .set_override("parser.max_diagnostics", 10)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.parser.strategy, PredictionStrategy::FullOnly);
        assert_eq!(config.parser.max_diagnostics, Some(10));
        assert!(config.parser.validate_tag_attributes);
    }

    #[test]
    fn later_layers_win() {
        let config = Loader::new()
            .with_toml("[parser]\nsyntax_errors_fatal = true\n")
            .with_optional_file("does-not-exist.toml")
            .build()
            .expect("config to build");
        assert!(config.parser.syntax_errors_fatal);
        assert_eq!(config.parser.strategy, PredictionStrategy::TwoStage);
    }
}
