//! Caller-owned parser configuration
//!
//! A [`ParserConfig`] is handed to the [`ParseDriver`](crate::cfml::parsing::ParseDriver) at
//! construction. Nothing here is global: two drivers with different configurations can run
//! side by side. The struct deserializes with every field optional, so a partial TOML or
//! JSON document fills in the rest from [`ParserConfig::default`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which prediction passes the driver runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PredictionStrategy {
    /// FAST first, FULL only when FAST fails
    #[default]
    TwoStage,
    /// FAST only; a FAST failure is the final result
    FastOnly,
    /// Skip FAST and parse in FULL mode straight away
    FullOnly,
}

impl fmt::Display for PredictionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictionStrategy::TwoStage => f.write_str("two-stage"),
            PredictionStrategy::FastOnly => f.write_str("fast-only"),
            PredictionStrategy::FullOnly => f.write_str("full-only"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub strategy: PredictionStrategy,
    /// Mark grammar diagnostics fatal
    pub syntax_errors_fatal: bool,
    /// Check generic tag statements against the syntax dictionary
    pub validate_tag_attributes: bool,
    /// Upper bound on accumulated diagnostics; `None` keeps all of them
    pub max_diagnostics: Option<usize>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            strategy: PredictionStrategy::TwoStage,
            syntax_errors_fatal: false,
            validate_tag_attributes: true,
            max_diagnostics: None,
        }
    }
}

impl ParserConfig {
    pub fn with_strategy(mut self, strategy: PredictionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_fatal_syntax_errors(mut self, fatal: bool) -> Self {
        self.syntax_errors_fatal = fatal;
        self
    }

    pub fn with_tag_validation(mut self, validate: bool) -> Self {
        self.validate_tag_attributes = validate;
        self
    }

    pub fn with_max_diagnostics(mut self, max: usize) -> Self {
        self.max_diagnostics = Some(max);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config: ParserConfig = serde_json::from_str(r#"{"strategy": "full-only"}"#).unwrap();
        assert_eq!(config.strategy, PredictionStrategy::FullOnly);
        assert!(config.validate_tag_attributes);
        assert!(!config.syntax_errors_fatal);
        assert_eq!(config.max_diagnostics, None);
    }

    #[test]
    fn test_strategy_names() {
        let json = serde_json::to_string(&PredictionStrategy::TwoStage).unwrap();
        assert_eq!(json, r#""two-stage""#);
        assert_eq!(PredictionStrategy::FastOnly.to_string(), "fast-only");
    }
}
