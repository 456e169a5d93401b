//! Configuration for the Parlance pipeline
//!
//! Every field has a default, so a TOML file only needs to name what it
//! overrides.

use crate::error::{ParlanceError, Result};
use crate::languages::LanguageCode;
use crate::services::provider::SummarizerOptions;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Configuration for the offline provider used by the binary
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LocalProviderConfig {
    /// Word glossaries keyed by language pair, e.g. `"en-es"`
    pub glossaries: BTreeMap<String, BTreeMap<String, String>>,

    /// Simulated model download size in bytes, reported as progress
    pub download_bytes: u64,

    /// Number of progress reports per simulated download
    pub download_steps: u32,
}

impl Default for LocalProviderConfig {
    fn default() -> Self {
        Self {
            glossaries: BTreeMap::new(),
            download_bytes: 4 * 1024 * 1024,
            download_steps: 4,
        }
    }
}

impl LocalProviderConfig {
    /// Add a glossary entry for a language pair
    pub fn with_entry(
        mut self,
        source: &str,
        target: &str,
        word: impl Into<String>,
        translation: impl Into<String>,
    ) -> Self {
        self.glossaries
            .entry(format!("{}-{}", source, target))
            .or_default()
            .insert(word.into(), translation.into());
        self
    }
}

/// Configuration for the complete pipeline
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParlanceConfig {
    /// Target language selected at startup
    pub default_language: LanguageCode,

    /// Messages must have more words than this to be summarized
    pub min_summary_words: usize,

    /// Hard bound on a summarization call in milliseconds
    pub summarize_timeout_ms: u64,

    /// Capacity of the event channel
    pub event_buffer_size: usize,

    /// Style and resource hints for summarizer sessions
    pub summarizer: SummarizerOptions,

    /// Offline provider settings
    pub local: LocalProviderConfig,
}

impl Default for ParlanceConfig {
    fn default() -> Self {
        Self {
            default_language: LanguageCode::new("en"),
            min_summary_words: 150,
            summarize_timeout_ms: 30_000,
            event_buffer_size: 100,
            summarizer: SummarizerOptions::default(),
            local: LocalProviderConfig::default(),
        }
    }
}

impl ParlanceConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| ParlanceError::ConfigError(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ParlanceError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Set the target language selected at startup
    pub fn with_default_language(mut self, code: impl Into<LanguageCode>) -> Self {
        self.default_language = code.into();
        self
    }

    /// Set the summarization word threshold
    pub fn with_min_summary_words(mut self, words: usize) -> Self {
        self.min_summary_words = words;
        self
    }

    /// Set the summarization timeout
    pub fn with_summarize_timeout_ms(mut self, timeout: u64) -> Self {
        self.summarize_timeout_ms = timeout;
        self
    }

    /// Set the event channel capacity
    pub fn with_event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = size;
        self
    }

    /// Set the offline provider configuration
    pub fn with_local(mut self, local: LocalProviderConfig) -> Self {
        self.local = local;
        self
    }

    pub fn summarize_timeout(&self) -> Duration {
        Duration::from_millis(self.summarize_timeout_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.default_language.as_str().is_empty() {
            return Err(ParlanceError::ConfigError(
                "default_language must not be empty".to_string(),
            ));
        }

        if self.summarize_timeout_ms == 0 {
            return Err(ParlanceError::ConfigError(
                "summarize_timeout_ms must be greater than zero".to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(ParlanceError::ConfigError(
                "event_buffer_size must be greater than zero".to_string(),
            ));
        }

        let hints = [
            ("summarizer.cpu_utilization", self.summarizer.cpu_utilization),
            ("summarizer.memory_utilization", self.summarizer.memory_utilization),
        ];
        for (name, value) in hints {
            if !(0.0..=1.0).contains(&value) {
                return Err(ParlanceError::ConfigError(format!(
                    "{} must be between 0.0 and 1.0, got {}",
                    name, value
                )));
            }
        }

        for pair in self.local.glossaries.keys() {
            if pair.split_once('-').is_none() {
                return Err(ParlanceError::ConfigError(format!(
                    "Glossary key {:?} must look like \"en-es\"",
                    pair
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::provider::SummaryLength;

    #[test]
    fn test_default_config() {
        let config = ParlanceConfig::default();
        assert_eq!(config.default_language, "en");
        assert_eq!(config.min_summary_words, 150);
        assert_eq!(config.summarize_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ParlanceConfig::new()
            .with_default_language("ES")
            .with_min_summary_words(10)
            .with_summarize_timeout_ms(500);

        assert_eq!(config.default_language, "es");
        assert_eq!(config.min_summary_words, 10);
        assert_eq!(config.summarize_timeout(), Duration::from_millis(500));
    }

    #[test]
    fn test_partial_toml() {
        let config = ParlanceConfig::from_toml_str(
            r#"
            default_language = "fr"

            [summarizer]
            length = "long"

            [local.glossaries.en-es]
            hello = "hola"
            world = "mundo"
            "#,
        )
        .unwrap();

        assert_eq!(config.default_language, "fr");
        assert_eq!(config.summarizer.length, SummaryLength::Long);
        assert!(config.summarizer.prefer_cpu);
        assert_eq!(config.local.glossaries["en-es"]["hello"], "hola");
        assert_eq!(config.min_summary_words, 150);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = ParlanceConfig::from_toml_str("summarize_timeout_ms = 0").unwrap_err();
        assert!(matches!(err, ParlanceError::ConfigError(_)));

        let err = ParlanceConfig::from_toml_str("[summarizer]\ncpu_utilization = 1.5").unwrap_err();
        assert!(err.to_string().contains("cpu_utilization"));

        let err =
            ParlanceConfig::from_toml_str("[local.glossaries.english]\na = \"b\"").unwrap_err();
        assert!(err.to_string().contains("english"));
    }

    #[test]
    fn test_missing_file() {
        let err = ParlanceConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(!err.is_recoverable());
    }
}
