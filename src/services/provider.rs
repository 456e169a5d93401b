//! Provider-side capability surface
//!
//! A host that offers language services implements these traits. Each
//! capability follows the same protocol: query availability, create a
//! session (possibly downloading model data), invoke the session once.

use crate::languages::LanguageCode;
use crate::services::progress::ProgressMonitor;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Error raised by a provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ProviderError {
    message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result type for provider calls
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Answer to a capability-description query
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Availability {
    /// Usable right away
    Readily,
    /// Usable once model data has been fetched
    AfterDownload,
    /// Not usable
    No,
}

impl Availability {
    pub fn is_usable(&self) -> bool {
        !matches!(self, Availability::No)
    }
}

/// A single detection candidate, most likely first
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionCandidate {
    pub detected_language: LanguageCode,
    pub confidence: Option<f32>,
}

impl DetectionCandidate {
    pub fn new(detected_language: impl Into<LanguageCode>, confidence: Option<f32>) -> Self {
        Self {
            detected_language: detected_language.into(),
            confidence,
        }
    }
}

#[async_trait]
pub trait DetectorSession: Send + Sync {
    /// Detect the language of `text`; an empty list means no candidate
    async fn detect(&self, text: &str) -> ProviderResult<Vec<DetectionCandidate>>;
}

#[async_trait]
pub trait DetectorFactory: Send + Sync {
    /// Describe availability; `Ok(None)` means the query surface is absent
    async fn capabilities(&self) -> ProviderResult<Option<Availability>>;

    async fn create(&self) -> ProviderResult<Box<dyn DetectorSession>>;
}

/// Options for a translator session
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranslatorOptions {
    pub source_language: LanguageCode,
    pub target_language: LanguageCode,
}

#[async_trait]
pub trait TranslatorSession: Send + Sync {
    async fn translate(&self, text: &str) -> ProviderResult<String>;
}

#[async_trait]
pub trait TranslatorFactory: Send + Sync {
    /// Describe availability; `Ok(None)` means the query surface is absent
    async fn capabilities(&self) -> ProviderResult<Option<Availability>>;

    /// Pre-flight check for a language pair; `Ok(None)` when not supported
    async fn language_pair_available(
        &self,
        _source: &LanguageCode,
        _target: &LanguageCode,
    ) -> ProviderResult<Option<Availability>> {
        Ok(None)
    }

    /// Create a session; download progress is reported through `monitor`
    async fn create(
        &self,
        options: TranslatorOptions,
        monitor: ProgressMonitor,
    ) -> ProviderResult<Box<dyn TranslatorSession>>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SummaryType {
    #[default]
    KeyPoints,
    Tldr,
    Teaser,
    Headline,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SummaryFormat {
    #[default]
    PlainText,
    Markdown,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SummaryLength {
    Short,
    #[default]
    Medium,
    Long,
}

/// Style and resource hints for a summarizer session
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerOptions {
    pub summary_type: SummaryType,
    pub format: SummaryFormat,
    pub length: SummaryLength,
    /// Prefer CPU execution over GPU
    pub prefer_cpu: bool,
    /// Fraction of CPU the session may use (0.0 - 1.0)
    pub cpu_utilization: f32,
    /// Fraction of memory the session may use (0.0 - 1.0)
    pub memory_utilization: f32,
}

impl Default for SummarizerOptions {
    fn default() -> Self {
        Self {
            summary_type: SummaryType::KeyPoints,
            format: SummaryFormat::PlainText,
            length: SummaryLength::Medium,
            prefer_cpu: true,
            cpu_utilization: 0.3,
            memory_utilization: 0.3,
        }
    }
}

#[async_trait]
pub trait SummarizerSession: Send + Sync {
    async fn summarize(&self, text: &str) -> ProviderResult<String>;
}

#[async_trait]
pub trait SummarizerFactory: Send + Sync {
    /// Describe availability; `Ok(None)` means the query surface is absent
    async fn capabilities(&self) -> ProviderResult<Option<Availability>>;

    async fn create(
        &self,
        options: SummarizerOptions,
        monitor: ProgressMonitor,
    ) -> ProviderResult<Box<dyn SummarizerSession>>;
}

/// The language-service namespace a host exposes
///
/// A missing factory means the host has no such capability surface.
#[derive(Clone, Default)]
pub struct LanguageEnvironment {
    pub detector: Option<Arc<dyn DetectorFactory>>,
    pub translator: Option<Arc<dyn TranslatorFactory>>,
    pub summarizer: Option<Arc<dyn SummarizerFactory>>,
}

impl LanguageEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_detector(mut self, detector: Arc<dyn DetectorFactory>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn with_translator(mut self, translator: Arc<dyn TranslatorFactory>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn with_summarizer(mut self, summarizer: Arc<dyn SummarizerFactory>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarizer_defaults() {
        let options = SummarizerOptions::default();
        assert_eq!(options.summary_type, SummaryType::KeyPoints);
        assert_eq!(options.length, SummaryLength::Medium);
        assert!(options.prefer_cpu);
        assert!((options.cpu_utilization - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_availability_wire_names() {
        let parsed: Availability = serde_json::from_str("\"after-download\"").unwrap();
        assert_eq!(parsed, Availability::AfterDownload);
        assert!(parsed.is_usable());
        assert!(!Availability::No.is_usable());
    }
}
