//! Error types for the Parlance pipeline
//!
//! Every variant renders as a human-readable message, since the orchestrator
//! surfaces errors to the user as a single error string.

use crate::languages::LanguageCode;
use crate::services::CapabilityKind;
use std::time::Duration;
use thiserror::Error;

/// Sub-reason attached to a provider failure
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceFailure {
    /// The provider reported GPU or other hardware resource contention
    HardwareContention,
    /// The provider reported its own timeout
    TimedOut,
    /// Anything else
    Unknown,
}

impl ServiceFailure {
    /// Classify a raw provider error message
    pub fn classify(detail: &str) -> Self {
        let lowered = detail.to_lowercase();
        if lowered.contains("gpu") {
            ServiceFailure::HardwareContention
        } else if lowered.contains("timeout") || lowered.contains("timed out") {
            ServiceFailure::TimedOut
        } else {
            ServiceFailure::Unknown
        }
    }

    fn describe(&self, detail: &str) -> String {
        match self {
            ServiceFailure::HardwareContention => format!(
                "GPU is busy. Try closing other applications or check hardware \
                 acceleration settings. ({})",
                detail
            ),
            ServiceFailure::TimedOut => {
                format!("Operation timed out. Please try again. ({})", detail)
            }
            ServiceFailure::Unknown => detail.to_string(),
        }
    }
}

/// Input rejected before any service is invoked
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter some text")]
    EmptyInput,

    #[error("Text is too short for summarization (minimum {min_words} words required)")]
    TextTooShort { min_words: usize },
}

/// Parlance pipeline errors
#[derive(Error, Debug, Clone)]
pub enum ParlanceError {
    /// The environment exposes no language services at all
    #[error("Language services are not supported in this environment")]
    UnsupportedEnvironment,

    /// The capability surface is missing
    #[error("{} API is not supported in this environment", .0.api_name())]
    UnsupportedCapability(CapabilityKind),

    /// The capability exists but declared itself unavailable
    #[error("{} API is not available", .0.api_name())]
    CapabilityUnavailable(CapabilityKind),

    /// The detector returned no candidate
    #[error("Could not detect language")]
    NoResult,

    /// Source and target language are the same
    #[error("Source and target languages are the same")]
    NoopTranslation,

    /// The translator cannot handle this language pair
    #[error(
        "Translation failed: Language pair {source_language} -> {target_language} is not available"
    )]
    PairUnavailable {
        source_language: LanguageCode,
        target_language: LanguageCode,
    },

    /// The session finished without producing text
    #[error("{}", .0.empty_result_message())]
    EmptyResult(CapabilityKind),

    /// The hard timeout elapsed before the session answered
    #[error(
        "{} failed: Operation timed out after {}s. Please try again.",
        .capability.action_name(),
        .after.as_secs()
    )]
    Timeout {
        capability: CapabilityKind,
        after: Duration,
    },

    /// The provider raised an error
    #[error("{} failed: {}", .capability.action_name(), .reason.describe(.detail))]
    ServiceError {
        capability: CapabilityKind,
        reason: ServiceFailure,
        detail: String,
    },

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IOError(String),
}

impl From<std::io::Error> for ParlanceError {
    fn from(e: std::io::Error) -> Self {
        ParlanceError::IOError(e.to_string())
    }
}

impl ParlanceError {
    /// Wrap a raw provider message, classifying it on the way
    pub fn service(capability: CapabilityKind, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        ParlanceError::ServiceError {
            capability,
            reason: ServiceFailure::classify(&detail),
            detail,
        }
    }

    /// Check if this error is recoverable
    ///
    /// Unsupported environments and configuration problems will not go away
    /// by retrying the same action.
    pub fn is_recoverable(&self) -> bool {
        match self {
            ParlanceError::UnsupportedEnvironment => false,
            ParlanceError::UnsupportedCapability(_) => false,
            ParlanceError::CapabilityUnavailable(_) => false,
            ParlanceError::NoResult => true,
            ParlanceError::NoopTranslation => true,
            ParlanceError::PairUnavailable { .. } => true,
            ParlanceError::EmptyResult(_) => true,
            ParlanceError::Timeout { .. } => true,
            ParlanceError::ServiceError { .. } => true,
            ParlanceError::Validation(_) => true,
            ParlanceError::ConfigError(_) => false,
            ParlanceError::IOError(_) => false,
        }
    }

    /// The capability a provider failure came from, if any
    pub fn service_capability(&self) -> Option<CapabilityKind> {
        match self {
            ParlanceError::ServiceError { capability, .. } => Some(*capability),
            _ => None,
        }
    }
}

/// Result type alias for Parlance operations
pub type Result<T> = std::result::Result<T, ParlanceError>;
