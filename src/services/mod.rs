//! Language services
//!
//! This module contains everything between the orchestrator and the external
//! language-service provider:
//! - Provider traits (the capability surface a host exposes)
//! - Availability probing at startup
//! - The adapter that creates sessions, reports progress and classifies failures
//! - A local offline provider used by the binary

pub mod adapter;
pub mod local;
pub mod probe;
pub mod progress;
pub mod provider;

use serde::Serialize;
use std::sync::Arc;

pub use adapter::LanguageServiceAdapter;
pub use local::LocalProvider;
pub use probe::{probe, CapabilityReport, CapabilityStatus, ProbeOutcome, ResolvedServices};
pub use progress::{DownloadProgress, ProgressMonitor, ProgressStream};
pub use provider::{
    Availability, DetectionCandidate, DetectorFactory, DetectorSession, LanguageEnvironment,
    ProviderError, ProviderResult, SummaryFormat, SummaryLength, SummaryType, SummarizerFactory,
    SummarizerOptions, SummarizerSession, TranslatorFactory, TranslatorOptions,
    TranslatorSession,
};

/// One external language-processing function
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityKind {
    Detection,
    Translation,
    Summarization,
}

impl CapabilityKind {
    /// All capabilities in probe order
    pub const ALL: [CapabilityKind; 3] = [
        CapabilityKind::Detection,
        CapabilityKind::Translation,
        CapabilityKind::Summarization,
    ];

    /// Name of the provider API backing this capability
    pub fn api_name(&self) -> &'static str {
        match self {
            CapabilityKind::Detection => "Language Detector",
            CapabilityKind::Translation => "Translation",
            CapabilityKind::Summarization => "Summarizer",
        }
    }

    /// Name of the action, used as a prefix in failure messages
    pub fn action_name(&self) -> &'static str {
        match self {
            CapabilityKind::Detection => "Language detection",
            CapabilityKind::Translation => "Translation",
            CapabilityKind::Summarization => "Summarization",
        }
    }

    pub(crate) fn empty_result_message(&self) -> &'static str {
        match self {
            CapabilityKind::Detection => "No language was detected",
            CapabilityKind::Translation => "No translation was generated",
            CapabilityKind::Summarization => "No summary was generated",
        }
    }
}

impl std::fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapabilityKind::Detection => write!(f, "detection"),
            CapabilityKind::Translation => write!(f, "translation"),
            CapabilityKind::Summarization => write!(f, "summarization"),
        }
    }
}

/// A capability as resolved at startup
///
/// Only `Available` carries a factory; the adapter fails fast on the others.
pub enum CapabilityHandle<F: ?Sized> {
    Available(Arc<F>),
    Unavailable,
    Unsupported,
}

impl<F: ?Sized> CapabilityHandle<F> {
    /// Check if a factory is present
    pub fn is_available(&self) -> bool {
        matches!(self, CapabilityHandle::Available(_))
    }
}

impl<F: ?Sized> Clone for CapabilityHandle<F> {
    fn clone(&self) -> Self {
        match self {
            CapabilityHandle::Available(factory) => {
                CapabilityHandle::Available(Arc::clone(factory))
            }
            CapabilityHandle::Unavailable => CapabilityHandle::Unavailable,
            CapabilityHandle::Unsupported => CapabilityHandle::Unsupported,
        }
    }
}

impl<F: ?Sized> std::fmt::Debug for CapabilityHandle<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapabilityHandle::Available(_) => write!(f, "Available"),
            CapabilityHandle::Unavailable => write!(f, "Unavailable"),
            CapabilityHandle::Unsupported => write!(f, "Unsupported"),
        }
    }
}
