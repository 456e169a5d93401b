//! Service availability probing
//!
//! Runs once at startup. Every failure path resolves to a status value, so
//! probing itself never fails.

use crate::error::ParlanceError;
use crate::services::provider::{
    Availability, DetectorFactory, LanguageEnvironment, ProviderResult, SummarizerFactory,
    TranslatorFactory,
};
use crate::services::{CapabilityHandle, CapabilityKind};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Availability of one capability
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum CapabilityStatus {
    /// Not probed yet
    #[default]
    Unknown,
    /// Probe in progress
    Checking,
    Available,
    /// The provider declared the capability unusable
    Unavailable,
    /// The host has no such capability surface
    Unsupported,
    /// Probing or a later invocation failed
    Error(String),
}

impl CapabilityStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, CapabilityStatus::Available)
    }

    /// Check if probing has finished for this capability
    pub fn is_resolved(&self) -> bool {
        !matches!(self, CapabilityStatus::Unknown | CapabilityStatus::Checking)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityStatus::Unknown => "unknown",
            CapabilityStatus::Checking => "checking",
            CapabilityStatus::Available => "available",
            CapabilityStatus::Unavailable => "unavailable",
            CapabilityStatus::Unsupported => "unsupported",
            CapabilityStatus::Error(_) => "error",
        }
    }
}

impl std::fmt::Display for CapabilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CapabilityStatus::Error(message) => write!(f, "error: {}", message),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// Status of every capability plus an optional user-facing error
#[derive(Clone, Debug, Default, Serialize)]
pub struct CapabilityReport {
    pub detection: CapabilityStatus,
    pub translation: CapabilityStatus,
    pub summarization: CapabilityStatus,
    #[serde(skip)]
    pub error: Option<ParlanceError>,
}

impl CapabilityReport {
    /// Every capability marked as being probed
    pub fn checking() -> Self {
        Self {
            detection: CapabilityStatus::Checking,
            translation: CapabilityStatus::Checking,
            summarization: CapabilityStatus::Checking,
            error: None,
        }
    }

    /// Report for a host without any language services
    pub fn unsupported_environment() -> Self {
        Self {
            detection: CapabilityStatus::Unsupported,
            translation: CapabilityStatus::Unsupported,
            summarization: CapabilityStatus::Unsupported,
            error: Some(ParlanceError::UnsupportedEnvironment),
        }
    }

    pub fn status(&self, kind: CapabilityKind) -> &CapabilityStatus {
        match kind {
            CapabilityKind::Detection => &self.detection,
            CapabilityKind::Translation => &self.translation,
            CapabilityKind::Summarization => &self.summarization,
        }
    }

    fn status_mut(&mut self, kind: CapabilityKind) -> &mut CapabilityStatus {
        match kind {
            CapabilityKind::Detection => &mut self.detection,
            CapabilityKind::Translation => &mut self.translation,
            CapabilityKind::Summarization => &mut self.summarization,
        }
    }

    /// Degrade an available capability after a failed invocation
    ///
    /// Returns `true` if the status changed. Other resolved states are terminal.
    pub fn degrade(&mut self, kind: CapabilityKind, detail: impl Into<String>) -> bool {
        let status = self.status_mut(kind);
        if status.is_available() {
            *status = CapabilityStatus::Error(detail.into());
            true
        } else {
            false
        }
    }

    /// Check if every capability has been resolved
    pub fn is_resolved(&self) -> bool {
        CapabilityKind::ALL
            .iter()
            .all(|kind| self.status(*kind).is_resolved())
    }
}

/// Routing handles resolved by the probe, injected into the adapter
#[derive(Clone, Debug)]
pub struct ResolvedServices {
    pub detector: CapabilityHandle<dyn DetectorFactory>,
    pub translator: CapabilityHandle<dyn TranslatorFactory>,
    pub summarizer: CapabilityHandle<dyn SummarizerFactory>,
}

impl Default for ResolvedServices {
    fn default() -> Self {
        Self {
            detector: CapabilityHandle::Unsupported,
            translator: CapabilityHandle::Unsupported,
            summarizer: CapabilityHandle::Unsupported,
        }
    }
}

/// Result of probing the environment
#[derive(Debug)]
pub struct ProbeOutcome {
    pub report: CapabilityReport,
    pub services: ResolvedServices,
}

/// Probe the environment once and resolve every capability
pub async fn probe(environment: Option<&LanguageEnvironment>) -> ProbeOutcome {
    let Some(environment) = environment else {
        warn!("No language-service namespace found; all capabilities unsupported");
        return ProbeOutcome {
            report: CapabilityReport::unsupported_environment(),
            services: ResolvedServices::default(),
        };
    };

    let mut report = CapabilityReport::default();
    let mut services = ResolvedServices::default();

    if let Some(factory) = &environment.detector {
        let answer = factory.capabilities().await;
        (report.detection, services.detector) =
            resolve(CapabilityKind::Detection, Arc::clone(factory), answer);
    } else {
        report.detection = CapabilityStatus::Unsupported;
    }

    if let Some(factory) = &environment.translator {
        let answer = factory.capabilities().await;
        (report.translation, services.translator) =
            resolve(CapabilityKind::Translation, Arc::clone(factory), answer);
    } else {
        report.translation = CapabilityStatus::Unsupported;
    }

    if let Some(factory) = &environment.summarizer {
        let answer = factory.capabilities().await;
        (report.summarization, services.summarizer) =
            resolve(CapabilityKind::Summarization, Arc::clone(factory), answer);
    } else {
        report.summarization = CapabilityStatus::Unsupported;
    }

    report.error = match &report.summarization {
        CapabilityStatus::Unsupported => Some(ParlanceError::UnsupportedCapability(
            CapabilityKind::Summarization,
        )),
        CapabilityStatus::Error(message) => Some(ParlanceError::service(
            CapabilityKind::Summarization,
            format!("Failed to check API status: {}", message),
        )),
        _ => None,
    };

    for kind in CapabilityKind::ALL {
        info!("Capability {} resolved as {}", kind, report.status(kind));
    }

    ProbeOutcome { report, services }
}

fn resolve<F: ?Sized>(
    kind: CapabilityKind,
    factory: Arc<F>,
    answer: ProviderResult<Option<Availability>>,
) -> (CapabilityStatus, CapabilityHandle<F>) {
    match answer {
        Ok(None) => (CapabilityStatus::Unsupported, CapabilityHandle::Unsupported),
        Ok(Some(Availability::No)) => {
            (CapabilityStatus::Unavailable, CapabilityHandle::Unavailable)
        }
        Ok(Some(_)) => (
            CapabilityStatus::Available,
            CapabilityHandle::Available(factory),
        ),
        Err(e) => {
            // The factory is still routed: a failed query does not prove the
            // capability unusable, and the invocation will surface its own error.
            warn!("Capability query for {} failed: {}", kind, e);
            (
                CapabilityStatus::Error(e.message().to_string()),
                CapabilityHandle::Available(factory),
            )
        }
    }
}
