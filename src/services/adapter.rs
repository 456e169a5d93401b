//! Language service adapter
//!
//! Wraps each capability in a one-shot request: create a session, invoke it
//! once, and map every provider failure into a [`ParlanceError`]. Sessions are
//! never reused, since the provider may need to fetch model data per language
//! pair and that fetch is what progress reporting surfaces.

use crate::config::ParlanceConfig;
use crate::error::{ParlanceError, Result};
use crate::languages::LanguageCode;
use crate::services::probe::ResolvedServices;
use crate::services::progress::ProgressMonitor;
use crate::services::provider::{Availability, SummarizerOptions, TranslatorOptions};
use crate::services::{CapabilityHandle, CapabilityKind};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Uniform request/response wrapper around the resolved capabilities
#[derive(Clone, Debug)]
pub struct LanguageServiceAdapter {
    services: ResolvedServices,
    summarizer_options: SummarizerOptions,
    summarize_timeout: Duration,
}

impl LanguageServiceAdapter {
    pub fn new(
        services: ResolvedServices,
        summarizer_options: SummarizerOptions,
        summarize_timeout: Duration,
    ) -> Self {
        Self {
            services,
            summarizer_options,
            summarize_timeout,
        }
    }

    pub fn from_config(services: ResolvedServices, config: &ParlanceConfig) -> Self {
        Self::new(
            services,
            config.summarizer.clone(),
            config.summarize_timeout(),
        )
    }

    /// Detect the language of `text`, taking the most likely candidate
    pub async fn detect(&self, text: &str) -> Result<LanguageCode> {
        let kind = CapabilityKind::Detection;
        let factory = routed(&self.services.detector, kind)?;

        let session = factory
            .create()
            .await
            .map_err(|e| provider_failure(kind, e.message()))?;
        let candidates = session
            .detect(text)
            .await
            .map_err(|e| provider_failure(kind, e.message()))?;

        let best = candidates
            .into_iter()
            .map(|candidate| candidate.detected_language)
            .find(|code| !code.as_str().is_empty())
            .ok_or(ParlanceError::NoResult)?;

        debug!("Detected language: {}", best);
        Ok(best)
    }

    /// Translate `text` from `source` to `target`
    pub async fn translate(
        &self,
        text: &str,
        source: &LanguageCode,
        target: &LanguageCode,
        monitor: ProgressMonitor,
    ) -> Result<String> {
        let kind = CapabilityKind::Translation;
        let factory = routed(&self.services.translator, kind)?;

        if source == target {
            return Err(ParlanceError::NoopTranslation);
        }

        match factory.language_pair_available(source, target).await {
            Ok(Some(Availability::No)) => {
                return Err(ParlanceError::PairUnavailable {
                    source_language: source.clone(),
                    target_language: target.clone(),
                });
            }
            Ok(Some(Availability::AfterDownload)) => {
                debug!("Language pair {} -> {} needs a download", source, target);
            }
            Ok(_) => {}
            Err(e) => warn!("Language pair pre-flight failed, trying anyway: {}", e),
        }

        let options = TranslatorOptions {
            source_language: source.clone(),
            target_language: target.clone(),
        };
        let session = factory
            .create(options, monitor)
            .await
            .map_err(|e| provider_failure(kind, e.message()))?;
        let translation = session
            .translate(text)
            .await
            .map_err(|e| provider_failure(kind, e.message()))?;

        if translation.trim().is_empty() {
            return Err(ParlanceError::EmptyResult(kind));
        }

        debug!("Translated {} chars {} -> {}", text.len(), source, target);
        Ok(translation)
    }

    /// Summarize `text` into key points
    ///
    /// The session call races a hard timeout; when the timer wins the call
    /// future is dropped and its eventual answer is never observed.
    pub async fn summarize(&self, text: &str, monitor: ProgressMonitor) -> Result<String> {
        let kind = CapabilityKind::Summarization;
        let factory = routed(&self.services.summarizer, kind)?;

        match factory.capabilities().await {
            Ok(Some(Availability::No)) => return Err(ParlanceError::CapabilityUnavailable(kind)),
            Ok(_) => {}
            Err(e) => return Err(provider_failure(kind, e.message())),
        }

        let session = factory
            .create(self.summarizer_options.clone(), monitor)
            .await
            .map_err(|e| provider_failure(kind, e.message()))?;

        let call = session.summarize(text.trim());
        let summary = match tokio::time::timeout(self.summarize_timeout, call).await {
            Ok(Ok(summary)) => summary,
            Ok(Err(e)) => return Err(provider_failure(kind, e.message())),
            Err(_) => {
                warn!("Summarization timed out after {:?}", self.summarize_timeout);
                return Err(ParlanceError::Timeout {
                    capability: kind,
                    after: self.summarize_timeout,
                });
            }
        };

        if summary.trim().is_empty() {
            return Err(ParlanceError::EmptyResult(kind));
        }

        debug!("Summarized {} chars into {} chars", text.len(), summary.len());
        Ok(summary)
    }
}

fn routed<F: ?Sized>(handle: &CapabilityHandle<F>, kind: CapabilityKind) -> Result<&Arc<F>> {
    match handle {
        CapabilityHandle::Available(factory) => Ok(factory),
        CapabilityHandle::Unavailable => Err(ParlanceError::CapabilityUnavailable(kind)),
        CapabilityHandle::Unsupported => Err(ParlanceError::UnsupportedCapability(kind)),
    }
}

fn provider_failure(kind: CapabilityKind, detail: &str) -> ParlanceError {
    error!("{} provider error: {}", kind, detail);
    ParlanceError::service(kind, detail)
}
