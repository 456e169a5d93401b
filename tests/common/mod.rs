//! Scripted language providers for pipeline tests

#![allow(dead_code)]

use async_trait::async_trait;
use parlance::services::{
    Availability, DetectionCandidate, DetectorFactory, DetectorSession, LanguageEnvironment,
    ProgressMonitor, ProviderError, ProviderResult, SummarizerFactory, SummarizerOptions,
    SummarizerSession, TranslatorFactory, TranslatorOptions, TranslatorSession,
};
use parlance::{Orchestrator, ParlanceConfig};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Detector answering every request with the same outcome
pub struct ScriptedDetector {
    outcome: Result<Vec<String>, String>,
}

impl ScriptedDetector {
    pub fn detecting(codes: &[&str]) -> Self {
        Self {
            outcome: Ok(codes.iter().map(|c| c.to_string()).collect()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
        }
    }
}

struct DetectorCall(Result<Vec<String>, String>);

#[async_trait]
impl DetectorSession for DetectorCall {
    async fn detect(&self, _text: &str) -> ProviderResult<Vec<DetectionCandidate>> {
        match &self.0 {
            Ok(codes) => Ok(codes
                .iter()
                .map(|code| DetectionCandidate::new(code.as_str(), Some(0.9)))
                .collect()),
            Err(message) => Err(ProviderError::new(message.clone())),
        }
    }
}

#[async_trait]
impl DetectorFactory for ScriptedDetector {
    async fn capabilities(&self) -> ProviderResult<Option<Availability>> {
        Ok(Some(Availability::Readily))
    }

    async fn create(&self) -> ProviderResult<Box<dyn DetectorSession>> {
        Ok(Box::new(DetectorCall(self.outcome.clone())))
    }
}

/// Translator that reports progress while its session is created and can
/// hold every translation until released
pub struct ScriptedTranslator {
    reply: String,
    progress: Vec<(u64, u64)>,
    gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
}

impl ScriptedTranslator {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            progress: Vec::new(),
            gate: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_progress(mut self, progress: &[(u64, u64)]) -> Self {
        self.progress = progress.to_vec();
        self
    }

    /// Hold translations until `gate` is notified
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

struct TranslatorCall {
    reply: String,
    gate: Option<Arc<Notify>>,
}

#[async_trait]
impl TranslatorSession for TranslatorCall {
    async fn translate(&self, _text: &str) -> ProviderResult<String> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        Ok(self.reply.clone())
    }
}

#[async_trait]
impl TranslatorFactory for ScriptedTranslator {
    async fn capabilities(&self) -> ProviderResult<Option<Availability>> {
        Ok(Some(Availability::AfterDownload))
    }

    async fn create(
        &self,
        _options: TranslatorOptions,
        monitor: ProgressMonitor,
    ) -> ProviderResult<Box<dyn TranslatorSession>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        for (loaded, total) in &self.progress {
            monitor.report(*loaded, *total);
        }
        Ok(Box::new(TranslatorCall {
            reply: self.reply.clone(),
            gate: self.gate.clone(),
        }))
    }
}

/// What a scripted summarizer session does when called
#[derive(Clone)]
pub enum SummaryScript {
    Reply(String),
    Fail(String),
    Hang,
}

pub struct ScriptedSummarizer {
    script: SummaryScript,
    calls: AtomicUsize,
}

impl ScriptedSummarizer {
    pub fn new(script: SummaryScript) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

struct SummarizerCall(SummaryScript);

#[async_trait]
impl SummarizerSession for SummarizerCall {
    async fn summarize(&self, _text: &str) -> ProviderResult<String> {
        match &self.0 {
            SummaryScript::Reply(text) => Ok(text.clone()),
            SummaryScript::Fail(message) => Err(ProviderError::new(message.clone())),
            SummaryScript::Hang => {
                std::future::pending::<()>().await;
                Ok(String::new())
            }
        }
    }
}

#[async_trait]
impl SummarizerFactory for ScriptedSummarizer {
    async fn capabilities(&self) -> ProviderResult<Option<Availability>> {
        Ok(Some(Availability::Readily))
    }

    async fn create(
        &self,
        _options: SummarizerOptions,
        _monitor: ProgressMonitor,
    ) -> ProviderResult<Box<dyn SummarizerSession>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(SummarizerCall(self.script.clone())))
    }
}

/// Handles to the scripted providers behind an orchestrator
pub struct Harness {
    pub orchestrator: Orchestrator,
    pub translator: Arc<ScriptedTranslator>,
    pub summarizer: Arc<ScriptedSummarizer>,
}

pub async fn harness(
    detector: ScriptedDetector,
    translator: ScriptedTranslator,
    summarizer: SummaryScript,
) -> Harness {
    harness_with_config(ParlanceConfig::default(), detector, translator, summarizer).await
}

pub async fn harness_with_config(
    config: ParlanceConfig,
    detector: ScriptedDetector,
    translator: ScriptedTranslator,
    summarizer: SummaryScript,
) -> Harness {
    let translator = Arc::new(translator);
    let summarizer = Arc::new(ScriptedSummarizer::new(summarizer));
    let environment = LanguageEnvironment::new()
        .with_detector(Arc::new(detector))
        .with_translator(translator.clone())
        .with_summarizer(summarizer.clone());

    let orchestrator = Orchestrator::initialize(config, Some(environment))
        .await
        .expect("default config is valid");

    Harness {
        orchestrator,
        translator,
        summarizer,
    }
}

/// Text with exactly `count` words
pub fn words(count: usize) -> String {
    vec!["word"; count].join(" ")
}

/// Yield to spawned tasks until `condition` holds
pub async fn wait_until(condition: impl Fn() -> bool) {
    for _ in 0..10_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition never became true");
}
