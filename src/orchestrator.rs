//! Orchestrator for the message processing pipeline
//!
//! Turns raw input into messages and attaches translations and summaries to
//! them. The orchestrator is the only writer of `SharedAppState`:
//! - Every operation converts failures into the single visible error
//! - In-flight flags are cleared on every exit path, including cancellation
//! - Results are merged at completion time, never duplicated
//!
//! Only one translation and one summarization may be outstanding. The
//! [`dispatch`](Orchestrator::dispatch) entry point enforces this the way a
//! disabled control would: it refuses a second request while the flag is set.
//! The flag is raised inside the spawned task, so two dispatches issued back
//! to back can both pass the check; the merge-time duplicate check keeps the
//! conversation consistent in that case. Summaries are also refused for
//! non-English messages and whenever the summarizer is not available.

use crate::config::ParlanceConfig;
use crate::error::{ParlanceError, Result, ValidationError};
use crate::languages::{self, LanguageCode};
use crate::messages::{MergeOutcome, MessageId, ProcessedResult};
use crate::services::progress::{self, ProgressStream};
use crate::services::{
    probe, CapabilityReport, CapabilityStatus, LanguageEnvironment, LanguageServiceAdapter,
};
use crate::state::{ActionKind, AppCommand, AppEvent, SharedAppState};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Only messages in this language offer a summary
const SUMMARY_LANGUAGE: &str = "en";

/// Owned pipeline instance, constructed once per session
///
/// Cloning is cheap and every clone drives the same state.
#[derive(Clone)]
pub struct Orchestrator {
    config: Arc<ParlanceConfig>,
    state: SharedAppState,
    services: Arc<LanguageServiceAdapter>,
    event_tx: Sender<AppEvent>,
    event_rx: Receiver<AppEvent>,
}

impl Orchestrator {
    /// Probe the environment once and build the orchestrator
    ///
    /// `None` means the host exposes no language services at all.
    pub async fn initialize(
        config: ParlanceConfig,
        environment: Option<LanguageEnvironment>,
    ) -> Result<Self> {
        config.validate()?;

        let state = SharedAppState::new(config.default_language.clone());
        state.write().capabilities = CapabilityReport::checking();

        info!("Probing language services");
        let outcome = probe(environment.as_ref()).await;
        {
            let mut s = state.write();
            if let Some(error) = outcome.report.error.clone() {
                s.set_error(error);
            }
            s.capabilities = outcome.report;
        }

        let services = LanguageServiceAdapter::from_config(outcome.services, &config);
        Ok(Self::with_parts(config, state, services))
    }

    /// Build an orchestrator from already resolved parts
    pub fn with_parts(
        config: ParlanceConfig,
        state: SharedAppState,
        services: LanguageServiceAdapter,
    ) -> Self {
        let (event_tx, event_rx) = bounded(config.event_buffer_size);
        Self {
            config: Arc::new(config),
            state,
            services: Arc::new(services),
            event_tx,
            event_rx,
        }
    }

    /// Get the shared application state
    pub fn state(&self) -> &SharedAppState {
        &self.state
    }

    pub fn config(&self) -> &ParlanceConfig {
        &self.config
    }

    /// Get a receiver for events
    pub fn event_receiver(&self) -> Receiver<AppEvent> {
        self.event_rx.clone()
    }

    /// Try to receive an event (non-blocking)
    pub fn try_recv_event(&self) -> Option<AppEvent> {
        self.event_rx.try_recv().ok()
    }

    // === Operations ===

    /// Replace the pending input buffer
    pub fn set_input(&self, text: impl Into<String>) {
        self.state.write().input_text = text.into();
        self.notify(AppEvent::StateChanged);
    }

    /// Change the target language for translations
    pub fn select_language(&self, code: impl Into<LanguageCode>) {
        let code = code.into();
        if !languages::is_listed(code.as_str()) {
            warn!("Selected language {} is not in the language list", code);
        }
        self.state.write().selected_language = code;
        self.notify(AppEvent::StateChanged);
    }

    /// Send the pending input buffer
    pub async fn send_input(&self) {
        let text = self.state.read().input_text.clone();
        self.send_message(&text).await;
    }

    /// Detect the language of `raw_text` and append it as a new message
    pub async fn send_message(&self, raw_text: &str) {
        if raw_text.trim().is_empty() {
            debug!("Rejecting empty input");
            self.fail(ValidationError::EmptyInput.into());
            return;
        }

        self.state.write().clear_error();
        self.notify(AppEvent::StateChanged);

        match self.services.detect(raw_text).await {
            Ok(language) => {
                let id = {
                    let mut s = self.state.write();
                    let id = s.conversation.create(raw_text, language.clone());
                    s.input_text.clear();
                    id
                };
                info!("Message {} created (language: {})", id, language);
                self.notify(AppEvent::StateChanged);
            }
            Err(e) => self.fail(e),
        }
    }

    /// Translate a message into the selected language
    pub async fn translate_selected(&self, id: MessageId) {
        let target = self.state.selected_language();
        self.translate(id, target).await;
    }

    /// Translate a message and merge the result
    ///
    /// No-op when the message is gone or already in `target`.
    pub async fn translate(&self, id: MessageId, target: impl Into<LanguageCode>) {
        let target = target.into();
        let Some((text, source)) = self
            .state
            .read()
            .conversation
            .get(id)
            .map(|m| (m.text().to_string(), m.language().clone()))
        else {
            debug!("Translate: message {} not found", id);
            return;
        };
        if source == target {
            debug!("Translate: message {} is already in {}", id, target);
            return;
        }

        let flight = InFlight::begin(&self.state, ActionKind::Translate);
        self.notify(AppEvent::StateChanged);
        debug!("Translating message {} from {} to {}", id, source, target);

        let (monitor, progress) = progress::channel();
        let outcome = self
            .drive(
                self.services.translate(&text, &source, &target, monitor),
                progress,
            )
            .await;

        match outcome {
            Ok(content) => self.merge(id, ProcessedResult::translation(content, target)),
            Err(e) => self.fail(e),
        }

        drop(flight);
        self.notify(AppEvent::StateChanged);
    }

    /// Summarize a message and merge the result
    ///
    /// No-op when the message is gone; rejected when it is too short.
    pub async fn summarize(&self, id: MessageId) {
        let Some((text, words)) = self
            .state
            .read()
            .conversation
            .get(id)
            .map(|m| (m.text().to_string(), m.word_count()))
        else {
            debug!("Summarize: message {} not found", id);
            return;
        };

        let min_words = self.config.min_summary_words;
        if words <= min_words {
            debug!("Summarize: message {} has only {} words", id, words);
            self.fail(ValidationError::TextTooShort { min_words }.into());
            return;
        }

        let flight = InFlight::begin(&self.state, ActionKind::Summarize);
        self.notify(AppEvent::StateChanged);
        debug!("Summarizing message {} ({} words)", id, words);

        let (monitor, progress) = progress::channel();
        let outcome = self
            .drive(self.services.summarize(&text, monitor), progress)
            .await;

        match outcome {
            Ok(content) => self.merge(id, ProcessedResult::summary(content)),
            Err(e) => self.fail(e),
        }

        drop(flight);
        self.notify(AppEvent::StateChanged);
    }

    /// Reset messages, pending input and error
    ///
    /// Requests still in flight keep running; their results are discarded
    /// once they find their message gone.
    pub fn clear(&self) {
        self.state.write().clear();
        info!("Conversation cleared");
        self.notify(AppEvent::StateChanged);
    }

    /// Run a command, spawning asynchronous work on the current runtime
    ///
    /// Returns the spawned task, or `None` when the command completed
    /// synchronously or was refused.
    pub fn dispatch(&self, command: AppCommand) -> Option<JoinHandle<()>> {
        match command {
            AppCommand::SetInput(text) => {
                self.set_input(text);
                None
            }
            AppCommand::SelectLanguage(code) => {
                self.select_language(code);
                None
            }
            AppCommand::Clear => {
                self.clear();
                None
            }
            AppCommand::SendInput => {
                let this = self.clone();
                Some(tokio::spawn(async move { this.send_input().await }))
            }
            AppCommand::SendText(text) => {
                let this = self.clone();
                Some(tokio::spawn(async move { this.send_message(&text).await }))
            }
            AppCommand::Translate { id, target } => {
                if self.refuse(ActionKind::Translate, id) {
                    return None;
                }
                let this = self.clone();
                Some(tokio::spawn(async move { this.translate(id, target).await }))
            }
            AppCommand::TranslateSelected(id) => {
                if self.refuse(ActionKind::Translate, id) {
                    return None;
                }
                let this = self.clone();
                Some(tokio::spawn(async move { this.translate_selected(id).await }))
            }
            AppCommand::Summarize(id) => {
                if self.refuse(ActionKind::Summarize, id) {
                    return None;
                }
                let this = self.clone();
                Some(tokio::spawn(async move { this.summarize(id).await }))
            }
        }
    }

    // === Internals ===

    /// Check whether the control for `action` on message `id` is disabled
    ///
    /// Summaries are offered for English text only, and only once the
    /// summarizer resolved as available. Translation waits for the startup check.
    fn refuse(&self, action: ActionKind, id: MessageId) -> bool {
        let reason = {
            let s = self.state.read();
            let api_status = &s.capabilities.summarization;
            if s.is_in_flight(action) {
                Some(format!("a {} request is already in flight", action))
            } else {
                match action {
                    ActionKind::Translate => matches!(api_status, CapabilityStatus::Checking)
                        .then(|| "language services are still being checked".to_string()),
                    ActionKind::Summarize if !api_status.is_available() => {
                        Some(format!("summarization is {}", api_status.as_str()))
                    }
                    ActionKind::Summarize => s
                        .conversation
                        .get(id)
                        .filter(|m| m.language() != SUMMARY_LANGUAGE)
                        .map(|m| format!("message {} is in {}, not English", id, m.language())),
                }
            }
        };

        match reason {
            Some(reason) => {
                warn!("Refusing {} for message {}: {}", action, id, reason);
                true
            }
            None => false,
        }
    }

    /// Await `call` while copying its progress reports into the state
    ///
    /// Reports still queued when the call finishes are dropped along with
    /// the stream.
    async fn drive<T>(&self, call: impl Future<Output = T>, mut progress: ProgressStream) -> T {
        tokio::pin!(call);
        loop {
            tokio::select! {
                biased;
                outcome = &mut call => return outcome,
                Some(update) = progress.next() => {
                    debug!(
                        "Download progress: {}/{} ({}%)",
                        update.loaded, update.total, update.percentage
                    );
                    self.state.write().download_progress = Some(update);
                    self.notify(AppEvent::StateChanged);
                }
            }
        }
    }

    fn merge(&self, id: MessageId, result: ProcessedResult) {
        let outcome = self.state.write().conversation.merge(id, result);
        match outcome {
            MergeOutcome::Appended => {
                info!("Result merged into message {}", id);
                self.notify(AppEvent::ResultMerged { id });
            }
            MergeOutcome::Duplicate => {
                debug!("Message {} already has this result; discarding", id);
            }
            MergeOutcome::MessageMissing => {
                warn!("Message {} no longer exists; discarding result", id);
            }
        }
    }

    fn fail(&self, error: ParlanceError) {
        warn!("Operation failed: {}", error);
        let message = error.to_string();
        {
            let mut s = self.state.write();
            if let Some(kind) = error.service_capability() {
                if s.capabilities.degrade(kind, message.clone()) {
                    warn!("Capability {} degraded to error", kind);
                }
            }
            s.set_error(error);
        }
        self.notify(AppEvent::Error(message));
        self.notify(AppEvent::StateChanged);
    }

    fn notify(&self, event: AppEvent) {
        if let Err(TrySendError::Full(event)) = self.event_tx.try_send(event) {
            debug!("Event channel full, dropping {:?}", event);
        }
    }
}

/// Marks a request as in flight until dropped
struct InFlight {
    state: SharedAppState,
    action: ActionKind,
}

impl InFlight {
    fn begin(state: &SharedAppState, action: ActionKind) -> Self {
        state.write().begin(action);
        Self {
            state: state.clone(),
            action,
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.state.write().finish(self.action);
    }
}
