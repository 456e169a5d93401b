//! Unified application state for the Parlance pipeline
//!
//! This module provides a thread-safe shared state that can be accessed by:
//! - **Orchestrator**: the only writer, applies every state transition
//! - **Presentation**: reads snapshots for rendering, sends commands
//! - **Tests**: read state for assertions
//!
//! The lock is never held across an `.await`, so all mutations are short
//! and serialized even on a multi-threaded runtime.

use crate::error::ParlanceError;
use crate::languages::{Language, LanguageCode, LANGUAGES};
use crate::messages::{ConversationStore, Message, MessageId};
use crate::services::{CapabilityReport, CapabilityStatus, DownloadProgress};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;

/// Action kinds that may have one request in flight each
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionKind {
    Translate,
    Summarize,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::Translate => write!(f, "translate"),
            ActionKind::Summarize => write!(f, "summarize"),
        }
    }
}

/// Unified application state
///
/// This is the single source of truth. It is shared across tasks using
/// `SharedAppState`.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Messages and their accumulated results
    pub conversation: ConversationStore,
    /// Pending input buffer
    pub input_text: String,
    /// Target language for translations
    pub selected_language: LanguageCode,
    /// Most recent error (if any)
    pub error: Option<ParlanceError>,
    /// A translation is in flight
    pub translating: bool,
    /// A summarization is in flight
    pub summarizing: bool,
    /// Latest download progress of the running request
    pub download_progress: Option<DownloadProgress>,
    /// Capability statuses resolved at startup
    pub capabilities: CapabilityReport,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(LanguageCode::new("en"))
    }
}

impl AppState {
    /// Create a new empty state with the given target language
    pub fn new(selected_language: LanguageCode) -> Self {
        Self {
            conversation: ConversationStore::new(),
            input_text: String::new(),
            selected_language,
            error: None,
            translating: false,
            summarizing: false,
            download_progress: None,
            capabilities: CapabilityReport::default(),
        }
    }

    /// Create an immutable snapshot of current state
    pub fn snapshot(&self) -> AppStateSnapshot {
        AppStateSnapshot {
            messages: self.conversation.get_all(),
            input_text: self.input_text.clone(),
            error: self
                .error
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_default(),
            is_translating: self.translating,
            is_summarizing: self.summarizing,
            api_status: self.capabilities.summarization.clone(),
            capabilities: self.capabilities.clone(),
            download_progress: self.download_progress,
            selected_language: self.selected_language.clone(),
            languages: LANGUAGES,
        }
    }

    /// Set an error, replacing any previous one
    pub fn set_error(&mut self, error: ParlanceError) {
        self.error = Some(error);
    }

    /// Clear the current error
    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Check if a request of this kind is in flight
    pub fn is_in_flight(&self, action: ActionKind) -> bool {
        match action {
            ActionKind::Translate => self.translating,
            ActionKind::Summarize => self.summarizing,
        }
    }

    /// Check if nothing is in flight
    pub fn is_idle(&self) -> bool {
        !self.translating && !self.summarizing
    }

    // === State transitions ===

    /// Mark a request as started and clear the previous error
    pub fn begin(&mut self, action: ActionKind) {
        match action {
            ActionKind::Translate => self.translating = true,
            ActionKind::Summarize => self.summarizing = true,
        }
        self.clear_error();
    }

    /// Mark a request as finished, successful or not
    pub fn finish(&mut self, action: ActionKind) {
        match action {
            ActionKind::Translate => self.translating = false,
            ActionKind::Summarize => self.summarizing = false,
        }
        self.download_progress = None;
    }

    /// Reset messages, pending input and error
    ///
    /// Capability statuses and in-flight flags are untouched: the former are
    /// probe-once values, the latter belong to requests still running.
    pub fn clear(&mut self) {
        self.conversation.clear();
        self.input_text.clear();
        self.clear_error();
    }
}

/// Immutable snapshot of application state, shaped for presentation
#[derive(Clone, Debug, Serialize)]
pub struct AppStateSnapshot {
    pub messages: Vec<Message>,
    pub input_text: String,
    /// Most recent error message, empty when there is none
    pub error: String,
    pub is_translating: bool,
    pub is_summarizing: bool,
    /// Status of the summarization capability
    pub api_status: CapabilityStatus,
    pub capabilities: CapabilityReport,
    pub download_progress: Option<DownloadProgress>,
    pub selected_language: LanguageCode,
    pub languages: &'static [Language],
}

/// Thread-safe shared application state
///
/// This wraps `AppState` in `Arc<RwLock<>>` for safe concurrent access.
#[derive(Clone, Debug, Default)]
pub struct SharedAppState {
    inner: Arc<RwLock<AppState>>,
}

impl SharedAppState {
    /// Create a new shared state
    pub fn new(selected_language: LanguageCode) -> Self {
        Self {
            inner: Arc::new(RwLock::new(AppState::new(selected_language))),
        }
    }

    /// Get a read lock on the state
    pub fn read(&self) -> parking_lot::RwLockReadGuard<'_, AppState> {
        self.inner.read()
    }

    /// Get a write lock on the state
    pub fn write(&self) -> parking_lot::RwLockWriteGuard<'_, AppState> {
        self.inner.write()
    }

    /// Get a snapshot of current state (no lock held after return)
    pub fn snapshot(&self) -> AppStateSnapshot {
        self.inner.read().snapshot()
    }

    // === Convenience read methods ===

    pub fn is_translating(&self) -> bool {
        self.inner.read().translating
    }

    pub fn is_summarizing(&self) -> bool {
        self.inner.read().summarizing
    }

    pub fn is_idle(&self) -> bool {
        self.inner.read().is_idle()
    }

    /// Get the current error message, empty when there is none
    pub fn error_message(&self) -> String {
        self.inner
            .read()
            .error
            .as_ref()
            .map(|e| e.to_string())
            .unwrap_or_default()
    }

    pub fn error(&self) -> Option<ParlanceError> {
        self.inner.read().error.clone()
    }

    pub fn messages(&self) -> Vec<Message> {
        self.inner.read().conversation.get_all()
    }

    pub fn message(&self, id: MessageId) -> Option<Message> {
        self.inner.read().conversation.get(id).cloned()
    }

    pub fn input_text(&self) -> String {
        self.inner.read().input_text.clone()
    }

    pub fn selected_language(&self) -> LanguageCode {
        self.inner.read().selected_language.clone()
    }

    pub fn download_progress(&self) -> Option<DownloadProgress> {
        self.inner.read().download_progress
    }

    pub fn capabilities(&self) -> CapabilityReport {
        self.inner.read().capabilities.clone()
    }
}

/// Commands that can be sent to control the application
///
/// These are dispatched by the orchestrator and result in state changes.
#[derive(Clone, Debug)]
pub enum AppCommand {
    /// Replace the pending input buffer
    SetInput(String),
    /// Send the pending input buffer
    SendInput,
    /// Send the given text
    SendText(String),
    /// Translate a message into a specific language
    Translate {
        id: MessageId,
        target: LanguageCode,
    },
    /// Translate a message into the selected language
    TranslateSelected(MessageId),
    /// Summarize a message
    Summarize(MessageId),
    /// Change the selected target language
    SelectLanguage(LanguageCode),
    /// Clear the conversation
    Clear,
}

/// Events emitted by the application
///
/// These are used for UI updates and logging. State should be queried
/// directly from `SharedAppState` rather than reconstructed from events.
#[derive(Clone, Debug)]
pub enum AppEvent {
    /// State has changed (trigger a repaint)
    StateChanged,
    /// A result was merged into a message
    ResultMerged { id: MessageId },
    /// An error occurred
    Error(String),
}
