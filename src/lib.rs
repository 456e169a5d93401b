//! Parlance: detect, translate and summarize chat messages
//!
//! Text goes in, gets tagged with its detected language and appended to a
//! conversation. Translations and summaries are produced on demand by
//! whichever language services the host exposes, and attached to the
//! message they were requested for.

pub mod config;
pub mod error;
pub mod languages;
pub mod messages;
pub mod orchestrator;
pub mod services;
pub mod state;

pub use config::{LocalProviderConfig, ParlanceConfig};
pub use error::{ParlanceError, Result, ServiceFailure, ValidationError};
pub use languages::{Language, LanguageCode, LANGUAGES};
pub use orchestrator::Orchestrator;
pub use state::{ActionKind, AppCommand, AppEvent, AppState, AppStateSnapshot, SharedAppState};
