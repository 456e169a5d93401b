//! Conversation messages and their storage

pub mod storage;
pub mod types;

pub use storage::{ConversationStore, MergeOutcome};
pub use types::{Message, MessageId, ProcessedResult};
