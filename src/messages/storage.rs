//! Conversation storage with merge-time duplicate detection

use super::types::{Message, MessageId, ProcessedResult};
use crate::languages::LanguageCode;
use chrono::Utc;

/// What happened to a result handed to [`ConversationStore::merge`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The result was appended
    Appended,
    /// The message already had a result in that slot
    Duplicate,
    /// The message no longer exists (the conversation was cleared)
    MessageMissing,
}

/// Ordered collection of messages
///
/// Not synchronized by itself; it lives inside the shared application state
/// and is only mutated through the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    messages: Vec<Message>,
    last_id: u64,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh id
    ///
    /// Ids follow the wall clock in milliseconds but are bumped when needed
    /// so they never repeat, even across [`clear`](Self::clear).
    pub fn next_id(&mut self) -> MessageId {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        self.last_id = now.max(self.last_id + 1);
        MessageId::new(self.last_id)
    }

    /// Create and append a message with a fresh id
    pub fn create(
        &mut self,
        text: impl Into<String>,
        language: impl Into<LanguageCode>,
    ) -> MessageId {
        let id = self.next_id();
        self.messages.push(Message::new(id, text, language));
        id
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|message| message.id() == id)
    }

    /// Merge a result into a message, keeping the per-message invariants
    pub fn merge(&mut self, id: MessageId, result: ProcessedResult) -> MergeOutcome {
        match self.messages.iter_mut().find(|message| message.id() == id) {
            Some(message) => {
                if message.merge(result) {
                    MergeOutcome::Appended
                } else {
                    MergeOutcome::Duplicate
                }
            }
            None => MergeOutcome::MessageMissing,
        }
    }

    pub fn get_all(&self) -> Vec<Message> {
        self.messages.clone()
    }

    /// Remove every message; the id sequence keeps going
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_strictly_increasing() {
        let mut store = ConversationStore::new();
        let a = store.create("one", "en");
        let b = store.create("two", "en");
        let c = store.create("three", "en");
        assert!(a < b && b < c);
    }

    #[test]
    fn test_ids_survive_clear() {
        let mut store = ConversationStore::new();
        let before = store.create("one", "en");
        store.clear();
        assert!(store.is_empty());
        let after = store.create("two", "en");
        assert!(after > before);
    }

    #[test]
    fn test_merge_outcomes() {
        let mut store = ConversationStore::new();
        let id = store.create("Hello world", "en");

        assert_eq!(
            store.merge(id, ProcessedResult::translation("Hola Mundo", "es")),
            MergeOutcome::Appended
        );
        assert_eq!(
            store.merge(id, ProcessedResult::translation("Hola", "es")),
            MergeOutcome::Duplicate
        );

        store.clear();
        assert_eq!(
            store.merge(id, ProcessedResult::summary("late")),
            MergeOutcome::MessageMissing
        );
    }
}
