//! Message and result types shared by the store, the state and the presentation

use crate::languages::LanguageCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message identifier: creation time in milliseconds, kept strictly increasing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(u64);

impl MessageId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A result derived from a message by one of the language services
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProcessedResult {
    Translation {
        content: String,
        #[serde(rename = "targetLanguage")]
        target_language: LanguageCode,
    },
    Summary {
        content: String,
    },
}

impl ProcessedResult {
    pub fn translation(
        content: impl Into<String>,
        target_language: impl Into<LanguageCode>,
    ) -> Self {
        ProcessedResult::Translation {
            content: content.into(),
            target_language: target_language.into(),
        }
    }

    pub fn summary(content: impl Into<String>) -> Self {
        ProcessedResult::Summary {
            content: content.into(),
        }
    }

    pub fn content(&self) -> &str {
        match self {
            ProcessedResult::Translation { content, .. } => content,
            ProcessedResult::Summary { content } => content,
        }
    }

    /// Check if `other` occupies the same slot on a message
    fn conflicts_with(&self, other: &ProcessedResult) -> bool {
        match (self, other) {
            (
                ProcessedResult::Translation {
                    target_language: a, ..
                },
                ProcessedResult::Translation {
                    target_language: b, ..
                },
            ) => a == b,
            (ProcessedResult::Summary { .. }, ProcessedResult::Summary { .. }) => true,
            _ => false,
        }
    }
}

/// A user message and the results accumulated for it
///
/// Only `processed` ever changes after creation, and only by growing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    text: String,
    language: LanguageCode,
    timestamp: DateTime<Utc>,
    processed: Vec<ProcessedResult>,
}

impl Message {
    pub fn new(id: MessageId, text: impl Into<String>, language: impl Into<LanguageCode>) -> Self {
        Self {
            id,
            text: text.into(),
            language: language.into(),
            timestamp: Utc::now(),
            processed: Vec::new(),
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn language(&self) -> &LanguageCode {
        &self.language
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn processed(&self) -> &[ProcessedResult] {
        &self.processed
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    pub fn translation_to(&self, target: &LanguageCode) -> Option<&str> {
        self.processed.iter().find_map(|result| match result {
            ProcessedResult::Translation {
                content,
                target_language,
            } if target_language == target => Some(content.as_str()),
            _ => None,
        })
    }

    pub fn summary(&self) -> Option<&str> {
        self.processed.iter().find_map(|result| match result {
            ProcessedResult::Summary { content } => Some(content.as_str()),
            _ => None,
        })
    }

    /// Append a result unless one already occupies its slot
    ///
    /// Returns `true` if the result was appended.
    pub fn merge(&mut self, result: ProcessedResult) -> bool {
        if self.processed.iter().any(|existing| existing.conflicts_with(&result)) {
            return false;
        }
        self.processed.push(result);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_merge_is_per_target() {
        let mut message = Message::new(MessageId::new(1), "Hello world", "en");
        assert!(message.merge(ProcessedResult::translation("Hola Mundo", "es")));
        assert!(!message.merge(ProcessedResult::translation("Hola", "es")));
        assert!(message.merge(ProcessedResult::translation("Olá Mundo", "pt")));

        assert_eq!(message.processed().len(), 2);
        assert_eq!(
            message.translation_to(&LanguageCode::new("es")),
            Some("Hola Mundo")
        );
    }

    #[test]
    fn test_single_summary() {
        let mut message = Message::new(MessageId::new(1), "text", "en");
        assert!(message.merge(ProcessedResult::summary("first")));
        assert!(!message.merge(ProcessedResult::summary("second")));
        assert_eq!(message.summary(), Some("first"));
    }

    #[test]
    fn test_timestamp_is_creation_time() {
        let before = Utc::now();
        let message = Message::new(MessageId::new(1), "text", "en");
        assert!(message.timestamp() >= before);
        assert!(message.timestamp() <= Utc::now());
    }

    #[test]
    fn test_processed_result_json_shape() {
        let json = serde_json::to_value(ProcessedResult::translation("Hola Mundo", "es")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "translation",
                "content": "Hola Mundo",
                "targetLanguage": "es"
            })
        );

        let json = serde_json::to_value(ProcessedResult::summary("short")).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "summary", "content": "short" }));
    }

    #[test]
    fn test_word_count_ignores_extra_whitespace() {
        let message = Message::new(MessageId::new(1), "  one   two\nthree ", "en");
        assert_eq!(message.word_count(), 3);
    }
}
