//! Language codes and the static language list offered to the user

use serde::{Deserialize, Serialize};

/// An ISO-639-1-like language code, stored lowercase
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display name from the static list, or the code itself
    pub fn name(&self) -> &str {
        language_name(&self.0)
    }
}

impl std::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LanguageCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for LanguageCode {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}

impl PartialEq<str> for LanguageCode {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for LanguageCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A selectable target language
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

pub const LANGUAGES: &[Language] = &[
    Language { code: "en", name: "English" },
    Language { code: "pt", name: "Portuguese" },
    Language { code: "es", name: "Spanish" },
    Language { code: "ru", name: "Russian" },
    Language { code: "tr", name: "Turkish" },
    Language { code: "fr", name: "French" },
];

/// Look up the display name of a code, falling back to the code
pub fn language_name(code: &str) -> &str {
    LANGUAGES
        .iter()
        .find(|language| language.code == code)
        .map(|language| language.name)
        .unwrap_or(code)
}

/// Check if a code is in the static list
pub fn is_listed(code: &str) -> bool {
    LANGUAGES.iter().any(|language| language.code == code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_is_normalized() {
        let code = LanguageCode::new(" ES ");
        assert_eq!(code, "es");
        assert_eq!(code.name(), "Spanish");
    }

    #[test]
    fn test_unknown_name_falls_back_to_code() {
        assert_eq!(language_name("de"), "de");
        assert!(!is_listed("de"));
        assert!(is_listed("tr"));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&LanguageCode::new("pt")).unwrap();
        assert_eq!(json, "\"pt\"");
    }
}
