//! Offline language provider
//!
//! Lets the binary run without an external model host:
//! - Detection scores common stopwords (and Cyrillic script for Russian)
//! - Translation substitutes words from configured glossaries
//! - Summarization extracts the highest-scoring sentences as key points
//!
//! Translator and summarizer sessions simulate a model download the first
//! time they are created so progress reporting can be observed.

use crate::config::LocalProviderConfig;
use crate::languages::LanguageCode;
use crate::services::progress::ProgressMonitor;
use crate::services::provider::{
    Availability, DetectionCandidate, DetectorFactory, DetectorSession, LanguageEnvironment,
    ProviderError, ProviderResult, SummarizerFactory, SummarizerOptions, SummarizerSession,
    SummaryFormat, SummaryLength, TranslatorFactory, TranslatorOptions, TranslatorSession,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

const STOPWORDS: &[(&str, &[&str])] = &[
    (
        "en",
        &[
            "the", "and", "is", "are", "of", "to", "in", "it", "you", "that", "this", "with",
            "hello", "world",
        ],
    ),
    (
        "es",
        &[
            "el", "la", "los", "las", "es", "y", "de", "que", "en", "un", "una", "por", "hola",
            "mundo",
        ],
    ),
    (
        "pt",
        &[
            "o", "a", "os", "as", "é", "e", "de", "que", "em", "um", "uma", "não", "olá",
            "você",
        ],
    ),
    (
        "fr",
        &[
            "le", "la", "les", "est", "et", "de", "que", "un", "une", "je", "vous", "bonjour",
            "pas", "des",
        ],
    ),
    (
        "tr",
        &[
            "ve", "bir", "bu", "da", "de", "için", "ile", "merhaba", "çok", "ne", "var",
            "değil", "ben", "sen",
        ],
    ),
];

/// Offline provider backing all three capabilities
#[derive(Clone, Debug)]
pub struct LocalProvider {
    config: Arc<LocalProviderConfig>,
    downloaded: Arc<Mutex<HashSet<String>>>,
}

impl LocalProvider {
    pub fn new(config: LocalProviderConfig) -> Self {
        Self {
            config: Arc::new(config),
            downloaded: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Expose every capability as a language-service namespace
    pub fn environment(&self) -> LanguageEnvironment {
        let provider = Arc::new(self.clone());
        LanguageEnvironment::new()
            .with_detector(provider.clone())
            .with_translator(provider.clone())
            .with_summarizer(provider)
    }

    fn glossary(
        &self,
        source: &LanguageCode,
        target: &LanguageCode,
    ) -> Option<&BTreeMap<String, String>> {
        self.config
            .glossaries
            .get(&format!("{}-{}", source, target))
    }

    /// Report a simulated download the first time `model` is requested
    fn simulate_download(&self, model: &str, monitor: &ProgressMonitor) {
        if !self.downloaded.lock().insert(model.to_string()) {
            return;
        }

        let total = self.config.download_bytes;
        let steps = self.config.download_steps.max(1) as u64;
        debug!("Simulating download of {} ({} bytes)", model, total);
        for step in 0..=steps {
            monitor.report(total * step / steps, total);
        }
    }
}

/// Score `text` against every known language, best first
pub fn detect_languages(text: &str) -> Vec<DetectionCandidate> {
    let letters: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.is_empty() {
        return Vec::new();
    }

    let cyrillic = letters
        .iter()
        .filter(|c| ('\u{0400}'..='\u{04FF}').contains(*c))
        .count();
    if cyrillic * 2 > letters.len() {
        return vec![DetectionCandidate::new("ru", Some(cyrillic as f32 / letters.len() as f32))];
    }

    let words: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect();

    let mut scores: Vec<(&str, usize)> = STOPWORDS
        .iter()
        .map(|(code, stopwords)| {
            let hits = words
                .iter()
                .filter(|word| stopwords.contains(&word.as_str()))
                .count();
            (*code, hits)
        })
        .filter(|(_, hits)| *hits > 0)
        .collect();
    scores.sort_by(|a, b| b.1.cmp(&a.1));

    let total: usize = scores.iter().map(|(_, hits)| hits).sum();
    scores
        .into_iter()
        .map(|(code, hits)| DetectionCandidate::new(code, Some(hits as f32 / total as f32)))
        .collect()
}

/// Pick key sentences from `text` in their original order
pub fn extract_key_points(text: &str, options: &SummarizerOptions) -> String {
    let sentences: Vec<&str> = text
        .split_inclusive(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    let mut frequencies: HashMap<String, usize> = HashMap::new();
    for word in text.split(|c: char| !c.is_alphanumeric()) {
        if word.chars().count() > 3 {
            *frequencies.entry(word.to_lowercase()).or_default() += 1;
        }
    }

    let mut ranked: Vec<(usize, f32)> = sentences
        .iter()
        .enumerate()
        .map(|(index, sentence)| {
            let words: Vec<String> = sentence
                .split(|c: char| !c.is_alphanumeric())
                .filter(|w| !w.is_empty())
                .map(|w| w.to_lowercase())
                .collect();
            let score: usize = words
                .iter()
                .map(|w| frequencies.get(w).copied().unwrap_or(0))
                .sum();
            (index, score as f32 / words.len().max(1) as f32)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

    let points = match options.length {
        SummaryLength::Short => 3,
        SummaryLength::Medium => 5,
        SummaryLength::Long => 7,
    };
    let mut chosen: Vec<usize> = ranked.into_iter().take(points).map(|(i, _)| i).collect();
    chosen.sort_unstable();

    let bullet = match options.format {
        SummaryFormat::PlainText => "•",
        SummaryFormat::Markdown => "-",
    };
    chosen
        .into_iter()
        .map(|i| format!("{} {}", bullet, sentences[i]))
        .collect::<Vec<_>>()
        .join("\n")
}

struct LocalDetector;

#[async_trait]
impl DetectorSession for LocalDetector {
    async fn detect(&self, text: &str) -> ProviderResult<Vec<DetectionCandidate>> {
        Ok(detect_languages(text))
    }
}

#[async_trait]
impl DetectorFactory for LocalProvider {
    async fn capabilities(&self) -> ProviderResult<Option<Availability>> {
        Ok(Some(Availability::Readily))
    }

    async fn create(&self) -> ProviderResult<Box<dyn DetectorSession>> {
        Ok(Box::new(LocalDetector))
    }
}

struct GlossaryTranslator {
    glossary: BTreeMap<String, String>,
}

#[async_trait]
impl TranslatorSession for GlossaryTranslator {
    async fn translate(&self, text: &str) -> ProviderResult<String> {
        let mut out = String::with_capacity(text.len());
        let mut word = String::new();
        for c in text.chars().chain(std::iter::once('\0')) {
            if c.is_alphanumeric() {
                word.push(c);
                continue;
            }
            if !word.is_empty() {
                out.push_str(&self.substitute(&word));
                word.clear();
            }
            if c != '\0' {
                out.push(c);
            }
        }
        Ok(out)
    }
}

impl GlossaryTranslator {
    fn substitute(&self, word: &str) -> String {
        let Some(translation) = self.glossary.get(&word.to_lowercase()) else {
            return word.to_string();
        };
        let mut chars = word.chars();
        match chars.next() {
            Some(first) if first.is_uppercase() => {
                let mut out: String = translation
                    .chars()
                    .take(1)
                    .flat_map(char::to_uppercase)
                    .collect();
                out.extend(translation.chars().skip(1));
                out
            }
            _ => translation.clone(),
        }
    }
}

#[async_trait]
impl TranslatorFactory for LocalProvider {
    async fn capabilities(&self) -> ProviderResult<Option<Availability>> {
        if self.config.glossaries.is_empty() {
            Ok(Some(Availability::No))
        } else {
            Ok(Some(Availability::AfterDownload))
        }
    }

    async fn language_pair_available(
        &self,
        source: &LanguageCode,
        target: &LanguageCode,
    ) -> ProviderResult<Option<Availability>> {
        let pair = format!("{}-{}", source, target);
        let availability = if self.glossary(source, target).is_none() {
            Availability::No
        } else if self.downloaded.lock().contains(&pair) {
            Availability::Readily
        } else {
            Availability::AfterDownload
        };
        Ok(Some(availability))
    }

    async fn create(
        &self,
        options: TranslatorOptions,
        monitor: ProgressMonitor,
    ) -> ProviderResult<Box<dyn TranslatorSession>> {
        let glossary = self
            .glossary(&options.source_language, &options.target_language)
            .cloned()
            .ok_or_else(|| {
                ProviderError::new(format!(
                    "No glossary for {} -> {}",
                    options.source_language, options.target_language
                ))
            })?;

        self.simulate_download(
            &format!("{}-{}", options.source_language, options.target_language),
            &monitor,
        );
        Ok(Box::new(GlossaryTranslator { glossary }))
    }
}

struct ExtractiveSummarizer {
    options: SummarizerOptions,
}

#[async_trait]
impl SummarizerSession for ExtractiveSummarizer {
    async fn summarize(&self, text: &str) -> ProviderResult<String> {
        Ok(extract_key_points(text, &self.options))
    }
}

#[async_trait]
impl SummarizerFactory for LocalProvider {
    async fn capabilities(&self) -> ProviderResult<Option<Availability>> {
        Ok(Some(Availability::Readily))
    }

    async fn create(
        &self,
        options: SummarizerOptions,
        monitor: ProgressMonitor,
    ) -> ProviderResult<Box<dyn SummarizerSession>> {
        self.simulate_download("summarizer", &monitor);
        Ok(Box::new(ExtractiveSummarizer { options }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::progress;

    fn first(text: &str) -> Option<String> {
        detect_languages(text)
            .into_iter()
            .next()
            .map(|c| c.detected_language.to_string())
    }

    #[test]
    fn test_detects_common_languages() {
        assert_eq!(first("Hello world, this is a test").as_deref(), Some("en"));
        assert_eq!(first("Hola mundo, esta es una prueba de la app").as_deref(), Some("es"));
        assert_eq!(first("Bonjour, je suis le chat et vous").as_deref(), Some("fr"));
        assert_eq!(first("Привет, как дела?").as_deref(), Some("ru"));
        assert_eq!(first("Merhaba, bu bir test ve çok güzel").as_deref(), Some("tr"));
    }

    #[test]
    fn test_no_letters_no_candidates() {
        assert!(detect_languages("1234 !!").is_empty());
        assert!(detect_languages("").is_empty());
    }

    #[tokio::test]
    async fn test_glossary_translation_keeps_case_and_punctuation() {
        let provider = LocalProvider::new(
            LocalProviderConfig::default()
                .with_entry("en", "es", "hello", "hola")
                .with_entry("en", "es", "world", "mundo"),
        );
        let options = TranslatorOptions {
            source_language: "en".into(),
            target_language: "es".into(),
        };
        let session = TranslatorFactory::create(&provider, options, ProgressMonitor::detached())
            .await
            .unwrap();
        assert_eq!(session.translate("Hello world!").await.unwrap(), "Hola mundo!");
    }

    #[tokio::test]
    async fn test_download_is_reported_once() {
        let provider =
            LocalProvider::new(LocalProviderConfig::default().with_entry("en", "es", "a", "b"));
        let options = TranslatorOptions {
            source_language: "en".into(),
            target_language: "es".into(),
        };

        let (monitor, mut stream) = progress::channel();
        TranslatorFactory::create(&provider, options.clone(), monitor.clone())
            .await
            .unwrap();
        TranslatorFactory::create(&provider, options, monitor)
            .await
            .unwrap();

        let mut reports = Vec::new();
        while let Some(update) = stream.try_next() {
            reports.push(update.percentage);
        }
        assert_eq!(reports, vec![0, 25, 50, 75, 100]);

        let pair = provider
            .language_pair_available(&"en".into(), &"es".into())
            .await
            .unwrap();
        assert_eq!(pair, Some(Availability::Readily));
    }

    #[tokio::test]
    async fn test_missing_pair_is_unavailable() {
        let provider = LocalProvider::new(LocalProviderConfig::default());
        let pair = provider
            .language_pair_available(&"en".into(), &"fr".into())
            .await
            .unwrap();
        assert_eq!(pair, Some(Availability::No));
        assert_eq!(
            TranslatorFactory::capabilities(&provider).await.unwrap(),
            Some(Availability::No)
        );
    }

    #[test]
    fn test_key_points_keep_order_and_length() {
        let text = "Rust compiles fast programs. Cats sleep. Rust programs avoid data races. \
                    Weather is nice. Rust ownership prevents bugs in programs.";
        let options = SummarizerOptions {
            length: SummaryLength::Short,
            ..Default::default()
        };
        let summary = extract_key_points(text, &options);
        let lines: Vec<&str> = summary.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|line| line.starts_with("• ")));
        assert_eq!(lines[0], "• Rust compiles fast programs.");
        assert!(summary.contains("Rust ownership prevents bugs in programs."));
    }
}
