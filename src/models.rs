use crate::text_utils::strip_highlight_tags;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One example sentence returned by the corpus search.
///
/// Produced by the backend; the only local mutation is attaching a translation
/// after the user asks for one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Example {
    /// Sentence text, possibly containing `<mark>` highlight tags.
    pub sentence: String,
    pub source_language: String,
    pub translation: Option<String>,
    pub translation_language: Option<String>,
    pub title: Option<String>,
    pub sentence_id: Option<String>,
}

impl Example {
    pub fn new(sentence: impl Into<String>, source_language: impl Into<String>) -> Self {
        Self {
            sentence: sentence.into(),
            source_language: source_language.into(),
            translation: None,
            translation_language: None,
            title: None,
            sentence_id: None,
        }
    }

    pub fn is_translated(&self) -> bool {
        self.translation
            .as_deref()
            .is_some_and(|translation| !translation.trim().is_empty())
    }

    /// Sentence text without highlight markup.
    pub fn plain_sentence(&self) -> String {
        strip_highlight_tags(&self.sentence)
    }

    pub fn attach_translation(&mut self, translation: String, language: &str) {
        self.translation = Some(translation);
        self.translation_language = Some(language.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::Example;

    #[test]
    fn blank_translation_counts_as_untranslated() {
        let mut example = Example::new("Das <mark>Haus</mark> ist alt.", "de");
        assert!(!example.is_translated());
        example.translation = Some("  ".to_string());
        assert!(!example.is_translated());
        example.attach_translation("The house is old.".to_string(), "en");
        assert!(example.is_translated());
        assert_eq!(example.translation_language.as_deref(), Some("en"));
    }

    #[test]
    fn plain_sentence_drops_markup() {
        let example = Example::new("Das <mark>Haus</mark> ist alt.", "de");
        assert_eq!(example.plain_sentence(), "Das Haus ist alt.");
    }
}
