use crate::models::Example;
use serde::Serialize;
use std::fmt;
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SearchStage {
    #[default]
    Idle,
    TranslatingQuery,
    Fetching,
    Done,
    Failed,
}

impl SearchStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, SearchStage::Done | SearchStage::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SearchStage::Idle => "idle",
            SearchStage::TranslatingQuery => "translating_query",
            SearchStage::Fetching => "fetching",
            SearchStage::Done => "done",
            SearchStage::Failed => "failed",
        }
    }
}

impl fmt::Display for SearchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// UI-facing result of one search submission.
///
/// `examples` and `translated_word` are optional so a result can be published
/// at every stage; a `Done` result always carries both (the translated word
/// echoes the query when no translation was needed).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct SearchRequestResult {
    pub request_id: u64,
    pub query_word: String,
    pub source_language: String,
    pub target_language: String,
    pub corpus_language: String,
    pub corpus_word: Option<String>,
    pub examples: Option<Vec<Example>>,
    pub translated_word: Option<String>,
    pub stage: SearchStage,
    pub error_message: Option<String>,
}

impl SearchRequestResult {
    pub fn new(
        request_id: u64,
        query_word: &str,
        source_language: &str,
        target_language: &str,
        corpus_language: &str,
    ) -> Self {
        Self {
            request_id,
            query_word: query_word.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            corpus_language: corpus_language.to_string(),
            ..Self::default()
        }
    }

    pub fn is_done(&self) -> bool {
        self.stage == SearchStage::Done
    }

    pub fn example(&self, index: usize) -> Option<&Example> {
        self.examples.as_ref()?.get(index)
    }

    pub(super) fn fail(&mut self, message: impl Into<String>) {
        self.stage = SearchStage::Failed;
        self.examples = None;
        self.translated_word = None;
        self.error_message = Some(message.into());
    }

    pub(super) fn complete(&mut self, examples: Vec<Example>, translated_word: String) {
        self.stage = SearchStage::Done;
        self.examples = Some(examples);
        self.translated_word = Some(translated_word);
        self.error_message = None;
    }

    /// Same outcome, ignoring which submission produced it.
    pub fn same_outcome(&self, other: &Self) -> bool {
        Self {
            request_id: other.request_id,
            ..self.clone()
        } == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failing_withholds_partial_data() {
        let mut result = SearchRequestResult::new(1, "Haus", "de", "en", "de");
        result.corpus_word = Some("Haus".to_string());
        result.complete(vec![Example::new("Ein Haus.", "de")], "house".to_string());
        assert!(result.is_done());

        result.fail("backend down");
        assert_eq!(result.stage, SearchStage::Failed);
        assert!(result.examples.is_none());
        assert!(result.translated_word.is_none());
        assert_eq!(result.corpus_word.as_deref(), Some("Haus"));
    }

    #[test]
    fn outcome_comparison_ignores_request_id() {
        let first = SearchRequestResult::new(1, "Haus", "de", "en", "de");
        let second = SearchRequestResult::new(2, "Haus", "de", "en", "de");
        assert!(first.same_outcome(&second));
        assert_ne!(first, second);
    }

    #[test]
    fn stage_names_are_stable() {
        assert_eq!(SearchStage::TranslatingQuery.to_string(), "translating_query");
        assert!(SearchStage::Failed.is_terminal());
        assert!(!SearchStage::Fetching.is_terminal());
    }
}
