use super::state::{SearchRequestResult, SearchStage};
use crate::api::TranslationApi;
use crate::config::AppConfig;
use crate::error::{SessionError, SessionResult};
use crate::models::Example;
use crate::text_utils::{normalize_language_code, normalize_query};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// A validated search submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub word: String,
    pub source_language: String,
    pub target_language: String,
    pub corpus_language: String,
}

impl SearchQuery {
    pub fn new(
        word: &str,
        source_language: &str,
        target_language: &str,
        corpus_language: &str,
    ) -> SessionResult<Self> {
        let word = normalize_query(word);
        if word.is_empty() {
            return Err(SessionError::user_input("Please enter a word to search for"));
        }
        Ok(Self {
            word,
            source_language: language_code(source_language)?,
            target_language: language_code(target_language)?,
            corpus_language: language_code(corpus_language)?,
        })
    }

    /// Stage 1 runs only when the query is not already in the corpus language.
    pub fn needs_query_translation(&self) -> bool {
        self.source_language != self.corpus_language
    }

    pub fn needs_word_translation(&self) -> bool {
        self.source_language != self.target_language
    }
}

fn language_code(code: &str) -> SessionResult<String> {
    normalize_language_code(code)
        .ok_or_else(|| SessionError::user_input(format!("Invalid language code: '{}'", code.trim())))
}

/// Search result plus the best-effort word annotation that ran beside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedSearch {
    pub result: SearchRequestResult,
    pub annotation: Option<String>,
}

/// Translate-then-fan-out search over a `TranslationApi`.
///
/// Every stage transition is published on a watch channel. Overlapping runs
/// are independent; by default the last one to publish wins, and with
/// `discard_stale` set, publishes from superseded submissions are dropped.
pub struct SearchPipeline<A: TranslationApi> {
    api: A,
    limit: usize,
    discard_stale: bool,
    last_request_id: AtomicU64,
    result_tx: watch::Sender<SearchRequestResult>,
}

impl<A: TranslationApi> SearchPipeline<A> {
    pub fn new(api: A, limit: usize, discard_stale: bool) -> Self {
        let (result_tx, _) = watch::channel(SearchRequestResult::default());
        Self {
            api,
            limit,
            discard_stale,
            last_request_id: AtomicU64::new(0),
            result_tx,
        }
    }

    pub fn from_config(api: A, config: &AppConfig) -> Self {
        Self::new(api, config.example_limit, config.discard_stale_searches)
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchRequestResult> {
        self.result_tx.subscribe()
    }

    /// Most recently published result.
    pub fn latest(&self) -> SearchRequestResult {
        self.result_tx.borrow().clone()
    }

    pub async fn run_search(
        &self,
        word: &str,
        source_language: &str,
        target_language: &str,
        corpus_language: &str,
    ) -> SearchRequestResult {
        let request_id = self.last_request_id.fetch_add(1, Ordering::SeqCst) + 1;
        let mut result = SearchRequestResult::new(
            request_id,
            word.trim(),
            source_language.trim(),
            target_language.trim(),
            corpus_language.trim(),
        );

        let query = match SearchQuery::new(word, source_language, target_language, corpus_language)
        {
            Ok(query) => query,
            Err(err) => {
                info!(request_id, "Rejected search input: {err}");
                result.fail(err.to_string());
                self.publish(&result);
                return result;
            }
        };
        result = SearchRequestResult::new(
            request_id,
            &query.word,
            &query.source_language,
            &query.target_language,
            &query.corpus_language,
        );
        info!(
            request_id,
            word = %query.word,
            src = %query.source_language,
            tgt = %query.target_language,
            corpus = %query.corpus_language,
            "Starting search"
        );

        let corpus_word = if query.needs_query_translation() {
            self.enter_stage(&mut result, SearchStage::TranslatingQuery);
            match self
                .api
                .translate(&query.word, &query.source_language, &query.corpus_language)
                .await
                .and_then(non_empty_translation)
            {
                Ok(corpus_word) => corpus_word,
                Err(err) => {
                    warn!(request_id, stage = %SearchStage::TranslatingQuery, "Search failed: {err}");
                    result.fail(err.to_string());
                    self.publish(&result);
                    return result;
                }
            }
        } else {
            query.word.clone()
        };
        result.corpus_word = Some(corpus_word.clone());
        self.enter_stage(&mut result, SearchStage::Fetching);

        let examples = self
            .api
            .search_examples(&corpus_word, &query.corpus_language, self.limit);
        let translated_word = async {
            if query.needs_word_translation() {
                self.api
                    .translate(&query.word, &query.source_language, &query.target_language)
                    .await
            } else {
                Ok(query.word.clone())
            }
        };
        let (examples, translated_word) = tokio::join!(examples, translated_word);

        match (examples, translated_word) {
            (Ok(examples), Ok(translated_word)) => {
                info!(
                    request_id,
                    examples = examples.len(),
                    corpus_word = %corpus_word,
                    "Search finished"
                );
                result.complete(examples, translated_word);
            }
            (Err(err), _) | (_, Err(err)) => {
                warn!(request_id, stage = %SearchStage::Fetching, "Search failed: {err}");
                result.fail(err.to_string());
            }
        }
        self.publish(&result);
        result
    }

    /// `run_search` alongside a best-effort single-word translation for the
    /// search header. The annotation never affects the search outcome.
    pub async fn run_search_annotated(
        &self,
        word: &str,
        source_language: &str,
        target_language: &str,
        corpus_language: &str,
    ) -> AnnotatedSearch {
        let annotate = SearchQuery::new(word, source_language, target_language, corpus_language)
            .ok()
            .filter(SearchQuery::needs_word_translation);
        let annotation = async {
            let query = annotate?;
            match self
                .api
                .translate_word(&query.word, &query.source_language, &query.target_language)
                .await
            {
                Ok(annotation) => Some(annotation),
                Err(err) => {
                    warn!(word = %query.word, "Ignoring failed word annotation: {err}");
                    None
                }
            }
        };
        let (result, annotation) = tokio::join!(
            self.run_search(word, source_language, target_language, corpus_language),
            annotation
        );
        AnnotatedSearch { result, annotation }
    }

    /// Translate the example at `index` of the current result into that
    /// result's target language.
    ///
    /// Only that example is updated, and only if the published result still
    /// holds the same sentence at that index when the translation arrives.
    pub async fn translate_example(&self, index: usize) -> SessionResult<Example> {
        let (mut example, target_language) = {
            let current = self.result_tx.borrow();
            let example = current
                .example(index)
                .cloned()
                .ok_or_else(|| SessionError::user_input(format!("No example at position {index}")))?;
            (example, current.target_language.clone())
        };
        if example.is_translated() {
            return Ok(example);
        }

        debug!(index, lang = %example.source_language, tgt = %target_language, "Translating example");
        let translation = self
            .api
            .translate(&example.plain_sentence(), &example.source_language, &target_language)
            .await
            .and_then(non_empty_translation)?;

        let attached = self.result_tx.send_if_modified(|current| {
            match current.examples.as_mut().and_then(|examples| examples.get_mut(index)) {
                Some(slot) if slot.sentence == example.sentence => {
                    slot.attach_translation(translation.clone(), &target_language);
                    true
                }
                _ => false,
            }
        });
        if !attached {
            debug!(index, "Result changed while translating; example translation not attached");
        }
        example.attach_translation(translation, &target_language);
        Ok(example)
    }

    fn enter_stage(&self, result: &mut SearchRequestResult, stage: SearchStage) {
        debug!(request_id = result.request_id, %stage, "Search stage");
        result.stage = stage;
        self.publish(result);
    }

    fn publish(&self, result: &SearchRequestResult) {
        if self.discard_stale {
            let latest = self.last_request_id.load(Ordering::SeqCst);
            if result.request_id < latest {
                debug!(
                    request_id = result.request_id,
                    latest,
                    stage = %result.stage,
                    "Dropping result from superseded search"
                );
                return;
            }
        }
        self.result_tx.send_replace(result.clone());
    }
}

fn non_empty_translation(translation: String) -> SessionResult<String> {
    let trimmed = translation.trim();
    if trimmed.is_empty() {
        return Err(SessionError::upstream("Translation came back empty"));
    }
    Ok(trimmed.to_string())
}
