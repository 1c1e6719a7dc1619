use super::command::SessionCommand;
use crate::api::TranslationApi;
use crate::config::AppConfig;
use crate::error::{SessionError, SessionResult};
use crate::models::Example;
use crate::narration::{NarrationController, NarrationEvent, NarrationState, SpeechBackend};
use crate::scroll::{LinkedPanes, PaneMetrics, PaneSide, ScrollDisposition};
use crate::search::{AnnotatedSearch, SearchPipeline, SearchRequestResult, SearchStage};
use crate::text_utils::normalize_language_code;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct LanguageSelection {
    pub source: String,
    pub target: String,
    pub corpus: String,
}

impl LanguageSelection {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            source: config.source_language.clone(),
            target: config.target_language.clone(),
            corpus: config.corpus_language.clone(),
        }
    }
}

/// Everything a front end needs to render the study session.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct SessionSnapshot {
    pub languages: LanguageSelection,
    pub supported_languages: BTreeMap<String, String>,
    pub narration: NarrationState,
    pub search: Option<SearchRequestResult>,
    pub annotation: Option<String>,
    pub message: Option<String>,
    pub original_pane: PaneMetrics,
    pub translated_pane: PaneMetrics,
    pub scroll_locked: bool,
}

/// Composition root for one study session. Holds no state machine of its
/// own; it routes gestures to the engines and caches what they last reported.
pub struct SessionView<A: TranslationApi, B: SpeechBackend> {
    search: Arc<SearchPipeline<A>>,
    narration: NarrationController<B>,
    panes: LinkedPanes<PaneMetrics>,
    languages: LanguageSelection,
    supported_languages: BTreeMap<String, String>,
    last_result: Option<SearchRequestResult>,
    last_annotation: Option<String>,
    last_message: Option<String>,
}

impl<A: TranslationApi, B: SpeechBackend> SessionView<A, B> {
    pub fn new(
        search: Arc<SearchPipeline<A>>,
        narration: NarrationController<B>,
        languages: LanguageSelection,
        scroll_cooldown: Duration,
    ) -> Self {
        Self {
            search,
            narration,
            panes: LinkedPanes::new(
                PaneMetrics::default(),
                PaneMetrics::default(),
                scroll_cooldown,
            ),
            languages,
            supported_languages: BTreeMap::new(),
            last_result: None,
            last_annotation: None,
            last_message: None,
        }
    }

    pub fn from_config(api: A, backend: B, config: &AppConfig) -> Self {
        Self::new(
            Arc::new(SearchPipeline::from_config(api, config)),
            NarrationController::from_config(backend, config),
            LanguageSelection::from_config(config),
            config.scroll_cooldown(),
        )
    }

    /// Shared pipeline handle, for hosts that run overlapping searches on
    /// their own tasks. Call `refresh_search` to pick up what they publish.
    pub fn search_pipeline(&self) -> Arc<SearchPipeline<A>> {
        Arc::clone(&self.search)
    }

    pub fn languages(&self) -> &LanguageSelection {
        &self.languages
    }

    pub fn last_result(&self) -> Option<&SearchRequestResult> {
        self.last_result.as_ref()
    }

    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }

    pub fn narration_state(&self) -> NarrationState {
        self.narration.state()
    }

    pub fn subscribe_narration(&self) -> watch::Receiver<NarrationState> {
        self.narration.subscribe()
    }

    pub fn is_playing(&self, text: &str, language: &str) -> bool {
        self.narration.is_playing(text, language)
    }

    pub fn pane(&self, side: PaneSide) -> &PaneMetrics {
        self.panes.pane(side)
    }

    /// Fetch the backend's language list; later language changes are checked
    /// against it.
    pub async fn load_languages(&mut self) -> SessionResult<&BTreeMap<String, String>> {
        match self.search.api().languages().await {
            Ok(languages) => {
                info!(count = languages.len(), "Loaded supported languages");
                self.supported_languages = languages;
                Ok(&self.supported_languages)
            }
            Err(err) => {
                warn!("Could not load supported languages: {err}");
                self.last_message = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub async fn submit_search(&mut self, word: &str) -> SearchRequestResult {
        let LanguageSelection {
            source,
            target,
            corpus,
        } = self.languages.clone();
        info!(action = "submit_search", word, "Session command");
        let AnnotatedSearch { result, annotation } = self
            .search
            .run_search_annotated(word, &source, &target, &corpus)
            .await;
        self.last_annotation = annotation;
        self.refresh_search();
        result
    }

    /// Pull the pipeline's latest published result into the display cache.
    /// Returns whether anything changed.
    pub fn refresh_search(&mut self) -> bool {
        let latest = self.search.latest();
        if latest.request_id == 0 || self.last_result.as_ref() == Some(&latest) {
            return false;
        }
        self.last_message = status_message(&latest);
        self.last_result = Some(latest);
        true
    }

    pub async fn translate_example(&mut self, index: usize) -> SessionResult<Example> {
        info!(action = "translate_example", index, "Session command");
        match self.search.translate_example(index).await {
            Ok(example) => {
                let latest = self.search.latest();
                if self
                    .last_result
                    .as_ref()
                    .is_some_and(|cached| cached.request_id == latest.request_id)
                {
                    self.last_result = Some(latest);
                } else {
                    self.refresh_search();
                }
                Ok(example)
            }
            Err(err) => {
                self.last_message = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub fn handle_narration_event(&mut self, event: NarrationEvent) {
        self.narration.handle_event(event);
    }

    pub fn apply_command(&mut self, command: SessionCommand, now: Instant) -> SessionResult<()> {
        if command.is_host_tick() {
            trace!(action = command.action(), "Session command");
        } else {
            info!(action = command.action(), "Session command");
        }
        let outcome = self.dispatch(command, now);
        if let Err(err) = &outcome {
            self.last_message = Some(err.to_string());
        }
        outcome
    }

    fn dispatch(&mut self, command: SessionCommand, now: Instant) -> SessionResult<()> {
        match command {
            SessionCommand::Speak { text, language } => self.narration.speak(&text, &language),
            SessionCommand::SpeakExample { index } => {
                let example = self.cached_example(index)?;
                self.narration
                    .speak(&example.sentence, &example.source_language);
            }
            SessionCommand::SpeakExampleTranslation { index } => {
                let example = self.cached_example(index)?;
                match (&example.translation, &example.translation_language) {
                    (Some(translation), Some(language)) if example.is_translated() => {
                        self.narration.speak(translation, language);
                    }
                    _ => {
                        return Err(SessionError::user_input(
                            "Translate this example before playing its translation",
                        ));
                    }
                }
            }
            SessionCommand::PauseResume => self.narration.pause_resume(),
            SessionCommand::StopNarration => self.narration.stop(),
            SessionCommand::Scroll { side, scroll_top } => {
                self.panes.pane_mut(side).scroll_top = scroll_top;
                if self.panes.on_scroll(side, now) == ScrollDisposition::Scheduled {
                    trace!(source = ?side, target = ?side.other(), "Linked scroll scheduled");
                }
            }
            SessionCommand::ResizePane {
                side,
                scroll_height,
                client_height,
            } => {
                let pane = self.panes.pane_mut(side);
                pane.scroll_height = scroll_height;
                pane.client_height = client_height;
            }
            SessionCommand::AnimationFrame => {
                self.panes.on_animation_frame();
            }
            SessionCommand::Tick => {
                self.panes.poll(now);
            }
            SessionCommand::SetLanguages {
                source,
                target,
                corpus,
            } => self.set_languages(&source, &target, &corpus)?,
        }
        Ok(())
    }

    fn set_languages(&mut self, source: &str, target: &str, corpus: &str) -> SessionResult<()> {
        let selection = LanguageSelection {
            source: self.supported_code(source)?,
            target: self.supported_code(target)?,
            corpus: self.supported_code(corpus)?,
        };
        debug!(?selection, "Language selection changed");
        self.languages = selection;
        Ok(())
    }

    fn supported_code(&self, code: &str) -> SessionResult<String> {
        let normalized = normalize_language_code(code)
            .ok_or_else(|| SessionError::user_input(format!("Invalid language code: '{}'", code.trim())))?;
        if !self.supported_languages.is_empty() && !self.supported_languages.contains_key(&normalized)
        {
            return Err(SessionError::user_input(format!(
                "Unsupported language: '{normalized}'"
            )));
        }
        Ok(normalized)
    }

    fn cached_example(&self, index: usize) -> SessionResult<Example> {
        self.last_result
            .as_ref()
            .and_then(|result| result.example(index))
            .cloned()
            .ok_or_else(|| SessionError::user_input(format!("No example at position {index}")))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            languages: self.languages.clone(),
            supported_languages: self.supported_languages.clone(),
            narration: self.narration.state(),
            search: self.last_result.clone(),
            annotation: self.last_annotation.clone(),
            message: self.last_message.clone(),
            original_pane: *self.panes.pane(PaneSide::Original),
            translated_pane: *self.panes.pane(PaneSide::Translated),
            scroll_locked: self.panes.link_state().locked,
        }
    }
}

fn status_message(result: &SearchRequestResult) -> Option<String> {
    match result.stage {
        SearchStage::Done => {
            let count = result.examples.as_ref().map_or(0, Vec::len);
            let word = result.corpus_word.as_deref().unwrap_or(&result.query_word);
            Some(match count {
                0 => format!("No examples found for '{word}'"),
                1 => format!("Found 1 example for '{word}'"),
                n => format!("Found {n} examples for '{word}'"),
            })
        }
        SearchStage::Failed => result.error_message.clone(),
        SearchStage::Idle | SearchStage::TranslatingQuery | SearchStage::Fetching => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narration::{LocaleTable, Utterance};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubApi {
        fail_search: bool,
    }

    #[async_trait]
    impl TranslationApi for StubApi {
        async fn translate(&self, text: &str, _src: &str, tgt: &str) -> SessionResult<String> {
            Ok(format!("{text} [{tgt}]"))
        }

        async fn translate_word(&self, word: &str, _src: &str, tgt: &str) -> SessionResult<String> {
            Ok(format!("{word} [{tgt}]"))
        }

        async fn search_examples(
            &self,
            word: &str,
            corpus_lang: &str,
            _limit: usize,
        ) -> SessionResult<Vec<Example>> {
            if self.fail_search {
                return Err(SessionError::upstream("Search failed: index offline"));
            }
            Ok(vec![Example::new(
                format!("Das <mark>{word}</mark> ist alt."),
                corpus_lang,
            )])
        }

        async fn languages(&self) -> SessionResult<BTreeMap<String, String>> {
            Ok(BTreeMap::from([
                ("de".to_string(), "german".to_string()),
                ("en".to_string(), "english".to_string()),
                ("fr".to_string(), "french".to_string()),
            ]))
        }
    }

    #[derive(Default, Clone)]
    struct SharedBackend {
        spoken: Arc<Mutex<Vec<Utterance>>>,
    }

    impl SpeechBackend for SharedBackend {
        fn speak(&mut self, utterance: &Utterance) -> SessionResult<()> {
            self.spoken.lock().unwrap().push(utterance.clone());
            Ok(())
        }

        fn cancel(&mut self) {}

        fn pause(&mut self) -> SessionResult<()> {
            Ok(())
        }

        fn resume(&mut self) -> SessionResult<()> {
            Ok(())
        }
    }

    fn session(api: StubApi) -> (SessionView<StubApi, SharedBackend>, SharedBackend) {
        let backend = SharedBackend::default();
        let config = AppConfig::default();
        let narration =
            NarrationController::new(backend.clone(), LocaleTable::default(), config.narration_rate);
        let view = SessionView::new(
            Arc::new(SearchPipeline::from_config(api, &config)),
            narration,
            LanguageSelection::from_config(&config),
            Duration::from_millis(150),
        );
        (view, backend)
    }

    #[tokio::test]
    async fn search_results_and_annotation_are_cached() {
        let (mut view, _) = session(StubApi::default());
        let result = view.submit_search("Haus").await;
        assert!(result.is_done());

        let snapshot = view.snapshot();
        assert_eq!(snapshot.search.as_ref(), Some(&result));
        assert_eq!(snapshot.annotation.as_deref(), Some("Haus [en]"));
        assert_eq!(snapshot.message.as_deref(), Some("Found 1 example for 'Haus'"));
        assert!(!view.refresh_search());
    }

    #[tokio::test]
    async fn failed_search_message_is_shown_verbatim() {
        let (mut view, _) = session(StubApi { fail_search: true });
        let result = view.submit_search("Haus").await;
        assert_eq!(result.stage, SearchStage::Failed);
        assert_eq!(view.last_message(), Some("Search failed: index offline"));
    }

    #[tokio::test]
    async fn example_click_translates_and_speaks() {
        let (mut view, backend) = session(StubApi::default());
        view.submit_search("Haus").await;
        let now = Instant::now();

        let err = view
            .apply_command(SessionCommand::SpeakExampleTranslation { index: 0 }, now)
            .unwrap_err();
        assert!(err.is_user_input());

        view.translate_example(0).await.unwrap();
        let cached = view.last_result().unwrap().example(0).unwrap().clone();
        assert_eq!(cached.translation.as_deref(), Some("Das Haus ist alt. [en]"));

        view.apply_command(SessionCommand::SpeakExample { index: 0 }, now)
            .unwrap();
        assert!(view.is_playing("Das Haus ist alt.", "de"));

        view.apply_command(SessionCommand::SpeakExampleTranslation { index: 0 }, now)
            .unwrap();
        assert!(view.is_playing("Das Haus ist alt. [en]", "en"));

        let spoken = backend.spoken.lock().unwrap();
        assert_eq!(spoken.len(), 2);
        assert_eq!(spoken[0].locale, "de-DE");
        assert_eq!(spoken[1].locale, "en-US");
    }

    #[tokio::test]
    async fn speak_command_toggles_and_events_reset() {
        let (mut view, _) = session(StubApi::default());
        let now = Instant::now();
        let speak = SessionCommand::Speak {
            text: "Guten Tag".to_string(),
            language: "de".to_string(),
        };
        view.apply_command(speak.clone(), now).unwrap();
        assert!(view.narration_state().is_speaking);
        view.apply_command(speak.clone(), now).unwrap();
        assert!(view.narration_state().is_idle());

        let mut rx = view.subscribe_narration();
        view.apply_command(speak, now).unwrap();
        assert!(rx.borrow_and_update().is_speaking);
        let active = view.narration.active_utterance().unwrap();
        view.handle_narration_event(NarrationEvent::ended(active));
        assert!(rx.borrow_and_update().is_idle());
    }

    #[tokio::test]
    async fn scroll_commands_drive_linked_panes() {
        let (mut view, _) = session(StubApi::default());
        let t0 = Instant::now();
        for (side, height) in [(PaneSide::Original, 1000.0), (PaneSide::Translated, 2000.0)] {
            view.apply_command(
                SessionCommand::ResizePane {
                    side,
                    scroll_height: height,
                    client_height: 400.0,
                },
                t0,
            )
            .unwrap();
        }
        view.apply_command(
            SessionCommand::Scroll {
                side: PaneSide::Original,
                scroll_top: 300.0,
            },
            t0,
        )
        .unwrap();
        view.apply_command(SessionCommand::AnimationFrame, t0).unwrap();
        assert_eq!(view.pane(PaneSide::Translated).scroll_top, 800.0);
        assert!(view.snapshot().scroll_locked);

        view.apply_command(
            SessionCommand::Scroll {
                side: PaneSide::Translated,
                scroll_top: 800.0,
            },
            t0 + Duration::from_millis(16),
        )
        .unwrap();
        view.apply_command(SessionCommand::AnimationFrame, t0).unwrap();
        assert_eq!(view.pane(PaneSide::Original).scroll_top, 300.0);

        view.apply_command(SessionCommand::Tick, t0 + Duration::from_millis(150))
            .unwrap();
        assert!(!view.snapshot().scroll_locked);
    }

    #[tokio::test]
    async fn language_changes_are_validated_against_backend_list() {
        let (mut view, _) = session(StubApi::default());
        let now = Instant::now();
        view.apply_command(
            SessionCommand::SetLanguages {
                source: "EN".to_string(),
                target: "fr".to_string(),
                corpus: "de".to_string(),
            },
            now,
        )
        .unwrap();
        assert_eq!(view.languages().source, "en");

        view.load_languages().await.unwrap();
        let err = view
            .apply_command(
                SessionCommand::SetLanguages {
                    source: "es".to_string(),
                    target: "en".to_string(),
                    corpus: "de".to_string(),
                },
                now,
            )
            .unwrap_err();
        assert_eq!(err.to_string(), "Unsupported language: 'es'");
        assert_eq!(view.last_message(), Some("Unsupported language: 'es'"));
        assert_eq!(view.languages().source, "en");
    }

    #[tokio::test]
    async fn snapshot_serializes_for_the_web_client() {
        let (mut view, _) = session(StubApi::default());
        view.submit_search("Haus").await;
        let json = serde_json::to_value(view.snapshot()).unwrap();
        assert_eq!(json["search"]["stage"], "done");
        assert_eq!(json["languages"]["corpus"], "de");
        assert_eq!(json["narration"]["is_speaking"], false);
        assert_eq!(json["original_pane"]["client_height"], 0.0);
    }
}
