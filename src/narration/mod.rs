//! The single process-wide narration controller.
//!
//! Widgets never talk to the speech resource directly. They call `speak`,
//! `pause_resume` or `stop`, feed platform callbacks into `handle_event`, and
//! observe `NarrationState` through a watch channel. All of these funnel
//! through one transition table, so at most one utterance is ever queued or
//! playing and every terminal path (natural end, stop, playback error) lands
//! on idle.

mod backend;
mod locale;
mod process;
mod transitions;

pub use backend::{NarrationEvent, NarrationEventKind, SpeechBackend, Utterance, UtteranceId};
pub use locale::LocaleTable;
pub use process::ProcessSpeechBackend;

use crate::config::AppConfig;
use crate::text_utils::normalize_for_speech;
use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;
use transitions::{NarrationAction, NarrationInput, NarrationMachine};
use ts_rs::TS;

/// Observable narration state.
///
/// `is_paused` implies `is_speaking`; no active text implies both are false.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct NarrationState {
    pub is_speaking: bool,
    pub is_paused: bool,
    pub active_text: Option<String>,
    pub active_language: Option<String>,
    /// Opaque id of the active utterance; platform events carry it back.
    pub utterance: Option<u64>,
}

impl NarrationState {
    pub fn is_idle(&self) -> bool {
        !self.is_speaking
    }
}

pub struct NarrationController<B: SpeechBackend> {
    backend: B,
    machine: NarrationMachine,
    locales: LocaleTable,
    rate: f32,
    state_tx: watch::Sender<NarrationState>,
}

impl<B: SpeechBackend> NarrationController<B> {
    pub fn new(backend: B, locales: LocaleTable, rate: f32) -> Self {
        let (state_tx, _) = watch::channel(NarrationState::default());
        Self {
            backend,
            machine: NarrationMachine::default(),
            locales,
            rate,
            state_tx,
        }
    }

    pub fn from_config(backend: B, config: &AppConfig) -> Self {
        Self::new(
            backend,
            LocaleTable::with_overrides(&config.narration_locales),
            config.narration_rate_clamped(),
        )
    }

    /// Start narrating `text`, or stop if exactly this text is already active.
    pub fn speak(&mut self, text: &str, language: &str) {
        let text = normalize_for_speech(text);
        let locale = self.locales.resolve(language);
        self.apply(NarrationInput::Speak {
            text,
            language: language.to_string(),
            locale,
            rate: self.rate,
        });
    }

    pub fn pause_resume(&mut self) {
        self.apply(NarrationInput::PauseResume);
    }

    pub fn stop(&mut self) {
        self.apply(NarrationInput::Stop);
    }

    /// Feed a platform callback (`onStart`/`onEnd`/`onError`).
    pub fn handle_event(&mut self, event: NarrationEvent) {
        self.apply(NarrationInput::Platform(event));
    }

    pub fn state(&self) -> NarrationState {
        self.machine.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<NarrationState> {
        self.state_tx.subscribe()
    }

    /// Whether a button showing `text` in `language` should render as active.
    pub fn is_playing(&self, text: &str, language: &str) -> bool {
        self.machine.is_playing(&normalize_for_speech(text), language)
    }

    pub fn active_utterance(&self) -> Option<UtteranceId> {
        self.machine.active_id()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn apply(&mut self, input: NarrationInput) {
        let actions = self.machine.transition(input);
        for action in actions {
            if let Err(err) = self.run_action(&action) {
                let utterance = match &action {
                    NarrationAction::Enqueue(utterance) => Some(utterance.id),
                    _ => self.machine.active_id(),
                };
                let cleanup = self.machine.transition(NarrationInput::ResourceFailed {
                    utterance,
                    message: err.to_string(),
                });
                for action in cleanup {
                    if let Err(err) = self.run_action(&action) {
                        debug!("Ignoring failure during narration cleanup: {err}");
                    }
                }
                break;
            }
        }
        self.publish();
    }

    fn run_action(&mut self, action: &NarrationAction) -> crate::SessionResult<()> {
        match action {
            NarrationAction::Cancel => {
                self.backend.cancel();
                Ok(())
            }
            NarrationAction::Enqueue(utterance) => self.backend.speak(utterance),
            NarrationAction::Pause => self.backend.pause(),
            NarrationAction::Resume => self.backend.resume(),
        }
    }

    fn publish(&self) {
        let next = self.machine.snapshot();
        self.state_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}
