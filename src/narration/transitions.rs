use super::backend::{NarrationEvent, NarrationEventKind, Utterance, UtteranceId};
use super::NarrationState;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(super) enum NarrationPhase {
    #[default]
    Idle,
    Speaking,
    Paused,
}

#[derive(Debug, Clone, PartialEq)]
struct ActiveUtterance {
    id: UtteranceId,
    text: String,
    language: String,
}

#[derive(Debug)]
pub(super) enum NarrationInput {
    Speak {
        text: String,
        language: String,
        locale: String,
        rate: f32,
    },
    PauseResume,
    Stop,
    Platform(NarrationEvent),
    /// A resource call failed synchronously while running an action.
    ResourceFailed {
        utterance: Option<UtteranceId>,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum NarrationAction {
    Cancel,
    Enqueue(Utterance),
    Pause,
    Resume,
}

/// Single source of truth for narration state. Every origin (button,
/// keyboard, auto-advance, platform callback) goes through `transition`.
#[derive(Debug, Default)]
pub(super) struct NarrationMachine {
    phase: NarrationPhase,
    active: Option<ActiveUtterance>,
    last_id: u64,
}

impl NarrationMachine {
    #[cfg(test)]
    pub(super) fn phase(&self) -> NarrationPhase {
        self.phase
    }

    pub(super) fn active_id(&self) -> Option<UtteranceId> {
        self.active.as_ref().map(|active| active.id)
    }

    pub(super) fn is_playing(&self, text: &str, language: &str) -> bool {
        self.phase != NarrationPhase::Idle
            && self
                .active
                .as_ref()
                .is_some_and(|active| active.text == text && active.language == language)
    }

    pub(super) fn snapshot(&self) -> NarrationState {
        match (&self.active, self.phase) {
            (Some(active), NarrationPhase::Speaking | NarrationPhase::Paused) => NarrationState {
                is_speaking: true,
                is_paused: self.phase == NarrationPhase::Paused,
                active_text: Some(active.text.clone()),
                active_language: Some(active.language.clone()),
                utterance: Some(active.id.0),
            },
            _ => NarrationState::default(),
        }
    }

    pub(super) fn transition(&mut self, input: NarrationInput) -> Vec<NarrationAction> {
        match input {
            NarrationInput::Speak {
                text,
                language,
                locale,
                rate,
            } => self.on_speak(text, language, locale, rate),
            NarrationInput::PauseResume => self.on_pause_resume(),
            NarrationInput::Stop => self.on_stop(),
            NarrationInput::Platform(event) => self.on_platform_event(event),
            NarrationInput::ResourceFailed { utterance, message } => {
                self.on_resource_failed(utterance, message)
            }
        }
    }

    fn on_speak(
        &mut self,
        text: String,
        language: String,
        locale: String,
        rate: f32,
    ) -> Vec<NarrationAction> {
        if text.is_empty() {
            debug!("Empty narration text; treating speak as stop");
            return self.on_stop();
        }
        if self.is_playing(&text, &language) {
            info!(
                utterance = ?self.active_id(),
                %language,
                "Same text requested while speaking; toggling narration off"
            );
            self.reset();
            return vec![NarrationAction::Cancel];
        }

        self.last_id = self.last_id.wrapping_add(1);
        let id = UtteranceId(self.last_id);
        info!(
            utterance = %id,
            %language,
            %locale,
            chars = text.chars().count(),
            superseded = ?self.active_id(),
            "Starting narration"
        );
        self.phase = NarrationPhase::Speaking;
        self.active = Some(ActiveUtterance {
            id,
            text: text.clone(),
            language,
        });
        vec![
            NarrationAction::Cancel,
            NarrationAction::Enqueue(Utterance {
                id,
                text,
                locale,
                rate,
            }),
        ]
    }

    fn on_pause_resume(&mut self) -> Vec<NarrationAction> {
        match self.phase {
            NarrationPhase::Speaking => {
                debug!(utterance = ?self.active_id(), "Pausing narration");
                self.phase = NarrationPhase::Paused;
                vec![NarrationAction::Pause]
            }
            NarrationPhase::Paused => {
                debug!(utterance = ?self.active_id(), "Resuming narration");
                self.phase = NarrationPhase::Speaking;
                vec![NarrationAction::Resume]
            }
            NarrationPhase::Idle => Vec::new(),
        }
    }

    fn on_stop(&mut self) -> Vec<NarrationAction> {
        if self.phase == NarrationPhase::Idle && self.active.is_none() {
            return Vec::new();
        }
        info!(utterance = ?self.active_id(), "Stopping narration");
        self.reset();
        vec![NarrationAction::Cancel]
    }

    fn on_platform_event(&mut self, event: NarrationEvent) -> Vec<NarrationAction> {
        if self.active_id() != Some(event.utterance) {
            debug!(
                utterance = %event.utterance,
                current = ?self.active_id(),
                kind = ?event.kind,
                "Ignoring narration event for superseded utterance"
            );
            return Vec::new();
        }
        match event.kind {
            NarrationEventKind::Started => {
                debug!(utterance = %event.utterance, "Narration started playing");
            }
            NarrationEventKind::Ended => {
                info!(utterance = %event.utterance, "Narration finished");
                self.reset();
            }
            NarrationEventKind::Error(message) => {
                warn!(utterance = %event.utterance, "Narration playback failed: {message}");
                self.reset();
            }
        }
        Vec::new()
    }

    fn on_resource_failed(
        &mut self,
        utterance: Option<UtteranceId>,
        message: String,
    ) -> Vec<NarrationAction> {
        if utterance.is_some() && utterance != self.active_id() {
            return Vec::new();
        }
        warn!(utterance = ?utterance, "Narration resource call failed: {message}");
        self.reset();
        vec![NarrationAction::Cancel]
    }

    fn reset(&mut self) {
        self.phase = NarrationPhase::Idle;
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn speak(text: &str, language: &str) -> NarrationInput {
        NarrationInput::Speak {
            text: text.to_string(),
            language: language.to_string(),
            locale: format!("{language}-XX"),
            rate: 1.0,
        }
    }

    #[test]
    fn speak_cancels_before_enqueue() {
        let mut machine = NarrationMachine::default();
        let actions = machine.transition(speak("Hallo", "de"));
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0], NarrationAction::Cancel);
        assert!(matches!(
            &actions[1],
            NarrationAction::Enqueue(Utterance { id: UtteranceId(1), text, .. }) if text == "Hallo"
        ));
        assert_eq!(machine.phase(), NarrationPhase::Speaking);
    }

    #[test]
    fn repeated_speak_toggles_off_even_when_paused() {
        let mut machine = NarrationMachine::default();
        machine.transition(speak("Hallo", "de"));
        machine.transition(NarrationInput::PauseResume);
        assert_eq!(machine.phase(), NarrationPhase::Paused);

        let actions = machine.transition(speak("Hallo", "de"));
        assert_eq!(actions, vec![NarrationAction::Cancel]);
        assert_eq!(machine.snapshot(), NarrationState::default());
    }

    #[test]
    fn same_text_in_other_language_starts_new_utterance() {
        let mut machine = NarrationMachine::default();
        machine.transition(speak("Hallo", "de"));
        let actions = machine.transition(speak("Hallo", "nl"));
        assert_eq!(actions.len(), 2);
        assert_eq!(machine.active_id(), Some(UtteranceId(2)));
        let snapshot = machine.snapshot();
        assert_eq!(snapshot.active_language.as_deref(), Some("nl"));
        assert_eq!(snapshot.utterance, Some(2));
    }

    #[test]
    fn stop_is_idempotent() {
        let mut machine = NarrationMachine::default();
        assert!(machine.transition(NarrationInput::Stop).is_empty());
        machine.transition(speak("Hallo", "de"));
        assert_eq!(
            machine.transition(NarrationInput::Stop),
            vec![NarrationAction::Cancel]
        );
        assert!(machine.transition(NarrationInput::Stop).is_empty());
    }

    #[test]
    fn stale_platform_events_are_ignored() {
        let mut machine = NarrationMachine::default();
        machine.transition(speak("eins", "de"));
        machine.transition(speak("zwei", "de"));
        machine.transition(NarrationInput::Platform(NarrationEvent::ended(UtteranceId(1))));
        assert_eq!(machine.phase(), NarrationPhase::Speaking);

        machine.transition(NarrationInput::Platform(NarrationEvent::error(
            UtteranceId(2),
            "audio device lost",
        )));
        assert_eq!(machine.phase(), NarrationPhase::Idle);
    }

    #[test]
    fn pause_resume_is_noop_when_idle() {
        let mut machine = NarrationMachine::default();
        assert!(machine.transition(NarrationInput::PauseResume).is_empty());
        assert_eq!(machine.phase(), NarrationPhase::Idle);
    }

    #[test]
    fn empty_text_behaves_like_stop() {
        let mut machine = NarrationMachine::default();
        machine.transition(speak("Hallo", "de"));
        let actions = machine.transition(speak("", "de"));
        assert_eq!(actions, vec![NarrationAction::Cancel]);
        assert_eq!(machine.phase(), NarrationPhase::Idle);
    }
}
