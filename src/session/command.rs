use crate::scroll::PaneSide;
use serde::Deserialize;
use ts_rs::TS;

/// Synchronous user gestures and host ticks routed through the session.
///
/// Searches and example translations are async and have their own entry
/// points on `SessionView`.
#[derive(Debug, Clone, PartialEq, Deserialize, TS)]
#[serde(tag = "action", rename_all = "snake_case")]
#[ts(export)]
pub enum SessionCommand {
    Speak { text: String, language: String },
    /// Narrate an example sentence of the current result in its own language.
    SpeakExample { index: usize },
    /// Narrate the attached translation of an example.
    SpeakExampleTranslation { index: usize },
    PauseResume,
    StopNarration,
    Scroll { side: PaneSide, scroll_top: f64 },
    ResizePane {
        side: PaneSide,
        scroll_height: f64,
        client_height: f64,
    },
    AnimationFrame,
    Tick,
    SetLanguages {
        source: String,
        target: String,
        corpus: String,
    },
}

impl SessionCommand {
    /// Stable name used in logs.
    pub fn action(&self) -> &'static str {
        match self {
            SessionCommand::Speak { .. } => "speak",
            SessionCommand::SpeakExample { .. } => "speak_example",
            SessionCommand::SpeakExampleTranslation { .. } => "speak_example_translation",
            SessionCommand::PauseResume => "pause_resume",
            SessionCommand::StopNarration => "stop_narration",
            SessionCommand::Scroll { .. } => "scroll",
            SessionCommand::ResizePane { .. } => "resize_pane",
            SessionCommand::AnimationFrame => "animation_frame",
            SessionCommand::Tick => "tick",
            SessionCommand::SetLanguages { .. } => "set_languages",
        }
    }

    /// High-frequency host callbacks that are logged at trace level only.
    pub fn is_host_tick(&self) -> bool {
        matches!(
            self,
            SessionCommand::Scroll { .. }
                | SessionCommand::ResizePane { .. }
                | SessionCommand::AnimationFrame
                | SessionCommand::Tick
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_deserialize_from_tagged_json() {
        let command: SessionCommand =
            serde_json::from_str(r#"{"action":"speak","text":"Hallo","language":"de"}"#).unwrap();
        assert_eq!(
            command,
            SessionCommand::Speak {
                text: "Hallo".to_string(),
                language: "de".to_string()
            }
        );

        let scroll: SessionCommand =
            serde_json::from_str(r#"{"action":"scroll","side":"translated","scroll_top":42.5}"#)
                .unwrap();
        assert_eq!(scroll.action(), "scroll");
        assert!(scroll.is_host_tick());

        let stop: SessionCommand = serde_json::from_str(r#"{"action":"stop_narration"}"#).unwrap();
        assert_eq!(stop, SessionCommand::StopNarration);
        assert!(!stop.is_host_tick());
    }
}
