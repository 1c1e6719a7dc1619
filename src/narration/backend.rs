use crate::error::SessionResult;
use std::fmt;

/// Identity of one enqueued utterance; platform events carry it back so late
/// callbacks from a superseded utterance can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtteranceId(pub u64);

impl fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: UtteranceId,
    pub text: String,
    pub locale: String,
    pub rate: f32,
}

/// The platform narration resource. There is exactly one per process; the
/// controller owns it.
pub trait SpeechBackend {
    fn speak(&mut self, utterance: &Utterance) -> SessionResult<()>;
    /// Drop whatever is queued or playing. Must be safe to call when idle.
    fn cancel(&mut self);
    fn pause(&mut self) -> SessionResult<()>;
    fn resume(&mut self) -> SessionResult<()>;
}

impl<B: SpeechBackend + ?Sized> SpeechBackend for Box<B> {
    fn speak(&mut self, utterance: &Utterance) -> SessionResult<()> {
        (**self).speak(utterance)
    }

    fn cancel(&mut self) {
        (**self).cancel()
    }

    fn pause(&mut self) -> SessionResult<()> {
        (**self).pause()
    }

    fn resume(&mut self) -> SessionResult<()> {
        (**self).resume()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrationEventKind {
    Started,
    Ended,
    Error(String),
}

/// Callback from the platform resource (`onStart`, `onEnd`, `onError`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrationEvent {
    pub utterance: UtteranceId,
    pub kind: NarrationEventKind,
}

impl NarrationEvent {
    pub fn started(utterance: UtteranceId) -> Self {
        Self {
            utterance,
            kind: NarrationEventKind::Started,
        }
    }

    pub fn ended(utterance: UtteranceId) -> Self {
        Self {
            utterance,
            kind: NarrationEventKind::Ended,
        }
    }

    pub fn error(utterance: UtteranceId, message: impl Into<String>) -> Self {
        Self {
            utterance,
            kind: NarrationEventKind::Error(message.into()),
        }
    }
}
