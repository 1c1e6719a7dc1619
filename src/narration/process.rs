use super::backend::{NarrationEvent, SpeechBackend, Utterance, UtteranceId};
use crate::error::{SessionError, SessionResult};
use std::process::Stdio;
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

const BASE_WORDS_PER_MINUTE: f32 = 175.0;

/// Speech resource backed by an external synthesizer (`espeak-ng` by default).
///
/// Each utterance runs as its own child process on the current tokio runtime.
/// Lifecycle callbacks are delivered on the channel passed to `new`; feed them
/// into `NarrationController::handle_event`.
pub struct ProcessSpeechBackend {
    command: String,
    events: mpsc::UnboundedSender<NarrationEvent>,
    current: Option<oneshot::Sender<()>>,
}

impl ProcessSpeechBackend {
    pub fn new(command: impl Into<String>, events: mpsc::UnboundedSender<NarrationEvent>) -> Self {
        Self {
            command: command.into(),
            events,
            current: None,
        }
    }
}

impl SpeechBackend for ProcessSpeechBackend {
    fn speak(&mut self, utterance: &Utterance) -> SessionResult<()> {
        self.cancel();
        let mut child = Command::new(&self.command)
            .arg("-v")
            .arg(espeak_voice(&utterance.locale))
            .arg("-s")
            .arg(words_per_minute(utterance.rate).to_string())
            .arg(&utterance.text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| {
                SessionError::resource(format!("Failed to start {}: {err}", self.command))
            })?;

        let (cancel_tx, cancel_rx) = oneshot::channel();
        self.current = Some(cancel_tx);
        let events = self.events.clone();
        let id = utterance.id;
        debug!(utterance = %id, command = %self.command, "Spawned speech process");

        tokio::spawn(async move {
            let _ = events.send(NarrationEvent::started(id));
            let outcome = tokio::select! {
                status = child.wait() => Some(status),
                _ = cancel_rx => None,
            };
            match outcome {
                Some(Ok(status)) if status.success() => {
                    let _ = events.send(NarrationEvent::ended(id));
                }
                Some(Ok(status)) => {
                    let _ = events.send(exit_error(id, status.code()));
                }
                Some(Err(err)) => {
                    warn!(utterance = %id, "Waiting on speech process failed: {err}");
                    let _ = events.send(NarrationEvent::error(id, err.to_string()));
                }
                None => {
                    debug!(utterance = %id, "Speech process cancelled");
                    if let Err(err) = child.kill().await {
                        debug!(utterance = %id, "Speech process already gone: {err}");
                    }
                }
            }
        });
        Ok(())
    }

    fn cancel(&mut self) {
        if let Some(cancel) = self.current.take() {
            let _ = cancel.send(());
        }
    }

    fn pause(&mut self) -> SessionResult<()> {
        Err(SessionError::resource(format!(
            "{} does not support pausing",
            self.command
        )))
    }

    fn resume(&mut self) -> SessionResult<()> {
        Err(SessionError::resource(format!(
            "{} does not support resuming",
            self.command
        )))
    }
}

impl Drop for ProcessSpeechBackend {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn exit_error(id: UtteranceId, code: Option<i32>) -> NarrationEvent {
    match code {
        Some(code) => NarrationEvent::error(id, format!("speech process exited with {code}")),
        None => NarrationEvent::error(id, "speech process terminated by signal"),
    }
}

/// espeak voices are mostly bare language codes; only a few keep a region.
fn espeak_voice(locale: &str) -> String {
    let locale = locale.trim().to_ascii_lowercase().replace('_', "-");
    let mut parts = locale.splitn(2, '-');
    let language = parts.next().unwrap_or_default();
    match (language, parts.next()) {
        ("en" | "pt", Some(region)) if !region.is_empty() => format!("{language}-{region}"),
        ("nb", _) => "nb".to_string(),
        _ => language.to_string(),
    }
}

fn words_per_minute(rate: f32) -> u32 {
    let rate = if rate.is_finite() { rate } else { 1.0 };
    (BASE_WORDS_PER_MINUTE * rate).round().clamp(80.0, 450.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narration::NarrationEventKind;
    use std::time::Duration;

    fn utterance(id: u64) -> Utterance {
        Utterance {
            id: UtteranceId(id),
            text: "Hallo".to_string(),
            locale: "de-DE".to_string(),
            rate: 1.0,
        }
    }

    async fn next_event(rx: &mut mpsc::UnboundedReceiver<NarrationEvent>) -> NarrationEvent {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("event should arrive")
            .expect("channel should stay open")
    }

    #[test]
    fn voice_names_follow_espeak_conventions() {
        assert_eq!(espeak_voice("de-DE"), "de");
        assert_eq!(espeak_voice("en-US"), "en-us");
        assert_eq!(espeak_voice("pt_BR"), "pt-br");
        assert_eq!(espeak_voice("nb-NO"), "nb");
        assert_eq!(espeak_voice("tlh"), "tlh");
    }

    #[test]
    fn rate_maps_to_clamped_words_per_minute() {
        assert_eq!(words_per_minute(1.0), 175);
        assert_eq!(words_per_minute(0.1), 80);
        assert_eq!(words_per_minute(4.0), 450);
        assert_eq!(words_per_minute(f32::NAN), 175);
    }

    #[tokio::test]
    async fn missing_program_fails_synchronously() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut backend = ProcessSpeechBackend::new("lingua-session-no-such-tts", tx);
        let err = backend.speak(&utterance(1)).expect_err("spawn should fail");
        assert!(matches!(err, SessionError::Resource(_)));
    }

    #[tokio::test]
    async fn pause_is_reported_as_unsupported() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut backend = ProcessSpeechBackend::new("espeak-ng", tx);
        assert!(backend.pause().is_err());
        assert!(backend.resume().is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn successful_process_reports_start_and_end() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut backend = ProcessSpeechBackend::new("true", tx);
        backend.speak(&utterance(7)).expect("true should spawn");
        assert_eq!(next_event(&mut rx).await, NarrationEvent::started(UtteranceId(7)));
        assert_eq!(next_event(&mut rx).await, NarrationEvent::ended(UtteranceId(7)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_process_reports_error() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut backend = ProcessSpeechBackend::new("false", tx);
        backend.speak(&utterance(3)).expect("false should spawn");
        assert_eq!(next_event(&mut rx).await, NarrationEvent::started(UtteranceId(3)));
        let event = next_event(&mut rx).await;
        assert_eq!(event.utterance, UtteranceId(3));
        assert!(matches!(event.kind, NarrationEventKind::Error(_)));
    }
}
