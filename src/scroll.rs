//! Proportional scroll coupling for the two-pane reading view.
//!
//! The host owns the panes and drives the link explicitly: it reports user
//! scroll events with `on_scroll`, gives the link a chance to write on the next
//! animation frame, and calls `poll` from a timer so the cooldown can expire.
//! A lock with a debounced cooldown keeps the programmatic write on one pane
//! from bouncing back as a scroll event on the other.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::trace;
use ts_rs::TS;

/// Writes closer than this to the current offset are skipped.
const MIN_WRITE_DELTA: f64 = 0.5;

/// A scrollable region. Offsets and heights are in CSS pixels.
pub trait ScrollPane {
    fn scroll_top(&self) -> f64;
    fn scroll_height(&self) -> f64;
    fn client_height(&self) -> f64;
    fn set_scroll_top(&mut self, top: f64);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PaneSide {
    Original,
    Translated,
}

impl PaneSide {
    pub fn other(self) -> Self {
        match self {
            PaneSide::Original => PaneSide::Translated,
            PaneSide::Translated => PaneSide::Original,
        }
    }
}

/// Plain pane geometry, for hosts that mirror their DOM state into the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct PaneMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl PaneMetrics {
    pub fn new(scroll_top: f64, scroll_height: f64, client_height: f64) -> Self {
        Self {
            scroll_top,
            scroll_height,
            client_height,
        }
    }
}

impl ScrollPane for PaneMetrics {
    fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    fn scroll_height(&self) -> f64 {
        self.scroll_height
    }

    fn client_height(&self) -> f64 {
        self.client_height
    }

    fn set_scroll_top(&mut self, top: f64) {
        self.scroll_top = top;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollLinkState {
    pub locked: bool,
    pub pending_unlock_at: Option<Instant>,
}

/// What the link did with a reported scroll event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDisposition {
    /// Lock taken; a sync runs on the next animation frame.
    Scheduled,
    /// Further scrolling from the locking pane; cooldown restarted.
    Debounced,
    /// Echo of our own write on the other pane.
    Suppressed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PollOutcome {
    Unlocked,
    StillLocked,
    /// The source kept moving during the cooldown; the target was caught up
    /// (to the returned offset, if a write was needed) and the cooldown restarted.
    TrailingSync(Option<f64>),
    Idle,
}

fn metric(value: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

fn scroll_range(pane: &impl ScrollPane) -> Option<f64> {
    let range = metric(pane.scroll_height()) - metric(pane.client_height());
    (range > 0.0).then_some(range)
}

/// Copy the source's scroll ratio onto the target. Returns the new target
/// offset when a write happened; non-overflowing panes are left alone.
pub fn sync_scroll(source: &impl ScrollPane, target: &mut impl ScrollPane) -> Option<f64> {
    let source_range = scroll_range(source)?;
    let target_range = scroll_range(target)?;
    let ratio = (metric(source.scroll_top()) / source_range).clamp(0.0, 1.0);
    let top = ratio * target_range;
    if (top - metric(target.scroll_top())).abs() < MIN_WRITE_DELTA {
        return None;
    }
    target.set_scroll_top(top);
    Some(top)
}

#[derive(Debug, Clone)]
pub struct ScrollLink {
    cooldown: Duration,
    state: ScrollLinkState,
    source: Option<PaneSide>,
    frame_pending: bool,
    dirty: bool,
}

impl ScrollLink {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            state: ScrollLinkState::default(),
            source: None,
            frame_pending: false,
            dirty: false,
        }
    }

    pub fn state(&self) -> ScrollLinkState {
        self.state
    }

    pub fn on_scroll(&mut self, side: PaneSide, now: Instant) -> ScrollDisposition {
        if !self.state.locked {
            self.state.locked = true;
            self.state.pending_unlock_at = Some(now + self.cooldown);
            self.source = Some(side);
            self.frame_pending = true;
            self.dirty = false;
            return ScrollDisposition::Scheduled;
        }
        if self.source == Some(side) {
            self.state.pending_unlock_at = Some(now + self.cooldown);
            self.dirty = true;
            ScrollDisposition::Debounced
        } else {
            trace!(?side, "Suppressed echo scroll");
            ScrollDisposition::Suppressed
        }
    }

    /// Run the write scheduled by the last accepted scroll event, if any.
    pub fn on_animation_frame(
        &mut self,
        original: &mut impl ScrollPane,
        translated: &mut impl ScrollPane,
    ) -> Option<f64> {
        if !self.frame_pending {
            return None;
        }
        self.frame_pending = false;
        self.sync_from_source(original, translated)
    }

    pub fn poll(
        &mut self,
        now: Instant,
        original: &mut impl ScrollPane,
        translated: &mut impl ScrollPane,
    ) -> PollOutcome {
        let Some(unlock_at) = self.state.pending_unlock_at.filter(|_| self.state.locked) else {
            return PollOutcome::Idle;
        };
        if now < unlock_at {
            return PollOutcome::StillLocked;
        }
        if self.dirty || self.frame_pending {
            self.dirty = false;
            self.frame_pending = false;
            self.state.pending_unlock_at = Some(now + self.cooldown);
            return PollOutcome::TrailingSync(self.sync_from_source(original, translated));
        }
        self.state = ScrollLinkState::default();
        self.source = None;
        PollOutcome::Unlocked
    }

    fn sync_from_source(
        &self,
        original: &mut impl ScrollPane,
        translated: &mut impl ScrollPane,
    ) -> Option<f64> {
        let written = match self.source? {
            PaneSide::Original => sync_scroll(original, translated),
            PaneSide::Translated => sync_scroll(translated, original),
        };
        if let Some(top) = written {
            trace!(source = ?self.source, top, "Synced linked pane");
        }
        written
    }
}

/// A pane pair plus the link between them; one per mounted reading view.
#[derive(Debug, Clone)]
pub struct LinkedPanes<P: ScrollPane> {
    original: P,
    translated: P,
    link: ScrollLink,
}

impl<P: ScrollPane> LinkedPanes<P> {
    pub fn new(original: P, translated: P, cooldown: Duration) -> Self {
        Self {
            original,
            translated,
            link: ScrollLink::new(cooldown),
        }
    }

    pub fn pane(&self, side: PaneSide) -> &P {
        match side {
            PaneSide::Original => &self.original,
            PaneSide::Translated => &self.translated,
        }
    }

    pub fn pane_mut(&mut self, side: PaneSide) -> &mut P {
        match side {
            PaneSide::Original => &mut self.original,
            PaneSide::Translated => &mut self.translated,
        }
    }

    pub fn link_state(&self) -> ScrollLinkState {
        self.link.state()
    }

    pub fn on_scroll(&mut self, side: PaneSide, now: Instant) -> ScrollDisposition {
        self.link.on_scroll(side, now)
    }

    pub fn on_animation_frame(&mut self) -> Option<f64> {
        self.link.on_animation_frame(&mut self.original, &mut self.translated)
    }

    pub fn poll(&mut self, now: Instant) -> PollOutcome {
        self.link.poll(now, &mut self.original, &mut self.translated)
    }
}
