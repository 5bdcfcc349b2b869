//! PlaybackController: navigation and timed auto-play over one [`Trace`].
//!
//! The controller never owns a clock. Hosts call [`PlaybackController::tick`] with the time that
//! passed since the previous tick (from a frame loop, a timer or a test); the controller turns
//! that into zero or more `next()` calls. All navigation goes through `&mut self`, so timer steps
//! and user actions are serialized by construction.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use stepgraph_core::highlight;
use stepgraph_core::{Highlight, PlaybackConfig, Trace};

pub type ListenerId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackMode {
    /// No trace, or an empty one.
    Idle,
    Ready,
    Playing,
    Paused,
    /// Advanced past the last step. Still seekable.
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub current_step_index: usize,
    pub mode: PlaybackMode,
    pub speed_multiplier: f64,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            current_step_index: 0,
            mode: PlaybackMode::Idle,
            speed_multiplier: 1.0,
        }
    }
}

/// Sent to subscribers whenever the current step changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepChanged {
    pub index: usize,
    pub highlight: Highlight,
    /// Source line for the editor, if the step carries one.
    pub line: Option<u32>,
}

type Listener = Box<dyn FnMut(&StepChanged) + Send>;

pub struct PlaybackController {
    trace: Arc<Trace>,
    state: PlaybackState,
    config: PlaybackConfig,
    /// Base interval of the running timer; `None` while not playing.
    interval_ms: Option<u64>,
    /// Time accumulated towards the next timer step.
    pending: Duration,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener_id: ListenerId,
}

impl fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackController")
            .field("steps", &self.trace.len())
            .field("state", &self.state)
            .field("interval_ms", &self.interval_ms)
            .field("pending", &self.pending)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new(PlaybackConfig::default())
    }
}

impl PlaybackController {
    pub fn new(config: PlaybackConfig) -> Self {
        Self {
            trace: Arc::new(Trace::default()),
            state: PlaybackState::default(),
            config,
            interval_ms: None,
            pending: Duration::ZERO,
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    /// Replaces the trace and resets the playback state. Subscriptions are kept.
    ///
    /// A non-empty trace enters `Ready` at step 0 and notifies subscribers; an empty one leaves
    /// the controller `Idle`.
    pub fn load(&mut self, trace: Arc<Trace>) {
        self.trace = trace;
        self.state = PlaybackState::default();
        self.stop_timer();
        if self.trace.is_empty() {
            return;
        }
        self.state.mode = PlaybackMode::Ready;
        self.notify();
    }

    pub fn trace(&self) -> &Arc<Trace> {
        &self.trace
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current_step_index(&self) -> usize {
        self.state.current_step_index
    }

    pub fn mode(&self) -> PlaybackMode {
        self.state.mode
    }

    pub fn len(&self) -> usize {
        self.trace.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trace.is_empty()
    }

    pub fn is_playing(&self) -> bool {
        self.state.mode == PlaybackMode::Playing
    }

    /// Recomputed from scratch on every call.
    pub fn highlight(&self) -> Highlight {
        highlight::resolve(&self.trace, self.state.current_step_index)
    }

    fn last_index(&self) -> Option<usize> {
        self.trace.len().checked_sub(1)
    }

    pub fn first(&mut self) -> bool {
        self.go_to(0)
    }

    pub fn last(&mut self) -> bool {
        match self.last_index() {
            Some(last) => self.go_to(last),
            None => false,
        }
    }

    /// Advances one step. At the last step the index stays put and the controller is `Finished`.
    pub fn next(&mut self) -> bool {
        let Some(last) = self.last_index() else {
            return false;
        };
        if self.state.current_step_index >= last {
            self.stop_timer();
            self.state.mode = PlaybackMode::Finished;
            return false;
        }
        self.go_to(self.state.current_step_index + 1)
    }

    pub fn prev(&mut self) -> bool {
        match self.state.current_step_index.checked_sub(1) {
            Some(ix) => self.go_to(ix),
            None => false,
        }
    }

    /// Jumps to `index`, clamped to the trace.
    pub fn seek(&mut self, index: usize) -> bool {
        match self.last_index() {
            Some(last) => self.go_to(index.min(last)),
            None => false,
        }
    }

    fn go_to(&mut self, index: usize) -> bool {
        if self.state.mode == PlaybackMode::Idle || index == self.state.current_step_index {
            return false;
        }
        self.state.current_step_index = index;
        if self.state.mode == PlaybackMode::Finished {
            self.state.mode = PlaybackMode::Ready;
        }
        self.notify();
        true
    }

    /// Starts auto-play with one step every `interval_ms / speedMultiplier` milliseconds.
    ///
    /// No-op while already playing or without a trace. Playing from the last step starts over
    /// from step 0.
    pub fn play(&mut self, interval_ms: u64) -> bool {
        if matches!(self.state.mode, PlaybackMode::Idle | PlaybackMode::Playing) {
            return false;
        }
        if Some(self.state.current_step_index) == self.last_index() {
            self.first();
        }
        self.interval_ms = Some(interval_ms.max(1));
        self.pending = Duration::ZERO;
        self.state.mode = PlaybackMode::Playing;
        tracing::debug!(interval_ms, speed = self.state.speed_multiplier, "playback started");
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.state.mode != PlaybackMode::Playing {
            return false;
        }
        self.stop_timer();
        self.state.mode = PlaybackMode::Paused;
        true
    }

    /// Play with the configured interval, or pause.
    pub fn toggle(&mut self) -> bool {
        if self.is_playing() {
            self.pause()
        } else {
            self.play(self.config.interval_ms)
        }
    }

    /// Clamps to the configured range; returns the multiplier in effect.
    pub fn set_speed(&mut self, multiplier: f64) -> f64 {
        if multiplier.is_finite() {
            self.state.speed_multiplier =
                multiplier.clamp(self.config.min_speed, self.config.max_speed);
        }
        self.state.speed_multiplier
    }

    /// Effective time between timer steps, while playing.
    pub fn tick_period(&self) -> Option<Duration> {
        let interval_ms = self.interval_ms?;
        let ms = interval_ms as f64 / self.state.speed_multiplier;
        Some(Duration::from_secs_f64(ms / 1000.0))
    }

    /// Feeds elapsed time to the auto-play timer and returns how many steps it advanced.
    ///
    /// Reaching the last step pauses playback and marks the controller `Finished`.
    pub fn tick(&mut self, elapsed: Duration) -> usize {
        let Some(period) = self.tick_period() else {
            return 0;
        };
        self.pending = self.pending.saturating_add(elapsed);
        let mut advanced = 0;
        while self.is_playing() && self.pending >= period {
            self.pending -= period;
            if self.next() {
                advanced += 1;
            }
            if Some(self.state.current_step_index) == self.last_index() && self.pause() {
                self.state.mode = PlaybackMode::Finished;
                tracing::debug!(steps = self.trace.len(), "playback reached the last step");
            }
        }
        advanced
    }

    fn stop_timer(&mut self) {
        self.interval_ms = None;
        self.pending = Duration::ZERO;
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&StepChanged) + Send + 'static) -> ListenerId {
        let id = self.next_listener_id;
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    fn notify(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        let index = self.state.current_step_index;
        let event = StepChanged {
            index,
            highlight: highlight::resolve(&self.trace, index),
            line: self.trace.line_at(index),
        };
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }
}
