//! Logical playback clock
//!
//! Accumulates wall-clock time between frames, scaled by the playback rate,
//! into a millisecond timestamp. The clock is the single source of truth for
//! the timeline; audio is realigned to it, never the other way round.

use super::PlaybackState;
use std::time::Instant;

/// Frame-driven playback clock
#[derive(Debug, Clone)]
pub struct Clock {
    /// Logical position (milliseconds)
    timestamp_ms: f64,
    /// Multiplier applied to elapsed wall-clock time
    rate: f64,
    /// Current state
    state: PlaybackState,
    /// Wall-clock time of the last advance
    last_tick: Option<Instant>,
}

impl Clock {
    /// Create a paused clock at 0 ms, rate 1.0
    pub fn new() -> Self {
        Clock {
            timestamp_ms: 0.0,
            rate: 1.0,
            state: PlaybackState::Paused,
            last_tick: None,
        }
    }

    /// Unpause, measuring the next frame from `now`
    pub fn play(&mut self, now: Instant) {
        self.state = PlaybackState::Playing;
        self.last_tick = Some(now);
    }

    /// Pause, freezing the timestamp
    pub fn pause(&mut self) {
        self.state = PlaybackState::Paused;
    }

    /// Jump to `timestamp_ms` (valid while paused or playing)
    pub fn seek(&mut self, timestamp_ms: f64) {
        self.timestamp_ms = timestamp_ms;
    }

    /// Advance by the time elapsed since the last frame.
    ///
    /// Returns the new timestamp, or `None` while paused.
    pub fn advance(&mut self, now: Instant) -> Option<f64> {
        if self.state == PlaybackState::Paused {
            return None;
        }

        let last = self.last_tick.unwrap_or(now);
        let elapsed_ms = now.saturating_duration_since(last).as_nanos() as f64 / 1_000_000.0;
        self.timestamp_ms += elapsed_ms * self.rate;
        self.last_tick = Some(now);
        Some(self.timestamp_ms)
    }

    /// Current timestamp (milliseconds)
    pub fn timestamp(&self) -> f64 {
        self.timestamp_ms
    }

    /// Current playback rate
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Set the playback rate; takes effect from the next frame
    pub fn set_rate(&mut self, rate: f64) {
        self.rate = rate;
    }

    /// Current state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Whether the clock is paused
    pub fn is_paused(&self) -> bool {
        self.state == PlaybackState::Paused
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
