//! Playback Engine
//!
//! Frame-driven logical clock and the drift corrector that keeps the audio
//! device aligned with it.

pub mod clock;
pub mod correction_counter;
pub mod drift;

pub use clock::Clock;
pub use correction_counter::CorrectionCounter;
pub use drift::{DriftConfig, DriftCorrector, DriftOutcome};

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Timeline frozen (initial state)
    #[default]
    Paused,
    /// Timeline advancing every frame
    Playing,
}

/// Transport control shared by playback objects
pub trait PlaybackController {
    /// Start or resume playback
    fn play(&mut self);

    /// Pause playback, keeping the position
    fn pause(&mut self);

    /// Get current playback state
    fn state(&self) -> PlaybackState;

    /// Check if currently playing
    fn is_playing(&self) -> bool {
        self.state() == PlaybackState::Playing
    }
}
