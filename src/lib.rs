//! Replay playback synchronization core
//!
//! Owns the single logical timeline of a rhythm-game replay viewer and keeps
//! an independently clocked audio output and a renderer/game-logic pair in
//! step with it. Also reconciles the modifiers ("mods") coming from a loaded
//! beatmap, a loaded replay and an optional user override.
//!
//! # Features
//! - Frame-driven playback clock with seek, pause/resume and playback rate
//! - Audio drift correction with feedback-loop detection
//! - Mods precedence: override > replay > beatmap, reversible overrides
//! - Observable settings with disposable subscriptions
//!
//! # Crate feature flags
//! - `cli` (default): headless demo binary (`anyhow`, `tracing-subscriber`)
//!
//! # Quick start
//! ```no_run
//! use replay_sync::{HostBindings, Mods, PlaybackController, PlaybackOrchestrator, Settings};
//! # fn bindings() -> HostBindings { unimplemented!() }
//! # fn beatmap() -> Box<dyn replay_sync::Beatmap> { unimplemented!() }
//! # fn replay() -> Box<dyn replay_sync::Replay> { unimplemented!() }
//! let mut viewer = PlaybackOrchestrator::new(bindings(), Settings::default());
//! viewer.load_beatmap(beatmap());
//! viewer.load_replay(replay());
//! viewer.enable_mods_override(Mods::HIDDEN | Mods::HARD_ROCK);
//! viewer.play();
//! // host: call viewer.tick(Instant::now()) once per rendered frame
//! ```

#![warn(missing_docs)]

pub mod host; // Collaborator contracts
pub mod mods; // Modifier sets and reconciliation
pub mod orchestrator; // Top-level playback object
pub mod playback; // Clock and drift correction
pub mod settings; // Observable configuration

/// Error types for replay playback operations
#[derive(thiserror::Error, Debug)]
pub enum ReplaySyncError {
    /// Playback rate must be finite and strictly positive
    #[error("Invalid playback rate: {0}")]
    InvalidPlaybackRate(f64),

    /// A settings key was written with a value of the wrong kind
    #[error("Setting {key} expects a {expected} value")]
    SettingType {
        /// Key that was written
        key: settings::SettingKey,
        /// Kind of value the key holds
        expected: &'static str,
    },

    /// Audio collaborator failed to load a track
    #[error("Audio error: {0}")]
    Audio(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Settings document could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for replay playback operations
pub type Result<T> = std::result::Result<T, ReplaySyncError>;

// Public API exports
pub use host::{
    AudioHandler, AudioOptions, AudioOptionsUpdate, AudioTrack, Beatmap, BeatmapAssets,
    FrameScheduler, GameInstance, Renderer, Replay,
};
pub use mods::{Mods, ModsOrigin, ModsState};
pub use orchestrator::{HostBindings, PlaybackOrchestrator, TickReport};
pub use playback::{
    Clock, CorrectionCounter, DriftConfig, DriftCorrector, DriftOutcome, PlaybackController,
    PlaybackState,
};
pub use settings::{SettingKey, SettingValue, Settings, SettingsValues, Subscription};
