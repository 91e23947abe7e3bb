//! Host collaborators
//!
//! Contracts for everything the playback core drives but does not own the
//! implementation of: the renderer, the game-logic instance, the audio
//! output, the per-frame scheduler and the loaded beatmap/replay entities.
//! Collaborators are observers and appliers only; timestamps and mods are
//! pushed to them, never read back.

pub mod audio;

pub use audio::{AudioHandler, AudioOptions, AudioOptionsUpdate, AudioTrack};

use crate::mods::Mods;
use std::sync::Arc;

/// A loaded beatmap whose effective mods the core may replace.
///
/// Mods are replaced as whole values through [`Beatmap::set_mods`], never
/// mutated in place.
pub trait Beatmap: Send {
    /// Currently effective modifier set.
    fn mods(&self) -> Mods;

    /// Replace the effective modifier set.
    fn set_mods(&mut self, mods: Mods);
}

/// A loaded replay whose effective mods the core may replace.
pub trait Replay: Send {
    /// Currently effective modifier set.
    fn mods(&self) -> Mods;

    /// Replace the effective modifier set.
    fn set_mods(&mut self, mods: Mods);
}

/// Draws the beatmap and replay cursor at the pushed timestamp.
pub trait Renderer: Send {
    /// Show a background image (encoded bytes).
    fn set_background(&mut self, image: Arc<[u8]>);

    /// Re-derive drawable geometry from the beatmap and its current mods.
    fn load_beatmap(&mut self, beatmap: &dyn Beatmap);

    /// Attach the replay to draw.
    fn load_replay(&mut self, replay: &dyn Replay);

    /// Move the render position (milliseconds).
    fn set_timestamp(&mut self, timestamp_ms: f64);
}

/// Simulates game state (judgements, score) alongside the renderer.
pub trait GameInstance: Send {
    /// Rebuild hit objects from the beatmap and its current mods.
    fn load_beatmap(&mut self, beatmap: &dyn Beatmap);

    /// Attach the replay inputs to evaluate.
    fn load_replay(&mut self, replay: &dyn Replay);

    /// Move the simulation time (milliseconds).
    fn set_time(&mut self, time_ms: f64);
}

/// Per-frame registration owned by the host environment.
///
/// While resumed, the host calls
/// [`PlaybackOrchestrator::tick`](crate::PlaybackOrchestrator::tick) once
/// per rendered frame.
pub trait FrameScheduler: Send {
    /// Start delivering frame ticks.
    fn resume(&mut self);

    /// Stop delivering frame ticks.
    fn suspend(&mut self);
}

/// Assets that accompany a beatmap.
#[derive(Debug, Clone, Default)]
pub struct BeatmapAssets {
    /// Encoded music track
    pub audio: Option<Arc<[u8]>>,
    /// Encoded background image
    pub background: Option<Arc<[u8]>>,
}

impl BeatmapAssets {
    /// Assets with only a music track.
    pub fn with_audio(audio: impl Into<Arc<[u8]>>) -> Self {
        Self {
            audio: Some(audio.into()),
            background: None,
        }
    }

    /// Attach a background image.
    pub fn background(mut self, image: impl Into<Arc<[u8]>>) -> Self {
        self.background = Some(image.into());
        self
    }
}
