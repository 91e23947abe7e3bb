//! Audio output contract
//!
//! The audio handler plays decoded tracks on its own hardware clock. The
//! core only seeks, starts, pauses and reads back positions; all seeks are
//! in seconds, all reported positions in milliseconds.

use crate::Result;
use std::sync::Arc;

/// Track slots managed by the audio handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioTrack {
    /// The beatmap's music
    Music,
}

/// Options applied when a track is loaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioOptions {
    /// Volume (0.0 = silent, 1.0 = full)
    pub volume: f64,
    /// Offset between reported and heard position (milliseconds)
    pub offset_ms: f64,
}

/// Partial update of a loaded track's options.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AudioOptionsUpdate {
    /// New volume
    pub volume: Option<f64>,
    /// New offset (milliseconds)
    pub offset_ms: Option<f64>,
    /// New playback rate multiplier
    pub playback_rate: Option<f64>,
}

impl AudioOptionsUpdate {
    /// Update only the volume.
    pub fn volume(volume: f64) -> Self {
        Self {
            volume: Some(volume),
            ..Self::default()
        }
    }

    /// Update only the offset.
    pub fn offset_ms(offset_ms: f64) -> Self {
        Self {
            offset_ms: Some(offset_ms),
            ..Self::default()
        }
    }

    /// Update only the playback rate.
    pub fn playback_rate(rate: f64) -> Self {
        Self {
            playback_rate: Some(rate),
            ..Self::default()
        }
    }
}

/// Independently clocked audio output.
pub trait AudioHandler: Send {
    /// Decode and attach `source` to `track`.
    fn load_audio(&mut self, track: AudioTrack, source: Arc<[u8]>, options: AudioOptions)
        -> Result<()>;

    /// Change options of a loaded track. Unset fields are left alone.
    fn set_audio_options(&mut self, track: AudioTrack, update: AudioOptionsUpdate);

    /// Start or resume the track.
    fn play_audio(&mut self, track: AudioTrack);

    /// Pause the track, keeping its position.
    fn pause_audio(&mut self, track: AudioTrack);

    /// Jump to `seconds` into the track.
    fn seek_audio(&mut self, track: AudioTrack, seconds: f64);

    /// Hardware-reported position (milliseconds).
    fn current_time_ms(&self, track: AudioTrack) -> f64;

    /// Configured offset of the track (milliseconds).
    fn offset_ms(&self, track: AudioTrack) -> f64;
}
