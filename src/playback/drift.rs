//! Audio drift correction
//!
//! Once per frame, compares the audio device's reported position against
//! the logical timestamp and re-seeks the audio when they diverge by more
//! than the configured threshold. If corrections keep firing (more than
//! [`CORRECTION_LIMIT`] inside [`CORRECTION_WINDOW`]) the corrector turns
//! itself off rather than fight the device forever; playback carries on
//! unsynchronized until auto-sync is re-enabled.

use super::correction_counter::{CorrectionCounter, CORRECTION_LIMIT, CORRECTION_WINDOW};
use crate::host::{AudioHandler, AudioTrack};
use crate::settings::SettingsValues;
use std::time::Instant;
use tracing::{trace, warn};

/// Auto-sync configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftConfig {
    /// Whether drift correction runs
    pub enabled: bool,
    /// Divergence tolerated before re-seeking audio (milliseconds)
    pub threshold_ms: f64,
    /// Whether to watch for correction feedback loops
    pub detect_issue: bool,
}

impl From<&SettingsValues> for DriftConfig {
    fn from(values: &SettingsValues) -> Self {
        DriftConfig {
            enabled: values.audio_auto_sync_enabled,
            threshold_ms: values.audio_auto_sync_threshold_ms,
            detect_issue: values.audio_auto_sync_detect_issue,
        }
    }
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self::from(&SettingsValues::default())
    }
}

/// Result of one drift check
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriftOutcome {
    /// Auto-sync disabled or nothing to sync
    Skipped,
    /// Audio within threshold
    InSync {
        /// Audio minus logical position (milliseconds)
        diff_ms: f64,
    },
    /// Audio was re-seeked to the logical position
    Resynced {
        /// Divergence that triggered the seek (milliseconds)
        diff_ms: f64,
    },
    /// Correction loop detected; auto-sync switched off
    AutoSyncDisabled,
}

/// Keeps audio aligned with the logical clock
#[derive(Debug, Clone, Default)]
pub struct DriftCorrector {
    config: DriftConfig,
    counter: CorrectionCounter,
}

impl DriftCorrector {
    /// Create a corrector with the given configuration
    pub fn new(config: DriftConfig) -> Self {
        DriftCorrector {
            config,
            counter: CorrectionCounter::new(),
        }
    }

    /// Check audio against `timestamp_ms` and re-seek it if needed.
    ///
    /// `now` is the frame's wall-clock time, used for loop detection.
    pub fn correct(
        &mut self,
        timestamp_ms: f64,
        now: Instant,
        audio: &mut dyn AudioHandler,
    ) -> DriftOutcome {
        if !self.config.enabled {
            return DriftOutcome::Skipped;
        }

        let position = audio.current_time_ms(AudioTrack::Music);
        let offset = audio.offset_ms(AudioTrack::Music);
        let diff_ms = position - offset - timestamp_ms;

        if diff_ms.abs() <= self.config.threshold_ms {
            return DriftOutcome::InSync { diff_ms };
        }

        trace!(diff_ms, timestamp_ms, "audio drifted, resyncing");
        audio.seek_audio(AudioTrack::Music, timestamp_ms / 1000.0);

        if self.config.detect_issue {
            self.counter.record(now);
            if self.counter.exceeded() {
                warn!(
                    "Audio resynced more than {} times within {:?}; disabling auto-sync",
                    CORRECTION_LIMIT, CORRECTION_WINDOW
                );
                self.config.enabled = false;
                self.counter.reset();
                return DriftOutcome::AutoSyncDisabled;
            }
        }

        DriftOutcome::Resynced { diff_ms }
    }

    /// Current configuration
    pub fn config(&self) -> DriftConfig {
        self.config
    }

    /// Replace the configuration
    pub fn set_config(&mut self, config: DriftConfig) {
        self.config = config;
    }

    /// Corrections counted in the current window
    pub fn correction_count(&self) -> u32 {
        self.counter.count()
    }
}
