//! Playback orchestration
//!
//! [`PlaybackOrchestrator`] owns the logical timeline, the mods state and
//! the loaded beatmap/replay, and pushes both to the host collaborators.
//! Everything runs on the host's thread: public calls are synchronous and
//! happen between frames, and each [`tick`](PlaybackOrchestrator::tick)
//! runs to completion. Mods changes re-send the beatmap to the renderer and
//! game instance before returning, so no frame pairs a new timestamp with
//! stale geometry.

use crate::host::{
    AudioHandler, AudioOptions, AudioOptionsUpdate, AudioTrack, Beatmap, BeatmapAssets,
    FrameScheduler, GameInstance, Renderer, Replay,
};
use crate::mods::{Mods, ModsOrigin, ModsState};
use crate::playback::{
    Clock, DriftConfig, DriftCorrector, DriftOutcome, PlaybackController, PlaybackState,
};
use crate::settings::{SettingKey, SettingValue, Settings, Subscription};
use crate::{ReplaySyncError, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Settings the orchestrator reacts to
const WATCHED_KEYS: [SettingKey; 5] = [
    SettingKey::AudioVolume,
    SettingKey::AudioOffset,
    SettingKey::AudioAutoSyncEnabled,
    SettingKey::AudioAutoSyncThresholdMs,
    SettingKey::AudioAutoSyncDetectIssue,
];

/// Collaborators the orchestrator drives
pub struct HostBindings {
    /// Draws beatmap and replay
    pub renderer: Box<dyn Renderer>,
    /// Simulates game state
    pub game: Box<dyn GameInstance>,
    /// Plays the music track
    pub audio: Box<dyn AudioHandler>,
    /// Delivers frame ticks
    pub scheduler: Box<dyn FrameScheduler>,
}

/// What one frame did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// Timestamp pushed this frame (milliseconds)
    pub timestamp_ms: f64,
    /// Drift check result
    pub drift: DriftOutcome,
}

type PendingChanges = Arc<Mutex<Vec<(SettingKey, SettingValue)>>>;

/// Top-level replay playback object
pub struct PlaybackOrchestrator {
    host: HostBindings,
    settings: Settings,
    clock: Clock,
    drift: DriftCorrector,
    mods: ModsState,
    beatmap: Option<Box<dyn Beatmap>>,
    replay: Option<Box<dyn Replay>>,
    /// Settings writes not yet applied
    pending: PendingChanges,
    _subscriptions: Vec<Subscription>,
}

impl PlaybackOrchestrator {
    /// Create a paused orchestrator at 0 ms observing `settings`.
    pub fn new(host: HostBindings, settings: Settings) -> Self {
        let pending: PendingChanges = Arc::new(Mutex::new(Vec::new()));
        let subscriptions = WATCHED_KEYS
            .iter()
            .map(|&key| {
                let queue = Arc::clone(&pending);
                settings.subscribe(key, move |key, value| queue.lock().push((key, value)))
            })
            .collect();

        PlaybackOrchestrator {
            host,
            drift: DriftCorrector::new(DriftConfig::from(&settings.values())),
            settings,
            clock: Clock::new(),
            mods: ModsState::new(),
            beatmap: None,
            replay: None,
            pending,
            _subscriptions: subscriptions,
        }
    }

    /// Load the music track and/or background that go with a beatmap.
    pub fn load_beatmap_assets(&mut self, assets: BeatmapAssets) -> Result<()> {
        self.apply_settings_changes();

        if let Some(audio) = assets.audio {
            let values = self.settings.values();
            let options = AudioOptions {
                volume: values.audio_volume,
                offset_ms: values.audio_offset,
            };
            self.host.audio.load_audio(AudioTrack::Music, audio, options)?;
            self.host.audio.set_audio_options(
                AudioTrack::Music,
                AudioOptionsUpdate::playback_rate(self.clock.rate()),
            );
            debug!(volume = options.volume, offset_ms = options.offset_ms, "music loaded");
        }
        if let Some(background) = assets.background {
            self.host.renderer.set_background(background);
        }
        Ok(())
    }

    /// Load a beatmap, reconciling its mods with any replay or override.
    pub fn load_beatmap(&mut self, mut beatmap: Box<dyn Beatmap>) {
        self.apply_settings_changes();

        self.mods
            .on_beatmap_loaded(beatmap.as_mut(), self.replay.as_deref());
        debug!(mods = %beatmap.mods(), origin = ?self.mods.origin(), "beatmap loaded");

        let timestamp = self.clock.timestamp();
        self.host.renderer.load_beatmap(beatmap.as_ref());
        self.host.game.load_beatmap(beatmap.as_ref());
        self.host.renderer.set_timestamp(timestamp);
        self.host.game.set_time(timestamp);
        self.beatmap = Some(beatmap);
    }

    /// Load a replay, reconciling the beatmap's mods with it.
    pub fn load_replay(&mut self, mut replay: Box<dyn Replay>) {
        self.apply_settings_changes();

        let changed = self
            .mods
            .on_replay_loaded(replay.as_mut(), beatmap_mut(&mut self.beatmap));
        debug!(mods = %replay.mods(), beatmap_changed = changed, "replay loaded");
        if changed {
            self.reload_beatmap_geometry();
        }

        self.host.renderer.load_replay(replay.as_ref());
        self.host.game.load_replay(replay.as_ref());
        self.replay = Some(replay);
    }

    /// Force `mods` onto the loaded beatmap and replay until disabled.
    pub fn enable_mods_override(&mut self, mods: Mods) {
        self.apply_settings_changes();

        let reload = self.mods.enable_override(
            mods,
            replay_mut(&mut self.replay),
            beatmap_mut(&mut self.beatmap),
        );
        if reload {
            self.reload_beatmap_geometry();
        }
    }

    /// Drop the override and restore the replay's original mods.
    pub fn disable_mods_override(&mut self) {
        self.apply_settings_changes();

        let reload = self
            .mods
            .disable_override(replay_mut(&mut self.replay), beatmap_mut(&mut self.beatmap));
        if reload {
            self.reload_beatmap_geometry();
        }
    }

    /// Start playback, measuring the first frame from `now`.
    pub fn play_at(&mut self, now: Instant) {
        self.apply_settings_changes();

        self.clock.play(now);
        self.host
            .audio
            .seek_audio(AudioTrack::Music, self.clock.timestamp() / 1000.0);
        self.host.audio.play_audio(AudioTrack::Music);
        self.host.scheduler.resume();
    }

    /// Jump to `timestamp_ms`, while paused or playing.
    pub fn seek(&mut self, timestamp_ms: f64) {
        self.apply_settings_changes();

        debug!(timestamp_ms, "seek");
        self.clock.seek(timestamp_ms);
        if self.beatmap.is_some() {
            self.host.renderer.set_timestamp(timestamp_ms);
        }
        self.host
            .audio
            .seek_audio(AudioTrack::Music, timestamp_ms / 1000.0);
    }

    /// Advance one frame.
    ///
    /// Returns `None` while paused. Without a beatmap the timestamp still
    /// advances but nothing is pushed.
    pub fn tick(&mut self, now: Instant) -> Option<TickReport> {
        self.apply_settings_changes();

        let timestamp_ms = self.clock.advance(now)?;
        if self.beatmap.is_none() {
            return Some(TickReport {
                timestamp_ms,
                drift: DriftOutcome::Skipped,
            });
        }

        self.host.renderer.set_timestamp(timestamp_ms);
        self.host.game.set_time(timestamp_ms);

        let drift = self
            .drift
            .correct(timestamp_ms, now, self.host.audio.as_mut());
        if drift == DriftOutcome::AutoSyncDisabled {
            if let Err(e) = self.settings.set(SettingKey::AudioAutoSyncEnabled, false) {
                warn!("Failed to persist disabled auto-sync: {}", e);
            }
        }

        Some(TickReport {
            timestamp_ms,
            drift,
        })
    }

    /// Current playback rate
    pub fn playback_rate(&self) -> f64 {
        self.clock.rate()
    }

    /// Change the playback rate; audio is reconfigured immediately.
    pub fn set_playback_rate(&mut self, rate: f64) -> Result<()> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(ReplaySyncError::InvalidPlaybackRate(rate));
        }
        self.apply_settings_changes();

        self.clock.set_rate(rate);
        self.host
            .audio
            .set_audio_options(AudioTrack::Music, AudioOptionsUpdate::playback_rate(rate));
        Ok(())
    }

    /// Current timestamp (milliseconds)
    pub fn timestamp(&self) -> f64 {
        self.clock.timestamp()
    }

    /// Whether playback is paused
    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    /// Whether a mods override is active
    pub fn is_mods_overridden(&self) -> bool {
        self.mods.is_overridden()
    }

    /// Why the current mods were chosen
    pub fn mods_origin(&self) -> ModsOrigin {
        self.mods.origin()
    }

    /// Mods currently applied to the loaded content
    pub fn active_mods(&self) -> Option<Mods> {
        self.mods
            .override_mods()
            .or_else(|| self.replay.as_ref().map(|replay| replay.mods()))
            .or_else(|| self.beatmap.as_ref().map(|beatmap| beatmap.mods()))
    }

    /// Loaded beatmap
    pub fn beatmap(&self) -> Option<&dyn Beatmap> {
        self.beatmap.as_deref()
    }

    /// Loaded replay
    pub fn replay(&self) -> Option<&dyn Replay> {
        self.replay.as_deref()
    }

    /// Observed settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Drift corrector configuration in effect
    pub fn drift_config(&self) -> DriftConfig {
        self.drift.config()
    }

    /// Audio resyncs counted in the current detection window
    pub fn drift_corrections(&self) -> u32 {
        self.drift.correction_count()
    }

    /// Apply settings writes queued by the subscriptions.
    fn apply_settings_changes(&mut self) {
        let changes = std::mem::take(&mut *self.pending.lock());
        for (key, value) in changes {
            match (key, value) {
                (SettingKey::AudioVolume, SettingValue::Number(volume)) => {
                    self.host
                        .audio
                        .set_audio_options(AudioTrack::Music, AudioOptionsUpdate::volume(volume));
                }
                (SettingKey::AudioOffset, SettingValue::Number(offset)) => {
                    self.host.audio.set_audio_options(
                        AudioTrack::Music,
                        AudioOptionsUpdate::offset_ms(offset),
                    );
                }
                _ => self
                    .drift
                    .set_config(DriftConfig::from(&self.settings.values())),
            }
        }
    }

    /// Re-derive geometry after the beatmap's mods changed.
    fn reload_beatmap_geometry(&mut self) {
        if let Some(beatmap) = self.beatmap.as_deref() {
            debug!(mods = %beatmap.mods(), "reloading beatmap geometry");
            self.host.renderer.load_beatmap(beatmap);
            self.host.game.load_beatmap(beatmap);
        }
    }
}

impl PlaybackController for PlaybackOrchestrator {
    fn play(&mut self) {
        self.play_at(Instant::now());
    }

    fn pause(&mut self) {
        self.apply_settings_changes();

        self.clock.pause();
        self.host.audio.pause_audio(AudioTrack::Music);
        self.host.scheduler.suspend();
    }

    fn state(&self) -> PlaybackState {
        self.clock.state()
    }
}

fn beatmap_mut(slot: &mut Option<Box<dyn Beatmap>>) -> Option<&mut dyn Beatmap> {
    slot.as_mut().map(|beatmap| beatmap.as_mut() as &mut dyn Beatmap)
}

fn replay_mut(slot: &mut Option<Box<dyn Replay>>) -> Option<&mut dyn Replay> {
    slot.as_mut().map(|replay| replay.as_mut() as &mut dyn Replay)
}
