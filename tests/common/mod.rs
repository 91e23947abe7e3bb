//! Recording collaborators shared by the integration tests

#![allow(dead_code)]

use parking_lot::Mutex;
use replay_sync::{
    AudioHandler, AudioOptions, AudioOptionsUpdate, AudioTrack, Beatmap, FrameScheduler,
    GameInstance, HostBindings, Mods, PlaybackOrchestrator, Renderer, Replay, Settings,
};
use std::sync::Arc;

/// Everything the host collaborators were asked to do
#[derive(Debug, Default)]
pub struct HostLog {
    pub backgrounds: usize,
    /// Mods of each beatmap sent to the renderer
    pub renderer_beatmaps: Vec<Mods>,
    pub renderer_replays: Vec<Mods>,
    pub renderer_timestamps: Vec<f64>,
    pub game_beatmaps: Vec<Mods>,
    pub game_replays: Vec<Mods>,
    pub game_times: Vec<f64>,
    pub audio_loaded: Option<AudioOptions>,
    pub audio_updates: Vec<AudioOptionsUpdate>,
    /// Every audio seek, in seconds
    pub audio_seeks: Vec<f64>,
    pub audio_playing: bool,
    /// Reported device position (milliseconds)
    pub audio_position_ms: f64,
    pub audio_offset_ms: f64,
    pub frames_active: bool,
}

pub type SharedLog = Arc<Mutex<HostLog>>;

pub struct TestBeatmap(pub Mods);

impl Beatmap for TestBeatmap {
    fn mods(&self) -> Mods {
        self.0
    }
    fn set_mods(&mut self, mods: Mods) {
        self.0 = mods;
    }
}

pub struct TestReplay(pub Mods);

impl Replay for TestReplay {
    fn mods(&self) -> Mods {
        self.0
    }
    fn set_mods(&mut self, mods: Mods) {
        self.0 = mods;
    }
}

struct RecordingRenderer(SharedLog);

impl Renderer for RecordingRenderer {
    fn set_background(&mut self, _image: Arc<[u8]>) {
        self.0.lock().backgrounds += 1;
    }
    fn load_beatmap(&mut self, beatmap: &dyn Beatmap) {
        self.0.lock().renderer_beatmaps.push(beatmap.mods());
    }
    fn load_replay(&mut self, replay: &dyn Replay) {
        self.0.lock().renderer_replays.push(replay.mods());
    }
    fn set_timestamp(&mut self, timestamp_ms: f64) {
        self.0.lock().renderer_timestamps.push(timestamp_ms);
    }
}

struct RecordingGame(SharedLog);

impl GameInstance for RecordingGame {
    fn load_beatmap(&mut self, beatmap: &dyn Beatmap) {
        self.0.lock().game_beatmaps.push(beatmap.mods());
    }
    fn load_replay(&mut self, replay: &dyn Replay) {
        self.0.lock().game_replays.push(replay.mods());
    }
    fn set_time(&mut self, time_ms: f64) {
        self.0.lock().game_times.push(time_ms);
    }
}

struct RecordingAudio(SharedLog);

impl AudioHandler for RecordingAudio {
    fn load_audio(
        &mut self,
        _track: AudioTrack,
        _source: Arc<[u8]>,
        options: AudioOptions,
    ) -> replay_sync::Result<()> {
        let mut log = self.0.lock();
        log.audio_loaded = Some(options);
        log.audio_offset_ms = options.offset_ms;
        Ok(())
    }
    fn set_audio_options(&mut self, _track: AudioTrack, update: AudioOptionsUpdate) {
        let mut log = self.0.lock();
        if let Some(offset) = update.offset_ms {
            log.audio_offset_ms = offset;
        }
        log.audio_updates.push(update);
    }
    fn play_audio(&mut self, _track: AudioTrack) {
        self.0.lock().audio_playing = true;
    }
    fn pause_audio(&mut self, _track: AudioTrack) {
        self.0.lock().audio_playing = false;
    }
    fn seek_audio(&mut self, _track: AudioTrack, seconds: f64) {
        self.0.lock().audio_seeks.push(seconds);
    }
    fn current_time_ms(&self, _track: AudioTrack) -> f64 {
        self.0.lock().audio_position_ms
    }
    fn offset_ms(&self, _track: AudioTrack) -> f64 {
        self.0.lock().audio_offset_ms
    }
}

struct RecordingScheduler(SharedLog);

impl FrameScheduler for RecordingScheduler {
    fn resume(&mut self) {
        self.0.lock().frames_active = true;
    }
    fn suspend(&mut self) {
        self.0.lock().frames_active = false;
    }
}

/// Orchestrator wired to recording collaborators
pub fn viewer_with(settings: Settings) -> (PlaybackOrchestrator, SharedLog) {
    let log = SharedLog::default();
    let host = HostBindings {
        renderer: Box::new(RecordingRenderer(Arc::clone(&log))),
        game: Box::new(RecordingGame(Arc::clone(&log))),
        audio: Box::new(RecordingAudio(Arc::clone(&log))),
        scheduler: Box::new(RecordingScheduler(Arc::clone(&log))),
    };
    (PlaybackOrchestrator::new(host, settings), log)
}

pub fn viewer() -> (PlaybackOrchestrator, SharedLog) {
    viewer_with(Settings::default())
}

pub fn beatmap(identity: u32) -> Box<TestBeatmap> {
    Box::new(TestBeatmap(Mods::from_identity(identity)))
}

pub fn replay(identity: u32) -> Box<TestReplay> {
    Box::new(TestReplay(Mods::from_identity(identity)))
}

/// Identity of the loaded beatmap's mods
pub fn beatmap_identity(viewer: &PlaybackOrchestrator) -> u32 {
    viewer.beatmap().expect("beatmap loaded").mods().identity()
}

/// Identity of the loaded replay's mods
pub fn replay_identity(viewer: &PlaybackOrchestrator) -> u32 {
    viewer.replay().expect("replay loaded").mods().identity()
}
