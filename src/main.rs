#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!(
        "The replay-sync demo requires the \"cli\" feature. Rebuild with `--features cli` to enable it."
    );
}

#[cfg(feature = "cli")]
mod cli {
    use std::env;
    use std::fs;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use anyhow::Context;
    use parking_lot::Mutex;
    use replay_sync::{
        AudioHandler, AudioOptions, AudioOptionsUpdate, AudioTrack, Beatmap, BeatmapAssets,
        DriftOutcome, FrameScheduler, GameInstance, HostBindings, Mods, PlaybackController,
        PlaybackOrchestrator, Renderer, Replay, Settings,
    };
    use tracing::info;
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    const FRAME: Duration = Duration::from_micros(16_667);
    const DEFAULT_FRAMES: u32 = 600;
    /// Simulated device runs this much faster than the logical clock
    const AUDIO_SKEW: f64 = 1.004;

    struct DemoBeatmap(Mods);

    impl Beatmap for DemoBeatmap {
        fn mods(&self) -> Mods {
            self.0
        }
        fn set_mods(&mut self, mods: Mods) {
            self.0 = mods;
        }
    }

    struct DemoReplay(Mods);

    impl Replay for DemoReplay {
        fn mods(&self) -> Mods {
            self.0
        }
        fn set_mods(&mut self, mods: Mods) {
            self.0 = mods;
        }
    }

    struct NullRenderer;

    impl Renderer for NullRenderer {
        fn set_background(&mut self, image: Arc<[u8]>) {
            info!(bytes = image.len(), "background set");
        }
        fn load_beatmap(&mut self, beatmap: &dyn Beatmap) {
            info!(mods = %beatmap.mods(), "renderer: geometry built");
        }
        fn load_replay(&mut self, replay: &dyn Replay) {
            info!(mods = %replay.mods(), "renderer: replay attached");
        }
        fn set_timestamp(&mut self, _timestamp_ms: f64) {}
    }

    struct NullGame;

    impl GameInstance for NullGame {
        fn load_beatmap(&mut self, _beatmap: &dyn Beatmap) {}
        fn load_replay(&mut self, _replay: &dyn Replay) {}
        fn set_time(&mut self, _time_ms: f64) {}
    }

    struct NullScheduler;

    impl FrameScheduler for NullScheduler {
        fn resume(&mut self) {}
        fn suspend(&mut self) {}
    }

    /// Audio device running on its own (slightly fast) clock
    struct SimulatedAudio {
        position_ms: f64,
        offset_ms: f64,
        rate: f64,
        playing: bool,
    }

    impl SimulatedAudio {
        fn advance(&mut self, elapsed: Duration) {
            if self.playing {
                self.position_ms += elapsed.as_secs_f64() * 1000.0 * self.rate * AUDIO_SKEW;
            }
        }
    }

    impl AudioHandler for SimulatedAudio {
        fn load_audio(
            &mut self,
            _track: AudioTrack,
            source: Arc<[u8]>,
            options: AudioOptions,
        ) -> replay_sync::Result<()> {
            info!(bytes = source.len(), volume = options.volume, "audio loaded");
            self.offset_ms = options.offset_ms;
            Ok(())
        }
        fn set_audio_options(&mut self, _track: AudioTrack, update: AudioOptionsUpdate) {
            if let Some(rate) = update.playback_rate {
                self.rate = rate;
            }
            if let Some(offset) = update.offset_ms {
                self.offset_ms = offset;
            }
        }
        fn play_audio(&mut self, _track: AudioTrack) {
            self.playing = true;
        }
        fn pause_audio(&mut self, _track: AudioTrack) {
            self.playing = false;
        }
        fn seek_audio(&mut self, _track: AudioTrack, seconds: f64) {
            self.position_ms = seconds * 1000.0 + self.offset_ms;
        }
        fn current_time_ms(&self, _track: AudioTrack) -> f64 {
            self.position_ms
        }
        fn offset_ms(&self, _track: AudioTrack) -> f64 {
            self.offset_ms
        }
    }

    /// Shares the simulated device between the orchestrator and the frame loop
    struct SharedAudio(Arc<Mutex<SimulatedAudio>>);

    impl SharedAudio {
        fn with<R>(&self, f: impl FnOnce(&mut SimulatedAudio) -> R) -> R {
            f(&mut self.0.lock())
        }
    }

    impl AudioHandler for SharedAudio {
        fn load_audio(
            &mut self,
            track: AudioTrack,
            source: Arc<[u8]>,
            options: AudioOptions,
        ) -> replay_sync::Result<()> {
            self.with(|a| a.load_audio(track, source, options))
        }
        fn set_audio_options(&mut self, track: AudioTrack, update: AudioOptionsUpdate) {
            self.with(|a| a.set_audio_options(track, update))
        }
        fn play_audio(&mut self, track: AudioTrack) {
            self.with(|a| a.play_audio(track))
        }
        fn pause_audio(&mut self, track: AudioTrack) {
            self.with(|a| a.pause_audio(track))
        }
        fn seek_audio(&mut self, track: AudioTrack, seconds: f64) {
            self.with(|a| a.seek_audio(track, seconds))
        }
        fn current_time_ms(&self, track: AudioTrack) -> f64 {
            self.with(|a| a.current_time_ms(track))
        }
        fn offset_ms(&self, track: AudioTrack) -> f64 {
            self.with(|a| a.offset_ms(track))
        }
    }

    pub fn run() -> anyhow::Result<()> {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "replay_sync=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer())
            .init();

        let args: Vec<String> = env::args().collect();
        let settings = match args.get(1) {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read settings '{}'", path))?;
                Settings::from_json(&json)?
            }
            None => Settings::default(),
        };
        let frames: u32 = match args.get(2) {
            Some(n) => n.parse().context("frame count must be a number")?,
            None => DEFAULT_FRAMES,
        };

        let device = Arc::new(Mutex::new(SimulatedAudio {
            position_ms: 0.0,
            offset_ms: 0.0,
            rate: 1.0,
            playing: false,
        }));
        let monitor = SharedAudio(Arc::clone(&device));

        let mut viewer = PlaybackOrchestrator::new(
            HostBindings {
                renderer: Box::new(NullRenderer),
                game: Box::new(NullGame),
                audio: Box::new(SharedAudio(device)),
                scheduler: Box::new(NullScheduler),
            },
            settings,
        );

        viewer.load_beatmap_assets(BeatmapAssets::with_audio(vec![0u8; 1024]))?;
        viewer.load_beatmap(Box::new(DemoBeatmap(Mods::empty())));
        viewer.load_replay(Box::new(DemoReplay(Mods::HIDDEN)));
        viewer.enable_mods_override(Mods::HIDDEN | Mods::HARD_ROCK);
        viewer.set_playback_rate(1.5)?;

        let start = Instant::now();
        viewer.play_at(start);

        let mut resyncs = 0u32;
        for frame in 1..=frames {
            monitor.with(|audio| audio.advance(FRAME));
            let now = start + FRAME * frame;
            if let Some(report) = viewer.tick(now) {
                match report.drift {
                    DriftOutcome::Resynced { .. } => resyncs += 1,
                    DriftOutcome::AutoSyncDisabled => info!(frame, "auto-sync disabled"),
                    _ => {}
                }
            }
        }
        viewer.pause();
        viewer.disable_mods_override();

        println!(
            "Played {} frames: timestamp {:.1} ms, {} resyncs, mods {}",
            frames,
            viewer.timestamp(),
            resyncs,
            viewer.active_mods().unwrap_or_default()
        );
        Ok(())
    }
}

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    cli::run()
}
