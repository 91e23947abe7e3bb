//! Mods reconciliation
//!
//! Keeps the loaded beatmap's and replay's effective mods consistent:
//!
//! - With an override active, both carry the override.
//! - Without one, the beatmap carries the replay's mods (replay wins on
//!   first disagreement at load time).
//! - Removing an override restores the replay's mods as captured when it
//!   was loaded, then realigns the beatmap.
//!
//! Each operation reports whether the beatmap's effective mods changed, so
//! the caller can re-derive geometry before the next frame.

use super::{Mods, ModsOrigin};
use crate::host::{Beatmap, Replay};
use tracing::debug;

/// Precedence state among beatmap, replay and override mods.
#[derive(Debug, Clone, Default)]
pub struct ModsState {
    /// Active user override
    override_mods: Option<Mods>,
    /// Replay mods identity captured at load, before any override
    replay_original: Option<u32>,
    /// Why the current mods were chosen
    origin: ModsOrigin,
}

impl ModsState {
    /// Create an empty state (no override, nothing loaded).
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an override is active.
    pub fn is_overridden(&self) -> bool {
        self.override_mods.is_some()
    }

    /// The active override, if any.
    pub fn override_mods(&self) -> Option<Mods> {
        self.override_mods
    }

    /// Replay mods as they were when the replay was loaded.
    pub fn replay_original(&self) -> Option<Mods> {
        self.replay_original.map(Mods::from_identity)
    }

    /// Source of the currently applied mods.
    pub fn origin(&self) -> ModsOrigin {
        self.origin
    }

    /// Reconcile a freshly loaded beatmap.
    ///
    /// Returns `true` if the beatmap's mods were replaced.
    pub fn on_beatmap_loaded(
        &mut self,
        beatmap: &mut dyn Beatmap,
        replay: Option<&dyn Replay>,
    ) -> bool {
        let native = beatmap.mods();

        if let Some(forced) = self.override_mods {
            self.origin = ModsOrigin::Override;
            return force(beatmap, forced);
        }

        match replay {
            Some(replay) => {
                self.origin = ModsOrigin::Replay;
                let replay_mods = replay.mods();
                if replay_mods != native {
                    debug!(from = %native, to = %replay_mods, "beatmap mods follow replay");
                }
                force(beatmap, replay_mods)
            }
            None => {
                self.origin = ModsOrigin::Beatmap;
                false
            }
        }
    }

    /// Reconcile a freshly loaded replay.
    ///
    /// Captures the replay's incoming identity before anything is applied.
    /// Returns `true` if the beatmap's mods were replaced.
    pub fn on_replay_loaded(
        &mut self,
        replay: &mut dyn Replay,
        beatmap: Option<&mut dyn Beatmap>,
    ) -> bool {
        let incoming = replay.mods();
        self.replay_original = Some(incoming.identity());

        let target = match self.override_mods {
            Some(forced) => {
                self.origin = ModsOrigin::Override;
                replay.set_mods(forced);
                forced
            }
            None => {
                self.origin = ModsOrigin::Replay;
                incoming
            }
        };

        match beatmap {
            Some(beatmap) => force(beatmap, target),
            None => false,
        }
    }

    /// Activate `mods` as the override.
    ///
    /// Returns `true` if the beatmap's mods were replaced and its geometry
    /// must be reloaded. Re-applying the active override is a no-op.
    pub fn enable_override(
        &mut self,
        mods: Mods,
        replay: Option<&mut dyn Replay>,
        beatmap: Option<&mut dyn Beatmap>,
    ) -> bool {
        self.origin = ModsOrigin::Override;
        if self.override_mods == Some(mods) {
            return false;
        }

        debug!(mods = %mods, "mods override enabled");
        self.override_mods = Some(mods);
        if let Some(replay) = replay {
            replay.set_mods(mods);
        }

        match beatmap {
            Some(beatmap) => force(beatmap, mods),
            None => false,
        }
    }

    /// Clear the override and restore the replay's original mods.
    ///
    /// Returns `true` if the beatmap's mods were replaced and its geometry
    /// must be reloaded. Without a replay ever loaded nothing is restored.
    pub fn disable_override(
        &mut self,
        replay: Option<&mut dyn Replay>,
        beatmap: Option<&mut dyn Beatmap>,
    ) -> bool {
        self.override_mods = None;

        let Some(identity) = self.replay_original else {
            self.origin = if beatmap.is_some() {
                ModsOrigin::Beatmap
            } else {
                ModsOrigin::None
            };
            return false;
        };

        let restored = Mods::from_identity(identity);
        debug!(mods = %restored, "mods override disabled, restoring replay mods");
        self.origin = ModsOrigin::Replay;
        if let Some(replay) = replay {
            replay.set_mods(restored);
        }

        match beatmap {
            Some(beatmap) => force(beatmap, restored),
            None => false,
        }
    }
}

/// Replace the beatmap's mods if their identity differs.
fn force(beatmap: &mut dyn Beatmap, mods: Mods) -> bool {
    if beatmap.mods().identity() == mods.identity() {
        return false;
    }
    beatmap.set_mods(mods);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Entity(Mods);

    impl Beatmap for Entity {
        fn mods(&self) -> Mods {
            self.0
        }
        fn set_mods(&mut self, mods: Mods) {
            self.0 = mods;
        }
    }

    impl Replay for Entity {
        fn mods(&self) -> Mods {
            self.0
        }
        fn set_mods(&mut self, mods: Mods) {
            self.0 = mods;
        }
    }

    fn beatmap(mods: Mods) -> Entity {
        Entity(mods)
    }

    fn replay(mods: Mods) -> Entity {
        Entity(mods)
    }

    #[test]
    fn test_beatmap_alone_keeps_native_mods() {
        let mut state = ModsState::new();
        let mut map = beatmap(Mods::EASY);

        assert!(!state.on_beatmap_loaded(&mut map, None));
        assert_eq!(Beatmap::mods(&map), Mods::EASY);
        assert_eq!(state.origin(), ModsOrigin::Beatmap);
    }

    #[test]
    fn test_replay_after_beatmap_wins() {
        let mut state = ModsState::new();
        let mut map = beatmap(Mods::empty());
        let mut rep = replay(Mods::HIDDEN);

        state.on_beatmap_loaded(&mut map, None);
        assert!(state.on_replay_loaded(&mut rep, Some(&mut map)));
        assert_eq!(Beatmap::mods(&map), Mods::HIDDEN);
        assert_eq!(state.origin(), ModsOrigin::Replay);
    }

    #[test]
    fn test_beatmap_after_replay_follows_replay() {
        let mut state = ModsState::new();
        let mut map = beatmap(Mods::HARD_ROCK);
        let mut rep = replay(Mods::HIDDEN);

        assert!(!state.on_replay_loaded(&mut rep, None));
        assert!(state.on_beatmap_loaded(&mut map, Some(&rep)));
        assert_eq!(Beatmap::mods(&map), Mods::HIDDEN);
    }

    #[test]
    fn test_override_is_idempotent() {
        let mut state = ModsState::new();
        let mut map = beatmap(Mods::empty());

        state.on_beatmap_loaded(&mut map, None);
        assert!(state.enable_override(Mods::HARD_ROCK, None, Some(&mut map)));
        assert!(!state.enable_override(Mods::HARD_ROCK, None, Some(&mut map)));
        assert!(state.is_overridden());
    }

    #[test]
    fn test_override_equal_to_beatmap_skips_reload() {
        let mut state = ModsState::new();
        let mut map = beatmap(Mods::HIDDEN);

        state.on_beatmap_loaded(&mut map, None);
        assert!(!state.enable_override(Mods::HIDDEN, None, Some(&mut map)));
        assert_eq!(state.override_mods(), Some(Mods::HIDDEN));
    }

    #[test]
    fn test_replay_loaded_under_override_keeps_original() {
        let mut state = ModsState::new();
        let mut rep = replay(Mods::HIDDEN);

        state.enable_override(Mods::FLASHLIGHT, None, None);
        state.on_replay_loaded(&mut rep, None);
        assert_eq!(Replay::mods(&rep), Mods::FLASHLIGHT);
        assert_eq!(state.replay_original(), Some(Mods::HIDDEN));

        state.disable_override(Some(&mut rep), None);
        assert_eq!(Replay::mods(&rep), Mods::HIDDEN);
    }

    #[test]
    fn test_disable_without_replay_leaves_beatmap() {
        let mut state = ModsState::new();
        let mut map = beatmap(Mods::empty());

        state.on_beatmap_loaded(&mut map, None);
        state.enable_override(Mods::HARD_ROCK, None, Some(&mut map));
        assert!(!state.disable_override(None, Some(&mut map)));
        assert_eq!(Beatmap::mods(&map), Mods::HARD_ROCK);
        assert!(!state.is_overridden());
        assert_eq!(state.origin(), ModsOrigin::Beatmap);
    }
}
