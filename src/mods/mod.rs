//! Modifier sets
//!
//! A [`Mods`] value is an immutable set of gameplay-altering flags. Its
//! canonical numeric identity is [`Mods::bits`]; two sets are the same mods
//! iff their identities match. Unknown bits are retained so an identity read
//! from a replay always survives a round trip through this crate.

pub mod state;

pub use state::ModsState;

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Gameplay modifier flags, keyed by their bit in the replay format.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Mods: u32 {
        /// No fail
        const NO_FAIL = 1 << 0;
        /// Easy (smaller circle size, lower difficulty)
        const EASY = 1 << 1;
        /// Touch device
        const TOUCH_DEVICE = 1 << 2;
        /// Hidden (approach circles fade out)
        const HIDDEN = 1 << 3;
        /// Hard rock (vertical flip, higher difficulty)
        const HARD_ROCK = 1 << 4;
        /// Sudden death
        const SUDDEN_DEATH = 1 << 5;
        /// Double time (1.5x speed)
        const DOUBLE_TIME = 1 << 6;
        /// Relax
        const RELAX = 1 << 7;
        /// Half time (0.75x speed)
        const HALF_TIME = 1 << 8;
        /// Nightcore (implies double time)
        const NIGHTCORE = 1 << 9;
        /// Flashlight
        const FLASHLIGHT = 1 << 10;
        /// Autoplay
        const AUTOPLAY = 1 << 11;
        /// Spun out
        const SPUN_OUT = 1 << 12;
        /// Autopilot
        const AUTOPILOT = 1 << 13;
        /// Perfect (implies sudden death)
        const PERFECT = 1 << 14;
    }
}

impl Mods {
    /// Rebuild a modifier set from its numeric identity, keeping unknown bits.
    pub fn from_identity(identity: u32) -> Self {
        Mods::from_bits_retain(identity)
    }

    /// Canonical numeric identity used for equality.
    pub fn identity(self) -> u32 {
        self.bits()
    }
}

impl fmt::Display for Mods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const ACRONYMS: [(Mods, &str); 15] = [
            (Mods::NO_FAIL, "NF"),
            (Mods::EASY, "EZ"),
            (Mods::TOUCH_DEVICE, "TD"),
            (Mods::HIDDEN, "HD"),
            (Mods::HARD_ROCK, "HR"),
            (Mods::SUDDEN_DEATH, "SD"),
            (Mods::DOUBLE_TIME, "DT"),
            (Mods::RELAX, "RX"),
            (Mods::HALF_TIME, "HT"),
            (Mods::NIGHTCORE, "NC"),
            (Mods::FLASHLIGHT, "FL"),
            (Mods::AUTOPLAY, "AT"),
            (Mods::SPUN_OUT, "SO"),
            (Mods::AUTOPILOT, "AP"),
            (Mods::PERFECT, "PF"),
        ];

        if self.is_empty() {
            return f.write_str("NM");
        }
        for (flag, acronym) in ACRONYMS {
            if self.contains(flag) {
                f.write_str(acronym)?;
            }
        }
        let unknown = self.bits() & !Mods::all().bits();
        if unknown != 0 {
            write!(f, "+{unknown:#x}")?;
        }
        Ok(())
    }
}

/// Why the currently applied modifier set was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModsOrigin {
    /// Nothing loaded yet
    #[default]
    None,
    /// Taken from the loaded replay
    Replay,
    /// Beatmap's native mods
    Beatmap,
    /// User override
    Override,
}
