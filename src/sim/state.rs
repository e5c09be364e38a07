//! Persistent game progression state
//!
//! Everything that survives between runs lives here.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::platform::now_ms;

const MS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Lantern upgrades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanternStats {
    /// Extends memo time
    pub brightness: u32,
    /// Hit points per combat
    pub fuel: u32,
    /// Active skill level (unused by combat)
    pub flare: u32,
    /// Floors shaved off each fall
    pub anchor: u32,
}

impl Default for LanternStats {
    fn default() -> Self {
        Self {
            brightness: 1,
            fuel: 3,
            flare: 0,
            anchor: 0,
        }
    }
}

/// Complete progression record (stored as one JSON value)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameState {
    /// Depth, 1000 = bottom, 0 = surface
    pub current_floor: u32,
    pub soul_fire: u64,
    pub lantern: LanternStats,
    /// Catalog ids of words answered correctly
    pub mastered_words: BTreeSet<u32>,
    /// Unix timestamp (ms) of the last recorded login
    pub last_login: f64,
    pub consecutive_logins: u32,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(now_ms())
    }
}

impl GameState {
    /// Fresh state as of `now` (ms)
    pub fn new(now: f64) -> Self {
        Self {
            current_floor: START_FLOOR,
            soul_fire: 0,
            lantern: LanternStats::default(),
            mastered_words: BTreeSet::new(),
            last_login: now,
            consecutive_logins: 1,
        }
    }

    /// Record a login at `now` (ms). Returns true when it starts a new day.
    ///
    /// Next calendar day (UTC) extends the streak, a longer gap resets it to 1.
    pub fn register_login(&mut self, now: f64) -> bool {
        let last_day = (self.last_login / MS_PER_DAY).floor() as i64;
        let today = (now / MS_PER_DAY).floor() as i64;

        if today <= last_day {
            return false;
        }

        if today == last_day + 1 {
            self.consecutive_logins = self.consecutive_logins.saturating_add(1);
        } else {
            self.consecutive_logins = 1;
        }
        self.last_login = now;
        true
    }

    /// Memo phase duration for the current lantern
    pub fn memo_duration_ms(&self) -> u32 {
        let bonus_levels = self.lantern.brightness.saturating_sub(1);
        MEMO_TIMEOUT_MS.saturating_add(bonus_levels.saturating_mul(MEMO_BRIGHTNESS_BONUS_MS))
    }
}

/// Partial update; `Some` fields replace the stored value wholesale
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameStatePatch {
    pub current_floor: Option<u32>,
    pub soul_fire: Option<u64>,
    pub lantern: Option<LanternStats>,
    pub mastered_words: Option<BTreeSet<u32>>,
    pub last_login: Option<f64>,
    pub consecutive_logins: Option<u32>,
}

impl GameStatePatch {
    /// Shallow merge over `base`
    pub fn merge(self, base: &GameState) -> GameState {
        GameState {
            current_floor: self.current_floor.unwrap_or(base.current_floor),
            soul_fire: self.soul_fire.unwrap_or(base.soul_fire),
            lantern: self.lantern.unwrap_or(base.lantern),
            mastered_words: self
                .mastered_words
                .unwrap_or_else(|| base.mastered_words.clone()),
            last_login: self.last_login.unwrap_or(base.last_login),
            consecutive_logins: self.consecutive_logins.unwrap_or(base.consecutive_logins),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
