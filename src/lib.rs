//! Memory Dungeon - a word spelling dungeon climb
//!
//! Core modules:
//! - `sim`: Game logic (word catalog, combat puzzle, settlement, phase controller)
//! - `persistence`: Save record store with default fallback
//! - `platform`: Browser/native platform abstraction (storage, clock)
//! - `settings`: User preferences
//! - `deck`: Flashcard decks and review cursor

pub mod deck;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use deck::{Card, Deck, DeckLibrary, ReviewSession};
pub use persistence::SaveStore;
pub use platform::{KeyValueStore, MemoryStore, StorageError};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Dungeon depth bounds (floor 0 is the surface)
    pub const MAX_FLOOR: u32 = 1000;
    pub const SURFACE_FLOOR: u32 = 0;
    /// New runs start at the bottom
    pub const START_FLOOR: u32 = MAX_FLOOR;
    /// Falls never pass the next checkpoint below
    pub const CHECKPOINT_INTERVAL: u32 = 100;
    /// Floors lost on a failed run (before checkpoint/anchor)
    pub const FALL_DISTANCE: u32 = 10;
    /// Base ascension per word, scaled by difficulty
    pub const BASE_WORD_SCORE: f64 = 10.0;
    /// Simulated climb shown per correct word during combat
    pub const COMBAT_FLOOR_STEP: u32 = 10;

    /// Words drawn per run
    pub const SESSION_WORD_COUNT: usize = 5;
    /// Wrong syllables mixed into each puzzle
    pub const MAX_DISTRACTORS: usize = 3;

    /// Memo phase auto-advance (ms)
    pub const MEMO_TIMEOUT_MS: u32 = 15_000;
    /// Extra memo time per brightness level above 1 (ms)
    pub const MEMO_BRIGHTNESS_BONUS_MS: u32 = 3_000;

    /// Delay before advancing after a correct answer (ms)
    pub const VICTORY_ADVANCE_MS: u32 = 1_500;
    /// Delay before clearing slots after a wrong answer (ms)
    pub const WRONG_RESET_MS: u32 = 600;
    /// Delay before reporting defeat at 0 HP (ms)
    pub const DEFEAT_DELAY_MS: u32 = 500;

    /// Bubble placement area, in percent of the pool
    pub const BUBBLE_TOP_MIN: f32 = 5.0;
    pub const BUBBLE_TOP_MAX: f32 = 65.0;
    pub const BUBBLE_LEFT_MIN: f32 = 5.0;
    pub const BUBBLE_LEFT_MAX: f32 = 70.0;
    /// Minimum center distance between bubbles (percent)
    pub const BUBBLE_MIN_DISTANCE: f32 = 18.0;
    pub const BUBBLE_PLACEMENT_ATTEMPTS: u32 = 50;
    /// Float animation phase offset range (seconds)
    pub const BUBBLE_FLOAT_DELAY_MIN: f32 = -5.0;
}

/// Clamp a signed floor value into the dungeon
#[inline]
pub fn clamp_floor(floor: i64) -> u32 {
    floor.clamp(consts::SURFACE_FLOOR as i64, consts::MAX_FLOOR as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clamp_floor_bounds() {
        assert_eq!(clamp_floor(-62), 0);
        assert_eq!(clamp_floor(938), 938);
        assert_eq!(clamp_floor(1010), 1000);
    }

    proptest! {
        #[test]
        fn clamp_floor_stays_in_dungeon(floor in any::<i64>()) {
            let clamped = clamp_floor(floor);
            prop_assert!(clamped <= consts::MAX_FLOOR);
        }
    }
}
