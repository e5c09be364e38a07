//! Game logic module
//!
//! Everything here is platform independent:
//! - Seeded RNG only (runs replay from a seed)
//! - Time arrives as explicit millisecond deltas
//! - No rendering or platform dependencies beyond the storage trait

pub mod combat;
pub mod session;
pub mod settlement;
pub mod state;
pub mod words;

pub use combat::{
    Bubble, Combat, CombatEvent, CombatResult, FilledSlot, PuzzleBoard, SlotStatus,
    pick_distractors, place_bubbles, verify,
};
pub use session::{Phase, Session, SessionEvent, SessionInput};
pub use settlement::{Settlement, ascension_height, fall_distance, settle, target_floor};
pub use state::{GameState, GameStatePatch, LanternStats};
pub use words::{Difficulty, WordData, difficulty_modifier, pick_session_words, word_catalog};
