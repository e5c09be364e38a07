//! Run settlement: turn a combat result into floors climbed or lost

use serde::{Deserialize, Serialize};

use super::combat::CombatResult;
use super::state::{GameState, GameStatePatch};
use super::words::WordData;
use crate::clamp_floor;
use crate::consts::*;

/// What a finished run did to the dungeon position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub success: bool,
    pub start_floor: u32,
    /// Floors climbed (negative on a fall)
    pub height: f64,
    pub target_floor: u32,
    /// Soul fire bonus for the run, on top of what was banked word by word
    pub soul_fire_gained: u32,
    /// Word ids newly added to the mastered set
    pub newly_mastered: Vec<u32>,
}

impl Settlement {
    /// Floors actually moved after clamping (positive = up)
    pub fn floors_moved(&self) -> i64 {
        self.start_floor as i64 - self.target_floor as i64
    }

    /// Persisted changes for this settlement
    pub fn patch(&self, state: &GameState) -> GameStatePatch {
        let mut mastered = state.mastered_words.clone();
        mastered.extend(self.newly_mastered.iter().copied());
        GameStatePatch {
            current_floor: Some(self.target_floor),
            soul_fire: Some(state.soul_fire.saturating_add(self.soul_fire_gained as u64)),
            mastered_words: Some(mastered),
            ..Default::default()
        }
    }
}

/// Sum of difficulty-weighted word scores
pub fn ascension_height(words: &[WordData]) -> f64 {
    words.iter().map(WordData::weighted_score).sum()
}

/// Floors lost on a failed run
///
/// A fall never passes the next checkpoint below, and the lantern anchor
/// shaves floors off what is left.
pub fn fall_distance(current_floor: u32, anchor: u32) -> u32 {
    let next_checkpoint = current_floor
        .div_ceil(CHECKPOINT_INTERVAL)
        .saturating_mul(CHECKPOINT_INTERVAL);
    let fall_target = current_floor
        .saturating_add(FALL_DISTANCE)
        .min(next_checkpoint);
    fall_target
        .saturating_sub(current_floor)
        .saturating_sub(anchor)
}

/// Floor reached after climbing `height` from `current_floor`, kept inside the dungeon
pub fn target_floor(current_floor: u32, height: f64) -> u32 {
    clamp_floor((current_floor as f64 - height).round() as i64)
}

/// Settle a combat result against the stored state
pub fn settle(result: &CombatResult, state: &GameState) -> Settlement {
    let start_floor = state.current_floor;

    let (height, soul_fire_gained) = if result.success {
        (ascension_height(&result.words), result.correct_count)
    } else {
        (-(fall_distance(start_floor, state.lantern.anchor) as f64), 0)
    };

    let newly_mastered = result
        .words
        .iter()
        .take(result.correct_count as usize)
        .map(|w| w.id)
        .filter(|id| !state.mastered_words.contains(id))
        .collect();

    let settlement = Settlement {
        success: result.success,
        start_floor,
        height,
        target_floor: target_floor(start_floor, height),
        soul_fire_gained,
        newly_mastered,
    };
    log::info!(
        "Settlement: {} B{}F -> B{}F ({:+} floors)",
        if result.success { "ascension" } else { "fall" },
        settlement.start_floor,
        settlement.target_floor,
        settlement.floors_moved()
    );
    settlement
}
