//! Combat puzzle: drop syllable bubbles into ordered slots
//!
//! One `Combat` covers a whole word list. Each word gets a fresh board of
//! bubbles (its syllables plus a few distractors). Verdicts are paced by
//! millisecond timers advanced through `Combat::advance`.

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::words::WordData;
use crate::consts::*;

/// True when the filled pieces spell exactly the target
pub fn verify<A: AsRef<str>, B: AsRef<str>>(filled: &[A], target: &[B]) -> bool {
    let spelled: String = filled.iter().map(AsRef::as_ref).collect();
    let expected: String = target.iter().map(AsRef::as_ref).collect();
    spelled == expected
}

/// Up to `max` unique syllables from the other words that never match the target's own
pub fn pick_distractors<R: Rng + ?Sized>(
    words: &[WordData],
    target_index: usize,
    max: usize,
    rng: &mut R,
) -> Vec<String> {
    let Some(target) = words.get(target_index) else {
        return Vec::new();
    };

    let mut pool: Vec<&str> = words
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != target_index)
        .flat_map(|(_, w)| w.syllables.iter().map(String::as_str))
        .collect();
    pool.shuffle(rng);

    let mut distractors: Vec<String> = Vec::with_capacity(max);
    for syllable in pool {
        if distractors.len() >= max {
            break;
        }
        if target.syllables.iter().any(|s| s == syllable) {
            continue;
        }
        if distractors.iter().any(|d| d == syllable) {
            continue;
        }
        distractors.push(syllable.to_string());
    }
    distractors
}

/// Scatter `count` points over the bubble pool (percent coordinates, x = left, y = top)
///
/// Rejection sampling keeps bubbles apart; after the attempt budget runs out
/// the last sample is kept even if it overlaps.
pub fn place_bubbles<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Vec2> {
    let mut placed: Vec<Vec2> = Vec::with_capacity(count);

    for _ in 0..count {
        let mut pos = Vec2::ZERO;
        for _ in 0..BUBBLE_PLACEMENT_ATTEMPTS {
            pos = Vec2::new(
                rng.random_range(BUBBLE_LEFT_MIN..BUBBLE_LEFT_MAX),
                rng.random_range(BUBBLE_TOP_MIN..BUBBLE_TOP_MAX),
            );
            let collides = placed
                .iter()
                .any(|p| p.distance(pos) < BUBBLE_MIN_DISTANCE);
            if !collides {
                break;
            }
        }
        placed.push(pos);
    }

    placed
}

/// A syllable bubble floating in the pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bubble {
    pub id: u32,
    pub text: String,
    /// Position in the target word, `None` for distractors
    pub slot_index: Option<usize>,
    /// Percent coordinates (x = left, y = top)
    pub pos: Vec2,
    /// Float animation phase offset (seconds, negative)
    pub float_delay: f32,
    pub used: bool,
}

impl Bubble {
    pub fn is_distractor(&self) -> bool {
        self.slot_index.is_none()
    }
}

/// A filled answer slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilledSlot {
    pub bubble_id: u32,
    pub text: String,
}

/// Answer slot highlight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SlotStatus {
    #[default]
    Normal,
    Success,
    Error,
}

/// Board for a single word
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PuzzleBoard {
    pub word: WordData,
    pub bubbles: Vec<Bubble>,
    pub filled: Vec<FilledSlot>,
}

impl PuzzleBoard {
    /// Build the board for `words[index]`; `None` past the end of the list
    pub fn generate<R: Rng + ?Sized>(
        words: &[WordData],
        index: usize,
        rng: &mut R,
    ) -> Option<Self> {
        let word = words.get(index)?.clone();

        let mut items: Vec<(String, Option<usize>)> = word
            .syllables
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), Some(i)))
            .collect();
        items.extend(
            pick_distractors(words, index, MAX_DISTRACTORS, rng)
                .into_iter()
                .map(|s| (s, None)),
        );
        items.shuffle(rng);

        let positions = place_bubbles(items.len(), rng);
        let bubbles = items
            .into_iter()
            .zip(positions)
            .enumerate()
            .map(|(i, ((text, slot_index), pos))| Bubble {
                id: i as u32,
                text,
                slot_index,
                pos,
                float_delay: rng.random_range(BUBBLE_FLOAT_DELAY_MIN..0.0),
                used: false,
            })
            .collect();

        Some(Self {
            word,
            bubbles,
            filled: Vec::new(),
        })
    }

    pub fn slot_count(&self) -> usize {
        self.word.syllables.len()
    }

    pub fn is_full(&self) -> bool {
        self.filled.len() >= self.slot_count()
    }

    pub fn is_correct(&self) -> bool {
        let filled: Vec<&str> = self.filled.iter().map(|f| f.text.as_str()).collect();
        verify(&filled, &self.word.syllables)
    }

    fn clear(&mut self) {
        self.filled.clear();
        for bubble in &mut self.bubbles {
            bubble.used = false;
        }
    }
}

/// Outcome of a finished combat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatResult {
    pub success: bool,
    /// Words attempted (all of them on success, up to the fatal one on defeat)
    pub words: Vec<WordData>,
    pub correct_count: u32,
}

/// Notable things that happened during combat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// Word spelled correctly
    Solved { word_id: u32 },
    /// Wrong spelling, one HP lost
    Wrong { hp: u32 },
    /// Combat over (emitted exactly once)
    Completed(CombatResult),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum PendingAction {
    NextWord,
    ResetSlots,
    Defeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct Pending {
    action: PendingAction,
    remaining_ms: u32,
}

/// Combat phase state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combat {
    words: Vec<WordData>,
    level: usize,
    board: Option<PuzzleBoard>,
    status: SlotStatus,
    hp: u32,
    max_hp: u32,
    correct_count: u32,
    /// Local climb preview, persisted only at settlement
    floor: u32,
    pending: Option<Pending>,
    finished: bool,
}

impl Combat {
    /// Start combat over `words` with `hp` hit points at `floor`
    pub fn new<R: Rng + ?Sized>(words: Vec<WordData>, hp: u32, floor: u32, rng: &mut R) -> Self {
        let mut combat = Self {
            words,
            level: 0,
            board: None,
            status: SlotStatus::Normal,
            hp,
            max_hp: hp,
            correct_count: 0,
            floor,
            pending: None,
            finished: false,
        };

        if combat.hp == 0 {
            combat.schedule(PendingAction::Defeat, DEFEAT_DELAY_MS);
        }
        combat.board = PuzzleBoard::generate(&combat.words, 0, rng);

        combat
    }

    pub fn words(&self) -> &[WordData] {
        &self.words
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn board(&self) -> Option<&PuzzleBoard> {
        self.board.as_ref()
    }

    pub fn current_word(&self) -> Option<&WordData> {
        self.board.as_ref().map(|b| &b.word)
    }

    pub fn status(&self) -> SlotStatus {
        self.status
    }

    pub fn hp(&self) -> u32 {
        self.hp
    }

    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    pub fn floor(&self) -> u32 {
        self.floor
    }

    /// Climb progress towards the surface, 0.0 - 1.0
    pub fn progress(&self) -> f32 {
        (MAX_FLOOR.saturating_sub(self.floor)) as f32 / MAX_FLOOR as f32
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn schedule(&mut self, action: PendingAction, delay_ms: u32) {
        self.pending = Some(Pending {
            action,
            remaining_ms: delay_ms,
        });
    }

    fn accepts_input(&self) -> bool {
        !self.finished && self.status == SlotStatus::Normal && self.pending.is_none()
    }

    /// Put a bubble into the next free slot. Verifies once all slots are filled.
    pub fn pick(&mut self, bubble_id: u32) -> Option<CombatEvent> {
        if !self.accepts_input() || self.hp == 0 {
            log::debug!("Bubble {} ignored (combat busy)", bubble_id);
            return None;
        }
        let board = self.board.as_mut()?;
        if board.is_full() {
            return None;
        }
        let bubble = board
            .bubbles
            .iter_mut()
            .find(|b| b.id == bubble_id && !b.used)?;

        bubble.used = true;
        board.filled.push(FilledSlot {
            bubble_id,
            text: bubble.text.clone(),
        });

        if board.is_full() {
            Some(self.check_answer())
        } else {
            None
        }
    }

    /// Take back the most recent slot. Returns false if nothing changed.
    pub fn undo(&mut self) -> bool {
        if !self.accepts_input() {
            return false;
        }
        let Some(board) = self.board.as_mut() else {
            return false;
        };
        let Some(last) = board.filled.pop() else {
            return false;
        };
        if let Some(bubble) = board.bubbles.iter_mut().find(|b| b.id == last.bubble_id) {
            bubble.used = false;
        }
        true
    }

    fn check_answer(&mut self) -> CombatEvent {
        let Some((word_id, correct)) = self.board.as_ref().map(|b| (b.word.id, b.is_correct())) else {
            return CombatEvent::Wrong { hp: self.hp };
        };

        if correct {
            self.status = SlotStatus::Success;
            self.correct_count += 1;
            self.floor = self.floor.saturating_sub(COMBAT_FLOOR_STEP);
            self.schedule(PendingAction::NextWord, VICTORY_ADVANCE_MS);
            log::info!("Word {} solved ({} correct)", word_id, self.correct_count);
            CombatEvent::Solved { word_id }
        } else {
            self.status = SlotStatus::Error;
            self.hp = self.hp.saturating_sub(1);
            if self.hp == 0 {
                self.schedule(PendingAction::Defeat, DEFEAT_DELAY_MS);
            } else {
                self.schedule(PendingAction::ResetSlots, WRONG_RESET_MS);
            }
            log::info!("Wrong spelling for word {}, hp {}", word_id, self.hp);
            CombatEvent::Wrong { hp: self.hp }
        }
    }

    /// Advance verdict timers by `dt_ms`
    ///
    /// Also reports success straight away for an empty word list.
    pub fn advance<R: Rng + ?Sized>(&mut self, dt_ms: u32, rng: &mut R) -> Option<CombatEvent> {
        if self.finished {
            return None;
        }
        if self.words.is_empty() {
            return Some(self.complete(true));
        }

        let pending = self.pending.as_mut()?;
        pending.remaining_ms = pending.remaining_ms.saturating_sub(dt_ms);
        if pending.remaining_ms > 0 {
            return None;
        }
        let action = pending.action;
        self.pending = None;

        match action {
            PendingAction::ResetSlots => {
                if let Some(board) = self.board.as_mut() {
                    board.clear();
                }
                self.status = SlotStatus::Normal;
                None
            }
            PendingAction::NextWord => {
                self.level += 1;
                if self.level >= self.words.len() {
                    return Some(self.complete(true));
                }
                self.board = PuzzleBoard::generate(&self.words, self.level, rng);
                self.status = SlotStatus::Normal;
                None
            }
            PendingAction::Defeat => Some(self.complete(false)),
        }
    }

    fn complete(&mut self, success: bool) -> CombatEvent {
        self.finished = true;
        self.pending = None;

        let words = if success {
            self.words.clone()
        } else {
            let end = (self.level + 1).min(self.words.len());
            self.words[..end].to_vec()
        };
        log::info!(
            "Combat {} after {} words ({} correct)",
            if success { "won" } else { "lost" },
            words.len(),
            self.correct_count
        );

        CombatEvent::Completed(CombatResult {
            success,
            words,
            correct_count: self.correct_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::words::word_catalog;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(12345)
    }

    /// Bubble ids spelling the current word in order
    fn answer_ids(combat: &Combat) -> Vec<u32> {
        let board = combat.board().unwrap();
        (0..board.slot_count())
            .map(|slot| {
                board
                    .bubbles
                    .iter()
                    .find(|b| b.slot_index == Some(slot))
                    .unwrap()
                    .id
            })
            .collect()
    }

    fn wrong_ids(combat: &Combat) -> Vec<u32> {
        let mut ids = answer_ids(combat);
        ids.reverse();
        ids
    }

    fn first_words(n: usize) -> Vec<WordData> {
        word_catalog().into_iter().take(n).collect()
    }

    #[test]
    fn test_verify_order_matters() {
        assert!(verify(&["mem", "o", "ry"], &["mem", "o", "ry"]));
        assert!(!verify(&["o", "mem", "ry"], &["mem", "o", "ry"]));
        assert!(!verify(&["mem", "o"], &["mem", "o", "ry"]));
    }

    #[test]
    fn test_distractors_exclude_target_syllables() {
        // memory and echo share "o"
        let words: Vec<WordData> = word_catalog()
            .into_iter()
            .filter(|w| w.word == "memory" || w.word == "echo")
            .collect();
        let distractors = pick_distractors(&words, 0, 3, &mut rng());
        assert_eq!(distractors, vec!["ech".to_string()]);
    }

    #[test]
    fn test_distractors_unique_and_capped() {
        let words = word_catalog();
        let distractors = pick_distractors(&words, 0, 3, &mut rng());
        assert_eq!(distractors.len(), 3);
        let mut sorted = distractors.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 3);
    }

    #[test]
    fn test_place_bubbles_in_bounds() {
        let positions = place_bubbles(7, &mut rng());
        assert_eq!(positions.len(), 7);
        for p in positions {
            assert!((BUBBLE_LEFT_MIN..BUBBLE_LEFT_MAX).contains(&p.x));
            assert!((BUBBLE_TOP_MIN..BUBBLE_TOP_MAX).contains(&p.y));
        }
    }

    #[test]
    fn test_board_contains_all_syllables() {
        let words = first_words(5);
        let board = PuzzleBoard::generate(&words, 0, &mut rng()).unwrap();
        assert_eq!(board.bubbles.len(), 3 + 3);
        for (i, syllable) in words[0].syllables.iter().enumerate() {
            let bubble = board.bubbles.iter().find(|b| b.slot_index == Some(i)).unwrap();
            assert_eq!(&bubble.text, syllable);
        }
        assert!(board.bubbles.iter().all(|b| b.float_delay < 0.0));
    }

    #[test]
    fn test_board_out_of_range_is_none() {
        let words = first_words(2);
        assert!(PuzzleBoard::generate(&words, 2, &mut rng()).is_none());
        assert!(PuzzleBoard::generate(&[], 0, &mut rng()).is_none());
    }

    #[test]
    fn test_correct_answer_advances() {
        let mut rng = rng();
        let mut combat = Combat::new(first_words(2), 3, 1000, &mut rng);
        let ids = answer_ids(&combat);

        assert_eq!(combat.pick(ids[0]), None);
        assert_eq!(combat.pick(ids[1]), None);
        let event = combat.pick(ids[2]);
        assert_eq!(event, Some(CombatEvent::Solved { word_id: 1 }));
        assert_eq!(combat.status(), SlotStatus::Success);
        assert_eq!(combat.floor(), 990);

        // Not yet
        assert_eq!(combat.advance(VICTORY_ADVANCE_MS - 1, &mut rng), None);
        assert_eq!(combat.level(), 0);
        assert_eq!(combat.advance(1, &mut rng), None);
        assert_eq!(combat.level(), 1);
        assert_eq!(combat.status(), SlotStatus::Normal);
        assert_eq!(combat.current_word().unwrap().word, "dungeon");
    }

    #[test]
    fn test_full_clear_reports_success() {
        let mut rng = rng();
        let mut combat = Combat::new(first_words(2), 3, 1000, &mut rng);

        for _ in 0..2 {
            for id in answer_ids(&combat) {
                combat.pick(id);
            }
            if let Some(CombatEvent::Completed(result)) = combat.advance(VICTORY_ADVANCE_MS, &mut rng) {
                assert!(result.success);
                assert_eq!(result.correct_count, 2);
                assert_eq!(result.words.len(), 2);
            }
        }
        assert!(combat.is_finished());
    }

    #[test]
    fn test_wrong_answer_costs_hp_and_resets() {
        let mut rng = rng();
        let mut combat = Combat::new(first_words(2), 3, 1000, &mut rng);

        let mut last = None;
        for id in wrong_ids(&combat) {
            last = combat.pick(id);
        }
        assert_eq!(last, Some(CombatEvent::Wrong { hp: 2 }));
        assert_eq!(combat.status(), SlotStatus::Error);

        // Locked while the verdict shows
        assert!(!combat.undo());

        combat.advance(WRONG_RESET_MS, &mut rng);
        let board = combat.board().unwrap();
        assert!(board.filled.is_empty());
        assert!(board.bubbles.iter().all(|b| !b.used));
        assert_eq!(combat.status(), SlotStatus::Normal);
    }

    #[test]
    fn test_defeat_reported_once() {
        let mut rng = rng();
        let mut combat = Combat::new(first_words(3), 1, 1000, &mut rng);

        for id in wrong_ids(&combat) {
            combat.pick(id);
        }
        assert_eq!(combat.hp(), 0);

        // Further input is ignored
        assert_eq!(combat.pick(0), None);

        let mut completions = 0;
        for _ in 0..10 {
            if let Some(CombatEvent::Completed(result)) = combat.advance(DEFEAT_DELAY_MS, &mut rng) {
                assert!(!result.success);
                assert_eq!(result.words.len(), 1);
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
    }

    #[test]
    fn test_zero_hp_fails_immediately() {
        let mut rng = rng();
        let mut combat = Combat::new(first_words(2), 0, 1000, &mut rng);
        assert_eq!(combat.pick(0), None);
        match combat.advance(DEFEAT_DELAY_MS, &mut rng) {
            Some(CombatEvent::Completed(result)) => assert!(!result.success),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_empty_word_list_succeeds() {
        let mut rng = rng();
        let mut combat = Combat::new(Vec::new(), 3, 1000, &mut rng);
        match combat.advance(0, &mut rng) {
            Some(CombatEvent::Completed(result)) => {
                assert!(result.success);
                assert_eq!(result.correct_count, 0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_undo_frees_bubble() {
        let mut rng = rng();
        let mut combat = Combat::new(first_words(2), 3, 1000, &mut rng);
        let ids = answer_ids(&combat);

        assert!(!combat.undo());
        combat.pick(ids[0]);
        // Same bubble twice is ignored
        combat.pick(ids[0]);
        assert_eq!(combat.board().unwrap().filled.len(), 1);

        assert!(combat.undo());
        let board = combat.board().unwrap();
        assert!(board.filled.is_empty());
        assert!(board.bubbles.iter().all(|b| !b.used));
    }

    #[test]
    fn test_simulated_floor_stops_at_surface() {
        let mut rng = rng();
        let mut combat = Combat::new(first_words(1), 3, 5, &mut rng);
        for id in answer_ids(&combat) {
            combat.pick(id);
        }
        assert_eq!(combat.floor(), 0);
        assert_eq!(combat.progress(), 1.0);
    }

    proptest! {
        #[test]
        fn distractors_never_match_target(seed in any::<u64>(), index in 0usize..15) {
            let words = word_catalog();
            let mut rng = Pcg32::seed_from_u64(seed);
            let distractors = pick_distractors(&words, index, MAX_DISTRACTORS, &mut rng);
            prop_assert!(distractors.len() <= MAX_DISTRACTORS);
            for d in &distractors {
                prop_assert!(!words[index].syllables.contains(d));
            }
        }

        #[test]
        fn hp_never_underflows(seed in any::<u64>(), hp in 0u32..4, rounds in 1usize..8) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut combat = Combat::new(first_words(5), hp, 1000, &mut rng);
            let mut completions = 0;
            for _ in 0..rounds {
                if combat.board().is_some() {
                    for id in wrong_ids(&combat) {
                        combat.pick(id);
                    }
                }
                if let Some(CombatEvent::Completed(_)) = combat.advance(WRONG_RESET_MS, &mut rng) {
                    completions += 1;
                }
                prop_assert!(combat.hp() <= hp);
            }
            prop_assert!(completions <= 1);
        }
    }
}
