//! Word catalog and difficulty weighting

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::consts::BASE_WORD_SCORE;

/// Word difficulty tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Ascension multiplier
    pub fn modifier(&self) -> f64 {
        match self {
            Difficulty::Easy => 1.0,
            Difficulty::Medium => 1.5,
            Difficulty::Hard => 2.0,
        }
    }
}

/// Multiplier for a raw difficulty tag; unknown tags count as Easy
pub fn difficulty_modifier(tag: &str) -> f64 {
    Difficulty::from_str(tag).map(|d| d.modifier()).unwrap_or(1.0)
}

/// A catalog word split into syllables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordData {
    pub id: u32,
    pub word: String,
    pub syllables: Vec<String>,
    /// Chinese gloss shown as the puzzle hint
    pub cn: String,
    pub difficulty: Difficulty,
}

impl WordData {
    pub fn new(id: u32, word: &str, syllables: &[&str], cn: &str, difficulty: Difficulty) -> Self {
        Self {
            id,
            word: word.to_string(),
            syllables: syllables.iter().map(|s| s.to_string()).collect(),
            cn: cn.to_string(),
            difficulty,
        }
    }

    /// Floors climbed for spelling this word
    pub fn weighted_score(&self) -> f64 {
        BASE_WORD_SCORE * self.difficulty.modifier()
    }
}

type WordRow = (u32, &'static str, &'static [&'static str], &'static str, Difficulty);

const WORD_TABLE: &[WordRow] = &[
    (1, "memory", &["mem", "o", "ry"], "n. 记忆；回忆", Difficulty::Easy),
    (2, "dungeon", &["dun", "geon"], "n. 地牢；土牢", Difficulty::Medium),
    (3, "fragment", &["frag", "ment"], "n. 碎片；片段", Difficulty::Medium),
    (4, "ephemeral", &["e", "phem", "er", "al"], "adj. 短暂的", Difficulty::Hard),
    (5, "abyss", &["a", "byss"], "n. 深渊", Difficulty::Easy),
    (6, "luminous", &["lu", "mi", "nous"], "adj. 发光的；明亮的", Difficulty::Medium),
    (7, "ancient", &["an", "cient"], "adj. 古老的；古代的", Difficulty::Easy),
    (8, "whisper", &["whis", "per"], "n. 低语；耳语", Difficulty::Easy),
    (9, "phantom", &["phan", "tom"], "n. 幻影；幽灵", Difficulty::Medium),
    (10, "crystal", &["crys", "tal"], "n. 水晶；结晶", Difficulty::Easy),
    (11, "silence", &["si", "lence"], "n. 沉默；寂静", Difficulty::Easy),
    (12, "shadow", &["shad", "ow"], "n. 阴影；影子", Difficulty::Easy),
    (13, "echo", &["ech", "o"], "n. 回声；回音", Difficulty::Easy),
    (14, "mystery", &["mys", "ter", "y"], "n. 秘密；谜", Difficulty::Medium),
    (15, "guardian", &["guard", "i", "an"], "n. 守护者；监护人", Difficulty::Hard),
];

/// The built-in word catalog
pub fn word_catalog() -> Vec<WordData> {
    WORD_TABLE
        .iter()
        .map(|&(id, word, syllables, cn, difficulty)| WordData::new(id, word, syllables, cn, difficulty))
        .collect()
}

/// Random run selection: up to `count` distinct words in random order
pub fn pick_session_words<R: Rng + ?Sized>(
    catalog: &[WordData],
    count: usize,
    rng: &mut R,
) -> Vec<WordData> {
    let mut words = catalog.to_vec();
    words.shuffle(rng);
    words.truncate(count);
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::collections::BTreeSet;

    #[test]
    fn test_modifier_values() {
        assert_eq!(Difficulty::Easy.modifier(), 1.0);
        assert_eq!(Difficulty::Medium.modifier(), 1.5);
        assert_eq!(Difficulty::Hard.modifier(), 2.0);
    }

    #[test]
    fn test_modifier_from_tag() {
        assert_eq!(difficulty_modifier("Hard"), 2.0);
        assert_eq!(difficulty_modifier("medium"), 1.5);
        assert_eq!(difficulty_modifier("Nightmare"), 1.0);
        assert_eq!(difficulty_modifier(""), 1.0);
    }

    #[test]
    fn test_catalog_integrity() {
        let catalog = word_catalog();
        assert_eq!(catalog.len(), 15);
        for word in &catalog {
            assert_eq!(word.syllables.concat(), word.word, "syllables of {}", word.word);
        }
        let ids: BTreeSet<u32> = catalog.iter().map(|w| w.id).collect();
        assert_eq!(ids.len(), 15);
    }

    #[test]
    fn test_weighted_score() {
        let catalog = word_catalog();
        assert_eq!(catalog[0].weighted_score(), 10.0);
        assert_eq!(catalog[1].weighted_score(), 15.0);
        assert_eq!(catalog[3].weighted_score(), 20.0);
    }

    #[test]
    fn test_pick_session_words_distinct() {
        let catalog = word_catalog();
        let mut rng = Pcg32::seed_from_u64(7);
        let picked = pick_session_words(&catalog, 5, &mut rng);
        assert_eq!(picked.len(), 5);
        let mut ids: Vec<u32> = picked.iter().map(|w| w.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_pick_session_words_small_catalog() {
        let catalog = &word_catalog()[..2];
        let mut rng = Pcg32::seed_from_u64(7);
        assert_eq!(pick_session_words(catalog, 5, &mut rng).len(), 2);
    }

    proptest! {
        #[test]
        fn modifier_is_one_of_known_values(tag in ".*") {
            let m = difficulty_modifier(&tag);
            prop_assert!(m == 1.0 || m == 1.5 || m == 2.0);
        }
    }
}
