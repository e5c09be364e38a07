//! Flashcard decks
//!
//! Decks are held in memory only; created decks are lost on reload.

use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// Colors offered when creating a deck
pub const PRESET_COLORS: [&str; 5] = ["#0EA5E9", "#22C55E", "#F59E0B", "#EF4444", "#8B5CF6"];

const DEFAULT_DECK_NAME: &str = "Untitled deck";
const PLACEHOLDER_FRONT: &str = "Sample question";
const PLACEHOLDER_BACK: &str = "Sample answer";

/// A single flashcard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub front: String,
    pub back: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl Card {
    fn new(id: &str, front: &str, back: &str, hint: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            front: front.to_string(),
            back: back.to_string(),
            hint: hint.map(str::to_string),
        }
    }
}

/// A named group of cards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: String,
    /// Percent reviewed
    pub progress: u8,
    /// Human readable "last reviewed" label
    pub last_review: String,
    pub cards: Vec<Card>,
}

/// Parse one card per line in `front | back | hint` form
///
/// Lines without both a front and a back are skipped. An input with no usable
/// line yields a single placeholder card so a deck is never empty.
pub fn parse_cards(raw: &str) -> Vec<Card> {
    let mut cards = Vec::new();

    for line in raw.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let mut parts = line.split('|').map(str::trim);
        let front = parts.next().unwrap_or_default();
        let back = parts.next().unwrap_or_default();
        let hint = parts.next().filter(|h| !h.is_empty());

        if front.is_empty() || back.is_empty() {
            continue;
        }
        let id = format!("n{}", cards.len() + 1);
        cards.push(Card::new(&id, front, back, hint));
    }

    if cards.is_empty() {
        cards.push(Card::new("n1", PLACEHOLDER_FRONT, PLACEHOLDER_BACK, None));
    }
    cards
}

/// Form input for a new deck
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeckDraft {
    pub name: String,
    pub description: String,
    pub color: String,
    pub raw_cards: String,
}

impl DeckDraft {
    /// Build the deck; `now` (ms) stamps the id
    pub fn into_deck(self, now: f64) -> Deck {
        let name = match self.name.trim() {
            "" => DEFAULT_DECK_NAME.to_string(),
            name => name.to_string(),
        };
        let color = match self.color.trim() {
            "" => PRESET_COLORS[0].to_string(),
            color => color.to_string(),
        };
        let description = Some(self.description.trim().to_string()).filter(|d| !d.is_empty());

        Deck {
            id: format!("d_{}", now as u64),
            name,
            description,
            color,
            progress: 0,
            last_review: "just now".to_string(),
            cards: parse_cards(&self.raw_cards),
        }
    }
}

/// In-memory deck collection
#[derive(Debug, Clone, Default)]
pub struct DeckLibrary {
    decks: Vec<Deck>,
}

impl DeckLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Library preloaded with the bundled decks
    pub fn builtin() -> Self {
        Self {
            decks: builtin_decks(),
        }
    }

    pub fn decks(&self) -> &[Deck] {
        &self.decks
    }

    pub fn len(&self) -> usize {
        self.decks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decks.is_empty()
    }

    /// Deck by id, or the first deck when the id is unknown
    pub fn find(&self, id: &str) -> Option<&Deck> {
        self.decks
            .iter()
            .find(|d| d.id == id)
            .or_else(|| self.decks.first())
    }

    pub fn add(&mut self, deck: Deck) {
        log::info!("Deck {} created with {} cards", deck.id, deck.cards.len());
        self.decks.push(deck);
    }

    /// Create a deck from a draft and append it
    pub fn create(&mut self, draft: DeckDraft, now: f64) -> &Deck {
        self.add(draft.into_deck(now));
        let last = self.decks.len() - 1;
        &self.decks[last]
    }
}

/// Swipe gesture outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    /// Towards the next card
    Left,
    /// Back to the previous card
    Right,
}

/// Position within a deck review
#[derive(Debug, Clone)]
pub struct ReviewSession {
    deck: Deck,
    index: usize,
    flipped: bool,
    hint_shown: bool,
    finished: bool,
    swipe_enabled: bool,
}

impl ReviewSession {
    pub fn new(deck: Deck, settings: &Settings) -> Self {
        Self {
            deck,
            index: 0,
            flipped: false,
            hint_shown: settings.default_show_hint,
            finished: false,
            swipe_enabled: settings.swipe_next,
        }
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&Card> {
        self.deck.cards.get(self.index)
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn hint_shown(&self) -> bool {
        self.hint_shown
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn flip(&mut self) {
        self.flipped = !self.flipped;
    }

    pub fn show_hint(&mut self) {
        self.hint_shown = true;
    }

    /// Fresh card face; the default hint only applies to the opening card
    fn reset_card(&mut self) {
        self.flipped = false;
        self.hint_shown = false;
    }

    /// Move forward; finishes after the last card
    pub fn next(&mut self) {
        if self.finished {
            return;
        }
        if self.index + 1 < self.deck.cards.len() {
            self.index += 1;
            self.reset_card();
        } else {
            self.finished = true;
        }
    }

    /// Move back; false when already on the first card
    pub fn prev(&mut self) -> bool {
        if self.finished || self.index == 0 {
            return false;
        }
        self.index -= 1;
        self.reset_card();
        true
    }

    /// Grade the current card and move on (the grade is not recorded)
    pub fn rate(&mut self, _forgot: bool) {
        self.next();
    }

    /// Apply a swipe; ignored when swiping is disabled. Returns true if the card changed.
    pub fn swipe(&mut self, swipe: Swipe) -> bool {
        if !self.swipe_enabled {
            return false;
        }
        match swipe {
            Swipe::Left => {
                let before = (self.index, self.finished);
                self.next();
                before != (self.index, self.finished)
            }
            Swipe::Right => self.prev(),
        }
    }
}

/// Decks bundled with the app
pub fn builtin_decks() -> Vec<Deck> {
    fn deck(
        id: &str,
        name: &str,
        description: &str,
        color: &str,
        progress: u8,
        last_review: &str,
        cards: &[(&str, &str, &str, &str)],
    ) -> Deck {
        Deck {
            id: id.to_string(),
            name: name.to_string(),
            description: Some(description.to_string()),
            color: color.to_string(),
            progress,
            last_review: last_review.to_string(),
            cards: cards
                .iter()
                .map(|&(id, front, back, hint)| Card::new(id, front, back, Some(hint)))
                .collect(),
        }
    }

    vec![
        deck(
            "en_vocab",
            "英语词汇",
            "常见单词",
            "#0EA5E9",
            20,
            "2 天前",
            &[
                ("c1", "Ephemeral", "短暂的", "以 E 开头，短暂"),
                ("c2", "Serendipity", "机缘巧合", "意外之喜"),
                ("c3", "Mellifluous", "甜美流畅的", "类似 melody"),
                ("c4", "Petrichor", "雨后泥土的芬芳", "暴雨之后的味道"),
            ],
        ),
        deck(
            "js_basics",
            "JS基础",
            "JavaScript 核心概念",
            "#22C55E",
            45,
            "昨天",
            &[
                ("c5", "Closure", "函数与其词法作用域的组合", "内层函数引用外层变量"),
                ("c6", "Hoisting", "声明提升到作用域顶部", "var 和函数声明"),
                ("c7", "Promise", "表示异步操作的对象", "pending/fulfilled/rejected"),
            ],
        ),
        deck(
            "geography",
            "地理知识",
            "世界地理常识",
            "#F59E0B",
            70,
            "3 小时前",
            &[
                ("c8", "Sahara", "世界最大热沙漠", "北非"),
                ("c9", "Nile", "非洲最长河流", "埃及"),
                ("c10", "Everest", "世界最高峰", "喜马拉雅"),
            ],
        ),
    ]
}
