//! Browser bindings
//!
//! Thin `wasm-bindgen` wrapper over `Session` backed by LocalStorage. Snapshots
//! cross the boundary as JSON strings.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::deck::{DeckDraft, DeckLibrary};
use crate::platform::{LocalStorage, now_ms};
use crate::settings::Settings;
use crate::sim::{Bubble, Phase, Session, SessionInput, SlotStatus};

/// Combat view model
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CombatView<'a> {
    level: usize,
    hp: u32,
    max_hp: u32,
    floor: u32,
    progress: f32,
    status: SlotStatus,
    hint: Option<&'a str>,
    bubbles: &'a [Bubble],
    filled: Vec<&'a str>,
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::warn!("Snapshot encode failed: {}", e);
        "null".to_string()
    })
}

/// Game handle owned by the page
#[wasm_bindgen]
pub struct WebGame {
    session: Session<LocalStorage>,
    decks: DeckLibrary,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WebGame, JsValue> {
        let store = LocalStorage::open().map_err(|e| JsValue::from_str(&e.to_string()))?;
        let seed = getrandom::u64().unwrap_or_else(|_| now_ms() as u64);
        Ok(WebGame {
            session: Session::new(store, seed, now_ms()),
            decks: DeckLibrary::builtin(),
        })
    }

    pub fn start(&mut self) {
        self.session.handle(SessionInput::Start);
    }

    pub fn ready(&mut self) {
        self.session.handle(SessionInput::Ready);
    }

    pub fn pick(&mut self, bubble_id: u32) {
        self.session.handle(SessionInput::Pick(bubble_id));
    }

    pub fn undo(&mut self) {
        self.session.handle(SessionInput::Undo);
    }

    #[wasm_bindgen(js_name = continueRun)]
    pub fn continue_run(&mut self) {
        self.session.handle(SessionInput::Continue);
    }

    pub fn retreat(&mut self) {
        self.session.handle(SessionInput::Retreat);
    }

    #[wasm_bindgen(js_name = togglePause)]
    pub fn toggle_pause(&mut self) {
        self.session.handle(SessionInput::TogglePause);
    }

    /// Advance timers by `dt_ms` milliseconds
    pub fn tick(&mut self, dt_ms: u32) {
        self.session.tick(dt_ms);
    }

    pub fn phase(&self) -> String {
        self.session.phase().as_str().to_string()
    }

    #[wasm_bindgen(js_name = isPaused)]
    pub fn is_paused(&self) -> bool {
        self.session.is_paused()
    }

    #[wasm_bindgen(js_name = saveJson)]
    pub fn save_json(&self) -> String {
        to_json(&self.session.saves().read())
    }

    #[wasm_bindgen(js_name = runWordsJson)]
    pub fn run_words_json(&self) -> String {
        to_json(&self.session.run_words())
    }

    #[wasm_bindgen(js_name = combatJson)]
    pub fn combat_json(&self) -> String {
        let Some(combat) = self.session.combat() else {
            return "null".to_string();
        };
        let board = combat.board();
        let view = CombatView {
            level: combat.level(),
            hp: combat.hp(),
            max_hp: combat.max_hp(),
            floor: combat.floor(),
            progress: combat.progress(),
            status: combat.status(),
            hint: board.map(|b| b.word.cn.as_str()),
            bubbles: board.map(|b| b.bubbles.as_slice()).unwrap_or(&[]),
            filled: board
                .map(|b| b.filled.iter().map(|f| f.text.as_str()).collect())
                .unwrap_or_default(),
        };
        to_json(&view)
    }

    #[wasm_bindgen(js_name = settlementJson)]
    pub fn settlement_json(&self) -> String {
        match self.session.phase() {
            Phase::Settlement => to_json(&self.session.settlement()),
            _ => "null".to_string(),
        }
    }

    #[wasm_bindgen(js_name = drainEventsJson)]
    pub fn drain_events_json(&mut self) -> String {
        to_json(&self.session.drain_events())
    }

    #[wasm_bindgen(js_name = resetSave)]
    pub fn reset_save(&mut self) {
        self.session.saves_mut().reset();
    }

    #[wasm_bindgen(js_name = settingsJson)]
    pub fn settings_json(&self) -> String {
        to_json(&Settings::load(self.session.saves().store()))
    }

    #[wasm_bindgen(js_name = saveSettings)]
    pub fn save_settings(&mut self, settings_json: &str) -> Result<(), JsValue> {
        let settings: Settings =
            serde_json::from_str(settings_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        settings.save(self.session.saves_mut().store_mut());
        Ok(())
    }

    #[wasm_bindgen(js_name = decksJson)]
    pub fn decks_json(&self) -> String {
        to_json(&self.decks.decks())
    }

    /// Create a deck from a JSON `DeckDraft`; returns the new deck id
    #[wasm_bindgen(js_name = createDeck)]
    pub fn create_deck(&mut self, draft_json: &str) -> Result<String, JsValue> {
        let draft: DeckDraft =
            serde_json::from_str(draft_json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(self.decks.create(draft, now_ms()).id.clone())
    }
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialised".into());
    }
    log::info!("Memory Dungeon (web) ready");
}
