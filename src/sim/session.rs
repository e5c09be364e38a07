//! Phase controller
//!
//! Drives a run through home -> memo -> combat -> settlement. Inputs arrive as
//! `SessionInput`s, time advances through `Session::tick`. Timers belong to the
//! phase that started them, so leaving a phase cancels them.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::combat::{Combat, CombatEvent};
use super::settlement::{Settlement, settle};
use super::state::GameStatePatch;
use super::words::{WordData, pick_session_words, word_catalog};
use crate::consts::*;
use crate::persistence::SaveStore;
use crate::platform::KeyValueStore;

/// Top-level phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Title screen
    Home,
    /// Study the run's words
    Memo,
    /// Spell them back
    Combat,
    /// Floors climbed or lost
    Settlement,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Home => "home",
            Phase::Memo => "memo",
            Phase::Combat => "combat",
            Phase::Settlement => "settlement",
        }
    }
}

/// Player commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionInput {
    /// Begin a run from home
    Start,
    /// Done memorizing
    Ready,
    /// Tap a bubble
    Pick(u32),
    /// Take back the last slot
    Undo,
    /// Leave the settlement screen
    Continue,
    /// Abandon the run and go home
    Retreat,
    /// Pause overlay toggle
    TogglePause,
}

/// Things the view layer may want to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    PhaseChanged(Phase),
    WordSolved { word_id: u32 },
    WrongAnswer { hp: u32 },
    Settled(Settlement),
    Paused(bool),
}

#[derive(Debug, Clone)]
enum PhaseState {
    Home,
    Memo {
        words: Vec<WordData>,
        remaining_ms: u32,
    },
    Combat(Combat),
    Settlement(Settlement),
}

impl PhaseState {
    fn phase(&self) -> Phase {
        match self {
            PhaseState::Home => Phase::Home,
            PhaseState::Memo { .. } => Phase::Memo,
            PhaseState::Combat(_) => Phase::Combat,
            PhaseState::Settlement(_) => Phase::Settlement,
        }
    }
}

/// A play session over one save store
pub struct Session<S: KeyValueStore> {
    saves: SaveStore<S>,
    catalog: Vec<WordData>,
    rng: Pcg32,
    state: PhaseState,
    paused: bool,
    events: Vec<SessionEvent>,
}

impl<S: KeyValueStore> Session<S> {
    /// New session with the built-in catalog; records a login at `now` (ms)
    pub fn new(store: S, seed: u64, now: f64) -> Self {
        Self::with_catalog(store, word_catalog(), seed, now)
    }

    pub fn with_catalog(store: S, catalog: Vec<WordData>, seed: u64, now: f64) -> Self {
        let mut saves = SaveStore::new(store);
        saves.record_login(now);
        Self {
            saves,
            catalog,
            rng: Pcg32::seed_from_u64(seed),
            state: PhaseState::Home,
            paused: false,
            events: Vec::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn saves(&self) -> &SaveStore<S> {
        &self.saves
    }

    pub fn saves_mut(&mut self) -> &mut SaveStore<S> {
        &mut self.saves
    }

    /// Words of the current run (memo or combat)
    pub fn run_words(&self) -> &[WordData] {
        match &self.state {
            PhaseState::Memo { words, .. } => words,
            PhaseState::Combat(combat) => combat.words(),
            _ => &[],
        }
    }

    /// Memo countdown left (ms)
    pub fn memo_remaining_ms(&self) -> Option<u32> {
        match &self.state {
            PhaseState::Memo { remaining_ms, .. } => Some(*remaining_ms),
            _ => None,
        }
    }

    pub fn combat(&self) -> Option<&Combat> {
        match &self.state {
            PhaseState::Combat(combat) => Some(combat),
            _ => None,
        }
    }

    pub fn settlement(&self) -> Option<&Settlement> {
        match &self.state {
            PhaseState::Settlement(settlement) => Some(settlement),
            _ => None,
        }
    }

    /// Take events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    fn enter(&mut self, state: PhaseState) {
        let phase = state.phase();
        if matches!(state, PhaseState::Home | PhaseState::Settlement(_)) {
            self.paused = false;
        }
        self.state = state;
        log::info!("Phase -> {}", phase.as_str());
        self.events.push(SessionEvent::PhaseChanged(phase));
    }

    fn begin_memo(&mut self) {
        let words = pick_session_words(&self.catalog, SESSION_WORD_COUNT, &mut self.rng);
        let remaining_ms = self.saves.read().memo_duration_ms();
        self.enter(PhaseState::Memo {
            words,
            remaining_ms,
        });
    }

    fn begin_combat(&mut self, words: Vec<WordData>) {
        let state = self.saves.read();
        let combat = Combat::new(words, state.lantern.fuel, state.current_floor, &mut self.rng);
        self.enter(PhaseState::Combat(combat));
    }

    /// Apply one player command
    pub fn handle(&mut self, input: SessionInput) {
        let active = matches!(self.state, PhaseState::Memo { .. } | PhaseState::Combat(_));

        if input == SessionInput::TogglePause {
            if !active {
                self.ignore(input);
                return;
            }
            self.paused = !self.paused;
            log::info!("Paused: {}", self.paused);
            self.events.push(SessionEvent::Paused(self.paused));
            return;
        }

        if self.paused && active && input != SessionInput::Retreat {
            log::debug!("{:?} ignored while paused", input);
            return;
        }

        match input {
            SessionInput::Start if matches!(self.state, PhaseState::Home) => self.begin_memo(),
            SessionInput::Ready => {
                if let PhaseState::Memo { words, .. } = &mut self.state {
                    let words = std::mem::take(words);
                    self.begin_combat(words);
                } else {
                    self.ignore(input);
                }
            }
            SessionInput::Pick(bubble_id) => {
                let event = match &mut self.state {
                    PhaseState::Combat(combat) => combat.pick(bubble_id),
                    _ => None,
                };
                if let Some(event) = event {
                    self.on_combat_event(event);
                }
            }
            SessionInput::Undo => {
                if let PhaseState::Combat(combat) = &mut self.state {
                    combat.undo();
                }
            }
            SessionInput::Continue => {
                let below_surface = match &self.state {
                    PhaseState::Settlement(settlement) => {
                        Some(settlement.target_floor > SURFACE_FLOOR)
                    }
                    _ => None,
                };
                match below_surface {
                    Some(true) => self.begin_memo(),
                    Some(false) => self.enter(PhaseState::Home),
                    None => self.ignore(input),
                }
            }
            SessionInput::Retreat if active => self.enter(PhaseState::Home),
            _ => self.ignore(input),
        }
    }

    fn ignore(&self, input: SessionInput) {
        log::debug!("{:?} ignored in {}", input, self.phase().as_str());
    }

    /// Advance phase timers by `dt_ms`; frozen while paused
    pub fn tick(&mut self, dt_ms: u32) {
        if self.paused {
            return;
        }

        match &mut self.state {
            PhaseState::Memo {
                words,
                remaining_ms,
            } => {
                *remaining_ms = remaining_ms.saturating_sub(dt_ms);
                if *remaining_ms == 0 {
                    let words = std::mem::take(words);
                    self.begin_combat(words);
                }
            }
            PhaseState::Combat(combat) => {
                if let Some(event) = combat.advance(dt_ms, &mut self.rng) {
                    self.on_combat_event(event);
                }
            }
            PhaseState::Home | PhaseState::Settlement(_) => {}
        }
    }

    fn on_combat_event(&mut self, event: CombatEvent) {
        match event {
            CombatEvent::Solved { word_id } => {
                // Soul fire is banked per word so it survives an abandoned run
                let soul_fire = self.saves.read().soul_fire.saturating_add(1);
                self.saves.update(GameStatePatch {
                    soul_fire: Some(soul_fire),
                    ..Default::default()
                });
                self.events.push(SessionEvent::WordSolved { word_id });
            }
            CombatEvent::Wrong { hp } => {
                self.events.push(SessionEvent::WrongAnswer { hp });
            }
            CombatEvent::Completed(result) => {
                let state = self.saves.read();
                let settlement = settle(&result, &state);
                self.saves.update(settlement.patch(&state));
                self.events.push(SessionEvent::Settled(settlement.clone()));
                self.enter(PhaseState::Settlement(settlement));
            }
        }
    }
}
