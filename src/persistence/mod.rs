//! Save record persistence
//!
//! Features:
//! - One JSON record under a fixed key
//! - Missing fields fall back to defaults on load
//! - Read-merge-write updates from partial patches
//! - Storage failures are logged and never surface to gameplay

use crate::clamp_floor;
use crate::consts::MAX_FLOOR;
use crate::platform::{KeyValueStore, now_ms};
use crate::sim::state::{GameState, GameStatePatch};

/// Accessor for the persisted `GameState`
#[derive(Debug)]
pub struct SaveStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> SaveStore<S> {
    /// Storage key for the save record
    pub const STORAGE_KEY: &'static str = "dungeon_ascension_save";

    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Load the save; defaults when absent or unreadable
    ///
    /// A stored floor outside the dungeon is clamped back into `[0, MAX_FLOOR]`.
    pub fn read(&self) -> GameState {
        match self.store.get_item(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<GameState>(&json) {
                Ok(mut state) => {
                    if state.current_floor > MAX_FLOOR {
                        log::warn!("Stored floor {} out of range", state.current_floor);
                        state.current_floor = clamp_floor(state.current_floor as i64);
                    }
                    return state;
                }
                Err(e) => log::warn!("Corrupt save ignored: {}", e),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Save read failed: {}", e),
        }
        GameState::default()
    }

    /// Overwrite the save (best effort)
    pub fn write(&mut self, state: &GameState) {
        let json = match serde_json::to_string(state) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Save encode failed: {}", e);
                return;
            }
        };
        match self.store.set_item(Self::STORAGE_KEY, &json) {
            Ok(()) => log::debug!("Game saved (floor {})", state.current_floor),
            Err(e) => log::warn!("Save write failed: {}", e),
        }
    }

    /// Merge `patch` over the stored record, save, and return the result
    pub fn update(&mut self, patch: GameStatePatch) -> GameState {
        let merged = patch.merge(&self.read());
        self.write(&merged);
        merged
    }

    /// Delete the save and return fresh defaults
    pub fn reset(&mut self) -> GameState {
        if let Err(e) = self.store.remove_item(Self::STORAGE_KEY) {
            log::warn!("Save reset failed: {}", e);
        }
        log::info!("Save reset");
        GameState::new(now_ms())
    }

    /// Update the login streak for a login at `now` (ms)
    pub fn record_login(&mut self, now: f64) -> GameState {
        let mut state = self.read();
        if state.register_login(now) {
            log::info!("Login streak: {} days", state.consecutive_logins);
            self.write(&state);
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{MemoryStore, StorageError};
    use crate::sim::state::LanternStats;
    use proptest::prelude::*;

    /// Store whose every operation fails
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable)
        }

        fn set_item(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Backend("quota exceeded".to_string()))
        }

        fn remove_item(&mut self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }
    }

    type Saves = SaveStore<MemoryStore>;

    #[test]
    fn test_read_defaults_when_absent() {
        let saves = SaveStore::new(MemoryStore::new());
        let state = saves.read();
        assert_eq!(state.current_floor, 1000);
        assert_eq!(state.lantern.fuel, 3);
    }

    #[test]
    fn test_read_defaults_on_corrupt_json() {
        let mut store = MemoryStore::new();
        store.set_item(Saves::STORAGE_KEY, "{not json").unwrap();
        let saves = SaveStore::new(store);
        assert_eq!(saves.read().current_floor, 1000);
    }

    #[test]
    fn test_read_merges_partial_record() {
        let mut store = MemoryStore::new();
        store
            .set_item(Saves::STORAGE_KEY, r#"{"currentFloor": 512, "soulFire": 9}"#)
            .unwrap();
        let state = SaveStore::new(store).read();
        assert_eq!(state.current_floor, 512);
        assert_eq!(state.soul_fire, 9);
        assert_eq!(state.lantern, LanternStats::default());
    }

    #[test]
    fn test_read_clamps_out_of_range_floor() {
        let mut store = MemoryStore::new();
        store
            .set_item(Saves::STORAGE_KEY, r#"{"currentFloor": 5000, "soulFire": 2}"#)
            .unwrap();
        let mut saves = SaveStore::new(store);
        assert_eq!(saves.read().current_floor, 1000);
        assert_eq!(saves.read().soul_fire, 2);

        let merged = saves.update(GameStatePatch {
            soul_fire: Some(3),
            ..Default::default()
        });
        assert_eq!(merged.current_floor, 1000);
        let raw = saves.store().get_item(Saves::STORAGE_KEY).unwrap().unwrap();
        assert!(raw.contains("\"currentFloor\":1000"));
    }

    #[test]
    fn test_read_clamps_max_u32_floor() {
        let mut store = MemoryStore::new();
        store
            .set_item(Saves::STORAGE_KEY, &format!(r#"{{"currentFloor": {}}}"#, u32::MAX))
            .unwrap();
        assert_eq!(SaveStore::new(store).read().current_floor, 1000);
    }

    #[test]
    fn test_broken_store_never_fails() {
        let mut saves = SaveStore::new(BrokenStore);
        assert_eq!(saves.read().current_floor, 1000);
        let state = saves.update(GameStatePatch {
            soul_fire: Some(3),
            ..Default::default()
        });
        assert_eq!(state.soul_fire, 3);
        assert_eq!(saves.reset().current_floor, 1000);
    }

    #[test]
    fn test_update_persists() {
        let mut saves = SaveStore::new(MemoryStore::new());
        saves.write(&GameState::new(1.0));
        let merged = saves.update(GameStatePatch {
            current_floor: Some(938),
            ..Default::default()
        });
        assert_eq!(merged.current_floor, 938);
        assert_eq!(saves.read(), merged);

        let raw = saves.store().get_item(Saves::STORAGE_KEY).unwrap().unwrap();
        assert!(raw.contains("\"currentFloor\":938"));
    }

    #[test]
    fn test_reset_removes_save() {
        let mut saves = SaveStore::new(MemoryStore::new());
        saves.update(GameStatePatch {
            soul_fire: Some(40),
            ..Default::default()
        });
        saves.reset();
        assert!(saves.store().is_empty());
        assert_eq!(saves.read().soul_fire, 0);
    }

    proptest! {
        #[test]
        fn update_is_shallow_merge_of_read(
            floor in proptest::option::of(0u32..=1000),
            fire in proptest::option::of(0u64..10_000),
            fuel in proptest::option::of(0u32..10),
        ) {
            let mut saves = SaveStore::new(MemoryStore::new());
            saves.write(&GameState::new(1.0));
            let before = saves.read();

            let patch = GameStatePatch {
                current_floor: floor,
                soul_fire: fire,
                lantern: fuel.map(|fuel| LanternStats { fuel, ..Default::default() }),
                ..Default::default()
            };
            let merged = saves.update(patch.clone());

            prop_assert_eq!(&merged, &patch.merge(&before));
            prop_assert_eq!(saves.read(), merged);
        }
    }
}
