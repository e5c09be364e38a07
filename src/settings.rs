//! User preferences
//!
//! Persisted separately from the game save.

use serde::{Deserialize, Serialize};

use crate::platform::KeyValueStore;

/// App settings/preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Vibrate on taps and verdicts
    pub haptic: bool,
    /// Swipe to move between cards
    pub swipe_next: bool,
    /// Reveal card hints without asking
    pub default_show_hint: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            haptic: true,
            swipe_next: true,
            default_show_hint: false,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "settings";

    /// Load settings, falling back to defaults for anything missing
    pub fn load<S: KeyValueStore>(store: &S) -> Self {
        match store.get_item(Self::STORAGE_KEY) {
            Ok(Some(json)) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring unreadable settings: {}", e),
            },
            Ok(None) => {}
            Err(e) => log::warn!("Settings read failed: {}", e),
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings (best effort)
    pub fn save<S: KeyValueStore>(&self, store: &mut S) {
        if let Ok(json) = serde_json::to_string(self) {
            match store.set_item(Self::STORAGE_KEY, &json) {
                Ok(()) => log::info!("Settings saved"),
                Err(e) => log::warn!("Settings write failed: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;

    #[test]
    fn test_defaults_when_absent() {
        let store = MemoryStore::new();
        assert_eq!(Settings::load(&store), Settings::default());
    }

    #[test]
    fn test_partial_settings_merge_over_defaults() {
        let mut store = MemoryStore::new();
        store
            .set_item(Settings::STORAGE_KEY, r#"{"haptic": false}"#)
            .unwrap();
        let settings = Settings::load(&store);
        assert!(!settings.haptic);
        assert!(settings.swipe_next);
        assert!(!settings.default_show_hint);
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            default_show_hint: true,
            ..Default::default()
        };
        settings.save(&mut store);
        assert_eq!(Settings::load(&store), settings);

        let raw = store.get_item(Settings::STORAGE_KEY).unwrap().unwrap();
        assert!(raw.contains("defaultShowHint"));
    }

    #[test]
    fn test_garbage_falls_back() {
        let mut store = MemoryStore::new();
        store.set_item(Settings::STORAGE_KEY, "not json").unwrap();
        assert_eq!(Settings::load(&store), Settings::default());
    }
}
