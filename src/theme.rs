//! Light/dark theme preference, persisted across sessions.

use serde::{Deserialize, Serialize};
use tracing::warn;
use ts_rs::TS;

use crate::store::{KvStore, THEME_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Stored form, shared with the original browser build.
    pub fn as_key(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_key())
    }
}

/// Read the stored preference; anything unrecognized falls back to light.
pub fn load_theme(store: &dyn KvStore) -> Theme {
    match store.get(THEME_KEY).as_deref() {
        None | Some("light") => Theme::Light,
        Some("dark") => Theme::Dark,
        Some(other) => {
            warn!(value = other, "Unrecognized stored theme; using light");
            Theme::Light
        }
    }
}

pub fn save_theme(store: &mut dyn KvStore, theme: Theme) {
    store.set(THEME_KEY, theme.as_key());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStore;

    #[test]
    fn missing_store_value_defaults_to_light() {
        let store = MemStore::new();
        assert_eq!(load_theme(&store), Theme::Light);
    }

    #[test]
    fn saved_theme_round_trips() {
        let mut store = MemStore::new();
        save_theme(&mut store, Theme::Dark);
        assert_eq!(load_theme(&store), Theme::Dark);
        save_theme(&mut store, Theme::Dark.toggled());
        assert_eq!(load_theme(&store), Theme::Light);
    }

    #[test]
    fn unrecognized_values_fall_back_to_light() {
        let mut store = MemStore::new();
        store.set(THEME_KEY, "solarized");
        assert_eq!(load_theme(&store), Theme::Light);
    }
}
