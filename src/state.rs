//! Loading and saving the top-level containers.
//!
//! Each container lives under its own key as JSON. Loading never fails: a
//! missing key, a store error or a value that no longer parses all yield the
//! empty default. Saving writes the whole container back.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{info, warn};

use crate::assets::{AssetBook, StoredMonthEntry};
use crate::database::{Database, DatabaseError};
use crate::dates::MonthKey;
use crate::gate::PinGate;
use crate::models::{AvoidList, Board, GoalBook, TodoBook};

pub const TODOS_KEY: &str = "todos";
pub const GOALS_KEY: &str = "goals";
pub const AVOID_KEY: &str = "avoid";
pub const ASSETS_KEY: &str = "assets";
pub const ASSETS_PIN_KEY: &str = "assets_pin";
pub const BOARD_KEY: &str = "board_posts";
pub const BOARD_PIN_KEY: &str = "board_admin_pin";

#[derive(Debug, Error)]
pub enum StateError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),
    #[error("Failed to serialize {key}: {source}")]
    SerializeError {
        key: &'static str,
        source: serde_json::Error,
    },
}

/// Read and parse `key`, falling back to `T::default()` on any problem
pub fn load_or_default<T: DeserializeOwned + Default>(db: &Database, key: &str) -> T {
    let raw = match db.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            warn!("Could not read {key}, using empty default: {e}");
            return T::default();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!("Stored {key} is malformed, using empty default: {e}");
            T::default()
        }
    }
}

pub fn save_value<T: Serialize>(db: &Database, key: &'static str, value: &T) -> Result<(), StateError> {
    let raw = serde_json::to_string(value).map_err(|source| StateError::SerializeError { key, source })?;
    db.set(key, &raw)?;
    Ok(())
}

macro_rules! keyed_container {
    ($ty:ty, $key:expr) => {
        impl $ty {
            pub fn load(db: &Database) -> Self {
                load_or_default(db, $key)
            }

            pub fn save(&self, db: &Database) -> Result<(), StateError> {
                save_value(db, $key, self)
            }
        }
    };
}

keyed_container!(TodoBook, TODOS_KEY);
keyed_container!(GoalBook, GOALS_KEY);
keyed_container!(AvoidList, AVOID_KEY);
keyed_container!(Board, BOARD_KEY);

impl AssetBook {
    /// Load assets, converting legacy bare-number months. When anything was
    /// converted the normalized book is written back right away.
    pub fn load(db: &Database) -> Self {
        let stored: BTreeMap<MonthKey, StoredMonthEntry> = load_or_default(db, ASSETS_KEY);
        let (book, migrated) = AssetBook::from_stored(stored);
        if migrated > 0 {
            info!("Converted {migrated} legacy asset month(s)");
            if let Err(e) = book.save(db) {
                warn!("Could not write converted assets back: {e}");
            }
        }
        book
    }

    pub fn save(&self, db: &Database) -> Result<(), StateError> {
        save_value(db, ASSETS_KEY, self)
    }
}

/// Build a gate from the PIN stored under `key` (empty when absent)
pub fn load_gate(db: &Database, key: &str) -> PinGate {
    PinGate::new(load_or_default::<String>(db, key))
}

pub fn save_pin(db: &Database, key: &'static str, gate: &PinGate) -> Result<(), StateError> {
    save_value(db, key, &gate.pin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::DateKey;

    #[test]
    fn test_missing_keys_load_as_empty() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(TodoBook::load(&db), TodoBook::default());
        assert_eq!(GoalBook::load(&db), GoalBook::default());
        assert_eq!(AvoidList::load(&db), AvoidList::default());
        assert_eq!(AssetBook::load(&db), AssetBook::default());
        assert_eq!(Board::load(&db), Board::default());
        assert!(load_gate(&db, ASSETS_PIN_KEY).is_unlocked());
    }

    #[test]
    fn test_malformed_value_falls_back_to_default() {
        let db = Database::open_in_memory().unwrap();
        db.set(TODOS_KEY, "{not json").unwrap();
        db.set(GOALS_KEY, r#"["wrong shape"]"#).unwrap();
        assert_eq!(TodoBook::load(&db), TodoBook::default());
        assert_eq!(GoalBook::load(&db), GoalBook::default());
    }

    #[test]
    fn test_round_trip_through_store() {
        let db = Database::open_in_memory().unwrap();
        let day: DateKey = "2025-06-01".parse().unwrap();
        let todos = TodoBook::default().add(day, "call mom", 2);
        todos.save(&db).unwrap();
        assert_eq!(TodoBook::load(&db), todos);
    }

    #[test]
    fn test_legacy_assets_are_written_back_once() {
        let db = Database::open_in_memory().unwrap();
        db.set(ASSETS_KEY, r#"{"2025-01":100}"#).unwrap();

        let first = AssetBook::load(&db);
        let stored_after_first = db.get(ASSETS_KEY).unwrap().unwrap();
        assert!(stored_after_first.contains("legacy-2025-01"));

        let second = AssetBook::load(&db);
        assert_eq!(first, second);
        assert_eq!(db.get(ASSETS_KEY).unwrap().unwrap(), stored_after_first);
    }

    #[test]
    fn test_pin_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let mut gate = load_gate(&db, BOARD_PIN_KEY);
        gate.set_pin("2468").unwrap();
        save_pin(&db, BOARD_PIN_KEY, &gate).unwrap();

        let reloaded = load_gate(&db, BOARD_PIN_KEY);
        assert!(!reloaded.is_unlocked());
        assert_eq!(reloaded.pin(), "2468");
    }
}
