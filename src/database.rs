use rusqlite::{Connection, OptionalExtension};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    #[error("Failed to create database directory: {0}")]
    DirectoryError(String),
}

/// Key-value store backed by a single SQLite table.
///
/// Values are opaque serialized strings; every `set` overwrites the whole
/// value for its key (last write wins).
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the store at `path` and initialize the schema
    pub fn new(path: &str) -> Result<Self, DatabaseError> {
        let db_path = PathBuf::from(path);

        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DatabaseError::DirectoryError(e.to_string()))?;
            }
        }

        debug!("Opening store at {}", db_path.display());
        let conn = Connection::open(&db_path)?;

        let db = Database { conn };
        db.initialize_schema()?;

        Ok(db)
    }

    /// A throwaway store that lives only as long as the value
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let db = Database {
            conn: Connection::open_in_memory()?,
        };
        db.initialize_schema()?;
        Ok(db)
    }

    fn initialize_schema(&self) -> Result<(), DatabaseError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key             TEXT PRIMARY KEY,
                value           TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Read the serialized value stored under `key`
    pub fn get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        trace!(key, found = value.is_some(), "kv get");
        Ok(value)
    }

    /// Store `value` under `key`, replacing whatever was there
    pub fn set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            rusqlite::params![key, value, now],
        )?;
        trace!(key, bytes = value.len(), "kv set");
        Ok(())
    }

    /// All keys currently present, sorted
    pub fn keys(&self) -> Result<Vec<String>, DatabaseError> {
        let mut stmt = self.conn.prepare("SELECT key FROM kv ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_get_missing_key() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get("todos").unwrap(), None);
    }

    #[test]
    fn test_set_overwrites() {
        let db = Database::open_in_memory().unwrap();
        db.set("todos", "{}").unwrap();
        db.set("todos", r#"{"a":1}"#).unwrap();
        assert_eq!(db.get("todos").unwrap().as_deref(), Some(r#"{"a":1}"#));
        assert_eq!(db.keys().unwrap(), vec!["todos".to_string()]);
    }

    #[test]
    fn test_values_persist_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("daybook.db");
        let path = path.to_str().unwrap();

        Database::new(path).unwrap().set("assets_pin", "\"1234\"").unwrap();
        let reopened = Database::new(path).unwrap();
        assert_eq!(reopened.get("assets_pin").unwrap().as_deref(), Some("\"1234\""));
    }
}
