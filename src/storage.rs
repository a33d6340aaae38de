//! Durable key -> blob state store
//!
//! The engine persists each state slice (history, snippets, monitoring
//! flag) as a JSON blob under a fixed key, synchronously after every
//! mutation. `RedbStore` is the embedded-database implementation;
//! `MemoryStore` is the fallback when the database cannot be opened and
//! the double used by tests.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use directories::ProjectDirs;
use redb::{Database, ReadableTable, TableDefinition};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::shared::error::{CommandError, CommandResult};

/// Persisted state keys
pub const KEY_HISTORY: &str = "clipboardHistory";
pub const KEY_SNIPPETS: &str = "snippets";
pub const KEY_MONITORING: &str = "monitoringEnabled";
pub const KEY_SCHEMA_VERSION: &str = "schemaVersion";

/// Current persisted-state schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Redb table holding one JSON blob per state key
const STATE_TABLE: TableDefinition<&str, &str> = TableDefinition::new("app_state");

/// Key -> blob store the engine persists through
pub trait StateStore: Send + Sync {
    fn get(&self, key: &str) -> CommandResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> CommandResult<()>;
}

/// Read a state slice, deserializing its JSON blob. Missing key -> `None`.
pub fn read_slice<T: DeserializeOwned>(
    store: &dyn StateStore,
    key: &str,
) -> CommandResult<Option<T>> {
    match store.get(key)? {
        Some(blob) => Ok(Some(serde_json::from_str(&blob)?)),
        None => Ok(None),
    }
}

/// Serialize and write a state slice under its key.
pub fn write_slice<T: Serialize>(store: &dyn StateStore, key: &str, value: &T) -> CommandResult<()> {
    let blob = serde_json::to_string(value)?;
    store.set(key, &blob)
}

/// Redb-based store implementation
pub struct RedbStore {
    db: Arc<Mutex<Database>>,
}

impl RedbStore {
    pub fn new(db_path: PathBuf) -> CommandResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CommandError::SystemIO(format!("Failed to create data directory: {}", e)))?;
        }

        let db = Database::create(&db_path)
            .map_err(|e| CommandError::SystemIO(format!("Failed to create database: {}", e)))?;

        // Initialize table so later reads never see a missing table
        {
            let write_txn = db.begin_write()
                .map_err(|e| CommandError::SystemIO(format!("Failed to begin write transaction: {}", e)))?;
            {
                let _table = write_txn.open_table(STATE_TABLE)
                    .map_err(|e| CommandError::SystemIO(format!("Failed to open table: {}", e)))?;
            }
            write_txn.commit()
                .map_err(|e| CommandError::SystemIO(format!("Failed to commit transaction: {}", e)))?;
        }

        Ok(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }

    /// Default on-disk location under the platform data directory.
    pub fn default_path() -> CommandResult<PathBuf> {
        ProjectDirs::from("com", "antigravity", "collector")
            .map(|dirs| dirs.data_dir().join("state.redb"))
            .ok_or_else(|| CommandError::SystemIO("Failed to get project directories".to_string()))
    }
}

impl StateStore for RedbStore {
    fn get(&self, key: &str) -> CommandResult<Option<String>> {
        let db = self.db.lock()
            .map_err(|e| CommandError::SystemIO(format!("Mutex poisoned: {}", e)))?;

        let read_txn = db.begin_read()
            .map_err(|e| CommandError::SystemIO(format!("Failed to begin read: {}", e)))?;

        let table = read_txn.open_table(STATE_TABLE)
            .map_err(|e| CommandError::SystemIO(format!("Failed to open table: {}", e)))?;

        let value = table.get(key)
            .map_err(|e| CommandError::SystemIO(format!("Failed to read key: {}", e)))?
            .map(|guard| guard.value().to_string());

        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> CommandResult<()> {
        let db = self.db.lock()
            .map_err(|e| CommandError::SystemIO(format!("Mutex poisoned: {}", e)))?;

        let write_txn = db.begin_write()
            .map_err(|e| CommandError::SystemIO(format!("Failed to begin write: {}", e)))?;

        {
            let mut table = write_txn.open_table(STATE_TABLE)
                .map_err(|e| CommandError::SystemIO(format!("Failed to open table: {}", e)))?;

            table.insert(key, value)
                .map_err(|e| CommandError::SystemIO(format!("Failed to insert: {}", e)))?;
        }

        write_txn.commit()
            .map_err(|e| CommandError::SystemIO(format!("Failed to commit: {}", e)))?;

        Ok(())
    }
}

/// In-memory fallback store (used if database initialization fails)
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> CommandResult<Option<String>> {
        let entries = self.entries.lock()
            .map_err(|e| CommandError::SystemIO(format!("Mutex poisoned: {}", e)))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> CommandResult<()> {
        let mut entries = self.entries.lock()
            .map_err(|e| CommandError::SystemIO(format!("Mutex poisoned: {}", e)))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Open the default on-disk store, falling back to memory when the
/// database cannot be created (state is then session-only).
pub fn open_default_store() -> Arc<dyn StateStore> {
    match RedbStore::default_path().and_then(RedbStore::new) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            log::error!("[Storage] Failed to open database: {}, using in-memory fallback", e);
            Arc::new(MemoryStore::new())
        }
    }
}
