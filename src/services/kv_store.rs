//! Durable key-value settings stores.
//!
//! The preference store only needs `get(key, default)` and `set(key, value)`;
//! two backends are provided: SQLite (the default for the RPC host) and a
//! single JSON object file.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};
use serde_json::{Map, Value};

use crate::database::Database;
use crate::types::errors::StorageError;

/// Durable key-value settings store.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Returns the stored value for `key`, or `default` when absent.
    async fn get(&self, key: &str, default: Value) -> Result<Value, StorageError>;
    /// Stores `value` under `key`. Returns only once the value is durable.
    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;
}

// ─── SQLite ───

/// Settings store backed by the `kv_settings` table.
pub struct SqliteSettingsStore {
    db: Arc<Mutex<Database>>,
}

impl SqliteSettingsStore {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        Ok(Self::new(Database::open(path)?))
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Ok(Self::new(Database::open_in_memory()?))
    }

    async fn with_db<T, F>(&self, op: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T, StorageError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let guard = db
                .lock()
                .map_err(|e| StorageError::Unavailable(format!("database lock poisoned: {}", e)))?;
            op(&guard)
        })
        .await
        .map_err(|e| StorageError::Unavailable(e.to_string()))?
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn get(&self, key: &str, default: Value) -> Result<Value, StorageError> {
        let key = key.to_string();
        let raw: Option<String> = self
            .with_db(move |db| {
                db.connection()
                    .query_row(
                        "SELECT value FROM kv_settings WHERE key = ?1",
                        params![key],
                        |row| row.get(0),
                    )
                    .optional()
                    .map_err(StorageError::from)
            })
            .await?;

        match raw {
            Some(text) => serde_json::from_str(&text).map_err(|e| StorageError::Serialization(e.to_string())),
            None => Ok(default),
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let key = key.to_string();
        let text = serde_json::to_string(&value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;
        self.with_db(move |db| {
            db.connection().execute(
                "INSERT INTO kv_settings (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, text, now],
            )?;
            Ok(())
        })
        .await
    }
}

// ─── JSON file ───

/// Settings store persisted as one JSON object file.
///
/// Writes go to a sibling temp file that is then renamed over the target, so
/// readers never observe a half-written file.
pub struct JsonFileSettingsStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonFileSettingsStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Map<String, Value>, StorageError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(StorageError::Unavailable(format!("{}: {}", self.path.display(), e))),
        };
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(StorageError::Serialization("settings file is not a JSON object".to_string())),
            Err(e) => Err(StorageError::Serialization(e.to_string())),
        }
    }
}

#[async_trait]
impl SettingsStore for JsonFileSettingsStore {
    async fn get(&self, key: &str, default: Value) -> Result<Value, StorageError> {
        let map = self.read_all().await?;
        Ok(map.get(key).cloned().unwrap_or(default))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;

        // A corrupt file is replaced rather than blocking every future write.
        let mut map = match self.read_all().await {
            Ok(map) => map,
            Err(StorageError::Serialization(msg)) => {
                tracing::warn!(path = %self.path.display(), error = %msg, "discarding unreadable settings file");
                Map::new()
            }
            Err(e) => return Err(e),
        };
        map.insert(key.to_string(), value);

        let json = serde_json::to_string_pretty(&Value::Object(map))
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::Unavailable(format!("create {}: {}", parent.display(), e)))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| StorageError::Unavailable(format!("write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StorageError::Unavailable(format!("rename {}: {}", tmp.display(), e)))?;
        Ok(())
    }
}
