//! Origin Preference Store.
//!
//! Durable origin set with an in-memory read cache. The first [`load`] reads
//! from the backing [`SettingsStore`]; later reads are served from the cache
//! unless a forced reload is requested. Mutations go through [`update`], which
//! holds the cache lock across read, persist and cache replacement.
//!
//! [`load`]: OriginPreferenceStore::load
//! [`update`]: OriginPreferenceStore::update

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;

use crate::services::kv_store::SettingsStore;
use crate::types::errors::StorageError;
use crate::types::origin::OriginSet;

pub struct OriginPreferenceStore {
    backend: Arc<dyn SettingsStore>,
    key: String,
    cache: Mutex<Option<OriginSet>>,
}

impl OriginPreferenceStore {
    pub fn new(backend: Arc<dyn SettingsStore>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            cache: Mutex::new(None),
        }
    }

    /// Returns the origin set, reading durable state on first use or when `force` is set.
    ///
    /// Never fails: unreadable or corrupt durable state yields an empty set.
    pub async fn load(&self, force: bool) -> OriginSet {
        let mut cache = self.cache.lock().await;
        if force || cache.is_none() {
            *cache = Some(self.fetch().await);
        }
        cache.clone().unwrap_or_default()
    }

    /// Applies `mutate` to the current set and persists the result.
    ///
    /// The cache is replaced only after the backend acknowledged the write, so
    /// on failure every observer keeps seeing the pre-update set. Concurrent
    /// callers are serialized on the cache lock.
    pub async fn update<T, F>(&self, mutate: F) -> Result<(OriginSet, T), StorageError>
    where
        F: FnOnce(&mut OriginSet) -> T,
    {
        let mut cache = self.cache.lock().await;
        let current = match cache.as_ref() {
            Some(set) => set.clone(),
            None => {
                let fetched = self.fetch().await;
                *cache = Some(fetched.clone());
                fetched
            }
        };

        let mut next = current;
        let result = mutate(&mut next);
        self.save(&next).await?;
        *cache = Some(next.clone());
        Ok((next, result))
    }

    /// Persists `set` to the backend without touching the cache.
    pub async fn save(&self, set: &OriginSet) -> Result<(), StorageError> {
        let value = serde_json::to_value(set).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.backend.set(&self.key, value).await
    }

    async fn fetch(&self) -> OriginSet {
        let value = match self.backend.get(&self.key, Value::Array(Vec::new())).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "origin set unreadable, starting empty");
                return OriginSet::new();
            }
        };
        match serde_json::from_value::<OriginSet>(value) {
            Ok(set) => set,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "origin set corrupt, starting empty");
                OriginSet::new()
            }
        }
    }
}
