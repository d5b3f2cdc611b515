//! Freeze Decision Engine.
//!
//! Freezing is plain set membership: an origin is frozen exactly when it is
//! in the persisted origin set. The engine owns the preference store and is
//! the only component that mutates it.

use std::sync::Arc;

use crate::services::preference_store::OriginPreferenceStore;
use crate::types::errors::StorageError;
use crate::types::origin::{Origin, OriginSet};

/// Pure membership test.
pub fn is_frozen(origin: &Origin, origins: &OriginSet) -> bool {
    origins.contains(origin)
}

pub struct FreezeDecisionEngine {
    store: Arc<OriginPreferenceStore>,
}

impl FreezeDecisionEngine {
    pub fn new(store: Arc<OriginPreferenceStore>) -> Self {
        Self { store }
    }

    /// Current origin set (cached after the first read).
    pub async fn snapshot(&self) -> OriginSet {
        self.store.load(false).await
    }

    /// Looks up `origin` against the current set.
    pub async fn check(&self, origin: &Origin) -> bool {
        is_frozen(origin, &self.snapshot().await)
    }

    /// Flips membership of `origin` and returns the new state.
    ///
    /// Completes only after the new set is durable. Overlapping toggles are
    /// serialized by the store, so each one observes its predecessor's result.
    ///
    /// # Errors
    /// Returns the storage error if the write failed; membership is unchanged.
    pub async fn toggle(&self, origin: &Origin) -> Result<bool, StorageError> {
        let (_, frozen) = self
            .store
            .update(|set| {
                if set.remove(origin) {
                    false
                } else {
                    set.insert(origin.clone())
                }
            })
            .await?;
        tracing::info!(origin = %origin, frozen, "origin toggled");
        Ok(frozen)
    }
}
