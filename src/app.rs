//! App Core for Pagefreeze.
//!
//! Composition root: loads settings, opens the durable store and wires the
//! preference store, decision engine and navigation coordinator together.

use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::host::BrowserHost;
use crate::managers::navigation_coordinator::NavigationCoordinator;
use crate::platform;
use crate::services::freeze_engine::FreezeDecisionEngine;
use crate::services::kv_store::{SettingsStore, SqliteSettingsStore};
use crate::services::preference_store::OriginPreferenceStore;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::errors::{SettingsError, StorageError};
use crate::types::settings::FreezeSettings;

pub struct App {
    settings_engine: Mutex<SettingsEngine>,
    pub coordinator: NavigationCoordinator,
}

impl App {
    /// Builds the app from explicit collaborators.
    pub fn new(mut settings_engine: SettingsEngine, backend: Arc<dyn SettingsStore>, host: Arc<dyn BrowserHost>) -> Self {
        let settings = settings_engine.load_or_default();
        let store = Arc::new(OriginPreferenceStore::new(backend, settings.storage_key.clone()));
        let engine = FreezeDecisionEngine::new(store);
        let coordinator = NavigationCoordinator::new(engine, host, settings);
        Self {
            settings_engine: Mutex::new(settings_engine),
            coordinator,
        }
    }

    /// Builds the app with `settings.json` and `pagefreeze.db` both in `data_dir`.
    pub fn open(data_dir: &Path, host: Arc<dyn BrowserHost>) -> Result<Self, StorageError> {
        let settings_path = data_dir.join("settings.json").to_string_lossy().to_string();
        Self::open_with(data_dir, SettingsEngine::new(Some(settings_path)), host)
    }

    /// Builds the app with the platform config file and the platform data directory.
    pub fn open_default(host: Arc<dyn BrowserHost>) -> Result<Self, StorageError> {
        Self::open_with(&platform::get_data_dir(), SettingsEngine::new(None), host)
    }

    fn open_with(data_dir: &Path, settings_engine: SettingsEngine, host: Arc<dyn BrowserHost>) -> Result<Self, StorageError> {
        std::fs::create_dir_all(data_dir)
            .map_err(|e| StorageError::Unavailable(format!("create {}: {}", data_dir.display(), e)))?;
        let backend = SqliteSettingsStore::open(data_dir.join("pagefreeze.db"))?;
        Ok(Self::new(settings_engine, Arc::new(backend), host))
    }

    pub fn settings(&self) -> FreezeSettings {
        self.coordinator.settings()
    }

    /// Updates one setting, persists it and applies it to later events.
    ///
    /// `storage_key` is read once at startup; changing it takes effect on restart.
    pub fn update_setting(&self, key: &str, value: serde_json::Value) -> Result<FreezeSettings, SettingsError> {
        let settings = {
            let mut engine = self.settings_engine.lock().unwrap_or_else(|e| e.into_inner());
            engine.set_value(key, value)?;
            engine.get_settings().clone()
        };
        self.coordinator.apply_settings(settings.clone());
        Ok(settings)
    }

    pub fn reset_settings(&self) -> Result<FreezeSettings, SettingsError> {
        let settings = {
            let mut engine = self.settings_engine.lock().unwrap_or_else(|e| e.into_inner());
            engine.reset()?;
            engine.get_settings().clone()
        };
        self.coordinator.apply_settings(settings.clone());
        Ok(settings)
    }
}
