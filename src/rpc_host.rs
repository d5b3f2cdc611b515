//! Host implementation for the JSON-RPC bridge.
//!
//! Host actions are emitted as notification objects on an outgoing channel
//! (`{"action": "...", ...}`); the server writes them to stdout next to RPC
//! responses. Tab URLs are learned from the events the host sends us.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::mpsc::UnboundedSender;

use crate::host::{InjectionRequest, ScriptInjector, StatusIndicator, TabInfo, TabQuery};
use crate::types::errors::{HostError, InjectionError};
use crate::types::navigation::{TabId, TOP_LEVEL_FRAME_ID};

pub struct RpcHost {
    outgoing: UnboundedSender<Value>,
    tab_urls: Mutex<HashMap<TabId, String>>,
}

impl RpcHost {
    pub fn new(outgoing: UnboundedSender<Value>) -> Self {
        Self {
            outgoing,
            tab_urls: Mutex::new(HashMap::new()),
        }
    }

    fn tabs(&self) -> MutexGuard<'_, HashMap<TabId, String>> {
        self.tab_urls.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Records the current URL of a tab.
    pub fn note_tab_url(&self, tab_id: TabId, url: &str) {
        self.tabs().insert(tab_id, url.to_string());
    }

    pub fn forget_tab(&self, tab_id: TabId) {
        self.tabs().remove(&tab_id);
    }

    fn is_known(&self, tab_id: TabId) -> bool {
        self.tabs().contains_key(&tab_id)
    }

    fn emit(&self, notification: Value) -> Result<(), String> {
        self.outgoing
            .send(notification)
            .map_err(|_| "notification channel closed".to_string())
    }
}

#[async_trait]
impl TabQuery for RpcHost {
    async fn tab_info(&self, tab_id: TabId) -> Result<TabInfo, HostError> {
        let url = self.tabs().get(&tab_id).cloned();
        match url {
            Some(url) => Ok(TabInfo {
                tab_id,
                url: Some(url),
                alive: true,
            }),
            None => Err(HostError::TabNotFound(tab_id)),
        }
    }
}

#[async_trait]
impl ScriptInjector for RpcHost {
    async fn execute_script(&self, request: InjectionRequest) -> Result<Option<Value>, InjectionError> {
        if !self.is_known(request.tab_id) {
            return Err(InjectionError::Refused {
                tab_id: request.tab_id,
                frame_id: request.frame_ids.first().copied().unwrap_or(TOP_LEVEL_FRAME_ID),
                reason: "unknown or closed tab".to_string(),
            });
        }
        let mut notification = serde_json::to_value(&request).map_err(|e| InjectionError::Failed(e.to_string()))?;
        if let Value::Object(map) = &mut notification {
            map.insert("action".to_string(), json!("execute_script"));
        }
        self.emit(notification).map_err(InjectionError::Failed)?;
        Ok(None)
    }

    async fn insert_css(&self, tab_id: TabId, css: &str) -> Result<(), InjectionError> {
        self.emit(json!({"action": "insert_css", "tab_id": tab_id, "css": css, "origin": "USER"}))
            .map_err(InjectionError::Failed)
    }
}

#[async_trait]
impl StatusIndicator for RpcHost {
    async fn set_badge_text(&self, tab_id: TabId, text: &str) -> Result<(), HostError> {
        self.emit(json!({"action": "set_badge", "tab_id": tab_id, "text": text}))
            .map_err(HostError::Unavailable)
    }
}
