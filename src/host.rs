//! Host collaborator interfaces.
//!
//! The coordinator never talks to a browser directly; it consumes these
//! traits. `rpc_host::RpcHost` implements them over the JSON-RPC bridge.

use async_trait::async_trait;
use serde::Serialize;

use crate::types::errors::{HostError, InjectionError};
use crate::types::navigation::{FrameId, TabId};

/// Snapshot of a tab as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabInfo {
    pub tab_id: TabId,
    pub url: Option<String>,
    pub alive: bool,
}

/// Execution context the payload runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExecutionWorld {
    /// The page's own script context (`"MAIN"`).
    #[serde(rename = "MAIN")]
    Page,
}

/// Request to deploy a payload into specific frames of a tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InjectionRequest {
    pub tab_id: TabId,
    pub frame_ids: Vec<FrameId>,
    pub world: ExecutionWorld,
    /// Run before any of the frame's own scripts.
    pub inject_immediately: bool,
    pub code: String,
}

/// Tab/browsing-context query facility.
#[async_trait]
pub trait TabQuery: Send + Sync {
    async fn tab_info(&self, tab_id: TabId) -> Result<TabInfo, HostError>;
}

/// Script and stylesheet injection facility.
#[async_trait]
pub trait ScriptInjector: Send + Sync {
    /// Deploys `request.code`; returns the payload's liveness value if the host reports one.
    async fn execute_script(&self, request: InjectionRequest) -> Result<Option<serde_json::Value>, InjectionError>;
    /// Injects a user-origin stylesheet into every frame of the tab.
    async fn insert_css(&self, tab_id: TabId, css: &str) -> Result<(), InjectionError>;
}

/// Badge/status rendering facility. Empty text clears the badge.
#[async_trait]
pub trait StatusIndicator: Send + Sync {
    async fn set_badge_text(&self, tab_id: TabId, text: &str) -> Result<(), HostError>;
}

/// Everything the coordinator needs from the host.
pub trait BrowserHost: TabQuery + ScriptInjector + StatusIndicator {}

impl<T: TabQuery + ScriptInjector + StatusIndicator> BrowserHost for T {}
