//! RPC method handler for the Pagefreeze JSON-RPC protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be unit-tested. Host events
//! arrive as methods (`navigation.committed`, `tab.activated`, ...) and are
//! forwarded to the navigation coordinator; the remaining methods expose the
//! origin set, settings and the current neutralizer payload.

use serde_json::{json, Value};

use crate::app::App;
use crate::managers::navigation_coordinator::{EventOutcome, PendingNavigation};
use crate::rpc_host::RpcHost;
use crate::services::freeze_engine::is_frozen;
use crate::services::origin_resolver;
use crate::types::navigation::{FrameId, HostEvent, TabId, TOP_LEVEL_FRAME_ID};

fn param_str<'a>(params: &'a Value, name: &str) -> Result<&'a str, String> {
    params
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", name))
}

fn param_i64(params: &Value, name: &str) -> Result<i64, String> {
    params
        .get(name)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| format!("missing {}", name))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| e.to_string())
}

/// Outcome of [`admit`]: the part of a request that runs in arrival order,
/// before the request gets its own task.
#[derive(Debug)]
pub enum Admission {
    /// A navigation commit whose ticket has been issued.
    Navigation(PendingNavigation),
    /// The request was answered during admission.
    Answered(Result<Value, String>),
    /// Nothing is order-sensitive; the whole request runs in its task.
    Deferred,
}

/// Performs the order-sensitive part of a request. Never suspends.
///
/// Navigation commits receive their ticket here, so a commit the host sent
/// later always supersedes an earlier one, whichever task runs first.
pub fn admit(app: &App, host: &RpcHost, method: &str, params: &Value) -> Admission {
    if method != "navigation.committed" {
        return Admission::Deferred;
    }
    let (tab_id, frame_id, url, is_top_level) = match commit_params(params) {
        Ok(parsed) => parsed,
        Err(e) => return Admission::Answered(Err(e)),
    };
    if is_top_level {
        host.note_tab_url(tab_id, url);
    }
    match app.coordinator.begin_navigation(tab_id, frame_id, url, is_top_level) {
        Ok(pending) => Admission::Navigation(pending),
        Err(outcome) => Admission::Answered(to_json(&EventOutcome::Navigation { outcome })),
    }
}

fn commit_params(params: &Value) -> Result<(TabId, FrameId, &str, bool), String> {
    let tab_id = param_i64(params, "tab_id")?;
    let frame_id = params
        .get("frame_id")
        .and_then(|v| v.as_i64())
        .unwrap_or(TOP_LEVEL_FRAME_ID);
    let url = param_str(params, "url")?;
    let is_top_level = params
        .get("is_top_level")
        .and_then(|v| v.as_bool())
        .unwrap_or(frame_id == TOP_LEVEL_FRAME_ID);
    Ok((tab_id, frame_id, url, is_top_level))
}

/// Dispatch a JSON-RPC method call.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub async fn handle_method(app: &App, host: &RpcHost, method: &str, params: &Value) -> Result<Value, String> {
    let admission = admit(app, host, method, params);
    handle_admitted(app, host, method, params, admission).await
}

/// Finishes a request previously passed through [`admit`].
pub async fn handle_admitted(
    app: &App,
    host: &RpcHost,
    method: &str,
    params: &Value,
    admission: Admission,
) -> Result<Value, String> {
    match admission {
        Admission::Navigation(pending) => to_json(&EventOutcome::Navigation {
            outcome: app.coordinator.complete_navigation(pending).await,
        }),
        Admission::Answered(result) => result,
        Admission::Deferred => dispatch(app, host, method, params).await,
    }
}

async fn dispatch(app: &App, host: &RpcHost, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        // ─── Host events ───
        // `navigation.committed` is settled during admission.
        "tab.activated" => {
            let tab_id = param_i64(params, "tab_id")?;
            if let Some(url) = params.get("url").and_then(|v| v.as_str()) {
                host.note_tab_url(tab_id, url);
            }
            to_json(&app.coordinator.handle_event(HostEvent::TabActivated { tab_id }).await)
        }
        "action.clicked" => {
            let tab_id = param_i64(params, "tab_id")?;
            let url = param_str(params, "url")?;
            host.note_tab_url(tab_id, url);
            let event = HostEvent::ActionClicked {
                tab_id,
                url: url.to_string(),
            };
            to_json(&app.coordinator.handle_event(event).await)
        }
        "tab.removed" => {
            let tab_id = param_i64(params, "tab_id")?;
            host.forget_tab(tab_id);
            to_json(&app.coordinator.handle_event(HostEvent::TabRemoved { tab_id }).await)
        }

        // ─── Origins ───
        "origin.list" => {
            let origins = app.coordinator.engine().snapshot().await;
            let arr: Vec<&str> = origins.iter().map(|o| o.as_str()).collect();
            Ok(json!(arr))
        }
        "origin.status" => {
            let url = param_str(params, "url")?;
            let origin = origin_resolver::resolve(url).map_err(|e| e.to_string())?;
            let origins = app.coordinator.engine().snapshot().await;
            Ok(json!({"origin": origin.as_str(), "frozen": is_frozen(&origin, &origins)}))
        }

        // ─── Settings ───
        "settings.get" => to_json(&app.settings()),
        "settings.set" => {
            let key = param_str(params, "key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            let settings = app.update_setting(key, value).map_err(|e| e.to_string())?;
            to_json(&settings)
        }
        "settings.reset" => {
            let settings = app.reset_settings().map_err(|e| e.to_string())?;
            to_json(&settings)
        }

        // ─── Payload ───
        "payload.source" => {
            let payload = app.coordinator.payload();
            Ok(json!({"code": payload.source(), "stand_ins": payload.stand_ins()}))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
