//! Pagefreeze RPC Server — JSON-RPC over stdin/stdout for the browser host.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"navigation.committed", "params":{"tab_id":3,"frame_id":0,"url":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//! Host actions are interleaved as notifications: {"action":"set_badge", ...}
//!
//! Each request runs as its own task so slow storage never blocks later
//! events. Navigation tickets are issued before the task is spawned, so
//! ordering between navigations of one tab follows the input stream.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use pagefreeze::app::App;
use pagefreeze::rpc_handler::{admit, handle_admitted};
use pagefreeze::rpc_host::RpcHost;

#[tokio::main]
async fn main() {
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env("PAGEFREEZE_LOG").unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let (tx, mut rx) = mpsc::unbounded_channel::<Value>();
    let host = Arc::new(RpcHost::new(tx.clone()));

    let app = match std::env::var("PAGEFREEZE_DATA_DIR") {
        Ok(dir) => App::open(&PathBuf::from(dir), host.clone()),
        Err(_) => App::open_default(host.clone()),
    };
    let app = match app {
        Ok(app) => Arc::new(app),
        Err(e) => {
            tracing::error!(error = %e, "failed to initialize pagefreeze");
            std::process::exit(1);
        }
    };

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(message) = rx.recv().await {
            let line = format!("{}\n", message);
            if stdout.write_all(line.as_bytes()).await.is_err() || stdout.flush().await.is_err() {
                break;
            }
        }
    });

    let _ = tx.send(json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(l)) => l,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                let _ = tx.send(json!({"id": null, "error": format!("parse error: {}", e)}));
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);
        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("").to_string();
        let params = req.get("params").cloned().unwrap_or(json!({}));
        // Tickets are issued here, in the order the host sent its events.
        let admission = admit(&app, &host, &method, &params);

        let app = Arc::clone(&app);
        let host = Arc::clone(&host);
        let tx = tx.clone();
        tokio::spawn(async move {
            let response = match handle_admitted(&app, &host, &method, &params, admission).await {
                Ok(val) => json!({"id": id, "result": val}),
                Err(err) => json!({"id": id, "error": err}),
            };
            let _ = tx.send(response);
        });
    }

    // Let in-flight tasks finish before the writer drains and exits.
    drop(tx);
    drop(host);
    drop(app);
    let _ = writer.await;
}
