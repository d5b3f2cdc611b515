//! Pagefreeze — per-origin page freezing for a browser host.
//!
//! Newly committed pages from origins that are not in the frozen set get a
//! page-world script that neutralizes listener registration, timers, network
//! requests and intersection observers. This library crate exposes all
//! modules for use by the RPC binary and integration tests.

pub mod app;
pub mod database;
pub mod host;
pub mod managers;
pub mod platform;
pub mod rpc_handler;
pub mod rpc_host;
pub mod services;
pub mod types;
