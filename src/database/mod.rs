//! Pagefreeze database layer.
//!
//! Provides SQLite connection management and schema migrations for the
//! durable key-value settings store.
//!
//! # Usage
//!
//! ```no_run
//! use pagefreeze::database::Database;
//!
//! let db = Database::open("pagefreeze.db").expect("failed to open database");
//! let conn = db.connection();
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
