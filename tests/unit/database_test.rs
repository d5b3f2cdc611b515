//! Unit tests for the Pagefreeze database layer (connection + migrations).

use pagefreeze::database::migrations::{get_schema_version, run_all, CURRENT_SCHEMA_VERSION};
use pagefreeze::database::Database;

#[test]
fn test_open_in_memory_succeeds() {
    let db = Database::open_in_memory();
    assert!(db.is_ok(), "open_in_memory should succeed");
}

#[test]
fn test_migrations_create_all_tables() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection();

    for table in ["schema_version", "kv_settings"] {
        let exists: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name=?1",
                [table],
                |row| row.get(0),
            )
            .unwrap_or(false);
        assert!(exists, "Table '{}' should exist after migrations", table);
    }
}

#[test]
fn test_schema_version_is_current() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    assert_eq!(get_schema_version(db.connection()), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_migrations_are_idempotent() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    // Running migrations a second time should not fail or add version rows
    assert!(run_all(db.connection()).is_ok());
    let rows: i64 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn test_kv_settings_key_is_unique() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection();
    conn.execute(
        "INSERT INTO kv_settings (key, value, updated_at) VALUES ('k', '[]', 0)",
        [],
    )
    .unwrap();
    let dup = conn.execute(
        "INSERT INTO kv_settings (key, value, updated_at) VALUES ('k', '[1]', 1)",
        [],
    );
    assert!(dup.is_err(), "duplicate key must violate the primary key");
}

#[test]
fn test_open_file_database_persists() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("pagefreeze.db");

    {
        let db = Database::open(&db_path).expect("open should succeed");
        db.connection()
            .execute(
                "INSERT INTO kv_settings (key, value, updated_at) VALUES ('disabledDomains', '[\"https://a.com\"]', 0)",
                [],
            )
            .unwrap();
    }

    let db = Database::open(&db_path).expect("reopen should succeed");
    let value: String = db
        .connection()
        .query_row(
            "SELECT value FROM kv_settings WHERE key = 'disabledDomains'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(value, "[\"https://a.com\"]");
    assert_eq!(get_schema_version(db.connection()), CURRENT_SCHEMA_VERSION);
}
