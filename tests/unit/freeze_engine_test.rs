//! Unit tests for the Freeze Decision Engine.

#[path = "../common/mod.rs"]
mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::{engine_over, MemoryStore, KEY};
use pagefreeze::services::freeze_engine::is_frozen;
use pagefreeze::services::origin_resolver::resolve;
use pagefreeze::types::origin::OriginSet;
use serde_json::json;

#[test]
fn test_membership_is_the_whole_decision() {
    let a = resolve("https://a.com/").unwrap();
    let b = resolve("https://b.com/").unwrap();
    let set: OriginSet = [a.clone()].into_iter().collect();
    assert!(is_frozen(&a, &set));
    assert!(!is_frozen(&b, &set));
    assert!(!is_frozen(&a, &OriginSet::new()));
}

#[tokio::test]
async fn test_toggle_adds_then_removes() {
    let backend = Arc::new(MemoryStore::new());
    let engine = engine_over(backend.clone());
    let a = resolve("https://a.com/x").unwrap();

    assert!(engine.toggle(&a).await.unwrap());
    assert!(engine.check(&a).await);
    assert_eq!(backend.raw(KEY), Some(json!(["https://a.com"])));

    assert!(!engine.toggle(&a).await.unwrap());
    assert!(!engine.check(&a).await);
    assert_eq!(backend.raw(KEY), Some(json!([])));
}

#[tokio::test]
async fn test_toggle_leaves_other_origins_alone() {
    let backend = Arc::new(MemoryStore::with_value(KEY, json!(["https://keep.com"])));
    let engine = engine_over(backend.clone());
    let a = resolve("https://a.com/").unwrap();

    engine.toggle(&a).await.unwrap();
    assert_eq!(backend.raw(KEY), Some(json!(["https://a.com", "https://keep.com"])));
}

#[tokio::test]
async fn test_failed_write_keeps_previous_state() {
    let backend = Arc::new(MemoryStore::new());
    let engine = engine_over(backend.clone());
    let a = resolve("https://a.com/").unwrap();

    backend.fail_writes.store(true, Ordering::SeqCst);
    assert!(engine.toggle(&a).await.is_err());
    assert!(!engine.check(&a).await);
    assert_eq!(backend.raw(KEY), None);
}

#[tokio::test]
async fn test_concurrent_toggles_serialize() {
    let backend = Arc::new(MemoryStore::new());
    let engine = engine_over(backend.clone());
    let a = resolve("https://a.com/").unwrap();

    let (first, second) = tokio::join!(engine.toggle(&a), engine.toggle(&a));
    let (first, second) = (first.unwrap(), second.unwrap());

    // Each toggle observed the other's result, so they report opposite states.
    assert_ne!(first, second);
    assert_eq!(backend.writes.load(Ordering::SeqCst), 2);
    let persisted: OriginSet = serde_json::from_value(backend.raw(KEY).unwrap()).unwrap();
    assert_eq!(persisted, engine.snapshot().await);
    assert!(persisted.is_empty());
}

#[tokio::test]
async fn test_concurrent_toggles_on_different_origins_both_apply() {
    let backend = Arc::new(MemoryStore::new());
    let engine = engine_over(backend.clone());
    let a = resolve("https://a.com/").unwrap();
    let b = resolve("https://b.com/").unwrap();

    let (ra, rb) = tokio::join!(engine.toggle(&a), engine.toggle(&b));
    assert!(ra.unwrap() && rb.unwrap());
    assert_eq!(backend.raw(KEY), Some(json!(["https://a.com", "https://b.com"])));
}
