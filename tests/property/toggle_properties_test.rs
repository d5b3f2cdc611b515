//! Property-based tests for origin toggling.
//!
//! Toggling is its own inverse and only ever touches the toggled origin.

#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;

use common::{engine_over, MemoryStore, KEY};
use pagefreeze::services::origin_resolver::resolve;
use pagefreeze::types::origin::{Origin, OriginSet};
use proptest::prelude::*;
use serde_json::Value;

fn arb_origin() -> impl Strategy<Value = Origin> {
    (
        prop_oneof![Just("http"), Just("https")],
        "[a-z]{1,8}\\.(com|org|example)",
        proptest::option::of(1u16..=65535),
    )
        .prop_map(|(scheme, host, port)| {
            let url = match port {
                Some(p) => format!("{}://{}:{}/", scheme, host, p),
                None => format!("{}://{}/", scheme, host),
            };
            resolve(&url).unwrap()
        })
}

fn arb_origin_set() -> impl Strategy<Value = OriginSet> {
    proptest::collection::vec(arb_origin(), 0..8).prop_map(|v| v.into_iter().collect())
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn seeded(set: &OriginSet) -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_value(KEY, serde_json::to_value(set).unwrap()))
}

fn persisted(store: &MemoryStore) -> OriginSet {
    serde_json::from_value(store.raw(KEY).unwrap_or(Value::Null)).unwrap_or_default()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn toggle_twice_restores_original(initial in arb_origin_set(), origin in arb_origin()) {
        let store = seeded(&initial);
        let engine = engine_over(store.clone());

        runtime().block_on(async {
            engine.toggle(&origin).await.unwrap();
            engine.toggle(&origin).await.unwrap();
        });

        prop_assert_eq!(persisted(&store), initial);
    }

    #[test]
    fn toggle_negates_membership(initial in arb_origin_set(), origin in arb_origin()) {
        let was_frozen = initial.contains(&origin);
        let store = seeded(&initial);
        let engine = engine_over(store.clone());

        let now_frozen = runtime().block_on(engine.toggle(&origin)).unwrap();

        prop_assert_eq!(now_frozen, !was_frozen);
        prop_assert_eq!(persisted(&store).contains(&origin), now_frozen);
    }

    #[test]
    fn toggle_leaves_other_origins(initial in arb_origin_set(), origin in arb_origin()) {
        let store = seeded(&initial);
        let engine = engine_over(store.clone());

        runtime().block_on(engine.toggle(&origin)).unwrap();

        let after = persisted(&store);
        for other in initial.iter().filter(|o| **o != origin) {
            prop_assert!(after.contains(other));
        }
        prop_assert!(after.iter().all(|o| *o == origin || initial.contains(o)));
    }
}
