//! Property-based tests for FreezeSettings serialization round-trip.
//!
//! These tests verify that FreezeSettings can be serialized to JSON
//! and deserialized back without data loss for arbitrary valid inputs,
//! and that the settings file survives a save/load cycle.

use pagefreeze::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use pagefreeze::types::settings::{FrameScope, FreezeSettings, NormalizationSettings};
use proptest::prelude::*;

// --- Arbitrary strategies for all settings sub-types ---

fn arb_frame_scope() -> impl Strategy<Value = FrameScope> {
    prop_oneof![Just(FrameScope::AllFrames), Just(FrameScope::TopLevelOnly)]
}

fn arb_normalization_settings() -> impl Strategy<Value = NormalizationSettings> {
    (any::<bool>(), any::<bool>(), "data-[a-z]{1,10}", any::<bool>()).prop_map(
        |(enabled, promote_lazy_images, lazy_source_attribute, pin_fixed_elements)| {
            NormalizationSettings {
                enabled,
                promote_lazy_images,
                lazy_source_attribute,
                pin_fixed_elements,
            }
        },
    )
}

fn arb_freeze_settings() -> impl Strategy<Value = FreezeSettings> {
    (
        "[a-zA-Z]{1,20}",
        arb_frame_scope(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        "\\PC{0,6}",
        1usize..10_000,
        arb_normalization_settings(),
    )
        .prop_map(
            |(
                storage_key,
                frame_scope,
                suppress_nested_frames,
                divert_script_elements,
                log_blocked_calls,
                badge_text,
                max_tracked_tabs,
                normalization,
            )| FreezeSettings {
                storage_key,
                frame_scope,
                suppress_nested_frames,
                divert_script_elements,
                log_blocked_calls,
                badge_text,
                max_tracked_tabs,
                normalization,
            },
        )
}

proptest! {
    #[test]
    fn settings_json_roundtrip(settings in arb_freeze_settings()) {
        let json = serde_json::to_string(&settings).unwrap();
        let back: FreezeSettings = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, settings);
    }

    #[test]
    fn settings_file_roundtrip(settings in arb_freeze_settings()) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json").to_string_lossy().to_string();
        std::fs::write(&path, serde_json::to_string_pretty(&settings).unwrap()).unwrap();

        let mut engine = SettingsEngine::new(Some(path));
        prop_assert_eq!(engine.load().unwrap(), settings);
    }

    #[test]
    fn dropping_a_key_restores_its_default(settings in arb_freeze_settings()) {
        let mut value = serde_json::to_value(&settings).unwrap();
        value.as_object_mut().unwrap().remove("badge_text");
        let back: FreezeSettings = serde_json::from_value(value).unwrap();
        prop_assert_eq!(back.badge_text, FreezeSettings::default().badge_text);
        prop_assert_eq!(back.frame_scope, settings.frame_scope);
    }
}
