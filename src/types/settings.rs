use serde::{Deserialize, Serialize};

/// Which frames of a page receive the neutralizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameScope {
    AllFrames,
    TopLevelOnly,
}

/// Top-level freeze settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FreezeSettings {
    /// Durable-store key holding the origin set.
    pub storage_key: String,
    pub frame_scope: FrameScope,
    /// Inject a tab-wide stylesheet hiding nested frames on top-level commits.
    pub suppress_nested_frames: bool,
    /// Make `document.createElement("script")` produce an inert `<template>`.
    pub divert_script_elements: bool,
    /// Log every suppressed call to the page console. On by default.
    pub log_blocked_calls: bool,
    /// Badge text for tabs whose origin is in the set.
    pub badge_text: String,
    pub max_tracked_tabs: usize,
    pub normalization: NormalizationSettings,
}

impl Default for FreezeSettings {
    fn default() -> Self {
        Self {
            storage_key: "disabledDomains".to_string(),
            frame_scope: FrameScope::AllFrames,
            suppress_nested_frames: true,
            divert_script_elements: true,
            log_blocked_calls: true,
            badge_text: "\u{25B6} JS".to_string(),
            max_tracked_tabs: 512,
            normalization: NormalizationSettings::default(),
        }
    }
}

/// Post-load DOM normalization pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NormalizationSettings {
    pub enabled: bool,
    pub promote_lazy_images: bool,
    /// Deferred-source attribute copied into `src` for empty images.
    pub lazy_source_attribute: String,
    /// Rewrite `fixed`/`sticky` positioned elements so they stop tracking the viewport.
    pub pin_fixed_elements: bool,
}

impl Default for NormalizationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            promote_lazy_images: true,
            lazy_source_attribute: "data-src".to_string(),
            pin_fixed_elements: true,
        }
    }
}
