use serde::{Deserialize, Serialize};

use super::origin::Origin;

/// Host-assigned browsing tab identifier.
pub type TabId = i64;

/// Host-assigned frame identifier; the top-level frame is always `0`.
pub type FrameId = i64;

pub const TOP_LEVEL_FRAME_ID: FrameId = 0;

/// Events delivered by the host's event sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// A frame committed a navigation.
    NavigationCommitted {
        tab_id: TabId,
        frame_id: FrameId,
        url: String,
        is_top_level: bool,
    },
    /// An existing tab was brought to the foreground.
    TabActivated { tab_id: TabId },
    /// The user asked to toggle the active tab's origin (toolbar click).
    ActionClicked { tab_id: TabId, url: String },
    /// The tab was closed.
    TabRemoved { tab_id: TabId },
}

/// Per-navigation record, rebuilt for every commit and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationContext {
    pub tab_id: TabId,
    pub frame_id: FrameId,
    pub url: String,
    pub origin: Origin,
    pub is_frozen: bool,
}

/// Per-tab freeze state machine: `Unknown -> Evaluating -> {Frozen, Active}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabPhase {
    #[default]
    Unknown,
    Evaluating,
    Frozen,
    Active,
}

/// Identity of one dispatched navigation task.
///
/// `generation` increases on every top-level commit of the tab; a task whose
/// generation is no longer current refers to a superseded navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationTicket {
    pub tab_id: TabId,
    pub frame_id: FrameId,
    pub generation: u64,
}

/// What the coordinator did with a navigation-committed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationOutcome {
    /// Neutralizer deployed into the frame.
    Deployed,
    /// Origin is in the set; nothing was injected.
    SkippedFrozen,
    /// Frame-scope policy excludes this frame.
    SkippedByPolicy,
    /// Sub-frame commit with no known top-level URL for the tab.
    NoTopLevelUrl,
    /// URL had no usable origin; treated as not frozen, nothing injected.
    IndeterminateOrigin,
    /// A newer top-level navigation of the same tab overtook this task.
    Superseded,
    /// The host refused or failed the injection.
    InjectionFailed,
}
