// Pagefreeze state managers
// Per-tab navigation state and the coordinator that acts on host events.

pub mod navigation_coordinator;
pub mod tab_registry;
