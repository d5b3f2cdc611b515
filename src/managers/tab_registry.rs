use std::collections::HashMap;

use crate::types::navigation::{FrameId, NavigationTicket, TabId, TabPhase, TOP_LEVEL_FRAME_ID};

/// Per-tab state kept between navigation events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabRecord {
    /// URL of the last committed top-level navigation.
    pub last_top_level_url: Option<String>,
    pub phase: TabPhase,
    /// Bumped on every top-level commit.
    pub generation: u64,
    last_touched: u64,
}

/// Bounded map of tab state, owned by the navigation coordinator.
///
/// When more than `capacity` tabs are tracked the least recently touched
/// entry is evicted. Closed tabs are removed explicitly.
pub struct TabRegistry {
    tabs: HashMap<TabId, TabRecord>,
    capacity: usize,
    clock: u64,
}

impl TabRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            tabs: HashMap::new(),
            capacity: capacity.max(1),
            clock: 0,
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Records a top-level commit and returns the ticket identifying it.
    ///
    /// Any task holding an older ticket for this tab is superseded from now on.
    pub fn begin_top_level(&mut self, tab_id: TabId, url: &str) -> NavigationTicket {
        let now = self.tick();
        let record = self.tabs.entry(tab_id).or_insert(TabRecord {
            last_top_level_url: None,
            phase: TabPhase::Unknown,
            generation: 0,
            last_touched: now,
        });
        record.generation += 1;
        record.last_top_level_url = Some(url.to_string());
        record.phase = TabPhase::Evaluating;
        record.last_touched = now;
        let ticket = NavigationTicket {
            tab_id,
            frame_id: TOP_LEVEL_FRAME_ID,
            generation: record.generation,
        };
        self.evict_over_capacity(Some(tab_id));
        ticket
    }

    /// Ticket and inherited top-level URL for a sub-frame commit.
    ///
    /// Returns `None` if no top-level commit has been seen for the tab.
    /// Never changes the tab's phase or URL.
    pub fn sub_frame_ticket(&mut self, tab_id: TabId, frame_id: FrameId) -> Option<(NavigationTicket, String)> {
        let now = self.tick();
        let record = self.tabs.get_mut(&tab_id)?;
        let url = record.last_top_level_url.clone()?;
        record.last_touched = now;
        Some((
            NavigationTicket {
                tab_id,
                frame_id,
                generation: record.generation,
            },
            url,
        ))
    }

    pub fn is_current(&self, ticket: &NavigationTicket) -> bool {
        self.tabs
            .get(&ticket.tab_id)
            .is_some_and(|r| r.generation == ticket.generation)
    }

    /// Moves the tab out of `Evaluating` if `ticket` is still current.
    pub fn settle(&mut self, ticket: &NavigationTicket, frozen: bool) -> bool {
        match self.tabs.get_mut(&ticket.tab_id) {
            Some(record) if record.generation == ticket.generation => {
                record.phase = if frozen { TabPhase::Frozen } else { TabPhase::Active };
                true
            }
            _ => false,
        }
    }

    /// Freeze decision the tab settled on, if `ticket` is current and the
    /// top-level evaluation has finished.
    pub fn settled_decision(&self, ticket: &NavigationTicket) -> Option<bool> {
        let record = self.tabs.get(&ticket.tab_id)?;
        if record.generation != ticket.generation {
            return None;
        }
        match record.phase {
            TabPhase::Frozen => Some(true),
            TabPhase::Active => Some(false),
            TabPhase::Unknown | TabPhase::Evaluating => None,
        }
    }

    pub fn phase(&self, tab_id: TabId) -> TabPhase {
        self.tabs.get(&tab_id).map(|r| r.phase).unwrap_or_default()
    }

    pub fn last_url(&self, tab_id: TabId) -> Option<&str> {
        self.tabs.get(&tab_id)?.last_top_level_url.as_deref()
    }

    pub fn get(&self, tab_id: TabId) -> Option<&TabRecord> {
        self.tabs.get(&tab_id)
    }

    pub fn remove(&mut self, tab_id: TabId) -> bool {
        self.tabs.remove(&tab_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.evict_over_capacity(None);
    }

    fn evict_over_capacity(&mut self, keep: Option<TabId>) {
        while self.tabs.len() > self.capacity {
            let victim = self
                .tabs
                .iter()
                .filter(|(id, _)| Some(**id) != keep)
                .min_by_key(|(_, r)| r.last_touched)
                .map(|(id, _)| *id);
            match victim {
                Some(id) => {
                    tracing::debug!(tab_id = id, "evicting least recently used tab state");
                    self.tabs.remove(&id);
                }
                None => break,
            }
        }
    }
}
