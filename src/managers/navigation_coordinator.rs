//! Navigation Coordinator for Pagefreeze.
//!
//! Turns host events into freeze decisions and host actions. Per top-level
//! commit: record the tab's URL, resolve the origin, consult the decision
//! engine, refresh the badge, optionally hide nested frames, and deploy the
//! neutralizer unless the origin is frozen. Sub-frames inherit the tab's
//! top-level URL and settled decision, and never change tab state.
//!
//! Every navigation task carries a [`NavigationTicket`], issued synchronously
//! in commit order; after each suspension point the ticket is re-checked and
//! superseded work is dropped.

use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use serde::Serialize;

use crate::host::{BrowserHost, ExecutionWorld, InjectionRequest};
use crate::managers::tab_registry::TabRegistry;
use crate::services::freeze_engine::{is_frozen, FreezeDecisionEngine};
use crate::services::neutralizer::NeutralizerPayload;
use crate::services::origin_resolver;
use crate::types::navigation::{
    FrameId, HostEvent, NavigationContext, NavigationOutcome, NavigationTicket, TabId, TabPhase,
};
use crate::types::origin::Origin;
use crate::types::settings::{FrameScope, FreezeSettings};

/// Stylesheet hiding nested frames until they commit on their own.
pub const NESTED_FRAME_SUPPRESSION_CSS: &str = "iframe { display: none !important; }";

/// Result of a user-triggered toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToggleOutcome {
    pub origin: String,
    /// State shown on the badge: the new state, or the old one if the write failed.
    pub frozen: bool,
    pub persisted: bool,
}

/// Result of [`NavigationCoordinator::handle_event`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EventOutcome {
    Navigation { outcome: NavigationOutcome },
    Activation { frozen: Option<bool> },
    Toggle { toggle: Option<ToggleOutcome> },
    Removed { tracked: bool },
}

/// A commit admitted by [`NavigationCoordinator::begin_navigation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingNavigation {
    ticket: NavigationTicket,
    url: String,
    is_top_level: bool,
}

impl PendingNavigation {
    pub fn ticket(&self) -> &NavigationTicket {
        &self.ticket
    }
}

struct ActiveConfig {
    settings: FreezeSettings,
    payload: Arc<NeutralizerPayload>,
}

pub struct NavigationCoordinator {
    engine: FreezeDecisionEngine,
    host: Arc<dyn BrowserHost>,
    config: RwLock<Arc<ActiveConfig>>,
    tabs: Mutex<TabRegistry>,
}

impl NavigationCoordinator {
    pub fn new(engine: FreezeDecisionEngine, host: Arc<dyn BrowserHost>, settings: FreezeSettings) -> Self {
        let tabs = TabRegistry::new(settings.max_tracked_tabs);
        let payload = Arc::new(NeutralizerPayload::from_settings(&settings));
        Self {
            engine,
            host,
            config: RwLock::new(Arc::new(ActiveConfig { settings, payload })),
            tabs: Mutex::new(tabs),
        }
    }

    pub fn engine(&self) -> &FreezeDecisionEngine {
        &self.engine
    }

    /// Swaps in new settings and rebuilds the payload. Affects later events only.
    pub fn apply_settings(&self, settings: FreezeSettings) {
        let payload = Arc::new(NeutralizerPayload::from_settings(&settings));
        self.registry().set_capacity(settings.max_tracked_tabs);
        let mut config = self.config.write().unwrap_or_else(|e| e.into_inner());
        *config = Arc::new(ActiveConfig { settings, payload });
    }

    pub fn settings(&self) -> FreezeSettings {
        self.active_config().settings.clone()
    }

    pub fn payload(&self) -> Arc<NeutralizerPayload> {
        Arc::clone(&self.active_config().payload)
    }

    pub fn tab_phase(&self, tab_id: TabId) -> TabPhase {
        self.registry().phase(tab_id)
    }

    pub fn tracked_tabs(&self) -> usize {
        self.registry().len()
    }

    fn active_config(&self) -> Arc<ActiveConfig> {
        Arc::clone(&self.config.read().unwrap_or_else(|e| e.into_inner()))
    }

    fn registry(&self) -> MutexGuard<'_, TabRegistry> {
        self.tabs.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_current(&self, ticket: &NavigationTicket) -> bool {
        self.registry().is_current(ticket)
    }

    pub async fn handle_event(&self, event: HostEvent) -> EventOutcome {
        match event {
            HostEvent::NavigationCommitted {
                tab_id,
                frame_id,
                url,
                is_top_level,
            } => EventOutcome::Navigation {
                outcome: self.on_navigation_committed(tab_id, frame_id, &url, is_top_level).await,
            },
            HostEvent::TabActivated { tab_id } => EventOutcome::Activation {
                frozen: self.on_tab_activated(tab_id).await,
            },
            HostEvent::ActionClicked { tab_id, url } => EventOutcome::Toggle {
                toggle: self.on_action_clicked(tab_id, &url).await,
            },
            HostEvent::TabRemoved { tab_id } => EventOutcome::Removed {
                tracked: self.on_tab_removed(tab_id),
            },
        }
    }

    /// Admits and evaluates a navigation commit.
    ///
    /// Callers that dispatch commits concurrently should call
    /// [`begin_navigation`](Self::begin_navigation) in arrival order instead
    /// and run [`complete_navigation`](Self::complete_navigation) in the task.
    pub async fn on_navigation_committed(
        &self,
        tab_id: TabId,
        frame_id: FrameId,
        url: &str,
        is_top_level: bool,
    ) -> NavigationOutcome {
        match self.begin_navigation(tab_id, frame_id, url, is_top_level) {
            Ok(pending) => self.complete_navigation(pending).await,
            Err(outcome) => outcome,
        }
    }

    /// Records a commit and issues its ticket. Never suspends.
    ///
    /// A top-level commit supersedes every earlier navigation of the tab at
    /// this point, so this must run in the order the host reported commits.
    /// Sub-frame commits with no known top-level URL are answered directly.
    pub fn begin_navigation(
        &self,
        tab_id: TabId,
        frame_id: FrameId,
        url: &str,
        is_top_level: bool,
    ) -> Result<PendingNavigation, NavigationOutcome> {
        let mut tabs = self.registry();
        if is_top_level {
            let ticket = tabs.begin_top_level(tab_id, url);
            return Ok(PendingNavigation {
                ticket,
                url: url.to_string(),
                is_top_level,
            });
        }
        match tabs.sub_frame_ticket(tab_id, frame_id) {
            Some((ticket, url)) => Ok(PendingNavigation {
                ticket,
                url,
                is_top_level,
            }),
            None => {
                tracing::debug!(tab_id, frame_id, "sub-frame commit before any top-level commit");
                Err(NavigationOutcome::NoTopLevelUrl)
            }
        }
    }

    /// Evaluates an admitted commit: badge, stylesheet and deployment.
    pub async fn complete_navigation(&self, pending: PendingNavigation) -> NavigationOutcome {
        let config = self.active_config();
        let PendingNavigation {
            ticket,
            url,
            is_top_level,
        } = pending;
        let (tab_id, frame_id) = (ticket.tab_id, ticket.frame_id);

        let Some(origin) = origin_resolver::resolve_or_log(&url) else {
            if is_top_level && self.registry().settle(&ticket, false) {
                self.render_badge(&config, tab_id, false).await;
            }
            return NavigationOutcome::IndeterminateOrigin;
        };

        let frozen = if is_top_level {
            is_frozen(&origin, &self.engine.snapshot().await)
        } else {
            self.sub_frame_decision(&ticket, &origin).await
        };
        let context = NavigationContext {
            tab_id,
            frame_id,
            is_frozen: frozen,
            url,
            origin,
        };

        if is_top_level {
            let settled = self.registry().settle(&ticket, context.is_frozen);
            if !settled {
                return self.superseded(&ticket);
            }
            self.render_badge(&config, tab_id, context.is_frozen).await;
            if config.settings.suppress_nested_frames {
                if let Err(e) = self.host.insert_css(tab_id, NESTED_FRAME_SUPPRESSION_CSS).await {
                    tracing::warn!(tab_id, error = %e, "nested-frame stylesheet not injected");
                }
            }
        }

        tracing::debug!(
            tab_id,
            frame_id,
            origin = %context.origin,
            frozen = context.is_frozen,
            generation = ticket.generation,
            "navigation evaluated"
        );

        if context.is_frozen {
            return NavigationOutcome::SkippedFrozen;
        }
        if !is_top_level && config.settings.frame_scope == FrameScope::TopLevelOnly {
            return NavigationOutcome::SkippedByPolicy;
        }
        if !self.is_current(&ticket) {
            return self.superseded(&ticket);
        }

        let request = InjectionRequest {
            tab_id,
            frame_ids: vec![frame_id],
            world: ExecutionWorld::Page,
            inject_immediately: true,
            code: config.payload.source().to_string(),
        };
        match self.host.execute_script(request).await {
            Ok(liveness) => {
                if !self.is_current(&ticket) {
                    return self.superseded(&ticket);
                }
                tracing::debug!(tab_id, frame_id, ?liveness, "neutralizer deployed");
                NavigationOutcome::Deployed
            }
            Err(e) => {
                tracing::warn!(tab_id, frame_id, error = %e, "neutralizer not deployed");
                NavigationOutcome::InjectionFailed
            }
        }
    }

    /// Sub-frames take the decision their tab settled on. Only while the
    /// top-level commit is still being evaluated is the current set consulted.
    async fn sub_frame_decision(&self, ticket: &NavigationTicket, origin: &Origin) -> bool {
        let settled = self.registry().settled_decision(ticket);
        match settled {
            Some(frozen) => frozen,
            None => self.engine.check(origin).await,
        }
    }

    /// Refreshes the badge for a foregrounded tab. Never redeploys anything.
    pub async fn on_tab_activated(&self, tab_id: TabId) -> Option<bool> {
        let info = match self.host.tab_info(tab_id).await {
            Ok(info) => info,
            Err(e) => {
                tracing::debug!(tab_id, error = %e, "activated tab not queryable");
                return None;
            }
        };
        if !info.alive {
            return None;
        }
        let origin = origin_resolver::resolve_or_log(info.url.as_deref()?)?;
        let frozen = self.engine.check(&origin).await;
        self.render_badge(&self.active_config(), tab_id, frozen).await;
        Some(frozen)
    }

    /// Toggles the origin of `url` and shows the resulting state on the tab's badge.
    pub async fn on_action_clicked(&self, tab_id: TabId, url: &str) -> Option<ToggleOutcome> {
        let origin = origin_resolver::resolve_or_log(url)?;
        let config = self.active_config();

        let outcome = match self.engine.toggle(&origin).await {
            Ok(frozen) => ToggleOutcome {
                origin: origin.to_string(),
                frozen,
                persisted: true,
            },
            Err(e) => {
                tracing::warn!(tab_id, origin = %origin, error = %e, "toggle not persisted");
                ToggleOutcome {
                    origin: origin.to_string(),
                    frozen: self.engine.check(&origin).await,
                    persisted: false,
                }
            }
        };
        self.render_badge(&config, tab_id, outcome.frozen).await;
        Some(outcome)
    }

    /// Drops the closed tab's cached state.
    pub fn on_tab_removed(&self, tab_id: TabId) -> bool {
        self.registry().remove(tab_id)
    }

    async fn render_badge(&self, config: &ActiveConfig, tab_id: TabId, frozen: bool) {
        let text = if frozen { config.settings.badge_text.as_str() } else { "" };
        if let Err(e) = self.host.set_badge_text(tab_id, text).await {
            tracing::debug!(tab_id, error = %e, "badge not updated");
        }
    }

    fn superseded(&self, ticket: &NavigationTicket) -> NavigationOutcome {
        tracing::debug!(
            tab_id = ticket.tab_id,
            frame_id = ticket.frame_id,
            generation = ticket.generation,
            "discarding superseded navigation"
        );
        NavigationOutcome::Superseded
    }
}
