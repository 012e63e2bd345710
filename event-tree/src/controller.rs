//! Tree controller
//!
//! The entry point for a host. A [`TreeController`] is one tree instance: it owns the
//! forest of the active (source, date) slot, runs selection and hover requests against
//! it, and reports every change through the two host callbacks.
//!
//! # Slot lifecycle
//!
//! ```text
//! Empty ──begin_fetch──▶ Loading ──complete_fetch(Ok)──▶ Ready
//!                           ▲    └─complete_fetch(Err)─▶ Error
//!                           └──── source/date change or reload ◀──┘
//! ```
//!
//! Entering Ready or Error replaces the forest wholesale: selection, expansion and
//! hover all start over, and both callbacks fire with empty sequences. Results are
//! accepted only for the most recently issued [`FetchTicket`] of the active slot.
//!
//! # Example
//!
//! ```
//! use event_tree::{NodeKey, RawNode, TreeConfig, TreeController};
//! use chrono::Utc;
//!
//! let mut tree = TreeController::new(TreeConfig::new("HEK", Utc::now()))
//!     .on_events_update(|events| println!("{} selected", events.len()));
//!
//! let ticket = tree.begin_fetch();
//! let catalog = vec![RawNode::category("Flares", vec![RawNode::event("A", "Flare A")])];
//! tree.complete_fetch(ticket, Ok(catalog));
//!
//! tree.set_leaf_checked(&NodeKey::from("A"), true);
//! assert_eq!(tree.selected_events().len(), 1);
//! ```

use crate::config::{SlotKey, TreeConfig};
use crate::fetch::{EventFetcher, FetchRequest};
use crate::hover::{HoverChannel, SubscriptionId};
use crate::normalize::{display_title, normalize};
use crate::selection::SelectionEngine;
use crate::tree::{Forest, NodeKind, RawNode};
use crate::types::{CheckState, NodeKey, Result, SelectedEvent, Timestamp};
use serde::Serialize;
use std::fmt;

/// Host callback receiving the complete current selection
pub type EventsCallback = Box<dyn FnMut(&[SelectedEvent])>;

/// State of the active slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotState {
    /// Nothing fetched yet
    Empty,
    /// A fetch is in flight
    Loading,
    /// The forest holds the latest fetch result
    Ready,
    /// The latest fetch failed; the forest is empty
    Error(String),
}

/// Proof of a started fetch, handed back with its result
///
/// Plain data, so it can travel to whatever runs the fetch and back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    slot: SlotKey,
    token: u64,
}

impl FetchTicket {
    pub fn slot(&self) -> &SlotKey {
        &self.slot
    }

    pub fn token(&self) -> u64 {
        self.token
    }
}

/// What `complete_fetch` did with a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Accepted; the forest was rebuilt with this many nodes
    Ready { nodes: usize },
    /// Accepted as a failure; the slot is in Error
    Failed,
    /// Superseded by a newer fetch or a slot change; nothing changed
    Discarded,
}

/// One visible line of the rendered tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeRow {
    pub key: NodeKey,
    pub depth: usize,
    /// Normalized node label
    pub title: String,
    pub is_category: bool,
    pub child_count: usize,
    pub check_state: CheckState,
    pub expanded: bool,
    pub hovered: bool,
}

struct Slot {
    key: SlotKey,
    state: SlotState,
    forest: Forest,
    /// Token of the fetch whose result will be accepted, if one is pending
    pending_token: Option<u64>,
}

impl Slot {
    fn new(key: SlotKey) -> Self {
        Self {
            key,
            state: SlotState::Empty,
            forest: Forest::new(),
            pending_token: None,
        }
    }
}

/// One tree instance bound to a source
pub struct TreeController {
    config: TreeConfig,
    slot: Slot,
    next_token: u64,
    hover: HoverChannel<NodeKey>,
    on_events_update: Option<EventsCallback>,
}

impl TreeController {
    /// Create a controller; nothing is fetched until [`begin_fetch`](Self::begin_fetch)
    pub fn new(config: TreeConfig) -> Self {
        let slot = Slot::new(config.slot_key());
        Self {
            config,
            slot,
            next_token: 0,
            hover: HoverChannel::new(),
            on_events_update: None,
        }
    }

    /// Builder method: register the `onEventsUpdate` callback
    pub fn on_events_update(mut self, callback: impl FnMut(&[SelectedEvent]) + 'static) -> Self {
        self.on_events_update = Some(Box::new(callback));
        self
    }

    /// Builder method: register the `onHoveredEventsUpdate` callback
    pub fn on_hovered_events_update(mut self, callback: impl FnMut(&[NodeKey]) + 'static) -> Self {
        self.hover.subscribe(callback);
        self
    }

    /// Register an additional hover observer
    pub fn subscribe_hover(&mut self, observer: impl FnMut(&[NodeKey]) + 'static) -> SubscriptionId {
        self.hover.subscribe(observer)
    }

    pub fn unsubscribe_hover(&mut self, id: SubscriptionId) -> bool {
        self.hover.unsubscribe(id)
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn source(&self) -> &str {
        &self.config.source
    }

    pub fn slot_key(&self) -> &SlotKey {
        &self.slot.key
    }

    pub fn state(&self) -> &SlotState {
        &self.slot.state
    }

    pub fn forest(&self) -> &Forest {
        &self.slot.forest
    }

    // ===== Fetch lifecycle =====

    /// Switch to another source and start fetching it
    pub fn set_source(&mut self, source: impl Into<String>) -> FetchTicket {
        self.config.source = source.into();
        self.begin_fetch()
    }

    /// Switch to another date and start fetching it
    pub fn set_events_date(&mut self, date: Timestamp) -> FetchTicket {
        self.config.events_date = date;
        self.begin_fetch()
    }

    /// Start a fetch for the slot selected by the current configuration
    ///
    /// Any earlier ticket stops being accepted. If the configuration now selects a
    /// different slot, the old forest is dropped right away.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        let key = self.config.slot_key();
        if key != self.slot.key {
            self.switch_slot(key);
        }

        self.next_token += 1;
        let token = self.next_token;
        self.slot.pending_token = Some(token);
        self.slot.state = SlotState::Loading;
        log::debug!("Fetch #{} started for {}", token, self.slot.key);

        FetchTicket {
            slot: self.slot.key.clone(),
            token,
        }
    }

    /// Request to hand to the fetch layer for `ticket`
    pub fn fetch_request(&self, ticket: &FetchTicket) -> FetchRequest {
        FetchRequest {
            source: ticket.slot.source.clone(),
            date: ticket.slot.date,
            endpoint: self.config.api_url.clone(),
        }
    }

    /// Deliver the result of a fetch
    ///
    /// Results for a superseded ticket are dropped without touching any state.
    pub fn complete_fetch(&mut self, ticket: FetchTicket, result: Result<Vec<RawNode>>) -> FetchOutcome {
        if ticket.slot != self.slot.key || self.slot.pending_token != Some(ticket.token) {
            log::debug!(
                "Discarding stale fetch #{} for {} (active: {}, pending: {:?})",
                ticket.token,
                ticket.slot,
                self.slot.key,
                self.slot.pending_token
            );
            return FetchOutcome::Discarded;
        }
        self.slot.pending_token = None;

        let outcome = match result.and_then(Forest::build) {
            Ok(forest) => {
                let nodes = forest.len();
                log::info!("{}: forest ready with {} nodes", self.slot.key, nodes);
                self.slot.forest = forest;
                self.slot.state = SlotState::Ready;
                FetchOutcome::Ready { nodes }
            }
            Err(e) => {
                log::warn!("{}: fetch failed: {}", self.slot.key, e);
                self.slot.forest = Forest::new();
                self.slot.state = SlotState::Error(e.to_string());
                FetchOutcome::Failed
            }
        };

        self.hover.clear();
        self.emit_selection();
        outcome
    }

    /// Fetch the current slot synchronously
    pub fn reload(&mut self, fetcher: &dyn EventFetcher) -> FetchOutcome {
        let ticket = self.begin_fetch();
        let request = self.fetch_request(&ticket);
        let result = fetcher.fetch(&request);
        self.complete_fetch(ticket, result)
    }

    fn switch_slot(&mut self, key: SlotKey) {
        log::debug!("Switching slot {} -> {}", self.slot.key, key);
        let had_selection =
            !SelectionEngine::collect_selected_leaves(&self.slot.forest).is_empty();
        self.slot = Slot::new(key);

        if !self.hover.snapshot().is_empty() {
            self.hover.clear();
        }
        if had_selection {
            self.emit_selection();
        }
    }

    // ===== Selection =====

    /// Check or uncheck a leaf; stale keys are ignored
    pub fn set_leaf_checked(&mut self, key: &NodeKey, checked: bool) -> bool {
        let changed = SelectionEngine::set_leaf_checked(&mut self.slot.forest, key, checked);
        self.notify_if(changed)
    }

    /// Check or uncheck a whole category; stale keys are ignored
    pub fn set_category_checked(&mut self, key: &NodeKey, checked: bool) -> bool {
        let changed = SelectionEngine::set_category_checked(&mut self.slot.forest, key, checked);
        self.notify_if(changed)
    }

    /// Label click: flip a leaf, select-all/clear a category
    pub fn toggle(&mut self, key: &NodeKey) -> bool {
        let changed = SelectionEngine::toggle(&mut self.slot.forest, key);
        self.notify_if(changed)
    }

    pub fn check_state(&self, key: &NodeKey) -> Option<CheckState> {
        SelectionEngine::check_state(&self.slot.forest, key)
    }

    /// Current selection, tagged with this instance's source
    pub fn selected_events(&self) -> Vec<SelectedEvent> {
        SelectionEngine::collect_selected_leaves(&self.slot.forest)
            .into_iter()
            .map(|node| SelectedEvent {
                key: node.key().clone(),
                id: node.id().cloned(),
                label: node.label().to_string(),
                title: display_title(node.label(), node.event_data()),
                event_data: node.event_data().clone(),
                source: self.config.source.clone(),
            })
            .collect()
    }

    fn notify_if(&mut self, changed: bool) -> bool {
        if changed {
            self.emit_selection();
        }
        changed
    }

    fn emit_selection(&mut self) {
        let events = self.selected_events();
        log::trace!("{}: {} events selected", self.slot.key, events.len());
        if let Some(callback) = self.on_events_update.as_mut() {
            callback(&events);
        }
    }

    // ===== Hover =====

    /// Pointer entered a node label; stale keys are ignored
    pub fn hover_enter(&mut self, key: &NodeKey) -> bool {
        if self.slot.forest.resolve(key).is_none() {
            log::trace!("Ignoring hover on unknown node {}", key);
            return false;
        }
        self.hover.enter(key.clone());
        true
    }

    /// Pointer left a node label; stale keys are ignored
    pub fn hover_leave(&mut self, key: &NodeKey) -> bool {
        if self.slot.forest.resolve(key).is_none() {
            log::trace!("Ignoring hover exit on unknown node {}", key);
            return false;
        }
        self.hover.leave(key);
        true
    }

    pub fn hovered(&self) -> &[NodeKey] {
        self.hover.snapshot()
    }

    pub fn is_hovered(&self, key: &NodeKey) -> bool {
        self.hover.is_hovered(key)
    }

    // ===== Expansion =====

    /// Expand or collapse a category; returns false for leaves and unknown keys
    pub fn set_expanded(&mut self, key: &NodeKey, expanded: bool) -> bool {
        match self.slot.forest.resolve(key) {
            Some(idx) if self.slot.forest.node(idx).kind() == NodeKind::Category => {
                self.slot.forest.node_mut(idx).expanded = expanded;
                true
            }
            _ => false,
        }
    }

    pub fn toggle_expanded(&mut self, key: &NodeKey) -> bool {
        let expanded = self
            .slot
            .forest
            .get(key)
            .map(|node| node.is_expanded())
            .unwrap_or(false);
        self.set_expanded(key, !expanded)
    }

    pub fn expand_all(&mut self) {
        self.slot.forest.set_expanded_all(true);
    }

    pub fn collapse_all(&mut self) {
        self.slot.forest.set_expanded_all(false);
    }

    /// Rows to render, top to bottom
    ///
    /// Children of a collapsed category are skipped.
    pub fn rows(&self) -> Vec<TreeRow> {
        let forest = &self.slot.forest;
        let mut rows = Vec::new();
        let mut skip_until = 0;

        for (idx, node) in forest.iter() {
            if idx.get() < skip_until {
                continue;
            }
            let is_category = node.kind() == NodeKind::Category;
            if is_category && !node.is_expanded() {
                skip_until = forest.subtree_range(idx).end;
            }
            rows.push(TreeRow {
                key: node.key().clone(),
                depth: node.depth(),
                title: normalize(node.label()),
                is_category,
                child_count: node.children().len(),
                check_state: node.check_state(),
                expanded: node.is_expanded(),
                hovered: self.hover.is_hovered(node.key()),
            });
        }
        rows
    }
}

impl fmt::Debug for TreeController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeController")
            .field("config", &self.config)
            .field("slot", &self.slot.key)
            .field("state", &self.slot.state)
            .field("nodes", &self.slot.forest.len())
            .field("hover", &self.hover)
            .finish()
    }
}
