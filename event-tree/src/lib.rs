//! Solar Event Tree Engine
//!
//! A reusable library for presenting a hierarchical catalog of solar events as a
//! browsable, multi-selectable tree whose hover focus can be shared with other views.
//!
//! # Architecture
//!
//! This library is intentionally limited to the engine behind the tree:
//! - Normalizes malformed event titles for display
//! - Builds a forest from a fetched catalog and keeps tri-state selection consistent
//! - Broadcasts the hovered set to any number of observers
//! - Tracks the fetch slot of one tree instance and drops superseded results
//!
//! The library does NOT:
//! - Perform network transport (it consumes an [`EventFetcher`])
//! - Lay out or style the tree
//! - Merge selections of several tree instances
//! - Persist anything
//!
//! Combining several trees is the host's job (see the `event-tree-cli` crate).
//!
//! # Example Usage
//!
//! ```no_run
//! use event_tree::{JsonFileFetcher, NodeKey, TreeConfig, TreeController};
//! use chrono::{TimeZone, Utc};
//!
//! let date = Utc.with_ymd_and_hms(2023, 1, 1, 12, 0, 0).unwrap();
//! let mut tree = TreeController::new(TreeConfig::new("HEK", date))
//!     .on_events_update(|events| {
//!         for event in events {
//!             println!("selected: {} ({})", event.title, event.source);
//!         }
//!     })
//!     .on_hovered_events_update(|ids| println!("hovered: {:?}", ids));
//!
//! // Load the slot for (HEK, 2023-01-01)
//! let fetcher = JsonFileFetcher::new("data");
//! tree.reload(&fetcher);
//!
//! // Select a whole category, then hover one of its events
//! tree.set_category_checked(&NodeKey::from("path:0"), true);
//! tree.hover_enter(&NodeKey::from("ivo://helio-informatics.org/FL_1"));
//! ```

// Public modules
pub mod config;
pub mod controller;
pub mod fetch;
pub mod hover;
pub mod normalize;
pub mod selection;
pub mod tree;
pub mod types;

// Re-export main types for convenience
pub use config::{SlotKey, TreeConfig};
pub use controller::{
    EventsCallback, FetchOutcome, FetchTicket, SlotState, TreeController, TreeRow,
};
pub use fetch::{EventFetcher, FetchRequest, JsonFileFetcher};
pub use hover::{HoverChannel, HoverObserver, SubscriptionId};
pub use normalize::{display_title, normalize};
pub use selection::SelectionEngine;
pub use tree::{Forest, NodeIndex, NodeKind, RawNode, TreeNode};
pub use types::{
    CheckState, EventData, EventId, EventTreeError, NodeKey, Result, SelectedEvent, Timestamp,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_library_basics() {
        // Smoke test: a fresh controller has nothing loaded
        let tree = TreeController::new(TreeConfig::new("HEK", Utc::now()));
        assert_eq!(tree.state(), &SlotState::Empty);
        assert!(tree.selected_events().is_empty());
        assert!(tree.rows().is_empty());
    }
}
