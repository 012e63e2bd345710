//! Event tree data model
//!
//! This module contains the raw wire model handed over by the fetch layer and the
//! arena-backed forest the engine operates on.

pub mod forest;
pub mod raw;

// Re-export key types for convenience
pub use forest::{aggregate_states, Ancestors, Forest, NodeIndex, NodeKind, TreeNode};
pub use raw::{parse_forest_json, RawNode};
