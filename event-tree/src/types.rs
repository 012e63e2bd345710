//! Core types for the event tree engine
//!
//! This module defines the identifiers, check states and host-facing records that
//! flow through the engine. Everything here is plain data: the tree itself lives in
//! [`crate::tree`], the propagation rules in [`crate::selection`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Timestamp type used for event dates
pub type Timestamp = DateTime<Utc>;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EventTreeError>;

/// Opaque event payload, carried through the engine unmodified
pub type EventData = serde_json::Map<String, serde_json::Value>;

/// Errors that can occur while loading or building an event tree
#[derive(Debug, thiserror::Error)]
pub enum EventTreeError {
    #[error("Failed to fetch events: {0}")]
    FetchFailed(String),

    #[error("Failed to parse event data: {0}")]
    DataParseError(String),

    #[error("Duplicate node id in forest: {0}")]
    DuplicateNodeId(EventId),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Identifier of an event as assigned by its data source
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub String);

impl EventId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        EventId(value.to_string())
    }
}

/// Prefix used when rendering a synthetic path key as text
const PATH_KEY_PREFIX: &str = "path:";

/// Marks the rest of a key's text as a literal id
///
/// Needed for ids that would otherwise read as a path key (`id:path:0/1`) or that
/// start with this prefix themselves.
const ID_KEY_PREFIX: &str = "id:";

/// Stable key of a node within one forest
///
/// Nodes that carry a source id are keyed by it. Structural nodes without an id get
/// a synthetic key made of the child indices from the root, so the same response
/// always produces the same keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKey {
    /// Key taken from the node's own id
    Id(EventId),
    /// Synthetic key: child index at each level, starting at the root list
    Path(Vec<usize>),
}

impl NodeKey {
    /// Source id of the node, if it has one
    pub fn event_id(&self) -> Option<&EventId> {
        match self {
            NodeKey::Id(id) => Some(id),
            NodeKey::Path(_) => None,
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKey::Id(id)
                if id.0.starts_with(ID_KEY_PREFIX) || parse_path(&id.0).is_some() =>
            {
                write!(f, "{}{}", ID_KEY_PREFIX, id)
            }
            NodeKey::Id(id) => write!(f, "{}", id),
            NodeKey::Path(path) => {
                f.write_str(PATH_KEY_PREFIX)?;
                for (i, index) in path.iter().enumerate() {
                    if i > 0 {
                        f.write_str("/")?;
                    }
                    write!(f, "{}", index)?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for NodeKey {
    type Err = std::convert::Infallible;

    /// `path:0/2/1` parses to a synthetic key, `id:<text>` to the id `<text>`,
    /// anything else is an id.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Some(id) = s.strip_prefix(ID_KEY_PREFIX) {
            return Ok(NodeKey::Id(EventId(id.to_string())));
        }
        match parse_path(s) {
            Some(path) => Ok(NodeKey::Path(path)),
            None => Ok(NodeKey::Id(EventId(s.to_string()))),
        }
    }
}

fn parse_path(s: &str) -> Option<Vec<usize>> {
    let rest = s.strip_prefix(PATH_KEY_PREFIX)?;
    rest.split('/').map(|index| index.parse().ok()).collect()
}

impl From<&str> for NodeKey {
    fn from(value: &str) -> Self {
        match value.parse() {
            Ok(key) => key,
            Err(never) => match never {},
        }
    }
}

impl Serialize for NodeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Tri-state check status of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    #[default]
    Unchecked,
    Checked,
    /// Some, but not all, selectable descendants are checked
    Indeterminate,
}

impl CheckState {
    pub fn from_bool(checked: bool) -> Self {
        if checked {
            CheckState::Checked
        } else {
            CheckState::Unchecked
        }
    }

    pub fn is_checked(&self) -> bool {
        matches!(self, CheckState::Checked)
    }
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckState::Unchecked => write!(f, "[ ]"),
            CheckState::Checked => write!(f, "[x]"),
            CheckState::Indeterminate => write!(f, "[-]"),
        }
    }
}

/// A selected leaf event as delivered to the host through `on_events_update`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedEvent {
    /// Node key inside the forest that produced this event
    pub key: NodeKey,
    /// Source id, if the node carried one
    pub id: Option<EventId>,
    /// Raw label as received from the data source
    pub label: String,
    /// Normalized display title (short label, label, or fallback)
    pub title: String,
    /// Opaque payload, unmodified
    pub event_data: EventData,
    /// Source tag of the tree instance that emitted this event
    pub source: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_key_display() {
        assert_eq!(NodeKey::Id(EventId::from("FL_1")).to_string(), "FL_1");
        assert_eq!(NodeKey::Path(vec![0, 2, 1]).to_string(), "path:0/2/1");
        assert_eq!(NodeKey::Path(vec![3]).to_string(), "path:3");
    }

    #[test]
    fn test_node_key_parse() {
        assert_eq!(NodeKey::from("path:0/2/1"), NodeKey::Path(vec![0, 2, 1]));
        assert_eq!(NodeKey::from("FL_1"), NodeKey::Id(EventId::from("FL_1")));
        // Not a valid index list, so it is an ordinary id
        assert_eq!(
            NodeKey::from("path:abc"),
            NodeKey::Id(EventId::from("path:abc"))
        );
    }

    #[test]
    fn test_node_key_id_prefix() {
        let literal = NodeKey::Id(EventId::from("path:0/1"));
        assert_eq!(NodeKey::from("id:path:0/1"), literal);
        assert_eq!(literal.to_string(), "id:path:0/1");
        assert_eq!(NodeKey::from(literal.to_string().as_str()), literal);

        let prefixed = NodeKey::Id(EventId::from("id:7"));
        assert_eq!(prefixed.to_string(), "id:id:7");
        assert_eq!(NodeKey::from("id:id:7"), prefixed);

        // Ordinary ids stay unprefixed
        assert_eq!(NodeKey::from("id:FL_1"), NodeKey::from("FL_1"));
        assert_eq!(NodeKey::from("path:abc").to_string(), "path:abc");
    }

    #[test]
    fn test_node_key_serializes_as_text() {
        let keys = vec![NodeKey::from("AR_7"), NodeKey::Path(vec![1, 0])];
        let json = serde_json::to_string(&keys).unwrap();
        assert_eq!(json, r#"["AR_7","path:1/0"]"#);
    }

    #[test]
    fn test_check_state_display() {
        assert_eq!(format!("{}", CheckState::Checked), "[x]");
        assert_eq!(format!("{}", CheckState::Unchecked), "[ ]");
        assert_eq!(format!("{}", CheckState::Indeterminate), "[-]");
        assert!(CheckState::from_bool(true).is_checked());
        assert!(!CheckState::Indeterminate.is_checked());
    }
}
