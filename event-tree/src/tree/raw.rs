//! Raw event nodes as delivered by a data source
//!
//! This is the wire shape consumed from the fetch layer. It is parsed with serde and
//! then turned into a [`Forest`](super::Forest); nothing in it is interpreted beyond
//! the four fields below.

use crate::types::{EventData, EventId, Result};
use serde::{Deserialize, Deserializer, Serialize};

/// One node of a fetched event catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    /// Source id; absent on purely structural nodes
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: Option<EventId>,

    /// Title as received, possibly malformed
    #[serde(default)]
    pub label: String,

    /// Opaque payload
    #[serde(default, alias = "event_data")]
    pub event_data: Option<EventData>,

    /// Present (even when empty) on category nodes, absent on event leaves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<RawNode>>,
}

impl RawNode {
    /// Create an event leaf
    pub fn event(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: Some(EventId(id.into())),
            label: label.into(),
            event_data: None,
            children: None,
        }
    }

    /// Create a category node without an id
    pub fn category(label: impl Into<String>, children: Vec<RawNode>) -> Self {
        Self {
            id: None,
            label: label.into(),
            event_data: None,
            children: Some(children),
        }
    }

    /// Builder method: attach a payload
    pub fn with_event_data(mut self, data: EventData) -> Self {
        self.event_data = Some(data);
        self
    }

    /// Builder method: set the id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(EventId(id.into()));
        self
    }

    pub fn is_category(&self) -> bool {
        self.children.is_some()
    }
}

/// Parse a JSON array of raw nodes
pub fn parse_forest_json(json: &str) -> Result<Vec<RawNode>> {
    let nodes: Vec<RawNode> = serde_json::from_str(json)?;
    Ok(nodes)
}

/// Ids arrive either as strings or as plain numbers
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(serde_json::Number),
}

fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<Option<EventId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawId> = Option::deserialize(deserializer)?;
    Ok(raw.map(|id| match id {
        RawId::Text(s) => EventId(s),
        RawId::Number(n) => EventId(n.to_string()),
    }))
}
