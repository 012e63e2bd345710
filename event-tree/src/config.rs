//! Tree instance configuration
//!
//! This module defines the configuration accepted when a tree instance is created:
//! the source tag, the date that selects the fetch slot, and an optional endpoint
//! override for the fetch layer. Host-level settings (which trees to show, where
//! fixture data lives) belong to the application layer.

use crate::types::Timestamp;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Configuration for one tree instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Source tag attached to every emitted event (e.g. "HEK", "CCMC")
    pub source: String,

    /// Date selecting the fetch slot
    #[serde(default = "Utc::now")]
    pub events_date: Timestamp,

    /// Optional: override the fetch endpoint for this instance
    #[serde(default)]
    pub api_url: Option<String>,
}

impl TreeConfig {
    /// Create a configuration for `source` at the given date
    pub fn new(source: impl Into<String>, events_date: Timestamp) -> Self {
        Self {
            source: source.into(),
            events_date,
            api_url: None,
        }
    }

    /// Builder method: set the events date
    pub fn with_events_date(mut self, events_date: Timestamp) -> Self {
        self.events_date = events_date;
        self
    }

    /// Builder method: override the fetch endpoint
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    /// Key of the slot this configuration selects
    pub fn slot_key(&self) -> SlotKey {
        SlotKey {
            source: self.source.clone(),
            date: self.events_date,
        }
    }
}

/// Fetch/state unit managed by a controller
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotKey {
    pub source: String,
    pub date: Timestamp,
}

impl std::fmt::Display for SlotKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.source, self.date.format("%Y-%m-%dT%H:%M:%SZ"))
    }
}
