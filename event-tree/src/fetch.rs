//! Fetch boundary
//!
//! The engine does not know how catalogs are transported. A controller asks an
//! [`EventFetcher`] for the raw nodes of a (source, date) slot and receives either
//! the whole forest or an error. Retries and caching live behind the trait.

use crate::tree::{parse_forest_json, RawNode};
use crate::types::{EventTreeError, Result, Timestamp};
use std::path::{Path, PathBuf};

/// What a controller asks the fetch layer for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub source: String,
    pub date: Timestamp,
    /// Endpoint override from the tree configuration
    pub endpoint: Option<String>,
}

/// Data-fetching collaborator
pub trait EventFetcher {
    /// Fetch the complete raw forest for one slot
    fn fetch(&self, request: &FetchRequest) -> Result<Vec<RawNode>>;
}

impl<F> EventFetcher for F
where
    F: Fn(&FetchRequest) -> Result<Vec<RawNode>>,
{
    fn fetch(&self, request: &FetchRequest) -> Result<Vec<RawNode>> {
        self(request)
    }
}

/// Fetcher reading catalogs from `<root>/<source>/<YYYY-MM-DD>.json`
///
/// An endpoint override in the request replaces the root directory.
#[derive(Debug, Clone)]
pub struct JsonFileFetcher {
    root: PathBuf,
}

impl JsonFileFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File that holds the catalog for `request`
    pub fn catalog_path(&self, request: &FetchRequest) -> PathBuf {
        let root = request
            .endpoint
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| self.root.clone());
        root.join(&request.source)
            .join(format!("{}.json", request.date.format("%Y-%m-%d")))
    }
}

impl EventFetcher for JsonFileFetcher {
    fn fetch(&self, request: &FetchRequest) -> Result<Vec<RawNode>> {
        let path = self.catalog_path(request);
        log::info!("Loading event catalog: {:?}", path);

        if !path.exists() {
            return Err(EventTreeError::FetchFailed(format!(
                "no catalog for {} on {}: {:?}",
                request.source,
                request.date.format("%Y-%m-%d"),
                path
            )));
        }

        let content = std::fs::read_to_string(&path)?;
        let nodes = parse_forest_json(&content).map_err(|e| {
            EventTreeError::DataParseError(format!("{:?}: {}", path, e))
        })?;

        log::debug!("Catalog {:?} has {} top-level nodes", path, nodes.len());
        Ok(nodes)
    }
}
