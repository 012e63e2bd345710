//! Configuration loading and parsing
//!
//! A config file describes which tree instances the host shows, where their
//! catalogs live, and a scripted list of interactions to replay against them.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use event_tree::{Timestamp, TreeConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Sources shown when neither the command line nor the config name any
pub const DEFAULT_SOURCES: [&str; 3] = ["HEK", "CCMC", "RHESSI"];

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub trees: Vec<TreeEntry>,
    #[serde(default)]
    pub actions: Vec<ActionConfig>,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DataConfig {
    /// Root directory of `<source>/<YYYY-MM-DD>.json` catalogs
    pub dir: Option<PathBuf>,
    /// `YYYY-MM-DD` or RFC 3339
    pub date: Option<String>,
}

/// One tree instance
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TreeEntry {
    pub source: String,
    pub api_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ActionConfig {
    pub source: String,
    pub action: ActionKind,
    /// Event id, or `path:i/j/k` for nodes without one. `id:` forces a literal id
    pub node: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Check,
    Uncheck,
    Toggle,
    Expand,
    Collapse,
    Hover,
    Unhover,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub expand_all: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Semantic problems in an otherwise well-formed config
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid date '{0}': expected YYYY-MM-DD or RFC 3339")]
    InvalidDate(String),

    #[error("Tree source '{0}' is configured more than once")]
    DuplicateSource(String),

    #[error("Empty tree source")]
    EmptySource,

    #[error("Action on '{node}' targets unknown source '{tag}'")]
    UnknownSource { tag: String, node: String },
}

/// Parse a date given as `YYYY-MM-DD` (midnight UTC) or RFC 3339
pub fn parse_date(value: &str) -> std::result::Result<Timestamp, ConfigError> {
    if let Ok(day) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = day.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&midnight));
        }
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ConfigError::InvalidDate(value.to_string()))
}

impl AppConfig {
    /// Tree instances to create, falling back to the default sources
    pub fn tree_configs(&self, date: Timestamp) -> Vec<TreeConfig> {
        if self.trees.is_empty() {
            return DEFAULT_SOURCES
                .iter()
                .map(|source| TreeConfig::new(*source, date))
                .collect();
        }
        self.trees
            .iter()
            .map(|entry| {
                let config = TreeConfig::new(entry.source.clone(), date);
                match &entry.api_url {
                    Some(url) => config.with_api_url(url.clone()),
                    None => config,
                }
            })
            .collect()
    }

    /// Check cross-references that serde cannot
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if let Some(date) = &self.data.date {
            parse_date(date)?;
        }

        let mut sources = HashSet::new();
        for entry in &self.trees {
            if entry.source.trim().is_empty() {
                return Err(ConfigError::EmptySource);
            }
            if !sources.insert(entry.source.as_str()) {
                return Err(ConfigError::DuplicateSource(entry.source.clone()));
            }
        }

        let known = |source: &str| {
            if self.trees.is_empty() {
                DEFAULT_SOURCES.contains(&source)
            } else {
                sources.contains(source)
            }
        };
        for action in &self.actions {
            if !known(&action.source) {
                return Err(ConfigError::UnknownSource {
                    tag: action.source.clone(),
                    node: action.node.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    config
        .validate()
        .with_context(|| format!("Invalid config file: {:?}", path))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            [data]
            dir = "demos/data"
            date = "2023-01-01"

            [[trees]]
            source = "HEK"

            [[trees]]
            source = "CCMC"
            api_url = "/mirror/ccmc"

            [[actions]]
            source = "HEK"
            action = "check"
            node = "path:1"

            [[actions]]
            source = "CCMC"
            action = "hover"
            node = "CME-1"

            [output]
            format = "json"
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.trees.len(), 2);
        assert_eq!(config.actions[0].action, ActionKind::Check);
        assert_eq!(config.actions[1].action, ActionKind::Hover);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(!config.output.expand_all);
        assert!(config.validate().is_ok());

        let date = parse_date("2023-01-01").unwrap();
        let trees = config.tree_configs(date);
        assert_eq!(trees[1].api_url.as_deref(), Some("/mirror/ccmc"));
    }

    #[test]
    fn test_empty_config_uses_default_sources() {
        let config: AppConfig = toml::from_str("").unwrap();
        let sources: Vec<String> = config
            .tree_configs(Utc::now())
            .into_iter()
            .map(|c| c.source)
            .collect();
        assert_eq!(sources, vec!["HEK", "CCMC", "RHESSI"]);
        assert_eq!(config.output.format, OutputFormat::Text);
    }

    #[test]
    fn test_parse_date_forms() {
        assert_eq!(
            parse_date("2023-01-01").unwrap(),
            Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_date("2023-01-01T12:30:00+02:00").unwrap(),
            Utc.with_ymd_and_hms(2023, 1, 1, 10, 30, 0).unwrap()
        );
        assert_eq!(
            parse_date("yesterday"),
            Err(ConfigError::InvalidDate("yesterday".to_string()))
        );
    }

    #[test]
    fn test_validation_errors() {
        let duplicate: AppConfig = toml::from_str(
            r#"
            [[trees]]
            source = "HEK"
            [[trees]]
            source = "HEK"
            "#,
        )
        .unwrap();
        assert_eq!(
            duplicate.validate(),
            Err(ConfigError::DuplicateSource("HEK".to_string()))
        );

        let unknown: AppConfig = toml::from_str(
            r#"
            [[trees]]
            source = "HEK"
            [[actions]]
            source = "RHESSI"
            action = "toggle"
            node = "path:0"
            "#,
        )
        .unwrap();
        assert!(matches!(
            unknown.validate(),
            Err(ConfigError::UnknownSource { .. })
        ));
    }

    #[test]
    fn test_load_config_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[data]\ndate = \"not a date\"\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("not a date"));
    }
}
