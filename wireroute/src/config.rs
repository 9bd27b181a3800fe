//! Engine configuration, loadable from a JSON file.
//!
//! Every field has a default so a partial file (or none at all) is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::WireRouteError;
use crate::model::ConnectorKind;

/// Number of wiring slots hosts expose per conduit segment.
pub const DEFAULT_MAX_SLOTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Slots scanned per segment, `1..=max_slots`
    #[serde(default = "default_max_slots")]
    pub max_slots: usize,

    /// Connector kinds that count as physical joins
    #[serde(default = "default_routable_kinds")]
    pub routable_connector_kinds: Vec<ConnectorKind>,

    /// Switch-id values hosts use to display an empty tag
    #[serde(default = "default_placeholder_tags")]
    pub placeholder_switch_tags: Vec<String>,

    #[serde(default)]
    pub store_dir: Option<PathBuf>,

    #[serde(default = "default_computed_store_file")]
    pub computed_store_file: String,

    #[serde(default = "default_custom_store_file")]
    pub custom_store_file: String,
}

fn default_max_slots() -> usize {
    DEFAULT_MAX_SLOTS
}

fn default_routable_kinds() -> Vec<ConnectorKind> {
    ConnectorKind::ROUTABLE.to_vec()
}

fn default_placeholder_tags() -> Vec<String> {
    vec!["[Empty]".to_string()]
}

fn default_computed_store_file() -> String {
    "computed_routes.json".to_string()
}

fn default_custom_store_file() -> String {
    "custom_routes.json".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_slots: default_max_slots(),
            routable_connector_kinds: default_routable_kinds(),
            placeholder_switch_tags: default_placeholder_tags(),
            store_dir: None,
            computed_store_file: default_computed_store_file(),
            custom_store_file: default_custom_store_file(),
        }
    }
}

impl EngineConfig {
    pub fn load_file(path: &Path) -> Result<Self, WireRouteError> {
        let content = std::fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    pub fn load_str(json: &str) -> Result<Self, WireRouteError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), WireRouteError> {
        if self.max_slots == 0 {
            return Err(WireRouteError::Config(
                "max_slots must be at least 1".to_string(),
            ));
        }
        if self.routable_connector_kinds.is_empty() {
            return Err(WireRouteError::Config(
                "routable_connector_kinds must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_store_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.store_dir = Some(dir.into());
        self
    }

    /// True for tags that mean "no switch group"
    pub fn is_placeholder_tag(&self, tag: &str) -> bool {
        let tag = tag.trim();
        tag.is_empty() || self.placeholder_switch_tags.iter().any(|p| p == tag)
    }

    pub fn computed_store_path(&self) -> Option<PathBuf> {
        self.store_dir
            .as_ref()
            .map(|dir| dir.join(&self.computed_store_file))
    }

    pub fn custom_store_path(&self) -> Option<PathBuf> {
        self.store_dir
            .as_ref()
            .map(|dir| dir.join(&self.custom_store_file))
    }
}
