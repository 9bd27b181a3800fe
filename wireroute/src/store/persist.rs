//! JSON persistence of a route store.
//!
//! One file per store, shaped `{"<circuit>": [id, ...]}` with ids ascending.

use std::collections::BTreeMap;
use std::path::Path;

use super::RouteStore;
use crate::core::WireRouteError;
use crate::routing::Route;

/// Read a store file; a missing file is an empty store.
pub fn load(path: &Path) -> Result<RouteStore, WireRouteError> {
    if !path.exists() {
        tracing::debug!("No route store at {}, starting empty", path.display());
        return Ok(RouteStore::new());
    }

    let content = std::fs::read_to_string(path)?;
    let raw: BTreeMap<String, Vec<i64>> = serde_json::from_str(&content)?;
    tracing::debug!("Loaded {} routes from {}", raw.len(), path.display());

    Ok(raw
        .into_iter()
        .map(|(circuit, ids)| (circuit, Route::from_ids(ids)))
        .collect())
}

pub fn save(path: &Path, store: &RouteStore) -> Result<(), WireRouteError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let raw: BTreeMap<String, Vec<i64>> = store
        .get_all()
        .into_iter()
        .map(|(circuit, route)| (circuit, route.to_ids()))
        .collect();
    std::fs::write(path, serde_json::to_string_pretty(&raw)?)?;
    tracing::debug!("Saved {} routes to {}", raw.len(), path.display());
    Ok(())
}
