//! Route Store
//!
//! Two keyed stores of routes per session: routes the engine computed and
//! routes a user overrode by hand. A custom route always shadows the
//! computed one for the same circuit.

pub mod persist;

use serde::Serialize;
use std::collections::HashMap;

use crate::routing::Route;

/// Routes keyed by circuit name; a name appears at most once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteStore {
    routes: HashMap<String, Route>,
}

impl RouteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the route of `circuit`
    pub fn upsert(&mut self, circuit: impl Into<String>, route: Route) {
        self.routes.insert(circuit.into(), route);
    }

    pub fn remove(&mut self, circuit: &str) -> Option<Route> {
        self.routes.remove(circuit)
    }

    pub fn clear(&mut self) {
        self.routes.clear();
    }

    /// A copy of the stored route
    pub fn get(&self, circuit: &str) -> Option<Route> {
        self.routes.get(circuit).cloned()
    }

    /// A copy of the whole mapping
    pub fn get_all(&self) -> HashMap<String, Route> {
        self.routes.clone()
    }

    pub fn contains(&self, circuit: &str) -> bool {
        self.routes.contains_key(circuit)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Stored circuit names, sorted
    pub fn circuit_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.routes.keys().cloned().collect();
        names.sort();
        names
    }
}

impl FromIterator<(String, Route)> for RouteStore {
    fn from_iter<I: IntoIterator<Item = (String, Route)>>(iter: I) -> Self {
        Self {
            routes: iter.into_iter().collect(),
        }
    }
}

/// Where an effective route came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteOrigin {
    Custom,
    Computed,
    /// Resolved on demand because neither store had an entry
    Fresh,
}

impl std::fmt::Display for RouteOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteOrigin::Custom => write!(f, "custom"),
            RouteOrigin::Computed => write!(f, "computed"),
            RouteOrigin::Fresh => write!(f, "fresh"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RouteStores {
    pub computed: RouteStore,
    pub custom: RouteStore,
}

impl RouteStores {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored route to use for `circuit`: custom first, then computed.
    pub fn lookup(&self, circuit: &str) -> Option<(Route, RouteOrigin)> {
        self.custom
            .get(circuit)
            .map(|r| (r, RouteOrigin::Custom))
            .or_else(|| self.computed.get(circuit).map(|r| (r, RouteOrigin::Computed)))
    }

    pub fn clear(&mut self) {
        self.computed.clear();
        self.custom.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_replaces() {
        let mut store = RouteStore::new();
        store.upsert("C1", Route::from_ids([1, 2]));
        store.upsert("C1", Route::from_ids([3]));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("C1"), Some(Route::from_ids([3])));
    }

    #[test]
    fn test_reads_are_copies() {
        let mut store = RouteStore::new();
        store.upsert("C1", Route::from_ids([1]));

        let mut copy = store.get_all();
        copy.clear();
        assert!(store.contains("C1"));

        store.remove("C1");
        store.upsert("C2", Route::new());
        store.upsert("A0", Route::new());
        assert_eq!(store.circuit_names(), vec!["A0", "C2"]);
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_custom_shadows_computed() {
        let mut stores = RouteStores::new();
        stores.computed.upsert("C1", Route::from_ids([1, 2]));
        assert_eq!(
            stores.lookup("C1"),
            Some((Route::from_ids([1, 2]), RouteOrigin::Computed))
        );

        stores.custom.upsert("C1", Route::from_ids([9]));
        assert_eq!(
            stores.lookup("C1"),
            Some((Route::from_ids([9]), RouteOrigin::Custom))
        );

        stores.custom.remove("C1");
        assert_eq!(stores.lookup("C1").map(|(_, o)| o), Some(RouteOrigin::Computed));
        assert_eq!(stores.lookup("C2"), None);
    }
}
