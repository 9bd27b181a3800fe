use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::paths::Path;
use crate::model::{Category, ElementId, GraphSource};

/// An unordered, deduplicated set of elements carrying one circuit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Route(BTreeSet<ElementId>);

impl Route {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ElementId>,
    {
        Route(ids.into_iter().map(Into::into).collect())
    }

    pub fn union_path(&mut self, path: &Path) {
        self.0.extend(path.iter());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.0.contains(&id)
    }

    /// Ids in ascending order
    pub fn iter(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.0.iter().copied()
    }

    pub fn to_ids(&self) -> Vec<i64> {
        self.0.iter().map(|id| id.0).collect()
    }

    /// Members that are still conduit segments in `source`
    pub fn segments<S: GraphSource + ?Sized>(&self, source: &S) -> Vec<ElementId> {
        self.iter()
            .filter(|id| source.category(*id) == Some(Category::ConduitSegment))
            .collect()
    }
}

impl FromIterator<ElementId> for Route {
    fn from_iter<I: IntoIterator<Item = ElementId>>(iter: I) -> Self {
        Route(iter.into_iter().collect())
    }
}

impl From<&Path> for Route {
    fn from(path: &Path) -> Self {
        path.iter().collect()
    }
}
