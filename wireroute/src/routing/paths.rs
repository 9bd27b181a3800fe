//! Path enumeration and shortest-path selection.
//!
//! Paths are found breadth-first over the adapter's active neighbors. Two
//! searches are offered:
//! - [`enumerate_paths`]: every simple path, used for circuit routes
//! - [`first_path`]: the first path reached, used for switch legs

use serde::Serialize;
use std::collections::{HashSet, VecDeque};

use super::adapter::ConnectivityAdapter;
use crate::model::{ElementId, GraphSource};

/// An ordered run of distinct elements, start first and target last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Path(Vec<ElementId>);

impl Path {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.0.contains(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[ElementId] {
        &self.0
    }

    /// Sum of the edge weight of every node on the path.
    pub fn weight<S: GraphSource + ?Sized>(&self, adapter: &ConnectivityAdapter<'_, S>) -> f64 {
        self.0.iter().map(|id| adapter.edge_weight(*id)).sum()
    }
}

impl From<Vec<ElementId>> for Path {
    fn from(nodes: Vec<ElementId>) -> Self {
        Path(nodes)
    }
}

/// The selected path together with its total weight
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortestPath {
    pub path: Path,
    pub weight: f64,
}

/// Distinct neighbor elements of `id`, in connector order.
fn neighbor_elements<S: GraphSource + ?Sized>(
    adapter: &ConnectivityAdapter<'_, S>,
    id: ElementId,
) -> Vec<ElementId> {
    let mut elements = Vec::new();
    for neighbor in adapter.active_neighbors(id) {
        if !elements.contains(&neighbor.element) {
            elements.push(neighbor.element);
        }
    }
    elements
}

/// Normalized endpoints, or `None` when either one is gone from the host.
fn endpoints<S: GraphSource + ?Sized>(
    adapter: &ConnectivityAdapter<'_, S>,
    start: ElementId,
    target: ElementId,
) -> Option<(ElementId, ElementId)> {
    let start = adapter.owner(start);
    let target = adapter.owner(target);
    let source = adapter.source();
    if source.contains(start) && source.contains(target) {
        Some((start, target))
    } else {
        None
    }
}

/// Every simple path from `start` to `target`, in discovery order.
///
/// A path is finished as soon as it reaches `target` and is never extended
/// past it. Returns the trivial one-node path when both ends resolve to the
/// same element and an empty list when no path exists.
pub fn enumerate_paths<S: GraphSource + ?Sized>(
    adapter: &ConnectivityAdapter<'_, S>,
    start: ElementId,
    target: ElementId,
) -> Vec<Path> {
    let Some((start, target)) = endpoints(adapter, start, target) else {
        return Vec::new();
    };
    if start == target {
        return vec![Path(vec![start])];
    }

    let mut found = Vec::new();
    let mut frontier: VecDeque<Vec<ElementId>> = VecDeque::from([vec![start]]);

    while let Some(partial) = frontier.pop_front() {
        let Some(&last) = partial.last() else {
            continue;
        };
        for next in neighbor_elements(adapter, last) {
            if partial.contains(&next) {
                continue;
            }
            let mut extended = partial.clone();
            extended.push(next);
            if next == target {
                found.push(Path(extended));
            } else {
                frontier.push_back(extended);
            }
        }
    }

    found
}

/// The first path breadth-first search reaches, ignoring weights.
///
/// Every element is expanded at most once, so this is the fewest-hops path
/// but not necessarily the lightest one.
pub fn first_path<S: GraphSource + ?Sized>(
    adapter: &ConnectivityAdapter<'_, S>,
    start: ElementId,
    target: ElementId,
) -> Option<Path> {
    let (start, target) = endpoints(adapter, start, target)?;
    if start == target {
        return Some(Path(vec![start]));
    }

    let mut visited = HashSet::from([start]);
    let mut frontier: VecDeque<Vec<ElementId>> = VecDeque::from([vec![start]]);

    while let Some(partial) = frontier.pop_front() {
        let Some(&last) = partial.last() else {
            continue;
        };
        for next in neighbor_elements(adapter, last) {
            if !visited.insert(next) {
                continue;
            }
            let mut extended = partial.clone();
            extended.push(next);
            if next == target {
                return Some(Path(extended));
            }
            frontier.push_back(extended);
        }
    }

    None
}

/// The lightest candidate; the earliest one wins a tie.
pub fn select_shortest<S: GraphSource + ?Sized>(
    adapter: &ConnectivityAdapter<'_, S>,
    candidates: &[Path],
) -> Option<ShortestPath> {
    let mut best: Option<ShortestPath> = None;
    for path in candidates {
        let weight = path.weight(adapter);
        let lighter = match &best {
            Some(current) => weight < current.weight,
            None => true,
        };
        if lighter {
            best = Some(ShortestPath {
                path: path.clone(),
                weight,
            });
        }
    }
    best
}

/// Enumerate then select: the canonical path of a circuit terminal.
pub fn shortest_path<S: GraphSource + ?Sized>(
    adapter: &ConnectivityAdapter<'_, S>,
    start: ElementId,
    target: ElementId,
) -> Option<ShortestPath> {
    select_shortest(adapter, &enumerate_paths(adapter, start, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, ConnectorKind, ConnectorRef, Document, ModelElement};

    fn device(id: i64, category: Category, connectors: usize) -> ModelElement {
        ModelElement::new(id, category).with_connectors(connectors, ConnectorKind::End)
    }

    fn link(doc: &mut Document, a: (i64, usize), b: (i64, usize)) {
        assert!(doc.join(ConnectorRef::new(a.0, a.1), ConnectorRef::new(b.0, b.1)));
    }

    fn nodes(path: &Path) -> Vec<i64> {
        path.iter().map(|id| id.0).collect()
    }

    /// A(1) - B(2) - C(3) - D(4) with weights 2, 3, 4 on B, C, D
    fn linear() -> Document {
        let mut doc = Document::new();
        doc.add_element(device(1, Category::Fixture, 1));
        doc.add_element(ModelElement::segment(2, 2.0, 5));
        doc.add_element(ModelElement::segment(3, 3.0, 5));
        doc.add_element(ModelElement::segment(4, 4.0, 5));
        link(&mut doc, (1, 0), (2, 0));
        link(&mut doc, (2, 1), (3, 0));
        link(&mut doc, (3, 1), (4, 0));
        doc
    }

    /// A(1) -> B(2, w=1) -> D(4) and A(1) -> C(3, w=5) -> D(4)
    fn diamond(b: f64, c: f64) -> Document {
        let mut doc = Document::new();
        doc.add_element(device(1, Category::Fixture, 2));
        doc.add_element(ModelElement::segment(2, b, 5));
        doc.add_element(ModelElement::segment(3, c, 5));
        doc.add_element(device(4, Category::Equipment, 2));
        link(&mut doc, (1, 0), (2, 0));
        link(&mut doc, (1, 1), (3, 0));
        link(&mut doc, (2, 1), (4, 0));
        link(&mut doc, (3, 1), (4, 1));
        doc
    }

    #[test]
    fn test_linear_chain_single_path() {
        let doc = linear();
        let adapter = ConnectivityAdapter::new(&doc, &ConnectorKind::ROUTABLE);

        let paths = enumerate_paths(&adapter, ElementId(1), ElementId(4));
        assert_eq!(paths.len(), 1);
        assert_eq!(nodes(&paths[0]), vec![1, 2, 3, 4]);

        let shortest = select_shortest(&adapter, &paths).unwrap();
        assert_eq!(shortest.weight, 9.0);
    }

    #[test]
    fn test_diamond_picks_lighter_branch() {
        let doc = diamond(1.0, 5.0);
        let adapter = ConnectivityAdapter::new(&doc, &ConnectorKind::ROUTABLE);

        let paths = enumerate_paths(&adapter, ElementId(1), ElementId(4));
        assert_eq!(paths.len(), 2);

        let shortest = shortest_path(&adapter, ElementId(1), ElementId(4)).unwrap();
        assert_eq!(nodes(&shortest.path), vec![1, 2, 4]);
        assert_eq!(shortest.weight, 1.0);
    }

    #[test]
    fn test_tie_goes_to_first_found() {
        let doc = diamond(3.0, 3.0);
        let adapter = ConnectivityAdapter::new(&doc, &ConnectorKind::ROUTABLE);

        let paths = enumerate_paths(&adapter, ElementId(1), ElementId(4));
        let shortest = select_shortest(&adapter, &paths).unwrap();
        assert_eq!(shortest.path, paths[0]);
    }

    #[test]
    fn test_first_path_ignores_weight() {
        let doc = diamond(5.0, 1.0);
        let adapter = ConnectivityAdapter::new(&doc, &ConnectorKind::ROUTABLE);

        let first = first_path(&adapter, ElementId(1), ElementId(4)).unwrap();
        let shortest = shortest_path(&adapter, ElementId(1), ElementId(4)).unwrap();
        assert_eq!(nodes(&first), vec![1, 2, 4]);
        assert_eq!(nodes(&shortest.path), vec![1, 3, 4]);
    }

    #[test]
    fn test_trivial_and_missing_paths() {
        let mut doc = linear();
        doc.add_element(device(9, Category::Fixture, 1));
        let adapter = ConnectivityAdapter::new(&doc, &ConnectorKind::ROUTABLE);

        let trivial = enumerate_paths(&adapter, ElementId(2), ElementId(2));
        assert_eq!(trivial.len(), 1);
        assert_eq!(nodes(&trivial[0]), vec![2]);

        assert!(enumerate_paths(&adapter, ElementId(1), ElementId(9)).is_empty());
        assert!(first_path(&adapter, ElementId(1), ElementId(9)).is_none());
        assert!(select_shortest(&adapter, &[]).is_none());
        assert!(enumerate_paths(&adapter, ElementId(1), ElementId(99)).is_empty());
    }

    #[test]
    fn test_paths_are_simple_and_adjacent() {
        // 3x3 grid of segments, each with four connectors
        let mut doc = Document::new();
        let id = |r: i64, c: i64| r * 3 + c + 1;
        for r in 0..3 {
            for c in 0..3 {
                doc.add_element(
                    ModelElement::new(id(r, c), Category::ConduitSegment)
                        .with_connectors(4, ConnectorKind::End)
                        .with_length(1.0),
                );
            }
        }
        for r in 0..3 {
            for c in 0..3 {
                if c < 2 {
                    link(&mut doc, (id(r, c), 0), (id(r, c + 1), 1));
                }
                if r < 2 {
                    link(&mut doc, (id(r, c), 2), (id(r + 1, c), 3));
                }
            }
        }

        let adapter = ConnectivityAdapter::new(&doc, &ConnectorKind::ROUTABLE);
        let paths = enumerate_paths(&adapter, ElementId(1), ElementId(9));
        assert_eq!(paths.len(), 12);

        for path in &paths {
            let unique: HashSet<ElementId> = path.iter().collect();
            assert_eq!(unique.len(), path.len());
            for pair in path.as_slice().windows(2) {
                let neighbors: Vec<ElementId> = adapter
                    .active_neighbors(pair[0])
                    .iter()
                    .map(|n| n.element)
                    .collect();
                assert!(neighbors.contains(&pair[1]));
            }
        }

        let shortest = select_shortest(&adapter, &paths).unwrap();
        assert!(paths.iter().all(|p| shortest.weight <= p.weight(&adapter)));
        assert_eq!(shortest.path.len(), 5);
    }
}
