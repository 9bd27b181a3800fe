//! Switch-Topology Resolver
//!
//! Lighting fixtures and the switches controlling them share a switch-id
//! tag. Each tagged group is wired according to how many switches it has:
//! - 1 switch: switch to every fixture
//! - 2 switches (three-way): switch 1 to switch 2, then switch 2 to every fixture
//! - 3 switches (four-way): a chain of travelers, then switch 3 to every fixture
//!
//! Legs use the first path breadth-first search finds, not the lightest one.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use super::adapter::ConnectivityAdapter;
use super::paths::{first_path, Path};
use crate::model::{Category, ElementId, GraphSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "switches")]
pub enum SwitchTopology {
    Simple,
    ThreeWay,
    FourWay,
    /// A switch count with no defined wiring; the group gets no legs
    Unsupported(usize),
}

impl SwitchTopology {
    pub fn from_switch_count(count: usize) -> Self {
        match count {
            1 => SwitchTopology::Simple,
            2 => SwitchTopology::ThreeWay,
            3 => SwitchTopology::FourWay,
            n => SwitchTopology::Unsupported(n),
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, SwitchTopology::Unsupported(_))
    }
}

impl std::fmt::Display for SwitchTopology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SwitchTopology::Simple => write!(f, "simple"),
            SwitchTopology::ThreeWay => write!(f, "three-way"),
            SwitchTopology::FourWay => write!(f, "four-way"),
            SwitchTopology::Unsupported(n) => write!(f, "unsupported ({} switches)", n),
        }
    }
}

/// Return conductors pulled along every leg of a group with `switch_count` switches.
pub fn return_conductors(switch_count: usize) -> u32 {
    match switch_count {
        0 => 0,
        1 => 1,
        _ => 2,
    }
}

/// Fixtures and switches sharing one switch-id tag, in document order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchGroup {
    pub tag: String,
    pub switches: Vec<ElementId>,
    pub fixtures: Vec<ElementId>,
}

impl SwitchGroup {
    pub fn topology(&self) -> SwitchTopology {
        SwitchTopology::from_switch_count(self.switches.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LegKind {
    SwitchToSwitch,
    SwitchToFixture,
}

/// One wired connection inside a switch group; `path` is `None` when the
/// two ends are not connected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchLeg {
    pub from: ElementId,
    pub to: ElementId,
    pub kind: LegKind,
    pub path: Option<Path>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwitchGroupRoutes {
    pub group: SwitchGroup,
    pub topology: SwitchTopology,
    pub legs: Vec<SwitchLeg>,
}

impl SwitchGroupRoutes {
    pub fn return_conductors(&self) -> u32 {
        return_conductors(self.group.switches.len())
    }
}

/// Group top-level fixtures and switches by their trimmed switch-id tag.
///
/// Tags for which `is_placeholder` answers true are ignored. Groups need at
/// least one fixture and one switch.
pub fn collect_switch_groups<S, P>(
    adapter: &ConnectivityAdapter<'_, S>,
    is_placeholder: P,
) -> Vec<SwitchGroup>
where
    S: GraphSource + ?Sized,
    P: Fn(&str) -> bool,
{
    let source = adapter.source();
    let mut groups: BTreeMap<String, SwitchGroup> = BTreeMap::new();

    for id in source.element_ids() {
        if adapter.owner(id) != id {
            continue;
        }
        let category = source.category(id);
        if category != Some(Category::Fixture) && category != Some(Category::LightingDevice) {
            continue;
        }
        let Some(tag) = source.switch_tag(id) else {
            continue;
        };
        let tag = tag.trim();
        if is_placeholder(tag) {
            continue;
        }

        let group = groups.entry(tag.to_string()).or_insert_with(|| SwitchGroup {
            tag: tag.to_string(),
            switches: Vec::new(),
            fixtures: Vec::new(),
        });
        if category == Some(Category::Fixture) {
            group.fixtures.push(id);
        } else {
            group.switches.push(id);
        }
    }

    groups
        .into_values()
        .filter(|g| !g.fixtures.is_empty() && !g.switches.is_empty())
        .collect()
}

fn leg<S: GraphSource + ?Sized>(
    adapter: &ConnectivityAdapter<'_, S>,
    from: ElementId,
    to: ElementId,
    kind: LegKind,
) -> SwitchLeg {
    let path = first_path(adapter, from, to);
    if path.is_none() {
        debug!("No path for switch leg {} -> {}", from, to);
    }
    SwitchLeg { from, to, kind, path }
}

/// Legs of one group according to its topology.
pub fn resolve_group<S: GraphSource + ?Sized>(
    adapter: &ConnectivityAdapter<'_, S>,
    group: SwitchGroup,
) -> SwitchGroupRoutes {
    let topology = group.topology();
    let mut legs = Vec::new();

    if topology.is_supported() {
        for pair in group.switches.windows(2) {
            legs.push(leg(adapter, pair[0], pair[1], LegKind::SwitchToSwitch));
        }
        if let Some(&last) = group.switches.last() {
            for &fixture in &group.fixtures {
                legs.push(leg(adapter, last, fixture, LegKind::SwitchToFixture));
            }
        }
    } else {
        debug!("Skipping switch group {}: {}", group.tag, topology);
    }

    SwitchGroupRoutes {
        group,
        topology,
        legs,
    }
}

/// Legs of every switch group in the document.
pub fn resolve_switch_legs<S, P>(
    adapter: &ConnectivityAdapter<'_, S>,
    is_placeholder: P,
) -> Vec<SwitchGroupRoutes>
where
    S: GraphSource + ?Sized,
    P: Fn(&str) -> bool,
{
    collect_switch_groups(adapter, is_placeholder)
        .into_iter()
        .map(|group| resolve_group(adapter, group))
        .collect()
}
