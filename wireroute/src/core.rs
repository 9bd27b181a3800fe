//! Engine facade shared by the CLI and any host integration.
//! Owns the configuration and the session route stores; the host document
//! is always passed in.

use serde::Serialize;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::model::{
    Category, CircuitKind, ElementId, GraphSource, SlotWriter, Transactional, WriteError,
};
use crate::routing::{
    resolve_switch_legs, CircuitRouteResolver, ConnectivityAdapter, Route, RouteError,
    SwitchGroupRoutes,
};
use crate::store::{persist, RouteOrigin, RouteStores};
use crate::wiring::{self, AllocationReport, FillReport, WiringAttributes};

#[derive(Debug, thiserror::Error)]
pub enum WireRouteError {
    #[error(transparent)]
    Route(#[from] RouteError),
    #[error("Write failed: {0}")]
    Write(#[from] WriteError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// The route a consumer should use for a circuit, and where it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveRoute {
    pub route: Route,
    pub origin: RouteOrigin,
}

/// Route resolution and wiring operations for one session.
#[derive(Debug, Clone, Default)]
pub struct WiringEngine {
    config: EngineConfig,
    stores: RouteStores,
}

impl WiringEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            stores: RouteStores::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn stores(&self) -> &RouteStores {
        &self.stores
    }

    pub fn stores_mut(&mut self) -> &mut RouteStores {
        &mut self.stores
    }

    fn resolver<'a, S: GraphSource + ?Sized>(&'a self, host: &'a S) -> CircuitRouteResolver<'a, S> {
        CircuitRouteResolver::new(host, &self.config.routable_connector_kinds)
    }

    /// Power circuits that have a base equipment, sorted by name.
    pub fn list_circuit_names<S: GraphSource + ?Sized>(&self, host: &S) -> Vec<String> {
        let mut names: Vec<String> = host
            .circuits()
            .into_iter()
            .filter(|c| c.kind == CircuitKind::Power && c.base_equipment.is_some())
            .map(|c| c.name)
            .collect();
        names.sort();
        names.dedup();
        names
    }

    pub fn resolve_route<S: GraphSource + ?Sized>(
        &self,
        host: &S,
        circuit: &str,
        category: Option<Category>,
    ) -> Result<Route, RouteError> {
        self.resolver(host).resolve_route(circuit, category)
    }

    pub fn resolve_route_between<S: GraphSource + ?Sized>(
        &self,
        host: &S,
        a: ElementId,
        b: ElementId,
    ) -> Result<Route, RouteError> {
        self.resolver(host).resolve_route_between(a, b)
    }

    pub fn resolve_switch_legs<S: GraphSource + ?Sized>(&self, host: &S) -> Vec<SwitchGroupRoutes> {
        let adapter = ConnectivityAdapter::new(host, &self.config.routable_connector_kinds);
        resolve_switch_legs(&adapter, |tag| self.config.is_placeholder_tag(tag))
    }

    /// Resolve `circuit` and remember the result as its computed route.
    pub fn compute_route<S: GraphSource + ?Sized>(
        &mut self,
        host: &S,
        circuit: &str,
    ) -> Result<Route, RouteError> {
        let route = self.resolve_route(host, circuit, None)?;
        self.stores.computed.upsert(circuit, route.clone());
        Ok(route)
    }

    pub fn upsert_custom_route(&mut self, circuit: impl Into<String>, route: Route) {
        self.stores.custom.upsert(circuit, route);
    }

    pub fn remove_custom_route(&mut self, circuit: &str) -> Option<Route> {
        self.stores.custom.remove(circuit)
    }

    /// Custom route, else computed route, else a fresh resolution.
    pub fn get_effective_route<S: GraphSource + ?Sized>(
        &self,
        host: &S,
        circuit: &str,
    ) -> Result<EffectiveRoute, RouteError> {
        if let Some((route, origin)) = self.stores.lookup(circuit) {
            return Ok(EffectiveRoute { route, origin });
        }
        let route = self.resolve_route(host, circuit, None)?;
        Ok(EffectiveRoute {
            route,
            origin: RouteOrigin::Fresh,
        })
    }

    /// Write one circuit onto the segments of `route`. The caller scopes
    /// the transaction.
    pub fn allocate_and_write<H>(
        &self,
        host: &mut H,
        route: &Route,
        circuit: &str,
        attributes: &WiringAttributes,
    ) -> Result<AllocationReport, WriteError>
    where
        H: GraphSource + SlotWriter + ?Sized,
    {
        wiring::allocate_and_write(host, route, circuit, attributes, self.config.max_slots)
    }

    /// Write every listed circuit onto its effective route in one transaction.
    pub fn fill_all<H>(&self, host: &mut H) -> Result<FillReport, WireRouteError>
    where
        H: GraphSource + SlotWriter + Transactional,
    {
        let mut plan = Vec::new();
        for name in self.list_circuit_names(&*host) {
            let Some(circuit) = host.circuit(&name) else {
                continue;
            };
            let effective = self.get_effective_route(&*host, &name)?;
            debug!("Circuit {} uses its {} route", name, effective.origin);
            plan.push((name, effective.route, WiringAttributes::from_circuit(&circuit)));
        }

        let max_slots = self.config.max_slots;
        let report = host.transaction("Fill all circuits", |doc| {
            let mut report = FillReport::new();
            for (name, route, attributes) in &plan {
                if route.segments(&*doc).is_empty() {
                    report.record_empty(name);
                    continue;
                }
                let allocation =
                    wiring::allocate_and_write(doc, route, name, attributes, max_slots)?;
                report.record(name, &allocation);
            }
            Ok::<_, WriteError>(report)
        })?;

        report.log_summary("Fill all circuits");
        Ok(report)
    }

    /// Write the return-conductor count of every switch group onto its legs
    /// in one transaction.
    pub fn fill_returns<H>(&self, host: &mut H) -> Result<FillReport, WireRouteError>
    where
        H: GraphSource + SlotWriter + Transactional,
    {
        let mut plan = Vec::new();
        for group in self.resolve_switch_legs(&*host) {
            let circuit = group
                .group
                .fixtures
                .iter()
                .find_map(|f| host.circuit_tag(*f))
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty());
            let Some(circuit) = circuit else {
                debug!("Switch group {} has no circuit, skipped", group.group.tag);
                continue;
            };

            let mut route = Route::new();
            for leg in &group.legs {
                if let Some(path) = &leg.path {
                    route.union_path(path);
                }
            }
            plan.push((circuit, route, group.return_conductors()));
        }

        let max_slots = self.config.max_slots;
        let report = host.transaction("Fill return conductors", |doc| {
            let mut report = FillReport::new();
            for (circuit, route, returns) in &plan {
                if route.segments(&*doc).is_empty() {
                    report.record_empty(circuit);
                    continue;
                }
                let allocation = wiring::write_returns(doc, route, circuit, *returns, max_slots)?;
                report.record(circuit, &allocation);
            }
            Ok::<_, WriteError>(report)
        })?;

        report.log_summary("Fill return conductors");
        Ok(report)
    }

    /// Blank every wiring slot in the document in one transaction.
    pub fn clear_all_slots<H>(&self, host: &mut H) -> Result<usize, WireRouteError>
    where
        H: SlotWriter + Transactional,
    {
        let max_slots = self.config.max_slots;
        let cleared = host.transaction("Clear wiring slots", |doc| {
            wiring::clear_slots(doc, max_slots)
        })?;
        info!("Cleared {} wiring slots", cleared);
        Ok(cleared)
    }

    /// Replace both stores with the files in the configured store directory.
    pub fn load_stores(&mut self) -> Result<(), WireRouteError> {
        let (computed, custom) = self.store_paths()?;
        self.stores.computed = persist::load(&computed)?;
        self.stores.custom = persist::load(&custom)?;
        info!(
            "Loaded {} computed and {} custom routes",
            self.stores.computed.len(),
            self.stores.custom.len()
        );
        Ok(())
    }

    pub fn save_stores(&self) -> Result<(), WireRouteError> {
        let (computed, custom) = self.store_paths()?;
        persist::save(&computed, &self.stores.computed)?;
        persist::save(&custom, &self.stores.custom)?;
        Ok(())
    }

    fn store_paths(&self) -> Result<(std::path::PathBuf, std::path::PathBuf), WireRouteError> {
        match (self.config.computed_store_path(), self.config.custom_store_path()) {
            (Some(computed), Some(custom)) => Ok((computed, custom)),
            _ => Err(WireRouteError::Config(
                "no route store directory configured".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Circuit, ConnectorKind, ConnectorRef, Document, ModelElement};
    use tempfile::TempDir;

    fn link(doc: &mut Document, a: (i64, usize), b: (i64, usize)) {
        assert!(doc.join(ConnectorRef::new(a.0, a.1), ConnectorRef::new(b.0, b.1)));
    }

    /// Panel(100) - seg 10 - seg 11 - Light(1), circuit L1
    fn small_document() -> Document {
        let mut doc = Document::new();
        doc.add_element(
            ModelElement::new(100, Category::Equipment).with_connectors(1, ConnectorKind::End),
        );
        doc.add_element(ModelElement::segment(10, 2.0, 5));
        doc.add_element(ModelElement::segment(11, 3.0, 5));
        doc.add_element(
            ModelElement::new(1, Category::Fixture)
                .with_connectors(1, ConnectorKind::End)
                .with_circuit("L1"),
        );
        link(&mut doc, (100, 0), (10, 0));
        link(&mut doc, (10, 1), (11, 0));
        link(&mut doc, (11, 1), (1, 0));
        doc.add_circuit(Circuit::new("L1").with_base(100).with_members([1]));
        doc.add_circuit(Circuit::new("Data").with_base(100).with_kind(CircuitKind::Other));
        doc.add_circuit(Circuit::new("A-Orphan"));
        doc
    }

    #[test]
    fn test_list_circuit_names_only_power_with_base() {
        let doc = small_document();
        let engine = WiringEngine::default();
        assert_eq!(engine.list_circuit_names(&doc), vec!["L1"]);
    }

    #[test]
    fn test_effective_route_precedence() {
        let doc = small_document();
        let mut engine = WiringEngine::default();

        let fresh = engine.get_effective_route(&doc, "L1").unwrap();
        assert_eq!(fresh.origin, RouteOrigin::Fresh);
        assert_eq!(fresh.route.to_ids(), vec![1, 10, 11, 100]);

        engine.compute_route(&doc, "L1").unwrap();
        assert_eq!(
            engine.get_effective_route(&doc, "L1").unwrap().origin,
            RouteOrigin::Computed
        );

        let custom = Route::from_ids([10]);
        engine.upsert_custom_route("L1", custom.clone());
        let effective = engine.get_effective_route(&doc, "L1").unwrap();
        assert_eq!(effective.route, custom);
        assert_eq!(effective.origin, RouteOrigin::Custom);

        engine.remove_custom_route("L1");
        assert_eq!(
            engine.get_effective_route(&doc, "L1").unwrap().origin,
            RouteOrigin::Computed
        );
    }

    #[test]
    fn test_fill_all_writes_segments() {
        let mut doc = small_document();
        let engine = WiringEngine::default();

        let report = engine.fill_all(&mut doc).unwrap();
        assert_eq!(report.circuits_written, vec!["L1"]);
        assert_eq!(report.slots_written, 2);
        assert!(doc.slot(ElementId(10), 1).unwrap().holds("L1"));
        assert!(doc.slot(ElementId(11), 1).unwrap().holds("L1"));

        let again = engine.fill_all(&mut doc).unwrap();
        assert_eq!(again.slots_written, 0);

        assert_eq!(engine.clear_all_slots(&mut doc).unwrap(), 2);
        assert_eq!(doc.stats().occupied_slots, 0);
    }

    #[test]
    fn test_fill_all_rolls_back_on_write_failure() {
        // A segment that reports a slot it cannot write
        struct Flaky {
            inner: Document,
        }

        impl GraphSource for Flaky {
            fn element_ids(&self) -> Vec<ElementId> {
                self.inner.element_ids()
            }
            fn category(&self, id: ElementId) -> Option<Category> {
                self.inner.category(id)
            }
            fn connectors(&self, id: ElementId) -> Vec<crate::model::ConnectorView> {
                self.inner.connectors(id)
            }
            fn peers(&self, c: ConnectorRef) -> Vec<ConnectorRef> {
                self.inner.peers(c)
            }
            fn super_component(&self, id: ElementId) -> Option<ElementId> {
                self.inner.super_component(id)
            }
            fn length(&self, id: ElementId) -> Option<f64> {
                self.inner.length(id)
            }
            fn circuit_tag(&self, id: ElementId) -> Option<String> {
                self.inner.circuit_tag(id)
            }
            fn switch_tag(&self, id: ElementId) -> Option<String> {
                self.inner.switch_tag(id)
            }
            fn circuits(&self) -> Vec<Circuit> {
                self.inner.circuits()
            }
        }

        impl SlotWriter for Flaky {
            fn slot(&self, segment: ElementId, index: usize) -> Option<crate::model::SlotData> {
                self.inner.slot(segment, index)
            }
            fn write_slot(
                &mut self,
                segment: ElementId,
                index: usize,
                data: crate::model::SlotData,
            ) -> Result<(), WriteError> {
                if segment == ElementId(11) {
                    return Err(WriteError::StaleElement(segment));
                }
                self.inner.write_slot(segment, index, data)
            }
            fn segment_ids(&self) -> Vec<ElementId> {
                self.inner.segment_ids()
            }
        }

        impl Transactional for Flaky {
            fn transaction<T, E, F>(&mut self, label: &str, f: F) -> Result<T, E>
            where
                F: FnOnce(&mut Self) -> Result<T, E>,
            {
                let before = self.inner.clone();
                let result = f(self);
                if result.is_err() {
                    tracing::warn!("Transaction '{}' rolled back", label);
                    self.inner = before;
                }
                result
            }
        }

        let mut host = Flaky {
            inner: small_document(),
        };
        let engine = WiringEngine::default();

        let err = engine.fill_all(&mut host).unwrap_err();
        assert!(matches!(err, WireRouteError::Write(WriteError::StaleElement(_))));
        assert!(!host.inner.slot(ElementId(10), 1).unwrap().is_occupied());
    }

    #[test]
    fn test_store_roundtrip_through_directory() {
        let dir = TempDir::new().unwrap();
        let config = EngineConfig::default().with_store_dir(dir.path());

        let mut engine = WiringEngine::new(config.clone());
        engine.upsert_custom_route("L1", Route::from_ids([3, 1]));
        engine.stores_mut().computed.upsert("L2", Route::from_ids([7]));
        engine.save_stores().unwrap();

        let mut restored = WiringEngine::new(config);
        restored.load_stores().unwrap();
        assert_eq!(restored.stores().custom.get("L1"), Some(Route::from_ids([1, 3])));
        assert_eq!(restored.stores().computed.get("L2"), Some(Route::from_ids([7])));
    }

    #[test]
    fn test_store_without_directory_is_config_error() {
        let engine = WiringEngine::default();
        assert!(matches!(engine.save_stores(), Err(WireRouteError::Config(_))));
    }
}
