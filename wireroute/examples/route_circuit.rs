//! Route every circuit of a document and print its conduit segments.

use std::path::Path;
use wireroute::prelude::*;

fn main() -> Result<(), WireRouteError> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/fixtures/small_building.json".to_string());
    let path = Path::new(&path);

    if !path.exists() {
        eprintln!("File not found: {}", path.display());
        eprintln!("Usage: cargo run --example route_circuit [path/to/document.json]");
        std::process::exit(1);
    }

    let document = Document::from_file(path)?;
    let mut engine = WiringEngine::new(EngineConfig::default());

    println!("Routes for: {}", document.metadata.project_name);
    println!();

    for name in engine.list_circuit_names(&document) {
        let route = engine.compute_route(&document, &name)?;
        let segments = route.segments(&document);
        let length: f64 = segments
            .iter()
            .filter_map(|id| document.length(*id))
            .sum();

        println!("{}:", name);
        if route.is_empty() {
            println!("  no route found");
            continue;
        }
        println!("  elements: {}", route.len());
        println!(
            "  segments: {} ({:.2} total length)",
            segments
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            length
        );
    }

    for group in engine.resolve_switch_legs(&document) {
        println!();
        println!("Switch group {} ({})", group.group.tag, group.topology);
        for leg in &group.legs {
            let hops = leg.path.as_ref().map(|p| p.len()).unwrap_or(0);
            println!("  {} -> {}: {} elements", leg.from, leg.to, hops);
        }
    }

    Ok(())
}
