//! WireRoute CLI - circuit routes and conduit wiring from the command line.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process;
use tracing::Level;
use wireroute::{
    Category, Document, EffectiveRoute, ElementId, EngineConfig, FillReport, GraphSource, Route,
    SwitchGroupRoutes, WiringEngine,
};

#[derive(Parser)]
#[command(name = "wireroute")]
#[command(about = "Circuit route resolution and conduit wiring tool", long_about = None)]
#[command(version)]
struct Cli {
    /// Engine configuration file (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding the computed and custom route stores
    #[arg(long, global = true, value_name = "DIR")]
    store_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Log engine decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List routable circuits
    Circuits {
        #[arg(value_name = "DOC")]
        doc: PathBuf,
    },

    /// Resolve the route of a circuit
    Route {
        #[arg(value_name = "DOC")]
        doc: PathBuf,

        circuit: String,

        /// Only route devices of this category
        #[arg(long, value_enum)]
        category: Option<CategoryArg>,
    },

    /// Resolve the circuit route shared by two elements
    Between {
        #[arg(value_name = "DOC")]
        doc: PathBuf,

        a: i64,

        b: i64,
    },

    /// Resolve switch group legs
    Switches {
        #[arg(value_name = "DOC")]
        doc: PathBuf,
    },

    /// Show the route in effect for a circuit (custom, computed or fresh)
    Effective {
        #[arg(value_name = "DOC")]
        doc: PathBuf,

        circuit: String,
    },

    /// Manage user-overridden routes
    Custom {
        #[command(subcommand)]
        action: CustomAction,
    },

    /// Write every circuit onto the slots of its conduit segments
    Fill {
        #[arg(value_name = "DOC")]
        doc: PathBuf,

        /// Write the updated document here instead of in place
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write switch-leg return conductor counts
    Returns {
        #[arg(value_name = "DOC")]
        doc: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Blank every wiring slot
    Clear {
        #[arg(value_name = "DOC")]
        doc: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show document statistics
    Stats {
        #[arg(value_name = "DOC")]
        doc: PathBuf,
    },
}

#[derive(Subcommand)]
enum CustomAction {
    /// Store a custom route for a circuit
    Set {
        #[arg(value_name = "DOC")]
        doc: PathBuf,

        circuit: String,

        /// Element ids making up the route
        #[arg(required = true)]
        ids: Vec<i64>,
    },

    /// Drop the custom route of a circuit
    Remove {
        #[arg(value_name = "DOC")]
        doc: PathBuf,

        circuit: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for scripts
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum CategoryArg {
    Fixture,
    LightingDevice,
    ConduitSegment,
    Equipment,
    Other,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Fixture => Category::Fixture,
            CategoryArg::LightingDevice => Category::LightingDevice,
            CategoryArg::ConduitSegment => Category::ConduitSegment,
            CategoryArg::Equipment => Category::Equipment,
            CategoryArg::Other => Category::Other,
        }
    }
}

struct Session {
    engine: WiringEngine,
    format: OutputFormat,
    persistent: bool,
}

impl Session {
    fn open(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => EngineConfig::load_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => EngineConfig::default(),
        };
        if let Some(dir) = &cli.store_dir {
            config = config.with_store_dir(dir.clone());
        }

        let persistent = config.store_dir.is_some();
        let mut engine = WiringEngine::new(config);
        if persistent {
            engine.load_stores().context("Failed to load route stores")?;
        }

        Ok(Self {
            engine,
            format: cli.format,
            persistent,
        })
    }

    fn save(&self) -> Result<()> {
        if self.persistent {
            self.engine
                .save_stores()
                .context("Failed to save route stores")?;
        }
        Ok(())
    }
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let exit_code = match run(&cli) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };

    process::exit(exit_code);
}

fn run(cli: &Cli) -> Result<()> {
    let mut session = Session::open(cli)?;

    match &cli.command {
        Commands::Circuits { doc } => handle_circuits(&session, doc),
        Commands::Route {
            doc,
            circuit,
            category,
        } => handle_route(&mut session, doc, circuit, category.map(Category::from)),
        Commands::Between { doc, a, b } => handle_between(&session, doc, *a, *b),
        Commands::Switches { doc } => handle_switches(&session, doc),
        Commands::Effective { doc, circuit } => handle_effective(&session, doc, circuit),
        Commands::Custom { action } => handle_custom(&mut session, action),
        Commands::Fill { doc, output } => {
            handle_fill(&session, doc, output.as_deref(), FillKind::Circuits)
        }
        Commands::Returns { doc, output } => {
            handle_fill(&session, doc, output.as_deref(), FillKind::Returns)
        }
        Commands::Clear { doc, output } => handle_clear(&session, doc, output.as_deref()),
        Commands::Stats { doc } => handle_stats(&session, doc),
    }
}

fn load(doc: &Path) -> Result<Document> {
    Document::from_file(doc).with_context(|| format!("Failed to load document {}", doc.display()))
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn format_ids(route: &Route) -> String {
    route
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn handle_circuits(session: &Session, doc: &Path) -> Result<()> {
    let document = load(doc)?;
    let names = session.engine.list_circuit_names(&document);

    match session.format {
        OutputFormat::Human => {
            if names.is_empty() {
                println!("No routable circuits");
            }
            for name in &names {
                println!("{}", name);
            }
            Ok(())
        }
        OutputFormat::Json => print_json(&serde_json::json!({ "circuits": names })),
    }
}

fn output_route(
    session: &Session,
    circuit: &str,
    route: &Route,
    origin: Option<&str>,
) -> Result<()> {
    match session.format {
        OutputFormat::Human => {
            match origin {
                Some(origin) => println!("Circuit {} ({} route)", circuit, origin),
                None => println!("Circuit {}", circuit),
            }
            println!("{}", "─".repeat(60));
            if route.is_empty() {
                println!("  No route found");
            } else {
                println!("  Elements: {}", format_ids(route));
                println!("  Count:    {}", route.len());
            }
            Ok(())
        }
        OutputFormat::Json => print_json(&serde_json::json!({
            "circuit": circuit,
            "origin": origin,
            "elements": route,
        })),
    }
}

fn handle_route(
    session: &mut Session,
    doc: &Path,
    circuit: &str,
    category: Option<Category>,
) -> Result<()> {
    let document = load(doc)?;
    let route = match category {
        Some(category) => session
            .engine
            .resolve_route(&document, circuit, Some(category))?,
        None => {
            let route = session.engine.compute_route(&document, circuit)?;
            session.save()?;
            route
        }
    };
    output_route(session, circuit, &route, None)
}

fn handle_between(session: &Session, doc: &Path, a: i64, b: i64) -> Result<()> {
    let document = load(doc)?;
    let route = session
        .engine
        .resolve_route_between(&document, ElementId(a), ElementId(b))?;
    output_route(session, &format!("{} <-> {}", a, b), &route, None)
}

fn handle_effective(session: &Session, doc: &Path, circuit: &str) -> Result<()> {
    let document = load(doc)?;
    let EffectiveRoute { route, origin } = session.engine.get_effective_route(&document, circuit)?;
    output_route(session, circuit, &route, Some(&origin.to_string()))
}

fn handle_switches(session: &Session, doc: &Path) -> Result<()> {
    let document = load(doc)?;
    let groups = session.engine.resolve_switch_legs(&document);

    match session.format {
        OutputFormat::Human => {
            output_switches_human(&groups);
            Ok(())
        }
        OutputFormat::Json => print_json(&serde_json::json!({ "groups": groups })),
    }
}

fn output_switches_human(groups: &[SwitchGroupRoutes]) {
    if groups.is_empty() {
        println!("No switch groups");
    }
    for group in groups {
        println!("\nSwitch group {} ({})", group.group.tag, group.topology);
        println!("{}", "─".repeat(60));
        for leg in &group.legs {
            let path = match &leg.path {
                Some(path) => path
                    .iter()
                    .map(|id| id.to_string())
                    .collect::<Vec<_>>()
                    .join(" -> "),
                None => "no path".to_string(),
            };
            println!("  {} -> {}: {}", leg.from, leg.to, path);
        }
        if group.topology.is_supported() {
            println!("  Return conductors: {}", group.return_conductors());
        }
    }
}

fn handle_custom(session: &mut Session, action: &CustomAction) -> Result<()> {
    if !session.persistent {
        bail!("custom routes need --store-dir to be kept");
    }

    match action {
        CustomAction::Set { doc, circuit, ids } => {
            let document = load(doc)?;
            if document.circuit(circuit).is_none() {
                bail!("Circuit '{}' does not exist in {}", circuit, doc.display());
            }
            let route = Route::from_ids(ids.iter().copied());
            session.engine.upsert_custom_route(circuit.clone(), route.clone());
            session.save()?;
            output_route(session, circuit, &route, Some("custom"))
        }
        CustomAction::Remove { doc, circuit } => {
            load(doc)?;
            let removed = session.engine.remove_custom_route(circuit);
            session.save()?;
            match session.format {
                OutputFormat::Human => {
                    if removed.is_some() {
                        println!("Removed custom route for {}", circuit);
                    } else {
                        println!("No custom route for {}", circuit);
                    }
                    Ok(())
                }
                OutputFormat::Json => print_json(&serde_json::json!({
                    "circuit": circuit,
                    "removed": removed.is_some(),
                })),
            }
        }
    }
}

enum FillKind {
    Circuits,
    Returns,
}

fn handle_fill(session: &Session, doc: &Path, output: Option<&Path>, kind: FillKind) -> Result<()> {
    let mut document = load(doc)?;
    let report = match kind {
        FillKind::Circuits => session.engine.fill_all(&mut document)?,
        FillKind::Returns => session.engine.fill_returns(&mut document)?,
    };
    let target = output.unwrap_or(doc);
    document
        .save(target)
        .with_context(|| format!("Failed to write {}", target.display()))?;

    match session.format {
        OutputFormat::Human => {
            output_fill_human(&report);
            Ok(())
        }
        OutputFormat::Json => print_json(&serde_json::to_value(&report)?),
    }
}

fn output_fill_human(report: &FillReport) {
    println!("Circuits written: {}", report.circuits_written.len());
    println!("Slots written:    {}", report.slots_written);
    if !report.circuits_without_segments.is_empty() {
        println!("\n  Circuits without conduit segments:");
        for circuit in &report.circuits_without_segments {
            println!("    - {}", circuit);
        }
    }
    if !report.segments_without_slot.is_empty() {
        println!("\n  Segments without a free slot:");
        for skipped in &report.segments_without_slot {
            println!("    - {} (circuit {})", skipped.segment, skipped.circuit);
        }
    }
}

fn handle_clear(session: &Session, doc: &Path, output: Option<&Path>) -> Result<()> {
    let mut document = load(doc)?;
    let cleared = session.engine.clear_all_slots(&mut document)?;
    let target = output.unwrap_or(doc);
    document
        .save(target)
        .with_context(|| format!("Failed to write {}", target.display()))?;

    match session.format {
        OutputFormat::Human => {
            println!("Cleared {} slots", cleared);
            Ok(())
        }
        OutputFormat::Json => print_json(&serde_json::json!({ "cleared": cleared })),
    }
}

fn handle_stats(session: &Session, doc: &Path) -> Result<()> {
    let document = load(doc)?;
    let stats = document.stats();

    match session.format {
        OutputFormat::Human => {
            println!("Project: {}", document.metadata.project_name);
            println!("{}", "─".repeat(60));
            println!("  Elements:       {}", stats.element_count);
            println!("  Joins:          {}", stats.join_count);
            println!("  Segments:       {}", stats.segment_count);
            println!("  Total length:   {:.2}", stats.total_length);
            println!("  Circuits:       {}", stats.circuit_count);
            println!("  Occupied slots: {}", stats.occupied_slots);
            Ok(())
        }
        OutputFormat::Json => print_json(&serde_json::to_value(&stats)?),
    }
}
