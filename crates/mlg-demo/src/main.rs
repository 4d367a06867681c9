//! Developer harness wiring the MLG engine end-to-end over `MemStore`.
//!
//! Not the host CLI described in spec §6 — this is a reduced surface for
//! exercising the coarsener, filter, and extractor pipelines by hand.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mlg_coarsen::Builder;
use mlg_dao::{LayerDao, NodeLinkDao};
use mlg_demo::{scenarios, DemoConfig, Result};
use mlg_filter::{TimeSeriesOperator, TimeVertexFilter};
use mlg_io::{CsvImportOptions, CsvImporter, JsonExporter};
use mlg_store::{Direction, ObjectKind, StoreAdapter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mlg-demo")]
#[command(author, version, about = "MLG engine developer harness", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "mlg-demo.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a coarsening plan against the bundled 5-node fixture
    Coarsen {
        /// Plan string, e.g. "Hs:[0.1,0.3] Xm:0.4"; falls back to the
        /// config file's `plan` key, then to the S1 scenario's default
        #[arg(short, long)]
        plan: Option<String>,
    },
    /// Run the time-vertex mean filter over the bundled 3-node fixture
    Filter {
        #[arg(short, long, default_value_t = 1)]
        radius: usize,
    },
    /// Extract the dynamic component graph from the bundled fixture and
    /// print it as JSON
    Extract,
    /// Import a nodes/edges CSV pair and print the node count
    Import {
        #[arg(long)]
        nodes: PathBuf,
        #[arg(long)]
        edges: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = DemoConfig::load_or_default(&cli.config).with_env_override();
    tracing::info!(log_level = %config.log_level, "mlg-demo starting");

    match cli.command {
        Commands::Coarsen { plan } => run_coarsen(plan.or(config.plan))?,
        Commands::Filter { radius } => run_filter(radius)?,
        Commands::Extract => run_extract()?,
        Commands::Import { nodes, edges } => run_import(&nodes, &edges)?,
    }
    Ok(())
}

fn run_coarsen(plan: Option<String>) -> Result<()> {
    let plan = plan.unwrap_or_else(|| "Hs:[0.99]".to_string());
    let mut fixture = scenarios::five_node_graph()?;

    let mut builder = Builder::new();
    builder.load(&plan)?;
    let top = builder.run(&mut fixture.store)?;

    let children = LayerDao::all_layers_bottom_up(&fixture.store).len();
    println!("plan {plan:?} produced {children} layer(s); top layer = {top}");
    let top_nodes = fixture.store.neighbors(top, ObjectKind::Owns, Direction::Outgoing);
    for node in top_nodes.iter() {
        let n = NodeLinkDao::get_node(&fixture.store, node);
        println!("  node {node}: weight = {}", n.weight);
    }
    Ok(())
}

fn run_filter(radius: usize) -> Result<()> {
    let fixture = scenarios::three_node_time_series([10.0, 20.0, 40.0])?;
    let mut store = fixture.store;

    let mut filter = TimeVertexFilter::new();
    filter.set_radius(radius);
    let mut operator = TimeSeriesOperator::new(filter);
    let updated = operator.run(&mut store)?;
    println!("filter updated {updated} observation(s)");

    for &node in &fixture.nodes {
        let olink = NodeLinkDao::find_olink(&store, fixture.layers[0], node);
        if olink.is_valid() {
            let weight = store
                .get_attr(olink, "weight")
                .and_then(|v| v.as_f64())
                .unwrap_or_default();
            println!("  base-layer node {node}: new weight = {weight:.4}");
        }
    }
    Ok(())
}

fn run_extract() -> Result<()> {
    let fixture = scenarios::component_extraction_graph()?;
    let extractor = mlg_extract::ComponentExtractor::new();
    let graph = extractor.run(&fixture.store)?;
    let export = JsonExporter::export(&fixture.store, graph)?;
    println!("{}", JsonExporter::to_json_string(&export)?);
    Ok(())
}

fn run_import(nodes: &PathBuf, edges: &PathBuf) -> Result<()> {
    let mut store = mlg_store::MemStore::new();
    let nodes_file = std::fs::File::open(nodes)?;
    let index = CsvImporter::import_nodes(&mut store, nodes_file, &CsvImportOptions::default())?;
    println!("imported {} node(s)", index.len());

    let edges_file = std::fs::File::open(edges)?;
    let created = CsvImporter::import_edges(&mut store, edges_file, &index)?;
    println!("imported {created} edge(s)");
    Ok(())
}
