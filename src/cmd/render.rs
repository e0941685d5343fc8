//! Render command implementation.

use anyhow::{bail, Context, Result};
use dbtree::config::RenderConfig;
use dbtree::graph::{find_cycles, SchemaGraph};
use dbtree::render::{render, Format, Shape};
use dbtree::schema::{load_database, TableFilter};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

pub struct RenderArgs {
    pub file: PathBuf,
    pub format: Option<String>,
    pub shape: Option<String>,
    pub output: Option<PathBuf>,
    pub tables: Option<String>,
    pub exclude: Option<String>,
    pub database_name: Option<String>,
    pub config: Option<PathBuf>,
    pub verbose: bool,
}

/// Run the render command
pub fn run(args: RenderArgs) -> Result<()> {
    setup_logging(args.verbose);

    let flags = RenderConfig {
        format: args.format.as_deref().map(str::parse::<Format>).transpose()?,
        shape: args.shape.as_deref().map(str::parse::<Shape>).transpose()?,
        tables: args.tables,
        exclude: args.exclude,
        database_name: args.database_name,
    };
    let settings = match args.config {
        Some(ref path) => flags.or(RenderConfig::load(path)?),
        None => flags,
    };
    let format = settings.format.unwrap_or_default();
    let shape = settings.shape.unwrap_or_default();

    if format == Format::Json && shape == Shape::Graph {
        bail!("graph shape is only supported with text format");
    }
    if !args.file.exists() {
        bail!("input file does not exist: {}", args.file.display());
    }

    let mut db = load_database(&args.file, settings.database_name.as_deref())?;
    let filter = TableFilter::new(settings.tables.as_deref(), settings.exclude.as_deref())
        .context("invalid table pattern")?;
    filter.apply(&mut db);

    let graph = SchemaGraph::build(Some(&db))?;
    debug!(%format, %shape, "rendering {}", args.file.display());
    let content = render(Some(&graph), format, shape)?;

    if let Some(ref out_path) = args.output {
        let mut file = File::create(out_path)
            .with_context(|| format!("failed to create {}", out_path.display()))?;
        file.write_all(content.as_bytes())?;
        eprintln!("Output written to: {}", out_path.display());
    } else {
        print!("{}", content);
        if !content.ends_with('\n') {
            println!();
        }
    }

    if format == Format::Text {
        print_summary(&graph);
    }

    Ok(())
}

fn print_summary(graph: &SchemaGraph) {
    let cycles = find_cycles(graph);
    eprintln!(
        "\n{}: {} tables, {} relationships",
        graph.database_name,
        graph.len(),
        graph.edges.len()
    );
    if !cycles.is_empty() {
        eprintln!("Cycles detected ({}):", cycles.len());
        for (i, cycle) in cycles.iter().enumerate() {
            eprintln!("  {}. {}", i + 1, cycle.display());
        }
    }
}

/// Install the tracing subscriber; `RUST_LOG` overrides the default level
fn setup_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
