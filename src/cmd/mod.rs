mod render;
mod schema;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dbtree")]
#[command(version)]
#[command(about = "Render database schemas as trees, flat listings, or ASCII diagrams", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a schema file
    Render {
        /// Schema file: .sql DDL, .json or .yaml model
        /// Supports .gz, .bz2, .xz, .zst compression
        file: PathBuf,

        /// Output format: text, json
        #[arg(short, long)]
        format: Option<String>,

        /// Output shape: tree, flat, graph
        #[arg(short, long)]
        shape: Option<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only render tables matching these glob patterns (comma-separated)
        #[arg(short, long)]
        tables: Option<String>,

        /// Exclude tables matching these glob patterns (comma-separated)
        #[arg(short, long)]
        exclude: Option<String>,

        /// Database name shown in the output (default: file name)
        #[arg(long)]
        database_name: Option<String>,

        /// YAML config file with render defaults
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print JSON Schemas for the schema model and the JSON outputs
    Schema {
        /// Schema name: database, tree, flat (default: all)
        name: Option<String>,

        /// Write one <name>.schema.json file per schema into this directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Render {
            file,
            format,
            shape,
            output,
            tables,
            exclude,
            database_name,
            config,
            verbose,
        } => render::run(render::RenderArgs {
            file,
            format,
            shape,
            output,
            tables,
            exclude,
            database_name,
            config,
            verbose,
        }),
        Commands::Schema { name, output } => schema::run(name, output),
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "dbtree", &mut io::stdout());
            Ok(())
        }
    }
}
