//! beeline - authoring CLI for AlgoHive puzzle packages.
//!
//! `new` scaffolds a template package, `test` runs the integrity
//! validator and the deterministic harness, `compile` validates strictly
//! and builds the distributable `.alghive` archive.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "beeline",
    version,
    about = "Create, test and compile .alghive puzzle packages"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new puzzle from the template
    New {
        /// Name of the new puzzle
        name: String,
    },
    /// Validate a puzzle and run the deterministic test harness
    Test {
        /// Folder containing the puzzle to test
        folder: PathBuf,
        /// Number of harness trials to run
        #[arg(long, default_value_t = 1000)]
        test_count: usize,
    },
    /// Validate strictly, optionally run tests, then build the archive
    Compile {
        /// Folder containing the puzzle to compile
        folder: PathBuf,
        /// Run the test harness before packaging
        #[arg(long)]
        test: bool,
        /// Number of harness trials to run
        #[arg(long, default_value_t = 1000)]
        test_count: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::New { name } => commands::new::run(&name),
        Commands::Test { folder, test_count } => commands::test::run(&folder, test_count),
        Commands::Compile {
            folder,
            test,
            test_count,
        } => commands::compile::run(&folder, test, test_count),
    }
}
