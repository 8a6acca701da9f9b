//! # spawnforge CLI
//!
//! Command-line host for the spawnforge assembly pipeline.

mod catalog;
mod commands;
mod config;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "spawnforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the scene file
    #[arg(long, default_value = "spawnforge.yml", env = "SPAWNFORGE_CONFIG")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a sample scene file
    Init {
        /// Target directory (defaults to current directory)
        path: Option<PathBuf>,
    },

    /// Click a spawn button and run the host loop until idle
    Spawn {
        /// Index of the spawn button
        #[arg(long, default_value_t = 0)]
        button: usize,

        /// Number of clicks
        #[arg(long, default_value_t = 1)]
        count: usize,

        /// Print assembly reports as JSON
        #[arg(long)]
        json: bool,

        /// Give up after this many ticks
        #[arg(long, default_value_t = 10_000)]
        max_ticks: usize,

        /// Milliseconds between ticks
        #[arg(long, default_value_t = 0)]
        tick_ms: u64,
    },

    /// Read console commands from stdin
    Console,

    /// Print the capabilities of the built-in behaviors
    Inspect {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::WARN.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Init { path } => commands::init_project(path.as_deref()),
        Commands::Spawn {
            button,
            count,
            json,
            max_ticks,
            tick_ms,
        } => {
            let opts = commands::SpawnOptions {
                button,
                count,
                json,
                max_ticks,
                tick_ms,
            };
            commands::spawn_actors(&cli.config, opts).await
        }
        Commands::Console => commands::run_console(&cli.config),
        Commands::Inspect { json } => commands::inspect_catalog(json),
    }
}
