//! Classmap CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "classmap")]
#[command(about = "Class dependency graphs from C++ documentation exports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to classmap.toml in the input directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze export files and write the graph views
    Analyze {
        /// Export directory or single export file
        input: PathBuf,

        /// Directory the views are written to
        #[arg(short, long, default_value = "classmap-out")]
        output: PathBuf,

        /// Pretty-print the JSON views
        #[arg(long)]
        pretty: bool,

        /// Leave utility classes out of the global and namespace views
        #[arg(long)]
        hide_utility: bool,

        /// Skip method body scanning
        #[arg(long)]
        no_usages: bool,

        /// Worker threads for usage detection
        #[arg(short, long)]
        threads: Option<usize>,
    },
    /// Show version
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose when set
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("classmap={}", log_level)));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Analyze {
            input,
            output,
            pretty,
            hide_utility,
            no_usages,
            threads,
        } => {
            tracing::info!("Classmap v{}", env!("CARGO_PKG_VERSION"));
            commands::analyze(commands::AnalyzeArgs {
                input,
                output,
                config: cli.config,
                pretty,
                hide_utility,
                no_usages,
                threads,
            })
        }
        Commands::Version => {
            println!("Classmap v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
