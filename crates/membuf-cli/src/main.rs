//! Membuf CLI - workload runner for the buffered allocator.
//!
//! Drives a `BufferedAllocator` over a tracked heap with either a synthetic
//! iterative workload or a recorded allocation trace, then reports how many
//! requests the cache absorbed.

mod commands;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Buffered allocator workload runner.
///
/// Runs allocation workloads through a size-bucketed reuse cache and prints
/// cache and underlying-allocator statistics.
#[derive(Parser)]
#[command(name = "membuf")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "table")]
    format: OutputFormat,

    /// Suppress progress and info messages
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
}

/// Output format options.
#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable table format (default for TTY)
    #[default]
    Table,
    /// Machine-readable JSON format
    Json,
}

/// Cache settings shared by all commands.
#[derive(clap::Args)]
struct CacheArgs {
    /// Cache threshold, e.g. 4096, 64K, 256MiB (default 1 GiB)
    #[arg(long)]
    threshold: Option<String>,

    /// JSON file with a buffered allocator configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Capacity limit of the underlying heap, e.g. 512M
    #[arg(long)]
    capacity: Option<String>,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Run a synthetic iterative workload
    Simulate {
        /// Comma-separated block sizes allocated every iteration
        #[arg(long, default_value = "4K,64K,1M")]
        sizes: String,

        /// Iterations per thread
        #[arg(long, short = 'n', default_value_t = 1000)]
        iterations: usize,

        /// Worker threads sharing the allocator
        #[arg(long, short = 't', default_value_t = 1)]
        threads: usize,

        #[command(flatten)]
        cache: CacheArgs,
    },

    /// Replay a JSON allocation trace
    Replay {
        /// Path to the trace file
        trace: PathBuf,

        #[command(flatten)]
        cache: CacheArgs,
    },
}

fn main() {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else if !cli.quiet {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .init();
    }

    let result = match cli.command {
        Commands::Simulate {
            sizes,
            iterations,
            threads,
            cache,
        } => commands::simulate::run(&sizes, iterations, threads, &cache, cli.format, cli.quiet),
        Commands::Replay { trace, cache } => {
            commands::replay::run(&trace, &cache, cli.format, cli.quiet)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
