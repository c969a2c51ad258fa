mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

const CLI_LONG_ABOUT: &str =
    "Derives the fixed probability constants used to calibrate the NIST SP 800-22 \
    statistical randomness tests and prints them at full numeric precision.\n\n\
    One line per derived quantity, `label = value`, on stdout; progress goes to \
    stderr via RUST_LOG-style filtering.\n\n\
    The longest-run derivation for M = 10000 is exact and can take a very long \
    time; that is expected, and there is no way to abort it early short of \
    killing the process.";

#[derive(Parser)]
#[command(name = "stscal")]
#[command(about = "Calibration-constant derivation for the NIST SP 800-22 randomness tests")]
#[command(long_about = CLI_LONG_ABOUT)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Longest-run-of-ones probability masses (exact arithmetic, parallel)
    LongestRun {
        /// Worker pool size; 7 lets the expensive classes of the largest
        /// configuration run fully in parallel
        #[arg(long, default_value_t = 7)]
        workers: usize,
        /// Emit JSON instead of `label = value` lines
        #[arg(long)]
        json: bool,
    },
    /// Binary-matrix-rank probabilities (closed form)
    MatrixRank {
        /// Matrix row count M
        #[arg(long, default_value_t = 32)]
        rows: u32,
        /// Matrix column count Q
        #[arg(long, default_value_t = 32)]
        cols: u32,
        /// Emit JSON instead of `label = value` lines
        #[arg(long)]
        json: bool,
    },
    /// Random-excursions state-visit probabilities (closed form)
    RandomExcursions {
        /// Emit JSON instead of `label = value` lines
        #[arg(long)]
        json: bool,
    },
}

fn main() -> miette::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::LongestRun { workers, json } => commands::longest_run::run(workers, json),
        Commands::MatrixRank { rows, cols, json } => commands::matrix_rank::run(rows, cols, json),
        Commands::RandomExcursions { json } => commands::excursions::run(json),
    }
}
