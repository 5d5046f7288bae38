//! seatplan CLI — the main entry point.
//!
//! Commands:
//! - `init`     — Write the default config
//! - `import`   — Load guests for an event from a JSON file
//! - `guests`   — List an event's guests and their tables
//! - `allocate` — Seat an event's guests (or preview with `--dry-run`)

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "seatplan",
    about = "seatplan — banquet seating allocation for event guest lists",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration file
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// Import guests for an event from a JSON array
    Import {
        #[arg(short, long)]
        event: String,

        /// Path to a JSON file containing an array of guests
        file: PathBuf,
    },

    /// List an event's guests
    Guests {
        #[arg(short, long)]
        event: String,
    },

    /// Allocate banquet tables for an event
    Allocate {
        #[arg(short, long)]
        event: String,

        /// Minimum number of tables (defaults from config)
        #[arg(short = 'n', long, allow_negative_numbers = true)]
        tables: Option<i64>,

        /// Seats per table (defaults from config)
        #[arg(short, long, allow_negative_numbers = true)]
        seats: Option<i64>,

        /// Compute and print the plan without writing it
        #[arg(long)]
        dry_run: bool,

        /// Seed the shuffle for a reproducible plan
        #[arg(long)]
        seed: Option<u64>,

        /// Preview seating for guests in a JSON file instead of the configured store
        #[arg(long, requires = "dry_run")]
        guests: Option<PathBuf>,

        /// Print JSON: the summary, or `{ plan, summary }` with `--dry-run`
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }

    match cli.command {
        Commands::Init { force } => commands::init::run(force).await?,
        Commands::Import { event, file } => commands::import::run(&event, &file).await?,
        Commands::Guests { event } => commands::guests::run(&event).await?,
        Commands::Allocate {
            event,
            tables,
            seats,
            dry_run,
            seed,
            guests,
            json,
        } => {
            commands::allocate::run(commands::allocate::AllocateArgs {
                event,
                tables,
                seats,
                dry_run,
                seed,
                guests,
                json,
            })
            .await?
        }
    }

    Ok(())
}
