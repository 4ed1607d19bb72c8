//! # ragd CLI
//!
//! The `ragd` binary runs the answer service and its maintenance jobs.
//!
//! ## Usage
//!
//! ```bash
//! ragd --config ./config/ragd.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ragd serve` | Start the HTTP answer service |
//! | `ragd seed` | Populate the vector store with the reference corpus |
//! | `ragd ask "<question>"` | Answer a single question and print it |

use anyhow::bail;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use ragd::config;
use ragd::server::{self, AppState};

/// ragd — a minimal retrieval-augmented answer service.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file with `[embedding]`, `[store]`, `[generation]`, `[server]`, and
/// `[seeding]` sections; every setting has a default.
#[derive(Parser)]
#[command(
    name = "ragd",
    about = "A minimal retrieval-augmented answer service",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/ragd.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP answer service.
    ///
    /// Binds to `[server].bind` and serves `POST /query`, `POST /seed`,
    /// and `GET /health` until terminated.
    Serve,

    /// Populate the vector store with the reference corpus.
    ///
    /// Embeds each corpus document (pausing between calls per
    /// `[seeding].pause_ms`) and upserts the batch. Idempotent — entries
    /// are keyed by document id.
    Seed,

    /// Answer a single question and print the result.
    Ask {
        /// The question to answer. Must be at least three characters.
        question: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Seed => {
            let state = AppState::from_config(&cfg)?;
            let report = state.seeder.seed().await;
            if report.is_error() {
                println!(
                    "seeding failed: {}",
                    report.detail.as_deref().unwrap_or("unknown error")
                );
            } else {
                println!("seeded {} documents", report.count.unwrap_or(0));
            }
        }
        Commands::Ask { question } => {
            if question.chars().count() < 3 {
                bail!("question must be at least 3 characters");
            }

            let state = AppState::from_config(&cfg)?;
            let response = state.pipeline.answer(&question).await;

            println!("{}", response.answer);
            println!();
            for (i, doc) in response.source_documents.iter().enumerate() {
                println!("  [{}] {}", i + 1, doc);
            }
            println!(
                "  time: {:.2}s{}",
                response.processing_time,
                if response.degraded { " (degraded)" } else { "" }
            );
        }
    }

    Ok(())
}
