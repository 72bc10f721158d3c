//! # Claim Ledger CLI (`ledger`)
//!
//! The `ledger` binary fronts the same query engine as the HTTP server.
//!
//! ## Usage
//!
//! ```bash
//! ledger --config ./config/ledger.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `ledger serve` | Start the JSON HTTP API |
//! | `ledger list` | List every abstract in the corpus |
//! | `ledger get <id>` | Print a full document by identifier |
//! | `ledger search "<query>"` | Substring search over the corpus |
//! | `ledger filter --threshold 0.7` | Filter by confidence and domain |
//! | `ledger validate [id]` | Validate the corpus, or one document |

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use claim_ledger::{config, engine, server, validate};

/// Claim Ledger — a read-only JSON API over a corpus of fact-checking
/// abstracts with quantified confidence.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/ledger.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "ledger",
    about = "Claim Ledger — a fact-checking abstract corpus with quantified confidence",
    version,
    long_about = "Claim Ledger serves a read-only corpus of JSON abstracts (claims with \
    confidence scores, domains, and scenario/conclusion metadata) over a JSON HTTP API and \
    a matching CLI: listing, lookup by identifier, free-text search, confidence filtering, \
    and schema validation."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/ledger.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Start the JSON HTTP API.
    ///
    /// Binds to the address configured in `[server].bind` and serves the
    /// corpus endpoints with permissive CORS. When `[auth.keys]` is
    /// non-empty, all routes except `/health` require an API key.
    Serve,

    /// List every abstract in the corpus.
    ///
    /// Claim-set documents are expanded into one line per member claim.
    List,

    /// Print a full document by identifier.
    ///
    /// Matches `identifier`, `@id`, or a claim-set member's `claimId`.
    Get {
        /// Abstract identifier.
        id: String,
    },

    /// Search abstracts by text query.
    ///
    /// Case-insensitive substring match against title, claim text,
    /// domain, and identifier.
    Search {
        /// The search query string.
        query: String,
    },

    /// Filter abstracts by confidence threshold and domain.
    Filter {
        /// Inclusive minimum confidence, between 0.0 and 1.0.
        #[arg(long)]
        threshold: Option<f64>,

        /// Exact domain to match (case-sensitive).
        #[arg(long)]
        domain: Option<String>,
    },

    /// Validate the corpus against schema requirements.
    ///
    /// Without an id, validates every document and prints a summary;
    /// with an id, prints that document's full report.
    Validate {
        /// Abstract identifier to validate (omit for the whole corpus).
        id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init()
        .ok();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::List => {
            engine::run_list(&cfg)?;
        }
        Commands::Get { id } => {
            engine::run_get(&cfg, &id)?;
        }
        Commands::Search { query } => {
            engine::run_search(&cfg, &query)?;
        }
        Commands::Filter { threshold, domain } => {
            engine::run_filter(&cfg, threshold, domain.as_deref())?;
        }
        Commands::Validate { id } => {
            validate::run_validate(&cfg, id.as_deref())?;
        }
    }

    Ok(())
}
