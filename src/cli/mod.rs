//! Command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod commands;

use commands::embed::EmbedArgs;
use commands::search::SearchArgs;

#[derive(Parser)]
#[command(
    name = "fooddb",
    version,
    about = "USDA food database with OpenAI-powered semantic vector search"
)]
pub struct Cli {
    /// Load configuration from this file instead of .fooddb/config.yaml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the SQLite database path
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Emit machine-readable JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create or verify the embedding schema for the configured dimension
    Init,
    /// Generate embeddings for all records that are missing one
    Embed(EmbedArgs),
    /// Search foods by natural-language query
    Search(SearchArgs),
    /// Show record and embedding counts
    Stats,
}

/// Print a top-level error and exit non-zero.
pub fn handle_error(err: anyhow::Error, json: bool) -> ! {
    if json {
        let payload = serde_json::json!({ "error": format!("{err:#}") });
        eprintln!("{payload}");
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
