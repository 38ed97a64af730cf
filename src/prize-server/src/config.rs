//! Command-line and catalog configuration

use clap::Parser;
use prize_wheel::{Catalog, CatalogError};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "prize-server")]
#[command(about = "Spin-to-win API server: prize draws and registration logging")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand)]
pub enum Command {
    /// Start the API server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3030")]
        port: u16,

        /// Bind address
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: String,

        /// Submission database path or URL
        #[arg(short, long, env = "DATABASE_URL", default_value = prize_ledger::DEFAULT_DB_PATH)]
        database: String,

        /// Log submissions to a spreadsheet webhook instead of the database
        #[arg(long, env = "SHEET_WEBHOOK_URL")]
        webhook_url: Option<String>,

        /// Catalog file overriding the built-in prizes
        #[arg(short, long, env = "PRIZE_CATALOG")]
        catalog: Option<PathBuf>,
    },

    /// Draw many times and compare observed against expected frequencies
    Simulate {
        /// Number of draws
        #[arg(short = 'n', long, default_value = "100000")]
        draws: u32,

        /// Seed for a reproducible run
        #[arg(short, long)]
        seed: Option<u64>,

        /// Catalog file overriding the built-in prizes
        #[arg(short, long, env = "PRIZE_CATALOG")]
        catalog: Option<PathBuf>,
    },

    /// Validate and print the catalog and wheel layout
    Catalog {
        /// Catalog file overriding the built-in prizes
        #[arg(short, long, env = "PRIZE_CATALOG")]
        catalog: Option<PathBuf>,
    },

    /// List recorded submissions
    Submissions {
        /// Submission database path
        #[arg(short, long, default_value = prize_ledger::DEFAULT_DB_PATH)]
        database: PathBuf,

        /// Only show submissions for this prize
        #[arg(long)]
        prize: Option<String>,

        /// Maximum rows to show
        #[arg(short, long, default_value = "50")]
        limit: u32,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

/// Load the catalog file if one is given, otherwise the built-in prizes
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog, CatalogError> {
    match path {
        Some(path) => Catalog::load(path),
        None => Ok(Catalog::default()),
    }
}

/// Turn a database argument into a SQLx URL
///
/// Only bare file paths get the `sqlite:` prefix.
pub fn database_url(database: &str) -> String {
    if database.contains("://") || database.starts_with("sqlite:") {
        database.to_string()
    } else {
        format!("sqlite:{}?mode=rwc", database)
    }
}
