//! Submission ledger for prize-wheel draws
//!
//! Records each finalized draw together with the visitor's registration
//! details. Backends share one trait-based interface:
//!
//! # Features
//!
//! - `sqlite-sync` (default) - Synchronous SQLite using rusqlite (for CLI)
//! - `sqlx-sqlite` - Async SQLite using SQLx (for server)
//! - `webhook` - Append rows to a spreadsheet through an HTTP webhook
//!
//! # Example (Sync)
//!
//! ```no_run
//! use prize_ledger::{Registrant, SqliteLedger, Submission, SubmissionFilter, SubmissionLedger};
//!
//! let db = SqliteLedger::open("prizes.db").unwrap();
//! db.init().unwrap();
//!
//! let registrant = Registrant {
//!     name: "Ana".into(),
//!     phone: "62981624758".into(),
//!     email: "ana@example.com".into(),
//!     has_degree: "Sim".into(),
//!     operating_area: "Produção".into(),
//!     operating_area_other: None,
//!     training_interest: "Graduação".into(),
//! };
//! db.append(&Submission::new(registrant, "E-book Digital Exclusive".into(), "123456".into()))
//!     .unwrap();
//!
//! let recent = db.list(&SubmissionFilter::default()).unwrap();
//! ```

pub mod repository;
pub mod shared;
pub mod types;

#[cfg(feature = "sqlite-sync")]
pub mod sqlite;

#[cfg(feature = "sqlx-sqlite")]
pub mod sqlx_impl;

#[cfg(feature = "webhook")]
pub mod webhook;

// Re-export types
pub use types::*;

// Re-export ledger traits
pub use repository::{
    AsyncLedgerQueries, AsyncSubmissionLedger, RepoError, RepoResult, SubmissionLedger,
};

// Re-export implementations
#[cfg(feature = "sqlite-sync")]
pub use sqlite::{SqliteLedger, DEFAULT_DB_PATH};

#[cfg(feature = "sqlx-sqlite")]
pub use sqlx_impl::sqlite::SqlxSqliteLedger;

#[cfg(feature = "webhook")]
pub use webhook::{sheet_row, WebhookLedger, SHEET_COLUMNS};
