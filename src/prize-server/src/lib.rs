//! Spin-to-win API server
//!
//! Draws prizes server-side and logs registrations to the configured ledger.

pub mod config;
pub mod ledger;
pub mod routes;

pub use ledger::Ledger;
pub use routes::{app, ApiDoc, AppState};
