//! Ledger traits for submission persistence.
//!
//! These traits define the interface for all ledger backends.

use crate::types::*;

/// Error type for ledger operations
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Remote sheet error: {0}")]
    Remote(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result type for ledger operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Trait for submission ledgers (synchronous version for CLI)
pub trait SubmissionLedger {
    /// Initialize the storage schema
    fn init(&self) -> RepoResult<()>;

    /// Append a submission, returning its row id
    fn append(&self, submission: &Submission) -> RepoResult<i64>;

    /// List submissions, newest first
    fn list(&self, filter: &SubmissionFilter) -> RepoResult<Vec<SubmissionRecord>>;

    /// Get ledger statistics
    fn stats(&self) -> RepoResult<LedgerStats>;
}

/// Async trait for appending submissions (server)
#[allow(async_fn_in_trait)]
pub trait AsyncSubmissionLedger {
    /// Initialize the storage schema
    async fn init(&self) -> RepoResult<()>;

    /// Append a submission
    async fn append(&self, submission: &Submission) -> RepoResult<()>;
}

/// Async read access, for ledgers that can be queried back
#[allow(async_fn_in_trait)]
pub trait AsyncLedgerQueries {
    /// List submissions, newest first
    async fn list(&self, filter: &SubmissionFilter) -> RepoResult<Vec<SubmissionRecord>>;

    /// Get ledger statistics
    async fn stats(&self) -> RepoResult<LedgerStats>;
}
