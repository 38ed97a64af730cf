//! Ledger backend selected at startup

use prize_ledger::{
    AsyncLedgerQueries, AsyncSubmissionLedger, LedgerStats, RepoResult, SqlxSqliteLedger,
    Submission, SubmissionFilter, SubmissionRecord, WebhookLedger,
};

/// Where finalized draws are logged
pub enum Ledger {
    Sqlite(SqlxSqliteLedger),
    Webhook(WebhookLedger),
}

impl Ledger {
    /// Connect to a SQLite database and create the schema
    pub async fn sqlite(database_url: &str) -> anyhow::Result<Self> {
        let ledger = Self::Sqlite(SqlxSqliteLedger::connect(database_url).await?);
        ledger.init().await?;
        Ok(ledger)
    }

    /// Log to a spreadsheet webhook
    pub async fn webhook(url: impl Into<String>) -> anyhow::Result<Self> {
        let ledger = Self::Webhook(WebhookLedger::new(url));
        ledger.init().await?;
        Ok(ledger)
    }

    /// Human-readable target for logs
    pub fn describe(&self) -> String {
        match self {
            Self::Sqlite(_) => "sqlite".to_string(),
            Self::Webhook(w) => format!("webhook {}", w.url()),
        }
    }

    /// Recorded submissions, for backends that can be read back
    pub async fn list(&self, filter: &SubmissionFilter) -> Option<RepoResult<Vec<SubmissionRecord>>> {
        match self {
            Self::Sqlite(db) => Some(db.list(filter).await),
            Self::Webhook(_) => None,
        }
    }

    /// Statistics, for backends that can be read back
    pub async fn stats(&self) -> Option<RepoResult<LedgerStats>> {
        match self {
            Self::Sqlite(db) => Some(db.stats().await),
            Self::Webhook(_) => None,
        }
    }
}

impl AsyncSubmissionLedger for Ledger {
    async fn init(&self) -> RepoResult<()> {
        match self {
            Self::Sqlite(db) => db.init().await,
            Self::Webhook(hook) => hook.init().await,
        }
    }

    async fn append(&self, submission: &Submission) -> RepoResult<()> {
        match self {
            Self::Sqlite(db) => db.append(submission).await,
            Self::Webhook(hook) => hook.append(submission).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sqlite_constructor_creates_schema() {
        let ledger = Ledger::sqlite("sqlite::memory:").await.unwrap();
        assert_eq!(ledger.describe(), "sqlite");
        let stats = ledger.stats().await.unwrap().unwrap();
        assert_eq!(stats.total, 0);
    }

    #[tokio::test]
    async fn test_webhook_constructor_validates_url() {
        assert!(Ledger::webhook("ftp://sheet").await.is_err());

        let ledger = Ledger::webhook("https://example.com/hook").await.unwrap();
        assert_eq!(ledger.describe(), "webhook https://example.com/hook");
        assert!(ledger.list(&SubmissionFilter::default()).await.is_none());
    }
}
