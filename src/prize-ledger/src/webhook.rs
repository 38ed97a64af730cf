//! Spreadsheet ledger over an HTTP webhook.
//!
//! Each submission becomes one JSON object keyed by the sheet's header row,
//! POSTed to a webhook that appends it (e.g. an Apps Script bound to the
//! sheet). The ledger is append-only; reading back goes through the sheet.

use crate::repository::{AsyncSubmissionLedger, RepoError, RepoResult};
use crate::types::Submission;
use std::time::Duration;

/// Sheet header row, in column order
pub const SHEET_COLUMNS: &[&str] = &[
    "Data",
    "Nome",
    "Telefone",
    "Email",
    "PossuiFormacao",
    "AreaAtuacao",
    "AreaAtuacaoOutro",
    "InteresseFormacao",
    "Premio",
    "Codigo",
];

/// Build the sheet row for a submission
pub fn sheet_row(submission: &Submission) -> serde_json::Value {
    let r = &submission.registrant;
    serde_json::json!({
        "Data": submission.recorded_at.format("%d/%m/%Y %H:%M:%S").to_string(),
        "Nome": r.name,
        "Telefone": r.phone,
        "Email": r.email,
        "PossuiFormacao": r.has_degree,
        "AreaAtuacao": r.operating_area,
        "AreaAtuacaoOutro": r.operating_area_other.as_deref().unwrap_or(""),
        "InteresseFormacao": r.training_interest,
        "Premio": submission.prize,
        "Codigo": submission.code,
    })
}

/// Append-only ledger backed by a spreadsheet webhook
#[derive(Clone)]
pub struct WebhookLedger {
    url: String,
    agent: ureq::Agent,
}

impl WebhookLedger {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_timeout(url, Duration::from_secs(10))
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl AsyncSubmissionLedger for WebhookLedger {
    async fn init(&self) -> RepoResult<()> {
        if self.url.starts_with("http://") || self.url.starts_with("https://") {
            Ok(())
        } else {
            Err(RepoError::Remote(format!(
                "Webhook URL must be http(s): {}",
                self.url
            )))
        }
    }

    async fn append(&self, submission: &Submission) -> RepoResult<()> {
        let row = sheet_row(submission);
        let agent = self.agent.clone();
        let url = self.url.clone();

        // ureq is blocking; keep it off the async workers
        let response = tokio::task::spawn_blocking(move || {
            agent
                .post(&url)
                .set("Content-Type", "application/json")
                .send_json(row)
        })
        .await
        .map_err(|e| RepoError::Remote(e.to_string()))?;

        match response {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(code, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                Err(RepoError::Remote(format!("{} - {}", code, body)))
            }
            Err(e) => Err(RepoError::Remote(e.to_string())),
        }
    }
}
