//! Shared types for the submission ledger.
//!
//! These types are backend-agnostic and used by all implementations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Visitor details collected by the registration form
///
/// Field names accept the original form keys as aliases so older clients
/// keep working.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registrant {
    pub name: String,
    pub phone: String,
    pub email: String,
    /// Whether the visitor already holds a degree, as answered on the form
    #[serde(alias = "formacao")]
    pub has_degree: String,
    #[serde(alias = "area_atuacao")]
    pub operating_area: String,
    /// Freeform text when the operating area is "other"
    #[serde(default, alias = "area_atuacao_outro")]
    pub operating_area_other: Option<String>,
    #[serde(alias = "interesse_formacao")]
    pub training_interest: String,
}

/// A finalized draw, ready to be logged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(flatten)]
    pub registrant: Registrant,
    /// Display label of the prize won
    pub prize: String,
    pub code: String,
    pub recorded_at: DateTime<Utc>,
}

impl Submission {
    /// Stamp a submission with the current time
    pub fn new(registrant: Registrant, prize: String, code: String) -> Self {
        Self {
            registrant,
            prize,
            code,
            recorded_at: Utc::now(),
        }
    }
}

/// A submission as stored, with its row id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: i64,
    #[serde(flatten)]
    pub submission: Submission,
}

/// Filter for listing submissions
#[derive(Debug, Clone, Default)]
pub struct SubmissionFilter {
    pub prize: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Submission count for one prize
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeCount {
    pub prize: String,
    pub count: i64,
}

/// Ledger statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStats {
    pub total: i64,
    pub by_prize: Vec<PrizeCount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registrant_accepts_form_aliases() {
        let json = r#"{
            "name": "Ana",
            "phone": "62981624758",
            "email": "ana@example.com",
            "formacao": "Sim",
            "area_atuacao": "Outro",
            "area_atuacao_outro": "Logística",
            "interesse_formacao": "Pós-graduação"
        }"#;
        let registrant: Registrant = serde_json::from_str(json).unwrap();
        assert_eq!(registrant.has_degree, "Sim");
        assert_eq!(registrant.operating_area_other.as_deref(), Some("Logística"));
        assert_eq!(registrant.training_interest, "Pós-graduação");
    }

    #[test]
    fn test_other_area_is_optional() {
        let json = r#"{
            "name": "Bruno",
            "phone": "62981624758",
            "email": "bruno@example.com",
            "has_degree": "Não",
            "operating_area": "Produção",
            "training_interest": "Graduação"
        }"#;
        let registrant: Registrant = serde_json::from_str(json).unwrap();
        assert_eq!(registrant.operating_area_other, None);
    }
}
