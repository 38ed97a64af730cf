//! Shared SQL and conversion helpers for ledger implementations.
//!
//! Used by both the synchronous (rusqlite) and asynchronous (sqlx) backends.
//! All statements are static; optional filters are expressed in SQL.

use crate::repository::{RepoError, RepoResult};
use crate::types::SubmissionFilter;
use chrono::{DateTime, Utc};

pub const CREATE_SUBMISSIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS submissions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    phone TEXT NOT NULL,
    email TEXT NOT NULL,
    has_degree TEXT NOT NULL,
    operating_area TEXT NOT NULL,
    operating_area_other TEXT,
    training_interest TEXT NOT NULL,
    prize TEXT NOT NULL,
    code TEXT NOT NULL,
    recorded_at TEXT NOT NULL
)"#;

pub const CREATE_PRIZE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_submissions_prize ON submissions(prize)";

pub const INSERT_SUBMISSION: &str = "INSERT INTO submissions
    (name, phone, email, has_degree, operating_area, operating_area_other,
     training_interest, prize, code, recorded_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";

/// Column order matches the positional indices used in row mapping
pub const SELECT_SUBMISSIONS: &str = "SELECT id, name, phone, email, has_degree,
    operating_area, operating_area_other, training_interest, prize, code, recorded_at
    FROM submissions
    WHERE (?1 IS NULL OR prize = ?1)
    ORDER BY id DESC
    LIMIT ?2 OFFSET ?3";

pub const COUNT_SUBMISSIONS: &str = "SELECT COUNT(*) FROM submissions";

pub const COUNT_BY_PRIZE: &str =
    "SELECT prize, COUNT(*) FROM submissions GROUP BY prize ORDER BY COUNT(*) DESC, prize";

/// SQLite LIMIT/OFFSET values for a filter (-1 means no limit)
pub fn limit_offset(filter: &SubmissionFilter) -> (i64, i64) {
    let limit = filter.limit.map(i64::from).unwrap_or(-1);
    let offset = filter.offset.map(i64::from).unwrap_or(0);
    (limit, offset)
}

/// Timestamps are stored as RFC 3339 text
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

pub fn parse_timestamp(s: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| RepoError::Parse(format!("bad timestamp {s:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_offset_defaults() {
        assert_eq!(limit_offset(&SubmissionFilter::default()), (-1, 0));
        let filter = SubmissionFilter {
            limit: Some(10),
            offset: Some(20),
            ..Default::default()
        };
        assert_eq!(limit_offset(&filter), (10, 20));
    }

    #[test]
    fn test_timestamp_roundtrip() {
        let ts = parse_timestamp("2026-02-14T18:30:00+00:00").unwrap();
        assert_eq!(parse_timestamp(&format_timestamp(&ts)).unwrap(), ts);
        assert!(parse_timestamp("14/02/2026").is_err());
    }
}
