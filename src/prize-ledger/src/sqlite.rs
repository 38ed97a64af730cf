//! SQLite implementation using rusqlite (synchronous).
//!
//! This implementation is used by the operator CLI.

use crate::repository::*;
use crate::shared;
use crate::types::*;
use rusqlite::{params, Connection};
use std::path::Path;

/// Default ledger location
pub const DEFAULT_DB_PATH: &str = "share/prizes.db";

/// SQLite-backed submission ledger
pub struct SqliteLedger {
    conn: Connection,
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<(SubmissionRecord, String)> {
    let recorded_at: String = row.get(10)?;
    let record = SubmissionRecord {
        id: row.get(0)?,
        submission: Submission {
            registrant: Registrant {
                name: row.get(1)?,
                phone: row.get(2)?,
                email: row.get(3)?,
                has_degree: row.get(4)?,
                operating_area: row.get(5)?,
                operating_area_other: row.get(6)?,
                training_interest: row.get(7)?,
            },
            prize: row.get(8)?,
            code: row.get(9)?,
            recorded_at: Default::default(),
        },
    };
    Ok((record, recorded_at))
}

impl SqliteLedger {
    /// Open or create a ledger file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path.as_ref())?;
        Ok(Self { conn })
    }

    /// Open an in-memory ledger (for testing)
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }
}

impl SubmissionLedger for SqliteLedger {
    fn init(&self) -> RepoResult<()> {
        self.conn
            .execute_batch(&format!(
                "{};\n{};",
                shared::CREATE_SUBMISSIONS_TABLE,
                shared::CREATE_PRIZE_INDEX
            ))
            .map_err(|e| RepoError::Database(e.to_string()))
    }

    fn append(&self, submission: &Submission) -> RepoResult<i64> {
        let r = &submission.registrant;
        self.conn
            .execute(
                shared::INSERT_SUBMISSION,
                params![
                    r.name,
                    r.phone,
                    r.email,
                    r.has_degree,
                    r.operating_area,
                    r.operating_area_other,
                    r.training_interest,
                    submission.prize,
                    submission.code,
                    shared::format_timestamp(&submission.recorded_at),
                ],
            )
            .map_err(|e| RepoError::Database(e.to_string()))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn list(&self, filter: &SubmissionFilter) -> RepoResult<Vec<SubmissionRecord>> {
        let (limit, offset) = shared::limit_offset(filter);
        let mut stmt = self
            .conn
            .prepare(shared::SELECT_SUBMISSIONS)
            .map_err(|e| RepoError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![filter.prize, limit, offset], row_to_record)
            .map_err(|e| RepoError::Database(e.to_string()))?;

        rows.map(|row| -> RepoResult<SubmissionRecord> {
            let (mut record, recorded_at) = row.map_err(|e| RepoError::Database(e.to_string()))?;
            record.submission.recorded_at = shared::parse_timestamp(&recorded_at)?;
            Ok(record)
        })
        .collect()
    }

    fn stats(&self) -> RepoResult<LedgerStats> {
        let total: i64 = self
            .conn
            .query_row(shared::COUNT_SUBMISSIONS, [], |row| row.get(0))
            .map_err(|e| RepoError::Database(e.to_string()))?;

        let mut stmt = self
            .conn
            .prepare(shared::COUNT_BY_PRIZE)
            .map_err(|e| RepoError::Database(e.to_string()))?;
        let by_prize = stmt
            .query_map([], |row| {
                Ok(PrizeCount {
                    prize: row.get(0)?,
                    count: row.get(1)?,
                })
            })
            .map_err(|e| RepoError::Database(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RepoError::Database(e.to_string()))?;

        Ok(LedgerStats { total, by_prize })
    }
}
