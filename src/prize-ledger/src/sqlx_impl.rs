//! SQLx implementation for async ledger operations.

use crate::repository::{AsyncLedgerQueries, AsyncSubmissionLedger, RepoError, RepoResult};
use crate::shared;
use crate::types::*;

// =============================================================================
// SQLite implementation
// =============================================================================

pub mod sqlite {
    use super::*;
    use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
    use sqlx::Row;

    fn is_memory_url(url: &str) -> bool {
        url.contains(":memory:") || url.contains("mode=memory")
    }

    /// SQLite-backed async submission ledger
    pub struct SqlxSqliteLedger {
        pool: SqlitePool,
    }

    impl SqlxSqliteLedger {
        /// Connect to a SQLite database
        ///
        /// In-memory URLs get a single connection, since each connection
        /// would otherwise open its own empty database.
        pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
            let max_connections = if is_memory_url(url) { 1 } else { 5 };
            let pool = SqlitePoolOptions::new()
                .max_connections(max_connections)
                .connect(url)
                .await?;
            Ok(Self { pool })
        }

        /// Private in-memory database (single connection, for tests)
        pub async fn connect_in_memory() -> Result<Self, sqlx::Error> {
            Self::connect("sqlite::memory:").await
        }

        fn row_to_record(row: SqliteRow) -> RepoResult<SubmissionRecord> {
            let db = |e: sqlx::Error| RepoError::Database(e.to_string());
            let recorded_at: String = row.try_get("recorded_at").map_err(db)?;
            Ok(SubmissionRecord {
                id: row.try_get("id").map_err(db)?,
                submission: Submission {
                    registrant: Registrant {
                        name: row.try_get("name").map_err(db)?,
                        phone: row.try_get("phone").map_err(db)?,
                        email: row.try_get("email").map_err(db)?,
                        has_degree: row.try_get("has_degree").map_err(db)?,
                        operating_area: row.try_get("operating_area").map_err(db)?,
                        operating_area_other: row.try_get("operating_area_other").map_err(db)?,
                        training_interest: row.try_get("training_interest").map_err(db)?,
                    },
                    prize: row.try_get("prize").map_err(db)?,
                    code: row.try_get("code").map_err(db)?,
                    recorded_at: shared::parse_timestamp(&recorded_at)?,
                },
            })
        }

        /// Append a submission, returning its row id
        pub async fn insert(&self, submission: &Submission) -> RepoResult<i64> {
            let r = &submission.registrant;
            let result = sqlx::query(shared::INSERT_SUBMISSION)
                .bind(&r.name)
                .bind(&r.phone)
                .bind(&r.email)
                .bind(&r.has_degree)
                .bind(&r.operating_area)
                .bind(&r.operating_area_other)
                .bind(&r.training_interest)
                .bind(&submission.prize)
                .bind(&submission.code)
                .bind(shared::format_timestamp(&submission.recorded_at))
                .execute(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;
            Ok(result.last_insert_rowid())
        }
    }

    impl AsyncSubmissionLedger for SqlxSqliteLedger {
        async fn init(&self) -> RepoResult<()> {
            for statement in [shared::CREATE_SUBMISSIONS_TABLE, shared::CREATE_PRIZE_INDEX] {
                sqlx::query(statement)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| RepoError::Database(e.to_string()))?;
            }
            Ok(())
        }

        async fn append(&self, submission: &Submission) -> RepoResult<()> {
            self.insert(submission).await.map(|_| ())
        }
    }

    impl AsyncLedgerQueries for SqlxSqliteLedger {
        async fn list(&self, filter: &SubmissionFilter) -> RepoResult<Vec<SubmissionRecord>> {
            let (limit, offset) = shared::limit_offset(filter);
            let rows = sqlx::query(shared::SELECT_SUBMISSIONS)
                .bind(&filter.prize)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

            rows.into_iter().map(Self::row_to_record).collect()
        }

        async fn stats(&self) -> RepoResult<LedgerStats> {
            let (total,): (i64,) = sqlx::query_as(shared::COUNT_SUBMISSIONS)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

            let rows: Vec<(String, i64)> = sqlx::query_as(shared::COUNT_BY_PRIZE)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| RepoError::Database(e.to_string()))?;

            Ok(LedgerStats {
                total,
                by_prize: rows
                    .into_iter()
                    .map(|(prize, count)| PrizeCount { prize, count })
                    .collect(),
            })
        }
    }

}
