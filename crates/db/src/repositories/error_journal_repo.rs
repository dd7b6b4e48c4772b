//! Repository for the `errors` journal.

use hrm_core::types::DbId;
use sqlx::PgPool;

use crate::models::error_journal::ErrorEntry;

const COLUMNS: &str = "id, text, employee_id, created_at, updated_at";

pub struct ErrorJournalRepo;

impl ErrorJournalRepo {
    pub async fn record(
        pool: &PgPool,
        text: &str,
        employee_id: Option<DbId>,
    ) -> Result<ErrorEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO errors (text, employee_id) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ErrorEntry>(&query)
            .bind(text)
            .bind(employee_id)
            .fetch_one(pool)
            .await
    }

    /// Most recent entries first.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<ErrorEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM errors ORDER BY id DESC LIMIT $1");
        sqlx::query_as::<_, ErrorEntry>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
