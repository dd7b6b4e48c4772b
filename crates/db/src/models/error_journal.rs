//! Persistence-failure journal entry.

use hrm_core::types::{DbId, Timestamp};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct ErrorEntry {
    pub id: DbId,
    pub text: String,
    pub employee_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
