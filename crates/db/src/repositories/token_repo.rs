//! Repository for the single-use token tables.

use hrm_core::enums::{Choice, TokenStatus};
use hrm_core::types::DbId;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::token::AccountToken;

const COLUMNS: &str = "id, employee_id, email, token, status, created_at, updated_at";

/// Which token table a call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Account activation and email confirmation (`accounts_activation`).
    Activation,
    /// Password reset (`reset_passwords`).
    ResetPassword,
}

impl TokenKind {
    fn table(self) -> &'static str {
        match self {
            Self::Activation => "accounts_activation",
            Self::ResetPassword => "reset_passwords",
        }
    }
}

/// Insert a fresh pending token on an open connection or transaction.
pub(crate) async fn insert_token(
    conn: &mut PgConnection,
    kind: TokenKind,
    employee_id: DbId,
    email: &str,
) -> Result<AccountToken, sqlx::Error> {
    let query = format!(
        "INSERT INTO {} (employee_id, email, token)
         VALUES ($1, $2, $3)
         RETURNING {COLUMNS}",
        kind.table()
    );
    sqlx::query_as::<_, AccountToken>(&query)
        .bind(employee_id)
        .bind(email)
        .bind(Uuid::new_v4().to_string())
        .fetch_one(&mut *conn)
        .await
}

/// Flip a pending token to used. `false` when it was already used.
pub(crate) async fn consume_token(
    conn: &mut PgConnection,
    kind: TokenKind,
    token_id: DbId,
) -> Result<bool, sqlx::Error> {
    let query = format!(
        "UPDATE {} SET status = $2 WHERE id = $1 AND status = $3",
        kind.table()
    );
    let result = sqlx::query(&query)
        .bind(token_id)
        .bind(TokenStatus::Used.as_str())
        .bind(TokenStatus::Pending.as_str())
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Token lookups and issuance outside of a larger transaction.
pub struct TokenRepo;

impl TokenRepo {
    /// Issue a new pending token for an employee.
    pub async fn create(
        pool: &PgPool,
        kind: TokenKind,
        employee_id: DbId,
        email: &str,
    ) -> Result<AccountToken, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        insert_token(&mut conn, kind, employee_id, email).await
    }

    pub async fn find_by_token(
        pool: &PgPool,
        kind: TokenKind,
        token: &str,
    ) -> Result<Option<AccountToken>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {} WHERE token = $1", kind.table());
        sqlx::query_as::<_, AccountToken>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// Tokens issued to an employee, newest first.
    pub async fn list_for_employee(
        pool: &PgPool,
        kind: TokenKind,
        employee_id: DbId,
    ) -> Result<Vec<AccountToken>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {} WHERE employee_id = $1 ORDER BY id DESC",
            kind.table()
        );
        sqlx::query_as::<_, AccountToken>(&query)
            .bind(employee_id)
            .fetch_all(pool)
            .await
    }

    /// Mark a token used. Returns `false` if it was not pending.
    pub async fn mark_used(
        pool: &PgPool,
        kind: TokenKind,
        token_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        consume_token(&mut conn, kind, token_id).await
    }
}
