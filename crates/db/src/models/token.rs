//! Single-use token rows (`accounts_activation`, `reset_passwords`).

use hrm_core::enums::{Choice, TokenStatus};
use hrm_core::tokens::IssuedToken;
use hrm_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// Both token tables share this shape.
#[derive(Debug, Clone, FromRow)]
pub struct AccountToken {
    pub id: DbId,
    pub employee_id: DbId,
    pub email: String,
    pub token: String,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AccountToken {
    /// View for [`hrm_core::tokens::verify_issued_token`]. An unknown stored
    /// status is treated as used.
    pub fn as_issued(&self) -> IssuedToken<'_> {
        IssuedToken {
            employee_id: self.employee_id,
            email: &self.email,
            status: TokenStatus::from_db(&self.status).unwrap_or(TokenStatus::Used),
            created_at: self.created_at,
        }
    }
}
