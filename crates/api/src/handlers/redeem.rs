//! Lookup and checks shared by every single-use token flow.

use chrono::Utc;
use hrm_core::error::CoreError;
use hrm_core::tokens::{verify_issued_token, Redeemer};
use hrm_db::models::employee::Employee;
use hrm_db::models::token::AccountToken;
use hrm_db::repositories::{EmployeeRepo, TokenKind, TokenRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Load a token and the employee it was issued to, and check it can still
/// be redeemed.
///
/// The owner is resolved by the token's email, so a token issued before an
/// email change no longer matches.
pub async fn load_redeemable(
    state: &AppState,
    kind: TokenKind,
    code: &str,
) -> AppResult<(AccountToken, Employee)> {
    let token = TokenRepo::find_by_token(&state.pool, kind, code)
        .await?
        .ok_or_else(|| CoreError::Missing("Token not found".into()))?;

    let employee = EmployeeRepo::find_by_email(&state.pool, &token.email)
        .await?
        .ok_or_else(|| CoreError::Validation("Invalid Token".into()))?;

    let redeemer = Redeemer {
        employee_id: employee.id,
        email: &employee.email,
    };
    verify_issued_token(
        &token.as_issued(),
        redeemer,
        Utc::now(),
        state.config.token_max_age_days,
    )?;

    Ok((token, employee))
}

/// The token was pending at check time but another request consumed it.
pub fn already_used() -> AppError {
    AppError::Core(CoreError::Validation("Token already used".into()))
}
