//! Handlers for the `/auth` resource (login, logout, password reset).

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use hrm_core::error::CoreError;
use hrm_core::tokens::fingerprint;
use hrm_db::repositories::{BlacklistRepo, EmployeeRepo, TokenKind, TokenRepo};
use hrm_events::MailTemplate;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{check_new_password, hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::handlers::redeem::{already_used, load_redeemable};
use crate::journal::record_failure;
use crate::middleware::auth::AuthEmployee;
use crate::notifications::schedule_token_mail;
use crate::query::TokenParam;
use crate::response::MessageResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
}

/// Body of `PATCH /auth/create-password` and `PATCH /employees/activate`.
#[derive(Debug, Deserialize)]
pub struct NewPasswordRequest {
    pub password: String,
    pub confirm_password: String,
}

fn email_not_found() -> AppError {
    AppError::Core(CoreError::Missing("Email not found".into()))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let employee = EmployeeRepo::find_by_email(&state.pool, input.email.trim())
        .await?
        .ok_or_else(email_not_found)?;

    if !employee.is_active() {
        return Err(CoreError::Validation("Your account is inactive".into()).into());
    }

    let password_valid = match employee.password_hash.as_deref() {
        Some(hash) => verify_password(&input.password, hash)
            .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?,
        None => false,
    };
    if !password_valid {
        return Err(CoreError::Validation("Wrong password".into()).into());
    }

    let access_token = generate_access_token(employee.id, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(employee_id = employee.id, "Employee logged in");
    Ok(Json(TokenResponse {
        access_token,
        token_type: "Bearer",
    }))
}

/// POST /api/v1/auth/logout
///
/// Revoke the presented token. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth: AuthEmployee) -> AppResult<StatusCode> {
    BlacklistRepo::add(&state.pool, &fingerprint(&auth.token)).await?;
    tracing::info!(employee_id = auth.employee.id, "Employee logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let employee = EmployeeRepo::find_by_email(&state.pool, input.email.trim())
        .await?
        .ok_or_else(email_not_found)?;

    let token = match TokenRepo::create(
        &state.pool,
        TokenKind::ResetPassword,
        employee.id,
        &employee.email,
    )
    .await
    {
        Ok(token) => token,
        Err(e) => return Err(record_failure(&state, Some(employee.id), e).await),
    };

    schedule_token_mail(
        &state.notifier,
        MailTemplate::ResetPassword,
        &employee.email,
        &employee.full_name(),
        &token.token,
    );

    Ok(Json(MessageResponse::new(
        "Check your email to reset your password",
    )))
}

/// PATCH /api/v1/auth/create-password?token=
pub async fn create_password(
    State(state): State<AppState>,
    Query(params): Query<TokenParam>,
    Json(input): Json<NewPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    check_new_password(
        &input.password,
        &input.confirm_password,
        state.config.password_min_length,
    )
    .map_err(CoreError::Validation)?;

    let (token, employee) =
        load_redeemable(&state, TokenKind::ResetPassword, &params.token).await?;

    let hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    match EmployeeRepo::reset_password(&state.pool, employee.id, token.id, &hash).await {
        Ok(true) => {}
        Ok(false) => return Err(already_used()),
        Err(e) => return Err(record_failure(&state, Some(employee.id), e).await),
    }

    tracing::info!(employee_id = employee.id, "Password reset");
    Ok(Json(MessageResponse::new("Reset password successfully")))
}
