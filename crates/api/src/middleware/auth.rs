//! Bearer-token authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use hrm_core::error::CoreError;
use hrm_core::tokens::fingerprint;
use hrm_db::models::employee::Employee;
use hrm_db::repositories::{BlacklistRepo, EmployeeRepo};

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// The employee behind a valid, non-revoked Bearer token.
///
/// ```ignore
/// async fn me(auth: AuthEmployee) -> AppResult<Json<()>> {
///     tracing::info!(employee_id = auth.employee.id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthEmployee {
    pub employee: Employee,
    /// The raw token as presented, kept so logout can revoke it.
    pub token: String,
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.into()))
}

impl FromRequestParts<AppState> for AuthEmployee {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| unauthorized("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| unauthorized("Invalid Authorization format. Expected: Bearer <token>"))?;

        let claims = validate_token(token, &state.config.jwt)
            .map_err(|_| unauthorized("Invalid or expired token"))?;

        if BlacklistRepo::contains(&state.pool, &fingerprint(token)).await? {
            return Err(unauthorized("Token has been revoked"));
        }

        let employee = EmployeeRepo::find_by_id(&state.pool, claims.sub)
            .await?
            .ok_or_else(|| unauthorized("Could not validate credentials"))?;

        Ok(AuthEmployee {
            employee,
            token: token.to_string(),
        })
    }
}
