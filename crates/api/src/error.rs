use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hrm_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// Message returned for persistence failures that match no known constraint.
pub const GENERIC_FAILURE: &str = "Something went wrong";

/// Named constraints and how a violation is reported to the client.
const CONSTRAINT_ERRORS: &[(&str, StatusCode, &str, &str)] = &[
    (
        "ck_employees_cnss_number",
        StatusCode::BAD_REQUEST,
        "VALIDATION_ERROR",
        "It should be {8 digits}-{2 digits} and it's mandatory if contract type Cdi or Cdd",
    ),
    ("uq_employees_email", StatusCode::CONFLICT, "CONFLICT", "Email already used"),
    ("uq_employees_number", StatusCode::CONFLICT, "CONFLICT", "Number should be unique"),
    (
        "uq_employee_roles_employee_role",
        StatusCode::CONFLICT,
        "CONFLICT",
        "This employee already has this role",
    ),
    ("employees_pkey", StatusCode::NOT_FOUND, "NOT_FOUND", "Employee not found"),
];

/// Look up the client-facing report for a violated constraint.
pub fn constraint_error(constraint: &str) -> Option<(StatusCode, &'static str, &'static str)> {
    CONSTRAINT_ERRORS
        .iter()
        .find(|(name, ..)| *name == constraint)
        .map(|&(_, status, code, message)| (status, code, message))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => {
                    tracing::debug!(entity, id, "Entity not found");
                    (
                        StatusCode::NOT_FOUND,
                        "NOT_FOUND",
                        format!("{entity} not found"),
                    )
                }
                CoreError::Missing(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Violations of a constraint listed in the lookup table use its entry.
/// - Everything else maps to 400 with a generic message.
pub fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            if let Some((status, code, message)) = db_err.constraint().and_then(constraint_error) {
                return (status, code, message.to_string());
            }
            tracing::error!(error = %db_err, "Database error");
            (StatusCode::BAD_REQUEST, "DATABASE_ERROR", GENERIC_FAILURE.to_string())
        }
        other => {
            tracing::error!(error = %other, "Database error");
            (StatusCode::BAD_REQUEST, "DATABASE_ERROR", GENERIC_FAILURE.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn known_constraints_have_reports() {
        assert_eq!(
            constraint_error("uq_employees_email"),
            Some((StatusCode::CONFLICT, "CONFLICT", "Email already used"))
        );
        let (status, _, message) = constraint_error("ck_employees_cnss_number").unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(message.starts_with("It should be {8 digits}-{2 digits}"));
        assert_eq!(
            constraint_error("employees_pkey").map(|(s, ..)| s),
            Some(StatusCode::NOT_FOUND)
        );
    }

    #[test]
    fn unknown_constraint_has_no_report() {
        assert_eq!(constraint_error("fk_whatever"), None);
    }

    #[test]
    fn non_database_errors_fall_back_to_generic_failure() {
        let (status, _, message) = classify_sqlx_error(&sqlx::Error::PoolTimedOut);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, GENERIC_FAILURE);

        let (status, ..) = classify_sqlx_error(&sqlx::Error::RowNotFound);
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn core_errors_map_to_statuses() {
        let cases = [
            (CoreError::Missing("Email not found".into()), StatusCode::NOT_FOUND),
            (
                CoreError::NotFound { entity: "Employee", id: 3 },
                StatusCode::NOT_FOUND,
            ),
            (CoreError::Validation("Wrong password".into()), StatusCode::BAD_REQUEST),
            (CoreError::Unauthorized("nope".into()), StatusCode::UNAUTHORIZED),
            (CoreError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(AppError::Core(err).into_response().status(), expected);
        }
    }

    #[test]
    fn question_mark_conversions_pick_the_right_variant() {
        let from_db: AppError = sqlx::Error::RowNotFound.into();
        assert_matches!(from_db, AppError::Database(sqlx::Error::RowNotFound));

        let from_core: AppError = CoreError::Validation("Invalid Token".into()).into();
        assert_matches!(
            from_core,
            AppError::Core(CoreError::Validation(msg)) if msg == "Invalid Token"
        );
    }
}
