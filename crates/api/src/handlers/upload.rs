//! Bulk employee import.
//!
//! The upload runs in fixed stages: structural precheck, row validation and
//! in-batch uniqueness, one store lookup per unique field, the accept or
//! reject decision, a single transaction for everything that is written,
//! and finally one activation mail per new employee.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use hrm_core::employee::NewEmployee;
use hrm_core::import::{
    flag_existing, precheck_upload, unique_candidates, validate_batch, BatchOutcome,
    ImportPossibleFields, RawRow, WrongCell, EMPLOYEE_CATALOG,
};
use hrm_db::repositories::EmployeeRepo;
use hrm_events::MailTemplate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult, GENERIC_FAILURE};
use crate::journal::journaled;
use crate::middleware::auth::AuthEmployee;
use crate::notifications::schedule_token_mail;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of `POST /employees/upload`.
#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub lines: Vec<RawRow>,
    /// Commit even when the batch carries warnings.
    #[serde(default)]
    pub force_upload: bool,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<String>,
    #[serde(rename = "wrongCells", skip_serializing_if = "Option::is_none")]
    pub wrong_cells: Option<Vec<WrongCell>>,
    pub detail: String,
    pub status_code: u16,
}

fn joined(messages: &[String]) -> Option<String> {
    (!messages.is_empty()).then(|| messages.join("\n"))
}

impl ImportResponse {
    fn rejected(outcome: BatchOutcome) -> Self {
        Self {
            errors: joined(&outcome.errors),
            warnings: joined(&outcome.warnings),
            wrong_cells: Some(outcome.wrong_cells),
            detail: GENERIC_FAILURE.to_string(),
            status_code: StatusCode::BAD_REQUEST.as_u16(),
        }
    }

    fn uploaded() -> Self {
        Self {
            errors: None,
            warnings: None,
            wrong_cells: None,
            detail: "File uploaded successfully".to_string(),
            status_code: StatusCode::CREATED.as_u16(),
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/employees/import-fields
pub async fn import_fields() -> Json<ImportPossibleFields> {
    Json(EMPLOYEE_CATALOG.import_options())
}

/// POST /api/v1/employees/upload
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthEmployee,
    Json(input): Json<ImportRequest>,
) -> AppResult<(StatusCode, Json<ImportResponse>)> {
    let catalog = &*EMPLOYEE_CATALOG;
    precheck_upload(catalog, &input.lines)?;

    let mut outcome = validate_batch(catalog, &input.lines);
    let candidates = unique_candidates(catalog, &input.lines);
    let existing = journaled(
        &state,
        None,
        EmployeeRepo::find_existing_values(&state.pool, &candidates),
    )
    .await?;
    flag_existing(catalog, &input.lines, &existing, &mut outcome);

    if !outcome.is_accepted(input.force_upload) {
        tracing::info!(
            rows = input.lines.len(),
            errors = outcome.errors.len(),
            warnings = outcome.warnings.len(),
            "Upload rejected"
        );
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(ImportResponse::rejected(outcome)),
        ));
    }

    let employees = outcome
        .rows
        .iter()
        .map(|row| row.to_new_employee())
        .collect::<Option<Vec<NewEmployee>>>()
        .ok_or_else(|| {
            AppError::InternalError("Accepted import row is missing a mandatory value".into())
        })?;

    let created = journaled(
        &state,
        None,
        EmployeeRepo::import_batch(&state.pool, &employees),
    )
    .await?;

    for entry in &created {
        schedule_token_mail(
            &state.notifier,
            MailTemplate::ConfirmAccount,
            &entry.employee.email,
            &entry.employee.full_name(),
            &entry.activation_token,
        );
    }

    tracing::info!(
        rows = created.len(),
        uploaded_by = auth.employee.id,
        forced = input.force_upload,
        "Upload committed"
    );
    Ok((StatusCode::CREATED, Json(ImportResponse::uploaded())))
}
