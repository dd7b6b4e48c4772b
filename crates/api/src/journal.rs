//! Persistence-failure journal.

use std::future::Future;

use hrm_core::types::DbId;
use hrm_db::repositories::ErrorJournalRepo;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Record a persistence failure, then hand the error back for mapping.
///
/// A failure to write the journal itself is logged and swallowed.
pub async fn record_failure(
    state: &AppState,
    employee_id: Option<DbId>,
    err: impl Into<AppError>,
) -> AppError {
    let err = err.into();
    tracing::error!(error = %err, ?employee_id, "Persistence failure");
    if let Err(journal_err) =
        ErrorJournalRepo::record(&state.pool, &err.to_string(), employee_id).await
    {
        tracing::warn!(error = %journal_err, "Failed to write error journal");
    }
    err
}

/// Await a persistence step, journaling its failure.
pub async fn journaled<T, E>(
    state: &AppState,
    employee_id: Option<DbId>,
    step: impl Future<Output = Result<T, E>>,
) -> AppResult<T>
where
    E: Into<AppError>,
{
    match step.await {
        Ok(value) => Ok(value),
        Err(e) => Err(record_failure(state, employee_id, e).await),
    }
}
