//! Route definitions for the `/employees` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::{employee, upload};
use crate::state::AppState;

/// Routes mounted at `/employees`.
///
/// ```text
/// GET   /                -> list (requires auth)
/// POST  /                -> create
/// GET   /import-fields   -> import_fields
/// POST  /upload          -> upload (requires auth)
/// PATCH /activate        -> activate
/// PATCH /confirm-email   -> confirm_email
/// GET   /{id}            -> get_by_id (requires auth)
/// PUT   /{id}            -> update (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(employee::list).post(employee::create))
        .route("/import-fields", get(upload::import_fields))
        .route("/upload", post(upload::upload))
        .route("/activate", patch(employee::activate))
        .route("/confirm-email", patch(employee::confirm_email))
        .route("/{id}", get(employee::get_by_id).put(employee::update))
}
