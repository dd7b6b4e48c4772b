//! Route definitions for the `/auth` resource.

use axum::routing::{patch, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST  /login            -> login
/// POST  /logout           -> logout (requires auth)
/// POST  /reset-password   -> reset_password
/// PATCH /create-password  -> create_password
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/reset-password", post(auth::reset_password))
        .route("/create-password", patch(auth::create_password))
}
