pub mod auth;
pub mod employees;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// All versioned routes, nested under `/api/v1` by the router builder.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/employees", employees::router())
}
