use std::sync::Arc;

use hrm_events::NotificationSink;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: the pool and everything else sit behind `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub pool: hrm_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Where account and password mails go. SMTP in production, a log-only
    /// or recording sink elsewhere.
    pub notifier: Arc<dyn NotificationSink>,
}
