use sqlx::SqlitePool;

use crate::config::Config;

/// Shared application state, handed to every handler as an
/// `Extension<Arc<AppState>>` instead of any ambient per-request lookup.
pub struct AppState {
    pub pool: SqlitePool,
    pub http: reqwest::Client,
    pub config: Config,
}
