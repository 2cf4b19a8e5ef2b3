use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state handed to every handler via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub pool: mimo_db::DbPool,
    pub config: Arc<ServerConfig>,
}
