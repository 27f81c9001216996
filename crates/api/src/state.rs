use std::sync::Arc;

use gonasi_core::plugins::PluginRegistry;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind `Arc` or is already a handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: gonasi_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Plugin types available for blocks. Built once at startup.
    pub registry: Arc<PluginRegistry>,
}
