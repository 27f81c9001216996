//! Route definitions for the `/plugins` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::plugins;
use crate::state::AppState;

/// Routes mounted at `/plugins`.
///
/// ```text
/// GET /                -> list
/// GET /{plugin_type}   -> get_by_type
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(plugins::list))
        .route("/{plugin_type}", get(plugins::get_by_type))
}
