//! Handlers for the `/plugins` resource (read-only registry view).

use axum::extract::{Path, State};
use axum::Json;
use gonasi_core::plugins::PluginMetadata;
use serde::Serialize;
use serde_json::Value;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// A plugin type with the values a new block of that type starts from.
#[derive(Debug, Serialize)]
pub struct PluginDetail {
    #[serde(flatten)]
    pub metadata: PluginMetadata,
    pub supports_check: bool,
    pub default_content: Value,
    pub default_settings: Value,
}

/// GET /api/v1/plugins
pub async fn list(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Json<DataResponse<Vec<PluginMetadata>>> {
    let plugins = state.registry.list().into_iter().cloned().collect();
    Json(DataResponse { data: plugins })
}

/// GET /api/v1/plugins/{plugin_type}
pub async fn get_by_type(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(plugin_type): Path<String>,
) -> AppResult<Json<DataResponse<PluginDetail>>> {
    let definition = state.registry.get(&plugin_type)?;
    let detail = PluginDetail {
        metadata: definition.metadata.clone(),
        supports_check: definition.view.supports_check(),
        default_content: definition.builder.default_content(),
        default_settings: definition.builder.default_settings(),
    };
    Ok(Json(DataResponse { data: detail }))
}
