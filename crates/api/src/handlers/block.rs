//! Handlers for lesson blocks.
//!
//! Block content is plugin-specific JSON. Every write goes through the
//! plugin's builder, which migrates legacy shapes and validates the result.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use gonasi_core::error::CoreError;
use gonasi_core::ordering::validate_reorder;
use gonasi_core::types::DbId;
use gonasi_db::models::block::{Block, CreateBlock, UpdateBlock};
use gonasi_db::repositories::{BlockProgressRepo, BlockRepo};

use super::lesson::{authorize_lesson, find_lesson};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::request::ReorderRequest;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/lessons/{lesson_id}/blocks
pub async fn list_by_lesson(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(lesson_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Block>>>> {
    find_lesson(&state, lesson_id).await?;
    let blocks = BlockRepo::list_by_lesson(&state.pool, lesson_id).await?;
    Ok(Json(DataResponse { data: blocks }))
}

/// POST /api/v1/lessons/{lesson_id}/blocks
///
/// Missing content or settings start from the plugin's defaults.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(lesson_id): Path<DbId>,
    Json(input): Json<CreateBlock>,
) -> AppResult<(StatusCode, Json<DataResponse<Block>>)> {
    let builder = state.registry.builder(&input.plugin_type)?;
    let content = builder.prepare_content(
        input
            .content
            .unwrap_or_else(|| builder.default_content()),
    )?;
    let settings = builder.validate_settings(input.settings.as_ref())?;

    authorize_lesson(&state, &user, lesson_id).await?;

    let block = BlockRepo::create(
        &state.pool,
        lesson_id,
        &input.plugin_type,
        &content,
        &settings,
        user.user_id,
    )
    .await?;
    tracing::info!(
        block_id = block.id,
        lesson_id,
        plugin_type = %block.plugin_type,
        "Block created"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: block })))
}

/// PUT /api/v1/lessons/{lesson_id}/blocks/reorder
pub async fn reorder(
    State(state): State<AppState>,
    user: AuthUser,
    Path(lesson_id): Path<DbId>,
    Json(input): Json<ReorderRequest>,
) -> AppResult<Json<DataResponse<Vec<Block>>>> {
    authorize_lesson(&state, &user, lesson_id).await?;

    let existing = BlockRepo::list_ids(&state.pool, lesson_id).await?;
    validate_reorder(&existing, &input.ordered_ids)?;
    BlockRepo::reorder(&state.pool, lesson_id, &input.ordered_ids).await?;

    let blocks = BlockRepo::list_by_lesson(&state.pool, lesson_id).await?;
    Ok(Json(DataResponse { data: blocks }))
}

/// GET /api/v1/blocks/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Block>>> {
    let block = find_block(&state, id).await?;
    Ok(Json(DataResponse { data: block }))
}

/// PUT /api/v1/blocks/{id}
///
/// The plugin type is fixed; only content and settings can change. Changed
/// content clears every learner's progress on the block, since stored
/// answers refer to the old choices and pairs.
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateBlock>,
) -> AppResult<Json<DataResponse<Block>>> {
    let existing = find_block(&state, id).await?;
    authorize_lesson(&state, &user, existing.lesson_id).await?;

    let builder = state.registry.builder(&existing.plugin_type)?;
    let content = input
        .content
        .map(|raw| builder.prepare_content(raw))
        .transpose()?;
    let settings = input
        .settings
        .map(|raw| builder.validate_settings(Some(&raw)))
        .transpose()?;
    let content_changed = content.as_ref().is_some_and(|c| *c != existing.content);

    let block = BlockRepo::update(&state.pool, id, content.as_ref(), settings.as_ref())
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Block",
            id,
        }))?;

    if content_changed {
        let cleared = BlockProgressRepo::delete_for_block(&state.pool, id).await?;
        tracing::info!(block_id = id, cleared, "Block content changed, progress cleared");
    }
    Ok(Json(DataResponse { data: block }))
}

/// DELETE /api/v1/blocks/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let existing = find_block(&state, id).await?;
    authorize_lesson(&state, &user, existing.lesson_id).await?;

    if BlockRepo::delete(&state.pool, id).await? {
        tracing::info!(block_id = id, user_id = user.user_id, "Block deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Block",
            id,
        }))
    }
}

pub(crate) async fn find_block(state: &AppState, id: DbId) -> AppResult<Block> {
    BlockRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Block",
            id,
        }))
}
