//! Handlers for lessons, nested under chapters.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use gonasi_core::error::CoreError;
use gonasi_core::ordering::validate_reorder;
use gonasi_core::roles::ORG_ROLE_EDITOR;
use gonasi_core::types::DbId;
use gonasi_db::models::lesson::{CreateLesson, Lesson, UpdateLesson};
use gonasi_db::repositories::LessonRepo;
use validator::Validate;

use super::chapter::{authorize_chapter, find_chapter};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::require_org_role;
use crate::request::ReorderRequest;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/chapters/{chapter_id}/lessons
pub async fn list_by_chapter(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(chapter_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Lesson>>>> {
    find_chapter(&state, chapter_id).await?;
    let lessons = LessonRepo::list_by_chapter(&state.pool, chapter_id).await?;
    Ok(Json(DataResponse { data: lessons }))
}

/// POST /api/v1/chapters/{chapter_id}/lessons
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(chapter_id): Path<DbId>,
    Json(input): Json<CreateLesson>,
) -> AppResult<(StatusCode, Json<DataResponse<Lesson>>)> {
    input.validate().map_err(CoreError::from)?;
    authorize_chapter(&state, &user, chapter_id).await?;

    let lesson = LessonRepo::create(&state.pool, chapter_id, &input).await?;
    tracing::info!(lesson_id = lesson.id, chapter_id, "Lesson created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: lesson })))
}

/// PUT /api/v1/chapters/{chapter_id}/lessons/reorder
pub async fn reorder(
    State(state): State<AppState>,
    user: AuthUser,
    Path(chapter_id): Path<DbId>,
    Json(input): Json<ReorderRequest>,
) -> AppResult<Json<DataResponse<Vec<Lesson>>>> {
    authorize_chapter(&state, &user, chapter_id).await?;

    let existing = LessonRepo::list_ids(&state.pool, chapter_id).await?;
    validate_reorder(&existing, &input.ordered_ids)?;
    LessonRepo::reorder(&state.pool, chapter_id, &input.ordered_ids).await?;

    let lessons = LessonRepo::list_by_chapter(&state.pool, chapter_id).await?;
    Ok(Json(DataResponse { data: lessons }))
}

/// GET /api/v1/lessons/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Lesson>>> {
    let lesson = find_lesson(&state, id).await?;
    Ok(Json(DataResponse { data: lesson }))
}

/// PUT /api/v1/lessons/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateLesson>,
) -> AppResult<Json<DataResponse<Lesson>>> {
    input.validate().map_err(CoreError::from)?;
    authorize_lesson(&state, &user, id).await?;

    let lesson = LessonRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Lesson",
            id,
        }))?;
    Ok(Json(DataResponse { data: lesson }))
}

/// DELETE /api/v1/lessons/{id}
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    authorize_lesson(&state, &user, id).await?;

    if LessonRepo::delete(&state.pool, id).await? {
        tracing::info!(lesson_id = id, user_id = user.user_id, "Lesson deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Lesson",
            id,
        }))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) async fn find_lesson(state: &AppState, id: DbId) -> AppResult<Lesson> {
    LessonRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Lesson",
            id,
        }))
}

/// Require editor access to the organization owning lesson `id`.
pub(crate) async fn authorize_lesson(state: &AppState, user: &AuthUser, id: DbId) -> AppResult<()> {
    let organization_id = LessonRepo::find_organization_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Lesson",
            id,
        }))?;
    require_org_role(&state.pool, organization_id, user, ORG_ROLE_EDITOR).await?;
    Ok(())
}
