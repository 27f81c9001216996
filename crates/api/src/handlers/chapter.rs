//! Handlers for chapters, nested under courses.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use gonasi_core::error::CoreError;
use gonasi_core::ordering::validate_reorder;
use gonasi_core::roles::ORG_ROLE_EDITOR;
use gonasi_core::types::DbId;
use gonasi_db::models::chapter::{Chapter, CreateChapter, UpdateChapter};
use gonasi_db::repositories::ChapterRepo;
use validator::Validate;

use super::course::find_course;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::require_org_role;
use crate::request::ReorderRequest;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/courses/{course_id}/chapters
pub async fn list_by_course(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(course_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Chapter>>>> {
    find_course(&state, course_id).await?;
    let chapters = ChapterRepo::list_by_course(&state.pool, course_id).await?;
    Ok(Json(DataResponse { data: chapters }))
}

/// POST /api/v1/courses/{course_id}/chapters
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(course_id): Path<DbId>,
    Json(input): Json<CreateChapter>,
) -> AppResult<(StatusCode, Json<DataResponse<Chapter>>)> {
    input.validate().map_err(CoreError::from)?;
    let course = find_course(&state, course_id).await?;
    require_org_role(&state.pool, course.organization_id, &user, ORG_ROLE_EDITOR).await?;

    let chapter = ChapterRepo::create(&state.pool, course_id, &input).await?;
    tracing::info!(chapter_id = chapter.id, course_id, "Chapter created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: chapter })))
}

/// PUT /api/v1/courses/{course_id}/chapters/reorder
///
/// The body must list every chapter of the course exactly once.
pub async fn reorder(
    State(state): State<AppState>,
    user: AuthUser,
    Path(course_id): Path<DbId>,
    Json(input): Json<ReorderRequest>,
) -> AppResult<Json<DataResponse<Vec<Chapter>>>> {
    let course = find_course(&state, course_id).await?;
    require_org_role(&state.pool, course.organization_id, &user, ORG_ROLE_EDITOR).await?;

    let existing = ChapterRepo::list_ids(&state.pool, course_id).await?;
    validate_reorder(&existing, &input.ordered_ids)?;
    ChapterRepo::reorder(&state.pool, course_id, &input.ordered_ids).await?;

    let chapters = ChapterRepo::list_by_course(&state.pool, course_id).await?;
    Ok(Json(DataResponse { data: chapters }))
}

/// PUT /api/v1/chapters/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateChapter>,
) -> AppResult<Json<DataResponse<Chapter>>> {
    input.validate().map_err(CoreError::from)?;
    authorize_chapter(&state, &user, id).await?;

    let chapter = ChapterRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Chapter",
            id,
        }))?;
    Ok(Json(DataResponse { data: chapter }))
}

/// DELETE /api/v1/chapters/{id}
///
/// Later chapters move up to close the gap.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    authorize_chapter(&state, &user, id).await?;

    if ChapterRepo::delete(&state.pool, id).await? {
        tracing::info!(chapter_id = id, user_id = user.user_id, "Chapter deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Chapter",
            id,
        }))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) async fn find_chapter(state: &AppState, id: DbId) -> AppResult<Chapter> {
    ChapterRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Chapter",
            id,
        }))
}

/// Load the chapter and require editor access to its course's organization.
pub(crate) async fn authorize_chapter(
    state: &AppState,
    user: &AuthUser,
    id: DbId,
) -> AppResult<Chapter> {
    let chapter = find_chapter(state, id).await?;
    let course = find_course(state, chapter.course_id).await?;
    require_org_role(&state.pool, course.organization_id, user, ORG_ROLE_EDITOR).await?;
    Ok(chapter)
}
