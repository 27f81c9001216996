//! Handlers for the `/courses` resource.
//!
//! Course images are stored as bucket object paths. Responses carry a
//! short-lived signed URL next to the path so clients never see storage
//! credentials.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, Utc};
use gonasi_core::error::CoreError;
use gonasi_core::roles::{ORG_ROLE_ADMIN, ORG_ROLE_EDITOR};
use gonasi_core::storage::{sign_object_url, validate_object_path};
use gonasi_core::types::DbId;
use gonasi_db::models::course::{Course, CreateCourse, UpdateCourse};
use gonasi_db::repositories::CourseRepo;
use serde::Serialize;
use validator::Validate;

use crate::config::StorageConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::require_org_role;
use crate::response::DataResponse;
use crate::state::AppState;

/// A course plus a signed URL for its image, if it has one.
#[derive(Debug, Serialize)]
pub struct CourseResponse {
    #[serde(flatten)]
    pub course: Course,
    pub signed_image_url: Option<String>,
}

/// GET /api/v1/organizations/{org_id}/courses
pub async fn list_by_organization(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(org_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<CourseResponse>>>> {
    let courses = CourseRepo::list_by_organization(&state.pool, org_id).await?;
    let data = courses
        .into_iter()
        .map(|c| with_signed_url(c, &state.config.storage))
        .collect::<AppResult<Vec<_>>>()?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/organizations/{org_id}/courses
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(org_id): Path<DbId>,
    Json(input): Json<CreateCourse>,
) -> AppResult<(StatusCode, Json<DataResponse<CourseResponse>>)> {
    input.validate().map_err(CoreError::from)?;
    if let Some(path) = &input.image_url {
        validate_object_path(path)?;
    }
    require_org_role(&state.pool, org_id, &user, ORG_ROLE_EDITOR).await?;

    let course = CourseRepo::create(&state.pool, org_id, &input, user.user_id).await?;
    tracing::info!(
        course_id = course.id,
        organization_id = org_id,
        user_id = user.user_id,
        "Course created"
    );

    let data = with_signed_url(course, &state.config.storage)?;
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// GET /api/v1/courses/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CourseResponse>>> {
    let course = find_course(&state, id).await?;
    let data = with_signed_url(course, &state.config.storage)?;
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/courses/{id}
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCourse>,
) -> AppResult<Json<DataResponse<CourseResponse>>> {
    input.validate().map_err(CoreError::from)?;
    if let Some(path) = &input.image_url {
        validate_object_path(path)?;
    }
    let existing = find_course(&state, id).await?;
    require_org_role(&state.pool, existing.organization_id, &user, ORG_ROLE_EDITOR).await?;

    let course = CourseRepo::update(&state.pool, id, &input, user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id,
        }))?;
    let data = with_signed_url(course, &state.config.storage)?;
    Ok(Json(DataResponse { data }))
}

/// DELETE /api/v1/courses/{id}
///
/// Cascades to chapters, lessons, blocks and learner progress.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let existing = find_course(&state, id).await?;
    require_org_role(&state.pool, existing.organization_id, &user, ORG_ROLE_ADMIN).await?;

    if CourseRepo::delete(&state.pool, id).await? {
        tracing::info!(course_id = id, user_id = user.user_id, "Course deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id,
        }))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) async fn find_course(state: &AppState, id: DbId) -> AppResult<Course> {
    CourseRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id,
        }))
}

fn with_signed_url(course: Course, storage: &StorageConfig) -> AppResult<CourseResponse> {
    let signed_image_url = match &course.image_url {
        Some(path) => Some(sign_object_url(
            &storage.base_url,
            &storage.bucket,
            path,
            Utc::now() + Duration::seconds(storage.signed_url_ttl_secs),
            &storage.signing_secret,
        )?),
        None => None,
    };
    Ok(CourseResponse {
        course,
        signed_image_url,
    })
}
