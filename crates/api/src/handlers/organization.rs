//! Handlers for the `/organizations` resource and its members.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use gonasi_core::error::CoreError;
use gonasi_core::roles::{
    validate_assignable_org_role, ORG_ROLE_ADMIN, ORG_ROLE_EDITOR, ORG_ROLE_OWNER,
};
use gonasi_core::types::DbId;
use gonasi_db::models::organization::{
    AddMember, CreateOrganization, MemberWithUser, Organization, OrganizationMember,
    OrganizationWithRole, UpdateMemberRole,
};
use gonasi_db::repositories::{MemberRepo, OrganizationRepo, UserRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::require_org_role;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/organizations
///
/// Organizations the caller belongs to, with their role in each.
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<OrganizationWithRole>>>> {
    let organizations = OrganizationRepo::list_for_user(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse {
        data: organizations,
    }))
}

/// POST /api/v1/organizations
///
/// The caller becomes the owner. A taken handle is a 409.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateOrganization>,
) -> AppResult<(StatusCode, Json<DataResponse<Organization>>)> {
    input.validate().map_err(CoreError::from)?;

    let organization = OrganizationRepo::create(&state.pool, &input, user.user_id).await?;
    tracing::info!(
        organization_id = organization.id,
        user_id = user.user_id,
        "Organization created"
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse { data: organization }),
    ))
}

/// GET /api/v1/organizations/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Organization>>> {
    let organization = find_organization(&state, id).await?;
    require_org_role(&state.pool, id, &user, ORG_ROLE_EDITOR).await?;
    Ok(Json(DataResponse { data: organization }))
}

/// GET /api/v1/organizations/{id}/members
pub async fn list_members(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<MemberWithUser>>>> {
    find_organization(&state, id).await?;
    require_org_role(&state.pool, id, &user, ORG_ROLE_EDITOR).await?;
    let members = MemberRepo::list(&state.pool, id).await?;
    Ok(Json(DataResponse { data: members }))
}

/// POST /api/v1/organizations/{id}/members
///
/// Owners and admins may add `admin` or `editor` members.
pub async fn add_member(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<AddMember>,
) -> AppResult<(StatusCode, Json<DataResponse<OrganizationMember>>)> {
    find_organization(&state, id).await?;
    require_org_role(&state.pool, id, &user, ORG_ROLE_ADMIN).await?;
    validate_assignable_org_role(&input.role)?;

    UserRepo::find_by_id(&state.pool, input.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: input.user_id,
        }))?;

    let member = MemberRepo::add(&state.pool, id, input.user_id, &input.role, user.user_id).await?;
    tracing::info!(
        organization_id = id,
        member_id = input.user_id,
        role = %input.role,
        invited_by = user.user_id,
        "Member added"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: member })))
}

/// PUT /api/v1/organizations/{id}/members/{user_id}
pub async fn update_member(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, member_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateMemberRole>,
) -> AppResult<Json<DataResponse<OrganizationMember>>> {
    find_organization(&state, id).await?;
    require_org_role(&state.pool, id, &user, ORG_ROLE_ADMIN).await?;
    validate_assignable_org_role(&input.role)?;
    ensure_not_owner(&state, id, member_id).await?;

    let member = MemberRepo::update_role(&state.pool, id, member_id, &input.role)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "OrganizationMember",
            id: member_id,
        }))?;
    tracing::info!(organization_id = id, member_id, role = %input.role, "Member role changed");
    Ok(Json(DataResponse { data: member }))
}

/// DELETE /api/v1/organizations/{id}/members/{user_id}
pub async fn remove_member(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, member_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    find_organization(&state, id).await?;
    require_org_role(&state.pool, id, &user, ORG_ROLE_ADMIN).await?;
    ensure_not_owner(&state, id, member_id).await?;

    if MemberRepo::remove(&state.pool, id, member_id).await? {
        tracing::info!(organization_id = id, member_id, "Member removed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "OrganizationMember",
            id: member_id,
        }))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_organization(state: &AppState, id: DbId) -> AppResult<Organization> {
    OrganizationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Organization",
            id,
        }))
}

/// The owner's membership is fixed for the organization's lifetime.
async fn ensure_not_owner(state: &AppState, organization_id: DbId, user_id: DbId) -> AppResult<()> {
    let role = MemberRepo::find_role(&state.pool, organization_id, user_id).await?;
    if role.as_deref() == Some(ORG_ROLE_OWNER) {
        return Err(AppError::Core(CoreError::Forbidden(
            "The organization owner's membership cannot be changed".into(),
        )));
    }
    Ok(())
}
