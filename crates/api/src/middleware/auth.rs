//! Bearer-token extractor for authors and learners.
//!
//! Every route outside `/auth` and `/health` takes an [`AuthUser`]. Learner
//! progress is keyed by `user_id`; authoring routes pass the user on to
//! [`require_org_role`](super::rbac::require_org_role).

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use gonasi_core::error::CoreError;
use gonasi_core::roles::ROLE_PLATFORM_ADMIN;
use gonasi_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// The caller behind a valid access token.
///
/// ```ignore
/// async fn open_block(user: AuthUser, Path(id): Path<DbId>) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, block_id = id, "opening block");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// `users.id`, taken from `claims.sub`.
    pub user_id: DbId,
    /// Platform role (`"user"` or `"admin"`). Organization roles live in
    /// `organization_members` and are checked per request.
    pub role: String,
}

impl AuthUser {
    /// Platform admins act as owners of every organization.
    pub fn is_platform_admin(&self) -> bool {
        self.role == ROLE_PLATFORM_ADMIN
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).map_err(AppError::Core)?;
        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
        })
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Result<&str, CoreError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| CoreError::Unauthorized("Missing Authorization header".into()))?;

    match value.strip_prefix("Bearer ").map(str::trim) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(CoreError::Unauthorized(
            "Invalid Authorization format. Expected: Bearer <token>".into(),
        )),
    }
}
