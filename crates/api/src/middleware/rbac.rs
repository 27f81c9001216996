//! Organization role checks.
//!
//! Authoring endpoints resolve the organization that owns the resource, then
//! call [`require_org_role`] with the minimum role the operation needs.

use gonasi_core::error::CoreError;
use gonasi_core::roles::{org_role_satisfies, ORG_ROLE_OWNER};
use gonasi_core::types::DbId;
use gonasi_db::repositories::MemberRepo;
use gonasi_db::DbPool;

use super::auth::AuthUser;
use crate::error::{AppError, AppResult};

/// Ensure `user` holds at least `required` in `organization_id`.
///
/// Returns the caller's effective role. Platform admins pass every check and
/// act as owners.
pub async fn require_org_role(
    pool: &DbPool,
    organization_id: DbId,
    user: &AuthUser,
    required: &str,
) -> AppResult<String> {
    if user.is_platform_admin() {
        return Ok(ORG_ROLE_OWNER.to_string());
    }

    let role = MemberRepo::find_role(pool, organization_id, user.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Forbidden(
                "Not a member of this organization".into(),
            ))
        })?;

    if !org_role_satisfies(&role, required) {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Requires the {required} role or higher"
        ))));
    }
    Ok(role)
}
