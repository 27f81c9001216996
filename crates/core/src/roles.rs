//! Platform and organization role names.
//!
//! Organization roles are ranked `owner > admin > editor`. These must match
//! the check constraint on `organization_members.role`.

use crate::error::CoreError;

pub const ROLE_USER: &str = "user";
pub const ROLE_PLATFORM_ADMIN: &str = "admin";

pub const ORG_ROLE_OWNER: &str = "owner";
pub const ORG_ROLE_ADMIN: &str = "admin";
pub const ORG_ROLE_EDITOR: &str = "editor";

/// All valid organization roles, highest rank first.
pub const VALID_ORG_ROLES: &[&str] = &[ORG_ROLE_OWNER, ORG_ROLE_ADMIN, ORG_ROLE_EDITOR];

/// Rank of an organization role. Unknown roles rank below `editor`.
pub fn org_role_rank(role: &str) -> u8 {
    match role {
        ORG_ROLE_OWNER => 3,
        ORG_ROLE_ADMIN => 2,
        ORG_ROLE_EDITOR => 1,
        _ => 0,
    }
}

/// Whether `role` is at least as privileged as `required`.
pub fn org_role_satisfies(role: &str, required: &str) -> bool {
    org_role_rank(role) >= org_role_rank(required) && org_role_rank(role) > 0
}

/// Validate a role supplied when adding or updating a member.
///
/// `owner` cannot be granted this way; ownership is fixed at creation.
pub fn validate_assignable_org_role(role: &str) -> Result<(), CoreError> {
    if role == ORG_ROLE_OWNER {
        return Err(CoreError::Validation(
            "The owner role cannot be assigned to a member".into(),
        ));
    }
    if !VALID_ORG_ROLES.contains(&role) {
        return Err(CoreError::Validation(format!(
            "Invalid role '{role}'. Must be one of: {}",
            VALID_ORG_ROLES.join(", ")
        )));
    }
    Ok(())
}
