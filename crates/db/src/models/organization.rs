//! Organization and membership models.

use gonasi_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `organizations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Organization {
    pub id: DbId,
    pub name: String,
    pub handle: String,
    pub description: Option<String>,
    pub owned_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An organization together with the caller's role in it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrganizationWithRole {
    pub id: DbId,
    pub name: String,
    pub handle: String,
    pub description: Option<String>,
    pub owned_by: DbId,
    pub role: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOrganization {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Lowercase letters, digits and hyphens.
    #[validate(length(min = 3, max = 50), custom(function = "valid_handle"))]
    pub handle: String,
    pub description: Option<String>,
}

fn valid_handle(handle: &str) -> Result<(), validator::ValidationError> {
    if handle
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_handle"))
    }
}

/// A row from the `organization_members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OrganizationMember {
    pub id: DbId,
    pub organization_id: DbId,
    pub user_id: DbId,
    pub role: String,
    pub invited_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Member row joined with the user's public fields, for listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MemberWithUser {
    pub user_id: DbId,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub role: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddMember {
    pub user_id: DbId,
    pub role: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMemberRole {
    pub role: String,
}
