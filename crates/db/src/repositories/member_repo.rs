//! Repository for the `organization_members` table.

use gonasi_core::types::DbId;
use sqlx::PgPool;

use crate::models::organization::{MemberWithUser, OrganizationMember};

const COLUMNS: &str = "id, organization_id, user_id, role, invited_by, created_at, updated_at";

pub struct MemberRepo;

impl MemberRepo {
    pub async fn add(
        pool: &PgPool,
        organization_id: DbId,
        user_id: DbId,
        role: &str,
        invited_by: DbId,
    ) -> Result<OrganizationMember, sqlx::Error> {
        let query = format!(
            "INSERT INTO organization_members (organization_id, user_id, role, invited_by)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OrganizationMember>(&query)
            .bind(organization_id)
            .bind(user_id)
            .bind(role)
            .bind(invited_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find(
        pool: &PgPool,
        organization_id: DbId,
        user_id: DbId,
    ) -> Result<Option<OrganizationMember>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM organization_members
             WHERE organization_id = $1 AND user_id = $2"
        );
        sqlx::query_as::<_, OrganizationMember>(&query)
            .bind(organization_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// The caller's role in an organization, if they are a member.
    pub async fn find_role(
        pool: &PgPool,
        organization_id: DbId,
        user_id: DbId,
    ) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            "SELECT role FROM organization_members WHERE organization_id = $1 AND user_id = $2",
        )
        .bind(organization_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Members with their public user fields, owners first.
    pub async fn list(
        pool: &PgPool,
        organization_id: DbId,
    ) -> Result<Vec<MemberWithUser>, sqlx::Error> {
        sqlx::query_as::<_, MemberWithUser>(
            "SELECT m.user_id, u.username, u.email, u.full_name, m.role, m.created_at
             FROM organization_members m
             JOIN users u ON u.id = m.user_id
             WHERE m.organization_id = $1
             ORDER BY CASE m.role WHEN 'owner' THEN 0 WHEN 'admin' THEN 1 ELSE 2 END,
                      u.username",
        )
        .bind(organization_id)
        .fetch_all(pool)
        .await
    }

    pub async fn update_role(
        pool: &PgPool,
        organization_id: DbId,
        user_id: DbId,
        role: &str,
    ) -> Result<Option<OrganizationMember>, sqlx::Error> {
        let query = format!(
            "UPDATE organization_members SET role = $3
             WHERE organization_id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OrganizationMember>(&query)
            .bind(organization_id)
            .bind(user_id)
            .bind(role)
            .fetch_optional(pool)
            .await
    }

    /// Returns `true` if a membership was removed.
    pub async fn remove(
        pool: &PgPool,
        organization_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM organization_members WHERE organization_id = $1 AND user_id = $2",
        )
        .bind(organization_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
