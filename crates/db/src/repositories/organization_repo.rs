//! Repository for the `organizations` table.

use gonasi_core::roles::ORG_ROLE_OWNER;
use gonasi_core::types::DbId;
use sqlx::PgPool;

use crate::models::organization::{CreateOrganization, Organization, OrganizationWithRole};

const COLUMNS: &str = "id, name, handle, description, owned_by, created_at, updated_at";

pub struct OrganizationRepo;

impl OrganizationRepo {
    /// Create an organization and enrol `owner_id` as its owner, atomically.
    pub async fn create(
        pool: &PgPool,
        input: &CreateOrganization,
        owner_id: DbId,
    ) -> Result<Organization, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let insert_query = format!(
            "INSERT INTO organizations (name, handle, description, owned_by)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let organization = sqlx::query_as::<_, Organization>(&insert_query)
            .bind(&input.name)
            .bind(&input.handle)
            .bind(&input.description)
            .bind(owner_id)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO organization_members (organization_id, user_id, role)
             VALUES ($1, $2, $3)",
        )
        .bind(organization.id)
        .bind(owner_id)
        .bind(ORG_ROLE_OWNER)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(organization)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Organization>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM organizations WHERE id = $1");
        sqlx::query_as::<_, Organization>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Organizations `user_id` belongs to, with their role, by name.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<OrganizationWithRole>, sqlx::Error> {
        sqlx::query_as::<_, OrganizationWithRole>(
            "SELECT o.id, o.name, o.handle, o.description, o.owned_by, m.role, o.created_at
             FROM organizations o
             JOIN organization_members m ON m.organization_id = o.id
             WHERE m.user_id = $1
             ORDER BY o.name",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
