//! Repository for the `courses` table.

use gonasi_core::types::DbId;
use sqlx::PgPool;

use crate::models::course::{Course, CreateCourse, UpdateCourse};

const COLUMNS: &str = "id, organization_id, name, description, image_url, \
                       created_by, updated_by, created_at, updated_at";

pub struct CourseRepo;

impl CourseRepo {
    pub async fn create(
        pool: &PgPool,
        organization_id: DbId,
        input: &CreateCourse,
        user_id: DbId,
    ) -> Result<Course, sqlx::Error> {
        let query = format!(
            "INSERT INTO courses (organization_id, name, description, image_url, created_by, updated_by)
             VALUES ($1, $2, $3, $4, $5, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(organization_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.image_url)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM courses WHERE id = $1");
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Courses of one organization, most recently updated first.
    pub async fn list_by_organization(
        pool: &PgPool,
        organization_id: DbId,
    ) -> Result<Vec<Course>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM courses WHERE organization_id = $1 ORDER BY updated_at DESC, id"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(organization_id)
            .fetch_all(pool)
            .await
    }

    /// Apply non-`None` fields and stamp `updated_by`.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCourse,
        user_id: DbId,
    ) -> Result<Option<Course>, sqlx::Error> {
        let query = format!(
            "UPDATE courses SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                image_url = COALESCE($4, image_url),
                updated_by = $5
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.image_url)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a course and, by cascade, its chapters, lessons and blocks.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
