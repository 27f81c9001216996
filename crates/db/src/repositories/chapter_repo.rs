//! Repository for the `chapters` table.

use gonasi_core::types::DbId;
use sqlx::PgPool;

use super::positions;
use crate::models::chapter::{Chapter, CreateChapter, UpdateChapter};

const COLUMNS: &str = "id, course_id, name, description, position, requires_payment, \
                       created_at, updated_at";

pub struct ChapterRepo;

impl ChapterRepo {
    /// Append a chapter after the course's last one, holding the course row
    /// lock so concurrent appends get consecutive positions.
    pub async fn create(
        pool: &PgPool,
        course_id: DbId,
        input: &CreateChapter,
    ) -> Result<Chapter, sqlx::Error> {
        let query = format!(
            "INSERT INTO chapters (course_id, name, description, requires_payment, position)
             VALUES ($1, $2, $3, COALESCE($4, false),
                     (SELECT COALESCE(MAX(position) + 1, 0) FROM chapters WHERE course_id = $1))
             RETURNING {COLUMNS}"
        );
        let mut tx = pool.begin().await?;
        if !positions::lock_parent(&mut tx, "courses", course_id).await? {
            return Err(sqlx::Error::RowNotFound);
        }
        let chapter = sqlx::query_as::<_, Chapter>(&query)
            .bind(course_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.requires_payment)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(chapter)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Chapter>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM chapters WHERE id = $1");
        sqlx::query_as::<_, Chapter>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_course(
        pool: &PgPool,
        course_id: DbId,
    ) -> Result<Vec<Chapter>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM chapters WHERE course_id = $1 ORDER BY position");
        sqlx::query_as::<_, Chapter>(&query)
            .bind(course_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_ids(pool: &PgPool, course_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        positions::child_ids(pool, "chapters", "course_id", course_id).await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateChapter,
    ) -> Result<Option<Chapter>, sqlx::Error> {
        let query = format!(
            "UPDATE chapters SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                requires_payment = COALESCE($4, requires_payment)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Chapter>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.requires_payment)
            .fetch_optional(pool)
            .await
    }

    /// Rewrite positions; `ordered_ids` must already be a permutation of the
    /// course's chapters.
    pub async fn reorder(
        pool: &PgPool,
        course_id: DbId,
        ordered_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        positions::reorder(pool, "chapters", "course_id", course_id, ordered_ids).await
    }

    /// Delete a chapter (its lessons and blocks cascade) and close the gap.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        positions::delete_and_compact(pool, "chapters", "course_id", id).await
    }
}
