//! Repository for the `lessons` table.

use gonasi_core::types::DbId;
use sqlx::PgPool;

use super::positions;
use crate::models::lesson::{CreateLesson, Lesson, UpdateLesson};

const COLUMNS: &str = "id, chapter_id, course_id, name, position, created_at, updated_at";

pub struct LessonRepo;

impl LessonRepo {
    /// Append a lesson to the chapter. `course_id` is copied from the
    /// chapter so progress queries can skip a join. The chapter row stays
    /// locked until the insert commits.
    pub async fn create(
        pool: &PgPool,
        chapter_id: DbId,
        input: &CreateLesson,
    ) -> Result<Lesson, sqlx::Error> {
        let query = format!(
            "INSERT INTO lessons (chapter_id, course_id, name, position)
             SELECT c.id, c.course_id, $2,
                    (SELECT COALESCE(MAX(position) + 1, 0) FROM lessons WHERE chapter_id = $1)
             FROM chapters c WHERE c.id = $1
             RETURNING {COLUMNS}"
        );
        let mut tx = pool.begin().await?;
        if !positions::lock_parent(&mut tx, "chapters", chapter_id).await? {
            return Err(sqlx::Error::RowNotFound);
        }
        let lesson = sqlx::query_as::<_, Lesson>(&query)
            .bind(chapter_id)
            .bind(&input.name)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(lesson)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Lesson>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lessons WHERE id = $1");
        sqlx::query_as::<_, Lesson>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_chapter(
        pool: &PgPool,
        chapter_id: DbId,
    ) -> Result<Vec<Lesson>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM lessons WHERE chapter_id = $1 ORDER BY position");
        sqlx::query_as::<_, Lesson>(&query)
            .bind(chapter_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_ids(pool: &PgPool, chapter_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        positions::child_ids(pool, "lessons", "chapter_id", chapter_id).await
    }

    /// Organization owning the lesson's course.
    pub async fn find_organization_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT co.organization_id FROM lessons l
             JOIN courses co ON co.id = l.course_id
             WHERE l.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateLesson,
    ) -> Result<Option<Lesson>, sqlx::Error> {
        let query = format!(
            "UPDATE lessons SET name = COALESCE($2, name) WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lesson>(&query)
            .bind(id)
            .bind(&input.name)
            .fetch_optional(pool)
            .await
    }

    pub async fn reorder(
        pool: &PgPool,
        chapter_id: DbId,
        ordered_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        positions::reorder(pool, "lessons", "chapter_id", chapter_id, ordered_ids).await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        positions::delete_and_compact(pool, "lessons", "chapter_id", id).await
    }
}
