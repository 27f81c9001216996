//! Repository for the `blocks` table.
//!
//! Content and settings arrive here already migrated and validated by the
//! plugin builder.

use gonasi_core::types::DbId;
use serde_json::Value;
use sqlx::PgPool;

use super::positions;
use crate::models::block::Block;

const COLUMNS: &str = "id, lesson_id, plugin_type, content, settings, position, created_by, \
                       created_at, updated_at";

pub struct BlockRepo;

impl BlockRepo {
    /// Append a block to the lesson. The lesson row is locked for the insert
    /// so concurrent appends get consecutive positions.
    pub async fn create(
        pool: &PgPool,
        lesson_id: DbId,
        plugin_type: &str,
        content: &Value,
        settings: &Value,
        created_by: DbId,
    ) -> Result<Block, sqlx::Error> {
        let query = format!(
            "INSERT INTO blocks (lesson_id, plugin_type, content, settings, created_by, position)
             VALUES ($1, $2, $3, $4, $5,
                     (SELECT COALESCE(MAX(position) + 1, 0) FROM blocks WHERE lesson_id = $1))
             RETURNING {COLUMNS}"
        );
        let mut tx = pool.begin().await?;
        if !positions::lock_parent(&mut tx, "lessons", lesson_id).await? {
            return Err(sqlx::Error::RowNotFound);
        }
        let block = sqlx::query_as::<_, Block>(&query)
            .bind(lesson_id)
            .bind(plugin_type)
            .bind(content)
            .bind(settings)
            .bind(created_by)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(block)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Block>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM blocks WHERE id = $1");
        sqlx::query_as::<_, Block>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_lesson(pool: &PgPool, lesson_id: DbId) -> Result<Vec<Block>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM blocks WHERE lesson_id = $1 ORDER BY position");
        sqlx::query_as::<_, Block>(&query)
            .bind(lesson_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_ids(pool: &PgPool, lesson_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        positions::child_ids(pool, "blocks", "lesson_id", lesson_id).await
    }

    /// Replace content and/or settings. `None` keeps the stored value.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        content: Option<&Value>,
        settings: Option<&Value>,
    ) -> Result<Option<Block>, sqlx::Error> {
        let query = format!(
            "UPDATE blocks SET
                content = COALESCE($2, content),
                settings = COALESCE($3, settings)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Block>(&query)
            .bind(id)
            .bind(content)
            .bind(settings)
            .fetch_optional(pool)
            .await
    }

    pub async fn reorder(
        pool: &PgPool,
        lesson_id: DbId,
        ordered_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        positions::reorder(pool, "blocks", "lesson_id", lesson_id, ordered_ids).await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        positions::delete_and_compact(pool, "blocks", "lesson_id", id).await
    }
}
