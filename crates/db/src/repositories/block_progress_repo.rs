//! Repository for the `block_progress` table.

use gonasi_core::types::DbId;
use sqlx::PgPool;

use crate::models::block_progress::{BlockProgress, UpsertBlockProgress};

const COLUMNS: &str = "id, user_id, block_id, lesson_id, plugin_type, state, score, attempts, \
                       is_complete, completed_at, started_at, timed_out_at, created_at, updated_at";

pub struct BlockProgressRepo;

impl BlockProgressRepo {
    pub async fn find(
        pool: &PgPool,
        user_id: DbId,
        block_id: DbId,
    ) -> Result<Option<BlockProgress>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM block_progress WHERE user_id = $1 AND block_id = $2");
        sqlx::query_as::<_, BlockProgress>(&query)
            .bind(user_id)
            .bind(block_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_lesson(
        pool: &PgPool,
        user_id: DbId,
        lesson_id: DbId,
    ) -> Result<Vec<BlockProgress>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM block_progress WHERE user_id = $1 AND lesson_id = $2"
        );
        sqlx::query_as::<_, BlockProgress>(&query)
            .bind(user_id)
            .bind(lesson_id)
            .fetch_all(pool)
            .await
    }

    /// Insert or overwrite the learner's progress on one block.
    ///
    /// `completed_at` is set the first time the block completes and cleared
    /// if it becomes incomplete again (after a reset). `started_at` only moves
    /// when `restart_timer` is set; `timed_out_at` keeps its first value.
    pub async fn upsert(
        pool: &PgPool,
        input: &UpsertBlockProgress,
    ) -> Result<BlockProgress, sqlx::Error> {
        let query = format!(
            "INSERT INTO block_progress
                (user_id, block_id, lesson_id, plugin_type, state, score, attempts,
                 is_complete, completed_at, timed_out_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, CASE WHEN $8 THEN NOW() END,
                     CASE WHEN $10 THEN NOW() END)
             ON CONFLICT ON CONSTRAINT uq_block_progress_user_block DO UPDATE SET
                plugin_type = EXCLUDED.plugin_type,
                state = EXCLUDED.state,
                score = EXCLUDED.score,
                attempts = EXCLUDED.attempts,
                is_complete = EXCLUDED.is_complete,
                completed_at = CASE
                    WHEN EXCLUDED.is_complete
                        THEN COALESCE(block_progress.completed_at, NOW())
                END,
                started_at = CASE WHEN $9 THEN NOW() ELSE block_progress.started_at END,
                timed_out_at = CASE
                    WHEN $9 THEN NULL
                    ELSE COALESCE(block_progress.timed_out_at, EXCLUDED.timed_out_at)
                END
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BlockProgress>(&query)
            .bind(input.user_id)
            .bind(input.block_id)
            .bind(input.lesson_id)
            .bind(&input.plugin_type)
            .bind(&input.state)
            .bind(input.score)
            .bind(input.attempts)
            .bind(input.is_complete)
            .bind(input.restart_timer)
            .bind(input.timed_out)
            .fetch_one(pool)
            .await
    }

    /// Returns `true` if progress existed and was removed.
    pub async fn delete(pool: &PgPool, user_id: DbId, block_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM block_progress WHERE user_id = $1 AND block_id = $2")
            .bind(user_id)
            .bind(block_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Drop every learner's progress on one block. Returns the number of rows
    /// removed.
    pub async fn delete_for_block(pool: &PgPool, block_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM block_progress WHERE block_id = $1")
            .bind(block_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
