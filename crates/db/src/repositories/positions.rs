//! Position bookkeeping shared by chapters, lessons and blocks.
//!
//! `table` and `parent_column` are always compile-time constants from the
//! calling repository, never user input.

use gonasi_core::ordering::positions_for;
use gonasi_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

/// Ids of the children of `parent_id`, in position order.
pub(crate) async fn child_ids(
    pool: &PgPool,
    table: &str,
    parent_column: &str,
    parent_id: DbId,
) -> Result<Vec<DbId>, sqlx::Error> {
    let query = format!("SELECT id FROM {table} WHERE {parent_column} = $1 ORDER BY position");
    sqlx::query_scalar::<_, DbId>(&query)
        .bind(parent_id)
        .fetch_all(pool)
        .await
}

/// Serialize appends under one parent until `tx` ends.
///
/// Two appends would otherwise both read the same `MAX(position)`. `NO KEY`
/// leaves foreign-key checks from other writers unblocked. Returns `false`
/// if the parent row does not exist.
pub(crate) async fn lock_parent(
    tx: &mut Transaction<'_, Postgres>,
    parent_table: &str,
    parent_id: DbId,
) -> Result<bool, sqlx::Error> {
    let query = format!("SELECT id FROM {parent_table} WHERE id = $1 FOR NO KEY UPDATE");
    let locked = sqlx::query_scalar::<_, DbId>(&query)
        .bind(parent_id)
        .fetch_optional(&mut **tx)
        .await?;
    Ok(locked.is_some())
}

/// Rewrite positions to match `ordered_ids` inside one transaction.
///
/// Relies on the deferred unique constraint on `(parent, position)`.
pub(crate) async fn reorder(
    pool: &PgPool,
    table: &str,
    parent_column: &str,
    parent_id: DbId,
    ordered_ids: &[DbId],
) -> Result<(), sqlx::Error> {
    let query = format!("UPDATE {table} SET position = $2 WHERE id = $1 AND {parent_column} = $3");
    let mut tx = pool.begin().await?;
    for (id, position) in positions_for(ordered_ids) {
        let result = sqlx::query(&query)
            .bind(id)
            .bind(position)
            .bind(parent_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }
    }
    tx.commit().await?;
    tracing::debug!(table, parent_id, count = ordered_ids.len(), "Children reordered");
    Ok(())
}

/// Delete one child and close the gap it leaves. Returns `false` if the row
/// did not exist.
pub(crate) async fn delete_and_compact(
    pool: &PgPool,
    table: &str,
    parent_column: &str,
    id: DbId,
) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let deleted = delete_returning_slot(&mut tx, table, parent_column, id).await?;
    let Some((parent_id, position)) = deleted else {
        return Ok(false);
    };
    let query = format!(
        "UPDATE {table} SET position = position - 1 WHERE {parent_column} = $1 AND position > $2"
    );
    sqlx::query(&query)
        .bind(parent_id)
        .bind(position)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    tracing::debug!(table, id, parent_id, "Child deleted, positions compacted");
    Ok(true)
}

async fn delete_returning_slot(
    tx: &mut Transaction<'_, Postgres>,
    table: &str,
    parent_column: &str,
    id: DbId,
) -> Result<Option<(DbId, i32)>, sqlx::Error> {
    let query = format!("DELETE FROM {table} WHERE id = $1 RETURNING {parent_column}, position");
    sqlx::query_as::<_, (DbId, i32)>(&query)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
}
