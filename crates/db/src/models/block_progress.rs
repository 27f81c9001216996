//! Per-learner block progress.

use gonasi_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// A row from the `block_progress` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BlockProgress {
    pub id: DbId,
    pub user_id: DbId,
    pub block_id: DbId,
    pub lesson_id: DbId,
    pub plugin_type: String,
    /// Serialized interaction state, opaque to the database.
    pub state: Value,
    pub score: Option<i16>,
    pub attempts: i32,
    pub is_complete: bool,
    pub completed_at: Option<Timestamp>,
    /// When the current attempt began; the countdown of timed blocks runs
    /// from here.
    pub started_at: Timestamp,
    /// Set once the countdown expired and the answer was auto-submitted.
    pub timed_out_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Values written after each interaction.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertBlockProgress {
    pub user_id: DbId,
    pub block_id: DbId,
    pub lesson_id: DbId,
    pub plugin_type: String,
    pub state: Value,
    pub score: Option<i16>,
    pub attempts: i32,
    pub is_complete: bool,
    /// Start a new attempt: reset `started_at` and clear `timed_out_at`.
    pub restart_timer: bool,
    /// Record that the countdown expired on this write.
    pub timed_out: bool,
}
