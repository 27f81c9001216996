//! Lesson block model and DTOs.
//!
//! `content` and `settings` are stored as JSONB. Their shape depends on
//! `plugin_type` and is checked by the plugin's builder before insert.

use gonasi_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// A row from the `blocks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Block {
    pub id: DbId,
    pub lesson_id: DbId,
    pub plugin_type: String,
    pub content: Value,
    pub settings: Value,
    pub position: i32,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for a new block. Missing content or settings take the
/// plugin's defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBlock {
    pub plugin_type: String,
    pub content: Option<Value>,
    pub settings: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBlock {
    pub content: Option<Value>,
    pub settings: Option<Value>,
}
