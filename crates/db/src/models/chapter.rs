//! Chapter entity model and DTOs.

use gonasi_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `chapters` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Chapter {
    pub id: DbId,
    pub course_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub position: i32,
    pub requires_payment: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// New chapters are appended after the last one.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateChapter {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    /// Defaults to `false` if omitted.
    pub requires_payment: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateChapter {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub requires_payment: Option<bool>,
}
