//! Request bodies shared by several resources.

use gonasi_core::types::DbId;
use serde::Deserialize;

/// Body of the `PUT .../reorder` endpoints: every child id, in the new order.
#[derive(Debug, Clone, Deserialize)]
pub struct ReorderRequest {
    pub ordered_ids: Vec<DbId>,
}
