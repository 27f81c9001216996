//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod block;
pub mod block_progress;
pub mod chapter;
pub mod course;
pub mod lesson;
pub mod organization;
pub mod user;
