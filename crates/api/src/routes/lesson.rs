//! Route definitions for the `/lessons` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{block, lesson, player};
use crate::state::AppState;

/// Routes mounted at `/lessons`.
///
/// ```text
/// GET    /{id}                  -> get_by_id
/// PUT    /{id}                  -> update
/// DELETE /{id}                  -> delete
///
/// GET    /{id}/blocks           -> block::list_by_lesson
/// POST   /{id}/blocks           -> block::create
/// PUT    /{id}/blocks/reorder   -> block::reorder
///
/// GET    /{id}/progress         -> player::lesson_progress
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(lesson::get_by_id)
                .put(lesson::update)
                .delete(lesson::delete),
        )
        .route("/{id}/blocks", get(block::list_by_lesson).post(block::create))
        .route("/{id}/blocks/reorder", put(block::reorder))
        .route("/{id}/progress", get(player::lesson_progress))
}
