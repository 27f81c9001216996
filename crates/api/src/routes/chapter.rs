//! Route definitions for the `/chapters` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{chapter, lesson};
use crate::state::AppState;

/// Routes mounted at `/chapters`.
///
/// ```text
/// PUT    /{id}                   -> update
/// DELETE /{id}                   -> delete
///
/// GET    /{id}/lessons           -> lesson::list_by_chapter
/// POST   /{id}/lessons           -> lesson::create
/// PUT    /{id}/lessons/reorder   -> lesson::reorder
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", put(chapter::update).delete(chapter::delete))
        .route(
            "/{id}/lessons",
            get(lesson::list_by_chapter).post(lesson::create),
        )
        .route("/{id}/lessons/reorder", put(lesson::reorder))
}
