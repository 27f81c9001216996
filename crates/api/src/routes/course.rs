//! Route definitions for the `/courses` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{chapter, course};
use crate::state::AppState;

/// Routes mounted at `/courses`.
///
/// ```text
/// GET    /{id}                    -> get_by_id
/// PUT    /{id}                    -> update
/// DELETE /{id}                    -> delete
///
/// GET    /{id}/chapters           -> chapter::list_by_course
/// POST   /{id}/chapters           -> chapter::create
/// PUT    /{id}/chapters/reorder   -> chapter::reorder
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(course::get_by_id)
                .put(course::update)
                .delete(course::delete),
        )
        .route(
            "/{id}/chapters",
            get(chapter::list_by_course).post(chapter::create),
        )
        .route("/{id}/chapters/reorder", put(chapter::reorder))
}
