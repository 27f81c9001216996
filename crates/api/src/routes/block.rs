//! Route definitions for the `/blocks` resource and learner interaction.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{block, player};
use crate::state::AppState;

/// Routes mounted at `/blocks`.
///
/// ```text
/// GET    /{id}                        -> get_by_id
/// PUT    /{id}                        -> update
/// DELETE /{id}                        -> delete
///
/// GET    /{id}/interaction            -> player::get_interaction
/// POST   /{id}/interaction            -> player::interact
/// DELETE /{id}/interaction            -> player::reset
/// POST   /{id}/interaction/timeout    -> player::timeout
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(block::get_by_id)
                .put(block::update)
                .delete(block::delete),
        )
        .route(
            "/{id}/interaction",
            get(player::get_interaction)
                .post(player::interact)
                .delete(player::reset),
        )
        .route("/{id}/interaction/timeout", post(player::timeout))
}
