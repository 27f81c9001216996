//! Route definitions for the `/organizations` resource.
//!
//! Also nests members and the organization's courses under
//! `/organizations/{id}/...`.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{course, organization};
use crate::state::AppState;

/// Routes mounted at `/organizations`.
///
/// ```text
/// GET    /                               -> list
/// POST   /                               -> create
/// GET    /{id}                           -> get_by_id
///
/// GET    /{id}/members                   -> list_members
/// POST   /{id}/members                   -> add_member
/// PUT    /{id}/members/{user_id}         -> update_member
/// DELETE /{id}/members/{user_id}         -> remove_member
///
/// GET    /{id}/courses                   -> course::list_by_organization
/// POST   /{id}/courses                   -> course::create
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(organization::list).post(organization::create))
        .route("/{id}", get(organization::get_by_id))
        .route(
            "/{id}/members",
            get(organization::list_members).post(organization::add_member),
        )
        .route(
            "/{id}/members/{user_id}",
            put(organization::update_member).delete(organization::remove_member),
        )
        .route(
            "/{id}/courses",
            get(course::list_by_organization).post(course::create),
        )
}
