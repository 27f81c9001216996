pub mod auth;
pub mod block;
pub mod chapter;
pub mod course;
pub mod health;
pub mod lesson;
pub mod organization;
pub mod plugins;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                                 signup (public)
/// /auth/login                                  login (public)
/// /auth/me                                     get, update profile
///
/// /plugins                                     list registered plugin types
/// /plugins/{plugin_type}                       metadata + defaults
///
/// /organizations                               list mine, create
/// /organizations/{id}                          get
/// /organizations/{id}/members                  list, add (admin+)
/// /organizations/{id}/members/{user_id}        change role, remove (admin+)
/// /organizations/{id}/courses                  list, create (editor+)
///
/// /courses/{id}                                get, update (editor+), delete (admin+)
/// /courses/{id}/chapters                       list, create
/// /courses/{id}/chapters/reorder               reorder (PUT)
///
/// /chapters/{id}                               update, delete
/// /chapters/{id}/lessons                       list, create
/// /chapters/{id}/lessons/reorder               reorder (PUT)
///
/// /lessons/{id}                                get, update, delete
/// /lessons/{id}/blocks                         list, create
/// /lessons/{id}/blocks/reorder                 reorder (PUT)
/// /lessons/{id}/progress                       caller's lesson progress
///
/// /blocks/{id}                                 get, update, delete
/// /blocks/{id}/interaction                     get, act (POST), reset (DELETE)
/// /blocks/{id}/interaction/timeout             auto-submit (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/plugins", plugins::router())
        .nest("/organizations", organization::router())
        .nest("/courses", course::router())
        .nest("/chapters", chapter::router())
        .nest("/lessons", lesson::router())
        .nest("/blocks", block::router())
}
