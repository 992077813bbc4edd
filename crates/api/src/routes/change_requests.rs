//! Route definitions for the `/change-requests` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::change_requests;
use crate::state::AppState;

/// Routes mounted at `/change-requests`.
///
/// ```text
/// GET    /                  -> list
/// POST   /                  -> submit
/// GET    /mine              -> mine
/// GET    /pending           -> pending
/// POST   /{id}/resolve      -> resolve
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(change_requests::list).post(change_requests::submit),
        )
        .route("/mine", get(change_requests::mine))
        .route("/pending", get(change_requests::pending))
        .route("/{id}/resolve", post(change_requests::resolve))
}
