//! Route definitions for the `/allocations` resource.
//!
//! Also nests the daily logs of an allocation under `/{id}/logs`.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::{allocations, daily_logs};
use crate::state::AppState;

/// Routes mounted at `/allocations`.
///
/// ```text
/// GET    /                          -> list
/// POST   /range                     -> create_range
/// GET    /{id}                      -> get_by_id
/// PATCH  /{id}                      -> update
/// DELETE /{id}                      -> delete
/// PATCH  /{id}/date                 -> move_date
/// GET    /{id}/change-requests      -> list_change_requests
///
/// GET    /{id}/logs                 -> daily_logs::list
/// GET    /{id}/logs/{date}          -> daily_logs::get
/// PUT    /{id}/logs/{date}          -> daily_logs::save
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(allocations::list))
        .route("/range", post(allocations::create_range))
        .route(
            "/{id}",
            get(allocations::get_by_id)
                .patch(allocations::update)
                .delete(allocations::delete),
        )
        .route("/{id}/date", patch(allocations::move_date))
        .route(
            "/{id}/change-requests",
            get(allocations::list_change_requests),
        )
        .route("/{id}/logs", get(daily_logs::list))
        .route(
            "/{id}/logs/{date}",
            get(daily_logs::get).put(daily_logs::save),
        )
}
