//! Route definitions for the `/schedule` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::schedule;
use crate::state::AppState;

/// Routes mounted at `/schedule`.
///
/// ```text
/// GET    /?view=&date=            -> grid
/// GET    /availability?month=     -> availability_overview
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(schedule::grid))
        .route("/availability", get(schedule::availability_overview))
}
