use axum::routing::get;
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// Routes mounted at `/dashboard`.
///
/// ```text
/// GET    /operational           -> operational
/// GET    /strategic?month=      -> strategic
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/operational", get(dashboard::operational))
        .route("/strategic", get(dashboard::strategic))
}
