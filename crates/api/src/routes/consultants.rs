use axum::routing::get;
use axum::Router;

use crate::handlers::consultants;
use crate::state::AppState;

/// Routes mounted at `/consultants`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(consultants::list))
}
