//! Handlers for the `/consultants` resource.

use agendas_db::models::profile::ProfileResponse;
use axum::extract::State;
use axum::Json;

use crate::error::AppResult;
use crate::handlers::scope;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/consultants
///
/// Profiles visible to the caller, ordered by name. Consultants only get
/// themselves.
pub async fn list(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ProfileResponse>>>> {
    let profiles = scope::visible_profiles(&state, &user.viewer()).await?;
    Ok(Json(DataResponse {
        data: profiles.into_iter().map(ProfileResponse::from).collect(),
    }))
}
