//! Handlers for the `/auth` resource (login, current session).

use agendas_core::error::CoreError;
use agendas_core::roles::{Role, PROFILE_STATUS_ACTIVE};
use agendas_core::types::DbId;
use agendas_db::repositories::ProfileRepo;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_access_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: SessionInfo,
}

/// The session as seen by the client.
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub id: DbId,
    pub role: Role,
    pub full_name: String,
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized("Invalid e-mail or password".into()))
}

/// POST /api/v1/auth/login
///
/// Profiles without a password (created inline from the schedule) cannot
/// log in; inactive profiles are refused.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<LoginResponse>>> {
    let profile = ProfileRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(invalid_credentials)?;

    let Some(hash) = profile.password_hash.as_deref() else {
        return Err(invalid_credentials());
    };
    let valid = verify_password(&input.password, hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !valid {
        tracing::info!(profile_id = profile.id, "Login rejected: wrong password");
        return Err(invalid_credentials());
    }

    if profile.status != PROFILE_STATUS_ACTIVE {
        return Err(AppError::forbidden("Profile is inactive"));
    }

    let role: Role = profile.role.parse()?;
    let access_token =
        generate_access_token(profile.id, role.as_str(), &profile.full_name, &state.config.jwt)
            .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(profile_id = profile.id, role = %role, "Profile logged in");

    Ok(Json(DataResponse {
        data: LoginResponse {
            access_token,
            expires_in: state.config.jwt.access_token_expiry_mins * 60,
            user: SessionInfo {
                id: profile.id,
                role,
                full_name: profile.full_name,
            },
        },
    }))
}

/// GET /api/v1/auth/me
pub async fn me(user: AuthUser) -> Json<DataResponse<SessionInfo>> {
    Json(DataResponse {
        data: SessionInfo {
            id: user.user_id,
            role: user.role,
            full_name: user.full_name,
        },
    })
}
