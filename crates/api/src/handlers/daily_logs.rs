//! Handlers for the daily logs of an allocation
//! (`/allocations/{id}/logs[/{date}]`).

use agendas_core::daily_log::LogDraft;
use agendas_core::roles::Viewer;
use agendas_core::types::{DbId, Day};
use agendas_db::models::allocation::AllocationDetail;
use agendas_db::models::daily_log::{DailyLog, SaveDailyLog};
use agendas_db::repositories::DailyLogRepo;
use axum::extract::{Path, State};
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::handlers::scope;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// Logs are written by the allocated consultant or an administrator.
fn ensure_can_write(viewer: &Viewer, allocation: &AllocationDetail) -> AppResult<()> {
    if viewer.role.is_admin() || viewer.user_id == allocation.consultant_id {
        Ok(())
    } else {
        Err(AppError::forbidden(
            "Only the allocated consultant or an admin can write this log",
        ))
    }
}

/// GET /api/v1/allocations/{id}/logs
pub async fn list(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<DailyLog>>>> {
    scope::visible_allocation(&state, &user.viewer(), id).await?;
    let logs = DailyLogRepo::list_for_allocation(&state.pool, id).await?;
    Ok(Json(DataResponse { data: logs }))
}

/// GET /api/v1/allocations/{id}/logs/{date}
///
/// Returns the stored log, or an unsaved empty draft when the pair has none.
pub async fn get(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path((id, date)): Path<(DbId, Day)>,
) -> AppResult<Json<DataResponse<LogDraft>>> {
    scope::visible_allocation(&state, &user.viewer(), id).await?;
    let draft = DailyLogRepo::find(&state.pool, id, date)
        .await?
        .map(LogDraft::from)
        .unwrap_or_else(|| LogDraft::empty(id, date));
    Ok(Json(DataResponse { data: draft }))
}

/// PUT /api/v1/allocations/{id}/logs/{date}
///
/// Both the on-blur save and the explicit save button land here. Blank
/// text over a missing log stores nothing and returns the empty draft.
pub async fn save(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path((id, date)): Path<(DbId, Day)>,
    Json(input): Json<SaveDailyLog>,
) -> AppResult<Json<DataResponse<LogDraft>>> {
    let viewer = user.viewer();
    let allocation = scope::visible_allocation(&state, &viewer, id).await?;
    ensure_can_write(&viewer, &allocation)?;

    let saved = DailyLogRepo::save(&state.pool, id, date, &input.description).await?;
    let draft = match saved {
        Some(log) => {
            tracing::info!(
                user_id = user.user_id,
                allocation_id = id,
                log_id = log.id,
                %date,
                status = %log.status,
                "Daily log saved",
            );
            LogDraft::from(log)
        }
        None => LogDraft::empty(id, date),
    };

    Ok(Json(DataResponse { data: draft }))
}
