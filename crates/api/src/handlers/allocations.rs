//! Handlers for the `/allocations` resource.

use agendas_core::allocation::{
    expand_range, validate_inline_consultant, validate_inline_project, EntityRef,
};
use agendas_core::types::DbId;
use agendas_db::models::allocation::{
    AllocationDetail, AllocationFilter, AllocationRow, CreateAllocationRange, MoveAllocation,
    UpdateAllocation,
};
use agendas_db::models::change_request::ChangeRequestDetail;
use agendas_db::repositories::allocation_repo::CreatedRange;
use agendas_db::repositories::{AllocationRepo, ChangeRequestRepo, ProjectRepo};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::handlers::scope;
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/allocations
pub async fn list(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(filter): Query<AllocationFilter>,
) -> AppResult<Json<DataResponse<Vec<AllocationDetail>>>> {
    let rows = scope::visible_allocations(&state, &user.viewer(), &filter).await?;
    Ok(Json(DataResponse { data: rows }))
}

/// POST /api/v1/allocations/range
///
/// One allocation per calendar day in `[start_date, end_date]`, weekends
/// included. Inline consultant/project payloads are created in the same
/// transaction as the rows.
pub async fn create_range(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateAllocationRange>,
) -> AppResult<(StatusCode, Json<DataResponse<CreatedRange>>)> {
    if let EntityRef::New(consultant) = &input.consultant {
        validate_inline_consultant(consultant)?;
    }
    if let EntityRef::New(project) = &input.project {
        validate_inline_project(project)?;
    }
    let days = expand_range(
        input.start_date,
        input.end_date,
        input.os.as_deref(),
        input.manager.as_deref(),
    )?;

    let created =
        AllocationRepo::create_range(&state.pool, &input.consultant, &input.project, &days)
            .await?;

    tracing::info!(
        user_id = admin.user_id,
        consultant_id = created.consultant_id,
        project_id = created.project_id,
        days = created.rows.len(),
        start = %input.start_date,
        end = %input.end_date,
        "Allocation range created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// GET /api/v1/allocations/{id}
pub async fn get_by_id(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AllocationDetail>>> {
    let allocation = scope::visible_allocation(&state, &user.viewer(), id).await?;
    Ok(Json(DataResponse { data: allocation }))
}

/// PATCH /api/v1/allocations/{id}
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAllocation>,
) -> AppResult<Json<DataResponse<AllocationRow>>> {
    if let Some(project_id) = input.project_id {
        ProjectRepo::find_by_id(&state.pool, project_id)
            .await?
            .ok_or_else(|| AppError::not_found("Project", project_id))?;
    }

    let row = AllocationRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Allocation", id))?;
    tracing::info!(user_id = admin.user_id, allocation_id = id, "Allocation updated");

    Ok(Json(DataResponse { data: row }))
}

/// PATCH /api/v1/allocations/{id}/date
///
/// Drag-and-drop target. Only the date changes.
pub async fn move_date(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<MoveAllocation>,
) -> AppResult<Json<DataResponse<AllocationRow>>> {
    let row = AllocationRepo::move_date(&state.pool, id, input.date)
        .await?
        .ok_or_else(|| AppError::not_found("Allocation", id))?;
    tracing::info!(
        user_id = admin.user_id,
        allocation_id = id,
        date = %input.date,
        "Allocation moved",
    );

    Ok(Json(DataResponse { data: row }))
}

/// DELETE /api/v1/allocations/{id}
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if AllocationRepo::delete(&state.pool, id).await? {
        tracing::info!(user_id = admin.user_id, allocation_id = id, "Allocation deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Allocation", id))
    }
}

/// GET /api/v1/allocations/{id}/change-requests
pub async fn list_change_requests(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ChangeRequestDetail>>>> {
    let viewer = user.viewer();
    scope::visible_allocation(&state, &viewer, id).await?;

    let requests = ChangeRequestRepo::list_by_allocation(&state.pool, id)
        .await?
        .into_iter()
        .filter(|r| viewer.can_view_request(r.requester_id, r.project_manager.as_deref()))
        .collect();

    Ok(Json(DataResponse { data: requests }))
}
