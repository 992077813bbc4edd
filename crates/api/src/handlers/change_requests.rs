//! Handlers for the `/change-requests` resource.

use agendas_core::change_request::{
    approval_effect, clean_response, validate_submission, validate_transition, ApprovalEffect,
    Decision, NewAgendaReason, RequestFilter, RequestStatus, StatusCounts, Submission,
};
use agendas_core::error::CoreError;
use agendas_core::types::DbId;
use agendas_db::models::change_request::{
    ChangeRequest, ChangeRequestDetail, CreateChangeRequest, ResolveChangeRequest,
};
use agendas_db::repositories::ChangeRequestRepo;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::handlers::scope;
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// A request with its display fields.
#[derive(Debug, Serialize)]
pub struct RequestView {
    #[serde(flatten)]
    pub request: ChangeRequestDetail,
    pub type_label: Option<&'static str>,
    /// Project and description unpacked from a `new_agenda` reason.
    pub new_agenda: Option<NewAgendaReason>,
}

impl From<ChangeRequestDetail> for RequestView {
    fn from(request: ChangeRequestDetail) -> Self {
        let type_label = request.facts().map(|f| f.request_type.label());
        let new_agenda = request.new_agenda();
        Self {
            request,
            type_label,
            new_agenda,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RequestList {
    pub requests: Vec<RequestView>,
    /// Totals over every request visible to the caller, before filtering.
    pub counts: StatusCounts,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/change-requests
pub async fn list(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(filter): Query<RequestFilter>,
) -> AppResult<Json<DataResponse<RequestList>>> {
    let viewer = user.viewer();
    let visible: Vec<ChangeRequestDetail> = ChangeRequestRepo::list_detail(&state.pool, None)
        .await?
        .into_iter()
        .filter(|r| viewer.can_view_request(r.requester_id, r.project_manager.as_deref()))
        .collect();

    let counts = StatusCounts::tally(visible.iter().filter_map(|r| r.facts().map(|f| f.status)));
    let requests = visible
        .into_iter()
        .filter(|r| r.facts().is_some_and(|f| filter.matches(&f)))
        .map(RequestView::from)
        .collect();

    Ok(Json(DataResponse {
        data: RequestList { requests, counts },
    }))
}

/// GET /api/v1/change-requests/mine
pub async fn mine(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<RequestView>>>> {
    let requests = ChangeRequestRepo::list_by_requester(&state.pool, user.user_id)
        .await?
        .into_iter()
        .map(RequestView::from)
        .collect();
    Ok(Json(DataResponse { data: requests }))
}

/// GET /api/v1/change-requests/pending
pub async fn pending(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<RequestView>>>> {
    let requests = ChangeRequestRepo::list_detail(&state.pool, Some(RequestStatus::Pending))
        .await?
        .into_iter()
        .map(RequestView::from)
        .collect();
    Ok(Json(DataResponse { data: requests }))
}

/// POST /api/v1/change-requests
///
/// The target allocation, when there is one, must be visible to the
/// requester.
pub async fn submit(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<Submission>,
) -> AppResult<(StatusCode, Json<DataResponse<ChangeRequest>>)> {
    let validated = validate_submission(&input)?;
    if let Some(allocation_id) = validated.allocation_id {
        scope::visible_allocation(&state, &user.viewer(), allocation_id).await?;
    }

    let created = ChangeRequestRepo::create(
        &state.pool,
        &CreateChangeRequest {
            requester_id: user.user_id,
            allocation_id: validated.allocation_id,
            request_type: validated.request_type,
            reason: validated.reason,
            suggested_start_date: validated.suggested_start_date,
            suggested_days: validated.suggested_days,
        },
    )
    .await?;

    tracing::info!(
        user_id = user.user_id,
        request_id = created.id,
        request_type = %validated.request_type,
        allocation_id = ?created.allocation_id,
        "Change request submitted",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// POST /api/v1/change-requests/{id}/resolve
///
/// Approving a `cancel` deletes the target allocation; approving a
/// `reschedule` with a suggested date moves it. The status change and the
/// side effect commit together. Resolving a request that is no longer
/// pending answers 409.
pub async fn resolve(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ResolveChangeRequest>,
) -> AppResult<Json<DataResponse<ChangeRequest>>> {
    let request = ChangeRequestRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("ChangeRequest", id))?;

    validate_transition(request.status()?, input.decision)?;

    let effect = match input.decision {
        Decision::Approved => approval_effect(
            request.request_type()?,
            request.allocation_id,
            request.suggested_start_date,
        ),
        Decision::Rejected => ApprovalEffect::None,
    };
    let response = clean_response(input.admin_response.as_deref());

    let resolved = ChangeRequestRepo::resolve(
        &state.pool,
        id,
        input.decision.target_status(),
        response.as_deref(),
        admin.user_id,
        effect,
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::Conflict(format!(
            "Change request {id} was resolved by someone else"
        )))
    })?;

    tracing::info!(
        user_id = admin.user_id,
        request_id = id,
        status = %resolved.status,
        effect = ?effect,
        "Change request resolved",
    );

    Ok(Json(DataResponse { data: resolved }))
}
