//! Handlers for the `/dashboard` resource.

use std::collections::HashSet;

use agendas_core::allocation::Allocation;
use agendas_core::analytics::{
    deadline_alerts, pending_logs, strategic_dashboard, DeadlineAlert, LogFact, ProjectDeadline,
    StrategicDashboard, StrategicInput, EVOLUTION_MONTHS, FUTURE_MONTHS,
};
use agendas_core::calendar;
use agendas_core::change_request::RequestStatus;
use agendas_core::roles::Role;
use agendas_core::types::{DbId, Day};
use agendas_db::models::allocation::{AllocationDetail, AllocationFilter};
use agendas_db::models::daily_log::DailyLog;
use agendas_db::repositories::{AllocationRepo, ChangeRequestRepo, DailyLogRepo, ProjectRepo};
use axum::extract::{Query, State};
use axum::Json;
use chrono::Days;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::handlers::change_requests::RequestView;
use crate::handlers::scope;
use crate::middleware::rbac::{RequireAuth, RequireManager};
use crate::query::{today, MonthParams};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct OperationalDashboard {
    pub date: Day,
    pub today: Vec<AllocationDetail>,
    /// Yesterday's allocations that have no log yet.
    pub pending_logs: Vec<AllocationDetail>,
    pub deadline_alerts: Vec<DeadlineAlert>,
    /// Pending change requests; only present for administrators.
    pub pending_requests: Option<Vec<RequestView>>,
}

fn single_day(day: Day) -> AllocationFilter {
    AllocationFilter {
        from: Some(day),
        to: Some(day),
        ..Default::default()
    }
}

/// GET /api/v1/dashboard/operational
pub async fn operational(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<OperationalDashboard>>> {
    let viewer = user.viewer();
    let today = today();
    let yesterday = today - Days::new(1);
    let today_filter = single_day(today);
    let yesterday_filter = single_day(yesterday);

    let (todays, yesterdays, projects) = tokio::try_join!(
        scope::visible_allocations(&state, &viewer, &today_filter),
        scope::visible_allocations(&state, &viewer, &yesterday_filter),
        async { ProjectRepo::list(&state.pool).await.map_err(AppError::from) },
    )?;

    // Pending logs.
    let ids: Vec<DbId> = yesterdays.iter().map(|a| a.id).collect();
    let logged: HashSet<DbId> = DailyLogRepo::logged_allocation_ids(&state.pool, yesterday, &ids)
        .await?
        .into_iter()
        .collect();
    let allocations: Vec<Allocation> = yesterdays.iter().map(|a| a.to_allocation()).collect();
    let missing: HashSet<DbId> = pending_logs(&allocations, &logged, yesterday)
        .into_iter()
        .map(|a| a.id)
        .collect();
    let pending = yesterdays
        .into_iter()
        .filter(|a| missing.contains(&a.id))
        .collect();

    // Deadline alerts. Consultants only hear about projects they worked on.
    let worked_on: Option<HashSet<DbId>> = if viewer.role == Role::Consultant {
        let ids = AllocationRepo::project_ids_for_consultant(&state.pool, viewer.user_id).await?;
        Some(ids.into_iter().collect())
    } else {
        None
    };
    let deadlines: Vec<ProjectDeadline> = projects
        .iter()
        .filter(|p| viewer.can_view_project(p.is_private))
        .filter(|p| worked_on.as_ref().map_or(true, |ids| ids.contains(&p.id)))
        .map(|p| ProjectDeadline {
            project_id: p.id,
            name: p.name.clone(),
            status: p.status(),
            deadline: p.deadline,
        })
        .collect();

    let pending_requests = if viewer.role.is_admin() {
        let requests = ChangeRequestRepo::list_detail(&state.pool, Some(RequestStatus::Pending))
            .await?
            .into_iter()
            .map(RequestView::from)
            .collect();
        Some(requests)
    } else {
        None
    };

    Ok(Json(DataResponse {
        data: OperationalDashboard {
            date: today,
            today: todays,
            pending_logs: pending,
            deadline_alerts: deadline_alerts(&deadlines, today),
            pending_requests,
        },
    }))
}

/// GET /api/v1/dashboard/strategic
///
/// Reads the allocations of the evolution window (months before the
/// reference) through the future-availability window in one query.
pub async fn strategic(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Query(params): Query<MonthParams>,
) -> AppResult<Json<DataResponse<StrategicDashboard>>> {
    let viewer = user.viewer();
    let month = params.resolve(today())?;
    let from = calendar::add_months(month, 1 - EVOLUTION_MONTHS as i32);
    let to = calendar::month_end(calendar::add_months(month, FUTURE_MONTHS as i32));
    let filter = AllocationFilter {
        from: Some(from),
        to: Some(to),
        ..Default::default()
    };

    let (rows, consultants, projects) = tokio::try_join!(
        scope::visible_allocations(&state, &viewer, &filter),
        scope::active_consultants(&state),
        async { ProjectRepo::list(&state.pool).await.map_err(AppError::from) },
    )?;

    let allocations: Vec<Allocation> = rows.iter().map(|a| a.to_allocation()).collect();
    let ids: Vec<DbId> = allocations.iter().map(|a| a.id).collect();
    let logs = DailyLogRepo::list_between(&state.pool, from, calendar::month_end(month), &ids)
        .await?;
    let facts: Vec<LogFact<'_>> = logs.iter().map(DailyLog::as_fact).collect();
    let names = scope::project_names(&projects);

    let dashboard = strategic_dashboard(&StrategicInput {
        reference: month,
        consultants: &consultants,
        allocations: &allocations,
        logs: &facts,
        project_names: &names,
    });

    Ok(Json(DataResponse { data: dashboard }))
}
