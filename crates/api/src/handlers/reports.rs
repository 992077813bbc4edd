//! Handlers for the `/reports` resource.

use agendas_core::analytics::{summarize_report, ReportSummary};
use agendas_core::calendar;
use agendas_core::daily_log::CompletionFilter;
use agendas_core::roles::Role;
use agendas_core::types::DbId;
use agendas_db::models::daily_log::{LogReportFilter, LogReportRow};
use agendas_db::repositories::DailyLogRepo;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::query::{today, MonthParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /reports/logs`.
#[derive(Debug, Default, Deserialize)]
pub struct ReportParams {
    pub month: Option<String>,
    pub consultant_id: Option<DbId>,
    pub project_id: Option<DbId>,
    #[serde(default)]
    pub status: CompletionFilter,
}

#[derive(Debug, Serialize)]
pub struct LogReport {
    pub month: String,
    pub rows: Vec<LogReportRow>,
    pub summary: ReportSummary,
}

/// GET /api/v1/reports/logs
///
/// Consultants always get their own logs only.
pub async fn logs(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> AppResult<Json<DataResponse<LogReport>>> {
    let viewer = user.viewer();
    let month = MonthParams {
        month: params.month.clone(),
    }
    .resolve(today())?;
    let consultant_id = if viewer.role == Role::Consultant {
        Some(viewer.user_id)
    } else {
        params.consultant_id
    };

    let filter = LogReportFilter {
        from: calendar::month_start(month),
        to: calendar::month_end(month),
        consultant_id,
        project_id: params.project_id,
    };
    let rows: Vec<LogReportRow> = DailyLogRepo::report(&state.pool, &filter)
        .await?
        .into_iter()
        .filter(|r| viewer.can_view_allocation(r.consultant_id, r.project_is_private))
        .filter(|r| params.status.accepts(r.description.as_deref()))
        .collect();
    let summary = summarize_report(rows.iter().map(LogReportRow::as_fact));

    Ok(Json(DataResponse {
        data: LogReport {
            month: calendar::format_month(month),
            rows,
            summary,
        },
    }))
}
