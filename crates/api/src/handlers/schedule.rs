//! Handlers for the `/schedule` resource: the grid and monthly availability.

use agendas_core::calendar::{self, TimeView};
use agendas_core::schedule::{availability, build_grid, AvailabilityOverview, GridView};
use agendas_core::types::Day;
use agendas_db::models::allocation::AllocationFilter;
use agendas_db::models::profile::Profile;
use agendas_db::repositories::ProjectRepo;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::scope;
use crate::middleware::rbac::RequireAuth;
use crate::query::{today, MonthParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /schedule`.
#[derive(Debug, Default, Deserialize)]
pub struct GridParams {
    #[serde(default)]
    pub view: TimeView,
    /// Anchor day; defaults to today.
    pub date: Option<Day>,
}

/// GET /api/v1/schedule
///
/// One row per visible consultant, one column per day of the zoom level,
/// each cell resolved to its allocations or a free marker.
pub async fn grid(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<GridParams>,
) -> AppResult<Json<DataResponse<GridView>>> {
    let viewer = user.viewer();
    let anchor = params.date.unwrap_or_else(today);
    let columns = calendar::time_columns(params.view, anchor);
    let filter = AllocationFilter {
        from: columns.first().copied(),
        to: columns.last().copied(),
        ..Default::default()
    };

    let (profiles, rows, projects) = tokio::try_join!(
        scope::visible_profiles(&state, &viewer),
        scope::visible_allocations(&state, &viewer, &filter),
        async { ProjectRepo::list(&state.pool).await.map_err(AppError::from) },
    )?;

    let allocations: Vec<_> = rows.iter().map(|r| r.to_allocation()).collect();
    let consultants = profiles.iter().map(Profile::as_grid_consultant).collect();
    let view = build_grid(
        params.view,
        anchor,
        consultants,
        &allocations,
        &scope::project_names(&projects),
    );

    Ok(Json(DataResponse { data: view }))
}

/// GET /api/v1/schedule/availability
pub async fn availability_overview(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<MonthParams>,
) -> AppResult<Json<DataResponse<AvailabilityOverview>>> {
    let viewer = user.viewer();
    let month = params.resolve(today())?;
    let filter = AllocationFilter {
        from: Some(calendar::month_start(month)),
        to: Some(calendar::month_end(month)),
        ..Default::default()
    };

    let (profiles, rows, projects) = tokio::try_join!(
        scope::visible_profiles(&state, &viewer),
        scope::visible_allocations(&state, &viewer, &filter),
        async { ProjectRepo::list(&state.pool).await.map_err(AppError::from) },
    )?;

    let allocations: Vec<_> = rows.iter().map(|r| r.to_allocation()).collect();
    let consultants: Vec<_> = profiles.iter().map(Profile::as_grid_consultant).collect();
    let overview = availability(
        month,
        &consultants,
        &allocations,
        &scope::project_names(&projects),
    );

    Ok(Json(DataResponse { data: overview }))
}
