//! Handlers for the `/projects` resource.

use agendas_core::project::{
    matches_search, validate_progress, validate_project_name, ProjectKind, ProjectTab,
};
use agendas_core::types::DbId;
use agendas_db::models::project::{CreateProject, ProjectView, UpdateProject};
use agendas_db::repositories::ProjectRepo;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /projects`.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectListParams {
    /// `Particular` or `MV`.
    pub tipo: Option<ProjectKind>,
    #[serde(default)]
    pub tab: ProjectTab,
    pub search: Option<String>,
}

/// GET /api/v1/projects
pub async fn list(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<ProjectListParams>,
) -> AppResult<Json<DataResponse<Vec<ProjectView>>>> {
    let viewer = user.viewer();
    let search = params.search.unwrap_or_default();

    let projects = ProjectRepo::list(&state.pool)
        .await?
        .into_iter()
        .filter(|p| viewer.can_view_project(p.is_private))
        .map(ProjectView::from)
        .filter(|v| params.tab.includes(v.project.status()))
        .filter(|v| params.tipo.map_or(true, |k| k == v.kind))
        .filter(|v| matches_search(&v.project.name, &v.client_label, &search))
        .collect();

    Ok(Json(DataResponse { data: projects }))
}

/// POST /api/v1/projects
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<DataResponse<ProjectView>>)> {
    validate_project_name(&input.name)?;
    if let Some(progress) = input.progress {
        validate_progress(progress)?;
    }

    let project = ProjectRepo::create(&state.pool, &input).await?;
    tracing::info!(user_id = admin.user_id, project_id = project.id, "Project created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ProjectView::from(project),
        }),
    ))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProjectView>>> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Project", id))?;
    if !user.viewer().can_view_project(project.is_private) {
        return Err(AppError::forbidden("Project is not visible to you"));
    }
    Ok(Json(DataResponse {
        data: ProjectView::from(project),
    }))
}

/// PATCH /api/v1/projects/{id}
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<DataResponse<ProjectView>>> {
    if let Some(name) = input.name.as_deref() {
        validate_project_name(name)?;
    }
    if let Some(progress) = input.progress {
        validate_progress(progress)?;
    }

    let project = ProjectRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Project", id))?;
    tracing::info!(user_id = admin.user_id, project_id = id, "Project updated");

    Ok(Json(DataResponse {
        data: ProjectView::from(project),
    }))
}
