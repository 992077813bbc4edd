//! Visibility-scoped reads shared by several handlers.
//!
//! Every list a viewer receives passes through one of these functions, so
//! the role rules and the hidden-profile list are applied in one place.

use std::collections::HashMap;

use agendas_core::roles::{Role, Viewer};
use agendas_core::schedule::GridConsultant;
use agendas_core::types::DbId;
use agendas_db::models::allocation::{AllocationDetail, AllocationFilter};
use agendas_db::models::profile::Profile;
use agendas_db::models::project::Project;
use agendas_db::repositories::{AllocationRepo, ProfileRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Profiles the viewer may see, hidden e-mails removed, ordered by name.
pub async fn visible_profiles(state: &AppState, viewer: &Viewer) -> AppResult<Vec<Profile>> {
    let profiles = ProfileRepo::list(&state.pool).await?;
    Ok(profiles
        .into_iter()
        .filter(|p| !state.is_hidden(&p.email) && viewer.can_view_consultant(p.id))
        .collect())
}

/// Active, non-hidden profiles. This is the capacity denominator and does
/// not depend on the viewer.
pub async fn active_consultants(state: &AppState) -> AppResult<Vec<GridConsultant>> {
    let profiles = ProfileRepo::list_active(&state.pool).await?;
    Ok(profiles
        .iter()
        .filter(|p| !state.is_hidden(&p.email))
        .map(Profile::as_grid_consultant)
        .collect())
}

/// Joined allocations matching `filter` that the viewer may see.
///
/// Consultants are pinned to their own rows regardless of the filter.
pub async fn visible_allocations(
    state: &AppState,
    viewer: &Viewer,
    filter: &AllocationFilter,
) -> AppResult<Vec<AllocationDetail>> {
    let mut filter = filter.clone();
    if viewer.role == Role::Consultant {
        filter.consultant_id = Some(viewer.user_id);
    }
    let rows = AllocationRepo::list_detail(&state.pool, &filter).await?;
    Ok(retain_visible(viewer, rows))
}

pub fn retain_visible(viewer: &Viewer, rows: Vec<AllocationDetail>) -> Vec<AllocationDetail> {
    rows.into_iter()
        .filter(|a| viewer.can_view_allocation(a.consultant_id, a.project_is_private))
        .collect()
}

/// Load one allocation, failing with 404 when missing and 403 when hidden
/// from the viewer.
pub async fn visible_allocation(
    state: &AppState,
    viewer: &Viewer,
    id: DbId,
) -> AppResult<AllocationDetail> {
    let allocation = AllocationRepo::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Allocation", id))?;
    if !viewer.can_view_allocation(allocation.consultant_id, allocation.project_is_private) {
        return Err(AppError::forbidden("Allocation is not visible to you"));
    }
    Ok(allocation)
}

/// Project id to display name.
pub fn project_names(projects: &[Project]) -> HashMap<DbId, String> {
    projects.iter().map(|p| (p.id, p.name.clone())).collect()
}
