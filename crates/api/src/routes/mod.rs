pub mod allocations;
pub mod auth;
pub mod change_requests;
pub mod consultants;
pub mod dashboard;
pub mod health;
pub mod projects;
pub mod reports;
pub mod schedule;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/login                                   login (public)
/// /auth/me                                      current session
///
/// /consultants                                  visible consultants
/// /projects                                     list, create (admin)
/// /projects/{id}                                get, update (admin)
///
/// /schedule                                     grid
/// /schedule/availability                        monthly availability
///
/// /allocations                                  list
/// /allocations/range                            create range (admin)
/// /allocations/{id}                             get, update, delete (admin)
/// /allocations/{id}/date                        move (admin)
/// /allocations/{id}/logs                        logs of the allocation
/// /allocations/{id}/logs/{date}                 get-or-draft, save
/// /allocations/{id}/change-requests             requests on the allocation
///
/// /change-requests                              list + counts, submit
/// /change-requests/mine                         own requests
/// /change-requests/pending                      pending queue (admin)
/// /change-requests/{id}/resolve                 approve / reject (admin)
///
/// /dashboard/operational                        today, pending logs, alerts
/// /dashboard/strategic                          KPIs and charts (manager, admin)
///
/// /reports/logs                                 monthly log report
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/consultants", consultants::router())
        .nest("/projects", projects::router())
        .nest("/schedule", schedule::router())
        .nest("/allocations", allocations::router())
        .nest("/change-requests", change_requests::router())
        .nest("/dashboard", dashboard::router())
        .nest("/reports", reports::router())
}
