//! Requests rejected before any database access: authentication, role
//! checks and input validation. These run against a pool that never
//! connects.

mod common;

use agendas_core::roles::Role;
use axum::http::StatusCode;
use common::{body_json, get, get_auth, lazy_pool, post_json_auth, token_for};
use serde_json::json;

#[tokio::test]
async fn missing_token_is_401() {
    let app = common::build_test_app(lazy_pool());
    let response = get(app, "/api/v1/allocations").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn garbage_token_is_401() {
    let app = common::build_test_app(lazy_pool());
    let response = get_auth(app, "/api/v1/schedule", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_echoes_the_token_session() {
    let app = common::build_test_app(lazy_pool());
    let token = token_for(5, Role::Manager, "Maria Souza");

    let response = get_auth(app, "/api/v1/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], 5);
    assert_eq!(json["data"]["role"], "GERENTE");
    assert_eq!(json["data"]["full_name"], "Maria Souza");
}

#[tokio::test]
async fn consultant_cannot_open_strategic_dashboard() {
    let app = common::build_test_app(lazy_pool());
    let token = token_for(3, Role::Consultant, "Ana");

    let response = get_auth(app, "/api/v1/dashboard/strategic", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn manager_cannot_create_allocations() {
    let app = common::build_test_app(lazy_pool());
    let token = token_for(5, Role::Manager, "Maria Souza");
    let body = json!({
        "consultant": { "existing": 1 },
        "project": { "existing": 2 },
        "start_date": "2024-03-10",
        "end_date": "2024-03-12",
    });

    let response = post_json_auth(app, "/api/v1/allocations/range", &token, body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn consultant_cannot_resolve_requests() {
    let app = common::build_test_app(lazy_pool());
    let token = token_for(3, Role::Consultant, "Ana");
    let body = json!({ "decision": "approved" });

    let response = post_json_auth(app, "/api/v1/change-requests/1/resolve", &token, body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn inverted_range_is_rejected_before_any_write() {
    let app = common::build_test_app(lazy_pool());
    let token = token_for(1, Role::Admin, "Admin");
    let body = json!({
        "consultant": { "existing": 1 },
        "project": { "new": { "name": "Projeto X" } },
        "start_date": "2024-03-12",
        "end_date": "2024-03-10",
    });

    let response = post_json_auth(app, "/api/v1/allocations/range", &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn blank_reason_is_rejected_before_any_write() {
    let app = common::build_test_app(lazy_pool());
    let token = token_for(3, Role::Consultant, "Ana");
    let body = json!({
        "request_type": "cancel",
        "allocation_id": 10,
        "reason": "   ",
    });

    let response = post_json_auth(app, "/api/v1/change-requests", &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn new_agenda_without_project_is_rejected() {
    let app = common::build_test_app(lazy_pool());
    let token = token_for(3, Role::Consultant, "Ana");
    let body = json!({
        "request_type": "new_agenda",
        "reason": "Implantação do módulo",
        "suggested_start_date": "2024-04-01",
        "suggested_days": 3,
    });

    let response = post_json_auth(app, "/api/v1/change-requests", &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_month_is_rejected() {
    let app = common::build_test_app(lazy_pool());
    let token = token_for(1, Role::Admin, "Admin");

    let response = get_auth(app, "/api/v1/dashboard/strategic?month=03-2024", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
