//! The startup administrator seed.

mod common;

use agendas_api::bootstrap::ensure_admin;
use agendas_api::config::BootstrapAdmin;
use agendas_db::repositories::ProfileRepo;
use axum::http::StatusCode;
use common::{body_json, post_json};
use serde_json::json;
use sqlx::PgPool;

fn admin() -> BootstrapAdmin {
    BootstrapAdmin::from_parts(
        Some("root@example.com".to_string()),
        Some("primeira-senha".to_string()),
        Some("Root".to_string()),
    )
    .unwrap()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn seeded_admin_can_log_in(pool: PgPool) {
    let id = ensure_admin(&pool, &admin()).await.unwrap().unwrap();

    let app = common::build_test_app(pool);
    let body = json!({ "email": "root@example.com", "password": "primeira-senha" });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["user"]["id"], id);
    assert_eq!(json["data"]["user"]["role"], "ADM");
    assert_eq!(json["data"]["user"]["full_name"], "Root");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn seed_runs_once(pool: PgPool) {
    assert!(ensure_admin(&pool, &admin()).await.unwrap().is_some());
    assert!(ensure_admin(&pool, &admin()).await.unwrap().is_none());
    assert_eq!(ProfileRepo::list(&pool).await.unwrap().len(), 1);
}
