//! Integration tests for the change-request approval transaction.

use agendas_core::allocation::{expand_range, EntityRef};
use agendas_core::change_request::{approval_effect, ApprovalEffect, RequestStatus, RequestType};
use agendas_core::roles::Role;
use agendas_core::types::{DbId, Day};
use agendas_db::models::change_request::CreateChangeRequest;
use agendas_db::models::profile::CreateProfile;
use agendas_db::models::project::CreateProject;
use agendas_db::repositories::{AllocationRepo, ChangeRequestRepo, ProfileRepo, ProjectRepo};
use chrono::NaiveDate;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn d(y: i32, m: u32, day: u32) -> Day {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

struct Seed {
    admin_id: DbId,
    consultant_id: DbId,
    project_id: DbId,
    allocation_id: DbId,
}

async fn seed(pool: &PgPool) -> Seed {
    let admin = ProfileRepo::create(
        pool,
        &CreateProfile {
            full_name: "Admin".to_string(),
            email: "admin@example.com".to_string(),
            role: Role::Admin,
            password_hash: None,
        },
    )
    .await
    .unwrap();
    let consultant = ProfileRepo::create(
        pool,
        &CreateProfile {
            full_name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            role: Role::Consultant,
            password_hash: None,
        },
    )
    .await
    .unwrap();
    let project = ProjectRepo::create(
        pool,
        &CreateProject {
            name: "PEP".to_string(),
            client_name: None,
            manager: Some("Maria".to_string()),
            status: None,
            deadline: None,
            progress: None,
            color: None,
            is_private: false,
        },
    )
    .await
    .unwrap();
    let days = expand_range(d(2024, 3, 10), d(2024, 3, 10), Some("OS-9"), Some("Maria")).unwrap();
    let created = AllocationRepo::create_range(
        pool,
        &EntityRef::Existing(consultant.id),
        &EntityRef::Existing(project.id),
        &days,
    )
    .await
    .unwrap();
    Seed {
        admin_id: admin.id,
        consultant_id: consultant.id,
        project_id: project.id,
        allocation_id: created.rows[0].id,
    }
}

async fn submit(
    pool: &PgPool,
    seed: &Seed,
    request_type: RequestType,
    suggested_start_date: Option<Day>,
) -> DbId {
    ChangeRequestRepo::create(
        pool,
        &CreateChangeRequest {
            requester_id: seed.consultant_id,
            allocation_id: Some(seed.allocation_id),
            request_type,
            reason: "Cliente pediu".to_string(),
            suggested_start_date,
            suggested_days: None,
        },
    )
    .await
    .unwrap()
    .id
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn approving_cancel_deletes_allocation(pool: PgPool) {
    let seed = seed(&pool).await;
    let id = submit(&pool, &seed, RequestType::Cancel, None).await;
    assert_eq!(ChangeRequestRepo::count_pending(&pool).await.unwrap(), 1);

    let effect = approval_effect(RequestType::Cancel, Some(seed.allocation_id), None);
    let resolved = ChangeRequestRepo::resolve(
        &pool,
        id,
        RequestStatus::Approved,
        Some("ok"),
        seed.admin_id,
        effect,
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(resolved.status, "approved");
    assert_eq!(resolved.resolved_by, Some(seed.admin_id));
    assert!(resolved.resolved_at.is_some());
    // The returned row already reflects the deleted allocation.
    assert_eq!(resolved.allocation_id, None);

    assert!(AllocationRepo::find_by_id(&pool, seed.allocation_id)
        .await
        .unwrap()
        .is_none());
    // The request survives its allocation.
    let stored = ChangeRequestRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(stored.allocation_id, None);
    assert_eq!(ChangeRequestRepo::count_pending(&pool).await.unwrap(), 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn approving_reschedule_moves_only_the_date(pool: PgPool) {
    let seed = seed(&pool).await;
    let target = d(2024, 4, 1);
    let id = submit(&pool, &seed, RequestType::Reschedule, Some(target)).await;

    let effect = approval_effect(RequestType::Reschedule, Some(seed.allocation_id), Some(target));
    let resolved =
        ChangeRequestRepo::resolve(&pool, id, RequestStatus::Approved, None, seed.admin_id, effect)
            .await
            .unwrap()
            .unwrap();
    assert_eq!(resolved.allocation_id, Some(seed.allocation_id));

    let moved = AllocationRepo::find_by_id(&pool, seed.allocation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(moved.date, target);
    assert_eq!(moved.consultant_id, seed.consultant_id);
    assert_eq!(moved.project_id, seed.project_id);
    assert_eq!(moved.os.as_deref(), Some("OS-9"));
    assert_eq!(moved.manager.as_deref(), Some("Maria"));
}

#[sqlx::test(migrations = "./migrations")]
async fn rejection_leaves_allocation_untouched(pool: PgPool) {
    let seed = seed(&pool).await;
    let id = submit(&pool, &seed, RequestType::Cancel, None).await;

    let resolved = ChangeRequestRepo::resolve(
        &pool,
        id,
        RequestStatus::Rejected,
        Some("Sem substituto"),
        seed.admin_id,
        ApprovalEffect::None,
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(resolved.status, "rejected");
    assert_eq!(resolved.admin_response.as_deref(), Some("Sem substituto"));
    assert!(AllocationRepo::find_by_id(&pool, seed.allocation_id)
        .await
        .unwrap()
        .is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn resolved_request_cannot_be_resolved_again(pool: PgPool) {
    let seed = seed(&pool).await;
    let id = submit(&pool, &seed, RequestType::Reschedule, Some(d(2024, 3, 20))).await;

    ChangeRequestRepo::resolve(
        &pool,
        id,
        RequestStatus::Rejected,
        None,
        seed.admin_id,
        ApprovalEffect::None,
    )
    .await
    .unwrap()
    .unwrap();

    let effect = ApprovalEffect::MoveAllocation {
        allocation_id: seed.allocation_id,
        date: d(2024, 3, 20),
    };
    let second =
        ChangeRequestRepo::resolve(&pool, id, RequestStatus::Approved, None, seed.admin_id, effect)
            .await
            .unwrap();
    assert!(second.is_none());

    // The losing approval must not have moved the allocation.
    let allocation = AllocationRepo::find_by_id(&pool, seed.allocation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(allocation.date, d(2024, 3, 10));
    let stored = ChangeRequestRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(stored.status, "rejected");
}

#[sqlx::test(migrations = "./migrations")]
async fn detail_joins_requester_and_project(pool: PgPool) {
    let seed = seed(&pool).await;
    let id = submit(&pool, &seed, RequestType::Change, None).await;

    let detail = ChangeRequestRepo::find_detail(&pool, id).await.unwrap().unwrap();
    assert_eq!(detail.requester_name.as_deref(), Some("Ana"));
    assert_eq!(detail.project_name.as_deref(), Some("PEP"));
    assert_eq!(detail.project_manager.as_deref(), Some("Maria"));
    assert_eq!(detail.allocation_date, Some(d(2024, 3, 10)));

    let mine = ChangeRequestRepo::list_by_requester(&pool, seed.consultant_id)
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
    let pending = ChangeRequestRepo::list_detail(&pool, Some(RequestStatus::Pending))
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    let approved = ChangeRequestRepo::list_detail(&pool, Some(RequestStatus::Approved))
        .await
        .unwrap();
    assert!(approved.is_empty());
}
