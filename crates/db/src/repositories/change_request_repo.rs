//! Repository for the `change_requests` table.

use agendas_core::change_request::{ApprovalEffect, RequestStatus};
use agendas_core::types::DbId;
use sqlx::PgPool;

use crate::models::change_request::{ChangeRequest, ChangeRequestDetail, CreateChangeRequest};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, allocation_id, requester_id, request_type, reason, \
                       suggested_start_date, suggested_days, status, admin_response, \
                       resolved_by, resolved_at, created_at, updated_at";

/// Request joined with requester, allocation, consultant and project.
const DETAIL_SELECT: &str = "SELECT r.id, r.allocation_id, r.requester_id, r.request_type, r.reason,
        r.suggested_start_date, r.suggested_days, r.status, r.admin_response,
        r.resolved_by, r.resolved_at, r.created_at,
        req.full_name AS requester_name,
        a.date AS allocation_date,
        a.consultant_id,
        c.full_name AS consultant_name,
        a.project_id,
        p.name AS project_name,
        p.manager AS project_manager
    FROM change_requests r
    LEFT JOIN profiles req ON req.id = r.requester_id
    LEFT JOIN allocations a ON a.id = r.allocation_id
    LEFT JOIN profiles c ON c.id = a.consultant_id
    LEFT JOIN projects p ON p.id = a.project_id";

pub struct ChangeRequestRepo;

impl ChangeRequestRepo {
    /// Insert a new request in the `pending` state.
    pub async fn create(
        pool: &PgPool,
        input: &CreateChangeRequest,
    ) -> Result<ChangeRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO change_requests
                (allocation_id, requester_id, request_type, reason, suggested_start_date, suggested_days, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ChangeRequest>(&query)
            .bind(input.allocation_id)
            .bind(input.requester_id)
            .bind(input.request_type.as_str())
            .bind(&input.reason)
            .bind(input.suggested_start_date)
            .bind(input.suggested_days)
            .bind(RequestStatus::Pending.as_str())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ChangeRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM change_requests WHERE id = $1");
        sqlx::query_as::<_, ChangeRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_detail(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ChangeRequestDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE r.id = $1");
        sqlx::query_as::<_, ChangeRequestDetail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Every request, newest first. Optionally restricted to one status.
    pub async fn list_detail(
        pool: &PgPool,
        status: Option<RequestStatus>,
    ) -> Result<Vec<ChangeRequestDetail>, sqlx::Error> {
        let query = format!(
            "{DETAIL_SELECT}
             WHERE ($1::text IS NULL OR r.status = $1)
             ORDER BY r.created_at DESC, r.id DESC"
        );
        sqlx::query_as::<_, ChangeRequestDetail>(&query)
            .bind(status.map(RequestStatus::as_str))
            .fetch_all(pool)
            .await
    }

    /// Requests submitted by `requester_id`, newest first.
    pub async fn list_by_requester(
        pool: &PgPool,
        requester_id: DbId,
    ) -> Result<Vec<ChangeRequestDetail>, sqlx::Error> {
        let query = format!(
            "{DETAIL_SELECT} WHERE r.requester_id = $1 ORDER BY r.created_at DESC, r.id DESC"
        );
        sqlx::query_as::<_, ChangeRequestDetail>(&query)
            .bind(requester_id)
            .fetch_all(pool)
            .await
    }

    /// Requests targeting `allocation_id`, newest first.
    pub async fn list_by_allocation(
        pool: &PgPool,
        allocation_id: DbId,
    ) -> Result<Vec<ChangeRequestDetail>, sqlx::Error> {
        let query = format!(
            "{DETAIL_SELECT} WHERE r.allocation_id = $1 ORDER BY r.created_at DESC, r.id DESC"
        );
        sqlx::query_as::<_, ChangeRequestDetail>(&query)
            .bind(allocation_id)
            .fetch_all(pool)
            .await
    }

    pub async fn count_pending(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM change_requests WHERE status = $1")
                .bind(RequestStatus::Pending.as_str())
                .fetch_one(pool)
                .await?;
        Ok(count)
    }

    /// Resolve a pending request and apply its allocation side effect.
    ///
    /// The status update only matches rows still `pending`; when it matches
    /// nothing (already resolved, or lost a race) the transaction is dropped
    /// and `None` is returned. The status change and the side effect commit
    /// together or not at all.
    pub async fn resolve(
        pool: &PgPool,
        id: DbId,
        status: RequestStatus,
        admin_response: Option<&str>,
        resolved_by: DbId,
        effect: ApprovalEffect,
    ) -> Result<Option<ChangeRequest>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE change_requests SET
                status = $2,
                admin_response = $3,
                resolved_by = $4,
                resolved_at = NOW(),
                updated_at = NOW()
             WHERE id = $1 AND status = $5
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, ChangeRequest>(&query)
            .bind(id)
            .bind(status.as_str())
            .bind(admin_response)
            .bind(resolved_by)
            .bind(RequestStatus::Pending.as_str())
            .fetch_optional(&mut *tx)
            .await?;
        if updated.is_none() {
            return Ok(None);
        }

        match effect {
            ApprovalEffect::DeleteAllocation { allocation_id } => {
                sqlx::query("DELETE FROM allocations WHERE id = $1")
                    .bind(allocation_id)
                    .execute(&mut *tx)
                    .await?;
                tracing::debug!(request_id = id, allocation_id, "Allocation deleted by approval");
            }
            ApprovalEffect::MoveAllocation {
                allocation_id,
                date,
            } => {
                sqlx::query("UPDATE allocations SET date = $2, updated_at = NOW() WHERE id = $1")
                    .bind(allocation_id)
                    .bind(date)
                    .execute(&mut *tx)
                    .await?;
                tracing::debug!(request_id = id, allocation_id, %date, "Allocation moved by approval");
            }
            ApprovalEffect::None => {}
        }

        // Re-read after the effect: deleting the allocation nulls the
        // request's `allocation_id` through the foreign key.
        let query = format!("SELECT {COLUMNS} FROM change_requests WHERE id = $1");
        let resolved = sqlx::query_as::<_, ChangeRequest>(&query)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(resolved))
    }
}
