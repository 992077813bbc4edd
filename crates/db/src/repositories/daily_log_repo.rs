//! Repository for the `project_daily_logs` table.

use agendas_core::daily_log::{plan_save, SaveAction};
use agendas_core::types::{DbId, Day};
use sqlx::PgPool;

use crate::models::daily_log::{DailyLog, LogReportFilter, LogReportRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, allocation_id, date, description, status, created_at, updated_at";

pub struct DailyLogRepo;

impl DailyLogRepo {
    /// The log stored for `(allocation_id, date)`, if any.
    pub async fn find(
        pool: &PgPool,
        allocation_id: DbId,
        date: Day,
    ) -> Result<Option<DailyLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM project_daily_logs WHERE allocation_id = $1 AND date = $2"
        );
        sqlx::query_as::<_, DailyLog>(&query)
            .bind(allocation_id)
            .bind(date)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_allocation(
        pool: &PgPool,
        allocation_id: DbId,
    ) -> Result<Vec<DailyLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM project_daily_logs WHERE allocation_id = $1 ORDER BY date"
        );
        sqlx::query_as::<_, DailyLog>(&query)
            .bind(allocation_id)
            .fetch_all(pool)
            .await
    }

    /// Logs dated in `[from, to]`, restricted to `allocation_ids`.
    pub async fn list_between(
        pool: &PgPool,
        from: Day,
        to: Day,
        allocation_ids: &[DbId],
    ) -> Result<Vec<DailyLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM project_daily_logs
             WHERE date BETWEEN $1 AND $2 AND allocation_id = ANY($3)
             ORDER BY date, id"
        );
        sqlx::query_as::<_, DailyLog>(&query)
            .bind(from)
            .bind(to)
            .bind(allocation_ids)
            .fetch_all(pool)
            .await
    }

    /// Ids of the allocations among `allocation_ids` that have a log on `date`.
    pub async fn logged_allocation_ids(
        pool: &PgPool,
        date: Day,
        allocation_ids: &[DbId],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT allocation_id FROM project_daily_logs
             WHERE date = $1 AND allocation_id = ANY($2)",
        )
        .bind(date)
        .bind(allocation_ids)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Save the text of the log for `(allocation_id, date)`.
    ///
    /// Returns `None` when nothing was persisted (blank text, no stored log).
    /// The insert path upserts on `(allocation_id, date)`, so two close saves
    /// for the same pair converge on one row.
    pub async fn save(
        pool: &PgPool,
        allocation_id: DbId,
        date: Day,
        text: &str,
    ) -> Result<Option<DailyLog>, sqlx::Error> {
        let existing = Self::find(pool, allocation_id, date).await?;

        match plan_save(existing.map(|l| l.id), text) {
            SaveAction::Skip => Ok(None),
            SaveAction::Update {
                log_id,
                description,
                status,
            } => {
                let query = format!(
                    "UPDATE project_daily_logs
                     SET description = $2, status = $3, updated_at = NOW()
                     WHERE id = $1
                     RETURNING {COLUMNS}"
                );
                sqlx::query_as::<_, DailyLog>(&query)
                    .bind(log_id)
                    .bind(description)
                    .bind(status.as_str())
                    .fetch_optional(pool)
                    .await
            }
            SaveAction::Insert {
                description,
                status,
            } => {
                let query = format!(
                    "INSERT INTO project_daily_logs (allocation_id, date, description, status)
                     VALUES ($1, $2, $3, $4)
                     ON CONFLICT (allocation_id, date) DO UPDATE
                        SET description = EXCLUDED.description,
                            status = EXCLUDED.status,
                            updated_at = NOW()
                     RETURNING {COLUMNS}"
                );
                sqlx::query_as::<_, DailyLog>(&query)
                    .bind(allocation_id)
                    .bind(date)
                    .bind(description)
                    .bind(status.as_str())
                    .fetch_one(pool)
                    .await
                    .map(Some)
            }
        }
    }

    /// Report lines for logs dated in the filter's range.
    pub async fn report(
        pool: &PgPool,
        filter: &LogReportFilter,
    ) -> Result<Vec<LogReportRow>, sqlx::Error> {
        sqlx::query_as::<_, LogReportRow>(
            "SELECT l.id AS log_id, l.date, l.description, l.status,
                    a.id AS allocation_id, a.os, a.manager,
                    c.id AS consultant_id, c.full_name AS consultant_name,
                    p.id AS project_id, p.name AS project_name, p.client_name,
                    p.is_private AS project_is_private
             FROM project_daily_logs l
             JOIN allocations a ON a.id = l.allocation_id
             JOIN profiles c ON c.id = a.consultant_id
             JOIN projects p ON p.id = a.project_id
             WHERE l.date BETWEEN $1 AND $2
               AND ($3::bigint IS NULL OR c.id = $3)
               AND ($4::bigint IS NULL OR p.id = $4)
             ORDER BY l.date, c.full_name, l.id",
        )
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.consultant_id)
        .bind(filter.project_id)
        .fetch_all(pool)
        .await
    }
}
