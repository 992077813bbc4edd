//! Repository for the `allocations` table.

use agendas_core::allocation::{
    clean_label, EntityRef, InlineConsultant, InlineProject, NewAllocationDay,
};
use agendas_core::types::{DbId, Day};
use serde::Serialize;
use sqlx::{PgConnection, PgPool};

use crate::models::allocation::{
    AllocationDetail, AllocationFilter, AllocationRow, UpdateAllocation,
};
use crate::repositories::{ProfileRepo, ProjectRepo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, consultant_id, project_id, date, os, manager, created_at, updated_at";

/// Allocation joined with consultant and project; dangling ids read as NULL.
const DETAIL_SELECT: &str = "SELECT a.id, a.consultant_id, a.project_id, a.date, a.os, a.manager,
        c.full_name AS consultant_name,
        p.name AS project_name,
        p.color AS project_color,
        p.manager AS project_manager,
        COALESCE(p.is_private, FALSE) AS project_is_private
    FROM allocations a
    LEFT JOIN profiles c ON c.id = a.consultant_id
    LEFT JOIN projects p ON p.id = a.project_id";

/// Result of a range insert.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedRange {
    pub consultant_id: DbId,
    pub project_id: DbId,
    pub consultant_created: bool,
    pub project_created: bool,
    pub rows: Vec<AllocationRow>,
}

pub struct AllocationRepo;

impl AllocationRepo {
    /// Insert one allocation per planned day, creating the consultant and/or
    /// project first when they are inline payloads.
    ///
    /// The days go in as a single batched insert. Everything runs in one
    /// transaction: either every row (and inline entity) is stored or none is.
    pub async fn create_range(
        pool: &PgPool,
        consultant: &EntityRef<InlineConsultant>,
        project: &EntityRef<InlineProject>,
        days: &[NewAllocationDay],
    ) -> Result<CreatedRange, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let (consultant_id, consultant_created) = match consultant {
            EntityRef::Existing(id) => (*id, false),
            EntityRef::New(inline) => {
                let profile = ProfileRepo::insert_inline_consultant(&mut *tx, &inline.full_name).await?;
                tracing::debug!(consultant_id = profile.id, "Inline consultant created");
                (profile.id, true)
            }
        };

        let (project_id, project_created) = match project {
            EntityRef::Existing(id) => (*id, false),
            EntityRef::New(inline) => {
                let created = ProjectRepo::insert_inline(&mut *tx, inline).await?;
                tracing::debug!(project_id = created.id, "Inline project created");
                (created.id, true)
            }
        };

        let rows = Self::insert_days(&mut *tx, consultant_id, project_id, days).await?;

        tx.commit().await?;
        Ok(CreatedRange {
            consultant_id,
            project_id,
            consultant_created,
            project_created,
            rows,
        })
    }

    /// Batch-insert the planned days in one statement.
    async fn insert_days(
        conn: &mut PgConnection,
        consultant_id: DbId,
        project_id: DbId,
        days: &[NewAllocationDay],
    ) -> Result<Vec<AllocationRow>, sqlx::Error> {
        if days.is_empty() {
            return Ok(vec![]);
        }

        let dates: Vec<Day> = days.iter().map(|d| d.date).collect();
        let work_orders: Vec<Option<String>> = days.iter().map(|d| d.os.clone()).collect();
        let managers: Vec<Option<String>> = days.iter().map(|d| d.manager.clone()).collect();

        let query = format!(
            "INSERT INTO allocations (consultant_id, project_id, date, os, manager) \
             SELECT $1, $2, t.date, t.os, t.manager \
             FROM UNNEST($3::date[], $4::text[], $5::text[]) AS t(date, os, manager) \
             RETURNING {COLUMNS}"
        );
        let mut rows = sqlx::query_as::<_, AllocationRow>(&query)
            .bind(consultant_id)
            .bind(project_id)
            .bind(&dates)
            .bind(&work_orders)
            .bind(&managers)
            .fetch_all(conn)
            .await?;
        rows.sort_by_key(|r| (r.date, r.id));
        Ok(rows)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<AllocationRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM allocations WHERE id = $1");
        sqlx::query_as::<_, AllocationRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_detail(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AllocationDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE a.id = $1");
        sqlx::query_as::<_, AllocationDetail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Joined allocations matching `filter`, ordered by date then id.
    pub async fn list_detail(
        pool: &PgPool,
        filter: &AllocationFilter,
    ) -> Result<Vec<AllocationDetail>, sqlx::Error> {
        let query = format!(
            "{DETAIL_SELECT}
             WHERE ($1::date IS NULL OR a.date >= $1)
               AND ($2::date IS NULL OR a.date <= $2)
               AND ($3::bigint IS NULL OR a.consultant_id = $3)
               AND ($4::bigint IS NULL OR a.project_id = $4)
             ORDER BY a.date, a.id"
        );
        sqlx::query_as::<_, AllocationDetail>(&query)
            .bind(filter.from)
            .bind(filter.to)
            .bind(filter.consultant_id)
            .bind(filter.project_id)
            .fetch_all(pool)
            .await
    }

    /// Edit project, work order and manager. Returns `None` if the row is gone.
    ///
    /// Absent fields are left untouched. A present label is trimmed, and a
    /// blank one clears the column, matching what range creation stores.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAllocation,
    ) -> Result<Option<AllocationRow>, sqlx::Error> {
        let query = format!(
            "UPDATE allocations SET
                project_id = COALESCE($2, project_id),
                os = CASE WHEN $3 THEN $4 ELSE os END,
                manager = CASE WHEN $5 THEN $6 ELSE manager END,
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AllocationRow>(&query)
            .bind(id)
            .bind(input.project_id)
            .bind(input.os.is_some())
            .bind(clean_label(input.os.as_deref()))
            .bind(input.manager.is_some())
            .bind(clean_label(input.manager.as_deref()))
            .fetch_optional(pool)
            .await
    }

    /// Move an allocation to `date`. Returns `None` if the row is gone.
    pub async fn move_date(
        pool: &PgPool,
        id: DbId,
        date: Day,
    ) -> Result<Option<AllocationRow>, sqlx::Error> {
        let query = format!(
            "UPDATE allocations SET date = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AllocationRow>(&query)
            .bind(id)
            .bind(date)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete an allocation. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM allocations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Distinct project ids a consultant has ever been allocated to.
    pub async fn project_ids_for_consultant(
        pool: &PgPool,
        consultant_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT DISTINCT project_id FROM allocations WHERE consultant_id = $1",
        )
        .bind(consultant_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
