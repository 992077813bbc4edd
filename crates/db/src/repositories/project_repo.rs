//! Repository for the `projects` table.

use agendas_core::allocation::{clean_label, InlineProject};
use agendas_core::project::{normalize_client, ProjectStatus, DEFAULT_PROJECT_COLOR};
use agendas_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::project::{CreateProject, Project, UpdateProject};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, client_name, manager, status, deadline, progress, color, \
                       is_private, created_at, updated_at";

/// Trim, drop blanks and resolve aliases of a client name.
fn stored_client(raw: Option<&str>) -> Option<String> {
    clean_label(raw).map(|c| normalize_client(&c))
}

pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (name, client_name, manager, status, deadline, progress, color, is_private)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, 0), COALESCE($7, $8), $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(input.name.trim())
            .bind(stored_client(input.client_name.as_deref()))
            .bind(clean_label(input.manager.as_deref()))
            .bind(input.status.unwrap_or_default().as_str())
            .bind(input.deadline)
            .bind(input.progress)
            .bind(&input.color)
            .bind(DEFAULT_PROJECT_COLOR)
            .bind(input.is_private)
            .fetch_one(pool)
            .await
    }

    /// Insert a project created inline from the allocation form.
    pub async fn insert_inline(
        conn: &mut PgConnection,
        input: &InlineProject,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (name, status, color, is_private)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(input.name.trim())
            .bind(ProjectStatus::InProgress.as_str())
            .bind(DEFAULT_PROJECT_COLOR)
            .bind(input.is_private)
            .fetch_one(conn)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All projects ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects ORDER BY name, id");
        sqlx::query_as::<_, Project>(&query).fetch_all(pool).await
    }

    /// Update a project. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                name = COALESCE($2, name),
                client_name = COALESCE($3, client_name),
                manager = COALESCE($4, manager),
                status = COALESCE($5, status),
                deadline = COALESCE($6, deadline),
                progress = COALESCE($7, progress),
                color = COALESCE($8, color),
                is_private = COALESCE($9, is_private),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(stored_client(input.client_name.as_deref()))
            .bind(clean_label(input.manager.as_deref()))
            .bind(input.status.map(ProjectStatus::as_str))
            .bind(input.deadline)
            .bind(input.progress)
            .bind(&input.color)
            .bind(input.is_private)
            .fetch_optional(pool)
            .await
    }
}
