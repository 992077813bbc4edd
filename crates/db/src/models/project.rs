//! Project entity model and DTOs.

use agendas_core::project::{classify_client, ProjectKind, ProjectStatus, UNKNOWN_CLIENT_LABEL};
use agendas_core::types::{DbId, Day, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub name: String,
    pub client_name: Option<String>,
    pub manager: Option<String>,
    /// Stored code, see [`ProjectStatus::as_str`].
    pub status: String,
    pub deadline: Option<Day>,
    pub progress: i32,
    pub color: String,
    pub is_private: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    /// Parsed status. Unknown stored values read as the default status.
    pub fn status(&self) -> ProjectStatus {
        self.status.parse().unwrap_or_default()
    }

    pub fn kind(&self) -> ProjectKind {
        classify_client(self.client_name.as_deref().unwrap_or_default())
    }
}

/// A project as returned by the API, with its derived fields.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: Project,
    pub kind: ProjectKind,
    pub status_label: &'static str,
    pub client_label: String,
}

impl From<Project> for ProjectView {
    fn from(project: Project) -> Self {
        let kind = project.kind();
        let status_label = project.status().label();
        let client_label = project
            .client_name
            .clone()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_CLIENT_LABEL.to_string());
        Self {
            project,
            kind,
            status_label,
            client_label,
        }
    }
}

/// DTO for creating a project.
///
/// `client` is accepted as an alias of `client_name`; the value is run
/// through the client alias table before it is stored.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub name: String,
    #[serde(alias = "client")]
    pub client_name: Option<String>,
    pub manager: Option<String>,
    /// Defaults to `in_progress`.
    pub status: Option<ProjectStatus>,
    pub deadline: Option<Day>,
    pub progress: Option<i32>,
    pub color: Option<String>,
    #[serde(default)]
    pub is_private: bool,
}

/// DTO for updating a project. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProject {
    pub name: Option<String>,
    #[serde(alias = "client")]
    pub client_name: Option<String>,
    pub manager: Option<String>,
    pub status: Option<ProjectStatus>,
    pub deadline: Option<Day>,
    pub progress: Option<i32>,
    pub color: Option<String>,
    pub is_private: Option<bool>,
}
