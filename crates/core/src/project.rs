//! Project status, client-name normalization, and classification.
//!
//! The classification (`Particular` / `MV`) is a pure function of the
//! normalized client name and is never stored.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Label rendered for a project reference that no longer resolves.
pub const UNKNOWN_PROJECT_LABEL: &str = "Desconhecido";

/// Default client label when a project has no client.
pub const UNKNOWN_CLIENT_LABEL: &str = "Não informado";

/// Default UI color class for new projects.
pub const DEFAULT_PROJECT_COLOR: &str = "bg-primary-100 text-primary-700 border-primary-200";

/// Clients whose projects are classified as `Particular`.
pub const PARTICULAR_CLIENTS: &[&str] = &["UNIMED ARARAS", "ESSELENSE", "SC RIBEIRAO PRETO"];

/// Known aliases of client names, keyed by the upper-cased raw value.
const CLIENT_ALIASES: &[(&str, &str)] = &[
    ("ARARAS", "UNIMED ARARAS"),
    ("UNIMED ARARAS / ESSELENSE", "ESSELENSE"),
    ("ESSELENSE / UNIMED ARARAS", "ESSELENSE"),
    ("UNIMED ARARAS / SC RIBEIRAO PRETO", "SC RIBEIRAO PRETO"),
    ("SC RIBEIRAO PRETO / UNIMED ARARAS", "SC RIBEIRAO PRETO"),
];

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Derived project classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectKind {
    Particular,
    #[serde(rename = "MV")]
    Mv,
}

/// Normalize a raw client name through the alias table.
///
/// Unknown names are returned trimmed, with their original casing.
pub fn normalize_client(raw: &str) -> String {
    let trimmed = raw.trim();
    let upper = trimmed.to_uppercase();
    CLIENT_ALIASES
        .iter()
        .find(|(alias, _)| *alias == upper)
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

/// Classify a project by its (raw or normalized) client name.
pub fn classify_client(client: &str) -> ProjectKind {
    let normalized = normalize_client(client).to_uppercase();
    if PARTICULAR_CLIENTS.contains(&normalized.as_str()) {
        ProjectKind::Particular
    } else {
        ProjectKind::Mv
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planning,
    #[default]
    InProgress,
    Critical,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Planning => "planning",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Critical => "critical",
            ProjectStatus::Completed => "completed",
        }
    }

    /// Portuguese display label.
    pub fn label(self) -> &'static str {
        match self {
            ProjectStatus::Planning => "Em Planejamento",
            ProjectStatus::InProgress => "Em Andamento",
            ProjectStatus::Critical => "Crítico",
            ProjectStatus::Completed => "Concluído",
        }
    }

    /// Whether the project belongs on the "active" tab.
    pub fn is_active(self) -> bool {
        self != ProjectStatus::Completed
    }
}

impl FromStr for ProjectStatus {
    type Err = CoreError;

    /// Accepts the stored code or the Portuguese display label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let all = [
            ProjectStatus::Planning,
            ProjectStatus::InProgress,
            ProjectStatus::Critical,
            ProjectStatus::Completed,
        ];
        all.into_iter()
            .find(|st| st.as_str() == s || st.label() == s)
            .ok_or_else(|| CoreError::validation(format!("Invalid project status '{s}'")))
    }
}

/// Project list tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectTab {
    All,
    #[default]
    Active,
    Archived,
}

impl ProjectTab {
    pub fn includes(self, status: ProjectStatus) -> bool {
        match self {
            ProjectTab::All => true,
            ProjectTab::Active => status.is_active(),
            ProjectTab::Archived => !status.is_active(),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a project name (required, non-blank).
pub fn validate_project_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::validation("Project name is required"));
    }
    Ok(())
}

/// Validate a progress percentage (0 through 100).
pub fn validate_progress(progress: i32) -> Result<(), CoreError> {
    if !(0..=100).contains(&progress) {
        return Err(CoreError::validation(format!(
            "Progress must be between 0 and 100, got {progress}"
        )));
    }
    Ok(())
}

/// Case-insensitive substring search over project name and client.
pub fn matches_search(name: &str, client: &str, query: &str) -> bool {
    let q = query.trim().to_lowercase();
    q.is_empty() || name.to_lowercase().contains(&q) || client.to_lowercase().contains(&q)
}
