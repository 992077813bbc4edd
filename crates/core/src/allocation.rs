//! The allocation model: one consultant on one project for one calendar day.
//!
//! A multi-day assignment is stored as N independent rows sharing consultant,
//! project, work order and manager. Rows for the same `(consultant, date)`
//! pair are never deduplicated; they stack in the grid cell.

use serde::{Deserialize, Serialize};

use crate::calendar;
use crate::error::CoreError;
use crate::types::{DbId, Day};

/// In-memory allocation, the unit the grid and the analytics operate on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub id: DbId,
    pub consultant_id: DbId,
    pub project_id: DbId,
    pub date: Day,
    /// Work-order label.
    pub os: Option<String>,
    pub manager: Option<String>,
}

/// One row to insert, produced by [`expand_range`].
///
/// Consultant and project ids are bound at insert time, after any inline
/// entity creation has produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAllocationDay {
    pub date: Day,
    pub os: Option<String>,
    pub manager: Option<String>,
}

/// Reference to an existing entity, or a request to create it inline.
///
/// Replaces the `"new"` sentinel id: `New` carries the data needed to
/// create the entity before the allocation rows are built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityRef<T> {
    Existing(DbId),
    New(T),
}

/// Inline consultant creation payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineConsultant {
    pub full_name: String,
}

/// Inline project creation payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineProject {
    pub name: String,
    #[serde(default)]
    pub is_private: bool,
}

/// Turn an optional free-text label into `None` when blank, trimmed otherwise.
pub fn clean_label(label: Option<&str>) -> Option<String> {
    label
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Validate an inline-creation payload before any write.
pub fn validate_inline_consultant(input: &InlineConsultant) -> Result<(), CoreError> {
    if input.full_name.trim().is_empty() {
        return Err(CoreError::validation("New consultant name is required"));
    }
    Ok(())
}

/// Validate an inline-creation payload before any write.
pub fn validate_inline_project(input: &InlineProject) -> Result<(), CoreError> {
    if input.name.trim().is_empty() {
        return Err(CoreError::validation("New project name is required"));
    }
    Ok(())
}

/// Validate a `[start, end]` range: `end` must not precede `start`.
pub fn validate_range(start: Day, end: Day) -> Result<(), CoreError> {
    if end < start {
        return Err(CoreError::validation(format!(
            "End date {end} must not be before start date {start}"
        )));
    }
    Ok(())
}

/// Expand an inclusive date range into one allocation row per calendar day.
///
/// Weekends are included. Fails before producing anything when `end < start`.
pub fn expand_range(
    start: Day,
    end: Day,
    os: Option<&str>,
    manager: Option<&str>,
) -> Result<Vec<NewAllocationDay>, CoreError> {
    validate_range(start, end)?;
    let os = clean_label(os);
    let manager = clean_label(manager);
    Ok(calendar::days_inclusive(start, end)
        .into_iter()
        .map(|date| NewAllocationDay {
            date,
            os: os.clone(),
            manager: manager.clone(),
        })
        .collect())
}

/// Apply a date move to a local copy, returning whether a row was touched.
pub fn apply_move(allocations: &mut [Allocation], allocation_id: DbId, target: Day) -> bool {
    match allocations.iter_mut().find(|a| a.id == allocation_id) {
        Some(a) => {
            a.date = target;
            true
        }
        None => false,
    }
}
