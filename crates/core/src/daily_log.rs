//! Daily activity logs: at most one note per `(allocation, date)`.
//!
//! Completion rule: a log is completed iff its description contains
//! non-whitespace text. The stored status is always written from this rule
//! (see [`status_for`]) so readers may use either and get the same answer.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Day};

pub const LOG_STATUS_PENDING: &str = "pending";
pub const LOG_STATUS_COMPLETED: &str = "completed";

/// Completion status of a daily log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
    Pending,
    Completed,
}

impl LogStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LogStatus::Pending => LOG_STATUS_PENDING,
            LogStatus::Completed => LOG_STATUS_COMPLETED,
        }
    }
}

/// The canonical completion rule.
pub fn is_completed(description: Option<&str>) -> bool {
    description.is_some_and(|d| !d.trim().is_empty())
}

/// Status to persist alongside `description`.
pub fn status_for(description: Option<&str>) -> LogStatus {
    if is_completed(description) {
        LogStatus::Completed
    } else {
        LogStatus::Pending
    }
}

/// Filter on completion used by reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionFilter {
    #[default]
    All,
    Completed,
    Pending,
}

impl CompletionFilter {
    pub fn accepts(self, description: Option<&str>) -> bool {
        match self {
            CompletionFilter::All => true,
            CompletionFilter::Completed => is_completed(description),
            CompletionFilter::Pending => !is_completed(description),
        }
    }
}

// ---------------------------------------------------------------------------
// Read side
// ---------------------------------------------------------------------------

/// A log as shown to the editor: either the stored row or an empty draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogDraft {
    /// `None` until the first non-empty save creates the row.
    pub id: Option<DbId>,
    pub allocation_id: DbId,
    pub date: Day,
    pub description: String,
    pub status: LogStatus,
}

impl LogDraft {
    /// The implicit empty draft for a pair with no stored log.
    pub fn empty(allocation_id: DbId, date: Day) -> Self {
        Self {
            id: None,
            allocation_id,
            date,
            description: String::new(),
            status: LogStatus::Pending,
        }
    }
}

// ---------------------------------------------------------------------------
// Write side
// ---------------------------------------------------------------------------

/// What a save must do to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveAction {
    /// Overwrite the description of the existing row.
    Update { log_id: DbId, description: String, status: LogStatus },
    /// Insert a new row.
    Insert { description: String, status: LogStatus },
    /// Nothing to persist: empty text and no existing row.
    Skip,
}

/// Decide the save action for `text` given the existing log id, if any.
///
/// Both the on-blur and the explicit save paths go through this function.
pub fn plan_save(existing_log_id: Option<DbId>, text: &str) -> SaveAction {
    let status = status_for(Some(text));
    match existing_log_id {
        Some(log_id) => SaveAction::Update {
            log_id,
            description: text.to_string(),
            status,
        },
        None if text.trim().is_empty() => SaveAction::Skip,
        None => SaveAction::Insert {
            description: text.to_string(),
            status,
        },
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn completion_requires_non_blank_text() {
        assert!(is_completed(Some("Treinamento da equipe")));
        assert!(!is_completed(Some("   \n")));
        assert!(!is_completed(Some("")));
        assert!(!is_completed(None));
    }

    #[test]
    fn status_follows_completion_rule() {
        assert_eq!(status_for(Some("ok")), LogStatus::Completed);
        assert_eq!(status_for(Some(" ")), LogStatus::Pending);
        assert_eq!(status_for(None), LogStatus::Pending);
    }

    #[test]
    fn empty_text_without_log_is_a_no_op() {
        assert_eq!(plan_save(None, ""), SaveAction::Skip);
        assert_eq!(plan_save(None, "   "), SaveAction::Skip);
    }

    #[test]
    fn non_empty_text_without_log_inserts_completed() {
        assert_matches!(
            plan_save(None, "Instalação"),
            SaveAction::Insert { ref description, status: LogStatus::Completed } if description == "Instalação"
        );
    }

    #[test]
    fn existing_log_is_updated_even_when_cleared() {
        assert_matches!(
            plan_save(Some(4), ""),
            SaveAction::Update { log_id: 4, status: LogStatus::Pending, .. }
        );
        assert_matches!(
            plan_save(Some(4), "novo texto"),
            SaveAction::Update { log_id: 4, status: LogStatus::Completed, .. }
        );
    }

    #[test]
    fn empty_draft_is_pending_without_id() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let draft = LogDraft::empty(3, date);
        assert_eq!(draft.id, None);
        assert_eq!(draft.description, "");
        assert_eq!(draft.status, LogStatus::Pending);
    }

    #[test]
    fn completion_filter() {
        assert!(CompletionFilter::All.accepts(None));
        assert!(CompletionFilter::Completed.accepts(Some("x")));
        assert!(!CompletionFilter::Completed.accepts(Some(" ")));
        assert!(CompletionFilter::Pending.accepts(None));
    }
}
