//! Daily log entity model and the monthly report row.

use agendas_core::analytics::{LogFact, ReportFact};
use agendas_core::daily_log::{LogDraft, LogStatus};
use agendas_core::types::{DbId, Day, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `project_daily_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DailyLog {
    pub id: DbId,
    pub allocation_id: DbId,
    pub date: Day,
    pub description: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl DailyLog {
    pub fn as_fact(&self) -> LogFact<'_> {
        LogFact {
            date: self.date,
            description: self.description.as_deref(),
        }
    }
}

impl From<DailyLog> for LogDraft {
    fn from(log: DailyLog) -> Self {
        let status = if log.status == LogStatus::Completed.as_str() {
            LogStatus::Completed
        } else {
            LogStatus::Pending
        };
        LogDraft {
            id: Some(log.id),
            allocation_id: log.allocation_id,
            date: log.date,
            description: log.description.unwrap_or_default(),
            status,
        }
    }
}

/// Request body for saving a log.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveDailyLog {
    #[serde(default)]
    pub description: String,
}

/// One line of the monthly log report.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LogReportRow {
    pub log_id: DbId,
    pub date: Day,
    pub description: Option<String>,
    pub status: String,
    pub allocation_id: DbId,
    pub os: Option<String>,
    pub manager: Option<String>,
    pub consultant_id: DbId,
    pub consultant_name: String,
    pub project_id: DbId,
    pub project_name: String,
    pub client_name: Option<String>,
    pub project_is_private: bool,
}

impl LogReportRow {
    pub fn as_fact(&self) -> ReportFact<'_> {
        ReportFact {
            consultant_id: self.consultant_id,
            project_name: &self.project_name,
            description: self.description.as_deref(),
        }
    }
}

/// Report filters. `None` means every consultant / project.
#[derive(Debug, Clone)]
pub struct LogReportFilter {
    pub from: Day,
    pub to: Day,
    pub consultant_id: Option<DbId>,
    pub project_id: Option<DbId>,
}
