//! Change request entity model and DTOs.

use agendas_core::change_request::{
    parse_new_agenda_reason, Decision, NewAgendaReason, RequestFacts, RequestStatus, RequestType,
};
use agendas_core::types::{DbId, Day, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `change_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChangeRequest {
    pub id: DbId,
    pub allocation_id: Option<DbId>,
    pub requester_id: DbId,
    pub request_type: String,
    pub reason: String,
    pub suggested_start_date: Option<Day>,
    pub suggested_days: Option<i32>,
    pub status: String,
    pub admin_response: Option<String>,
    pub resolved_by: Option<DbId>,
    pub resolved_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ChangeRequest {
    pub fn request_type(&self) -> Result<RequestType, agendas_core::error::CoreError> {
        self.request_type.parse()
    }

    pub fn status(&self) -> Result<RequestStatus, agendas_core::error::CoreError> {
        self.status.parse()
    }
}

/// A change request joined with its requester and target allocation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChangeRequestDetail {
    pub id: DbId,
    pub allocation_id: Option<DbId>,
    pub requester_id: DbId,
    pub request_type: String,
    pub reason: String,
    pub suggested_start_date: Option<Day>,
    pub suggested_days: Option<i32>,
    pub status: String,
    pub admin_response: Option<String>,
    pub resolved_by: Option<DbId>,
    pub resolved_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub requester_name: Option<String>,
    pub allocation_date: Option<Day>,
    pub consultant_id: Option<DbId>,
    pub consultant_name: Option<String>,
    pub project_id: Option<DbId>,
    pub project_name: Option<String>,
    pub project_manager: Option<String>,
}

impl ChangeRequestDetail {
    /// Filter view of this row. Unknown stored enum strings yield `None`.
    pub fn facts(&self) -> Option<RequestFacts<'_>> {
        Some(RequestFacts {
            status: self.status.parse().ok()?,
            request_type: self.request_type.parse().ok()?,
            created_on: self.created_at.date_naive(),
            requester_name: self.requester_name.as_deref(),
            project_name: self.project_name.as_deref(),
            reason: &self.reason,
        })
    }

    /// Project name and description packed in a `new_agenda` reason.
    pub fn new_agenda(&self) -> Option<NewAgendaReason> {
        (self.request_type == RequestType::NewAgenda.as_str())
            .then(|| parse_new_agenda_reason(&self.reason))
    }
}

/// DTO for inserting a validated submission.
#[derive(Debug, Clone)]
pub struct CreateChangeRequest {
    pub requester_id: DbId,
    pub allocation_id: Option<DbId>,
    pub request_type: RequestType,
    pub reason: String,
    pub suggested_start_date: Option<Day>,
    pub suggested_days: Option<i32>,
}

/// Request body for `POST /change-requests/{id}/resolve`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolveChangeRequest {
    pub decision: Decision,
    pub admin_response: Option<String>,
}
