//! Change-request workflow: submission rules, the approval state machine,
//! and the allocation side effect an approval triggers.
//!
//! ```text
//! pending ──approve──▶ approved   (terminal)
//!    └─────reject───▶ rejected   (terminal)
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Day};

/// Prefix of the first line of a `new_agenda` reason.
pub const NEW_AGENDA_PROJECT_PREFIX: &str = "Projeto:";

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    Change,
    Cancel,
    Reschedule,
    NewAgenda,
}

impl RequestType {
    pub const ALL: [RequestType; 4] = [
        RequestType::Change,
        RequestType::Cancel,
        RequestType::Reschedule,
        RequestType::NewAgenda,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RequestType::Change => "change",
            RequestType::Cancel => "cancel",
            RequestType::Reschedule => "reschedule",
            RequestType::NewAgenda => "new_agenda",
        }
    }

    /// Portuguese display label.
    pub fn label(self) -> &'static str {
        match self {
            RequestType::Change => "Alteração",
            RequestType::Cancel => "Cancelamento",
            RequestType::Reschedule => "Reagendamento",
            RequestType::NewAgenda => "+ Nova Agenda",
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::validation(format!("Invalid request type '{s}'")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        self != RequestStatus::Pending
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            other => Err(CoreError::validation(format!("Invalid request status '{other}'"))),
        }
    }
}

/// An administrator's resolution decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub fn target_status(self) -> RequestStatus {
        match self {
            Decision::Approved => RequestStatus::Approved,
            Decision::Rejected => RequestStatus::Rejected,
        }
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Only a pending request can be resolved.
pub fn validate_transition(current: RequestStatus, decision: Decision) -> Result<(), CoreError> {
    if current.is_terminal() {
        return Err(CoreError::Conflict(format!(
            "Change request is already {current}; cannot mark it {}",
            decision.target_status()
        )));
    }
    Ok(())
}

/// Mutation an approval applies to the target allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalEffect {
    DeleteAllocation { allocation_id: DbId },
    MoveAllocation { allocation_id: DbId, date: Day },
    /// `change` and `new_agenda` are handled manually by the administrator.
    None,
}

/// Derive the side effect of approving a request.
///
/// Rejections never have a side effect; call this only for approvals.
pub fn approval_effect(
    request_type: RequestType,
    allocation_id: Option<DbId>,
    suggested_start_date: Option<Day>,
) -> ApprovalEffect {
    match (request_type, allocation_id, suggested_start_date) {
        (RequestType::Cancel, Some(allocation_id), _) => {
            ApprovalEffect::DeleteAllocation { allocation_id }
        }
        (RequestType::Reschedule, Some(allocation_id), Some(date)) => {
            ApprovalEffect::MoveAllocation { allocation_id, date }
        }
        _ => ApprovalEffect::None,
    }
}

/// Blank response text is stored as `NULL`.
pub fn clean_response(text: Option<&str>) -> Option<String> {
    text.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string)
}

// ---------------------------------------------------------------------------
// new_agenda reason encoding
// ---------------------------------------------------------------------------

/// Project name and description carried in a `new_agenda` reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAgendaReason {
    pub project_name: String,
    pub description: String,
}

/// Pack a project name and description into a single reason string.
///
/// First line is `Projeto: <name>`; the remainder is the description.
pub fn encode_new_agenda_reason(project_name: &str, description: &str) -> String {
    format!(
        "{NEW_AGENDA_PROJECT_PREFIX} {}\n{}",
        project_name.trim(),
        description.trim()
    )
}

/// Inverse of [`encode_new_agenda_reason`].
///
/// A first line without the prefix yields an empty project name.
pub fn parse_new_agenda_reason(reason: &str) -> NewAgendaReason {
    let mut lines = reason.split('\n');
    let first = lines.next().unwrap_or_default();
    let project_name = first
        .strip_prefix(NEW_AGENDA_PROJECT_PREFIX)
        .map(|rest| rest.trim().to_string())
        .unwrap_or_default();
    let description = lines.collect::<Vec<_>>().join("\n").trim().to_string();
    NewAgendaReason {
        project_name,
        description,
    }
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// Raw submission as received from a requester.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Submission {
    pub request_type: RequestType,
    pub allocation_id: Option<DbId>,
    /// Free-text reason; for `new_agenda` this is the description.
    pub reason: String,
    pub suggested_start_date: Option<Day>,
    pub suggested_days: Option<i32>,
    /// Required for `new_agenda`, ignored otherwise.
    pub project_name: Option<String>,
}

/// A validated submission ready to be stored as `pending`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSubmission {
    pub request_type: RequestType,
    pub allocation_id: Option<DbId>,
    pub reason: String,
    pub suggested_start_date: Option<Day>,
    pub suggested_days: Option<i32>,
}

/// Validate a submission and build the stored form.
pub fn validate_submission(input: &Submission) -> Result<ValidatedSubmission, CoreError> {
    let reason = input.reason.trim();
    if reason.is_empty() {
        return Err(CoreError::validation("Reason is required"));
    }
    if let Some(days) = input.suggested_days {
        if days < 1 {
            return Err(CoreError::validation(format!(
                "Suggested days must be at least 1, got {days}"
            )));
        }
    }

    match input.request_type {
        RequestType::NewAgenda => {
            let project_name = input
                .project_name
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .ok_or_else(|| CoreError::validation("Project name is required for a new agenda"))?;
            let start = input
                .suggested_start_date
                .ok_or_else(|| CoreError::validation("Start date is required for a new agenda"))?;
            Ok(ValidatedSubmission {
                request_type: RequestType::NewAgenda,
                allocation_id: None,
                reason: encode_new_agenda_reason(project_name, reason),
                suggested_start_date: Some(start),
                suggested_days: input.suggested_days,
            })
        }
        other => {
            let allocation_id = input.allocation_id.ok_or_else(|| {
                CoreError::validation(format!("An allocation is required for a {other} request"))
            })?;
            // A reschedule without a date is accepted; approving it has no
            // automated effect.
            Ok(ValidatedSubmission {
                request_type: other,
                allocation_id: Some(allocation_id),
                reason: reason.to_string(),
                suggested_start_date: input.suggested_start_date,
                suggested_days: input.suggested_days,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// Fields of a joined request row that list filters look at.
#[derive(Debug, Clone, Copy)]
pub struct RequestFacts<'a> {
    pub status: RequestStatus,
    pub request_type: RequestType,
    pub created_on: Day,
    pub requester_name: Option<&'a str>,
    pub project_name: Option<&'a str>,
    pub reason: &'a str,
}

/// List filters. Every `None` field matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
    #[serde(rename = "type")]
    pub request_type: Option<RequestType>,
    pub search: Option<String>,
    /// Inclusive lower bound on the creation day.
    pub from: Option<Day>,
    /// Inclusive upper bound on the creation day.
    pub to: Option<Day>,
}

impl RequestFilter {
    pub fn matches(&self, facts: &RequestFacts<'_>) -> bool {
        if self.status.is_some_and(|s| s != facts.status) {
            return false;
        }
        if self.request_type.is_some_and(|t| t != facts.request_type) {
            return false;
        }
        if self.from.is_some_and(|from| facts.created_on < from) {
            return false;
        }
        if self.to.is_some_and(|to| facts.created_on > to) {
            return false;
        }
        if let Some(q) = self.search.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let q = q.to_lowercase();
            let hit = |field: Option<&str>| field.is_some_and(|f| f.to_lowercase().contains(&q));
            if !hit(facts.requester_name) && !hit(facts.project_name) && !hit(Some(facts.reason)) {
                return false;
            }
        }
        true
    }
}

/// Per-status totals shown above the request list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl StatusCounts {
    pub fn tally(statuses: impl IntoIterator<Item = RequestStatus>) -> Self {
        statuses.into_iter().fold(Self::default(), |mut acc, s| {
            acc.total += 1;
            match s {
                RequestStatus::Pending => acc.pending += 1,
                RequestStatus::Approved => acc.approved += 1,
                RequestStatus::Rejected => acc.rejected += 1,
            }
            acc
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Day {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn submission(request_type: RequestType) -> Submission {
        Submission {
            request_type,
            allocation_id: Some(42),
            reason: "Cliente pediu".to_string(),
            suggested_start_date: None,
            suggested_days: None,
            project_name: None,
        }
    }

    // -- state machine ------------------------------------------------------

    #[test]
    fn pending_can_be_approved_or_rejected() {
        assert!(validate_transition(RequestStatus::Pending, Decision::Approved).is_ok());
        assert!(validate_transition(RequestStatus::Pending, Decision::Rejected).is_ok());
    }

    #[test]
    fn resolved_requests_are_terminal() {
        for from in [RequestStatus::Approved, RequestStatus::Rejected] {
            for decision in [Decision::Approved, Decision::Rejected] {
                assert_matches!(validate_transition(from, decision), Err(CoreError::Conflict(_)));
            }
        }
    }

    #[test]
    fn decision_maps_to_status() {
        assert_eq!(Decision::Approved.target_status(), RequestStatus::Approved);
        assert_eq!(Decision::Rejected.target_status(), RequestStatus::Rejected);
    }

    // -- approval effects ---------------------------------------------------

    #[test]
    fn cancel_approval_deletes_allocation() {
        assert_eq!(
            approval_effect(RequestType::Cancel, Some(7), None),
            ApprovalEffect::DeleteAllocation { allocation_id: 7 }
        );
    }

    #[test]
    fn reschedule_approval_moves_allocation() {
        assert_eq!(
            approval_effect(RequestType::Reschedule, Some(7), Some(d(2024, 4, 1))),
            ApprovalEffect::MoveAllocation {
                allocation_id: 7,
                date: d(2024, 4, 1)
            }
        );
    }

    #[test]
    fn reschedule_without_date_has_no_effect() {
        assert_eq!(
            approval_effect(RequestType::Reschedule, Some(7), None),
            ApprovalEffect::None
        );
    }

    #[test]
    fn change_and_new_agenda_have_no_effect() {
        assert_eq!(approval_effect(RequestType::Change, Some(7), Some(d(2024, 4, 1))), ApprovalEffect::None);
        assert_eq!(approval_effect(RequestType::NewAgenda, None, Some(d(2024, 4, 1))), ApprovalEffect::None);
    }

    #[test]
    fn cancel_with_dangling_allocation_has_no_effect() {
        assert_eq!(approval_effect(RequestType::Cancel, None, None), ApprovalEffect::None);
    }

    // -- new_agenda encoding ------------------------------------------------

    #[test]
    fn new_agenda_reason_round_trips() {
        let encoded = encode_new_agenda_reason("UNIMED ARARAS", "Instalação inicial");
        assert_eq!(encoded, "Projeto: UNIMED ARARAS\nInstalação inicial");
        let parsed = parse_new_agenda_reason(&encoded);
        assert_eq!(parsed.project_name, "UNIMED ARARAS");
        assert_eq!(parsed.description, "Instalação inicial");
    }

    #[test]
    fn new_agenda_multiline_description_survives() {
        let encoded = encode_new_agenda_reason("PEP", "linha 1\nlinha 2");
        let parsed = parse_new_agenda_reason(&encoded);
        assert_eq!(parsed.description, "linha 1\nlinha 2");
    }

    #[test]
    fn reason_without_prefix_has_no_project() {
        let parsed = parse_new_agenda_reason("apenas texto");
        assert_eq!(parsed.project_name, "");
        assert_eq!(parsed.description, "");
    }

    // -- submission ---------------------------------------------------------

    #[test]
    fn blank_reason_rejected() {
        let mut input = submission(RequestType::Change);
        input.reason = "  ".into();
        assert_matches!(validate_submission(&input), Err(CoreError::Validation(_)));
    }

    #[test]
    fn contextual_request_requires_allocation() {
        let mut input = submission(RequestType::Cancel);
        input.allocation_id = None;
        assert!(validate_submission(&input).is_err());
    }

    #[test]
    fn contextual_request_keeps_fields() {
        let mut input = submission(RequestType::Reschedule);
        input.suggested_start_date = Some(d(2024, 4, 1));
        input.suggested_days = Some(2);
        let v = validate_submission(&input).unwrap();
        assert_eq!(v.allocation_id, Some(42));
        assert_eq!(v.reason, "Cliente pediu");
        assert_eq!(v.suggested_start_date, Some(d(2024, 4, 1)));
        assert_eq!(v.suggested_days, Some(2));
    }

    #[test]
    fn non_positive_suggested_days_rejected() {
        let mut input = submission(RequestType::Reschedule);
        input.suggested_days = Some(0);
        assert!(validate_submission(&input).is_err());
    }

    #[test]
    fn new_agenda_requires_project_and_start() {
        let mut input = submission(RequestType::NewAgenda);
        input.allocation_id = None;
        input.suggested_start_date = Some(d(2024, 5, 6));
        assert!(validate_submission(&input).is_err(), "missing project name");

        input.project_name = Some("UNIMED ARARAS".into());
        input.suggested_start_date = None;
        assert!(validate_submission(&input).is_err(), "missing start date");
    }

    #[test]
    fn new_agenda_encodes_reason_and_drops_allocation() {
        let input = Submission {
            request_type: RequestType::NewAgenda,
            allocation_id: Some(9),
            reason: " Instalação inicial ".into(),
            suggested_start_date: Some(d(2024, 5, 6)),
            suggested_days: Some(3),
            project_name: Some(" UNIMED ARARAS ".into()),
        };
        let v = validate_submission(&input).unwrap();
        assert_eq!(v.allocation_id, None);
        assert_eq!(v.reason, "Projeto: UNIMED ARARAS\nInstalação inicial");
        let parsed = parse_new_agenda_reason(&v.reason);
        assert_eq!(parsed.project_name, "UNIMED ARARAS");
        assert_eq!(parsed.description, "Instalação inicial");
    }

    // -- parsing ------------------------------------------------------------

    #[test]
    fn enums_parse_stored_strings() {
        for t in RequestType::ALL {
            assert_eq!(t.as_str().parse::<RequestType>().unwrap(), t);
        }
        assert_eq!("approved".parse::<RequestStatus>().unwrap(), RequestStatus::Approved);
        assert!("reopened".parse::<RequestStatus>().is_err());
        assert!("delete".parse::<RequestType>().is_err());
    }

    // -- filters ------------------------------------------------------------

    fn facts(created_on: Day) -> RequestFacts<'static> {
        RequestFacts {
            status: RequestStatus::Pending,
            request_type: RequestType::Cancel,
            created_on,
            requester_name: Some("Ana Lima"),
            project_name: Some("Implantação PEP"),
            reason: "Feriado municipal",
        }
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(RequestFilter::default().matches(&facts(d(2024, 3, 10))));
    }

    #[test]
    fn filter_by_status_and_type() {
        let f = RequestFilter {
            status: Some(RequestStatus::Approved),
            ..Default::default()
        };
        assert!(!f.matches(&facts(d(2024, 3, 10))));

        let f = RequestFilter {
            request_type: Some(RequestType::Cancel),
            ..Default::default()
        };
        assert!(f.matches(&facts(d(2024, 3, 10))));
    }

    #[test]
    fn filter_date_range_is_inclusive() {
        let f = RequestFilter {
            from: Some(d(2024, 3, 10)),
            to: Some(d(2024, 3, 10)),
            ..Default::default()
        };
        assert!(f.matches(&facts(d(2024, 3, 10))));
        assert!(!f.matches(&facts(d(2024, 3, 9))));
        assert!(!f.matches(&facts(d(2024, 3, 11))));
    }

    #[test]
    fn search_looks_at_requester_project_and_reason() {
        for q in ["ana", "PEP", "feriado"] {
            let f = RequestFilter {
                search: Some(q.to_string()),
                ..Default::default()
            };
            assert!(f.matches(&facts(d(2024, 3, 10))), "query {q} should match");
        }
        let f = RequestFilter {
            search: Some("bruno".into()),
            ..Default::default()
        };
        assert!(!f.matches(&facts(d(2024, 3, 10))));
    }

    #[test]
    fn counts_tally_by_status() {
        let counts = StatusCounts::tally([
            RequestStatus::Pending,
            RequestStatus::Pending,
            RequestStatus::Approved,
            RequestStatus::Rejected,
        ]);
        assert_eq!(counts.total, 4);
        assert_eq!(counts.pending, 2);
        assert_eq!(counts.approved, 1);
        assert_eq!(counts.rejected, 1);
    }
}
