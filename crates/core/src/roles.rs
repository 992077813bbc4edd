//! Profile roles, profile statuses, and the visibility rules derived from them.
//!
//! Role strings must match the `profiles.role` CHECK constraint in
//! `20240101000001_create_profiles.sql`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

pub const ROLE_ADMIN: &str = "ADM";
pub const ROLE_MANAGER: &str = "GERENTE";
pub const ROLE_CONSULTANT: &str = "CONSULTOR";

pub const PROFILE_STATUS_ACTIVE: &str = "Ativo";

/// Role of an authenticated profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ADM")]
    Admin,
    #[serde(rename = "GERENTE")]
    Manager,
    #[serde(rename = "CONSULTOR")]
    Consultant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::Manager => ROLE_MANAGER,
            Role::Consultant => ROLE_CONSULTANT,
        }
    }

    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_ADMIN => Ok(Role::Admin),
            ROLE_MANAGER => Ok(Role::Manager),
            ROLE_CONSULTANT => Ok(Role::Consultant),
            other => Err(CoreError::validation(format!(
                "Invalid role '{other}'. Must be one of: {ROLE_ADMIN}, {ROLE_MANAGER}, {ROLE_CONSULTANT}"
            ))),
        }
    }
}

/// True when `email` is on the configured hidden list (case-insensitive).
///
/// Hidden profiles are left out of grids, listings and capacity counts.
pub fn is_hidden_email(email: &str, hidden: &[String]) -> bool {
    let email = email.trim();
    hidden.iter().any(|h| h.eq_ignore_ascii_case(email))
}

/// Match a manager's full name against a project's free-text manager label.
///
/// Trimmed, case-insensitive equality. This is the only place the
/// name-based manager/project relation is evaluated.
pub fn manager_name_matches(manager_full_name: &str, project_manager: Option<&str>) -> bool {
    let name = manager_full_name.trim();
    match project_manager.map(str::trim) {
        Some(label) if !label.is_empty() && !name.is_empty() => {
            label.to_lowercase() == name.to_lowercase()
        }
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Viewer
// ---------------------------------------------------------------------------

/// The authenticated profile on whose behalf data is read.
///
/// Built once per request from the session and threaded through every
/// visibility decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: DbId,
    pub role: Role,
    pub full_name: String,
}

impl Viewer {
    /// Consultants only see their own row on the grid.
    pub fn can_view_consultant(&self, consultant_id: DbId) -> bool {
        self.role != Role::Consultant || consultant_id == self.user_id
    }

    /// Managers do not see private projects.
    pub fn can_view_project(&self, is_private: bool) -> bool {
        !(self.role == Role::Manager && is_private)
    }

    /// An allocation is visible when its consultant and its project are.
    pub fn can_view_allocation(&self, consultant_id: DbId, project_is_private: bool) -> bool {
        self.can_view_consultant(consultant_id) && self.can_view_project(project_is_private)
    }

    /// Change-request visibility.
    ///
    /// - Admins see every request.
    /// - Managers see requests whose target allocation's project is managed by them.
    /// - Consultants see the requests they submitted.
    pub fn can_view_request(&self, requester_id: DbId, project_manager: Option<&str>) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Manager => manager_name_matches(&self.full_name, project_manager),
            Role::Consultant => requester_id == self.user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewer(role: Role) -> Viewer {
        Viewer {
            user_id: 7,
            role,
            full_name: "Maria Souza".to_string(),
        }
    }

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::Admin, Role::Manager, Role::Consultant] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn role_rejects_unknown() {
        assert!("admin".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn role_serializes_as_portuguese_code() {
        assert_eq!(serde_json::to_string(&Role::Manager).unwrap(), "\"GERENTE\"");
    }

    #[test]
    fn hidden_email_is_case_insensitive() {
        let hidden = vec!["ghost@example.com".to_string()];
        assert!(is_hidden_email(" Ghost@Example.com ", &hidden));
        assert!(!is_hidden_email("someone@example.com", &hidden));
        assert!(!is_hidden_email("ghost@example.com", &[]));
    }

    #[test]
    fn manager_match_ignores_case_and_padding() {
        assert!(manager_name_matches("Maria Souza", Some("  maria souza ")));
        assert!(!manager_name_matches("Maria Souza", Some("Maria S.")));
        assert!(!manager_name_matches("Maria Souza", None));
        assert!(!manager_name_matches("", Some("")));
    }

    #[test]
    fn admin_sees_all_requests() {
        assert!(viewer(Role::Admin).can_view_request(99, None));
    }

    #[test]
    fn manager_sees_only_managed_requests() {
        let v = viewer(Role::Manager);
        assert!(v.can_view_request(99, Some("MARIA SOUZA")));
        assert!(!v.can_view_request(99, Some("João")));
        assert!(!v.can_view_request(7, None));
    }

    #[test]
    fn consultant_sees_only_own_requests() {
        let v = viewer(Role::Consultant);
        assert!(v.can_view_request(7, None));
        assert!(!v.can_view_request(8, Some("Maria Souza")));
    }

    #[test]
    fn consultant_grid_is_restricted_to_self() {
        let v = viewer(Role::Consultant);
        assert!(v.can_view_consultant(7));
        assert!(!v.can_view_consultant(8));
        assert!(viewer(Role::Manager).can_view_consultant(8));
    }

    #[test]
    fn manager_cannot_see_private_projects() {
        assert!(!viewer(Role::Manager).can_view_project(true));
        assert!(viewer(Role::Manager).can_view_project(false));
        assert!(viewer(Role::Admin).can_view_project(true));
        assert!(!viewer(Role::Manager).can_view_allocation(1, true));
    }
}
