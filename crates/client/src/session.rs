//! The authenticated session a client carries between calls.

use agendas_core::roles::{Role, Viewer};
use agendas_core::types::DbId;
use serde::Deserialize;

/// Identity returned by `/auth/login` and `/auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionUser {
    pub id: DbId,
    pub role: Role,
    pub full_name: String,
}

/// Bearer token plus the identity it was issued for.
///
/// Built once at login and passed to every call that needs authentication.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    /// Token lifetime in seconds, as reported by the server.
    pub expires_in: i64,
    pub user: SessionUser,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.user.role.is_admin()
    }

    /// Visibility context for local filtering, mirroring the server's rules.
    pub fn viewer(&self) -> Viewer {
        Viewer {
            user_id: self.user.id,
            role: self.user.role,
            full_name: self.user.full_name.clone(),
        }
    }
}
