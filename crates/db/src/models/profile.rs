//! Profile entity model and DTOs.

use agendas_core::roles::Role;
use agendas_core::schedule::GridConsultant;
use agendas_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full profile row from the `profiles` table.
///
/// Carries the password hash, so it is never serialized directly. Use
/// [`ProfileResponse`] for API output.
#[derive(Debug, Clone, FromRow)]
pub struct Profile {
    pub id: DbId,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub status: String,
    pub password_hash: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Profile {
    /// Descriptor used as a row header on the scheduling grid.
    pub fn as_grid_consultant(&self) -> GridConsultant {
        GridConsultant {
            id: self.id,
            name: self.full_name.clone(),
            role: self.role.clone(),
        }
    }
}

/// Safe profile representation for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub id: DbId,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub status: String,
}

impl From<Profile> for ProfileResponse {
    fn from(p: Profile) -> Self {
        Self {
            id: p.id,
            full_name: p.full_name,
            email: p.email,
            role: p.role,
            phone: p.phone,
            location: p.location,
            status: p.status,
        }
    }
}

/// DTO for inserting a profile.
#[derive(Debug, Clone)]
pub struct CreateProfile {
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub password_hash: Option<String>,
}
