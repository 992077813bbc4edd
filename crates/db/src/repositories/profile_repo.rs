//! Repository for the `profiles` table.

use agendas_core::roles::{Role, PROFILE_STATUS_ACTIVE};
use agendas_core::types::DbId;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::profile::{CreateProfile, Profile};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, full_name, email, role, phone, location, status, password_hash, \
                       created_at, updated_at";

/// Domain used for the placeholder e-mail of inline-created consultants.
const PLACEHOLDER_EMAIL_DOMAIN: &str = "pending.agendas.local";

pub struct ProfileRepo;

impl ProfileRepo {
    /// Insert a new profile, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProfile) -> Result<Profile, sqlx::Error> {
        let query = format!(
            "INSERT INTO profiles (full_name, email, role, password_hash)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(input.full_name.trim())
            .bind(input.email.trim())
            .bind(input.role.as_str())
            .bind(&input.password_hash)
            .fetch_one(pool)
            .await
    }

    /// Insert a consultant created inline from the allocation form.
    ///
    /// The profile gets a unique placeholder e-mail and no password, so it
    /// shows on the grid but cannot log in.
    pub async fn insert_inline_consultant(
        conn: &mut PgConnection,
        full_name: &str,
    ) -> Result<Profile, sqlx::Error> {
        let email = format!("{}@{PLACEHOLDER_EMAIL_DOMAIN}", Uuid::new_v4());
        let query = format!(
            "INSERT INTO profiles (full_name, email, role)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(full_name.trim())
            .bind(email)
            .bind(Role::Consultant.as_str())
            .fetch_one(conn)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE id = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a profile by e-mail (case-insensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE LOWER(email) = LOWER($1)");
        sqlx::query_as::<_, Profile>(&query)
            .bind(email.trim())
            .fetch_optional(pool)
            .await
    }

    /// All profiles ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles ORDER BY full_name, id");
        sqlx::query_as::<_, Profile>(&query).fetch_all(pool).await
    }

    /// Profiles with status `Ativo`, ordered by name.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Profile>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM profiles WHERE status = $1 ORDER BY full_name, id");
        sqlx::query_as::<_, Profile>(&query)
            .bind(PROFILE_STATUS_ACTIVE)
            .fetch_all(pool)
            .await
    }
}
