//! Startup seed for the first administrator.
//!
//! Profiles are otherwise created inline by range inserts, without a
//! password, so a fresh database has nobody who can log in until this runs.

use agendas_core::roles::Role;
use agendas_core::types::DbId;
use agendas_db::models::profile::CreateProfile;
use agendas_db::repositories::ProfileRepo;
use sqlx::PgPool;

use crate::auth::password::hash_password;
use crate::config::BootstrapAdmin;
use crate::error::{AppError, AppResult};

/// Create the administrator unless a profile already uses its e-mail.
///
/// Returns the new profile id, or `None` when nothing was created. An
/// existing profile is never modified.
pub async fn ensure_admin(pool: &PgPool, admin: &BootstrapAdmin) -> AppResult<Option<DbId>> {
    if ProfileRepo::find_by_email(pool, &admin.email).await?.is_some() {
        tracing::debug!(email = %admin.email, "Bootstrap admin already present");
        return Ok(None);
    }

    let password_hash = hash_password(&admin.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let profile = ProfileRepo::create(
        pool,
        &CreateProfile {
            full_name: admin.full_name.clone(),
            email: admin.email.clone(),
            role: Role::Admin,
            password_hash: Some(password_hash),
        },
    )
    .await?;

    tracing::info!(user_id = profile.id, email = %profile.email, "Bootstrap admin created");
    Ok(Some(profile.id))
}
