use std::sync::Arc;

use agendas_core::roles::is_hidden_email;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool is reference-counted and the config sits
/// behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: agendas_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// True when the profile with `email` must be left out of every listing.
    pub fn is_hidden(&self, email: &str) -> bool {
        is_hidden_email(email, &self.config.hidden_profile_emails)
    }
}
