use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except the JWT
/// secret, which must always be provided.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on the graceful-shutdown drain, in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Profiles with these e-mails never appear on grids, listings or
    /// capacity counts. Compared case-insensitively.
    pub hidden_profile_emails: Vec<String>,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// First administrator, created at startup when no profile has its e-mail.
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// Credentials for the startup administrator seed.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .finish_non_exhaustive()
    }
}

impl BootstrapAdmin {
    /// Both e-mail and password must be non-blank; the name defaults to
    /// `Administrador`.
    pub fn from_parts(
        email: Option<String>,
        password: Option<String>,
        full_name: Option<String>,
    ) -> Option<Self> {
        let email = email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty())?;
        let password = password.filter(|p| !p.trim().is_empty())?;
        let full_name = full_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Administrador".to_string());
        Some(Self {
            email,
            password,
            full_name,
        })
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                    |
    /// |-------------------------|----------------------------|
    /// | `HOST`                  | `0.0.0.0`                  |
    /// | `PORT`                  | `3000`                     |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                       |
    /// | `HIDDEN_PROFILE_EMAILS` | empty                      |
    /// | `BOOTSTRAP_ADMIN_EMAIL` | unset (no seed)            |
    /// | `BOOTSTRAP_ADMIN_PASSWORD` | unset (no seed)         |
    /// | `BOOTSTRAP_ADMIN_NAME`  | `Administrador`            |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = split_list(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let hidden_profile_emails =
            split_list(&std::env::var("HIDDEN_PROFILE_EMAILS").unwrap_or_default());

        let jwt = JwtConfig::from_env();

        let bootstrap_admin = BootstrapAdmin::from_parts(
            std::env::var("BOOTSTRAP_ADMIN_EMAIL").ok(),
            std::env::var("BOOTSTRAP_ADMIN_PASSWORD").ok(),
            std::env::var("BOOTSTRAP_ADMIN_NAME").ok(),
        );

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            hidden_profile_emails,
            jwt,
            bootstrap_admin,
        }
    }
}

/// Split a comma-separated env value, dropping blank entries.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_list_trims_and_skips_blanks() {
        assert_eq!(
            split_list(" a@x.com, ,B@y.com ,"),
            vec!["a@x.com".to_string(), "B@y.com".to_string()]
        );
        assert!(split_list("").is_empty());
    }

    #[test]
    fn bootstrap_admin_needs_email_and_password() {
        let some = |s: &str| Some(s.to_string());

        let admin = BootstrapAdmin::from_parts(some(" root@x.com "), some("s3nha"), None).unwrap();
        assert_eq!(admin.email, "root@x.com");
        assert_eq!(admin.full_name, "Administrador");

        assert!(BootstrapAdmin::from_parts(some("root@x.com"), None, None).is_none());
        assert!(BootstrapAdmin::from_parts(some("root@x.com"), some("  "), None).is_none());
        assert!(BootstrapAdmin::from_parts(None, some("s3nha"), some("Root")).is_none());
    }

    #[test]
    fn bootstrap_admin_debug_hides_password() {
        let admin = BootstrapAdmin::from_parts(
            Some("root@x.com".into()),
            Some("segredo".into()),
            Some("Root".into()),
        )
        .unwrap();
        assert!(!format!("{admin:?}").contains("segredo"));
    }
}
