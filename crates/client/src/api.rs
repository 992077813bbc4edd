//! REST client for the agenda service.
//!
//! Wraps the `/api/v1` endpoints using [`reqwest`]. Every successful
//! response is unwrapped from the `{ "data": ... }` envelope; failures are
//! decoded from the `{ "error", "code" }` body into [`ClientError::Api`].

use agendas_core::allocation::Allocation;
use agendas_core::daily_log::LogDraft;
use agendas_core::types::{DbId, Day};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ClientError;
use crate::session::{Session, SessionUser};
use crate::store::AllocationStore;

/// HTTP client for one service instance.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    session: Option<Session>,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    code: String,
}

#[derive(Deserialize)]
struct LoginBody {
    access_token: String,
    expires_in: i64,
    user: SessionUser,
}

impl ApiClient {
    /// * `base_url` - Service root, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Reuse an existing [`reqwest::Client`] and its connection pool.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            session: None,
        }
    }

    /// Attach a session obtained earlier.
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Exchange credentials for a session and keep it for later calls.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<&Session, ClientError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&body)
            .send()
            .await?;
        let login: LoginBody = Self::parse_data(response).await?;

        tracing::debug!(user_id = login.user.id, role = ?login.user.role, "Logged in");
        Ok(self.session.insert(Session {
            access_token: login.access_token,
            expires_in: login.expires_in,
            user: login.user,
        }))
    }

    /// The identity behind the current token.
    pub async fn me(&self) -> Result<SessionUser, ClientError> {
        let response = self.authed(self.client.get(self.url("/auth/me"))).send().await?;
        Self::parse_data(response).await
    }

    /// Visible allocations, optionally bounded by date.
    pub async fn list_allocations(
        &self,
        from: Option<Day>,
        to: Option<Day>,
    ) -> Result<Vec<Allocation>, ClientError> {
        let mut query = Vec::new();
        if let Some(from) = from {
            query.push(("from", from.to_string()));
        }
        if let Some(to) = to {
            query.push(("to", to.to_string()));
        }
        let request = self.client.get(self.url("/allocations")).query(&query);
        let response = self.authed(request).send().await?;
        Self::parse_data(response).await
    }

    /// One allocation, or `None` when the service answers 404.
    pub async fn get_allocation(&self, id: DbId) -> Result<Option<Allocation>, ClientError> {
        let request = self.client.get(self.url(&format!("/allocations/{id}")));
        let response = self.authed(request).send().await?;
        match Self::parse_data(response).await {
            Ok(allocation) => Ok(Some(allocation)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// `PATCH /allocations/{id}/date`.
    pub async fn move_allocation(&self, id: DbId, date: Day) -> Result<Allocation, ClientError> {
        let request = self
            .client
            .patch(self.url(&format!("/allocations/{id}/date")))
            .json(&serde_json::json!({ "date": date }));
        let response = self.authed(request).send().await?;
        Self::parse_data(response).await
    }

    pub async fn delete_allocation(&self, id: DbId) -> Result<(), ClientError> {
        let request = self.client.delete(self.url(&format!("/allocations/{id}")));
        let response = self.authed(request).send().await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    /// The log for `(allocation_id, date)`, or an empty draft.
    pub async fn daily_log(&self, allocation_id: DbId, date: Day) -> Result<LogDraft, ClientError> {
        let request = self
            .client
            .get(self.url(&format!("/allocations/{allocation_id}/logs/{date}")));
        let response = self.authed(request).send().await?;
        Self::parse_data(response).await
    }

    /// Save the log text. Blank text over a missing log stores nothing.
    pub async fn save_daily_log(
        &self,
        allocation_id: DbId,
        date: Day,
        description: &str,
    ) -> Result<LogDraft, ClientError> {
        let request = self
            .client
            .put(self.url(&format!("/allocations/{allocation_id}/logs/{date}")))
            .json(&serde_json::json!({ "description": description }));
        let response = self.authed(request).send().await?;
        Self::parse_data(response).await
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{path}", self.base_url)
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.session {
            Some(session) => request.bearer_auth(&session.access_token),
            None => request,
        }
    }

    /// Return the response unchanged on success, or decode the error body.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        Err(decode_error(status.as_u16(), &text))
    }

    async fn parse_data<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<Envelope<T>>().await?.data)
    }
}

fn decode_error(status: u16, body: &str) -> ClientError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => ClientError::Api {
            status,
            code: parsed.code,
            message: parsed.error,
        },
        Err(_) => ClientError::Api {
            status,
            code: "UNKNOWN".to_string(),
            message: body.to_string(),
        },
    }
}

#[async_trait]
impl AllocationStore for ApiClient {
    async fn move_allocation(&self, id: DbId, date: Day) -> Result<Allocation, ClientError> {
        ApiClient::move_allocation(self, id, date).await
    }

    async fn fetch_allocation(&self, id: DbId) -> Result<Option<Allocation>, ClientError> {
        self.get_allocation(id).await
    }
}
