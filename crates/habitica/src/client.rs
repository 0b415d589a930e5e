//! REST client for the Habitica v3 API.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::errors::{HabiticaError, HabiticaResult};
use crate::models::{ApiResponse, Task, TaskQuery};
use crate::rate_limit::{RateLimitState, RateLimitedGate};

/// Hosted Habitica instance.
pub const DEFAULT_BASE_URL: &str = "https://habitica.com";

/// Client identifier suffix sent in the `x-client` header, as the API
/// guidelines ask of third-party tools.
const CLIENT_NAME: &str = "habitica-sync";

/// Connection settings for [`HabiticaClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API host; override for self-hosted instances or tests
    pub base_url: String,
    /// Account identifier (`x-api-user`)
    pub user_id: String,
    /// Secret key (`x-api-key`)
    pub api_key: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Safety margin added on top of the reported quota reset instant
    pub rate_limit_buffer: Duration,
}

impl ClientConfig {
    /// Settings for the hosted instance with default timeout and buffer.
    #[must_use]
    pub fn new(user_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_id: user_id.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(30),
            rate_limit_buffer: Duration::from_millis(500),
        }
    }
}

/// Habitica REST client. All requests flow through the rate-limit gate.
pub struct HabiticaClient {
    http: reqwest::Client,
    base_url: String,
    gate: RateLimitedGate,
}

impl HabiticaClient {
    /// Create a client authenticating via the three fixed Habitica headers.
    pub fn new(config: &ClientConfig) -> HabiticaResult<Self> {
        let mut headers = HeaderMap::new();
        let client_id = format!("{}-{CLIENT_NAME}", config.user_id);
        for (name, value) in [
            ("x-client", client_id.as_str()),
            ("x-api-user", config.user_id.as_str()),
            ("x-api-key", config.api_key.as_str()),
        ] {
            headers.insert(
                name,
                HeaderValue::from_str(value).map_err(|e| HabiticaError::Credentials {
                    reason: format!("{name}: {e}"),
                })?,
            );
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            gate: RateLimitedGate::new(config.rate_limit_buffer),
        })
    }

    /// Current quota snapshot, for display surfaces.
    pub async fn rate_limit(&self) -> RateLimitState {
        self.gate.state().await
    }

    /// Fetch the account's tasks, optionally narrowed by a query.
    #[instrument(skip(self, query))]
    pub async fn fetch_tasks(&self, query: Option<&TaskQuery>) -> HabiticaResult<Vec<Task>> {
        let url = format!("{}/api/v3/tasks/user", self.base_url);
        let tasks: Vec<Task> = self
            .request(&url, query.map(TaskQuery::params).unwrap_or_default())
            .await?;
        debug!(count = tasks.len(), "fetched tasks");
        Ok(tasks)
    }

    /// Validate the configured credentials with a lightweight user fetch.
    #[instrument(skip(self))]
    pub async fn verify_credentials(&self) -> HabiticaResult<()> {
        let url = format!("{}/api/v3/user", self.base_url);
        let _: serde_json::Value = self.request(&url, Vec::new()).await?;
        debug!("credentials verified");
        Ok(())
    }

    /// Run one gated GET and unwrap the `{ success, data }` envelope.
    async fn request<R: DeserializeOwned>(
        &self,
        url: &str,
        params: Vec<(&'static str, String)>,
    ) -> HabiticaResult<R> {
        let response = self
            .gate
            .execute(|| {
                let mut request = self.http.get(url);
                if !params.is_empty() {
                    request = request.query(&params);
                }
                request.send()
            })
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HabiticaError::Status { status, body });
        }

        let envelope: ApiResponse<R> =
            response
                .json()
                .await
                .map_err(|e| HabiticaError::Decode {
                    reason: e.to_string(),
                })?;

        if !envelope.success {
            return Err(HabiticaError::Api {
                message: envelope
                    .message
                    .unwrap_or_else(|| "no message supplied".to_string()),
            });
        }

        envelope.data.ok_or_else(|| HabiticaError::Decode {
            reason: "missing data field in successful response".to_string(),
        })
    }
}
