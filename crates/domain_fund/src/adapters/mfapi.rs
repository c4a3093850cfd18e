//! mfapi.in adapter
//!
//! One GET to `{base_url}{scheme_code}` returns the scheme's metadata and
//! its whole NAV history, newest first:
//!
//! ```json
//! {"meta": {"fund_house": "...", "scheme_code": 120503, ...},
//!  "data": [{"date": "26-10-2024", "nav": "95.12300"}, ...],
//!  "status": "SUCCESS"}
//! ```
//!
//! Unknown scheme codes are answered with `200 OK` and an empty `meta`
//! object, which this adapter reports as `PortError::NotFound`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};

use core_kernel::{DomainPort, PortError, SchemeCode};

use crate::ports::{UpstreamHistory, UpstreamSource};

/// Public mfapi.in endpoint, scheme code is appended
pub const DEFAULT_BASE_URL: &str = "https://api.mfapi.in/mf/";

/// Configuration for the mfapi.in client
#[derive(Debug, Clone)]
pub struct MfApiConfig {
    /// Base URL, the scheme code is appended verbatim
    pub base_url: String,
    /// Whole-request timeout
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for MfApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: concat!("nav-cache/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl MfApiConfig {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP client for the upstream NAV source
#[derive(Debug, Clone)]
pub struct MfApiClient {
    client: Client,
    config: MfApiConfig,
}

impl MfApiClient {
    /// Builds the client
    ///
    /// # Errors
    ///
    /// Returns `PortError::Internal` if the HTTP client cannot be constructed
    pub fn new(config: MfApiConfig) -> Result<Self, PortError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| PortError::Internal {
                message: "failed to build HTTP client".to_string(),
                source: Some(Box::new(e)),
            })?;

        Ok(Self { client, config })
    }

    /// URL fetched for a scheme
    pub fn endpoint(&self, scheme_code: SchemeCode) -> String {
        format!("{}{}", self.config.base_url, scheme_code)
    }

    fn transport_error(&self, error: reqwest::Error) -> PortError {
        if error.is_timeout() {
            PortError::Timeout {
                operation: "upstream fetch".to_string(),
                duration_ms: self.config.timeout.as_millis() as u64,
            }
        } else if error.is_decode() {
            PortError::transformation(format!("invalid upstream payload: {}", error))
        } else {
            PortError::Connection {
                message: "upstream request failed".to_string(),
                source: Some(Box::new(error)),
            }
        }
    }
}

impl DomainPort for MfApiClient {}

#[async_trait]
impl UpstreamSource for MfApiClient {
    #[instrument(skip(self), fields(scheme_code = %scheme_code))]
    async fn fetch_full_history(&self, scheme_code: SchemeCode) -> Result<UpstreamHistory, PortError> {
        let url = self.endpoint(scheme_code);
        debug!(%url, "Fetching NAV history");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        match status {
            s if s.is_success() => {}
            StatusCode::NOT_FOUND => return Err(PortError::not_found("Scheme", scheme_code)),
            s if s.is_server_error() => {
                return Err(PortError::ServiceUnavailable {
                    service: format!("mfapi ({})", s),
                })
            }
            s => return Err(PortError::connection(format!("unexpected upstream status {}", s))),
        }

        let history: UpstreamHistory = response
            .json()
            .await
            .map_err(|e| self.transport_error(e))?;

        if history.meta.is_empty() {
            return Err(PortError::not_found("Scheme", scheme_code));
        }

        Ok(history)
    }
}
