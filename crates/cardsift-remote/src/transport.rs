//! Outbound request seam.
//!
//! [`Transport`] is the only place network I/O happens. The production
//! implementation rides on `ureq` with a hard per-request budget; tests use
//! a scripted transport instead.

use cardsift_core::error::FailureCode;
use std::fmt;
use std::io::Read;
use std::time::Duration;
use thiserror::Error;

/// Per-request time budget.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Cap on response bodies; the board endpoints return small JSON documents.
const MAX_BODY_BYTES: u64 = 4 * 1024 * 1024;

/// Identity of one outbound request. The path doubles as the cache key, so
/// two requests with the same path are the same request.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RemoteRequest {
    path: String,
}

impl RemoteRequest {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// The request path, relative to the transport's base URL.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Stable cache-key form.
    #[must_use]
    pub fn cache_key(&self) -> String {
        format!("{}{}", cardsift_core::settings::keys::CACHE_PREFIX, self.path)
    }
}

impl fmt::Display for RemoteRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Why a fetch failed. Callers log the category and degrade; nothing here is
/// fatal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out after {budget_secs}s")]
    Timeout { budget_secs: u64 },
    #[error("connectivity failure: {0}")]
    Connectivity(String),
    #[error("non-success status {0}")]
    Status(u16),
    #[error("malformed response body: {0}")]
    Malformed(String),
}

impl FetchError {
    /// The failure-taxonomy code for this error.
    #[must_use]
    pub const fn failure_code(&self) -> FailureCode {
        match self {
            Self::Timeout { .. } => FailureCode::RequestTimeout,
            Self::Connectivity(_) => FailureCode::TransientNetwork,
            Self::Status(_) => FailureCode::RemoteStatus,
            Self::Malformed(_) => FailureCode::MalformedPayload,
        }
    }
}

/// The outbound request capability.
pub trait Transport {
    /// Perform a GET for `request` and parse the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] categorizing timeout, connectivity, HTTP
    /// status, or body-shape failures.
    fn get(&mut self, request: &RemoteRequest) -> Result<serde_json::Value, FetchError>;
}

/// Production transport over `ureq`.
#[derive(Debug)]
pub struct UreqTransport {
    agent: ureq::Agent,
    base_url: String,
}

impl UreqTransport {
    /// Build a transport rooted at `base_url` with the standard time budget.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(FETCH_TIMEOUT)
            .build();
        Self {
            agent,
            base_url: base_url.into(),
        }
    }

    fn url_for(&self, request: &RemoteRequest) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            request.path().trim_start_matches('/')
        )
    }
}

impl Transport for UreqTransport {
    fn get(&mut self, request: &RemoteRequest) -> Result<serde_json::Value, FetchError> {
        let url = self.url_for(request);

        let response = match self.agent.get(&url).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, _)) => return Err(FetchError::Status(code)),
            Err(ureq::Error::Transport(transport)) => {
                let message = transport.to_string();
                if message.contains("timed out") || message.contains("timeout") {
                    return Err(FetchError::Timeout {
                        budget_secs: FETCH_TIMEOUT.as_secs(),
                    });
                }
                return Err(FetchError::Connectivity(message));
            }
        };

        let mut body = String::new();
        response
            .into_reader()
            .take(MAX_BODY_BYTES)
            .read_to_string(&mut body)
            .map_err(|e| FetchError::Connectivity(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| FetchError::Malformed(e.to_string()))
    }
}
