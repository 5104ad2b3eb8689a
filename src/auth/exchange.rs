//! Exchange of an app assertion for an installation access token.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;

use crate::github::error::ReviewError;
use crate::github::locator::{DEFAULT_API_BASE, InstallationId};

use super::credential::Credential;

/// Media type GitHub documents for the token exchange.
pub const GITHUB_V3_ACCEPT: &str = "application/vnd.github.v3+json";

const USER_AGENT_VALUE: &str = "patchwise";
/// Default timeout for one token exchange request, in seconds.
pub const DEFAULT_EXCHANGE_TIMEOUT_SECS: u64 = 30;
const EXPIRY_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Performs the assertion-for-token exchange.
pub trait TokenExchange: Send + Sync + fmt::Debug {
    /// Exchanges `assertion` for an installation token.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::AuthExchangeFailed`] for a non-success status,
    /// [`ReviewError::Network`] for transport failures, and
    /// [`ReviewError::Decode`] for a malformed response.
    fn exchange(
        &self,
        installation_id: InstallationId,
        assertion: &str,
    ) -> Result<Credential, ReviewError>;
}

/// Blocking HTTP implementation against the GitHub REST API.
///
/// Call it from a blocking context such as `tokio::task::spawn_blocking`;
/// the HTTP client is created per call.
#[derive(Debug, Clone)]
pub struct HttpTokenExchange {
    api_base: String,
    timeout: Duration,
}

impl Default for HttpTokenExchange {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

impl HttpTokenExchange {
    /// Creates an exchange targeting `api_base` (for example
    /// `https://api.github.com` or `https://ghe.example.com/api/v3`).
    #[must_use]
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            timeout: Duration::from_secs(DEFAULT_EXCHANGE_TIMEOUT_SECS),
        }
    }

    /// Overrides the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn endpoint(&self, installation_id: InstallationId) -> String {
        format!(
            "{}/app/installations/{}/access_tokens",
            self.api_base.trim_end_matches('/'),
            installation_id.get()
        )
    }
}

#[derive(Debug, Deserialize)]
struct InstallationTokenResponse {
    token: String,
    expires_at: String,
}

impl TokenExchange for HttpTokenExchange {
    fn exchange(
        &self,
        installation_id: InstallationId,
        assertion: &str,
    ) -> Result<Credential, ReviewError> {
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|error| ReviewError::Configuration {
                message: format!("failed to configure GitHub HTTP client: {error}"),
            })?;

        let response = client
            .post(self.endpoint(installation_id))
            .bearer_auth(assertion)
            .header(ACCEPT, GITHUB_V3_ACCEPT)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .send()
            .map_err(|error| ReviewError::Network {
                message: format!("installation token request failed: {error}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "(failed to read error response body)".to_owned());
            return Err(ReviewError::AuthExchangeFailed {
                status: status.as_u16(),
                body,
            });
        }

        let payload: InstallationTokenResponse =
            response.json().map_err(|error| ReviewError::Decode {
                what: "installation token response",
                message: error.to_string(),
            })?;
        let expires_at = parse_expiry(&payload.expires_at)?;

        Ok(Credential::new(payload.token, expires_at))
    }
}

/// Converts GitHub's `YYYY-MM-DDTHH:MM:SSZ` expiry into Unix seconds.
///
/// Offsets other than `Z` are accepted through RFC 3339 parsing.
pub(crate) fn parse_expiry(value: &str) -> Result<i64, ReviewError> {
    NaiveDateTime::parse_from_str(value, EXPIRY_FORMAT)
        .map(|naive| naive.and_utc().timestamp())
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|parsed| parsed.timestamp()))
        .map_err(|error| ReviewError::Decode {
            what: "installation token expiry",
            message: format!("'{value}': {error}"),
        })
}

#[cfg(test)]
#[path = "exchange_tests.rs"]
mod tests;
