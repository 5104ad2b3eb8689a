//! Time-boxed bearer credentials.

use std::fmt;

/// Validity of a freshly signed app assertion, in seconds.
pub const ASSERTION_LIFETIME_SECS: i64 = 600;

/// Safety margin before expiry at which a credential is refreshed.
///
/// Covers clock skew between this host and GitHub plus request latency, and
/// applies to both assertions and installation tokens.
pub const REFRESH_MARGIN_SECS: i64 = 60;

/// A bearer token with an absolute expiry.
///
/// Credentials are immutable: a refresh replaces the whole value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    expires_at: i64,
}

impl Credential {
    /// Creates a credential expiring at the Unix timestamp `expires_at`.
    #[must_use]
    pub fn new(token: impl Into<String>, expires_at: i64) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    /// Borrow the bearer token.
    #[must_use]
    pub const fn token(&self) -> &str {
        self.token.as_str()
    }

    /// Unix timestamp after which the token is rejected.
    #[must_use]
    pub const fn expires_at(&self) -> i64 {
        self.expires_at
    }

    /// Returns true while `now` is before the refresh margin.
    #[must_use]
    pub const fn is_fresh_at(&self, now: i64) -> bool {
        self.expires_at.saturating_sub(REFRESH_MARGIN_SECS) > now
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
