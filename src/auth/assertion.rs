//! RS256 app assertions (JWTs) used to authenticate as the GitHub App.

use std::fmt;

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::github::error::ReviewError;

use super::credential::{ASSERTION_LIFETIME_SECS, Credential};

/// Claim set GitHub expects in an app assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppClaims {
    /// Issued-at Unix timestamp.
    pub iat: i64,
    /// Expiry Unix timestamp.
    pub exp: i64,
    /// Issuer: the GitHub App ID.
    pub iss: String,
}

/// Signs app assertions with the app's RSA private key.
///
/// Signing is purely local; no network call is made.
#[derive(Clone)]
pub struct AppAssertionSigner {
    app_id: String,
    key: EncodingKey,
}

impl AppAssertionSigner {
    /// Parses the PEM-encoded private key for `app_id`.
    ///
    /// Keys pasted into single-line secrets often carry literal `\n`
    /// sequences; those are turned back into newlines before parsing.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::MissingCredentials`] for a blank app ID and
    /// [`ReviewError::Signing`] when the key is not a valid RSA PEM.
    pub fn from_pem(
        app_id: impl Into<String>,
        private_key: &SecretString,
    ) -> Result<Self, ReviewError> {
        let issuer = app_id.into().trim().to_owned();
        if issuer.is_empty() {
            return Err(ReviewError::MissingCredentials { name: "GitHub App ID" });
        }

        let pem = normalise_pem(private_key.expose_secret());
        let key = EncodingKey::from_rsa_pem(pem.as_bytes()).map_err(|error| {
            ReviewError::Signing {
                message: format!("invalid RSA private key: {error}"),
            }
        })?;

        Ok(Self {
            app_id: issuer,
            key,
        })
    }

    /// App ID used as the assertion issuer.
    #[must_use]
    pub const fn app_id(&self) -> &str {
        self.app_id.as_str()
    }

    /// Signs an assertion issued at `issued_at`, valid for ten minutes.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Signing`] when encoding fails.
    pub fn sign(&self, issued_at: i64) -> Result<Credential, ReviewError> {
        let expires_at = issued_at.saturating_add(ASSERTION_LIFETIME_SECS);
        let claims = AppClaims {
            iat: issued_at,
            exp: expires_at,
            iss: self.app_id.clone(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.key)
            .map(|token| Credential::new(token, expires_at))
            .map_err(|error| ReviewError::Signing {
                message: error.to_string(),
            })
    }
}

impl fmt::Debug for AppAssertionSigner {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AppAssertionSigner")
            .field("app_id", &self.app_id)
            .finish_non_exhaustive()
    }
}

fn normalise_pem(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.contains('\n') {
        trimmed.to_owned()
    } else {
        trimmed.replace("\\n", "\n")
    }
}
