//! Octocrab client construction backed by installation tokens.

use std::sync::{Arc, Mutex};

use http::Uri;
use octocrab::Octocrab;

use crate::auth::TokenLifecycleManager;
use crate::github::error::ReviewError;
use crate::github::locator::InstallationId;

use super::error_mapping::map_octocrab_error;

/// Shared handle to the token manager for one app installation.
///
/// Clones share the same manager, so every gateway built from them reuses
/// one cached token. Refreshes run under the mutex, which keeps two
/// concurrent callers from both exchanging an expired token.
#[derive(Debug, Clone)]
pub struct InstallationCredentials {
    manager: Arc<Mutex<TokenLifecycleManager>>,
    installation_id: InstallationId,
}

impl InstallationCredentials {
    /// Wraps `manager` for use with `installation_id`.
    #[must_use]
    pub fn new(manager: TokenLifecycleManager, installation_id: InstallationId) -> Self {
        Self {
            manager: Arc::new(Mutex::new(manager)),
            installation_id,
        }
    }

    /// Installation the credentials are minted for.
    #[must_use]
    pub const fn installation_id(&self) -> InstallationId {
        self.installation_id
    }

    /// Returns a valid installation token, refreshing it when needed.
    ///
    /// The exchange uses blocking HTTP, so it runs on the blocking pool.
    ///
    /// # Errors
    ///
    /// Propagates signing and exchange failures from the manager, and
    /// returns `ReviewError::Io` when the refresh task cannot complete.
    pub async fn token(&self) -> Result<String, ReviewError> {
        let manager = Arc::clone(&self.manager);
        let installation_id = self.installation_id;

        tokio::task::spawn_blocking(move || {
            let mut guard = manager.lock().map_err(|_| ReviewError::Io {
                message: "token manager lock poisoned".to_owned(),
            })?;
            guard.installation_token(installation_id)
        })
        .await
        .map_err(|error| ReviewError::Io {
            message: format!("token refresh task failed: {error}"),
        })?
    }
}

/// Builds an Octocrab client for the given token and API base URL.
///
/// # Errors
///
/// Returns `ReviewError::InvalidUrl` when the base URI cannot be parsed or
/// `ReviewError::Api` when Octocrab fails to construct a client.
pub(super) fn build_octocrab_client(token: &str, api_base: &str) -> Result<Octocrab, ReviewError> {
    let base_uri: Uri = api_base
        .parse::<Uri>()
        .map_err(|error| ReviewError::InvalidUrl(error.to_string()))?;

    Octocrab::builder()
        .personal_token(token)
        .base_uri(base_uri)
        .map_err(|error| ReviewError::Api {
            message: format!("build client failed: {error}"),
        })?
        .build()
        .map_err(|error| map_octocrab_error("build client", &error))
}
