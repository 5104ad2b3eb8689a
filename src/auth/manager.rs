//! Just-in-time minting and caching of GitHub App credentials.

use crate::github::error::ReviewError;
use crate::github::locator::InstallationId;

use super::assertion::AppAssertionSigner;
use super::clock::{Clock, SystemClock};
use super::credential::Credential;
use super::exchange::{HttpTokenExchange, TokenExchange};

#[derive(Debug, Clone)]
struct InstallationCredential {
    installation_id: InstallationId,
    credential: Credential,
}

/// Produces valid bearer credentials on demand for one GitHub App.
///
/// The manager caches at most one signed assertion and one installation
/// token. Each is reused until the clock reaches sixty seconds before its
/// expiry, then replaced wholesale.
///
/// The manager is not internally synchronised: two flows sharing one
/// instance could both observe an expired token and both exchange. Callers
/// that share it must serialise access, for example behind a `Mutex`.
#[derive(Debug)]
pub struct TokenLifecycleManager<E = HttpTokenExchange, C = SystemClock> {
    signer: AppAssertionSigner,
    exchange: E,
    clock: C,
    assertion: Option<Credential>,
    installation: Option<InstallationCredential>,
}

impl<E, C> TokenLifecycleManager<E, C>
where
    E: TokenExchange,
    C: Clock,
{
    /// Creates a manager with empty caches.
    #[must_use]
    pub const fn new(signer: AppAssertionSigner, exchange: E, clock: C) -> Self {
        Self {
            signer,
            exchange,
            clock,
            assertion: None,
            installation: None,
        }
    }

    /// Returns a signed app assertion, re-signing only when the cached one
    /// is within the refresh margin of expiry.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Signing`] when the assertion cannot be signed.
    pub fn create_assertion(&mut self) -> Result<String, ReviewError> {
        let now = self.clock.now();
        if let Some(cached) = self
            .assertion
            .as_ref()
            .filter(|credential| credential.is_fresh_at(now))
        {
            return Ok(cached.token().to_owned());
        }

        let fresh = self.signer.sign(now)?;
        let token = fresh.token().to_owned();
        self.assertion = Some(fresh);
        Ok(token)
    }

    /// Returns an installation token for `installation_id`, exchanging a
    /// fresh assertion when the cached token is missing, belongs to another
    /// installation, or is within the refresh margin of expiry.
    ///
    /// On failure the cache is left untouched, and a stale token is never
    /// returned in place of a fresh one.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::AuthExchangeFailed`] when GitHub rejects the
    /// exchange, plus any signing, transport, or decoding error.
    pub fn installation_token(
        &mut self,
        installation_id: InstallationId,
    ) -> Result<String, ReviewError> {
        let now = self.clock.now();
        if let Some(cached) = self.installation.as_ref().filter(|cached| {
            cached.installation_id == installation_id && cached.credential.is_fresh_at(now)
        }) {
            return Ok(cached.credential.token().to_owned());
        }

        let assertion = self.create_assertion()?;
        let credential = self.exchange.exchange(installation_id, &assertion)?;
        tracing::debug!(
            installation_id = installation_id.get(),
            expires_at = credential.expires_at(),
            "minted installation token"
        );

        let token = credential.token().to_owned();
        self.installation = Some(InstallationCredential {
            installation_id,
            credential,
        });
        Ok(token)
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
