//! GitHub App authentication: assertion signing and installation tokens.
//!
//! [`TokenLifecycleManager`] hands out a valid installation token on demand.
//! It signs a ten-minute RS256 assertion with the app's private key, exchanges
//! it for an installation token, and caches both until sixty seconds before
//! their respective expiries.

mod assertion;
mod clock;
mod credential;
mod exchange;
mod manager;

pub use assertion::{AppAssertionSigner, AppClaims};
#[cfg(any(test, feature = "test-support"))]
pub use clock::ManualClock;
pub use clock::{Clock, SystemClock};
pub use credential::{ASSERTION_LIFETIME_SECS, Credential, REFRESH_MARGIN_SECS};
pub use exchange::{
    DEFAULT_EXCHANGE_TIMEOUT_SECS, GITHUB_V3_ACCEPT, HttpTokenExchange, TokenExchange,
};
pub use manager::TokenLifecycleManager;
