//! Error types shared by the reviewer's GitHub, auth, and model layers.

use thiserror::Error;

/// Errors surfaced while configuring the reviewer or talking to its
/// collaborators.
///
/// The line-mapping and feedback-parsing algorithms never produce errors: a
/// malformed patch degrades to context lines and an unresolvable feedback
/// block is dropped, so neither appears here.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReviewError {
    /// A required credential or identifier was not configured.
    #[error("{name} is required")]
    MissingCredentials {
        /// Human-readable name of the missing setting.
        name: &'static str,
    },

    /// The provided URL could not be parsed.
    #[error("URL is invalid: {0}")]
    InvalidUrl(String),

    /// The repository or pull request path is incomplete.
    #[error("pull request must be given as owner/repo and a number, or /owner/repo/pull/<number>")]
    MissingPathSegments,

    /// The pull request number is not a valid integer.
    #[error("pull request number must be a positive integer")]
    InvalidPullRequestNumber,

    /// The installation identifier is not a valid integer.
    #[error("installation ID must be a positive integer")]
    InvalidInstallationId,

    /// The app assertion could not be signed.
    #[error("failed to sign app assertion: {message}")]
    Signing {
        /// Detail from the signing backend.
        message: String,
    },

    /// The installation token exchange returned a non-success status.
    #[error("installation token exchange failed with status {status}: {body}")]
    AuthExchangeFailed {
        /// HTTP status code returned by GitHub.
        status: u16,
        /// Raw response body returned with the failure.
        body: String,
    },

    /// The installation token was rejected by GitHub.
    #[error("GitHub rejected the installation token: {message}")]
    Authentication {
        /// GitHub error message returned with the 401/403 response.
        message: String,
    },

    /// GitHub returned a non-authentication API error.
    #[error("GitHub API error: {message}")]
    Api {
        /// Response detail from GitHub describing the failure.
        message: String,
    },

    /// Networking failed while calling a remote service.
    #[error("network error: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// A response payload did not match its expected schema.
    #[error("failed to decode {what}: {message}")]
    Decode {
        /// The payload being decoded.
        what: &'static str,
        /// Decoder error detail.
        message: String,
    },

    /// The generative model call failed.
    #[error("model request failed: {message}")]
    Model {
        /// Failure detail from the model adapter.
        message: String,
    },

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },

    /// Configuration could not be loaded or is inconsistent.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },
}
