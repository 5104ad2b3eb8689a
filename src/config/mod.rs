//! Application configuration loaded from CLI, environment, and files.
//!
//! This module provides a unified configuration struct that merges values
//! from command-line arguments, environment variables, and configuration
//! files using ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.patchwise.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `PATCHWISE_*`, with the GitHub Actions
//!    style `GITHUB_*` and `GEMINI_API_KEY` variables as fallbacks
//! 4. **Command-line arguments** – `--repository`/`-r`, `--pr-number`/`-n`,
//!    and friends
//!
//! # Configuration File
//!
//! ```toml
//! app_id = "123456"
//! private_key_path = "/etc/patchwise/app.pem"
//! installation_id = 987654
//! repository = "octocat/hello-world"
//! pr_number = 42
//! ai_model = "gemini-1.5-pro"
//! ```

use std::env;
use std::fs;
use std::time::Duration;

use ortho_config::OrthoConfig;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::ai::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS, GeminiConfig};
use crate::auth::{DEFAULT_EXCHANGE_TIMEOUT_SECS, HttpTokenExchange};
use crate::github::error::ReviewError;
use crate::github::locator::{
    DEFAULT_API_BASE, InstallationId, PullRequestLocator, PullRequestNumber,
    parse_pull_request_number,
};

const LEGACY_APP_ID: &str = "GITHUB_APP_ID";
const LEGACY_PRIVATE_KEY: &str = "GITHUB_PRIVATE_KEY";
const LEGACY_INSTALLATION_ID: &str = "GITHUB_INSTALLATION_ID";
const LEGACY_REPOSITORY: &str = "GITHUB_REPOSITORY";
const LEGACY_PR_NUMBER: &str = "GITHUB_PR_NUMBER";
const LEGACY_AI_API_KEY: &str = "GEMINI_API_KEY";

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Example
///
/// ```no_run
/// use ortho_config::OrthoConfig;
/// use patchwise::PatchwiseConfig;
///
/// let config = PatchwiseConfig::load().expect("failed to load configuration");
/// let locator = config.resolve_locator().expect("pull request required");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "PATCHWISE",
    discovery(
        dotfile_name = ".patchwise.toml",
        config_file_name = "patchwise.toml",
        app_name = "patchwise"
    )
)]
pub struct PatchwiseConfig {
    /// GitHub App identifier used as the assertion issuer.
    ///
    /// Falls back to `GITHUB_APP_ID`.
    #[ortho_config()]
    pub app_id: Option<String>,

    /// GitHub App private key in PEM form. Escaped `\n` sequences are
    /// accepted.
    ///
    /// Falls back to `private_key_path`, then to `GITHUB_PRIVATE_KEY`.
    #[ortho_config()]
    pub private_key: Option<String>,

    /// Path to a PEM file holding the GitHub App private key.
    #[ortho_config()]
    pub private_key_path: Option<String>,

    /// Installation the app acts as.
    ///
    /// Falls back to `GITHUB_INSTALLATION_ID`.
    #[ortho_config()]
    pub installation_id: Option<u64>,

    /// Repository slug in `owner/repo` form.
    ///
    /// Can be provided via:
    /// - CLI: `--repository <SLUG>` or `-r <SLUG>`
    /// - Environment: `PATCHWISE_REPOSITORY` or `GITHUB_REPOSITORY` (legacy)
    #[ortho_config(cli_short = 'r')]
    pub repository: Option<String>,

    /// Pull request number within `repository`.
    ///
    /// Can be provided via:
    /// - CLI: `--pr-number <N>` or `-n <N>`
    /// - Environment: `PATCHWISE_PR_NUMBER` or `GITHUB_PR_NUMBER` (legacy)
    #[ortho_config(cli_short = 'n')]
    pub pr_number: Option<u64>,

    /// Full pull request URL, as an alternative to `repository` and
    /// `pr_number`.
    #[ortho_config(cli_short = 'u')]
    pub pr_url: Option<String>,

    /// GitHub REST API base used with `repository`/`pr_number`.
    #[ortho_config()]
    pub api_base_url: String,

    /// Timeout for one installation token exchange, in seconds.
    #[ortho_config()]
    pub github_timeout_seconds: u64,

    /// Gemini API key.
    ///
    /// Falls back to `GEMINI_API_KEY`.
    #[ortho_config()]
    pub ai_api_key: Option<String>,

    /// Gemini model identifier.
    #[ortho_config()]
    pub ai_model: String,

    /// Gemini REST API base URL.
    #[ortho_config()]
    pub ai_base_url: String,

    /// Timeout for one model request, in seconds.
    #[ortho_config()]
    pub ai_timeout_seconds: u64,

    /// Prints reviews to stdout instead of posting them.
    ///
    /// Note: `ortho_config` does not load boolean values from the
    /// environment, so this is set through the CLI (`--dry-run`/`-d`) or a
    /// configuration file.
    #[ortho_config(cli_short = 'd')]
    pub dry_run: bool,
}

impl Default for PatchwiseConfig {
    fn default() -> Self {
        Self {
            app_id: None,
            private_key: None,
            private_key_path: None,
            installation_id: None,
            repository: None,
            pr_number: None,
            pr_url: None,
            api_base_url: DEFAULT_API_BASE.to_owned(),
            github_timeout_seconds: DEFAULT_EXCHANGE_TIMEOUT_SECS,
            ai_api_key: None,
            ai_model: DEFAULT_MODEL.to_owned(),
            ai_base_url: DEFAULT_BASE_URL.to_owned(),
            ai_timeout_seconds: DEFAULT_TIMEOUT_SECS,
            dry_run: false,
        }
    }
}

impl PatchwiseConfig {
    /// Checks that the configured values are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Configuration`] when `pr_url` is combined with
    /// `repository` or `pr_number`.
    pub fn validate(&self) -> Result<(), ReviewError> {
        if self.pr_url.is_some() && (self.repository.is_some() || self.pr_number.is_some()) {
            return Err(ReviewError::Configuration {
                message: "use either --pr-url or --repository with --pr-number, not both"
                    .to_owned(),
            });
        }
        Ok(())
    }

    /// Resolves the GitHub App identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::MissingCredentials`] when no source provides a
    /// non-blank value.
    pub fn resolve_app_id(&self) -> Result<String, ReviewError> {
        self.app_id
            .clone()
            .or_else(|| legacy_var(LEGACY_APP_ID))
            .filter(|value| !value.trim().is_empty())
            .ok_or(ReviewError::MissingCredentials {
                name: "GitHub App ID (use --app-id, PATCHWISE_APP_ID, or GITHUB_APP_ID)",
            })
    }

    /// Resolves the app private key from inline PEM, a key file, or the
    /// legacy `GITHUB_PRIVATE_KEY` variable, in that order.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Io`] when the key file cannot be read and
    /// [`ReviewError::MissingCredentials`] when no source provides a key.
    pub fn resolve_private_key(&self) -> Result<SecretString, ReviewError> {
        if let Some(inline) = self.private_key.as_deref() {
            return Ok(SecretString::from(inline.to_owned()));
        }

        if let Some(path) = self.private_key_path.as_deref() {
            return fs::read_to_string(path)
                .map(SecretString::from)
                .map_err(|error| ReviewError::Io {
                    message: format!("failed to read private key from {path}: {error}"),
                });
        }

        legacy_var(LEGACY_PRIVATE_KEY)
            .map(SecretString::from)
            .ok_or(ReviewError::MissingCredentials {
                name: concat!(
                    "GitHub App private key (use --private-key, --private-key-path, ",
                    "PATCHWISE_PRIVATE_KEY, or GITHUB_PRIVATE_KEY)"
                ),
            })
    }

    /// Resolves the installation identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::MissingCredentials`] when unset and
    /// [`ReviewError::InvalidInstallationId`] when the value is zero or not a
    /// number.
    pub fn resolve_installation_id(&self) -> Result<InstallationId, ReviewError> {
        if let Some(value) = self.installation_id {
            return InstallationId::new(value);
        }

        legacy_var(LEGACY_INSTALLATION_ID)
            .ok_or(ReviewError::MissingCredentials {
                name: concat!(
                    "installation ID (use --installation-id, ",
                    "PATCHWISE_INSTALLATION_ID, or GITHUB_INSTALLATION_ID)"
                ),
            })
            .and_then(|value| InstallationId::parse(&value))
    }

    /// Resolves the pull request under review.
    ///
    /// A `pr_url` wins; otherwise `repository` and `pr_number` (or their
    /// legacy variables) are combined with `api_base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::MissingCredentials`] when neither form is
    /// configured, and the locator's parse errors for malformed values.
    pub fn resolve_locator(&self) -> Result<PullRequestLocator, ReviewError> {
        if let Some(url) = self.pr_url.as_deref() {
            return PullRequestLocator::parse(url);
        }

        let repository = self
            .repository
            .clone()
            .or_else(|| legacy_var(LEGACY_REPOSITORY))
            .ok_or(ReviewError::MissingCredentials {
                name: "repository (use --pr-url, --repository, or GITHUB_REPOSITORY)",
            })?;
        let number = self.resolve_pr_number()?;

        PullRequestLocator::from_repository(&self.api_base_url, &repository, number)
    }

    fn resolve_pr_number(&self) -> Result<PullRequestNumber, ReviewError> {
        if let Some(value) = self.pr_number {
            return PullRequestNumber::new(value);
        }

        legacy_var(LEGACY_PR_NUMBER)
            .ok_or(ReviewError::MissingCredentials {
                name: "pull request number (use --pr-url, --pr-number, or GITHUB_PR_NUMBER)",
            })
            .and_then(|value| parse_pull_request_number(&value))
    }

    /// Resolves the Gemini API key, falling back to `GEMINI_API_KEY`.
    #[must_use]
    pub fn resolve_ai_api_key(&self) -> Option<String> {
        self.ai_api_key
            .clone()
            .or_else(|| legacy_var(LEGACY_AI_API_KEY))
    }

    /// Builds the installation token exchange for `locator`'s API base,
    /// bounded by `github_timeout_seconds`.
    #[must_use]
    pub fn token_exchange(&self, locator: &PullRequestLocator) -> HttpTokenExchange {
        HttpTokenExchange::new(locator.api_base().as_str())
            .with_timeout(Duration::from_secs(self.github_timeout_seconds))
    }

    /// Builds the Gemini client configuration.
    #[must_use]
    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig::new(
            self.ai_base_url.as_str(),
            self.ai_model.as_str(),
            self.resolve_ai_api_key(),
            Duration::from_secs(self.ai_timeout_seconds),
        )
    }
}

/// Reads a legacy environment variable, treating blank values as unset.
fn legacy_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests;
