//! Patchwise library crate: an automated pull request reviewer running as a
//! GitHub App.
//!
//! The library maps unified-diff patches onto post-image line numbers, asks
//! a generative model for feedback on each changed file, parses that
//! feedback into line-anchored comments, and publishes them as a `COMMENT`
//! review. Authentication uses short-lived app assertions exchanged for
//! installation tokens that are cached and refreshed just in time.

pub mod ai;
pub mod auth;
pub mod config;
pub mod github;
pub mod review;

pub use ai::{FeedbackModel, GeminiConfig, GeminiFeedbackModel};
pub use auth::{AppAssertionSigner, HttpTokenExchange, SystemClock, TokenLifecycleManager};
pub use config::PatchwiseConfig;
pub use github::{
    DryRunPublisher, InstallationCredentials, OctocrabGateway, PullRequestLocator, ReviewError,
};
pub use review::{ReviewOrchestrator, ReviewSummary};
