//! GitHub pull request access for the reviewer.
//!
//! This module wraps Octocrab to locate pull requests, list their changed
//! files, read post-image content, and publish reviews as a GitHub App
//! installation. Errors are mapped into [`ReviewError`] variants so that
//! callers can surface precise failures without exposing Octocrab internals.

pub mod error;
pub mod gateway;
pub mod locator;
pub mod models;

pub use error::ReviewError;
pub use gateway::{
    DryRunPublisher, InstallationCredentials, OctocrabGateway, PullRequestGateway,
    ReviewPublisher,
};
pub use locator::{
    InstallationId, PullRequestLocator, PullRequestNumber, RepositoryName, RepositoryOwner,
};
pub use models::{ChangedFile, PullRequestMetadata, ReviewCommentDraft};

#[cfg(test)]
pub use gateway::{MockPullRequestGateway, MockReviewPublisher};
