//! Gateways for reading pull requests and publishing reviews.
//!
//! The traits keep the review flow independent of transport so it can be
//! exercised against mocks. [`OctocrabGateway`] talks to GitHub with a fresh
//! installation token per call; [`DryRunPublisher`] prints reviews instead of
//! posting them.

mod client;
mod dry_run;
mod error_mapping;
mod pull_request;

pub use client::InstallationCredentials;
pub use dry_run::DryRunPublisher;
pub use pull_request::OctocrabGateway;

use async_trait::async_trait;

use crate::github::error::ReviewError;
use crate::github::locator::PullRequestLocator;
use crate::github::models::{ChangedFile, PullRequestMetadata, ReviewCommentDraft};

/// Read access to a pull request and its post-image files.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PullRequestGateway: Send + Sync {
    /// Fetch the pull request metadata, including the head commit.
    async fn pull_request(
        &self,
        locator: &PullRequestLocator,
    ) -> Result<PullRequestMetadata, ReviewError>;

    /// Fetch every file the pull request touches, across all pages.
    async fn changed_files(
        &self,
        locator: &PullRequestLocator,
    ) -> Result<Vec<ChangedFile>, ReviewError>;

    /// Fetch the text of `path` as it exists at `git_ref`.
    async fn file_content(
        &self,
        locator: &PullRequestLocator,
        path: &str,
        git_ref: &str,
    ) -> Result<String, ReviewError>;
}

/// Destination for line-anchored review comments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewPublisher: Send + Sync {
    /// Publish `comments` as one `COMMENT` review against `commit_sha`.
    async fn publish_review(
        &self,
        locator: &PullRequestLocator,
        commit_sha: &str,
        comments: &[ReviewCommentDraft],
    ) -> Result<(), ReviewError>;
}
