//! Octocrab implementation of the pull request and review gateways.

use async_trait::async_trait;
use octocrab::{Octocrab, Page};

use crate::github::error::ReviewError;
use crate::github::locator::PullRequestLocator;
use crate::github::models::{
    ApiContent, ApiCreateReview, ApiPullRequest, ApiPullRequestFile, ApiReview, ChangedFile,
    PullRequestMetadata, ReviewCommentDraft,
};

use super::client::{InstallationCredentials, build_octocrab_client};
use super::error_mapping::map_octocrab_error;
use super::{PullRequestGateway, ReviewPublisher};

const REVIEW_EVENT: &str = "COMMENT";

/// Octocrab-backed gateway authenticated as a GitHub App installation.
///
/// A client is built per call from a token obtained just before the
/// request, so long review runs never present an expired token.
#[derive(Debug, Clone)]
pub struct OctocrabGateway {
    credentials: InstallationCredentials,
}

impl OctocrabGateway {
    /// Creates a gateway minting tokens through `credentials`.
    #[must_use]
    pub const fn new(credentials: InstallationCredentials) -> Self {
        Self { credentials }
    }

    async fn client(&self, locator: &PullRequestLocator) -> Result<Octocrab, ReviewError> {
        let token = self.credentials.token().await?;
        build_octocrab_client(&token, locator.api_base().as_str())
    }
}

#[async_trait]
impl PullRequestGateway for OctocrabGateway {
    async fn pull_request(
        &self,
        locator: &PullRequestLocator,
    ) -> Result<PullRequestMetadata, ReviewError> {
        self.client(locator)
            .await?
            .get::<ApiPullRequest, _, _>(locator.pull_request_path(), None::<&()>)
            .await
            .map(ApiPullRequest::into)
            .map_err(|error| map_octocrab_error("pull request", &error))
    }

    async fn changed_files(
        &self,
        locator: &PullRequestLocator,
    ) -> Result<Vec<ChangedFile>, ReviewError> {
        let client = self.client(locator).await?;
        let page: Page<ApiPullRequestFile> = client
            .get(locator.files_path(), None::<&()>)
            .await
            .map_err(|error| map_octocrab_error("pull request files", &error))?;

        client
            .all_pages(page)
            .await
            .map(|files| files.into_iter().map(Into::into).collect())
            .map_err(|error| map_octocrab_error("pull request files", &error))
    }

    async fn file_content(
        &self,
        locator: &PullRequestLocator,
        path: &str,
        git_ref: &str,
    ) -> Result<String, ReviewError> {
        let contents_path = locator.contents_path(path)?;
        let content: ApiContent = self
            .client(locator)
            .await?
            .get(contents_path, Some(&[("ref", git_ref)]))
            .await
            .map_err(|error| map_octocrab_error("file contents", &error))?;

        content.decode_text()
    }
}

#[async_trait]
impl ReviewPublisher for OctocrabGateway {
    async fn publish_review(
        &self,
        locator: &PullRequestLocator,
        commit_sha: &str,
        comments: &[ReviewCommentDraft],
    ) -> Result<(), ReviewError> {
        let payload = ApiCreateReview {
            commit_id: commit_sha,
            event: REVIEW_EVENT,
            comments,
        };
        let review: ApiReview = self
            .client(locator)
            .await?
            .post(locator.reviews_path(), Some(&payload))
            .await
            .map_err(|error| map_octocrab_error("create review", &error))?;

        tracing::info!(
            review_id = review.id,
            comments = comments.len(),
            "published review"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "pull_request_tests.rs"]
mod tests;
