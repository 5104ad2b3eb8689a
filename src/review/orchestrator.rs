//! End-to-end review flow for one pull request.

use std::sync::Arc;

use crate::ai::{FeedbackModel, build_review_prompt};
use crate::github::error::ReviewError;
use crate::github::gateway::{PullRequestGateway, ReviewPublisher};
use crate::github::locator::PullRequestLocator;
use crate::github::models::{ChangedFile, ReviewCommentDraft};

use super::feedback::{ReviewComment, parse_feedback};
use super::patch::{LineMap, map_patch};
use super::render::render_comment_body;

const SKIPPED_EXTENSIONS: [&str; 2] = [".xml", ".bin"];

/// A changed file ready for review: its post-image text and added lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    /// Repository-relative path.
    pub path: String,
    /// Post-image file content at the pull request head.
    pub content: String,
    /// Added lines mapped to their post-image numbers.
    pub line_map: LineMap,
}

/// Counts describing one review run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewSummary {
    /// Files GitHub listed for the pull request.
    pub files_listed: usize,
    /// Files whose feedback was obtained and, when non-empty, posted.
    pub files_reviewed: usize,
    /// Files skipped by extension, missing patch, or a failed fetch, model
    /// call, or review post.
    pub files_skipped: usize,
    /// Reviews published, at most one per file.
    pub reviews_published: usize,
    /// Comments published across all reviews.
    pub comments_published: usize,
}

/// Sequences a review: list files, map lines, query the model, parse its
/// feedback, and publish one review per file.
///
/// Per-file problems are logged and the file is skipped. Failing to load the
/// pull request, list its files, or publish a review aborts the run.
pub struct ReviewOrchestrator<'client, Gateway, Publisher>
where
    Gateway: PullRequestGateway,
    Publisher: ReviewPublisher,
{
    gateway: &'client Gateway,
    publisher: &'client Publisher,
    model: Arc<dyn FeedbackModel>,
}

impl<'client, Gateway, Publisher> ReviewOrchestrator<'client, Gateway, Publisher>
where
    Gateway: PullRequestGateway,
    Publisher: ReviewPublisher,
{
    /// Creates an orchestrator over the given collaborators.
    #[must_use]
    pub const fn new(
        gateway: &'client Gateway,
        publisher: &'client Publisher,
        model: Arc<dyn FeedbackModel>,
    ) -> Self {
        Self {
            gateway,
            publisher,
            model,
        }
    }

    /// Lists the pull request's files and loads the reviewable ones at
    /// `head_sha`, returning the listed file count alongside them.
    ///
    /// Failures for individual files are logged and those files omitted;
    /// only a failed listing is an error.
    async fn collect_changes(
        &self,
        locator: &PullRequestLocator,
        head_sha: &str,
    ) -> Result<(usize, Vec<FileChange>), ReviewError> {
        let files = self.gateway.changed_files(locator).await?;
        let listed = files.len();
        Ok((listed, self.load_changes(locator, head_sha, files).await))
    }

    /// Asks the model about one file and parses its answer into comments
    /// anchored to the file's added lines.
    ///
    /// # Errors
    ///
    /// Returns the model's error, or `ReviewError::Io` when the blocking
    /// model call cannot complete.
    pub async fn analyze(&self, change: &FileChange) -> Result<Vec<ReviewComment>, ReviewError> {
        let prompt = build_review_prompt(&change.path, &change.content, &change.line_map);
        let model = Arc::clone(&self.model);
        let response = tokio::task::spawn_blocking(move || model.generate(&prompt))
            .await
            .map_err(|error| ReviewError::Io {
                message: format!("model task failed: {error}"),
            })??;

        Ok(parse_feedback(&response, &change.line_map.changed_lines()))
    }

    /// Reviews the pull request at `locator`.
    ///
    /// # Errors
    ///
    /// Returns the gateway error when the pull request or its file listing
    /// cannot be loaded. A review that fails to post is logged and its file
    /// counted as skipped.
    pub async fn run(&self, locator: &PullRequestLocator) -> Result<ReviewSummary, ReviewError> {
        let metadata = self.gateway.pull_request(locator).await?;
        let (files_listed, changes) = self.collect_changes(locator, &metadata.head_sha).await?;

        let mut summary = ReviewSummary {
            files_listed,
            ..ReviewSummary::default()
        };
        for change in &changes {
            let comments = match self.analyze(change).await {
                Ok(comments) => comments,
                Err(error) => {
                    tracing::warn!(path = %change.path, %error, "model review failed; skipping file");
                    continue;
                }
            };
            let drafts = drafts_for(&change.path, &comments);
            if drafts.is_empty() {
                tracing::debug!(path = %change.path, "no anchored feedback");
                summary.files_reviewed += 1;
                continue;
            }
            if let Err(error) = self
                .publisher
                .publish_review(locator, &metadata.head_sha, &drafts)
                .await
            {
                tracing::warn!(path = %change.path, %error, "posting review failed; skipping file");
                continue;
            }
            summary.files_reviewed += 1;
            summary.reviews_published += 1;
            summary.comments_published += drafts.len();
        }
        summary.files_skipped = files_listed.saturating_sub(summary.files_reviewed);

        tracing::info!(
            files_listed = summary.files_listed,
            files_reviewed = summary.files_reviewed,
            comments_published = summary.comments_published,
            "review finished"
        );
        Ok(summary)
    }

    async fn load_changes(
        &self,
        locator: &PullRequestLocator,
        head_sha: &str,
        files: Vec<ChangedFile>,
    ) -> Vec<FileChange> {
        let mut changes = Vec::with_capacity(files.len());
        for file in files {
            if let Some(change) = self.load_change(locator, head_sha, file).await {
                changes.push(change);
            }
        }
        changes
    }

    async fn load_change(
        &self,
        locator: &PullRequestLocator,
        head_sha: &str,
        file: ChangedFile,
    ) -> Option<FileChange> {
        if has_skipped_extension(&file.filename) {
            tracing::debug!(path = %file.filename, "skipping file by extension");
            return None;
        }
        let Some(patch) = file.patch else {
            tracing::warn!(path = %file.filename, "no patch available; skipping file");
            return None;
        };

        match self
            .gateway
            .file_content(locator, &file.filename, head_sha)
            .await
        {
            Ok(content) => Some(FileChange {
                line_map: map_patch(&patch),
                path: file.filename,
                content,
            }),
            Err(error) => {
                tracing::warn!(path = %file.filename, %error, "failed to read file; skipping");
                None
            }
        }
    }
}

fn has_skipped_extension(filename: &str) -> bool {
    SKIPPED_EXTENSIONS
        .iter()
        .any(|extension| filename.ends_with(extension))
}

fn drafts_for(path: &str, comments: &[ReviewComment]) -> Vec<ReviewCommentDraft> {
    comments
        .iter()
        .map(|comment| ReviewCommentDraft {
            path: path.to_owned(),
            line: comment.line,
            body: render_comment_body(&comment.body),
        })
        .collect()
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
