//! Data models for the pull request data the reviewer reads and writes.
//!
//! Types prefixed with `Api` are deserialisation or serialisation targets for
//! the GitHub REST API. Required fields are non-optional so that a payload
//! missing them fails to decode instead of propagating silent defaults.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use super::error::ReviewError;

#[cfg(feature = "test-support")]
pub mod test_support;

/// Minimal pull request metadata needed to anchor a review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestMetadata {
    /// Pull request number.
    pub number: u64,
    /// Title of the pull request.
    pub title: Option<String>,
    /// Commit SHA at the head of the pull request branch.
    pub head_sha: String,
}

/// A file touched by the pull request, as listed by GitHub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
    /// Repository-relative path of the post-image file.
    pub filename: String,
    /// Change status (`added`, `modified`, `removed`, ...).
    pub status: Option<String>,
    /// Unified diff body; absent for binary or very large files.
    pub patch: Option<String>,
}

/// A line-anchored comment ready to be posted as part of a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewCommentDraft {
    /// File path the comment is attached to.
    pub path: String,
    /// Post-image line number.
    pub line: u32,
    /// Markdown body.
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiPullRequest {
    pub(crate) number: u64,
    pub(crate) title: Option<String>,
    pub(crate) head: ApiCommitRef,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiCommitRef {
    pub(crate) sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiPullRequestFile {
    pub(crate) filename: String,
    pub(crate) status: Option<String>,
    pub(crate) patch: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiContent {
    pub(crate) content: String,
    pub(crate) encoding: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ApiCreateReview<'a> {
    pub(crate) commit_id: &'a str,
    pub(crate) event: &'static str,
    pub(crate) comments: &'a [ReviewCommentDraft],
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiReview {
    pub(crate) id: u64,
}

impl From<ApiPullRequest> for PullRequestMetadata {
    fn from(value: ApiPullRequest) -> Self {
        Self {
            number: value.number,
            title: value.title,
            head_sha: value.head.sha,
        }
    }
}

impl From<ApiPullRequestFile> for ChangedFile {
    fn from(value: ApiPullRequestFile) -> Self {
        Self {
            filename: value.filename,
            status: value.status,
            patch: value.patch,
        }
    }
}

impl ApiContent {
    /// Decodes the file body into UTF-8 text.
    pub(crate) fn decode_text(&self) -> Result<String, ReviewError> {
        let bytes = match self.encoding.as_str() {
            "base64" => {
                let compact: String = self
                    .content
                    .chars()
                    .filter(|character| !character.is_ascii_whitespace())
                    .collect();
                STANDARD
                    .decode(compact)
                    .map_err(|error| ReviewError::Decode {
                        what: "file content",
                        message: error.to_string(),
                    })?
            }
            "utf-8" | "" => self.content.clone().into_bytes(),
            other => {
                return Err(ReviewError::Decode {
                    what: "file content",
                    message: format!("unsupported encoding '{other}'"),
                });
            }
        };

        String::from_utf8(bytes).map_err(|error| ReviewError::Decode {
            what: "file content",
            message: error.to_string(),
        })
    }
}
