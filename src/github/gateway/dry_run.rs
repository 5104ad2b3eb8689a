//! Review publisher that prints reviews instead of posting them.

use std::io::{self, Write};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::github::error::ReviewError;
use crate::github::locator::PullRequestLocator;
use crate::github::models::ReviewCommentDraft;

use super::ReviewPublisher;

/// Writes each review as plain text to a writer, stdout by default.
#[derive(Debug)]
pub struct DryRunPublisher<W = io::Stdout> {
    writer: Mutex<W>,
}

impl DryRunPublisher {
    /// Creates a publisher printing to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> DryRunPublisher<W> {
    /// Creates a publisher printing to `writer`.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Io`] when a previous write panicked while
    /// holding the writer.
    pub fn into_inner(self) -> Result<W, ReviewError> {
        self.writer.into_inner().map_err(|_| ReviewError::Io {
            message: "dry-run writer lock poisoned".to_owned(),
        })
    }

    fn write_review(
        &self,
        locator: &PullRequestLocator,
        commit_sha: &str,
        comments: &[ReviewCommentDraft],
    ) -> io::Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| io::Error::other("dry-run writer lock poisoned"))?;
        writeln!(
            writer,
            "review for {}/{}#{} at {commit_sha} ({} comments)",
            locator.owner().as_str(),
            locator.repository().as_str(),
            locator.number().get(),
            comments.len()
        )?;
        for comment in comments {
            writeln!(writer, "--- {}:{}", comment.path, comment.line)?;
            writeln!(writer, "{}", comment.body)?;
        }
        writer.flush()
    }
}

#[async_trait]
impl<W: Write + Send> ReviewPublisher for DryRunPublisher<W> {
    async fn publish_review(
        &self,
        locator: &PullRequestLocator,
        commit_sha: &str,
        comments: &[ReviewCommentDraft],
    ) -> Result<(), ReviewError> {
        self.write_review(locator, commit_sha, comments)
            .map_err(|error| ReviewError::Io {
                message: format!("failed to print review: {error}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::DryRunPublisher;
    use crate::github::gateway::ReviewPublisher;
    use crate::github::locator::{PullRequestLocator, PullRequestNumber};
    use crate::github::models::ReviewCommentDraft;

    #[tokio::test]
    async fn prints_each_comment_with_its_anchor() {
        let locator = PullRequestLocator::from_repository(
            "https://api.github.com",
            "octo/widgets",
            PullRequestNumber::new(7).expect("number"),
        )
        .expect("locator");
        let publisher = DryRunPublisher::new(Vec::new());
        let drafts = vec![ReviewCommentDraft {
            path: "src/lib.rs".to_owned(),
            line: 12,
            body: "\nrename".to_owned(),
        }];

        publisher
            .publish_review(&locator, "abc123", &drafts)
            .await
            .expect("dry run should succeed");

        let output = String::from_utf8(publisher.into_inner().expect("writer")).expect("utf-8");
        assert_eq!(
            output,
            "review for octo/widgets#7 at abc123 (1 comments)\n--- src/lib.rs:12\n\nrename\n"
        );
    }
}
