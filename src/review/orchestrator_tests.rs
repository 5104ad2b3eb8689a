//! Tests for the review orchestrator against mocked collaborators.

use std::sync::{Arc, Mutex};

use mockall::predicate::always;
use rstest::{fixture, rstest};

use super::{FileChange, ReviewOrchestrator, ReviewSummary};
use crate::ai::FeedbackModel;
use crate::github::error::ReviewError;
use crate::github::gateway::{MockPullRequestGateway, MockReviewPublisher};
use crate::github::locator::{PullRequestLocator, PullRequestNumber};
use crate::github::models::{ChangedFile, PullRequestMetadata, ReviewCommentDraft};
use crate::review::{ReviewComment, map_patch};

const HEAD_SHA: &str = "abc123";
const LIB_PATCH: &str = "@@ -1,2 +1,4 @@\n fn total() -> u32 {\n+    let x = 1;\n+    x\n }";

type Published = Arc<Mutex<Vec<(String, Vec<ReviewCommentDraft>)>>>;

/// Model stub answering by file name; unknown files get an empty answer.
#[derive(Debug)]
struct ScriptedModel {
    responses: Vec<(&'static str, Result<String, ReviewError>)>,
}

impl FeedbackModel for ScriptedModel {
    fn generate(&self, prompt: &str) -> Result<String, ReviewError> {
        self.responses
            .iter()
            .find(|(filename, _)| prompt.contains(&format!("File: {filename}\n")))
            .map_or_else(|| Ok(String::new()), |(_, response)| response.clone())
    }
}

fn model(responses: Vec<(&'static str, Result<String, ReviewError>)>) -> Arc<dyn FeedbackModel> {
    Arc::new(ScriptedModel { responses })
}

#[fixture]
fn locator() -> PullRequestLocator {
    PullRequestLocator::from_repository(
        "https://api.github.com",
        "octo/widgets",
        PullRequestNumber::new(7).expect("number"),
    )
    .expect("locator")
}

fn changed_file(filename: &str, patch: Option<&str>) -> ChangedFile {
    ChangedFile {
        filename: filename.to_owned(),
        status: Some("modified".to_owned()),
        patch: patch.map(ToOwned::to_owned),
    }
}

fn gateway_with_files(files: Vec<ChangedFile>) -> MockPullRequestGateway {
    let mut gateway = MockPullRequestGateway::new();
    gateway
        .expect_pull_request()
        .with(always())
        .times(1)
        .returning(|_| {
            Ok(PullRequestMetadata {
                number: 7,
                title: Some("Add totals".to_owned()),
                head_sha: HEAD_SHA.to_owned(),
            })
        });
    gateway
        .expect_changed_files()
        .times(1)
        .returning(move |_| Ok(files.clone()));
    gateway
}

fn recording_publisher() -> (MockReviewPublisher, Published) {
    let published: Published = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&published);
    let mut publisher = MockReviewPublisher::new();
    publisher
        .expect_publish_review()
        .returning(move |_, commit_sha, drafts| {
            sink.lock()
                .expect("published mutex")
                .push((commit_sha.to_owned(), drafts.to_vec()));
            Ok(())
        });
    (publisher, published)
}

#[rstest]
#[tokio::test]
async fn run_publishes_one_review_per_file(locator: PullRequestLocator) {
    let mut gateway = gateway_with_files(vec![
        changed_file("src/lib.rs", Some(LIB_PATCH)),
        changed_file("config/layout.xml", Some("@@ -0,0 +1 @@\n+<a/>")),
        changed_file("assets/logo.png", None),
    ]);
    gateway
        .expect_file_content()
        .withf(|_, path, git_ref| path == "src/lib.rs" && git_ref == HEAD_SHA)
        .times(1)
        .returning(|_, _, _| Ok("fn total() -> u32 {\n    let x = 1;\n    x\n}".to_owned()));
    let (publisher, published) = recording_publisher();
    let feedback = "ISSUE: unclear name\nLINE: 2\nSUGGESTION: rename x\n---";
    let orchestrator = ReviewOrchestrator::new(
        &gateway,
        &publisher,
        model(vec![("src/lib.rs", Ok(feedback.to_owned()))]),
    );

    let summary = orchestrator.run(&locator).await.expect("run should succeed");

    assert_eq!(
        summary,
        ReviewSummary {
            files_listed: 3,
            files_reviewed: 1,
            files_skipped: 2,
            reviews_published: 1,
            comments_published: 1,
        }
    );
    let reviews = published.lock().expect("published mutex");
    let (commit_sha, drafts) = reviews.first().expect("one review");
    assert_eq!(commit_sha, HEAD_SHA);
    assert_eq!(
        drafts,
        &vec![ReviewCommentDraft {
            path: "src/lib.rs".to_owned(),
            line: 2,
            body: "\nunclear name\n\nSuggestion: rename x".to_owned(),
        }]
    );
}

#[rstest]
#[tokio::test]
async fn run_skips_files_whose_model_call_fails(locator: PullRequestLocator) {
    let mut gateway = gateway_with_files(vec![
        changed_file("src/a.rs", Some(LIB_PATCH)),
        changed_file("src/b.rs", Some(LIB_PATCH)),
    ]);
    gateway
        .expect_file_content()
        .times(2)
        .returning(|_, _, _| Ok("fn total() -> u32 {}".to_owned()));
    let (publisher, published) = recording_publisher();
    let orchestrator = ReviewOrchestrator::new(
        &gateway,
        &publisher,
        model(vec![
            (
                "src/a.rs",
                Err(ReviewError::Model {
                    message: "quota".to_owned(),
                }),
            ),
            ("src/b.rs", Ok("ISSUE: dead code\nLINE: 3".to_owned())),
        ]),
    );

    let summary = orchestrator.run(&locator).await.expect("run should succeed");

    assert_eq!(summary.files_reviewed, 1);
    assert_eq!(summary.files_skipped, 1);
    let reviews = published.lock().expect("published mutex");
    assert_eq!(reviews.len(), 1);
    let drafts = &reviews.first().expect("one review").1;
    assert!(drafts.iter().all(|draft| draft.path == "src/b.rs"));
}

#[rstest]
#[tokio::test]
async fn run_skips_unreadable_files(locator: PullRequestLocator) {
    let mut gateway = gateway_with_files(vec![changed_file("src/lib.rs", Some(LIB_PATCH))]);
    gateway.expect_file_content().returning(|_, _, _| {
        Err(ReviewError::Decode {
            what: "file content",
            message: "invalid utf-8".to_owned(),
        })
    });
    let mut publisher = MockReviewPublisher::new();
    publisher.expect_publish_review().never();
    let orchestrator = ReviewOrchestrator::new(&gateway, &publisher, model(Vec::new()));

    let summary = orchestrator.run(&locator).await.expect("run should succeed");

    assert_eq!(summary.files_reviewed, 0);
    assert_eq!(summary.files_skipped, 1);
}

#[rstest]
#[tokio::test]
async fn run_does_not_publish_empty_reviews(locator: PullRequestLocator) {
    let mut gateway = gateway_with_files(vec![changed_file("src/lib.rs", Some(LIB_PATCH))]);
    gateway
        .expect_file_content()
        .returning(|_, _, _| Ok("fn total() -> u32 {}".to_owned()));
    let mut publisher = MockReviewPublisher::new();
    publisher.expect_publish_review().never();
    let orchestrator = ReviewOrchestrator::new(
        &gateway,
        &publisher,
        model(vec![("src/lib.rs", Ok("Looks good to me.".to_owned()))]),
    );

    let summary = orchestrator.run(&locator).await.expect("run should succeed");

    assert_eq!(summary.files_reviewed, 1);
    assert_eq!(summary.reviews_published, 0);
}

#[rstest]
#[tokio::test]
async fn run_continues_after_a_review_fails_to_post(locator: PullRequestLocator) {
    let mut gateway = gateway_with_files(vec![
        changed_file("src/a.rs", Some(LIB_PATCH)),
        changed_file("src/b.rs", Some(LIB_PATCH)),
    ]);
    gateway
        .expect_file_content()
        .times(2)
        .returning(|_, _, _| Ok("fn total() -> u32 {}".to_owned()));
    let published: Published = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&published);
    let mut publisher = MockReviewPublisher::new();
    publisher
        .expect_publish_review()
        .times(2)
        .returning(move |_, commit_sha, drafts| {
            if drafts.iter().any(|draft| draft.path == "src/a.rs") {
                return Err(ReviewError::Api {
                    message: "create review failed with status 422".to_owned(),
                });
            }
            sink.lock()
                .expect("published mutex")
                .push((commit_sha.to_owned(), drafts.to_vec()));
            Ok(())
        });
    let orchestrator = ReviewOrchestrator::new(
        &gateway,
        &publisher,
        model(vec![
            ("src/a.rs", Ok("ISSUE: x\nLINE: 2".to_owned())),
            ("src/b.rs", Ok("ISSUE: y\nLINE: 3".to_owned())),
        ]),
    );

    let summary = orchestrator.run(&locator).await.expect("run should succeed");

    assert_eq!(
        summary,
        ReviewSummary {
            files_listed: 2,
            files_reviewed: 1,
            files_skipped: 1,
            reviews_published: 1,
            comments_published: 1,
        }
    );
    let reviews = published.lock().expect("published mutex");
    let drafts = &reviews.first().expect("second file published").1;
    assert!(drafts.iter().all(|draft| draft.path == "src/b.rs"));
}

#[rstest]
#[tokio::test]
async fn run_fails_when_pull_request_cannot_load(locator: PullRequestLocator) {
    let mut gateway = MockPullRequestGateway::new();
    gateway.expect_pull_request().returning(|_| {
        Err(ReviewError::Network {
            message: "connection reset".to_owned(),
        })
    });
    gateway.expect_changed_files().never();
    let publisher = MockReviewPublisher::new();
    let orchestrator = ReviewOrchestrator::new(&gateway, &publisher, model(Vec::new()));

    let result = orchestrator.run(&locator).await;

    assert!(matches!(result, Err(ReviewError::Network { .. })));
}

#[rstest]
#[tokio::test]
async fn collect_changes_maps_added_lines(locator: PullRequestLocator) {
    let mut gateway = MockPullRequestGateway::new();
    gateway
        .expect_changed_files()
        .returning(|_| Ok(vec![changed_file("src/lib.rs", Some(LIB_PATCH))]));
    gateway
        .expect_file_content()
        .returning(|_, _, _| Ok("body".to_owned()));
    let publisher = MockReviewPublisher::new();
    let orchestrator = ReviewOrchestrator::new(&gateway, &publisher, model(Vec::new()));

    let (listed, changes) = orchestrator
        .collect_changes(&locator, HEAD_SHA)
        .await
        .expect("collect should succeed");

    assert_eq!(listed, 1);

    assert_eq!(
        changes,
        vec![FileChange {
            path: "src/lib.rs".to_owned(),
            content: "body".to_owned(),
            line_map: map_patch(LIB_PATCH),
        }]
    );
    assert_eq!(
        changes.first().map(|change| change.line_map.changed_lines()),
        Some(vec![2, 3])
    );
}

#[tokio::test]
async fn analyze_falls_back_to_first_added_line() {
    let gateway = MockPullRequestGateway::new();
    let publisher = MockReviewPublisher::new();
    let orchestrator = ReviewOrchestrator::new(
        &gateway,
        &publisher,
        model(vec![("src/lib.rs", Ok("ISSUE: vague\nLINE: 40".to_owned()))]),
    );
    let change = FileChange {
        path: "src/lib.rs".to_owned(),
        content: String::new(),
        line_map: map_patch(LIB_PATCH),
    };

    let comments = orchestrator.analyze(&change).await.expect("analysis");

    assert_eq!(
        comments,
        vec![ReviewComment {
            line: 2,
            body: "vague".to_owned(),
        }]
    );
}
