//! Test helpers for building GitHub API response fixtures.
//!
//! These builders produce the JSON bodies that the gateway decodes, so that
//! unit and behavioural tests can seed mock servers without repeating the
//! payload shapes.
//!
//! # Examples
//!
//! ```
//! use patchwise::github::models::test_support::{contents_json, pull_request_json};
//!
//! let pr = pull_request_json(42, "abc123");
//! assert_eq!(pr["head"]["sha"], "abc123");
//!
//! let contents = contents_json("fn main() {}\n");
//! assert_eq!(contents["encoding"], "base64");
//! ```

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};

/// Builds a pull request body with the given number and head commit.
#[must_use]
pub fn pull_request_json(number: u64, head_sha: &str) -> Value {
    json!({
        "number": number,
        "title": format!("Pull request {number}"),
        "state": "open",
        "head": { "sha": head_sha, "ref": "feature" }
    })
}

/// Builds one entry of the pull request files listing.
#[must_use]
pub fn changed_file_json(filename: &str, patch: Option<&str>) -> Value {
    json!({
        "filename": filename,
        "status": "modified",
        "patch": patch
    })
}

/// Builds a contents API body carrying `text` as base64, wrapped at 60
/// characters the way GitHub wraps it.
#[must_use]
pub fn contents_json(text: &str) -> Value {
    let encoded = STANDARD.encode(text);
    let wrapped = encoded
        .as_bytes()
        .chunks(60)
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join("\n");
    json!({
        "type": "file",
        "encoding": "base64",
        "content": wrapped
    })
}

/// Builds an installation access token response.
#[must_use]
pub fn installation_token_json(token: &str, expires_at: &str) -> Value {
    json!({
        "token": token,
        "expires_at": expires_at,
        "permissions": { "pull_requests": "write", "contents": "read" }
    })
}
