//! Shared test utilities for the GitHub App and model mocks.

use patchwise::github::models::test_support::installation_token_json;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

pub mod runtime;

/// RSA key the tests sign app assertions with.
pub const TEST_APP_KEY: &str = include_str!("../fixtures/test_app_key.pem");

/// Model identifier used against the mocked Gemini endpoint.
pub const TEST_MODEL: &str = "gemini-test";

/// Path of the installation token exchange behind a GHES-style API base.
pub fn access_tokens_path(installation_id: u64) -> String {
    format!("/api/v3/app/installations/{installation_id}/access_tokens")
}

/// Token exchange mock that grants `token` until `expires_at`.
pub fn granting_exchange(installation_id: u64, token: &str, expires_at: &str) -> Mock {
    Mock::given(method("POST"))
        .and(path(access_tokens_path(installation_id)))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(installation_token_json(token, expires_at)),
        )
}

/// Gemini mock answering every prompt with `text`, served under `/gemini`.
pub fn gemini_reply(text: &str) -> Mock {
    Mock::given(method("POST"))
        .and(path(format!("/gemini/models/{TEST_MODEL}:generateContent")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        })))
}
