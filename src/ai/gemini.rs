//! Gemini `generateContent` implementation of the feedback model.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::github::ReviewError;

use super::model::FeedbackModel;

/// Default Gemini REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Default model identifier.
pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";
/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Configuration for [`GeminiFeedbackModel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    /// Base API URL (e.g., `https://generativelanguage.googleapis.com/v1beta`).
    pub base_url: String,
    /// Model identifier placed in the request path.
    pub model: String,
    /// API key sent in the `x-goog-api-key` header.
    pub api_key: Option<String>,
    /// HTTP timeout.
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GeminiConfig {
    /// Constructs configuration with required API settings.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            api_key,
            timeout,
        }
    }
}

/// Blocking Gemini client.
#[derive(Debug, Clone, Default)]
pub struct GeminiFeedbackModel {
    config: GeminiConfig,
}

impl GeminiFeedbackModel {
    /// Creates a model from explicit configuration.
    #[must_use]
    pub const fn new(config: GeminiConfig) -> Self {
        Self { config }
    }

    fn extract_api_key(&self) -> Result<&str, ReviewError> {
        self.config
            .api_key
            .as_deref()
            .ok_or(ReviewError::MissingCredentials {
                name: "AI API key (use --ai-api-key, PATCHWISE_AI_API_KEY, or GEMINI_API_KEY)",
            })
    }

    fn create_http_client(&self) -> Result<Client, ReviewError> {
        Client::builder()
            .timeout(self.config.timeout)
            .build()
            .map_err(|error| ReviewError::Configuration {
                message: format!("failed to configure AI HTTP client: {error}"),
            })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

impl FeedbackModel for GeminiFeedbackModel {
    fn generate(&self, prompt: &str) -> Result<String, ReviewError> {
        let api_key = self.extract_api_key()?;
        let payload = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .create_http_client()?
            .post(self.endpoint())
            .header(API_KEY_HEADER, api_key)
            .json(&payload)
            .send()
            .map_err(|error| ReviewError::Network {
                message: format!("AI request transport failed: {error}"),
            })?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            let body = response.text().map_or_else(
                |_| "(failed to read error response body)".to_owned(),
                |content| truncate_for_message(content.as_str(), 160),
            );
            return Err(ReviewError::Model {
                message: format!("AI request failed with status {}: {body}", status.as_u16()),
            });
        }

        let response_payload: GenerateContentResponse =
            response.json().map_err(|error| ReviewError::Decode {
                what: "AI response",
                message: error.to_string(),
            })?;

        first_candidate_text(&response_payload)
            .filter(|text| !text.trim().is_empty())
            .map(ToOwned::to_owned)
            .ok_or_else(|| ReviewError::Model {
                message: "AI response did not contain candidate text".to_owned(),
            })
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Text of the first part of the first candidate.
fn first_candidate_text(response: &GenerateContentResponse) -> Option<&str> {
    response
        .candidates
        .first()?
        .content
        .as_ref()?
        .parts
        .first()?
        .text
        .as_deref()
}

fn truncate_for_message(message: &str, max_chars: usize) -> String {
    let mut output: String = message.chars().take(max_chars).collect();
    if message.chars().nth(max_chars).is_some() {
        output.push_str("...");
    }
    output
}

#[cfg(test)]
#[path = "gemini_tests.rs"]
mod tests;
