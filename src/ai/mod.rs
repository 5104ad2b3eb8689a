//! Generative model integration for producing review feedback.
//!
//! [`FeedbackModel`] is the seam the review flow depends on;
//! [`GeminiFeedbackModel`] implements it against the Gemini REST API.

mod gemini;
mod model;
mod prompt;

pub use gemini::{
    DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS, GeminiConfig, GeminiFeedbackModel,
};
pub use model::FeedbackModel;
pub use prompt::build_review_prompt;
