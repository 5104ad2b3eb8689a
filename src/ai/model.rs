//! Contract for generative models that review code.

use crate::github::ReviewError;

/// Generates free-text review feedback for a prompt.
///
/// Implementations may block; the review flow calls them from the blocking
/// thread pool.
pub trait FeedbackModel: Send + Sync + std::fmt::Debug {
    /// Returns the model's text response to `prompt`.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError`] when the provider call fails or its response
    /// carries no text.
    fn generate(&self, prompt: &str) -> Result<String, ReviewError>;
}
