//! LLM provider abstraction and implementations.

pub mod openai;

use crate::AiError;

/// Sampling temperature for score refinement.
pub const TEMPERATURE: f32 = 0.2;

/// Trait for LLM providers.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Sends one system + user message pair and returns the assistant text.
    ///
    /// An empty string is a valid answer; interpreting it is up to the
    /// caller.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if the request fails or the endpoint answers
    /// with a non-success status.
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, AiError>;

    /// Model identifier, for logging.
    fn model(&self) -> &str;
}
