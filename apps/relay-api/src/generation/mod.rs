//! Text generation used for AI replies.

pub mod gemini;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::GenerationError;

pub use gemini::GeminiClient;

/// Produces a reply for a prompt.
///
/// Backed by Gemini in production and by scripted stand-ins in tests.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Run `generator` with an upper bound; running out of time is a failure.
pub async fn generate_with_timeout(
    generator: &dyn TextGenerator,
    prompt: &str,
    timeout: Duration,
) -> Result<String, GenerationError> {
    match tokio::time::timeout(timeout, generator.generate(prompt)).await {
        Ok(result) => result,
        Err(_elapsed) => Err(GenerationError::Timeout(timeout)),
    }
}
