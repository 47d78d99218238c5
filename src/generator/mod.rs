//! Narrative generator abstraction and implementations.
//!
//! The narrative generator is an external, network-bound text-in/text-out
//! dependency used for mission synthesis, insight extraction, and dataset
//! question answering. It sits behind a narrow trait so the pipeline logic
//! can be tested with deterministic fakes.
//!
//! Calls are blocking from the caller's perspective: there is no retry or
//! internally-managed timeout beyond the HTTP client's own, and a failed
//! call surfaces as a request failure, never a silent fallback.

pub mod groq;
pub mod prompts;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during narrative generation.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Network or API communication error
    #[error("Generator request failed: {0}")]
    ApiError(String),

    /// Configuration error (e.g., missing API key)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Other unexpected errors
    #[error("Unexpected generator error: {0}")]
    Other(String),
}

/// Result type for generator operations.
pub type GeneratorResult<T> = Result<T, GeneratorError>;

/// Trait for narrative text generators.
///
/// Implementors take a fully-built prompt and return generated text. Prompt
/// construction lives in [`prompts`]; implementations only handle transport.
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    /// Generate text for the given prompt.
    ///
    /// # Errors
    /// Returns `GeneratorError` if the generation call fails; callers must
    /// propagate the failure rather than substituting stale or empty text
    async fn generate(&self, prompt: &str) -> GeneratorResult<String>;

    /// Get the model name/identifier for this generator.
    fn model_name(&self) -> &str;
}
