//! Embedding provider abstraction and implementations.
//!
//! This module defines the interface for text embedding generation and
//! provides a local FastEmbed-backed implementation.
//!
//! The abstraction allows the system to swap embedding models without
//! changing the startup indexing or per-request pipeline logic, and lets
//! tests substitute deterministic fakes.

pub mod fastembed;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Model inference failed
    #[error("Embedding generation failed: {0}")]
    ModelError(String),

    /// Configuration error (e.g., model files unavailable)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Other unexpected errors
    #[error("Unexpected error: {0}")]
    Other(String),
}

/// Result type for embedding operations.
pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

/// Trait for text embedding providers.
///
/// Implementors map text to fixed-length vectors. The trait is async to
/// support API-based providers; the local FastEmbed implementation runs the
/// model behind a lock.
///
/// Empty input text must embed to a well-defined vector rather than fail:
/// the corpus contains documents whose extraction yielded no usable text,
/// and those still flow through classification and ranking.
///
/// Batch throughput matters more than single-item latency: startup indexing
/// must use `embed_batch` over the whole corpus rather than per-item calls.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for the given text.
    ///
    /// # Arguments
    /// * `text` - The input text to embed (should be pre-normalized)
    ///
    /// # Errors
    /// Returns `EmbeddingError` if the embedding generation fails
    async fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>>;

    /// Generate embeddings for multiple texts in a single batch.
    ///
    /// # Arguments
    /// * `texts` - Slice of text inputs to embed
    ///
    /// # Returns
    /// A vector of embedding vectors, in the same order as the input texts
    ///
    /// # Errors
    /// Returns `EmbeddingError` if any embedding generation fails; the whole
    /// batch is aborted
    async fn embed_batch(&self, texts: &[&str]) -> EmbeddingResult<Vec<Vec<f32>>>;

    /// Get the dimension of embeddings produced by this provider.
    fn dimension(&self) -> usize;

    /// Get the model name/identifier for this provider.
    fn model_name(&self) -> &str;
}

/// Normalizes raw free text into the canonical form used for embedding.
///
/// This function applies the following transformations:
/// - Converts to lowercase
/// - Replaces every non-alphanumeric, non-whitespace character with a space
/// - Collapses whitespace runs to a single space
/// - Trims leading/trailing whitespace
///
/// Empty input yields an empty string. The function is pure and idempotent:
/// `normalize_text(normalize_text(s)) == normalize_text(s)`.
///
/// # Example
/// ```ignore
/// let normalized = normalize_text("  Micro-gravity:  Effects!  ");
/// assert_eq!(normalized, "micro gravity effects");
/// ```
pub fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let replaced: String = lowered
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text_basic() {
        assert_eq!(normalize_text("Hello World"), "hello world");
        assert_eq!(normalize_text("  Multiple   Spaces  "), "multiple spaces");
        assert_eq!(normalize_text("UPPERCASE"), "uppercase");
        assert_eq!(normalize_text("   "), "");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_normalize_text_strips_punctuation() {
        assert_eq!(
            normalize_text("Micro-gravity: effects (on) cells!"),
            "micro gravity effects on cells"
        );
        assert_eq!(normalize_text("a.b,c;d"), "a b c d");
        assert_eq!(normalize_text("100% of 42 samples"), "100 of 42 samples");
    }

    #[test]
    fn test_normalize_text_idempotent() {
        let inputs = [
            "Plant & Microbial Biology!",
            "  Radiation -- Biology  ",
            "already normalized text",
            "",
        ];
        for input in inputs {
            let once = normalize_text(input);
            assert_eq!(normalize_text(&once), once, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_normalize_text_unicode() {
        // Alphanumeric characters outside ASCII survive; symbols do not.
        assert_eq!(normalize_text("Größe µ-gravity"), "größe µ gravity");
    }
}
