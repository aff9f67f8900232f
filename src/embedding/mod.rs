//! Recipe-to-vector embedding pipeline.
//!
//! Provides the [`EmbeddingProvider`] trait, the system-wide
//! [`EMBEDDING_DIM`], and [`embedding_text`] which flattens a recipe's
//! descriptive fields into the text sent to the provider. Providers are
//! created via [`create_provider`] from configuration.
//!
//! A provider makes exactly one outbound call per invocation and never falls
//! back to a different dimensionality. Failures are surfaced to the caller —
//! retry, defer, and abort decisions belong to the pipeline, not here.

pub mod fake;
pub mod openai;

use crate::error::EmbeddingError;
use async_trait::async_trait;

/// Number of dimensions in the embedding vectors, fixed system-wide.
/// Every persisted recipe carries a vector of exactly this length; deferred
/// embeddings use a zero vector of the same length, never a shorter one.
pub const EMBEDDING_DIM: usize = 1536;

/// Trait for embedding recipe text into vectors.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text into a vector of exactly [`EMBEDDING_DIM`] floats.
    /// One outbound call; no internal retries.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Number of dimensions this provider produces.
    fn dimensions(&self) -> usize {
        EMBEDDING_DIM
    }
}

/// A zero-vector placeholder of the system dimensionality, used when
/// embedding generation is deferred for backfill.
pub fn zero_vector() -> Vec<f32> {
    vec![0.0; EMBEDDING_DIM]
}

/// Concatenate a recipe's descriptive fields into the text that gets
/// embedded. Keeping this in one place means search queries and stored
/// recipes are embedded over the same field layout.
pub fn embedding_text(
    name: &str,
    description: &str,
    ingredients: &[String],
    dietary_tags: &[String],
    category: &str,
) -> String {
    let mut parts = vec![name.to_string()];
    if !description.is_empty() {
        parts.push(description.to_string());
    }
    if !category.is_empty() {
        parts.push(format!("category: {category}"));
    }
    if !ingredients.is_empty() {
        parts.push(format!("ingredients: {}", ingredients.join(", ")));
    }
    if !dietary_tags.is_empty() {
        parts.push(format!("dietary: {}", dietary_tags.join(", ")));
    }
    parts.join("\n")
}

/// Create an embedding provider from config.
///
/// `"openai"` talks to an OpenAI-compatible `/embeddings` endpoint; `"fake"`
/// is deterministic and offline, for tests and local development.
pub fn create_provider(
    config: &crate::config::EmbeddingConfig,
) -> Result<Box<dyn EmbeddingProvider>, EmbeddingError> {
    match config.provider.as_str() {
        "openai" => {
            let provider = openai::OpenAiEmbedder::new(config)?;
            Ok(Box::new(provider))
        }
        "fake" => Ok(Box::new(fake::FakeEmbedder::default())),
        other => Err(EmbeddingError::NotConfigured(format!(
            "unknown embedding provider: {other}. Supported: openai, fake"
        ))),
    }
}
