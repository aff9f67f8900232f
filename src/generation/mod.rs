//! Text-generation client for structured recipes.
//!
//! Provides the [`GenerationProvider`] trait (one prompt in, raw text out),
//! concrete providers ([`claude`] for the Anthropic messages API, [`fake`]
//! for tests), and [`RecipeGenerator`], which owns prompt construction,
//! caller-bounded timeouts, and the strict decode-then-validate parse into
//! [`RecipeCandidate`]. Retry policy lives in the pipeline, not here.

pub mod claude;
pub mod fake;
pub mod parse;
pub mod prompt;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::GenerationConfig;
use crate::error::GenerationError;
use crate::recipe::types::{Modification, RecipeCandidate};

/// Trait for text-generation providers.
///
/// Implementations should be stateless and thread-safe. The provider is
/// responsible only for the API call; prompt construction and output parsing
/// belong to [`RecipeGenerator`].
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Send a prompt to the model and return its raw text response.
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Provider name (e.g. "claude", "fake").
    fn provider_name(&self) -> &'static str;

    /// Model name (e.g. "claude-3-5-sonnet-20241022").
    fn model_name(&self) -> &str;
}

/// Create a generation provider from config.
pub fn create_provider(
    config: &GenerationConfig,
) -> Result<Box<dyn GenerationProvider>, GenerationError> {
    match config.provider.as_str() {
        "claude" => {
            let provider = claude::ClaudeProvider::new(config)?;
            Ok(Box::new(provider))
        }
        "fake" => Ok(Box::new(fake::FakeGenerator::default())),
        other => Err(GenerationError::NotConfigured(format!(
            "unknown generation provider: {other}. Supported: claude, fake"
        ))),
    }
}

/// Recipe-shaped front end over a [`GenerationProvider`].
///
/// Every call is bounded by the configured timeout; a timeout is surfaced as
/// [`GenerationError::Timeout`], never as a silent empty result.
#[derive(Clone)]
pub struct RecipeGenerator {
    provider: Arc<dyn GenerationProvider>,
    timeout: Duration,
}

impl RecipeGenerator {
    pub fn new(provider: Arc<dyn GenerationProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Generate a new recipe candidate from a free-form intent.
    pub async fn generate(
        &self,
        intent: &str,
        dietary_prefs: &[String],
        allergens: &[String],
    ) -> Result<RecipeCandidate, GenerationError> {
        let prompt = prompt::generation_prompt(intent, dietary_prefs, allergens);
        self.complete_and_parse(&prompt).await
    }

    /// Generate a modified variant of an existing recipe. The provider is
    /// constrained to the same dish family via the prompt.
    pub async fn generate_modified(
        &self,
        prior: &RecipeCandidate,
        modification: &Modification,
        dietary_prefs: &[String],
        allergens: &[String],
    ) -> Result<RecipeCandidate, GenerationError> {
        let prompt =
            prompt::modification_prompt(prior, modification, dietary_prefs, allergens);
        self.complete_and_parse(&prompt).await
    }

    async fn complete_and_parse(
        &self,
        prompt: &str,
    ) -> Result<RecipeCandidate, GenerationError> {
        tracing::debug!(
            provider = self.provider.provider_name(),
            model = self.provider.model_name(),
            prompt_len = prompt.len(),
            "calling generation provider"
        );

        let raw = tokio::time::timeout(self.timeout, self.provider.complete(prompt))
            .await
            .map_err(|_| GenerationError::Timeout(self.timeout.as_secs()))??;

        parse::parse_candidate(&raw)
    }
}
