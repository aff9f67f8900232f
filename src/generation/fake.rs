//! Fake generation provider for testing.
//!
//! Returns deterministic responses based on prompt substring matching, so
//! tests run without network access or API costs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use super::GenerationProvider;
use crate::error::GenerationError;

/// A fake text-generation provider.
///
/// Responses are matched by checking whether the prompt contains a registered
/// substring (case-insensitive). If no match is found, returns the default
/// response or an error.
pub struct FakeGenerator {
    /// Map of prompt substring -> response
    responses: RwLock<HashMap<String, String>>,
    default_response: Option<String>,
}

impl Default for FakeGenerator {
    fn default() -> Self {
        Self {
            responses: RwLock::new(HashMap::new()),
            default_response: Some(SAMPLE_RECIPE_JSON.to_string()),
        }
    }
}

/// A plausible structured recipe, used as the default canned response.
pub const SAMPLE_RECIPE_JSON: &str = r#"{
    "name": "Tomato Basil Pasta",
    "description": "Simple weeknight pasta with a fresh tomato sauce",
    "category": "dinner",
    "cuisine": "italian",
    "ingredients": ["8 oz pasta", "2 tomato", "1 bunch basil", "2 tbsp olive oil"],
    "instructions": ["Boil the pasta until al dente", "Simmer tomatoes in olive oil", "Toss with basil and serve"],
    "tags": ["vegetarian"]
}"#;

impl FakeGenerator {
    /// A fake with no registered responses and no default — every call fails.
    pub fn empty() -> Self {
        Self {
            responses: RwLock::new(HashMap::new()),
            default_response: None,
        }
    }

    /// A fake that returns `response` for prompts containing `prompt_contains`.
    pub fn with_response(prompt_contains: &str, response: &str) -> Self {
        let generator = Self::empty();
        generator.add_response(prompt_contains, response);
        generator
    }

    /// Register a response for prompts containing a specific substring.
    pub fn add_response(&self, prompt_contains: &str, response: &str) {
        self.responses
            .write()
            .unwrap()
            .insert(prompt_contains.to_string(), response.to_string());
    }

    /// Set the default response when no pattern matches.
    pub fn with_default_response(mut self, response: &str) -> Self {
        self.default_response = Some(response.to_string());
        self
    }
}

#[async_trait]
impl GenerationProvider for FakeGenerator {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        let responses = self.responses.read().unwrap();

        let prompt_lower = prompt.to_lowercase();
        for (pattern, response) in responses.iter() {
            if prompt_lower.contains(&pattern.to_lowercase()) {
                return Ok(response.clone());
            }
        }

        match &self.default_response {
            Some(response) => Ok(response.clone()),
            None => Err(GenerationError::RequestFailed(format!(
                "FakeGenerator: no response configured for prompt (first 100 chars): {}",
                super::parse::truncate(prompt, 100)
            ))),
        }
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }
}
