#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use souschef::config::{EmbeddingFallback, PipelineConfig};
use souschef::db;
use souschef::embedding::fake::FakeEmbedder;
use souschef::generation::fake::FakeGenerator;
use souschef::generation::RecipeGenerator;
use souschef::recipe::drafts::DraftStore;
use souschef::recipe::pipeline::RecipePipeline;
use souschef::recipe::repository::RecipeRepository;

/// Pipeline config tuned for tests: tiny backoff, no pacing delay.
pub fn test_config(fallback: EmbeddingFallback) -> PipelineConfig {
    PipelineConfig {
        embedding_fallback: fallback,
        max_retries: 2,
        retry_base_ms: 1,
        batch_group_size: 2,
        batch_pacing_ms: 0,
    }
}

/// Build a pipeline over an in-memory database with the given fakes.
pub fn test_pipeline_with(
    generator: FakeGenerator,
    embedder: FakeEmbedder,
    fallback: EmbeddingFallback,
) -> RecipePipeline {
    let conn = db::open_memory_database().unwrap();
    let repository = Arc::new(RecipeRepository::new(conn));
    let generator = RecipeGenerator::new(Arc::new(generator), Duration::from_secs(5));

    RecipePipeline::new(
        generator,
        Arc::new(embedder),
        Arc::new(DraftStore::new()),
        repository,
        test_config(fallback),
    )
}

/// Default test pipeline: canned generation, working embedder, reject policy.
pub fn test_pipeline() -> RecipePipeline {
    test_pipeline_with(
        FakeGenerator::default(),
        FakeEmbedder::new(),
        EmbeddingFallback::Reject,
    )
}

/// A canned provider response for a recipe with the given name and
/// ingredients.
pub fn recipe_json(name: &str, ingredients: &[&str]) -> String {
    let ingredients: Vec<String> = ingredients.iter().map(|s| format!("\"{s}\"")).collect();
    format!(
        r#"{{
            "name": "{name}",
            "description": "a test recipe",
            "category": "dinner",
            "cuisine": "test",
            "ingredients": [{}],
            "instructions": ["prep everything", "cook and serve"],
            "tags": []
        }}"#,
        ingredients.join(", ")
    )
}
