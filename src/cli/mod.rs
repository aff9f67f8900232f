//! One-shot CLI commands.
//!
//! Each command loads config, wires the providers and stores into a
//! [`RecipePipeline`], runs a single operation, and prints the result.

pub mod batch;
pub mod generate;
pub mod list;
pub mod modify;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::config::SousConfig;
use crate::recipe::drafts::DraftStore;
use crate::recipe::pipeline::RecipePipeline;
use crate::recipe::repository::RecipeRepository;
use crate::recipe::types::Recipe;

/// Wire config → providers → stores → pipeline.
pub fn build_pipeline(config: &SousConfig) -> Result<RecipePipeline> {
    let conn = crate::db::open_database(config.resolved_db_path())?;
    let repository = Arc::new(RecipeRepository::new(conn));

    let provider = crate::generation::create_provider(&config.generation)
        .context("failed to create generation provider")?;
    let generator = crate::generation::RecipeGenerator::new(
        Arc::from(provider),
        Duration::from_secs(config.generation.timeout_secs),
    );

    let embedder = crate::embedding::create_provider(&config.embedding)
        .context("failed to create embedding provider")?;

    Ok(RecipePipeline::new(
        generator,
        Arc::from(embedder),
        Arc::new(DraftStore::new()),
        repository,
        config.pipeline.clone(),
    ))
}

/// Render a recipe for terminal output.
pub(crate) fn print_recipe(recipe: &Recipe) {
    println!("{} [{}]", recipe.name, recipe.id);
    if !recipe.description.is_empty() {
        println!("  {}", recipe.description);
    }
    if !recipe.dietary_tags.is_empty() {
        println!("  dietary: {}", recipe.dietary_tags.join(", "));
    }
    println!(
        "  macros: {:.0} kcal / {:.1}g protein / {:.1}g carbs / {:.1}g fat",
        recipe.macros.calories, recipe.macros.protein, recipe.macros.carbs, recipe.macros.fat
    );
    println!("  ingredients:");
    for ingredient in &recipe.ingredients {
        println!("    - {ingredient}");
    }
    println!("  instructions:");
    for (i, step) in recipe.instructions.iter().enumerate() {
        println!("    {}. {step}", i + 1);
    }
}
