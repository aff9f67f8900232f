use anyhow::Result;

use crate::config::SousConfig;
use crate::embedding::embedding_text;

/// List a user's recipes: owned, and optionally their favorites.
pub fn list(config: &SousConfig, owner: &str, favorites: bool) -> Result<()> {
    let pipeline = super::build_pipeline(config)?;
    let repository = pipeline.repository();

    let recipes = if favorites {
        repository.list_favorites(owner)?
    } else {
        repository.list_by_owner(owner)?
    };

    if recipes.is_empty() {
        println!("No recipes found.");
        return Ok(());
    }

    println!("{} recipe(s):\n", recipes.len());
    for recipe in &recipes {
        println!(
            "  {} [{}] — {:.0} kcal, {} ingredients",
            recipe.name,
            recipe.id,
            recipe.macros.calories,
            recipe.ingredients.len()
        );
    }
    Ok(())
}

/// Find recipes semantically similar to an existing one.
pub async fn similar(config: &SousConfig, recipe_id: &str, limit: usize) -> Result<()> {
    let pipeline = super::build_pipeline(config)?;
    let repository = pipeline.repository();

    let anchor = repository.get_by_id(recipe_id)?;

    // Embed the anchor's current fields so search and storage agree on layout
    let embedder = crate::embedding::create_provider(&config.embedding)?;
    let text = embedding_text(
        &anchor.name,
        &anchor.description,
        &anchor.ingredients,
        &anchor.dietary_tags,
        &anchor.category,
    );
    let query = embedder.embed(&text).await?;

    let matches = repository.find_similar(&query, limit + 1)?;

    let mut shown = 0usize;
    for m in matches {
        if m.recipe.id == anchor.id {
            continue;
        }
        shown += 1;
        println!(
            "  {}. {} [{}] (distance {:.4})",
            shown, m.recipe.name, m.recipe.id, m.distance
        );
        if shown == limit {
            break;
        }
    }

    if shown == 0 {
        println!("No similar recipes found.");
    }
    Ok(())
}
