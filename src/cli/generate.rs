use anyhow::{bail, Result};

use crate::config::SousConfig;
use crate::recipe::pipeline::{CommitIntent, GenerateOutcome, GenerateRequest};

/// Generate a recipe from a free-form intent and commit it.
///
/// The one-shot CLI always persists; the draft staging area is a library
/// surface for long-lived hosts that keep one pipeline alive.
pub async fn generate(
    config: &SousConfig,
    intent: &str,
    owner: &str,
    dietary: Vec<String>,
    allergens: Vec<String>,
) -> Result<()> {
    let pipeline = super::build_pipeline(config)?;

    let request = GenerateRequest {
        intent: intent.to_string(),
        owner: owner.to_string(),
        dietary_prefs: dietary,
        allergens,
        commit: CommitIntent::Persist,
    };

    match pipeline.generate_recipe(request).await? {
        GenerateOutcome::Recipe(recipe) => {
            println!("Committed recipe:");
            super::print_recipe(&recipe);
        }
        // Persist intent never yields a draft
        GenerateOutcome::Draft(draft) => {
            bail!("persist commit produced draft {}", draft.id)
        }
    }

    Ok(())
}
