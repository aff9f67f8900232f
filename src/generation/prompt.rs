//! Prompt construction for recipe generation.
//!
//! The provider is always asked for a single JSON object matching
//! [`RecipeCandidate`](crate::recipe::types::RecipeCandidate). When a prior
//! recipe is present the prompt pins the provider to a modified variant of
//! the same dish rather than an unrelated recipe — that identity constraint
//! is a prompt contract, not a structural one.

use crate::recipe::types::{Modification, RecipeCandidate};

const FORMAT_INSTRUCTIONS: &str = "Respond with a single JSON object and nothing else, using exactly these keys: \
\"name\" (string), \"description\" (string), \"category\" (string), \
\"cuisine\" (string), \"ingredients\" (array of strings, each like \"2 cups flour\"), \
\"instructions\" (array of strings), \"tags\" (array of strings).";

/// Build the prompt for a new recipe from a free-form intent.
pub fn generation_prompt(intent: &str, dietary_prefs: &[String], allergens: &[String]) -> String {
    let mut prompt = format!("Create a recipe for the following request: {intent}\n");

    if !dietary_prefs.is_empty() {
        prompt.push_str(&format!(
            "The recipe must satisfy these dietary preferences: {}.\n",
            dietary_prefs.join(", ")
        ));
    }
    if !allergens.is_empty() {
        prompt.push_str(&format!(
            "The recipe must not contain any of these allergens: {}.\n",
            allergens.join(", ")
        ));
    }

    prompt.push('\n');
    prompt.push_str(FORMAT_INSTRUCTIONS);
    prompt
}

/// Build the prompt for modifying an existing recipe.
///
/// The prior recipe is serialized into the prompt and the provider is told to
/// keep the dish's identity while applying the requested modification.
pub fn modification_prompt(
    prior: &RecipeCandidate,
    modification: &Modification,
    dietary_prefs: &[String],
    allergens: &[String],
) -> String {
    let prior_json =
        serde_json::to_string_pretty(prior).unwrap_or_else(|_| prior.name.clone());

    let mut prompt = format!(
        "Here is an existing recipe:\n{prior_json}\n\n\
         Produce a modified version of this same dish. Keep its identity — the result \
         must still clearly be {name} — and apply this change: {modification}.\n",
        name = prior.name,
    );

    match modification {
        Modification::Scale { factor } => {
            prompt.push_str(&format!(
                "Scale every ingredient quantity by {factor}. Keep the instructions \
                 consistent with the new quantities.\n"
            ));
        }
        Modification::Substitute { replacements } => {
            for (from, to) in replacements {
                prompt.push_str(&format!(
                    "Replace every use of {from} with {to}, adjusting instructions accordingly.\n"
                ));
            }
        }
        Modification::Dietary { constraints } => {
            prompt.push_str(&format!(
                "Rework the recipe so it satisfies: {}.\n",
                constraints.join(", ")
            ));
        }
        Modification::Freeform { .. } => {}
    }

    if !dietary_prefs.is_empty() {
        prompt.push_str(&format!(
            "The result must satisfy these dietary preferences: {}.\n",
            dietary_prefs.join(", ")
        ));
    }
    if !allergens.is_empty() {
        prompt.push_str(&format!(
            "The result must not contain any of these allergens: {}.\n",
            allergens.join(", ")
        ));
    }

    prompt.push('\n');
    prompt.push_str(FORMAT_INSTRUCTIONS);
    prompt
}
