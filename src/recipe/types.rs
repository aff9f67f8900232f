//! Core recipe type definitions.
//!
//! Defines [`RecipeCandidate`] (parsed but not yet persisted), [`Macros`]
//! (nutritional totals), [`RecipeDraft`] (a candidate plus computed
//! macros/embedding held under an opaque ID), [`Recipe`] (a persisted,
//! searchable record), and [`Modification`] (the modify-flow request shapes).

use serde::{Deserialize, Serialize};

/// Tag attached to a recipe committed with a zero-vector placeholder, marking
/// it for embedding backfill.
pub const NEEDS_EMBEDDING_TAG: &str = "needs_embedding";

/// A parsed recipe structure produced by generation, before macros and
/// embedding are computed.
///
/// A candidate is only valid when name, at least one ingredient, and at least
/// one instruction are non-empty — see [`RecipeCandidate::validate`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeCandidate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub cuisine: String,
    /// Ordered ingredient lines, e.g. `"2 cups flour"`.
    pub ingredients: Vec<String>,
    /// Ordered preparation steps.
    pub instructions: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl RecipeCandidate {
    /// Check the structural invariants. Returns the violated invariant as an
    /// `Err(&'static str)` so callers can surface the specific failure.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("name must be non-empty");
        }
        if !self.ingredients.iter().any(|i| !i.trim().is_empty()) {
            return Err("at least one ingredient is required");
        }
        if !self.instructions.iter().any(|i| !i.trim().is_empty()) {
            return Err("at least one instruction is required");
        }
        Ok(())
    }
}

/// Nutritional totals derived solely from an ingredient list.
///
/// Every field is non-negative. Recomputation is total: macros are always
/// replaced as a whole, never field by field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Macros {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl Macros {
    pub fn is_non_negative(&self) -> bool {
        self.calories >= 0.0 && self.protein >= 0.0 && self.carbs >= 0.0 && self.fat >= 0.0
    }
}

/// A candidate plus computed macros and embedding, held under an opaque ID
/// prior to promotion. Drafts live only in the in-memory draft store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeDraft {
    /// UUID v7, generated at creation. Opaque; carries no ordering guarantee.
    pub id: String,
    pub owner: String,
    pub candidate: RecipeCandidate,
    pub dietary_tags: Vec<String>,
    pub macros: Macros,
    pub embedding: Vec<f32>,
    pub created_at: String,
}

/// A persisted, searchable recipe record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// UUID v7 primary key. Immutable once assigned.
    pub id: String,
    pub owner: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub cuisine: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub dietary_tags: Vec<String>,
    pub tags: Vec<String>,
    pub macros: Macros,
    /// ISO 8601 creation timestamp.
    pub created_at: String,
    /// ISO 8601 last-modification timestamp.
    pub updated_at: String,
}

impl Recipe {
    /// Candidate view of this recipe, used as the prior recipe in the
    /// modify flow's prompt.
    pub fn as_candidate(&self) -> RecipeCandidate {
        RecipeCandidate {
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            cuisine: self.cuisine.clone(),
            ingredients: self.ingredients.clone(),
            instructions: self.instructions.clone(),
            tags: self.tags.clone(),
        }
    }
}

/// A favorite marker linking a user to a recipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeFavorite {
    pub id: String,
    pub recipe_id: String,
    pub user_id: String,
    pub created_at: String,
}

/// A requested change to an existing recipe, translated into prompt
/// constraints by the generation client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modification {
    /// Scale the whole recipe by a factor (e.g. 2.0 doubles servings).
    Scale { factor: f64 },
    /// Replace ingredients by name, e.g. `{"chicken": "tofu"}`.
    Substitute {
        replacements: Vec<(String, String)>,
    },
    /// Rework the recipe to satisfy new dietary constraints.
    Dietary { constraints: Vec<String> },
    /// Free-form modification request.
    Freeform { request: String },
}

impl std::fmt::Display for Modification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scale { factor } => write!(f, "scale by {factor}"),
            Self::Substitute { replacements } => {
                let pairs: Vec<String> = replacements
                    .iter()
                    .map(|(from, to)| format!("{from} -> {to}"))
                    .collect();
                write!(f, "substitute {}", pairs.join(", "))
            }
            Self::Dietary { constraints } => write!(f, "dietary: {}", constraints.join(", ")),
            Self::Freeform { request } => f.write_str(request),
        }
    }
}
