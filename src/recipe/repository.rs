//! SQLite-backed recipe repository.
//!
//! Persisted recipes live in the `recipes` table with their embedding in the
//! `recipes_vec` vec0 virtual table. The write paths run inside transactions:
//! [`RecipeRepository::update_atomic`] replaces ingredients, instructions,
//! macros, and the embedding vector as one atomic write, so a reader can
//! never observe macros or an embedding computed against a different
//! ingredient list than the one currently stored.

use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};

use crate::embedding::EMBEDDING_DIM;
use crate::error::{PipelineError, RecordKind};
use crate::recipe::embedding_to_bytes;
use crate::recipe::types::{Macros, Recipe, RecipeCandidate, RecipeFavorite};

/// Replacement set for the modify flow. The pipeline always supplies the full
/// set of ingredients/instructions/macros/embedding together — partial field
/// updates are not part of this contract.
#[derive(Debug)]
pub struct RecipeUpdate {
    pub name: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub macros: Macros,
    pub embedding: Vec<f32>,
    pub tags: Vec<String>,
}

/// A nearest-neighbor match from [`RecipeRepository::find_similar`].
#[derive(Debug)]
pub struct SimilarRecipe {
    pub recipe: Recipe,
    /// L2 distance in embedding space; smaller is more similar.
    pub distance: f64,
}

pub struct RecipeRepository {
    conn: Mutex<Connection>,
}

impl RecipeRepository {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Persist a new recipe. Assigns a UUID v7 id and writes the row and its
    /// embedding vector in one transaction.
    pub fn create(
        &self,
        owner: &str,
        candidate: &RecipeCandidate,
        dietary_tags: &[String],
        macros: Macros,
        embedding: &[f32],
    ) -> Result<Recipe, PipelineError> {
        if embedding.len() != EMBEDDING_DIM {
            return Err(PipelineError::validation(format!(
                "embedding has {} dimensions, expected {EMBEDDING_DIM}",
                embedding.len()
            )));
        }

        let id = uuid::Uuid::now_v7().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO recipes (id, owner, name, description, category, cuisine, \
             ingredients, instructions, dietary_tags, tags, \
             calories, protein, carbs, fat, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?15)",
            params![
                id,
                owner,
                candidate.name,
                candidate.description,
                candidate.category,
                candidate.cuisine,
                to_json(&candidate.ingredients)?,
                to_json(&candidate.instructions)?,
                to_json(dietary_tags)?,
                to_json(&candidate.tags)?,
                macros.calories,
                macros.protein,
                macros.carbs,
                macros.fat,
                now,
            ],
        )?;

        tx.execute(
            "INSERT INTO recipes_vec (id, embedding) VALUES (?1, ?2)",
            params![id, embedding_to_bytes(embedding)],
        )?;

        tx.commit()?;
        tracing::info!(recipe_id = %id, owner = %owner, "recipe created");

        drop(conn);
        self.get_by_id(&id)
    }

    pub fn get_by_id(&self, id: &str) -> Result<Recipe, PipelineError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, owner, name, description, category, cuisine, ingredients, \
             instructions, dietary_tags, tags, calories, protein, carbs, fat, \
             created_at, updated_at FROM recipes WHERE id = ?1",
            params![id],
            row_to_recipe,
        )
        .optional()?
        .ok_or_else(|| PipelineError::not_found(RecordKind::Recipe, id))
    }

    /// Replace ingredients, instructions, macros, and embedding as a single
    /// atomic write keyed by the record id.
    ///
    /// When `expected_updated_at` is given and the stored row has moved on,
    /// the update is rejected with
    /// [`PipelineError::Conflict`]; without it, the serialized transaction
    /// makes the write last-writer-wins.
    pub fn update_atomic(
        &self,
        id: &str,
        update: &RecipeUpdate,
        expected_updated_at: Option<&str>,
    ) -> Result<Recipe, PipelineError> {
        if update.embedding.len() != EMBEDDING_DIM {
            return Err(PipelineError::validation(format!(
                "embedding has {} dimensions, expected {EMBEDDING_DIM}",
                update.embedding.len()
            )));
        }

        let now = chrono::Utc::now().to_rfc3339();

        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let current: Option<String> = tx
            .query_row(
                "SELECT updated_at FROM recipes WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        let current = match current {
            Some(ts) => ts,
            None => return Err(PipelineError::not_found(RecordKind::Recipe, id)),
        };

        if let Some(expected) = expected_updated_at {
            if expected != current {
                return Err(PipelineError::Conflict { id: id.to_string() });
            }
        }

        tx.execute(
            "UPDATE recipes SET name = ?1, description = ?2, ingredients = ?3, \
             instructions = ?4, tags = ?5, calories = ?6, protein = ?7, carbs = ?8, \
             fat = ?9, updated_at = ?10 WHERE id = ?11",
            params![
                update.name,
                update.description,
                to_json(&update.ingredients)?,
                to_json(&update.instructions)?,
                to_json(&update.tags)?,
                update.macros.calories,
                update.macros.protein,
                update.macros.carbs,
                update.macros.fat,
                now,
                id,
            ],
        )?;

        replace_vec(&tx, id, &update.embedding)?;

        tx.commit()?;
        tracing::info!(recipe_id = %id, "recipe updated atomically");

        drop(conn);
        self.get_by_id(id)
    }

    pub fn list_by_owner(&self, owner: &str) -> Result<Vec<Recipe>, PipelineError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, owner, name, description, category, cuisine, ingredients, \
             instructions, dietary_tags, tags, calories, protein, carbs, fat, \
             created_at, updated_at FROM recipes WHERE owner = ?1 ORDER BY created_at DESC",
        )?;
        let recipes = stmt
            .query_map(params![owner], row_to_recipe)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(recipes)
    }

    /// Mark a recipe as a favorite of a user. Idempotent per (recipe, user).
    pub fn add_favorite(
        &self,
        recipe_id: &str,
        user_id: &str,
    ) -> Result<RecipeFavorite, PipelineError> {
        // Ensure the recipe exists so the caller gets NotFound, not an FK error
        self.get_by_id(recipe_id)?;

        let id = uuid::Uuid::now_v7().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO recipe_favorites (id, recipe_id, user_id, created_at) \
             VALUES (?1, ?2, ?3, ?4)",
            params![id, recipe_id, user_id, now],
        )?;

        let favorite = conn.query_row(
            "SELECT id, recipe_id, user_id, created_at FROM recipe_favorites \
             WHERE recipe_id = ?1 AND user_id = ?2",
            params![recipe_id, user_id],
            |row| {
                Ok(RecipeFavorite {
                    id: row.get(0)?,
                    recipe_id: row.get(1)?,
                    user_id: row.get(2)?,
                    created_at: row.get(3)?,
                })
            },
        )?;
        Ok(favorite)
    }

    pub fn remove_favorite(&self, recipe_id: &str, user_id: &str) -> Result<(), PipelineError> {
        let conn = self.conn.lock().unwrap();
        let rows = conn.execute(
            "DELETE FROM recipe_favorites WHERE recipe_id = ?1 AND user_id = ?2",
            params![recipe_id, user_id],
        )?;
        if rows == 0 {
            return Err(PipelineError::not_found(RecordKind::Recipe, recipe_id));
        }
        Ok(())
    }

    /// Recipes a user has favorited, newest favorite first.
    pub fn list_favorites(&self, user_id: &str) -> Result<Vec<Recipe>, PipelineError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT r.id, r.owner, r.name, r.description, r.category, r.cuisine, \
             r.ingredients, r.instructions, r.dietary_tags, r.tags, r.calories, \
             r.protein, r.carbs, r.fat, r.created_at, r.updated_at \
             FROM recipes r JOIN recipe_favorites f ON f.recipe_id = r.id \
             WHERE f.user_id = ?1 ORDER BY f.created_at DESC",
        )?;
        let recipes = stmt
            .query_map(params![user_id], row_to_recipe)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(recipes)
    }

    /// Nearest-neighbor retrieval over the embedding space.
    pub fn find_similar(
        &self,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SimilarRecipe>, PipelineError> {
        let ids: Vec<(String, f64)> = {
            let conn = self.conn.lock().unwrap();
            let mut stmt = conn.prepare(
                "SELECT id, distance FROM recipes_vec WHERE embedding MATCH ?1 \
                 ORDER BY distance LIMIT ?2",
            )?;
            let rows = stmt
                .query_map(
                    params![embedding_to_bytes(embedding), limit as i64],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?)),
                )?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        let mut results = Vec::with_capacity(ids.len());
        for (id, distance) in ids {
            let recipe = self.get_by_id(&id)?;
            results.push(SimilarRecipe { recipe, distance });
        }
        Ok(results)
    }
}

/// Replace the stored embedding inside an open transaction. vec0 tables do
/// not support UPDATE, so this is delete-then-insert.
fn replace_vec(tx: &Transaction, id: &str, embedding: &[f32]) -> Result<(), PipelineError> {
    tx.execute("DELETE FROM recipes_vec WHERE id = ?1", params![id])?;
    tx.execute(
        "INSERT INTO recipes_vec (id, embedding) VALUES (?1, ?2)",
        params![id, embedding_to_bytes(embedding)],
    )?;
    Ok(())
}

fn to_json(list: &[String]) -> Result<String, PipelineError> {
    serde_json::to_string(list).map_err(|e| PipelineError::Storage(e.to_string()))
}

fn from_json(raw: String) -> Vec<String> {
    serde_json::from_str(&raw).unwrap_or_default()
}

fn row_to_recipe(row: &Row<'_>) -> rusqlite::Result<Recipe> {
    Ok(Recipe {
        id: row.get(0)?,
        owner: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        cuisine: row.get(5)?,
        ingredients: from_json(row.get(6)?),
        instructions: from_json(row.get(7)?),
        dietary_tags: from_json(row.get(8)?),
        tags: from_json(row.get(9)?),
        macros: Macros {
            calories: row.get(10)?,
            protein: row.get(11)?,
            carbs: row.get(12)?,
            fat: row.get(13)?,
        },
        created_at: row.get(14)?,
        updated_at: row.get(15)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn test_repo() -> RecipeRepository {
        RecipeRepository::new(db::open_memory_database().unwrap())
    }

    fn candidate(name: &str, ingredients: &[&str]) -> RecipeCandidate {
        RecipeCandidate {
            name: name.into(),
            description: "test".into(),
            category: "dinner".into(),
            cuisine: "test".into(),
            ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
            instructions: vec!["cook it".into()],
            tags: vec![],
        }
    }

    /// Unit vector along the given dimension.
    fn embedding(spike: usize) -> Vec<f32> {
        let mut v = vec![0.0f32; EMBEDDING_DIM];
        v[spike % EMBEDDING_DIM] = 1.0;
        v
    }

    #[test]
    fn create_and_get_round_trips() {
        let repo = test_repo();
        let created = repo
            .create(
                "alice",
                &candidate("Pasta", &["pasta", "tomato"]),
                &["vegetarian".to_string()],
                Macros {
                    calories: 300.0,
                    protein: 10.0,
                    carbs: 50.0,
                    fat: 5.0,
                },
                &embedding(0),
            )
            .unwrap();

        let fetched = repo.get_by_id(&created.id).unwrap();
        assert_eq!(fetched.name, "Pasta");
        assert_eq!(fetched.ingredients, vec!["pasta", "tomato"]);
        assert_eq!(fetched.dietary_tags, vec!["vegetarian"]);
        assert_eq!(fetched.macros.calories, 300.0);
    }

    #[test]
    fn get_unknown_is_not_found() {
        let repo = test_repo();
        assert!(matches!(
            repo.get_by_id("missing"),
            Err(PipelineError::NotFound { .. })
        ));
    }

    #[test]
    fn create_rejects_wrong_dimensionality() {
        let repo = test_repo();
        let err = repo
            .create(
                "alice",
                &candidate("Pasta", &["pasta"]),
                &[],
                Macros::default(),
                &[0.0f32; 10],
            )
            .unwrap_err();
        assert!(matches!(err, PipelineError::Validation { .. }));
    }

    #[test]
    fn update_atomic_replaces_everything_together() {
        let repo = test_repo();
        let created = repo
            .create(
                "alice",
                &candidate("Bowl", &["chicken", "rice"]),
                &[],
                Macros {
                    calories: 435.0,
                    protein: 47.3,
                    carbs: 45.0,
                    fat: 5.4,
                },
                &embedding(1),
            )
            .unwrap();

        let update = RecipeUpdate {
            name: created.name.clone(),
            description: created.description.clone(),
            ingredients: vec!["tofu".into(), "rice".into()],
            instructions: vec!["cook tofu".into()],
            macros: Macros {
                calories: 299.0,
                protein: 14.3,
                carbs: 47.3,
                fat: 6.4,
            },
            embedding: embedding(2),
            tags: created.tags.clone(),
        };
        let updated = repo.update_atomic(&created.id, &update, None).unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.ingredients, vec!["tofu", "rice"]);
        assert_eq!(updated.macros.protein, 14.3);

        // The stored vector moved with the row
        let similar = repo.find_similar(&embedding(2), 1).unwrap();
        assert_eq!(similar[0].recipe.id, created.id);
    }

    #[test]
    fn update_atomic_with_stale_snapshot_conflicts() {
        let repo = test_repo();
        let created = repo
            .create(
                "alice",
                &candidate("Bowl", &["rice"]),
                &[],
                Macros::default(),
                &embedding(3),
            )
            .unwrap();

        let update = RecipeUpdate {
            name: created.name.clone(),
            description: created.description.clone(),
            ingredients: vec!["rice".into(), "egg".into()],
            instructions: created.instructions.clone(),
            macros: Macros::default(),
            embedding: embedding(4),
            tags: vec![],
        };

        let err = repo
            .update_atomic(&created.id, &update, Some("2001-01-01T00:00:00Z"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Conflict { .. }));

        // With the correct snapshot the update goes through
        repo.update_atomic(&created.id, &update, Some(&created.updated_at))
            .unwrap();
    }

    #[test]
    fn update_unknown_is_not_found() {
        let repo = test_repo();
        let update = RecipeUpdate {
            name: "x".into(),
            description: String::new(),
            ingredients: vec!["a".into()],
            instructions: vec!["b".into()],
            macros: Macros::default(),
            embedding: embedding(0),
            tags: vec![],
        };
        assert!(matches!(
            repo.update_atomic("missing", &update, None),
            Err(PipelineError::NotFound { .. })
        ));
    }

    #[test]
    fn favorites_participate_in_user_recipe_listing() {
        let repo = test_repo();
        let own = repo
            .create("alice", &candidate("Mine", &["rice"]), &[], Macros::default(), &embedding(5))
            .unwrap();
        let other = repo
            .create("bob", &candidate("Theirs", &["pasta"]), &[], Macros::default(), &embedding(6))
            .unwrap();

        repo.add_favorite(&other.id, "alice").unwrap();

        let owned = repo.list_by_owner("alice").unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].id, own.id);

        let favorites = repo.list_favorites("alice").unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].id, other.id);

        repo.remove_favorite(&other.id, "alice").unwrap();
        assert!(repo.list_favorites("alice").unwrap().is_empty());
    }

    #[test]
    fn favorite_unknown_recipe_is_not_found() {
        let repo = test_repo();
        assert!(matches!(
            repo.add_favorite("missing", "alice"),
            Err(PipelineError::NotFound { .. })
        ));
    }

    #[test]
    fn find_similar_orders_by_distance() {
        let repo = test_repo();
        let near = repo
            .create("alice", &candidate("Near", &["a"]), &[], Macros::default(), &embedding(7))
            .unwrap();
        let _far = repo
            .create("alice", &candidate("Far", &["b"]), &[], Macros::default(), &embedding(200))
            .unwrap();

        let mut query = embedding(7);
        query[8] = 0.1; // slightly off the "near" vector
        let results = repo.find_similar(&query, 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].recipe.id, near.id);
        assert!(results[0].distance < results[1].distance);
    }
}
