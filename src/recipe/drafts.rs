//! In-memory draft store.
//!
//! Drafts are recipe candidates plus computed macros/embedding, held under an
//! opaque UUID until the caller promotes or discards them. The store is a
//! mutex-guarded map: updates replace the draft as a whole, so concurrent
//! writers serialize per store and a reader never observes a torn draft.
//! Drafts have no automatic expiry; `get` after `delete` fails with
//! `NotFound`.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{PipelineError, RecordKind};
use crate::recipe::types::{Macros, RecipeCandidate, RecipeDraft};

#[derive(Default)]
pub struct DraftStore {
    drafts: Mutex<HashMap<String, RecipeDraft>>,
}

/// Fields a caller may change on an existing draft. `None` leaves the field
/// as it was; macros and embedding always travel with the candidate edit that
/// produced them.
#[derive(Debug, Default)]
pub struct DraftUpdate {
    pub candidate: Option<RecipeCandidate>,
    pub macros: Option<Macros>,
    pub embedding: Option<Vec<f32>>,
}

impl DraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new draft. Returns the generated opaque draft ID.
    pub fn save(
        &self,
        candidate: RecipeCandidate,
        dietary_tags: Vec<String>,
        macros: Macros,
        embedding: Vec<f32>,
        owner: &str,
    ) -> String {
        let id = uuid::Uuid::now_v7().to_string();
        let draft = RecipeDraft {
            id: id.clone(),
            owner: owner.to_string(),
            candidate,
            dietary_tags,
            macros,
            embedding,
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        self.drafts.lock().unwrap().insert(id.clone(), draft);
        tracing::debug!(draft_id = %id, "draft saved");
        id
    }

    pub fn get(&self, draft_id: &str) -> Result<RecipeDraft, PipelineError> {
        self.drafts
            .lock()
            .unwrap()
            .get(draft_id)
            .cloned()
            .ok_or_else(|| PipelineError::not_found(RecordKind::Draft, draft_id))
    }

    /// Apply an update to an existing draft. The replacement happens under
    /// the store lock, so updates are serialized and never interleave at the
    /// field level (last writer wins).
    pub fn update(&self, draft_id: &str, update: DraftUpdate) -> Result<(), PipelineError> {
        let mut drafts = self.drafts.lock().unwrap();
        let draft = drafts
            .get_mut(draft_id)
            .ok_or_else(|| PipelineError::not_found(RecordKind::Draft, draft_id))?;

        if let Some(candidate) = update.candidate {
            draft.candidate = candidate;
        }
        if let Some(macros) = update.macros {
            draft.macros = macros;
        }
        if let Some(embedding) = update.embedding {
            draft.embedding = embedding;
        }
        Ok(())
    }

    pub fn delete(&self, draft_id: &str) -> Result<(), PipelineError> {
        self.drafts
            .lock()
            .unwrap()
            .remove(draft_id)
            .map(|_| ())
            .ok_or_else(|| PipelineError::not_found(RecordKind::Draft, draft_id))
    }

    /// Drafts belonging to an owner, for listing in the caller surface.
    pub fn list_by_owner(&self, owner: &str) -> Vec<RecipeDraft> {
        self.drafts
            .lock()
            .unwrap()
            .values()
            .filter(|d| d.owner == owner)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::zero_vector;

    fn candidate(name: &str) -> RecipeCandidate {
        RecipeCandidate {
            name: name.into(),
            description: String::new(),
            category: String::new(),
            cuisine: String::new(),
            ingredients: vec!["pasta".into()],
            instructions: vec!["cook".into()],
            tags: vec![],
        }
    }

    #[test]
    fn save_then_get_round_trips() {
        let store = DraftStore::new();
        let id = store.save(candidate("Pasta"), vec![], Macros::default(), zero_vector(), "alice");
        let draft = store.get(&id).unwrap();
        assert_eq!(draft.candidate.name, "Pasta");
        assert_eq!(draft.owner, "alice");
    }

    #[test]
    fn get_after_delete_is_not_found() {
        let store = DraftStore::new();
        let id = store.save(candidate("Pasta"), vec![], Macros::default(), zero_vector(), "alice");
        store.delete(&id).unwrap();
        assert!(matches!(
            store.get(&id),
            Err(PipelineError::NotFound { .. })
        ));
    }

    #[test]
    fn delete_unknown_is_not_found() {
        let store = DraftStore::new();
        assert!(matches!(
            store.delete("nope"),
            Err(PipelineError::NotFound { .. })
        ));
    }

    #[test]
    fn update_replaces_only_given_fields() {
        let store = DraftStore::new();
        let id = store.save(candidate("Pasta"), vec![], Macros::default(), zero_vector(), "alice");

        let new_macros = Macros {
            calories: 500.0,
            protein: 20.0,
            carbs: 60.0,
            fat: 10.0,
        };
        store
            .update(
                &id,
                DraftUpdate {
                    candidate: None,
                    macros: Some(new_macros),
                    embedding: None,
                },
            )
            .unwrap();

        let draft = store.get(&id).unwrap();
        assert_eq!(draft.candidate.name, "Pasta");
        assert_eq!(draft.macros, new_macros);
    }

    #[test]
    fn list_by_owner_filters() {
        let store = DraftStore::new();
        store.save(candidate("A"), vec![], Macros::default(), zero_vector(), "alice");
        store.save(candidate("B"), vec![], Macros::default(), zero_vector(), "bob");
        let alice = store.list_by_owner("alice");
        assert_eq!(alice.len(), 1);
        assert_eq!(alice[0].candidate.name, "A");
    }

    #[test]
    fn draft_ids_are_opaque_and_unique() {
        let store = DraftStore::new();
        let a = store.save(candidate("A"), vec![], Macros::default(), zero_vector(), "alice");
        let b = store.save(candidate("B"), vec![], Macros::default(), zero_vector(), "alice");
        assert_ne!(a, b);
    }
}
