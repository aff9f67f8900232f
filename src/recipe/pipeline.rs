//! The recipe pipeline orchestrator.
//!
//! Each request moves through a fixed sequence of stages:
//!
//! ```text
//! Received → Generating → Parsed → MacroComputed → Embedded → Committed
//! ```
//!
//! with a terminal `Rejected(reason)` reachable from any non-terminal stage.
//! The orchestrator holds its collaborators — generation client, embedding
//! provider, draft store, repository — as explicit dependencies passed at
//! construction; there are no ambient singletons and no shared in-flight
//! state between requests. The only suspension points are the two outbound
//! provider calls.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::{EmbeddingFallback, PipelineConfig};
use crate::embedding::{embedding_text, zero_vector, EmbeddingProvider, EMBEDDING_DIM};
use crate::error::{PipelineError, RecordKind};
use crate::generation::RecipeGenerator;
use crate::recipe::drafts::DraftStore;
use crate::recipe::macros;
use crate::recipe::repository::{RecipeRepository, RecipeUpdate};
use crate::recipe::types::{
    Macros, Modification, Recipe, RecipeCandidate, RecipeDraft, NEEDS_EMBEDDING_TAG,
};

/// Where a successfully generated recipe ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitIntent {
    /// Hold the result as a draft for review before promotion.
    Draft,
    /// Persist directly as a searchable recipe.
    Persist,
}

/// A generate-new request.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub intent: String,
    pub owner: String,
    pub dietary_prefs: Vec<String>,
    pub allergens: Vec<String>,
    pub commit: CommitIntent,
}

/// Result of a generate-new request.
#[derive(Debug)]
pub enum GenerateOutcome {
    Draft(RecipeDraft),
    Recipe(Recipe),
}

#[derive(Clone)]
pub struct RecipePipeline {
    generator: RecipeGenerator,
    embedder: Arc<dyn EmbeddingProvider>,
    drafts: Arc<DraftStore>,
    repository: Arc<RecipeRepository>,
    config: PipelineConfig,
}

impl RecipePipeline {
    pub fn new(
        generator: RecipeGenerator,
        embedder: Arc<dyn EmbeddingProvider>,
        drafts: Arc<DraftStore>,
        repository: Arc<RecipeRepository>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            generator,
            embedder,
            drafts,
            repository,
            config,
        }
    }

    pub fn drafts(&self) -> &DraftStore {
        &self.drafts
    }

    pub fn repository(&self) -> &RecipeRepository {
        &self.repository
    }

    /// Generate-new flow: intent → generation → macros → embedding → commit.
    pub async fn generate_recipe(
        &self,
        request: GenerateRequest,
    ) -> Result<GenerateOutcome, PipelineError> {
        debug!(intent = %request.intent, owner = %request.owner, "pipeline: received");

        let candidate = self
            .generate_with_retry(&request.intent, &request.dietary_prefs, &request.allergens)
            .await?;
        debug!(recipe = %candidate.name, "pipeline: parsed");

        let computed = macros::compute(&candidate.ingredients);
        debug!(calories = computed.calories, "pipeline: macros computed");

        let (embedding, needs_backfill) =
            self.embed_with_fallback(&candidate, &request.dietary_prefs).await?;
        debug!(deferred = needs_backfill, "pipeline: embedded");

        let mut candidate = candidate;
        if needs_backfill && !candidate.tags.iter().any(|t| t == NEEDS_EMBEDDING_TAG) {
            candidate.tags.push(NEEDS_EMBEDDING_TAG.to_string());
        }

        validate_for_commit(&candidate, computed, &embedding)?;

        match request.commit {
            CommitIntent::Draft => {
                let id = self.drafts.save(
                    candidate,
                    request.dietary_prefs.clone(),
                    computed,
                    embedding,
                    &request.owner,
                );
                let draft = self.drafts.get(&id)?;
                info!(draft_id = %id, "pipeline: committed as draft");
                Ok(GenerateOutcome::Draft(draft))
            }
            CommitIntent::Persist => {
                let recipe = self.repository.create(
                    &request.owner,
                    &candidate,
                    &request.dietary_prefs,
                    computed,
                    &embedding,
                )?;
                info!(recipe_id = %recipe.id, "pipeline: committed as recipe");
                Ok(GenerateOutcome::Recipe(recipe))
            }
        }
    }

    /// Modify-existing flow: fetch → generation with the prior recipe →
    /// macros on the new ingredients → embedding on the new fields → one
    /// atomic repository write replacing ingredients, instructions, macros,
    /// and embedding together.
    pub async fn modify_recipe(
        &self,
        recipe_id: &str,
        modification: Modification,
        dietary_prefs: &[String],
        allergens: &[String],
    ) -> Result<Recipe, PipelineError> {
        let existing = self.repository.get_by_id(recipe_id)?;
        debug!(recipe_id, modification = %modification, "pipeline: modifying");

        let prior = existing.as_candidate();
        let candidate = self
            .generate_modified_with_retry(&prior, &modification, dietary_prefs, allergens)
            .await?;

        let computed = macros::compute(&candidate.ingredients);
        let (embedding, needs_backfill) =
            self.embed_with_fallback(&candidate, &existing.dietary_tags).await?;

        let mut tags = candidate.tags.clone();
        if needs_backfill && !tags.iter().any(|t| t == NEEDS_EMBEDDING_TAG) {
            tags.push(NEEDS_EMBEDDING_TAG.to_string());
        }

        validate_for_commit(&candidate, computed, &embedding)?;

        let update = RecipeUpdate {
            name: candidate.name.clone(),
            description: candidate.description.clone(),
            ingredients: candidate.ingredients.clone(),
            instructions: candidate.instructions.clone(),
            macros: computed,
            embedding,
            tags,
        };

        // The fetched snapshot's timestamp serializes concurrent modifies of
        // the same recipe at the repository boundary.
        let updated =
            self.repository
                .update_atomic(recipe_id, &update, Some(&existing.updated_at))?;
        info!(recipe_id = %updated.id, "pipeline: modification committed");
        Ok(updated)
    }

    /// Batch flow: prompts are partitioned into fixed-size groups; candidates
    /// within a group run concurrently and independently, groups run
    /// sequentially with a pacing delay between them. A failure in one slot
    /// never aborts the group or subsequent groups; the result keeps the
    /// input order with each slot independently success or failure.
    pub async fn generate_batch(
        &self,
        prompts: &[String],
        owner: &str,
    ) -> Vec<Result<Recipe, PipelineError>> {
        let mut results: Vec<Option<Result<Recipe, PipelineError>>> =
            (0..prompts.len()).map(|_| None).collect();
        let group_size = self.config.batch_group_size.max(1);
        let group_count = prompts.len().div_ceil(group_size);

        for (group_index, group) in prompts.chunks(group_size).enumerate() {
            debug!(group = group_index + 1, of = group_count, "pipeline: batch group start");

            let mut set = JoinSet::new();
            for (offset, prompt) in group.iter().enumerate() {
                let pipeline = self.clone();
                let request = GenerateRequest {
                    intent: prompt.clone(),
                    owner: owner.to_string(),
                    dietary_prefs: vec![],
                    allergens: vec![],
                    commit: CommitIntent::Persist,
                };
                let index = group_index * group_size + offset;
                set.spawn(async move {
                    let result = match pipeline.generate_recipe(request).await {
                        Ok(GenerateOutcome::Recipe(recipe)) => Ok(recipe),
                        // Persist intent never yields a draft
                        Ok(GenerateOutcome::Draft(draft)) => Err(PipelineError::Storage(
                            format!("persist commit produced draft {}", draft.id),
                        )),
                        Err(e) => Err(e),
                    };
                    (index, result)
                });
            }

            while let Some(joined) = set.join_next().await {
                match joined {
                    Ok((index, result)) => {
                        if let Err(ref e) = result {
                            warn!(index, error = %e, "pipeline: batch slot failed");
                        }
                        results[index] = Some(result);
                    }
                    Err(e) => warn!(error = %e, "pipeline: batch task panicked"),
                }
            }

            // Pace between groups to respect downstream rate limits
            if group_index + 1 < group_count && self.config.batch_pacing_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.batch_pacing_ms)).await;
            }
        }

        results
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    Err(PipelineError::Storage("batch slot never completed".into()))
                })
            })
            .collect()
    }

    /// Promote a draft into a persisted, searchable recipe. The draft is
    /// removed once the recipe is durably written.
    pub fn promote_draft(&self, draft_id: &str) -> Result<Recipe, PipelineError> {
        let draft = self.drafts.get(draft_id)?;
        validate_for_commit(&draft.candidate, draft.macros, &draft.embedding)?;

        let recipe = self.repository.create(
            &draft.owner,
            &draft.candidate,
            &draft.dietary_tags,
            draft.macros,
            &draft.embedding,
        )?;
        self.drafts.delete(draft_id)?;
        info!(draft_id, recipe_id = %recipe.id, "draft promoted");
        Ok(recipe)
    }

    /// Re-run macros and embedding after a caller edited a draft's
    /// ingredients, so the stored derived data always matches the stored
    /// ingredient list.
    pub async fn refresh_draft(&self, draft_id: &str) -> Result<RecipeDraft, PipelineError> {
        let draft = self.drafts.get(draft_id)?;
        let computed = macros::compute(&draft.candidate.ingredients);
        let (embedding, _) = self
            .embed_with_fallback(&draft.candidate, &draft.dietary_tags)
            .await?;

        self.drafts.update(
            draft_id,
            crate::recipe::drafts::DraftUpdate {
                candidate: None,
                macros: Some(computed),
                embedding: Some(embedding),
            },
        )?;
        self.drafts.get(draft_id)
    }

    async fn generate_with_retry(
        &self,
        intent: &str,
        dietary_prefs: &[String],
        allergens: &[String],
    ) -> Result<RecipeCandidate, PipelineError> {
        let mut attempt = 0usize;
        loop {
            match self.generator.generate(intent, dietary_prefs, allergens).await {
                Ok(candidate) => return Ok(candidate),
                Err(e) if e.is_transient() && attempt + 1 < self.config.max_retries.max(1) => {
                    attempt += 1;
                    let backoff = self.retry_backoff(attempt);
                    warn!(attempt, error = %e, "generation failed, retrying");
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn generate_modified_with_retry(
        &self,
        prior: &RecipeCandidate,
        modification: &Modification,
        dietary_prefs: &[String],
        allergens: &[String],
    ) -> Result<RecipeCandidate, PipelineError> {
        let mut attempt = 0usize;
        loop {
            match self
                .generator
                .generate_modified(prior, modification, dietary_prefs, allergens)
                .await
            {
                Ok(candidate) => return Ok(candidate),
                Err(e) if e.is_transient() && attempt + 1 < self.config.max_retries.max(1) => {
                    attempt += 1;
                    let backoff = self.retry_backoff(attempt);
                    warn!(attempt, error = %e, "modification generation failed, retrying");
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Embed the candidate's fields, retrying transient failures. On final
    /// failure the deployment-wide fallback policy decides: reject the
    /// request, or commit a zero-vector placeholder marked for backfill.
    async fn embed_with_fallback(
        &self,
        candidate: &RecipeCandidate,
        dietary_tags: &[String],
    ) -> Result<(Vec<f32>, bool), PipelineError> {
        let text = embedding_text(
            &candidate.name,
            &candidate.description,
            &candidate.ingredients,
            dietary_tags,
            &candidate.category,
        );

        let mut attempt = 0usize;
        let err = loop {
            match self.embedder.embed(&text).await {
                Ok(embedding) => return Ok((embedding, false)),
                Err(e) if e.is_transient() && attempt + 1 < self.config.max_retries.max(1) => {
                    attempt += 1;
                    let backoff = self.retry_backoff(attempt);
                    warn!(attempt, error = %e, "embedding failed, retrying");
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => break e,
            }
        };

        match self.config.embedding_fallback {
            EmbeddingFallback::Reject => Err(err.into()),
            EmbeddingFallback::ZeroVector => {
                warn!(error = %err, "embedding unavailable, committing zero-vector placeholder");
                Ok((zero_vector(), true))
            }
        }
    }

    fn retry_backoff(&self, attempt: usize) -> Duration {
        let capped = attempt.min(5) as u32;
        Duration::from_millis(self.config.retry_base_ms * (1u64 << capped))
    }
}

/// Quality gate applied before any commit, in every flow.
fn validate_for_commit(
    candidate: &RecipeCandidate,
    macros: Macros,
    embedding: &[f32],
) -> Result<(), PipelineError> {
    candidate
        .validate()
        .map_err(PipelineError::validation)?;

    if !macros.is_non_negative() {
        return Err(PipelineError::validation("macros must be non-negative"));
    }
    if embedding.len() != EMBEDDING_DIM {
        return Err(PipelineError::validation(format!(
            "embedding has {} dimensions, expected {EMBEDDING_DIM}",
            embedding.len()
        )));
    }
    Ok(())
}

/// Surface a draft-or-recipe id mismatch in caller-facing messages.
pub fn describe_not_found(err: &PipelineError) -> Option<String> {
    match err {
        PipelineError::NotFound { kind, id } => Some(format!("{kind} {id} does not exist")),
        _ => None,
    }
}
