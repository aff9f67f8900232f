//! Error taxonomy for the recipe pipeline.
//!
//! Provider-level errors ([`GenerationError`], [`EmbeddingError`]) are produced
//! by the outbound clients; the orchestrator maps every failure into a
//! [`PipelineError`] with the specific reason preserved, never collapsed into a
//! generic failure.

use thiserror::Error;

/// Error from the text-generation provider or from parsing its output.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    RequestFailed(String),

    #[error("generation API returned error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("generation timed out after {0}s")]
    Timeout(u64),

    #[error("rate limited, retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("provider returned unparsable recipe: {0}")]
    InvalidStructure(String),

    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

impl GenerationError {
    /// Transient failures are eligible for the orchestrator's bounded retry.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RequestFailed(_) | Self::Timeout(_) | Self::RateLimited { .. } => true,
            Self::ApiError { status, .. } => *status >= 500,
            Self::InvalidStructure(_) | Self::NotConfigured(_) => false,
        }
    }
}

/// Error from the embedding provider.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding request failed: {0}")]
    RequestFailed(String),

    #[error("embedding API returned error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("embedding timed out after {0}s")]
    Timeout(u64),

    #[error("embedding has {got} dimensions, expected {expected}")]
    WrongDimensions { got: usize, expected: usize },

    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

impl EmbeddingError {
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RequestFailed(_) | Self::Timeout(_) => true,
            Self::ApiError { status, .. } => *status == 429 || *status >= 500,
            Self::WrongDimensions { .. } | Self::NotConfigured(_) => false,
        }
    }
}

/// Kind of record a [`PipelineError::NotFound`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Recipe,
    Draft,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Recipe => "recipe",
            Self::Draft => "draft",
        })
    }
}

/// Terminal failure reasons surfaced by the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("embedding unavailable: {0}")]
    EmbeddingUnavailable(#[from] EmbeddingError),

    /// A parsed candidate or pre-commit check violated a structural invariant.
    /// Carries the specific invariant that failed.
    #[error("validation failed: {invariant}")]
    Validation { invariant: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: RecordKind, id: String },

    /// The repository rejected an atomic update against a stale snapshot.
    #[error("concurrent modification of recipe {id}")]
    Conflict { id: String },

    #[error("storage error: {0}")]
    Storage(String),
}

impl PipelineError {
    pub fn validation(invariant: impl Into<String>) -> Self {
        Self::Validation {
            invariant: invariant.into(),
        }
    }

    pub fn not_found(kind: RecordKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}

impl From<rusqlite::Error> for PipelineError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
