//! Deterministic fake embedding provider for tests and offline development.
//!
//! Hashes the input text into a sparse unit vector, so identical texts map to
//! identical vectors and different texts are very likely orthogonal-ish.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{EmbeddingProvider, EMBEDDING_DIM};
use crate::error::EmbeddingError;

#[derive(Default)]
pub struct FakeEmbedder {
    /// When set, every call fails — used to exercise the fallback policy.
    fail: AtomicBool,
}

impl FakeEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fake that fails every call with a transient error.
    pub fn failing() -> Self {
        let embedder = Self::default();
        embedder.fail.store(true, Ordering::Relaxed);
        embedder
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::Relaxed);
    }
}

/// FNV-1a over the text bytes; cheap and stable across runs.
fn hash(text: &str) -> u64 {
    let mut h: u64 = 0xcbf29ce484222325;
    for b in text.bytes() {
        h ^= u64::from(b);
        h = h.wrapping_mul(0x100000001b3);
    }
    h
}

#[async_trait]
impl EmbeddingProvider for FakeEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if self.fail.load(Ordering::Relaxed) {
            return Err(EmbeddingError::RequestFailed(
                "fake embedder configured to fail".into(),
            ));
        }

        let mut v = vec![0.0f32; EMBEDDING_DIM];
        let mut h = hash(text);
        // Spread four spikes across the vector, then L2-normalize
        for _ in 0..4 {
            v[(h % EMBEDDING_DIM as u64) as usize] += 1.0;
            h = h.rotate_left(17).wrapping_mul(0x9e3779b97f4a7c15);
        }
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        for x in &mut v {
            *x /= norm;
        }
        Ok(v)
    }
}
