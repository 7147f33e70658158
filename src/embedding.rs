//! Optional embedding capability.
//!
//! The engine works without any model. When an [`Embedder`] is supplied and
//! initializes successfully, the cosine similarity between the query and an
//! item's text replaces the neutral `semantic` term of the combined score.

use crate::error::Result;

/// A text embedding model.
pub trait Embedder: Send + Sync {
    /// Prepare the model. Returning `false` leaves the engine in
    /// heuristic-only mode; it is never fatal.
    fn initialize(&mut self) -> bool;

    /// Embed a single text.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn name(&self) -> &str {
        "embedder"
    }
}

/// Cosine similarity of two vectors.
///
/// Returns 0 for empty vectors, vectors of different lengths, or a vector
/// with zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Holds an embedder that passed initialization.
pub(crate) struct SemanticModel {
    embedder: Box<dyn Embedder>,
}

impl SemanticModel {
    /// Initialize `embedder`, returning `None` when it reports failure.
    pub(crate) fn try_new(mut embedder: Box<dyn Embedder>) -> Option<Self> {
        if embedder.initialize() {
            tracing::info!(model = embedder.name(), "embedding model ready");
            Some(Self { embedder })
        } else {
            tracing::warn!(
                model = embedder.name(),
                "embedding model failed to initialize, using heuristic scoring"
            );
            None
        }
    }

    pub(crate) fn embed_query(&self, query: &str) -> Option<Vec<f32>> {
        match self.embedder.embed(query) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(error = %e, "failed to embed query");
                None
            }
        }
    }

    /// Similarity in `[0, 1]` between the query vector and `text`.
    pub(crate) fn similarity(
        &self,
        query_vector: &[f32],
        text: &str,
    ) -> Option<f64> {
        match self.embedder.embed(text) {
            Ok(v) => {
                let similarity = cosine_similarity(query_vector, &v);
                if similarity.is_finite() {
                    Some(similarity.clamp(0.0, 1.0))
                } else {
                    tracing::debug!("non-finite similarity for item text");
                    None
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "failed to embed item text");
                None
            }
        }
    }
}
