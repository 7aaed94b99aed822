#![allow(dead_code)]

//! Embedding index: one vector per chunk, in chunk order.
//!
//! [`EmbeddingIndex::build`] is all-or-nothing — if any embedding call fails
//! the whole build fails and no index exists, so chunks and vectors can never
//! fall out of alignment. Built indexes are read-only.

use tracing::info;

use crate::errors::AppError;
use crate::llm_client::EmbeddingBackend;
use crate::retrieval::DocumentChunk;

#[derive(Debug)]
pub struct EmbeddingIndex {
    model_id: String,
    chunks: Vec<DocumentChunk>,
    vectors: Vec<Vec<f32>>,
}

impl EmbeddingIndex {
    /// Embeds every chunk through `backend`, preserving chunk order.
    ///
    /// Fails with a retryable `BackendError` on the first embedding failure;
    /// a vector whose dimension disagrees with the model's fixed dimension is
    /// treated the same way.
    pub async fn build(
        chunks: Vec<DocumentChunk>,
        backend: &dyn EmbeddingBackend,
    ) -> Result<Self, AppError> {
        let mut vectors = Vec::with_capacity(chunks.len());

        for chunk in &chunks {
            let vector = backend.embed(&chunk.text).await.map_err(|e| {
                AppError::Backend(format!(
                    "embedding chunk {} failed: {e}",
                    chunk.sequence_index
                ))
            })?;
            if vector.len() != backend.dims() {
                return Err(AppError::Backend(format!(
                    "embedding backend returned {} dims for chunk {}, expected {}",
                    vector.len(),
                    chunk.sequence_index,
                    backend.dims()
                )));
            }
            vectors.push(vector);
        }

        info!(
            "Built embedding index: {} chunks, model {}",
            chunks.len(),
            backend.model_name()
        );

        Ok(Self {
            model_id: backend.model_name().to_string(),
            chunks,
            vectors,
        })
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub(crate) fn chunks(&self) -> &[DocumentChunk] {
        &self.chunks
    }

    pub(crate) fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }
}

/// Cosine similarity: dot product over the product of magnitudes.
///
/// Returns a value in `[-1.0, 1.0]`; `0.0` for empty vectors, vectors of
/// different lengths, or a zero-magnitude vector.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    dot / denom
}
