#![allow(dead_code)]

//! Top-K similarity retrieval over an [`EmbeddingIndex`].
//!
//! The service embeds the query once, scores every stored vector by cosine
//! similarity, and returns chunks in descending similarity order. Ties are
//! broken by ascending `sequence_index` so repeated queries over identical
//! inputs rank identically. Read-only with respect to the index.

use crate::errors::AppError;
use crate::llm_client::EmbeddingBackend;
use crate::retrieval::index::{cosine_similarity, EmbeddingIndex};
use crate::retrieval::DocumentChunk;

pub struct RetrievalService {
    index: EmbeddingIndex,
}

impl RetrievalService {
    pub fn new(index: EmbeddingIndex) -> Self {
        Self { index }
    }

    pub fn chunk_count(&self) -> usize {
        self.index.len()
    }

    /// Returns the `top_k` chunks most similar to `text`.
    ///
    /// `top_k` is clamped to the number of indexed chunks; an empty index
    /// returns no chunks without touching the embedding backend.
    pub async fn query(
        &self,
        backend: &dyn EmbeddingBackend,
        text: &str,
        top_k: usize,
    ) -> Result<Vec<DocumentChunk>, AppError> {
        if self.index.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let query_vec = backend
            .embed(text)
            .await
            .map_err(|e| AppError::Backend(format!("embedding query failed: {e}")))?;

        let mut scored: Vec<(f32, &DocumentChunk)> = self
            .index
            .chunks()
            .iter()
            .zip(self.index.vectors())
            .map(|(chunk, vector)| (cosine_similarity(&query_vec, vector), chunk))
            .collect();

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.sequence_index.cmp(&b.1.sequence_index))
        });

        let limit = top_k.min(scored.len());
        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(_, chunk)| chunk.clone())
            .collect())
    }
}
