//! Document retrieval subsystem.
//!
//! A product document uploaded to a session flows through three stages:
//! [`chunker::split`] cuts the text into overlapping fixed-size segments,
//! [`index::EmbeddingIndex::build`] embeds every chunk through the embedding
//! backend (all-or-nothing), and [`service::RetrievalService::query`] ranks
//! chunks against a query by cosine similarity.
//!
//! Chunks and vectors are created once at ingestion, read-only afterwards,
//! and dropped with the owning session.

pub mod chunker;
pub mod index;
pub mod service;

use serde::Serialize;
use uuid::Uuid;

/// An overlapping substring segment of a source document — the unit of retrieval.
///
/// Immutable once created. `source_offset` is the starting character offset
/// in the source text; `sequence_index` is the chunk's position in document
/// order and is used as the stable tie-breaker when ranking.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentChunk {
    pub id: Uuid,
    pub sequence_index: usize,
    pub text: String,
    pub source_offset: usize,
}
