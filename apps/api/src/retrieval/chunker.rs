//! Overlapping fixed-size text chunker.
//!
//! Chunk *i* starts at character offset `i · (chunk_size − overlap)` and has
//! length `min(chunk_size, remaining)`; the final chunk may be shorter.
//! Consecutive chunks overlap by exactly `overlap` characters except possibly
//! the last, and the union of chunks with overlaps collapsed reconstructs the
//! source text exactly.
//!
//! Offsets are measured in characters, not bytes — the source is arbitrary
//! UTF-8 and slicing on byte positions would split multi-byte characters.

use uuid::Uuid;

use crate::errors::AppError;
use crate::retrieval::DocumentChunk;

/// Validates chunking parameters. The step `chunk_size − overlap` must be
/// strictly positive or chunking would never advance.
pub fn validate(chunk_size: usize, overlap: usize) -> Result<(), AppError> {
    if chunk_size == 0 {
        return Err(AppError::Configuration(
            "chunk_size must be greater than zero".to_string(),
        ));
    }
    if overlap >= chunk_size {
        return Err(AppError::Configuration(format!(
            "overlap ({overlap}) must be smaller than chunk_size ({chunk_size})"
        )));
    }
    Ok(())
}

/// Splits `text` into overlapping chunks. Pure; no side effects.
///
/// Empty input yields an empty chunk list. Chunking stops as soon as a chunk
/// reaches the end of the text, so the tail is never re-emitted as an
/// overlap-only fragment.
pub fn split(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<DocumentChunk>, AppError> {
    validate(chunk_size, overlap)?;

    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Ok(Vec::new());
    }

    let step = chunk_size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0usize;

    loop {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(DocumentChunk {
            id: Uuid::new_v4(),
            sequence_index: chunks.len(),
            text: chars[start..end].iter().collect(),
            source_offset: start,
        });
        if end == chars.len() {
            break;
        }
        start += step;
    }

    Ok(chunks)
}
