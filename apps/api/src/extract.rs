//! Document-format extraction: uploaded bytes → UTF-8 text.
//!
//! The retrieval core only ever sees plain text; this is the one place that
//! knows about source formats. An unsupported or corrupt document aborts only
//! the upload, never the interview.

use crate::errors::AppError;

/// Extracts plain text from an uploaded document.
///
/// Supported: PDF, Markdown, plain text. Everything else is an
/// `ExtractionError`.
pub fn extract_text(bytes: &[u8], content_type: &str) -> Result<String, AppError> {
    match content_type {
        "application/pdf" => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| AppError::Extraction(format!("failed to read PDF: {e}"))),
        "text/plain" | "text/markdown" => String::from_utf8(bytes.to_vec())
            .map_err(|_| AppError::Extraction("document is not valid UTF-8".to_string())),
        other => Err(AppError::Extraction(format!(
            "unsupported document type: {other}"
        ))),
    }
}
