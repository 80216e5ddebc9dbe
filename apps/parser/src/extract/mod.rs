//! Resume field extraction pipeline.
//!
//! One document flows through three stages: text extraction, the
//! deterministic heuristic pass, and an optional LLM pass fed with the
//! heuristic result as hints. The merge step reconciles the two partial
//! records into a final record with per-field confidence. Every LLM
//! failure degrades to the deterministic result; only an unreadable or
//! unsupported document fails the call.

pub mod heuristics;
pub mod llm;
pub mod merge;
mod prompts;

use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::document;
use crate::errors::ParseError;
use crate::llm_client::LlmGateway;
use crate::models::{Confidence, ExtractedRecord};

/// Below this many trimmed characters the document is treated as
/// unreadable, typically encrypted or image-only.
const MIN_TEXT_CHARS: usize = 20;

/// The final product of one parse: the merged record, its confidence
/// map, and the normalized text it was extracted from.
#[derive(Debug, Clone, Serialize)]
pub struct ParseOutcome {
    pub record: ExtractedRecord,
    pub confidence: Confidence,
    pub text: String,
}

/// Parse a resume file end to end.
pub async fn parse_resume(
    gateway: &LlmGateway,
    path: &Path,
    max_chars: usize,
) -> Result<ParseOutcome, ParseError> {
    let text = document::extract_text(path, max_chars)?;
    parse_text(gateway, &text).await
}

/// Parse already-extracted text. Entry point for callers that hold the
/// text themselves.
pub async fn parse_text(gateway: &LlmGateway, text: &str) -> Result<ParseOutcome, ParseError> {
    if text.trim().chars().count() < MIN_TEXT_CHARS {
        return Err(ParseError::EmptyDocument);
    }
    let hints = heuristics::deterministic_extract(text);
    let llm_record = llm::llm_extract(gateway, text, &hints).await;
    let (record, confidence) = merge::merge_results(&hints, &llm_record);
    info!(
        llm_used = !llm_record.is_empty(),
        skills = record.skills.len(),
        "resume parsed"
    );
    Ok(ParseOutcome {
        record,
        confidence,
        text: text.to_string(),
    })
}
