//! Resume field extraction core.
//!
//! Combines deterministic heuristics with an optional provider-agnostic
//! LLM pass and merges both into a single record with per-field
//! confidence scores. See [`extract::parse_resume`] for the entry point.

pub mod config;
pub mod document;
pub mod errors;
pub mod extract;
pub mod llm_client;
pub mod models;
pub mod notify;

pub use config::{LlmConfig, Provider};
pub use errors::ParseError;
pub use extract::{parse_resume, parse_text, ParseOutcome};
pub use llm_client::{AbsentReason, LlmGateway, LlmOutcome};
pub use models::{Candidate, Confidence, ExtractedRecord};
