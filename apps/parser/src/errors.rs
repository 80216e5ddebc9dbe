use thiserror::Error;

/// Failures that reach the caller of the extraction pipeline.
///
/// Everything on the LLM path is absorbed inside `llm_client` and
/// degrades to an absent result; the only hard failures are a file we
/// cannot read at all and a document with no usable text.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("No extractable text (encrypted or image-only document?)")]
    EmptyDocument,
}
