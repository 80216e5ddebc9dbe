// LLM extraction stage: one structured call per resume, degrading to
// an empty record whenever the gateway or the model output fails.

use serde_json::Value;
use tracing::{debug, warn};

use crate::extract::prompts::{build_extract_prompt, extraction_schema, EXTRACT_SYSTEM};
use crate::llm_client::{LlmGateway, LlmOutcome};
use crate::models::ExtractedRecord;

/// Ask the configured provider for a structured record. Absence for any
/// reason (no provider, timeout, malformed JSON, wrong shape) yields an
/// empty record so callers never branch on failure.
pub async fn llm_extract(
    gateway: &LlmGateway,
    text: &str,
    hints: &ExtractedRecord,
) -> ExtractedRecord {
    let prompt = build_extract_prompt(text, hints);
    let schema = extraction_schema();
    match gateway
        .generate_structured(&schema, EXTRACT_SYSTEM, &prompt)
        .await
    {
        LlmOutcome::Value(value) => record_from_value(value),
        LlmOutcome::Absent(reason) => {
            debug!("LLM extraction unavailable: {reason}");
            ExtractedRecord::default()
        }
    }
}

/// Deserialize a model response into a normalized record. A response
/// whose shape does not match (for example skills as a string) is
/// discarded whole rather than salvaged field by field.
fn record_from_value(value: Value) -> ExtractedRecord {
    match serde_json::from_value::<ExtractedRecord>(value) {
        Ok(record) => record.normalized(),
        Err(err) => {
            warn!("LLM response did not match the record shape: {err}");
            ExtractedRecord::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmConfig;
    use serde_json::json;

    #[test]
    fn test_record_from_value_normalizes_fields() {
        let record = record_from_value(json!({
            "name": "  Jane   Doe ",
            "email": "Jane@X.COM",
            "phone": "+1 (415) 555-0100",
            "company": "Acme",
            "designation": "Engineer",
            "skills": ["Python", "python", "Docker"],
        }));
        assert_eq!(record.name, "Jane Doe");
        assert_eq!(record.email, "jane@x.com");
        assert_eq!(record.phone, "14155550100");
        assert_eq!(record.skills, vec!["docker", "python"]);
    }

    #[test]
    fn test_record_from_value_defaults_missing_fields() {
        let record = record_from_value(json!({"name": "Jane Doe"}));
        assert_eq!(record.name, "Jane Doe");
        assert_eq!(record.email, "");
        assert!(record.skills.is_empty());
    }

    #[test]
    fn test_record_from_value_ignores_extra_keys() {
        let record = record_from_value(json!({
            "name": "Jane Doe",
            "confidence": 0.99,
        }));
        assert_eq!(record.name, "Jane Doe");
    }

    #[test]
    fn test_record_from_value_rejects_wrong_shape() {
        let record = record_from_value(json!({"skills": "python, docker"}));
        assert!(record.is_empty());
    }

    #[test]
    fn test_record_from_value_rejects_non_object() {
        assert!(record_from_value(json!("just some text")).is_empty());
        assert!(record_from_value(json!([1, 2, 3])).is_empty());
    }

    #[tokio::test]
    async fn test_llm_extract_without_provider_is_empty() {
        let gateway = LlmGateway::new(LlmConfig::disabled());
        let record = llm_extract(&gateway, "Jane Doe", &ExtractedRecord::default()).await;
        assert!(record.is_empty());
    }
}
