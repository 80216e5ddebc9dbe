// Prompt templates and schema for LLM field extraction.
// All prompts for the extract module are defined here.

use serde_json::{json, Value};

use crate::models::ExtractedRecord;

pub const EXTRACT_SYSTEM: &str = "\
You are a resume parser. Extract EXACT JSON with these fields: \
name, email, phone, company, designation, skills (array of strings). \
Do not include any other keys. Phone should be digits only. \
If a field is unknown, use an empty string or empty array.";

const EXTRACT_PROMPT_TEMPLATE: &str = r#"Resume text follows between <TEXT> tags. Use hints when reasonable, but correct them if obviously wrong.

HINTS: {hints}

<TEXT>
{text}
</TEXT>"#;

/// User prompt: the resume text plus the deterministic pass's partial
/// record as hints. Hints bias the model without constraining it.
pub fn build_extract_prompt(text: &str, hints: &ExtractedRecord) -> String {
    let hints_json = serde_json::to_string(hints).unwrap_or_default();
    EXTRACT_PROMPT_TEMPLATE
        .replace("{hints}", &hints_json)
        .replace("{text}", text)
}

pub fn extraction_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": {"type": "string"},
            "email": {"type": "string"},
            "phone": {"type": "string"},
            "company": {"type": "string"},
            "designation": {"type": "string"},
            "skills": {"type": "array", "items": {"type": "string"}},
        },
        "required": ["name", "email", "phone", "company", "designation", "skills"],
        "additionalProperties": false,
    })
}
