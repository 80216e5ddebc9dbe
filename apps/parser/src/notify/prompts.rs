// Prompts and schema for the document-request composer.

use serde_json::{json, Value};

use super::RequestPayload;

pub fn build_notify_system(org_name: &str) -> String {
    format!(
        "You are an HR assistant writing document-collection messages on behalf of an organization.\n\
         You MUST treat the requesting organization as the SENDER.\n\
         - The sender organization is '{org_name}'. Never imply you are the candidate's employer.\n\
         - 'candidate_company' (if present) is the candidate's past/current employer, NOT the sender.\n\
         - Write concise, professional, privacy-aware requests to collect PAN and Aadhaar.\n\
         - Tone: courteous, clear, formal; keep SMS <= 320 chars.\n\
         - Output STRICT JSON ONLY with keys: subject, email_body, sms_body. No markdown links."
    )
}

pub fn build_notify_prompt(payload: &RequestPayload) -> String {
    format!(
        "Context:\n\
         - Sender org: {org}\n\
         - Support email: {support}\n\
         - Secure upload link: {url}\n\
         - Candidate name: {name}\n\
         - Candidate's employer (candidate_company): {company}\n\n\
         Requirements:\n\
         - Subject mentions 'PAN & Aadhaar verification' or similar.\n\
         - Email body MUST state you are contacting on behalf of the sender org,\n\
         \x20 explain purpose (onboarding/identity verification), acceptable file types (clear photo or PDF), privacy,\n\
         \x20 support instructions (use the support email), and include the plain URL.\n\
         - SMS body must be <= 320 chars and include the URL.\n\
         - NEVER say or imply you are the candidate_company.\n\
         - Output EXACT JSON with keys: subject, email_body, sms_body.",
        org = payload.org_name,
        support = payload.support_email,
        url = payload.upload_url,
        name = payload.candidate_name,
        company = payload.candidate_company,
    )
}

pub fn message_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "subject": {"type": "string"},
            "email_body": {"type": "string"},
            "sms_body": {"type": "string"},
        },
        "required": ["subject", "email_body", "sms_body"],
        "additionalProperties": false,
    })
}
