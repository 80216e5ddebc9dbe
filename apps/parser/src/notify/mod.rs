//! Outbound document-request composition.
//!
//! Builds the message preview for a PAN/Aadhaar collection request,
//! reusing the LLM gateway with a deterministic template fallback.
//! Actual delivery (SMTP, SMS) belongs to an external collaborator.

mod prompts;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::llm_client::{LlmGateway, LlmOutcome};
use crate::models::{Candidate, Confidence, ExtractedRecord};

use prompts::{build_notify_prompt, build_notify_system, message_schema};

const AUTO_CONFIDENCE_FLOOR: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
}

/// Inputs for one composed request.
#[derive(Debug, Clone)]
pub struct RequestPayload {
    pub candidate_name: String,
    pub candidate_company: String,
    pub upload_url: String,
    pub org_name: String,
    pub support_email: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagePreview {
    pub subject: String,
    pub email_body: String,
    pub sms_body: String,
}

/// Pick a delivery channel. An explicit choice wins; otherwise prefer a
/// contact field we are reasonably confident in, then fall back to bare
/// presence. Extracted values shadow the stored candidate's.
pub fn choose_channel(
    candidate: &Candidate,
    record: &ExtractedRecord,
    confidence: &Confidence,
    explicit: Option<Channel>,
) -> Option<Channel> {
    if let Some(channel) = explicit {
        return Some(channel);
    }
    let email = pick(&record.email, &candidate.email);
    let phone = pick(&record.phone, &candidate.phone);
    if !email.is_empty() && confidence.email >= AUTO_CONFIDENCE_FLOOR {
        return Some(Channel::Email);
    }
    if !phone.is_empty() && confidence.phone >= AUTO_CONFIDENCE_FLOOR {
        return Some(Channel::Sms);
    }
    if !email.is_empty() {
        return Some(Channel::Email);
    }
    if !phone.is_empty() {
        return Some(Channel::Sms);
    }
    None
}

fn pick<'a>(extracted: &'a str, stored: &'a str) -> &'a str {
    if extracted.is_empty() {
        stored
    } else {
        extracted
    }
}

/// Compose the request via the gateway, falling back to the template
/// when no usable model output comes back. The result is always scrubbed
/// so the candidate's employer never reads as the sender.
pub async fn compose_document_request(
    gateway: &LlmGateway,
    payload: &RequestPayload,
) -> MessagePreview {
    let schema = message_schema();
    let system = build_notify_system(&payload.org_name);
    let prompt = build_notify_prompt(payload);
    let preview = match gateway.generate_structured(&schema, &system, &prompt).await {
        LlmOutcome::Value(value) => match serde_json::from_value::<MessagePreview>(value) {
            Ok(preview) if !preview.email_body.is_empty() => preview,
            _ => fallback_preview(payload),
        },
        LlmOutcome::Absent(reason) => {
            debug!("composing from template: {reason}");
            fallback_preview(payload)
        }
    };
    scrub_sender(preview, &payload.candidate_company, &payload.org_name)
}

/// Deterministic template used when the gateway returns nothing usable.
fn fallback_preview(payload: &RequestPayload) -> MessagePreview {
    let name = payload.candidate_name.trim();
    let salutation = if name.is_empty() { "there" } else { name };
    let org = &payload.org_name;
    let url = &payload.upload_url;
    MessagePreview {
        subject: format!("{org} - PAN & Aadhaar verification"),
        email_body: format!(
            "Hi {salutation},\n\n\
             To complete your background verification for onboarding with {org}, \
             please upload clear images or PDFs of your PAN and Aadhaar using the secure link below:\n\
             {url}\n\n\
             We use these documents only for identity verification and do not share them. \
             If you face any issues, reply to {support} and we'll help.\n\n\
             Thanks,\n{org} Team",
            support = payload.support_email,
        ),
        sms_body: format!("{org}: please upload PAN & Aadhaar to complete verification: {url}"),
    }
}

/// Replace any mention of the candidate's employer with the requesting
/// org so a generated message never reads as sent by the employer.
fn scrub_sender(mut preview: MessagePreview, candidate_company: &str, org_name: &str) -> MessagePreview {
    let company = candidate_company.trim();
    if company.is_empty() || company.eq_ignore_ascii_case(org_name) {
        return preview;
    }
    for text in [
        &mut preview.subject,
        &mut preview.email_body,
        &mut preview.sms_body,
    ] {
        *text = text
            .replace(&format!(" at {company}"), &format!(" at {org_name}"))
            .replace(&format!(" from {company}"), &format!(" from {org_name}"))
            .replace(company, org_name);
    }
    preview
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmConfig;

    fn payload() -> RequestPayload {
        RequestPayload {
            candidate_name: "Jane Doe".to_string(),
            candidate_company: "Acme Corp".to_string(),
            upload_url: "https://verify.example/upload/1".to_string(),
            org_name: "TraqCheck".to_string(),
            support_email: "support@traqcheck.local".to_string(),
        }
    }

    #[test]
    fn test_explicit_channel_wins() {
        let channel = choose_channel(
            &Candidate::new(),
            &ExtractedRecord::default(),
            &Confidence::default(),
            Some(Channel::Sms),
        );
        assert_eq!(channel, Some(Channel::Sms));
    }

    #[test]
    fn test_auto_prefers_confident_email() {
        let record = ExtractedRecord {
            email: "jane@x.com".to_string(),
            phone: "14155550100".to_string(),
            ..Default::default()
        };
        let confidence = Confidence {
            email: 1.0,
            phone: 1.0,
            ..Default::default()
        };
        let channel = choose_channel(&Candidate::new(), &record, &confidence, None);
        assert_eq!(channel, Some(Channel::Email));
    }

    #[test]
    fn test_auto_uses_sms_when_email_confidence_is_low() {
        let record = ExtractedRecord {
            email: "jane@x.com".to_string(),
            phone: "14155550100".to_string(),
            ..Default::default()
        };
        let confidence = Confidence {
            email: 0.2,
            phone: 0.7,
            ..Default::default()
        };
        let channel = choose_channel(&Candidate::new(), &record, &confidence, None);
        assert_eq!(channel, Some(Channel::Sms));
    }

    #[test]
    fn test_auto_falls_back_to_presence() {
        let mut candidate = Candidate::new();
        candidate.email = "stored@x.com".to_string();
        let channel = choose_channel(
            &candidate,
            &ExtractedRecord::default(),
            &Confidence::default(),
            None,
        );
        assert_eq!(channel, Some(Channel::Email));
    }

    #[test]
    fn test_no_contact_means_no_channel() {
        let channel = choose_channel(
            &Candidate::new(),
            &ExtractedRecord::default(),
            &Confidence::default(),
            None,
        );
        assert_eq!(channel, None);
    }

    #[test]
    fn test_fallback_preview_mentions_org_and_url() {
        let preview = fallback_preview(&payload());
        assert!(preview.subject.contains("TraqCheck"));
        assert!(preview.email_body.contains("Hi Jane Doe"));
        assert!(preview.email_body.contains("https://verify.example/upload/1"));
        assert!(preview.sms_body.contains("https://verify.example/upload/1"));
    }

    #[test]
    fn test_fallback_preview_without_name_greets_there() {
        let mut p = payload();
        p.candidate_name = "  ".to_string();
        let preview = fallback_preview(&p);
        assert!(preview.email_body.starts_with("Hi there,"));
    }

    #[test]
    fn test_scrub_replaces_employer_with_org() {
        let preview = MessagePreview {
            subject: "Documents for Acme Corp".to_string(),
            email_body: "We are reaching out from Acme Corp about onboarding.".to_string(),
            sms_body: "Acme Corp: upload your documents".to_string(),
        };
        let scrubbed = scrub_sender(preview, "Acme Corp", "TraqCheck");
        assert_eq!(scrubbed.subject, "Documents for TraqCheck");
        assert_eq!(
            scrubbed.email_body,
            "We are reaching out from TraqCheck about onboarding."
        );
        assert_eq!(scrubbed.sms_body, "TraqCheck: upload your documents");
    }

    #[test]
    fn test_scrub_leaves_matching_org_alone() {
        let preview = MessagePreview {
            subject: "TraqCheck request".to_string(),
            email_body: String::new(),
            sms_body: String::new(),
        };
        let scrubbed = scrub_sender(preview, "traqcheck", "TraqCheck");
        assert_eq!(scrubbed.subject, "TraqCheck request");
    }

    #[tokio::test]
    async fn test_compose_without_provider_uses_template() {
        let gateway = LlmGateway::new(LlmConfig::disabled());
        let preview = compose_document_request(&gateway, &payload()).await;
        assert!(preview.email_body.contains("background verification"));
        assert!(preview.subject.contains("PAN & Aadhaar"));
    }
}
