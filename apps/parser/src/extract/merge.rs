// Reconciles the deterministic and LLM partial records into one final
// record with per-field confidence. Pure over its inputs.

use crate::models::{Candidate, Confidence, ExtractedRecord, MAX_SKILLS};

// Precedence is asymmetric on purpose. Email and phone are well-formed
// tokens a regex finds more reliably than free-text generation; name,
// company and designation are noisy header text the model reads better,
// with the heuristic value as a safety net.
const PREFERRED: f64 = 1.0;
const LLM_FALLBACK: f64 = 0.7;
const LLM_PREFERRED: f64 = 0.8;
const DETERMINISTIC_FALLBACK: f64 = 0.6;
const SKILLS_UNION: f64 = 0.9;

/// Merge two partial records. An unavailable LLM stage is represented by
/// an empty record, which lands every field on its fallback source.
pub fn merge_results(
    deterministic: &ExtractedRecord,
    llm: &ExtractedRecord,
) -> (ExtractedRecord, Confidence) {
    let (email, email_conf) = prefer_deterministic(&deterministic.email, &llm.email);
    let (phone, phone_conf) = prefer_deterministic(&deterministic.phone, &llm.phone);
    let (name, name_conf) = prefer_llm(&deterministic.name, &llm.name);
    let (company, company_conf) = prefer_llm(&deterministic.company, &llm.company);
    let (designation, designation_conf) = prefer_llm(&deterministic.designation, &llm.designation);
    let skills = union_skills(&deterministic.skills, &llm.skills);
    let skills_conf = if skills.is_empty() { 0.0 } else { SKILLS_UNION };

    let record = ExtractedRecord {
        name,
        email,
        phone,
        company,
        designation,
        skills,
    };
    let confidence = Confidence {
        name: name_conf,
        email: email_conf,
        phone: phone_conf,
        company: company_conf,
        designation: designation_conf,
        skills: skills_conf,
    }
    .clamped();
    (record, confidence)
}

fn prefer_deterministic(deterministic: &str, llm: &str) -> (String, f64) {
    if !deterministic.is_empty() {
        (deterministic.to_string(), PREFERRED)
    } else if !llm.is_empty() {
        (llm.to_string(), LLM_FALLBACK)
    } else {
        (String::new(), 0.0)
    }
}

fn prefer_llm(deterministic: &str, llm: &str) -> (String, f64) {
    if !llm.is_empty() {
        (llm.to_string(), LLM_PREFERRED)
    } else if !deterministic.is_empty() {
        (deterministic.to_string(), DETERMINISTIC_FALLBACK)
    } else {
        (String::new(), 0.0)
    }
}

fn union_skills(a: &[String], b: &[String]) -> Vec<String> {
    let mut skills: Vec<String> = a
        .iter()
        .chain(b.iter())
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    skills.sort();
    skills.dedup();
    skills.truncate(MAX_SKILLS);
    skills
}

/// Write extracted values onto a stored candidate, filling only fields
/// that are currently empty. Skills are copied only when the candidate
/// has none. Returns whether anything changed.
pub fn apply_to_candidate(candidate: &mut Candidate, record: &ExtractedRecord) -> bool {
    let mut changed = false;
    let fields = [
        (&mut candidate.name, &record.name),
        (&mut candidate.email, &record.email),
        (&mut candidate.phone, &record.phone),
        (&mut candidate.company, &record.company),
        (&mut candidate.designation, &record.designation),
    ];
    for (existing, extracted) in fields {
        if existing.trim().is_empty() && !extracted.is_empty() {
            *existing = extracted.clone();
            changed = true;
        }
    }
    if candidate.skills.is_empty() && !record.skills.is_empty() {
        candidate.skills = record.skills.clone();
        changed = true;
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        name: &str,
        email: &str,
        phone: &str,
        company: &str,
        designation: &str,
        skills: &[&str],
    ) -> ExtractedRecord {
        ExtractedRecord {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            company: company.to_string(),
            designation: designation.to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_email_prefers_deterministic() {
        let det = record("", "a@x.com", "", "", "", &[]);
        let llm = record("", "b@y.com", "", "", "", &[]);
        let (merged, confidence) = merge_results(&det, &llm);
        assert_eq!(merged.email, "a@x.com");
        assert_eq!(confidence.email, 1.0);
    }

    #[test]
    fn test_email_falls_back_to_llm() {
        let det = ExtractedRecord::default();
        let llm = record("", "b@y.com", "", "", "", &[]);
        let (merged, confidence) = merge_results(&det, &llm);
        assert_eq!(merged.email, "b@y.com");
        assert_eq!(confidence.email, 0.7);
    }

    #[test]
    fn test_name_prefers_llm() {
        let det = ExtractedRecord::default();
        let llm = record("Jane Doe", "", "", "", "", &[]);
        let (merged, confidence) = merge_results(&det, &llm);
        assert_eq!(merged.name, "Jane Doe");
        assert_eq!(confidence.name, 0.8);
    }

    #[test]
    fn test_name_falls_back_to_deterministic() {
        let det = record("Jane Doe", "", "", "", "", &[]);
        let llm = ExtractedRecord::default();
        let (merged, confidence) = merge_results(&det, &llm);
        assert_eq!(merged.name, "Jane Doe");
        assert_eq!(confidence.name, 0.6);
    }

    #[test]
    fn test_absent_field_has_zero_confidence() {
        let (merged, confidence) = merge_results(
            &ExtractedRecord::default(),
            &ExtractedRecord::default(),
        );
        assert!(merged.is_empty());
        for value in confidence.values() {
            assert_eq!(value, 0.0);
        }
    }

    #[test]
    fn test_skills_union_dedupes_case_insensitively() {
        let det = record("", "", "", "", "", &["python", "docker"]);
        let llm = record("", "", "", "", "", &["Python", "kafka"]);
        let (merged, confidence) = merge_results(&det, &llm);
        assert_eq!(merged.skills, vec!["docker", "kafka", "python"]);
        assert_eq!(confidence.skills, 0.9);
    }

    #[test]
    fn test_skills_union_is_idempotent() {
        let a = record("", "", "", "", "", &["python", "rust"]);
        let (merged, _) = merge_results(&a, &a);
        assert_eq!(merged.skills, a.skills);
    }

    #[test]
    fn test_skills_union_recaps_at_limit() {
        let many: Vec<String> = (0..15).map(|i| format!("skill{i:02}")).collect();
        let more: Vec<String> = (10..25).map(|i| format!("skill{i:02}")).collect();
        let det = ExtractedRecord {
            skills: many,
            ..Default::default()
        };
        let llm = ExtractedRecord {
            skills: more,
            ..Default::default()
        };
        let (merged, _) = merge_results(&det, &llm);
        assert_eq!(merged.skills.len(), MAX_SKILLS);
        assert_eq!(merged.skills[0], "skill00");
    }

    #[test]
    fn test_all_confidences_within_unit_interval() {
        let det = record("Jane", "a@x.com", "1234567", "Acme", "Engineer", &["rust"]);
        let llm = record("Jane Doe", "b@y.com", "7654321", "Acme Corp", "SWE", &["python"]);
        let (_, confidence) = merge_results(&det, &llm);
        for value in confidence.values() {
            assert!((0.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn test_apply_fills_only_empty_fields() {
        let mut candidate = Candidate::new();
        candidate.name = "Jane Doe".to_string();
        let extracted = record(
            "Someone Else",
            "jane@x.com",
            "14155550100",
            "Acme",
            "",
            &["python"],
        );
        let changed = apply_to_candidate(&mut candidate, &extracted);
        assert!(changed);
        assert_eq!(candidate.name, "Jane Doe");
        assert_eq!(candidate.email, "jane@x.com");
        assert_eq!(candidate.phone, "14155550100");
        assert_eq!(candidate.company, "Acme");
        assert_eq!(candidate.skills, vec!["python"]);
    }

    #[test]
    fn test_apply_keeps_existing_skills() {
        let mut candidate = Candidate::new();
        candidate.name = "Jane".to_string();
        candidate.email = "jane@x.com".to_string();
        candidate.phone = "14155550100".to_string();
        candidate.skills = vec!["go".to_string()];
        candidate.company = "Acme".to_string();
        candidate.designation = "Engineer".to_string();
        let extracted = record("Jane", "jane@x.com", "14155550100", "Acme", "Engineer", &["python"]);
        let changed = apply_to_candidate(&mut candidate, &extracted);
        assert!(!changed);
        assert_eq!(candidate.skills, vec!["go"]);
    }
}
