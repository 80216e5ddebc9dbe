//! Deterministic regex/heuristic field extraction.
//!
//! Pure functions over the normalized text: no network, no randomness,
//! same output for the same input. This pass pulls the low-hanging
//! fruit and its output doubles as the hint block for the LLM pass.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{canonical_phone, ExtractedRecord, MAX_SKILLS};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap());

/// Loose phone shape; plausibility is decided after canonicalization
/// (7..=15 digits).
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\+?\d[\d\s().-]{6,}\d").unwrap());

const MONTHS: &str = "Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sept|Sep|Oct|Nov|Dec";

static SEP_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r" [|/•–—-] ").unwrap());
static DATE_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:{MONTHS})\b\s+\d{{4}}\s*[–—-]\s*\b(?:{MONTHS})\b\s+\d{{4}}"
    ))
    .unwrap()
});
static YEAR_RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\s*[–—-]\s*(?:19|20)\d{2}\b").unwrap());
static MONTH_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i)\b(?:{MONTHS})\b\s+\d{{4}}")).unwrap());
static MULTISPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());

/// Fixed technology/skill vocabulary for the bag-of-words pass.
const SKILL_KEYWORDS: &[&str] = &[
    "python", "java", "javascript", "typescript", "react", "redux", "next.js", "node", "node.js",
    "django", "flask", "spring", "spring boot", "postgres", "postgresql", "mysql", "mssql",
    "mongodb", "neo4j", "redis", "kafka", "spark", "hadoop", "elasticsearch", "docker",
    "kubernetes", "eks", "aws", "gcp", "azure", "sagemaker", "celery", "graphql", "rest", "grpc",
    "pandas", "pytorch", "tensorflow", "scikit-learn", "selenium", "playwright", "jenkins",
    "github actions", "terraform", "prometheus", "grafana", "rust", "golang",
];

/// Remove trailing timeline/location metadata from an employer segment:
/// a separator-delimited suffix, then month-name date ranges, bare year
/// ranges, and single month-year tokens, in that order.
fn strip_trailing_meta(s: &str) -> String {
    let s = SEP_SPLIT_RE.splitn(s, 2).next().unwrap_or("");
    let s = DATE_RANGE_RE.replace_all(s, "");
    let s = YEAR_RANGE_RE.replace_all(&s, "");
    let s = MONTH_YEAR_RE.replace_all(&s, "");
    MULTISPACE_RE.replace_all(&s, " ").trim().to_string()
}

/// Regex/heuristic pass producing a partial record. Confidence is not
/// computed here, that is the merge step's job.
pub fn deterministic_extract(text: &str) -> ExtractedRecord {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut record = ExtractedRecord::default();

    // Email: first match, lowercased.
    if let Some(m) = EMAIL_RE.find(text) {
        record.email = m.as_str().to_lowercase();
    }

    // Phone: first candidate whose digits-only form is plausible.
    for m in PHONE_RE.find_iter(text) {
        let candidate = canonical_phone(m.as_str());
        if !candidate.is_empty() {
            record.phone = candidate;
            break;
        }
    }

    // Name: first header line that is not contact info or the word
    // "resume". No survivor means no guess.
    for line in lines.iter().take(10) {
        if line.contains('@')
            || PHONE_RE.is_match(line)
            || line.to_lowercase().contains("resume")
        {
            continue;
        }
        record.name = line.chars().take(80).collect();
        break;
    }

    // Company & designation: first "<title>, <employer>" line whose
    // halves fit the length bounds once the employer's trailing
    // timeline/location noise is stripped.
    for line in &lines {
        if line.len() > 160 {
            continue;
        }
        let Some((left, right)) = line.split_once(',') else {
            continue;
        };
        let left = left.trim();
        let company = strip_trailing_meta(right.trim());
        if !(2..=60).contains(&left.len()) || !(2..=100).contains(&company.len()) {
            continue;
        }
        record.designation = left.to_string();
        record.company = company;
        break;
    }

    // Skills: vocabulary substring match, sorted, capped.
    let lower = text.to_lowercase();
    let mut skills: Vec<String> = SKILL_KEYWORDS
        .iter()
        .filter(|kw| lower.contains(**kw))
        .map(|kw| kw.to_string())
        .collect();
    skills.sort();
    skills.dedup();
    skills.truncate(MAX_SKILLS);
    record.skills = skills;

    record
}
