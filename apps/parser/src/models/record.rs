use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Hard cap on the skills list, everywhere it is produced.
pub const MAX_SKILLS: usize = 20;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapse runs of whitespace to single spaces and strip ends.
pub fn normalize_space(s: &str) -> String {
    WHITESPACE_RE.replace_all(s.trim(), " ").to_string()
}

/// Normalize a phone-like string to a canonical digits-only form.
/// Returns `""` if not plausible (fewer than 7 or more than 15 digits).
pub fn canonical_phone(s: &str) -> String {
    let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
    if (7..=15).contains(&digits.len()) {
        digits
    } else {
        String::new()
    }
}

/// One extractor's best guess at the candidate fields.
///
/// A partial record: some or all fields may be empty. Produced fresh by
/// each extraction stage and never mutated in place; the merge step
/// consumes two of these and returns a new one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedRecord {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub designation: String,
    pub skills: Vec<String>,
}

impl ExtractedRecord {
    /// Enforce the field invariants: whitespace-collapsed strings,
    /// lowercased email, digits-only plausible phone, and a sorted,
    /// case-insensitively deduplicated skills list capped at
    /// [`MAX_SKILLS`].
    pub fn normalized(self) -> Self {
        let mut skills: Vec<String> = Vec::new();
        for skill in &self.skills {
            let key = normalize_space(skill).to_lowercase();
            if !key.is_empty() && !skills.contains(&key) {
                skills.push(key);
            }
        }
        skills.sort();
        skills.truncate(MAX_SKILLS);

        Self {
            name: normalize_space(&self.name),
            email: normalize_space(&self.email).to_lowercase(),
            phone: canonical_phone(&self.phone),
            company: normalize_space(&self.company),
            designation: normalize_space(&self.designation),
            skills,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
            && self.email.is_empty()
            && self.phone.is_empty()
            && self.company.is_empty()
            && self.designation.is_empty()
            && self.skills.is_empty()
    }
}

/// Per-field trust in the merged record, each value in [0.0, 1.0].
///
/// Every field is always present, defaulting to 0.0. Not a calibrated
/// probability, just the precedence table's output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Confidence {
    pub name: f64,
    pub email: f64,
    pub phone: f64,
    pub company: f64,
    pub designation: f64,
    pub skills: f64,
}

impl Confidence {
    /// Clamp every value into [0.0, 1.0], regardless of how it was
    /// computed upstream.
    pub fn clamped(self) -> Self {
        Self {
            name: clamp01(self.name),
            email: clamp01(self.email),
            phone: clamp01(self.phone),
            company: clamp01(self.company),
            designation: clamp01(self.designation),
            skills: clamp01(self.skills),
        }
    }

    pub fn values(&self) -> [f64; 6] {
        [
            self.name,
            self.email,
            self.phone,
            self.company,
            self.designation,
            self.skills,
        ]
    }
}

pub(crate) fn clamp01(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}
