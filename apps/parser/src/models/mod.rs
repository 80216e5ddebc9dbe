pub mod candidate;
pub mod record;

pub use candidate::Candidate;
pub use record::{canonical_phone, normalize_space, Confidence, ExtractedRecord, MAX_SKILLS};
