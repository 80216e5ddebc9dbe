use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The persisted candidate entity, as seen by this core.
///
/// Storage itself lives with the external collaborator; this is the
/// surface `apply_to_candidate` writes into. Fields mirror
/// [`super::ExtractedRecord`] plus an identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub designation: String,
    pub skills: Vec<String>,
}

impl Candidate {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            company: String::new(),
            designation: String::new(),
            skills: Vec::new(),
        }
    }
}

impl Default for Candidate {
    fn default() -> Self {
        Self::new()
    }
}
