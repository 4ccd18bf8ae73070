use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Handle of a biological sample
///
/// Assays are identity-comparable: two handles are equal when their `id`
/// is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BioAssay {
    /// Identifier
    pub id: i64,

    /// Display name
    pub name: String,

    /// Number of sequenced reads, when known
    #[serde(default)]
    pub sequence_read_count: Option<u64>,
}

impl BioAssay {
    /// Create a new assay handle
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            sequence_read_count: None,
        }
    }
}

impl PartialEq for BioAssay {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for BioAssay {}

impl Hash for BioAssay {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for BioAssay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Id={})", self.name, self.id)
    }
}
