use std::fmt;

use serde::{Deserialize, Serialize};

/// A categorical annotation value, such as a cell type label
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Characteristic {
    /// Persistent identifier, if any
    #[serde(default)]
    pub id: Option<i64>,

    /// Category (e.g., "cell type")
    #[serde(default)]
    pub category: Option<String>,

    /// Ontology term for the category
    #[serde(default)]
    pub category_uri: Option<String>,

    /// Value (e.g., "astrocyte")
    pub value: String,

    /// Ontology term for the value
    #[serde(default)]
    pub value_uri: Option<String>,
}

impl Characteristic {
    /// Create a characteristic with a free-text value
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
            ..Default::default()
        }
    }

    /// Set the persistent identifier
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the ontology term of the value
    pub fn with_value_uri(mut self, uri: &str) -> Self {
        self.value_uri = Some(uri.to_string());
        self
    }

    /// Set the category and its optional ontology term
    pub fn with_category(mut self, category: &str, uri: Option<&str>) -> Self {
        self.category = Some(category.to_string());
        self.category_uri = uri.map(str::to_string);
        self
    }

    /// Whether this characteristic denotes the same term as `value`/`uri`
    pub fn matches_term(&self, value: &str, uri: Option<&str>) -> bool {
        terms_match(&self.value, self.value_uri.as_deref(), value, uri)
    }
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value_uri {
            Some(uri) => write!(f, "{} [{}]", self.value, uri),
            None => write!(f, "{}", self.value),
        }
    }
}

/// Compare two terms
///
/// Terms carrying a URI on both sides are compared by URI, otherwise by value.
/// Both comparisons ignore ASCII case.
pub fn terms_match(value_a: &str, uri_a: Option<&str>, value_b: &str, uri_b: Option<&str>) -> bool {
    match (uri_a, uri_b) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        _ => value_a.eq_ignore_ascii_case(value_b),
    }
}
