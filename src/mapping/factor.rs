use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{terms_match, Characteristic};

/// Kind of experimental factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FactorType {
    /// Discrete levels
    Categorical,
    /// Measured quantity
    Continuous,
}

/// A statement about a factor value, such as "cell type is astrocyte"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// Category (e.g., "cell type")
    #[serde(default)]
    pub category: Option<String>,

    /// Subject of the statement (e.g., "astrocyte")
    pub subject: String,

    /// Ontology term for the subject
    #[serde(default)]
    pub subject_uri: Option<String>,
}

impl Statement {
    /// Create a statement with a free-text subject
    pub fn new(subject: &str) -> Self {
        Self {
            subject: subject.to_string(),
            ..Default::default()
        }
    }

    /// Set the ontology term of the subject
    pub fn with_subject_uri(mut self, uri: &str) -> Self {
        self.subject_uri = Some(uri.to_string());
        self
    }

    /// Whether the statement's subject denotes `characteristic`
    pub fn is_about(&self, characteristic: &Characteristic) -> bool {
        terms_match(
            &self.subject,
            self.subject_uri.as_deref(),
            &characteristic.value,
            characteristic.value_uri.as_deref(),
        )
    }
}

/// One level of an experimental factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorValue {
    /// Identifier
    pub id: i64,

    /// Free-text value, for factor values without statements
    #[serde(default)]
    pub value: Option<String>,

    /// Statements describing the level
    #[serde(default)]
    pub characteristics: Vec<Statement>,
}

impl FactorValue {
    /// Create a factor value described by statements
    pub fn new(id: i64, characteristics: Vec<Statement>) -> Self {
        Self {
            id,
            value: None,
            characteristics,
        }
    }

    /// Whether any statement of this factor value is about `characteristic`
    pub fn is_about(&self, characteristic: &Characteristic) -> bool {
        self.characteristics.iter().any(|s| s.is_about(characteristic))
    }
}

impl fmt::Display for FactorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.characteristics.is_empty() {
            let subjects: Vec<&str> = self.characteristics.iter().map(|s| s.subject.as_str()).collect();
            write!(f, "{}", subjects.join(" / "))
        } else {
            match &self.value {
                Some(value) => write!(f, "{value}"),
                None => write!(f, "FactorValue Id={}", self.id),
            }
        }
    }
}

/// An experimental factor and its levels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentalFactor {
    /// Identifier
    pub id: i64,

    /// Name (e.g., "cell type")
    pub name: String,

    /// Kind of factor
    pub factor_type: FactorType,

    /// Levels
    #[serde(default)]
    pub factor_values: Vec<FactorValue>,
}

impl ExperimentalFactor {
    /// Create a categorical factor
    pub fn categorical(id: i64, name: &str, factor_values: Vec<FactorValue>) -> Self {
        Self {
            id,
            name: name.to_string(),
            factor_type: FactorType::Categorical,
            factor_values,
        }
    }

    /// Find a level by identifier
    pub fn factor_value(&self, id: i64) -> Option<&FactorValue> {
        self.factor_values.iter().find(|fv| fv.id == id)
    }
}

/// A subset of an experiment's samples, annotated with characteristics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSubset {
    /// Identifier
    pub id: i64,

    /// Name
    pub name: String,

    /// Characteristics shared by the samples of the subset
    #[serde(default)]
    pub characteristics: Vec<Characteristic>,
}

impl SampleSubset {
    /// Whether the subset is annotated with `characteristic`
    pub fn has(&self, characteristic: &Characteristic) -> bool {
        self.characteristics.iter().any(|c| {
            c.matches_term(&characteristic.value, characteristic.value_uri.as_deref())
        })
    }
}
