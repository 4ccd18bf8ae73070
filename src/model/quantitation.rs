use std::fmt;

use serde::{Deserialize, Serialize};

use crate::codec::PrimitiveType;

/// Transform under which stored values are expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScaleType {
    /// Untransformed values
    Linear,
    /// `ln(1 + x)`
    Log1p,
    /// `log2(x)`
    Log2,
    /// `ln(x)`
    Ln,
    /// `log10(x)`
    Log10,
    /// Raw counts
    Count,
    /// Percentage in `[0, 100]`
    Percent,
    /// Fraction in `[0, 1]`
    Percent1,
    /// Logarithm of an unknown base
    LogBaseUnknown,
}

/// Descriptor of the values stored in a set of vectors
///
/// Only the representation and the scale drive computations; the name and
/// description are carried for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantitationType {
    /// Name of the quantitation
    pub name: String,

    /// Free-form description
    #[serde(default)]
    pub description: Option<String>,

    /// How values are encoded in data buffers
    pub representation: PrimitiveType,

    /// Scale of the stored values
    pub scale: ScaleType,
}

impl QuantitationType {
    /// Create a new quantitation type
    pub fn new(name: &str, representation: PrimitiveType, scale: ScaleType) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            representation,
            scale,
        }
    }
}

impl fmt::Display for QuantitationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:?}, {:?})",
            self.name, self.representation, self.scale
        )
    }
}
