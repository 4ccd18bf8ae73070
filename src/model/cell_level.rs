use serde::{Deserialize, Serialize};

use super::{Characteristic, ModelError};

/// Index assigned to cells that carry no characteristic
pub const UNKNOWN_CHARACTERISTIC: i32 = -1;

const MASK_TRUE: &str = "true";
const MASK_FALSE: &str = "false";

/// A categorical labelling of every cell in a dimension
///
/// `indices[c]` is the position of cell `c`'s characteristic in
/// `characteristics`, or [`UNKNOWN_CHARACTERISTIC`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CellLevelCharacteristicsRecord")]
pub struct CellLevelCharacteristics {
    name: Option<String>,
    characteristics: Vec<Characteristic>,
    indices: Vec<i32>,
}

#[derive(Deserialize)]
struct CellLevelCharacteristicsRecord {
    #[serde(default)]
    name: Option<String>,
    characteristics: Vec<Characteristic>,
    indices: Vec<i32>,
}

impl TryFrom<CellLevelCharacteristicsRecord> for CellLevelCharacteristics {
    type Error = ModelError;

    fn try_from(record: CellLevelCharacteristicsRecord) -> Result<Self, Self::Error> {
        let mut clc = Self::new(record.characteristics, record.indices)?;
        clc.name = record.name;
        Ok(clc)
    }
}

impl CellLevelCharacteristics {
    /// Create cell-level characteristics, validating every index
    pub fn new(characteristics: Vec<Characteristic>, indices: Vec<i32>) -> Result<Self, ModelError> {
        let len = characteristics.len();
        for (cell, &value) in indices.iter().enumerate() {
            if value != UNKNOWN_CHARACTERISTIC && (value < 0 || value as usize >= len) {
                return Err(ModelError::InvalidCharacteristicIndex { cell, value, len });
            }
        }
        Ok(Self {
            name: None,
            characteristics,
            indices,
        })
    }

    /// Set a display name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Display name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Ordered list of categories
    pub fn characteristics(&self) -> &[Characteristic] {
        &self.characteristics
    }

    /// Per-cell category positions
    pub fn indices(&self) -> &[i32] {
        &self.indices
    }

    /// Number of categories
    pub fn number_of_characteristics(&self) -> usize {
        self.characteristics.len()
    }

    /// Number of cells covered
    pub fn number_of_cells(&self) -> usize {
        self.indices.len()
    }

    /// Characteristic of a cell, `None` if unassigned
    pub fn characteristic_of(&self, cell: usize) -> Option<&Characteristic> {
        match self.indices.get(cell) {
            Some(&i) if i != UNKNOWN_CHARACTERISTIC => self.characteristics.get(i as usize),
            _ => None,
        }
    }

    /// Count the cells assigned to `category` ([`UNKNOWN_CHARACTERISTIC`] counts unassigned cells)
    pub fn number_of_cells_with(&self, category: i32) -> usize {
        self.indices.iter().filter(|&&i| i == category).count()
    }

    /// Whether `category` is a valid category position or [`UNKNOWN_CHARACTERISTIC`]
    pub fn is_valid_category(&self, category: i32) -> bool {
        category == UNKNOWN_CHARACTERISTIC
            || (category >= 0 && (category as usize) < self.characteristics.len())
    }

    /// Same categories over a different set of cells
    pub(crate) fn with_indices(&self, indices: Vec<i32>) -> Self {
        Self {
            name: self.name.clone(),
            characteristics: self.characteristics.clone(),
            indices,
        }
    }
}

/// Cell type labelling of a dimension's cells
///
/// This is a [`CellLevelCharacteristics`] whose categories are cell types,
/// plus the protocol that produced the assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellTypeAssignment {
    /// Protocol used to assign cell types (e.g., "Seurat clustering")
    #[serde(default)]
    pub protocol: Option<String>,

    /// Whether this assignment is the preferred one
    #[serde(default)]
    pub preferred: bool,

    assignment: CellLevelCharacteristics,
}

impl CellTypeAssignment {
    /// Create a cell type assignment
    pub fn new(cell_types: Vec<Characteristic>, indices: Vec<i32>) -> Result<Self, ModelError> {
        Ok(Self::from_characteristics(CellLevelCharacteristics::new(
            cell_types, indices,
        )?))
    }

    /// Wrap existing cell-level characteristics as a cell type assignment
    pub fn from_characteristics(assignment: CellLevelCharacteristics) -> Self {
        Self {
            protocol: None,
            preferred: false,
            assignment,
        }
    }

    /// Cell types
    pub fn cell_types(&self) -> &[Characteristic] {
        self.assignment.characteristics()
    }

    /// Per-cell cell type positions
    pub fn indices(&self) -> &[i32] {
        self.assignment.indices()
    }

    /// View as generic cell-level characteristics
    pub fn as_characteristics(&self) -> &CellLevelCharacteristics {
        &self.assignment
    }

    pub(crate) fn with_indices(&self, indices: Vec<i32>) -> Self {
        Self {
            protocol: self.protocol.clone(),
            preferred: self.preferred,
            assignment: self.assignment.with_indices(indices),
        }
    }
}

/// Encode a boolean array as a two-category mask
///
/// Category 0 is `true` and category 1 is `false`.
pub fn create_mask(mask: &[bool]) -> CellLevelCharacteristics {
    CellLevelCharacteristics {
        name: None,
        characteristics: vec![Characteristic::new(MASK_TRUE), Characteristic::new(MASK_FALSE)],
        indices: mask.iter().map(|&b| if b { 0 } else { 1 }).collect(),
    }
}

/// Decode a mask back into a boolean array
pub fn parse_mask(mask: &CellLevelCharacteristics) -> Result<Vec<bool>, ModelError> {
    if mask.number_of_characteristics() != 2 {
        return Err(ModelError::InvalidMask(format!(
            "expected exactly two characteristics, got {}",
            mask.number_of_characteristics()
        )));
    }
    let is_true = |c: &Characteristic| c.value.eq_ignore_ascii_case(MASK_TRUE);
    let is_false = |c: &Characteristic| c.value.eq_ignore_ascii_case(MASK_FALSE);
    let (first, second) = (&mask.characteristics[0], &mask.characteristics[1]);
    let true_index = if is_true(first) && is_false(second) {
        0
    } else if is_false(first) && is_true(second) {
        1
    } else {
        return Err(ModelError::InvalidMask(
            "exactly one characteristic must be true and one must be false".to_string(),
        ));
    };
    mask.indices
        .iter()
        .enumerate()
        .map(|(cell, &i)| {
            if i == UNKNOWN_CHARACTERISTIC {
                Err(ModelError::InvalidMask(format!("cell {cell} is unassigned")))
            } else {
                Ok(i == true_index)
            }
        })
        .collect()
}
