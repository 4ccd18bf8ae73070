use crate::model::{CellLevelCharacteristics, SingleCellDimension};

use super::StatsError;

/// Restriction of a sample's values to the cells of one category
///
/// A cell is accepted when its annotation index equals `category`, so
/// passing [`UNKNOWN_CHARACTERISTIC`](crate::model::UNKNOWN_CHARACTERISTIC)
/// selects the unannotated cells.
#[derive(Debug, Clone, Copy)]
pub struct CellFilter<'a> {
    characteristics: &'a CellLevelCharacteristics,
    category: i32,
}

impl<'a> CellFilter<'a> {
    /// Select the cells of `category`
    pub fn new(characteristics: &'a CellLevelCharacteristics, category: i32) -> Result<Self, StatsError> {
        if !characteristics.is_valid_category(category) {
            return Err(StatsError::InvalidCategory(category));
        }
        Ok(Self {
            characteristics,
            category,
        })
    }

    /// Annotations the filter reads
    pub fn characteristics(&self) -> &'a CellLevelCharacteristics {
        self.characteristics
    }

    /// Selected category
    pub fn category(&self) -> i32 {
        self.category
    }

    /// Whether cell `cell` of the universe is selected
    #[inline]
    pub fn accepts(&self, cell: usize) -> bool {
        self.characteristics.indices()[cell] == self.category
    }

    /// Check that the annotations cover the dimension's cell universe
    pub(crate) fn check(&self, dimension: &SingleCellDimension) -> Result<(), StatsError> {
        let actual = self.characteristics.number_of_cells();
        if actual != dimension.number_of_cells() {
            return Err(StatsError::CellCountMismatch {
                expected: dimension.number_of_cells(),
                actual,
            });
        }
        Ok(())
    }
}

/// Check an optional filter against a dimension
pub(crate) fn check_filter(
    filter: Option<&CellFilter<'_>>,
    dimension: &SingleCellDimension,
) -> Result<(), StatsError> {
    match filter {
        Some(filter) => filter.check(dimension),
        None => Ok(()),
    }
}

/// Whether `cell` passes an optional filter
#[inline]
pub(crate) fn passes(filter: Option<&CellFilter<'_>>, cell: usize) -> bool {
    filter.map_or(true, |f| f.accepts(cell))
}
