//! # Single-cell data model
//!
//! This module holds the structures shared by every other component:
//!
//! - [`SingleCellDimension`]: the ordered samples, where each sample's cells
//!   begin in the cell universe, the cell identifiers and the per-cell
//!   annotations.
//! - [`SingleCellExpressionDataVector`]: one design element's values, stored
//!   sparsely against a shared dimension.
//! - [`CellLevelCharacteristics`] and [`CellTypeAssignment`]: categorical
//!   labellings of the cell universe, with [`create_mask`]/[`parse_mask`] for
//!   the boolean special case.
//!
//! ## Layout
//!
//! ```text
//! cell universe   | s0 c0 | s0 c1 | s0 c2 | s1 c0 | s1 c1 |
//! offsets         [0,                      3]
//! data_indices    [0, 2, 3, 4]            (cell 1 has no value)
//! data            [v0, v2, v3, v4]        (packed by representation)
//! ```
//!
//! Dimensions are shared between vectors through [`std::sync::Arc`] and are
//! never mutated; slicing produces new dimensions and vectors.

mod assay;
mod cell_level;
mod characteristic;
mod dimension;
mod error;
mod quantitation;
mod vector;

#[cfg(test)]
mod tests;

pub use assay::BioAssay;
pub use cell_level::{
    create_mask, parse_mask, CellLevelCharacteristics, CellTypeAssignment, UNKNOWN_CHARACTERISTIC,
};
pub use characteristic::{terms_match, Characteristic};
pub use dimension::{DimensionId, SingleCellDimension, SingleCellDimensionBuilder};
pub use error::ModelError;
pub use quantitation::{QuantitationType, ScaleType};
pub use vector::SingleCellExpressionDataVector;

pub(crate) use dimension::cumulative_offsets;
