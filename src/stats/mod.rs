//! # Per-sample statistics over sparse vectors
//!
//! Read-only computations over a [`SingleCellExpressionDataVector`]:
//!
//! - [`descriptive`]: counts, order statistics and scale-aware aggregates,
//!   one value per sample, or for one sample restricted to the cells of a
//!   [`CellFilter`].
//! - [`SparsityMetrics`]: whether values are expressed above a threshold,
//!   and the number of expressing cells and design elements per sample.
//!
//! Values are located per sample from the dimension's offsets; samples are
//! visited in order so each range search resumes where the previous one
//! ended.
//!
//! ## Missing values
//!
//! NaN is the only missing value. It is excluded from every statistic, so
//! `count` and `mean` agree on the number of values they consider.
//!
//! [`SingleCellExpressionDataVector`]: crate::model::SingleCellExpressionDataVector

pub mod descriptive;
mod error;
mod filter;
pub mod scale;
mod sparsity;

#[cfg(test)]
mod tests;

pub use descriptive::Statistic;
pub use error::StatsError;
pub use filter::CellFilter;
pub use sparsity::SparsityMetrics;
