//! # scexpr
//!
//! A library for sparse single-cell expression data: the shared cell
//! universe of a dataset, per-gene sparse vectors over it, and the
//! operations run on them.
//!
//! ## Overview
//!
//! A single-cell dataset has many cells per sample and most measurements are
//! zero. Each design element (gene) is stored as a sparse vector that only
//! keeps its non-zero cells, against a [`SingleCellDimension`](model::SingleCellDimension)
//! shared by every vector of the dataset:
//!
//! - **Codec**: fixed-width big-endian packing of primitive values
//! - **Slicing**: restrict dimensions and vectors to a reordered subset of samples
//! - **Descriptive statistics**: per-sample min, max, median, quantiles, sums,
//!   means and variances, scale-aware
//! - **Sparsity metrics**: expressed cells and design elements under a
//!   configurable threshold
//! - **Pseudo-bulk aggregation**: per-cell-type sums and log2 CPM
//! - **Factor mapping**: map cell types onto the factor values of an
//!   experimental factor, and read or write those mappings as TSV
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use scexpr::prelude::*;
//! use scexpr::codec::encode_doubles;
//!
//! let samples = vec![BioAssay::new(1, "donor 1"), BioAssay::new(2, "donor 2")];
//! let dimension = Arc::new(SingleCellDimension::from_sample_sizes(samples.clone(), &[3, 2])?);
//! let qt = Arc::new(QuantitationType::new("counts", PrimitiveType::Double, ScaleType::Count));
//!
//! let vector = SingleCellExpressionDataVector::new(
//!     "ACTB",
//!     Arc::clone(&dimension),
//!     qt,
//!     encode_doubles(&[1.0, 4.0, 2.0]),
//!     vec![0, 2, 4],
//! )?;
//!
//! // per-sample statistics
//! let means = scexpr::stats::descriptive::mean(&vector)?;
//!
//! // keep the second donor only
//! let mut slicer = Slicer::new(vec![samples[1].clone()])?;
//! let sliced = slicer.slice(&vector)?;
//! assert_eq!(sliced.dimension().number_of_cells(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! The library is organized into the following modules:
//!
//! - [`codec`]: primitive types and byte packing
//! - [`model`]: dimensions, vectors, cell-level characteristics and masks
//! - [`slicer`]: sample-subset slicing with memoized dimensions
//! - [`stats`]: descriptive statistics and sparsity metrics
//! - [`aggregate`]: pseudo-bulk aggregation by cell type
//! - [`mapping`]: characteristic to factor value mapping
//! - [`config`]: TOML configuration
//!
//! ## Features
//!
//! - `parallel`: aggregate vectors on the rayon thread pool

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod aggregate;
pub mod codec;
pub mod config;
pub mod mapping;
pub mod model;
pub mod slicer;
pub mod stats;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::aggregate::{
        AggregateError, AggregateTarget, AggregatedVector, Aggregate, AggregationMethod, Aggregator,
    };
    pub use crate::codec::{CodecError, DataView, PrimitiveType};
    pub use crate::config::{AggregateConfig, Config, SparsityConfig};
    pub use crate::mapping::{
        CharacteristicMapping, ExperimentalFactor, FactorValue, MappingError, SampleSubset,
    };
    pub use crate::model::{
        BioAssay, CellLevelCharacteristics, CellTypeAssignment, Characteristic, ModelError,
        QuantitationType, ScaleType, SingleCellDimension, SingleCellExpressionDataVector,
    };
    pub use crate::slicer::{SliceError, SliceOptions, Slicer};
    pub use crate::stats::{CellFilter, SparsityMetrics, Statistic, StatsError};
}
