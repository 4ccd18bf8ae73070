use crate::codec::{CodecError, PrimitiveType};
use crate::model::{ModelError, ScaleType};
use crate::stats::StatsError;

/// Errors that can occur while aggregating single-cell vectors
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    /// Nothing to aggregate
    #[error("No vectors to aggregate")]
    NoVectors,

    /// Vectors do not share a dimension
    #[error("All vectors must share the same dimension")]
    MixedDimensions,

    /// Vectors do not share a quantitation type
    #[error("All vectors must share the same quantitation type")]
    MixedQuantitationTypes,

    /// Values cannot be summed
    #[error("Cannot aggregate data represented as {0:?}")]
    UnsupportedRepresentation(PrimitiveType),

    /// Values cannot be summed on their scale
    #[error("Cannot aggregate data on the {0:?} scale")]
    UnsupportedScale(ScaleType),

    /// The dimension has no cell type assignment to aggregate by
    #[error("The dimension has no preferred cell type assignment")]
    NoCellTypeAssignment,

    /// A target refers to a cell type that does not exist
    #[error("Invalid cell type {0}")]
    InvalidCellType(i32),

    /// A source sample declares fewer reads than its observed library size
    #[error("{sample} declares {reads} reads, fewer than its library size of {library_size}")]
    LibrarySizeExceedsReads {
        /// Source sample
        sample: String,
        /// Declared sequence read count
        reads: u64,
        /// Observed library size
        library_size: f64,
    },

    /// Invalid sample lookup
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Undecodable data buffer
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Sparsity metrics could not be computed
    #[error(transparent)]
    Stats(#[from] StatsError),
}
