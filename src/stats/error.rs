use crate::codec::{CodecError, PrimitiveType};
use crate::model::{ModelError, ScaleType};

/// Errors that can occur while computing statistics over vectors
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    /// The operation is not defined for the representation
    #[error("Cannot compute {operation} on data represented as {representation:?}")]
    UnsupportedRepresentation {
        /// Representation of the vector
        representation: PrimitiveType,
        /// Name of the operation
        operation: &'static str,
    },

    /// The scale cannot be inverted
    #[error("Cannot compute {operation} on data on the {scale:?} scale")]
    UnsupportedScale {
        /// Scale of the vector
        scale: ScaleType,
        /// Name of the operation
        operation: &'static str,
    },

    /// A non-zero threshold has no defined meaning on the scale
    #[error("Threshold {threshold} is ambiguous on the {scale:?} scale, only 0 is supported")]
    UnsupportedThreshold {
        /// Scale of the vector
        scale: ScaleType,
        /// Requested threshold
        threshold: f64,
    },

    /// Threshold must be finite and non-negative
    #[error("Invalid threshold {0}: must be finite and non-negative")]
    InvalidThreshold(f64),

    /// Quantile outside of `[0, 1]`
    #[error("Invalid quantile {0}: must be within [0, 1]")]
    InvalidQuantile(f64),

    /// Cell annotations do not cover the vector's cell universe
    #[error("Cell annotations cover {actual} cells, the dimension has {expected}")]
    CellCountMismatch {
        /// Size of the cell universe
        expected: usize,
        /// Number of annotated cells
        actual: usize,
    },

    /// Category is neither a valid position nor the unknown marker
    #[error("Invalid category {0}")]
    InvalidCategory(i32),

    /// Vectors passed together do not share a dimension
    #[error("All vectors must share the same dimension")]
    MixedDimensions,

    /// Invalid sample lookup
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Undecodable data buffer
    #[error(transparent)]
    Codec(#[from] CodecError),
}
