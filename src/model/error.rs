use crate::codec::CodecError;

/// Errors raised when a single-cell structure violates its invariants
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Offsets and assays differ in length
    #[error("Offsets length {offsets} does not match the number of assays {assays}")]
    OffsetsLengthMismatch {
        /// Number of offsets
        offsets: usize,
        /// Number of assays
        assays: usize,
    },

    /// Offsets must be non-decreasing
    #[error("Offset of assay {index} ({value}) is lower than the offset of the previous assay")]
    DecreasingOffsets {
        /// Position of the offending assay
        index: usize,
        /// Offending offset
        value: usize,
    },

    /// An offset points past the cell universe
    #[error("Offset of assay {index} ({value}) exceeds the number of cells ({number_of_cells})")]
    OffsetOutOfBounds {
        /// Position of the offending assay
        index: usize,
        /// Offending offset
        value: usize,
        /// Size of the cell universe
        number_of_cells: usize,
    },

    /// Cell IDs do not cover the cell universe
    #[error("Expected {expected} cell IDs, got {actual}")]
    CellIdsLengthMismatch {
        /// Size of the cell universe
        expected: usize,
        /// Number of cell IDs supplied
        actual: usize,
    },

    /// Per-cell indices do not cover the cell universe
    #[error("Expected {expected} cell indices, got {actual}")]
    IndicesLengthMismatch {
        /// Size of the cell universe
        expected: usize,
        /// Number of indices supplied
        actual: usize,
    },

    /// A per-cell index does not refer to a characteristic
    #[error("Invalid characteristic index {value} for cell {cell}: must be -1 or lower than {len}")]
    InvalidCharacteristicIndex {
        /// Cell position
        cell: usize,
        /// Offending index
        value: i32,
        /// Number of characteristics
        len: usize,
    },

    /// Sample position out of range
    #[error("Sample index {index} is out of range for {len} assays")]
    SampleIndexOutOfRange {
        /// Requested position
        index: usize,
        /// Number of assays
        len: usize,
    },

    /// Sample lookup failed
    #[error("Sample not found: {0}")]
    SampleNotFound(String),

    /// Mask invariant violated
    #[error("Invalid mask: {0}")]
    InvalidMask(String),

    /// Data buffer does not match the number of indices
    #[error("Expected {expected} data elements to match the data indices, got {actual}")]
    DataLengthMismatch {
        /// Number of data indices
        expected: usize,
        /// Number of encoded elements
        actual: usize,
    },

    /// Data indices must be strictly increasing
    #[error("Data index {value} at position {position} is not greater than its predecessor")]
    UnsortedDataIndices {
        /// Position in the data indices
        position: usize,
        /// Offending index
        value: usize,
    },

    /// A data index points past the cell universe
    #[error("Data index {value} at position {position} exceeds the number of cells ({number_of_cells})")]
    DataIndexOutOfBounds {
        /// Position in the data indices
        position: usize,
        /// Offending index
        value: usize,
        /// Size of the cell universe
        number_of_cells: usize,
    },

    /// Data buffer decoding error
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}
