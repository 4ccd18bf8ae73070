use crate::codec::CodecError;
use crate::model::ModelError;

/// Errors that can occur while slicing single-cell data
#[derive(Debug, thiserror::Error)]
pub enum SliceError {
    /// Some requested assays are not part of the source dimension
    #[error("All requested assays must be present in the dimension; missing: {0}")]
    MissingAssays(String),

    /// An assay was requested more than once
    #[error("Assay {0} was requested more than once")]
    DuplicateAssay(String),

    /// Invalid source or resulting structure
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Data buffer cannot be sliced
    #[error(transparent)]
    Codec(#[from] CodecError),
}
