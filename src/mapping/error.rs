/// Errors that can occur while mapping characteristics to factor values
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed tab-delimited input
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// Mapping requires a categorical factor
    #[error("Factor {0} is not categorical")]
    NonCategorical(String),

    /// A characteristic matches more than one factor value
    #[error("{characteristic} matches more than one factor value: {candidates}")]
    Ambiguous {
        /// Matched characteristic
        characteristic: String,
        /// Matching factor values
        candidates: String,
    },

    /// A mapping file refers to an unknown characteristic
    #[error("No characteristic with ID {0}")]
    UnknownCharacteristic(i64),

    /// A mapping file refers to an unknown factor value
    #[error("No factor value with ID {0}")]
    UnknownFactorValue(i64),

    /// A characteristic is mapped twice in a mapping file
    #[error("Characteristic with ID {0} has more than one factor value associated")]
    DuplicateMapping(i64),

    /// The header of a mapping file is missing or incorrect
    #[error("Invalid header {0:?}, expected \"cell_type_id\\tfactor_value_id\"")]
    InvalidHeader(String),

    /// A mapping file holds a non-numeric ID
    #[error("Invalid ID {value:?} on line {line}")]
    InvalidId {
        /// Line of the record
        line: u64,
        /// Offending field
        value: String,
    },

    /// A characteristic cannot be written without an ID
    #[error("Characteristic {0} has no ID")]
    MissingId(String),
}
