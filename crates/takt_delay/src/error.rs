//! Error types for delay model loading and validation.

/// Errors that can occur when loading or validating a delay model file.
#[derive(Debug, thiserror::Error)]
pub enum DelayModelError {
    /// An I/O error occurred while reading the delay model file.
    #[error("failed to read delay model: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse delay model: {0}")]
    ParseError(String),

    /// An operator table is keyed by a name no operator has.
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    /// A width slice's bounds do not form a non-empty range.
    #[error("invalid width slice in operator '{0}': until must be greater than from")]
    InvalidSlice(String),

    /// Two width slices in one operator model cover a common width.
    #[error("overlapping width slices in operator '{0}'")]
    OverlappingSlices(String),
}
