use thiserror::Error;

/// Result alias used by every fallible operation in the crate.
pub type Result<T> = std::result::Result<T, MaterialError>;

/// Failures raised while building or querying a material.
///
/// Construction errors are reported before any history is run and a
/// partially built material is never returned. Sampling faults (a weighted
/// walk that runs off the end of the constituent list) are not represented
/// here: they indicate a cross section aggregation bug and panic instead.
#[derive(Debug, Error)]
pub enum MaterialError {
    /// Bad id, zero density, mismatched fraction/name counts or mixed
    /// fraction signs.
    #[error("invalid material configuration: {0}")]
    InvalidConfiguration(String),

    /// A constituent name that is not in the scattering center table, or
    /// that was never part of the material.
    #[error("unknown constituent '{0}'")]
    UnknownConstituent(String),

    /// The same constituent name was given twice in one definition.
    #[error("constituent '{0}' appears more than once in the material definition")]
    DuplicateConstituent(String),

    /// Malformed JSON for a configuration or data definition.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A data file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
