use thiserror::Error;

/// Failures at the edges of the engine: reading files, decoding uploads,
/// naming an assay that does not exist. Missing calibration and unparseable
/// readings are never errors; they degrade to `N/A` / zero / null instead.
#[derive(Debug, Error)]
pub enum AssayLabError {
    #[error("Unknown assay type '{0}'")]
    UnknownAssay(String),

    #[error("Unknown HPLC analysis type '{0}'")]
    UnknownHplcAnalysis(String),

    #[error("'{0}' needs a header row and at least one data row")]
    MissingHeader(String),

    #[error("No valid sample rows could be read from '{0}'; check the header and delimiter")]
    NoRows(String),

    #[error("Sample '{0}' not found")]
    SampleNotFound(String),

    #[error("Invalid sample: {0}")]
    InvalidSample(String),

    #[error("I/O error for file '{0}': {1}")]
    FileIO(String, #[source] std::io::Error),

    #[error("Failed to parse JSON from '{0}': {1}")]
    JsonParsing(String, #[source] serde_json::Error),

    #[error("Failed to process CSV '{0}': {1}")]
    CsvError(String, #[source] csv::Error),
}
