//! Error type for loading inputs and writing projection output

use thiserror::Error;

/// Errors raised outside the projection loop itself.
///
/// The engine and assembler are infallible; only reading an input record,
/// normalizing its shape, and writing results can fail.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed input: section `{section}` {reason}")]
    MalformedInput {
        section: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
