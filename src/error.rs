//! Error types for key estimation and chord lookup

use thiserror::Error;

/// Errors that can occur during key estimation or chord lookup
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// The analysis window resolved to zero samples
    #[error("Empty analysis window: samples [{start}, {end})")]
    EmptyWindow {
        /// First sample index of the window
        start: usize,
        /// One past the last sample index of the window
        end: usize,
    },

    /// Chroma vector has zero variance, correlation is undefined
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    /// Key name outside the 24 major/minor keys
    #[error("Unknown key: {0}")]
    UnknownKey(String),

    /// Invalid input parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Audio decoding error
    #[error("Decoding error: {0}")]
    DecodingError(String),

    /// Sample rate conversion error
    #[error("Resample error: {0}")]
    ResampleError(String),
}
