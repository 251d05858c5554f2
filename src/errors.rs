/*!
 * Error types for the capsync engine.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 *
 * Most malformed input is degraded in place by the engine and never surfaces
 * here. Only conditions that make a job impossible to composite are errors.
 */

use thiserror::Error;

/// Errors that abort a single compositing job
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompositionError {
    /// The alignment stream is empty or every word has zero duration
    #[error("No timing data: alignment stream is empty or has no positive-duration words")]
    NoTimingData,

    /// The background source has no usable footage
    #[error("Source video has zero duration: {path}")]
    EmptySourceVideo {
        /// Path or handle of the offending source
        path: String,
    },

    /// Frame or source dimensions cannot be cropped or laid out
    #[error("Invalid frame size: {width}x{height}")]
    InvalidFrame {
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
    },

    /// Requested output duration is not a positive finite number
    #[error("Invalid output duration: {0}")]
    InvalidDuration(f64),

    /// No background footage was supplied for the job
    #[error("No background source available")]
    NoBackgroundSource,
}

/// Errors from the external media probe (ffprobe)
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The probe command could not run or exited with failure
    #[error("Probe command failed: {0}")]
    CommandFailed(String),

    /// The probe output could not be parsed
    #[error("Failed to parse probe output: {0}")]
    ParseError(String),

    /// The probed file lacks the expected stream
    #[error("No {0} stream found")]
    MissingStream(&'static str),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the compositing engine
    #[error("Composition error: {0}")]
    Composition(#[from] CompositionError),

    /// Error from the media probe
    #[error("Probe error: {0}")]
    Probe(#[from] ProbeError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
