//! Error types for the ingestion and feature pipeline
//!
//! Malformed content inside a message (bad charsets, undecodable parts, broken
//! dates, missing headers) is recovered where it occurs and never shows up
//! here. What remains are failures around the messages: reading inputs,
//! decoding record lines, and writing output.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a pipeline run
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Reading or writing a file failed
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A line in a records file is not a valid record
    #[error("Malformed record at {path}:{line}: {source}")]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },

    /// A record or feature set could not be serialized
    #[error("Failed to serialize output line: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Input discovery produced nothing to process
    #[error("No input files found")]
    NoInputs,

    /// Configuration file could not be used
    #[error("Invalid configuration in '{path}': {details}")]
    Config { path: PathBuf, details: String },
}

impl PipelineError {
    /// Attach a path to an `io::Error`
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
