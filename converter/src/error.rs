//! Error types for the conversion pipeline.
//!
//! This module defines one error type per stage:
//!
//! - [`CsvError`] - Reading and parsing the input CSV
//! - [`TransformError`] - Deriving output rows from input rows
//! - [`WriteError`] - Writing `progress.tsv` and `config.json`
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// CSV Parsing Errors
// =============================================================================

/// Errors while reading the input log.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to decode the file contents.
    #[error("Failed to decode content as {encoding}: {message}")]
    EncodingError { encoding: String, message: String },

    /// Invalid CSV format.
    #[error("Invalid CSV format: {0}")]
    ParseError(#[from] csv::Error),

    /// Delimiter that is not a single ASCII character.
    #[error("Delimiter '{0}' must be a single ASCII character")]
    InvalidDelimiter(char),

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

// =============================================================================
// Transformation Errors
// =============================================================================

/// Errors while deriving an output row.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A column used in arithmetic holds a non-numeric value.
    #[error("Row {row}: column '{column}' is not numeric (value '{value}')")]
    NotNumeric {
        row: usize,
        column: String,
        value: String,
    },

    /// `steps_per_task` resolved to zero, so the active task cannot be derived.
    #[error("Row {row}: steps_per_task is zero")]
    ZeroStepsPerTask { row: usize },
}

// =============================================================================
// Writer Errors
// =============================================================================

/// Errors while writing the output files.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Output directory could not be created.
    #[error("Cannot create output directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File could not be written.
    #[error("Cannot write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TSV serialization error.
    #[error("TSV error: {0}")]
    Tsv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// This is the error type returned by [`crate::transform::pipeline::convert`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// CSV parsing error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Transformation error.
    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    /// Output error.
    #[error("Write error: {0}")]
    Write(#[from] WriteError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for transformation operations.
pub type TransformResult<T> = Result<T, TransformError>;

/// Result type for writer operations.
pub type WriteResult<T> = Result<T, WriteError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // CsvError -> PipelineError
        let csv_err = CsvError::EmptyFile;
        let pipeline_err: PipelineError = csv_err.into();
        assert!(pipeline_err.to_string().contains("empty"));

        // TransformError -> PipelineError
        let transform_err = TransformError::ZeroStepsPerTask { row: 3 };
        let pipeline_err: PipelineError = transform_err.into();
        assert!(pipeline_err.to_string().contains("Row 3"));
    }

    #[test]
    fn test_not_numeric_format() {
        let err = TransformError::NotNumeric {
            row: 7,
            column: "0-hammer-v1/return".into(),
            value: "abc".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Row 7"));
        assert!(msg.contains("0-hammer-v1/return"));
        assert!(msg.contains("'abc'"));
    }

    #[test]
    fn test_write_error_names_path() {
        let err = WriteError::CreateDir {
            path: PathBuf::from("/nope/out"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/nope/out"));
    }
}
