//! I/O error types for bosque-io.

use std::path::PathBuf;

use bosque_tree::TreeError;

/// Errors from file I/O, delimited-text parsing, and result serialization.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the input file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the file contains a header but zero data rows.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the input file.
        path: PathBuf,
    },

    /// Returned when a data row has a different number of columns than the header.
    #[error("row {row_index} of {path} has {got} columns, expected {expected}")]
    InconsistentRowLength {
        /// Path to the input file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Expected number of columns (from header).
        expected: usize,
        /// Actual number of columns in this row.
        got: usize,
    },

    /// Returned when the requested label column is absent from the header.
    #[error("label column \"{label}\" not found in {path}")]
    MissingLabel {
        /// Path to the input file.
        path: PathBuf,
        /// The requested label column.
        label: String,
    },

    /// Returned when the parsed records cannot form a dataset.
    #[error("invalid dataset in {path}")]
    Dataset {
        /// Path to the input file.
        path: PathBuf,
        /// Underlying dataset error.
        source: TreeError,
    },

    /// Returned when the experiment name contains characters outside `[a-zA-Z0-9_-]`.
    #[error("invalid experiment name \"{name}\": must match [a-zA-Z0-9_-]+")]
    InvalidExperimentName {
        /// The invalid name.
        name: String,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a result artifact cannot be serialized.
    #[error("cannot serialize {path}")]
    Serialize {
        /// Path the artifact was destined for.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Returned when a result file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
