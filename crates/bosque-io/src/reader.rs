//! Delimited-text reader producing a tagged-column [`Dataset`].

use std::path::{Path, PathBuf};

use bosque_tree::Dataset;
use tracing::{debug, info, instrument};

use crate::IoError;

/// Reads a labeled table from a delimited text file.
///
/// Expected format:
/// - Header row required; every column names an attribute
/// - One of the columns is the class label, chosen at read time
/// - All rows must have the same number of columns as the header
///
/// Cells are trimmed. Columns whose every cell parses as a finite number
/// become numeric attributes; all others are categorical.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed record |
/// | [`IoError::MissingLabel`] | Label column absent from the header |
/// | [`IoError::EmptyDataset`] | Zero data rows after header |
/// | [`IoError::InconsistentRowLength`] | Row has different column count than header |
/// | [`IoError::Dataset`] | Records cannot form a dataset (e.g. duplicate columns) |
pub struct DelimitedReader {
    path: PathBuf,
    separator: u8,
}

impl DelimitedReader {
    /// Create a new reader for the given file path, separated by commas.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            separator: b',',
        }
    }

    /// Set the field separator byte.
    #[must_use]
    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    /// Read and validate the file, returning a [`Dataset`] labeled by `label`.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self, label: &str) -> Result<Dataset, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) lets the row-length check below report the offending row.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.separator)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(file);

        let header: Vec<String> = rdr
            .headers()
            .map_err(|e| IoError::CsvParse {
                path: self.path.clone(),
                offset: e.position().map_or(0, |p| p.byte()),
                source: e,
            })?
            .iter()
            .map(str::to_string)
            .collect();
        let expected_cols = header.len();
        debug!(expected_cols, "read header");

        if !header.iter().any(|name| name == label) {
            return Err(IoError::MissingLabel {
                path: self.path.clone(),
                label: label.to_string(),
            });
        }

        let mut records = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| IoError::CsvParse {
                path: self.path.clone(),
                offset: e.position().map_or(0, |p| p.byte()),
                source: e,
            })?;

            if record.len() != expected_cols {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: expected_cols,
                    got: record.len(),
                });
            }

            records.push(record.iter().map(str::to_string).collect());
        }

        if records.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        let dataset =
            Dataset::from_records(header, records, label).map_err(|e| IoError::Dataset {
                path: self.path.clone(),
                source: e,
            })?;

        info!(
            n_rows = dataset.n_rows(),
            n_attributes = dataset.n_attributes(),
            n_classes = dataset.n_classes(),
            "dataset loaded"
        );
        Ok(dataset)
    }
}
