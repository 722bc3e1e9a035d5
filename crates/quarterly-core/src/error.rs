//! Error types for ingestion and storage.
//!
//! [`IngestError`] covers everything that can stop an import run or a store
//! call. [`FileError`] is the narrower failure of a single source file; the
//! walker records it and keeps going, so it only becomes an [`IngestError`]
//! when a caller parses one file directly.
//!
//! Data-quality noise (unknown row labels, `LTM` columns, sentinel cells) is
//! not an error at all and never shows up here.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort an ingestion run or a store operation.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The root directory (or something beneath it) could not be walked.
    #[error("failed to walk directory {}: {source}", path.display())]
    RootUnreadable {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A single source file could not be parsed.
    #[error(transparent)]
    File(#[from] FileError),

    /// The storage collaborator rejected an operation.
    #[error("Store error: {0}")]
    Store(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The run was cancelled between two writes.
    #[error("import cancelled")]
    Cancelled,
}

/// Failure to turn one source file into records.
#[derive(Error, Debug)]
pub enum FileError {
    /// The file could not be opened or read.
    #[error("failed to open {}: {source}", path.display())]
    Open {
        /// Offending file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The delimiter-separated reader gave up on the file.
    #[error("failed to read CSV {}: {message}", path.display())]
    Csv {
        /// Offending file.
        path: PathBuf,
        /// Reader diagnostic.
        message: String,
    },

    /// The file has no header row or no data rows.
    #[error("insufficient rows in {}: {rows}", path.display())]
    InsufficientRows {
        /// Offending file.
        path: PathBuf,
        /// Number of rows actually read.
        rows: usize,
    },
}

impl FileError {
    /// Returns the path of the file that failed.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Open { path, .. }
            | Self::Csv { path, .. }
            | Self::InsufficientRows { path, .. } => path,
        }
    }
}

/// Result type alias using [`IngestError`].
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_error_names_path() {
        let err = FileError::InsufficientRows {
            path: PathBuf::from("data/ACME_Tech.csv"),
            rows: 1,
        };
        assert_eq!(err.path(), std::path::Path::new("data/ACME_Tech.csv"));
        assert_eq!(err.to_string(), "insufficient rows in data/ACME_Tech.csv: 1");
    }

    #[test]
    fn test_file_error_converts() {
        let err: IngestError = FileError::Csv {
            path: PathBuf::from("x.csv"),
            message: "bad".to_string(),
        }
        .into();
        assert!(matches!(err, IngestError::File(FileError::Csv { .. })));
        assert_eq!(err.to_string(), "failed to read CSV x.csv: bad");
    }
}
