use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the claims pipeline.
///
/// Only file decoding and configuration can fail; the transformation
/// pipeline itself (classification, partitioning, aggregation, filtering)
/// is total and resolves per-field anomalies to sentinels instead.
#[derive(Error, Debug)]
pub enum ClaimsError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input file extension is not a recognised tabular format.
    #[error("Unsupported file type \"{0}\". Please provide a CSV or XLSX file")]
    UnsupportedFormat(String),

    /// The CSV decoder rejected the file.
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// The spreadsheet decoder rejected the file.
    #[error("Spreadsheet parsing error: {0}")]
    Spreadsheet(String),

    /// The file decoded successfully but yielded zero data rows.
    #[error("The file is empty or could not be parsed into any records")]
    EmptyDataset,

    /// The ingestion worker failed before the full record set was delivered.
    #[error("Ingestion failed: {0}")]
    Ingest(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the claims crates.
pub type Result<T> = std::result::Result<T, ClaimsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = ClaimsError::FileRead {
            path: PathBuf::from("/some/claims.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/some/claims.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_unsupported_format() {
        let err = ClaimsError::UnsupportedFormat("pdf".to_string());
        let msg = err.to_string();
        assert!(msg.contains("pdf"));
        assert!(msg.contains("CSV or XLSX"));
    }

    #[test]
    fn test_error_display_empty_dataset_is_distinct() {
        let empty = ClaimsError::EmptyDataset.to_string();
        let spreadsheet = ClaimsError::Spreadsheet("bad zip header".to_string()).to_string();
        assert_eq!(empty, "The file is empty or could not be parsed into any records");
        assert_ne!(empty, spreadsheet);
    }

    #[test]
    fn test_error_display_ingest() {
        let err = ClaimsError::Ingest("worker channel closed".to_string());
        assert_eq!(err.to_string(), "Ingestion failed: worker channel closed");
    }

    #[test]
    fn test_error_display_config() {
        let err = ClaimsError::Config("unknown filter category".to_string());
        assert_eq!(err.to_string(), "Configuration error: unknown filter category");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ClaimsError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }
}
