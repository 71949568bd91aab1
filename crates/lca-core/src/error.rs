use std::path::PathBuf;
use thiserror::Error;

/// All errors produced while building or querying an employer index.
///
/// Row-level data problems never show up here: they are recovered by
/// skipping the row. Only conditions that abort a run are represented.
#[derive(Error, Debug)]
pub enum IndexError {
    /// The input file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The output artifact could not be created or written.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV stream failed: unreadable bytes or an undecodable header.
    #[error("Failed to read CSV {path}: {source}")]
    CsvRead {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A JSON document could not be encoded or parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the index crates.
pub type Result<T> = std::result::Result<T, IndexError>;
