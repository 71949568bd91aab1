//! Streaming CSV row source for LCA disclosure files.
//!
//! Rows are decoded one at a time into a reused [`StringRecord`] and exposed
//! through the [`Row`] trait, so the builder never sees the whole file at once.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use lca_core::error::{IndexError, Result};
use tracing::debug;

// ── Row ───────────────────────────────────────────────────────────────────────

/// Column-labelled access to one record.
///
/// A column that is absent from the header, or missing from a short record,
/// reads as the empty string.
pub trait Row {
    fn field(&self, column: &str) -> &str;
}

impl Row for HashMap<String, String> {
    fn field(&self, column: &str) -> &str {
        self.get(column).map(String::as_str).unwrap_or("")
    }
}

/// View of the current CSV record keyed by header name.
pub struct RecordRow<'a> {
    columns: &'a HashMap<String, usize>,
    record: &'a StringRecord,
}

impl Row for RecordRow<'_> {
    fn field(&self, column: &str) -> &str {
        self.columns
            .get(column)
            .and_then(|&idx| self.record.get(idx))
            .unwrap_or("")
    }
}

// ── ReadStats ─────────────────────────────────────────────────────────────────

/// Counters for one pass over a CSV stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadStats {
    /// Records handed to the row callback.
    pub records: u64,
    /// Records dropped because they could not be decoded (e.g. bad UTF-8).
    pub undecodable: u64,
}

// ── CsvRowReader ──────────────────────────────────────────────────────────────

/// Header-aware CSV reader yielding one [`Row`] at a time.
pub struct CsvRowReader<R> {
    reader: csv::Reader<R>,
    headers: Vec<String>,
    columns: HashMap<String, usize>,
    source: PathBuf,
}

impl CsvRowReader<File> {
    /// Open `path` and read its header line.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| IndexError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, path)
    }
}

impl<R: Read> CsvRowReader<R> {
    /// Wrap an arbitrary byte stream. `source` only labels errors.
    pub fn from_reader(inner: R, source: impl Into<PathBuf>) -> Result<Self> {
        let source = source.into();
        let mut reader = ReaderBuilder::new()
            .flexible(true) // Rows may be shorter or longer than the header
            .from_reader(inner);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| IndexError::CsvRead {
                path: source.clone(),
                source: e,
            })?
            .iter()
            .map(str::to_string)
            .collect();

        // Duplicate header names resolve to the last occurrence.
        let columns = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.clone(), idx))
            .collect();

        Ok(Self {
            reader,
            headers,
            columns,
            source,
        })
    }

    /// Header names in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Feed every decodable record to `f`, in file order.
    ///
    /// Records that fail to decode are skipped and counted. An I/O failure of
    /// the underlying stream aborts the pass.
    pub fn for_each_row<F>(&mut self, mut f: F) -> Result<ReadStats>
    where
        F: FnMut(&RecordRow<'_>),
    {
        let mut stats = ReadStats::default();
        let mut record = StringRecord::new();

        loop {
            match self.reader.read_record(&mut record) {
                Ok(false) => break,
                Ok(true) => {
                    stats.records += 1;
                    f(&RecordRow {
                        columns: &self.columns,
                        record: &record,
                    });
                }
                Err(e) if e.is_io_error() => {
                    return Err(IndexError::CsvRead {
                        path: self.source.clone(),
                        source: e,
                    });
                }
                Err(e) => {
                    stats.undecodable += 1;
                    debug!("Skipping undecodable record in {}: {}", self.source.display(), e);
                }
            }
        }

        debug!(
            "File {}: {} records, {} undecodable",
            self.source.display(),
            stats.records,
            stats.undecodable,
        );

        Ok(stats)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
