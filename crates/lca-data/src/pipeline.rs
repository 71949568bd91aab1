//! End-to-end index build: CSV in, JSON artifact out.

use std::path::{Path, PathBuf};

use lca_core::error::Result;
use lca_core::models::{EmployerIndex, IndexConfig};
use tracing::{info, warn};

use crate::builder::{build_index, BuildStats};
use crate::reader::CsvRowReader;
use crate::writer::write_index;

/// Summary of one [`run_build`] call.
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Employers written to the artifact.
    pub employers: usize,
    pub stats: BuildStats,
    pub output: PathBuf,
    /// Wall-clock seconds spent scanning the CSV.
    pub scan_time_seconds: f64,
}

/// Build the index for `input` without writing it anywhere.
///
/// Configured columns that are absent from the header are reported once; the
/// build still runs and simply treats them as empty.
pub fn build_from_path(input: &Path, config: &IndexConfig) -> Result<(EmployerIndex, BuildStats)> {
    let mut source = CsvRowReader::open(input)?;

    for column in config.referenced_columns() {
        if !source.has_column(column) {
            warn!("Column \"{}\" not found in {}", column, input.display());
        }
    }

    build_index(&mut source, config)
}

/// Run the full pipeline.
///
/// 1. Stream `input` through the builder.
/// 2. Write the artifact to `output`.
/// 3. Return a [`BuildReport`].
pub fn run_build(input: &Path, output: &Path, config: &IndexConfig) -> Result<BuildReport> {
    match config.target_year {
        Some(year) => info!("Indexing {} for year {}", input.display(), year),
        None => info!("Indexing {} across all years", input.display()),
    }

    // ── Step 1: Scan ──────────────────────────────────────────────────────────
    let scan_start = std::time::Instant::now();
    let (index, stats) = build_from_path(input, config)?;
    let scan_time = scan_start.elapsed().as_secs_f64();

    info!(
        "Scanned {} rows in {:.2}s: {} accepted, {} skipped ({} missing employer, {} year, {} visa, {} empty name), {} undecodable",
        stats.rows_seen,
        scan_time,
        stats.accepted,
        stats.skipped(),
        stats.missing_employer,
        stats.year_mismatch,
        stats.visa_mismatch,
        stats.empty_key,
        stats.undecodable,
    );

    // ── Step 2: Write ─────────────────────────────────────────────────────────
    write_index(&index, output)?;

    Ok(BuildReport {
        employers: index.len(),
        stats,
        output: output.to_path_buf(),
        scan_time_seconds: scan_time,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
