//! Employer aggregation over a stream of LCA rows.
//!
//! [`IndexBuilder`] applies the year and visa filters, folds accepted rows
//! into one [`EmployerAggregate`] per normalized employer key, and finally
//! ranks each employer's job titles into an [`EmployerIndex`].

use std::cmp::Reverse;
use std::io::Read;

use indexmap::IndexMap;
use lca_core::error::Result;
use lca_core::models::{EmployerIndex, EmployerRecord, IndexConfig};
use lca_core::normalize::normalize_name;
use lca_core::year::extract_year;
use tracing::debug;

use crate::reader::{CsvRowReader, Row};

// ── TitleCounter ──────────────────────────────────────────────────────────────

/// Job-title frequency table that remembers first-seen order.
#[derive(Debug, Clone, Default)]
pub struct TitleCounter {
    counts: IndexMap<String, u64>,
}

impl TitleCounter {
    pub fn add(&mut self, title: &str) {
        match self.counts.get_mut(title) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(title.to_string(), 1);
            }
        }
    }

    pub fn count(&self, title: &str) -> u64 {
        self.counts.get(title).copied().unwrap_or(0)
    }

    /// Number of distinct titles seen.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Up to `n` titles, most frequent first; equal counts keep first-seen order.
    pub fn most_common(&self, n: usize) -> Vec<String> {
        let mut ranked: Vec<(&String, &u64)> = self.counts.iter().collect();
        // Stable sort: ties stay in insertion order.
        ranked.sort_by_key(|(_, count)| Reverse(**count));
        ranked
            .into_iter()
            .take(n)
            .map(|(title, _)| title.clone())
            .collect()
    }
}

// ── EmployerAggregate ─────────────────────────────────────────────────────────

/// Running state for one normalized employer key.
#[derive(Debug, Clone)]
pub struct EmployerAggregate {
    /// First raw employer string seen for the key, trimmed. Never overwritten.
    pub display_name: String,
    pub count: u64,
    pub titles: TitleCounter,
}

impl EmployerAggregate {
    fn new(display_name: &str) -> Self {
        Self {
            display_name: display_name.to_string(),
            count: 0,
            titles: TitleCounter::default(),
        }
    }
}

// ── Row outcomes ──────────────────────────────────────────────────────────────

/// Why a row did not contribute to the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingEmployer,
    /// Extracted year differs from the target, or no year could be extracted.
    YearMismatch,
    VisaMismatch,
    /// The employer normalized to an empty key (e.g. `"Inc."`).
    EmptyKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// Counted under the contained normalized key.
    Accepted(String),
    Skipped(SkipReason),
}

/// Row counters for one build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub rows_seen: u64,
    pub accepted: u64,
    pub missing_employer: u64,
    pub year_mismatch: u64,
    pub visa_mismatch: u64,
    pub empty_key: u64,
    /// Records the CSV reader could not decode.
    pub undecodable: u64,
}

impl BuildStats {
    pub fn skipped(&self) -> u64 {
        self.missing_employer + self.year_mismatch + self.visa_mismatch + self.empty_key
    }

    fn record(&mut self, outcome: &RowOutcome) {
        self.rows_seen += 1;
        match outcome {
            RowOutcome::Accepted(_) => self.accepted += 1,
            RowOutcome::Skipped(SkipReason::MissingEmployer) => self.missing_employer += 1,
            RowOutcome::Skipped(SkipReason::YearMismatch) => self.year_mismatch += 1,
            RowOutcome::Skipped(SkipReason::VisaMismatch) => self.visa_mismatch += 1,
            RowOutcome::Skipped(SkipReason::EmptyKey) => self.empty_key += 1,
        }
    }
}

// ── IndexBuilder ──────────────────────────────────────────────────────────────

/// Single-pass accumulator from rows to an [`EmployerIndex`].
///
/// A builder owns all aggregate state for one run; create a fresh one per
/// input.
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    config: IndexConfig,
    aggregates: IndexMap<String, EmployerAggregate>,
    stats: BuildStats,
}

impl IndexBuilder {
    pub fn new(config: IndexConfig) -> Self {
        Self {
            config,
            aggregates: IndexMap::new(),
            stats: BuildStats::default(),
        }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// Aggregate state for a normalized key, if any row was accepted for it.
    pub fn aggregate(&self, key: &str) -> Option<&EmployerAggregate> {
        self.aggregates.get(key)
    }

    /// Apply the filters to `row` and fold it in when it passes.
    pub fn push_row<R: Row + ?Sized>(&mut self, row: &R) -> RowOutcome {
        let outcome = self.accept(row);
        self.stats.record(&outcome);
        outcome
    }

    fn accept<R: Row + ?Sized>(&mut self, row: &R) -> RowOutcome {
        let employer = row.field(&self.config.employer_column).trim();
        if employer.is_empty() {
            return RowOutcome::Skipped(SkipReason::MissingEmployer);
        }

        if let Some(target) = self.config.target_year {
            let year = extract_year(row.field(self.config.year_source_column()));
            if year != Some(target) {
                return RowOutcome::Skipped(SkipReason::YearMismatch);
            }
        }

        if let Some(visa) = &self.config.visa {
            if !visa.matches(row.field(visa.column())) {
                return RowOutcome::Skipped(SkipReason::VisaMismatch);
            }
        }

        let key = normalize_name(employer);
        if key.is_empty() {
            return RowOutcome::Skipped(SkipReason::EmptyKey);
        }

        let aggregate = self
            .aggregates
            .entry(key.clone())
            .or_insert_with(|| EmployerAggregate::new(employer));
        aggregate.count += 1;

        let title = row.field(&self.config.title_column).trim();
        if !title.is_empty() {
            aggregate.titles.add(title);
        }

        RowOutcome::Accepted(key)
    }

    /// Count records the reader had to drop before they became rows.
    pub fn note_undecodable(&mut self, records: u64) {
        self.stats.undecodable += records;
    }

    /// Materialize the index. Keys appear in first-accepted order.
    pub fn finish(self) -> (EmployerIndex, BuildStats) {
        let mut index = EmployerIndex::new();
        for (key, aggregate) in self.aggregates {
            let roles = aggregate.titles.most_common(self.config.max_roles);
            index.insert(
                key,
                EmployerRecord {
                    company: aggregate.display_name,
                    year: self.config.target_year,
                    count: aggregate.count,
                    roles,
                },
            );
        }
        (index, self.stats)
    }
}

// ── Entry points ──────────────────────────────────────────────────────────────

/// Stream every row of `source` through a fresh [`IndexBuilder`].
pub fn build_index<R: Read>(
    source: &mut CsvRowReader<R>,
    config: &IndexConfig,
) -> Result<(EmployerIndex, BuildStats)> {
    let mut builder = IndexBuilder::new(config.clone());
    let read = source.for_each_row(|row| {
        builder.push_row(row);
    })?;
    builder.note_undecodable(read.undecodable);

    let (index, stats) = builder.finish();
    debug!(
        "Built index: {} rows seen, {} accepted, {} skipped, {} employers",
        stats.rows_seen,
        stats.accepted,
        stats.skipped(),
        index.len(),
    );
    Ok((index, stats))
}

/// Build from in-memory rows.
pub fn build_index_from_rows<I, R>(rows: I, config: &IndexConfig) -> (EmployerIndex, BuildStats)
where
    I: IntoIterator<Item = R>,
    R: Row,
{
    let mut builder = IndexBuilder::new(config.clone());
    for row in rows {
        builder.push_row(&row);
    }
    builder.finish()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
