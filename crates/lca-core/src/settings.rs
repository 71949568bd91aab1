use clap::Parser;
use std::path::PathBuf;

use crate::models::{
    IndexConfig, VisaFilter, DEFAULT_DATE_COLUMN, DEFAULT_EMPLOYER_COLUMN, DEFAULT_MAX_ROLES,
    DEFAULT_TITLE_COLUMN, DEFAULT_VISA_CLASS, DEFAULT_VISA_COLUMN,
};
use crate::time_utils::current_year;

// ── Settings (index build CLI) ────────────────────────────────────────────────

/// Build a compact H-1B employer index from DOL LCA CSV data
#[derive(Parser, Debug, Clone)]
#[command(
    name = "lca-index",
    about = "Build a compact H-1B employer index from DOL LCA CSV data",
    version
)]
pub struct Settings {
    /// Path to the DOL LCA CSV file
    pub input_csv: PathBuf,

    /// Path to the output JSON file
    pub output_json: PathBuf,

    /// Year to filter by (default: current year). Use 0 to disable
    #[arg(long, default_value_t = current_year())]
    pub target_year: i32,

    /// CSV column for employer name
    #[arg(long, default_value = DEFAULT_EMPLOYER_COLUMN)]
    pub employer_column: String,

    /// CSV column for job title
    #[arg(long, default_value = DEFAULT_TITLE_COLUMN)]
    pub title_column: String,

    /// CSV column with a date string
    #[arg(long, default_value = DEFAULT_DATE_COLUMN)]
    pub date_column: String,

    /// CSV column with a year (optional, overrides date-column)
    #[arg(long, default_value = "")]
    pub year_column: String,

    /// CSV column for visa class
    #[arg(long, default_value = DEFAULT_VISA_COLUMN)]
    pub visa_column: String,

    /// Visa class filter
    #[arg(long, default_value = DEFAULT_VISA_CLASS)]
    pub visa_class: String,

    /// Max roles to include per employer
    #[arg(long, default_value_t = DEFAULT_MAX_ROLES)]
    pub max_roles: usize,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,
}

impl Settings {
    /// Translate CLI values into the library's build parameters.
    ///
    /// A target year of `0` and empty column/class strings mean "unset".
    pub fn index_config(&self) -> IndexConfig {
        IndexConfig {
            target_year: (self.target_year != 0).then_some(self.target_year),
            employer_column: self.employer_column.clone(),
            title_column: self.title_column.clone(),
            date_column: self.date_column.clone(),
            year_column: (!self.year_column.is_empty()).then(|| self.year_column.clone()),
            visa: VisaFilter::new(self.visa_column.as_str(), self.visa_class.as_str()),
            max_roles: self.max_roles,
        }
    }
}

// ── LookupSettings ────────────────────────────────────────────────────────────

/// Look up an employer in a previously built index
#[derive(Parser, Debug, Clone)]
#[command(
    name = "lca-lookup",
    about = "Look up an employer in a previously built index",
    version
)]
pub struct LookupSettings {
    /// Path to the index JSON file
    pub index_json: PathBuf,

    /// Employer name as it appears on a job posting
    pub company: String,

    /// Logging level
    #[arg(long, default_value = "WARNING", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,
}
