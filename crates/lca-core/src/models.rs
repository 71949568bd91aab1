use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::time_utils::current_year;

pub const DEFAULT_EMPLOYER_COLUMN: &str = "EMPLOYER_NAME";
pub const DEFAULT_TITLE_COLUMN: &str = "JOB_TITLE";
pub const DEFAULT_DATE_COLUMN: &str = "CASE_SUBMITTED";
pub const DEFAULT_VISA_COLUMN: &str = "VISA_CLASS";
pub const DEFAULT_VISA_CLASS: &str = "H-1B";
pub const DEFAULT_MAX_ROLES: usize = 5;

// ── VisaFilter ────────────────────────────────────────────────────────────────

/// Keeps only rows whose visa column equals a given class.
///
/// Comparison trims the cell and ignores case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisaFilter {
    column: String,
    class: String,
}

impl VisaFilter {
    /// Build a filter, or `None` when either the column or the class is empty
    /// (an empty value disables visa filtering).
    pub fn new(column: impl Into<String>, class: impl Into<String>) -> Option<Self> {
        let column = column.into();
        let class = class.into();
        if column.is_empty() || class.is_empty() {
            return None;
        }
        Some(Self {
            column,
            class: class.to_uppercase(),
        })
    }

    /// Column holding the visa class.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Uppercased class rows must carry.
    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn matches(&self, value: &str) -> bool {
        value.trim().to_uppercase() == self.class
    }
}

// ── IndexConfig ───────────────────────────────────────────────────────────────

/// Parameters of one index build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexConfig {
    /// Year rows must match; `None` disables year filtering.
    pub target_year: Option<i32>,
    pub employer_column: String,
    pub title_column: String,
    /// Column whose date text the year is extracted from.
    pub date_column: String,
    /// Explicit year column, preferred over `date_column` when set.
    pub year_column: Option<String>,
    pub visa: Option<VisaFilter>,
    /// Upper bound on ranked job titles kept per employer.
    pub max_roles: usize,
}

impl IndexConfig {
    /// Column consulted for the year filter.
    pub fn year_source_column(&self) -> &str {
        self.year_column.as_deref().unwrap_or(self.date_column.as_str())
    }

    /// Columns the build reads, for header diagnostics.
    pub fn referenced_columns(&self) -> Vec<&str> {
        let mut columns = vec![self.employer_column.as_str(), self.title_column.as_str()];
        if self.target_year.is_some() {
            columns.push(self.year_source_column());
        }
        if let Some(visa) = &self.visa {
            columns.push(visa.column());
        }
        columns
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            target_year: Some(current_year()),
            employer_column: DEFAULT_EMPLOYER_COLUMN.to_string(),
            title_column: DEFAULT_TITLE_COLUMN.to_string(),
            date_column: DEFAULT_DATE_COLUMN.to_string(),
            year_column: None,
            visa: VisaFilter::new(DEFAULT_VISA_COLUMN, DEFAULT_VISA_CLASS),
            max_roles: DEFAULT_MAX_ROLES,
        }
    }
}

// ── EmployerRecord ────────────────────────────────────────────────────────────

/// Finalized per-employer entry of the index artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerRecord {
    /// First employer string seen for the key, trimmed.
    pub company: String,
    /// Year filter the index was built with, `null` when unfiltered.
    pub year: Option<i32>,
    /// Accepted filings for the employer.
    pub count: u64,
    /// Most frequent job titles, most common first.
    #[serde(default)]
    pub roles: Vec<String>,
}

// ── EmployerIndex ─────────────────────────────────────────────────────────────

/// Mapping from normalized employer key to its record.
///
/// Keys keep the order they were inserted in, which for a built index is the
/// order employers were first accepted from the row stream. Serializes as a
/// single JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployerIndex {
    entries: IndexMap<String, EmployerRecord>,
}

impl EmployerIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `record` under `key`, replacing any existing record in place.
    pub fn insert(&mut self, key: impl Into<String>, record: EmployerRecord) {
        self.entries.insert(key.into(), record);
    }

    pub fn get(&self, key: &str) -> Option<&EmployerRecord> {
        self.entries.get(key)
    }

    /// Stored key and record for `key`.
    pub fn get_key_value(&self, key: &str) -> Option<(&str, &EmployerRecord)> {
        self.entries
            .get_key_value(key)
            .map(|(k, r)| (k.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EmployerRecord)> {
        self.entries.iter().map(|(k, r)| (k.as_str(), r))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl FromIterator<(String, EmployerRecord)> for EmployerIndex {
    fn from_iter<I: IntoIterator<Item = (String, EmployerRecord)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(company: &str, count: u64) -> EmployerRecord {
        EmployerRecord {
            company: company.to_string(),
            year: Some(2023),
            count,
            roles: vec![],
        }
    }

    #[test]
    fn test_visa_filter_disabled_by_empty_values() {
        assert!(VisaFilter::new("", "H-1B").is_none());
        assert!(VisaFilter::new("VISA_CLASS", "").is_none());
        assert!(VisaFilter::new("VISA_CLASS", "H-1B").is_some());
    }

    #[test]
    fn test_visa_filter_matches_trimmed_case_insensitive() {
        let filter = VisaFilter::new("VISA_CLASS", "h-1b").unwrap();
        assert_eq!(filter.class(), "H-1B");
        assert!(filter.matches("H-1B"));
        assert!(filter.matches("  h-1b "));
        assert!(!filter.matches("H-1B1"));
        assert!(!filter.matches("L-1"));
        assert!(!filter.matches(""));
    }

    #[test]
    fn test_year_column_takes_precedence() {
        let mut config = IndexConfig::default();
        assert_eq!(config.year_source_column(), DEFAULT_DATE_COLUMN);
        config.year_column = Some("FISCAL_YEAR".to_string());
        assert_eq!(config.year_source_column(), "FISCAL_YEAR");
    }

    #[test]
    fn test_default_config() {
        let config = IndexConfig::default();
        assert_eq!(config.target_year, Some(current_year()));
        assert_eq!(config.employer_column, "EMPLOYER_NAME");
        assert_eq!(config.title_column, "JOB_TITLE");
        assert_eq!(config.visa.as_ref().map(|v| v.column()), Some("VISA_CLASS"));
        assert_eq!(config.max_roles, 5);
    }

    #[test]
    fn test_referenced_columns_follow_filters() {
        let config = IndexConfig {
            target_year: None,
            visa: None,
            ..IndexConfig::default()
        };
        assert_eq!(config.referenced_columns(), vec!["EMPLOYER_NAME", "JOB_TITLE"]);

        let config = IndexConfig::default();
        assert_eq!(
            config.referenced_columns(),
            vec!["EMPLOYER_NAME", "JOB_TITLE", "CASE_SUBMITTED", "VISA_CLASS"]
        );
    }

    #[test]
    fn test_index_preserves_insertion_order() {
        let mut index = EmployerIndex::new();
        index.insert("ZETA", record("Zeta", 1));
        index.insert("ALPHA", record("Alpha", 2));
        index.insert("MID", record("Mid", 3));

        let keys: Vec<&str> = index.keys().collect();
        assert_eq!(keys, vec!["ZETA", "ALPHA", "MID"]);
        assert_eq!(index.get("ALPHA").unwrap().count, 2);
        assert!(index.get("BETA").is_none());
    }

    #[test]
    fn test_index_insert_replaces_in_place() {
        let mut index = EmployerIndex::new();
        index.insert("A", record("A", 1));
        index.insert("B", record("B", 1));
        index.insert("A", record("A2", 9));

        assert_eq!(index.len(), 2);
        let first = index.iter().next().unwrap();
        assert_eq!(first.0, "A");
        assert_eq!(first.1.company, "A2");
    }

    #[test]
    fn test_index_json_shape_and_order() {
        let mut index = EmployerIndex::new();
        index.insert("ZETA", record("Zeta Inc", 2));
        index.insert(
            "ALPHA",
            EmployerRecord {
                company: "Alpha".to_string(),
                year: None,
                count: 1,
                roles: vec!["Engineer".to_string()],
            },
        );

        let json = serde_json::to_string(&index).unwrap();
        assert_eq!(
            json,
            r#"{"ZETA":{"company":"Zeta Inc","year":2023,"count":2,"roles":[]},"ALPHA":{"company":"Alpha","year":null,"count":1,"roles":["Engineer"]}}"#
        );

        let parsed: EmployerIndex = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, index);
        let keys: Vec<&str> = parsed.keys().collect();
        assert_eq!(keys, vec!["ZETA", "ALPHA"]);
    }

    #[test]
    fn test_index_get_key_value_and_collect() {
        let index: EmployerIndex = vec![
            ("B".to_string(), record("B", 1)),
            ("A".to_string(), record("A", 2)),
        ]
        .into_iter()
        .collect();

        let (key, rec) = index.get_key_value("A").unwrap();
        assert_eq!(key, "A");
        assert_eq!(rec.count, 2);
        assert!(index.get_key_value("C").is_none());
        assert_eq!(index.keys().collect::<Vec<_>>(), vec!["B", "A"]);
    }

    #[test]
    fn test_index_rejects_non_object() {
        assert!(serde_json::from_str::<EmployerIndex>("[1, 2]").is_err());
    }
}
