//! Employer lookup against a built index.

use lca_core::models::{EmployerIndex, EmployerRecord};
use lca_core::normalize::normalize_name;

/// How a lookup key was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    /// The index key starts with the normalized query.
    Prefix,
}

/// An index entry matched by [`find_match`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmployerMatch<'a> {
    pub key: &'a str,
    pub record: &'a EmployerRecord,
    pub kind: MatchKind,
}

/// Resolve a free-text employer name against `index`.
///
/// The name is normalized first. An exact key wins; otherwise the first key
/// in index order that starts with the normalized name is returned. Names that
/// normalize to nothing never match.
pub fn find_match<'a>(index: &'a EmployerIndex, company: &str) -> Option<EmployerMatch<'a>> {
    let normalized = normalize_name(company);
    if normalized.is_empty() {
        return None;
    }

    if let Some((key, record)) = index.get_key_value(&normalized) {
        return Some(EmployerMatch {
            key,
            record,
            kind: MatchKind::Exact,
        });
    }

    index
        .iter()
        .find(|(key, _)| key.starts_with(normalized.as_str()))
        .map(|(key, record)| EmployerMatch {
            key,
            record,
            kind: MatchKind::Prefix,
        })
}
