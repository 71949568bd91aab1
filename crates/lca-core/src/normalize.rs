//! Employer-name canonicalization.
//!
//! Free-text employer names in LCA filings vary in case, punctuation and legal
//! form ("Acme, Inc." / "ACME INC" / "Acme Corp."). [`normalize_name`] folds
//! them into a single key so that filings from the same employer aggregate
//! together.

use std::sync::OnceLock;

use regex::Regex;

/// Legal-entity suffixes dropped when they appear as a standalone word.
pub const LEGAL_SUFFIXES: &[&str] = &["LLC", "INC", "LTD", "CO", "CORP", "CORPORATION", "LIMITED"];

/// Anything that is not an uppercase ASCII letter or digit separates words.
fn separator_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Z0-9]+").expect("regex is valid"))
}

/// Returns `true` when `token` is one of [`LEGAL_SUFFIXES`].
pub fn is_legal_suffix(token: &str) -> bool {
    LEGAL_SUFFIXES.contains(&token)
}

/// Map a raw employer string to its canonical index key.
///
/// 1. Empty input yields an empty key.
/// 2. The string is uppercased.
/// 3. Legal suffixes are removed when they form a whole word, so `"CO"` goes
///    but `"COHOST"` and the `"CO"` inside `"ECO"` stay.
/// 4. Every character other than `A-Z`, `0-9` becomes a space.
/// 5. Whitespace runs collapse to one space and the ends are trimmed.
///
/// Word boundaries are runs of characters outside `A-Z0-9`, the same set that
/// step 4 turns into spaces. This keeps the function idempotent: a suffix can
/// never surface as a new standalone word on a second pass.
///
/// ```
/// use lca_core::normalize::normalize_name;
///
/// assert_eq!(normalize_name("Acme, Corp.!!"), "ACME");
/// assert_eq!(normalize_name("ECO SYSTEMS LLC"), "ECO SYSTEMS");
/// ```
pub fn normalize_name(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let upper = raw.to_uppercase();
    separator_re()
        .split(&upper)
        .filter(|word| !word.is_empty() && !is_legal_suffix(word))
        .collect::<Vec<_>>()
        .join(" ")
}
