//! Filing-year extraction from loosely formatted CSV cells.

use std::sync::OnceLock;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;

/// A value a year may be extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearInput<'a> {
    /// An already-numeric year, returned as is.
    Year(i32),
    /// Free text such as `"2023"`, `"05/14/2023"` or `"2023-05-14"`.
    Text(&'a str),
}

impl From<i32> for YearInput<'_> {
    fn from(year: i32) -> Self {
        YearInput::Year(year)
    }
}

impl<'a> From<&'a str> for YearInput<'a> {
    fn from(text: &'a str) -> Self {
        YearInput::Text(text)
    }
}

impl<'a> From<&'a String> for YearInput<'a> {
    fn from(text: &'a String) -> Self {
        YearInput::Text(text.as_str())
    }
}

/// First `19xx`/`20xx` run anywhere in a string.
fn embedded_year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:19|20)[0-9]{2}").expect("regex is valid"))
}

/// Extract a calendar year, returning `None` when nothing usable is found.
///
/// Rules are tried in order and the first hit wins:
/// * an integer input is returned unchanged;
/// * empty text yields `None`;
/// * text of exactly four ASCII digits is parsed directly;
/// * the first `1900`–`2099` substring anywhere in the text;
/// * an ISO-8601 date or date-time, whose year is returned.
pub fn extract_year<'a>(value: impl Into<YearInput<'a>>) -> Option<i32> {
    let text = match value.into() {
        YearInput::Year(year) => return Some(year),
        YearInput::Text(text) => text.trim(),
    };

    if text.is_empty() {
        return None;
    }

    if text.len() == 4 && text.bytes().all(|b| b.is_ascii_digit()) {
        return text.parse().ok();
    }

    if let Some(found) = embedded_year_re().find(text) {
        return found.as_str().parse().ok();
    }

    parse_iso_year(text)
}

/// Year component of an ISO-8601 date or date-time, if `text` is one.
fn parse_iso_year(text: &str) -> Option<i32> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.year());
    }

    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(naive.year());
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .map(|date| date.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_passthrough() {
        assert_eq!(extract_year(2022), Some(2022));
        assert_eq!(extract_year(1850), Some(1850));
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(extract_year(""), None);
        assert_eq!(extract_year("   "), None);
    }

    #[test]
    fn test_four_digit_text() {
        assert_eq!(extract_year("2023"), Some(2023));
        assert_eq!(extract_year(" 2021 "), Some(2021));
        assert_eq!(extract_year("1776"), Some(1776));
    }

    #[test]
    fn test_iso_date() {
        assert_eq!(extract_year("2023-05-14"), Some(2023));
        assert_eq!(extract_year("2023-05-14T08:30:00Z"), Some(2023));
    }

    #[test]
    fn test_us_style_date() {
        assert_eq!(extract_year("05/14/2023"), Some(2023));
        assert_eq!(extract_year("5/4/1999 10:00"), Some(1999));
    }

    #[test]
    fn test_first_embedded_year_wins() {
        assert_eq!(extract_year("FY2019 through 2021"), Some(2019));
        assert_eq!(extract_year("received 20230514"), Some(2023));
    }

    #[test]
    fn test_iso_date_outside_embedded_range() {
        assert_eq!(extract_year("1850-03-01"), Some(1850));
        assert_eq!(extract_year("1850-03-01 12:00:00"), Some(1850));
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(extract_year("not a date"), None);
        assert_eq!(extract_year("12/31/85"), None);
        assert_eq!(extract_year("N/A"), None);
    }

    #[test]
    fn test_from_owned_string() {
        let cell = String::from("2024-01-02");
        assert_eq!(extract_year(&cell), Some(2024));
    }
}
