use chrono::{Datelike, Local};

/// Calendar year of the local wall clock.
///
/// Used as the default year filter so an unattended run always indexes the
/// current year's filings.
pub fn current_year() -> i32 {
    Local::now().year()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_year_is_plausible() {
        let year = current_year();
        assert!((2024..=2200).contains(&year), "year {year} out of range");
    }
}
