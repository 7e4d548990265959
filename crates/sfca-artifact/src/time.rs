//! Time parsing helpers
//!
//! Timestamps are naive: the canonical month is a date key, not an instant.

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime};

/// The seven canonical weekday labels, Monday first
pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %I:%M:%S %p",
    "%Y/%m/%d %I:%M %p",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parse a full event timestamp; `None` if no known format matches
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parse a month key, truncated to the first day of its month
///
/// Accepts `YYYY-MM`, `YYYY/MM`, and anything [`parse_timestamp`] accepts.
#[must_use]
pub fn parse_month(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let mut parts = text.split(['-', '/']);
    if let (Some(y), Some(m), None) = (parts.next(), parts.next(), parts.next()) {
        let year: i32 = y.parse().ok()?;
        let month: u32 = m.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, 1);
    }
    parse_timestamp(text).map(|t| month_start(t.date()))
}

/// First day of the month containing `date`
#[inline]
#[must_use]
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// First day of the month after the one containing `date`
#[inline]
#[must_use]
pub fn next_month(date: NaiveDate) -> Option<NaiveDate> {
    month_start(date).checked_add_months(Months::new(1))
}

/// Map a weekday name or three-letter abbreviation to its canonical label
#[must_use]
pub fn canonical_weekday(text: &str) -> Option<&'static str> {
    let lower = text.trim().to_ascii_lowercase();
    if lower.len() < 3 {
        return None;
    }
    WEEKDAYS.iter().copied().find(|day| {
        let day_lower = day.to_ascii_lowercase();
        lower == day_lower || (lower.len() == 3 && day_lower.starts_with(&lower))
    })
}

/// Whether `label` is exactly one of [`WEEKDAYS`]
#[inline]
#[must_use]
pub fn is_canonical_weekday(label: &str) -> bool {
    WEEKDAYS.contains(&label)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn timestamps_in_common_layouts() {
        let expected = date(2024, 3, 5).and_hms_opt(14, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-03-05 14:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-05T14:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-05 14:30"), Some(expected));
        assert_eq!(parse_timestamp("2024/03/05 02:30:00 PM"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-05T14:30:00+00:00"), Some(expected));
        assert!(parse_timestamp("2024-03-05 14:30:00.250").is_some());
    }

    #[test]
    fn date_only_is_midnight() {
        assert_eq!(
            parse_timestamp("2024-03-05"),
            date(2024, 3, 5).and_hms_opt(0, 0, 0)
        );
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_month("2024-13"), None);
        assert_eq!(parse_month("soon"), None);
    }

    #[test]
    fn months_truncate_to_first() {
        assert_eq!(parse_month("2024-01"), Some(date(2024, 1, 1)));
        assert_eq!(parse_month("2024/07"), Some(date(2024, 7, 1)));
        assert_eq!(parse_month("2024-01-17"), Some(date(2024, 1, 1)));
        assert_eq!(parse_month("2024-01-17 23:59:59"), Some(date(2024, 1, 1)));
    }

    #[test]
    fn next_month_rolls_year() {
        assert_eq!(next_month(date(2025, 12, 9)), Some(date(2026, 1, 1)));
        assert_eq!(next_month(date(2024, 1, 31)), Some(date(2024, 2, 1)));
    }

    #[test]
    fn weekday_canonicalization() {
        assert_eq!(canonical_weekday("monday"), Some("Monday"));
        assert_eq!(canonical_weekday(" SAT "), Some("Saturday"));
        assert_eq!(canonical_weekday("Thursday"), Some("Thursday"));
        assert_eq!(canonical_weekday("Thurs"), None);
        assert_eq!(canonical_weekday("Mo"), None);
        assert_eq!(canonical_weekday("Funday"), None);
        assert!(is_canonical_weekday("Sunday"));
        assert!(!is_canonical_weekday("sunday"));
    }
}
