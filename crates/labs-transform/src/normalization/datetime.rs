//! `Reported Date` parsing.
//!
//! Quest exports write report timestamps month-first (`01/15/2024 10:30`),
//! occasionally with seconds or a 12-hour clock. ISO-style values are accepted
//! too. The parsed value only orders repeated measurements; it never reaches
//! the output.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Parse a `Reported Date` value. Returns None when no known format matches.
pub fn parse_reported_date(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    try_parse_datetime(trimmed)
        .or_else(|| try_parse_date(trimmed).map(|d| d.and_time(NaiveTime::MIN)))
}

fn try_parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let formats = [
        "%m/%d/%Y %H:%M:%S", // US, Quest default
        "%m/%d/%Y %H:%M",
        "%m/%d/%Y %I:%M:%S %p",
        "%m/%d/%Y %I:%M %p",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
        "%Y/%m/%d %H:%M",
    ];

    for fmt in &formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }

    None
}

fn try_parse_date(value: &str) -> Option<NaiveDate> {
    let formats = ["%m/%d/%Y", "%Y-%m-%d", "%Y/%m/%d"];

    for fmt in &formats {
        if let Ok(d) = NaiveDate::parse_from_str(value, fmt) {
            return Some(d);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn parses_quest_formats() {
        assert_eq!(
            parse_reported_date("01/15/2024 10:30"),
            Some(at(2024, 1, 15, 10, 30, 0))
        );
        assert_eq!(
            parse_reported_date("01/15/2024 10:30:45"),
            Some(at(2024, 1, 15, 10, 30, 45))
        );
        assert_eq!(
            parse_reported_date("01/15/2024 02:05 PM"),
            Some(at(2024, 1, 15, 14, 5, 0))
        );
    }

    #[test]
    fn parses_iso_formats() {
        assert_eq!(
            parse_reported_date("2024-01-15 10:30:00"),
            Some(at(2024, 1, 15, 10, 30, 0))
        );
        assert_eq!(
            parse_reported_date("2024-01-15T10:30"),
            Some(at(2024, 1, 15, 10, 30, 0))
        );
    }

    #[test]
    fn date_only_is_midnight() {
        assert_eq!(
            parse_reported_date("01/15/2024"),
            Some(at(2024, 1, 15, 0, 0, 0))
        );
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(parse_reported_date(""), None);
        assert_eq!(parse_reported_date("pending"), None);
        assert_eq!(parse_reported_date("13/45/2024 10:30"), None);
    }
}
