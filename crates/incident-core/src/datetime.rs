//! Date and time formatting used in prompts and on the report form

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use std::fmt;

use crate::error::SubmissionError;

/// English ordinal suffix for a day of the month ("st", "nd", "rd", "th")
pub fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// Format a date as "Tuesday, March 4th, 2025"
pub fn format_report_date(date: NaiveDate) -> String {
    format!(
        "{}, {} {}{}, {}",
        date.format("%A"),
        date.format("%B"),
        date.day(),
        ordinal_suffix(date.day()),
        date.year()
    )
}

/// Incident time as entered on the form (24-hour "HH:MM")
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncidentTime(NaiveTime);

impl IncidentTime {
    pub fn parse(input: &str) -> Result<Self, SubmissionError> {
        NaiveTime::parse_from_str(input.trim(), "%H:%M")
            .map(Self)
            .map_err(|_| SubmissionError::InvalidTime(input.to_string()))
    }

    /// 12-hour clock with AM/PM, e.g. "2:05 PM"
    pub fn to_12_hour(&self) -> String {
        let (is_pm, hour) = self.0.hour12();
        format!(
            "{}:{:02} {}",
            hour,
            self.0.minute(),
            if is_pm { "PM" } else { "AM" }
        )
    }
}

impl fmt::Display for IncidentTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_12_hour())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinal_suffixes() {
        let cases = [
            (1, "st"),
            (2, "nd"),
            (3, "rd"),
            (4, "th"),
            (11, "th"),
            (12, "th"),
            (13, "th"),
            (21, "st"),
            (22, "nd"),
            (23, "rd"),
            (30, "th"),
            (31, "st"),
        ];
        for (day, suffix) in cases {
            assert_eq!(ordinal_suffix(day), suffix, "day {}", day);
        }
    }

    #[test]
    fn test_format_report_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        assert_eq!(format_report_date(date), "Tuesday, March 4th, 2025");

        let date = NaiveDate::from_ymd_opt(2024, 12, 22).unwrap();
        assert_eq!(format_report_date(date), "Sunday, December 22nd, 2024");
    }

    #[test]
    fn test_twelve_hour_conversion() {
        assert_eq!(IncidentTime::parse("00:15").unwrap().to_12_hour(), "12:15 AM");
        assert_eq!(IncidentTime::parse("09:05").unwrap().to_12_hour(), "9:05 AM");
        assert_eq!(IncidentTime::parse("12:00").unwrap().to_12_hour(), "12:00 PM");
        assert_eq!(IncidentTime::parse("14:30").unwrap().to_12_hour(), "2:30 PM");
        assert_eq!(IncidentTime::parse("23:59").unwrap().to_12_hour(), "11:59 PM");
    }

    #[test]
    fn test_invalid_times_rejected() {
        for input in ["", "25:00", "12:60", "noon", "2:30 PM"] {
            assert_eq!(
                IncidentTime::parse(input),
                Err(SubmissionError::InvalidTime(input.to_string()))
            );
        }
    }
}
