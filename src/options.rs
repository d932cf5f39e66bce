use chrono::{NaiveDate, NaiveTime, Timelike};
use thiserror::Error;

use crate::aggregate::RangeFilter;
use crate::stats::TimeRange;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    #[error("Invalid top value '{0}' (expected a number or 'all')")]
    InvalidTop(String),

    #[error("Invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Invalid time '{0}' (expected HH:MM)")]
    InvalidTime(String),

    #[error("Range start {start} is after range end {end}")]
    InvertedRange { start: String, end: String },
}

/// Parse a "top N" field. Empty or `all` (any case) means no cap.
pub fn parse_top_value(value: &str) -> Result<Option<usize>, OptionsError> {
    let value = value.trim().to_lowercase();
    if value.is_empty() || value == "all" {
        return Ok(None);
    }

    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(OptionsError::InvalidTop(value));
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| OptionsError::InvalidTop(value))
}

pub fn parse_date(value: &str) -> Result<NaiveDate, OptionsError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| OptionsError::InvalidDate(value.to_string()))
}

pub fn parse_time(value: &str) -> Result<NaiveTime, OptionsError> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT)
        .map_err(|_| OptionsError::InvalidTime(value.to_string()))
}

/// Per-section caps applied when rendering a result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewOptions {
    pub top_addresses: Option<usize>,
    pub top_domains: Option<usize>,
    pub top_categories: Option<usize>,
}

impl ViewOptions {
    pub fn parse(addresses: &str, domains: &str, categories: &str) -> Result<Self, OptionsError> {
        Ok(Self {
            top_addresses: parse_top_value(addresses)?,
            top_domains: parse_top_value(domains)?,
            top_categories: parse_top_value(categories)?,
        })
    }
}

/// Date/time window as a user enters it, at minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeInput {
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_date: NaiveDate,
    pub end_time: NaiveTime,
}

impl RangeInput {
    /// Whole days spanning `extent`, from 00:00 on the first day to 23:59 on
    /// the last.
    pub fn covering(extent: &TimeRange) -> Self {
        Self::whole_days(extent.min.date_naive(), extent.max.date_naive())
    }

    /// From 00:00 on `first` to 23:59 on `last`.
    pub fn whole_days(first: NaiveDate, last: NaiveDate) -> Self {
        Self {
            start_date: first,
            start_time: NaiveTime::MIN,
            end_date: last,
            end_time: NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN),
        }
    }

    /// Convert to UTC bounds. The end bound covers its whole minute.
    pub fn to_filter(&self) -> Result<RangeFilter, OptionsError> {
        let start = self.start_date.and_time(self.start_time).and_utc();
        let end_time = self.end_time.with_second(59).unwrap_or(self.end_time);
        let end = self.end_date.and_time(end_time).and_utc();

        if start > end {
            return Err(OptionsError::InvertedRange {
                start: start.format("%Y-%m-%d %H:%M").to_string(),
                end: end.format("%Y-%m-%d %H:%M").to_string(),
            });
        }
        Ok(RangeFilter::between(start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_parse_top_value() {
        assert_eq!(parse_top_value(""), Ok(None));
        assert_eq!(parse_top_value("  "), Ok(None));
        assert_eq!(parse_top_value("all"), Ok(None));
        assert_eq!(parse_top_value(" ALL "), Ok(None));
        assert_eq!(parse_top_value("10"), Ok(Some(10)));
        assert_eq!(parse_top_value("0"), Ok(Some(0)));
    }

    #[test]
    fn test_parse_top_value_rejects_non_counts() {
        for bad in ["-1", "2.5", "ten", "+3", "99999999999999999999999"] {
            assert!(
                matches!(parse_top_value(bad), Err(OptionsError::InvalidTop(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_parse_date_and_time() {
        assert_eq!(parse_date("2024-03-09"), Ok(date(2024, 3, 9)));
        assert_eq!(parse_time("07:45"), Ok(time(7, 45)));
        assert_eq!(
            parse_date("09/03/2024"),
            Err(OptionsError::InvalidDate("09/03/2024".to_string()))
        );
        assert_eq!(
            parse_time("25:00"),
            Err(OptionsError::InvalidTime("25:00".to_string()))
        );
    }

    #[test]
    fn test_view_options_parse() {
        let view = ViewOptions::parse("5", "all", "0").unwrap();
        assert_eq!(view.top_addresses, Some(5));
        assert_eq!(view.top_domains, None);
        assert_eq!(view.top_categories, Some(0));
        assert!(ViewOptions::parse("5", "x", "0").is_err());
    }

    #[test]
    fn test_covering_spans_whole_days() {
        let extent = TimeRange {
            min: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            max: DateTime::from_timestamp(1_700_200_000, 0).unwrap(),
        };
        let input = RangeInput::covering(&extent);
        assert_eq!(input.start_date, date(2023, 11, 14));
        assert_eq!(input.start_time, time(0, 0));
        assert_eq!(input.end_date, date(2023, 11, 17));
        assert_eq!(input.end_time, time(23, 59));

        let filter = input.to_filter().unwrap();
        assert!(filter.contains(extent.min));
        assert!(filter.contains(extent.max));
    }

    #[test]
    fn test_to_filter_end_covers_its_minute() {
        let input = RangeInput {
            start_date: date(2024, 1, 1),
            start_time: time(10, 0),
            end_date: date(2024, 1, 1),
            end_time: time(10, 30),
        };
        let filter = input.to_filter().unwrap();
        let start = date(2024, 1, 1).and_time(time(10, 0)).and_utc();
        let end = date(2024, 1, 1).and_hms_opt(10, 30, 59).unwrap().and_utc();
        assert_eq!(filter.start, Some(start));
        assert_eq!(filter.end, Some(end));
    }

    #[test]
    fn test_to_filter_rejects_inverted_range() {
        let input = RangeInput {
            start_date: date(2024, 1, 2),
            start_time: time(0, 0),
            end_date: date(2024, 1, 1),
            end_time: time(23, 59),
        };
        assert!(matches!(
            input.to_filter(),
            Err(OptionsError::InvertedRange { .. })
        ));
    }
}
