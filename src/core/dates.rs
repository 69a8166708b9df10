use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Date-only layouts accepted in the `Date` column.
const DATE_FORMATS: [&'static str; 3] = ["%Y-%m-%d", "%d.%m.%Y", "%m/%d/%Y"];
/// Date and time layouts, as exported by the spreadsheet or typed by hand.
const DATETIME_FORMATS: [&'static str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateParseError {
    #[error("empty date")]
    Empty,
    #[error("unrecognized date '{0}'")]
    Unrecognized(String),
}

/// Parse a completion date. Dates without a time are taken at midnight UTC.
///
/// Slash-separated dates are month first (spreadsheet export), dotted dates
/// are day first.
pub fn parse_date(input: &str) -> Result<DateTime<Utc>, DateParseError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(DateParseError::Empty);
    }

    if let Ok(datetime) = DateTime::parse_from_rfc3339(input) {
        return Ok(datetime.with_timezone(&Utc));
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| DateParseError::Unrecognized(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn accepts_enumerated_formats() {
        for input in [
            "2026-02-21",
            "21.02.2026",
            "21.02.2026 13:45",
            "21.02.2026 13:45:00",
            "2/21/2026",
            "2026-02-21 13:45:00",
            "2/21/2026 13:45:00",
            "2026-02-21T13:45:00Z",
        ] {
            let date = parse_date(input).unwrap();
            assert_eq!((date.year(), date.month(), date.day()), (2026, 2, 21), "{input}");
        }
    }

    #[test]
    fn keeps_time_of_day() {
        let date = parse_date("2026-03-01T08:30:00+01:00").unwrap();
        assert_eq!((date.hour(), date.minute()), (7, 30));
    }

    #[test]
    fn dotted_timestamps_keep_seconds() {
        let date = parse_date("21.02.2026 13:45:30").unwrap();
        assert_eq!((date.hour(), date.minute(), date.second()), (13, 45, 30));
    }

    #[test]
    fn rejects_empty_and_unknown_inputs() {
        assert_eq!(parse_date("  "), Err(DateParseError::Empty));
        assert_eq!(
            parse_date("next tuesday"),
            Err(DateParseError::Unrecognized("next tuesday".to_string()))
        );
        assert!(parse_date("31/12/2026").is_err());
    }
}
