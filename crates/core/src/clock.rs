//! Wall-clock access and manual timestamp entry.

use chrono::{Local, NaiveDate, NaiveDateTime};

use crate::error::RentalError;

/// Format accepted by [`parse_timestamp`], shown in prompts.
pub const TIMESTAMP_HINT: &str = "M:D:Y:HH:MM";

/// Where rental start and return times come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    /// Use the local system time.
    #[default]
    System,
    /// Ask the operator for every timestamp.
    Manual,
}

impl Clock {
    /// Pick a clock from the `clock.manual` setting.
    pub fn from_manual_flag(manual: bool) -> Self {
        if manual {
            Clock::Manual
        } else {
            Clock::System
        }
    }

    /// Whether timestamps must be typed in.
    pub fn is_manual(self) -> bool {
        self == Clock::Manual
    }
}

/// Current local time without timezone.
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Parse `M:D:Y:HH:MM`, e.g. `1:15:2025:09:30`.
pub fn parse_timestamp(input: &str) -> Result<NaiveDateTime, RentalError> {
    let invalid = || RentalError::InvalidTimestamp(input.trim().to_string());
    let parts = input
        .trim()
        .split(':')
        .map(|part| part.trim().parse::<u32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid())?;
    let &[month, day, year, hour, minute] = parts.as_slice() else {
        return Err(invalid());
    };
    let year = i32::try_from(year).map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .ok_or_else(invalid)
}

/// Render a timestamp the way receipts show it.
pub fn format_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_manual_timestamps() {
        let parsed = parse_timestamp("1:15:2025:9:05").unwrap();
        assert_eq!((parsed.month(), parsed.day(), parsed.year()), (1, 15, 2025));
        assert_eq!((parsed.hour(), parsed.minute()), (9, 5));
        assert_eq!(format_timestamp(parsed), "2025-01-15 09:05:00");
    }

    #[test]
    fn rejects_malformed_timestamps() {
        for input in ["", "1:15:2025", "13:1:2025:10:00", "1:15:2025:25:00", "a:b:c:d:e"] {
            assert!(
                matches!(parse_timestamp(input), Err(RentalError::InvalidTimestamp(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn clock_follows_manual_flag() {
        assert!(Clock::from_manual_flag(true).is_manual());
        assert_eq!(Clock::from_manual_flag(false), Clock::System);
    }
}
