//! Date helpers for schedules and the date fields of the forms.

use anyhow::{Context, Result};
use time::{
    Date, Duration, OffsetDateTime, Weekday,
    macros::{format_description, offset},
};

pub const DAYS_IN_WEEK: usize = 7;

/// Format as `dd-mm-yyyy`.
pub fn format_date(date: Date) -> Result<String> {
    let format = format_description!("[day]-[month]-[year]");
    date.format(&format).context("failed to format date")
}

/// Parse a `dd-mm-yyyy` date.
pub fn parse_date(text: &str) -> Result<Date> {
    let format = format_description!("[day]-[month]-[year]");
    Date::parse(text, &format).context(format!("failed to parse date {text:?}"))
}

/// ISO 8601 week number.
pub fn week_number(date: Date) -> u8 {
    date.iso_week()
}

/// The seven dates (Monday first) of ISO week `week` in the week-based year of `today`.
pub fn date_range_of_week(week: u8, today: Date) -> Result<Vec<String>> {
    let year = today.to_iso_week_date().0;
    let monday = Date::from_iso_week_date(year, week, Weekday::Monday)
        .context(format!("failed to find week {week} of {year}"))?;

    (0..DAYS_IN_WEEK as i64)
        .map(|day| format_date(add_days(monday, day)?))
        .collect()
}

/// `hh:mm` for a number of minutes; hours are not wrapped at 24.
pub fn time_from_minutes(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

pub fn add_days(date: Date, days: i64) -> Result<Date> {
    date.checked_add(Duration::days(days))
        .context("failed to add days: date out of range")
}

pub fn subtract_days(date: Date, days: i64) -> Result<Date> {
    date.checked_sub(Duration::days(days))
        .context("failed to subtract days: date out of range")
}

/// `dd-mm-yyyy` of the moment as seen in GMT+2, the controller's local time.
pub fn local_date_string(moment: OffsetDateTime) -> Result<String> {
    format_date(moment.to_offset(offset!(+2)).date())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn formats_and_parses_day_first() {
        assert_eq!(format_date(date!(2024 - 03 - 07)).unwrap(), "07-03-2024");
        assert_eq!(parse_date("07-03-2024").unwrap(), date!(2024 - 03 - 07));
        assert!(parse_date("2024-03-07").is_err());
        assert!(parse_date("31-02-2024").is_err());
    }

    #[test]
    fn week_numbers_follow_iso() {
        assert_eq!(week_number(date!(2024 - 01 - 01)), 1);
        assert_eq!(week_number(date!(2021 - 01 - 03)), 53);
        assert_eq!(week_number(date!(2024 - 12 - 30)), 1);
    }

    #[test]
    fn week_range_starts_on_monday() {
        let dates = date_range_of_week(10, date!(2024 - 06 - 15)).unwrap();

        assert_eq!(dates.len(), DAYS_IN_WEEK);
        assert_eq!(dates.first().unwrap(), "04-03-2024");
        assert_eq!(dates.last().unwrap(), "10-03-2024");
    }

    #[test]
    fn week_range_rejects_missing_week() {
        assert!(date_range_of_week(53, date!(2024 - 06 - 15)).is_err());
    }

    #[test]
    fn minutes_to_clock_text() {
        assert_eq!(time_from_minutes(0), "00:00");
        assert_eq!(time_from_minutes(75), "01:15");
        assert_eq!(time_from_minutes(1439), "23:59");
        assert_eq!(time_from_minutes(1500), "25:00");
    }

    #[test]
    fn day_arithmetic_crosses_months() {
        assert_eq!(
            add_days(date!(2024 - 02 - 28), 2).unwrap(),
            date!(2024 - 03 - 01)
        );
        assert_eq!(
            subtract_days(date!(2024 - 03 - 01), 1).unwrap(),
            date!(2024 - 02 - 29)
        );
    }

    #[test]
    fn local_date_is_two_hours_ahead() {
        assert_eq!(
            local_date_string(datetime!(2024-05-31 22:30 UTC)).unwrap(),
            "01-06-2024"
        );
        assert_eq!(
            local_date_string(datetime!(2024-05-31 21:30 UTC)).unwrap(),
            "31-05-2024"
        );
    }
}
