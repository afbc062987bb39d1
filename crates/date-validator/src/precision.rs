//! Calendar precision and truncation.
//!
//! Both the candidate value and every bound are truncated to the same
//! [`Precision`] before they are compared, so two instants that differ only
//! below the chosen unit compare as equal.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ValidatorError;

// ── Precision ───────────────────────────────────────────────────────────────

/// The calendar unit to which dates are truncated before comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    #[default]
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl Precision {
    /// Every precision, finest first.
    pub const ALL: [Precision; 7] = [
        Precision::Second,
        Precision::Minute,
        Precision::Hour,
        Precision::Day,
        Precision::Week,
        Precision::Month,
        Precision::Year,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Precision::Second => "second",
            Precision::Minute => "minute",
            Precision::Hour => "hour",
            Precision::Day => "day",
            Precision::Week => "week",
            Precision::Month => "month",
            Precision::Year => "year",
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Precision {
    type Err = ValidatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Precision::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidatorError::InvalidPrecision(format!("'{s}'")))
    }
}

// ── Week start ──────────────────────────────────────────────────────────────

/// Which day begins a week for `week` precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStartDay {
    /// ISO 8601 standard (Monday = day 0 of the week).
    #[default]
    Monday,
    /// US/Canada convention (Sunday = day 0 of the week).
    Sunday,
}

impl FromStr for WeekStartDay {
    type Err = ValidatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monday" | "mon" | "iso" => Ok(WeekStartDay::Monday),
            "sunday" | "sun" => Ok(WeekStartDay::Sunday),
            _ => Err(ValidatorError::InvalidWeekStart(format!("'{s}'"))),
        }
    }
}

/// How many days `weekday` is from the week-start day.
fn days_from_week_start(weekday: Weekday, week_start: WeekStartDay) -> u64 {
    match week_start {
        WeekStartDay::Monday => u64::from(weekday.num_days_from_monday()),
        WeekStartDay::Sunday => u64::from(weekday.num_days_from_sunday()),
    }
}

// ── Truncation ──────────────────────────────────────────────────────────────

/// Truncate a wall-clock datetime to the start of its `precision` unit.
///
/// `second`, `minute` and `hour` clear the smaller time fields, `day` clears
/// the time of day, `week` moves back to the first day of the week,
/// `month` to the 1st and `year` to January 1st.
///
/// Returns `None` when the start of the week falls before the earliest
/// representable date.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use date_validator::precision::{truncate, Precision, WeekStartDay};
///
/// let dt = NaiveDate::from_ymd_opt(2013, 2, 8).unwrap().and_hms_opt(9, 30, 26).unwrap();
/// let day = truncate(dt, Precision::Day, WeekStartDay::Monday).unwrap();
/// assert_eq!(day.to_string(), "2013-02-08 00:00:00");
/// ```
pub fn truncate(
    dt: NaiveDateTime,
    precision: Precision,
    week_start: WeekStartDay,
) -> Option<NaiveDateTime> {
    let date = dt.date();
    let truncated = match precision {
        Precision::Second => date.and_time(dt.time().with_nanosecond(0)?),
        Precision::Minute => date.and_time(NaiveTime::from_hms_opt(dt.hour(), dt.minute(), 0)?),
        Precision::Hour => date.and_time(NaiveTime::from_hms_opt(dt.hour(), 0, 0)?),
        Precision::Day => date.and_time(NaiveTime::MIN),
        Precision::Week => {
            let back = days_from_week_start(date.weekday(), week_start);
            date.checked_sub_days(Days::new(back))?.and_time(NaiveTime::MIN)
        }
        Precision::Month => date.with_day(1)?.and_time(NaiveTime::MIN),
        Precision::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1)?.and_time(NaiveTime::MIN),
    };
    Some(truncated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NaiveDateTime {
        // Friday
        NaiveDate::from_ymd_opt(2013, 2, 8)
            .unwrap()
            .and_hms_milli_opt(9, 30, 26, 750)
            .unwrap()
    }

    fn ymd_hms(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_truncate_second_drops_fraction() {
        let t = truncate(sample(), Precision::Second, WeekStartDay::Monday).unwrap();
        assert_eq!(t, ymd_hms(2013, 2, 8, 9, 30, 26));
    }

    #[test]
    fn test_truncate_minute_and_hour() {
        let ws = WeekStartDay::Monday;
        assert_eq!(truncate(sample(), Precision::Minute, ws), Some(ymd_hms(2013, 2, 8, 9, 30, 0)));
        assert_eq!(truncate(sample(), Precision::Hour, ws), Some(ymd_hms(2013, 2, 8, 9, 0, 0)));
    }

    #[test]
    fn test_truncate_day() {
        let t = truncate(sample(), Precision::Day, WeekStartDay::Monday).unwrap();
        assert_eq!(t, ymd_hms(2013, 2, 8, 0, 0, 0));
    }

    #[test]
    fn test_truncate_week_monday_start() {
        // Fri Feb 8 → Mon Feb 4
        let t = truncate(sample(), Precision::Week, WeekStartDay::Monday).unwrap();
        assert_eq!(t, ymd_hms(2013, 2, 4, 0, 0, 0));
    }

    #[test]
    fn test_truncate_week_sunday_start() {
        // Fri Feb 8 → Sun Feb 3
        let t = truncate(sample(), Precision::Week, WeekStartDay::Sunday).unwrap();
        assert_eq!(t, ymd_hms(2013, 2, 3, 0, 0, 0));
    }

    #[test]
    fn test_truncate_week_crosses_year() {
        // Thu Jan 1 2015 → Mon Dec 29 2014
        let dt = ymd_hms(2015, 1, 1, 12, 0, 0);
        let t = truncate(dt, Precision::Week, WeekStartDay::Monday).unwrap();
        assert_eq!(t, ymd_hms(2014, 12, 29, 0, 0, 0));
    }

    #[test]
    fn test_truncate_month_and_year() {
        let ws = WeekStartDay::Monday;
        assert_eq!(truncate(sample(), Precision::Month, ws), Some(ymd_hms(2013, 2, 1, 0, 0, 0)));
        assert_eq!(truncate(sample(), Precision::Year, ws), Some(ymd_hms(2013, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn test_truncate_is_idempotent() {
        for ws in [WeekStartDay::Monday, WeekStartDay::Sunday] {
            for p in Precision::ALL {
                let once = truncate(sample(), p, ws).unwrap();
                assert_eq!(truncate(once, p, ws), Some(once), "precision {p}");
            }
        }
    }

    #[test]
    fn test_truncate_week_before_earliest_date() {
        let earliest = NaiveDate::MIN.and_time(NaiveTime::MIN);
        let back = days_from_week_start(NaiveDate::MIN.weekday(), WeekStartDay::Monday);
        let week = truncate(earliest, Precision::Week, WeekStartDay::Monday);
        assert_eq!(week.is_some(), back == 0);
        // Other precisions stay inside the same day, month or year.
        for p in [Precision::Second, Precision::Day, Precision::Month, Precision::Year] {
            assert_eq!(truncate(earliest, p, WeekStartDay::Monday), Some(earliest));
        }
        // One of the two week conventions always needs to step back.
        assert!(
            truncate(earliest, Precision::Week, WeekStartDay::Monday).is_none()
                || truncate(earliest, Precision::Week, WeekStartDay::Sunday).is_none()
        );
    }

    #[test]
    fn test_precision_from_str() {
        assert_eq!("day".parse::<Precision>().unwrap(), Precision::Day);
        assert_eq!("Week".parse::<Precision>().unwrap(), Precision::Week);
        let err = "fortnight".parse::<Precision>().unwrap_err().to_string();
        assert!(err.contains("Invalid precision"), "got: {err}");
    }

    #[test]
    fn test_precision_deserialize() {
        let p: Precision = serde_json::from_str("\"month\"").unwrap();
        assert_eq!(p, Precision::Month);
        assert!(serde_json::from_str::<Precision>("\"decade\"").is_err());
    }

    #[test]
    fn test_week_start_from_str() {
        assert_eq!("sunday".parse::<WeekStartDay>().unwrap(), WeekStartDay::Sunday);
        assert_eq!("ISO".parse::<WeekStartDay>().unwrap(), WeekStartDay::Monday);
        assert!("friday".parse::<WeekStartDay>().is_err());
    }
}
