//! Turning candidate values and bound literals into [`ParsedDate`]s.
//!
//! Strings are parsed strictly against a [`Template`] when the caller supplied
//! a `format`, and permissively otherwise. Permissive parsing tries, in order:
//!
//! - RFC 3339 (`2015-01-01T00:00:00Z`)
//! - RFC 2822 (`Thu, 01 Jan 2015 00:00:00 +0000`)
//! - JavaScript `Date.toString()` (`Fri Feb 08 2013 09:30:26 GMT+0000 (UTC)`)
//! - ISO 8601 date-times with an offset but no `T`, or with `T` and no offset
//! - ISO 8601 and US dates (`2015-01-01`, `1/1/2015`, optionally with a time)
//! - Month-name dates (`Jan 1, 2015`, `January 1st, 2015`, `1 January 2015`)
//!
//! Strings without an offset are read as wall-clock time in the configured
//! zone.

use chrono::{
    DateTime, Datelike, Days, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
    Utc,
};
use chrono_tz::Tz;

use crate::precision::{truncate, Precision, WeekStartDay};
use crate::template::Template;
use crate::value::DateInput;

/// A parsed point in time before it is placed in the configured zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stamp {
    /// Wall-clock time with no offset information.
    Local(NaiveDateTime),
    /// An absolute instant (the input carried an offset or was a timestamp).
    Instant(DateTime<Utc>),
}

// ── ParsedDate ──────────────────────────────────────────────────────────────

/// A valid date, expressed in the validator's zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDate(DateTime<Tz>);

impl ParsedDate {
    /// Place an absolute instant in `tz`.
    ///
    /// Returns `None` for instants so close to the representable limits that
    /// the zone's wall clock, or the start of its week, would fall outside
    /// them.
    pub fn from_instant(instant: DateTime<Utc>, tz: Tz) -> Option<Self> {
        if !has_headroom(instant.naive_utc()) {
            return None;
        }
        Some(Self(instant.with_timezone(&tz)))
    }

    /// Place a wall-clock time in `tz`.
    ///
    /// An ambiguous time (DST fall-back) resolves to the earlier instant. A
    /// time that falls in a DST gap is moved forward by one hour. Returns
    /// `None` if neither works or the time is too close to the representable
    /// limits.
    pub fn from_wall_clock(naive: NaiveDateTime, tz: Tz) -> Option<Self> {
        if !has_headroom(naive) {
            return None;
        }
        let local = match tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => Some(dt),
            LocalResult::Ambiguous(earliest, _) => Some(earliest),
            LocalResult::None => tz
                .from_local_datetime(&(naive + Duration::hours(1)))
                .earliest(),
        };
        local.map(Self)
    }

    pub(crate) fn from_stamp(stamp: Stamp, tz: Tz) -> Option<Self> {
        match stamp {
            Stamp::Local(naive) => Self::from_wall_clock(naive, tz),
            Stamp::Instant(instant) => Self::from_instant(instant, tz),
        }
    }

    /// The date in its zone.
    pub fn datetime(&self) -> &DateTime<Tz> {
        &self.0
    }

    /// The absolute instant.
    pub fn instant(&self) -> DateTime<Utc> {
        self.0.with_timezone(&Utc)
    }

    /// Calendar fields as read on the zone's wall clock.
    pub fn wall_clock(&self) -> NaiveDateTime {
        self.0.naive_local()
    }

    /// The wall-clock fields truncated to `precision`.
    pub fn truncated(&self, precision: Precision, week_start: WeekStartDay) -> Option<NaiveDateTime> {
        truncate(self.wall_clock(), precision, week_start)
    }
}

/// Two weeks clear of chrono's limits on both sides: room for any zone
/// offset, a DST shift and a step back to the start of the week.
fn has_headroom(naive: NaiveDateTime) -> bool {
    let margin = Days::new(14);
    naive.checked_sub_days(margin).is_some() && naive.checked_add_days(margin).is_some()
}

// ── Value parsing ───────────────────────────────────────────────────────────

/// Parse the value under validation.
///
/// - Instants are accepted as-is; `format` does not apply to them.
/// - Absent or blank values, and the string `"now"`, resolve to `now`.
/// - Other strings go through `format` strictly if one is given, permissive
///   parsing otherwise.
///
/// Returns `None` when the value is not a valid date.
pub fn parse_value(
    value: &DateInput,
    format: Option<&Template>,
    tz: Tz,
    now: DateTime<Utc>,
) -> Option<ParsedDate> {
    match value {
        DateInput::Instant(instant) => ParsedDate::from_instant(*instant, tz),
        DateInput::Absent => ParsedDate::from_instant(now, tz),
        DateInput::Text(text) if text.trim().is_empty() || is_now(text) => {
            ParsedDate::from_instant(now, tz)
        }
        DateInput::Text(text) => {
            let stamp = match format {
                Some(template) => {
                    let today = now.with_timezone(&tz).date_naive();
                    template.parse_strict(text, today)
                }
                None => parse_permissive(text),
            };
            tracing::trace!(
                input = %text,
                format = ?format.map(Template::as_str),
                ?stamp,
                "parsed value"
            );
            ParsedDate::from_stamp(stamp?, tz)
        }
    }
}

/// Whether a string is the `"now"` literal.
pub(crate) fn is_now(s: &str) -> bool {
    s.trim() == "now"
}

// ── Permissive parsing ──────────────────────────────────────────────────────

const OFFSET_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M%:z",
];

const NAIVE_DATETIME_FORMATS: [&str; 10] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const NAIVE_DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%a %b %d %Y"];

const MONTH_NAME_FORMATS: [&str; 5] = [
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%d %B, %Y",
    "%B %d, %Y %H:%M:%S",
];

/// Parse any recognizable date representation.
///
/// Every format matched through chrono's `%Y` must have its year written as
/// exactly four digits in the input, so `1/1/15` is not read as year 15 and
/// `January 2015` is not read as the 20th of January, year 15. Two-digit US
/// years and month-and-year strings are handled separately.
pub(crate) fn parse_permissive(s: &str) -> Option<Stamp> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    try_rfc3339(s)
        .or_else(|| try_rfc2822(s))
        .or_else(|| try_js_date_string(s))
        .or_else(|| try_offset_datetime(s))
        .or_else(|| try_naive_datetime(s))
        .or_else(|| try_naive_date(s))
        .or_else(|| try_month_name(s))
        .or_else(|| try_month_year(s))
        .or_else(|| try_two_digit_year(s))
}

fn try_rfc3339(s: &str) -> Option<Stamp> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| Stamp::Instant(dt.with_timezone(&Utc)))
}

fn try_rfc2822(s: &str) -> Option<Stamp> {
    DateTime::parse_from_rfc2822(s)
        .ok()
        .map(|dt| Stamp::Instant(dt.with_timezone(&Utc)))
}

/// `Fri Feb 08 2013 09:30:26 GMT+0000 (Coordinated Universal Time)`; the
/// parenthesized zone name is optional and ignored.
fn try_js_date_string(s: &str) -> Option<Stamp> {
    let head = match s.find(" (") {
        Some(idx) if s.ends_with(')') => &s[..idx],
        _ => s,
    };
    DateTime::parse_from_str(head, "%a %b %d %Y %H:%M:%S GMT%z")
        .ok()
        .filter(|dt| year_written(head, dt.year()))
        .map(|dt| Stamp::Instant(dt.with_timezone(&Utc)))
}

fn try_offset_datetime(s: &str) -> Option<Stamp> {
    OFFSET_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| {
            DateTime::parse_from_str(s, fmt)
                .ok()
                .filter(|dt| year_written(s, dt.year()))
        })
        .map(|dt| Stamp::Instant(dt.with_timezone(&Utc)))
}

fn try_naive_datetime(s: &str) -> Option<Stamp> {
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| {
            NaiveDateTime::parse_from_str(s, fmt)
                .ok()
                .filter(|dt| year_written(s, dt.year()))
        })
        .map(Stamp::Local)
}

fn try_naive_date(s: &str) -> Option<Stamp> {
    NAIVE_DATE_FORMATS
        .iter()
        .find_map(|fmt| {
            NaiveDate::parse_from_str(s, fmt)
                .ok()
                .filter(|date| year_written(s, date.year()))
        })
        .map(start_of_day)
}

/// `Jan 1, 2015`, `January 1st, 2015`, `1 January 2015`.
fn try_month_name(s: &str) -> Option<Stamp> {
    let cleaned = strip_ordinal_suffixes(s);
    MONTH_NAME_FORMATS.iter().find_map(|fmt| {
        NaiveDateTime::parse_from_str(&cleaned, fmt)
            .ok()
            .filter(|dt| year_written(&cleaned, dt.year()))
            .map(Stamp::Local)
            .or_else(|| {
                NaiveDate::parse_from_str(&cleaned, fmt)
                    .ok()
                    .filter(|date| year_written(&cleaned, date.year()))
                    .map(start_of_day)
            })
    })
}

/// `January 2015`, `Jan 2015`: the first of the month.
fn try_month_year(s: &str) -> Option<Stamp> {
    let (month, year) = s.split_once(' ')?;
    let year = year.trim();
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(&format!("1 {month} {year}"), "%d %B %Y")
        .ok()
        .map(start_of_day)
}

/// `1/1/15`, optionally followed by a time. Years 00-49 are 2000-2049 and
/// 50-99 are 1950-1999.
fn try_two_digit_year(s: &str) -> Option<Stamp> {
    let (date, time) = match s.split_once(' ') {
        Some((date, time)) => (date, Some(time)),
        None => (s, None),
    };
    let mut parts = date.split('/');
    let (month, day, year) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() || year.len() != 2 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: u32 = year.parse().ok()?;
    let full_year = if year < 50 { 2000 + year } else { 1900 + year };

    let expanded = match time {
        Some(time) => format!("{month}/{day}/{full_year} {time}"),
        None => format!("{month}/{day}/{full_year}"),
    };
    try_naive_datetime(&expanded).or_else(|| try_naive_date(&expanded))
}

/// Whether `year` appears in `s` as a standalone run of exactly four digits.
fn year_written(s: &str, year: i32) -> bool {
    if !(0..=9999).contains(&year) {
        return false;
    }
    let written = format!("{year:04}");
    s.split(|c: char| !c.is_ascii_digit())
        .any(|run| run == written)
}

fn start_of_day(date: NaiveDate) -> Stamp {
    Stamp::Local(date.and_time(NaiveTime::MIN))
}

/// Remove `st`/`nd`/`rd`/`th` directly after a digit ("1st" → "1").
fn strip_ordinal_suffixes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(ch) = rest.chars().next() {
        out.push(ch);
        rest = &rest[ch.len_utf8()..];
        if !ch.is_ascii_digit() {
            continue;
        }
        let is_suffix = rest.get(..2).is_some_and(|head| {
            matches!(head.to_ascii_lowercase().as_str(), "st" | "nd" | "rd" | "th")
        });
        if is_suffix && !rest[2..].chars().next().is_some_and(char::is_alphabetic) {
            rest = &rest[2..];
        }
    }
    out
}
