//! Date templates such as `DD/M/YYYY` or `MMM Do, YYYY`.
//!
//! A [`Template`] is compiled once from its source string and then used in
//! both directions: strict parsing of candidate values and rendering of
//! boundary dates in failure messages.
//!
//! # Tokens
//!
//! | Token | Meaning | Rendered as |
//! |-------|---------|-------------|
//! | `YYYY` / `YY` | 4-digit / 2-digit year | `2015` / `15` |
//! | `M` / `MM` | month number | `1` / `01` |
//! | `MMM` / `MMMM` | month name | `Jan` / `January` |
//! | `D` / `DD` / `Do` | day of month | `1` / `01` / `1st` |
//! | `ddd` / `dddd` | weekday name | `Thu` / `Thursday` |
//! | `H` / `HH` | hour 0-23 | `9` / `09` |
//! | `h` / `hh` | hour 1-12 | `9` / `09` |
//! | `A` / `a` | meridiem | `PM` / `pm` |
//! | `m` / `mm` | minute | `5` / `05` |
//! | `s` / `ss` | second | `5` / `05` |
//! | `S` / `SS` / `SSS` | fraction of a second | `7` / `75` / `750` |
//! | `Z` / `ZZ` | UTC offset | `+07:00` / `+0700` |
//! | `X` | unix seconds | `1420070400` |
//!
//! Text inside `[...]` is literal. Any other character is a literal that must
//! appear verbatim.

use std::fmt;

use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Timelike, Utc,
    Weekday,
};

use crate::parse::Stamp;

/// The template used for boundary dates when no `errorFormat` is configured.
pub const DEFAULT_ERROR_FORMAT: &str = "MMM Do, YYYY";

const MONTHS_LONG: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const MONTHS_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const WEEKDAYS_LONG: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const WEEKDAYS_SHORT: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

// ── Tokens ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Year4,
    Year2,
    Month,
    MonthPadded,
    MonthShort,
    MonthLong,
    Day,
    DayPadded,
    DayOrdinal,
    WeekdayShort,
    WeekdayLong,
    Hour24,
    Hour24Padded,
    Hour12,
    Hour12Padded,
    MeridiemUpper,
    MeridiemLower,
    Minute,
    MinutePadded,
    Second,
    SecondPadded,
    Fraction(u32),
    OffsetColon,
    OffsetCompact,
    UnixSeconds,
}

/// Longest tokens first so that `MMMM` wins over `MM`.
const FIELDS: [(&str, Field); 27] = [
    ("MMMM", Field::MonthLong),
    ("MMM", Field::MonthShort),
    ("MM", Field::MonthPadded),
    ("M", Field::Month),
    ("YYYY", Field::Year4),
    ("YY", Field::Year2),
    ("dddd", Field::WeekdayLong),
    ("ddd", Field::WeekdayShort),
    ("Do", Field::DayOrdinal),
    ("DD", Field::DayPadded),
    ("D", Field::Day),
    ("HH", Field::Hour24Padded),
    ("H", Field::Hour24),
    ("hh", Field::Hour12Padded),
    ("h", Field::Hour12),
    ("mm", Field::MinutePadded),
    ("m", Field::Minute),
    ("ss", Field::SecondPadded),
    ("s", Field::Second),
    ("SSS", Field::Fraction(3)),
    ("SS", Field::Fraction(2)),
    ("S", Field::Fraction(1)),
    ("ZZ", Field::OffsetCompact),
    ("Z", Field::OffsetColon),
    ("A", Field::MeridiemUpper),
    ("a", Field::MeridiemLower),
    ("X", Field::UnixSeconds),
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Field(Field),
    Literal(String),
}

// ── Template ────────────────────────────────────────────────────────────────

/// A compiled date template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    pieces: Vec<Piece>,
}

impl Template {
    /// Compile a template. Every string is a valid template; unknown letters
    /// are treated as literals.
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            pieces: tokenize(source),
        }
    }

    /// The template as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Parse `input` strictly against this template.
    ///
    /// Every token must consume exactly the characters it allows and the
    /// whole input must be consumed. Missing date fields are filled from
    /// `today`: units larger than the largest one present take today's value,
    /// smaller ones take their minimum. Missing time fields are zero.
    ///
    /// Returns `None` on any mismatch or out-of-range component.
    pub(crate) fn parse_strict(&self, input: &str, today: NaiveDate) -> Option<Stamp> {
        let mut fields = ParsedFields::default();
        let mut rest = input;

        for piece in &self.pieces {
            rest = match piece {
                Piece::Literal(lit) => rest.strip_prefix(lit.as_str())?,
                Piece::Field(field) => fields.consume(*field, rest)?,
            };
        }

        if !rest.is_empty() {
            tracing::trace!(template = %self.source, trailing = rest, "trailing input");
            return None;
        }

        fields.build(today)
    }

    /// Render a datetime with this template.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use date_validator::Template;
    ///
    /// let dt = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();
    /// assert_eq!(Template::new("MMM Do, YYYY").render(&dt), "Jan 1st, 2015");
    /// assert_eq!(Template::new("M/D/YYYY").render(&dt), "1/1/2015");
    /// ```
    pub fn render<T: TimeZone>(&self, dt: &DateTime<T>) -> String {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Literal(lit) => out.push_str(lit),
                Piece::Field(field) => out.push_str(&render_field(*field, dt)),
            }
        }
        out
    }
}

impl Default for Template {
    fn default() -> Self {
        Template::new(DEFAULT_ERROR_FORMAT)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn tokenize(source: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut rest = source;

    while let Some(ch) = rest.chars().next() {
        if ch == '[' {
            if let Some(end) = rest[1..].find(']') {
                push_literal(&mut pieces, &rest[1..=end]);
                rest = &rest[end + 2..];
                continue;
            }
        }

        if let Some((token, field)) = FIELDS.iter().find(|(token, _)| rest.starts_with(token)) {
            pieces.push(Piece::Field(*field));
            rest = &rest[token.len()..];
            continue;
        }

        push_literal(&mut pieces, &rest[..ch.len_utf8()]);
        rest = &rest[ch.len_utf8()..];
    }

    pieces
}

fn push_literal(pieces: &mut Vec<Piece>, text: &str) {
    if text.is_empty() {
        return;
    }
    match pieces.last_mut() {
        Some(Piece::Literal(lit)) => lit.push_str(text),
        _ => pieces.push(Piece::Literal(text.to_string())),
    }
}

// ── Strict parsing ──────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct ParsedFields {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    weekday: Option<Weekday>,
    hour24: Option<u32>,
    hour12: Option<u32>,
    pm: Option<bool>,
    minute: Option<u32>,
    second: Option<u32>,
    nanos: u32,
    offset: Option<FixedOffset>,
    unix: Option<i64>,
}

impl ParsedFields {
    /// Consume one field from the front of `input`, returning the remainder.
    fn consume<'a>(&mut self, field: Field, input: &'a str) -> Option<&'a str> {
        match field {
            Field::Year4 => {
                let (n, rest) = take_digits(input, 4, 4)?;
                self.year = Some(n as i32);
                Some(rest)
            }
            Field::Year2 => {
                let (n, rest) = take_digits(input, 2, 2)?;
                self.year = Some(if n > 68 { 1900 + n as i32 } else { 2000 + n as i32 });
                Some(rest)
            }
            Field::Month | Field::MonthPadded => {
                let min = if field == Field::Month { 1 } else { 2 };
                let (n, rest) = take_digits(input, min, 2)?;
                self.month = Some(in_range(n, 1, 12)?);
                Some(rest)
            }
            Field::MonthShort | Field::MonthLong => {
                let names = if field == Field::MonthShort {
                    &MONTHS_SHORT
                } else {
                    &MONTHS_LONG
                };
                let (index, rest) = take_name(input, names)?;
                self.month = Some(index as u32 + 1);
                Some(rest)
            }
            Field::Day | Field::DayPadded => {
                let min = if field == Field::Day { 1 } else { 2 };
                let (n, rest) = take_digits(input, min, 2)?;
                self.day = Some(in_range(n, 1, 31)?);
                Some(rest)
            }
            Field::DayOrdinal => {
                let (n, rest) = take_digits(input, 1, 2)?;
                let day = in_range(n, 1, 31)?;
                let suffix = ordinal_suffix(day);
                let head = rest.get(..suffix.len())?;
                if !head.eq_ignore_ascii_case(suffix) {
                    return None;
                }
                self.day = Some(day);
                Some(&rest[suffix.len()..])
            }
            Field::WeekdayShort | Field::WeekdayLong => {
                let names = if field == Field::WeekdayShort {
                    &WEEKDAYS_SHORT
                } else {
                    &WEEKDAYS_LONG
                };
                let (index, rest) = take_name(input, names)?;
                self.weekday = Some(WEEKDAYS[index]);
                Some(rest)
            }
            Field::Hour24 | Field::Hour24Padded => {
                let min = if field == Field::Hour24 { 1 } else { 2 };
                let (n, rest) = take_digits(input, min, 2)?;
                self.hour24 = Some(in_range(n, 0, 23)?);
                Some(rest)
            }
            Field::Hour12 | Field::Hour12Padded => {
                let min = if field == Field::Hour12 { 1 } else { 2 };
                let (n, rest) = take_digits(input, min, 2)?;
                self.hour12 = Some(in_range(n, 1, 12)?);
                Some(rest)
            }
            Field::MeridiemUpper | Field::MeridiemLower => {
                let (index, rest) = take_name(input, &["AM", "PM"])?;
                self.pm = Some(index == 1);
                Some(rest)
            }
            Field::Minute | Field::MinutePadded => {
                let min = if field == Field::Minute { 1 } else { 2 };
                let (n, rest) = take_digits(input, min, 2)?;
                self.minute = Some(in_range(n, 0, 59)?);
                Some(rest)
            }
            Field::Second | Field::SecondPadded => {
                let min = if field == Field::Second { 1 } else { 2 };
                let (n, rest) = take_digits(input, min, 2)?;
                self.second = Some(in_range(n, 0, 59)?);
                Some(rest)
            }
            Field::Fraction(width) => {
                let (n, rest) = take_digits(input, width as usize, width as usize)?;
                self.nanos = n as u32 * 10u32.pow(9 - width);
                Some(rest)
            }
            Field::OffsetColon | Field::OffsetCompact => {
                let (offset, rest) = take_offset(input)?;
                self.offset = Some(offset);
                Some(rest)
            }
            Field::UnixSeconds => {
                let (negative, digits) = match input.strip_prefix('-') {
                    Some(rest) => (true, rest),
                    None => (false, input),
                };
                let (n, rest) = take_digits(digits, 1, 12)?;
                self.unix = Some(if negative { -(n as i64) } else { n as i64 });
                Some(rest)
            }
        }
    }

    fn build(self, today: NaiveDate) -> Option<Stamp> {
        if let Some(secs) = self.unix {
            let instant = Utc.timestamp_opt(secs, self.nanos).single()?;
            return Some(Stamp::Instant(instant));
        }

        let date = self.date(today)?;
        if self.weekday.is_some_and(|wd| wd != date.weekday()) {
            return None;
        }

        // Without a meridiem the hour is kept as written.
        let hour = match (self.hour12.or(self.hour24), self.pm) {
            (Some(h), Some(pm)) if self.hour12.is_some() => h % 12 + if pm { 12 } else { 0 },
            (Some(h), Some(true)) if h < 12 => h + 12,
            (Some(h), _) => h,
            (None, _) => 0,
        };
        let time = NaiveTime::from_hms_nano_opt(
            hour,
            self.minute.unwrap_or(0),
            self.second.unwrap_or(0),
            self.nanos,
        )?;
        let naive = date.and_time(time);

        match self.offset {
            Some(offset) => {
                let instant = offset.from_local_datetime(&naive).single()?;
                Some(Stamp::Instant(instant.with_timezone(&Utc)))
            }
            None => Some(Stamp::Local(naive)),
        }
    }

    fn date(&self, today: NaiveDate) -> Option<NaiveDate> {
        // Units above the largest supplied one come from today, units below
        // it start at their minimum.
        let supplied = [self.year.is_some(), self.month.is_some(), self.day.is_some()];
        let largest = supplied.iter().position(|s| *s);
        let pick = |index: usize, value: Option<i64>, current: i64, minimum: i64| match (value, largest) {
            (Some(v), _) => v,
            (None, Some(l)) if index > l => minimum,
            _ => current,
        };

        let year = pick(0, self.year.map(i64::from), today.year() as i64, 0);
        let month = pick(1, self.month.map(i64::from), today.month() as i64, 1);
        let day = pick(2, self.day.map(i64::from), today.day() as i64, 1);
        NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
    }
}

/// Take between `min` and `max` ASCII digits from the front of `input`.
fn take_digits(input: &str, min: usize, max: usize) -> Option<(u64, &str)> {
    let len = input
        .bytes()
        .take(max)
        .take_while(|b| b.is_ascii_digit())
        .count();
    if len < min {
        return None;
    }
    let n = input[..len].parse().ok()?;
    Some((n, &input[len..]))
}

/// Match one of `names` (case-insensitive) at the front of `input`,
/// preferring the longest match.
fn take_name<'a>(input: &'a str, names: &[&str]) -> Option<(usize, &'a str)> {
    names
        .iter()
        .enumerate()
        .filter(|(_, name)| {
            input
                .get(..name.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(name))
        })
        .max_by_key(|(_, name)| name.len())
        .map(|(index, name)| (index, &input[name.len()..]))
}

/// `Z`, `+07:00` or `-0700`.
fn take_offset(input: &str) -> Option<(FixedOffset, &str)> {
    if let Some(rest) = input.strip_prefix('Z') {
        return Some((Utc.fix(), rest));
    }
    let sign = match input.as_bytes().first()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let (hours, rest) = take_digits(&input[1..], 2, 2)?;
    let rest = rest.strip_prefix(':').unwrap_or(rest);
    let (minutes, rest) = take_digits(rest, 2, 2)?;
    let seconds = sign * (in_range(hours, 0, 23)? * 3600 + in_range(minutes, 0, 59)? * 60) as i32;
    Some((FixedOffset::east_opt(seconds)?, rest))
}

fn in_range(n: u64, low: u32, high: u32) -> Option<u32> {
    let n = u32::try_from(n).ok()?;
    (low..=high).contains(&n).then_some(n)
}

// ── Rendering ───────────────────────────────────────────────────────────────

fn render_field<T: TimeZone>(field: Field, dt: &DateTime<T>) -> String {
    let hour12 = match dt.hour() % 12 {
        0 => 12,
        h => h,
    };
    match field {
        Field::Year4 => format!("{:04}", dt.year()),
        Field::Year2 => format!("{:02}", dt.year().rem_euclid(100)),
        Field::Month => dt.month().to_string(),
        Field::MonthPadded => format!("{:02}", dt.month()),
        Field::MonthShort => MONTHS_SHORT[dt.month0() as usize].to_string(),
        Field::MonthLong => MONTHS_LONG[dt.month0() as usize].to_string(),
        Field::Day => dt.day().to_string(),
        Field::DayPadded => format!("{:02}", dt.day()),
        Field::DayOrdinal => format!("{}{}", dt.day(), ordinal_suffix(dt.day())),
        Field::WeekdayShort => {
            WEEKDAYS_SHORT[dt.weekday().num_days_from_monday() as usize].to_string()
        }
        Field::WeekdayLong => WEEKDAYS_LONG[dt.weekday().num_days_from_monday() as usize].to_string(),
        Field::Hour24 => dt.hour().to_string(),
        Field::Hour24Padded => format!("{:02}", dt.hour()),
        Field::Hour12 => hour12.to_string(),
        Field::Hour12Padded => format!("{hour12:02}"),
        Field::MeridiemUpper => (if dt.hour() < 12 { "AM" } else { "PM" }).to_string(),
        Field::MeridiemLower => (if dt.hour() < 12 { "am" } else { "pm" }).to_string(),
        Field::Minute => dt.minute().to_string(),
        Field::MinutePadded => format!("{:02}", dt.minute()),
        Field::Second => dt.second().to_string(),
        Field::SecondPadded => format!("{:02}", dt.second()),
        Field::Fraction(width) => {
            let scaled = dt.nanosecond() % 1_000_000_000 / 10u32.pow(9 - width);
            format!("{:0width$}", scaled, width = width as usize)
        }
        Field::OffsetColon => format_offset(dt, true),
        Field::OffsetCompact => format_offset(dt, false),
        Field::UnixSeconds => dt.timestamp().to_string(),
    }
}

/// Format the UTC offset (e.g., "-05:00" or "-0500").
fn format_offset<T: TimeZone>(dt: &DateTime<T>, colon: bool) -> String {
    let offset_secs = dt.offset().fix().local_minus_utc();
    let sign = if offset_secs >= 0 { "+" } else { "-" };
    let abs_secs = offset_secs.unsigned_abs();
    let hours = abs_secs / 3600;
    let minutes = (abs_secs % 3600) / 60;
    if colon {
        format!("{sign}{hours:02}:{minutes:02}")
    } else {
        format!("{sign}{hours:02}{minutes:02}")
    }
}

/// English ordinal suffix: 1st, 2nd, 3rd, 4th, 11th, 12th, 13th, 21st...
pub(crate) fn ordinal_suffix(n: u32) -> &'static str {
    match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}
