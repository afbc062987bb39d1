//! Validator configuration and its per-call resolution.
//!
//! [`DateOptions`] is what callers write (in code or as camelCase JSON).
//! [`DateOptions::resolve`] turns it into [`ResolvedOptions`] for a single
//! call: the zone is looked up, templates are compiled, and every bound is
//! parsed, with `"now"` pinned to the instant the caller passes in.
//!
//! Resolution happens on every call. A resolved `"now"` is never carried over
//! to a later call.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::compare::BoundKind;
use crate::error::{Result, ValidatorError};
use crate::parse::{is_now, parse_permissive, ParsedDate};
use crate::precision::{Precision, WeekStartDay};
use crate::template::Template;

// ── Bound ───────────────────────────────────────────────────────────────────

/// A reference point for `before`, `onOrBefore`, `after` or `onOrAfter`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Bound {
    /// The current instant, read when the validator runs.
    Now,
    /// A date literal, parsed permissively.
    Literal(String),
    /// A fixed instant.
    Instant(DateTime<Utc>),
}

impl From<String> for Bound {
    fn from(s: String) -> Self {
        if is_now(&s) {
            Bound::Now
        } else {
            Bound::Literal(s)
        }
    }
}

impl From<&str> for Bound {
    fn from(s: &str) -> Self {
        Bound::from(s.to_string())
    }
}

impl<T: TimeZone> From<DateTime<T>> for Bound {
    fn from(dt: DateTime<T>) -> Self {
        Bound::Instant(dt.with_timezone(&Utc))
    }
}

impl From<Bound> for String {
    fn from(bound: Bound) -> Self {
        bound.to_string()
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Now => f.write_str("now"),
            Bound::Literal(s) => f.write_str(s),
            Bound::Instant(dt) => f.write_str(&dt.to_rfc3339()),
        }
    }
}

impl Bound {
    fn resolve(&self, kind: BoundKind, tz: Tz, now: DateTime<Utc>) -> Result<ParsedDate> {
        let parsed = match self {
            Bound::Now => ParsedDate::from_instant(now, tz),
            Bound::Instant(instant) => ParsedDate::from_instant(*instant, tz),
            Bound::Literal(s) => {
                parse_permissive(s).and_then(|stamp| ParsedDate::from_stamp(stamp, tz))
            }
        };
        parsed.ok_or_else(|| ValidatorError::InvalidBound {
            option: kind.option_name(),
            value: self.to_string(),
        })
    }
}

// ── DateOptions ─────────────────────────────────────────────────────────────

/// Configuration for a date validator.
///
/// All fields are optional. With nothing set, any value that parses as a date
/// (and any blank value) is valid.
///
/// # Examples
///
/// ```
/// use date_validator::{DateOptions, Precision};
///
/// let options = DateOptions::from_json(r#"{
///     "before": "1/1/2015",
///     "precision": "day",
///     "errorFormat": "M/D/YYYY"
/// }"#).unwrap();
/// assert_eq!(options.precision, Precision::Day);
///
/// let same = DateOptions::new()
///     .before("1/1/2015")
///     .precision(Precision::Day)
///     .error_format("M/D/YYYY");
/// assert_eq!(options, same);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct DateOptions {
    /// Accept absent, empty or whitespace-only values without further checks.
    pub allow_blank: bool,
    /// Strict template the value must match (e.g. `DD/M/YYYY`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Template for the boundary date in messages. Defaults to `MMM Do, YYYY`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_format: Option<String>,
    /// Unit both sides are truncated to before comparison.
    pub precision: Precision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<Bound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_or_before: Option<Bound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<Bound>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_or_after: Option<Bound>,
    /// First day of the week for `week` precision.
    pub week_start: WeekStartDay,
    /// IANA zone for wall-clock interpretation. Defaults to UTC.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl DateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode options from camelCase JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn allow_blank(mut self, allow: bool) -> Self {
        self.allow_blank = allow;
        self
    }

    #[must_use]
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    #[must_use]
    pub fn error_format(mut self, format: impl Into<String>) -> Self {
        self.error_format = Some(format.into());
        self
    }

    #[must_use]
    pub fn precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    #[must_use]
    pub fn before(mut self, bound: impl Into<Bound>) -> Self {
        self.before = Some(bound.into());
        self
    }

    #[must_use]
    pub fn on_or_before(mut self, bound: impl Into<Bound>) -> Self {
        self.on_or_before = Some(bound.into());
        self
    }

    #[must_use]
    pub fn after(mut self, bound: impl Into<Bound>) -> Self {
        self.after = Some(bound.into());
        self
    }

    #[must_use]
    pub fn on_or_after(mut self, bound: impl Into<Bound>) -> Self {
        self.on_or_after = Some(bound.into());
        self
    }

    #[must_use]
    pub fn week_start(mut self, week_start: WeekStartDay) -> Self {
        self.week_start = week_start;
        self
    }

    #[must_use]
    pub fn timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    /// The configured bound for `kind`, if any.
    pub fn bound(&self, kind: BoundKind) -> Option<&Bound> {
        match kind {
            BoundKind::Before => self.before.as_ref(),
            BoundKind::OnOrBefore => self.on_or_before.as_ref(),
            BoundKind::After => self.after.as_ref(),
            BoundKind::OnOrAfter => self.on_or_after.as_ref(),
        }
    }

    /// Resolve the options for one validation, with `now` as the current
    /// instant.
    ///
    /// # Errors
    ///
    /// Returns [`ValidatorError::InvalidTimezone`] for an unknown zone name and
    /// [`ValidatorError::InvalidBound`] for a bound literal that is not a date.
    pub fn resolve(&self, now: DateTime<Utc>) -> Result<ResolvedOptions> {
        let tz = match self.timezone.as_deref() {
            Some(name) => parse_timezone(name)?,
            None => Tz::UTC,
        };

        let bounds = BoundKind::ORDER
            .into_iter()
            .filter_map(|kind| self.bound(kind).map(|bound| (kind, bound)))
            .map(|(kind, bound)| bound.resolve(kind, tz, now).map(|date| (kind, date)))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            %tz,
            precision = %self.precision,
            bounds = bounds.len(),
            "resolved date options"
        );

        Ok(ResolvedOptions {
            tz,
            now,
            format: self.format.as_deref().map(Template::new),
            error_format: self
                .error_format
                .as_deref()
                .map(Template::new)
                .unwrap_or_default(),
            precision: self.precision,
            week_start: self.week_start,
            bounds,
        })
    }
}

/// Look up an IANA zone name.
fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse()
        .map_err(|_| ValidatorError::InvalidTimezone(format!("'{name}'")))
}

// ── ResolvedOptions ─────────────────────────────────────────────────────────

/// Options ready for one validation call.
#[derive(Debug, Clone)]
pub struct ResolvedOptions {
    pub tz: Tz,
    /// The instant `"now"` resolved to for this call.
    pub now: DateTime<Utc>,
    pub format: Option<Template>,
    pub error_format: Template,
    pub precision: Precision,
    pub week_start: WeekStartDay,
    /// Configured bounds in evaluation order.
    pub bounds: Vec<(BoundKind, ParsedDate)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_defaults() {
        let options = DateOptions::default();
        assert!(!options.allow_blank);
        assert_eq!(options.precision, Precision::Second);
        assert_eq!(options.week_start, WeekStartDay::Monday);

        let resolved = options.resolve(anchor()).unwrap();
        assert_eq!(resolved.tz, Tz::UTC);
        assert_eq!(resolved.error_format.as_str(), "MMM Do, YYYY");
        assert!(resolved.format.is_none());
        assert!(resolved.bounds.is_empty());
    }

    #[test]
    fn test_from_json_camel_case() {
        let options = DateOptions::from_json(
            r#"{
                "allowBlank": true,
                "format": "DD/M/YYYY",
                "errorFormat": "M/D/YYYY",
                "precision": "week",
                "onOrBefore": "now",
                "onOrAfter": "1/1/2015",
                "weekStart": "sunday",
                "timezone": "Europe/Paris"
            }"#,
        )
        .unwrap();
        assert!(options.allow_blank);
        assert_eq!(options.format.as_deref(), Some("DD/M/YYYY"));
        assert_eq!(options.precision, Precision::Week);
        assert_eq!(options.on_or_before, Some(Bound::Now));
        assert_eq!(options.on_or_after, Some(Bound::Literal("1/1/2015".into())));
        assert_eq!(options.week_start, WeekStartDay::Sunday);
    }

    #[test]
    fn test_from_json_rejects_unknown_precision() {
        let err = DateOptions::from_json(r#"{"precision": "fortnight"}"#).unwrap_err();
        assert!(matches!(err, ValidatorError::InvalidOptions(_)), "got: {err:?}");
    }

    #[test]
    fn test_from_json_rejects_unknown_field() {
        let err = DateOptions::from_json(r#"{"beforeNow": true}"#).unwrap_err();
        assert!(err.to_string().contains("Invalid options"), "got: {err}");
    }

    #[test]
    fn test_serialize_round_trips_through_json() {
        let options = DateOptions::new().before("now").after("1/1/2015");
        let json = serde_json::to_string(&options).unwrap();
        assert!(json.contains(r#""before":"now""#), "got: {json}");
        assert_eq!(DateOptions::from_json(&json).unwrap(), options);
    }

    #[test]
    fn test_now_resolves_to_given_instant() {
        let resolved = DateOptions::new().before("now").resolve(anchor()).unwrap();
        assert_eq!(resolved.bounds.len(), 1);
        assert_eq!(resolved.bounds[0].0, BoundKind::Before);
        assert_eq!(resolved.bounds[0].1.instant(), anchor());
    }

    #[test]
    fn test_now_not_memoized_between_resolutions() {
        let options = DateOptions::new().on_or_after("now");
        let first = options.resolve(anchor()).unwrap();
        let later = anchor() + chrono::Duration::days(1);
        let second = options.resolve(later).unwrap();
        assert_eq!(first.bounds[0].1.instant(), anchor());
        assert_eq!(second.bounds[0].1.instant(), later);
    }

    #[test]
    fn test_bounds_follow_evaluation_order() {
        let options = DateOptions::new()
            .on_or_after("1/1/2010")
            .after("1/1/2011")
            .on_or_before("1/1/2030")
            .before("1/1/2031");
        let kinds: Vec<_> = options
            .resolve(anchor())
            .unwrap()
            .bounds
            .iter()
            .map(|(kind, _)| *kind)
            .collect();
        assert_eq!(kinds, BoundKind::ORDER.to_vec());
    }

    #[test]
    fn test_bound_literal_ignores_format() {
        // `format` applies to the value only; the bound is still parsed permissively.
        let resolved = DateOptions::new()
            .format("DD/M/YYYY")
            .before("1/1/2015")
            .resolve(anchor())
            .unwrap();
        let expected = NaiveDate::from_ymd_opt(2015, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(resolved.bounds[0].1.wall_clock(), expected);
    }

    #[test]
    fn test_unparseable_bound_is_config_error() {
        let err = DateOptions::new()
            .after("not a date")
            .resolve(anchor())
            .unwrap_err();
        match err {
            ValidatorError::InvalidBound { option, value } => {
                assert_eq!(option, "after");
                assert_eq!(value, "not a date");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_timezone_is_config_error() {
        let err = DateOptions::new()
            .timezone("Mars/Olympus_Mons")
            .resolve(anchor())
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid timezone: 'Mars/Olympus_Mons'");
    }

    #[test]
    fn test_bound_literals_with_short_years() {
        let resolved = DateOptions::new()
            .before("1/1/15")
            .after("January 2015")
            .resolve(anchor())
            .unwrap();
        let new_year = NaiveDate::from_ymd_opt(2015, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(resolved.bounds[0].1.wall_clock(), new_year);
        assert_eq!(resolved.bounds[1].1.wall_clock(), new_year);
    }

    #[test]
    fn test_out_of_range_instant_bound_is_config_error() {
        let err = DateOptions::new()
            .on_or_after(DateTime::<Utc>::MIN_UTC)
            .timezone("America/New_York")
            .resolve(anchor())
            .unwrap_err();
        assert!(
            matches!(err, ValidatorError::InvalidBound { option: "onOrAfter", .. }),
            "got: {err:?}"
        );
    }

    #[test]
    fn test_instant_bound() {
        let when = Utc.with_ymd_and_hms(2013, 2, 8, 9, 30, 26).unwrap();
        let resolved = DateOptions::new().on_or_before(when).resolve(anchor()).unwrap();
        assert_eq!(resolved.bounds[0].1.instant(), when);
    }
}
