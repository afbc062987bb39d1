//! Precision-aware comparison of a value against its bounds.

use std::fmt;

use serde::Serialize;

use crate::parse::ParsedDate;
use crate::precision::{Precision, WeekStartDay};

/// The relation a bound imposes on the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BoundKind {
    /// value < bound
    Before,
    /// value <= bound
    OnOrBefore,
    /// value > bound
    After,
    /// value >= bound
    OnOrAfter,
}

impl BoundKind {
    /// Evaluation order: the before-class bounds, then the after-class ones.
    pub const ORDER: [BoundKind; 4] = [
        BoundKind::Before,
        BoundKind::OnOrBefore,
        BoundKind::After,
        BoundKind::OnOrAfter,
    ];

    /// The option key this bound is configured under.
    pub fn option_name(&self) -> &'static str {
        match self {
            BoundKind::Before => "before",
            BoundKind::OnOrBefore => "onOrBefore",
            BoundKind::After => "after",
            BoundKind::OnOrAfter => "onOrAfter",
        }
    }

    /// Whether `value` satisfies this relation to `bound`.
    pub fn holds<T: Ord>(&self, value: &T, bound: &T) -> bool {
        match self {
            BoundKind::Before => value < bound,
            BoundKind::OnOrBefore => value <= bound,
            BoundKind::After => value > bound,
            BoundKind::OnOrAfter => value >= bound,
        }
    }
}

impl fmt::Display for BoundKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.option_name())
    }
}

/// The result of checking a value against its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict<'a> {
    Pass,
    /// The first bound that does not hold.
    Fail {
        kind: BoundKind,
        bound: &'a ParsedDate,
    },
}

/// Compare `value` with `bound` after truncating both to `precision`.
///
/// A side that cannot be truncated never satisfies the bound.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use chrono_tz::Tz;
/// use date_validator::{compare, BoundKind, ParsedDate, Precision, WeekStartDay};
///
/// let at = |h| ParsedDate::from_instant(Utc.with_ymd_and_hms(2015, 1, 1, h, 0, 0).unwrap(), Tz::UTC);
/// let bound = at(12).unwrap();
/// let value = at(8).unwrap();
///
/// assert!(compare(&value, &bound, BoundKind::Before, Precision::Second, WeekStartDay::Monday));
/// assert!(!compare(&value, &bound, BoundKind::Before, Precision::Day, WeekStartDay::Monday));
/// assert!(compare(&value, &bound, BoundKind::OnOrBefore, Precision::Day, WeekStartDay::Monday));
/// ```
pub fn compare(
    value: &ParsedDate,
    bound: &ParsedDate,
    kind: BoundKind,
    precision: Precision,
    week_start: WeekStartDay,
) -> bool {
    match (
        value.truncated(precision, week_start),
        bound.truncated(precision, week_start),
    ) {
        (Some(value), Some(bound)) => kind.holds(&value, &bound),
        _ => false,
    }
}

/// Check `value` against every bound in order and stop at the first failure.
///
/// Bounds are not checked for consistency with each other: a `before` that
/// lies earlier than an `after` simply rejects every value.
pub fn check_bounds<'a>(
    value: &ParsedDate,
    bounds: &'a [(BoundKind, ParsedDate)],
    precision: Precision,
    week_start: WeekStartDay,
) -> Verdict<'a> {
    bounds
        .iter()
        .find(|(kind, bound)| !compare(value, bound, *kind, precision, week_start))
        .map_or(Verdict::Pass, |(kind, bound)| Verdict::Fail { kind: *kind, bound })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use chrono_tz::Tz;

    fn at(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> ParsedDate {
        ParsedDate::from_instant(Utc.with_ymd_and_hms(y, m, d, h, mi, s).unwrap(), Tz::UTC).unwrap()
    }

    fn shifted(date: &ParsedDate, delta: Duration) -> ParsedDate {
        let instant: DateTime<Utc> = date.instant() + delta;
        ParsedDate::from_instant(instant, Tz::UTC).unwrap()
    }

    const MON: WeekStartDay = WeekStartDay::Monday;

    #[test]
    fn test_strict_and_inclusive_relations() {
        let bound = at(2015, 1, 1, 0, 0, 0);
        let earlier = at(2014, 1, 1, 0, 0, 0);
        let later = at(2016, 1, 1, 0, 0, 0);
        let p = Precision::Second;

        assert!(compare(&earlier, &bound, BoundKind::Before, p, MON));
        assert!(!compare(&bound, &bound, BoundKind::Before, p, MON));
        assert!(compare(&bound, &bound, BoundKind::OnOrBefore, p, MON));
        assert!(!compare(&later, &bound, BoundKind::OnOrBefore, p, MON));

        assert!(compare(&later, &bound, BoundKind::After, p, MON));
        assert!(!compare(&bound, &bound, BoundKind::After, p, MON));
        assert!(compare(&bound, &bound, BoundKind::OnOrAfter, p, MON));
        assert!(!compare(&earlier, &bound, BoundKind::OnOrAfter, p, MON));
    }

    #[test]
    fn test_day_precision_ignores_time_of_day() {
        let bound = at(2015, 6, 10, 12, 0, 0);
        let one_second_before = shifted(&bound, -Duration::seconds(1));
        let one_day_before = shifted(&bound, -Duration::days(1));

        assert!(compare(&one_second_before, &bound, BoundKind::OnOrAfter, Precision::Day, MON));
        assert!(!compare(&one_day_before, &bound, BoundKind::OnOrAfter, Precision::Day, MON));
    }

    #[test]
    fn test_second_precision_ignores_milliseconds() {
        let bound = at(2015, 6, 10, 12, 0, 0);
        let slightly_later = shifted(&bound, Duration::milliseconds(999));
        assert!(compare(&slightly_later, &bound, BoundKind::OnOrBefore, Precision::Second, MON));
        assert!(!compare(&slightly_later, &bound, BoundKind::After, Precision::Second, MON));
    }

    #[test]
    fn test_week_precision_depends_on_week_start() {
        // Sat Feb 9 2013 vs Sun Feb 10 2013
        let saturday = at(2013, 2, 9, 12, 0, 0);
        let sunday = at(2013, 2, 10, 12, 0, 0);

        // ISO weeks: same week.
        assert!(!compare(&saturday, &sunday, BoundKind::Before, Precision::Week, MON));
        // Sunday-start weeks: Sunday opens a new week.
        assert!(compare(&saturday, &sunday, BoundKind::Before, Precision::Week, WeekStartDay::Sunday));
    }

    #[test]
    fn test_month_and_year_precision() {
        let bound = at(2013, 2, 8, 9, 30, 26);
        let end_of_month = at(2013, 2, 28, 23, 59, 59);
        let next_month = at(2013, 3, 1, 0, 0, 0);
        let end_of_year = at(2013, 12, 31, 23, 59, 59);

        assert!(compare(&end_of_month, &bound, BoundKind::OnOrBefore, Precision::Month, MON));
        assert!(!compare(&next_month, &bound, BoundKind::OnOrBefore, Precision::Month, MON));
        assert!(compare(&end_of_year, &bound, BoundKind::OnOrBefore, Precision::Year, MON));
    }

    #[test]
    fn test_check_bounds_reports_first_failure() {
        let bounds = vec![
            (BoundKind::Before, at(2015, 1, 1, 0, 0, 0)),
            (BoundKind::After, at(2020, 1, 1, 0, 0, 0)),
        ];
        // Contradictory bounds: the before-class bound is reported first.
        let value = at(2016, 1, 1, 0, 0, 0);
        match check_bounds(&value, &bounds, Precision::Second, MON) {
            Verdict::Fail { kind, bound } => {
                assert_eq!(kind, BoundKind::Before);
                assert_eq!(bound, &bounds[0].1);
            }
            Verdict::Pass => panic!("expected failure"),
        }

        let value = at(2014, 1, 1, 0, 0, 0);
        assert!(matches!(
            check_bounds(&value, &bounds, Precision::Second, MON),
            Verdict::Fail { kind: BoundKind::After, .. }
        ));
    }

    #[test]
    fn test_check_bounds_range_pass() {
        let bounds = vec![
            (BoundKind::OnOrBefore, at(2015, 12, 31, 0, 0, 0)),
            (BoundKind::OnOrAfter, at(2015, 1, 1, 0, 0, 0)),
        ];
        let value = at(2015, 6, 15, 0, 0, 0);
        assert_eq!(check_bounds(&value, &bounds, Precision::Day, MON), Verdict::Pass);
        assert_eq!(check_bounds(&value, &[], Precision::Day, MON), Verdict::Pass);
    }

    #[test]
    fn test_option_names() {
        let names: Vec<_> = BoundKind::ORDER.iter().map(BoundKind::option_name).collect();
        assert_eq!(names, ["before", "onOrBefore", "after", "onOrAfter"]);
    }
}
