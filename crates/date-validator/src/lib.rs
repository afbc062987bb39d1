//! # date-validator
//!
//! Single-field date validation.
//!
//! A candidate value (a string, an instant, or nothing) is parsed into a
//! date and checked against up to four optional bounds (`before`,
//! `onOrBefore`, `after`, `onOrAfter`) at a configurable precision. The
//! result is either valid or a human-readable message such as
//! `This field must be before Jan 1st, 2015`.
//!
//! ## Modules
//!
//! - [`options`] — configuration and its per-call resolution
//! - [`parse`] — strict and permissive parsing of values and bound literals
//! - [`template`] — `YYYY-MM-DD`-style format templates, for parsing and rendering
//! - [`precision`] — truncation to second, minute, hour, day, week, month or year
//! - [`compare`] — precision-aware bound checks
//! - [`report`] — failure kinds and message text
//! - [`validator`] — the entry points
//! - [`clock`] — the source of "now"
//! - [`value`] — the value under validation
//! - [`error`] — configuration errors

pub mod clock;
pub mod compare;
pub mod error;
pub mod options;
pub mod parse;
pub mod precision;
pub mod report;
pub mod template;
pub mod validator;
pub mod value;

pub use clock::{Clock, FixedClock, SystemClock};
pub use compare::{check_bounds, compare, BoundKind, Verdict};
pub use error::{Result, ValidatorError};
pub use options::{Bound, DateOptions, ResolvedOptions};
pub use parse::{parse_value, ParsedDate};
pub use precision::{truncate, Precision, WeekStartDay};
pub use report::{render_boundary, Failure, FailureKind};
pub use template::{Template, DEFAULT_ERROR_FORMAT};
pub use validator::{validate_date, validate_date_with_clock, DateValidator, Outcome, ValidationContext};
pub use value::DateInput;
