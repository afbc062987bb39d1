//! The validation entry points.
//!
//! Each call runs the same pipeline:
//!
//! 1. **Blank check**: with `allowBlank`, a blank value is valid.
//! 2. **Resolve**: options are resolved against the clock's current instant.
//! 3. **Parse**: the value is parsed (strictly if `format` is set).
//! 4. **Compare**: the value is checked against each bound in order.
//! 5. **Report**: the first failure becomes the returned message.
//!
//! Misconfiguration surfaces as `Err(ValidatorError)`. A value that fails
//! validation is `Ok(Outcome::Invalid(..))`.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::clock::{Clock, SystemClock};
use crate::compare::{check_bounds, Verdict};
use crate::error::Result;
use crate::options::{DateOptions, ResolvedOptions};
use crate::parse::parse_value;
use crate::report::Failure;
use crate::value::DateInput;

// ── Outcome ─────────────────────────────────────────────────────────────────

/// The result of validating one value.
///
/// Serializes as `true` when valid and as the message string otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Valid,
    Invalid(Failure),
}

impl Outcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, Outcome::Valid)
    }

    /// The failure message, if the value was rejected.
    pub fn message(&self) -> Option<&str> {
        self.failure().map(|f| f.message.as_str())
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Outcome::Valid => None,
            Outcome::Invalid(failure) => Some(failure),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Valid => f.write_str("true"),
            Outcome::Invalid(failure) => f.write_str(&failure.message),
        }
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Outcome::Valid => serializer.serialize_bool(true),
            Outcome::Invalid(failure) => serializer.serialize_str(&failure.message),
        }
    }
}

// ── Context ─────────────────────────────────────────────────────────────────

/// Caller-side hook handed each failure before it is returned.
///
/// The validator never inspects the context; it only forwards failures to it.
/// `()` is a context that ignores them.
pub trait ValidationContext {
    fn on_failure(&mut self, _failure: &Failure) {}
}

impl ValidationContext for () {}

impl ValidationContext for Vec<Failure> {
    fn on_failure(&mut self, failure: &Failure) {
        self.push(failure.clone());
    }
}

// ── Entry points ────────────────────────────────────────────────────────────

/// Validate `value` against `options`, reading "now" from the system clock.
///
/// # Examples
///
/// ```
/// use date_validator::{validate_date, DateOptions};
///
/// let options = DateOptions::new().before("1/1/2015");
/// let outcome = validate_date(&mut (), "1/1/2016", &options).unwrap();
/// assert_eq!(outcome.message(), Some("This field must be before Jan 1st, 2015"));
///
/// let outcome = validate_date(&mut (), "1/1/2014", &options).unwrap();
/// assert!(outcome.is_valid());
/// ```
///
/// # Errors
///
/// Returns a [`ValidatorError`](crate::ValidatorError) when the options are
/// misconfigured (unknown timezone, unparseable bound).
pub fn validate_date<C>(
    context: &mut C,
    value: impl Into<DateInput>,
    options: &DateOptions,
) -> Result<Outcome>
where
    C: ValidationContext + ?Sized,
{
    validate_date_with_clock(context, value, options, &SystemClock)
}

/// Validate `value` against `options`, reading "now" from `clock`.
pub fn validate_date_with_clock<C>(
    context: &mut C,
    value: impl Into<DateInput>,
    options: &DateOptions,
    clock: &dyn Clock,
) -> Result<Outcome>
where
    C: ValidationContext + ?Sized,
{
    let value = value.into();

    if options.allow_blank && value.is_blank() {
        tracing::trace!("blank value allowed");
        return Ok(Outcome::Valid);
    }

    let resolved = options.resolve(clock.now())?;
    let outcome = evaluate(&value, &resolved);

    if let Outcome::Invalid(failure) = &outcome {
        tracing::debug!(kind = %failure.kind, message = %failure.message, "date rejected");
        context.on_failure(failure);
    }

    Ok(outcome)
}

/// Parse, compare, report.
fn evaluate(value: &DateInput, resolved: &ResolvedOptions) -> Outcome {
    let format = resolved.format.as_ref();
    let Some(parsed) = parse_value(value, format, resolved.tz, resolved.now) else {
        return Outcome::Invalid(match format {
            Some(template) => Failure::invalid_format(template),
            None => Failure::invalid_date(),
        });
    };

    match check_bounds(&parsed, &resolved.bounds, resolved.precision, resolved.week_start) {
        Verdict::Pass => Outcome::Valid,
        Verdict::Fail { kind, bound } => {
            Outcome::Invalid(Failure::bound(kind, bound, &resolved.error_format))
        }
    }
}

// ── DateValidator ───────────────────────────────────────────────────────────

/// Options and a clock bundled for repeated use.
///
/// Construction checks the configuration once so that mistakes surface
/// early. `"now"` is still read from the clock on every call.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use date_validator::{DateOptions, DateValidator, FixedClock};
///
/// let clock = FixedClock::new(Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap());
/// let validator = DateValidator::with_clock(DateOptions::new().after("now"), clock).unwrap();
///
/// assert!(validator.validate("1/1/3015").unwrap().is_valid());
/// assert_eq!(
///     validator.validate("1/1/2014").unwrap().message(),
///     Some("This field must be after Oct 16th, 2026")
/// );
/// ```
#[derive(Debug, Clone)]
pub struct DateValidator<C = SystemClock> {
    options: DateOptions,
    clock: C,
}

impl DateValidator<SystemClock> {
    /// A validator reading the system clock.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidatorError`](crate::ValidatorError) if the options
    /// cannot be resolved.
    pub fn new(options: DateOptions) -> Result<Self> {
        Self::with_clock(options, SystemClock)
    }
}

impl<C: Clock> DateValidator<C> {
    /// A validator reading `clock`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidatorError`](crate::ValidatorError) if the options
    /// cannot be resolved.
    pub fn with_clock(options: DateOptions, clock: C) -> Result<Self> {
        options.resolve(clock.now())?;
        Ok(Self { options, clock })
    }

    pub fn options(&self) -> &DateOptions {
        &self.options
    }

    pub fn validate(&self, value: impl Into<DateInput>) -> Result<Outcome> {
        self.validate_in(&mut (), value)
    }

    /// Validate, forwarding any failure to `context`.
    pub fn validate_in<X>(&self, context: &mut X, value: impl Into<DateInput>) -> Result<Outcome>
    where
        X: ValidationContext + ?Sized,
    {
        validate_date_with_clock(context, value, &self.options, &self.clock)
    }
}
