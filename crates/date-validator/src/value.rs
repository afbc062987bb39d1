//! The value under validation.

use chrono::{DateTime, TimeZone, Utc};

/// A candidate value: nothing, a string, or an instant.
///
/// Callers convert whatever they hold into one of these once, at the entry
/// point; everything downstream handles a single representation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DateInput {
    /// No value was supplied.
    #[default]
    Absent,
    /// A string to be parsed.
    Text(String),
    /// An already-typed point in time.
    Instant(DateTime<Utc>),
}

impl DateInput {
    /// Absent, empty, or whitespace-only.
    pub fn is_blank(&self) -> bool {
        match self {
            DateInput::Absent => true,
            DateInput::Text(text) => text.trim().is_empty(),
            DateInput::Instant(_) => false,
        }
    }
}

impl From<&str> for DateInput {
    fn from(s: &str) -> Self {
        DateInput::Text(s.to_string())
    }
}

impl From<String> for DateInput {
    fn from(s: String) -> Self {
        DateInput::Text(s)
    }
}

impl<T: TimeZone> From<DateTime<T>> for DateInput {
    fn from(dt: DateTime<T>) -> Self {
        DateInput::Instant(dt.with_timezone(&Utc))
    }
}

impl<T: Into<DateInput>> From<Option<T>> for DateInput {
    fn from(value: Option<T>) -> Self {
        value.map_or(DateInput::Absent, Into::into)
    }
}
