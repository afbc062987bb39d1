//! Error types for date-validator configuration.
//!
//! These are raised only when the validator itself is misconfigured. A value
//! that fails validation is not an error; it is reported through
//! [`Outcome::Invalid`](crate::Outcome::Invalid).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidatorError {
    #[error("Invalid precision: {0}")]
    InvalidPrecision(String),

    #[error("Invalid week start: {0}")]
    InvalidWeekStart(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid bound `{option}`: {value}")]
    InvalidBound { option: &'static str, value: String },

    #[error("Invalid options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ValidatorError>;
