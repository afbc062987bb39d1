//! Failure messages.

use std::fmt;

use serde::Serialize;

use crate::compare::BoundKind;
use crate::parse::ParsedDate;
use crate::template::Template;

/// Why a value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    /// Not a date at all.
    InvalidDate,
    /// A string that does not match the configured `format`.
    InvalidFormat,
    Before,
    OnOrBefore,
    After,
    OnOrAfter,
}

impl From<BoundKind> for FailureKind {
    fn from(kind: BoundKind) -> Self {
        match kind {
            BoundKind::Before => FailureKind::Before,
            BoundKind::OnOrBefore => FailureKind::OnOrBefore,
            BoundKind::After => FailureKind::After,
            BoundKind::OnOrAfter => FailureKind::OnOrAfter,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureKind::InvalidDate => "invalidDate",
            FailureKind::InvalidFormat => "invalidFormat",
            FailureKind::Before => "before",
            FailureKind::OnOrBefore => "onOrBefore",
            FailureKind::After => "after",
            FailureKind::OnOrAfter => "onOrAfter",
        })
    }
}

/// A rejected value: what went wrong and the message to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub kind: FailureKind,
    /// The rendered boundary date, or the expected format for
    /// [`FailureKind::InvalidFormat`]. Absent for [`FailureKind::InvalidDate`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub message: String,
}

impl Failure {
    pub fn invalid_date() -> Self {
        Self::new(FailureKind::InvalidDate, None)
    }

    pub fn invalid_format(format: &Template) -> Self {
        Self::new(FailureKind::InvalidFormat, Some(format.as_str().to_string()))
    }

    /// A bound violation, with the boundary rendered through `error_format`.
    pub fn bound(kind: BoundKind, boundary: &ParsedDate, error_format: &Template) -> Self {
        Self::new(kind.into(), Some(render_boundary(boundary, error_format)))
    }

    fn new(kind: FailureKind, label: Option<String>) -> Self {
        let message = message(kind, label.as_deref().unwrap_or_default());
        Self {
            kind,
            label,
            message,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Render a boundary date for a message.
pub fn render_boundary(boundary: &ParsedDate, error_format: &Template) -> String {
    error_format.render(boundary.datetime())
}

/// The message text for `kind`, with `label` (boundary date or format)
/// substituted where the template calls for it.
pub fn message(kind: FailureKind, label: &str) -> String {
    match kind {
        FailureKind::InvalidDate => "This field must be a valid date".to_string(),
        FailureKind::InvalidFormat => format!("This field must be in the format of {label}"),
        FailureKind::Before => format!("This field must be before {label}"),
        FailureKind::OnOrBefore => format!("This field must be on or before {label}"),
        FailureKind::After => format!("This field must be after {label}"),
        FailureKind::OnOrAfter => format!("This field must be on or after {label}"),
    }
}
