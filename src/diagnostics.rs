//! Non-fatal diagnostic channel (C1), separate from [`crate::errors::ValidationError`].
//!
//! Grounded on the teacher's `validation::grammar::ValidationResult`
//! (errors/warnings/suggestions accumulated independently) and on the
//! `dsl-core::diagnostics` pattern elsewhere in the pack (severity + message +
//! range). Diagnostics never halt validation and are never promoted to errors.

use serde::{Deserialize, Serialize};

use crate::span::Range;

/// Diagnostic severity. `Error`-level diagnostics exist only transiently,
/// inside sub-validators, before [`crate::aggregation::run_all`] re-wraps them
/// as [`crate::errors::ValidationError`]s (see the partition contract in
/// [`crate::aggregation`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// A single non-fatal (or pre-partition) observation with a source range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub range: Range,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>, range: Range) -> Self {
        Self {
            severity,
            message: message.into(),
            range,
        }
    }

    pub fn error(message: impl Into<String>, range: Range) -> Self {
        Self::new(Severity::Error, message, range)
    }

    pub fn warning(message: impl Into<String>, range: Range) -> Self {
        Self::new(Severity::Warning, message, range)
    }

    pub fn info(message: impl Into<String>, range: Range) -> Self {
        Self::new(Severity::Info, message, range)
    }

    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Position;

    #[test]
    fn constructors_set_expected_severity() {
        let r = Range::from_start_only(Position::unknown());
        assert!(Diagnostic::error("x", r).is_error());
        assert!(!Diagnostic::warning("x", r).is_error());
        assert!(!Diagnostic::info("x", r).is_error());
    }
}
