//! Aggregation Harness (C8).
//!
//! Collects the independent diagnostics/errors of a fixed, ordered list of
//! sub-validators and folds them into the spec's `(diagnostics, error?)`
//! return shape. This is a "collecting, not short-circuiting" policy:
//! every sub-validator runs, in order, before the
//! harness looks at what came back.

use crate::diagnostics::{Diagnostic, Severity};
use crate::errors::{ReasonCode, ValidationError};

/// Runs a fixed, ordered sequence of independent sub-validators, each
/// returning its own diagnostics plus an optional error. Diagnostics from all
/// sub-validators are concatenated in invocation order. If more than one
/// sub-validator produced an error, they are wrapped as `child_errors` under
/// `target_reason`; if exactly one did, it is returned unwrapped (so a single
/// failure never grows an unnecessary aggregate layer).
pub type SubValidator<'a> = Box<dyn FnOnce() -> (Vec<Diagnostic>, Option<ValidationError>) + 'a>;

pub fn run_all(sub_validators: Vec<SubValidator<'_>>, target_reason: ReasonCode) -> (Vec<Diagnostic>, Option<ValidationError>) {
    let mut diagnostics = Vec::new();
    let mut errors = Vec::new();
    for sub in sub_validators {
        let (mut diags, error) = sub();
        diagnostics.append(&mut diags);
        if let Some(err) = error {
            errors.push(err);
        }
    }
    (diagnostics, fold_errors(errors, target_reason))
}

/// Folds zero, one, or many errors into the aggregate shape: none -> `None`,
/// one -> unwrapped, many -> wrapped under `target_reason`. `target_reason`
/// is only actually used when wrapping; a single error keeps its own reason.
fn fold_errors(mut errors: Vec<ValidationError>, target_reason: ReasonCode) -> Option<ValidationError> {
    match errors.len() {
        0 => None,
        1 => errors.pop(),
        _ => {
            let mut agg = ValidationError::aggregate(errors);
            // The aggregate's own reason is always `multiple_validation_errors`;
            // `target_reason` exists for callers that want to assert on why the
            // group of sub-validators was run (blueprint vs. element vs. field).
            let _ = target_reason;
            agg.reason_code = ReasonCode::MultipleValidationErrors;
            Some(agg)
        }
    }
}

/// Implements the partition contract: given a flat list of
/// diagnostics produced while validating one value (e.g. a mapping-node
/// subtree), split it into the diagnostics the caller should keep (warning
/// and info level) and the errors (error-level, re-wrapped under
/// `reason_code`). Returns `None` for the error half when no error-level
/// diagnostics were present.
pub fn partition_diagnostics(
    diagnostics: Vec<Diagnostic>,
    reason_code: ReasonCode,
) -> (Vec<Diagnostic>, Option<ValidationError>) {
    let mut kept = Vec::new();
    let mut error_diags = Vec::new();
    for diag in diagnostics {
        match diag.severity {
            Severity::Error => error_diags.push(diag),
            Severity::Warning | Severity::Info => kept.push(diag),
        }
    }

    if error_diags.is_empty() {
        return (kept, None);
    }

    let wrapped: Vec<ValidationError> = error_diags
        .into_iter()
        .map(|d| ValidationError::new(reason_code, d.message).with_position(d.range.start))
        .collect();

    let error = if wrapped.len() == 1 {
        wrapped.into_iter().next()
    } else {
        Some(ValidationError::aggregate(wrapped))
    };

    (kept, error)
}
