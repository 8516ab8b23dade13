//! `exports.*` checks: a non-empty `field` that resolves as a valid
//! reference, whose target's resolved type must agree with the declared
//! export type. Resolution is delegated to the substitution type checker
//! (C4) by converting the parsed reference into the equivalent
//! [`crate::model::substitution::SubstitutionKind`], so export fields and
//! `${...}` substitutions share one source of truth for "what type does
//! this reference resolve to".

use std::collections::HashSet;

use crate::diagnostics::Diagnostic;
use crate::errors::{ReasonCode, ValidationError};
use crate::grammar::{resolve_reference, ReferenceKind};
use crate::model::export::Export;
use crate::model::substitution::Substitution;
use crate::reference_chain::ReferenceChainCollector;
use crate::span::Range;

use super::{check_sub, substitution_kind_from_parsed, Registries};
use crate::cancellation::{CancellationToken, Cancelled};

fn err(message: impl Into<String>, range: Range) -> ValidationError {
    ValidationError::new(ReasonCode::InvalidExport, message).with_position(range.start)
}

fn all_reference_kinds() -> HashSet<ReferenceKind> {
    [
        ReferenceKind::Variable,
        ReferenceKind::Value,
        ReferenceKind::DataSource,
        ReferenceKind::Child,
        ReferenceKind::Resource,
    ]
    .into_iter()
    .collect()
}

/// Checks one `exports.NAME` entry.
pub fn check_export(
    name: &str,
    export: &Export,
    registries: &Registries<'_>,
    collector: &mut ReferenceChainCollector,
    cancellation: &CancellationToken,
) -> Result<(Vec<Diagnostic>, Option<ValidationError>), Cancelled> {
    let used_in = format!("exports.{name}");
    let own_range = export.source_meta.unwrap_or_else(Range::unknown);
    let mut diagnostics = Vec::new();
    let mut errors = Vec::new();

    if name.contains("${") {
        errors.push(err(
            format!("'${{..}} substitutions can not be used in export names, found in export \"{name}\"'"),
            own_range,
        ));
    }

    if export.field.is_empty() {
        errors.push(err("field can not be empty", own_range));
        return Ok((diagnostics, fold(errors)));
    }

    let parsed = match resolve_reference(&export.field, &all_reference_kinds(), Some(own_range.start)) {
        Ok(parsed) => parsed,
        Err(e) => {
            errors.push(e);
            return Ok((diagnostics, fold(errors)));
        }
    };

    let kind = substitution_kind_from_parsed(parsed);
    let sub = Substitution::new(kind, own_range);
    let outcome = check_sub(&sub, &used_in, "field", registries, collector, cancellation)?;
    diagnostics.extend(outcome.diagnostics);
    match outcome.error {
        Some(e) => errors.push(e),
        None if outcome.resolved_type == "any" => {
            diagnostics.push(Diagnostic::warning(
                format!(
                    "export \"{name}\" field could not be resolved to a concrete type, assuming it matches the declared type \"{}\"",
                    export.export_type.type_token()
                ),
                own_range,
            ));
        }
        None if outcome.resolved_type != export.export_type.type_token() => {
            errors.push(err(
                format!(
                    "export \"{name}\" declares type \"{}\" but field \"{}\" resolves to \"{}\"",
                    export.export_type.type_token(),
                    export.field,
                    outcome.resolved_type
                ),
                own_range,
            ));
        }
        None => {}
    }

    Ok((diagnostics, fold(errors)))
}

fn fold(errors: Vec<ValidationError>) -> Option<ValidationError> {
    match errors.len() {
        0 => None,
        1 => errors.into_iter().next(),
        _ => Some(ValidationError::aggregate(errors)),
    }
}
