//! Transform-list checks: empty names and substitutions are errors; names
//! outside the configured core-transform set are a warning, not an error.

use crate::diagnostics::Diagnostic;
use crate::errors::ValidationError;
use crate::model::blueprint::TransformEntry;
use crate::span::Range;

use super::Registries;
use crate::errors::ReasonCode;

fn entry_range(entry: &TransformEntry) -> Range {
    entry.source_meta.unwrap_or_else(Range::unknown)
}

/// Runs the transform-list checks, or is skipped entirely when the host
/// configured `blueprint_will_be_transformed` (an upstream step owns this
/// list's final shape before the validator ever sees it).
pub fn check_transforms(registries: &Registries<'_>) -> (Vec<Diagnostic>, Option<ValidationError>) {
    if registries.config.blueprint_will_be_transformed {
        return (Vec::new(), None);
    }

    let mut diagnostics = Vec::new();
    let mut errors = Vec::new();

    for entry in &registries.blueprint.transform {
        if entry.name.is_empty() {
            errors.push(
                ValidationError::new(ReasonCode::InvalidResource, "a transform name can not be empty")
                    .with_position(entry_range(entry).start),
            );
            continue;
        }
        if entry.name.contains("${") {
            errors.push(
                ValidationError::new(
                    ReasonCode::InvalidResource,
                    format!("transform \"{}\" can not contain a substitution", entry.name),
                )
                .with_position(entry_range(entry).start),
            );
            continue;
        }
        if !registries.config.core_transforms.contains(&entry.name) {
            diagnostics.push(Diagnostic::warning(
                format!("transform \"{}\" is not in the configured core transform set", entry.name),
                entry_range(entry),
            ));
        }
    }

    let error = match errors.len() {
        0 => None,
        1 => errors.into_iter().next(),
        _ => Some(ValidationError::aggregate(errors)),
    };
    (diagnostics, error)
}
