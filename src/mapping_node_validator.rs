//! Mapping-Node Validator (C5): a generic, depth-limited tree validator for
//! the free-form fields (resource `metadata.custom`, include `variables`,
//! data-source `exports`, ...) that aren't constrained by a typed schema.

use crate::diagnostics::Diagnostic;
use crate::errors::{ReasonCode, ValidationError};
use crate::model::mapping_node::{MappingNode, MappingNodeKind, StringSegment, MAPPING_NODE_MAX_DEPTH};
use crate::span::Range;
use crate::type_checker::{check_substitution, TypeCheckContext};
use crate::cancellation::Cancelled;

pub struct MappingNodeOutcome {
    pub diagnostics: Vec<Diagnostic>,
    pub error: Option<ValidationError>,
}

fn range_or_unknown(node: &MappingNode) -> Range {
    node.source_meta.unwrap_or_else(Range::unknown)
}

/// Validates `node`, type-checking every embedded substitution via C4 and
/// recursing into fields/items without short-circuiting.
pub fn validate_mapping_node(
    node: &MappingNode,
    nullable: bool,
    ctx: &mut TypeCheckContext<'_>,
) -> Result<MappingNodeOutcome, Cancelled> {
    validate_at_depth(node, nullable, 0, ctx)
}

fn validate_at_depth(
    node: &MappingNode,
    nullable: bool,
    depth: usize,
    ctx: &mut TypeCheckContext<'_>,
) -> Result<MappingNodeOutcome, Cancelled> {
    if depth > MAPPING_NODE_MAX_DEPTH {
        return Ok(MappingNodeOutcome {
            diagnostics: vec![Diagnostic::info(
                format!("mapping node exceeds the maximum traversal depth of {MAPPING_NODE_MAX_DEPTH}, stopping descent"),
                range_or_unknown(node),
            )],
            error: None,
        });
    }

    let mut diagnostics = Vec::new();
    let mut errors = Vec::new();

    match &node.kind {
        MappingNodeKind::Empty => {
            if !nullable {
                errors.push(ValidationError::new(
                    ReasonCode::InvalidMappingNode,
                    "an empty value is not permitted here",
                )
                .with_position(range_or_unknown(node).start));
            }
        }
        MappingNodeKind::Scalar(_) => {}
        MappingNodeKind::StringWithSubstitutions(segments) => {
            for segment in segments {
                if let StringSegment::Substitution(sub) = segment {
                    let outcome = check_substitution(sub, ctx)?;
                    diagnostics.extend(outcome.diagnostics);
                    if let Some(e) = outcome.error {
                        errors.push(e);
                    }
                }
            }
        }
        MappingNodeKind::Fields(fields) => {
            for field in fields.values() {
                let child = validate_at_depth(&field.value, true, depth + 1, ctx)?;
                diagnostics.extend(child.diagnostics);
                if let Some(e) = child.error {
                    errors.push(e);
                }
            }
        }
        MappingNodeKind::Items(items) => {
            for item in items {
                let child = validate_at_depth(&item.value, true, depth + 1, ctx)?;
                diagnostics.extend(child.diagnostics);
                if let Some(e) = child.error {
                    errors.push(e);
                }
            }
        }
    }

    let error = match errors.len() {
        0 => None,
        1 => errors.into_iter().next(),
        _ => Some(ValidationError::aggregate(errors)),
    };
    Ok(MappingNodeOutcome { diagnostics, error })
}
