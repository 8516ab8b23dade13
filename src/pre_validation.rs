//! Pre-Validation (C9): a single pass over a mapping-node tree, run before the
//! mapping-node validator (C5), that rejects substitutions used as map keys.
//! Map keys are matched structurally at parse time, so a substitution there
//! can never resolve to anything — it's caught here rather than silently
//! treated as a literal key string.

use crate::errors::{ReasonCode, ValidationError};
use crate::model::mapping_node::{MappingNode, MappingNodeKind, MAPPING_NODE_MAX_DEPTH};
use crate::span::Range;

/// A field key recorded with its own source position, so `invalid_map_key`
/// can point at the key rather than at the field's value.
pub struct KeyWithPosition<'a> {
    pub key: &'a str,
    pub position: Option<Range>,
}

/// Returns the keys that contain a `${...}` substitution. Real blueprint
/// source can't produce these today (keys are plain YAML/JSON scalars), but
/// an upstream transform step could synthesize one; this pass exists so that
/// case fails with a clear reason rather than being swallowed as a literal.
pub fn find_substitution_keys(node: &MappingNode) -> Vec<String> {
    let mut found = Vec::new();
    walk(node, 0, &mut found);
    found
}

fn walk(node: &MappingNode, depth: usize, found: &mut Vec<String>) {
    if depth > MAPPING_NODE_MAX_DEPTH {
        return;
    }
    match &node.kind {
        MappingNodeKind::Fields(fields) => {
            for (key, field) in fields.iter() {
                if key.contains("${") {
                    found.push(key.clone());
                }
                walk(&field.value, depth + 1, found);
            }
        }
        MappingNodeKind::Items(items) => {
            for item in items {
                walk(&item.value, depth + 1, found);
            }
        }
        MappingNodeKind::Empty | MappingNodeKind::Scalar(_) | MappingNodeKind::StringWithSubstitutions(_) => {}
    }
}

/// Runs the pre-validation pass, returning an error naming every offending
/// key (collected, not short-circuited on the first).
pub fn pre_validate(node: &MappingNode) -> Result<(), ValidationError> {
    let keys = find_substitution_keys(node);
    if keys.is_empty() {
        return Ok(());
    }
    let errors: Vec<ValidationError> = keys
        .into_iter()
        .map(|key| {
            ValidationError::new(
                ReasonCode::InvalidMapKey,
                format!("map key \"{key}\" contains a substitution, which is not permitted in a key position"),
            )
        })
        .collect();
    Err(if errors.len() == 1 {
        errors.into_iter().next().unwrap()
    } else {
        ValidationError::aggregate(errors)
    })
}
