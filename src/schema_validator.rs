//! Resource-Spec Schema Validator (C6): checks a `MappingNode` against a
//! provider-published `SchemaNode` tree. Constraint checks run in a fixed
//! order (allowed values, pattern, minimum, maximum, min/max length,
//! provider validate hook) so messages are deterministic when a value
//! violates more than one constraint at once.

use regex::Regex;

use crate::cancellation::Cancelled;
use crate::diagnostics::Diagnostic;
use crate::errors::{ReasonCode, ValidationError};
use crate::model::mapping_node::{MappingNode, MappingNodeKind};
use crate::model::scalar::Scalar;
use crate::numeric::pluralize;
use crate::registries::{ResourceRegistry, ScalarConstraints, SchemaNode};
use crate::span::Range;
use crate::type_checker::{check_substitution, TypeCheckContext};

pub struct SchemaCheckOutcome {
    pub diagnostics: Vec<Diagnostic>,
    pub error: Option<ValidationError>,
}

fn range_or_unknown(node: &MappingNode) -> Range {
    node.source_meta.unwrap_or_else(Range::unknown)
}

fn err(code: ReasonCode, message: impl Into<String>, node: &MappingNode) -> ValidationError {
    ValidationError::new(code, message).with_position(range_or_unknown(node).start)
}

/// Type-checks every substitution embedded directly in `node` via C4,
/// regardless of whether the node's schema constraints end up deferred.
/// This is what lets a dangling/self/cyclic reference buried in a
/// substitution-bearing spec field still be caught, and its edge still
/// collected, even though the constraint check for that field can't run
/// until the substitution resolves.
fn dispatch_substitutions(
    node: &MappingNode,
    ctx: &mut TypeCheckContext<'_>,
    diagnostics: &mut Vec<Diagnostic>,
    errors: &mut Vec<ValidationError>,
) -> Result<(), Cancelled> {
    for sub in node.all_substitutions() {
        let outcome = check_substitution(sub, ctx)?;
        diagnostics.extend(outcome.diagnostics);
        if let Some(e) = outcome.error {
            errors.push(e);
        }
    }
    Ok(())
}

/// Validates `node` against `schema`, deferring constraint checks on any
/// subtree that still contains an unresolved substitution (a warning is
/// emitted instead, since the constraint can't be evaluated until the
/// substitution resolves) — but every embedded substitution is still
/// dispatched through C4 first, so reference errors and reference-chain
/// edges are never excused by the deferral.
pub fn validate_against_schema(
    node: &MappingNode,
    schema: &SchemaNode,
    resource_type: &str,
    ctx: &mut TypeCheckContext<'_>,
) -> Result<SchemaCheckOutcome, Cancelled> {
    let mut diagnostics = Vec::new();
    let mut errors = Vec::new();

    check_node(node, schema, ctx, &mut diagnostics, &mut errors)?;

    ctx.cancellation.check()?;
    match ctx.resources.custom_validate(resource_type, node, ctx.cancellation) {
        Ok((custom_diags, custom_error)) => {
            diagnostics.extend(custom_diags);
            if let Some(e) = custom_error {
                errors.push(e);
            }
        }
        Err(e) => errors.push(e),
    }

    let error = match errors.len() {
        0 => None,
        1 => errors.into_iter().next(),
        _ => Some(ValidationError::aggregate(errors)),
    };
    Ok(SchemaCheckOutcome { diagnostics, error })
}

fn check_node(
    node: &MappingNode,
    schema: &SchemaNode,
    ctx: &mut TypeCheckContext<'_>,
    diagnostics: &mut Vec<Diagnostic>,
    errors: &mut Vec<ValidationError>,
) -> Result<(), Cancelled> {
    if schema.is_computed() && !node.is_empty() {
        errors.push(err(
            ReasonCode::ComputedFieldInBlueprint,
            "this field is computed by the provider and must not be set in the blueprint",
            node,
        ));
        return Ok(());
    }

    if node.is_empty() {
        if !schema.is_nullable() {
            errors.push(err(ReasonCode::InvalidResource, "a required field is missing or null", node));
        }
        return Ok(());
    }

    let is_scalar_schema = matches!(
        schema,
        SchemaNode::String(_) | SchemaNode::Integer(_) | SchemaNode::Float(_) | SchemaNode::Boolean(_)
    );
    if node.contains_substitution() && !is_scalar_schema {
        dispatch_substitutions(node, ctx, diagnostics, errors)?;
        diagnostics.push(Diagnostic::warning(
            "this field contains a substitution; its value can't be checked against the schema until it resolves",
            range_or_unknown(node),
        ));
        return Ok(());
    }

    match schema {
        SchemaNode::Object { attributes, required, .. } => check_object(node, attributes, required, ctx, diagnostics, errors)?,
        SchemaNode::Map { map_values, .. } => check_map(node, map_values, ctx, diagnostics, errors)?,
        SchemaNode::Array { items, min_length, max_length, .. } => {
            check_array(node, items, *min_length, *max_length, ctx, diagnostics, errors)?
        }
        SchemaNode::String(c) => check_scalar(node, c, "string", ctx, diagnostics, errors)?,
        SchemaNode::Integer(c) => check_scalar(node, c, "integer", ctx, diagnostics, errors)?,
        SchemaNode::Float(c) => check_scalar(node, c, "float", ctx, diagnostics, errors)?,
        SchemaNode::Boolean(c) => check_scalar(node, c, "boolean", ctx, diagnostics, errors)?,
        SchemaNode::Union { one_of, .. } => check_union(node, one_of, ctx, diagnostics, errors)?,
    }
    Ok(())
}

fn check_object(
    node: &MappingNode,
    attributes: &im::HashMap<String, SchemaNode>,
    required: &[String],
    ctx: &mut TypeCheckContext<'_>,
    diagnostics: &mut Vec<Diagnostic>,
    errors: &mut Vec<ValidationError>,
) -> Result<(), Cancelled> {
    let MappingNodeKind::Fields(fields) = &node.kind else {
        errors.push(err(ReasonCode::InvalidResource, "expected an object", node));
        return Ok(());
    };

    for name in required {
        if !fields.contains_key(name) {
            errors.push(err(
                ReasonCode::InvalidResource,
                format!("missing required field \"{name}\""),
                node,
            ));
        }
    }

    for (name, field) in fields.iter() {
        match attributes.get(name) {
            Some(child_schema) => check_node(&field.value, child_schema, ctx, diagnostics, errors)?,
            None => errors.push(err(
                ReasonCode::InvalidResource,
                format!("\"{name}\" is not a recognized field"),
                &field.value,
            )),
        }
    }
    Ok(())
}

fn check_map(
    node: &MappingNode,
    map_values: &SchemaNode,
    ctx: &mut TypeCheckContext<'_>,
    diagnostics: &mut Vec<Diagnostic>,
    errors: &mut Vec<ValidationError>,
) -> Result<(), Cancelled> {
    let MappingNodeKind::Fields(fields) = &node.kind else {
        errors.push(err(ReasonCode::InvalidResource, "expected a map", node));
        return Ok(());
    };
    for field in fields.values() {
        check_node(&field.value, map_values, ctx, diagnostics, errors)?;
    }
    Ok(())
}

fn check_array(
    node: &MappingNode,
    items: &SchemaNode,
    min_length: Option<u64>,
    max_length: Option<u64>,
    ctx: &mut TypeCheckContext<'_>,
    diagnostics: &mut Vec<Diagnostic>,
    errors: &mut Vec<ValidationError>,
) -> Result<(), Cancelled> {
    let MappingNodeKind::Items(elements) = &node.kind else {
        errors.push(err(ReasonCode::InvalidResource, "expected an array", node));
        return Ok(());
    };
    if let Some(min) = min_length {
        if (elements.len() as u64) < min {
            errors.push(err(
                ReasonCode::InvalidResource,
                format!("expected at least {} but found {}", pluralize(min as usize, "item"), elements.len()),
                node,
            ));
        }
    }
    if let Some(max) = max_length {
        if (elements.len() as u64) > max {
            errors.push(err(
                ReasonCode::InvalidResource,
                format!("expected at most {} but found {}", pluralize(max as usize, "item"), elements.len()),
                node,
            ));
        }
    }
    for item in elements {
        check_node(&item.value, items, ctx, diagnostics, errors)?;
    }
    Ok(())
}

fn check_union(
    node: &MappingNode,
    one_of: &[SchemaNode],
    ctx: &mut TypeCheckContext<'_>,
    diagnostics: &mut Vec<Diagnostic>,
    errors: &mut Vec<ValidationError>,
) -> Result<(), Cancelled> {
    for candidate in one_of {
        let mut branch_diags = Vec::new();
        let mut branch_errors = Vec::new();
        check_node(node, candidate, ctx, &mut branch_diags, &mut branch_errors)?;
        if branch_errors.is_empty() {
            diagnostics.extend(branch_diags);
            return Ok(());
        }
    }
    let tokens: Vec<&str> = one_of.iter().map(|s| s.type_token()).collect();
    errors.push(err(
        ReasonCode::InvalidResource,
        format!("value does not match any of the allowed types: {}", tokens.join(", ")),
        node,
    ));
    Ok(())
}

fn check_scalar(
    node: &MappingNode,
    constraints: &ScalarConstraints,
    expected: &str,
    ctx: &mut TypeCheckContext<'_>,
    diagnostics: &mut Vec<Diagnostic>,
    errors: &mut Vec<ValidationError>,
) -> Result<(), Cancelled> {
    if node.contains_substitution() {
        dispatch_substitutions(node, ctx, diagnostics, errors)?;
        match &constraints.allowed_values {
            Some(allowed) => diagnostics.push(Diagnostic::warning(
                format!(
                    "this field contains substitutions and can not be validated against the allowed values: {}",
                    allowed.iter().map(Scalar::canonical_string).collect::<Vec<_>>().join(", ")
                ),
                range_or_unknown(node),
            )),
            None => diagnostics.push(Diagnostic::warning(
                "this field contains a substitution; its value can't be checked against the schema until it resolves",
                range_or_unknown(node),
            )),
        }
        return Ok(());
    }

    let MappingNodeKind::Scalar(scalar) = &node.kind else {
        errors.push(err(ReasonCode::InvalidResource, format!("expected a {expected}"), node));
        return Ok(());
    };
    if scalar.type_token() != expected && !(expected == "float" && scalar.type_token() == "integer") {
        errors.push(err(
            ReasonCode::InvalidResource,
            format!("expected a {expected} but found a {}", scalar.type_token()),
            node,
        ));
        return Ok(());
    }

    if let Some(allowed) = &constraints.allowed_values {
        if !allowed.contains(scalar) {
            errors.push(err(
                ReasonCode::InvalidResource,
                format!(
                    "value \"{}\" is not one of the allowed values: {}",
                    scalar.canonical_string(),
                    allowed.iter().map(Scalar::canonical_string).collect::<Vec<_>>().join(", ")
                ),
                node,
            ));
        }
    }

    if let Some(pattern) = &constraints.pattern {
        if let Scalar::String(s) = scalar {
            match Regex::new(pattern) {
                Ok(re) if !re.is_match(s) => {
                    errors.push(err(ReasonCode::InvalidResource, format!("value \"{s}\" does not match pattern {pattern}"), node));
                }
                Err(_) => {
                    diagnostics.push(Diagnostic::warning(format!("provider pattern \"{pattern}\" is not a valid regular expression"), range_or_unknown(node)));
                }
                _ => {}
            }
        }
    }

    let numeric_value = match scalar {
        Scalar::Integer(i) => Some(*i as f64),
        Scalar::Float(f) => Some(*f),
        _ => None,
    };
    if let Some(value) = numeric_value {
        if let Some(min) = constraints.minimum {
            if value < min {
                errors.push(err(ReasonCode::InvalidResource, format!("value {} is below the minimum of {min}", scalar.canonical_string()), node));
            }
        }
        if let Some(max) = constraints.maximum {
            if value > max {
                errors.push(err(ReasonCode::InvalidResource, format!("value {} is above the maximum of {max}", scalar.canonical_string()), node));
            }
        }
    }

    if let Scalar::String(s) = scalar {
        let length = s.chars().count() as u64;
        if let Some(min) = constraints.min_length {
            if length < min {
                errors.push(err(
                    ReasonCode::InvalidResource,
                    format!("expected at least {} but found {}", pluralize(min as usize, "character"), pluralize(length as usize, "character")),
                    node,
                ));
            }
        }
        if let Some(max) = constraints.max_length {
            if length > max {
                errors.push(err(
                    ReasonCode::InvalidResource,
                    format!("expected at most {} but found {}", pluralize(max as usize, "character"), pluralize(length as usize, "character")),
                    node,
                ));
            }
        }
    }

    if let Some(hook) = &constraints.validate_func {
        diagnostics.push(Diagnostic::info(format!("deferred to provider validation hook \"{hook}\""), range_or_unknown(node)));
    }
    Ok(())
}
