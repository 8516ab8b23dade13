//! `values.*` checks: declared type presence, description primitivity, and
//! agreement between the declared type and the `value` field's actual shape.

use crate::diagnostics::Diagnostic;
use crate::errors::{ReasonCode, ValidationError};
use crate::model::mapping_node::{MappingNode, MappingNodeKind, StringSegment};
use crate::model::value::{Value, ValueType};
use crate::reference_chain::ReferenceChainCollector;
use crate::span::Range;

use super::{check_sub, is_primitive_token, range_or_unknown, Registries};
use crate::cancellation::{CancellationToken, Cancelled};
use crate::reference_chain::element_id;
use crate::grammar::ReferenceKind;

fn err(message: impl Into<String>, node: &MappingNode) -> ValidationError {
    ValidationError::new(ReasonCode::InvalidValue, message).with_position(range_or_unknown(node).start)
}

/// Checks one `values.NAME` entry.
pub fn check_value(
    name: &str,
    value: &Value,
    registries: &Registries<'_>,
    collector: &mut ReferenceChainCollector,
    cancellation: &CancellationToken,
) -> Result<(Vec<Diagnostic>, Option<ValidationError>), Cancelled> {
    let used_in = element_id(ReferenceKind::Value, name);
    let mut diagnostics = Vec::new();
    let mut errors = Vec::new();

    if name.contains("${") {
        errors.push(ValidationError::new(
            ReasonCode::InvalidValue,
            format!("'${{..}} substitutions can not be used in value names, found in value \"{name}\"'"),
        ));
    }

    let Some(declared_type) = value.value_type else {
        errors.push(ValidationError::new(ReasonCode::InvalidValueType, format!("value \"{name}\" must declare a type")));
        let error = fold(errors);
        return Ok((diagnostics, error));
    };

    if let Some(description) = &value.description {
        for sub in description.all_substitutions() {
            let outcome = check_sub(sub, &used_in, "description", registries, collector, cancellation)?;
            diagnostics.extend(outcome.diagnostics);
            match outcome.error {
                Some(e) => errors.push(e),
                None if outcome.resolved_type != "any" && !is_primitive_token(&outcome.resolved_type) => {
                    errors.push(err(
                        format!("description resolved type \"{}\" is not supported, only values that resolve as primitives are supported", outcome.resolved_type),
                        description,
                    ));
                }
                None => {}
            }
        }
    }

    check_value_field(&value.value, declared_type, &used_in, registries, collector, cancellation, &mut diagnostics, &mut errors)?;

    Ok((diagnostics, fold(errors)))
}

fn fold(errors: Vec<ValidationError>) -> Option<ValidationError> {
    match errors.len() {
        0 => None,
        1 => errors.into_iter().next(),
        _ => Some(ValidationError::aggregate(errors)),
    }
}

#[allow(clippy::too_many_arguments)]
fn check_value_field(
    node: &MappingNode,
    declared_type: ValueType,
    used_in: &str,
    registries: &Registries<'_>,
    collector: &mut ReferenceChainCollector,
    cancellation: &CancellationToken,
    diagnostics: &mut Vec<Diagnostic>,
    errors: &mut Vec<ValidationError>,
) -> Result<(), Cancelled> {
    match &node.kind {
        MappingNodeKind::StringWithSubstitutions(segments) => {
            if segments.len() > 1 && declared_type != ValueType::String {
                errors.push(err(
                    "an interpolated string is only permitted when the declared type is \"string\"",
                    node,
                ));
            }
            for segment in segments {
                if let StringSegment::Substitution(sub) = segment {
                    let outcome = check_sub(sub, used_in, "value", registries, collector, cancellation)?;
                    diagnostics.extend(outcome.diagnostics);
                    match outcome.error {
                        Some(e) => errors.push(e),
                        None if outcome.resolved_type != "any" && outcome.resolved_type != declared_type.type_token() => {
                            errors.push(err(
                                format!(
                                    "substitution resolved type \"{}\" does not match the declared type \"{}\"",
                                    outcome.resolved_type,
                                    declared_type.type_token()
                                ),
                                node,
                            ));
                        }
                        None => {}
                    }
                }
            }
        }
        MappingNodeKind::Scalar(scalar) => {
            if scalar.type_token() != declared_type.type_token() {
                errors.push(err(
                    format!(
                        "value has type \"{}\" but the declared type is \"{}\"",
                        scalar.type_token(),
                        declared_type.type_token()
                    ),
                    node,
                ));
            }
        }
        MappingNodeKind::Items(_) => {
            if declared_type != ValueType::Array {
                errors.push(err("value is an array but the declared type is not \"array\"", node));
            }
        }
        MappingNodeKind::Fields(_) => {
            if declared_type != ValueType::Object {
                errors.push(err("value is an object but the declared type is not \"object\"", node));
            }
        }
        MappingNodeKind::Empty => {
            errors.push(err("value is required and can not be empty", node));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidatorConfig;
    use crate::model::scalar::Scalar;
    use crate::testing::{empty_blueprint, MockCustomVariableTypeRegistry, MockDataSourceRegistry, MockFunctionRegistry, MockResourceRegistry};

    #[test]
    fn name_containing_a_substitution_is_rejected() {
        let blueprint = empty_blueprint();
        let functions = MockFunctionRegistry::default();
        let resources = MockResourceRegistry::default();
        let data_sources = MockDataSourceRegistry::default();
        let custom_variable_types = MockCustomVariableTypeRegistry::default();
        let config = ValidatorConfig::default();
        let registries = Registries {
            blueprint: &blueprint,
            functions: &functions,
            resources: &resources,
            data_sources: &data_sources,
            custom_variable_types: &custom_variable_types,
            config: &config,
        };
        let mut collector = ReferenceChainCollector::new();
        let cancellation = CancellationToken::new();
        let value = Value {
            value_type: Some(ValueType::String),
            value: MappingNode::scalar(Scalar::String("ok".into()), None),
            description: None,
            source_meta: None,
        };
        let (_, error) = check_value("${variables.x}", &value, &registries, &mut collector, &cancellation).unwrap();
        assert_eq!(error.unwrap().reason_code, ReasonCode::InvalidValue);
    }

    #[test]
    fn scalar_type_mismatch_is_an_error() {
        let blueprint = empty_blueprint();
        let functions = MockFunctionRegistry::default();
        let resources = MockResourceRegistry::default();
        let data_sources = MockDataSourceRegistry::default();
        let custom_variable_types = MockCustomVariableTypeRegistry::default();
        let config = ValidatorConfig::default();
        let registries = Registries {
            blueprint: &blueprint,
            functions: &functions,
            resources: &resources,
            data_sources: &data_sources,
            custom_variable_types: &custom_variable_types,
            config: &config,
        };
        let mut collector = ReferenceChainCollector::new();
        let cancellation = CancellationToken::new();
        let value = Value {
            value_type: Some(ValueType::Integer),
            value: MappingNode::scalar(Scalar::String("nope".into()), None),
            description: None,
            source_meta: None,
        };
        let (_, error) = check_value("goodName", &value, &registries, &mut collector, &cancellation).unwrap();
        assert_eq!(error.unwrap().reason_code, ReasonCode::InvalidValue);
    }
}
