//! `includes.*` checks: a non-empty `path` resolving to a string, plus
//! `variables`/`metadata` validated as ordinary mapping nodes.

use crate::diagnostics::Diagnostic;
use crate::errors::{ReasonCode, ValidationError};
use crate::model::include::Include;
use crate::model::mapping_node::MappingNodeKind;
use crate::reference_chain::{element_id, ReferenceChainCollector};
use crate::span::Range;

use super::{check_mapping_node, check_sub, is_primitive_token, range_or_unknown, Registries};
use crate::cancellation::{CancellationToken, Cancelled};
use crate::grammar::ReferenceKind;

fn err(message: impl Into<String>, range: Range) -> ValidationError {
    ValidationError::new(ReasonCode::InvalidInclude, message).with_position(range.start)
}

/// Checks one `includes.NAME` entry.
pub fn check_include(
    name: &str,
    include: &Include,
    registries: &Registries<'_>,
    collector: &mut ReferenceChainCollector,
    cancellation: &CancellationToken,
) -> Result<(Vec<Diagnostic>, Option<ValidationError>), Cancelled> {
    let used_in = element_id(ReferenceKind::Child, name);
    let mut diagnostics = Vec::new();
    let mut errors = Vec::new();

    if name.contains("${") {
        errors.push(err(
            format!("'${{..}} substitutions can not be used in include names, found in include \"{name}\"'"),
            range_or_unknown(&include.path),
        ));
    }

    match &include.path.kind {
        MappingNodeKind::Empty => errors.push(err("path can not be empty", range_or_unknown(&include.path))),
        MappingNodeKind::Scalar(scalar) if matches!(scalar, crate::model::scalar::Scalar::String(s) if s.is_empty()) => {
            errors.push(err("path can not be an empty string", range_or_unknown(&include.path)));
        }
        MappingNodeKind::Scalar(scalar) if scalar.type_token() != "string" => {
            errors.push(err(
                format!("path must be a string, found \"{}\"", scalar.type_token()),
                range_or_unknown(&include.path),
            ));
        }
        MappingNodeKind::Scalar(_) => {}
        MappingNodeKind::StringWithSubstitutions(_) => {
            for sub in include.path.all_substitutions() {
                let outcome = check_sub(sub, &used_in, "path", registries, collector, cancellation)?;
                diagnostics.extend(outcome.diagnostics);
                match outcome.error {
                    Some(e) => errors.push(e),
                    None if outcome.resolved_type != "any" && !is_primitive_token(&outcome.resolved_type) => {
                        errors.push(err(
                            format!("path resolved type \"{}\" must be a primitive type", outcome.resolved_type),
                            range_or_unknown(&include.path),
                        ));
                    }
                    None => {}
                }
            }
        }
        MappingNodeKind::Fields(_) | MappingNodeKind::Items(_) => {
            errors.push(err("path must be a string, not an object or array", range_or_unknown(&include.path)));
        }
    }

    if let Some(variables) = &include.variables {
        let (var_diags, var_error) = check_mapping_node(variables, true, &used_in, "variables", registries, collector, cancellation)?;
        diagnostics.extend(var_diags);
        if let Some(e) = var_error {
            errors.push(e);
        }
    }

    if let Some(metadata) = &include.metadata {
        let (meta_diags, meta_error) = check_mapping_node(metadata, true, &used_in, "metadata", registries, collector, cancellation)?;
        diagnostics.extend(meta_diags);
        if let Some(e) = meta_error {
            errors.push(e);
        }
    }

    let error = match errors.len() {
        0 => None,
        1 => errors.into_iter().next(),
        _ => Some(ValidationError::aggregate(errors)),
    };
    Ok((diagnostics, error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidatorConfig;
    use crate::model::mapping_node::MappingNode;
    use crate::model::scalar::Scalar;
    use crate::testing::{empty_blueprint, MockCustomVariableTypeRegistry, MockDataSourceRegistry, MockFunctionRegistry, MockResourceRegistry};

    fn registries<'a>(
        blueprint: &'a crate::model::blueprint::Blueprint,
        functions: &'a MockFunctionRegistry,
        resources: &'a MockResourceRegistry,
        data_sources: &'a MockDataSourceRegistry,
        custom_variable_types: &'a MockCustomVariableTypeRegistry,
        config: &'a ValidatorConfig,
    ) -> Registries<'a> {
        Registries {
            blueprint,
            functions,
            resources,
            data_sources,
            custom_variable_types,
            config,
        }
    }

    #[test]
    fn empty_path_is_rejected() {
        let blueprint = empty_blueprint();
        let functions = MockFunctionRegistry::default();
        let resources = MockResourceRegistry::default();
        let data_sources = MockDataSourceRegistry::default();
        let custom_variable_types = MockCustomVariableTypeRegistry::default();
        let config = ValidatorConfig::default();
        let r = registries(&blueprint, &functions, &resources, &data_sources, &custom_variable_types, &config);
        let mut collector = ReferenceChainCollector::new();
        let cancellation = CancellationToken::new();

        let include = Include {
            path: MappingNode::empty(None),
            variables: None,
            metadata: None,
            source_meta: None,
        };
        let (_, error) = check_include("child", &include, &r, &mut collector, &cancellation).unwrap();
        assert_eq!(error.unwrap().reason_code, ReasonCode::InvalidInclude);
    }

    #[test]
    fn non_string_scalar_path_is_rejected() {
        let blueprint = empty_blueprint();
        let functions = MockFunctionRegistry::default();
        let resources = MockResourceRegistry::default();
        let data_sources = MockDataSourceRegistry::default();
        let custom_variable_types = MockCustomVariableTypeRegistry::default();
        let config = ValidatorConfig::default();
        let r = registries(&blueprint, &functions, &resources, &data_sources, &custom_variable_types, &config);
        let mut collector = ReferenceChainCollector::new();
        let cancellation = CancellationToken::new();

        let include = Include {
            path: MappingNode::scalar(Scalar::Integer(4), None),
            variables: None,
            metadata: None,
            source_meta: None,
        };
        let (_, error) = check_include("child", &include, &r, &mut collector, &cancellation).unwrap();
        assert_eq!(error.unwrap().reason_code, ReasonCode::InvalidInclude);
    }
}
