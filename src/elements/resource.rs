//! `resources.*` checks, the richest element kind: type existence, metadata
//! (display name, labels, annotations, custom), the `condition` boolean tree,
//! `each` templating, `depends_on` edges, and the provider-typed `spec`.

use crate::diagnostics::Diagnostic;
use crate::errors::{ReasonCode, ValidationError};
use crate::model::resource::{Condition, Resource};
use crate::reference_chain::{element_id, ReferenceChainCollector};
use crate::span::Range;

use super::{check_mapping_node, check_schema, check_sub, is_primitive_token, range_or_unknown, Registries};
use crate::cancellation::{CancellationToken, Cancelled};
use crate::grammar::ReferenceKind;

fn err(message: impl Into<String>, range: Range) -> ValidationError {
    ValidationError::new(ReasonCode::InvalidResource, message).with_position(range.start)
}

/// Checks one `resources.NAME` entry.
pub fn check_resource(
    name: &str,
    resource: &Resource,
    registries: &Registries<'_>,
    collector: &mut ReferenceChainCollector,
    cancellation: &CancellationToken,
) -> Result<(Vec<Diagnostic>, Option<ValidationError>), Cancelled> {
    let used_in = element_id(ReferenceKind::Resource, name);
    let own_range = resource.source_meta.unwrap_or_else(Range::unknown);
    let mut diagnostics = Vec::new();
    let mut errors = Vec::new();

    if name.contains("${") {
        errors.push(err(
            format!("'${{..}} substitutions can not be used in resource names, found in resource \"{name}\"'"),
            own_range,
        ));
    }

    if !registries.resources.has_type(&resource.res_type) {
        errors.push(err(format!("resource type \"{}\" is not registered", resource.res_type), own_range));
    }

    if let Some(metadata) = &resource.metadata {
        if let Some(display_name) = &metadata.display_name {
            for sub in display_name.all_substitutions() {
                let outcome = check_sub(sub, &used_in, "metadata.display_name", registries, collector, cancellation)?;
                diagnostics.extend(outcome.diagnostics);
                match outcome.error {
                    Some(e) => errors.push(e),
                    None if outcome.resolved_type != "any" && !is_primitive_token(&outcome.resolved_type) => {
                        errors.push(
                            ValidationError::new(
                                ReasonCode::InvalidSubstitution,
                                format!(
                                    "metadata.display_name resolved type \"{}\" is not supported by display names, only values that resolve as primitives are supported",
                                    outcome.resolved_type
                                ),
                            )
                            .with_position(range_or_unknown(display_name).start),
                        );
                    }
                    None => {}
                }
            }
        }

        for (key, value) in metadata.labels.iter() {
            if key.contains("${") || value.contains("${") {
                errors.push(err(format!("label \"{key}\" can not contain a substitution in its key or value"), own_range));
            }
        }

        for (key, node) in metadata.annotations.iter() {
            if key.contains("${") {
                errors.push(err(format!("annotation key \"{key}\" can not contain a substitution"), own_range));
                continue;
            }
            let (ann_diags, ann_error) = check_mapping_node(node, true, &used_in, "metadata.annotations", registries, collector, cancellation)?;
            diagnostics.extend(ann_diags);
            if let Some(e) = ann_error {
                errors.push(e);
            }
        }

        if let Some(custom) = &metadata.custom {
            let (custom_diags, custom_error) = check_mapping_node(custom, true, &used_in, "metadata.custom", registries, collector, cancellation)?;
            diagnostics.extend(custom_diags);
            if let Some(e) = custom_error {
                errors.push(e);
            }
        }
    }

    if let Some(link_selector) = &resource.link_selector {
        for (key, value) in link_selector.by_label.iter() {
            if key.contains("${") || value.contains("${") {
                errors.push(err(
                    format!("link_selector label \"{key}\" can not contain a substitution in its key or value"),
                    own_range,
                ));
            }
        }
    }

    if let Some(condition) = &resource.condition {
        check_condition(condition, false, &used_in, registries, collector, cancellation, &mut diagnostics, &mut errors)?;
    }

    if let Some(each) = &resource.each {
        for sub in each.all_substitutions() {
            match &sub.kind {
                crate::model::substitution::SubstitutionKind::ResourceProperty { resource: target, .. } => {
                    let outcome = check_sub(sub, &used_in, "each", registries, collector, cancellation)?;
                    diagnostics.extend(outcome.diagnostics);
                    errors.push(
                        ValidationError::new(
                            ReasonCode::EachResourceDependency,
                            format!(
                                "\"{used_in}\" can not depend on \"{}\" from its each expression, each can not depend on resources",
                                element_id(ReferenceKind::Resource, target)
                            ),
                        )
                        .with_position(range_or_unknown(each).start),
                    );
                    continue;
                }
                crate::model::substitution::SubstitutionKind::Child { include: target, .. } => {
                    let outcome = check_sub(sub, &used_in, "each", registries, collector, cancellation)?;
                    diagnostics.extend(outcome.diagnostics);
                    errors.push(
                        ValidationError::new(
                            ReasonCode::EachChildDependency,
                            format!(
                                "\"{used_in}\" can not depend on \"{}\" from its each expression, each can not depend on includes",
                                element_id(ReferenceKind::Child, target)
                            ),
                        )
                        .with_position(range_or_unknown(each).start),
                    );
                    continue;
                }
                _ => {}
            }

            let outcome = check_sub(sub, &used_in, "each", registries, collector, cancellation)?;
            diagnostics.extend(outcome.diagnostics);
            match outcome.error {
                Some(e) => errors.push(e),
                None if outcome.resolved_type == "any" => {
                    diagnostics.push(Diagnostic::warning(
                        "each could not be resolved to a concrete type, assuming it resolves to an array at runtime",
                        range_or_unknown(each),
                    ));
                }
                None if outcome.resolved_type != "array" => {
                    errors.push(err(
                        format!("each resolved type \"{}\" must be \"array\"", outcome.resolved_type),
                        range_or_unknown(each),
                    ));
                }
                None => {}
            }
        }
    }

    for dependency in &resource.depends_on {
        if dependency.contains("${") {
            errors.push(err(format!("depends_on entry \"{dependency}\" can not contain a substitution"), own_range));
        } else if dependency == name {
            errors.push(err("a resource can not depend on itself", own_range));
        } else if registries.blueprint.resources.get(dependency).is_none() {
            errors.push(err(format!("depends_on entry \"{dependency}\" does not name an existing resource"), own_range));
        } else {
            collector.collect(element_id(ReferenceKind::Resource, dependency), used_in.clone(), vec!["depends_on".to_string()]);
        }
    }

    if let Some(description) = &resource.description {
        for sub in description.all_substitutions() {
            let outcome = check_sub(sub, &used_in, "description", registries, collector, cancellation)?;
            diagnostics.extend(outcome.diagnostics);
            match outcome.error {
                Some(e) => errors.push(e),
                None if outcome.resolved_type != "any" && !is_primitive_token(&outcome.resolved_type) => {
                    errors.push(err(
                        format!("description resolved type \"{}\" is not supported, only values that resolve as primitives are supported", outcome.resolved_type),
                        range_or_unknown(description),
                    ));
                }
                None => {}
            }
        }
    }

    cancellation.check()?;
    match registries.resources.get_spec_definition(&resource.res_type, cancellation) {
        Err(registry_err) => errors.push(registry_err),
        Ok(None) => diagnostics.push(Diagnostic::warning(
            format!("the \"{}\" resource type is not currently loaded, can not check its spec", resource.res_type),
            own_range,
        )),
        Ok(Some(spec_def)) => {
            let outcome = check_schema(&resource.spec, &spec_def.schema, &resource.res_type, &used_in, "spec", registries, collector, cancellation)?;
            diagnostics.extend(outcome.diagnostics);
            if let Some(e) = outcome.error {
                errors.push(e);
            }
        }
    }

    let error = match errors.len() {
        0 => None,
        1 => errors.into_iter().next(),
        _ => Some(ValidationError::aggregate(errors)),
    };
    Ok((diagnostics, error))
}

#[allow(clippy::too_many_arguments)]
fn check_condition(
    condition: &Condition,
    nested: bool,
    used_in: &str,
    registries: &Registries<'_>,
    collector: &mut ReferenceChainCollector,
    cancellation: &CancellationToken,
    diagnostics: &mut Vec<Diagnostic>,
    errors: &mut Vec<ValidationError>,
) -> Result<(), Cancelled> {
    match condition {
        Condition::Empty => {
            if nested {
                errors.push(err("a nested condition can not be empty", Range::unknown()));
            }
        }
        Condition::Not(inner) => check_condition(inner, true, used_in, registries, collector, cancellation, diagnostics, errors)?,
        Condition::And(children) | Condition::Or(children) => {
            for child in children {
                check_condition(child, true, used_in, registries, collector, cancellation, diagnostics, errors)?;
            }
        }
        Condition::StringValue(node) => {
            for sub in node.all_substitutions() {
                let outcome = check_sub(sub, used_in, "condition", registries, collector, cancellation)?;
                diagnostics.extend(outcome.diagnostics);
                match outcome.error {
                    Some(e) => errors.push(e),
                    None if outcome.resolved_type == "any" => {
                        diagnostics.push(Diagnostic::warning(
                            "condition could not be resolved to a concrete type, assuming it resolves to a boolean at runtime",
                            range_or_unknown(node),
                        ));
                    }
                    None if outcome.resolved_type != "boolean" => {
                        errors.push(err(
                            format!("condition resolved type \"{}\" must be \"boolean\"", outcome.resolved_type),
                            range_or_unknown(node),
                        ));
                    }
                    None => {}
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidatorConfig;
    use crate::model::mapping_node::MappingNode;
    use crate::testing::{empty_blueprint, MockCustomVariableTypeRegistry, MockDataSourceRegistry, MockFunctionRegistry, MockResourceRegistry};

    fn base_resource() -> Resource {
        Resource {
            res_type: "aws/ec2/instance".into(),
            metadata: None,
            condition: None,
            each: None,
            link_selector: None,
            depends_on: vec![],
            spec: MappingNode::empty(None),
            description: None,
            source_meta: None,
        }
    }

    #[test]
    fn unregistered_type_and_self_dependency_are_both_errors() {
        let mut blueprint = empty_blueprint();
        let mut resource = base_resource();
        resource.depends_on = vec!["selfRef".to_string()];
        blueprint.resources.by_name.insert("selfRef".to_string(), resource.clone());

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

        let (_, error) = check_resource("selfRef", &resource, &registries, &mut collector, &cancellation).unwrap();
        let error = error.unwrap();
        assert_eq!(error.reason_code, ReasonCode::MultipleValidationErrors);
        assert!(error.child_errors.iter().any(|e| e.message.contains("not registered")));
        assert!(error.child_errors.iter().any(|e| e.message.contains("depend on itself")));
    }

    #[test]
    fn nested_empty_condition_is_rejected() {
        let blueprint = empty_blueprint();
        let mut resource = base_resource();
        resource.condition = Some(Condition::And(vec![Condition::Empty]));
        let functions = MockFunctionRegistry::default();
        let resources = MockResourceRegistry::default().with_type(
            "aws/ec2/instance",
            crate::registries::ResourceSpecDefinition {
                schema: crate::registries::SchemaNode::String(crate::registries::ScalarConstraints {
                    nullable: true,
                    ..Default::default()
                }),
            },
        );
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

        let (_, error) = check_resource("r", &resource, &registries, &mut collector, &cancellation).unwrap();
        assert_eq!(error.unwrap().reason_code, ReasonCode::InvalidResource);
    }

    #[test]
    fn label_with_substitution_in_key_is_rejected() {
        let blueprint = empty_blueprint();
        let mut resource = base_resource();
        let mut metadata = crate::model::resource::ResourceMetadata::default();
        metadata.labels.insert("${variables.x}".to_string(), "v".to_string());
        resource.metadata = Some(metadata);
        let functions = MockFunctionRegistry::default();
        let resources = MockResourceRegistry::default().with_type(
            "aws/ec2/instance",
            crate::registries::ResourceSpecDefinition {
                schema: crate::registries::SchemaNode::String(crate::registries::ScalarConstraints {
                    nullable: true,
                    ..Default::default()
                }),
            },
        );
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

        let (_, error) = check_resource("r", &resource, &registries, &mut collector, &cancellation).unwrap();
        assert_eq!(error.unwrap().reason_code, ReasonCode::InvalidResource);
    }

    #[test]
    fn substitution_in_resource_name_is_rejected() {
        let blueprint = empty_blueprint();
        let resource = base_resource();
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

        let (_, error) = check_resource("${variables.awsEC2InstanceName}", &resource, &registries, &mut collector, &cancellation).unwrap();
        let error = error.unwrap();
        assert!(error.leaves().iter().any(|e| e.reason_code == ReasonCode::InvalidResource
            && e.message.contains("can not be used in resource names")));
    }

    #[test]
    fn each_referencing_a_resource_property_is_rejected_but_the_edge_is_still_collected() {
        let mut blueprint = empty_blueprint();
        blueprint.resources.by_name.insert(
            "testService".to_string(),
            Resource {
                res_type: "aws/ecs/service".into(),
                ..base_resource()
            },
        );
        let mut each = MappingNode::new(
            crate::model::mapping_node::MappingNodeKind::StringWithSubstitutions(vec![crate::model::mapping_node::StringSegment::Substitution(
                crate::model::substitution::Substitution::new(
                    crate::model::substitution::SubstitutionKind::ResourceProperty {
                        resource: "testService".to_string(),
                        path: vec![
                            crate::model::substitution::PathSegment::Field("spec".to_string()),
                            crate::model::substitution::PathSegment::Field("id".to_string()),
                        ],
                    },
                    Range::unknown(),
                ),
            )]),
            None,
        );
        each.source_meta = None;
        let mut resource = base_resource();
        resource.each = Some(each);
        blueprint.resources.by_name.insert("testCluster".to_string(), resource.clone());

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

        let (_, error) = check_resource("testCluster", &resource, &registries, &mut collector, &cancellation).unwrap();
        let error = error.unwrap();
        assert!(error.leaves().iter().any(|e| e.reason_code == ReasonCode::EachResourceDependency
            && e.message.contains("resources.testCluster")
            && e.message.contains("resources.testService")));
        assert!(collector
            .edges()
            .iter()
            .any(|edge| edge.element_id == "resources.testService" && edge.tags.contains(&"each".to_string())));
    }
}
