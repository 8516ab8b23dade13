//! Seed scenarios A-G: concrete end-to-end checks run through the full
//! `validate_blueprint` entry point rather than a single element validator.

mod common;

use blueprint_validate::cancellation::CancellationToken;
use blueprint_validate::config::ValidatorConfig;
use blueprint_validate::errors::ReasonCode;
use blueprint_validate::model::mapping_node::{MappingNode, MappingNodeKind, StringSegment};
use blueprint_validate::model::resource::ResourceMetadata;
use blueprint_validate::model::scalar::Scalar;
use blueprint_validate::model::substitution::{Argument, PathSegment, Substitution, SubstitutionKind};
use blueprint_validate::model::variable::{Variable, VariableType};
use blueprint_validate::registries::{FunctionDefinition, ParamType, ParameterDefinition, ResourceSpecDefinition, ScalarConstraints, SchemaNode};
use blueprint_validate::span::Range;
use blueprint_validate::validate_blueprint;

use common::{bare_resource, blank_blueprint, FixtureRegistry};

fn instance_type_registry() -> FixtureRegistry {
    FixtureRegistry::default().with_resource_type(
        "aws/ec2/instance",
        ResourceSpecDefinition {
            schema: SchemaNode::Object {
                attributes: im::HashMap::new(),
                required: vec![],
                nullable: false,
                computed: false,
                description: None,
            },
        },
    )
}

#[test]
fn scenario_a_missing_version() {
    let mut blueprint = blank_blueprint();
    let mut resource = bare_resource("aws/ec2/instance");
    let mut fields = im::HashMap::new();
    fields.insert(
        "instanceType".to_string(),
        blueprint_validate::model::mapping_node::Positioned::new(MappingNode::scalar(Scalar::String("t2.micro".into()), None), None),
    );
    resource.spec = MappingNode::new(MappingNodeKind::Fields(fields), None);
    blueprint.resources.by_name.insert("resource1".to_string(), resource);

    let registry = instance_type_registry();
    let config = ValidatorConfig::default();
    let cancellation = CancellationToken::new();
    let outcome = validate_blueprint(&blueprint, &registry, &registry, &registry, &registry, &config, &cancellation).unwrap();

    let error = outcome.error.expect("expected a validation error");
    assert_eq!(error.reason_code, ReasonCode::MultipleValidationErrors);
    let first = &error.child_errors[0];
    assert_eq!(first.reason_code, ReasonCode::MissingVersion);
    assert_eq!(
        first.message,
        "validation failed due to a version not being provided, version is a required property"
    );
}

#[test]
fn scenario_b_unsupported_version() {
    let mut blueprint = blank_blueprint();
    blueprint.version = Some("2023-09-15".to_string());
    blueprint.resources.by_name.insert("resource1".to_string(), bare_resource("aws/ec2/instance"));

    let registry = instance_type_registry();
    let config = ValidatorConfig::default();
    let cancellation = CancellationToken::new();
    let outcome = validate_blueprint(&blueprint, &registry, &registry, &registry, &registry, &config, &cancellation).unwrap();

    let error = outcome.error.expect("expected a validation error");
    let first = &error.child_errors[0];
    assert_eq!(first.reason_code, ReasonCode::InvalidVersion);
    assert!(first.message.contains("2023-09-15"));
    assert!(first.message.contains("supported versions include:"));
}

#[test]
fn scenario_c_missing_resources_and_includes() {
    let mut blueprint = blank_blueprint();
    blueprint.version = Some("2025-05-12".to_string());

    let registry = instance_type_registry();
    let config = ValidatorConfig::default();
    let cancellation = CancellationToken::new();
    let outcome = validate_blueprint(&blueprint, &registry, &registry, &registry, &registry, &config, &cancellation).unwrap();

    let error = outcome.error.expect("expected a validation error");
    assert!(error
        .leaves()
        .iter()
        .any(|e| matches!(e.reason_code, ReasonCode::MissingResources | ReasonCode::MissingResourcesOrIncludes)));
}

#[test]
fn scenario_d_substitution_in_resource_name() {
    let mut blueprint = blank_blueprint();
    blueprint.version = Some("2025-05-12".to_string());
    blueprint
        .resources
        .by_name
        .insert("${variables.awsEC2InstanceName}".to_string(), bare_resource("aws/ec2/instance"));

    let registry = instance_type_registry();
    let config = ValidatorConfig::default();
    let cancellation = CancellationToken::new();
    let outcome = validate_blueprint(&blueprint, &registry, &registry, &registry, &registry, &config, &cancellation).unwrap();

    let error = outcome.error.expect("expected a validation error");
    let leaf = error
        .leaves()
        .into_iter()
        .find(|e| e.reason_code == ReasonCode::InvalidResource && e.message.contains("substitutions can not be used in resource names"))
        .expect("expected a resource-name-purity error");
    assert!(leaf.message.contains("${variables.awsEC2InstanceName}"));
}

#[test]
fn scenario_e_wrong_display_name_substitution_type() {
    let mut blueprint = blank_blueprint();
    blueprint.version = Some("2025-05-12".to_string());

    let mut resource = bare_resource("aws/ec2/instance");
    let display_name = MappingNode::new(
        MappingNodeKind::StringWithSubstitutions(vec![StringSegment::Substitution(Substitution::new(
            SubstitutionKind::FunctionCall {
                name: "object".to_string(),
                arguments: vec![Argument {
                    name: Some("key".to_string()),
                    value: Substitution::new(SubstitutionKind::Literal(Scalar::String("value".into())), Range::unknown()),
                }],
            },
            Range::unknown(),
        ))]),
        None,
    );
    resource.metadata = Some(ResourceMetadata {
        display_name: Some(display_name),
        ..Default::default()
    });
    blueprint.resources.by_name.insert("resource1".to_string(), resource);

    let registry = instance_type_registry().with_function(
        "object",
        FunctionDefinition {
            name: "object".to_string(),
            parameters: vec![ParameterDefinition {
                name: "key".to_string(),
                value_type: ParamType::Any,
                variadic: true,
                string_choices: None,
                any_union: None,
            }],
            return_type: ParamType::Object,
        },
    );
    let config = ValidatorConfig::default();
    let cancellation = CancellationToken::new();
    let outcome = validate_blueprint(&blueprint, &registry, &registry, &registry, &registry, &config, &cancellation).unwrap();

    let error = outcome.error.expect("expected a validation error");
    let leaf = error
        .leaves()
        .into_iter()
        .find(|e| {
            e.reason_code == ReasonCode::InvalidSubstitution
                && e.message
                    .contains("resolved type \"object\" is not supported by display names, only values that resolve as primitives are supported")
        })
        .expect("expected the display-name primitive-type error");
    assert_eq!(leaf.reason_code, ReasonCode::InvalidSubstitution);
}

#[test]
fn scenario_f_deferred_allowed_values_constraint() {
    let mut blueprint = blank_blueprint();
    blueprint.version = Some("2025-05-12".to_string());
    blueprint.variables.by_name.insert(
        "testVariable".to_string(),
        Variable {
            var_type: VariableType::String,
            default: None,
            allowed_values: None,
            runtime_value: Some(Scalar::String("placeholder".to_string())),
            source_meta: None,
        },
    );

    let mut resource = bare_resource("aws/ec2/instance");
    let mut fields = im::HashMap::new();
    fields.insert(
        "allowedStringValues".to_string(),
        blueprint_validate::model::mapping_node::Positioned::new(
            MappingNode::new(
                MappingNodeKind::StringWithSubstitutions(vec![
                    StringSegment::Literal("testStrPrefix-".to_string()),
                    StringSegment::Substitution(Substitution::new(
                        SubstitutionKind::Variable {
                            name: "testVariable".to_string(),
                        },
                        Range::unknown(),
                    )),
                ]),
                None,
            ),
            None,
        ),
    );
    resource.spec = MappingNode::new(MappingNodeKind::Fields(fields), None);
    blueprint.resources.by_name.insert("resource1".to_string(), resource);

    let mut attributes = im::HashMap::new();
    attributes.insert(
        "allowedStringValues".to_string(),
        SchemaNode::String(ScalarConstraints {
            allowed_values: Some(vec![
                Scalar::String("allowedValue1".into()),
                Scalar::String("allowedValue2".into()),
                Scalar::String("allowedValue3".into()),
            ]),
            ..Default::default()
        }),
    );
    let registry = FixtureRegistry::default().with_resource_type(
        "aws/ec2/instance",
        ResourceSpecDefinition {
            schema: SchemaNode::Object {
                attributes,
                required: vec![],
                nullable: false,
                computed: false,
                description: None,
            },
        },
    );
    let config = ValidatorConfig::default();
    let cancellation = CancellationToken::new();
    let outcome = validate_blueprint(&blueprint, &registry, &registry, &registry, &registry, &config, &cancellation).unwrap();

    assert!(outcome.is_valid(), "unexpected error: {:?}", outcome.error);
    let warnings: Vec<_> = outcome
        .diagnostics
        .iter()
        .filter(|d| d.message.contains("contains substitutions and can not be validated against the allowed values"))
        .collect();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("allowedValue1"));
}

#[test]
fn scenario_g_each_references_resource_directly() {
    let mut blueprint = blank_blueprint();
    blueprint.version = Some("2025-05-12".to_string());
    blueprint.resources.by_name.insert("testService".to_string(), bare_resource("aws/ecs/service"));

    let mut test_cluster = bare_resource("aws/ec2/instance");
    test_cluster.each = Some(MappingNode::new(
        MappingNodeKind::StringWithSubstitutions(vec![StringSegment::Substitution(Substitution::new(
            SubstitutionKind::ResourceProperty {
                resource: "testService".to_string(),
                path: vec![PathSegment::Field("spec".to_string()), PathSegment::Field("id".to_string())],
            },
            Range::unknown(),
        ))]),
        None,
    ));
    blueprint.resources.by_name.insert("testCluster".to_string(), test_cluster);

    let registry = FixtureRegistry::default()
        .with_resource_type(
            "aws/ec2/instance",
            ResourceSpecDefinition {
                schema: SchemaNode::Object {
                    attributes: im::HashMap::new(),
                    required: vec![],
                    nullable: true,
                    computed: false,
                    description: None,
                },
            },
        )
        .with_resource_type(
            "aws/ecs/service",
            ResourceSpecDefinition {
                schema: SchemaNode::Object {
                    attributes: im::HashMap::new(),
                    required: vec![],
                    nullable: true,
                    computed: false,
                    description: None,
                },
            },
        );
    let config = ValidatorConfig::default();
    let cancellation = CancellationToken::new();
    let outcome = validate_blueprint(&blueprint, &registry, &registry, &registry, &registry, &config, &cancellation).unwrap();

    let error = outcome.error.expect("expected a validation error");
    let leaf = error
        .leaves()
        .into_iter()
        .find(|e| e.reason_code == ReasonCode::EachResourceDependency)
        .expect("expected an each_resource_dependency error");
    assert!(leaf.message.contains("resources.testCluster"));
    assert!(leaf.message.contains("resources.testService"));

    assert!(outcome
        .reference_chain
        .edges()
        .iter()
        .any(|edge| edge.element_id == "resources.testService" && edge.tags.contains(&"each".to_string())));
}
