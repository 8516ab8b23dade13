//! Blueprint-level checks: `version` presence/support and the
//! resources-or-includes requirement. Per-element validators are invoked
//! separately by [`crate::validator`].

use crate::diagnostics::Diagnostic;
use crate::errors::{ReasonCode, ValidationError};
use crate::span::{Position, Range};

use super::Registries;

fn position_range(position: Option<Position>) -> Range {
    match position {
        Some(p) => Range::from_start_only(p),
        None => Range::unknown(),
    }
}

/// Checks `version` and the resources-or-includes requirement. Both checks
/// run regardless of each other's outcome.
pub fn check_blueprint(registries: &Registries<'_>) -> (Vec<Diagnostic>, Option<ValidationError>) {
    let blueprint = registries.blueprint;
    let mut errors = Vec::new();

    match &blueprint.version {
        None => errors.push(
            ValidationError::new(
                ReasonCode::MissingVersion,
                "validation failed due to a version not being provided, version is a required property",
            )
            .with_position(position_range(blueprint.version_position).start),
        ),
        Some(version) if !registries.config.supported_versions.contains(version) => {
            let mut supported: Vec<&String> = registries.config.supported_versions.iter().collect();
            supported.sort();
            let list = supported.iter().map(|v| v.as_str()).collect::<Vec<_>>().join(", ");
            errors.push(
                ValidationError::new(
                    ReasonCode::InvalidVersion,
                    format!("version \"{version}\" is not supported, supported versions include: {list}"),
                )
                .with_position(position_range(blueprint.version_position).start),
            );
        }
        Some(_) => {}
    }

    if !blueprint.has_resources_or_includes() {
        errors.push(ValidationError::new(
            registries.config.missing_resources_reason,
            "a blueprint must declare at least one resource or include",
        ));
    }

    let error = match errors.len() {
        0 => None,
        1 => errors.into_iter().next(),
        _ => Some(ValidationError::aggregate(errors)),
    };
    (Vec::new(), error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidatorConfig;
    use crate::testing::{empty_blueprint, MockCustomVariableTypeRegistry, MockDataSourceRegistry, MockFunctionRegistry, MockResourceRegistry};

    #[test]
    fn missing_version_and_missing_resources_both_reported() {
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
        let (_, error) = check_blueprint(&registries);
        let error = error.unwrap();
        assert_eq!(error.reason_code, ReasonCode::MultipleValidationErrors);
        assert_eq!(error.child_errors[0].reason_code, ReasonCode::MissingVersion);
    }

    #[test]
    fn unsupported_version_names_the_version_and_supported_list() {
        let mut blueprint = empty_blueprint();
        blueprint.version = Some("2023-09-15".to_string());
        blueprint.resources.by_name.insert(
            "r".to_string(),
            crate::model::resource::Resource {
                res_type: "x".into(),
                metadata: None,
                condition: None,
                each: None,
                link_selector: None,
                depends_on: vec![],
                spec: crate::model::mapping_node::MappingNode::empty(None),
                description: None,
                source_meta: None,
            },
        );
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
        let (_, error) = check_blueprint(&registries);
        let error = error.unwrap();
        assert_eq!(error.reason_code, ReasonCode::InvalidVersion);
        assert!(error.message.contains("2023-09-15"));
        assert!(error.message.contains("supported versions include:"));
    }
}
