//! Shared fixtures for the integration test suite: minimal registry
//! implementations and blueprint-builder helpers, independent of the
//! `testing`-feature mocks (which are only visible inside the crate's own
//! unit tests).

use std::collections::HashMap as StdHashMap;

use blueprint_validate::cancellation::CancellationToken;
use blueprint_validate::diagnostics::Diagnostic;
use blueprint_validate::errors::ValidationError;
use blueprint_validate::model::mapping_node::MappingNode;
use blueprint_validate::model::scalar::Scalar;
use blueprint_validate::registries::{
    CustomVariableTypeRegistry, DataSourceExportField, DataSourceRegistry, FunctionDefinition, FunctionRegistry, ResourceRegistry,
    ResourceSpecDefinition,
};

#[derive(Default)]
pub struct FixtureRegistry {
    pub resource_types: StdHashMap<String, ResourceSpecDefinition>,
    pub data_source_types: StdHashMap<String, StdHashMap<String, DataSourceExportField>>,
    pub data_source_filter_fields: StdHashMap<String, Vec<String>>,
    pub functions: StdHashMap<String, FunctionDefinition>,
}

impl FixtureRegistry {
    pub fn with_resource_type(mut self, resource_type: &str, definition: ResourceSpecDefinition) -> Self {
        self.resource_types.insert(resource_type.to_string(), definition);
        self
    }

    pub fn with_function(mut self, name: &str, definition: FunctionDefinition) -> Self {
        self.functions.insert(name.to_string(), definition);
        self
    }
}

impl FunctionRegistry for FixtureRegistry {
    fn has(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    fn get_definition(&self, name: &str, _cancellation: &CancellationToken) -> Result<FunctionDefinition, ValidationError> {
        self.functions.get(name).cloned().ok_or_else(|| {
            ValidationError::new(
                blueprint_validate::ReasonCode::InvalidSubstitution,
                format!("no definition published for function \"{name}\""),
            )
        })
    }
}

impl ResourceRegistry for FixtureRegistry {
    fn has_type(&self, resource_type: &str) -> bool {
        self.resource_types.contains_key(resource_type)
    }

    fn get_spec_definition(&self, resource_type: &str, _cancellation: &CancellationToken) -> Result<Option<ResourceSpecDefinition>, ValidationError> {
        Ok(self.resource_types.get(resource_type).cloned())
    }

    fn custom_validate(
        &self,
        _resource_type: &str,
        _input: &MappingNode,
        _cancellation: &CancellationToken,
    ) -> Result<(Vec<Diagnostic>, Option<ValidationError>), ValidationError> {
        Ok((Vec::new(), None))
    }
}

impl DataSourceRegistry for FixtureRegistry {
    fn has_type(&self, data_source_type: &str) -> bool {
        self.data_source_types.contains_key(data_source_type)
    }

    fn has_filter_field(&self, data_source_type: &str, field: &str) -> bool {
        self.data_source_filter_fields
            .get(data_source_type)
            .is_some_and(|fields| fields.iter().any(|f| f == field))
    }

    fn get_export_field(&self, data_source_type: &str, field: &str, _cancellation: &CancellationToken) -> Result<Option<DataSourceExportField>, ValidationError> {
        Ok(self.data_source_types.get(data_source_type).and_then(|fields| fields.get(field).cloned()))
    }
}

impl CustomVariableTypeRegistry for FixtureRegistry {
    fn options(&self, _type_name: &str, _cancellation: &CancellationToken) -> Result<im::HashMap<String, Scalar>, ValidationError> {
        Ok(im::HashMap::new())
    }
}

/// A blueprint with no version, no variables/values/etc, and the resources
/// container populated by the caller — the common starting point for the
/// seed scenarios.
pub fn blank_blueprint() -> blueprint_validate::model::Blueprint {
    blueprint_validate::model::Blueprint {
        version: None,
        version_position: None,
        variables: Default::default(),
        values: Default::default(),
        datasources: Default::default(),
        resources: Default::default(),
        includes: Default::default(),
        exports: Default::default(),
        transform: Vec::new(),
    }
}

/// An otherwise-empty resource of the given type, for tests that only care
/// about one field.
pub fn bare_resource(res_type: &str) -> blueprint_validate::model::resource::Resource {
    blueprint_validate::model::resource::Resource {
        res_type: res_type.to_string(),
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
