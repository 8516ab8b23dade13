//! Mock registries and fixture builders, gated behind the `testing` feature
//! (mirroring the teacher's `test-atom` feature) so downstream embedders can
//! write their own tests against this crate without standing up real
//! provider plumbing. Also used by this crate's own test suite.

use im::HashMap;

use crate::cancellation::CancellationToken;
use crate::diagnostics::Diagnostic;
use crate::errors::{ReasonCode, ValidationError};
use crate::model::blueprint::Blueprint;
use crate::model::mapping_node::MappingNode;
use crate::model::scalar::Scalar;
use crate::registries::{
    CustomVariableTypeRegistry, DataSourceExportField, DataSourceRegistry, FunctionDefinition,
    FunctionRegistry, ResourceRegistry, ResourceSpecDefinition,
};

pub fn empty_blueprint() -> Blueprint {
    Blueprint {
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

#[derive(Debug, Clone, Default)]
pub struct MockFunctionRegistry {
    pub functions: HashMap<String, FunctionDefinition>,
}

impl MockFunctionRegistry {
    pub fn with_function(mut self, def: FunctionDefinition) -> Self {
        self.functions.insert(def.name.clone(), def);
        self
    }
}

impl FunctionRegistry for MockFunctionRegistry {
    fn has(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    fn get_definition(
        &self,
        name: &str,
        _cancellation: &CancellationToken,
    ) -> Result<FunctionDefinition, ValidationError> {
        self.functions
            .get(name)
            .cloned()
            .ok_or_else(|| ValidationError::new(ReasonCode::InvalidSubstitution, format!("unknown function \"{name}\"")))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockResourceRegistry {
    pub types: HashMap<String, ResourceSpecDefinition>,
}

impl MockResourceRegistry {
    pub fn with_type(mut self, resource_type: impl Into<String>, def: ResourceSpecDefinition) -> Self {
        self.types.insert(resource_type.into(), def);
        self
    }
}

impl ResourceRegistry for MockResourceRegistry {
    fn has_type(&self, resource_type: &str) -> bool {
        self.types.contains_key(resource_type)
    }

    fn get_spec_definition(
        &self,
        resource_type: &str,
        _cancellation: &CancellationToken,
    ) -> Result<Option<ResourceSpecDefinition>, ValidationError> {
        Ok(self.types.get(resource_type).cloned())
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

#[derive(Debug, Clone, Default)]
pub struct MockDataSourceRegistry {
    pub types: HashMap<String, HashMap<String, DataSourceExportField>>,
    pub filter_fields: HashMap<String, Vec<String>>,
}

impl DataSourceRegistry for MockDataSourceRegistry {
    fn has_type(&self, data_source_type: &str) -> bool {
        self.types.contains_key(data_source_type)
    }

    fn has_filter_field(&self, data_source_type: &str, field: &str) -> bool {
        self.filter_fields
            .get(data_source_type)
            .is_some_and(|fields| fields.iter().any(|f| f == field))
    }

    fn get_export_field(
        &self,
        data_source_type: &str,
        field: &str,
        _cancellation: &CancellationToken,
    ) -> Result<Option<DataSourceExportField>, ValidationError> {
        Ok(self.types.get(data_source_type).and_then(|fields| fields.get(field)).cloned())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockCustomVariableTypeRegistry {
    pub options: HashMap<String, HashMap<String, Scalar>>,
}

impl CustomVariableTypeRegistry for MockCustomVariableTypeRegistry {
    fn options(
        &self,
        type_name: &str,
        _cancellation: &CancellationToken,
    ) -> Result<HashMap<String, Scalar>, ValidationError> {
        self.options
            .get(type_name)
            .cloned()
            .ok_or_else(|| ValidationError::new(ReasonCode::InvalidVariableType, format!("unknown custom variable type \"{type_name}\"")))
    }
}
