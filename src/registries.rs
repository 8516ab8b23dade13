//! External collaborators: the provider/function/resource/data-source lookup
//! services the validator consults but never owns. Each is exposed as a
//! capability trait so a host can inject whatever concrete provider system it
//! has (or a mock, under the `testing` feature) — the validator core never
//! depends on a concrete implementation, grounded on the `SemanticValidator`
//! builder pattern of accepting `&dyn Trait` dependencies one call at a time.

use im::HashMap;
use serde::{Deserialize, Serialize};

use crate::cancellation::CancellationToken;
use crate::diagnostics::Diagnostic;
use crate::errors::ValidationError;
use crate::model::mapping_node::MappingNode;
use crate::model::scalar::Scalar;

/// One of the value types a function parameter or return slot may declare.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    String,
    Int32,
    Int64,
    Float32,
    Float64,
    Bool,
    List,
    Map,
    Object,
    Function,
    Any,
}

impl ParamType {
    /// The resolved type token this parameter type collapses to when
    /// compared against a substitution's resolved type.
    pub fn type_token(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Int32 | ParamType::Int64 => "integer",
            ParamType::Float32 | ParamType::Float64 => "float",
            ParamType::Bool => "boolean",
            ParamType::List => "array",
            ParamType::Map | ParamType::Object => "object",
            ParamType::Function => "function",
            ParamType::Any => "any",
        }
    }
}

/// One parameter of a registered function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    pub name: String,
    pub value_type: ParamType,
    /// Only meaningful for the last parameter: accepts any number of
    /// trailing arguments of this type.
    pub variadic: bool,
    /// A whitelist for scalar parameters receiving a string literal.
    pub string_choices: Option<Vec<String>>,
    /// For an `any` parameter, the set of types it actually accepts. An
    /// empty set means "accepts everything".
    pub any_union: Option<Vec<ParamType>>,
}

impl ParameterDefinition {
    pub fn accepts_type_token(&self, token: &str) -> bool {
        if self.value_type != ParamType::Any {
            return self.value_type.type_token() == token || token == "any";
        }
        match &self.any_union {
            None => true,
            Some(union) if union.is_empty() => true,
            Some(union) => token == "any" || union.iter().any(|t| t.type_token() == token),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub parameters: Vec<ParameterDefinition>,
    pub return_type: ParamType,
}

impl FunctionDefinition {
    pub fn is_variadic(&self) -> bool {
        self.parameters.last().is_some_and(|p| p.variadic)
    }
}

/// Registered/core function lookups, consulted by the substitution type
/// checker for every `function_call` substitution.
pub trait FunctionRegistry {
    fn has(&self, name: &str) -> bool;
    fn get_definition(
        &self,
        name: &str,
        cancellation: &CancellationToken,
    ) -> Result<FunctionDefinition, ValidationError>;
}

/// One node of a resource-spec schema tree (the shape providers publish for
/// a resource type's `spec` field).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SchemaNode {
    Object {
        attributes: HashMap<String, SchemaNode>,
        required: Vec<String>,
        nullable: bool,
        computed: bool,
        description: Option<String>,
    },
    Map {
        map_values: Box<SchemaNode>,
        nullable: bool,
        computed: bool,
        min_length: Option<u64>,
        max_length: Option<u64>,
    },
    Array {
        items: Box<SchemaNode>,
        nullable: bool,
        computed: bool,
        min_length: Option<u64>,
        max_length: Option<u64>,
    },
    String(ScalarConstraints),
    Integer(ScalarConstraints),
    Float(ScalarConstraints),
    Boolean(ScalarConstraints),
    Union {
        one_of: Vec<SchemaNode>,
        nullable: bool,
        computed: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ScalarConstraints {
    pub nullable: bool,
    pub computed: bool,
    pub allowed_values: Option<Vec<Scalar>>,
    pub pattern: Option<String>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    /// An opaque, provider-supplied validation hook. The validator core
    /// never interprets it; it only invokes it and appends the diagnostics
    /// it returns verbatim.
    pub validate_func: Option<String>,
    pub description: Option<String>,
}

impl SchemaNode {
    pub fn is_nullable(&self) -> bool {
        match self {
            SchemaNode::Object { nullable, .. }
            | SchemaNode::Map { nullable, .. }
            | SchemaNode::Array { nullable, .. }
            | SchemaNode::Union { nullable, .. } => *nullable,
            SchemaNode::String(c)
            | SchemaNode::Integer(c)
            | SchemaNode::Float(c)
            | SchemaNode::Boolean(c) => c.nullable,
        }
    }

    pub fn is_computed(&self) -> bool {
        match self {
            SchemaNode::Object { computed, .. }
            | SchemaNode::Map { computed, .. }
            | SchemaNode::Array { computed, .. }
            | SchemaNode::Union { computed, .. } => *computed,
            SchemaNode::String(c)
            | SchemaNode::Integer(c)
            | SchemaNode::Float(c)
            | SchemaNode::Boolean(c) => c.computed,
        }
    }

    pub fn type_token(&self) -> &'static str {
        match self {
            SchemaNode::Object { .. } | SchemaNode::Map { .. } => "object",
            SchemaNode::Array { .. } => "array",
            SchemaNode::String(_) => "string",
            SchemaNode::Integer(_) => "integer",
            SchemaNode::Float(_) => "float",
            SchemaNode::Boolean(_) => "boolean",
            SchemaNode::Union { .. } => "union",
        }
    }
}

/// A resolved resource-type spec definition: the schema tree plus whatever
/// provider parameters selected this particular instantiation of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSpecDefinition {
    pub schema: SchemaNode,
}

/// A single metadata attribute exposed by a resource type (used to validate
/// `resource_property` substitutions with a `metadata` first path segment).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceMetadataSchema {
    pub annotation_keys: Vec<String>,
    pub label_keys: Vec<String>,
}

pub trait ResourceRegistry {
    fn has_type(&self, resource_type: &str) -> bool;

    fn get_spec_definition(
        &self,
        resource_type: &str,
        cancellation: &CancellationToken,
    ) -> Result<Option<ResourceSpecDefinition>, ValidationError>;

    fn custom_validate(
        &self,
        resource_type: &str,
        input: &MappingNode,
        cancellation: &CancellationToken,
    ) -> Result<(Vec<Diagnostic>, Option<ValidationError>), ValidationError>;
}

/// A single exported field of a data source type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceExportField {
    pub value_type: ParamType,
}

pub trait DataSourceRegistry {
    fn has_type(&self, data_source_type: &str) -> bool;
    fn has_filter_field(&self, data_source_type: &str, field: &str) -> bool;
    fn get_export_field(
        &self,
        data_source_type: &str,
        field: &str,
        cancellation: &CancellationToken,
    ) -> Result<Option<DataSourceExportField>, ValidationError>;
}

pub trait CustomVariableTypeRegistry {
    /// The labelled scalar options a custom variable type offers, e.g. the
    /// instance sizes a provider publishes for `aws/instance-size`.
    fn options(
        &self,
        type_name: &str,
        cancellation: &CancellationToken,
    ) -> Result<HashMap<String, Scalar>, ValidationError>;
}
