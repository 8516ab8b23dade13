//! The `variables.*` entity.

use im::HashMap;
use serde::{Deserialize, Serialize};

use crate::model::scalar::Scalar;
use crate::span::Range;

/// One of the built-in primitive variable kinds, or a provider-defined custom
/// type carried by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VariableType {
    String,
    Integer,
    Float,
    Boolean,
    Custom(String),
}

impl VariableType {
    pub fn is_custom(&self) -> bool {
        matches!(self, VariableType::Custom(_))
    }

    pub fn type_token(&self) -> &str {
        match self {
            VariableType::String => "string",
            VariableType::Integer => "integer",
            VariableType::Float => "float",
            VariableType::Boolean => "boolean",
            VariableType::Custom(name) => name.as_str(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub var_type: VariableType,
    pub default: Option<Scalar>,
    pub allowed_values: Option<Vec<Scalar>>,
    /// The value supplied by the caller driving this validation run, if any.
    /// `None` means "not supplied"; reconciliation against `default` happens
    /// at check time, not here.
    pub runtime_value: Option<Scalar>,
    pub source_meta: Option<Range>,
}

impl Variable {
    pub fn new(var_type: VariableType, source_meta: Option<Range>) -> Self {
        Self {
            var_type,
            default: None,
            allowed_values: None,
            runtime_value: None,
            source_meta,
        }
    }
}

/// The `variables` container on a blueprint: name-ordered elements plus a
/// parallel name-to-position map, as every element container carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct VariableContainer {
    pub by_name: HashMap<String, Variable>,
}

impl VariableContainer {
    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.by_name.get(name)
    }
}
