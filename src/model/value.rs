//! The `values.*` local-value entity.

use im::HashMap;
use serde::{Deserialize, Serialize};

use crate::model::mapping_node::MappingNode;
use crate::span::Range;

/// One of the six value types a local `values.NAME` entry may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    Integer,
    Float,
    Boolean,
    Array,
    Object,
}

impl ValueType {
    pub fn type_token(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::Boolean => "boolean",
            ValueType::Array => "array",
            ValueType::Object => "object",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Value {
    pub value_type: Option<ValueType>,
    pub value: MappingNode,
    pub description: Option<MappingNode>,
    pub source_meta: Option<Range>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ValueContainer {
    pub by_name: HashMap<String, Value>,
}

impl ValueContainer {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.by_name.get(name)
    }
}
