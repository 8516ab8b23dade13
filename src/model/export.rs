//! The `exports.*` entity: a value re-published by this blueprint for a
//! parent to consume via a `child` reference.

use im::HashMap;
use serde::{Deserialize, Serialize};

use crate::model::value::ValueType;
use crate::span::Range;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Export {
    pub export_type: ValueType,
    pub field: String,
    pub description: Option<String>,
    pub source_meta: Option<Range>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ExportContainer {
    pub by_name: HashMap<String, Export>,
}

impl ExportContainer {
    pub fn get(&self, name: &str) -> Option<&Export> {
        self.by_name.get(name)
    }
}
