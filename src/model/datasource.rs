//! The `datasources.*` entity.

use im::HashMap;
use serde::{Deserialize, Serialize};

use crate::model::mapping_node::MappingNode;
use crate::model::value::ValueType;
use crate::span::Range;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceFilter {
    pub field: String,
    pub operator: String,
    pub search: Vec<MappingNode>,
    pub source_meta: Option<Range>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceExport {
    pub value_type: ValueType,
    pub alias_for: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    pub ds_type: String,
    pub filter: DataSourceFilter,
    pub exports: HashMap<String, DataSourceExport>,
    pub source_meta: Option<Range>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DataSourceContainer {
    pub by_name: HashMap<String, DataSource>,
}

impl DataSourceContainer {
    pub fn get(&self, name: &str) -> Option<&DataSource> {
        self.by_name.get(name)
    }
}
