//! The `includes.*` entity: a reference to a child blueprint.

use serde::{Deserialize, Serialize};

use im::HashMap;

use crate::model::mapping_node::MappingNode;
use crate::span::Range;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Include {
    pub path: MappingNode,
    pub variables: Option<MappingNode>,
    pub metadata: Option<MappingNode>,
    pub source_meta: Option<Range>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct IncludeContainer {
    pub by_name: HashMap<String, Include>,
}

impl IncludeContainer {
    pub fn get(&self, name: &str) -> Option<&Include> {
        self.by_name.get(name)
    }
}
