//! The `resources.*` entity, the richest element kind: metadata, condition
//! trees, `each` templating, dependency edges, and a provider-typed spec.

use im::HashMap;
use serde::{Deserialize, Serialize};

use crate::model::mapping_node::MappingNode;
use crate::span::Range;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResourceMetadata {
    pub display_name: Option<MappingNode>,
    pub labels: HashMap<String, String>,
    pub annotations: HashMap<String, MappingNode>,
    pub custom: Option<MappingNode>,
}

/// A boolean-algebra condition tree: `and`/`or`/`not` combinators over leaf
/// string-with-substitutions conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
    StringValue(MappingNode),
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LinkSelector {
    pub by_label: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub res_type: String,
    pub metadata: Option<ResourceMetadata>,
    pub condition: Option<Condition>,
    pub each: Option<MappingNode>,
    pub link_selector: Option<LinkSelector>,
    pub depends_on: Vec<String>,
    pub spec: MappingNode,
    pub description: Option<MappingNode>,
    pub source_meta: Option<Range>,
}

impl Resource {
    /// A resource with a non-`None` `each` is a *template*: the target of
    /// `elem_reference`/`elem_index_reference` substitutions.
    pub fn is_template(&self) -> bool {
        self.each.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResourceContainer {
    pub by_name: HashMap<String, Resource>,
}

impl ResourceContainer {
    pub fn get(&self, name: &str) -> Option<&Resource> {
        self.by_name.get(name)
    }
}
