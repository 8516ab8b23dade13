//! The root document: a blueprint combining variables, values, data sources,
//! resources, includes, exports, and an ordered transform sequence.

use serde::{Deserialize, Serialize};

use crate::model::datasource::DataSourceContainer;
use crate::model::export::ExportContainer;
use crate::model::include::IncludeContainer;
use crate::model::resource::ResourceContainer;
use crate::model::value::ValueContainer;
use crate::model::variable::VariableContainer;
use crate::span::{Position, Range};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformEntry {
    pub name: String,
    pub source_meta: Option<Range>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    pub version: Option<String>,
    pub version_position: Option<Position>,
    pub variables: VariableContainer,
    pub values: ValueContainer,
    pub datasources: DataSourceContainer,
    pub resources: ResourceContainer,
    pub includes: IncludeContainer,
    pub exports: ExportContainer,
    pub transform: Vec<TransformEntry>,
}

impl Blueprint {
    pub fn has_resources_or_includes(&self) -> bool {
        !self.resources.by_name.is_empty() || !self.includes.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_blueprint() -> Blueprint {
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

    #[test]
    fn empty_blueprint_has_no_resources_or_includes() {
        assert!(!empty_blueprint().has_resources_or_includes());
    }

    #[test]
    fn blueprint_with_only_includes_counts() {
        let mut bp = empty_blueprint();
        bp.includes.by_name.insert(
            "child1".to_string(),
            crate::model::include::Include {
                path: crate::model::mapping_node::MappingNode::scalar(
                    crate::model::scalar::Scalar::String("./child.yaml".into()),
                    None,
                ),
                variables: None,
                metadata: None,
                source_meta: None,
            },
        );
        assert!(bp.has_resources_or_includes());
    }
}
