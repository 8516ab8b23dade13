//! Append-only directed-edge store consumed later by an external cycle
//! detector. The collector owns no element data, only edges, per the
//! "edges not ownership" data-model invariant.

use serde::{Deserialize, Serialize};

use crate::grammar::ReferenceKind;

/// `kind.name`, e.g. `values.foo`, `resources.bar`, `children.baz`,
/// `datasources.qux`.
pub fn element_id(kind: ReferenceKind, name: &str) -> String {
    let prefix = match kind {
        ReferenceKind::Variable => "variables",
        ReferenceKind::Value => "values",
        ReferenceKind::DataSource => "datasources",
        ReferenceKind::Child => "children",
        ReferenceKind::Resource => "resources",
    };
    format!("{prefix}.{name}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEdge {
    /// The element being referenced.
    pub element_id: String,
    /// The element doing the referencing.
    pub referenced_by_id: String,
    /// The referencing property, e.g. `each`, `description`, a spec path.
    pub tags: Vec<String>,
}

/// The append-only edge store. Created fresh per blueprint validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceChainCollector {
    edges: Vec<ReferenceEdge>,
}

impl ReferenceChainCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collect(&mut self, element_id: String, referenced_by_id: String, tags: Vec<String>) {
        self.edges.push(ReferenceEdge {
            element_id,
            referenced_by_id,
            tags,
        });
    }

    pub fn edges(&self) -> &[ReferenceEdge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
