//! Substitution AST: a tagged-variant tree for a single `${...}`
//! expression. Grounded on the teacher's `AstNode`/`Expr` enum shape (one
//! Rust enum, one variant per syntactic form, a `Span` riding on every node)
//! but with the variant set fixed to the reference forms, literals, and
//! function calls a substitution expression can take.

use serde::{Deserialize, Serialize};

use crate::model::scalar::Scalar;
use crate::span::Range;

/// One step of an attribute path walked by `resource_property`,
/// `data_source_property`, `value_reference`, and `child` substitutions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathSegment {
    Field(String),
    Index(u64),
}

/// A named, unevaluated function-call argument (only legal for the
/// distinguished `object` constructor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub name: Option<String>,
    pub value: Substitution,
}

/// One node of a substitution expression tree. Exactly one of the variants is
/// ever constructed for a given `${...}` node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SubstitutionKind {
    Literal(Scalar),
    Variable {
        name: String,
    },
    ValueReference {
        name: String,
        path: Vec<PathSegment>,
    },
    ElemReference,
    ElemIndexReference,
    ResourceProperty {
        resource: String,
        path: Vec<PathSegment>,
    },
    DataSourceProperty {
        data_source: String,
        field: String,
        index: Option<u64>,
    },
    Child {
        include: String,
        path: Vec<PathSegment>,
    },
    FunctionCall {
        name: String,
        arguments: Vec<Argument>,
    },
}

/// A substitution node with its source metadata; every substitution AST
/// carries one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Substitution {
    pub kind: SubstitutionKind,
    pub source_meta: Range,
}

impl Substitution {
    pub fn new(kind: SubstitutionKind, source_meta: Range) -> Self {
        Self { kind, source_meta }
    }
}
