//! Free-form tree type used for metadata, include variables, and
//! resource specs before a typed schema is applied. Grounded on the teacher's
//! `Value` enum (one compositional Rust enum covering scalars, maps, and
//! nested structure) but immutable: fields use `im::HashMap` rather than
//! `std::collections::HashMap` so "the validator never mutates its input"
//! is enforced by the type system, not just by convention.

use im::HashMap;
use serde::{Deserialize, Serialize};

use crate::model::scalar::Scalar;
use crate::model::substitution::Substitution;
use crate::span::Range;

/// The recursion limit for mapping-node traversal: beyond this depth, a
/// traversal stops and emits an info diagnostic instead of recursing further.
pub const MAPPING_NODE_MAX_DEPTH: usize = 10;

/// One segment of a string value that may interleave literal text and
/// `${...}` substitutions, e.g. `"testStrPrefix-" + ${variables.testVariable}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StringSegment {
    Literal(String),
    Substitution(Substitution),
}

/// A mapping-node field or array item paired with its source position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Positioned<T> {
    pub value: T,
    pub source_meta: Option<Range>,
}

impl<T> Positioned<T> {
    pub fn new(value: T, source_meta: Option<Range>) -> Self {
        Self { value, source_meta }
    }
}

/// The free-form tree itself. Exactly one of `Scalar`, `Fields`, `Items`, or
/// `StringWithSubstitutions` is active per node; `Empty`
/// models the parser producing none of the above (an absent/null node).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MappingNodeKind {
    Empty,
    Scalar(Scalar),
    Fields(HashMap<String, Positioned<MappingNode>>),
    Items(Vec<Positioned<MappingNode>>),
    StringWithSubstitutions(Vec<StringSegment>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingNode {
    pub kind: MappingNodeKind,
    pub source_meta: Option<Range>,
}

impl MappingNode {
    pub fn new(kind: MappingNodeKind, source_meta: Option<Range>) -> Self {
        Self { kind, source_meta }
    }

    pub fn empty(source_meta: Option<Range>) -> Self {
        Self::new(MappingNodeKind::Empty, source_meta)
    }

    pub fn scalar(scalar: Scalar, source_meta: Option<Range>) -> Self {
        Self::new(MappingNodeKind::Scalar(scalar), source_meta)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, MappingNodeKind::Empty)
    }

    /// True when this node is, or transitively contains, at least one
    /// substitution. Used by the schema validator's constraint-deferral rule:
    /// a constrained field containing a substitution can't be checked until
    /// the substitution resolves, so the constraint check is skipped with a
    /// warning instead of failing outright.
    pub fn contains_substitution(&self) -> bool {
        match &self.kind {
            MappingNodeKind::Empty | MappingNodeKind::Scalar(_) => false,
            MappingNodeKind::StringWithSubstitutions(segments) => segments
                .iter()
                .any(|s| matches!(s, StringSegment::Substitution(_))),
            MappingNodeKind::Fields(fields) => fields.values().any(|f| f.value.contains_substitution()),
            MappingNodeKind::Items(items) => items.iter().any(|i| i.value.contains_substitution()),
        }
    }

    /// True when this node's `StringWithSubstitutions` has more than one
    /// segment (i.e. is an interpolation rather than a single bare
    /// substitution or a plain literal) — relevant to the rule that
    /// interpolation is only permitted when the resolved type is `string`.
    pub fn is_interpolated_string(&self) -> bool {
        matches!(&self.kind, MappingNodeKind::StringWithSubstitutions(segments) if segments.len() > 1)
    }

    pub fn all_substitutions(&self) -> Vec<&Substitution> {
        let mut out = Vec::new();
        self.collect_substitutions(&mut out);
        out
    }

    fn collect_substitutions<'a>(&'a self, out: &mut Vec<&'a Substitution>) {
        match &self.kind {
            MappingNodeKind::Empty | MappingNodeKind::Scalar(_) => {}
            MappingNodeKind::StringWithSubstitutions(segments) => {
                for seg in segments {
                    if let StringSegment::Substitution(s) = seg {
                        out.push(s);
                    }
                }
            }
            MappingNodeKind::Fields(fields) => {
                for f in fields.values() {
                    f.value.collect_substitutions(out);
                }
            }
            MappingNodeKind::Items(items) => {
                for i in items {
                    i.value.collect_substitutions(out);
                }
            }
        }
    }
}
