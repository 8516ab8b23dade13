//! Scalar literal values shared by [`super::substitution::Substitution`] and
//! [`super::mapping_node::MappingNode`].

use serde::{Deserialize, Serialize};

use crate::numeric::{canonical_float, canonical_integer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scalar {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl Scalar {
    /// One of the eight resolved type tokens.
    pub fn type_token(&self) -> &'static str {
        match self {
            Scalar::String(_) => "string",
            Scalar::Integer(_) => "integer",
            Scalar::Float(_) => "float",
            Scalar::Boolean(_) => "boolean",
        }
    }

    /// The canonical string form used in diagnostic messages.
    pub fn canonical_string(&self) -> String {
        match self {
            Scalar::String(s) => s.clone(),
            Scalar::Integer(i) => canonical_integer(*i),
            Scalar::Float(f) => canonical_float(*f),
            Scalar::Boolean(b) => b.to_string(),
        }
    }
}
