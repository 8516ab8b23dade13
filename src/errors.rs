//! Error & Diagnostic Model (C1).
//!
//! Mirrors the split the teacher crate uses for `SutraError`: a closed
//! `kind`-style enum carries the data, a small set of trait impls carry the
//! presentation (`Display`, `miette::Diagnostic`). Here the "kind" is the
//! stable, closed `ReasonCode` ABI, and every error additionally
//! carries an ordered `child_errors` sequence so aggregation (C8) can nest
//! independent failures under `multiple_validation_errors` the way the spec
//! requires.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};
use serde::{Deserialize, Serialize};

use crate::span::{Position, Range};

/// The closed set of reason codes. Stable ABI: never
/// renumbered or renamed; new codes may only be appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    MissingVersion,
    InvalidVersion,
    InvalidResource,
    MissingResources,
    MissingResourcesOrIncludes,
    InvalidVariable,
    InvalidVariableType,
    InvalidValue,
    InvalidValueType,
    InvalidExport,
    InvalidReference,
    InvalidSubstitution,
    InvalidInclude,
    InvalidDataSource,
    InvalidMapKey,
    MultipleValidationErrors,
    ReferenceCycle,
    InvalidMappingNode,
    EachResourceDependency,
    EachChildDependency,
    ComputedFieldInBlueprint,
    MissingResourceDependency,
}

impl ReasonCode {
    /// Machine-stable string form, used both for `Serialize` and for the
    /// `miette` diagnostic code shown to users.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingVersion => "missing_version",
            Self::InvalidVersion => "invalid_version",
            Self::InvalidResource => "invalid_resource",
            Self::MissingResources => "missing_resources",
            Self::MissingResourcesOrIncludes => "missing_resources_or_includes",
            Self::InvalidVariable => "invalid_variable",
            Self::InvalidVariableType => "invalid_variable_type",
            Self::InvalidValue => "invalid_value",
            Self::InvalidValueType => "invalid_value_type",
            Self::InvalidExport => "invalid_export",
            Self::InvalidReference => "invalid_reference",
            Self::InvalidSubstitution => "invalid_substitution",
            Self::InvalidInclude => "invalid_include",
            Self::InvalidDataSource => "invalid_data_source",
            Self::InvalidMapKey => "invalid_map_key",
            Self::MultipleValidationErrors => "multiple_validation_errors",
            Self::ReferenceCycle => "reference_cycle",
            Self::InvalidMappingNode => "invalid_mapping_node",
            Self::EachResourceDependency => "each_resource_dependency",
            Self::EachChildDependency => "each_child_dependency",
            Self::ComputedFieldInBlueprint => "computed_field_in_blueprint",
            Self::MissingResourceDependency => "missing_resource_dependency",
        }
    }

    /// True for the one code that represents an aggregate of other errors
    /// rather than an independent failure (Testable Property 4).
    pub fn is_aggregate(self) -> bool {
        matches!(self, Self::MultipleValidationErrors)
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified, positioned validation error, optionally wrapping independent
/// child errors (only non-empty when `reason_code == MultipleValidationErrors`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    pub reason_code: ReasonCode,
    pub message: String,
    pub position: Option<Position>,
    pub child_errors: Vec<ValidationError>,
}

impl ValidationError {
    pub fn new(reason_code: ReasonCode, message: impl Into<String>) -> Self {
        Self {
            reason_code,
            message: message.into(),
            position: None,
            child_errors: Vec::new(),
        }
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// The fixed summary sentence used for the aggregate reason code.
    pub fn aggregate(children: Vec<ValidationError>) -> Self {
        debug_assert!(
            children.len() >= 2,
            "aggregate() requires at least two independent child errors"
        );
        let position = children.first().and_then(|c| c.position);
        Self {
            reason_code: ReasonCode::MultipleValidationErrors,
            message: format!(
                "validation failed with {} separate errors, see child errors for details",
                children.len()
            ),
            position,
            child_errors: children,
        }
    }

    /// Flattens an aggregate into its children; returns `self` unchanged (as a
    /// single-element vec) for any non-aggregate error. Useful for callers
    /// that need a flat list of "leaf" reasons for assertions.
    pub fn leaves(&self) -> Vec<&ValidationError> {
        if self.child_errors.is_empty() {
            vec![self]
        } else {
            self.child_errors.iter().flat_map(|c| c.leaves()).collect()
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.reason_code, self.message)
    }
}

impl std::error::Error for ValidationError {}

impl MietteDiagnostic for ValidationError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.reason_code))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let position = self.position?;
        let range = Range::from_start_only(position);
        let _ = range; // byte offsets are not tracked on ValidationError; line/col only.
        None
    }

    fn related<'a>(&'a self) -> Option<Box<dyn Iterator<Item = &'a dyn MietteDiagnostic> + 'a>> {
        if self.child_errors.is_empty() {
            None
        } else {
            Some(Box::new(
                self.child_errors.iter().map(|c| c as &dyn MietteDiagnostic),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_carries_fixed_summary_and_children() {
        let a = ValidationError::new(ReasonCode::MissingVersion, "no version");
        let b = ValidationError::new(ReasonCode::InvalidResource, "bad resource");
        let agg = ValidationError::aggregate(vec![a, b]);
        assert_eq!(agg.reason_code, ReasonCode::MultipleValidationErrors);
        assert_eq!(agg.child_errors.len(), 2);
        assert!(agg.message.contains("2 separate errors"));
    }

    #[test]
    fn leaves_flattens_nested_aggregates() {
        let a = ValidationError::new(ReasonCode::MissingVersion, "no version");
        let b = ValidationError::new(ReasonCode::InvalidResource, "bad resource");
        let agg = ValidationError::aggregate(vec![a, b]);
        let c = ValidationError::new(ReasonCode::InvalidInclude, "bad include");
        let top = ValidationError::aggregate(vec![agg, c]);
        assert_eq!(top.leaves().len(), 3);
        assert!(top.leaves().iter().all(|l| !l.reason_code.is_aggregate()));
    }

    #[test]
    fn reason_code_strings_are_stable() {
        assert_eq!(ReasonCode::MissingVersion.as_str(), "missing_version");
        assert_eq!(
            ReasonCode::MultipleValidationErrors.as_str(),
            "multiple_validation_errors"
        );
    }
}
