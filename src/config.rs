//! Host-tunable validator behavior: the handful of knobs that differ across
//! blueprint spec revisions rather than being fixed by this engine. Grounded
//! on the builder-style `SemanticValidator`/`ValidationConfig` pair (explicit
//! `Default`, `with_*` builder methods returning `Self`).

use std::collections::HashSet;

use crate::errors::ReasonCode;

#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    pub supported_versions: HashSet<String>,
    /// Which reason code a blueprint with neither resources nor includes
    /// should receive — this differs across spec revisions.
    pub missing_resources_reason: ReasonCode,
    /// Whether an unregistered, non-core-like function name is a hard error
    /// or a warning.
    pub unknown_function_is_error: bool,
    pub core_transforms: HashSet<String>,
    /// When true, transform validation is skipped entirely (the blueprint
    /// will be transformed by an upstream step before this validator ever
    /// sees its final transform list).
    pub blueprint_will_be_transformed: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            supported_versions: ["2023-04-20", "2025-05-12"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            missing_resources_reason: ReasonCode::MissingResources,
            unknown_function_is_error: true,
            core_transforms: HashSet::new(),
            blueprint_will_be_transformed: false,
        }
    }
}

impl ValidatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_supported_versions(mut self, versions: impl IntoIterator<Item = String>) -> Self {
        self.supported_versions = versions.into_iter().collect();
        self
    }

    pub fn with_missing_resources_reason(mut self, reason: ReasonCode) -> Self {
        self.missing_resources_reason = reason;
        self
    }

    pub fn with_unknown_function_is_error(mut self, is_error: bool) -> Self {
        self.unknown_function_is_error = is_error;
        self
    }

    pub fn with_core_transforms(mut self, transforms: impl IntoIterator<Item = String>) -> Self {
        self.core_transforms = transforms.into_iter().collect();
        self
    }

    pub fn with_blueprint_will_be_transformed(mut self, will_be_transformed: bool) -> Self {
        self.blueprint_will_be_transformed = will_be_transformed;
        self
    }
}
