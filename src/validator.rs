//! Top-level entry point: wires C1 through C9 into one pass over a
//! blueprint. Grounded on the teacher's `SemanticValidator` builder — a
//! struct holding the injected registries plus a `.validate(&self, ...)`
//! method — with a `validate_blueprint` free function as the common-case
//! shortcut for callers who don't need to reuse a configured validator
//! across documents.

use tracing::{debug, instrument};

use crate::cancellation::{CancellationToken, Cancelled};
use crate::config::ValidatorConfig;
use crate::diagnostics::Diagnostic;
use crate::elements::{self, Registries};
use crate::errors::ValidationError;
use crate::model::blueprint::Blueprint;
use crate::reference_chain::ReferenceChainCollector;
use crate::registries::{CustomVariableTypeRegistry, DataSourceRegistry, FunctionRegistry, ResourceRegistry};

/// The result of validating one blueprint: every diagnostic gathered across
/// every element, the (possibly aggregate) error if the blueprint is
/// invalid, and the reference edges collected along the way for an external
/// cycle detector to consume.
#[derive(Debug)]
pub struct ValidationOutcome {
    pub diagnostics: Vec<Diagnostic>,
    pub error: Option<ValidationError>,
    pub reference_chain: ReferenceChainCollector,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}

/// A configured validator over one set of provider registries. Build once,
/// reuse across many blueprints sharing the same provider surface.
pub struct Validator<'a> {
    functions: &'a dyn FunctionRegistry,
    resources: &'a dyn ResourceRegistry,
    data_sources: &'a dyn DataSourceRegistry,
    custom_variable_types: &'a dyn CustomVariableTypeRegistry,
    config: ValidatorConfig,
}

impl<'a> Validator<'a> {
    pub fn new(
        functions: &'a dyn FunctionRegistry,
        resources: &'a dyn ResourceRegistry,
        data_sources: &'a dyn DataSourceRegistry,
        custom_variable_types: &'a dyn CustomVariableTypeRegistry,
    ) -> Self {
        Self {
            functions,
            resources,
            data_sources,
            custom_variable_types,
            config: ValidatorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs every check in the fixed cross-element order: blueprint-level
    /// checks, transforms, variables, values, data sources, includes,
    /// resources, exports. Each group collects independently; a single
    /// group's error is returned unwrapped, more than one group failing
    /// wraps them all under `multiple_validation_errors`.
    #[instrument(level = "debug", skip_all, fields(version = blueprint.version.as_deref().unwrap_or("<none>")))]
    pub fn validate(&self, blueprint: &Blueprint, cancellation: &CancellationToken) -> Result<ValidationOutcome, Cancelled> {
        let mut collector = ReferenceChainCollector::new();
        let registries = Registries {
            blueprint,
            functions: self.functions,
            resources: self.resources,
            data_sources: self.data_sources,
            custom_variable_types: self.custom_variable_types,
            config: &self.config,
        };

        let mut groups: Vec<(Vec<Diagnostic>, Option<ValidationError>)> = Vec::new();

        groups.push(elements::blueprint::check_blueprint(&registries));
        groups.push(elements::transform::check_transforms(&registries));

        let mut names: Vec<&String> = blueprint.variables.by_name.keys().collect();
        names.sort();
        let mut variable_items = Vec::new();
        for name in names {
            let variable = blueprint.variables.by_name.get(name).expect("key came from this map");
            variable_items.push(elements::variable::check_variable(name, variable, &registries, cancellation)?);
        }
        groups.push(fold_group(variable_items));

        let mut names: Vec<&String> = blueprint.values.by_name.keys().collect();
        names.sort();
        let mut value_items = Vec::new();
        for name in names {
            let value = blueprint.values.by_name.get(name).expect("key came from this map");
            value_items.push(elements::value::check_value(name, value, &registries, &mut collector, cancellation)?);
        }
        groups.push(fold_group(value_items));

        let mut names: Vec<&String> = blueprint.datasources.by_name.keys().collect();
        names.sort();
        let mut data_source_items = Vec::new();
        for name in names {
            let ds = blueprint.datasources.by_name.get(name).expect("key came from this map");
            data_source_items.push(elements::data_source::check_data_source(name, ds, &registries, &mut collector, cancellation)?);
        }
        groups.push(fold_group(data_source_items));

        let mut names: Vec<&String> = blueprint.includes.by_name.keys().collect();
        names.sort();
        let mut include_items = Vec::new();
        for name in names {
            let include = blueprint.includes.by_name.get(name).expect("key came from this map");
            include_items.push(elements::include::check_include(name, include, &registries, &mut collector, cancellation)?);
        }
        groups.push(fold_group(include_items));

        let mut names: Vec<&String> = blueprint.resources.by_name.keys().collect();
        names.sort();
        let mut resource_items = Vec::new();
        for name in names {
            let resource = blueprint.resources.by_name.get(name).expect("key came from this map");
            resource_items.push(elements::resource::check_resource(name, resource, &registries, &mut collector, cancellation)?);
        }
        groups.push(fold_group(resource_items));

        let mut names: Vec<&String> = blueprint.exports.by_name.keys().collect();
        names.sort();
        let mut export_items = Vec::new();
        for name in names {
            let export = blueprint.exports.by_name.get(name).expect("key came from this map");
            export_items.push(elements::export::check_export(name, export, &registries, &mut collector, cancellation)?);
        }
        groups.push(fold_group(export_items));

        let (diagnostics, error) = fold_group(groups);
        debug!(diagnostic_count = diagnostics.len(), has_error = error.is_some(), "blueprint validation finished");

        Ok(ValidationOutcome {
            diagnostics,
            error,
            reference_chain: collector,
        })
    }
}

fn fold_group(items: Vec<(Vec<Diagnostic>, Option<ValidationError>)>) -> (Vec<Diagnostic>, Option<ValidationError>) {
    let mut diagnostics = Vec::new();
    let mut errors = Vec::new();
    for (diags, error) in items {
        diagnostics.extend(diags);
        if let Some(e) = error {
            errors.push(e);
        }
    }
    let error = match errors.len() {
        0 => None,
        1 => errors.into_iter().next(),
        _ => Some(ValidationError::aggregate(errors)),
    };
    (diagnostics, error)
}

/// Validates `blueprint` once against the given registries and config.
/// Equivalent to building a [`Validator`] and calling
/// [`Validator::validate`]; use the builder directly when validating many
/// blueprints against the same provider surface.
pub fn validate_blueprint(
    blueprint: &Blueprint,
    functions: &dyn FunctionRegistry,
    resources: &dyn ResourceRegistry,
    data_sources: &dyn DataSourceRegistry,
    custom_variable_types: &dyn CustomVariableTypeRegistry,
    config: &ValidatorConfig,
    cancellation: &CancellationToken,
) -> Result<ValidationOutcome, Cancelled> {
    Validator::new(functions, resources, data_sources, custom_variable_types)
        .with_config(config.clone())
        .validate(blueprint, cancellation)
}
