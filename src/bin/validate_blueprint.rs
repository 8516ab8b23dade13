//! Standalone CLI for running the validator over a blueprint document from
//! disk. Grounded on the teacher's `clap`-derive `SutraArgs`/`Command`
//! pattern (`src/cli/args.rs`, `src/cli/mod.rs`): a single top-level parser
//! dispatching to one subcommand per action.
//!
//! This binary has no real provider backend to consult, so it validates
//! against an "open" registry set that accepts every resource/data-source
//! type and every function by name, deferring their structural checks with a
//! warning instead of rejecting them outright. It is meant for checking a
//! blueprint's own internal consistency (references, substitution types,
//! mapping-node shape) in isolation; a host embedding this crate against a
//! real provider catalog gets the stricter checks those provide.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use im::HashMap;

use blueprint_validate::diagnostics::{Diagnostic, Severity};
use blueprint_validate::errors::ValidationError;
use blueprint_validate::model::mapping_node::MappingNode;
use blueprint_validate::model::scalar::Scalar;
use blueprint_validate::model::Blueprint;
use blueprint_validate::registries::{
    CustomVariableTypeRegistry, DataSourceExportField, DataSourceRegistry, FunctionDefinition, FunctionRegistry, ResourceRegistry,
    ResourceSpecDefinition,
};
use blueprint_validate::{cancellation::CancellationToken, validate_blueprint, ValidatorConfig};

#[derive(Parser)]
#[command(name = "validate-blueprint", version, about = "Validate a declarative infrastructure blueprint document")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a blueprint document and print its diagnostics.
    Check {
        /// Path to a JSON or YAML blueprint document.
        #[arg(required = true)]
        file: PathBuf,
        /// Fail on warnings in addition to errors.
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    match args.command {
        Command::Check { file, strict } => run_check(&file, strict),
    }
}

fn run_check(file: &PathBuf, strict: bool) -> ExitCode {
    let blueprint = match read_blueprint(file) {
        Ok(blueprint) => blueprint,
        Err(message) => {
            eprintln!("error: {message}");
            return ExitCode::FAILURE;
        }
    };

    let functions = OpenFunctionRegistry;
    let resources = OpenResourceRegistry;
    let data_sources = OpenDataSourceRegistry;
    let custom_variable_types = OpenCustomVariableTypeRegistry;
    let config = ValidatorConfig::new().with_unknown_function_is_error(false);
    let cancellation = CancellationToken::new();

    let outcome = match validate_blueprint(&blueprint, &functions, &resources, &data_sources, &custom_variable_types, &config, &cancellation) {
        Ok(outcome) => outcome,
        Err(_) => {
            eprintln!("error: validation was cancelled");
            return ExitCode::FAILURE;
        }
    };

    for diagnostic in &outcome.diagnostics {
        print_diagnostic(diagnostic);
    }

    if let Some(error) = &outcome.error {
        print_error(error);
        return ExitCode::FAILURE;
    }

    if strict && outcome.diagnostics.iter().any(|d| !matches!(d.severity, Severity::Info)) {
        return ExitCode::FAILURE;
    }

    println!("blueprint is valid");
    ExitCode::SUCCESS
}

fn read_blueprint(path: &PathBuf) -> Result<Blueprint, String> {
    let contents = fs::read_to_string(path).map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    let is_json = path.extension().and_then(|ext| ext.to_str()) == Some("json");
    if is_json {
        serde_json::from_str(&contents).map_err(|e| format!("failed to parse {} as JSON: {e}", path.display()))
    } else {
        serde_yaml::from_str(&contents).map_err(|e| format!("failed to parse {} as YAML: {e}", path.display()))
    }
}

fn print_diagnostic(diagnostic: &Diagnostic) {
    let label = match diagnostic.severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "info",
    };
    println!(
        "{label} [{}:{}]: {}",
        diagnostic.range.start.line, diagnostic.range.start.column, diagnostic.message
    );
}

fn print_error(error: &ValidationError) {
    eprintln!("{:?}", miette::Report::new(error.clone()));
}

/// Accepts every function by name, leaving argument/arity checking to
/// whatever core-function knowledge the caller's config supplies.
struct OpenFunctionRegistry;

impl FunctionRegistry for OpenFunctionRegistry {
    fn has(&self, _name: &str) -> bool {
        true
    }

    fn get_definition(&self, name: &str, _cancellation: &CancellationToken) -> Result<FunctionDefinition, ValidationError> {
        Err(ValidationError::new(
            blueprint_validate::ReasonCode::InvalidSubstitution,
            format!("no definition published for function \"{name}\""),
        ))
    }
}

/// Accepts every resource type, but never has a spec schema to check
/// against — every `spec` field is reported with a "not currently loaded"
/// warning rather than validated structurally.
struct OpenResourceRegistry;

impl ResourceRegistry for OpenResourceRegistry {
    fn has_type(&self, _resource_type: &str) -> bool {
        true
    }

    fn get_spec_definition(&self, _resource_type: &str, _cancellation: &CancellationToken) -> Result<Option<ResourceSpecDefinition>, ValidationError> {
        Ok(None)
    }

    fn custom_validate(
        &self,
        _resource_type: &str,
        _input: &MappingNode,
        _cancellation: &CancellationToken,
    ) -> Result<(Vec<Diagnostic>, Option<ValidationError>), ValidationError> {
        Ok((Vec::new(), None))
    }
}

/// Accepts every data source type and filter field, and never has a
/// published export field to cross-check declared export types against.
struct OpenDataSourceRegistry;

impl DataSourceRegistry for OpenDataSourceRegistry {
    fn has_type(&self, _data_source_type: &str) -> bool {
        true
    }

    fn has_filter_field(&self, _data_source_type: &str, _field: &str) -> bool {
        true
    }

    fn get_export_field(&self, _data_source_type: &str, _field: &str, _cancellation: &CancellationToken) -> Result<Option<DataSourceExportField>, ValidationError> {
        Ok(None)
    }
}

/// Publishes no options for any custom variable type, so `allowed_values`
/// on a custom-typed variable is always deferred with a warning rather than
/// checked against a provider-published set.
struct OpenCustomVariableTypeRegistry;

impl CustomVariableTypeRegistry for OpenCustomVariableTypeRegistry {
    fn options(&self, _type_name: &str, _cancellation: &CancellationToken) -> Result<HashMap<String, Scalar>, ValidationError> {
        Ok(HashMap::new())
    }
}
