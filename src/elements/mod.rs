//! Element Validators (C7): one module per element kind, each orchestrating
//! C1 through C6 over that element's fields. Every item in a kind's check
//! list runs regardless of earlier failures; the element's own errors
//! aggregate via [`crate::aggregation::run_all`].

pub mod blueprint;
pub mod data_source;
pub mod export;
pub mod include;
pub mod resource;
pub mod transform;
pub mod value;
pub mod variable;

use crate::cancellation::{CancellationToken, Cancelled};
use crate::config::ValidatorConfig;
use crate::grammar::{ParsedReference, ReferenceKind};
use crate::model::blueprint::Blueprint;
use crate::model::mapping_node::MappingNode;
use crate::model::substitution::{Substitution, SubstitutionKind};
use crate::reference_chain::ReferenceChainCollector;
use crate::registries::{CustomVariableTypeRegistry, DataSourceRegistry, FunctionRegistry, ResourceRegistry};
use crate::schema_validator::SchemaCheckOutcome;
use crate::span::Range;
use crate::type_checker::{check_substitution, TypeCheckContext, TypeCheckResult};

/// The registry/config bundle every element validator needs. Borrowed for the
/// whole blueprint validation; the collector and cancellation token are
/// threaded separately since they're mutated/observed per call.
pub struct Registries<'a> {
    pub blueprint: &'a Blueprint,
    pub functions: &'a dyn FunctionRegistry,
    pub resources: &'a dyn ResourceRegistry,
    pub data_sources: &'a dyn DataSourceRegistry,
    pub custom_variable_types: &'a dyn CustomVariableTypeRegistry,
    pub config: &'a ValidatorConfig,
}

/// Type-checks one substitution in the context of the element that embeds it.
pub fn check_sub(
    sub: &Substitution,
    used_in: &str,
    tag: &str,
    registries: &Registries<'_>,
    collector: &mut ReferenceChainCollector,
    cancellation: &CancellationToken,
) -> Result<TypeCheckResult, Cancelled> {
    let mut ctx = TypeCheckContext {
        blueprint: registries.blueprint,
        used_in,
        tag,
        functions: registries.functions,
        resources: registries.resources,
        data_sources: registries.data_sources,
        collector,
        cancellation,
        config: registries.config,
    };
    check_substitution(sub, &mut ctx)
}

/// Validates a free-form mapping-node field (C9 then C5).
pub fn check_mapping_node(
    node: &MappingNode,
    nullable: bool,
    used_in: &str,
    tag: &str,
    registries: &Registries<'_>,
    collector: &mut ReferenceChainCollector,
    cancellation: &CancellationToken,
) -> Result<(Vec<crate::diagnostics::Diagnostic>, Option<crate::errors::ValidationError>), Cancelled> {
    if let Err(key_error) = crate::pre_validation::pre_validate(node) {
        return Ok((Vec::new(), Some(key_error)));
    }
    let mut ctx = TypeCheckContext {
        blueprint: registries.blueprint,
        used_in,
        tag,
        functions: registries.functions,
        resources: registries.resources,
        data_sources: registries.data_sources,
        collector,
        cancellation,
        config: registries.config,
    };
    let outcome = crate::mapping_node_validator::validate_mapping_node(node, nullable, &mut ctx)?;
    Ok((outcome.diagnostics, outcome.error))
}

/// Validates a resource spec against its provider schema (C6), given the
/// schema was already retrieved by the caller. Every substitution embedded
/// in the spec is still dispatched through C4, regardless of whether its
/// enclosing constraint check ends up deferred.
#[allow(clippy::too_many_arguments)]
pub fn check_schema(
    node: &MappingNode,
    schema: &crate::registries::SchemaNode,
    resource_type: &str,
    used_in: &str,
    tag: &str,
    registries: &Registries<'_>,
    collector: &mut ReferenceChainCollector,
    cancellation: &CancellationToken,
) -> Result<SchemaCheckOutcome, Cancelled> {
    let mut ctx = TypeCheckContext {
        blueprint: registries.blueprint,
        used_in,
        tag,
        functions: registries.functions,
        resources: registries.resources,
        data_sources: registries.data_sources,
        collector,
        cancellation,
        config: registries.config,
    };
    crate::schema_validator::validate_against_schema(node, schema, resource_type, &mut ctx)
}

/// Converts a parsed textual reference into the equivalent substitution kind,
/// so export-field resolution can reuse C4 instead of duplicating its rules.
pub fn substitution_kind_from_parsed(parsed: ParsedReference) -> SubstitutionKind {
    match parsed.kind {
        ReferenceKind::Variable => SubstitutionKind::Variable { name: parsed.name },
        ReferenceKind::Value => SubstitutionKind::ValueReference {
            name: parsed.name,
            path: parsed.path,
        },
        ReferenceKind::DataSource => SubstitutionKind::DataSourceProperty {
            data_source: parsed.name,
            field: parsed.field.unwrap_or_default(),
            index: parsed.index,
        },
        ReferenceKind::Child => SubstitutionKind::Child {
            include: parsed.name,
            path: parsed.path,
        },
        ReferenceKind::Resource => SubstitutionKind::ResourceProperty {
            resource: parsed.name,
            path: parsed.path,
        },
    }
}

/// True for the four resolved type tokens that count as "primitive"
/// (`string|integer|float|boolean`), used by several C7 rules that require a
/// substitution resolve to a scalar rather than `array`/`object`/`function`.
/// `any` is handled separately by callers, since an unresolvable type is
/// usually a warning rather than an outright rejection.
pub fn is_primitive_token(token: &str) -> bool {
    matches!(token, "string" | "integer" | "float" | "boolean")
}

pub fn range_or_unknown(node: &MappingNode) -> Range {
    node.source_meta.unwrap_or_else(Range::unknown)
}
