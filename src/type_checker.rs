//! Substitution Type Checker (C4): given a substitution AST node, returns its
//! resolved type as one of the eight type tokens, a diagnostics list, and
//! possibly an error. The largest single component — one match arm per
//! [`crate::model::substitution::SubstitutionKind`] variant, each
//! implementing its own lookup/path-walking rule.

use crate::cancellation::{CancellationToken, Cancelled};
use crate::config::ValidatorConfig;
use crate::diagnostics::Diagnostic;
use crate::errors::{ReasonCode, ValidationError};
use crate::grammar::ReferenceKind;
use crate::model::blueprint::Blueprint;
use crate::model::resource::Resource;
use crate::model::scalar::Scalar;
use crate::model::substitution::{PathSegment, Substitution, SubstitutionKind};
use crate::model::variable::VariableType;
use crate::reference_chain::{element_id, ReferenceChainCollector};
use crate::registries::{DataSourceRegistry, FunctionRegistry, ResourceRegistry, SchemaNode};
use crate::span::Range;

pub const ANY: &str = "any";

/// Everything C4 needs that isn't carried by the substitution node itself.
pub struct TypeCheckContext<'a> {
    pub blueprint: &'a Blueprint,
    /// The owning element's id, e.g. `"resources.testCluster"`.
    pub used_in: &'a str,
    /// The property that embeds this substitution, recorded as an edge tag
    /// (e.g. `"each"`, `"description"`, a spec path).
    pub tag: &'a str,
    pub functions: &'a dyn FunctionRegistry,
    pub resources: &'a dyn ResourceRegistry,
    pub data_sources: &'a dyn DataSourceRegistry,
    pub collector: &'a mut ReferenceChainCollector,
    pub cancellation: &'a CancellationToken,
    pub config: &'a ValidatorConfig,
}

pub struct TypeCheckResult {
    pub resolved_type: String,
    pub diagnostics: Vec<Diagnostic>,
    pub error: Option<ValidationError>,
}

impl TypeCheckResult {
    fn any() -> Self {
        Self {
            resolved_type: ANY.to_string(),
            diagnostics: Vec::new(),
            error: None,
        }
    }

    fn ok(resolved_type: impl Into<String>) -> Self {
        Self {
            resolved_type: resolved_type.into(),
            diagnostics: Vec::new(),
            error: None,
        }
    }

    fn error(resolved_type: impl Into<String>, err: ValidationError) -> Self {
        Self {
            resolved_type: resolved_type.into(),
            diagnostics: Vec::new(),
            error: Some(err),
        }
    }
}

fn invalid_substitution(message: impl Into<String>, range: Range) -> ValidationError {
    ValidationError::new(ReasonCode::InvalidSubstitution, message.into()).with_position(range.start)
}

/// Resolves the type of a single substitution node.
pub fn check_substitution(
    sub: &Substitution,
    ctx: &mut TypeCheckContext<'_>,
) -> Result<TypeCheckResult, Cancelled> {
    let range = sub.source_meta;
    let outcome = match &sub.kind {
        SubstitutionKind::Literal(scalar) => TypeCheckResult::ok(scalar.type_token()),
        SubstitutionKind::Variable { name } => check_variable(name, range, ctx),
        SubstitutionKind::ValueReference { name, path } => check_value_reference(name, path, range, ctx),
        SubstitutionKind::ElemReference => check_elem_reference(false, range, ctx),
        SubstitutionKind::ElemIndexReference => check_elem_reference(true, range, ctx),
        SubstitutionKind::ResourceProperty { resource, path } => {
            check_resource_property(resource, path, range, ctx)?
        }
        SubstitutionKind::DataSourceProperty {
            data_source,
            field,
            index,
        } => check_data_source_property(data_source, field, *index, range, ctx),
        SubstitutionKind::Child { include, path } => check_child(include, path, range, ctx),
        SubstitutionKind::FunctionCall { name, arguments } => {
            check_function_call(name, arguments, range, ctx)?
        }
    };
    Ok(outcome)
}

fn check_variable(name: &str, range: Range, ctx: &TypeCheckContext<'_>) -> TypeCheckResult {
    match ctx.blueprint.variables.get(name) {
        None => TypeCheckResult::error(
            ANY,
            invalid_substitution(format!("variable \"{name}\" does not exist"), range),
        ),
        Some(variable) => {
            let token = match &variable.var_type {
                VariableType::Integer => "integer",
                VariableType::Float => "float",
                VariableType::Boolean => "boolean",
                VariableType::String | VariableType::Custom(_) => "string",
            };
            TypeCheckResult::ok(token)
        }
    }
}

fn check_value_reference(
    name: &str,
    path: &[PathSegment],
    range: Range,
    ctx: &mut TypeCheckContext<'_>,
) -> TypeCheckResult {
    let target_id = element_id(ReferenceKind::Value, name);
    if target_id == ctx.used_in {
        return TypeCheckResult::error(
            ANY,
            invalid_substitution(format!("value \"{name}\" can not reference itself"), range),
        );
    }
    match ctx.blueprint.values.get(name) {
        None => TypeCheckResult::error(
            ANY,
            invalid_substitution(format!("value \"{name}\" does not exist"), range),
        ),
        Some(value) => {
            ctx.collector
                .collect(target_id, ctx.used_in.to_string(), vec![ctx.tag.to_string()]);
            if !path.is_empty() {
                TypeCheckResult::any()
            } else {
                TypeCheckResult::ok(value.value_type.map(|t| t.type_token()).unwrap_or(ANY))
            }
        }
    }
}

fn check_elem_reference(is_index: bool, range: Range, ctx: &TypeCheckContext<'_>) -> TypeCheckResult {
    let Some(resource_name) = ctx.used_in.strip_prefix("resources.") else {
        return TypeCheckResult::error(
            ANY,
            invalid_substitution(
                "elem/elem_index references are only valid inside a resource",
                range,
            ),
        );
    };
    match ctx.blueprint.resources.get(resource_name) {
        Some(resource) if resource.is_template() => {
            TypeCheckResult::ok(if is_index { "integer" } else { ANY })
        }
        Some(_) => TypeCheckResult::error(
            ANY,
            invalid_substitution(
                format!("resource \"{resource_name}\" has no \"each\" property, elem references require a template resource"),
                range,
            ),
        ),
        None => TypeCheckResult::error(
            ANY,
            invalid_substitution(format!("resource \"{resource_name}\" does not exist"), range),
        ),
    }
}

fn check_resource_property(
    resource_name: &str,
    path: &[PathSegment],
    range: Range,
    ctx: &mut TypeCheckContext<'_>,
) -> Result<TypeCheckResult, Cancelled> {
    let target_id = element_id(ReferenceKind::Resource, resource_name);
    if target_id == ctx.used_in {
        return Ok(TypeCheckResult::error(
            ANY,
            invalid_substitution(
                format!("resource \"{resource_name}\" can not reference itself"),
                range,
            ),
        ));
    }
    let Some(resource) = ctx.blueprint.resources.get(resource_name) else {
        return Ok(TypeCheckResult::error(
            ANY,
            invalid_substitution(format!("resource \"{resource_name}\" does not exist"), range),
        ));
    };
    ctx.collector
        .collect(target_id, ctx.used_in.to_string(), vec![ctx.tag.to_string()]);

    match path.first() {
        Some(PathSegment::Field(head)) if head == "spec" => {
            Ok(walk_spec(resource, &path[1..], range, ctx)?)
        }
        Some(PathSegment::Field(head)) if head == "metadata" => {
            Ok(walk_metadata(resource, &path[1..], range))
        }
        _ => Ok(TypeCheckResult::any()),
    }
}

fn walk_spec(
    resource: &Resource,
    rest: &[PathSegment],
    range: Range,
    ctx: &mut TypeCheckContext<'_>,
) -> Result<TypeCheckResult, Cancelled> {
    ctx.cancellation.check()?;
    match ctx.resources.get_spec_definition(&resource.res_type, ctx.cancellation) {
        Err(registry_err) => Ok(TypeCheckResult::error(ANY, registry_err)),
        Ok(None) => {
            let mut result = TypeCheckResult::any();
            result.diagnostics.push(Diagnostic::warning(
                format!(
                    "the \"{}\" resource type is not currently loaded, can not check this property",
                    resource.res_type
                ),
                range,
            ));
            Ok(result)
        }
        Ok(Some(spec_def)) => match walk_schema(&spec_def.schema, rest) {
            Ok(token) => Ok(TypeCheckResult::ok(token)),
            Err(message) => Ok(TypeCheckResult::error(ANY, invalid_substitution(message, range))),
        },
    }
}

fn walk_schema(schema: &SchemaNode, path: &[PathSegment]) -> Result<&'static str, String> {
    if path.is_empty() {
        return Ok(schema.type_token());
    }
    match (&path[0], schema) {
        (PathSegment::Field(name), SchemaNode::Object { attributes, .. }) => match attributes.get(name) {
            Some(sub) => walk_schema(sub, &path[1..]),
            None => Err(format!("field \"{name}\" does not exist on this resource spec")),
        },
        (PathSegment::Field(_), SchemaNode::Map { map_values, .. }) => walk_schema(map_values, &path[1..]),
        (PathSegment::Field(_), SchemaNode::Union { one_of, .. }) => one_of
            .iter()
            .find_map(|branch| walk_schema(branch, path).ok())
            .ok_or_else(|| "no union branch matches this property path".to_string()),
        (PathSegment::Index(_), SchemaNode::Array { items, .. }) => walk_schema(items, &path[1..]),
        (PathSegment::Field(name), _) => {
            Err(format!("\"{name}\" is not a valid field on this part of the resource spec"))
        }
        (PathSegment::Index(_), _) => {
            Err("an index step requires an array schema at this point in the path".to_string())
        }
    }
}

fn walk_metadata(resource: &Resource, rest: &[PathSegment], range: Range) -> TypeCheckResult {
    match rest.first() {
        None => TypeCheckResult::error(
            ANY,
            invalid_substitution("a metadata reference must name a sub-field", range),
        ),
        Some(PathSegment::Index(_)) => TypeCheckResult::error(
            ANY,
            invalid_substitution("metadata paths use field names, not indices", range),
        ),
        Some(PathSegment::Field(field)) => match field.as_str() {
            "display_name" if rest.len() == 1 => TypeCheckResult::ok("string"),
            "display_name" => TypeCheckResult::error(
                ANY,
                invalid_substitution("display_name permits no further path segments", range),
            ),
            "annotations" | "labels" => {
                let type_token = if field == "labels" { "string" } else { ANY };
                match rest.get(1) {
                    Some(PathSegment::Field(key)) if rest.len() == 2 => {
                        let exists = resource
                            .metadata
                            .as_ref()
                            .map(|m| {
                                if field == "labels" {
                                    m.labels.contains_key(key)
                                } else {
                                    m.annotations.contains_key(key)
                                }
                            })
                            .unwrap_or(false);
                        if exists {
                            TypeCheckResult::ok(type_token)
                        } else {
                            TypeCheckResult::error(
                                ANY,
                                invalid_substitution(
                                    format!("\"{key}\" is not a key on this resource's {field}"),
                                    range,
                                ),
                            )
                        }
                    }
                    _ => TypeCheckResult::error(
                        ANY,
                        invalid_substitution(format!("{field} requires exactly one key segment"), range),
                    ),
                }
            }
            "custom" => TypeCheckResult::ok(ANY),
            other => TypeCheckResult::error(
                ANY,
                invalid_substitution(format!("\"{other}\" is not a valid metadata field"), range),
            ),
        },
    }
}

fn check_data_source_property(
    data_source: &str,
    field: &str,
    index: Option<u64>,
    range: Range,
    ctx: &mut TypeCheckContext<'_>,
) -> TypeCheckResult {
    let target_id = element_id(ReferenceKind::DataSource, data_source);
    if target_id == ctx.used_in {
        return TypeCheckResult::error(
            ANY,
            invalid_substitution(
                format!("data source \"{data_source}\" can not reference itself"),
                range,
            ),
        );
    }
    let Some(ds) = ctx.blueprint.datasources.get(data_source) else {
        return TypeCheckResult::error(
            ANY,
            invalid_substitution(format!("data source \"{data_source}\" does not exist"), range),
        );
    };
    let Some(export) = ds.exports.get(field) else {
        return TypeCheckResult::error(
            ANY,
            invalid_substitution(
                format!("\"{field}\" is not an exported field of data source \"{data_source}\""),
                range,
            ),
        );
    };
    ctx.collector
        .collect(target_id, ctx.used_in.to_string(), vec![ctx.tag.to_string()]);

    if index.is_some() {
        if export.value_type != crate::model::value::ValueType::Array {
            return TypeCheckResult::error(
                ANY,
                invalid_substitution(
                    format!("\"{field}\" is not an array, an index can not be applied to it"),
                    range,
                ),
            );
        }
        return TypeCheckResult::any();
    }
    TypeCheckResult::ok(export.value_type.type_token())
}

fn check_child(include: &str, path: &[PathSegment], range: Range, ctx: &mut TypeCheckContext<'_>) -> TypeCheckResult {
    let _ = path;
    let target_id = element_id(ReferenceKind::Child, include);
    if target_id == ctx.used_in {
        return TypeCheckResult::error(
            ANY,
            invalid_substitution(format!("include \"{include}\" can not reference itself"), range),
        );
    }
    match ctx.blueprint.includes.get(include) {
        None => TypeCheckResult::error(
            ANY,
            invalid_substitution(format!("include \"{include}\" does not exist"), range),
        ),
        Some(_) => {
            ctx.collector
                .collect(target_id, ctx.used_in.to_string(), vec![ctx.tag.to_string()]);
            TypeCheckResult::any()
        }
    }
}

fn check_function_call(
    name: &str,
    arguments: &[crate::model::substitution::Argument],
    range: Range,
    ctx: &mut TypeCheckContext<'_>,
) -> Result<TypeCheckResult, Cancelled> {
    ctx.cancellation.check()?;

    let mut diagnostics = Vec::new();
    let mut errors = Vec::new();

    for argument in arguments {
        if argument.name.is_some() && name != "object" {
            errors.push(invalid_substitution(
                format!("function \"{name}\" does not accept named arguments"),
                range,
            ));
        }
    }

    let definition = match ctx.functions.get_definition(name, ctx.cancellation) {
        Ok(def) => def,
        Err(_) => {
            if ctx.config.unknown_function_is_error {
                errors.push(invalid_substitution(format!("function \"{name}\" is not registered"), range));
            } else {
                diagnostics.push(Diagnostic::warning(
                    format!("function \"{name}\" is not registered, assuming it is a core function"),
                    range,
                ));
            }
            for argument in arguments {
                let sub_outcome = check_substitution(&argument.value, ctx)?;
                diagnostics.extend(sub_outcome.diagnostics);
                if let Some(e) = sub_outcome.error {
                    errors.push(e);
                }
            }
            return Ok(fold(ANY, diagnostics, errors));
        }
    };

    let param_count = definition.parameters.len();
    let is_variadic = definition.is_variadic();
    let arity_ok = if is_variadic {
        arguments.len() + 1 >= param_count
    } else {
        arguments.len() == param_count
    };
    if !arity_ok {
        errors.push(invalid_substitution(
            format!(
                "function \"{name}\" expects {param_count} argument(s), found {}",
                arguments.len()
            ),
            range,
        ));
    }

    for (index, argument) in arguments.iter().enumerate() {
        let param = if index < param_count {
            Some(&definition.parameters[index])
        } else {
            definition.parameters.last().filter(|p| p.variadic)
        };

        let sub_outcome = check_substitution(&argument.value, ctx)?;
        diagnostics.extend(sub_outcome.diagnostics);
        if let Some(e) = sub_outcome.error {
            errors.push(e);
            continue;
        }

        let Some(param) = param else { continue };

        if let (SubstitutionKind::Literal(Scalar::String(literal)), Some(choices)) =
            (&argument.value.kind, &param.string_choices)
        {
            if !choices.iter().any(|c| c == literal) {
                errors.push(invalid_substitution(
                    format!(
                        "\"{literal}\" is not one of the allowed values for parameter \"{}\": {}",
                        param.name,
                        choices.join(", ")
                    ),
                    range,
                ));
                continue;
            }
        }

        if !param.accepts_type_token(&sub_outcome.resolved_type) {
            errors.push(invalid_substitution(
                format!(
                    "argument {} to function \"{name}\" resolved type \"{}\" does not match parameter \"{}\"",
                    index + 1,
                    sub_outcome.resolved_type,
                    param.name
                ),
                range,
            ));
        }
    }

    Ok(fold(definition.return_type.type_token(), diagnostics, errors))
}

fn fold(resolved_type: &str, diagnostics: Vec<Diagnostic>, errors: Vec<ValidationError>) -> TypeCheckResult {
    let error = match errors.len() {
        0 => None,
        1 => errors.into_iter().next(),
        _ => Some(ValidationError::aggregate(errors)),
    };
    TypeCheckResult {
        resolved_type: resolved_type.to_string(),
        diagnostics,
        error,
    }
}
