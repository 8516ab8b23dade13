//! `variables.*` checks: type validity, default/allowed-values agreement,
//! and (for custom types) agreement with the provider's published options.

use crate::diagnostics::Diagnostic;
use crate::errors::{ReasonCode, ValidationError};
use crate::model::scalar::Scalar;
use crate::model::variable::{Variable, VariableType};
use crate::span::Range;

use super::Registries;
use crate::cancellation::{CancellationToken, Cancelled};

fn var_range(variable: &Variable) -> Range {
    variable.source_meta.unwrap_or_else(Range::unknown)
}

fn err(name: &str, message: impl Into<String>, variable: &Variable) -> ValidationError {
    let _ = name;
    ValidationError::new(ReasonCode::InvalidVariable, message).with_position(var_range(variable).start)
}

/// Checks one `variables.NAME` entry.
pub fn check_variable(
    name: &str,
    variable: &Variable,
    registries: &Registries<'_>,
    cancellation: &CancellationToken,
) -> Result<(Vec<Diagnostic>, Option<ValidationError>), Cancelled> {
    let mut errors = Vec::new();

    if name.contains("${") {
        errors.push(err(
            name,
            format!("'${{..}} substitutions can not be used in variable names, found in variable \"{name}\"'"),
            variable,
        ));
    }

    if let VariableType::Custom(type_name) = &variable.var_type {
        cancellation.check()?;
        match registries.custom_variable_types.options(type_name, cancellation) {
            Err(registry_err) => errors.push(registry_err),
            Ok(options) => {
                let mut token_kinds: Vec<&'static str> = options.values().map(Scalar::type_token).collect();
                token_kinds.dedup();
                if token_kinds.len() > 1 {
                    errors.push(err(
                        name,
                        format!("custom type \"{type_name}\" published mixed-typed options, which is not permitted"),
                        variable,
                    ));
                }

                if let Some(default) = &variable.default {
                    match default {
                        Scalar::String(label) if label.is_empty() => {
                            errors.push(err(name, "default can not be an empty string", variable));
                        }
                        Scalar::String(label) if !options.contains_key(label) => {
                            errors.push(err(
                                name,
                                format!("default \"{label}\" is not one of the options published by \"{type_name}\""),
                                variable,
                            ));
                        }
                        Scalar::String(_) => {}
                        _ => errors.push(err(name, "default for a custom-typed variable must be a string option label", variable)),
                    }
                }

                if let Some(allowed) = &variable.allowed_values {
                    for value in allowed {
                        match value {
                            Scalar::String(label) if !options.contains_key(label) => {
                                errors.push(err(
                                    name,
                                    format!("allowed value \"{label}\" is not one of the options published by \"{type_name}\""),
                                    variable,
                                ));
                            }
                            Scalar::String(_) => {}
                            _ => errors.push(err(name, "allowed_values for a custom-typed variable must be string option labels", variable)),
                        }
                    }
                }
            }
        }
    } else {
        let expected = match &variable.var_type {
            VariableType::String => "string",
            VariableType::Integer => "integer",
            VariableType::Float => "float",
            VariableType::Boolean => "boolean",
            VariableType::Custom(_) => unreachable!(),
        };

        if let Some(default) = &variable.default {
            if default.type_token() != expected {
                errors.push(err(
                    name,
                    format!("default has type \"{}\" but the variable declares \"{expected}\"", default.type_token()),
                    variable,
                ));
            } else if matches!(default, Scalar::String(s) if s.is_empty()) {
                errors.push(err(name, "default can not be an empty string", variable));
            } else if let Some(allowed) = &variable.allowed_values {
                if !allowed.contains(default) {
                    errors.push(err(name, "default is not one of the declared allowed_values", variable));
                }
            }
        }

        if let Some(allowed) = &variable.allowed_values {
            for value in allowed {
                if value.type_token() != expected {
                    errors.push(err(
                        name,
                        format!("allowed_values entry has type \"{}\" but the variable declares \"{expected}\"", value.type_token()),
                        variable,
                    ));
                }
            }
        }
    }

    if variable.runtime_value.is_none() && variable.default.is_none() {
        errors.push(err(
            name,
            format!("variable \"{name}\" has no runtime value and no default, and is required"),
            variable,
        ));
    }

    let error = match errors.len() {
        0 => None,
        1 => errors.into_iter().next(),
        _ => Some(ValidationError::aggregate(errors)),
    };
    Ok((Vec::new(), error))
}
