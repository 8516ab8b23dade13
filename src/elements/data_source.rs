//! `datasources.*` checks: filter shape, provider-type existence, filter
//! field support, and export-type agreement with the provider's published
//! export fields.

use crate::diagnostics::Diagnostic;
use crate::errors::{ReasonCode, ValidationError};
use crate::model::datasource::DataSource;
use crate::reference_chain::{element_id, ReferenceChainCollector};
use crate::span::Range;

use super::{check_mapping_node, Registries};
use crate::cancellation::{CancellationToken, Cancelled};
use crate::grammar::ReferenceKind;

fn ds_range(ds: &DataSource) -> Range {
    ds.source_meta.unwrap_or_else(Range::unknown)
}

fn err(message: impl Into<String>, ds: &DataSource) -> ValidationError {
    ValidationError::new(ReasonCode::InvalidDataSource, message).with_position(ds_range(ds).start)
}

/// Checks one `datasources.NAME` entry.
pub fn check_data_source(
    name: &str,
    ds: &DataSource,
    registries: &Registries<'_>,
    collector: &mut ReferenceChainCollector,
    cancellation: &CancellationToken,
) -> Result<(Vec<Diagnostic>, Option<ValidationError>), Cancelled> {
    let used_in = element_id(ReferenceKind::DataSource, name);
    let mut diagnostics = Vec::new();
    let mut errors = Vec::new();

    if name.contains("${") {
        errors.push(err(
            format!("'${{..}} substitutions can not be used in data source names, found in data source \"{name}\"'"),
            ds,
        ));
    }

    if !registries.data_sources.has_type(&ds.ds_type) {
        errors.push(err(format!("data source type \"{}\" is not registered", ds.ds_type), ds));
    }

    if ds.filter.field.is_empty() {
        errors.push(err("filter.field can not be empty", ds));
    } else if !registries.data_sources.has_filter_field(&ds.ds_type, &ds.filter.field) {
        errors.push(err(
            format!("\"{}\" is not a supported filter field for data source type \"{}\"", ds.filter.field, ds.ds_type),
            ds,
        ));
    }

    if ds.filter.search.is_empty() {
        errors.push(err("filter.search must be non-empty", ds));
    }
    for search_term in &ds.filter.search {
        let (term_diags, term_error) = check_mapping_node(search_term, false, &used_in, "filter.search", registries, collector, cancellation)?;
        diagnostics.extend(term_diags);
        if let Some(e) = term_error {
            errors.push(e);
        }
    }

    if ds.exports.is_empty() {
        errors.push(err("exports must be non-empty", ds));
    }
    for (field, export) in ds.exports.iter() {
        cancellation.check()?;
        match registries.data_sources.get_export_field(&ds.ds_type, field, cancellation) {
            Err(registry_err) => errors.push(registry_err),
            Ok(None) => errors.push(err(
                format!("\"{field}\" is not a field published by data source type \"{}\"", ds.ds_type),
                ds,
            )),
            Ok(Some(published)) if published.value_type.type_token() != export.value_type.type_token() => errors.push(err(
                format!(
                    "export \"{field}\" declares type \"{}\" but the provider publishes \"{}\"",
                    export.value_type.type_token(),
                    published.value_type.type_token()
                ),
                ds,
            )),
            Ok(Some(_)) => {}
        }
    }

    let error = match errors.len() {
        0 => None,
        1 => errors.into_iter().next(),
        _ => Some(ValidationError::aggregate(errors)),
    };
    Ok((diagnostics, error))
}
