//! Matches the textual shape of a reference (`variables.x`,
//! `resources.a.spec.b[0]`, `children["c"].y`, ...) against the five allowed
//! forms and decides which kind of element it addresses. Grounded on the
//! teacher's pest-backed `parser.rs` (`#[derive(Parser)] #[grammar = "..."]`
//! over a dedicated `.pest` file, one `Rule::xxx` per production).

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use std::collections::HashSet;

use crate::errors::{ReasonCode, ValidationError};
use crate::model::substitution::PathSegment;
use crate::span::Position;

#[derive(Parser)]
#[grammar = "grammar/reference.pest"]
struct ReferenceParser;

/// Which element kind a reference addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum ReferenceKind {
    Variable,
    Value,
    DataSource,
    Child,
    Resource,
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ReferenceKind::Variable => "variable",
            ReferenceKind::Value => "value",
            ReferenceKind::DataSource => "data source",
            ReferenceKind::Child => "child",
            ReferenceKind::Resource => "resource",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReference {
    pub kind: ReferenceKind,
    pub name: String,
    pub path: Vec<PathSegment>,
    /// Only populated for `DataSource` references.
    pub field: Option<String>,
    pub index: Option<u64>,
}

fn unquote(s: &str) -> String {
    s.trim_matches('"').to_string()
}

fn path_from_pair(pair: Pair<Rule>) -> Vec<PathSegment> {
    let mut path = Vec::new();
    for step in pair.into_inner() {
        let inner = step.into_inner().next().expect("path_step has one child");
        match inner.as_rule() {
            Rule::path_field => {
                let field_name = inner.into_inner().next().expect("path_field carries a name");
                path.push(PathSegment::Field(field_name.as_str().to_string()));
            }
            Rule::path_index => {
                let idx = inner.into_inner().next().expect("path_index carries an index");
                path.push(PathSegment::Index(idx.as_str().parse().expect("index is digits")));
            }
            other => unreachable!("unexpected path step rule: {other:?}"),
        }
    }
    path
}

fn build_parsed(pair: Pair<Rule>) -> ParsedReference {
    match pair.as_rule() {
        Rule::variable_ref => {
            let name_pair = pair.into_inner().next().expect("variable_ref carries a name");
            let name = match name_pair.as_rule() {
                Rule::name => name_pair.as_str().to_string(),
                Rule::quoted_name => unquote(name_pair.as_str()),
                other => unreachable!("unexpected variable_ref child: {other:?}"),
            };
            ParsedReference {
                kind: ReferenceKind::Variable,
                name,
                path: Vec::new(),
                field: None,
                index: None,
            }
        }
        Rule::value_ref => {
            let mut inner = pair.into_inner();
            let name = inner.next().expect("value_ref carries a name").as_str().to_string();
            let path = inner.next().map(path_from_pair).unwrap_or_default();
            ParsedReference {
                kind: ReferenceKind::Value,
                name,
                path,
                field: None,
                index: None,
            }
        }
        Rule::datasource_ref => {
            let mut inner = pair.into_inner();
            let name = inner.next().expect("datasource_ref carries a name").as_str().to_string();
            let field = inner.next().expect("datasource_ref carries a field").as_str().to_string();
            let index = inner.next().map(|p| p.as_str().parse().expect("index is digits"));
            ParsedReference {
                kind: ReferenceKind::DataSource,
                name,
                path: Vec::new(),
                field: Some(field),
                index,
            }
        }
        Rule::child_ref => {
            let mut inner = pair.into_inner();
            let name_pair = inner.next().expect("child_ref carries a bare_name");
            let inner_name = name_pair.into_inner().next().expect("bare_name has one child");
            let name = match inner_name.as_rule() {
                Rule::name => inner_name.as_str().to_string(),
                Rule::quoted_name => unquote(inner_name.as_str()),
                other => unreachable!("unexpected bare_name child: {other:?}"),
            };
            let path = inner.next().map(path_from_pair).unwrap_or_default();
            ParsedReference {
                kind: ReferenceKind::Child,
                name,
                path,
                field: None,
                index: None,
            }
        }
        Rule::resource_ref => {
            let mut inner = pair.into_inner();
            let name = inner.next().expect("resource_ref carries a name").as_str().to_string();
            let mut path = vec![PathSegment::Field(
                inner.next().expect("resource_ref carries spec|metadata").as_str().to_string(),
            )];
            if let Some(rest) = inner.next() {
                path.extend(path_from_pair(rest));
            }
            ParsedReference {
                kind: ReferenceKind::Resource,
                name,
                path,
                field: None,
                index: None,
            }
        }
        other => unreachable!("unexpected top-level reference rule: {other:?}"),
    }
}

/// Parses `text` against the five reference shapes without any context
/// check. Returns `None` if nothing matches.
pub fn parse_reference(text: &str) -> Option<ParsedReference> {
    let mut pairs = ReferenceParser::parse(Rule::reference, text).ok()?;
    let reference = pairs.next()?.into_inner().next()?;
    Some(build_parsed(reference))
}

/// Parses `text` and checks that `used_in`'s caller is allowed to address
/// the resulting kind, producing `invalid_reference` on either failure.
pub fn resolve_reference(
    text: &str,
    has_access_to: &HashSet<ReferenceKind>,
    position: Option<Position>,
) -> Result<ParsedReference, ValidationError> {
    let parsed = parse_reference(text).ok_or_else(|| {
        let err = ValidationError::new(
            ReasonCode::InvalidReference,
            format!("\"{text}\" is not a recognized reference"),
        );
        match position {
            Some(p) => err.with_position(p),
            None => err,
        }
    })?;

    if !has_access_to.contains(&parsed.kind) {
        let err = ValidationError::new(
            ReasonCode::InvalidReference,
            format!("a {} reference is not permitted here, found \"{text}\"", parsed.kind),
        );
        return Err(match position {
            Some(p) => err.with_position(p),
            None => err,
        });
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_kinds() -> HashSet<ReferenceKind> {
        [
            ReferenceKind::Variable,
            ReferenceKind::Value,
            ReferenceKind::DataSource,
            ReferenceKind::Child,
            ReferenceKind::Resource,
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn variable_reference_parses() {
        let parsed = parse_reference("variables.testVariable").unwrap();
        assert_eq!(parsed.kind, ReferenceKind::Variable);
        assert_eq!(parsed.name, "testVariable");
    }

    #[test]
    fn variable_reference_accepts_bracket_quoted_form() {
        let parsed = parse_reference(r#"variables["test-var"]"#).unwrap();
        assert_eq!(parsed.name, "test-var");
    }

    #[test]
    fn value_reference_with_path_parses() {
        let parsed = parse_reference("values.foo.bar[0]").unwrap();
        assert_eq!(parsed.kind, ReferenceKind::Value);
        assert_eq!(parsed.name, "foo");
        assert_eq!(
            parsed.path,
            vec![PathSegment::Field("bar".into()), PathSegment::Index(0)]
        );
    }

    #[test]
    fn datasource_reference_with_index_parses() {
        let parsed = parse_reference("datasources.myDs.items[2]").unwrap();
        assert_eq!(parsed.kind, ReferenceKind::DataSource);
        assert_eq!(parsed.name, "myDs");
        assert_eq!(parsed.field.as_deref(), Some("items"));
        assert_eq!(parsed.index, Some(2));
    }

    #[test]
    fn child_reference_parses() {
        let parsed = parse_reference("children.myChild.outputValue").unwrap();
        assert_eq!(parsed.kind, ReferenceKind::Child);
        assert_eq!(parsed.name, "myChild");
        assert_eq!(parsed.path, vec![PathSegment::Field("outputValue".into())]);
    }

    #[test]
    fn resource_reference_with_optional_prefix_parses_the_same() {
        let with_prefix = parse_reference("resources.myResource.spec.id").unwrap();
        let without_prefix = parse_reference("myResource.spec.id").unwrap();
        assert_eq!(with_prefix.kind, ReferenceKind::Resource);
        assert_eq!(with_prefix.name, without_prefix.name);
        assert_eq!(with_prefix.path, without_prefix.path);
    }

    #[test]
    fn resource_reference_metadata_path_parses() {
        let parsed = parse_reference("myResource.metadata.labels.team").unwrap();
        assert_eq!(
            parsed.path,
            vec![
                PathSegment::Field("metadata".into()),
                PathSegment::Field("labels".into()),
                PathSegment::Field("team".into()),
            ]
        );
    }

    #[test]
    fn garbage_text_fails_to_parse() {
        assert!(parse_reference("not a reference at all!!").is_none());
    }

    #[test]
    fn resolve_rejects_kind_outside_access_set() {
        let mut limited = HashSet::new();
        limited.insert(ReferenceKind::Variable);
        let err = resolve_reference("values.foo", &limited, None).unwrap_err();
        assert_eq!(err.reason_code, ReasonCode::InvalidReference);
    }

    #[test]
    fn resolve_accepts_kind_within_access_set() {
        let parsed = resolve_reference("variables.foo", &all_kinds(), None).unwrap();
        assert_eq!(parsed.kind, ReferenceKind::Variable);
    }
}
