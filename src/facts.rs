//! Ontology loader: JSON-LD `@graph` → typed facts.
//!
//! Only shaping happens here. Which facts survive (builtins, exclusions,
//! superseded declarations) is decided by the graph builder.
use serde::Deserialize;
use serde_json::Value;

use crate::error::{CompileError, Result};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fact {
    Class {
        name: String,
        parents: Vec<String>,
        comment: String,
        superseded: bool,
    },
    Property {
        name: String,
        domains: Vec<String>,
        ranges: Vec<String>,
        comment: String,
        superseded: bool,
    },
    /// `name` is a literal of the enumeration `enum_type`.
    EnumMember {
        name: String,
        enum_type: String,
        superseded: bool,
    },
}

impl Fact {
    pub fn name(&self) -> &str {
        match self {
            Fact::Class { name, .. } | Fact::Property { name, .. } | Fact::EnumMember { name, .. } => name,
        }
    }
    pub fn is_superseded(&self) -> bool {
        match self {
            Fact::Class { superseded, .. }
            | Fact::Property { superseded, .. }
            | Fact::EnumMember { superseded, .. } => *superseded,
        }
    }
}

/// The IRI prefixes that identify ontology-local names.
#[derive(Debug, Clone)]
pub struct Namespace {
    prefixes: Vec<String>,
}

impl Namespace {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { prefixes: prefixes.into_iter().map(Into::into).collect() }
    }

    pub fn strip<'a>(&self, iri: &'a str) -> Option<&'a str> {
        self.prefixes.iter().find_map(|p| iri.strip_prefix(p.as_str()))
    }

    pub fn local(&self, iri: &str) -> Result<String> {
        self.strip(iri)
            .map(str::to_string)
            .ok_or_else(|| CompileError::ForeignIdentifier(iri.to_string()))
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new(["http://schema.org/", "https://schema.org/", "schema:"])
    }
}

// ————————————————————————————————————————————————————————————————————————————
// RAW JSON-LD
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(rename = "@graph")]
    graph: Vec<RawNode>,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@type")]
    kind: OneOrMany<String>,
    #[serde(rename = "rdfs:comment", default)]
    comment: Option<Literal>,
    #[serde(rename = "rdfs:subClassOf", default)]
    sub_class_of: Option<OneOrMany<IdRef>>,
    #[serde(rename = "http://schema.org/domainIncludes", alias = "schema:domainIncludes", default)]
    domain_includes: Option<OneOrMany<IdRef>>,
    #[serde(rename = "http://schema.org/rangeIncludes", alias = "schema:rangeIncludes", default)]
    range_includes: Option<OneOrMany<IdRef>>,
    #[serde(rename = "http://schema.org/supersededBy", alias = "schema:supersededBy", default)]
    superseded_by: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(x) => vec![x],
            OneOrMany::Many(xs) => xs,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdRef {
    Object {
        #[serde(rename = "@id")]
        id: String,
    },
    Bare(String),
}

impl IdRef {
    fn into_id(self) -> String {
        match self {
            IdRef::Object { id } | IdRef::Bare(id) => id,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Literal {
    Plain(String),
    Tagged {
        #[serde(rename = "@value")]
        value: String,
    },
    Many(Vec<Literal>),
}

impl Literal {
    /// First textual value; language variants beyond the first are ignored.
    fn into_text(self) -> String {
        match self {
            Literal::Plain(s) | Literal::Tagged { value: s } => s,
            Literal::Many(xs) => xs.into_iter().next().map(Literal::into_text).unwrap_or_default(),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

const RDF_PROPERTY: &str = "rdf:Property";
const RDFS_CLASS: &str = "rdfs:Class";

pub fn facts_from_str(src: &str, ns: &Namespace) -> Result<Vec<Fact>> {
    let doc: RawDocument = crate::path_de::from_str_with_path(src)?;
    shape_graph(doc, ns)
}

pub fn facts_from_value(value: Value, ns: &Namespace) -> Result<Vec<Fact>> {
    let doc: RawDocument = crate::path_de::from_value_with_path(value)?;
    shape_graph(doc, ns)
}

fn shape_graph(doc: RawDocument, ns: &Namespace) -> Result<Vec<Fact>> {
    let mut out = Vec::with_capacity(doc.graph.len());
    for node in doc.graph {
        shape_node(node, ns, &mut out)?;
    }
    Ok(out)
}

/// References outside the namespace (`rdfs:Class`, `xsd:string`, ...) point
/// at nothing the graph can hold, so they are dropped.
fn local_ids(node: &str, refs: Option<OneOrMany<IdRef>>, ns: &Namespace) -> Vec<String> {
    refs.map(OneOrMany::into_vec)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|r| {
            let id = r.into_id();
            let local = ns.strip(&id).map(str::to_string);
            if local.is_none() {
                tracing::debug!(%node, reference = %id, "dropping reference outside the namespace");
            }
            local
        })
        .collect()
}

fn shape_node(node: RawNode, ns: &Namespace, out: &mut Vec<Fact>) -> Result<()> {
    let kinds = node.kind.into_vec();
    let superseded = node.superseded_by.is_some();
    let comment = node.comment.map(Literal::into_text).unwrap_or_default();

    if kinds.iter().any(|k| k == RDFS_CLASS) {
        out.push(Fact::Class {
            name: ns.local(&node.id)?,
            parents: local_ids(&node.id, node.sub_class_of, ns),
            comment,
            superseded,
        });
        return Ok(());
    }

    if kinds.iter().any(|k| k == RDF_PROPERTY) {
        out.push(Fact::Property {
            name: ns.local(&node.id)?,
            domains: local_ids(&node.id, node.domain_includes, ns),
            ranges: local_ids(&node.id, node.range_includes, ns),
            comment,
            superseded,
        });
        return Ok(());
    }

    // Everything else must be an enumeration literal: every `@type` names an
    // ontology class.
    let enum_types = kinds.iter().map(|k| ns.strip(k)).collect::<Option<Vec<_>>>();
    match enum_types {
        Some(types) if !types.is_empty() => {
            let name = ns.local(&node.id)?;
            for enum_type in types {
                out.push(Fact::EnumMember {
                    name: name.clone(),
                    enum_type: enum_type.to_string(),
                    superseded,
                });
            }
            Ok(())
        }
        _ => Err(CompileError::UnrecognizedFact { id: node.id, kind: kinds.join(", ") }),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn shape(doc: Value) -> Result<Vec<Fact>> {
        facts_from_value(doc, &Namespace::default())
    }

    #[test]
    fn shapes_the_three_fact_kinds() {
        let facts = shape(json!({"@graph": [
            {"@id": "http://schema.org/Place", "@type": "rdfs:Class",
             "rdfs:comment": "Entities that have a somewhat fixed, physical extension.",
             "rdfs:subClassOf": {"@id": "http://schema.org/Thing"}},
            {"@id": "http://schema.org/geo", "@type": "rdf:Property",
             "rdfs:comment": "The geo coordinates of the place.",
             "http://schema.org/domainIncludes": [{"@id": "http://schema.org/Place"}],
             "http://schema.org/rangeIncludes": [
                {"@id": "http://schema.org/GeoCoordinates"},
                {"@id": "http://schema.org/GeoShape"}]},
            {"@id": "http://schema.org/Monday", "@type": "http://schema.org/DayOfWeek"}
        ]})).unwrap();

        assert_eq!(facts.len(), 3);
        assert_eq!(facts[0], Fact::Class {
            name: "Place".into(),
            parents: vec!["Thing".into()],
            comment: "Entities that have a somewhat fixed, physical extension.".into(),
            superseded: false,
        });
        match &facts[1] {
            Fact::Property { name, domains, ranges, .. } => {
                assert_eq!(name, "geo");
                assert_eq!(domains, &["Place"]);
                assert_eq!(ranges, &["GeoCoordinates", "GeoShape"]);
            }
            other => panic!("expected property, got {other:?}"),
        }
        assert_eq!(facts[2], Fact::EnumMember {
            name: "Monday".into(),
            enum_type: "DayOfWeek".into(),
            superseded: false,
        });
    }

    #[test]
    fn accepts_compact_prefixes_and_tagged_comments() {
        let facts = shape(json!({"@graph": [
            {"@id": "schema:author", "@type": "rdf:Property",
             "rdfs:comment": {"@language": "en", "@value": "The author of this content."},
             "schema:domainIncludes": {"@id": "schema:CreativeWork"},
             "schema:rangeIncludes": {"@id": "schema:Person"},
             "schema:supersededBy": {"@id": "schema:creator"}}
        ]})).unwrap();
        match &facts[0] {
            Fact::Property { comment, superseded, domains, .. } => {
                assert_eq!(comment, "The author of this content.");
                assert!(*superseded);
                assert_eq!(domains, &["CreativeWork"]);
            }
            other => panic!("expected property, got {other:?}"),
        }
    }

    #[test]
    fn class_with_several_types_is_still_a_class() {
        let facts = shape(json!({"@graph": [
            {"@id": "schema:Text", "@type": ["schema:DataType", "rdfs:Class"]}
        ]})).unwrap();
        assert!(matches!(&facts[0], Fact::Class { name, .. } if name == "Text"));
    }

    #[test]
    fn unknown_fact_kind_is_fatal() {
        let err = shape(json!({"@graph": [
            {"@id": "http://schema.org/foo", "@type": "owl:Ontology"}
        ]})).unwrap_err();
        assert!(matches!(err, CompileError::UnrecognizedFact { ref kind, .. } if kind == "owl:Ontology"));
    }

    #[test]
    fn foreign_identifiers_are_fatal() {
        let err = shape(json!({"@graph": [
            {"@id": "http://example.org/Thing", "@type": "rdfs:Class"}
        ]})).unwrap_err();
        assert!(matches!(err, CompileError::ForeignIdentifier(_)));
    }

    #[test]
    fn foreign_references_are_dropped() {
        let facts = shape(json!({"@graph": [
            {"@id": "schema:DataType", "@type": "rdfs:Class",
             "rdfs:comment": "The basic data types such as Integers, Strings, etc.",
             "rdfs:subClassOf": {"@id": "rdfs:Class"}},
            {"@id": "schema:identifier", "@type": "rdf:Property",
             "schema:domainIncludes": {"@id": "schema:Thing"},
             "schema:rangeIncludes": [{"@id": "xsd:string"}, {"@id": "schema:Text"}]}
        ]})).unwrap();
        assert!(matches!(&facts[0], Fact::Class { name, parents, .. } if name == "DataType" && parents.is_empty()));
        match &facts[1] {
            Fact::Property { ranges, .. } => assert_eq!(ranges, &["Text"]),
            other => panic!("expected property, got {other:?}"),
        }
    }

    #[test]
    fn malformed_documents_report_the_path() {
        let err = facts_from_str(r#"{"@graph": [{"@type": "rdfs:Class"}]}"#, &Namespace::default())
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("@graph"), "{msg}");
    }
}
