use indexmap::{IndexMap, IndexSet};

use super::{PropertyDecl, TypeGraph};
use crate::error::Diagnostics;
use crate::facts::Fact;
use crate::policy::Policy;

/// Accumulate facts into a graph, applying the exclusion lists.
pub fn build(facts: &[Fact], policy: &Policy, diags: &mut Diagnostics) -> TypeGraph {
    let mut graph = TypeGraph::new();
    let mut enums: IndexMap<String, IndexSet<String>> = IndexMap::new();

    for fact in facts {
        let id = fact.name();
        if policy.is_builtin(id) || policy.excluded_types.contains(id) {
            continue;
        }
        if fact.is_superseded() {
            diags.debug(id, "superseded, skipped");
            continue;
        }

        match fact {
            Fact::EnumMember { name, enum_type, .. } => {
                enums.entry(enum_type.clone()).or_default().insert(name.clone());
            }
            Fact::Property { name, domains, ranges, comment, .. } => {
                if policy.excluded_properties.contains(name) {
                    continue;
                }
                for domain in domains {
                    if policy.is_builtin(domain) || policy.excluded_types.contains(domain) {
                        continue;
                    }
                    let owner = graph.ensure(domain);
                    graph.node_mut(owner).properties.insert(name.clone(), PropertyDecl {
                        name: name.clone(),
                        ranges: ranges.clone(),
                        comment: comment.clone(),
                    });
                }
            }
            Fact::Class { name, parents, comment, .. } => {
                let node_id = graph.ensure(name);
                let mut extends: Vec<String> = parents
                    .iter()
                    .filter(|p| !policy.excluded_types.contains(p.as_str()))
                    .cloned()
                    .collect();
                if extends.is_empty() && name != &policy.root_type {
                    extends.push(policy.root_type.clone());
                }
                let node = graph.node_mut(node_id);
                node.extends = extends;
                node.comment = comment.clone();
            }
        }
    }

    for (enum_type, values) in enums {
        match graph.id(&enum_type) {
            Some(id) => graph.node_mut(id).enum_values = values,
            None => diags.debug(enum_type, "enumeration literals for an undeclared type, ignored"),
        }
    }

    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::fixtures::*;

    fn build_default(facts: &[Fact]) -> (TypeGraph, Diagnostics) {
        let mut diags = Diagnostics::new();
        let graph = build(facts, &Policy::default(), &mut diags);
        (graph, diags)
    }

    #[test]
    fn root_is_the_implicit_parent() {
        let (g, _) = build_default(&[class("Thing", &[]), class("Place", &[])]);
        assert!(g.get("Thing").unwrap().extends.is_empty());
        assert_eq!(g.get("Place").unwrap().extends, vec!["Thing".to_string()]);
    }

    #[test]
    fn excluded_parents_are_filtered_before_defaulting() {
        let (g, _) = build_default(&[class("Audience", &["Researcher"])]);
        assert_eq!(g.get("Audience").unwrap().extends, vec!["Thing".to_string()]);
        assert!(!g.contains("Researcher"));
    }

    #[test]
    fn properties_attach_to_every_non_builtin_domain() {
        let (g, _) = build_default(&[
            class("Place", &[]),
            prop("address", &["Place", "Text", "PropertyValue", "Person"], &["PostalAddress", "Text"], "Physical address."),
        ]);
        let place = g.get("Place").unwrap();
        assert_eq!(place.properties["address"].ranges, vec!["PostalAddress", "Text"]);
        // created on demand, no implicit root for property-only types
        assert!(g.get("Person").unwrap().extends.is_empty());
        assert!(!g.contains("Text"));
        assert!(!g.contains("PropertyValue"));
    }

    #[test]
    fn excluded_properties_and_builtin_facts_are_dropped() {
        let (g, _) = build_default(&[
            class("Thing", &[]),
            class("Text", &["DataType"]),
            prop("sameAs", &["Thing"], &["URL"], "URL of a reference page."),
        ]);
        assert!(!g.contains("Text"));
        assert!(g.get("Thing").unwrap().properties.is_empty());
    }

    #[test]
    fn superseded_facts_are_skipped() {
        let mut old = prop("serviceAudience", &["Thing"], &["Audience"], "The audience.");
        if let Fact::Property { superseded, .. } = &mut old { *superseded = true; }
        let (g, diags) = build_default(&[class("Thing", &[]), old]);
        assert!(g.get("Thing").unwrap().properties.is_empty());
        assert!(diags.mentions("serviceAudience", "superseded"));
    }

    #[test]
    fn enum_literals_keep_first_seen_order() {
        let (g, diags) = build_default(&[
            member("Tuesday", "DayOfWeek"),
            class("DayOfWeek", &["Enumeration"]),
            member("Monday", "DayOfWeek"),
            member("Tuesday", "DayOfWeek"),
            member("Orphan", "NotDeclared"),
        ]);
        let values: Vec<_> = g.get("DayOfWeek").unwrap().enum_values.iter().cloned().collect();
        assert_eq!(values, vec!["Tuesday", "Monday"]);
        assert!(diags.mentions("NotDeclared", "undeclared"));
    }
}
