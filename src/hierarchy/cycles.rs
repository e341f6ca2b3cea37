use indexmap::IndexSet;

use super::{TypeGraph, TypeId};
use crate::error::Diagnostics;
use crate::policy::Policy;

/// Demote struct candidates that can contain themselves, then propagate
/// every demotion to all ancestors until nothing changes.
///
/// Ancestor propagation is conservative: demoting `PriceSpecification` also
/// demotes `StructuredValue`, even though its other descendants stay structs.
pub fn resolve_cycles(graph: &mut TypeGraph, policy: &Policy, diags: &mut Diagnostics) {
    for id in graph.ids() {
        let class = &graph.node(id).class;
        if class.is_enum || !class.represent_as_struct {
            continue;
        }
        let mut visited = IndexSet::new();
        let mut path = Vec::new();
        if find_cycle(graph, policy, id, id, &mut visited, &mut path) {
            let name = graph.node(id).name.clone();
            diags.warn(&name, format!("struct containment cycle via {}, represented as an entity", path.join(" → ")));
            graph.node_mut(id).class.represent_as_struct = false;
        }
    }

    loop {
        let mut changed = false;
        for id in graph.ids() {
            if graph.node(id).class.represent_as_struct {
                continue;
            }
            for ancestor in graph.ancestors(id) {
                if graph.node(ancestor).class.represent_as_struct {
                    let descendant = graph.node(id).name.clone();
                    let node = graph.node_mut(ancestor);
                    node.class.represent_as_struct = false;
                    changed = true;
                    diags.debug(&node.name, format!("demoted: ancestor of non-struct {descendant}"));
                }
            }
        }
        if !changed {
            break;
        }
    }
}

/// Depth-first search over containment edges (ranges that are themselves
/// structs) for a path from `current` back to `target`. `path` holds the
/// property names of the edges taken.
fn find_cycle(
    graph: &TypeGraph,
    policy: &Policy,
    current: TypeId,
    target: TypeId,
    visited: &mut IndexSet<TypeId>,
    path: &mut Vec<String>,
) -> bool {
    if !visited.insert(current) {
        return current == target;
    }
    for prop in graph.node(current).properties.values() {
        for range in &prop.ranges {
            if policy.is_builtin(range) {
                continue;
            }
            let Some(next) = graph.id(range) else { continue };
            if !graph.node(next).class.represent_as_struct {
                continue;
            }
            path.push(prop.name.clone());
            if find_cycle(graph, policy, next, target, visited, path) {
                return true;
            }
            path.pop();
        }
    }
    false
}

/// Every struct-representable type, and whether it can reach itself through
/// containment edges. Used to check the resolver's postcondition.
pub fn struct_cycles(graph: &TypeGraph, policy: &Policy) -> Vec<(String, Vec<String>)> {
    let mut out = Vec::new();
    for (id, node) in graph.nodes() {
        if !node.class.represent_as_struct || node.class.is_enum {
            continue;
        }
        let mut visited = IndexSet::new();
        let mut path = Vec::new();
        if find_cycle(graph, policy, id, id, &mut visited, &mut path) {
            out.push((node.name.clone(), path));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::fixtures::*;
    use crate::hierarchy::{analyze, build::build, classify::classify};
    use crate::facts::Fact;

    fn looped() -> Vec<Fact> {
        vec![
            class("Thing", &[]),
            class("Intangible", &["Thing"]),
            class("StructuredValue", &["Intangible"]),
            class("PriceSpecification", &["StructuredValue"]),
            class("UnitPriceSpecification", &["PriceSpecification"]),
            class("QuantityValue", &["StructuredValue"]),
            class("ContactPoint", &["StructuredValue"]),
            prop("validFor", &["PriceSpecification"], &["QuantityValue"], "The validity."),
            prop("priceRule", &["QuantityValue"], &["PriceSpecification", "Text"], "The price rule."),
            prop("telephone", &["ContactPoint"], &["Text"], "The telephone number."),
        ]
    }

    fn represent(g: &TypeGraph, name: &str) -> bool {
        g.get(name).unwrap().class.represent_as_struct
    }

    #[test]
    fn first_node_of_a_cycle_is_demoted_and_the_rest_survive() {
        let mut diags = Diagnostics::new();
        let g = analyze(&looped(), &Policy::default(), &mut diags);
        assert!(!represent(&g, "PriceSpecification"));
        // the cycle is broken once PriceSpecification is an entity
        assert!(represent(&g, "QuantityValue"));
        assert!(represent(&g, "ContactPoint"));
        assert!(diags.mentions("PriceSpecification", "validFor → priceRule"));
    }

    #[test]
    fn resolved_graph_has_no_struct_cycles() {
        let policy = Policy::default();
        let mut diags = Diagnostics::new();
        let g = analyze(&looped(), &policy, &mut diags);
        assert!(struct_cycles(&g, &policy).is_empty());

        let mut diags = Diagnostics::new();
        let mut raw = build(&looped(), &policy, &mut diags);
        classify(&mut raw, &policy, &mut diags);
        assert_eq!(struct_cycles(&raw, &policy).len(), 2);
    }

    #[test]
    fn demotion_reaches_every_ancestor() {
        let mut diags = Diagnostics::new();
        let g = analyze(&looped(), &Policy::default(), &mut diags);
        for (id, node) in g.nodes() {
            if node.class.represent_as_struct {
                continue;
            }
            for a in g.ancestors(id) {
                assert!(!g.node(a).class.represent_as_struct, "{} is an ancestor of {}", g.node(a).name, node.name);
            }
        }
    }

    #[test]
    fn shared_ancestor_is_over_demoted() {
        // Only PriceSpecification is cyclic, yet the common ancestor of the
        // unrelated ContactPoint lineage is demoted with it.
        let mut diags = Diagnostics::new();
        let g = analyze(&looped(), &Policy::default(), &mut diags);
        assert!(!represent(&g, "StructuredValue"));
        assert!(represent(&g, "ContactPoint"));
        // the subtype flag is untouched, so field collection still works
        assert!(g.get("StructuredValue").unwrap().class.is_struct_subtype);
        assert!(diags.mentions("StructuredValue", "ancestor of non-struct"));
    }

    #[test]
    fn subtypes_of_a_demoted_type_stay_structs() {
        let mut diags = Diagnostics::new();
        let g = analyze(&looped(), &Policy::default(), &mut diags);
        assert!(represent(&g, "UnitPriceSpecification"));
    }
}
