use indexmap::IndexSet;

use super::{TypeGraph, TypeId};
use crate::policy::Policy;

/// Top-level query types, every ancestor before its descendants.
///
/// Actions, enums and struct-representable types never become queries, nor
/// does the list root or any list type. Siblings keep first-seen order.
pub fn emission_order(graph: &TypeGraph, policy: &Policy) -> Vec<TypeId> {
    let mut visited = IndexSet::new();
    let mut order = Vec::new();
    for id in graph.ids() {
        visit(graph, id, &mut visited, &mut order);
    }
    order
        .into_iter()
        .filter(|id| {
            let node = graph.node(*id);
            node.name != policy.list_root && !node.class.is_item_list
        })
        .collect()
}

fn visit(graph: &TypeGraph, id: TypeId, visited: &mut IndexSet<TypeId>, order: &mut Vec<TypeId>) {
    let class = &graph.node(id).class;
    if class.is_action || class.is_enum || class.represent_as_struct {
        return;
    }
    if !visited.insert(id) {
        return;
    }
    for parent in graph.parents(id) {
        visit(graph, parent, visited, order);
    }
    order.push(id);
}
