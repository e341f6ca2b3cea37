use super::{Classification, TypeGraph, TypeId};
use crate::error::Diagnostics;
use crate::policy::Policy;

/// Derive the classification flags of every node. Runs once, before cycle
/// resolution.
pub fn classify(graph: &mut TypeGraph, policy: &Policy, diags: &mut Diagnostics) {
    let view: &TypeGraph = graph;
    let computed: Vec<(TypeId, Classification)> = view
        .ids()
        .map(|id| (id, classify_node(view, id, policy, diags)))
        .collect();
    for (id, class) in computed {
        graph.node_mut(id).class = class;
    }
}

fn classify_node(graph: &TypeGraph, id: TypeId, policy: &Policy, diags: &mut Diagnostics) -> Classification {
    let node = graph.node(id);
    let mut class = Classification::default();

    class.is_action = graph.is_subclass(id, &policy.action_root);

    // An enumeration without literals stays an ordinary entity.
    class.is_enum = !node.enum_values.is_empty();
    if !class.is_enum && graph.is_subclass(id, &policy.enumeration_root) {
        diags.debug(&node.name, "enumeration without literals, kept as an entity");
    }

    class.is_item_list = graph.is_subclass(id, &policy.list_root);
    if class.is_item_list {
        class.item_type = Some(item_type(graph, &node.name, policy, diags));
    }

    let under_struct_root = policy.struct_roots.iter().any(|root| {
        node.name == *root || graph.is_subclass(id, root)
    });
    if under_struct_root && !policy.non_struct_types.contains(&node.name) {
        class.is_struct_subtype = true;
        class.represent_as_struct = true;
    }

    class
}

/// Element type of a list type, by naming convention (`OfferCatalog` → `Offer`).
pub fn item_type(graph: &TypeGraph, type_name: &str, policy: &Policy, diags: &mut Diagnostics) -> String {
    for suffix in &policy.list_suffixes {
        if let Some(stem) = type_name.strip_suffix(suffix.as_str()) {
            if graph.contains(stem) {
                return stem.to_string();
            }
            diags.warn(type_name, format!("list element type {stem} is unknown, using {}", policy.root_type));
            return policy.root_type.clone();
        }
    }
    diags.warn(type_name, format!("list type does not have a recognized suffix, using {}", policy.root_type));
    policy.root_type.clone()
}
