//! Choose one value type per property from its candidate ranges.
//!
//! The resolver only decides *which* range wins and whether the result is a
//! list; turning the range into a concrete type (which may need a compound
//! built from the graph) is left to the lowering pass.
use crate::error::Diagnostics;
use crate::hierarchy::{PropertyDecl, TypeGraph};
use crate::ir::Ty;
use crate::policy::Policy;

/// Preference order of a candidate range, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RangeRank {
    /// Not in the graph and not a builtin; never chosen.
    Unrecognized,
    OtherKnown,
    GenericText,
    Struct,
    BuiltinScalar,
    Enum,
}

pub fn rank(graph: &TypeGraph, policy: &Policy, range: &str) -> RangeRank {
    let node = graph.get(range);
    if node.is_some_and(|n| n.class.is_enum) {
        return RangeRank::Enum;
    }
    if range == policy.text_type {
        return RangeRank::GenericText;
    }
    if policy.is_builtin(range) {
        return RangeRank::BuiltinScalar;
    }
    match node {
        None => RangeRank::Unrecognized,
        Some(n) if n.class.represent_as_struct => RangeRank::Struct,
        Some(_) => RangeRank::OtherKnown,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// Final type, not subject to array wrapping.
    Fixed(Ty),
    /// Lower the chosen range, then wrap it if `array` still holds.
    Lower { array: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// The winning ontology range, kept as `org_schema_type`.
    pub range: String,
    pub shape: Shape,
}

/// Pick the best range for a property, or `None` if it has to be dropped.
pub fn choose(
    name: &str,
    decl: &PropertyDecl,
    graph: &TypeGraph,
    policy: &Policy,
    diags: &mut Diagnostics,
) -> Option<Choice> {
    if policy.excluded_properties.contains(name) {
        diags.debug(name, "excluded property, dropped");
        return None;
    }

    let mut best: Option<(&str, RangeRank)> = None;
    for range in &decl.ranges {
        let r = rank(graph, policy, range);
        if best.is_none_or(|(_, top)| r > top) {
            best = Some((range.as_str(), r));
        }
    }
    let Some((range, top)) = best.filter(|(_, r)| *r > RangeRank::Unrecognized) else {
        diags.warn(name, format!("no recognized range among [{}], dropped", decl.ranges.join(", ")));
        return None;
    };
    let range = range.to_string();

    if let Some(ty) = policy.type_overrides.get(name) {
        return Some(Choice { range, shape: Shape::Fixed(ty.clone()) });
    }

    let mut array = decl
        .ranges
        .iter()
        .any(|r| graph.get(r).is_some_and(|n| n.class.is_item_list))
        || starts_with_article(&decl.comment)
        || policy.force_array.contains(name);
    if policy.force_singular.contains(name) {
        array = false;
    }
    // a list winner lowers to an array by itself
    if graph.get(&range).is_some_and(|n| n.class.is_item_list) {
        array = false;
    }

    if range == policy.quantitative_type {
        return Some(Choice { range, shape: Shape::Fixed(quantitative(name, diags)) });
    }

    tracing::trace!(property = name, %range, ?top, array, "range chosen");
    Some(Choice { range, shape: Shape::Lower { array } })
}

/// "A review of the item." suggests several values; "The name of ..." one.
fn starts_with_article(comment: &str) -> bool {
    let head: String = comment.chars().take(3).collect::<String>().to_ascii_lowercase();
    head.starts_with("a ") || head.starts_with("an ")
}

/// The generic quantity placeholder, guessed from the property name.
fn quantitative(name: &str, diags: &mut Diagnostics) -> Ty {
    let lower = name.to_lowercase();
    if ["number", "level", "quantity"].iter().any(|k| lower.contains(k)) {
        return Ty::Number;
    }
    if lower.contains("duration") {
        return Ty::measure("ms");
    }
    diags.warn(name, "cannot guess the type of a quantitative value, assuming Number");
    Ty::Number
}

/// Apply the array decision to a lowered type. Lists of booleans or enum
/// literals are not meaningful, so those stay scalar.
pub fn wrap(ty: Ty, array: bool) -> Ty {
    if array && !matches!(ty, Ty::Boolean | Ty::Enum(_)) {
        Ty::array(ty)
    } else {
        ty
    }
}
