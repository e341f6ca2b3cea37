//! Type graph built from ontology facts.
//!
//! Nodes live in an arena and are addressed by `TypeId`. The stages run in a
//! fixed order, each to completion:
//!
//! 1. `build`: accumulate nodes, parents, properties and enum literals;
//! 2. `classify`: action / enum / item-list / struct flags;
//! 3. `cycles`: demote struct candidates that contain themselves, then
//!    their ancestors (fixed point);
//! 4. `order`: ancestor-before-descendant emission order.
//!
//! After stage 3 the graph is read-only.
pub mod build;
pub mod classify;
pub mod cycles;
pub mod order;

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

pub use order::emission_order;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub usize);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PropertyDecl {
    pub name: String,
    /// Candidate range types, in declaration order.
    pub ranges: Vec<String>,
    pub comment: String,
}

/// Flags derived by the classifier. Struct flags are only ever narrowed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub is_action: bool,
    pub is_enum: bool,
    pub is_item_list: bool,
    pub item_type: Option<String>,
    /// Under a struct root; decides which ancestors contribute struct fields.
    pub is_struct_subtype: bool,
    pub represent_as_struct: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TypeNode {
    pub name: String,
    /// Parent type names; may mention types that were never declared.
    pub extends: Vec<String>,
    pub properties: IndexMap<String, PropertyDecl>,
    pub comment: String,
    pub enum_values: IndexSet<String>,
    pub class: Classification,
}

impl TypeNode {
    fn new(name: &str) -> Self {
        Self { name: name.to_string(), ..Self::default() }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TypeGraph {
    nodes: Vec<TypeNode>,
    index: HashMap<String, TypeId>,
}

impl TypeGraph {
    pub fn new() -> Self { Self::default() }

    /// Existing node, or a fresh one with no parents.
    pub fn ensure(&mut self, name: &str) -> TypeId {
        if let Some(id) = self.index.get(name) {
            return *id;
        }
        let id = TypeId(self.nodes.len());
        self.nodes.push(TypeNode::new(name));
        self.index.insert(name.to_string(), id);
        id
    }

    pub fn id(&self, name: &str) -> Option<TypeId> { self.index.get(name).copied() }

    pub fn contains(&self, name: &str) -> bool { self.index.contains_key(name) }

    pub fn node(&self, id: TypeId) -> &TypeNode { &self.nodes[id.0] }

    pub fn node_mut(&mut self, id: TypeId) -> &mut TypeNode { &mut self.nodes[id.0] }

    pub fn get(&self, name: &str) -> Option<&TypeNode> { self.id(name).map(|id| self.node(id)) }

    pub fn len(&self) -> usize { self.nodes.len() }

    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    /// All node ids in first-seen order.
    pub fn ids(&self) -> impl Iterator<Item = TypeId> + use<> {
        (0..self.nodes.len()).map(TypeId)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (TypeId, &TypeNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (TypeId(i), n))
    }

    /// Declared parents that exist in the graph.
    pub fn parents(&self, id: TypeId) -> impl Iterator<Item = TypeId> + '_ {
        self.node(id).extends.iter().filter_map(|p| self.id(p))
    }

    /// True if `id` transitively extends `ancestor` (not reflexive).
    pub fn is_subclass(&self, id: TypeId, ancestor: &str) -> bool {
        let mut visited = IndexSet::new();
        self.is_subclass_rec(id, ancestor, &mut visited)
    }

    fn is_subclass_rec(&self, id: TypeId, ancestor: &str, visited: &mut IndexSet<TypeId>) -> bool {
        if !visited.insert(id) {
            return false;
        }
        for parent in &self.node(id).extends {
            if parent == ancestor {
                return true;
            }
            if let Some(pid) = self.id(parent) {
                if self.is_subclass_rec(pid, ancestor, visited) {
                    return true;
                }
            }
        }
        false
    }

    /// Every node reachable through `extends`, closest first.
    pub fn ancestors(&self, id: TypeId) -> Vec<TypeId> {
        let mut seen = IndexSet::new();
        let mut queue = std::collections::VecDeque::from([id]);
        while let Some(cur) = queue.pop_front() {
            for p in self.parents(cur) {
                if p != id && seen.insert(p) {
                    queue.push_back(p);
                }
            }
        }
        seen.into_iter().collect()
    }

    pub fn represent_as_struct(&self, name: &str) -> bool {
        self.get(name).is_some_and(|n| n.class.represent_as_struct)
    }
}

/// Run every graph stage over a fact stream.
pub fn analyze(
    facts: &[crate::facts::Fact],
    policy: &crate::policy::Policy,
    diags: &mut crate::error::Diagnostics,
) -> TypeGraph {
    let mut graph = build::build(facts, policy, diags);
    classify::classify(&mut graph, policy, diags);
    cycles::resolve_cycles(&mut graph, policy, diags);
    graph
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Small hand-written ontologies shared by the stage tests.
    use crate::facts::Fact;

    pub fn class(name: &str, parents: &[&str]) -> Fact {
        Fact::Class {
            name: name.into(),
            parents: parents.iter().map(|s| s.to_string()).collect(),
            comment: String::new(),
            superseded: false,
        }
    }

    pub fn prop(name: &str, domains: &[&str], ranges: &[&str], comment: &str) -> Fact {
        Fact::Property {
            name: name.into(),
            domains: domains.iter().map(|s| s.to_string()).collect(),
            ranges: ranges.iter().map(|s| s.to_string()).collect(),
            comment: comment.into(),
            superseded: false,
        }
    }

    pub fn member(name: &str, enum_type: &str) -> Fact {
        Fact::EnumMember { name: name.into(), enum_type: enum_type.into(), superseded: false }
    }

    /// A slice of schema.org shaped like the real thing.
    pub fn mini_schema() -> Vec<Fact> {
        vec![
            class("Thing", &[]),
            class("Intangible", &["Thing"]),
            class("Place", &["Thing"]),
            class("Organization", &["Thing"]),
            class("LocalBusiness", &["Place", "Organization"]),
            class("Restaurant", &["LocalBusiness"]),
            class("Person", &["Thing"]),
            class("CreativeWork", &["Thing"]),
            class("Review", &["CreativeWork"]),
            class("Action", &["Thing"]),
            class("SearchAction", &["Action"]),
            class("Enumeration", &["Intangible"]),
            class("DayOfWeek", &["Enumeration"]),
            class("MedicalEnumeration", &["Enumeration"]),
            class("StructuredValue", &["Intangible"]),
            class("PostalAddress", &["StructuredValue"]),
            class("OpeningHoursSpecification", &["StructuredValue"]),
            class("Rating", &["Intangible"]),
            class("AggregateRating", &["Rating"]),
            class("ItemList", &["Intangible"]),
            class("BreadcrumbList", &["ItemList"]),
            class("OfferCatalog", &["ItemList"]),
            class("Offer", &["Intangible"]),
            member("Monday", "DayOfWeek"),
            member("Tuesday", "DayOfWeek"),
            prop("name", &["Thing"], &["Text"], "The name of the item."),
            prop("description", &["Thing"], &["Text"], "A description of the item."),
            prop("url", &["Thing"], &["URL"], "URL of the item."),
            prop("address", &["Place", "Organization", "Person"], &["PostalAddress", "Text"], "Physical address of the item."),
            prop("streetAddress", &["PostalAddress"], &["Text"], "The street address."),
            prop("addressLocality", &["PostalAddress"], &["Text"], "The locality."),
            prop("geo", &["Place"], &["GeoCoordinates"], "The geo coordinates of the place."),
            prop("openingHoursSpecification", &["Place"], &["OpeningHoursSpecification"], "The opening hours of a certain place."),
            prop("dayOfWeek", &["OpeningHoursSpecification"], &["DayOfWeek"], "The day of the week."),
            prop("opens", &["OpeningHoursSpecification"], &["Time"], "The opening hour."),
            prop("servesCuisine", &["Restaurant"], &["Text"], "The cuisine of the restaurant."),
            prop("aggregateRating", &["Place", "Organization", "CreativeWork"], &["AggregateRating"], "The overall rating."),
            prop("ratingValue", &["Rating"], &["Number", "Text"], "The rating for the content."),
            prop("reviewCount", &["AggregateRating"], &["Integer"], "The count of total number of reviews."),
            prop("review", &["Place", "Organization", "CreativeWork"], &["Review"], "A review of the item."),
            prop("author", &["CreativeWork", "Rating"], &["Organization", "Person"], "The author of this content."),
            prop("worksFor", &["Person"], &["Organization"], "Organizations that the person works for."),
            prop("award", &["Person", "Organization"], &["Text"], "An award won by or for this item."),
            prop("isAccessibleForFree", &["Place", "CreativeWork"], &["Boolean"], "A flag to signal free access."),
            prop("hasOfferCatalog", &["Organization"], &["OfferCatalog"], "Indicates an OfferCatalog listing."),
            prop("breadcrumb", &["CreativeWork"], &["BreadcrumbList", "Text"], "A set of links."),
            prop("price", &["Offer"], &["Number", "Text"], "The offer price of a product."),
        ]
    }
}
