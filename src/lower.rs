//! Lower the analyzed type graph into a class definition.
//!
//! Every scheduled type becomes one list query. Each property goes through
//! the resolver, is turned into a concrete `Ty` (building compounds for
//! struct-represented ranges) and gets its canonical phrases.
use indexmap::{IndexMap, IndexSet};

use crate::canonical::{self, text};
use crate::error::{CompileError, Diagnostics, Result};
use crate::hierarchy::{emission_order, PropertyDecl, TypeGraph, TypeId};
use crate::ir::{Annotations, ClassDef, Field, QueryDef, Ty};
use crate::policy::Policy;
use crate::resolve::{self, Choice, Shape};

#[derive(Debug, Clone, Default)]
pub struct LowerOptions {
    /// Scopes the class kind and every entity name (`org.schema.<name>`).
    pub class_name: Option<String>,
    /// Apply the manual canonical table as well.
    pub manual: bool,
}

impl LowerOptions {
    pub fn kind(&self) -> String {
        match &self.class_name {
            Some(name) => format!("org.schema.{name}"),
            None => "org.schema".to_string(),
        }
    }

    /// Prefix of entity type names, `org.schema:` or `org.schema.<name>:`.
    pub fn prefix(&self) -> String {
        format!("{}:", self.kind())
    }

    pub fn display_name(&self) -> String {
        match &self.class_name {
            Some(name) => format!("{name} in Schema.org"),
            None => "Schema.org".to_string(),
        }
    }
}

pub const CLASS_DESCRIPTION: &str = "Scraped data from websites that support schema.org";

pub fn lower_class(
    graph: &TypeGraph,
    policy: &Policy,
    options: &LowerOptions,
    diags: &mut Diagnostics,
) -> Result<ClassDef> {
    let mut lowerer = Lowerer::new(graph, policy, options, diags);
    let mut class = ClassDef {
        kind: options.kind(),
        name: options.display_name(),
        description: CLASS_DESCRIPTION.to_string(),
        imports: ClassDef::standard_imports(),
        queries: Default::default(),
    };
    for id in emission_order(graph, policy) {
        let query = lowerer.query(id)?;
        class.queries.insert(query.name.clone(), query);
    }
    tracing::debug!(queries = class.queries.len(), kind = %class.kind, "class lowered");
    Ok(class)
}

// ————————————————————————————————————————————————————————————————————————————
// LOWERER
// ————————————————————————————————————————————————————————————————————————————

struct Lowerer<'a> {
    graph: &'a TypeGraph,
    policy: &'a Policy,
    manual: bool,
    prefix: String,
    diags: &'a mut Diagnostics,
    /// Set while lowering a query that has a geo property.
    has_geo: bool,
    /// Compounds currently under construction, outermost first.
    building: Vec<String>,
}

impl<'a> Lowerer<'a> {
    fn new(graph: &'a TypeGraph, policy: &'a Policy, options: &LowerOptions, diags: &'a mut Diagnostics) -> Self {
        Self {
            graph,
            policy,
            manual: options.manual,
            prefix: options.prefix(),
            diags,
            has_geo: false,
            building: Vec::new(),
        }
    }

    fn query(&mut self, id: TypeId) -> Result<QueryDef> {
        let graph = self.graph;
        let node = graph.node(id);
        let type_name = node.name.as_str();
        let name_key = format!("{}{}_name", self.prefix, type_name);

        let mut id_field = Field {
            name: "id".into(),
            ty: Ty::entity(format!("{}{}", self.prefix, type_name)),
            canonical: None,
            annotations: Annotations { unique: Some(true), filterable: Some(false), ..Default::default() },
        };
        self.attach_string_values(&mut id_field, &name_key);
        let mut fields = vec![id_field];

        if type_name != self.policy.root_type {
            let mut name_field = Field {
                name: "name".into(),
                ty: Ty::String,
                canonical: None,
                annotations: Annotations {
                    org_schema_type: Some(self.policy.text_type.clone()),
                    filterable: Some(false),
                    ..Default::default()
                },
            };
            self.attach_string_values(&mut name_field, &name_key);
            fields.push(name_field);
        }

        self.has_geo = node.properties.contains_key(&self.policy.geo_property);
        for (prop_name, decl) in &node.properties {
            let arg_name = self.policy.escape_keyword(prop_name);
            if fields.iter().any(|f| f.name == arg_name) {
                self.diags.debug(type_name, format!("property {prop_name} shadows a synthetic field, skipped"));
                continue;
            }
            let Some(mut field) = self.property(prop_name, decl)? else { continue };
            field.name = arg_name;
            if self.policy.no_filter.contains(prop_name.as_str()) {
                field.annotations.filterable = Some(false);
            }
            let key = format!("{}{}_{}", self.prefix, type_name, field.name);
            self.attach_string_values(&mut field, &key);
            fields.push(field);
        }
        self.has_geo = false;

        Ok(QueryDef {
            name: self.policy.escape_keyword(type_name),
            extends: node.extends.iter().map(|p| self.policy.escape_keyword(p)).collect(),
            canonical: text::clean(type_name),
            confirmation: text::clean(type_name),
            is_list: true,
            is_monitorable: false,
            confirm: false,
            fields,
        })
    }

    /// Resolve, lower and title one property. `None` if it was dropped.
    fn property(&mut self, name: &str, decl: &PropertyDecl) -> Result<Option<Field>> {
        let Some(choice) = resolve::choose(name, decl, self.graph, self.policy, self.diags) else {
            return Ok(None);
        };
        let ty = self.finish(&choice)?;
        let canonical = canonical::synthesize(name, &ty, self.policy, self.manual);
        Ok(Some(Field {
            name: name.to_string(),
            ty,
            canonical: Some(canonical),
            annotations: Annotations { org_schema_type: Some(choice.range), ..Default::default() },
        }))
    }

    fn finish(&mut self, choice: &Choice) -> Result<Ty> {
        match &choice.shape {
            Shape::Fixed(ty) => Ok(ty.clone()),
            Shape::Lower { array } => Ok(resolve::wrap(self.lower_range(&choice.range)?, *array)),
        }
    }

    /// builtin → list → enum → compound → entity reference
    fn lower_range(&mut self, range: &str) -> Result<Ty> {
        if let Some(ty) = self.policy.builtin_types.get(range) {
            return Ok(ty.clone());
        }
        let graph = self.graph;
        let node = graph.get(range).ok_or_else(|| CompileError::UnknownType(range.to_string()))?;
        let class = &node.class;
        if class.is_item_list {
            let item = class.item_type.clone().unwrap_or_else(|| self.policy.root_type.clone());
            if self.policy.builtin_types.contains_key(&item) || graph.contains(&item) {
                return Ok(Ty::array(self.lower_range(&item)?));
            }
            self.diags.debug(range, format!("list element type {item} is not declared, using an entity reference"));
            return Ok(Ty::array(Ty::entity(format!("{}{}", self.prefix, item))));
        }
        if class.is_enum {
            return Ok(Ty::Enum(node.enum_values.iter().cloned().collect()));
        }
        if class.represent_as_struct {
            if self.building.iter().any(|b| b == range) {
                self.diags.warn(range, format!(
                    "recursive struct through {}, represented as an entity",
                    self.building.join(" → "),
                ));
            } else {
                return self.compound(range);
            }
        }
        Ok(Ty::entity(format!("{}{}", self.prefix, range)))
    }

    fn compound(&mut self, name: &str) -> Result<Ty> {
        self.building.push(name.to_string());
        let result = self.compound_fields(name);
        self.building.pop();
        let fields = result?;
        if fields.is_empty() {
            return Err(CompileError::EmptyStruct(name.to_string()));
        }
        Ok(Ty::Compound { name: name.to_string(), fields })
    }

    fn compound_fields(&mut self, name: &str) -> Result<Vec<Field>> {
        let mut fields = Vec::new();
        for decl in self.struct_properties(name) {
            let Some(mut field) = self.property(&decl.name, &decl)? else { continue };
            let annotations = &mut field.annotations;
            if self.policy.no_filter.contains(&decl.name) {
                annotations.filterable = Some(false);
            } else if self.has_geo && self.policy.drop_with_geo.contains(&decl.name) {
                annotations.filterable = Some(false);
                annotations.drop = Some(true);
            }
            fields.push(field);
        }
        Ok(fields)
    }

    /// Properties of a struct type and its struct ancestors, closer first,
    /// first declaration winning. The walk stops at the struct roots unless
    /// the type asks for the universal root's properties too.
    fn struct_properties(&self, start: &str) -> Vec<PropertyDecl> {
        let include_root = self.policy.struct_include_root_properties.contains(start);
        let mut collected: IndexMap<String, PropertyDecl> = IndexMap::new();
        let mut visited = IndexSet::new();
        let mut stack = vec![start.to_string()];
        while let Some(type_name) = stack.pop() {
            let Some(node) = self.graph.get(&type_name) else { continue };
            if !visited.insert(type_name.clone()) {
                continue;
            }
            if !include_root && !node.class.is_struct_subtype {
                continue;
            }
            for (prop_name, decl) in &node.properties {
                collected.entry(prop_name.clone()).or_insert_with(|| decl.clone());
            }
            if !include_root && self.policy.struct_roots.contains(&type_name) {
                continue;
            }
            // reversed so the first parent is visited first
            stack.extend(node.extends.iter().rev().cloned());
        }
        collected.into_values().collect()
    }

    /// Attach `string_values` keys: strings get the key (or its override),
    /// entities only an override, compounds recurse per field.
    fn attach_string_values(&self, field: &mut Field, key: &str) {
        attach_string_values(self.policy, &mut field.ty, &mut field.annotations, key);
    }
}

fn attach_string_values(policy: &Policy, ty: &mut Ty, annotations: &mut Annotations, key: &str) {
    let overridden = policy.string_value_overrides.get(key);
    match ty.element_mut() {
        Ty::Entity(_) => {
            if let Some(source) = overridden {
                annotations.string_values = Some(source.clone());
            }
        }
        Ty::String => {
            annotations.string_values = Some(overridden.cloned().unwrap_or_else(|| key.to_string()));
        }
        Ty::Compound { fields, .. } => {
            for field in fields.iter_mut().filter(|f| !f.name.contains('.')) {
                let nested = format!("{key}_{}", field.name);
                attach_string_values(policy, &mut field.ty, &mut field.annotations, &nested);
            }
        }
        _ => {}
    }
}
