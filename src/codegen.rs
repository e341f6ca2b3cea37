//! ThingTalk class printer.
//!
//! ```text
//! class @org.schema
//! #_[name="Schema.org"]
//! #_[description="..."] {
//!   import loader from @org.thingpedia.v2();
//!
//!   list query Place extends Thing(
//!     out id: Entity(org.schema:Place)
//!     #[unique=true]
//!     #[filterable=false],
//!     ...
//!   )
//!   #_[canonical="place"]
//!   #_[confirmation="place"]
//!   #[confirm=false];
//! }
//! ```
use crate::ir::{Annotations, CanonicalPhraseSet, ClassDef, Field, QueryDef, Ty};

#[derive(Debug, Default)]
pub struct Codegen {
    out: String,
    depth: usize,
}

impl Codegen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_string(self) -> String {
        self.out
    }

    pub fn emit(&mut self, class: &ClassDef) {
        self.push(&format!("class @{}", class.kind));
        self.nl();
        self.push(&format!("#_[name={}]", quote(&class.name)));
        self.nl();
        self.push(&format!("#_[description={}] {{", quote(&class.description)));
        self.depth += 1;
        for import in &class.imports {
            self.nl();
            self.push(&format!("import {} from @{}();", import.facet, import.module));
        }
        for query in class.queries.values() {
            self.out.push('\n');
            self.nl();
            self.query(query);
        }
        self.depth -= 1;
        self.nl();
        self.push("}");
        self.out.push('\n');
    }

    fn query(&mut self, query: &QueryDef) {
        let mut head = String::new();
        if query.is_monitorable {
            head.push_str("monitorable ");
        }
        if query.is_list {
            head.push_str("list ");
        }
        head.push_str("query ");
        head.push_str(&query.name);
        if !query.extends.is_empty() {
            head.push_str(" extends ");
            head.push_str(&query.extends.join(", "));
        }
        head.push('(');
        self.push(&head);

        self.depth += 1;
        for (i, field) in query.fields.iter().enumerate() {
            self.nl();
            self.push("out ");
            self.field(field);
            if i + 1 < query.fields.len() {
                self.push(",");
            }
        }
        self.depth -= 1;

        self.nl();
        self.push(")");
        self.nl();
        self.push(&format!("#_[canonical={}]", quote(&query.canonical)));
        self.nl();
        self.push(&format!("#_[confirmation={}]", quote(&query.confirmation)));
        self.nl();
        self.push(&format!("#[confirm={}];", query.confirm));
    }

    fn field(&mut self, field: &Field) {
        self.push(&field.name);
        self.push(": ");
        self.ty(&field.ty);
        if let Some(canonical) = &field.canonical {
            self.nl();
            self.push(&format!("#_[canonical={}]", canonical_literal(canonical)));
        }
        for (key, value) in impl_annotations(&field.annotations) {
            self.nl();
            self.push(&format!("#[{key}={value}]"));
        }
    }

    fn ty(&mut self, ty: &Ty) {
        match ty {
            Ty::Array(inner) => {
                self.push("Array(");
                self.ty(inner);
                self.push(")");
            }
            Ty::Compound { fields, .. } => {
                self.push("{");
                self.depth += 1;
                for (i, field) in fields.iter().enumerate() {
                    self.nl();
                    self.field(field);
                    if i + 1 < fields.len() {
                        self.push(",");
                    }
                }
                self.depth -= 1;
                self.nl();
                self.push("}");
            }
            other => self.push(&scalar(other)),
        }
    }

    fn push(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn nl(&mut self) {
        self.out.push('\n');
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
    }
}

/// Render a class as ThingTalk source.
pub fn to_thingtalk(class: &ClassDef) -> String {
    let mut cg = Codegen::new();
    cg.emit(class);
    cg.into_string()
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn quote(s: &str) -> String {
    serde_json::Value::from(s).to_string()
}

fn scalar(ty: &Ty) -> String {
    match ty {
        Ty::Any => "Any".into(),
        Ty::Boolean => "Boolean".into(),
        Ty::Number => "Number".into(),
        Ty::String => "String".into(),
        Ty::Date => "Date".into(),
        Ty::Time => "Time".into(),
        Ty::Location => "Location".into(),
        Ty::Currency => "Currency".into(),
        Ty::Measure(unit) => format!("Measure({unit})"),
        Ty::Entity(kind) => format!("Entity({kind})"),
        Ty::Enum(values) => format!("Enum({})", values.join(", ")),
        Ty::Array(inner) => format!("Array({})", scalar(inner)),
        Ty::Compound { name, .. } => format!("Compound({name})"),
    }
}

/// `{default="property",base=["name"],passive_verb=["called"]}`
fn canonical_literal(set: &CanonicalPhraseSet) -> String {
    let mut parts = vec![format!("default={}", quote(set.default.as_str()))];
    for (tag, phrases) in &set.phrases {
        let list: Vec<String> = phrases.iter().map(|p| quote(p)).collect();
        parts.push(format!("{}=[{}]", tag.as_str(), list.join(",")));
    }
    if set.apv {
        parts.push("apv=true".into());
    }
    if set.implicit_identity {
        parts.push("implicit_identity=true".into());
    }
    format!("{{{}}}", parts.join(","))
}

fn impl_annotations(annotations: &Annotations) -> Vec<(&'static str, String)> {
    let mut out = Vec::new();
    if let Some(t) = &annotations.org_schema_type {
        out.push(("org_schema_type", quote(t)));
    }
    if let Some(b) = annotations.unique {
        out.push(("unique", b.to_string()));
    }
    if let Some(b) = annotations.filterable {
        out.push(("filterable", b.to_string()));
    }
    if let Some(b) = annotations.drop {
        out.push(("drop", b.to_string()));
    }
    if let Some(s) = &annotations.string_values {
        out.push(("string_values", quote(s)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::PhraseTag;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    fn thing_query() -> QueryDef {
        let mut called = CanonicalPhraseSet::new(PhraseTag::Property);
        called.set(PhraseTag::Base, vec!["name".into()]);
        called.set(PhraseTag::PassiveVerb, vec!["called".into()]);
        QueryDef {
            name: "Thing".into(),
            extends: vec![],
            canonical: "thing".into(),
            confirmation: "thing".into(),
            is_list: true,
            is_monitorable: false,
            confirm: false,
            fields: vec![
                Field {
                    name: "id".into(),
                    ty: Ty::entity("org.schema:Thing"),
                    canonical: None,
                    annotations: Annotations { unique: Some(true), filterable: Some(false), ..Default::default() },
                },
                Field {
                    name: "name".into(),
                    ty: Ty::String,
                    canonical: Some(called),
                    annotations: Annotations {
                        org_schema_type: Some("Text".into()),
                        filterable: Some(false),
                        string_values: Some("org.schema:Thing_name".into()),
                        ..Default::default()
                    },
                },
            ],
        }
    }

    #[test]
    fn prints_a_class() {
        let mut queries = IndexMap::new();
        queries.insert("Thing".to_string(), thing_query());
        let class = ClassDef {
            kind: "org.schema".into(),
            name: "Schema.org".into(),
            description: "Scraped data from websites that support schema.org".into(),
            imports: ClassDef::standard_imports(),
            queries,
        };
        let expected = r#"class @org.schema
#_[name="Schema.org"]
#_[description="Scraped data from websites that support schema.org"] {
  import loader from @org.thingpedia.v2();
  import config from @org.thingpedia.config.none();

  list query Thing(
    out id: Entity(org.schema:Thing)
    #[unique=true]
    #[filterable=false],
    out name: String
    #_[canonical={default="property",base=["name"],passive_verb=["called"]}]
    #[org_schema_type="Text"]
    #[filterable=false]
    #[string_values="org.schema:Thing_name"]
  )
  #_[canonical="thing"]
  #_[confirmation="thing"]
  #[confirm=false];
}
"#;
        assert_eq!(to_thingtalk(&class), expected);
    }

    #[test]
    fn prints_compounds_inline() {
        let address = Field {
            name: "address".into(),
            ty: Ty::array(Ty::Compound {
                name: "PostalAddress".into(),
                fields: vec![
                    Field {
                        name: "streetAddress".into(),
                        ty: Ty::String,
                        canonical: None,
                        annotations: Annotations { drop: Some(true), ..Default::default() },
                    },
                    Field {
                        name: "postOfficeBoxNumber".into(),
                        ty: Ty::Number,
                        canonical: None,
                        annotations: Annotations::default(),
                    },
                ],
            }),
            canonical: None,
            annotations: Annotations { org_schema_type: Some("PostalAddress".into()), ..Default::default() },
        };
        let mut cg = Codegen::new();
        cg.field(&address);
        let expected = r#"address: Array({
  streetAddress: String
  #[drop=true],
  postOfficeBoxNumber: Number
})
#[org_schema_type="PostalAddress"]"#;
        assert_eq!(cg.into_string(), expected);
    }

    #[test]
    fn scalar_types_and_escaping() {
        assert_eq!(scalar(&Ty::measure("kg")), "Measure(kg)");
        assert_eq!(scalar(&Ty::Enum(vec!["Monday".into(), "Tuesday".into()])), "Enum(Monday, Tuesday)");
        assert_eq!(scalar(&Ty::array(Ty::entity("tt:url"))), "Array(Entity(tt:url))");
        assert_eq!(quote(r#"say "hi""#), r#""say \"hi\"""#);

        let mut flagged = CanonicalPhraseSet::new(PhraseTag::Verb);
        flagged.set(PhraseTag::Verb, vec!["serves #cuisine".into()]);
        flagged.apv = true;
        assert_eq!(canonical_literal(&flagged), r#"{default="verb",verb=["serves #cuisine"],apv=true}"#);
    }

    #[test]
    fn monitorable_queries_and_parents() {
        let mut q = thing_query();
        q.name = "Restaurant".into();
        q.extends = vec!["LocalBusiness".into(), "FoodEstablishment".into()];
        q.is_monitorable = true;
        q.fields.truncate(1);
        let mut cg = Codegen::new();
        cg.query(&q);
        let out = cg.into_string();
        assert!(out.starts_with("monitorable list query Restaurant extends LocalBusiness, FoodEstablishment(\n"));
    }
}
