// Strongly-typed IR for codegen. No serde_json::Value here.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// ThingTalk value types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ty {
    Any,
    Boolean,
    Number,
    String,
    Date,
    Time,
    Location,
    Currency,
    Measure(String),         // base unit, e.g. "kg"
    Entity(String),          // e.g. "tt:url", "org.schema:Person"
    Enum(Vec<String>),
    Array(Box<Ty>),
    Compound {
        name: String,
        fields: Vec<Field>,  // declaration order of the collected properties
    },
}

impl Ty {
    pub fn entity(kind: impl Into<String>) -> Self { Ty::Entity(kind.into()) }
    pub fn measure(unit: impl Into<String>) -> Self { Ty::Measure(unit.into()) }
    pub fn array(elem: Ty) -> Self { Ty::Array(Box::new(elem)) }

    pub fn is_array(&self) -> bool { matches!(self, Ty::Array(_)) }
    pub fn is_measure(&self) -> bool { matches!(self, Ty::Measure(_)) }

    /// Innermost non-array type.
    pub fn element(&self) -> &Ty {
        match self {
            Ty::Array(inner) => inner.element(),
            other => other,
        }
    }

    pub fn element_mut(&mut self) -> &mut Ty {
        match self {
            Ty::Array(inner) => inner.element_mut(),
            other => other,
        }
    }

    /// Entity kind of the element type, if it is an entity.
    pub fn entity_kind(&self) -> Option<&str> {
        match self.element() {
            Ty::Entity(kind) => Some(kind),
            _ => None,
        }
    }
}

/// Syntactic pattern a canonical phrase follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhraseTag {
    Base,
    /// noun-phrase-predicate: "restaurants with <rating> #"
    #[serde(alias = "npp")]
    Property,
    /// noun-phrase-of-predicate: "people who are <alumni of> #"
    #[serde(alias = "npi")]
    ReverseProperty,
    /// passive-verb-phrase: "reviews <written by> #"
    #[serde(alias = "pvp")]
    PassiveVerb,
    /// active-verb-phrase: "restaurants that <serve> #"
    #[serde(alias = "avp")]
    Verb,
    Adjective,
}

impl PhraseTag {
    pub fn as_str(self) -> &'static str {
        match self {
            PhraseTag::Base => "base",
            PhraseTag::Property => "property",
            PhraseTag::ReverseProperty => "reverse_property",
            PhraseTag::PassiveVerb => "passive_verb",
            PhraseTag::Verb => "verb",
            PhraseTag::Adjective => "adjective",
        }
    }

    /// Current names plus the legacy abbreviations.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "base" => PhraseTag::Base,
            "property" | "npp" => PhraseTag::Property,
            "reverse_property" | "npi" => PhraseTag::ReverseProperty,
            "passive_verb" | "pvp" => PhraseTag::PassiveVerb,
            "verb" | "avp" => PhraseTag::Verb,
            "adjective" => PhraseTag::Adjective,
            _ => return None,
        })
    }
}

fn is_false(b: &bool) -> bool { !*b }

/// Natural-language templates for one property; `#` marks the value slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalPhraseSet {
    pub default: PhraseTag,
    #[serde(flatten)]
    pub phrases: IndexMap<PhraseTag, Vec<String>>,
    /// the value can be used as an adjective before the verb ("serves #cuisine")
    #[serde(default, skip_serializing_if = "is_false")]
    pub apv: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub implicit_identity: bool,
}

impl CanonicalPhraseSet {
    pub fn new(default: PhraseTag) -> Self {
        Self { default, phrases: IndexMap::new(), apv: false, implicit_identity: false }
    }

    pub fn get(&self, tag: PhraseTag) -> &[String] {
        self.phrases.get(&tag).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn set(&mut self, tag: PhraseTag, phrases: Vec<String>) {
        self.phrases.insert(tag, phrases);
    }

    /// Append unless already present. Returns whether anything was added.
    pub fn push_unique(&mut self, tag: PhraseTag, phrase: impl Into<String>) -> bool {
        let phrase = phrase.into();
        let list = self.phrases.entry(tag).or_default();
        if list.contains(&phrase) {
            return false;
        }
        list.push(phrase);
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_schema_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filterable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drop: Option<bool>,
    /// key of the external string dataset the values come from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_values: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub ty: Ty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical: Option<CanonicalPhraseSet>,
    #[serde(default)]
    pub annotations: Annotations,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDef {
    pub name: String,
    pub extends: Vec<String>,
    pub canonical: String,
    pub confirmation: String,
    pub is_list: bool,
    pub is_monitorable: bool,
    pub confirm: bool,
    pub fields: Vec<Field>,
}

impl QueryDef {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Every argument path, compound members included as `parent.member`
    /// right after their parent.
    pub fn arguments(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect_paths("", &self.fields, &mut out);
        out
    }

    pub fn argument(&self, path: &str) -> Option<&Field> {
        let (head, rest) = split_path(path);
        let field = self.field(head)?;
        match rest {
            None => Some(field),
            Some(rest) => member(field, rest),
        }
    }

    pub fn argument_mut(&mut self, path: &str) -> Option<&mut Field> {
        let (head, rest) = split_path(path);
        let field = self.field_mut(head)?;
        match rest {
            None => Some(field),
            Some(rest) => member_mut(field, rest),
        }
    }
}

fn split_path(path: &str) -> (&str, Option<&str>) {
    match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    }
}

fn collect_paths(prefix: &str, fields: &[Field], out: &mut Vec<String>) {
    for field in fields {
        let path = format!("{prefix}{}", field.name);
        out.push(path.clone());
        if let Ty::Compound { fields, .. } = field.ty.element() {
            collect_paths(&format!("{path}."), fields, out);
        }
    }
}

fn member<'f>(field: &'f Field, path: &str) -> Option<&'f Field> {
    let Ty::Compound { fields, .. } = field.ty.element() else { return None };
    let (head, rest) = split_path(path);
    let inner = fields.iter().find(|f| f.name == head)?;
    match rest {
        None => Some(inner),
        Some(rest) => member(inner, rest),
    }
}

fn member_mut<'f>(field: &'f mut Field, path: &str) -> Option<&'f mut Field> {
    let Ty::Compound { fields, .. } = field.ty.element_mut() else { return None };
    let (head, rest) = split_path(path);
    let inner = fields.iter_mut().find(|f| f.name == head)?;
    match rest {
        None => Some(inner),
        Some(rest) => member_mut(inner, rest),
    }
}

/// `import <facet> from @<module>();`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    pub facet: String,
    pub module: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDef {
    pub kind: String,
    pub name: String,
    pub description: String,
    pub imports: Vec<Import>,
    pub queries: IndexMap<String, QueryDef>,
}

impl ClassDef {
    /// The two capabilities every generated class carries.
    pub fn standard_imports() -> Vec<Import> {
        vec![
            Import { facet: "loader".into(), module: "org.thingpedia.v2".into() },
            Import { facet: "config".into(), module: "org.thingpedia.config.none".into() },
        ]
    }
}
