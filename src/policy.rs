//! Compilation policy: designated roots, exclusion lists and override tables.
//!
//! `Policy::default()` is tuned for the schema.org vocabulary. A JSON policy
//! file may replace any subset of the fields; missing fields keep their
//! defaults.
use std::path::Path;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::canonical::overrides;
use crate::error::Result;
use crate::ir::{CanonicalPhraseSet, Ty};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// IRI prefixes stripped from identifiers.
    pub namespaces: Vec<String>,

    pub root_type: String,
    pub action_root: String,
    pub enumeration_root: String,
    pub list_root: String,
    /// Suffixes that turn a list type name into its element type name.
    pub list_suffixes: Vec<String>,
    /// Candidate range ranked as generic text.
    pub text_type: String,
    /// Placeholder range rewritten by keyword heuristics.
    pub quantitative_type: String,

    /// Ontology datatypes with a direct target-language equivalent.
    pub builtin_types: IndexMap<String, Ty>,

    pub excluded_types: IndexSet<String>,
    pub excluded_properties: IndexSet<String>,

    /// Hierarchies flattened inline as compound values.
    pub struct_roots: Vec<String>,
    pub non_struct_types: IndexSet<String>,
    /// Struct types that also collect properties from the universal root.
    pub struct_include_root_properties: IndexSet<String>,

    pub force_array: IndexSet<String>,
    pub force_singular: IndexSet<String>,
    pub type_overrides: IndexMap<String, Ty>,

    pub no_filter: IndexSet<String>,
    /// Dropped from structs whose owning query has a `geo` property.
    pub drop_with_geo: IndexSet<String>,
    pub geo_property: String,

    /// `string_values` keys that point at a curated dataset.
    pub string_value_overrides: IndexMap<String, String>,

    /// Target-language keywords; colliding names get a `_` prefix.
    pub keywords: IndexSet<String>,

    pub canonical_overrides: IndexMap<String, CanonicalPhraseSet>,
    /// Only consulted when manual annotations are enabled.
    pub manual_canonical_overrides: IndexMap<String, CanonicalPhraseSet>,
}

fn set(items: &[&str]) -> IndexSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for Policy {
    fn default() -> Self {
        let builtin_types: IndexMap<String, Ty> = [
            ("Time", Ty::Time),
            ("Number", Ty::Number),
            ("Float", Ty::Number),
            ("Integer", Ty::Number),
            ("Text", Ty::String),
            ("Boolean", Ty::Boolean),
            ("DateTime", Ty::Date),
            ("Date", Ty::Date),
            ("DataType", Ty::Any),
            ("URL", Ty::entity("tt:url")),
            ("ImageObject", Ty::entity("tt:picture")),
            ("Barcode", Ty::entity("tt:picture")),
            ("Mass", Ty::measure("kg")),
            ("Energy", Ty::measure("kcal")),
            ("Distance", Ty::measure("m")),
            ("Duration", Ty::measure("ms")),
            ("GeoCoordinates", Ty::Location),
            ("MonetaryAmount", Ty::Currency),
            ("QuantitativeValue", Ty::Any),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let type_overrides: IndexMap<String, Ty> = [
            ("telephone", Ty::entity("tt:phone_number")),
            ("email", Ty::entity("tt:email_address")),
            ("image", Ty::entity("tt:picture")),
            ("logo", Ty::entity("tt:picture")),
            ("checkinTime", Ty::Time),
            ("checkoutTime", Ty::Time),
            ("price", Ty::Currency),
            ("weight", Ty::measure("ms")),
            ("depth", Ty::measure("m")),
            ("description", Ty::String),
            ("addressCountry", Ty::entity("tt:country")),
            ("addressRegion", Ty::entity("tt:us_state")),
            // prefer VideoObject over Clip, Organization over Person
            ("video", Ty::entity("org.schema:VideoObject")),
            ("publisher", Ty::entity("org.schema:Organization")),
            // number-like but mostly free text
            ("recipeYield", Ty::String),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let string_value_overrides: IndexMap<String, String> = [
            ("org.schema.Restaurant:Restaurant_name", "com.yelp:restaurant_names"),
            ("org.schema.Person:Person_name", "tt:person_full_name"),
            ("org.schema.Person:Person_alumniOf", "tt:university_names"),
            ("org.schema.Person:Person_worksFor", "tt:company_name"),
            ("org.schema.Hotel:Hotel_name", "tt:hotel_name"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            namespaces: strings(&["http://schema.org/", "https://schema.org/", "schema:"]),
            root_type: "Thing".into(),
            action_root: "Action".into(),
            enumeration_root: "Enumeration".into(),
            list_root: "ItemList".into(),
            list_suffixes: strings(&["List", "Collection", "Section", "Catalog"]),
            text_type: "Text".into(),
            quantitative_type: "QuantitativeValue".into(),
            builtin_types,
            excluded_types: set(&[
                "QualitativeValue", "PropertyValue", "BedType", "MedicalBusiness",
                // turns Audience into an enum
                "Researcher",
            ]),
            excluded_properties: set(&[
                "sameAs", "affiliation", "mainEntityOfPage", "embedUrl",
                "itemReviewed",
                // used as the range of a rating
                "bestRating", "worstRating",
                // renamed to description during normalization
                "reviewBody",
                // containment loops in PriceSpecification and Offer
                "eligibleTransactionVolume", "addOn",
                "areaServed",
                "priceCurrency",
            ]),
            // Review is too irregular to flatten.
            struct_roots: strings(&["StructuredValue", "Rating", "Offer"]),
            non_struct_types: IndexSet::new(),
            struct_include_root_properties: set(&["LocationFeatureSpecification"]),
            force_array: set(&["worksFor", "recipeCuisine", "recipeCategory"]),
            force_singular: set(&["offers"]),
            type_overrides,
            no_filter: set(&["name", "priceRange", "gtin13", "productID", "mpn"]),
            drop_with_geo: set(&["streetAddress", "addressLocality"]),
            geo_property: "geo".into(),
            string_value_overrides,
            keywords: set(&[
                "let", "now", "new", "as", "of", "in", "out", "req", "opt", "notify", "return",
                "join", "edge", "monitor", "class", "extends", "mixin", "this", "import", "null",
                "enum", "aggregate", "dataset", "oninput", "sort", "asc", "desc", "bookkeeping",
                "compute", "true", "false",
            ]),
            canonical_overrides: overrides::structural(),
            manual_canonical_overrides: overrides::manual(),
        }
    }
}

impl Policy {
    pub fn load(path: &Path) -> Result<Self> {
        let src = std::fs::read_to_string(path)?;
        crate::path_de::from_str_with_path(&src)
    }

    pub fn namespace(&self) -> crate::facts::Namespace {
        crate::facts::Namespace::new(self.namespaces.iter().cloned())
    }

    pub fn is_builtin(&self, name: &str) -> bool { self.builtin_types.contains_key(name) }

    pub fn is_keyword(&self, name: &str) -> bool { self.keywords.contains(name) }

    /// Escape a property or query name that collides with a keyword.
    pub fn escape_keyword(&self, name: &str) -> String {
        if self.is_keyword(name) { format!("_{name}") } else { name.to_string() }
    }

    /// Look up a canonical override; the manual table only when enabled.
    pub fn canonical_override(&self, name: &str, manual: bool) -> Option<&CanonicalPhraseSet> {
        self.canonical_overrides.get(name).or_else(|| {
            if manual { self.manual_canonical_overrides.get(name) } else { None }
        })
    }

    pub fn has_canonical_override(&self, name: &str) -> bool {
        self.canonical_overrides.contains_key(name)
    }
}
