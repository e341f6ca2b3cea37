//! Canonical refinement through an external oracle.
//!
//! The annotator pre-pass tidies the synthesized phrases and builds a
//! request with the phrases, sample values and dataset paths of every
//! argument. The oracle answers with extra candidates, which are merged
//! back additively: nothing already present is removed or duplicated, so
//! merging the same response twice is a no-op.
use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::canonical::text;
use crate::error::{Diagnostics, Result};
use crate::ir::{CanonicalPhraseSet, ClassDef, PhraseTag};
use crate::path_de;
use crate::policy::Policy;
use crate::samples::{self, SampleSource};

// ————————————————————————————————————————————————————————————————————————————
// WIRE FORMAT
// ————————————————————————————————————————————————————————————————————————————

/// Query name → what the oracle needs to know about it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefinementRequest {
    pub queries: IndexMap<String, QueryRequest>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub canonical: String,
    pub args: IndexMap<String, ArgRequest>,
}

/// Empty for arguments the pre-pass skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArgRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonicals: Option<CanonicalPhraseSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefinementResponse {
    /// query → argument → phrase tag → candidates
    #[serde(default)]
    pub synonyms: IndexMap<String, IndexMap<String, IndexMap<String, Candidates>>>,
    /// `Query.argument` entries usable as a bare adjective
    #[serde(default)]
    pub adjectives: Vec<String>,
    /// `Query.argument` entries whose value alone identifies the result
    #[serde(default)]
    pub implicit_identity: Vec<String>,
}

/// Either a plain list of phrases, or phrases keyed to per-phrase detail
/// (scores, example sentences) that the merge does not look at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Candidates {
    List(Vec<String>),
    Keyed(IndexMap<String, serde_json::Value>),
}

impl Candidates {
    pub fn phrases(&self) -> Vec<&str> {
        match self {
            Candidates::List(list) => list.iter().map(String::as_str).collect(),
            Candidates::Keyed(map) => map.keys().map(String::as_str).collect(),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// ORACLES
// ————————————————————————————————————————————————————————————————————————————

pub trait RefinementOracle {
    fn refine(&self, request: &RefinementRequest) -> Result<RefinementResponse>;
}

/// Replays a response recorded to a JSON file.
#[derive(Debug, Clone)]
pub struct FileOracle {
    path: PathBuf,
}

impl FileOracle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RefinementOracle for FileOracle {
    fn refine(&self, request: &RefinementRequest) -> Result<RefinementResponse> {
        tracing::debug!(path = %self.path.display(), queries = request.queries.len(), "replaying recorded refinements");
        let src = std::fs::read_to_string(&self.path)?;
        path_de::from_str_with_path(&src)
    }
}

/// Answers every request with the same response.
#[derive(Debug, Clone, Default)]
pub struct StaticOracle(pub RefinementResponse);

impl RefinementOracle for StaticOracle {
    fn refine(&self, _request: &RefinementRequest) -> Result<RefinementResponse> {
        Ok(self.0.clone())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// PIPELINE
// ————————————————————————————————————————————————————————————————————————————

/// Pre-pass, one oracle call, merge.
pub fn refine(
    class: &mut ClassDef,
    policy: &Policy,
    source: Option<&dyn SampleSource>,
    oracle: &dyn RefinementOracle,
    diags: &mut Diagnostics,
) -> Result<()> {
    let request = annotate(class, policy, source);
    let response = oracle.refine(&request)?;
    merge(class, &response, diags);
    Ok(())
}

/// Tidy the synthesized phrases of every argument and collect the request.
///
/// Arguments covered by the manual canonical table are left alone. For the
/// rest: a leading `<query> ` is stripped from every phrase, `base` fills
/// in a missing `property`, and an entity type used by only one argument of
/// the query may stand in for the property name (`#`), with `Person` values
/// also usable as a possessive adjective.
pub fn annotate(class: &mut ClassDef, policy: &Policy, source: Option<&dyn SampleSource>) -> RefinementRequest {
    let kind = class.kind.clone();
    let emitted: IndexSet<String> = class.queries.keys().cloned().collect();
    let mut request = RefinementRequest::default();

    for (qname, query) in class.queries.iter_mut() {
        let paths = query.arguments();
        let mut entity_counts: IndexMap<String, usize> = IndexMap::new();
        for path in &paths {
            if let Some(kind) = query.argument(path).and_then(|f| f.ty.entity_kind()) {
                *entity_counts.entry(kind.to_string()).or_default() += 1;
            }
        }

        let prefix = format!("{} ", qname.to_lowercase());
        let mut args = IndexMap::new();
        for path in paths {
            let arg = args.entry(path.clone()).or_insert_with(ArgRequest::default);
            if is_manually_annotated(policy, &path) {
                continue;
            }
            let Some(field) = query.argument_mut(&path) else { continue };

            let keys = samples::lookup_keys(&kind, qname, &path, field);
            arg.path = source.and_then(|s| samples::find_path(s, &keys));

            let entity = field.ty.entity_kind().map(str::to_string);
            let Some(set) = field.canonical.as_mut() else { continue };

            for phrases in set.phrases.values_mut() {
                for phrase in phrases.iter_mut() {
                    if let Some(rest) = phrase.strip_prefix(&prefix) {
                        *phrase = rest.to_string();
                    }
                }
            }
            if !set.phrases.contains_key(&PhraseTag::Property) && !set.get(PhraseTag::Base).is_empty() {
                let base = set.get(PhraseTag::Base).to_vec();
                set.set(PhraseTag::Property, base);
            }

            let unique_entity = entity.filter(|e| entity_counts.get(e) == Some(&1));
            if let Some(entity) = unique_entity {
                let local = entity.split_once(':').map_or(entity.as_str(), |(_, l)| l);
                if !set.phrases.contains_key(&PhraseTag::Property) {
                    let noun = text::clean(local);
                    set.set(PhraseTag::Property, vec![noun.clone()]);
                    set.set(PhraseTag::Base, vec![noun]);
                }
                if !emitted.contains(local) {
                    set.push_unique(PhraseTag::Property, "#");
                }
                if entity.ends_with(":Person") {
                    set.set(PhraseTag::Adjective, vec!["# 's".into(), "#".into()]);
                }
            }

            if let Some(values) = source.and_then(|s| samples::find_samples(s, &keys)) {
                arg.canonicals = Some(set.clone());
                arg.values = Some(values);
            }
        }
        request.queries.insert(qname.clone(), QueryRequest { canonical: query.canonical.clone(), args });
    }
    request
}

/// Merge an oracle response into the class.
///
/// `adjectives` add `#` as an adjective, `implicit_identity` sets the flag
/// and adds `#` as a reverse property, and synonym candidates are appended
/// under their tag. `id` is never touched.
pub fn merge(class: &mut ClassDef, response: &RefinementResponse, diags: &mut Diagnostics) {
    for (qname, args) in &response.synonyms {
        let Some(query) = class.queries.get(qname) else {
            diags.warn(qname, "refinements for an unknown query, ignored");
            continue;
        };
        for arg in args.keys().filter(|a| query.argument(a).is_none()) {
            diags.warn(format!("{qname}.{arg}"), "refinements for an unknown argument, ignored");
        }
    }

    let mut merged = 0usize;
    for (qname, query) in class.queries.iter_mut() {
        let synonyms = response.synonyms.get(qname);
        for path in query.arguments() {
            if path == "id" {
                continue;
            }
            let full = format!("{qname}.{path}");
            let adjective = response.adjectives.contains(&full);
            let implicit = response.implicit_identity.contains(&full);
            let candidates = synonyms.and_then(|s| s.get(&path));
            if !adjective && !implicit && candidates.is_none() {
                continue;
            }
            let Some(field) = query.argument_mut(&path) else { continue };
            let set = field.canonical.get_or_insert_with(|| CanonicalPhraseSet::new(PhraseTag::Property));

            if adjective {
                set.push_unique(PhraseTag::Adjective, "#");
            }
            if implicit {
                set.implicit_identity = true;
                set.push_unique(PhraseTag::ReverseProperty, "#");
            }
            for (tag_name, list) in candidates.into_iter().flatten() {
                let Some(tag) = PhraseTag::from_name(tag_name) else {
                    diags.warn(full.clone(), format!("unknown phrase tag `{tag_name}`, ignored"));
                    continue;
                };
                for phrase in list.phrases() {
                    if set.push_unique(tag, phrase) {
                        merged += 1;
                    }
                }
            }
        }
    }
    tracing::debug!(merged, "refinements merged");
}

/// Covered by the manual table, directly or as a compound member.
fn is_manually_annotated(policy: &Policy, path: &str) -> bool {
    let table = &policy.manual_canonical_overrides;
    table.contains_key(path) || path.split_once('.').is_some_and(|(_, member)| table.contains_key(member))
}
