//! jq pre-filter for input documents (e.g. to pick a sub-graph out of a
//! larger vocabulary export before compiling it).
use anyhow::{anyhow, Context, Result};
use jaq_core::{compile::Undefined, load, Compiler, Ctx, RcIter};
use jaq_json::Val;
use serde_json::Value;

/// Run `filter_src` over one document; every output becomes a document.
pub fn run_jaq(filter_src: &str, input: &Value) -> Result<Vec<Value>> {
    let loader = load::Loader::new(jaq_std::defs().chain(jaq_json::defs()));
    let arena = load::Arena::default();
    let program = load::File { code: filter_src, path: () };

    let modules = loader
        .load(&arena, program)
        .map_err(format_parse_errors)?;

    let filter = Compiler::default()
        .with_funs(jaq_std::funs().chain(jaq_json::funs()))
        .compile(modules)
        .map_err(format_undefined_errors)?;

    let inputs = RcIter::new(core::iter::empty());
    let outputs = filter.run((Ctx::new([], &inputs), Val::from(input.clone())));

    let mut out = Vec::new();
    for (i, item) in outputs.enumerate() {
        let v = item.map_err(|e| anyhow!("jq runtime error: {e:?}"))?;
        // Val displays as JSON text
        let value = serde_json::from_str(&v.to_string())
            .with_context(|| format!("jq output #{i} is not valid JSON"))?;
        out.push(value);
    }
    Ok(out)
}

/// One line per problem, each naming the pre-filter.
fn format_parse_errors(errs: Vec<(load::File<&str, ()>, load::Error<&str>)>) -> anyhow::Error {
    let lines: Vec<String> = errs
        .into_iter()
        .map(|(file, err)| format!("cannot parse jq pre-filter `{}`: {err:?}", file.code))
        .collect();
    anyhow!(lines.join("\n"))
}

fn format_undefined_errors(errs: Vec<(load::File<&str, ()>, Vec<(&str, Undefined)>)>) -> anyhow::Error {
    let lines: Vec<String> = errs
        .into_iter()
        .flat_map(|(file, list)| {
            list.into_iter().map(move |(name, undef)| {
                format!("jq pre-filter `{}` refers to undefined {undef:?} `{name}`", file.code)
            })
        })
        .collect();
    anyhow!(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn selects_part_of_a_graph() {
        let doc = json!({"@graph": [
            {"@id": "schema:Place", "@type": "rdfs:Class"},
            {"@id": "schema:name", "@type": "rdf:Property"}
        ]});
        let out = run_jaq(r#"{"@graph": [.["@graph"][] | select(.["@type"] == "rdfs:Class")]}"#, &doc).unwrap();
        assert_eq!(out, vec![json!({"@graph": [{"@id": "schema:Place", "@type": "rdfs:Class"}]})]);
    }

    #[test]
    fn every_output_is_a_document() {
        let out = run_jaq(".[]", &json!([{"a": 1}, {"b": 2}])).unwrap();
        assert_eq!(out, vec![json!({"a": 1}), json!({"b": 2})]);
    }

    #[test]
    fn undefined_filters_are_reported() {
        let err = run_jaq("no_such_filter", &json!({})).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("undefined"), "{msg}");
        assert!(msg.contains("`no_such_filter`"), "{msg}");
    }

    #[test]
    fn parse_errors_name_the_pre_filter() {
        let err = run_jaq(".[", &json!({})).unwrap_err();
        assert!(err.to_string().starts_with("cannot parse jq pre-filter `.[`"), "{err}");
    }
}
