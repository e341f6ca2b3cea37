//! Natural-language canonical phrases for properties.
//!
//! Overrides are returned verbatim. Everything else is derived from the
//! property name alone (plus whether it is array- or measure-valued), so
//! the same property gets the same phrases on every type that declares it.
pub mod overrides;
pub mod pos;
pub mod text;

use crate::ir::{CanonicalPhraseSet, PhraseTag, Ty};
use crate::policy::Policy;
use pos::Tag;

pub fn synthesize(name: &str, ty: &Ty, policy: &Policy, manual: bool) -> CanonicalPhraseSet {
    if let Some(set) = policy.canonical_override(name, manual) {
        return set.clone();
    }

    let cleaned = text::clean(name);
    let last = cleaned.rsplit('.').next().unwrap_or(&cleaned);
    let mut phrase = text::strip_value_suffix(last).to_string();
    if ty.is_array() {
        phrase = text::pluralize(&phrase);
    }

    if ty.is_measure() {
        if let Some(stem) = phrase.strip_suffix(" content") {
            return nutrient_content(stem);
        }
    }

    let (pattern, phrase) = classify_phrase(phrase);
    let mut set = CanonicalPhraseSet::new(pattern.as_ref().map(|(tag, _)| *tag).unwrap_or(PhraseTag::Property));
    if let Some((tag, templates)) = pattern {
        set.set(tag, templates);
    }
    set.set(PhraseTag::Property, vec![phrase.clone()]);
    set.set(PhraseTag::Base, vec![phrase]);
    set
}

/// `sugar content` (a measure) → "contains #sugar", "sugar content", "sugar", "sugar amount".
fn nutrient_content(stem: &str) -> CanonicalPhraseSet {
    let mut set = CanonicalPhraseSet::new(PhraseTag::Property);
    set.set(PhraseTag::Verb, vec![format!("contains #{}", stem.replace(' ', "_"))]);
    set.set(PhraseTag::Property, vec![format!("{stem} content"), stem.to_string(), format!("{stem} amount")]);
    set
}

/// Pick the syntactic pattern for a cleaned name. Returns the pattern with its
/// templates (if any pattern applies) and the phrase to use as the noun form.
fn classify_phrase(phrase: String) -> (Option<(PhraseTag, Vec<String>)>, String) {
    let last_is_noun = |tags: &[Tag]| tags.last().is_some_and(|t| t.is_noun());
    let first_is_participial = |tags: &[Tag]| tags.first().is_some_and(|t| t.is_participial());

    if let Some(rest) = phrase.strip_prefix("has ") {
        return (None, rest.to_string());
    }

    if let Some(rest) = phrase.strip_prefix("is ") {
        let rest = rest.to_string();
        let tags = pos::tag_phrase(&rest);
        let pattern = if last_is_noun(&tags) || rest.ends_with(" of") {
            Some(PhraseTag::ReverseProperty)
        } else if first_is_participial(&tags) {
            Some(PhraseTag::PassiveVerb)
        } else {
            None
        };
        return (pattern.map(|tag| (tag, vec![rest.clone()])), rest);
    }

    let words: Vec<&str> = phrase.split_whitespace().collect();
    let tags = pos::tag(&words);
    match tags.first() {
        Some(Tag::VBP | Tag::VBZ) => {
            if tags.len() == 2 && tags[1].is_noun() {
                // "serves cuisine" → "serves #cuisine", and the noun names the value
                let template = format!("{} #{}", words[0], words[1]);
                let noun = words[1].to_string();
                (Some((PhraseTag::Verb, vec![template])), noun)
            } else {
                (Some((PhraseTag::Verb, vec![phrase.clone()])), phrase)
            }
        }
        _ if phrase.ends_with(" of") => (Some((PhraseTag::ReverseProperty, vec![phrase.clone()])), phrase),
        _ if first_is_participial(&tags) && !last_is_noun(&tags) => {
            (Some((PhraseTag::PassiveVerb, vec![phrase.clone()])), phrase)
        }
        _ => (None, phrase),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::PhraseTag::*;

    fn synth(name: &str, ty: &Ty) -> CanonicalPhraseSet {
        synthesize(name, ty, &Policy::default(), false)
    }

    #[test]
    fn overrides_are_returned_verbatim() {
        let policy = Policy::default();
        let name = synthesize("name", &Ty::String, &policy, false);
        assert_eq!(&name, &policy.canonical_overrides["name"]);

        let manual = synthesize("worksFor", &Ty::array(Ty::entity("org.schema:Organization")), &policy, true);
        assert_eq!(manual.get(Base), ["employers"]);
    }

    #[test]
    fn equal_inputs_give_equal_phrases() {
        let a = synth("servesCuisine", &Ty::String);
        let b = synth("servesCuisine", &Ty::String);
        assert_eq!(a, b);
        // the same property on two sibling types
        assert_eq!(synth("name", &Ty::String), synth("name", &Ty::String));
    }

    #[test]
    fn plain_nouns_default_to_property() {
        let set = synth("aggregateRating", &Ty::String);
        assert_eq!(set.default, Property);
        assert_eq!(set.get(Property), ["aggregate rating"]);
        assert_eq!(set.get(Base), ["aggregate rating"]);
    }

    #[test]
    fn value_suffix_is_dropped_and_arrays_are_plural() {
        assert_eq!(synth("ratingValue", &Ty::Number).get(Base), ["rating"]);
        let award = synth("award", &Ty::array(Ty::String));
        assert_eq!(award.get(Property), ["awards"]);
    }

    #[test]
    fn has_prefix_is_stripped() {
        let set = synth("hasMap", &Ty::entity("tt:url"));
        assert_eq!(set.default, Property);
        assert_eq!(set.get(Property), ["map"]);
    }

    #[test]
    fn is_prefix_picks_reverse_or_passive() {
        let part = synth("isPartOf", &Ty::entity("org.schema:CreativeWork"));
        assert_eq!(part.default, ReverseProperty);
        assert_eq!(part.get(ReverseProperty), ["part of"]);

        let free = synth("isAccessibleForFree", &Ty::Boolean);
        assert_eq!(free.default, PassiveVerb);
        assert_eq!(free.get(PassiveVerb), ["accessible for free"]);
        assert_eq!(free.get(Property), ["accessible for free"]);
    }

    #[test]
    fn leading_verb_with_object_noun() {
        let set = synth("servesCuisine", &Ty::String);
        assert_eq!(set.default, Verb);
        assert_eq!(set.get(Verb), ["serves #cuisine"]);
        assert_eq!(set.get(Property), ["cuisine"]);
    }

    #[test]
    fn repeated_separators_do_not_shift_words() {
        let set = synth("serves__cuisine", &Ty::String);
        assert_eq!(set.default, Verb);
        assert_eq!(set.get(Verb), ["serves #cuisine"]);
        assert_eq!(set.get(Property), ["cuisine"]);
    }

    #[test]
    fn leading_verb_without_object() {
        let set = synth("worksFor", &Ty::array(Ty::entity("org.schema:Organization")));
        assert_eq!(set.default, Verb);
        assert_eq!(set.get(Verb), ["works for"]);
    }

    #[test]
    fn trailing_of_is_reverse_property() {
        let set = synth("alumniOf", &Ty::entity("org.schema:Organization"));
        assert_eq!(set.default, ReverseProperty);
        assert_eq!(set.get(ReverseProperty), ["alumni of"]);
    }

    #[test]
    fn participle_without_noun_is_passive() {
        let set = synth("basedOn", &Ty::entity("org.schema:CreativeWork"));
        assert_eq!(set.default, PassiveVerb);
        assert_eq!(set.get(PassiveVerb), ["based on"]);
    }

    #[test]
    fn measure_content_gets_nutrient_phrases() {
        let set = synth("sugarContent", &Ty::measure("kg"));
        assert_eq!(set.default, Property);
        assert_eq!(set.get(Verb), ["contains #sugar"]);
        assert_eq!(set.get(Property), ["sugar content", "sugar", "sugar amount"]);
        assert!(set.get(Base).is_empty());

        let fat = synth("saturatedFatContent", &Ty::measure("kg"));
        assert_eq!(fat.get(Verb), ["contains #saturated_fat"]);

        // only measures
        assert_eq!(synth("sugarContent", &Ty::String).get(Property), ["sugar content"]);
    }
}
