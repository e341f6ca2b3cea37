//! A small Penn-style part-of-speech tagger for property names.
//!
//! Tagging is a lexicon lookup with suffix rules for unknown words, followed
//! by one contextual smoothing pass. It only has to be good enough to tell
//! verbs, participles, adjectives and nouns apart in two- or three-word
//! identifiers such as `works for` or `is accessible for free`.
use std::collections::HashMap;

use once_cell::sync::Lazy;

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    NN,
    NNS,
    NNP,
    NNPS,
    VB,
    VBD,
    VBG,
    VBN,
    VBP,
    VBZ,
    JJ,
    JJR,
    JJS,
    RB,
    IN,
    TO,
    DT,
    CC,
    CD,
    PRP,
}

impl Tag {
    pub fn is_noun(self) -> bool {
        matches!(self, Tag::NN | Tag::NNS | Tag::NNP | Tag::NNPS)
    }

    /// Participles and adjectives: the head of a passive-verb phrase.
    pub fn is_participial(self) -> bool {
        matches!(self, Tag::VBN | Tag::JJ | Tag::JJR)
    }
}

static LEXICON: Lazy<HashMap<&'static str, Tag>> = Lazy::new(|| {
    let mut m = HashMap::new();
    let mut add = |tag: Tag, words: &[&'static str]| {
        for w in words {
            m.insert(*w, tag);
        }
    };
    add(Tag::VBZ, &[
        "is", "has", "does", "contains", "serves", "offers", "accepts", "requires", "includes",
        "uses", "provides", "owns", "makes", "produces", "sells", "needs", "knows", "performs",
        "speaks", "seeks", "sponsors", "funds", "follows", "works", "lives", "holds", "yields",
        "feeds", "takes", "gives", "opens", "closes", "applies", "belongs", "covers", "starts",
        "ends", "runs", "plays", "features", "supports", "describes", "depicts", "reads",
    ]);
    add(Tag::VBP, &[
        "are", "have", "do", "contain", "serve", "accept", "require", "include", "provide",
        "own", "make", "produce", "sell", "need", "know", "perform", "speak", "seek", "fund",
        "follow", "hold", "yield", "feed", "give", "belong", "cover", "support",
    ]);
    add(Tag::VBD, &["was", "were", "had", "did", "went", "won", "got", "came"]);
    add(Tag::VBN, &[
        "been", "known", "born", "given", "written", "made", "held", "built", "sold", "taken",
        "done", "seen", "shown", "driven", "spoken", "worn", "grown", "drawn", "found", "paid",
        "sent", "set", "led", "read", "bought",
    ]);
    add(Tag::JJ, &[
        "free", "friendly", "open", "available", "new", "old", "official", "main", "same",
        "public", "private", "additional", "alternate", "alternative", "original", "legal",
        "maximum", "minimum", "total", "average", "early", "late", "smoking", "family", "live",
        "daily", "monthly", "yearly", "weekly", "special", "local", "full", "due", "able",
    ]);
    add(Tag::JJR, &["larger", "smaller", "higher", "lower", "older", "newer", "bigger", "better", "more", "less"]);
    add(Tag::JJS, &["best", "worst", "most", "least", "highest", "lowest"]);
    add(Tag::IN, &[
        "of", "for", "in", "at", "by", "on", "with", "from", "about", "into", "over", "under",
        "per", "as", "within", "after", "before", "since", "during", "between", "via", "until",
    ]);
    add(Tag::TO, &["to"]);
    add(Tag::DT, &["the", "a", "an", "this", "that", "each", "every", "any", "some", "no"]);
    add(Tag::CC, &["and", "or", "but", "nor"]);
    add(Tag::PRP, &["it", "he", "she", "they", "we", "you", "i"]);
    add(Tag::RB, &["not", "also", "only", "very", "well", "here", "there"]);
    add(Tag::NNS, &["people", "children", "men", "women", "alumni", "media", "criteria", "data", "feet"]);
    add(Tag::NN, &[
        "address", "access", "business", "status", "class", "process", "series", "species",
        "news", "analysis", "basis", "thesis", "campus", "bus", "virus", "census", "gross",
        "name", "date", "type", "part", "member", "time", "price", "place",
        "review", "rating", "offer", "work", "map", "photo", "event", "brand", "color", "model",
        "duration", "number", "award", "cuisine", "language", "area", "range", "body", "content",
    ]);
    m
});

const ADJECTIVE_SUFFIXES: &[&str] = &["able", "ible", "ful", "less", "ous", "ive", "ical"];

/// Context-free guess for a single lowercase word.
fn guess(word: &str) -> Tag {
    if let Some(tag) = LEXICON.get(word) {
        return *tag;
    }
    if !word.is_empty() && word.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Tag::CD;
    }
    if word.len() > 4 && word.ends_with("ing") {
        return Tag::VBG;
    }
    if word.len() > 3 && word.ends_with("ed") {
        return Tag::VBN;
    }
    if ADJECTIVE_SUFFIXES.iter().any(|s| word.len() > s.len() + 2 && word.ends_with(s)) {
        return Tag::JJ;
    }
    if word.len() > 3 && word.ends_with("ly") {
        return Tag::RB;
    }
    if word.len() > 2
        && word.ends_with('s')
        && !word.ends_with("ss")
        && !word.ends_with("us")
        && !word.ends_with("is")
    {
        return Tag::NNS;
    }
    Tag::NN
}

/// Tag a token sequence. Tokens are compared case-insensitively.
pub fn tag(tokens: &[&str]) -> Vec<Tag> {
    let mut tags: Vec<Tag> = tokens.iter().map(|t| guess(&t.to_lowercase())).collect();

    for i in 1..tags.len() {
        let prev = tags[i - 1];
        tags[i] = match (prev, tags[i]) {
            // "the works", "additional offers": a finite verb cannot follow a determiner or adjective
            (Tag::DT | Tag::JJ, Tag::VBZ) => Tag::NNS,
            (Tag::DT | Tag::JJ, Tag::VBP) => Tag::NN,
            // "to serve"
            (Tag::TO, Tag::VBP | Tag::NN) => Tag::VB,
            (_, current) => current,
        };
    }
    tags
}

/// Tag a space-separated phrase.
pub fn tag_phrase(phrase: &str) -> Vec<Tag> {
    let tokens: Vec<&str> = phrase.split(' ').filter(|t| !t.is_empty()).collect();
    tag(&tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use Tag::*;

    #[test]
    fn finite_verbs_lead_verb_phrases() {
        assert_eq!(tag_phrase("works for"), vec![VBZ, IN]);
        assert_eq!(tag_phrase("serves cuisine"), vec![VBZ, NN]);
        assert_eq!(tag_phrase("accepts reservations"), vec![VBZ, NNS]);
    }

    #[test]
    fn participles_and_adjectives() {
        assert_eq!(tag_phrase("published"), vec![VBN]);
        assert_eq!(tag_phrase("accessible for free"), vec![JJ, IN, JJ]);
        assert_eq!(tag_phrase("based on"), vec![VBN, IN]);
        assert_eq!(tag_phrase("born"), vec![VBN]);
    }

    #[test]
    fn nouns_and_plurals() {
        assert_eq!(tag_phrase("number of employees"), vec![NN, IN, NNS]);
        assert_eq!(tag_phrase("alumni of"), vec![NNS, IN]);
        assert_eq!(tag_phrase("address"), vec![NN]);
        assert_eq!(tag_phrase("status"), vec![NN]);
        assert_eq!(tag_phrase("gtin13"), vec![NN]);
    }

    #[test]
    fn context_overrides_the_lexicon() {
        assert_eq!(tag_phrase("the works"), vec![DT, NNS]);
        assert_eq!(tag_phrase("to serve"), vec![TO, VB]);
    }

    #[test]
    fn unknown_words_fall_back_to_suffix_rules() {
        assert_eq!(tag_phrase("opening"), vec![VBG]);
        assert_eq!(tag_phrase("quickly"), vec![RB]);
        assert_eq!(tag_phrase("2020"), vec![CD]);
        assert!(tag_phrase("funder")[0].is_noun());
    }
}
