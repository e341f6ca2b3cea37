use once_cell::sync::Lazy;
use regex::Regex;

static CAMEL_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"([^A-Z ])([A-Z])").unwrap());
static SLOT_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[vwgp]_").unwrap());

/// `worksFor` → `works for`, `productID` → `product id`, `opening_hours` → `opening hours`.
pub fn clean(name: &str) -> String {
    let name = SLOT_PREFIX.replace(name, "");
    let spaced = name.replace('_', " ");
    let spaced = CAMEL_BOUNDARY.replace_all(&spaced, "$1 $2").to_lowercase();
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drop a trailing ` value` (`rating value` → `rating`).
pub fn strip_value_suffix(phrase: &str) -> &str {
    phrase.strip_suffix(" value").unwrap_or(phrase)
}

const PARTICLES: &[&str] = &["of", "for", "in", "at", "by", "on", "to", "with", "from", "about"];

const UNCOUNTABLE: &[&str] = &[
    "information", "equipment", "news", "data", "software", "series", "species", "media",
    "feedback", "content", "audio", "music", "furniture", "evidence", "advice", "research",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("mouse", "mice"),
    ("criterion", "criteria"),
    ("datum", "data"),
    ("alumnus", "alumni"),
    ("medium", "media"),
    ("analysis", "analyses"),
];

/// Pluralize the head noun: the last word that is not a trailing particle
/// (`part of` → `parts of`, `award` → `awards`).
pub fn pluralize(phrase: &str) -> String {
    let words: Vec<&str> = phrase.split(' ').collect();
    let head = words.iter().rposition(|w| !PARTICLES.contains(w)).unwrap_or(words.len() - 1);
    words
        .iter()
        .enumerate()
        .map(|(i, w)| if i == head { pluralize_word(w) } else { w.to_string() })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn pluralize_word(word: &str) -> String {
    if word.is_empty() || UNCOUNTABLE.contains(&word) || word.chars().all(|c| c.is_ascii_digit()) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(s, p)| *s == word || *p == word) {
        return plural.to_string();
    }
    let ends = |s: &str| word.ends_with(s);
    // already plural
    if ends("s") && !ends("ss") && !ends("us") && !ends("is") {
        return word.to_string();
    }
    if ends("ss") || ends("us") || ends("x") || ends("z") || ends("ch") || ends("sh") {
        return format!("{word}es");
    }
    if ends("is") {
        return format!("{}es", &word[..word.len() - 2]);
    }
    if ends("y") && !word[..word.len() - 1].ends_with(['a', 'e', 'i', 'o', 'u']) {
        return format!("{}ies", &word[..word.len() - 1]);
    }
    if ends("fe") {
        return format!("{}ves", &word[..word.len() - 2]);
    }
    format!("{word}s")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_splits_camel_case() {
        assert_eq!(clean("worksFor"), "works for");
        assert_eq!(clean("productID"), "product id");
        assert_eq!(clean("isAccessibleForFree"), "is accessible for free");
        assert_eq!(clean("gtin13"), "gtin13");
        assert_eq!(clean("opening_hours"), "opening hours");
        assert_eq!(clean("p_author"), "author");
        assert_eq!(clean("serves__cuisine"), "serves cuisine");
    }

    #[test]
    fn value_suffix_is_stripped() {
        assert_eq!(strip_value_suffix("rating value"), "rating");
        assert_eq!(strip_value_suffix("value"), "value");
    }

    #[test]
    fn pluralizes_the_head_noun() {
        assert_eq!(pluralize("award"), "awards");
        assert_eq!(pluralize("part of"), "parts of");
        assert_eq!(pluralize("recipe category"), "recipe categories");
        assert_eq!(pluralize("address"), "addresses");
        assert_eq!(pluralize("alumni of"), "alumni of");
        assert_eq!(pluralize("ingredients"), "ingredients");
        assert_eq!(pluralize("key"), "keys");
        assert_eq!(pluralize("person"), "people");
        assert_eq!(pluralize("box"), "boxes");
    }
}
