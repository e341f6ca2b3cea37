//! Hand-written canonical phrases that replace synthesis entirely.
use indexmap::IndexMap;

use crate::ir::{CanonicalPhraseSet, PhraseTag};
use crate::ir::PhraseTag::*;

type Entry<'a> = (&'a str, PhraseTag, &'a [(PhraseTag, &'a [&'a str])]);

fn table(entries: &[Entry]) -> IndexMap<String, CanonicalPhraseSet> {
    entries
        .iter()
        .map(|(name, default, phrases)| {
            let mut set = CanonicalPhraseSet::new(*default);
            for (tag, list) in phrases.iter() {
                set.set(*tag, list.iter().map(|s| s.to_string()).collect());
            }
            (name.to_string(), set)
        })
        .collect()
}

/// Always applied: generic properties shared by most types.
pub fn structural() -> IndexMap<String, CanonicalPhraseSet> {
    table(&[
        ("url", Property, &[(Base, &["url", "link"])]),
        ("name", Property, &[(Base, &["name"]), (PassiveVerb, &["called"])]),
        ("description", Property, &[(Base, &["description", "summary"])]),
        ("geo", Property, &[(Base, &["location", "address"]), (PassiveVerb, &["in", "around", "at", "on"])]),
        ("streetAddress", Property, &[(Base, &["street"])]),
        ("addressCountry", PassiveVerb, &[(PassiveVerb, &["in"]), (Base, &["country"])]),
        ("addressRegion", PassiveVerb, &[(PassiveVerb, &["in"]), (Base, &["state"])]),
        ("addressLocality", Property, &[(Base, &["city"])]),
    ])
}

/// Only applied with manual annotations enabled.
pub fn manual() -> IndexMap<String, CanonicalPhraseSet> {
    let mut out = table(&[
        // restaurants
        ("datePublished", PassiveVerb, &[(PassiveVerb, &["published on", "written on"]), (Base, &["date published"])]),
        ("ratingValue", PassiveVerb, &[(PassiveVerb, &["rated #star"]), (Base, &["rating"])]),
        ("reviewRating", Property, &[(Base, &["rating"])]),
        ("telephone", Property, &[(Base, &["telephone", "phone number"])]),
        ("servesCuisine", Verb, &[
            (Verb, &["serves #cuisine", "serves #food", "offer #cuisine", "offer #food", "serves", "offers"]),
            (Property, &["#cuisine", "#food"]),
            (Base, &["cuisine", "food type"]),
        ]),
        // hotels
        ("amenityFeature", Property, &[
            (Base, &["amenity", "amenity feature"]),
            (Property, &["amenity", "amenity feature"]),
            (Verb, &["offers", "offer", "has", "have"]),
        ]),
        ("checkinTime", Property, &[
            (Base, &["checkin time", "check in time", "check-in time"]),
            (Property, &["checkin time", "check in time", "check-in time"]),
        ]),
        ("checkoutTime", Property, &[
            (Base, &["checkout time", "check out time", "check-out time"]),
            (Property, &["checkout time", "check out time", "check-out time"]),
        ]),
        // people
        ("alumniOf", ReverseProperty, &[
            (Base, &["colleges", "universities", "alma maters"]),
            (ReverseProperty, &["alumni of", "alumnus of", "alumna of", "#alumnus", "#alumni", "#grad", "#graduate"]),
            (Verb, &["was educated at", "is graduated from", "was studied at", "went to", "graduated from", "attended"]),
            (PassiveVerb, &["educated at", "graduated from", "studied at", "attended"]),
            (Property, &["colleges", "universities", "alma maters"]),
        ]),
        ("award", Verb, &[
            (Base, &["awards"]),
            (ReverseProperty, &["winner of", "recipient of", "#winner", "#awardee", "#recipient", "#holder"]),
            (Verb, &[
                "has the award", "has received the #award", "won the award for", "won the #award",
                "received the #award", "received the", "won the", "won", "holds the award for", "holds the #award",
            ]),
            (PassiveVerb, &["received"]),
            (Property, &["awards"]),
        ]),
        ("affiliation", ReverseProperty, &[
            (Base, &["affiliations"]),
            (ReverseProperty, &["affiliated with", "affiliated to", "member of"]),
            (Property, &["affiliations"]),
        ]),
        ("worksFor", Verb, &[
            (Base, &["employers"]),
            (ReverseProperty, &["employee of", "#employee"]),
            (Verb, &["works for", "works at", "worked at", "worked for"]),
            (PassiveVerb, &["employed at", "employed by"]),
            (Property, &["employers"]),
        ]),
        ("addressLocality", Verb, &[
            (Base, &["city"]),
            (Property, &["city"]),
            (Verb, &["lives in", "lived in"]),
            (PassiveVerb, &["from", "in"]),
        ]),
        // recipes
        ("author", PassiveVerb, &[
            (Verb, &["was written by", "was submitted by"]),
            (PassiveVerb, &["by", "made by", "written by", "created by", "authored by", "uploaded by", "submitted by"]),
            (Property, &["author", "creator"]),
        ]),
        ("publisher", PassiveVerb, &[
            (Verb, &["was published by", "was submitted by"]),
            (PassiveVerb, &["by", "made by", "published by"]),
            (Property, &["publisher"]),
        ]),
        ("prepTime", Property, &[
            (Verb, &["takes #to_prepare", "needs #to_prepare"]),
            (Property, &["prep time", "preparation time", "time to prep", "time to prepare"]),
        ]),
        ("cookTime", Property, &[
            (Verb, &["takes #to_cook", "needs #to_cook"]),
            (Property, &["cook time", "cooking time", "time to cook"]),
        ]),
        ("totalTime", Verb, &[
            (Verb, &["takes", "requires", "needs", "uses", "consumes"]),
            (Property, &["total time", "time in total", "time to make"]),
        ]),
        ("recipeYield", Verb, &[
            (Verb, &["yields", "feeds", "produces", "results in", "is good for"]),
            (PassiveVerb, &["yielding"]),
            (Property, &["yield amount", "yield size"]),
        ]),
        ("recipeCategory", Property, &[(Property, &["categories"])]),
        ("recipeIngredient", Property, &[
            (Verb, &["contains", "uses", "has"]),
            (PassiveVerb, &["containing", "using"]),
            (Property, &["ingredients"]),
        ]),
        ("recipeInstructions", Property, &[(Property, &["instructions"])]),
        ("recipeCuisines", Verb, &[(Verb, &["belongs to the #cuisine"]), (Property, &["cuisines"])]),
        ("reviewBody", Property, &[(Property, &["body", "text", "content"])]),
        ("saturatedFatContent", Property, &[
            (Property, &["saturated fat content", "saturated fat amount", "saturated fat", "trans fat"]),
        ]),
        // products
        ("mpn", Property, &[(Property, &["manufacturer part number"])]),
    ]);

    // the value reads as an adjective in front of the verb: "serves italian food"
    for name in ["servesCuisine", "recipeCuisines"] {
        if let Some(set) = out.get_mut(name) {
            set.apv = true;
        }
    }
    out
}
