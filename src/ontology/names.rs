//! Conversions between biolink CURIEs and model labels.
//!
//! Query graphs carry CURIEs (`biolink:GeneOrGeneProduct`,
//! `biolink:related_to_at_instance_level`) while the model is keyed by
//! space-separated labels (`gene or gene product`). Classes use PascalCase
//! local names, slots use snake_case.

use std::sync::LazyLock;

use regex::Regex;

/// Prefix of every biolink CURIE.
pub const BIOLINK_PREFIX: &str = "biolink:";

static CAMEL_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Z]+[a-z0-9]*").unwrap());

/// Split a PascalCase local name into words, keeping acronym runs whole:
/// `RNAProduct` → `RNA`, `Product`.
fn camel_words(local: &str) -> Vec<&str> {
    let mut words = Vec::new();
    for m in CAMEL_WORD.find_iter(local) {
        let word = m.as_str();
        let upper = word.bytes().take_while(u8::is_ascii_uppercase).count();
        // The last capital of a run followed by lowercase starts the next word.
        if upper > 1 && upper < word.len() {
            words.push(&word[..upper - 1]);
            words.push(&word[upper - 1..]);
        } else {
            words.push(word);
        }
    }
    words
}

/// Local part of a CURIE (`biolink:Gene` → `Gene`). Strings without a prefix
/// are returned unchanged.
pub fn local_name(curie: &str) -> &str {
    curie.split_once(':').map_or(curie, |(_, local)| local)
}

/// Model label of a category CURIE: `biolink:GeneOrGeneProduct` →
/// `gene or gene product`.
///
/// Falls back to the lower-cased local name when it holds no CamelCase words.
pub fn category_label(curie: &str) -> String {
    let local = local_name(curie);
    let words = camel_words(local);
    if words.is_empty() {
        local.to_lowercase()
    } else {
        words.join(" ").to_lowercase()
    }
}

/// Model label of a predicate CURIE: `biolink:related_to` → `related to`.
pub fn predicate_label(curie: &str) -> String {
    local_name(curie).replace('_', " ")
}

/// CURIE of a class label: `gene or gene product` → `biolink:GeneOrGeneProduct`.
pub fn class_curie(label: &str) -> String {
    let mut curie = String::from(BIOLINK_PREFIX);
    for word in label.split_whitespace() {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            curie.extend(first.to_uppercase());
            curie.push_str(chars.as_str());
        }
    }
    curie
}

/// CURIE of a slot label: `related to` → `biolink:related_to`.
pub fn slot_curie(label: &str) -> String {
    format!("{BIOLINK_PREFIX}{}", label.split_whitespace().collect::<Vec<_>>().join("_"))
}

/// Human-readable category: `biolink:GeneOrGeneProduct` → `Gene Or Gene Product`.
pub fn display_category(curie: &str) -> String {
    let local = local_name(curie);
    let words = camel_words(local);
    if words.is_empty() {
        local.to_string()
    } else {
        words.join(" ")
    }
}

/// Human-readable predicate: `biolink:treated_by` → `treated by`.
pub fn display_predicate(curie: &str) -> String {
    predicate_label(curie)
}
