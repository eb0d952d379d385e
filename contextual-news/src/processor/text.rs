use crate::types::RawItem;
use crate::utils::text::{clean_markup, truncate_at_sentence};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

pub const SUMMARY_MAX_CHARS: usize = 150;
const MAX_KEYWORDS: usize = 10;

static RE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w{4,}\b").unwrap());

/// Bounded plain-text summary built from the description, or the content
/// when the description is empty.
pub fn summarize(item: &RawItem) -> String {
    let source = if item.description.trim().is_empty() {
        item.content.as_deref().unwrap_or("")
    } else {
        item.description.as_str()
    };
    truncate_at_sentence(&clean_markup(source), SUMMARY_MAX_CHARS)
}

/// Top ten words of four or more characters by frequency. Ties keep the
/// order of first appearance.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();

    for (position, word) in RE_WORD.find_iter(&lowered).map(|m| m.as_str()).enumerate() {
        if is_stop_word(word) {
            continue;
        }
        let entry = counts.entry(word).or_insert((0, position));
        entry.0 += 1;
    }

    let mut ranked: Vec<(&str, usize, usize)> =
        counts.into_iter().map(|(word, (count, first))| (word, count, first)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(MAX_KEYWORDS)
        .map(|(word, _, _)| word.to_string())
        .collect()
}

pub fn is_stop_word(word: &str) -> bool {
    matches!(
        word,
        "the" | "this" | "that" | "with" | "from" | "your" | "have" | "will" | "about" | "into"
            | "some" | "been" | "they" | "their" | "them" | "which" | "more" | "these" | "than"
            | "when" | "what" | "those" | "would" | "could" | "should" | "were" | "also"
    )
}
