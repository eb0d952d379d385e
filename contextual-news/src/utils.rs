/// Text helpers shared by the parser and the processor
pub mod text {
    use once_cell::sync::Lazy;
    use regex::Regex;

    static RE_BLOCKS: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?is)<(script|style)[^>]*>.*?</(script|style)>").unwrap());
    static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
    static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

    /// Strip markup, decode entities and collapse whitespace.
    pub fn clean_markup(html: &str) -> String {
        let without_blocks = RE_BLOCKS.replace_all(html, " ");
        let without_tags = RE_TAGS.replace_all(&without_blocks, " ");
        let decoded = html_escape::decode_html_entities(&without_tags);
        RE_WS.replace_all(decoded.trim(), " ").into_owned()
    }

    /// First `max_chars` characters, never splitting a code point.
    pub fn take_chars(text: &str, max_chars: usize) -> &str {
        match text.char_indices().nth(max_chars) {
            Some((idx, _)) => &text[..idx],
            None => text,
        }
    }

    /// Truncate to at most `max_chars`, preferring a sentence end inside the
    /// last 30% of the limit and otherwise a word boundary plus "...".
    pub fn truncate_at_sentence(text: &str, max_chars: usize) -> String {
        if text.chars().count() <= max_chars {
            return text.to_string();
        }

        let head = take_chars(text, max_chars);
        let floor = max_chars * 7 / 10;
        if let Some(pos) = head.rfind(['.', '!', '?']) {
            if head[..pos].chars().count() >= floor {
                return head[..=pos].to_string();
            }
        }

        let room = take_chars(head, max_chars.saturating_sub(3));
        let cut = match room.rfind(char::is_whitespace) {
            Some(idx) if idx > 0 => room[..idx].trim_end(),
            _ => room,
        };
        format!("{}...", cut)
    }

    /// Whole-word match of a lowercase `term` in lowercase `haystack`.
    /// A trailing "s" or "es" on the haystack side still counts.
    pub fn contains_term(haystack: &str, term: &str) -> bool {
        if term.is_empty() {
            return false;
        }
        haystack.match_indices(term).any(|(start, _)| {
            let starts_word = haystack[..start]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_alphanumeric());
            if !starts_word {
                return false;
            }
            let rest = &haystack[start + term.len()..];
            [Some(rest), rest.strip_prefix('s'), rest.strip_prefix("es")]
                .into_iter()
                .flatten()
                .any(|tail| tail.chars().next().map_or(true, |c| !c.is_alphanumeric()))
        })
    }
}

/// URL utilities
pub mod url {
    use url::Url;

    pub fn is_http_url(url_str: &str) -> bool {
        Url::parse(url_str)
            .map(|url| url.scheme() == "http" || url.scheme() == "https")
            .unwrap_or(false)
    }
}

/// Time utilities
pub mod time {
    use chrono::{DateTime, Utc};

    /// Fractional hours from `then` to `now`; negative when `then` is ahead.
    pub fn hours_between(then: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
        now.signed_duration_since(then).num_seconds() as f64 / 3600.0
    }
}
