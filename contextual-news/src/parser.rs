use crate::types::{NewsError, RawItem, Result};
use crate::utils::{text, url};
use chrono::{DateTime, Utc};
use feed_rs::model::Entry;
use feed_rs::parser;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

const DESCRIPTION_MAX_CHARS: usize = 500;

static RE_IMG_SRC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<img[^>]+src\s*=\s*["']([^"']+)["']"#).unwrap());

/// A parsed syndication document: feed title plus best-effort entries.
#[derive(Debug, Clone)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub items: Vec<RawItem>,
}

/// Maps RSS/Atom/JSON Feed payloads to `RawItem`s. Every field has a
/// fallback, so a sparse entry degrades instead of failing the fetch.
pub struct FeedParser {
    seen_urls: HashSet<String>,
}

impl FeedParser {
    pub fn new() -> Self {
        Self {
            seen_urls: HashSet::new(),
        }
    }

    /// Parse `content` and keep at most `limit` entries in feed order.
    pub fn parse_feed(&mut self, content: &str, source_name: &str, limit: usize) -> Result<ParsedFeed> {
        debug!("Parsing feed content ({} bytes) for {}", content.len(), source_name);

        let feed = parser::parse(content.as_bytes())
            .map_err(|e| NewsError::Parse(format!("Failed to parse feed: {}", e)))?;

        let title = feed.title.map(|t| text::clean_markup(&t.content));
        let now = Utc::now();

        let mut items = Vec::new();
        for entry in feed.entries {
            if items.len() >= limit {
                break;
            }
            if let Some(item) = self.parse_entry(entry, source_name, now) {
                items.push(item);
            }
        }

        Ok(ParsedFeed { title, items })
    }

    fn parse_entry(&mut self, entry: Entry, source_name: &str, now: DateTime<Utc>) -> Option<RawItem> {
        let item_url = entry
            .links
            .first()
            .map(|l| l.href.clone())
            .or_else(|| url::is_http_url(&entry.id).then(|| entry.id.clone()))
            .unwrap_or_default();

        if !item_url.is_empty() && !self.seen_urls.insert(item_url.clone()) {
            debug!("Skipping duplicate entry with URL: {}", item_url);
            return None;
        }

        let title = entry
            .title
            .as_ref()
            .map(|t| text::clean_markup(&t.content))
            .unwrap_or_default();

        let summary_html = entry.summary.as_ref().map(|s| s.content.clone());
        let content_html = entry.content.as_ref().and_then(|c| c.body.clone());

        let description = summary_html
            .as_deref()
            .or(content_html.as_deref())
            .map(|html| text::take_chars(&text::clean_markup(html), DESCRIPTION_MAX_CHARS).to_string())
            .unwrap_or_default();

        let content = content_html
            .as_deref()
            .or(summary_html.as_deref())
            .map(text::clean_markup)
            .filter(|c| !c.is_empty());

        let published_at = entry
            .published
            .or(entry.updated)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(now);

        let image_url = image_from_media(&entry).or_else(|| {
            content_html
                .as_deref()
                .into_iter()
                .chain(summary_html.as_deref())
                .find_map(first_img_src)
        });

        let mut seen_tags = HashSet::new();
        let tags = entry
            .categories
            .iter()
            .map(|c| c.term.trim().to_string())
            .filter(|t| !t.is_empty() && seen_tags.insert(t.clone()))
            .collect();

        Some(RawItem {
            title,
            description,
            url: item_url,
            published_at,
            source_name: source_name.to_string(),
            content,
            image_url,
            tags,
        })
    }
}

impl Default for FeedParser {
    fn default() -> Self {
        Self::new()
    }
}

fn image_from_media(entry: &Entry) -> Option<String> {
    let from_content = entry.media.iter().flat_map(|m| m.content.iter()).find_map(|c| {
        let is_image = c
            .content_type
            .as_ref()
            .map_or(true, |mime| mime.to_string().starts_with("image"));
        if is_image {
            c.url.as_ref().map(|u| u.to_string())
        } else {
            None
        }
    });

    from_content.or_else(|| {
        entry
            .media
            .iter()
            .flat_map(|m| m.thumbnails.iter())
            .map(|t| t.image.uri.clone())
            .next()
    })
}

fn first_img_src(html: &str) -> Option<String> {
    RE_IMG_SRC
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
