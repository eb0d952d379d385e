pub mod actions;
pub mod classify;
pub mod events;
pub mod gate;
pub mod scoring;
pub mod text;

use crate::types::{ProcessedItem, RawItem, Result, UserProfile};
use crate::utils::text::{clean_markup, take_chars};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const DEFAULT_MAX_ARTICLES: usize = 50;

/// Stable for a (source, URL) pair.
pub fn item_id(source: &str, url: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, format!("{}|{}", source, url).as_bytes()).to_string()
}

/// Best first: weighted score descending, then newer first.
pub fn rank(a: &ProcessedItem, b: &ProcessedItem) -> Ordering {
    b.weighted_score()
        .partial_cmp(&a.weighted_score())
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.published_at.cmp(&a.published_at))
}

/// Turns raw items into enriched, scored and gated items.
#[derive(Debug, Clone)]
pub struct ContentProcessor {
    max_articles: usize,
}

impl Default for ContentProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ARTICLES)
    }
}

impl ContentProcessor {
    pub fn new(max_articles: usize) -> Self {
        Self { max_articles }
    }

    pub fn max_articles(&self) -> usize {
        self.max_articles
    }

    pub fn process(&self, raw: &[RawItem], profile: &UserProfile) -> Vec<ProcessedItem> {
        self.process_at(raw, profile, Utc::now())
    }

    /// Same as `process` with an explicit clock, used for recency and urgency.
    pub fn process_at(&self, raw: &[RawItem], profile: &UserProfile, now: DateTime<Utc>) -> Vec<ProcessedItem> {
        let mut processed = Vec::with_capacity(raw.len());
        let mut rejected = 0usize;

        for item in raw {
            match self.process_item(item, profile, now) {
                Ok(Some(done)) => processed.push(done),
                Ok(None) => rejected += 1,
                Err(e) => {
                    warn!(
                        source = %item.source_name,
                        title = take_chars(&item.title, 60),
                        error = %e,
                        "dropping item that failed processing"
                    );
                    rejected += 1;
                }
            }
        }

        processed.sort_by(rank);
        processed.truncate(self.max_articles);

        info!(
            "Processed {} raw items: {} kept, {} dropped",
            raw.len(),
            processed.len(),
            rejected
        );
        processed
    }

    /// `Ok(None)` when the item is rejected by the quality gate.
    pub fn process_item(
        &self,
        item: &RawItem,
        profile: &UserProfile,
        now: DateTime<Utc>,
    ) -> Result<Option<ProcessedItem>> {
        let combined = item.combined_text();
        let plain = clean_markup(&combined);

        let summary = text::summarize(item);
        let keywords = text::extract_keywords(&plain);
        let category = classify::classify(&plain, &profile.profession);
        let signals = events::detect(&plain, now)?;
        let relevance_score = scoring::relevance(&plain, profile);
        let quality_score = scoring::quality(item, &plain, now);
        let available_actions = actions::suggest(&plain, &signals);

        let tags = if item.tags.is_empty() {
            keywords.clone()
        } else {
            item.tags.clone()
        };

        let processed = ProcessedItem {
            id: item_id(&item.source_name, &item.url),
            title: clean_markup(&item.title),
            description: clean_markup(&item.description),
            summary,
            url: item.url.clone(),
            image_url: item.image_url.clone().filter(|u| !u.is_empty()),
            published_at: item.published_at,
            source: item.source_name.clone(),
            category,
            relevance_score,
            quality_score,
            engagement_score: 0.0,
            tags,
            keywords,
            is_local_event: signals.is_local_event,
            is_urgent: signals.is_urgent,
            event_date: signals.event_date,
            event_location: signals.location,
            event_deadline: signals.deadline,
            available_actions,
        };

        if let Err(reason) = gate::check(&processed) {
            debug!(
                "Rejected '{}' from {}: {:?}",
                take_chars(&processed.title, 60),
                processed.source,
                reason
            );
            return Ok(None);
        }

        Ok(Some(processed))
    }
}
