use crate::config::SourceConfig;
use crate::fetcher::Fetcher;
use crate::parser::FeedParser;
use crate::sources::{SourceAdapter, SourceHealth};
use crate::types::{RawItem, Result, UserProfile};
use async_trait::async_trait;
use tracing::{debug, info};

/// Feed-pull adapter: one GET against a fixed syndication endpoint.
pub struct FeedSource {
    config: SourceConfig,
    fetcher: Fetcher,
    health: SourceHealth,
    /// Channel title seen on the last successful pull.
    pub feed_title: Option<String>,
}

impl FeedSource {
    pub fn new(config: SourceConfig, fetcher: Fetcher) -> Self {
        Self {
            config,
            fetcher,
            health: SourceHealth::default(),
            feed_title: None,
        }
    }
}

#[async_trait]
impl SourceAdapter for FeedSource {
    fn config(&self) -> &SourceConfig {
        &self.config
    }

    fn health(&self) -> &SourceHealth {
        &self.health
    }

    fn health_mut(&mut self) -> &mut SourceHealth {
        &mut self.health
    }

    async fn pull(&mut self, _profile: &UserProfile) -> Result<Vec<RawItem>> {
        debug!("Pulling feed: {} ({})", self.config.name, self.config.endpoint);

        let content = self.fetcher.fetch_text(&self.config.endpoint).await?;

        // Fresh parser per pull: duplicate URLs are only skipped within one fetch
        let mut parser = FeedParser::new();
        let parsed = parser.parse_feed(&content, &self.config.name, self.config.max_items)?;

        if parsed.title.is_some() {
            self.feed_title = parsed.title;
        }

        info!("Parsed {} items from feed {}", parsed.items.len(), self.config.name);
        Ok(parsed.items)
    }
}
