use crate::config::SourceConfig;
use crate::fetcher::Fetcher;
use crate::parser::FeedParser;
use crate::sources::{SourceAdapter, SourceHealth};
use crate::types::{NewsError, RawItem, Result, UserProfile};
use async_trait::async_trait;
use chrono::{Datelike, Utc};
use futures::future::join_all;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const DEFAULT_LOCATION: &str = "India";

/// Query-pull adapter: several profession/location searches against a
/// search-results feed endpoint, merged and capped.
pub struct QuerySource {
    config: SourceConfig,
    fetcher: Fetcher,
    health: SourceHealth,
}

impl QuerySource {
    pub fn new(config: SourceConfig, fetcher: Fetcher) -> Self {
        Self {
            config,
            fetcher,
            health: SourceHealth::default(),
        }
    }

    pub fn query_url(&self, query: &str) -> Result<String> {
        let url = Url::parse_with_params(
            &self.config.endpoint,
            &[("q", query), ("hl", "en"), ("gl", "IN"), ("ceid", "IN:en")],
        )?;
        Ok(url.to_string())
    }

    async fn pull_query(&self, query: &str, limit: usize) -> Result<Vec<RawItem>> {
        let url = self.query_url(query)?;
        let content = self.fetcher.fetch_text(&url).await?;
        let mut parser = FeedParser::new();
        let parsed = parser.parse_feed(&content, &self.config.name, limit)?;

        Ok(parsed
            .items
            .into_iter()
            .map(|mut item| {
                let (headline, publisher) = split_publisher(&item.title);
                item.source_name = format!("{} ({})", self.config.name, publisher.unwrap_or("Unknown"));
                item.title = headline.to_string();
                item
            })
            .collect())
    }
}

/// The search variants for a profile, in a fixed order.
pub fn build_queries(profession: &str, location: &str, year: i32) -> Vec<String> {
    let p = profession.trim();
    let loc = match location.trim() {
        "" => DEFAULT_LOCATION,
        other => other,
    };

    vec![
        format!("{} conference {}", p, loc),
        format!("{} meetup {}", p, loc),
        format!("{} workshop {}", p, loc),
        format!("{} job opportunity {}", p, loc),
        format!("{} career {}", p, loc),
        format!("{} course certification", p),
        format!("{} training program", p),
        format!("{} trends {}", p, year),
        format!("{} industry news {}", p, loc),
    ]
}

/// Each variant gets this share of the adapter timeout, so a stalled one is
/// cut off before the whole pull is.
pub fn variant_budget(fetch_timeout_seconds: u64) -> Duration {
    Duration::from_millis(fetch_timeout_seconds.saturating_mul(750))
}

/// Run every variant concurrently, each under `budget`. Failed or stalled
/// variants are logged and skipped; the call fails only when none answered.
/// Items keep variant order.
pub async fn gather_variants<'a, F, Fut>(
    source: &str,
    queries: &'a [String],
    budget: Duration,
    pull: F,
) -> Result<(Vec<RawItem>, usize)>
where
    F: Fn(&'a str) -> Fut,
    Fut: Future<Output = Result<Vec<RawItem>>> + 'a,
{
    let attempts = queries.iter().map(|query| {
        debug!("Searching {} for '{}'", source, query);
        let pending = pull(query.as_str());
        async move {
            let result = match tokio::time::timeout(budget, pending).await {
                Ok(result) => result,
                Err(_) => Err(NewsError::Timeout {
                    source_name: source.to_string(),
                    seconds: budget.as_secs(),
                }),
            };
            (query, result)
        }
    });

    let mut items = Vec::new();
    let mut last_error = None;
    let mut succeeded = 0usize;
    for (query, result) in join_all(attempts).await {
        match result {
            Ok(found) => {
                succeeded += 1;
                items.extend(found);
            }
            Err(e) => {
                warn!("Query '{}' against {} failed: {}", query, source, e);
                last_error = Some(e);
            }
        }
    }

    if succeeded == 0 {
        return Err(last_error.unwrap_or_else(|| NewsError::General("No queries issued".to_string())));
    }
    Ok((items, succeeded))
}

/// Search result titles read "Headline - Publisher".
fn split_publisher(title: &str) -> (&str, Option<&str>) {
    match title.rsplit_once(" - ") {
        Some((headline, publisher)) if !headline.trim().is_empty() && !publisher.trim().is_empty() => {
            (headline.trim(), Some(publisher.trim()))
        }
        _ => (title, None),
    }
}

#[async_trait]
impl SourceAdapter for QuerySource {
    fn config(&self) -> &SourceConfig {
        &self.config
    }

    fn health(&self) -> &SourceHealth {
        &self.health
    }

    fn health_mut(&mut self) -> &mut SourceHealth {
        &mut self.health
    }

    async fn pull(&mut self, profile: &UserProfile) -> Result<Vec<RawItem>> {
        let queries = build_queries(&profile.profession, &profile.location, Utc::now().year());
        let per_query = (self.config.max_items / queries.len()).max(1);

        let budget = variant_budget(self.fetcher.config().fetch_timeout_seconds);

        let this = &*self;
        let (mut items, succeeded) =
            gather_variants(&this.config.name, &queries, budget, |query| this.pull_query(query, per_query)).await?;

        items.truncate(self.config.max_items);
        info!(
            "{} of {} queries answered by {}, {} items",
            succeeded,
            queries.len(),
            self.config.name,
            items.len()
        );
        Ok(items)
    }
}
