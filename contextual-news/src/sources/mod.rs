pub mod feed;
pub mod query;

pub use feed::FeedSource;
pub use query::QuerySource;

use crate::config::{SourceConfig, SourceKind};
use crate::fetcher::Fetcher;
use crate::types::{NewsError, RawItem, Result, SourceHealthReport, UserProfile};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Success/error bookkeeping for one adapter. Only the owning adapter
/// mutates it; everyone else reads a `SourceHealthReport` snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceHealth {
    pub last_fetch: Option<DateTime<Utc>>,
    pub fetch_count: u64,
    pub error_count: u64,
}

impl SourceHealth {
    pub fn record(&mut self, success: bool, at: DateTime<Utc>) {
        self.last_fetch = Some(at);
        self.fetch_count += 1;
        if !success {
            self.error_count += 1;
        }
    }

    /// `1 - errors/fetches`, or 1.0 before the first fetch.
    pub fn score(&self) -> f64 {
        if self.fetch_count == 0 {
            return 1.0;
        }
        1.0 - self.error_count as f64 / self.fetch_count as f64
    }

    pub fn is_eligible(&self, config: &SourceConfig, now: DateTime<Utc>) -> bool {
        if !config.active {
            return false;
        }
        let (Some(per_hour), Some(last)) = (config.rate_limit, self.last_fetch) else {
            return true;
        };
        if per_hour <= 0.0 {
            return false;
        }
        crate::utils::time::hours_between(last, now) >= 1.0 / per_hour
    }
}

/// One fetch mechanism for one configured source.
///
/// Implementors provide `config`, the health accessors and `pull`; the
/// provided `fetch` wraps `pull` with the timeout and the exactly-once
/// `record_fetch` call, and never lets an error escape.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn config(&self) -> &SourceConfig;

    fn health(&self) -> &SourceHealth;

    fn health_mut(&mut self) -> &mut SourceHealth;

    /// One attempt against the network. May fail.
    async fn pull(&mut self, profile: &UserProfile) -> Result<Vec<RawItem>>;

    fn name(&self) -> &str {
        &self.config().name
    }

    fn can_fetch(&self) -> bool {
        self.health().is_eligible(self.config(), Utc::now())
    }

    fn record_fetch(&mut self, success: bool) {
        self.health_mut().record(success, Utc::now());
    }

    fn health_report(&self) -> SourceHealthReport {
        let health = self.health();
        SourceHealthReport {
            health_score: health.score(),
            last_fetch: health.last_fetch,
            fetch_count: health.fetch_count,
            error_count: health.error_count,
            can_fetch: self.can_fetch(),
        }
    }

    /// Pull under `timeout`, record the outcome, and degrade any failure to
    /// an empty result.
    async fn fetch(&mut self, profile: &UserProfile, timeout: Duration) -> Vec<RawItem> {
        debug!("Fetching from source: {}", self.name());

        let outcome = match tokio::time::timeout(timeout, self.pull(profile)).await {
            Ok(result) => result,
            Err(_) => Err(NewsError::Timeout {
                source_name: self.name().to_string(),
                seconds: timeout.as_secs(),
            }),
        };

        match outcome {
            Ok(items) => {
                self.record_fetch(true);
                info!("Fetched {} items from {}", items.len(), self.name());
                items
            }
            Err(e) => {
                self.record_fetch(false);
                warn!(source = %self.name(), error = %e, "source fetch failed");
                Vec::new()
            }
        }
    }
}

/// Build one adapter per configured source, sharing a single HTTP client.
pub fn build_adapters(sources: &[SourceConfig], fetcher: &Fetcher) -> Vec<Box<dyn SourceAdapter>> {
    sources
        .iter()
        .map(|config| -> Box<dyn SourceAdapter> {
            match config.kind {
                SourceKind::FeedPull => Box::new(FeedSource::new(config.clone(), fetcher.clone())),
                SourceKind::QueryPull => Box::new(QuerySource::new(config.clone(), fetcher.clone())),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetchConfig;
    use crate::types::Category;
    use chrono::Duration as ChronoDuration;

    fn limited(per_hour: f64) -> SourceConfig {
        SourceConfig::feed("Limited", "https://example.com/rss", vec![Category::Technology], 1)
            .with_rate_limit(per_hour)
    }

    #[test]
    fn health_score_is_one_before_any_fetch() {
        let health = SourceHealth::default();
        assert_eq!(health.score(), 1.0);
    }

    #[test]
    fn health_score_counts_attempts() {
        let mut health = SourceHealth::default();
        let now = Utc::now();
        health.record(true, now);
        health.record(false, now);
        health.record(true, now);
        health.record(false, now);
        assert_eq!(health.fetch_count, 4);
        assert_eq!(health.error_count, 2);
        assert!((health.score() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn rate_limit_gates_until_window_passes() {
        let config = limited(2.0); // one fetch per 30 minutes
        let now = Utc::now();
        let mut health = SourceHealth::default();
        assert!(health.is_eligible(&config, now));

        health.record(true, now - ChronoDuration::minutes(10));
        assert!(!health.is_eligible(&config, now));

        health.last_fetch = Some(now - ChronoDuration::minutes(31));
        assert!(health.is_eligible(&config, now));
    }

    #[test]
    fn inactive_source_is_never_eligible() {
        let mut config = limited(100.0);
        config.active = false;
        assert!(!SourceHealth::default().is_eligible(&config, Utc::now()));
    }

    #[test]
    fn unlimited_source_is_always_eligible() {
        let config = SourceConfig::feed("Open", "https://example.com/rss", vec![], 1);
        let mut health = SourceHealth::default();
        health.record(false, Utc::now());
        assert!(health.is_eligible(&config, Utc::now()));
    }

    #[test]
    fn builds_one_adapter_per_source() {
        let fetcher = Fetcher::new(FetchConfig::default()).unwrap();
        let sources = crate::config::default_sources();
        let adapters = build_adapters(&sources, &fetcher);
        assert_eq!(adapters.len(), sources.len());
        assert!(adapters.iter().all(|a| a.can_fetch()));
        assert_eq!(adapters[0].name(), sources[0].name);
    }
}
