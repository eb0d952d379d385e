use crate::cache::{fingerprint, DiskCache, PostgresCache, ResponseCache};
use crate::config::NewsConfig;
use crate::fetcher::Fetcher;
use crate::orchestrator::FetchOrchestrator;
use crate::processor::ContentProcessor;
use crate::sources::{build_adapters, SourceAdapter};
use crate::types::{
    Category, ContextEntry, HealthReport, LocalEventNote, NewsContext, NewsPayload, PayloadMetadata,
    ProcessedItem, Result, UserProfile,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

pub const NO_RAW_ITEMS: &str = "No articles fetched from sources";
pub const NO_ITEMS_PASSED: &str = "No articles passed the quality gate";
pub const DEFAULT_CONTEXT_DAYS: i64 = 3;
const CONTEXT_RELEVANCE_THRESHOLD: f64 = 0.6;
const CONTEXT_TOP_ITEMS: usize = 3;

/// What one fetch+process cycle produced. Cached per profile fingerprint;
/// payloads are derived from it on every call, so equal inputs give equal
/// payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CachedRun {
    articles: Vec<ProcessedItem>,
    raw_articles_fetched: usize,
    sources_used: usize,
    last_updated: DateTime<Utc>,
    error: Option<String>,
}

/// Entry point for callers: contextual news, category and event views, the
/// chat digest and source health.
pub struct NewsService {
    orchestrator: Mutex<FetchOrchestrator>,
    /// Health as of the last finished run, served while a run is in flight.
    health: RwLock<HealthReport>,
    processor: ContentProcessor,
    cache: ResponseCache,
    config: NewsConfig,
}

impl NewsService {
    /// Build adapters for the active sources and pick a cache backend:
    /// Postgres when `database_url` is set, disk when `cache_dir` is set,
    /// memory otherwise. A backend that cannot be opened is replaced by the
    /// memory backend.
    pub async fn new(config: NewsConfig) -> Result<Self> {
        let fetcher = Fetcher::new(config.fetch.clone())?;
        let active: Vec<_> = config.active_sources().cloned().collect();
        let adapters = build_adapters(&active, &fetcher);
        let cache = open_cache(&config).await;

        let processor = ContentProcessor::new(config.max_articles);
        info!(
            "News service ready: {} sources, {} cache, ttl {}h",
            adapters.len(),
            cache.backend_name(),
            cache.ttl().num_hours()
        );
        Ok(Self::from_parts(adapters, cache, processor, config))
    }

    pub fn from_parts(
        adapters: Vec<Box<dyn SourceAdapter>>,
        cache: ResponseCache,
        processor: ContentProcessor,
        config: NewsConfig,
    ) -> Self {
        let fetch_timeout = StdDuration::from_secs(config.fetch.fetch_timeout_seconds);
        let orchestrator = FetchOrchestrator::new(adapters, fetch_timeout);
        Self {
            health: RwLock::new(orchestrator.health_report()),
            orchestrator: Mutex::new(orchestrator),
            processor,
            cache,
            config,
        }
    }

    pub fn config(&self) -> &NewsConfig {
        &self.config
    }

    /// Ranked items for the profile with per-category groups. Served from
    /// the cache unless `force_refresh` is set. Never fails because of a
    /// source, an item or the cache.
    pub async fn get_contextual_news(
        &self,
        profile: &UserProfile,
        limit: usize,
        force_refresh: bool,
    ) -> Result<NewsPayload> {
        let key = fingerprint(profile);
        info!(
            "Getting news for {} in {} (force_refresh={})",
            profile.profession, profile.location, force_refresh
        );

        if !force_refresh {
            if let Some(run) = self.cache.get_json::<CachedRun>(&key).await {
                info!("Returning cached news for {}", key);
                return Ok(self.build_payload(&run, profile, limit));
            }
        }

        let run = self.refresh(&key, profile, force_refresh).await;
        Ok(self.build_payload(&run, profile, limit))
    }

    /// `get_contextual_news` serialized as JSON.
    pub async fn get_contextual_news_json(
        &self,
        profile: &UserProfile,
        limit: usize,
        force_refresh: bool,
    ) -> Result<String> {
        let payload = self.get_contextual_news(profile, limit, force_refresh).await?;
        Ok(serde_json::to_string(&payload)?)
    }

    pub async fn get_category_news(
        &self,
        profile: &UserProfile,
        category: Category,
        limit: usize,
    ) -> Result<Vec<ProcessedItem>> {
        let payload = self.get_contextual_news(profile, self.config.max_articles, false).await?;
        let mut items = payload.categories.get(&category).cloned().unwrap_or_default();
        items.truncate(limit);
        Ok(items)
    }

    /// Local events, urgent first, then by event date with undated last.
    pub async fn get_local_events(&self, profile: &UserProfile, limit: usize) -> Result<Vec<ProcessedItem>> {
        let payload = self.get_contextual_news(profile, self.config.max_articles, false).await?;
        let mut events: Vec<ProcessedItem> = payload.articles.into_iter().filter(|a| a.is_local_event).collect();
        events.sort_by(|a, b| {
            b.is_urgent
                .cmp(&a.is_urgent)
                .then_with(|| match (a.event_date, b.event_date) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                })
        });
        events.truncate(limit);
        Ok(events)
    }

    pub async fn get_news_context(&self, profile: &UserProfile, days_back: i64) -> Result<NewsContext> {
        self.get_news_context_at(profile, days_back, Utc::now()).await
    }

    pub async fn get_news_context_at(
        &self,
        profile: &UserProfile,
        days_back: i64,
        now: DateTime<Utc>,
    ) -> Result<NewsContext> {
        let payload = self.get_contextual_news(profile, self.config.max_articles, false).await?;
        // A window reaching past the earliest representable time covers everything.
        let cutoff = Duration::try_days(days_back.max(0))
            .and_then(|window| now.checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let recent: Vec<&ProcessedItem> = payload
            .articles
            .iter()
            .filter(|a| a.published_at >= cutoff)
            .filter(|a| a.relevance_score > CONTEXT_RELEVANCE_THRESHOLD || a.is_local_event || a.is_urgent)
            .collect();

        let mut context = NewsContext {
            total_articles: recent.len(),
            categories: BTreeMap::new(),
            urgent_items: Vec::new(),
            local_events: Vec::new(),
            career_opportunities: Vec::new(),
            learning_opportunities: Vec::new(),
            summary: context_summary(&recent, &profile.profession),
        };

        for article in &recent {
            context.categories.entry(article.category).or_default().push(ContextEntry {
                title: article.title.clone(),
                summary: article.summary.clone(),
                relevance: article.relevance_score,
                url: article.url.clone(),
                published: article.published_at,
            });

            if article.is_urgent {
                context.urgent_items.push(article.title.clone());
            }
            if article.is_local_event {
                context.local_events.push(LocalEventNote {
                    title: article.title.clone(),
                    date: article.event_date,
                    location: article.event_location.clone(),
                });
            }
            match article.category {
                Category::CareerOpportunities => context.career_opportunities.push(article.title.clone()),
                Category::Education | Category::ProfessionalDev => {
                    context.learning_opportunities.push(article.title.clone())
                }
                _ => {}
            }
        }

        Ok(context)
    }

    /// Live report when no run is in flight, otherwise the snapshot taken
    /// after the last run. Never waits for a fan-out.
    pub async fn get_source_health(&self) -> HealthReport {
        match self.orchestrator.try_lock() {
            Ok(orchestrator) => orchestrator.health_report(),
            Err(_) => self.health.read().await.clone(),
        }
    }

    /// Run fetch and processing, then write through to the cache. Runs are
    /// serialized; a request that waited for another run re-checks the
    /// cache first unless it is forcing a refresh.
    async fn refresh(&self, key: &str, profile: &UserProfile, force_refresh: bool) -> CachedRun {
        let mut orchestrator = self.orchestrator.lock().await;

        if !force_refresh {
            if let Some(run) = self.cache.get_json::<CachedRun>(key).await {
                return run;
            }
        }

        let outcome = orchestrator.fetch_all(profile).await;
        *self.health.write().await = orchestrator.health_report();
        drop(orchestrator);

        let now = Utc::now();
        if outcome.items.is_empty() {
            warn!("No raw items fetched for {}", key);
            return CachedRun {
                articles: Vec::new(),
                raw_articles_fetched: 0,
                sources_used: 0,
                last_updated: now,
                error: Some(NO_RAW_ITEMS.to_string()),
            };
        }

        let articles = self.processor.process_at(&outcome.items, profile, now);
        if articles.is_empty() {
            warn!("No items survived processing for {}", key);
            return CachedRun {
                articles,
                raw_articles_fetched: outcome.items.len(),
                sources_used: outcome.sources_used,
                last_updated: now,
                error: Some(NO_ITEMS_PASSED.to_string()),
            };
        }

        let run = CachedRun {
            articles,
            raw_articles_fetched: outcome.items.len(),
            sources_used: outcome.sources_used,
            last_updated: now,
            error: None,
        };
        self.cache.set_json(key, &run).await;
        info!("Cached {} articles for {}", run.articles.len(), key);
        run
    }

    /// `limit` trims `articles` only; groups and `total_articles` cover the
    /// whole processed run.
    fn build_payload(&self, run: &CachedRun, profile: &UserProfile, limit: usize) -> NewsPayload {
        let articles: Vec<ProcessedItem> = run.articles.iter().take(limit).cloned().collect();

        let mut categories: BTreeMap<Category, Vec<ProcessedItem>> = BTreeMap::new();
        for article in &run.articles {
            categories.entry(article.category).or_default().push(article.clone());
        }
        for group in categories.values_mut() {
            group.sort_by(|a, b| {
                b.relevance_score
                    .partial_cmp(&a.relevance_score)
                    .unwrap_or(Ordering::Equal)
            });
            group.truncate(self.config.category_cap);
        }

        NewsPayload {
            metadata: PayloadMetadata {
                total_articles: run.articles.len(),
                raw_articles_fetched: run.raw_articles_fetched,
                sources_used: run.sources_used,
                last_updated: run.last_updated,
                user_profile: profile.clone(),
                error: run.error.clone(),
            },
            articles,
            categories,
        }
    }
}

async fn open_cache(config: &NewsConfig) -> ResponseCache {
    let ttl = config.cache_ttl();

    if let Some(url) = &config.database_url {
        match PostgresCache::connect(url).await {
            Ok(backend) => return ResponseCache::new(Arc::new(backend), ttl),
            Err(e) => warn!(error = %e, "Postgres cache unavailable, falling back to memory"),
        }
    } else if let Some(dir) = &config.cache_dir {
        match DiskCache::new(dir) {
            Ok(backend) => return ResponseCache::new(Arc::new(backend), ttl),
            Err(e) => warn!(error = %e, "disk cache at {:?} unavailable, falling back to memory", dir),
        }
    }

    ResponseCache::in_memory(ttl)
}

fn context_summary(articles: &[&ProcessedItem], profession: &str) -> String {
    if articles.is_empty() {
        return format!("No recent relevant news found for {}.", profession);
    }

    let mut counts: BTreeMap<Category, usize> = BTreeMap::new();
    for article in articles {
        *counts.entry(article.category).or_default() += 1;
    }

    let mut summary = format!("Recent news summary for {}:\n", profession);
    let _ = writeln!(summary, "- {} relevant articles found", articles.len());
    for (category, count) in &counts {
        let _ = writeln!(summary, "- {} articles in {}", count, category.display_name());
    }

    let mut top: Vec<&&ProcessedItem> = articles.iter().collect();
    top.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(Ordering::Equal)
    });
    summary.push_str("\nTop relevant articles:\n");
    for (i, article) in top.into_iter().take(CONTEXT_TOP_ITEMS).enumerate() {
        let _ = writeln!(summary, "{}. {} (Relevance: {:.2})", i + 1, article.title, article.relevance_score);
    }
    summary
}
