//! Runtime configuration: HTTP settings, the source registry, cache and
//! scheduler knobs. Everything has a default so a missing or broken config
//! file never stops the service from starting.

use crate::types::{Category, NewsError, Result, UserProfile};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Longer TTLs are clamped to one year.
pub const MAX_CACHE_TTL_HOURS: u64 = 24 * 365;

pub const GOOGLE_NEWS_SEARCH_URL: &str = "https://news.google.com/rss/search";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    /// Upper bound for one adapter fetch, all its requests included.
    pub fetch_timeout_seconds: u64,
    pub max_feed_size_mb: usize,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "ContextualNews/1.0".to_string(),
            timeout_seconds: 30,
            fetch_timeout_seconds: 30,
            max_feed_size_mb: 10,
            max_redirects: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    FeedPull,
    QueryPull,
}

/// One configured source. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    pub endpoint: String,
    pub kind: SourceKind,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub profession: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default = "default_priority")]
    pub priority: u8,
    /// Max fetches per hour. `None` means unlimited.
    #[serde(default)]
    pub rate_limit: Option<f64>,
    #[serde(default = "default_max_items")]
    pub max_items: usize,
}

fn default_active() -> bool {
    true
}

fn default_priority() -> u8 {
    1
}

fn default_max_items() -> usize {
    20
}

impl SourceConfig {
    pub fn feed(name: &str, endpoint: &str, categories: Vec<Category>, priority: u8) -> Self {
        Self {
            name: name.to_string(),
            endpoint: endpoint.to_string(),
            kind: SourceKind::FeedPull,
            categories,
            region: None,
            profession: None,
            active: true,
            priority,
            rate_limit: None,
            max_items: default_max_items(),
        }
    }

    pub fn query(name: &str, endpoint: &str, categories: Vec<Category>, priority: u8) -> Self {
        Self {
            kind: SourceKind::QueryPull,
            ..Self::feed(name, endpoint, categories, priority)
        }
    }

    pub fn with_region(mut self, region: &str) -> Self {
        self.region = Some(region.to_string());
        self
    }

    pub fn with_profession(mut self, profession: &str) -> Self {
        self.profession = Some(profession.to_string());
        self
    }

    pub fn with_rate_limit(mut self, per_hour: f64) -> Self {
        self.rate_limit = Some(per_hour);
        self
    }
}

/// A profession/location pair the cache warmer keeps fresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarmProfile {
    pub profession: String,
    pub location: String,
}

impl WarmProfile {
    fn new(profession: &str, location: &str) -> Self {
        Self {
            profession: profession.to_string(),
            location: location.to_string(),
        }
    }

    pub fn to_profile(&self) -> UserProfile {
        UserProfile::new(self.profession.clone(), self.location.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    pub fetch: FetchConfig,
    pub sources: Vec<SourceConfig>,
    pub cache_ttl_hours: u64,
    /// Cap on processed items kept per run.
    pub max_articles: usize,
    /// Cap on each per-category group in the payload.
    pub category_cap: usize,
    pub cache_dir: Option<PathBuf>,
    pub database_url: Option<String>,
    pub warm_profiles: Vec<WarmProfile>,
    pub warm_interval_secs: u64,
    pub warm_spacing_secs: u64,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            sources: default_sources(),
            cache_ttl_hours: 2,
            max_articles: 50,
            category_cap: 10,
            cache_dir: None,
            database_url: None,
            warm_profiles: vec![
                WarmProfile::new("teacher", "India"),
                WarmProfile::new("engineer", "Bangalore"),
                WarmProfile::new("student", "India"),
                WarmProfile::new("developer", "Pune"),
                WarmProfile::new("teacher", "Mumbai"),
                WarmProfile::new("student", "Delhi"),
            ],
            warm_interval_secs: 3600,
            warm_spacing_secs: 10,
        }
    }
}

impl NewsConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| NewsError::config(format!("Invalid config: {}", e)))
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        if self.cache_ttl_hours > MAX_CACHE_TTL_HOURS {
            warn!(
                "cache_ttl_hours {} is too large, using {}",
                self.cache_ttl_hours, MAX_CACHE_TTL_HOURS
            );
        }
        chrono::Duration::hours(self.cache_ttl_hours.min(MAX_CACHE_TTL_HOURS) as i64)
    }

    pub fn active_sources(&self) -> impl Iterator<Item = &SourceConfig> {
        self.sources.iter().filter(|s| s.active)
    }
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file is missing or does not parse.
pub fn load_config(path: &Path) -> NewsConfig {
    match read_config(path) {
        Ok(config) => {
            info!("Loaded config from {:?} ({} sources)", path, config.sources.len());
            config
        }
        Err(e) => {
            warn!("Failed to load config from {:?}: {}", path, e);
            warn!("Using default configuration");
            NewsConfig::default()
        }
    }
}

fn read_config(path: &Path) -> Result<NewsConfig> {
    let raw = std::fs::read_to_string(path)?;
    NewsConfig::from_toml_str(&raw)
}

pub fn default_sources() -> Vec<SourceConfig> {
    use Category::*;

    vec![
        SourceConfig::feed("TechCrunch", "https://techcrunch.com/feed/", vec![Technology, IndustryTrends], 3)
            .with_region("global"),
        SourceConfig::feed("The Verge", "https://www.theverge.com/rss/index.xml", vec![Technology], 2)
            .with_region("global"),
        SourceConfig::feed("EdSurge", "https://edsurge.com/feed/", vec![Education, ProfessionalDev], 3)
            .with_region("global")
            .with_profession("teacher"),
        SourceConfig::feed("Harvard Business Review", "https://hbr.org/feed", vec![ProfessionalDev, Productivity], 2)
            .with_region("global"),
        SourceConfig::feed(
            "The Hindu",
            "https://www.thehindu.com/news/national/feeder/default.rss",
            vec![LocalEvents, IndustryTrends],
            3,
        )
        .with_region("india"),
        SourceConfig::feed(
            "Times of India",
            "https://timesofindia.indiatimes.com/rssfeeds/-2128936835.cms",
            vec![Technology, LocalEvents],
            3,
        )
        .with_region("india"),
        SourceConfig::feed("Coursera Blog", "https://blog.coursera.org/feed/", vec![Education, CareerOpportunities], 2)
            .with_region("global"),
        SourceConfig::query(
            "Google News",
            GOOGLE_NEWS_SEARCH_URL,
            vec![LocalEvents, CareerOpportunities, Education, IndustryTrends],
            3,
        )
        .with_region("india"),
    ]
}
