#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, Utc};
use contextual_news::{
    ContentProcessor, NewsConfig, NewsError, NewsService, RawItem, ResponseCache, Result, SourceAdapter,
    SourceConfig, SourceHealth, UserProfile,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[derive(Clone)]
pub enum Behaviour {
    Items(Vec<RawItem>),
    Fail,
    Hang,
    Panic,
}

/// Network-free adapter with a pull counter.
pub struct MockSource {
    config: SourceConfig,
    health: SourceHealth,
    behaviour: Behaviour,
    pulls: Arc<AtomicUsize>,
}

impl MockSource {
    pub fn new(name: &str, behaviour: Behaviour) -> Self {
        Self {
            config: SourceConfig::feed(name, "https://example.com/rss", vec![], 1),
            health: SourceHealth::default(),
            behaviour,
            pulls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn pulls(&self) -> Arc<AtomicUsize> {
        self.pulls.clone()
    }

    pub fn boxed(self) -> Box<dyn SourceAdapter> {
        Box::new(self)
    }
}

#[async_trait]
impl SourceAdapter for MockSource {
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
        self.pulls.fetch_add(1, Ordering::SeqCst);
        match &self.behaviour {
            Behaviour::Items(items) => Ok(items.clone()),
            Behaviour::Fail => Err(NewsError::Parse("unreadable feed".to_string())),
            Behaviour::Hang => {
                tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
                Ok(Vec::new())
            }
            Behaviour::Panic => panic!("adapter bug"),
        }
    }
}

pub fn count(pulls: &Arc<AtomicUsize>) -> usize {
    pulls.load(Ordering::SeqCst)
}

/// Items that pass the quality gate for a teacher in India.
pub fn teacher_items(source: &str, n: usize) -> Vec<RawItem> {
    (0..n)
        .map(|i| {
            RawItem::new(
                format!("Classroom update {} from {}", i, source),
                format!("https://example.com/{}/{}", source.to_lowercase().replace(' ', "-"), i),
                source,
            )
            .with_description(format!(
                "New curriculum guidance number {} for every teacher in India this term.",
                i
            ))
            .with_published_at(Utc::now() - Duration::hours(i as i64 + 1))
        })
        .collect()
}

pub fn teacher() -> UserProfile {
    UserProfile::new("teacher", "India")
}

pub fn test_config() -> NewsConfig {
    let mut config = NewsConfig::default();
    config.fetch.fetch_timeout_seconds = 1;
    config
}

pub fn service_with(adapters: Vec<Box<dyn SourceAdapter>>) -> NewsService {
    service_with_cache(adapters, ResponseCache::in_memory(Duration::hours(2)))
}

pub fn service_with_cache(adapters: Vec<Box<dyn SourceAdapter>>, cache: ResponseCache) -> NewsService {
    let config = test_config();
    let processor = ContentProcessor::new(config.max_articles);
    NewsService::from_parts(adapters, cache, processor, config)
}
