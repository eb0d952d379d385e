pub mod cache;
pub mod config;
pub mod fetcher;
pub mod orchestrator;
pub mod parser;
pub mod processor;
pub mod scheduler;
pub mod service;
pub mod sources;
pub mod types;
pub mod utils;

pub use cache::{fingerprint, CacheBackend, CacheEntry, DiskCache, MemoryCache, PostgresCache, ResponseCache};
pub use config::{load_config, FetchConfig, NewsConfig, SourceConfig, SourceKind};
pub use fetcher::Fetcher;
pub use orchestrator::{FetchOrchestrator, FetchOutcome};
pub use parser::FeedParser;
pub use processor::ContentProcessor;
pub use scheduler::CacheWarmer;
pub use service::NewsService;
pub use sources::{FeedSource, QuerySource, SourceAdapter, SourceHealth};
pub use types::*;
