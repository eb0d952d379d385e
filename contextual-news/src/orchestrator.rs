use crate::sources::SourceAdapter;
use crate::types::{HealthReport, RawItem, UserProfile};
use chrono::Utc;
use futures::future::join_all;
use futures::FutureExt;
use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tracing::{debug, error, info};

/// Result of one fan-out run.
#[derive(Debug, Clone, Default)]
pub struct FetchOutcome {
    pub items: Vec<RawItem>,
    /// Sources that produced at least one item.
    pub sources_used: usize,
    pub attempted: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Fans out to every eligible adapter concurrently. A failing, hanging or
/// panicking adapter only removes its own items from the merge.
pub struct FetchOrchestrator {
    adapters: Vec<Box<dyn SourceAdapter>>,
    fetch_timeout: Duration,
}

impl FetchOrchestrator {
    pub fn new(adapters: Vec<Box<dyn SourceAdapter>>, fetch_timeout: Duration) -> Self {
        Self {
            adapters,
            fetch_timeout,
        }
    }

    pub fn add_adapter(&mut self, adapter: Box<dyn SourceAdapter>) {
        info!("Adding source to orchestrator: {}", adapter.name());
        self.adapters.push(adapter);
    }

    pub fn adapters(&self) -> &[Box<dyn SourceAdapter>] {
        &self.adapters
    }

    /// Fetch from all eligible adapters and merge. Item order is unspecified.
    pub async fn fetch_all(&mut self, profile: &UserProfile) -> FetchOutcome {
        let timeout = self.fetch_timeout;
        let mut outcome = FetchOutcome::default();

        let mut eligible = Vec::new();
        for adapter in self.adapters.iter_mut() {
            if adapter.can_fetch() {
                eligible.push(adapter);
            } else {
                debug!("Skipping ineligible source: {}", adapter.name());
                outcome.skipped += 1;
            }
        }
        outcome.attempted = eligible.len();

        // At most one outstanding fetch per adapter per run
        let tasks = eligible.into_iter().map(|adapter| async move {
            let errors_before = adapter.health().error_count;
            let result = AssertUnwindSafe(adapter.fetch(profile, timeout)).catch_unwind().await;
            (adapter, errors_before, result)
        });

        for (adapter, errors_before, result) in join_all(tasks).await {
            match result {
                Ok(items) => {
                    if adapter.health().error_count > errors_before {
                        outcome.failed += 1;
                    }
                    if !items.is_empty() {
                        outcome.sources_used += 1;
                    }
                    outcome.items.extend(items);
                }
                Err(_) => {
                    error!("Source {} panicked during fetch", adapter.name());
                    adapter.record_fetch(false);
                    outcome.failed += 1;
                }
            }
        }

        info!(
            "Fetched {} raw items: {} sources attempted, {} skipped, {} failed, {} contributed",
            outcome.items.len(),
            outcome.attempted,
            outcome.skipped,
            outcome.failed,
            outcome.sources_used
        );
        outcome
    }

    /// Per-source snapshot plus the mean health of active sources.
    pub fn health_report(&self) -> HealthReport {
        let mut sources = BTreeMap::new();
        let mut active_total = 0.0;
        let mut active_count = 0usize;

        for adapter in &self.adapters {
            let report = adapter.health_report();
            if adapter.config().active {
                active_total += report.health_score;
                active_count += 1;
            }
            sources.insert(adapter.name().to_string(), report);
        }

        let overall_health = if active_count == 0 {
            0.0
        } else {
            active_total / active_count as f64
        };

        HealthReport {
            sources,
            overall_health,
            last_check: Utc::now(),
        }
    }
}
