use crate::service::NewsService;
use crate::types::UserProfile;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub const WARM_LIMIT: usize = 50;

/// Keeps the cache hot for popular profiles by force-refreshing them on a
/// fixed interval.
#[derive(Clone)]
pub struct CacheWarmer {
    service: Arc<NewsService>,
    profiles: Vec<UserProfile>,
    interval: Duration,
    spacing: Duration,
    stop_tx: Arc<watch::Sender<bool>>,
    // Holds the channel open so `stop` always lands
    _stop_rx: watch::Receiver<bool>,
}

impl CacheWarmer {
    pub fn new(service: Arc<NewsService>, profiles: Vec<UserProfile>, interval: Duration, spacing: Duration) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        Self {
            service,
            profiles,
            interval,
            spacing,
            stop_tx: Arc::new(stop_tx),
            _stop_rx: stop_rx,
        }
    }

    /// Profiles and timings from the service's configuration.
    pub fn from_config(service: Arc<NewsService>) -> Self {
        let config = service.config();
        let profiles = config.warm_profiles.iter().map(|p| p.to_profile()).collect();
        let interval = Duration::from_secs(config.warm_interval_secs);
        let spacing = Duration::from_secs(config.warm_spacing_secs);
        Self::new(service, profiles, interval, spacing)
    }

    pub fn profiles(&self) -> &[UserProfile] {
        &self.profiles
    }

    pub fn is_stopped(&self) -> bool {
        *self.stop_tx.borrow()
    }

    /// Refresh every profile once. Returns how many produced articles.
    pub async fn warm_once(&self) -> usize {
        let mut refreshed = 0;

        for (i, profile) in self.profiles.iter().enumerate() {
            if i > 0 && !self.pause(self.spacing).await {
                break;
            }
            if self.is_stopped() {
                break;
            }

            match self.service.get_contextual_news(profile, WARM_LIMIT, true).await {
                Ok(payload) if payload.metadata.error.is_none() => {
                    debug!("Warmed cache for {}/{}", profile.profession, profile.location);
                    refreshed += 1;
                }
                Ok(payload) => warn!(
                    "Cache warm for {}/{} produced nothing: {}",
                    profile.profession,
                    profile.location,
                    payload.metadata.error.unwrap_or_default()
                ),
                Err(e) => warn!("Cache warm for {}/{} failed: {}", profile.profession, profile.location, e),
            }
        }

        refreshed
    }

    /// Spawn the warming loop. It runs one round immediately, then one per
    /// interval, until `stop` is called.
    pub fn start(&self) -> JoinHandle<()> {
        self.stop_tx.send_replace(false);
        let warmer = self.clone();
        info!(
            "Starting cache warmer for {} profiles every {:?}",
            warmer.profiles.len(),
            warmer.interval
        );

        tokio::spawn(async move {
            loop {
                if warmer.is_stopped() {
                    break;
                }
                let refreshed = warmer.warm_once().await;
                info!("Cache warm round complete: {}/{} profiles", refreshed, warmer.profiles.len());

                if !warmer.pause(warmer.interval).await {
                    break;
                }
            }
            info!("Cache warmer stopped");
        })
    }

    /// Ask the loop to finish after the profile it is working on.
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }

    /// Sleep unless stopped first. Returns false when stopped.
    async fn pause(&self, duration: Duration) -> bool {
        let mut stop_rx = self.stop_tx.subscribe();
        if *stop_rx.borrow_and_update() {
            return false;
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => !self.is_stopped(),
            _ = stop_rx.changed() => !self.is_stopped(),
        }
    }
}
