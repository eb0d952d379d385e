use crate::config::FetchConfig;
use crate::types::{NewsError, Result};
use futures::{Stream, StreamExt};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::debug;

const MB: usize = 1024 * 1024;

/// Thin wrapper over a shared reqwest client. One GET per call, no retries:
/// a failing source sits out until its next eligible window.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let start_time = Instant::now();
        debug!("Fetching: {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NewsError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let max_bytes = self.config.max_feed_size_mb.saturating_mul(MB);
        if let Some(content_length) = response.content_length() {
            if content_length as usize > max_bytes {
                return Err(NewsError::FeedTooLarge {
                    size_mb: content_length as usize / MB,
                });
            }
        }

        // Content-Length is absent on chunked bodies, so count as we read.
        let body = read_capped(response.bytes_stream(), max_bytes).await?;
        let content = String::from_utf8_lossy(&body).into_owned();
        debug!(
            "Fetched {} ({} bytes in {}ms)",
            url,
            content.len(),
            start_time.elapsed().as_millis()
        );
        Ok(content)
    }
}

/// Collect a body stream, failing as soon as it grows past `max_bytes`.
pub async fn read_capped<S, B, E>(stream: S, max_bytes: usize) -> Result<Vec<u8>>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<NewsError>,
{
    futures::pin_mut!(stream);
    let mut body = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(Into::<NewsError>::into)?;
        body.extend_from_slice(chunk.as_ref());
        if body.len() > max_bytes {
            return Err(NewsError::FeedTooLarge { size_mb: body.len() / MB });
        }
    }
    Ok(body)
}
