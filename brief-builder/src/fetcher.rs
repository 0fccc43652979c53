use crate::traits::FetchFeed;
use crate::types::{BuildError, FeedSource, FetchConfig, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

/// HTTP feed fetcher. One GET per feed, no retries: the next scheduled run
/// picks up anything that failed here.
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

    pub async fn fetch_feed(&self, url: &str) -> Result<String> {
        let start_time = Instant::now();
        debug!("Fetching feed: {}", url);

        let feed_url = Url::parse(url)?;
        let fetch_error = |reason: String| BuildError::FeedFetch {
            url: url.to_string(),
            reason,
        };

        let mut response = self
            .client
            .get(feed_url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let max_bytes = self.config.max_feed_size_mb * 1024 * 1024;
        let too_large =
            |bytes: usize| fetch_error(format!("Feed too large: {}MB", bytes / (1024 * 1024)));
        if let Some(content_length) = response.content_length() {
            if content_length as usize > max_bytes {
                return Err(too_large(content_length as usize));
            }
        }

        // Compressed bodies carry no usable length; enforce the cap while reading
        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| fetch_error(e.to_string()))?
        {
            body.extend_from_slice(&chunk);
            if body.len() > max_bytes {
                return Err(too_large(body.len()));
            }
        }
        let content = String::from_utf8_lossy(&body).into_owned();

        info!(
            "Fetched feed: {} ({} bytes in {}ms)",
            url,
            content.len(),
            start_time.elapsed().as_millis()
        );
        Ok(content)
    }
}

#[async_trait]
impl FetchFeed for Fetcher {
    async fn fetch(&self, source: &FeedSource) -> Result<String> {
        self.fetch_feed(&source.url).await
    }
}
