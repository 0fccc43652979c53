use crate::types::{FeedSource, Result};
use async_trait::async_trait;

/// Trait for retrieving the raw body of a feed (RSS/Atom XML).
///
/// The HTTP [`Fetcher`](crate::Fetcher) is the production implementation;
/// anything that can hand back feed bytes for a source can drive the pipeline.
#[async_trait]
pub trait FetchFeed: Send + Sync {
    /// Fetch the feed body for `source`. Errors are reported per feed and
    /// never abort the run on their own.
    async fn fetch(&self, source: &FeedSource) -> Result<String>;
}
