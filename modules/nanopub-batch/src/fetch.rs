use std::time::Duration;

use async_trait::async_trait;

use nanopub_client::{FetchOutcome, NanopubClient, Result};

/// Seam between the pipeline and the network. Tests swap in stub fetchers;
/// production uses [`HttpFetcher`].
#[async_trait]
pub trait RecordFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchOutcome>;
}

/// Production fetcher backed by the multi-format HTTP client.
pub struct HttpFetcher {
    client: NanopubClient,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: NanopubClient::new(timeout),
        }
    }
}

#[async_trait]
impl RecordFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutcome> {
        self.client.fetch(url).await
    }
}
