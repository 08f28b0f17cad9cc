use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

use super::{FetchError, PageFetcher};
use crate::types::{ChainId, RawNftRecord, WalletAddress};

/// Retries transient failures of the wrapped fetcher with a fixed delay.
/// The aggregation loop itself never retries; this is where the policy lives.
pub struct RetryingPageFetcher<F> {
    inner: F,
    max_retries: u32,
    delay: Duration,
}

impl<F: PageFetcher> RetryingPageFetcher<F> {
    pub fn new(inner: F, max_retries: u32, delay: Duration) -> Self {
        Self { inner, max_retries, delay }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }
}

#[async_trait]
impl<F: PageFetcher> PageFetcher for RetryingPageFetcher<F> {
    async fn fetch_page(&self, address: &WalletAddress, chain: &ChainId) -> Result<Vec<RawNftRecord>, FetchError> {
        let mut attempt = 0;
        loop {
            match self.inner.fetch_page(address, chain).await {
                Ok(records) => return Ok(records),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        "{} failed on {} ({}), retry {}/{}",
                        self.inner.source_name(),
                        chain,
                        e,
                        attempt,
                        self.max_retries
                    );
                    sleep(self.delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn source_name(&self) -> &str {
        self.inner.source_name()
    }
}
