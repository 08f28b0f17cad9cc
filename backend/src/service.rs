use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

use crate::aggregator::{AggregationFetcher, FetchOutcome, ProgressSink};
use crate::config::AppConfig;
use crate::indexer::{FetchError, MoralisPageFetcher, PageFetcher, RetryingPageFetcher};
use crate::metadata::MetadataNormalizer;
use crate::types::{ChainId, WalletAddress};
use crate::wallet::{WalletError, WalletProvider};

/// Wires the configured chain list, the page fetcher and the normalizer
/// together. Holds no per-session state, so one instance serves every caller.
#[derive(Clone)]
pub struct NftService {
    aggregator: AggregationFetcher,
    page_fetcher: Arc<dyn PageFetcher>,
    chains: Arc<[ChainId]>,
}

impl NftService {
    pub fn new(aggregator: AggregationFetcher, page_fetcher: Arc<dyn PageFetcher>, chains: Vec<ChainId>) -> Self {
        Self {
            aggregator,
            page_fetcher,
            chains: chains.into(),
        }
    }

    /// Moralis-backed service, wrapped in a retry policy when the config asks for one.
    pub fn from_config(config: &AppConfig) -> Result<Self, FetchError> {
        let moralis = MoralisPageFetcher::new(&config.indexer)?;
        let page_fetcher: Arc<dyn PageFetcher> = if config.indexer.max_retries > 0 {
            Arc::new(RetryingPageFetcher::new(
                moralis,
                config.indexer.max_retries,
                Duration::from_millis(config.indexer.retry_delay_ms),
            ))
        } else {
            Arc::new(moralis)
        };

        info!(
            "NFT service using {} across {} chains",
            page_fetcher.source_name(),
            config.chains.len()
        );

        Ok(Self::new(
            AggregationFetcher::new(MetadataNormalizer::new(&config.media)),
            page_fetcher,
            config.chains.clone(),
        ))
    }

    pub fn chains(&self) -> &[ChainId] {
        &self.chains
    }

    pub async fn fetch_for_address<P>(&self, address: &WalletAddress, progress: &mut P) -> FetchOutcome
    where
        P: ProgressSink + ?Sized,
    {
        self.aggregator
            .fetch_all(address, &self.chains, self.page_fetcher.as_ref(), progress)
            .await
    }

    /// Asks the wallet for an address first; without one no session is started.
    #[instrument(skip_all, fields(wallet = wallet.provider_name()))]
    pub async fn connect_and_fetch<P>(
        &self,
        wallet: &dyn WalletProvider,
        progress: &mut P,
    ) -> Result<(WalletAddress, FetchOutcome), WalletError>
    where
        P: ProgressSink + ?Sized,
    {
        let address = wallet.request_address().await?;
        let outcome = self.fetch_for_address(&address, progress).await;
        Ok((address, outcome))
    }
}
