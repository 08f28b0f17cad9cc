use tokio::sync::mpsc;
use tracing::{info, instrument, warn};

use crate::indexer::{FetchError, PageFetcher};
use crate::metadata::MetadataNormalizer;
use crate::types::{ChainId, NftItem, RawNftRecord, WalletAddress};

#[derive(Debug, thiserror::Error)]
pub enum AggregationError {
    #[error("Failed to fetch NFTs from {chain}: {source}")]
    ChainFetchFailure { chain: ChainId, source: FetchError },
}

impl AggregationError {
    pub fn chain(&self) -> &ChainId {
        match self {
            AggregationError::ChainFetchFailure { chain, .. } => chain,
        }
    }
}

/// How a session ended. `Partial` keeps every token collected before the
/// failing chain.
#[derive(Debug)]
pub enum FetchOutcome {
    Complete { tokens: Vec<NftItem> },
    Partial { tokens: Vec<NftItem>, error: AggregationError },
}

impl FetchOutcome {
    pub fn tokens(&self) -> &[NftItem] {
        match self {
            FetchOutcome::Complete { tokens } | FetchOutcome::Partial { tokens, .. } => tokens,
        }
    }

    pub fn error(&self) -> Option<&AggregationError> {
        match self {
            FetchOutcome::Complete { .. } => None,
            FetchOutcome::Partial { error, .. } => Some(error),
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, FetchOutcome::Complete { .. })
    }

    pub fn into_parts(self) -> (Vec<NftItem>, Option<AggregationError>) {
        match self {
            FetchOutcome::Complete { tokens } => (tokens, None),
            FetchOutcome::Partial { tokens, error } => (tokens, Some(error)),
        }
    }
}

/// Receives one percentage per completed chain, in non-decreasing order.
pub trait ProgressSink: Send {
    fn emit(&mut self, percent: u8);
}

impl<F: FnMut(u8) + Send> ProgressSink for F {
    fn emit(&mut self, percent: u8) {
        self(percent)
    }
}

impl ProgressSink for Vec<u8> {
    fn emit(&mut self, percent: u8) {
        self.push(percent);
    }
}

/// Stream form. A dropped receiver means nobody is watching, not that the session should stop.
impl ProgressSink for mpsc::UnboundedSender<u8> {
    fn emit(&mut self, percent: u8) {
        let _ = self.send(percent);
    }
}

impl ProgressSink for () {
    fn emit(&mut self, _percent: u8) {}
}

/// Per-session state. Owned by exactly one fetch loop; nothing here is shared.
#[derive(Debug)]
pub struct FetchSession {
    address: WalletAddress,
    chains: Vec<ChainId>,
    completed: usize,
    tokens: Vec<NftItem>,
    progress: u8,
    error: Option<AggregationError>,
}

impl FetchSession {
    pub fn new(address: WalletAddress, chains: Vec<ChainId>) -> Self {
        Self {
            address,
            chains,
            completed: 0,
            tokens: Vec::new(),
            progress: 0,
            error: None,
        }
    }

    pub fn address(&self) -> &WalletAddress {
        &self.address
    }

    /// Chain to query next; `None` once every chain is done or an error was recorded.
    pub fn next_chain(&self) -> Option<&ChainId> {
        if self.error.is_some() {
            return None;
        }
        self.chains.get(self.completed)
    }

    pub fn current_index(&self) -> usize {
        self.completed
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn tokens(&self) -> &[NftItem] {
        &self.tokens
    }

    pub fn error(&self) -> Option<&AggregationError> {
        self.error.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.next_chain().is_none()
    }

    /// Appends the chain's tokens and returns the new percentage.
    pub fn record_success(&mut self, items: Vec<NftItem>) -> u8 {
        self.tokens.extend(items);
        self.completed += 1;
        self.progress = percent_complete(self.completed, self.chains.len());
        self.progress
    }

    pub fn record_failure(&mut self, error: AggregationError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    pub fn into_outcome(self) -> FetchOutcome {
        match self.error {
            None => FetchOutcome::Complete { tokens: self.tokens },
            Some(error) => FetchOutcome::Partial { tokens: self.tokens, error },
        }
    }
}

/// `floor(completed * 100 / total)`; zero when there is nothing to do.
pub fn percent_complete(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    (completed.min(total) * 100 / total) as u8
}

/// Drives one wallet through the configured chains, strictly one after another.
#[derive(Debug, Clone, Default)]
pub struct AggregationFetcher {
    normalizer: MetadataNormalizer,
}

impl AggregationFetcher {
    pub fn new(normalizer: MetadataNormalizer) -> Self {
        Self { normalizer }
    }

    /// Queries every chain in order and stops at the first failure. Dropping
    /// the returned future cancels whatever chain call is in flight.
    #[instrument(skip_all, fields(address = %address, chains = chains.len()))]
    pub async fn fetch_all<P>(
        &self,
        address: &WalletAddress,
        chains: &[ChainId],
        page_fetcher: &dyn PageFetcher,
        progress: &mut P,
    ) -> FetchOutcome
    where
        P: ProgressSink + ?Sized,
    {
        let mut session = FetchSession::new(address.clone(), chains.to_vec());

        while let Some(chain) = session.next_chain().cloned() {
            match page_fetcher.fetch_page(address, &chain).await {
                Ok(records) => {
                    info!("Fetched {} NFTs from {} via {}", records.len(), chain, page_fetcher.source_name());
                    let items = self.normalize_page(&chain, records);
                    let percent = session.record_success(items);
                    progress.emit(percent);
                }
                Err(e) => {
                    warn!("Failed to fetch NFTs from {}: {}", chain, e);
                    session.record_failure(AggregationError::ChainFetchFailure { chain, source: e });
                }
            }
        }

        info!(
            "Session for {} finished with {} NFTs across {}/{} chains",
            session.address().short(),
            session.tokens().len(),
            session.current_index(),
            chains.len()
        );
        session.into_outcome()
    }

    pub fn normalize_page(&self, chain: &ChainId, records: Vec<RawNftRecord>) -> Vec<NftItem> {
        records
            .into_iter()
            .map(|record| NftItem {
                chain: chain.clone(),
                metadata: self.normalizer.normalize(&record),
                record,
            })
            .collect()
    }
}
