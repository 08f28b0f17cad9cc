pub mod moralis;
pub mod retry;

pub use moralis::MoralisPageFetcher;
pub use retry::RetryingPageFetcher;

use async_trait::async_trait;

use crate::types::{ChainId, RawNftRecord, WalletAddress};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{status_text}")]
    HttpStatus { status: u16, status_text: String },
    #[error("Invalid response from indexer: {0}")]
    InvalidResponse(String),
}

impl FetchError {
    /// Transport failures, rate limiting and server errors may pass on a second try.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Network(_) => true,
            FetchError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            FetchError::InvalidResponse(_) => false,
        }
    }
}

/// One page of NFTs for one wallet on one chain. Each call is a single round
/// trip; timeouts and retries are the implementor's business.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, address: &WalletAddress, chain: &ChainId) -> Result<Vec<RawNftRecord>, FetchError>;
    fn source_name(&self) -> &str;
}
