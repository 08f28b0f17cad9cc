pub mod aggregator;
pub mod api;
pub mod config;
pub mod indexer;
pub mod metadata;
pub mod service;
pub mod types;
pub mod wallet;

pub use aggregator::{AggregationError, AggregationFetcher, FetchOutcome, FetchSession, ProgressSink};
pub use config::AppConfig;
pub use indexer::{FetchError, MoralisPageFetcher, PageFetcher, RetryingPageFetcher};
pub use metadata::MetadataNormalizer;
pub use service::NftService;
pub use types::{ChainId, MediaKind, MediaReference, NftItem, NormalizedMetadata, RawNftRecord, WalletAddress};
pub use wallet::{StaticWallet, WalletError, WalletProvider};
