use async_trait::async_trait;
use tracing::{info, warn};

use crate::types::WalletAddress;

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("No compatible wallet available: {0}")]
    PrerequisiteMissing(String),
    #[error("Wallet returned an empty address")]
    EmptyAddress,
}

/// Wallet-connection collaborator. Resolves to the address the user linked,
/// or fails when there is no wallet to ask.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn request_address(&self) -> Result<WalletAddress, WalletError>;
    fn provider_name(&self) -> &str;
}

/// Wallet backed by an address known up front (CLI flag, request path, config).
pub struct StaticWallet {
    address: Option<String>,
}

impl StaticWallet {
    pub fn new(address: impl Into<String>) -> Self {
        Self { address: Some(address.into()) }
    }

    pub fn unavailable() -> Self {
        Self { address: None }
    }
}

#[async_trait]
impl WalletProvider for StaticWallet {
    async fn request_address(&self) -> Result<WalletAddress, WalletError> {
        match &self.address {
            Some(address) => {
                let address = WalletAddress::parse(address)?;
                info!("Wallet connected: {}", address.short());
                Ok(address)
            }
            None => {
                warn!("No wallet configured");
                Err(WalletError::PrerequisiteMissing(
                    "no wallet address configured".to_string(),
                ))
            }
        }
    }

    fn provider_name(&self) -> &str {
        "static"
    }
}
