use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::types::ChainId;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read or write config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub indexer: IndexerSettings,
    /// Queried in this order; the order decides progress steps and what survives a failure.
    pub chains: Vec<ChainId>,
    pub media: MediaSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerSettings {
    pub api_url: String,
    pub api_key: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaSettings {
    pub ipfs_gateway: String,
    pub placeholder_image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub bind_addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            indexer: IndexerSettings::default(),
            chains: ["eth", "polygon", "bsc", "avalanche", "fantom", "arbitrum"]
                .into_iter()
                .map(ChainId::from)
                .collect(),
            media: MediaSettings::default(),
            server: ServerSettings {
                bind_addr: "0.0.0.0:3000".to_string(),
            },
        }
    }
}

impl Default for IndexerSettings {
    fn default() -> Self {
        Self {
            api_url: "https://deep-index.moralis.io/api/v2".to_string(),
            api_key: String::new(),
            timeout_seconds: 15,
            max_retries: 0, // a failed chain ends the session unless retries are opted into
            retry_delay_ms: 500,
        }
    }
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            ipfs_gateway: "https://ipfs.io/ipfs".to_string(),
            placeholder_image: "https://picsum.photos/200/300".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        info!("Loading configuration from: {}", path);

        if !Path::new(path).exists() {
            warn!("Configuration file not found at {}, creating default config", path);
            let default_config = Self::default();
            default_config.save_to_file(path)?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;

        info!("Configuration loaded ({} chains)", config.chains.len());
        Ok(config)
    }

    pub fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        info!("Configuration saved to: {}", path);
        Ok(())
    }

    pub fn load_from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Environment wins over whatever was loaded from disk.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(api_key) = env::var("MORALIS_API_KEY") {
            self.indexer.api_key = api_key;
            info!("Loaded indexer API key from environment");
        }

        if let Ok(api_url) = env::var("MORALIS_API_URL") {
            self.indexer.api_url = api_url;
        }

        if let Ok(timeout) = env::var("NFT_TIMEOUT_SECONDS") {
            match timeout.parse::<u64>() {
                Ok(seconds) => self.indexer.timeout_seconds = seconds,
                Err(_) => warn!("Ignoring invalid NFT_TIMEOUT_SECONDS: {}", timeout),
            }
        }

        if let Ok(retries) = env::var("NFT_MAX_RETRIES") {
            match retries.parse::<u32>() {
                Ok(retries) => self.indexer.max_retries = retries,
                Err(_) => warn!("Ignoring invalid NFT_MAX_RETRIES: {}", retries),
            }
        }

        if let Ok(chains) = env::var("NFT_CHAINS") {
            self.chains = parse_chain_list(&chains);
        }

        if let Ok(gateway) = env::var("NFT_IPFS_GATEWAY") {
            self.media.ipfs_gateway = gateway;
        }

        if let Ok(placeholder) = env::var("NFT_PLACEHOLDER_IMAGE") {
            self.media.placeholder_image = placeholder;
        }

        if let Ok(bind_addr) = env::var("NFT_BIND_ADDR") {
            self.server.bind_addr = bind_addr;
        }
    }

    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.indexer.api_key.is_empty() {
            problems.push("indexer API key is empty".to_string());
        }
        if self.chains.is_empty() {
            problems.push("no chains configured".to_string());
        }
        if !self.media.ipfs_gateway.starts_with("http://") && !self.media.ipfs_gateway.starts_with("https://") {
            problems.push(format!("IPFS gateway is not an HTTP(S) URL: {}", self.media.ipfs_gateway));
        }

        problems
    }
}

/// Comma separated, blanks dropped, order kept.
pub fn parse_chain_list(raw: &str) -> Vec<ChainId> {
    raw.split(',')
        .map(str::trim)
        .filter(|chain| !chain.is_empty())
        .map(ChainId::from)
        .collect()
}
