use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::{FetchError, PageFetcher};
use crate::config::IndexerSettings;
use crate::types::{ChainId, RawNftRecord, WalletAddress};

/// Moralis deep-index client: `GET {api_url}/{address}/nft?chain=..&format=decimal`.
pub struct MoralisPageFetcher {
    client: Client,
    api_url: String,
    api_key: String,
}

impl MoralisPageFetcher {
    pub fn new(settings: &IndexerSettings) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .user_agent("nft-universe/0.1")
            .build()?;

        Ok(Self {
            client,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
        })
    }

    pub fn endpoint(&self, address: &WalletAddress) -> String {
        format!("{}/{}/nft", self.api_url, address)
    }
}

#[async_trait]
impl PageFetcher for MoralisPageFetcher {
    #[instrument(skip_all, fields(address = %address, chain = %chain))]
    async fn fetch_page(&self, address: &WalletAddress, chain: &ChainId) -> Result<Vec<RawNftRecord>, FetchError> {
        let response = self
            .client
            .get(self.endpoint(address))
            .query(&[("chain", chain.as_str()), ("format", "decimal")])
            .header("X-API-Key", &self.api_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let status_text = status
                .canonical_reason()
                .unwrap_or("Unknown status")
                .to_string();
            warn!("Indexer returned {} for chain {}", status, chain);
            return Err(FetchError::HttpStatus { status: status.as_u16(), status_text });
        }

        let body: Value = response.json().await.map_err(|e| {
            if e.is_decode() {
                FetchError::InvalidResponse(format!("body is not JSON: {}", e))
            } else {
                FetchError::Network(e)
            }
        })?;
        let records = parse_result(body)?;
        debug!("Indexer returned {} records for chain {}", records.len(), chain);
        Ok(records)
    }

    fn source_name(&self) -> &str {
        "moralis"
    }
}

/// The token list lives under `result`; the rest of the body (cursor, page size) is ignored.
pub fn parse_result(mut body: Value) -> Result<Vec<RawNftRecord>, FetchError> {
    let result = body
        .get_mut("result")
        .map(Value::take)
        .ok_or_else(|| FetchError::InvalidResponse("missing `result` field".to_string()))?;

    serde_json::from_value(result).map_err(|e| FetchError::InvalidResponse(format!("malformed `result`: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_result() {
        let body = json!({
            "total": 2,
            "cursor": null,
            "result": [
                {"token_id": "1", "owner_of": "0xowner", "metadata": "{\"name\":\"One\"}", "contract_type": "ERC721"},
                {"token_id": "2", "owner_of": "0xowner", "metadata": null},
            ],
        });

        let records = parse_result(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].contract_type.as_deref(), Some("ERC721"));
        assert_eq!(records[0].metadata, Some(json!("{\"name\":\"One\"}")));
        assert!(records[1].metadata.is_none());
    }

    #[test]
    fn test_parse_result_requires_result_field() {
        let err = parse_result(json!({"message": "oops"})).unwrap_err();
        assert!(matches!(err, FetchError::InvalidResponse(_)));

        let err = parse_result(json!({"result": "not a list"})).unwrap_err();
        assert!(matches!(err, FetchError::InvalidResponse(_)));
    }

    #[test]
    fn test_parse_result_keeps_rows_with_odd_ids() {
        let body = json!({
            "result": [
                {"token_id": 7, "owner_of": "0xowner"},
                {"token_id": "8", "owner_of": null, "metadata": "{}"},
            ],
        });

        let records = parse_result(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].token_id, "7");
        assert_eq!(records[1].owner_of, "");
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let fetcher = MoralisPageFetcher::new(&IndexerSettings {
            api_url: "https://deep-index.moralis.io/api/v2/".to_string(),
            ..IndexerSettings::default()
        })
        .unwrap();
        let address = WalletAddress::parse("0xabc").unwrap();
        assert_eq!(fetcher.endpoint(&address), "https://deep-index.moralis.io/api/v2/0xabc/nft");
    }
}
