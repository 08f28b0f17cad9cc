use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use nft_universe_backend::api::{create_app, NftApiState};
use nft_universe_backend::{
    AggregationFetcher, ChainId, FetchError, NftService, PageFetcher, RawNftRecord, WalletAddress,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// `eth` has two tokens, `polygon` has one, `bsc` is down.
struct FixtureFetcher;

#[async_trait]
impl PageFetcher for FixtureFetcher {
    async fn fetch_page(&self, address: &WalletAddress, chain: &ChainId) -> Result<Vec<RawNftRecord>, FetchError> {
        match chain.as_str() {
            "eth" => Ok(vec![
                RawNftRecord::new("1", address.as_str(), Some(json!("{\"name\":\"Genesis\",\"video\":\"https://x/a.mp4\"}"))),
                RawNftRecord::new("2", address.as_str(), Some(json!("not json"))),
            ]),
            "polygon" => Ok(vec![RawNftRecord::new("3", address.as_str(), None)]),
            _ => Err(FetchError::HttpStatus { status: 503, status_text: "Service Unavailable".to_string() }),
        }
    }

    fn source_name(&self) -> &str {
        "fixture"
    }
}

fn app(chains: &[&str]) -> axum::Router {
    let service = NftService::new(
        AggregationFetcher::default(),
        Arc::new(FixtureFetcher),
        chains.iter().map(|id| ChainId::from(*id)).collect(),
    );
    create_app(NftApiState::new(service))
}

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get_json(app(&["eth"]), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], "ok");
}

#[tokio::test]
async fn test_complete_collection() {
    let (status, body) = get_json(app(&["eth", "polygon"]), "/api/nfts/0xabc").await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["address"], "0xabc");
    assert_eq!(data["status"], "complete");
    assert_eq!(data["progress"], json!([50, 100]));
    assert!(data["error"].is_null());

    let tokens = data["tokens"].as_array().unwrap();
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[0]["chain"], "eth");
    assert_eq!(tokens[0]["metadata"]["display_name"], "Genesis");
    assert_eq!(tokens[0]["metadata"]["media"]["kind"], "video");
    assert_eq!(tokens[1]["metadata"]["display_name"], "Unnamed NFT");
    assert_eq!(tokens[2]["chain"], "polygon");
    assert_eq!(tokens[2]["record"]["token_id"], "3");
}

#[tokio::test]
async fn test_partial_collection_reports_error() {
    let (status, body) = get_json(app(&["eth", "bsc", "polygon"]), "/api/nfts/0xabc").await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["status"], "partial");
    assert_eq!(data["progress"], json!([33]));
    assert_eq!(data["tokens"].as_array().unwrap().len(), 2);
    assert_eq!(data["error"], "Failed to fetch NFTs from bsc: Service Unavailable");
}

#[tokio::test]
async fn test_blank_address_is_rejected() {
    let (status, body) = get_json(app(&["eth"]), "/api/nfts/%20").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Wallet returned an empty address");
}

#[tokio::test]
async fn test_configured_chains() {
    let (status, body) = get_json(app(&["eth", "polygon"]), "/api/nfts/chains").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!(["eth", "polygon"]));
}
