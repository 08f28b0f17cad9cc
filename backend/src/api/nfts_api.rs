use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::ApiResponse;
use crate::aggregator::FetchOutcome;
use crate::service::NftService;
use crate::types::{ChainId, NftItem};
use crate::wallet::StaticWallet;

#[derive(Clone)]
pub struct NftApiState {
    pub service: NftService,
}

impl NftApiState {
    pub fn new(service: NftService) -> Self {
        Self { service }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionStatus {
    Complete,
    Partial,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NftCollectionResponse {
    pub address: String,
    pub status: CollectionStatus,
    pub chains: Vec<ChainId>,
    pub progress: Vec<u8>,
    pub tokens: Vec<NftItem>,
    pub error: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

pub fn create_nfts_router() -> Router<NftApiState> {
    Router::new()
        .route("/chains", get(get_chains))
        .route("/:address", get(get_nfts))
}

async fn get_chains(State(state): State<NftApiState>) -> Json<ApiResponse<Vec<ChainId>>> {
    Json(ApiResponse::success(state.service.chains().to_vec()))
}

async fn get_nfts(
    State(state): State<NftApiState>,
    Path(address): Path<String>,
) -> (StatusCode, Json<ApiResponse<NftCollectionResponse>>) {
    let wallet = StaticWallet::new(address);
    let mut progress: Vec<u8> = Vec::new();

    match state.service.connect_and_fetch(&wallet, &mut progress).await {
        Ok((address, outcome)) => {
            let status = if outcome.is_complete() {
                CollectionStatus::Complete
            } else {
                CollectionStatus::Partial
            };
            let (tokens, error) = match outcome {
                FetchOutcome::Complete { tokens } => (tokens, None),
                FetchOutcome::Partial { tokens, error } => {
                    warn!("Returning partial collection for {}: {}", address.short(), error);
                    (tokens, Some(error.to_string()))
                }
            };
            info!("Serving {} NFTs for {}", tokens.len(), address.short());

            let response = NftCollectionResponse {
                address: address.to_string(),
                status,
                chains: state.service.chains().to_vec(),
                progress,
                tokens,
                error,
                fetched_at: Utc::now(),
            };
            (StatusCode::OK, Json(ApiResponse::success(response)))
        }
        Err(e) => {
            error!("Wallet prerequisite failed: {}", e);
            (StatusCode::BAD_REQUEST, Json(ApiResponse::error(e.to_string())))
        }
    }
}
