pub mod nfts_api;

pub use nfts_api::{create_nfts_router, CollectionStatus, NftApiState, NftCollectionResponse};

use axum::{response::Json, routing::get, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: u64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: now_secs(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: now_secs(),
        }
    }
}

fn now_secs() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

/// Full application router: health check plus the NFT endpoints under `/api/nfts`.
pub fn create_app(state: NftApiState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/nfts", create_nfts_router().with_state(state))
        .layer(CorsLayer::permissive())
}

async fn health_check() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::success("ok"))
}
