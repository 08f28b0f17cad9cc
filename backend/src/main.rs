use std::env;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use nft_universe_backend::{
    api::{create_app, NftApiState},
    AppConfig, FetchOutcome, NftService, StaticWallet,
};

const DEFAULT_CONFIG_PATH: &str = "nft_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config_path = env::var("NFT_CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = AppConfig::load_from_file(&config_path)?;
    config.apply_env_overrides();

    for problem in config.validate() {
        warn!("Configuration problem: {}", problem);
    }

    let service = NftService::from_config(&config)?;

    // With an address argument, fetch once and print; otherwise serve HTTP.
    match env::args().nth(1) {
        Some(address) => run_once(&service, address).await,
        None => serve(service, &config.server.bind_addr).await,
    }
}

async fn run_once(service: &NftService, address: String) -> anyhow::Result<()> {
    let wallet = StaticWallet::new(address);
    let (mut progress_tx, mut progress_rx) = mpsc::unbounded_channel::<u8>();

    let printer = tokio::spawn(async move {
        while let Some(percent) = progress_rx.recv().await {
            println!("Fetching NFTs... {}%", percent);
        }
    });

    let result = service.connect_and_fetch(&wallet, &mut progress_tx).await;
    drop(progress_tx);
    printer.await?;

    let (address, outcome) = result?;
    println!("Connected: {}", address);

    for item in outcome.tokens() {
        let media = item
            .metadata
            .media
            .as_ref()
            .map(|media| format!("{:?} {}", media.kind, media.url))
            .unwrap_or_default();
        println!(
            "[{}] #{} {} (owner {}) {}",
            item.chain,
            item.record.token_id,
            item.metadata.display_name,
            item.record.short_owner(),
            media
        );
    }

    match outcome {
        FetchOutcome::Complete { tokens } => info!("Fetched {} NFTs", tokens.len()),
        FetchOutcome::Partial { tokens, error } => {
            error!("{} (kept {} NFTs)", error, tokens.len());
        }
    }
    Ok(())
}

async fn serve(service: NftService, bind_addr: &str) -> anyhow::Result<()> {
    let app = create_app(NftApiState::new(service));

    info!("Routes configured:");
    info!("  - /health");
    info!("  - /api/nfts/chains, /api/nfts/:address");

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Server bound to {}, starting HTTP service...", bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
