use std::error::Error;

use tracing::info;
use tracing_subscriber::EnvFilter;

use split_server::config::ServerConfig;
use split_server::vendo::VendoClient;
use split_server::web::{AppState, create_router};

const DEFAULT_LOG_FILTER: &str = "split_server=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = ServerConfig::from_env()?;

    info!(
        api = %config.vendo.base_url,
        max_concurrent = config.scan.max_concurrent,
        max_split_points = config.scan.max_split_points,
        cache_ttl_secs = config.cache.ttl.as_secs(),
        "starting"
    );

    let vendo = VendoClient::new(config.vendo.clone())?;
    let state = AppState::new(vendo, &config.cache, config.scan.clone());
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Split-ticket finder listening on http://{}", config.bind_addr);
    info!("  GET  /health             - Health check");
    info!("  GET  /api/journeys       - Search journeys");
    info!("  POST /api/split-journey  - Find split tickets");

    axum::serve(listener, app).await?;

    Ok(())
}
