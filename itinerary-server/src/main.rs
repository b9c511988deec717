use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use itinerary_server::config::AppConfig;
use itinerary_server::llm::{LlmClient, LlmConfig};
use itinerary_server::providers::{GoogleClient, GoogleConfig, NominatimClient, NominatimConfig};
use itinerary_server::resolve::PlaceResolver;
use itinerary_server::store::SystemClock;
use itinerary_server::web::{AppState, create_router};

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "itinerary_server=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = AppConfig::from_env()?;

    if config.places_api_key.is_none() && config.geocoding_api_key.is_none() {
        warn!("no Google API key set; resolving with Nominatim only");
    }
    let google = GoogleClient::new(GoogleConfig::new(
        config.places_api_key.clone(),
        config.geocoding_api_key.clone(),
    ))?;
    let nominatim = NominatimClient::new(
        NominatimConfig::default().with_user_agent(config.nominatim_user_agent.clone()),
    )?;

    let llm = match &config.llm_url {
        Some(url) => {
            let mut llm_config = LlmConfig::new(url);
            if let Some(key) = &config.llm_api_key {
                llm_config = llm_config.with_api_key(key);
            }
            Some(LlmClient::new(llm_config)?)
        }
        None => {
            info!("LLM_EXTRACTION_URL not set; using rule-based extraction only");
            None
        }
    };

    let state = AppState::new(
        PlaceResolver::new(google, nominatim),
        llm,
        Arc::new(SystemClock),
    );
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "itinerary server listening");
    info!("  GET  /health                   - Health check");
    info!("  POST /extract-places-from-text - Parse itinerary text");
    info!("  POST /resolve-places           - Resolve a batch of place names");
    info!("  POST /geocode-place            - Cached single-place geocode");
    info!("  GET  /place-details            - Canonical place details");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
