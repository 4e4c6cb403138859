mod auth;
mod config;
mod error;
mod handlers;
mod llm;
mod routes;
mod state;
mod translation;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, DEFAULT_CONFIG_PATH};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("audit_translator=debug,tower_http=debug")),
        )
        .init();

    let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)?;
    info!("Loaded configuration (file: {}, optional)", config_path);

    if config.auth_config.allow_unknown_keys {
        tracing::warn!(
            "Unknown API keys are accepted with {} credits",
            config.auth_config.default_credits
        );
    }
    info!(
        "Model runtime: provider={}, model={}, base_url={}, max_attempts={}",
        config.llm_config.provider,
        config.llm_config.model,
        config.llm_config.base_url,
        config.translation_config.max_attempts
    );

    let host: std::net::IpAddr = config
        .system_config
        .host
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid host {:?}: {}", config.system_config.host, e))?;
    let addr = SocketAddr::from((host, config.system_config.port));

    let app_state = AppState::new(config)?;

    let app = routes::create_routes()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
