use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::StatusCode;
use mdmirror_core::MirrorRegistry;
use mdmirror_server::{Mirror, MirrorConfig, demo};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_FILTER: &str = "mdmirror_server=info,mdmirror_core=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)))
        .init();

    let config = match std::env::var("MDMIRROR_CONFIG") {
        Ok(path) => {
            let raw = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read MDMIRROR_CONFIG file: {path}"))?;
            MirrorConfig::from_json(&raw).with_context(|| format!("Invalid mirror config in {path}"))?
        }
        Err(_) => MirrorConfig::default(),
    };

    let registry = Arc::new(MirrorRegistry::new());
    let site = demo::site(&registry).context("Failed to register demo mirrors")?;
    let app = Mirror::new(site, registry, config)
        .context("Failed to build mirror router")?
        .into_router()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, Duration::from_secs(30)));

    let raw_addr = std::env::var("MDMIRROR_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let addr: SocketAddr = raw_addr.parse().with_context(|| format!("Invalid MDMIRROR_ADDR: {raw_addr}"))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, "mdmirror-server listening");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
