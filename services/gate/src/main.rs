//! Authentication gate service entry point.
//!
//! # Purpose
//! Loads configuration, wires the router, and serves until interrupted.
//! The reverse proxy delegates per-request authorization to `/_auth` and
//! sends browsers without a ticket to `/login`.
use anyhow::Result;
use gate::app::{build_router, AppState};
use gate::config::GateConfig;
use gate::observability;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();
    let path = std::env::var("GATE_CONFIG").unwrap_or_else(|_| "config.json".to_string());
    let config = GateConfig::load(&path)?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    run_with_shutdown(config, addr, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

async fn run_with_shutdown<F>(config: GateConfig, addr: SocketAddr, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let router = build_router(AppState {
        config: Arc::new(config),
    });
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "auth gate listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
