use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use energy_service::{api, config::AppConfig, metrics_server, observability, Dashboard};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let cfg = AppConfig::load()?;

    if let Some(metrics_cfg) = &cfg.metrics {
        metrics_server::init(&metrics_cfg.bind_addr)?;
    }

    let addr: SocketAddr = cfg
        .dashboard
        .http_bind_addr
        .parse()
        .with_context(|| format!("invalid dashboard.http_bind_addr '{}'", cfg.dashboard.http_bind_addr))?;

    let dashboard = Dashboard::new(cfg.store.store(), cfg.dashboard.clone());
    let app = api::router().with_state(Arc::new(dashboard));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, store = %cfg.store.path.display(), "dashboard listening");

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
