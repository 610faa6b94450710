//! Process bootstrap: bind both listeners and serve until one fails.

use std::net::SocketAddr;

use tokio::net::TcpListener;

use fleetwatch_core::error::{FleetError, Result};

use crate::{app_state::AppState, config::ServiceConfig, router};

/// Run the device API and metrics listeners concurrently.
///
/// Returns only on failure: a bind error or a listener that stops serving.
pub async fn run(cfg: ServiceConfig) -> Result<()> {
    let api_addr = cfg.api.validate()?;
    let metrics_addr = cfg.metrics.validate()?;

    let state = AppState::new(cfg).await?;

    let api_listener = bind("api", api_addr).await?;
    let ops_listener = bind("metrics", metrics_addr).await?;

    tracing::info!(
        api = %api_addr,
        metrics = %metrics_addr,
        devices = state.store().count().await,
        version = %state.cfg().app.version,
        "fleetwatch-server starting"
    );

    let api_app = router::build_api_router(state.clone());
    let ops_app = router::build_ops_router(state);

    tokio::try_join!(
        async {
            axum::serve(api_listener, api_app)
                .await
                .map_err(|e| FleetError::Internal(format!("api listener failed: {e}")))
        },
        async {
            axum::serve(ops_listener, ops_app)
                .await
                .map_err(|e| FleetError::Internal(format!("metrics listener failed: {e}")))
        },
    )?;

    Err(FleetError::Internal("listeners stopped".into()))
}

async fn bind(name: &str, addr: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| FleetError::Internal(format!("{name} bind failed ({addr}): {e}")))
}
